//! Subcommand handlers.

use chrono::Local;
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use tracker_core::{
    Analytics, ApplicationRecord, GlobalRefreshState, NewApplication, RecordSyncStatus,
};
use tracker_sync::{EnvironmentGates, LocalStore, PreferenceStore, RefreshSummary, StaticGates};

use crate::app::App;
use crate::args::{Command, RemoteArgs, Toggle};
use crate::error::{CliError, CliResult};

pub async fn dispatch(app: &App, command: Command) -> CliResult<()> {
    match command {
        Command::Add {
            company,
            position,
            date,
            status,
        } => {
            let applied_on = date.unwrap_or_else(|| Local::now().date_naive());
            let record = app
                .db
                .add_record(NewApplication::new(company, position, applied_on).with_status(status))
                .await?;
            println!("Added {} / {} ({})", record.company, record.position, record.id);
        }

        Command::List { json } => {
            let records = app.db.applications().list().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                print_records(&records);
            }
        }

        Command::Refresh { remote } => refresh(app, &remote).await?,

        Command::Sync {
            remote,
            then_refresh,
        } => {
            let mirror = app.mirror(&remote).await?.ok_or(CliError::MirrorRequired("sync"))?;
            let triggers = app.triggers(mirror);

            let report = if then_refresh {
                let (report, summary) = triggers.on_authenticated().await;
                print_summary(&summary);
                report
            } else {
                triggers.sync_now().await
            };

            println!(
                "Uploaded {}, failed {}",
                report.success_count, report.error_count
            );
        }

        Command::Watch {
            interval,
            hidden,
            remote,
        } => {
            let mirror = app.mirror(&remote).await?;
            let gates = Arc::new(StaticGates::default());
            gates.set_hidden(hidden);

            let scheduler = app.scheduler(gates.clone(), App::live_source(mirror.as_ref()))?;
            let preference = scheduler.restore().await;
            let interval = interval.unwrap_or(preference.interval_secs);

            scheduler.enable(interval).await?;
            info!(interval, online = gates.is_online(), "Watching; Ctrl-C to stop");

            tokio::signal::ctrl_c().await?;
            scheduler.shutdown().await?;

            let stats = scheduler.stats();
            println!(
                "Ticks {}, refreshes {}, skipped {}",
                stats.ticks, stats.runs, stats.skipped
            );
        }

        Command::Status => {
            let preferences = app.preferences()?;
            let preference = preferences.load().await?;

            let state = GlobalRefreshState::from_preference(preference);

            let records = app.db.get_records().await?;
            let pending = app.db.applications().count_pending().await?;

            let status = json!({
                "refresh": state,
                "autoRefresh": preference,
                "applications": records.len(),
                "pendingUploads": pending,
                "analytics": Analytics::compute(&records),
            });
            println!("{}", serde_json::to_string_pretty(&status)?);
        }

        Command::AutoRefresh { toggle, interval } => {
            let scheduler = app.scheduler(
                Arc::new(StaticGates::default()),
                App::live_source(None),
            )?;
            let preference = scheduler.restore().await;

            match toggle {
                Toggle::On => {
                    scheduler
                        .enable(interval.unwrap_or(preference.interval_secs))
                        .await?;
                    // Stored only; `watch` starts the timer.
                    scheduler.shutdown().await?;
                }
                Toggle::Off => scheduler.disable().await,
            }
        }
    }

    Ok(())
}

async fn refresh(app: &App, remote: &RemoteArgs) -> CliResult<()> {
    let mirror = app.mirror(remote).await?;
    let operations = app.operations(App::live_source(mirror.as_ref()));

    let summary = app.coordinator.run(operations()).await;
    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &RefreshSummary) {
    if summary.skipped {
        println!("Refresh already in progress");
        return;
    }
    for outcome in &summary.outcomes {
        match outcome.describe() {
            Some(error) => println!("  ✗ {}", error),
            None => println!("  ✓ {}", outcome.name),
        }
    }
}

fn print_records(records: &[ApplicationRecord]) {
    if records.is_empty() {
        println!("No applications tracked yet");
        return;
    }

    for r in records {
        let sync = match (r.sync_status, &r.cloud_id) {
            (RecordSyncStatus::Synced, Some(_)) => "synced",
            _ => "pending",
        };
        println!(
            "{}  {:<12} {:<8} {} / {}",
            r.applied_on,
            r.status.to_string(),
            sync,
            r.company,
            r.position
        );
    }
}
