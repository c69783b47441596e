// crates/client/src/bin/packwatch.rs
//! Watch a year-end filing pack from the terminal.
//!
//! Loads (or requests) the pack for one business/year and streams status
//! updates until the job is terminal or the watcher gives up.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use packwatch_client::{HttpJobStore, PackWatcher, WatcherSnapshot};
use packwatch_types::{PackJob, PackStatus, Subject};
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "packwatch", about = "Watch a year-end filing pack to completion")]
struct Args {
    /// Job Store base URL.
    #[arg(long, default_value = "http://127.0.0.1:8787")]
    base_url: String,

    /// Owning business identifier.
    #[arg(long)]
    business: String,

    /// Tax year the pack covers.
    #[arg(long)]
    year: u16,

    /// Request (re-)generation instead of only loading current status.
    #[arg(long)]
    generate: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let subject = Subject::new(&args.business, args.year);
    let store = Arc::new(HttpJobStore::new(&args.base_url));
    let watcher = PackWatcher::new(store);

    if args.generate {
        watcher
            .generate(Some(&subject))
            .await
            .map_err(|e| anyhow::anyhow!(e.user_message()))?;
        println!("generation requested for {subject}");
    } else {
        let job = watcher
            .load_status(Some(&subject))
            .await
            .map_err(|e| anyhow::anyhow!(e.user_message()))?;
        if job.status.is_terminal() {
            print_final(&job);
            return Ok(());
        }
    }

    // Subscribe before reading the catch-up snapshot so no update between
    // the two is lost.
    let mut rx = watcher.subscribe();
    let mut last_status = None;
    if report(&watcher.snapshot(), &mut last_status) {
        return Ok(());
    }

    loop {
        match rx.recv().await {
            Ok(snap) => {
                if report(&snap, &mut last_status) {
                    return Ok(());
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "missed snapshot updates, resyncing");
                if report(&watcher.snapshot(), &mut last_status) {
                    return Ok(());
                }
            }
            Err(broadcast::error::RecvError::Closed) => return Ok(()),
        }
    }
}

/// Print status transitions; returns true once watching is over.
fn report(snap: &WatcherSnapshot, last_status: &mut Option<PackStatus>) -> bool {
    if let Some(job) = &snap.job {
        if *last_status != Some(job.status) {
            *last_status = Some(job.status);
            println!("status: {}", job.status);
        }
        if job.status.is_terminal() {
            print_final(job);
            return true;
        }
    }
    if !snap.is_generating && !snap.is_loading {
        println!("gave up waiting; the pack may still complete server-side");
        return true;
    }
    false
}

fn print_final(job: &PackJob) {
    if let Some(ts) = job.requested_at {
        println!("requested at: {}", ts.to_rfc3339());
    }
    match job.status {
        PackStatus::Ready => match &job.payload {
            Some(payload) => println!("pack ready: {payload}"),
            None => println!("pack ready"),
        },
        PackStatus::Failed => println!(
            "pack failed: {}",
            job.error_detail.as_deref().unwrap_or("no detail reported")
        ),
        _ => {}
    }
}
