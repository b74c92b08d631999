//! Sync command implementation.

use super::{open_client, RemoteArgs};
use std::path::Path;

/// Runs the sync command: one drain pass over the pending-write queue.
pub async fn run(path: &Path, remote: &RemoteArgs) -> Result<(), Box<dyn std::error::Error>> {
    let client = open_client(path, remote)?;
    let report = client.scheduler().sync_now().await?;

    println!(
        "Synced {} of {} queued writes, {} remaining",
        report.synced, report.attempted, report.remaining
    );
    for failure in &report.failures {
        println!("  {}: {}", failure.name, failure.error);
    }

    if report.is_clean() {
        Ok(())
    } else {
        Err(format!("{} writes could not be sent", report.failures.len()).into())
    }
}
