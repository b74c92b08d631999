//! Status command implementation.

use super::{open_client, RemoteArgs};
use beliefmap_sync_engine::HttpRemote;
use beliefmap_sync_protocol::QueueItem;
use serde::Serialize;
use std::path::Path;

/// Status report.
#[derive(Debug, Serialize)]
pub struct StatusResult {
    /// Store path.
    pub path: String,
    /// Server URL.
    pub server: String,
    /// `online`, `pending` or `offline`.
    pub status: String,
    /// Writes waiting for the server.
    pub pending: Vec<PendingEntry>,
}

/// One queued write.
#[derive(Debug, Serialize)]
pub struct PendingEntry {
    /// Key.
    pub name: String,
    /// When the write was queued, in milliseconds.
    pub timestamp: i64,
    /// Size of the queued value in bytes.
    pub size: usize,
}

impl From<QueueItem> for PendingEntry {
    fn from(item: QueueItem) -> Self {
        Self {
            name: item.name,
            timestamp: item.timestamp,
            size: item.value.len(),
        }
    }
}

/// Runs the status command.
pub async fn run(path: &Path, remote: &RemoteArgs, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let client = open_client(path, remote)?;

    let remote_check = HttpRemote::from_config(client.config());
    if let Err(e) = remote_check.health().await {
        tracing::debug!(error = %e, "health check failed");
        client.scheduler().notify_offline();
    }

    let result = StatusResult {
        path: path.display().to_string(),
        server: client.config().server_url.clone(),
        status: client.status().to_string(),
        pending: client
            .storage()
            .queue()
            .drain()
            .into_iter()
            .map(PendingEntry::from)
            .collect(),
    };

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

fn print_text_output(result: &StatusResult) {
    println!("Beliefmap Sync Status");
    println!("=====================");
    println!();
    println!("Store:  {}", result.path);
    println!("Server: {}", result.server);
    println!("Status: {}", result.status);

    if !result.pending.is_empty() {
        println!();
        println!("Pending writes:");
        for entry in &result.pending {
            println!(
                "  {} ({} bytes, queued at {})",
                entry.name, entry.size, entry.timestamp
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_entry_from_item() {
        let entry = PendingEntry::from(QueueItem::new("theme", "{\"dark\":true}", 7));
        assert_eq!(entry.name, "theme");
        assert_eq!(entry.size, 13);
        assert_eq!(entry.timestamp, 7);
    }

    #[test]
    fn json_shape() {
        let result = StatusResult {
            path: "/tmp/store".into(),
            server: "http://127.0.0.1:8080".into(),
            status: "pending".into(),
            pending: vec![PendingEntry::from(QueueItem::new("k", "v", 1))],
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "pending");
        assert_eq!(json["pending"][0]["name"], "k");
    }
}
