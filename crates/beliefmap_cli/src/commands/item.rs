//! Get, set and remove command implementations.

use super::{open_client, RemoteArgs};
use beliefmap_sync_engine::RefreshOutcome;
use beliefmap_sync_protocol::{now_millis, stamp};
use std::path::Path;

/// Adds the current time as `_lastModified` when `value` is a state envelope.
///
/// Other values are stored verbatim.
pub fn prepare_value(value: &str, now: i64) -> String {
    stamp(value, now).unwrap_or_else(|| value.to_string())
}

/// Runs the get command.
pub async fn get(path: &Path, remote: &RemoteArgs, key: &str) -> Result<(), Box<dyn std::error::Error>> {
    let client = open_client(path, remote)?;
    let read = client.storage().get_item(key);

    match read.refresh.join().await {
        Some(RefreshOutcome::Rehydrated { .. }) => {
            tracing::info!(key, "server copy was newer, local value replaced");
            match client.storage().local().read(key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("No value for {key:?}").into()),
            }
        }
        _ => match read.value {
            Some(value) => println!("{value}"),
            None => return Err(format!("No value for {key:?}").into()),
        },
    }
    Ok(())
}

/// Runs the set command.
pub async fn set(
    path: &Path,
    remote: &RemoteArgs,
    key: &str,
    value: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = open_client(path, remote)?;
    let value = prepare_value(value, now_millis());

    match client.storage().set_item(key, &value).try_join().await? {
        Ok(_) => println!("{key}: synced"),
        Err(e) => println!("{key}: saved locally, queued for retry ({e})"),
    }
    Ok(())
}

/// Runs the remove command.
pub async fn remove(path: &Path, remote: &RemoteArgs, key: &str) -> Result<(), Box<dyn std::error::Error>> {
    let client = open_client(path, remote)?;

    match client.storage().remove_item(key).try_join().await? {
        Ok(_) => println!("{key}: removed"),
        Err(e) => println!("{key}: removed locally, server copy kept ({e})"),
    }
    Ok(())
}
