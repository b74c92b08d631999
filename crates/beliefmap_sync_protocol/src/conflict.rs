//! Last-write-wins freshness rule.

/// Outcome of comparing a local value with the server's copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Local value is at least as fresh; leave it alone.
    KeepLocal,
    /// Server value is strictly newer; overwrite local and rehydrate.
    TakeRemote,
}

impl Resolution {
    /// Returns true if the remote value should replace the local one.
    pub fn takes_remote(self) -> bool {
        matches!(self, Resolution::TakeRemote)
    }
}

/// Decides whether a server value supersedes the local one.
///
/// The server wins only when its `updated_at` is strictly greater than the
/// `_lastModified` embedded in the local payload. Ties keep the local value.
pub fn resolve(local_last_modified: i64, remote_updated_at: i64) -> Resolution {
    if remote_updated_at > local_last_modified {
        Resolution::TakeRemote
    } else {
        Resolution::KeepLocal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_remote_wins() {
        assert_eq!(resolve(100, 200), Resolution::TakeRemote);
        assert!(resolve(0, 1).takes_remote());
    }

    #[test]
    fn older_remote_loses() {
        assert_eq!(resolve(200, 100), Resolution::KeepLocal);
    }

    #[test]
    fn tie_keeps_local() {
        assert_eq!(resolve(150, 150), Resolution::KeepLocal);
        assert!(!resolve(150, 150).takes_remote());
    }
}
