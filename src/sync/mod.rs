/// Remote sync subsystem - Snapshot exchange with a peer over TCP
///
/// The wire format lives in `protocol`, the connection in `client`. What a
/// session does with a fetched snapshot is decided by `ReconcilePolicy`.

pub mod client;
pub mod protocol;

pub use client::{PullOutcome, SyncClient, SyncError, SyncOptions};
pub use protocol::{ProtocolError, RemoteSnapshot};

/// How a fetched snapshot is merged into the local document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconcilePolicy {
    /// The snapshot replaces the local text unconditionally.
    #[default]
    Overwrite,
    /// The snapshot is dropped when the document changed after its text was
    /// pushed.
    RejectStale,
}

impl ReconcilePolicy {
    /// Whether a snapshot answering a push made at `pushed_revision` may
    /// replace a document now at `current_revision`.
    pub fn accepts(self, pushed_revision: u64, current_revision: u64) -> bool {
        match self {
            ReconcilePolicy::Overwrite => true,
            ReconcilePolicy::RejectStale => pushed_revision == current_revision,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reconcile_policies() {
        assert!(ReconcilePolicy::Overwrite.accepts(3, 3));
        assert!(ReconcilePolicy::Overwrite.accepts(3, 7));
        assert!(ReconcilePolicy::RejectStale.accepts(3, 3));
        assert!(!ReconcilePolicy::RejectStale.accepts(3, 4));
        assert_eq!(ReconcilePolicy::default(), ReconcilePolicy::Overwrite);
    }
}
