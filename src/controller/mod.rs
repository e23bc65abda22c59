/// Controller subsystem - Editor session and its background work
///
/// The session owns the open documents and routes input to them. Autosave
/// ticks and sync results reach it as events from helper threads.

pub mod autosave;
pub mod command;
pub mod session_controller;
pub mod sync_worker;

// Re-export public interface
pub use command::{CommandOutcome, CommandRunner};
pub use session_controller::{DocumentId, Session, SessionEvent};
pub use sync_worker::SyncRequest;
