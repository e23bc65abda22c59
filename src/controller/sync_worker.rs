use super::session_controller::{DocumentId, SessionEvent};
use crate::sync::SyncClient;
use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

/// Text of a document captured on the session thread, to be exchanged with
/// the peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRequest {
    pub document: DocumentId,
    pub revision: u64,
    pub text: String,
}

/// Thread that runs `SyncClient::exchange` off the session thread.
///
/// Requests go through a single-slot channel; results come back as
/// `SessionEvent::SyncCompleted`.
pub struct SyncWorker {
    client: Arc<SyncClient>,
    requests: Option<Sender<SyncRequest>>,
    stopping: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl SyncWorker {
    pub fn start(client: SyncClient, events: Sender<SessionEvent>) -> Self {
        let client = Arc::new(client);
        let (requests_tx, requests_rx) = bounded(1);
        let stopping = Arc::new(AtomicBool::new(false));
        let handle = spawn_worker_thread(
            Arc::clone(&client),
            requests_rx,
            events,
            Arc::clone(&stopping),
        );
        Self {
            client,
            requests: Some(requests_tx),
            stopping,
            handle: Some(handle),
        }
    }

    pub fn client(&self) -> &SyncClient {
        &self.client
    }

    /// Queues a request without blocking. Returns false when the slot is
    /// taken.
    pub fn offer(&self, request: SyncRequest) -> bool {
        let Some(requests) = &self.requests else {
            return false;
        };
        match requests.try_send(request) {
            Ok(()) => true,
            Err(TrySendError::Full(request)) => {
                log::debug!("sync of {} skipped: request slot full", request.document);
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                log::warn!("sync worker has stopped");
                false
            }
        }
    }

    pub fn cancel(&self) {
        self.client.cancel_pull();
    }
}

impl Drop for SyncWorker {
    fn drop(&mut self) {
        // Closing the request channel ends the worker loop
        self.stopping.store(true, Ordering::Release);
        self.requests.take();
        self.client.cancel_pull();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("sync worker thread panicked");
            }
        }
    }
}

fn spawn_worker_thread(
    client: Arc<SyncClient>,
    requests: Receiver<SyncRequest>,
    events: Sender<SessionEvent>,
    stopping: Arc<AtomicBool>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        for request in requests.iter() {
            if stopping.load(Ordering::Acquire) {
                break;
            }
            let result = client.exchange(&request.text);
            let completed = SessionEvent::SyncCompleted {
                document: request.document,
                pushed_revision: request.revision,
                result,
            };
            if events.send(completed).is_err() {
                break; // Session is gone
            }
        }
    })
}
