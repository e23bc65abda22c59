use super::autosave::AutosaveTimer;
use super::sync_worker::{SyncRequest, SyncWorker};
use crate::config::RcConfig;
use crate::document_model::Document;
use crate::sync::{PullOutcome, SyncClient, SyncError, SyncOptions};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Stable handle for a document owned by a `Session`. Ids are never reused,
/// so a sync result for a closed document can be recognised and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(u64);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Messages delivered to the session thread by its timer and sync worker.
#[derive(Debug)]
pub enum SessionEvent {
    AutosaveTick,
    SyncCompleted {
        document: DocumentId,
        pushed_revision: u64,
        result: Result<PullOutcome, SyncError>,
    },
}

struct Buffer {
    id: DocumentId,
    document: Document,
}

/// An editor session: the open documents, the active one, and the
/// background autosave/sync machinery.
///
/// Documents are only touched on the thread that owns the session. The timer
/// and the sync worker talk to it through the event queue, which is drained
/// by `process_events` or `wait_for_events`.
pub struct Session {
    config: RcConfig,
    buffers: Vec<Buffer>,
    current_buffer: Option<usize>,
    next_id: u64,
    events_tx: Sender<SessionEvent>,
    events_rx: Receiver<SessionEvent>,
    autosave: Option<AutosaveTimer>,
    sync: Option<SyncWorker>,
    /// Document whose text is out with the sync worker.
    syncing: Option<DocumentId>,
}

impl Session {
    pub fn new(config: RcConfig) -> Self {
        let (events_tx, events_rx) = unbounded();
        Self {
            config,
            buffers: Vec::new(),
            current_buffer: None,
            next_id: 0,
            events_tx,
            events_rx,
            autosave: None,
            sync: None,
            syncing: None,
        }
    }

    pub fn config(&self) -> &RcConfig {
        &self.config
    }

    // Documents

    /// Opens `path` and makes it current. A file that is already open is
    /// switched to instead. Returns whether the file could be read; an
    /// unreadable file still gets an (unsaveable) empty document.
    pub fn open_file(&mut self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        if let Some(index) = self
            .buffers
            .iter()
            .position(|b| b.document.filename() == Some(path))
        {
            self.current_buffer = Some(index);
            return true;
        }

        let document = Document::open(PathBuf::from(path), &self.config);
        let opened = document.is_open();
        self.add_buffer(document);
        opened
    }

    pub fn new_document(&mut self) -> DocumentId {
        let document = Document::new(&self.config);
        self.add_buffer(document)
    }

    fn add_buffer(&mut self, document: Document) -> DocumentId {
        let id = DocumentId(self.next_id);
        self.next_id += 1;
        self.buffers.push(Buffer { id, document });
        self.current_buffer = Some(self.buffers.len() - 1);
        id
    }

    /// Closes a document (the current one by default). A sync in flight for
    /// it is cancelled and its result discarded.
    pub fn close_file(&mut self, id: Option<DocumentId>) -> bool {
        let Some(index) = self.resolve(id) else {
            return false;
        };
        let closed = self.buffers.remove(index);
        log::info!("closed {}", closed.document.display_name());

        if self.syncing == Some(closed.id) {
            if let Some(sync) = &self.sync {
                sync.cancel();
            }
        }

        self.current_buffer = match self.current_buffer {
            _ if self.buffers.is_empty() => None,
            Some(current) if current > index => Some(current - 1),
            Some(current) => Some(current.min(self.buffers.len() - 1)),
            None => None,
        };
        true
    }

    pub fn switch_to(&mut self, id: DocumentId) -> bool {
        match self.index_of(id) {
            Some(index) => {
                self.current_buffer = Some(index);
                true
            }
            None => false,
        }
    }

    pub fn current_id(&self) -> Option<DocumentId> {
        self.current_buffer.map(|index| self.buffers[index].id)
    }

    pub fn current_document(&self) -> Option<&Document> {
        self.current_buffer.map(|index| &self.buffers[index].document)
    }

    pub fn current_document_mut(&mut self) -> Option<&mut Document> {
        self.current_buffer
            .map(|index| &mut self.buffers[index].document)
    }

    pub fn document(&self, id: DocumentId) -> Option<&Document> {
        self.index_of(id).map(|index| &self.buffers[index].document)
    }

    pub fn document_ids(&self) -> Vec<DocumentId> {
        self.buffers.iter().map(|b| b.id).collect()
    }

    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// One line per buffer, numbered from 1 in list order.
    pub fn list_buffers(&self) -> String {
        self.buffers
            .iter()
            .enumerate()
            .map(|(i, buffer)| {
                let indicator = if Some(i) == self.current_buffer { "%" } else { " " };
                let modified = if buffer.document.is_modified() { " +" } else { "" };
                format!(
                    "{indicator}{} \"{}\"{modified}",
                    i + 1,
                    buffer.document.display_name()
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Saves a document (the current one by default).
    pub fn save_file(&mut self, id: Option<DocumentId>) -> bool {
        match self.resolve(id) {
            Some(index) => self.buffers[index].document.write(),
            None => false,
        }
    }

    /// Routes one typed character to the current document. Line breaks split
    /// the line, backspace deletes, tab and printable characters insert.
    /// Other control characters are ignored.
    pub fn process_character(&mut self, ch: char) -> bool {
        let Some(document) = self.current_document_mut() else {
            return false;
        };
        match ch {
            '\r' | '\n' => document.new_line(None, None),
            '\u{8}' | '\u{7f}' => document.delete_character(None, None),
            '\t' => document.insert_character(ch, None, None),
            _ if ch.is_control() => false,
            _ => document.insert_character(ch, None, None),
        }
    }

    fn index_of(&self, id: DocumentId) -> Option<usize> {
        self.buffers.iter().position(|b| b.id == id)
    }

    fn resolve(&self, id: Option<DocumentId>) -> Option<usize> {
        match id {
            Some(id) => self.index_of(id),
            None => self.current_buffer,
        }
    }

    // Sync

    /// Connects to the peer named in the configuration.
    pub fn connect_sync(&mut self) -> Result<bool, SyncError> {
        let Some(server) = self.config.sync_server.clone() else {
            return Ok(false);
        };
        let options = SyncOptions::from_config(&self.config);
        let client = SyncClient::connect(&server, self.config.sync_port, options)?;
        self.attach_sync(client);
        Ok(true)
    }

    /// Hands a connected client to a new sync worker, replacing any previous
    /// one.
    pub fn attach_sync(&mut self, client: SyncClient) {
        self.sync = Some(SyncWorker::start(client, self.events_tx.clone()));
        self.syncing = None;
    }

    pub fn sync_client(&self) -> Option<&SyncClient> {
        self.sync.as_ref().map(SyncWorker::client)
    }

    pub fn is_syncing(&self) -> bool {
        self.syncing.is_some()
    }

    /// Sends the current document to the peer now. Returns false when there
    /// is no peer, no document, or a sync is already in flight.
    pub fn request_sync(&mut self) -> bool {
        let Some(sync) = &self.sync else {
            return false;
        };
        let Some(index) = self.current_buffer else {
            return false;
        };
        if let Some(pending) = self.syncing {
            log::debug!("sync skipped: {pending} is still syncing");
            return false;
        }

        let buffer = &self.buffers[index];
        let request = SyncRequest {
            document: buffer.id,
            revision: buffer.document.revision(),
            text: buffer.document.text(),
        };
        if !sync.offer(request) {
            return false;
        }
        self.syncing = Some(buffer.id);
        true
    }

    // Autosave

    /// Starts (or restarts) the autosave timer.
    pub fn begin_autosave(&mut self, interval: Duration) {
        self.autosave = None;
        self.autosave = Some(AutosaveTimer::start(interval, self.events_tx.clone()));
    }

    pub fn end_autosave(&mut self) {
        self.autosave = None;
    }

    pub fn is_autosaving(&self) -> bool {
        self.autosave.is_some()
    }

    // Events

    /// Handles every queued event without blocking. Returns how many were
    /// handled.
    pub fn process_events(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    /// Waits up to `timeout` for an event, then handles everything queued.
    pub fn wait_for_events(&mut self, timeout: Duration) -> usize {
        match self.events_rx.recv_timeout(timeout) {
            Ok(event) => {
                self.handle_event(event);
                1 + self.process_events()
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => 0,
        }
    }

    fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::AutosaveTick => {
                if self.sync.is_some() {
                    self.request_sync();
                }
            }
            SessionEvent::SyncCompleted {
                document,
                pushed_revision,
                result,
            } => self.finish_sync(document, pushed_revision, result),
        }
    }

    fn finish_sync(
        &mut self,
        id: DocumentId,
        pushed_revision: u64,
        result: Result<PullOutcome, SyncError>,
    ) {
        if self.syncing == Some(id) {
            self.syncing = None;
        }
        let Some(index) = self.index_of(id) else {
            log::debug!("discarding sync result for closed document {id}");
            return;
        };

        let snapshot = match result {
            Ok(PullOutcome::Fetched(snapshot)) => snapshot,
            Ok(PullOutcome::Skipped) => {
                log::debug!("sync of {id} skipped by the client");
                return;
            }
            Err(e) => {
                log::warn!("sync of {id} failed: {e}");
                return;
            }
        };

        let policy = self.config.reconcile;
        let document = &mut self.buffers[index].document;
        if !policy.accepts(pushed_revision, document.revision()) {
            log::warn!(
                "conflict: {} changed since revision {pushed_revision}, remote version {} not applied",
                document.display_name(),
                snapshot.version
            );
            return;
        }
        if document.replace_all_text(&snapshot.text) {
            log::info!(
                "applied remote version {} to {}",
                snapshot.version,
                document.display_name()
            );
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.end_autosave();
        self.sync = None;
    }
}
