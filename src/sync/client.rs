use super::protocol::{FRAME_TERMINATOR, ProtocolError, RemoteSnapshot};
use crate::config::RcConfig;
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Longest single blocking read; the cancel flag is checked between reads.
const POLL_SLICE: Duration = Duration::from_millis(50);
const READ_CHUNK: usize = 4096;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("could not connect to {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("socket error: {0}")]
    Io(#[from] io::Error),

    #[error("no complete snapshot within {0:?}")]
    Timeout(Duration),

    #[error("pull was cancelled")]
    Cancelled,

    #[error("peer closed the connection")]
    Disconnected,

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullOutcome {
    /// Another exchange was in flight; nothing was read.
    Skipped,
    Fetched(RemoteSnapshot),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl SyncOptions {
    pub fn from_config(config: &RcConfig) -> Self {
        Self {
            read_timeout: Duration::from_millis(config.sync_timeout_ms),
            ..Self::default()
        }
    }
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(5),
        }
    }
}

struct FrameReader {
    stream: TcpStream,
    /// Bytes received but not yet consumed as a frame.
    pending: Vec<u8>,
}

/// Marks an exchange as running; dropping it ends the exchange and discards
/// any cancel request aimed at it.
struct InFlight<'a> {
    in_flight: &'a AtomicBool,
    cancel: &'a AtomicBool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.cancel.store(false, Ordering::Release);
        self.in_flight.store(false, Ordering::Release);
    }
}

/// One persistent connection to the sync peer.
///
/// The client is shared between threads behind an `Arc`. At most one
/// exchange runs at a time; callers arriving while one is in flight get
/// `PullOutcome::Skipped` instead of blocking.
pub struct SyncClient {
    peer: SocketAddr,
    writer: Mutex<TcpStream>,
    reader: Mutex<FrameReader>,
    version: AtomicU64,
    in_flight: AtomicBool,
    cancel: AtomicBool,
    read_timeout: Duration,
}

impl SyncClient {
    pub fn connect(address: &str, port: u16, options: SyncOptions) -> Result<Self, SyncError> {
        let connect_error = |source: io::Error| SyncError::Connect {
            address: format!("{address}:{port}"),
            source,
        };

        let mut last_error = None;
        for peer in (address, port).to_socket_addrs().map_err(connect_error)? {
            match TcpStream::connect_timeout(&peer, options.connect_timeout) {
                Ok(stream) => {
                    log::info!("connected to sync peer {peer}");
                    return Self::from_stream(stream, options.read_timeout).map_err(connect_error);
                }
                Err(e) => {
                    log::debug!("connection to {peer} failed: {e}");
                    last_error = Some(e);
                }
            }
        }

        Err(connect_error(last_error.unwrap_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "address resolved to nothing")
        })))
    }

    fn from_stream(stream: TcpStream, read_timeout: Duration) -> io::Result<Self> {
        stream.set_nodelay(true)?;
        let peer = stream.peer_addr()?;
        let writer = stream.try_clone()?;
        Ok(Self {
            peer,
            writer: Mutex::new(writer),
            reader: Mutex::new(FrameReader {
                stream,
                pending: Vec::new(),
            }),
            version: AtomicU64::new(0),
            in_flight: AtomicBool::new(false),
            cancel: AtomicBool::new(false),
            read_timeout,
        })
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// One more than the version of the last snapshot pulled, 0 before any.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    pub fn is_exchanging(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Sends the local text. There is no acknowledgement.
    pub fn push(&self, local_text: &str) -> Result<(), SyncError> {
        let frame = RemoteSnapshot::outgoing(local_text)?;
        let mut writer = lock(&self.writer);
        writer.write_all(&frame)?;
        writer.flush()?;
        log::debug!("pushed {} bytes to {}", frame.len(), self.peer);
        Ok(())
    }

    /// Reads the next snapshot from the peer.
    pub fn pull(&self) -> Result<PullOutcome, SyncError> {
        let Some(_guard) = self.begin() else {
            log::debug!("pull skipped: exchange already in flight");
            return Ok(PullOutcome::Skipped);
        };
        self.read_snapshot().map(PullOutcome::Fetched)
    }

    /// Pushes `local_text` and pulls the peer's reply without letting another
    /// exchange run in between.
    pub fn exchange(&self, local_text: &str) -> Result<PullOutcome, SyncError> {
        let Some(_guard) = self.begin() else {
            log::debug!("exchange skipped: another one is in flight");
            return Ok(PullOutcome::Skipped);
        };
        self.push(local_text)?;
        self.read_snapshot().map(PullOutcome::Fetched)
    }

    /// Makes a pull that is waiting for data return `SyncError::Cancelled`.
    /// Has no effect when nothing is in flight.
    pub fn cancel_pull(&self) {
        if self.is_exchanging() {
            self.cancel.store(true, Ordering::Release);
        }
    }

    fn begin(&self) -> Option<InFlight<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        // Drop a cancel left over from the previous exchange
        self.cancel.store(false, Ordering::Release);
        Some(InFlight {
            in_flight: &self.in_flight,
            cancel: &self.cancel,
        })
    }

    fn read_snapshot(&self) -> Result<RemoteSnapshot, SyncError> {
        let mut reader = lock(&self.reader);
        let deadline = Instant::now() + self.read_timeout;
        let mut chunk = [0u8; READ_CHUNK];

        let frame = loop {
            if let Some(end) = reader.pending.iter().position(|&b| b == FRAME_TERMINATOR) {
                let mut frame: Vec<u8> = reader.pending.drain(..=end).collect();
                frame.pop();
                break frame;
            }

            if self.cancel.swap(false, Ordering::AcqRel) {
                return Err(SyncError::Cancelled);
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(SyncError::Timeout(self.read_timeout));
            }

            reader
                .stream
                .set_read_timeout(Some((deadline - now).min(POLL_SLICE)))?;
            match reader.stream.read(&mut chunk) {
                Ok(0) if reader.pending.is_empty() => return Err(SyncError::Disconnected),
                Ok(0) => {
                    // Peer closed after an unterminated frame
                    break std::mem::take(&mut reader.pending);
                }
                Ok(n) => reader.pending.extend_from_slice(&chunk[..n]),
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::WouldBlock
                            | io::ErrorKind::TimedOut
                            | io::ErrorKind::Interrupted
                    ) => {}
                Err(e) => return Err(e.into()),
            }
        };

        let snapshot = RemoteSnapshot::parse(&frame)?;
        self.version
            .store(snapshot.version.saturating_add(1), Ordering::Release);
        log::debug!(
            "pulled version {} ({} bytes) from {}",
            snapshot.version,
            frame.len(),
            self.peer
        );
        Ok(snapshot)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
