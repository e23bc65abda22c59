use super::session_controller::SessionEvent;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Periodic timer that posts `SessionEvent::AutosaveTick` into the session
/// queue. Dropping the timer stops its thread.
pub struct AutosaveTimer {
    interval: Duration,
    stop_tx: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl AutosaveTimer {
    pub fn start(interval: Duration, events: Sender<SessionEvent>) -> Self {
        let (stop_tx, stop_rx) = bounded(1);
        let handle = spawn_timer_thread(interval, events, stop_rx);
        log::debug!("autosave every {interval:?}");
        Self {
            interval,
            stop_tx,
            handle: Some(handle),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Drop for AutosaveTimer {
    fn drop(&mut self) {
        let _ = self.stop_tx.try_send(());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("autosave timer thread panicked");
            }
        }
        log::debug!("autosave stopped");
    }
}

fn spawn_timer_thread(
    interval: Duration,
    events: Sender<SessionEvent>,
    stop_rx: Receiver<()>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        loop {
            // Waiting on the stop channel doubles as the tick delay
            match stop_rx.recv_timeout(interval) {
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {
                    if events.send(SessionEvent::AutosaveTick).is_err() {
                        break; // Session is gone
                    }
                }
            }
        }
    })
}
