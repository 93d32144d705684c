//! Background poller
//!
//! One thread per initialized store, polling every interval until stopped.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, RecvTimeoutError, Sender};

use crate::error::Result;

use super::{Inner, Payload};

/// Handle on a running poll thread
pub(crate) struct Poller {
    shutdown: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl Poller {
    /// Start polling `inner` at its effective interval
    pub(crate) fn spawn<T: Payload>(inner: Arc<Inner<T>>) -> Result<Self> {
        let (shutdown, signal) = channel::bounded::<()>(1);
        let thread_name = format!("worsen-poll-{}", inner.config.name);

        let handle = thread::Builder::new().name(thread_name).spawn(move || loop {
            // Re-read each round so an interval set by `init` is honored
            match signal.recv_timeout(inner.polling_interval()) {
                Err(RecvTimeoutError::Timeout) => inner.poll(None),
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        })?;

        Ok(Self {
            shutdown,
            handle: Some(handle),
        })
    }

    /// Signal the thread and wait for it to exit
    pub(crate) fn stop(mut self) {
        self.join();
    }

    fn join(&mut self) {
        let _ = self.shutdown.try_send(());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("Poll thread panicked");
            }
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.join();
    }
}
