//! Trailing-edge debouncer on a timer thread.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use crate::error::RecomputeError;

enum DebounceInput<T> {
    Push(T),
    Flush,
}

/// Coalesces bursts of values. A value reaches the sink once no newer value
/// has been pushed for the quiet interval; superseded values are dropped.
///
/// Dropping the debouncer delivers any value still waiting.
pub struct Debouncer<T> {
    inbox: Sender<DebounceInput<T>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn spawn<S>(interval: Duration, mut sink: S) -> Result<Self, RecomputeError>
    where
        S: FnMut(T) + Send + 'static,
    {
        let (inbox, rx) = mpsc::channel::<DebounceInput<T>>();

        thread::Builder::new()
            .name("debouncer".into())
            .spawn(move || {
                let mut waiting: Option<T> = None;
                loop {
                    let next = if waiting.is_some() {
                        rx.recv_timeout(interval)
                    } else {
                        rx.recv().map_err(|_| RecvTimeoutError::Disconnected)
                    };

                    match next {
                        Ok(DebounceInput::Push(value)) => waiting = Some(value),
                        Ok(DebounceInput::Flush) | Err(RecvTimeoutError::Timeout) => {
                            if let Some(value) = waiting.take() {
                                sink(value);
                            }
                        }
                        Err(RecvTimeoutError::Disconnected) => {
                            if let Some(value) = waiting.take() {
                                sink(value);
                            }
                            break;
                        }
                    }
                }
            })?;

        Ok(Self { inbox })
    }
}

impl<T> Debouncer<T> {
    /// Replace the waiting value and restart the quiet interval.
    pub fn push(&self, value: T) {
        if self.inbox.send(DebounceInput::Push(value)).is_err() {
            tracing::warn!("debouncer thread gone, value dropped");
        }
    }

    /// Deliver the waiting value now, if any.
    pub fn flush(&self) {
        let _ = self.inbox.send(DebounceInput::Flush);
    }
}
