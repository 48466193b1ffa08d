use std::{
    sync::Arc,
    thread::JoinHandle,
    time::{Duration, Instant},
};

use crate::{format::FormatTime as _, relative::RelativeTime, time::TimePoint};

/// New content for the element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Update {
    pub text: String,
    pub tooltip: String,
}

enum Control {
    Datetime(String),
    Disconnect,
}

/// A displayed relative time that keeps itself current.
///
/// The text is recomputed on a background thread whenever it goes stale,
/// until the element is disconnected (or dropped).
pub struct Element {
    handle: Option<JoinHandle<()>>,
    control: flume::Sender<Control>,
    updates: flume::Receiver<Update>,
}

impl Element {
    pub fn connect(formatter: Arc<RelativeTime>, datetime: impl Into<String>) -> Self {
        Self::connect_with_clock(formatter, datetime, TimePoint::now)
    }

    pub fn connect_with_clock<C>(
        formatter: Arc<RelativeTime>,
        datetime: impl Into<String>,
        clock: C,
    ) -> Self
    where
        C: Fn() -> TimePoint + Send + 'static,
    {
        let (control, rx) = flume::unbounded();
        let (tx, updates) = flume::unbounded();

        let handle = std::thread::spawn({
            let datetime = datetime.into();
            move || Self::run(&formatter, datetime, clock, rx, tx)
        });

        Self {
            handle: Some(handle),
            control,
            updates,
        }
    }

    pub fn updates(&self) -> &flume::Receiver<Update> {
        &self.updates
    }

    /// Changes the datetime. The text is recomputed right away, the pending
    /// refresh stays as it was.
    pub fn set_datetime(&self, datetime: impl Into<String>) {
        _ = self.control.send(Control::Datetime(datetime.into()))
    }

    /// Cancels the pending refresh and stops the element. Calling this more
    /// than once does nothing.
    pub fn disconnect(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        _ = self.control.send(Control::Disconnect);
        if handle.join().is_err() {
            log::error!("relative time element panicked");
        }
    }

    pub const fn is_connected(&self) -> bool {
        self.handle.is_some()
    }

    fn run(
        formatter: &RelativeTime,
        mut datetime: String,
        clock: impl Fn() -> TimePoint,
        control: flume::Receiver<Control>,
        tx: flume::Sender<Update>,
    ) {
        let render = |datetime: &str| -> Option<Duration> {
            let out = formatter.format_attribute(Some(datetime), clock())?;
            log::debug!(
                "'{datetime}' is '{}', next refresh in {}",
                out.text,
                out.next.as_readable_time()
            );
            let next = out.next.unsigned_abs();
            _ = tx.send(Update {
                text: out.text,
                tooltip: out.tooltip,
            });
            Some(next)
        };

        let mut deadline = render(&datetime).and_then(|next| Instant::now().checked_add(next));

        loop {
            let msg = match deadline {
                Some(deadline) => control.recv_deadline(deadline),
                None => control
                    .recv()
                    .map_err(|_| flume::RecvTimeoutError::Disconnected),
            };

            match msg {
                Ok(Control::Datetime(new)) => {
                    if new != datetime {
                        datetime = new;
                        render(&datetime);
                    }
                }
                Err(flume::RecvTimeoutError::Timeout) => {
                    deadline = render(&datetime).and_then(|next| Instant::now().checked_add(next));
                }
                Ok(Control::Disconnect) | Err(flume::RecvTimeoutError::Disconnected) => break,
            }
        }
    }
}

impl Drop for Element {
    fn drop(&mut self) {
        self.disconnect()
    }
}
