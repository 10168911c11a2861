use tokio::task::JoinHandle;

use crate::{Error, EventName, Result};

/// Handle to a detached fan-out started by
/// [`EventSwitch::spawn_event`](crate::EventSwitch::spawn_event).
///
/// Every listener captured in the snapshot runs on Tokio's blocking pool,
/// independently of the others. Dropping the handle detaches the tasks: every
/// listener still runs, but the outcome is lost.
#[derive(Debug)]
pub struct Delivery {
    event: EventName,
    tasks: Vec<JoinHandle<()>>,
}

impl Delivery {
    pub(crate) fn new(event: EventName, tasks: Vec<JoinHandle<()>>) -> Self {
        Self { event, tasks }
    }

    /// Event being delivered.
    pub fn event(&self) -> &EventName {
        &self.event
    }

    /// Number of listener invocations spawned and not yet joined.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Wait for every listener to return.
    ///
    /// All invocations are awaited even when some fail; the first failure is
    /// returned. A panicking listener is reported as
    /// [`Error::ListenerPanicked`].
    pub async fn join(self) -> Result<()> {
        let mut result = Ok(());
        for task in self.tasks {
            let Err(e) = task.await else {
                continue;
            };
            let err = if e.is_panic() {
                tracing::error!(event = %self.event, "Listener panicked during detached delivery");
                Error::ListenerPanicked(self.event.clone())
            } else {
                Error::from(e)
            };
            if result.is_ok() {
                result = Err(err);
            }
        }
        result
    }
}
