use std::{
    fmt,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{
        Arc,
        atomic::{AtomicU8, Ordering},
    },
    time::{Duration, Instant},
};

use tokio::runtime::Handle;

use crate::{
    AnyData, Config, Delivery, Error, EventData, EventName, Fireable, Listener, ListenerId,
    Result, Service,
    internal::{ListenerRegistry, Subscription},
};

const CREATED: u8 = 0;
const RUNNING: u8 = 1;
const STOPPED: u8 = 2;

/// Lifecycle state of an [`EventSwitch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwitchState {
    Created,
    Running,
    Stopped,
}

impl SwitchState {
    fn from_raw(value: u8) -> Self {
        match value {
            CREATED => SwitchState::Created,
            RUNNING => SwitchState::Running,
            _ => SwitchState::Stopped,
        }
    }
}

/// Routes named events to the listeners subscribed to them.
///
/// - Subscribe with `add_listener_for_event(listener, event, callback)`.
/// - Publish with `fire_event(event, &data)`: every callback subscribed to
///   `event` runs synchronously, in subscription order, on the caller's thread.
/// - Tear a subscriber down with `remove_listener(listener)`.
/// - `start()` / `stop()` drive the lifecycle for a supervisor; see
///   [`Service`].
///
/// All operations take `&self`, so the switch is usually shared as
/// `Arc<EventSwitch<D>>`. Publishing never holds the registry lock while a
/// callback runs, so callbacks may subscribe, unsubscribe or fire events
/// themselves. A callback added while an event is being delivered only sees
/// later events, and one removed mid-delivery may still receive the event in
/// flight.
///
/// The lifecycle is not checked by subscribe or publish. Listeners added
/// before `start()` stay registered and receive events as usual.
///
/// # Examples
///
/// ```rust
/// use std::sync::{Arc, atomic::{AtomicU64, Ordering}};
/// use event_switch::EventSwitch;
///
/// let evsw = EventSwitch::<u64>::default();
/// evsw.start()?;
///
/// let height = Arc::new(AtomicU64::new(0));
/// let seen = height.clone();
/// evsw.add_listener_for_event("rpc", "NewBlock", move |h: &u64| {
///     seen.store(*h, Ordering::SeqCst);
/// });
///
/// assert_eq!(evsw.fire_event("NewBlock", &42), 1);
/// assert_eq!(height.load(Ordering::SeqCst), 42);
///
/// evsw.remove_listener("rpc");
/// assert_eq!(evsw.fire_event("NewBlock", &43), 0);
/// evsw.stop()?;
/// # Ok::<(), event_switch::Error>(())
/// ```
pub struct EventSwitch<D = AnyData> {
    config: Config,
    registry: ListenerRegistry<D>,
    state: AtomicU8,
}

impl<D: EventData> EventSwitch<D> {
    /// Create a switch with the given configuration. The switch starts in
    /// [`SwitchState::Created`] with no listeners.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            registry: ListenerRegistry::new(),
            state: AtomicU8::new(CREATED),
        }
    }

    /// Move from `Created` to `Running`.
    ///
    /// Fails with [`Error::AlreadyStarted`] if running, or
    /// [`Error::AlreadyStopped`] if stopped; a switch can't be restarted.
    pub fn start(&self) -> Result<()> {
        match self
            .state
            .compare_exchange(CREATED, RUNNING, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => {
                tracing::debug!("Event switch started");
                Ok(())
            }
            Err(RUNNING) => Err(Error::AlreadyStarted),
            Err(_) => Err(Error::AlreadyStopped),
        }
    }

    /// Move to `Stopped`. A switch that was never started can be stopped too.
    ///
    /// Listeners are left in place; there is nothing to join because
    /// delivery never leaves the publisher's thread. A second call returns
    /// [`Error::AlreadyStopped`] and changes nothing.
    pub fn stop(&self) -> Result<()> {
        match self.state.swap(STOPPED, Ordering::AcqRel) {
            STOPPED => Err(Error::AlreadyStopped),
            _ => {
                tracing::debug!("Event switch stopped");
                Ok(())
            }
        }
    }

    pub fn state(&self) -> SwitchState {
        SwitchState::from_raw(self.state.load(Ordering::Acquire))
    }

    pub fn is_running(&self) -> bool {
        self.state() == SwitchState::Running
    }

    /// Subscribe `listener` to `event`.
    ///
    /// If the pair is already subscribed, its callback is replaced and keeps
    /// its place in the delivery order.
    pub fn add_listener_for_event<L>(
        &self,
        listener: impl Into<ListenerId>,
        event: impl Into<EventName>,
        callback: L,
    ) where
        L: Listener<D>,
    {
        let (listener, event) = (listener.into(), event.into());
        let replaced = self
            .registry
            .subscribe(listener.clone(), event.clone(), Arc::new(callback));
        tracing::debug!(listener = %listener, event = %event, replaced, "Listener added");
    }

    /// Unsubscribe `listener` from `event`. Does nothing if it wasn't
    /// subscribed.
    pub fn remove_listener_for_event(
        &self,
        listener: impl Into<ListenerId>,
        event: impl Into<EventName>,
    ) {
        let (listener, event) = (listener.into(), event.into());
        if self.registry.unsubscribe(&listener, &event) {
            tracing::debug!(listener = %listener, event = %event, "Listener removed from event");
        }
    }

    /// Unsubscribe `listener` from every event at once.
    ///
    /// Events fired after this returns are not delivered to it. Deliveries
    /// already in progress on other threads may still reach it.
    pub fn remove_listener(&self, listener: impl Into<ListenerId>) {
        let listener = listener.into();
        let removed = self.registry.unsubscribe_all(&listener);
        if removed > 0 {
            tracing::debug!(listener = %listener, removed, "Listener removed");
        }
    }

    /// Deliver `data` to every listener of `event` and return how many were
    /// invoked.
    ///
    /// Callbacks run one after another on the calling thread, in subscription
    /// order, and this call returns once the last one does. The set of
    /// listeners is fixed when the call begins.
    ///
    /// # Panics
    ///
    /// A panicking callback unwinds through this call, skipping the listeners
    /// after it, unless [`Config::isolate_panics`] is set. The registry is
    /// unaffected either way.
    pub fn fire_event(&self, event: impl Into<EventName>, data: &D) -> usize {
        let event = event.into();
        let snapshot = self.registry.snapshot(&event);
        tracing::trace!(event = %event, listeners = snapshot.len(), "Firing event");
        for subscription in snapshot.iter() {
            self.invoke(&event, subscription, data);
        }
        snapshot.len()
    }

    /// Deliver `data` to every listener of `event` without waiting for them.
    ///
    /// The listener set is fixed exactly as in [`fire_event`](Self::fire_event),
    /// but each callback runs as its own task on Tokio's blocking pool, so
    /// there is no ordering between them and a slow listener holds up no one.
    /// Await [`Delivery::join`] to collect the outcome.
    ///
    /// Fails with [`Error::NoRuntime`] when called outside a Tokio runtime.
    pub fn spawn_event(&self, event: impl Into<EventName>, data: D) -> Result<Delivery> {
        let handle = Handle::try_current().map_err(|_| Error::NoRuntime)?;
        let event = event.into();
        let snapshot = self.registry.snapshot(&event);
        tracing::trace!(event = %event, listeners = snapshot.len(), "Spawning event");

        let data = Arc::new(data);
        let threshold = self.config.slow_listener_threshold;
        let tasks = snapshot
            .iter()
            .map(|subscription| {
                let Subscription { listener, callback } = subscription.clone();
                let (event, data) = (event.clone(), data.clone());
                handle.spawn_blocking(move || {
                    let started = Instant::now();
                    callback.on_event(&data);
                    report_if_slow(threshold, started, &listener, &event);
                })
            })
            .collect();
        Ok(Delivery::new(event, tasks))
    }

    /// Number of listeners currently subscribed to `event`.
    pub fn listener_count(&self, event: impl Into<EventName>) -> usize {
        self.registry.listener_count(&event.into())
    }

    /// Events `listener` is subscribed to, sorted by name.
    pub fn events_of(&self, listener: impl Into<ListenerId>) -> Vec<EventName> {
        self.registry.events_of(&listener.into())
    }

    /// Events with at least one listener, sorted by name.
    pub fn event_names(&self) -> Vec<EventName> {
        self.registry.event_names()
    }

    pub fn is_subscribed(
        &self,
        listener: impl Into<ListenerId>,
        event: impl Into<EventName>,
    ) -> bool {
        self.registry.is_subscribed(&listener.into(), &event.into())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn invoke(&self, event: &EventName, subscription: &Subscription<D>, data: &D) {
        let started = Instant::now();
        if self.config.isolate_panics {
            let result = catch_unwind(AssertUnwindSafe(|| subscription.callback.on_event(data)));
            if result.is_err() {
                tracing::error!(
                    listener = %subscription.listener,
                    event = %event,
                    "Listener panicked, continuing delivery"
                );
            }
        } else {
            subscription.callback.on_event(data);
        }

        report_if_slow(
            self.config.slow_listener_threshold,
            started,
            &subscription.listener,
            event,
        );
    }
}

fn report_if_slow(
    threshold: Option<Duration>,
    started: Instant,
    listener: &ListenerId,
    event: &EventName,
) {
    let Some(threshold) = threshold else {
        return;
    };
    let elapsed = started.elapsed();
    if elapsed > threshold {
        tracing::warn!(listener = %listener, event = %event, ?elapsed, "Slow listener");
    }
}

impl<D: EventData> Default for EventSwitch<D> {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl<D: EventData> Service for EventSwitch<D> {
    fn start(&self) -> Result<()> {
        EventSwitch::start(self)
    }

    fn stop(&self) -> Result<()> {
        EventSwitch::stop(self)
    }

    fn is_running(&self) -> bool {
        EventSwitch::is_running(self)
    }
}

impl<D: EventData> Fireable<D> for EventSwitch<D> {
    fn fire_event(&self, event: EventName, data: &D) -> usize {
        EventSwitch::fire_event(self, event, data)
    }
}

impl<D> fmt::Debug for EventSwitch<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSwitch")
            .field("state", &SwitchState::from_raw(self.state.load(Ordering::Acquire)))
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
