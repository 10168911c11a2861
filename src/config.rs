use std::time::Duration;

/// Runtime configuration for an [`EventSwitch`](crate::EventSwitch).
///
/// Controls how listener faults and slow listeners are treated during
/// fan-out. Use the builder methods to customize, or [`Default`] for the
/// reference behavior (panics propagate, no latency reporting).
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use event_switch::Config;
///
/// let config = Config::default()
///     .with_isolate_panics(true)                               // Keep delivering after a listener panics
///     .with_slow_listener_threshold(Duration::from_millis(50)); // Warn about slow callbacks
/// ```
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Run each callback under `catch_unwind` so that one faulting listener
    /// doesn't abort delivery to the listeners after it.
    /// Default: false (the panic unwinds into the publisher)
    pub isolate_panics: bool,

    /// Callbacks taking longer than this are reported with a `warn!` record
    /// once they return. The dispatcher never interrupts a callback.
    /// Default: None
    pub slow_listener_threshold: Option<Duration>,
}

impl Config {
    /// Enable or disable per-callback panic isolation.
    ///
    /// With isolation on, a panicking listener is logged and skipped, and the
    /// remaining listeners of the same `fire_event` call still run. The
    /// listener stays subscribed.
    pub fn with_isolate_panics(mut self, isolate: bool) -> Self {
        self.isolate_panics = isolate;
        self
    }

    /// Report callbacks that run longer than `threshold`.
    pub fn with_slow_listener_threshold(mut self, threshold: Duration) -> Self {
        self.slow_listener_threshold = Some(threshold);
        self
    }
}
