use crate::{EventName, Result};

/// Lifecycle contract for components owned by a process supervisor.
///
/// `start` is a one-shot transition and `stop` is idempotent; misuse is
/// reported through the returned [`Result`], never by panicking.
pub trait Service {
    fn start(&self) -> Result<()>;
    fn stop(&self) -> Result<()>;
    fn is_running(&self) -> bool;
}

/// Anything events can be fired into.
///
/// Components that only publish should depend on `&dyn Fireable<D>` rather
/// than on the whole switch.
pub trait Fireable<D> {
    /// Deliver `data` to the listeners of `event`. Returns the number of
    /// listeners invoked.
    fn fire_event(&self, event: EventName, data: &D) -> usize;
}
