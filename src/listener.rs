use std::{any::Any, sync::Arc};

/// Bound for payloads carried by an [`EventSwitch`](crate::EventSwitch).
///
/// The switch never looks inside a payload; it only hands a reference to
/// every matching listener. Payloads must be `Send + Sync + 'static` because
/// publishers and listeners live on arbitrary threads, and detached delivery
/// shares one payload between blocking tasks.
///
/// Implemented for every type that satisfies the bounds.
pub trait EventData: Send + Sync + 'static {}

impl<T: Send + Sync + 'static> EventData for T {}

/// Dynamically typed payload, for switches shared by components that don't
/// agree on a single payload type. Listeners recover the concrete value with
/// `downcast_ref`.
pub type AnyData = Arc<dyn Any + Send + Sync>;

/// Callback invoked once per matching `fire_event`.
///
/// Any `Fn(&D) + Send + Sync + 'static` closure is a listener, so most
/// callers never implement this trait directly. Implement it on a struct when
/// the callback owns state worth naming.
///
/// A listener may do arbitrary work, including blocking and re-entering the
/// switch (subscribing, unsubscribing, or firing other events). The registry
/// lock is never held while a listener runs. Blocking delays only the
/// publisher that triggered the call.
pub trait Listener<D>: Send + Sync + 'static {
    fn on_event(&self, data: &D);
}

impl<D, F> Listener<D> for F
where
    F: Fn(&D) + Send + Sync + 'static,
{
    fn on_event(&self, data: &D) {
        self(data)
    }
}
