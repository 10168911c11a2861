mod registry;

pub(crate) use registry::{ListenerRegistry, Subscription};
