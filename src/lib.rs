//! Event Switch - in-process publish/subscribe dispatcher
//!
//! Named events carry a payload to every listener subscribed to them.
//! Components of a larger system (consensus, networking, RPC) use it to
//! observe each other's state transitions without depending on each other.
//!
//! Delivery is synchronous: [`EventSwitch::fire_event`] calls every matching
//! listener on the publisher's thread, in subscription order, and returns
//! when the last one does. [`EventSwitch::spawn_event`] is the detached
//! alternative for listeners that may block.
//!
//! There is no persistence, no queueing, and no delivery guarantee beyond
//! "every listener subscribed when the event was fired gets called once".
//!
//! See `demos/node.rs`.

mod config;
mod delivery;
mod error;
mod event_switch;
mod ids;
mod listener;
mod service;

mod internal;

pub use config::Config;
pub use delivery::Delivery;
pub use error::Error;
pub use event_switch::{EventSwitch, SwitchState};
pub use ids::{EventName, ListenerId};
pub use listener::{AnyData, EventData, Listener};
pub use service::{Fireable, Service};

pub type Result<T = ()> = std::result::Result<T, Error>;

pub mod prelude {
    pub use crate::error::Error as EventSwitchError;
    pub use crate::event_switch::EventSwitch;
    pub use crate::ids::{EventName, ListenerId};
    pub use crate::listener::{AnyData, Listener};
    pub use crate::service::{Fireable, Service};
}
