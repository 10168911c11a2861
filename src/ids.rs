use std::{fmt, ops::Deref, sync::Arc};

macro_rules! string_key {
    ($(#[$attr:meta])* $name:ident) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(Arc<str>);

        impl $name {
            /// Returns the key as a string slice.
            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl Deref for $name {
            type Target = str;
            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(Arc::from(value))
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(Arc::from(value))
            }
        }

        impl From<Arc<str>> for $name {
            fn from(value: Arc<str>) -> Self {
                Self(value)
            }
        }

        impl From<&$name> for $name {
            fn from(value: &$name) -> Self {
                value.clone()
            }
        }
    };
}

string_key! {
    /// Caller-chosen name of a subscriber.
    ///
    /// Keys are compared by value, so two ids built from the same string refer
    /// to the same listener. One key usually names one logical subscriber
    /// across many events, which is what makes
    /// [`EventSwitch::remove_listener`](crate::EventSwitch::remove_listener)
    /// useful as a teardown path.
    ///
    /// Cloning is cheap (`Arc<str>`).
    ListenerId
}

string_key! {
    /// Routing key under which payloads are published and listeners subscribe.
    ///
    /// There is no predefined set of names; an event exists as soon as someone
    /// subscribes to it.
    EventName
}
