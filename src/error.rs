use crate::EventName;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Event switch has already started.")]
    AlreadyStarted,

    #[error("Event switch has already stopped.")]
    AlreadyStopped,

    #[error("Detached delivery requires a running Tokio runtime.")]
    NoRuntime,

    #[error("Listener panicked while handling event '{0}'")]
    ListenerPanicked(EventName),

    #[error("Delivery task join error: {0}")]
    JoinError(#[from] tokio::task::JoinError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            Error::AlreadyStarted.to_string(),
            "Event switch has already started."
        );
        assert_eq!(
            Error::ListenerPanicked(EventName::from("NewBlock")).to_string(),
            "Listener panicked while handling event 'NewBlock'"
        );
    }
}
