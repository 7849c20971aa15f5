use std::fmt;

/// Error when opening a named event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenError {
    /// No stored config with that name.
    UnknownEvent,
    /// The stored config is disabled.
    Disabled,
    /// No strategy registered for the config's mode id.
    UnknownMode(String),
    /// The config failed validation; carries the human-readable reason.
    Invalid(String),
}

impl fmt::Display for OpenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpenError::UnknownEvent => write!(f, "no event with the specified name"),
            OpenError::Disabled => write!(f, "the event is disabled"),
            OpenError::UnknownMode(mode) => {
                write!(f, "no strategy registered for game mode: {mode}")
            }
            OpenError::Invalid(reason) => write!(f, "config validation failed: {reason}"),
        }
    }
}

impl std::error::Error for OpenError {}

/// Error when joining an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinError {
    /// No active instance with that name.
    NotOpen,
    /// The actor already has a session in some event.
    AlreadyInEvent,
    /// The event requires a permission the actor lacks.
    NoPermission,
    /// The instance rejected the join; carries the reason.
    Rejected(String),
}

impl fmt::Display for JoinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinError::NotOpen => write!(f, "the event is not open"),
            JoinError::AlreadyInEvent => write!(f, "already taking part in an event"),
            JoinError::NoPermission => write!(f, "missing the permission for this event"),
            JoinError::Rejected(reason) => write!(f, "{reason}"),
        }
    }
}

impl std::error::Error for JoinError {}

/// Error when managing physical entry triggers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerError {
    /// The trigger must be bound to an active event.
    UnknownEvent,
}

impl fmt::Display for TriggerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerError::UnknownEvent => write!(f, "no active event with the specified name"),
        }
    }
}

impl std::error::Error for TriggerError {}
