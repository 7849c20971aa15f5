use crate::types::{ActorId, ObjectId};
use serde::{Deserialize, Serialize};

/// Fire-and-forget world events delivered to the director. Damage, death,
/// chat and command intake return verdicts and therefore arrive through
/// dedicated director methods instead.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum WorldEvent {
    Connected { actor: ActorId },
    Disconnected { actor: ActorId },
    EnteredZone { actor: ActorId, zone: String },
    ExitedZone { actor: ActorId, zone: String },
    TriggerEntered { actor: ActorId, trigger: String },
    /// A tracked world object (hostile, drop) was destroyed, possibly by a
    /// participant.
    ObjectDestroyed {
        object: ObjectId,
        by: Option<ActorId>,
    },
}

/// What the world should do with an incoming damage hit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DamageVerdict {
    /// Zero out the damage entirely.
    Blocked,
    /// Apply the damage scaled by the given modifier.
    Scaled(f32),
    /// Not an event participant; the engine has no opinion.
    Unchanged,
}

/// Whether a console/chat command from a participant may run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandVerdict {
    Allow,
    Deny,
}
