use serde::{Deserialize, Serialize};

/// Identifies a connected actor (player) in the host world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(pub u64);

/// Identifies a temporary world object the engine spawned and must clean up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub u64);

/// Side of a team match. Non-team modes keep every session on `Team::None`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    A,
    B,
    #[default]
    None,
}

impl Team {
    /// The opposing side, for the two real teams.
    pub fn other(self) -> Team {
        match self {
            Team::A => Team::B,
            Team::B => Team::A,
            Team::None => Team::None,
        }
    }
}

/// Lifecycle status of an event instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventStatus {
    Open,
    Prestarting,
    Started,
    Finished,
}

/// What a participant leaves behind when they die.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropPolicy {
    #[default]
    Nothing,
    Ammo,
    Backpack,
    Corpse,
    Weapon,
}

/// Currency backend used when paying out kill/win rewards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RewardKind {
    Points,
    Currency,
    #[default]
    Scrap,
}

/// World coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Description of a single damage hit, delivered with damage/death events.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DamageInfo {
    pub amount: f32,
    pub weapon: Option<String>,
    pub headshot: bool,
    pub melee: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn team_other_flips_sides() {
        assert_eq!(Team::A.other(), Team::B);
        assert_eq!(Team::B.other(), Team::A);
        assert_eq!(Team::None.other(), Team::None);
    }
}
