use crate::types::{ActorId, DropPolicy, EventStatus, ObjectId, Position, RewardKind, Team};
use serde::{Deserialize, Serialize};

/// A world mutation the engine requests from its host. The engine never
/// touches the world directly; every effect crosses this boundary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum WorldCommand {
    Teleport {
        actor: ActorId,
        position: Position,
        sleep: bool,
    },
    StripInventory {
        actor: ActorId,
    },
    /// Restore health/metabolism to defaults.
    ResetVitals {
        actor: ActorId,
    },
    LockClothing {
        actor: ActorId,
    },
    UnlockClothing {
        actor: ActorId,
    },
    IssueKit {
        actor: ActorId,
        kit: String,
    },
    GiveItem {
        actor: ActorId,
        item: String,
        amount: u32,
    },
    RemoveItem {
        actor: ActorId,
        item: String,
    },
    /// Record the actor's pre-match state with the restore collaborator.
    SnapshotActor {
        actor: ActorId,
    },
    /// Restore the actor's pre-match state.
    RestoreActor {
        actor: ActorId,
    },
    AddZoneWhitelist {
        zone: String,
        actor: ActorId,
    },
    RemoveZoneWhitelist {
        zone: String,
        actor: ActorId,
    },
    /// Toggle ejection of non-participants from the event zone.
    SetZoneEject {
        zone: String,
        enabled: bool,
    },
    GrantReward {
        actor: ActorId,
        kind: RewardKind,
        amount: u32,
    },
    CreateTeamGroup {
        group: u64,
        name: String,
    },
    /// Detach the actor from whatever native grouping they arrived with.
    DetachFromForeignGroup {
        actor: ActorId,
    },
    AddToTeamGroup {
        group: u64,
        actor: ActorId,
    },
    RemoveFromTeamGroup {
        group: u64,
        actor: ActorId,
    },
    DisbandTeamGroup {
        group: u64,
    },
    BeginSpectate {
        actor: ActorId,
    },
    EndSpectate {
        actor: ActorId,
    },
    SetSpectateTarget {
        actor: ActorId,
        target: Option<ActorId>,
    },
    /// Materialize a death drop; the engine tracks `object` for cleanup.
    SpawnDrop {
        object: ObjectId,
        actor: ActorId,
        policy: DropPolicy,
    },
    /// Spawn a mode-owned hostile; behavior/pathing belongs to the world.
    SpawnHostile {
        object: ObjectId,
        position: Position,
        kind: String,
        kit: Option<String>,
    },
    DestroyObject {
        object: ObjectId,
    },
}

/// Who a broadcast is addressed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Audience {
    /// Every connected actor in the world.
    All,
    /// Every participant (active and pending) of the emitting event.
    Event,
    Actor(ActorId),
    Team(Team),
}

/// A player-facing message the engine emits. Engine-level messages are
/// typed variants; mode-specific messages travel as `Custom` key + args.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Notice {
    PlayerJoined { name: String },
    PlayerLeft { name: String },
    JoinedAsSpectator,
    WaitingForPlayers { needed: u32 },
    RoundStartsIn { seconds: u32 },
    NextRoundStartsIn { round: u32, seconds: u32 },
    NextEventStartsIn { seconds: u32 },
    EventClosed,
    NotEnoughToStart,
    NotEnoughToContinue,
    EventFinished,
    KillFeed {
        victim: String,
        killer: Option<String>,
        out_of_bounds: bool,
    },
    EventWin { winners: Vec<String> },
    TeamWin { team: Team, color: String, name: String },
    TimerTick { remaining: u32, label: Option<String> },
    TimerCleared,
    ScoreboardChanged,
    StatusChanged { status: EventStatus },
    OutOfBounds { seconds: u32 },
    SpectateTarget { target: Option<String> },
    TeamChanged { team: Team },
    TeamsUnbalanced,
    SelectClass,
    CommandBlocked,
    Chat { from: String, message: String },
    TriggerInfo {
        event: String,
        mode: String,
        players: u32,
        capacity: u32,
        status: EventStatus,
    },
    Custom { key: String, args: Vec<String> },
}

/// A notice bound to its audience.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Broadcast {
    pub audience: Audience,
    pub notice: Notice,
}

impl Broadcast {
    pub fn event(notice: Notice) -> Self {
        Self {
            audience: Audience::Event,
            notice,
        }
    }

    pub fn actor(actor: ActorId, notice: Notice) -> Self {
        Self {
            audience: Audience::Actor(actor),
            notice,
        }
    }
}
