pub mod config;
pub mod outbound;
pub mod providers;
pub mod score;
pub mod types;
pub mod world;

pub use config::{EventConfig, EventParameter, ParamKind, ParamValue, RewardConfig, TeamConfig};
pub use outbound::{Audience, Broadcast, Notice, WorldCommand};
pub use providers::{ActorProvider, KitProvider, Providers, SpawnProvider, ZoneProvider};
pub use score::{EventResults, ScoreEntry};
pub use types::{ActorId, DamageInfo, DropPolicy, EventStatus, ObjectId, Position, RewardKind, Team};
pub use world::{CommandVerdict, DamageVerdict, WorldEvent};
