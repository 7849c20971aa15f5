pub mod deathmatch;
pub mod elimination;
pub mod gun_game;
pub mod horde;
pub mod slasher;

pub use deathmatch::{DeathmatchMode, DeathmatchSettings};
pub use elimination::EliminationMode;
pub use gun_game::{GunGameMode, GunGameSettings};
pub use horde::HordeMode;
pub use slasher::SlasherMode;

use arena_engine::EventDirector;

/// Register every shipped mode under its canonical id.
pub fn register_all(director: &mut EventDirector) {
    director.register_mode("deathmatch", Box::new(DeathmatchMode::solo()));
    director.register_mode("team_deathmatch", Box::new(DeathmatchMode::teams()));
    director.register_mode("elimination", Box::new(EliminationMode::new()));
    director.register_mode("gun_game", Box::new(GunGameMode::new()));
    director.register_mode("slasher", Box::new(SlasherMode::new()));
    director.register_mode("horde", Box::new(HordeMode::new()));
}
