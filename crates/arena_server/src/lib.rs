pub mod server;
pub mod store;
pub mod tick_loop;

pub use server::ArenaServer;
pub use store::{EventStore, RestoreRecord, RestoreStore, StoreError};
pub use tick_loop::{run_tick_loop, spawn_tick_loop};
