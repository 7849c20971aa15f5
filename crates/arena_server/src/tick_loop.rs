use crate::server::ArenaServer;
use tokio::time::{interval, MissedTickBehavior};

/// Drive the director until shutdown is requested. One interval tick is
/// one engine second; missed ticks are skipped rather than bursted.
pub async fn run_tick_loop(server: ArenaServer) {
    let mut interval = interval(server.tick_interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        interval.tick().await;

        if server.should_shutdown() {
            break;
        }

        server.tick().await;
    }
}

/// Spawn the tick loop as a tokio task.
pub fn spawn_tick_loop(server: ArenaServer) -> tokio::task::JoinHandle<()> {
    tokio::spawn(run_tick_loop(server))
}
