use arena_core::{
    ActorId, CommandVerdict, DamageInfo, DamageVerdict, EventConfig, EventStatus, Team,
    WorldCommand, WorldEvent,
};
use arena_engine::{
    EventDirector, EventInfo, JoinError, NoticeCursor, OpenError, OpenOutcome, PostedBroadcast,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Async facade over the single-threaded director: one lock, one logical
/// tick, driven by the tick loop. Cloning shares the same director.
pub struct ArenaServer {
    director: Arc<Mutex<EventDirector>>,
    shutdown: Arc<AtomicBool>,
    tick_interval: Duration,
}

impl Clone for ArenaServer {
    fn clone(&self) -> Self {
        Self {
            director: Arc::clone(&self.director),
            shutdown: Arc::clone(&self.shutdown),
            tick_interval: self.tick_interval,
        }
    }
}

impl ArenaServer {
    pub fn new(director: EventDirector, tick_interval: Duration) -> Self {
        Self {
            director: Arc::new(Mutex::new(director)),
            shutdown: Arc::new(AtomicBool::new(false)),
            tick_interval,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn should_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Force-end every event and stop the tick loop.
    pub async fn shutdown(&self) {
        let mut director = self.director.lock().await;
        director.shutdown();
        self.request_shutdown();
    }

    /// Advance the engine by one second.
    pub async fn tick(&self) {
        let mut director = self.director.lock().await;
        director.tick();
    }

    pub async fn open(&self, name: &str) -> Result<OpenOutcome, OpenError> {
        let mut director = self.director.lock().await;
        director.open(name)
    }

    pub async fn open_all(&self) {
        let mut director = self.director.lock().await;
        director.open_all();
    }

    pub async fn close(&self, name: &str) -> bool {
        let mut director = self.director.lock().await;
        director.close(name)
    }

    pub async fn upsert_config(&self, config: EventConfig) -> Result<OpenOutcome, OpenError> {
        let mut director = self.director.lock().await;
        director.upsert_config(config)
    }

    pub async fn set_enabled(&self, name: &str, enabled: bool) -> bool {
        let mut director = self.director.lock().await;
        director.set_enabled(name, enabled)
    }

    pub async fn join(
        &self,
        actor: ActorId,
        name: &str,
        team: Team,
    ) -> Result<(), JoinError> {
        let mut director = self.director.lock().await;
        director.join(actor, name, team)
    }

    pub async fn leave(&self, actor: ActorId) {
        let mut director = self.director.lock().await;
        director.leave(actor);
    }

    pub async fn select_class(&self, actor: ActorId, kit: &str) -> Result<(), String> {
        let mut director = self.director.lock().await;
        director.select_class(actor, kit)
    }

    pub async fn cycle_spectate(&self, actor: ActorId) {
        let mut director = self.director.lock().await;
        director.cycle_spectate(actor);
    }

    pub async fn respawn_request(&self, actor: ActorId) {
        let mut director = self.director.lock().await;
        director.respawn_request(actor);
    }

    /// Deliver a fire-and-forget world event.
    pub async fn handle(&self, event: WorldEvent) {
        let mut director = self.director.lock().await;
        director.handle(event);
    }

    pub async fn on_damage(
        &self,
        victim: ActorId,
        attacker: Option<ActorId>,
        damage: &DamageInfo,
    ) -> DamageVerdict {
        let mut director = self.director.lock().await;
        director.on_damage(victim, attacker, damage)
    }

    pub async fn on_death(
        &self,
        victim: ActorId,
        attacker: Option<ActorId>,
        damage: &DamageInfo,
    ) -> bool {
        let mut director = self.director.lock().await;
        director.on_death(victim, attacker, damage)
    }

    pub async fn on_chat(&self, actor: ActorId, message: &str) -> CommandVerdict {
        let mut director = self.director.lock().await;
        director.on_chat(actor, message)
    }

    pub async fn on_command(&self, actor: ActorId, command: &str) -> CommandVerdict {
        let mut director = self.director.lock().await;
        director.on_command(actor, command)
    }

    pub async fn status(&self, name: &str) -> Option<EventStatus> {
        let director = self.director.lock().await;
        director.status(name)
    }

    pub async fn list_active(&self) -> Vec<EventInfo> {
        let director = self.director.lock().await;
        director.list_active()
    }

    pub async fn event_of(&self, actor: ActorId) -> Option<String> {
        let director = self.director.lock().await;
        director.event_of(actor).map(str::to_string)
    }

    /// Drain the pending world commands for the host to apply.
    pub async fn take_commands(&self) -> Vec<WorldCommand> {
        let mut director = self.director.lock().await;
        director.take_commands()
    }

    /// Read the outbound broadcast stream from a cursor.
    pub async fn notices_since(
        &self,
        cursor: NoticeCursor,
    ) -> (Vec<PostedBroadcast>, NoticeCursor) {
        let director = self.director.lock().await;
        director.notices_since(cursor)
    }

    /// Run a closure against the locked director, for host plumbing that
    /// needs more than the wrappers expose.
    pub async fn with_director<T>(&self, f: impl FnOnce(&mut EventDirector) -> T) -> T {
        let mut director = self.director.lock().await;
        f(&mut director)
    }
}
