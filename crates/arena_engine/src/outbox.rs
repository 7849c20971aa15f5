use arena_core::{ActorId, Audience, Broadcast, Notice, Team, WorldCommand};

/// Accumulates the outward effects of one engine operation: world commands,
/// player-facing broadcasts, and session ownership changes the director
/// must mirror into its actor→event map. Drained after every call into an
/// instance.
#[derive(Default)]
pub struct Outbox {
    pub commands: Vec<WorldCommand>,
    pub broadcasts: Vec<Broadcast>,
    /// Actors that gained a session during the operation.
    pub claimed: Vec<ActorId>,
    /// Actors whose session was removed during the operation.
    pub released: Vec<ActorId>,
}

impl Outbox {
    pub fn command(&mut self, command: WorldCommand) {
        self.commands.push(command);
    }

    pub fn broadcast(&mut self, notice: Notice) {
        self.broadcasts.push(Broadcast::event(notice));
    }

    /// Address every connected actor in the world, not just the event.
    pub fn announce(&mut self, notice: Notice) {
        self.broadcasts.push(Broadcast {
            audience: Audience::All,
            notice,
        });
    }

    pub fn notify(&mut self, actor: ActorId, notice: Notice) {
        self.broadcasts.push(Broadcast::actor(actor, notice));
    }

    pub fn notify_team(&mut self, team: Team, notice: Notice) {
        self.broadcasts.push(Broadcast {
            audience: Audience::Team(team),
            notice,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
            && self.broadcasts.is_empty()
            && self.claimed.is_empty()
            && self.released.is_empty()
    }

    /// Take everything accumulated so far, leaving the outbox empty.
    pub fn take(&mut self) -> Outbox {
        std::mem::take(self)
    }
}
