use arena_core::ActorId;

/// A state-machine step the engine performs on a later tick. Scheduled
/// callbacks are data, not closures, so an owner tearing down can cancel
/// them wholesale.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineAction {
    StartEvent,
    StartNextRound,
    EndRound,
    EndEvent,
    Respawn(ActorId),
    /// Staged kit issuance, one tick after the spawn that requested it.
    IssueKit(ActorId),
    /// Round-timer expiry owned by the mode; routed to its timer hook.
    ModeTimer(u32),
    /// Deferred mode step; routed to the mode's action hook.
    ModeAction {
        tag: u32,
        actor: Option<ActorId>,
    },
}

struct Pending {
    remaining: u32,
    action: EngineAction,
}

/// Per-instance queue of deferred actions, advanced once per engine
/// second. A delay of 0 fires on the next tick.
#[derive(Default)]
pub struct Scheduler {
    pending: Vec<Pending>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, delay_secs: u32, action: EngineAction) {
        self.pending.push(Pending {
            remaining: delay_secs,
            action,
        });
    }

    /// Drop every pending occurrence of `action`. A no-op when nothing
    /// matches.
    pub fn cancel(&mut self, action: &EngineAction) {
        self.pending.retain(|pending| pending.action != *action);
    }

    /// Drop pending actions selected by the predicate.
    pub fn cancel_if(&mut self, mut predicate: impl FnMut(&EngineAction) -> bool) {
        self.pending.retain(|pending| !predicate(&pending.action));
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn is_scheduled(&self, action: &EngineAction) -> bool {
        self.pending.iter().any(|pending| pending.action == *action)
    }

    /// Advance one second; returns the actions that are now due, in
    /// scheduling order.
    pub fn tick(&mut self) -> Vec<EngineAction> {
        let mut due = Vec::new();
        let mut index = 0;

        while index < self.pending.len() {
            if self.pending[index].remaining == 0 {
                due.push(self.pending.remove(index).action);
            } else {
                self.pending[index].remaining -= 1;
                index += 1;
            }
        }

        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_delay_fires_on_next_tick() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(0, EngineAction::EndRound);

        assert_eq!(scheduler.tick(), vec![EngineAction::EndRound]);
        assert!(scheduler.tick().is_empty());
    }

    #[test]
    fn delayed_actions_fire_after_their_delay() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(2, EngineAction::StartNextRound);

        assert!(scheduler.tick().is_empty());
        assert!(scheduler.tick().is_empty());
        assert_eq!(scheduler.tick(), vec![EngineAction::StartNextRound]);
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(5, EngineAction::EndEvent);

        scheduler.cancel(&EngineAction::EndEvent);
        scheduler.cancel(&EngineAction::EndEvent);

        for _ in 0..6 {
            assert!(scheduler.tick().is_empty());
        }
    }

    #[test]
    fn due_actions_preserve_scheduling_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(0, EngineAction::StartEvent);
        scheduler.schedule(0, EngineAction::EndRound);

        assert_eq!(
            scheduler.tick(),
            vec![EngineAction::StartEvent, EngineAction::EndRound]
        );
    }
}
