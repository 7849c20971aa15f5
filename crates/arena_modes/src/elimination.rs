use arena_core::{ActorId, DamageInfo, EventConfig, ScoreEntry};
use arena_engine::{EngineAction, EventBehaviour, EventCore, EventMode};

/// Last-one-standing rounds: nobody respawns while a round is live, and a
/// lone survivor ends the round as its winner.
pub struct EliminationMode;

impl EliminationMode {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self
    }
}

impl EventMode for EliminationMode {
    fn display_name(&self) -> &str {
        "Elimination"
    }

    fn offers_class_selection(&self) -> bool {
        true
    }

    fn uses_time_limit(&self) -> bool {
        true
    }

    fn is_round_based(&self) -> bool {
        true
    }

    fn format_score(&self, entry: &ScoreEntry) -> (String, String) {
        (
            format!("Kills: {}", entry.value1 as i64),
            format!("Deaths: {}", entry.value2 as i64),
        )
    }

    fn create_behaviour(&self, _config: &EventConfig) -> Box<dyn EventBehaviour> {
        Box::new(EliminationBehaviour { round_live: false })
    }
}

struct EliminationBehaviour {
    round_live: bool,
}

impl EventBehaviour for EliminationBehaviour {
    fn can_enter_during_round(&self) -> bool {
        false
    }

    fn on_round_start(&mut self, _core: &mut EventCore) {
        self.round_live = true;
    }

    fn on_round_end(&mut self, _core: &mut EventCore) {
        self.round_live = false;
    }

    fn on_event_end(&mut self, _core: &mut EventCore) {
        self.round_live = false;
    }

    fn can_respawn(&self, _core: &EventCore, _actor: ActorId) -> bool {
        !self.round_live
    }

    fn on_death(
        &mut self,
        core: &mut EventCore,
        victim: ActorId,
        attacker: Option<ActorId>,
        damage: &DamageInfo,
    ) {
        core.standard_death(victim, attacker, damage, 0, true);

        if self.round_live && core.alive_count() <= 1 {
            core.schedule(0, EngineAction::EndRound);
        }
    }

    fn winners(&self, core: &EventCore) -> Vec<ActorId> {
        core.alive_actors()
    }

    fn score_values(&self, core: &EventCore, actor: ActorId) -> (f32, f32) {
        match core.session(actor) {
            Some(session) => (session.kills as f32, session.deaths as f32),
            None => (0.0, 0.0),
        }
    }
}
