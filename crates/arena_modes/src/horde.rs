use arena_core::{
    ActorId, DamageInfo, EventConfig, EventParameter, Notice, ObjectId, ParamKind, ParamValue,
    Providers, ScoreEntry, WorldCommand,
};
use arena_engine::{EngineAction, EventBehaviour, EventCore, EventMode, SpawnSelector};

const SPAWN_WAVE: u32 = 1;
const WAVE_DELAY_SECS: u32 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum WaveOutcome {
    PlayersWon,
    HordeWon,
}

/// Survive-the-horde: every round spawns a wave of world-controlled
/// hostiles; participants have limited lives per round, and clearing the
/// wave ends it. A wipe ends the whole event.
pub struct HordeMode;

impl HordeMode {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self
    }
}

impl EventMode for HordeMode {
    fn display_name(&self) -> &str {
        "Horde Survival"
    }

    fn offers_class_selection(&self) -> bool {
        true
    }

    fn requires_time_limit(&self) -> bool {
        true
    }

    fn uses_time_limit(&self) -> bool {
        true
    }

    fn parameters(&self) -> Vec<EventParameter> {
        vec![
            EventParameter::new("Lives Per Round", "playerLives", ParamKind::Int)
                .default_value(ParamValue::Int(3)),
            EventParameter::new("Hostiles Per Player", "hostilesPerPlayer", ParamKind::Int)
                .default_value(ParamValue::Int(2)),
            EventParameter::new("Extra Hostiles Per Round", "additionalPerRound", ParamKind::Int)
                .default_value(ParamValue::Int(1)),
            EventParameter::new("Hostile Spawn File", "hostileSpawnFile", ParamKind::Str)
                .required()
                .selector("spawn_files"),
            EventParameter::new("Hostile Kind", "hostileKind", ParamKind::Str)
                .default_value(ParamValue::Str("scientist".to_string())),
            EventParameter::new("Hostile Kit", "hostileKit", ParamKind::Str),
        ]
    }

    fn validate_parameter(&self, field: &str, value: &ParamValue) -> Option<String> {
        if field == "playerLives" {
            if let ParamValue::Int(lives) = value {
                if *lives < 1 {
                    return Some("players need at least one life".to_string());
                }
            }
        }
        None
    }

    fn format_score(&self, entry: &ScoreEntry) -> (String, String) {
        (
            format!("Kills: {}", entry.value1 as i64),
            format!("Deaths: {}", entry.value2 as i64),
        )
    }

    fn create_behaviour(&self, config: &EventConfig) -> Box<dyn EventBehaviour> {
        Box::new(HordeBehaviour {
            lives: (config.param_int("playerLives").unwrap_or(3) as u32).saturating_sub(1).max(1),
            per_player: config.param_int("hostilesPerPlayer").unwrap_or(2) as u32,
            additional: config.param_int("additionalPerRound").unwrap_or(1) as u32,
            spawn_file: config
                .param_str("hostileSpawnFile")
                .unwrap_or_default()
                .to_string(),
            kind: config
                .param_str("hostileKind")
                .unwrap_or("scientist")
                .to_string(),
            kit: config.param_str("hostileKit").map(str::to_string),
            spawns: SpawnSelector::empty(),
            hostiles: Vec::new(),
            outcome: None,
        })
    }
}

struct HordeBehaviour {
    /// Deaths a participant may suffer per round before they are out.
    lives: u32,
    per_player: u32,
    additional: u32,
    spawn_file: String,
    kind: String,
    kit: Option<String>,
    spawns: SpawnSelector,
    hostiles: Vec<ObjectId>,
    outcome: Option<WaveOutcome>,
}

impl HordeBehaviour {
    fn wave_size(&self, core: &EventCore) -> u32 {
        self.per_player * core.active_count()
            + self.additional * core.round.saturating_sub(1) * core.active_count()
    }

    fn remaining_players(&self, core: &EventCore) -> u32 {
        core.active_actors()
            .into_iter()
            .filter_map(|actor| core.session(actor))
            .filter(|session| session.deaths < self.lives)
            .count() as u32
    }

    fn destroy_hostiles(&mut self, core: &mut EventCore) {
        core.cancel_scheduled(&EngineAction::ModeAction {
            tag: SPAWN_WAVE,
            actor: None,
        });

        for object in self.hostiles.drain(..) {
            if core.untrack_object(object) {
                core.command(WorldCommand::DestroyObject { object });
            }
        }
    }
}

impl EventBehaviour for HordeBehaviour {
    fn on_initialized(&mut self, core: &mut EventCore, providers: &Providers) {
        let points = providers.spawns.load_spawns(&self.spawn_file);
        match points {
            Some(points) if !points.is_empty() => {
                self.spawns = SpawnSelector::new(points);
            }
            _ => {
                tracing::error!(
                    event = %core.name,
                    file = %self.spawn_file,
                    "no valid hostile spawn points"
                );
            }
        }
    }

    fn can_enter_between_rounds(&self) -> bool {
        false
    }

    fn can_enter_during_round(&self) -> bool {
        false
    }

    fn close_on_start(&self, _core: &EventCore) -> bool {
        true
    }

    fn on_round_prepare(&mut self, _core: &mut EventCore) {
        self.outcome = None;
    }

    fn on_round_start(&mut self, core: &mut EventCore) {
        core.schedule_mode_action(WAVE_DELAY_SECS, SPAWN_WAVE, None);
    }

    fn on_mode_action(&mut self, core: &mut EventCore, tag: u32, _actor: Option<ActorId>) {
        if tag != SPAWN_WAVE {
            return;
        }

        let amount = self.wave_size(core);
        for _ in 0..amount {
            let Some(position) = self.spawns.get_spawn_point(core.rng()) else {
                tracing::warn!(event = %core.name, "hostile spawn pool is empty");
                break;
            };
            let object = core.spawn_hostile(position, &self.kind, self.kit.clone());
            self.hostiles.push(object);
        }
    }

    fn can_respawn(&self, core: &EventCore, actor: ActorId) -> bool {
        core.session(actor)
            .map(|session| session.deaths < self.lives)
            .unwrap_or(false)
    }

    fn can_be_spectated(&self, core: &EventCore, actor: ActorId) -> bool {
        core.session(actor)
            .map(|session| session.deaths < self.lives)
            .unwrap_or(false)
    }

    fn on_death(
        &mut self,
        core: &mut EventCore,
        victim: ActorId,
        attacker: Option<ActorId>,
        damage: &DamageInfo,
    ) {
        let delay = core.settings.respawn_secs;
        core.standard_death(victim, attacker, damage, delay, true);

        let lives = self.lives;
        if let Some(session) = core.session(victim) {
            let remaining = lives.saturating_sub(session.deaths);
            core.notify(
                victim,
                Notice::Custom {
                    key: "horde.lives_remaining".to_string(),
                    args: vec![remaining.to_string()],
                },
            );
        }

        if self.outcome.is_none() && self.remaining_players(core) == 0 {
            self.outcome = Some(WaveOutcome::HordeWon);
            core.schedule(0, EngineAction::EndEvent);
        }
    }

    fn on_object_destroyed(
        &mut self,
        core: &mut EventCore,
        object: ObjectId,
        by: Option<ActorId>,
    ) {
        let Some(index) = self.hostiles.iter().position(|h| *h == object) else {
            return;
        };
        self.hostiles.swap_remove(index);

        if let Some(killer) = by {
            let rewards = core.config.rewards.clone();
            if let Some(session) = core.session_mut(killer) {
                session.kills += 1;
            }
            if rewards.kill_amount > 0 && core.session(killer).is_some() {
                core.command(WorldCommand::GrantReward {
                    actor: killer,
                    kind: rewards.kind,
                    amount: rewards.kill_amount,
                });
            }
        }

        if self.hostiles.is_empty() && !core.godmode && self.outcome.is_none() {
            self.outcome = Some(WaveOutcome::PlayersWon);
            core.schedule(0, EngineAction::EndRound);
        }
    }

    fn on_round_end(&mut self, core: &mut EventCore) {
        self.destroy_hostiles(core);
    }

    fn on_event_end(&mut self, core: &mut EventCore) {
        self.destroy_hostiles(core);
    }

    fn winners(&self, core: &EventCore) -> Vec<ActorId> {
        if self.outcome != Some(WaveOutcome::PlayersWon) {
            return Vec::new();
        }

        core.active_actors()
            .into_iter()
            .filter(|actor| {
                core.session(*actor)
                    .map(|session| session.deaths < self.lives)
                    .unwrap_or(false)
            })
            .collect()
    }

    fn score_values(&self, core: &EventCore, actor: ActorId) -> (f32, f32) {
        match core.session(actor) {
            Some(session) => (session.kills as f32, session.deaths as f32),
            None => (0.0, 0.0),
        }
    }
}
