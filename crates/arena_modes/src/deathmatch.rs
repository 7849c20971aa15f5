use arena_core::{
    ActorId, DamageInfo, EventConfig, EventParameter, ParamKind, ParamValue, ScoreEntry, Team,
    WorldCommand,
};
use arena_engine::{EngineAction, EventBehaviour, EventCore, EventMode};
use std::cmp::Ordering;

/// Host-level tunables for the deathmatch family.
#[derive(Clone, Debug)]
pub struct DeathmatchSettings {
    pub respawn_secs: u32,
    /// 0.0 removes friendly fire entirely, 1.0 leaves it untouched.
    pub friendly_fire: f32,
}

impl Default for DeathmatchSettings {
    fn default() -> Self {
        Self {
            respawn_secs: 5,
            friendly_fire: 1.0,
        }
    }
}

/// Free-for-all or team deathmatch: kills score, deaths break ties, an
/// optional score limit ends the round early.
pub struct DeathmatchMode {
    team: bool,
    settings: DeathmatchSettings,
}

impl DeathmatchMode {
    pub fn solo() -> Self {
        Self {
            team: false,
            settings: DeathmatchSettings::default(),
        }
    }

    pub fn teams() -> Self {
        Self {
            team: true,
            settings: DeathmatchSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: DeathmatchSettings) -> Self {
        self.settings = settings;
        self
    }
}

impl EventMode for DeathmatchMode {
    fn display_name(&self) -> &str {
        if self.team {
            "Team Deathmatch"
        } else {
            "Deathmatch"
        }
    }

    fn is_team_mode(&self) -> bool {
        self.team
    }

    fn uses_native_teams(&self) -> bool {
        self.team
    }

    fn can_select_team(&self) -> bool {
        self.team
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

    fn uses_score_limit(&self) -> bool {
        true
    }

    fn parameters(&self) -> Vec<EventParameter> {
        vec![
            EventParameter::new("Close Event On Start", "closeOnStart", ParamKind::Bool)
                .default_value(ParamValue::Bool(false)),
        ]
    }

    fn format_score(&self, entry: &ScoreEntry) -> (String, String) {
        (
            format!("Kills: {}", entry.value1 as i64),
            format!("Deaths: {}", entry.value2 as i64),
        )
    }

    fn create_behaviour(&self, config: &EventConfig) -> Box<dyn EventBehaviour> {
        Box::new(DeathmatchBehaviour {
            team: self.team,
            close_on_start: config.param_bool("closeOnStart"),
            respawn_secs: self.settings.respawn_secs,
            friendly_fire: self.settings.friendly_fire,
            team_a_score: 0,
            team_b_score: 0,
            winning_team: Team::None,
            winner: None,
        })
    }
}

struct DeathmatchBehaviour {
    team: bool,
    close_on_start: bool,
    respawn_secs: u32,
    friendly_fire: f32,
    team_a_score: i32,
    team_b_score: i32,
    winning_team: Team,
    winner: Option<ActorId>,
}

impl DeathmatchBehaviour {
    fn score_of(&self, team: Team) -> i32 {
        match team {
            Team::B => self.team_b_score,
            _ => self.team_a_score,
        }
    }
}

impl EventBehaviour for DeathmatchBehaviour {
    fn close_on_start(&self, _core: &EventCore) -> bool {
        self.close_on_start
    }

    fn assign_team(&mut self, core: &EventCore) -> Team {
        if self.team {
            core.smaller_team()
        } else {
            Team::None
        }
    }

    fn on_event_start(&mut self, core: &mut EventCore) {
        if self.team {
            core.balance_teams();
        }
    }

    fn on_round_prepare(&mut self, core: &mut EventCore) {
        self.winning_team = Team::None;
        self.winner = None;
        self.team_a_score = 0;
        self.team_b_score = 0;

        if self.team {
            core.balance_teams();
        }
    }

    fn respawn_delay(&self, _core: &EventCore) -> u32 {
        self.respawn_secs
    }

    fn on_spawned(&mut self, core: &mut EventCore, actor: ActorId) {
        core.command(WorldCommand::LockClothing { actor });
    }

    fn damage_modifier(
        &self,
        core: &EventCore,
        victim: ActorId,
        attacker: Option<ActorId>,
    ) -> f32 {
        if !self.team {
            return 1.0;
        }
        let same_team = attacker
            .and_then(|a| core.session(a))
            .map(|a| a.team)
            .zip(core.session(victim).map(|v| v.team))
            .map(|(a, v)| a == v)
            .unwrap_or(false);

        if same_team {
            self.friendly_fire
        } else {
            1.0
        }
    }

    fn on_death(
        &mut self,
        core: &mut EventCore,
        victim: ActorId,
        attacker: Option<ActorId>,
        damage: &DamageInfo,
    ) {
        let victim_team = core.session(victim).map(|s| s.team).unwrap_or_default();
        let attacker_team = attacker
            .and_then(|a| core.session(a))
            .map(|s| s.team)
            .unwrap_or_default();
        let friendly = self.team && attacker.is_some() && victim_team == attacker_team;

        core.standard_death(victim, attacker, damage, self.respawn_secs, !friendly);

        if let Some(attacker) = attacker.filter(|_| !friendly) {
            let limit = core.config.score_limit;

            if self.team {
                let score = match attacker_team {
                    Team::B => {
                        self.team_b_score += 1;
                        self.team_b_score
                    }
                    _ => {
                        self.team_a_score += 1;
                        self.team_a_score
                    }
                };
                if limit > 0 && score >= limit as i32 {
                    self.winning_team = attacker_team;
                    core.schedule(0, EngineAction::EndRound);
                }
            } else {
                let kills = core.session(attacker).map(|s| s.kills).unwrap_or(0);
                if limit > 0 && kills >= limit {
                    self.winner = Some(attacker);
                    core.schedule(0, EngineAction::EndRound);
                }
            }
        }
    }

    fn winners(&self, core: &EventCore) -> Vec<ActorId> {
        if self.team {
            if self.winning_team == Team::None {
                return Vec::new();
            }
            return core
                .active_actors()
                .into_iter()
                .filter(|actor| {
                    core.session(*actor).map(|s| s.team) == Some(self.winning_team)
                })
                .collect();
        }

        if let Some(winner) = self.winner {
            return vec![winner];
        }

        let top = core
            .active_actors()
            .into_iter()
            .filter_map(|actor| core.session(actor).map(|s| s.kills))
            .max()
            .unwrap_or(0);
        if top == 0 {
            return Vec::new();
        }

        core.active_actors()
            .into_iter()
            .filter(|actor| core.session(*actor).map(|s| s.kills) == Some(top))
            .collect()
    }

    fn team_score(&self, team: Team) -> i32 {
        self.score_of(team)
    }

    fn score_values(&self, core: &EventCore, actor: ActorId) -> (f32, f32) {
        match core.session(actor) {
            Some(session) => (session.kills as f32, session.deaths as f32),
            None => (0.0, 0.0),
        }
    }

    fn compare_entries(&self, a: &ScoreEntry, b: &ScoreEntry) -> Ordering {
        b.value1
            .partial_cmp(&a.value1)
            .unwrap_or(Ordering::Equal)
            .then(a.value2.partial_cmp(&b.value2).unwrap_or(Ordering::Equal))
    }
}
