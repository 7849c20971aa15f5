use crate::instance::EventCore;
use arena_core::{
    ActorId, DamageInfo, DropPolicy, EventConfig, EventParameter, ObjectId, ParamValue, Providers,
    ScoreEntry, Team,
};
use std::cmp::Ordering;

/// Static description of a registered mode, captured once at open so the
/// instance never needs the registry again.
#[derive(Clone, Debug)]
pub struct ModeProfile {
    /// Registry key the mode was registered under.
    pub mode_id: String,
    pub display_name: String,
    pub icon: String,
    pub team_based: bool,
    pub native_teams: bool,
    pub can_select_team: bool,
    pub class_selection: bool,
    pub round_based: bool,
    pub team_a_name: String,
    pub team_b_name: String,
}

impl ModeProfile {
    pub fn of(mode_id: &str, mode: &dyn EventMode) -> Self {
        Self {
            mode_id: mode_id.to_string(),
            display_name: mode.display_name().to_string(),
            icon: mode.icon().to_string(),
            team_based: mode.is_team_mode(),
            native_teams: mode.uses_native_teams(),
            can_select_team: mode.can_select_team(),
            class_selection: mode.offers_class_selection(),
            round_based: mode.is_round_based(),
            team_a_name: mode.team_a_name().to_string(),
            team_b_name: mode.team_b_name().to_string(),
        }
    }

    pub fn team_name(&self, team: Team) -> &str {
        match team {
            Team::B => &self.team_b_name,
            _ => &self.team_a_name,
        }
    }
}

/// A registered game-mode strategy: declares its semantics and parameters,
/// validates config values, formats score columns and constructs the
/// per-instance behaviour object.
pub trait EventMode: Send {
    fn display_name(&self) -> &str;

    fn icon(&self) -> &str {
        ""
    }

    fn is_team_mode(&self) -> bool {
        false
    }

    /// Whether team membership is mirrored into the host's native grouping
    /// feature.
    fn uses_native_teams(&self) -> bool {
        false
    }

    fn can_select_team(&self) -> bool {
        false
    }

    /// Whether joiners pick a class/kit instead of being handed one.
    fn offers_class_selection(&self) -> bool {
        false
    }

    fn requires_time_limit(&self) -> bool {
        false
    }

    fn requires_score_limit(&self) -> bool {
        false
    }

    fn uses_time_limit(&self) -> bool {
        false
    }

    fn uses_score_limit(&self) -> bool {
        false
    }

    fn is_round_based(&self) -> bool {
        false
    }

    fn team_a_name(&self) -> &str {
        "Team A"
    }

    fn team_b_name(&self) -> &str {
        "Team B"
    }

    /// Extra typed config fields this mode understands.
    fn parameters(&self) -> Vec<EventParameter> {
        Vec::new()
    }

    /// Validate one parameter value; `Some(reason)` rejects the config.
    fn validate_parameter(&self, _field: &str, _value: &ParamValue) -> Option<String> {
        None
    }

    /// Render a score entry's two columns for display.
    fn format_score(&self, entry: &ScoreEntry) -> (String, String);

    fn create_behaviour(&self, config: &EventConfig) -> Box<dyn EventBehaviour>;
}

/// Per-instance hook object a mode supplies. Every hook has a default so a
/// mode only overrides the decisions it actually cares about; the core
/// drives all state transitions itself.
#[allow(unused_variables)]
pub trait EventBehaviour: Send {
    /// Called once after the instance is constructed, before any join.
    fn on_initialized(&mut self, core: &mut EventCore, providers: &Providers) {}

    /// Extra join gate beyond capacity and the closed flag; `Some(reason)`
    /// rejects the join.
    fn can_join(&self, core: &EventCore, actor: ActorId) -> Option<String> {
        None
    }

    /// Whether pending spectators are admitted at round boundaries.
    fn can_enter_between_rounds(&self) -> bool {
        true
    }

    /// Whether joiners enter live play mid-round instead of waiting as
    /// pending spectators.
    fn can_enter_during_round(&self) -> bool {
        true
    }

    /// Team for a joiner who did not (or may not) pick one.
    fn assign_team(&mut self, core: &EventCore) -> Team {
        Team::None
    }

    /// Which team's spawns a pending spectator waits at.
    fn spectating_team(&self, team: Team) -> Team {
        team
    }

    /// Close the event to new joins as soon as it starts.
    fn close_on_start(&self, core: &EventCore) -> bool {
        false
    }

    /// Pre-start hook; runs before the engine merges pending joiners and
    /// re-checks the minimum.
    fn on_event_start(&mut self, core: &mut EventCore) {}

    /// Runs before the engine's round bookkeeping for the next round.
    fn on_round_prepare(&mut self, core: &mut EventCore) {}

    /// Runs after the engine has started the round and respawned everyone.
    fn on_round_start(&mut self, core: &mut EventCore) {}

    /// Runs as the first step of ending a round.
    fn on_round_end(&mut self, core: &mut EventCore) {}

    /// Runs as the first step of ending the event.
    fn on_event_end(&mut self, core: &mut EventCore) {}

    fn can_respawn(&self, core: &EventCore, actor: ActorId) -> bool {
        true
    }

    /// Seconds a death keeps the participant down.
    fn respawn_delay(&self, core: &EventCore) -> u32 {
        core.settings.respawn_secs
    }

    /// Scale damage between participants; 1.0 leaves it untouched.
    fn damage_modifier(
        &self,
        core: &EventCore,
        victim: ActorId,
        attacker: Option<ActorId>,
    ) -> f32 {
        1.0
    }

    /// Whether the configured drop policy applies to this death.
    fn drops_allowed(&self, policy: DropPolicy) -> bool {
        true
    }

    /// Handle a participant death. The default applies the standard
    /// pipeline: death bookkeeping, kill/assist credit, kill feed and the
    /// respawn countdown.
    fn on_death(
        &mut self,
        core: &mut EventCore,
        victim: ActorId,
        attacker: Option<ActorId>,
        damage: &DamageInfo,
    ) {
        let delay = self.respawn_delay(core);
        core.standard_death(victim, attacker, damage, delay, true);
    }

    fn on_spawned(&mut self, core: &mut EventCore, actor: ActorId) {}

    /// Runs after the staged kit issuance for a spawn.
    fn on_kit_issued(&mut self, core: &mut EventCore, actor: ActorId) {}

    fn can_issue_rewards(&self, core: &EventCore, actor: ActorId) -> bool {
        true
    }

    /// Resolve the winners of the current round or event.
    fn winners(&self, core: &EventCore) -> Vec<ActorId> {
        Vec::new()
    }

    /// Team score pair for team modes.
    fn team_score(&self, team: Team) -> i32 {
        0
    }

    /// The two mode-defined scalar score columns for a participant.
    fn score_values(&self, core: &EventCore, actor: ActorId) -> (f32, f32);

    /// Ranking order; the sort is stable so equal entries keep join order.
    fn compare_entries(&self, a: &ScoreEntry, b: &ScoreEntry) -> Ordering {
        b.value1
            .partial_cmp(&a.value1)
            .unwrap_or(Ordering::Equal)
            .then(
                a.value2
                    .partial_cmp(&b.value2)
                    .unwrap_or(Ordering::Equal),
            )
    }

    /// Whether the participant may be offered as a spectate target, beyond
    /// the engine's alive-and-visible base conditions.
    fn can_be_spectated(&self, core: &EventCore, actor: ActorId) -> bool {
        true
    }

    /// A mode-owned round timer (started via `start_mode_timer`) expired.
    fn on_mode_timer(&mut self, core: &mut EventCore, tag: u32) {}

    /// A deferred mode action (scheduled via `schedule_mode_action`) fired.
    fn on_mode_action(&mut self, core: &mut EventCore, tag: u32, actor: Option<ActorId>) {}

    /// A world object this instance tracks was destroyed.
    fn on_object_destroyed(
        &mut self,
        core: &mut EventCore,
        object: ObjectId,
        by: Option<ActorId>,
    ) {
    }

    /// A participant's session was removed, for any reason. Runs after the
    /// engine's own leave handling.
    fn on_participant_left(&mut self, core: &mut EventCore, actor: ActorId) {}
}
