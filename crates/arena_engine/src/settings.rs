use arena_core::DropPolicy;

/// Engine-wide tunables, constructed by the host at startup and handed to
/// the director. Replaces any notion of process-global configuration.
#[derive(Clone, Debug)]
pub struct EngineSettings {
    /// Countdown between reaching the minimum player count and the event
    /// starting.
    pub prestart_secs: u32,
    /// Pause between rounds, and before a restarted event.
    pub round_interval_secs: u32,
    /// Grace invincibility applied on every spawn.
    pub invincibility_secs: u32,
    /// Default respawn countdown after death; modes may override per death.
    pub respawn_secs: u32,
    /// Whether the countdown respawns the participant automatically.
    pub auto_respawn: bool,
    /// Seconds a participant may stay outside the event zone before being
    /// killed (mid-round) or repositioned.
    pub out_of_bounds_secs: u32,
    /// Rolling window during which damage contributors accumulate toward
    /// assist credit.
    pub assist_window_secs: u64,
    /// Promote a repeat attacker to most-recent instead of keeping their
    /// original slot.
    pub assist_promote_repeat: bool,
    pub drop_on_death: DropPolicy,
    /// Restart the event automatically after it finishes instead of
    /// ejecting everyone.
    pub start_on_finish: bool,
    /// Restore each leaver's pre-match state through the restore
    /// collaborator.
    pub restore_players: bool,
    /// Mirror team membership into the host's native grouping feature.
    pub use_native_teams: bool,
    pub broadcast_joins: bool,
    pub broadcast_leaves: bool,
    pub broadcast_kills: bool,
    /// Commands participants may not run while inside an event.
    pub command_blacklist: Vec<String>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            prestart_secs: 60,
            round_interval_secs: 10,
            invincibility_secs: 3,
            respawn_secs: 5,
            auto_respawn: true,
            out_of_bounds_secs: 10,
            assist_window_secs: 3,
            assist_promote_repeat: true,
            drop_on_death: DropPolicy::Nothing,
            start_on_finish: false,
            restore_players: true,
            use_native_teams: true,
            broadcast_joins: true,
            broadcast_leaves: true,
            broadcast_kills: true,
            command_blacklist: Vec::new(),
        }
    }
}
