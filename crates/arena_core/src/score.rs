use crate::types::Team;
use serde::{Deserialize, Serialize};

/// One row of a mode-defined ranking: the meaning of the two values is
/// supplied by the mode (kills/deaths, rank/kills, ...).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub position: u32,
    pub display_name: String,
    pub team: Team,
    pub value1: f32,
    pub value2: f32,
}

/// Snapshot of an event's standings, taken at start, round end and event
/// end so announcements and statistics outlive the instance itself.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventResults {
    pub event_name: String,
    pub event_type: String,
    /// `(team_a, team_b)` scores for team modes.
    pub team_score: Option<(i32, i32)>,
    pub scores: Vec<ScoreEntry>,
}

impl EventResults {
    pub fn is_valid(&self) -> bool {
        !self.event_type.is_empty()
    }
}
