use arena_core::{ActorId, Team};

/// Outcome of the per-second out-of-bounds check.
#[derive(Debug, PartialEq)]
pub enum OobTick {
    Countdown(u32),
    Expired,
}

/// Per-actor state that exists only while the actor is inside a match.
#[derive(Debug)]
pub struct PlayerSession {
    pub actor: ActorId,
    pub display_name: String,
    pub team: Team,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub dead: bool,
    pub auto_respawn: bool,
    /// Selected kit; `None` until the participant picks a class when the
    /// mode offers class selection.
    pub kit: Option<String>,
    pub spectating: bool,
    pub spectate_target: Option<ActorId>,
    pub spectate_index: usize,
    respawn_remaining: u32,
    invincible_until: u64,
    out_of_bounds: bool,
    oob_remaining: u32,
    oob_expired: bool,
    contributors: Vec<ActorId>,
    damage_window_ends: u64,
}

impl PlayerSession {
    pub fn new(actor: ActorId, display_name: String) -> Self {
        Self {
            actor,
            display_name,
            team: Team::None,
            kills: 0,
            deaths: 0,
            assists: 0,
            dead: false,
            auto_respawn: false,
            kit: None,
            spectating: false,
            spectate_target: None,
            spectate_index: 0,
            respawn_remaining: 0,
            invincible_until: 0,
            out_of_bounds: false,
            oob_remaining: 0,
            oob_expired: false,
            contributors: Vec::new(),
            damage_window_ends: 0,
        }
    }

    /// Reset per-round statistics, keeping team and kit.
    pub fn reset_statistics(&mut self) {
        self.kills = 0;
        self.deaths = 0;
        self.assists = 0;
        self.spectate_index = 0;
        self.respawn_remaining = 0;
        self.invincible_until = 0;
        self.out_of_bounds = false;
        self.oob_remaining = 0;
        self.oob_expired = false;
        self.damage_window_ends = 0;
        self.contributors.clear();
    }

    pub fn is_invincible(&self, now: u64) -> bool {
        now < self.invincible_until
    }

    pub fn apply_invincibility(&mut self, now: u64, seconds: u32) {
        self.invincible_until = now + seconds as u64;
    }

    /// Record a damage contributor. The list is ordered most-recent-last
    /// and restarts whenever the rolling window has lapsed since the last
    /// recorded hit. Self-inflicted and environmental hits record nothing.
    pub fn record_hit(&mut self, attacker: Option<ActorId>, now: u64, window: u64, promote: bool) {
        if now > self.damage_window_ends {
            self.damage_window_ends = now + window;
            self.contributors.clear();
        }

        let Some(attacker) = attacker else { return };
        if attacker == self.actor {
            return;
        }

        if let Some(index) = self.contributors.iter().position(|c| *c == attacker) {
            if !promote {
                return;
            }
            self.contributors.remove(index);
        }
        self.contributors.push(attacker);
    }

    pub fn contributors(&self) -> &[ActorId] {
        &self.contributors
    }

    /// Contributors owed an assist for this death: everyone recorded except
    /// the most recent entry and the killer, then clears the history.
    pub fn take_assists(&mut self, killer: Option<ActorId>) -> Vec<ActorId> {
        let mut assists = Vec::new();

        if self.contributors.len() > 1 {
            for contributor in &self.contributors[..self.contributors.len() - 1] {
                if Some(*contributor) != killer {
                    assists.push(*contributor);
                }
            }
        }

        self.damage_window_ends = 0;
        self.contributors.clear();
        assists
    }

    pub fn can_respawn(&self) -> bool {
        self.respawn_remaining == 0
    }

    pub fn respawn_remaining(&self) -> u32 {
        self.respawn_remaining
    }

    pub fn start_respawn_countdown(&mut self, seconds: u32) {
        self.respawn_remaining = seconds;
    }

    /// Advance the respawn countdown; true when it just reached zero and
    /// the participant should respawn automatically.
    pub fn tick_respawn(&mut self) -> bool {
        if !self.dead || self.respawn_remaining == 0 {
            return false;
        }

        self.respawn_remaining -= 1;
        self.respawn_remaining == 0 && self.auto_respawn
    }

    /// Cancel any pending respawn wait at a round boundary.
    pub fn on_round_finished(&mut self) {
        if self.dead {
            self.respawn_remaining = 0;
        }
    }

    pub fn is_out_of_bounds(&self) -> bool {
        self.out_of_bounds
    }

    pub fn set_out_of_bounds(&mut self, seconds: u32) {
        self.out_of_bounds = true;
        self.oob_remaining = seconds;
        self.oob_expired = false;
    }

    pub fn clear_out_of_bounds(&mut self) {
        self.out_of_bounds = false;
        self.oob_remaining = 0;
        self.oob_expired = false;
    }

    /// The flag stays set after expiry (the actor is still outside) so the
    /// death pipeline can attribute the kill; the expiry itself fires once.
    pub fn tick_out_of_bounds(&mut self) -> Option<OobTick> {
        if !self.out_of_bounds || self.oob_expired || self.dead || self.spectating {
            return None;
        }

        if self.oob_remaining == 0 {
            self.oob_expired = true;
            return Some(OobTick::Expired);
        }

        self.oob_remaining -= 1;
        Some(OobTick::Countdown(self.oob_remaining + 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> PlayerSession {
        PlayerSession::new(ActorId(1), "victim".into())
    }

    #[test]
    fn invincibility_blocks_until_expiry() {
        let mut s = session();
        s.apply_invincibility(10, 3);

        assert!(s.is_invincible(10));
        assert!(s.is_invincible(12));
        assert!(!s.is_invincible(13));
    }

    #[test]
    fn repeat_attacker_is_promoted_not_duplicated() {
        let mut s = session();
        s.record_hit(Some(ActorId(2)), 0, 3, true);
        s.record_hit(Some(ActorId(3)), 1, 3, true);
        s.record_hit(Some(ActorId(2)), 2, 3, true);

        assert_eq!(s.contributors(), &[ActorId(3), ActorId(2)]);
    }

    #[test]
    fn window_lapse_clears_history() {
        let mut s = session();
        s.record_hit(Some(ActorId(2)), 0, 3, true);
        s.record_hit(Some(ActorId(3)), 10, 3, true);

        assert_eq!(s.contributors(), &[ActorId(3)]);
    }

    #[test]
    fn self_hits_record_nothing() {
        let mut s = session();
        s.record_hit(Some(ActorId(1)), 0, 3, true);
        s.record_hit(None, 1, 3, true);

        assert!(s.contributors().is_empty());
    }

    #[test]
    fn assists_exclude_the_killer_and_clear() {
        let mut s = session();
        s.record_hit(Some(ActorId(2)), 0, 3, true);
        s.record_hit(Some(ActorId(3)), 1, 3, true);
        s.record_hit(Some(ActorId(4)), 2, 3, true);

        let assists = s.take_assists(Some(ActorId(4)));
        assert_eq!(assists, vec![ActorId(2), ActorId(3)]);
        assert!(s.contributors().is_empty());
    }

    #[test]
    fn lone_contributor_earns_no_assist() {
        let mut s = session();
        s.record_hit(Some(ActorId(2)), 0, 3, true);

        assert!(s.take_assists(Some(ActorId(2))).is_empty());
    }

    #[test]
    fn respawn_countdown_fires_once_when_auto() {
        let mut s = session();
        s.dead = true;
        s.auto_respawn = true;
        s.start_respawn_countdown(2);

        assert!(!s.tick_respawn());
        assert!(s.tick_respawn());
        assert!(!s.tick_respawn());
    }

    #[test]
    fn out_of_bounds_counts_down_then_expires() {
        let mut s = session();
        s.set_out_of_bounds(2);

        assert_eq!(s.tick_out_of_bounds(), Some(OobTick::Countdown(2)));
        assert_eq!(s.tick_out_of_bounds(), Some(OobTick::Countdown(1)));
        assert_eq!(s.tick_out_of_bounds(), Some(OobTick::Expired));
        assert_eq!(s.tick_out_of_bounds(), None);
        assert!(s.is_out_of_bounds());

        s.clear_out_of_bounds();
        assert!(!s.is_out_of_bounds());
    }
}
