use arena_core::{
    ActorId, DamageInfo, DropPolicy, EventConfig, EventParameter, ParamKind, ParamValue,
    ScoreEntry, WorldCommand,
};
use arena_engine::{EngineAction, EventBehaviour, EventCore, EventMode};
use std::cmp::Ordering;
use std::collections::HashMap;

const SWAP_WEAPON: u32 = 1;

/// Host-level tunables for gun game.
#[derive(Clone, Debug)]
pub struct GunGameSettings {
    pub respawn_secs: u32,
    pub reset_health_on_kill: bool,
}

impl Default for GunGameSettings {
    fn default() -> Self {
        Self {
            respawn_secs: 5,
            reset_health_on_kill: true,
        }
    }
}

/// Escalating-weapon free-for-all: each kill with the current rank weapon
/// advances the ladder, kills with the downgrade weapon demote the victim,
/// and finishing the ladder wins the event.
pub struct GunGameMode {
    settings: GunGameSettings,
}

impl GunGameMode {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            settings: GunGameSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: GunGameSettings) -> Self {
        self.settings = settings;
        self
    }
}

impl EventMode for GunGameMode {
    fn display_name(&self) -> &str {
        "Gun Game"
    }

    fn requires_time_limit(&self) -> bool {
        true
    }

    fn uses_time_limit(&self) -> bool {
        true
    }

    fn parameters(&self) -> Vec<EventParameter> {
        vec![
            EventParameter::new("Weapon Ladder", "weaponSet", ParamKind::StrList).required(),
            EventParameter::new("Downgrade Weapon", "downgradeWeapon", ParamKind::Str)
                .default_value(ParamValue::Str("machete".to_string())),
        ]
    }

    fn validate_parameter(&self, field: &str, value: &ParamValue) -> Option<String> {
        if field == "weaponSet" {
            if let ParamValue::StrList(weapons) = value {
                if weapons.is_empty() {
                    return Some("the weapon ladder must contain at least one weapon".to_string());
                }
            }
        }
        None
    }

    fn format_score(&self, entry: &ScoreEntry) -> (String, String) {
        (
            format!("Rank: {}", entry.value1 as i64),
            format!("Kills: {}", entry.value2 as i64),
        )
    }

    fn create_behaviour(&self, config: &EventConfig) -> Box<dyn EventBehaviour> {
        Box::new(GunGameBehaviour {
            weapons: config
                .param_list("weaponSet")
                .map(<[String]>::to_vec)
                .unwrap_or_default(),
            downgrade: config.param_str("downgradeWeapon").map(str::to_string),
            respawn_secs: self.settings.respawn_secs,
            reset_health_on_kill: self.settings.reset_health_on_kill,
            ranks: HashMap::new(),
            winner: None,
        })
    }
}

struct GunGameBehaviour {
    weapons: Vec<String>,
    downgrade: Option<String>,
    respawn_secs: u32,
    reset_health_on_kill: bool,
    /// Rank 1 wields `weapons[0]`; passing the last rung wins.
    ranks: HashMap<ActorId, usize>,
    winner: Option<ActorId>,
}

impl GunGameBehaviour {
    fn rank(&self, actor: ActorId) -> usize {
        self.ranks.get(&actor).copied().unwrap_or(1)
    }

    fn rank_weapon(&self, actor: ActorId) -> Option<&str> {
        self.weapons.get(self.rank(actor) - 1).map(String::as_str)
    }

    fn give_ladder_items(&self, core: &mut EventCore, actor: ActorId) {
        if let Some(weapon) = self.rank_weapon(actor) {
            core.command(WorldCommand::GiveItem {
                actor,
                item: weapon.to_string(),
                amount: 1,
            });
        }
        if let Some(downgrade) = &self.downgrade {
            core.command(WorldCommand::GiveItem {
                actor,
                item: downgrade.clone(),
                amount: 1,
            });
        }
    }
}

impl EventBehaviour for GunGameBehaviour {
    fn close_on_start(&self, _core: &EventCore) -> bool {
        true
    }

    fn on_round_prepare(&mut self, _core: &mut EventCore) {
        self.winner = None;
        self.ranks.clear();
    }

    fn respawn_delay(&self, _core: &EventCore) -> u32 {
        self.respawn_secs
    }

    fn drops_allowed(&self, _policy: DropPolicy) -> bool {
        false
    }

    fn on_kit_issued(&mut self, core: &mut EventCore, actor: ActorId) {
        self.give_ladder_items(core, actor);
    }

    fn on_death(
        &mut self,
        core: &mut EventCore,
        victim: ActorId,
        attacker: Option<ActorId>,
        damage: &DamageInfo,
    ) {
        core.standard_death(victim, attacker, damage, self.respawn_secs, true);

        let Some(attacker) = attacker else { return };

        if self.reset_health_on_kill {
            core.command(WorldCommand::ResetVitals { actor: attacker });
        }

        let Some(weapon) = damage.weapon.as_deref() else { return };

        if self.rank_weapon(attacker) == Some(weapon) {
            let rank = self.rank(attacker) + 1;
            self.ranks.insert(attacker, rank);

            if rank > self.weapons.len() {
                self.winner = Some(attacker);
                core.schedule(0, EngineAction::EndRound);
            } else {
                core.command(WorldCommand::RemoveItem {
                    actor: attacker,
                    item: self.weapons[rank - 2].clone(),
                });
                core.schedule_mode_action(0, SWAP_WEAPON, Some(attacker));
            }
        } else if self.downgrade.as_deref() == Some(weapon) {
            let demoted = self.rank(victim).saturating_sub(1).max(1);
            self.ranks.insert(victim, demoted);
        }
    }

    fn on_mode_action(&mut self, core: &mut EventCore, tag: u32, actor: Option<ActorId>) {
        if tag != SWAP_WEAPON {
            return;
        }
        let Some(actor) = actor else { return };
        let alive = core.session(actor).map(|s| !s.dead).unwrap_or(false);
        if !alive {
            return;
        }
        if let Some(weapon) = self.rank_weapon(actor) {
            core.command(WorldCommand::GiveItem {
                actor,
                item: weapon.to_string(),
                amount: 1,
            });
        }
    }

    fn winners(&self, core: &EventCore) -> Vec<ActorId> {
        if let Some(winner) = self.winner {
            return vec![winner];
        }

        let mut best: Option<(ActorId, usize, u32)> = None;
        for actor in core.active_actors() {
            let rank = self.rank(actor);
            let kills = core.session(actor).map(|s| s.kills).unwrap_or(0);

            let better = match best {
                None => true,
                Some((_, best_rank, best_kills)) => {
                    rank > best_rank || (rank == best_rank && kills > best_kills)
                }
            };
            if better {
                best = Some((actor, rank, kills));
            }
        }

        best.map(|(actor, _, _)| vec![actor]).unwrap_or_default()
    }

    fn score_values(&self, core: &EventCore, actor: ActorId) -> (f32, f32) {
        let kills = core.session(actor).map(|s| s.kills).unwrap_or(0);
        (self.rank(actor) as f32, kills as f32)
    }

    fn compare_entries(&self, a: &ScoreEntry, b: &ScoreEntry) -> Ordering {
        b.value1
            .partial_cmp(&a.value1)
            .unwrap_or(Ordering::Equal)
            .then(b.value2.partial_cmp(&a.value2).unwrap_or(Ordering::Equal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ladder_validation_rejects_an_empty_set() {
        let mode = GunGameMode::new();
        let reason =
            mode.validate_parameter("weaponSet", &ParamValue::StrList(Vec::new()));
        assert!(reason.is_some());

        let ok = mode.validate_parameter(
            "weaponSet",
            &ParamValue::StrList(vec!["pistol".into()]),
        );
        assert!(ok.is_none());
    }
}
