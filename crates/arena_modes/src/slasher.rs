use arena_core::{
    ActorId, DamageInfo, DropPolicy, EventConfig, EventParameter, EventStatus, Notice, ParamKind,
    ParamValue, ScoreEntry, WorldCommand,
};
use arena_engine::{EngineAction, EventBehaviour, EventCore, EventMode};
use std::cmp::Ordering;

const SLASHER_PHASE_OVER: u32 = 1;
const HUNT_PHASE_OVER: u32 = 2;
const ARM_HUNTER: u32 = 3;

/// Hunt-the-target rounds: one armed slasher stalks torch-bearing prey,
/// then the survivors get weapons and the roles flip.
pub struct SlasherMode;

impl SlasherMode {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self
    }
}

impl EventMode for SlasherMode {
    fn display_name(&self) -> &str {
        "Slasher"
    }

    fn is_round_based(&self) -> bool {
        true
    }

    fn parameters(&self) -> Vec<EventParameter> {
        vec![
            EventParameter::new("Slasher Weapon", "slasherWeapon", ParamKind::Str).required(),
            EventParameter::new("Light Item", "torchItem", ParamKind::Str)
                .default_value(ParamValue::Str("torch".to_string())),
            EventParameter::new("Slasher Clothing", "slasherClothing", ParamKind::Str),
            EventParameter::new("Slasher Phase (seconds)", "slasherTime", ParamKind::Int)
                .default_value(ParamValue::Int(180)),
            EventParameter::new("Hunt Phase (seconds)", "playerTime", ParamKind::Int)
                .default_value(ParamValue::Int(180)),
        ]
    }

    fn format_score(&self, entry: &ScoreEntry) -> (String, String) {
        (
            format!("Kills: {}", entry.value1 as i64),
            format!("Deaths: {}", entry.value2 as i64),
        )
    }

    fn create_behaviour(&self, config: &EventConfig) -> Box<dyn EventBehaviour> {
        Box::new(SlasherBehaviour {
            weapon: config
                .param_str("slasherWeapon")
                .unwrap_or("chainsaw")
                .to_string(),
            torch: config.param_str("torchItem").unwrap_or("torch").to_string(),
            clothing: config.param_str("slasherClothing").map(str::to_string),
            slasher_secs: config.param_int("slasherTime").unwrap_or(180) as u32,
            hunt_secs: config.param_int("playerTime").unwrap_or(180) as u32,
            slasher: None,
            rotation: Vec::new(),
            round_live: false,
        })
    }
}

struct SlasherBehaviour {
    weapon: String,
    torch: String,
    clothing: Option<String>,
    slasher_secs: u32,
    hunt_secs: u32,
    slasher: Option<ActorId>,
    /// Who has not yet had a slasher turn; refilled once everyone has.
    rotation: Vec<ActorId>,
    round_live: bool,
}

impl SlasherBehaviour {
    fn pick_slasher(&mut self, core: &mut EventCore) -> Option<ActorId> {
        let candidates = core.active_actors();
        self.rotation.retain(|actor| candidates.contains(actor));

        if self.rotation.is_empty() {
            self.rotation = candidates;
        }
        if self.rotation.is_empty() {
            return None;
        }

        let index = core.rng_index(self.rotation.len());
        Some(self.rotation.swap_remove(index))
    }

    fn arm_slasher(&self, core: &mut EventCore, actor: ActorId) {
        core.command(WorldCommand::StripInventory { actor });
        if let Some(clothing) = &self.clothing {
            core.command(WorldCommand::IssueKit {
                actor,
                kit: clothing.clone(),
            });
        }
        core.command(WorldCommand::GiveItem {
            actor,
            item: self.weapon.clone(),
            amount: 1,
        });
    }
}

impl EventBehaviour for SlasherBehaviour {
    fn can_enter_between_rounds(&self) -> bool {
        false
    }

    fn can_enter_during_round(&self) -> bool {
        false
    }

    fn close_on_start(&self, _core: &EventCore) -> bool {
        true
    }

    fn on_event_start(&mut self, core: &mut EventCore) {
        // One round per participant present at the start.
        core.config.rounds_to_play = core.active_count().max(1);
        self.rotation = core.active_actors();
    }

    fn drops_allowed(&self, _policy: DropPolicy) -> bool {
        false
    }

    fn can_respawn(&self, _core: &EventCore, _actor: ActorId) -> bool {
        !self.round_live
    }

    fn on_round_start(&mut self, core: &mut EventCore) {
        self.round_live = true;

        self.slasher = self.pick_slasher(core);
        let Some(slasher) = self.slasher else { return };

        let name = core
            .session(slasher)
            .map(|s| s.display_name.clone())
            .unwrap_or_default();
        core.broadcast(Notice::Custom {
            key: "slasher.round_started".to_string(),
            args: vec![name],
        });

        core.start_mode_timer(self.slasher_secs, "the slasher hunts", SLASHER_PHASE_OVER);
    }

    fn on_spawned(&mut self, core: &mut EventCore, actor: ActorId) {
        core.command(WorldCommand::LockClothing { actor });
    }

    fn on_kit_issued(&mut self, core: &mut EventCore, actor: ActorId) {
        if self.slasher == Some(actor) {
            self.arm_slasher(core, actor);
        } else {
            core.command(WorldCommand::GiveItem {
                actor,
                item: self.torch.clone(),
                amount: 1,
            });
        }
    }

    fn on_death(
        &mut self,
        core: &mut EventCore,
        victim: ActorId,
        attacker: Option<ActorId>,
        damage: &DamageInfo,
    ) {
        core.standard_death(victim, attacker, damage, 0, true);

        if !self.round_live {
            return;
        }

        if self.slasher == Some(victim) {
            core.broadcast(Notice::Custom {
                key: "slasher.hunted_win".to_string(),
                args: Vec::new(),
            });
            core.schedule(0, EngineAction::EndRound);
        } else if core.alive_count() <= 1 {
            core.broadcast(Notice::Custom {
                key: "slasher.slasher_win".to_string(),
                args: Vec::new(),
            });
            core.schedule(0, EngineAction::EndRound);
        }
    }

    fn on_mode_timer(&mut self, core: &mut EventCore, tag: u32) {
        match tag {
            SLASHER_PHASE_OVER => {
                core.broadcast(Notice::Custom {
                    key: "slasher.hunters_turn".to_string(),
                    args: Vec::new(),
                });

                for actor in core.alive_actors() {
                    if self.slasher != Some(actor) {
                        core.schedule_mode_action(0, ARM_HUNTER, Some(actor));
                    }
                }

                core.start_mode_timer(self.hunt_secs, "hunt the slasher", HUNT_PHASE_OVER);
            }
            HUNT_PHASE_OVER => {
                core.schedule(0, EngineAction::EndRound);
            }
            _ => {}
        }
    }

    fn on_mode_action(&mut self, core: &mut EventCore, tag: u32, actor: Option<ActorId>) {
        if tag != ARM_HUNTER {
            return;
        }
        let Some(actor) = actor else { return };
        let alive = core.session(actor).map(|s| !s.dead).unwrap_or(false);
        if alive {
            core.command(WorldCommand::GiveItem {
                actor,
                item: self.weapon.clone(),
                amount: 1,
            });
        }
    }

    fn on_round_end(&mut self, core: &mut EventCore) {
        self.slasher = None;
        self.round_live = false;
        core.stop_timer();
    }

    fn on_event_end(&mut self, _core: &mut EventCore) {
        self.slasher = None;
        self.round_live = false;
    }

    fn on_participant_left(&mut self, core: &mut EventCore, actor: ActorId) {
        self.rotation.retain(|a| *a != actor);

        if self.slasher == Some(actor) && core.status != EventStatus::Finished {
            self.slasher = None;
            core.schedule(0, EngineAction::EndRound);
        }
    }

    fn can_be_spectated(&self, _core: &EventCore, actor: ActorId) -> bool {
        self.slasher != Some(actor)
    }

    fn winners(&self, core: &EventCore) -> Vec<ActorId> {
        let mut best: Option<(ActorId, u32, u32)> = None;

        for actor in core.active_actors() {
            let Some(session) = core.session(actor) else { continue };

            let better = match best {
                None => true,
                Some((_, kills, deaths)) => {
                    session.kills > kills || (session.kills == kills && session.deaths < deaths)
                }
            };
            if better {
                best = Some((actor, session.kills, session.deaths));
            }
        }

        best.map(|(actor, _, _)| vec![actor]).unwrap_or_default()
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
