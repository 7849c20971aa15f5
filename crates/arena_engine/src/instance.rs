use crate::mode::{EventBehaviour, ModeProfile};
use crate::outbox::Outbox;
use crate::scheduler::{EngineAction, Scheduler};
use crate::session::{OobTick, PlayerSession};
use crate::settings::EngineSettings;
use crate::spawns::SpawnSelector;
use crate::team::TeamRoster;
use crate::timer::{RoundTimer, TimerTick};
use arena_core::{
    ActorId, DamageInfo, DamageVerdict, DropPolicy, EventConfig, EventResults, EventStatus, Notice,
    ObjectId, Position, Providers, ScoreEntry, Team, WorldCommand,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use slotmap::{new_key_type, SlotMap};
use std::collections::HashMap;

new_key_type! { struct SessionKey; }

/// Why a session is being torn down.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LeaveReason {
    Voluntary,
    Disconnected,
    Ejected,
}

/// The data half of a running match: everything the state machine owns,
/// exposed to mode behaviours through its methods. Hook dispatch lives on
/// [`EventInstance`] so behaviours and state never borrow each other.
pub struct EventCore {
    pub name: String,
    pub config: EventConfig,
    pub profile: ModeProfile,
    pub settings: EngineSettings,
    pub status: EventStatus,
    pub round: u32,
    pub godmode: bool,
    pub team_a: TeamRoster,
    pub team_b: Option<TeamRoster>,
    pub scores: Vec<ScoreEntry>,
    pub last_result: EventResults,
    pub outbox: Outbox,
    closed: bool,
    destroying: bool,
    unloading: bool,
    timer: RoundTimer,
    scheduler: Scheduler,
    sessions: SlotMap<SessionKey, PlayerSession>,
    by_actor: HashMap<ActorId, SessionKey>,
    active: Vec<SessionKey>,
    pending: Vec<SessionKey>,
    spectate_targets: Vec<ActorId>,
    tracked_objects: Vec<ObjectId>,
    rng: StdRng,
    now: u64,
    id_serial: u64,
    next_id: u64,
}

impl EventCore {
    fn new(
        config: EventConfig,
        profile: ModeProfile,
        settings: EngineSettings,
        team_a_spawns: SpawnSelector,
        team_b_spawns: Option<SpawnSelector>,
        id_serial: u64,
        seed: u64,
    ) -> Self {
        let team_a = TeamRoster::new(Team::A, &config.team_a, &profile.team_a_name, team_a_spawns);
        let team_b = team_b_spawns
            .map(|spawns| TeamRoster::new(Team::B, &config.team_b, &profile.team_b_name, spawns));

        Self {
            name: config.event_name.clone(),
            config,
            profile,
            settings,
            status: EventStatus::Open,
            round: 0,
            godmode: true,
            team_a,
            team_b,
            scores: Vec::new(),
            last_result: EventResults::default(),
            outbox: Outbox::default(),
            closed: false,
            destroying: false,
            unloading: false,
            timer: RoundTimer::new(),
            scheduler: Scheduler::new(),
            sessions: SlotMap::with_key(),
            by_actor: HashMap::new(),
            active: Vec::new(),
            pending: Vec::new(),
            spectate_targets: Vec::new(),
            tracked_objects: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
            now: 0,
            id_serial,
            next_id: 0,
        }
    }

    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn session(&self, actor: ActorId) -> Option<&PlayerSession> {
        self.by_actor.get(&actor).map(|key| &self.sessions[*key])
    }

    pub fn session_mut(&mut self, actor: ActorId) -> Option<&mut PlayerSession> {
        let key = *self.by_actor.get(&actor)?;
        self.sessions.get_mut(key)
    }

    pub fn active_actors(&self) -> Vec<ActorId> {
        self.active.iter().map(|key| self.sessions[*key].actor).collect()
    }

    pub fn pending_actors(&self) -> Vec<ActorId> {
        self.pending.iter().map(|key| self.sessions[*key].actor).collect()
    }

    fn all_actors(&self) -> Vec<ActorId> {
        let mut actors = self.active_actors();
        actors.extend(self.pending_actors());
        actors
    }

    fn is_pending(&self, actor: ActorId) -> bool {
        match self.by_actor.get(&actor) {
            Some(key) => self.pending.contains(key),
            None => false,
        }
    }

    pub fn active_count(&self) -> u32 {
        self.active.len() as u32
    }

    pub fn pending_count(&self) -> u32 {
        self.pending.len() as u32
    }

    pub fn alive_count(&self) -> u32 {
        self.active
            .iter()
            .filter(|key| !self.sessions[**key].dead)
            .count() as u32
    }

    pub fn alive_actors(&self) -> Vec<ActorId> {
        self.active
            .iter()
            .map(|key| &self.sessions[*key])
            .filter(|session| !session.dead)
            .map(|session| session.actor)
            .collect()
    }

    pub fn team_count(&self, team: Team) -> u32 {
        self.active
            .iter()
            .filter(|key| self.sessions[**key].team == team)
            .count() as u32
    }

    pub fn team_alive_count(&self, team: Team) -> u32 {
        self.active
            .iter()
            .map(|key| &self.sessions[*key])
            .filter(|session| session.team == team && !session.dead)
            .count() as u32
    }

    pub fn has_minimum_required(&self) -> bool {
        self.active_count() > 0 && self.active_count() >= self.config.minimum_players
    }

    pub fn spectate_targets(&self) -> &[ActorId] {
        &self.spectate_targets
    }

    pub fn broadcast(&mut self, notice: Notice) {
        self.outbox.broadcast(notice);
    }

    pub fn notify(&mut self, actor: ActorId, notice: Notice) {
        self.outbox.notify(actor, notice);
    }

    pub fn notify_team(&mut self, team: Team, notice: Notice) {
        self.outbox.notify_team(team, notice);
    }

    /// Server-wide announcement (win messages and the like).
    pub fn announce(&mut self, notice: Notice) {
        self.outbox.announce(notice);
    }

    pub fn command(&mut self, command: WorldCommand) {
        self.outbox.command(command);
    }

    pub fn schedule(&mut self, delay_secs: u32, action: EngineAction) {
        self.scheduler.schedule(delay_secs, action);
    }

    pub fn cancel_scheduled(&mut self, action: &EngineAction) {
        self.scheduler.cancel(action);
    }

    pub fn schedule_mode_action(&mut self, delay_secs: u32, tag: u32, actor: Option<ActorId>) {
        self.scheduler
            .schedule(delay_secs, EngineAction::ModeAction { tag, actor });
    }

    /// Start the match countdown for a mode-owned phase. Replaces whatever
    /// timer is running; there is never more than one per match.
    pub fn start_mode_timer(&mut self, seconds: u32, label: &str, tag: u32) {
        self.start_timer(seconds, Some(label.to_string()), EngineAction::ModeTimer(tag));
    }

    fn start_timer(&mut self, seconds: u32, label: Option<String>, action: EngineAction) {
        if self.timer.start(seconds, label, action) {
            self.broadcast(Notice::TimerCleared);
        }
    }

    pub fn stop_timer(&mut self) {
        if self.timer.stop() {
            self.broadcast(Notice::TimerCleared);
        }
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Uniformly random index below `len`.
    pub fn rng_index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    fn alloc_id(&mut self) -> u64 {
        let id = (self.id_serial << 32) | self.next_id;
        self.next_id += 1;
        id
    }

    pub fn allocate_object(&mut self) -> ObjectId {
        ObjectId(self.alloc_id())
    }

    pub fn track_object(&mut self, object: ObjectId) {
        self.tracked_objects.push(object);
    }

    pub fn untrack_object(&mut self, object: ObjectId) -> bool {
        match self.tracked_objects.iter().position(|o| *o == object) {
            Some(index) => {
                self.tracked_objects.swap_remove(index);
                true
            }
            None => false,
        }
    }

    pub fn tracks_object(&self, object: ObjectId) -> bool {
        self.tracked_objects.contains(&object)
    }

    pub fn tracked_object_count(&self) -> usize {
        self.tracked_objects.len()
    }

    /// Spawn a mode-owned world object and track it for cleanup.
    pub fn spawn_hostile(&mut self, position: Position, kind: &str, kit: Option<String>) -> ObjectId {
        let object = self.allocate_object();
        self.command(WorldCommand::SpawnHostile {
            object,
            position,
            kind: kind.to_string(),
            kit,
        });
        self.track_object(object);
        object
    }

    /// Destroy every world object this match spawned. Runs in reverse so
    /// late arrivals go first, like any teardown.
    pub fn cleanup_objects(&mut self) {
        for index in (0..self.tracked_objects.len()).rev() {
            let object = self.tracked_objects[index];
            self.outbox.command(WorldCommand::DestroyObject { object });
        }
        self.tracked_objects.clear();
    }

    pub fn roster(&self, team: Team) -> &TeamRoster {
        match team {
            Team::B => self.team_b.as_ref().unwrap_or(&self.team_a),
            _ => &self.team_a,
        }
    }

    /// Draw a spawn point from the team's pool (side A for non-team play).
    pub fn spawn_point(&mut self, team: Team) -> Option<Position> {
        let point = {
            let Self {
                team_a,
                team_b,
                rng,
                ..
            } = self;
            let roster = match team {
                Team::B => team_b.as_mut().unwrap_or(team_a),
                _ => team_a,
            };
            roster.spawns.get_spawn_point(rng)
        };

        if point.is_none() {
            tracing::warn!(event = %self.name, team = ?team, "spawn pool is empty");
        }
        point
    }

    fn mirrors_native_teams(&self) -> bool {
        self.profile.team_based && self.profile.native_teams && self.settings.use_native_teams
    }

    fn add_to_team(&mut self, actor: ActorId, team: Team) {
        if !self.mirrors_native_teams() {
            return;
        }

        let Self {
            team_a,
            team_b,
            next_id,
            id_serial,
            outbox,
            ..
        } = self;
        let roster = match team {
            Team::B => team_b.as_mut().unwrap_or(team_a),
            _ => team_a,
        };

        let serial = *id_serial;
        let mut next_group = || {
            let id = (serial << 32) | *next_id;
            *next_id += 1;
            id
        };

        roster.add(actor, &mut next_group, outbox);
    }

    fn remove_from_team(&mut self, actor: ActorId, team: Team) {
        if !self.mirrors_native_teams() {
            return;
        }

        let Self {
            team_a,
            team_b,
            outbox,
            ..
        } = self;
        let roster = match team {
            Team::B => team_b.as_mut().unwrap_or(team_a),
            _ => team_a,
        };
        roster.remove(actor, outbox);
    }

    fn merge_outbox(&mut self, other: Outbox) {
        self.outbox.commands.extend(other.commands);
        self.outbox.broadcasts.extend(other.broadcasts);
        self.outbox.claimed.extend(other.claimed);
        self.outbox.released.extend(other.released);
    }

    /// The side with fewer active members, for default team assignment.
    pub fn smaller_team(&self) -> Team {
        if self.team_count(Team::A) > self.team_count(Team::B) {
            Team::B
        } else {
            Team::A
        }
    }

    /// Even out team sizes by moving random members from the larger side
    /// until the difference is at most one.
    pub fn balance_teams(&mut self) {
        let a_count = self.team_count(Team::A);
        let b_count = self.team_count(Team::B);

        let (from, difference) = if a_count > b_count + 1 {
            (Team::A, a_count - b_count)
        } else if b_count > a_count + 1 {
            (Team::B, b_count - a_count)
        } else {
            return;
        };

        self.broadcast(Notice::TeamsUnbalanced);

        let mut candidates: Vec<ActorId> = self
            .active
            .iter()
            .map(|key| &self.sessions[*key])
            .filter(|session| session.team == from)
            .map(|session| session.actor)
            .collect();

        for _ in 0..(difference / 2) {
            if candidates.is_empty() {
                break;
            }
            let index = self.rng_index(candidates.len());
            let actor = candidates.swap_remove(index);
            let to = from.other();

            if let Some(session) = self.session_mut(actor) {
                session.team = to;
            }
            self.remove_from_team(actor, from);
            self.add_to_team(actor, to);
            self.notify(actor, Notice::TeamChanged { team: to });
        }
    }

    /// The standard death pipeline: death bookkeeping on the victim,
    /// assist credit for the contributor history, kill credit and reward
    /// for the attacker, and the kill feed.
    pub fn standard_death(
        &mut self,
        victim: ActorId,
        attacker: Option<ActorId>,
        damage: &DamageInfo,
        respawn_secs: u32,
        credit_killer: bool,
    ) {
        let auto_respawn = self.settings.auto_respawn;
        let (victim_name, out_of_bounds, assists) = match self.session_mut(victim) {
            Some(session) => {
                session.deaths += 1;
                session.auto_respawn = auto_respawn;
                session.start_respawn_countdown(respawn_secs);
                (
                    session.display_name.clone(),
                    session.is_out_of_bounds(),
                    session.take_assists(attacker),
                )
            }
            None => return,
        };

        for contributor in assists {
            if let Some(session) = self.session_mut(contributor) {
                session.assists += 1;
            }
        }

        let mut killer_name = None;
        if let Some(attacker) = attacker.filter(|a| *a != victim) {
            if let Some(session) = self.session_mut(attacker) {
                if credit_killer {
                    session.kills += 1;
                }
                killer_name = Some(session.display_name.clone());
            }

            if killer_name.is_some() && credit_killer {
                let rewards = &self.config.rewards;
                let amount = if damage.headshot && rewards.headshot_amount > 0 {
                    rewards.headshot_amount
                } else {
                    rewards.kill_amount
                };
                let kind = rewards.kind;
                if amount > 0 {
                    self.command(WorldCommand::GrantReward {
                        actor: attacker,
                        kind,
                        amount,
                    });
                }
            }
        }

        if self.settings.broadcast_kills {
            self.broadcast(Notice::KillFeed {
                victim: victim_name,
                killer: killer_name,
                out_of_bounds,
            });
        }
    }

    fn snapshot_result(&mut self, team_score: Option<(i32, i32)>) {
        self.last_result = EventResults {
            event_name: self.name.clone(),
            event_type: self.profile.mode_id.clone(),
            team_score,
            scores: self.scores.clone(),
        };
    }
}

/// A running match: the state machine plus the mode's behaviour object.
/// All mutation enters through the director on the engine tick.
pub struct EventInstance {
    pub core: EventCore,
    behaviour: Box<dyn EventBehaviour>,
}

impl EventInstance {
    /// Construct an instance in `Open` status. Spawn pools are loaded from
    /// the provider here; the behaviour gets its initialization hook.
    pub fn open(
        config: EventConfig,
        profile: ModeProfile,
        behaviour: Box<dyn EventBehaviour>,
        settings: EngineSettings,
        providers: &Providers,
        id_serial: u64,
        seed: u64,
    ) -> Self {
        let team_a_spawns = SpawnSelector::new(
            providers
                .spawns
                .load_spawns(&config.team_a.spawn_file)
                .unwrap_or_default(),
        );
        let team_b_spawns = if profile.team_based {
            Some(SpawnSelector::new(
                providers
                    .spawns
                    .load_spawns(&config.team_b.spawn_file)
                    .unwrap_or_default(),
            ))
        } else {
            None
        };

        let core = EventCore::new(
            config,
            profile,
            settings,
            team_a_spawns,
            team_b_spawns,
            id_serial,
            seed,
        );

        let mut instance = Self {
            core,
            behaviour,
        };
        instance.behaviour.on_initialized(&mut instance.core, providers);
        instance
    }

    /// One engine second: run due deferred actions, advance the timer, and
    /// tick per-session countdowns. The scheduler drains first so anything
    /// scheduled while handling this tick fires on a later one.
    pub fn tick(&mut self) {
        self.core.now += 1;

        for action in self.core.scheduler.tick() {
            self.apply_action(action);
        }

        match self.core.timer.tick() {
            TimerTick::Idle => {}
            TimerTick::Display { remaining, label } => {
                self.core.broadcast(Notice::TimerTick { remaining, label });
            }
            TimerTick::Expired(action) => self.apply_action(action),
        }

        for actor in self.core.all_actors() {
            let countdown_done = self
                .core
                .session_mut(actor)
                .map(PlayerSession::tick_respawn)
                .unwrap_or(false);
            if countdown_done {
                if self.behaviour.can_respawn(&self.core, actor) {
                    self.respawn_player(actor);
                }
                continue;
            }

            let oob = self
                .core
                .session_mut(actor)
                .and_then(PlayerSession::tick_out_of_bounds);
            match oob {
                Some(OobTick::Countdown(seconds)) => {
                    self.core.notify(actor, Notice::OutOfBounds { seconds });
                }
                Some(OobTick::Expired) => {
                    if self.core.status == EventStatus::Started {
                        self.handle_death(actor, None, &DamageInfo::default());
                    } else {
                        if let Some(session) = self.core.session_mut(actor) {
                            session.clear_out_of_bounds();
                        }
                        self.spawn_player(actor, false, false);
                    }
                }
                None => {}
            }
        }
    }

    fn apply_action(&mut self, action: EngineAction) {
        match action {
            EngineAction::StartEvent => self.start_event(),
            EngineAction::StartNextRound => self.start_next_round(),
            EngineAction::EndRound => self.end_round(),
            EngineAction::EndEvent => self.end_event(),
            EngineAction::Respawn(actor) => self.respawn_player(actor),
            EngineAction::IssueKit(actor) => self.issue_kit(actor),
            EngineAction::ModeTimer(tag) => {
                self.behaviour.on_mode_timer(&mut self.core, tag);
            }
            EngineAction::ModeAction { tag, actor } => {
                self.behaviour.on_mode_action(&mut self.core, tag, actor);
            }
        }
    }

    // ----- joining and leaving -----

    /// Admit an actor. Mid-round joins become pending spectators when the
    /// mode disallows live entry; everyone else spawns immediately.
    pub fn join(
        &mut self,
        actor: ActorId,
        display_name: String,
        team_preference: Team,
    ) -> Result<(), String> {
        if self.core.closed {
            return Err("the event is closed".to_string());
        }

        if self.core.active_count() + self.core.pending_count() >= self.core.config.maximum_players {
            return Err("the event is full".to_string());
        }

        if let Some(reason) = self.behaviour.can_join(&self.core, actor) {
            return Err(reason);
        }

        let as_spectator = self.core.status == EventStatus::Started
            && !self.behaviour.can_enter_during_round();

        let team = self.resolve_team(team_preference, as_spectator);

        let mut session = PlayerSession::new(actor, display_name.clone());
        session.team = team;
        self.assign_default_kit(&mut session, team);

        let key = self.core.sessions.insert(session);
        self.core.by_actor.insert(actor, key);
        self.core.outbox.claimed.push(actor);

        self.core.command(WorldCommand::SnapshotActor { actor });
        self.core.add_to_team(actor, team);

        if !self.core.config.zone_id.is_empty() {
            let zone = self.core.config.zone_id.clone();
            self.core.command(WorldCommand::AddZoneWhitelist { zone, actor });
        }

        if self.core.settings.broadcast_joins {
            self.core.broadcast(Notice::PlayerJoined { name: display_name });
        }

        if as_spectator {
            self.core.pending.push(key);
            self.prepare_pending_spectator(actor, team);
        } else {
            self.core.active.push(key);
            let give_kit = self.core.status == EventStatus::Started;
            self.spawn_player(actor, give_kit, true);
            self.check_prestart();
        }

        Ok(())
    }

    fn resolve_team(&mut self, preference: Team, as_spectator: bool) -> Team {
        if !self.core.profile.team_based {
            return Team::None;
        }

        let mut team = if self.core.profile.can_select_team && preference != Team::None {
            preference
        } else {
            self.behaviour.assign_team(&self.core)
        };
        if team == Team::None {
            team = self.core.smaller_team();
        }
        if as_spectator {
            team = self.behaviour.spectating_team(team);
        }
        team
    }

    fn assign_default_kit(&self, session: &mut PlayerSession, team: Team) {
        let kits = &self.core.config.team(team).kits;
        if !self.core.profile.class_selection || kits.len() == 1 {
            session.kit = kits.first().cloned();
        }
    }

    fn prepare_pending_spectator(&mut self, actor: ActorId, team: Team) {
        self.core.command(WorldCommand::StripInventory { actor });
        self.core.command(WorldCommand::ResetVitals { actor });

        if let Some(position) = self.core.spawn_point(team) {
            self.core.command(WorldCommand::Teleport {
                actor,
                position,
                sleep: false,
            });
        }

        self.begin_spectating(actor);
        self.core.notify(actor, Notice::JoinedAsSpectator);
    }

    /// Re-evaluate the prestart condition after an admission while the
    /// event is not running. A countdown that is already running is never
    /// reset by late joins.
    fn check_prestart(&mut self) {
        if !matches!(self.core.status, EventStatus::Open | EventStatus::Finished) {
            return;
        }

        if self.core.has_minimum_required() {
            self.core.status = EventStatus::Prestarting;
            let status = self.core.status;
            self.core.broadcast(Notice::StatusChanged { status });

            let seconds = self.core.settings.prestart_secs;
            self.core.broadcast(Notice::RoundStartsIn { seconds });
            self.core
                .start_timer(seconds, Some("round start".into()), EngineAction::StartEvent);
        } else {
            let needed = self
                .core
                .config
                .minimum_players
                .saturating_sub(self.core.active_count());
            self.core.broadcast(Notice::WaitingForPlayers { needed });
        }
    }

    /// Tear down an actor's session: restore their pre-match state, undo
    /// team and zone membership, and end the event when participation
    /// drops below the minimum.
    pub fn leave(&mut self, actor: ActorId, reason: LeaveReason) {
        let Some(key) = self.core.by_actor.get(&actor).copied() else {
            return;
        };

        let (team, dead, spectating, display_name) = {
            let session = &self.core.sessions[key];
            (
                session.team,
                session.dead,
                session.spectating,
                session.display_name.clone(),
            )
        };

        if spectating {
            self.finish_spectating(actor);
        }

        if dead || spectating {
            self.core.command(WorldCommand::ResetVitals { actor });
            if let Some(position) = self.core.spawn_point(team) {
                self.core.command(WorldCommand::Teleport {
                    actor,
                    position,
                    sleep: false,
                });
            }
        }

        self.core.command(WorldCommand::StripInventory { actor });
        self.core.command(WorldCommand::ResetVitals { actor });
        self.core.command(WorldCommand::UnlockClothing { actor });

        if !self.core.config.zone_id.is_empty() {
            let zone = self.core.config.zone_id.clone();
            self.core
                .command(WorldCommand::RemoveZoneWhitelist { zone, actor });
        }

        self.core.remove_from_team(actor, team);

        self.core.sessions.remove(key);
        self.core.by_actor.remove(&actor);
        self.core.active.retain(|k| *k != key);
        self.core.pending.retain(|k| *k != key);
        self.core.outbox.released.push(actor);

        if self.core.settings.restore_players {
            self.core.command(WorldCommand::RestoreActor { actor });
        }

        self.rebuild_spectate_targets();
        self.update_spectator_targets(Some(actor));

        if self.core.settings.broadcast_leaves && !self.core.destroying {
            self.core.broadcast(Notice::PlayerLeft { name: display_name });
        }

        tracing::debug!(event = %self.core.name, actor = actor.0, ?reason, "session removed");

        if !self.core.destroying
            && self.core.status != EventStatus::Finished
            && !self.core.has_minimum_required()
        {
            self.core.broadcast(Notice::NotEnoughToContinue);
            self.end_event();
        }

        self.behaviour.on_participant_left(&mut self.core, actor);
    }

    /// Set a participant's class. Respawns them immediately when they were
    /// held dead waiting for the choice.
    pub fn select_class(&mut self, actor: ActorId, kit: &str) -> Result<(), String> {
        let Some(session) = self.core.session(actor) else {
            return Err("not in this event".to_string());
        };
        let team = session.team;

        if !self.core.config.team(team).kits.iter().any(|k| k == kit) {
            return Err(format!("unknown class: {kit}"));
        }

        let respawn_now = match self.core.session_mut(actor) {
            Some(session) => {
                session.kit = Some(kit.to_string());
                session.dead && session.can_respawn()
            }
            None => false,
        };
        if respawn_now {
            self.respawn_player(actor);
        }

        Ok(())
    }

    // ----- state machine -----

    pub fn close_event(&mut self) {
        self.core.closed = true;
        self.core.broadcast(Notice::EventClosed);
    }

    pub fn start_event(&mut self) {
        self.behaviour.on_event_start(&mut self.core);

        self.merge_pending(false);

        if !self.core.has_minimum_required() {
            self.core.broadcast(Notice::NotEnoughToStart);
            self.end_event();
            return;
        }

        self.core.round = 0;
        self.update_scores();
        let team_score = self.team_score_pair();
        self.core.snapshot_result(team_score);
        self.core.stop_timer();

        self.core.status = EventStatus::Started;
        self.core.broadcast(Notice::StatusChanged {
            status: EventStatus::Started,
        });

        if !self.core.config.zone_id.is_empty() {
            let zone = self.core.config.zone_id.clone();
            self.core
                .command(WorldCommand::SetZoneEject { zone, enabled: true });
        }

        self.start_next_round();

        if self.behaviour.close_on_start(&self.core) {
            self.close_event();
        }
    }

    pub fn start_next_round(&mut self) {
        if !self.core.has_minimum_required() {
            self.core.broadcast(Notice::NotEnoughToContinue);
            self.end_event();
            return;
        }

        self.core.cleanup_objects();
        self.behaviour.on_round_prepare(&mut self.core);

        self.core.round += 1;

        if self.core.config.time_limit > 0 {
            let limit = self.core.config.time_limit;
            self.core
                .start_timer(limit, None, EngineAction::EndRound);
        }

        self.core.godmode = false;

        // Between-round joiners fold into the roster here; the respawn
        // sweep below places them.
        if self.behaviour.can_enter_between_rounds() {
            self.merge_pending(false);
        }

        for actor in self.core.active_actors() {
            if !self.behaviour.can_respawn(&self.core, actor) {
                continue;
            }
            let dead = self.core.session(actor).map(|s| s.dead).unwrap_or(false);
            if dead {
                self.respawn_player(actor);
            } else {
                self.spawn_player(actor, true, false);
            }
        }

        self.behaviour.on_round_start(&mut self.core);

        self.rebuild_spectate_targets();
        self.update_spectator_targets(None);
        self.update_scores();
    }

    pub fn end_round(&mut self) {
        self.behaviour.on_round_end(&mut self.core);
        self.update_scores();

        if self.core.round >= self.core.config.rounds_to_play {
            self.core.broadcast(Notice::EventFinished);
            self.core.schedule(1, EngineAction::EndEvent);
            return;
        }

        self.core.godmode = true;
        self.core.stop_timer();
        let team_score = self.team_score_pair();
        self.core.snapshot_result(team_score);

        self.process_winners();

        for actor in self.core.active_actors() {
            if let Some(session) = self.core.session_mut(actor) {
                session.reset_statistics();
            }
            if !self.behaviour.can_respawn(&self.core, actor) {
                continue;
            }
            if self.core.session(actor).map(|s| s.dead).unwrap_or(false) {
                if let Some(session) = self.core.session_mut(actor) {
                    session.on_round_finished();
                }
                self.respawn_player(actor);
            }
        }

        if self.behaviour.can_enter_between_rounds() {
            self.merge_pending(true);
        }

        self.rebuild_spectate_targets();
        self.update_spectator_targets(None);

        let interval = self.core.settings.round_interval_secs;
        self.core.broadcast(Notice::NextRoundStartsIn {
            round: self.core.round,
            seconds: interval,
        });
        self.core
            .start_timer(interval, Some("next round".into()), EngineAction::StartNextRound);
    }

    pub fn end_event(&mut self) {
        if self.core.status == EventStatus::Finished {
            return;
        }

        self.behaviour.on_event_end(&mut self.core);

        self.core.stop_timer();
        self.core.status = EventStatus::Finished;
        self.core.broadcast(Notice::StatusChanged {
            status: EventStatus::Finished,
        });
        self.core.godmode = true;

        self.update_scores();
        let team_score = self.team_score_pair();
        self.core.snapshot_result(team_score);
        self.core.cleanup_objects();

        if !self.core.config.zone_id.is_empty() {
            let zone = self.core.config.zone_id.clone();
            self.core
                .command(WorldCommand::SetZoneEject { zone, enabled: false });
        }

        if !self.core.unloading {
            self.process_winners();
        }

        self.stop_all_spectating();

        for actor in self.core.active_actors() {
            if let Some(session) = self.core.session_mut(actor) {
                session.reset_statistics();
            }
            if self.core.session(actor).map(|s| s.dead).unwrap_or(false) {
                self.respawn_player(actor);
            }
        }

        if !self.core.unloading {
            if self.core.settings.start_on_finish {
                let interval = self.core.settings.round_interval_secs;
                self.core.broadcast(Notice::NextEventStartsIn { seconds: interval });
                self.core
                    .start_timer(interval, Some("next event".into()), EngineAction::StartEvent);
            } else {
                self.eject_all();
                self.core.status = EventStatus::Open;
                self.core.broadcast(Notice::StatusChanged {
                    status: EventStatus::Open,
                });
            }

            self.rebuild_spectate_targets();
        }
    }

    /// Release everything the match owns. Forces every session through the
    /// leave path; safe to call from inside a leave or end callback.
    pub fn destroy(&mut self, unloading: bool) {
        if self.core.destroying {
            return;
        }
        self.core.destroying = true;
        self.core.unloading = unloading;

        self.core.cleanup_objects();
        self.stop_all_spectating();
        self.eject_all();

        let mut outbox = Outbox::default();
        self.core.team_a.destroy(&mut outbox);
        if let Some(team_b) = &mut self.core.team_b {
            team_b.destroy(&mut outbox);
        }
        self.core.merge_outbox(outbox);

        self.core.stop_timer();
        self.core.scheduler.clear();
    }

    fn eject_all(&mut self) {
        for actor in self.core.all_actors().into_iter().rev() {
            self.leave(actor, LeaveReason::Ejected);
        }
    }

    /// Move pending spectators into the active roster. When `respawn` is
    /// set they are reset and spawned into live play immediately.
    fn merge_pending(&mut self, respawn: bool) {
        let pending: Vec<SessionKey> = self.core.pending.drain(..).collect();

        for key in pending {
            self.core.active.push(key);
            let actor = self.core.sessions[key].actor;

            if respawn {
                if self.core.sessions[key].spectating {
                    self.finish_spectating(actor);
                }
                let give_kit = self.core.status == EventStatus::Started;
                self.spawn_player(actor, give_kit, false);
            }
        }
    }

    // ----- spawning, kits, respawn -----

    /// Place a participant at a team spawn with grace invincibility.
    /// Kit issuance is staged onto the next tick.
    pub fn spawn_player(&mut self, actor: ActorId, give_kit: bool, sleep: bool) {
        let (team, spectating) = match self.core.session(actor) {
            Some(session) => (session.team, session.spectating),
            None => return,
        };

        if spectating {
            self.finish_spectating(actor);
        }

        self.core.command(WorldCommand::StripInventory { actor });
        self.core.command(WorldCommand::ResetVitals { actor });

        if let Some(position) = self.core.spawn_point(team) {
            self.core.command(WorldCommand::Teleport {
                actor,
                position,
                sleep,
            });
        }

        let needs_class = self
            .core
            .session(actor)
            .map(|s| s.kit.is_none())
            .unwrap_or(false);
        if needs_class && self.core.profile.class_selection {
            if let Some(session) = self.core.session_mut(actor) {
                session.dead = true;
            }
            self.core.notify(actor, Notice::SelectClass);
            return;
        }

        if give_kit {
            self.core.schedule(0, EngineAction::IssueKit(actor));
        }

        let now = self.core.now;
        let grace = self.core.settings.invincibility_secs;
        if let Some(session) = self.core.session_mut(actor) {
            session.apply_invincibility(now, grace);
        }

        self.behaviour.on_spawned(&mut self.core, actor);

        self.rebuild_spectate_targets();
        self.update_spectator_targets(None);
    }

    /// The staged half of spawning: hand over the kit (and the team
    /// clothing override) one tick after the teleport.
    fn issue_kit(&mut self, actor: ActorId) {
        let Some(session) = self.core.session(actor) else { return };
        if session.dead {
            return;
        }

        match session.kit.clone() {
            Some(kit) => {
                self.core.command(WorldCommand::IssueKit { actor, kit });

                let team = self.core.session(actor).map(|s| s.team).unwrap_or_default();
                if self.core.profile.team_based {
                    let clothing = self.core.roster(team).clothing_kit.clone();
                    if !clothing.is_empty() {
                        self.core
                            .command(WorldCommand::IssueKit { actor, kit: clothing });
                    }
                }
            }
            None => {
                tracing::warn!(event = %self.core.name, actor = actor.0, "no kit to issue");
            }
        }

        self.behaviour.on_kit_issued(&mut self.core, actor);
    }

    pub fn respawn_player(&mut self, actor: ActorId) {
        let Some(session) = self.core.session_mut(actor) else { return };
        session.dead = false;
        session.start_respawn_countdown(0);
        session.clear_out_of_bounds();

        let give_kit = self.core.status == EventStatus::Started;
        self.spawn_player(actor, give_kit, false);
    }

    /// A respawn requested from outside (the death screen), honored once
    /// the countdown has elapsed and the mode allows it.
    pub fn respawn_request(&mut self, actor: ActorId) {
        let Some(session) = self.core.session(actor) else { return };
        if session.dead && session.can_respawn() && !session.spectating {
            if self.behaviour.can_respawn(&self.core, actor) {
                self.respawn_player(actor);
            }
        }
    }

    // ----- damage and death -----

    /// Decide what happens to an incoming hit. Blocked damage records no
    /// contributor entry.
    pub fn on_damage(
        &mut self,
        victim: ActorId,
        attacker: Option<ActorId>,
        _damage: &DamageInfo,
    ) -> DamageVerdict {
        let now = self.core.now;
        let window = self.core.settings.assist_window_secs;
        let promote = self.core.settings.assist_promote_repeat;

        let Some(session) = self.core.session(victim) else {
            return DamageVerdict::Unchanged;
        };

        if self.core.godmode
            || session.dead
            || session.spectating
            || session.is_invincible(now)
        {
            return DamageVerdict::Blocked;
        }

        let modifier = self.behaviour.damage_modifier(&self.core, victim, attacker);

        if let Some(session) = self.core.session_mut(victim) {
            session.record_hit(attacker, now, window, promote);
        }

        if (modifier - 1.0).abs() > f32::EPSILON {
            DamageVerdict::Scaled(modifier)
        } else {
            DamageVerdict::Unchanged
        }
    }

    /// A participant died. Applies the drop policy, flips the session to
    /// dead, lets the mode resolve crediting and round consequences, then
    /// refreshes the scoreboard. Returns false when the actor has no
    /// session here.
    pub fn handle_death(
        &mut self,
        victim: ActorId,
        attacker: Option<ActorId>,
        damage: &DamageInfo,
    ) -> bool {
        let Some(session) = self.core.session(victim) else {
            return false;
        };
        if session.dead {
            return true;
        }

        let policy = self.core.settings.drop_on_death;
        if policy != DropPolicy::Nothing && self.behaviour.drops_allowed(policy) {
            let object = self.core.allocate_object();
            self.core.command(WorldCommand::SpawnDrop {
                object,
                actor: victim,
                policy,
            });
            self.core.track_object(object);
        }

        if let Some(session) = self.core.session_mut(victim) {
            session.dead = true;
        }
        self.core.command(WorldCommand::StripInventory { actor: victim });

        self.rebuild_spectate_targets();
        self.update_spectator_targets(Some(victim));

        let attacker = attacker.filter(|a| *a != victim);
        self.behaviour
            .on_death(&mut self.core, victim, attacker, damage);

        self.update_scores();
        true
    }

    /// Routed from the world when a tracked object dies.
    pub fn on_object_destroyed(&mut self, object: ObjectId, by: Option<ActorId>) {
        if !self.core.untrack_object(object) {
            return;
        }
        self.behaviour
            .on_object_destroyed(&mut self.core, object, by);
        self.update_scores();
    }

    // ----- zone handling -----

    pub fn on_exited_zone(&mut self, actor: ActorId, zone: &str) {
        if self.core.config.zone_id != zone {
            return;
        }
        let seconds = self.core.settings.out_of_bounds_secs;
        if let Some(session) = self.core.session_mut(actor) {
            if !session.dead && !session.spectating && !session.is_out_of_bounds() {
                session.set_out_of_bounds(seconds);
                self.core.notify(actor, Notice::OutOfBounds { seconds });
            }
        }
    }

    pub fn on_entered_zone(&mut self, actor: ActorId, zone: &str) {
        if self.core.config.zone_id != zone {
            return;
        }
        if let Some(session) = self.core.session_mut(actor) {
            session.clear_out_of_bounds();
        }
    }

    // ----- spectating -----

    fn begin_spectating(&mut self, actor: ActorId) {
        if let Some(session) = self.core.session_mut(actor) {
            if session.spectating {
                return;
            }
            session.spectating = true;
        }
        self.core.command(WorldCommand::BeginSpectate { actor });
        self.cycle_spectate(actor);
    }

    fn finish_spectating(&mut self, actor: ActorId) {
        if let Some(session) = self.core.session_mut(actor) {
            if !session.spectating {
                return;
            }
            session.spectating = false;
            session.spectate_target = None;
        }
        self.core.command(WorldCommand::EndSpectate { actor });
    }

    fn stop_all_spectating(&mut self) {
        for actor in self.core.all_actors() {
            self.finish_spectating(actor);
        }
    }

    /// Recompute who can currently be watched: alive, visible, and not
    /// filtered out by the mode.
    pub fn rebuild_spectate_targets(&mut self) {
        let Self { core, behaviour } = self;

        let targets: Vec<ActorId> = core
            .active
            .iter()
            .map(|key| &core.sessions[*key])
            .filter(|session| !session.dead && !session.spectating)
            .map(|session| session.actor)
            .filter(|actor| behaviour.can_be_spectated(core, *actor))
            .collect();

        core.spectate_targets = targets;
    }

    /// Re-point every spectator whose target disappeared. Active
    /// spectators with nothing left to watch are respawned; pending ones
    /// idle with no target.
    fn update_spectator_targets(&mut self, leaving: Option<ActorId>) {
        for actor in self.core.all_actors() {
            let Some(session) = self.core.session(actor) else { continue };
            if !session.spectating {
                continue;
            }
            let needs_target =
                session.spectate_target.is_none() || session.spectate_target == leaving;
            if !needs_target {
                continue;
            }

            if !self.core.spectate_targets.is_empty() {
                self.cycle_spectate(actor);
            } else if self.core.is_pending(actor) {
                if let Some(session) = self.core.session_mut(actor) {
                    session.spectate_target = None;
                }
                self.core
                    .command(WorldCommand::SetSpectateTarget { actor, target: None });
                self.core.notify(actor, Notice::SpectateTarget { target: None });
            } else {
                self.respawn_player(actor);
            }
        }
    }

    /// Step a spectator to the next live target.
    pub fn cycle_spectate(&mut self, actor: ActorId) {
        let targets = self.core.spectate_targets.clone();

        let Some(session) = self.core.session_mut(actor) else { return };
        if !session.spectating {
            return;
        }

        if targets.is_empty() {
            session.spectate_target = None;
            self.core
                .command(WorldCommand::SetSpectateTarget { actor, target: None });
            self.core.notify(actor, Notice::SpectateTarget { target: None });
            return;
        }

        session.spectate_index = (session.spectate_index + 1) % targets.len();
        let target = targets[session.spectate_index];
        session.spectate_target = Some(target);

        let target_name = self
            .core
            .session(target)
            .map(|s| s.display_name.clone());
        self.core.command(WorldCommand::SetSpectateTarget {
            actor,
            target: Some(target),
        });
        self.core.notify(
            actor,
            Notice::SpectateTarget { target: target_name },
        );
    }

    // ----- scores and winners -----

    /// Rebuild the ranking from the mode's scalar scores and comparator.
    pub fn update_scores(&mut self) {
        let mut entries: Vec<ScoreEntry> = Vec::with_capacity(self.core.active.len());

        for actor in self.core.active_actors() {
            let Some(session) = self.core.session(actor) else { continue };
            let (value1, value2) = self.behaviour.score_values(&self.core, actor);
            entries.push(ScoreEntry {
                position: 0,
                display_name: session.display_name.clone(),
                team: session.team,
                value1,
                value2,
            });
        }

        entries.sort_by(|a, b| self.behaviour.compare_entries(a, b));
        for (index, entry) in entries.iter_mut().enumerate() {
            entry.position = index as u32 + 1;
        }

        self.core.scores = entries;
        self.core.broadcast(Notice::ScoreboardChanged);
    }

    fn team_score_pair(&self) -> Option<(i32, i32)> {
        if self.core.profile.team_based {
            Some((
                self.behaviour.team_score(Team::A),
                self.behaviour.team_score(Team::B),
            ))
        } else {
            None
        }
    }

    /// Resolve winners, announce them and pay out win rewards.
    pub fn process_winners(&mut self) {
        let winners = self.behaviour.winners(&self.core);

        for actor in self.core.active_actors() {
            if !winners.contains(&actor) {
                continue;
            }
            if !self.behaviour.can_issue_rewards(&self.core, actor) {
                continue;
            }
            let amount = self.core.config.rewards.win_amount;
            if amount > 0 {
                let kind = self.core.config.rewards.kind;
                self.core
                    .command(WorldCommand::GrantReward { actor, kind, amount });
            }
        }

        if winners.is_empty() {
            return;
        }

        if self.core.profile.team_based {
            let team = self
                .core
                .session(winners[0])
                .map(|s| s.team)
                .unwrap_or(Team::A);
            let roster = self.core.roster(team);
            let notice = Notice::TeamWin {
                team,
                color: roster.color.clone(),
                name: roster.display_name.clone(),
            };
            self.core.announce(notice);
        } else {
            let names: Vec<String> = winners
                .iter()
                .filter_map(|actor| self.core.session(*actor))
                .map(|session| session.display_name.clone())
                .collect();
            self.core.announce(Notice::EventWin { winners: names });
        }
    }

    // ----- chat -----

    /// Relay a participant's chat to their event only.
    pub fn on_chat(&mut self, actor: ActorId, message: &str) {
        let Some(session) = self.core.session(actor) else { return };
        let from = session.display_name.clone();
        self.core.broadcast(Notice::Chat {
            from,
            message: message.to_string(),
        });
    }
}
