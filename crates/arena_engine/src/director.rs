use crate::errors::{JoinError, OpenError, TriggerError};
use crate::events::{NoticeBuffer, NoticeCursor, PostedBroadcast};
use crate::instance::{EventInstance, LeaveReason};
use crate::mode::{EventMode, ModeProfile};
use crate::settings::EngineSettings;
use arena_core::{
    ActorId, Broadcast, CommandVerdict, DamageInfo, DamageVerdict, EventConfig, EventResults,
    EventStatus, Notice, Position, Providers, ScoreEntry, Team, WorldCommand, WorldEvent,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

const NOTICE_BUFFER_CAPACITY: usize = 1024;

/// Result of opening an event that did not fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpenOutcome {
    Opened,
    /// An instance with that name is already running; opening again is a
    /// no-op.
    AlreadyActive,
}

/// A physical entry point bound to an active event. Walking into it is
/// delivered as a `TriggerEntered` world event.
#[derive(Clone, Debug)]
pub struct EntryTrigger {
    pub id: String,
    pub event: String,
    pub position: Position,
    pub radius: f32,
}

/// Summary of one active event.
#[derive(Clone, Debug)]
pub struct EventInfo {
    pub name: String,
    pub mode: String,
    pub status: EventStatus,
    pub round: u32,
    pub players: u32,
    pub capacity: u32,
}

/// Process-wide registry and router: registered mode strategies, the stored
/// config table, active instances, and the actor→event ownership map used
/// to route world events. All engine state mutation funnels through here on
/// a single logical tick.
pub struct EventDirector {
    settings: EngineSettings,
    providers: Providers,
    modes: HashMap<String, Box<dyn EventMode>>,
    configs: HashMap<String, EventConfig>,
    active: HashMap<String, EventInstance>,
    owner_of: HashMap<ActorId, String>,
    triggers: HashMap<String, EntryTrigger>,
    notices: NoticeBuffer,
    commands: Vec<WorldCommand>,
    rng: StdRng,
    next_serial: u64,
    unloading: bool,
}

impl EventDirector {
    pub fn new(settings: EngineSettings, providers: Providers, seed: u64) -> Self {
        Self {
            settings,
            providers,
            modes: HashMap::new(),
            configs: HashMap::new(),
            active: HashMap::new(),
            owner_of: HashMap::new(),
            triggers: HashMap::new(),
            notices: NoticeBuffer::new(NOTICE_BUFFER_CAPACITY),
            commands: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
            next_serial: 0,
            unloading: false,
        }
    }

    // ----- strategy registry -----

    pub fn register_mode(&mut self, mode_id: &str, mode: Box<dyn EventMode>) {
        self.modes.insert(mode_id.to_string(), mode);
    }

    /// Remove a strategy and force-end every active event running it.
    pub fn unregister_mode(&mut self, mode_id: &str) {
        self.modes.remove(mode_id);

        let names: Vec<String> = self
            .active
            .iter()
            .filter(|(_, instance)| instance.core.profile.mode_id == mode_id)
            .map(|(name, _)| name.clone())
            .collect();

        for name in names {
            self.close(&name);
        }
    }

    pub fn registered_modes(&self) -> Vec<String> {
        let mut modes: Vec<String> = self.modes.keys().cloned().collect();
        modes.sort();
        modes
    }

    /// Render a score entry's columns with the owning mode's formatter.
    pub fn format_score(&self, mode_id: &str, entry: &ScoreEntry) -> Option<(String, String)> {
        self.modes.get(mode_id).map(|mode| mode.format_score(entry))
    }

    // ----- stored configs -----

    pub fn config(&self, name: &str) -> Option<&EventConfig> {
        self.configs.get(name)
    }

    pub fn config_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.configs.keys().cloned().collect();
        names.sort();
        names
    }

    /// Store (or replace) a named config, shutting down any running
    /// instance first and reopening from the new definition.
    pub fn upsert_config(&mut self, config: EventConfig) -> Result<OpenOutcome, OpenError> {
        let name = config.event_name.clone();

        if self.active.contains_key(&name) {
            self.close(&name);
        }
        self.configs.insert(name.clone(), config);

        self.open(&name)
    }

    /// Flip the persisted enabled/disabled flag. Returns false for unknown
    /// names.
    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> bool {
        match self.configs.get_mut(name) {
            Some(config) => {
                config.disabled = !enabled;
                true
            }
            None => false,
        }
    }

    // ----- opening and closing -----

    /// Open a stored event. Opening an already-active name is an idempotent
    /// no-op; every failure carries a human-readable reason.
    pub fn open(&mut self, name: &str) -> Result<OpenOutcome, OpenError> {
        let mut config = self
            .configs
            .get(name)
            .ok_or(OpenError::UnknownEvent)?
            .clone();

        if config.disabled {
            return Err(OpenError::Disabled);
        }

        if self.active.contains_key(name) {
            return Ok(OpenOutcome::AlreadyActive);
        }

        let (profile, behaviour) = {
            let mode = self
                .modes
                .get(&config.event_type)
                .ok_or_else(|| OpenError::UnknownMode(config.event_type.clone()))?;

            // Fill in declared parameter defaults the stored config omits.
            for parameter in mode.parameters() {
                if let Some(default) = &parameter.default {
                    config
                        .params
                        .entry(parameter.field.clone())
                        .or_insert_with(|| default.clone());
                }
            }

            self.validate_config(&config, mode.as_ref())
                .map_err(OpenError::Invalid)?;

            (
                ModeProfile::of(&config.event_type, mode.as_ref()),
                mode.create_behaviour(&config),
            )
        };

        self.next_serial += 1;
        let seed = self.rng.gen::<u64>();
        let instance = EventInstance::open(
            config,
            profile,
            behaviour,
            self.settings.clone(),
            &self.providers,
            self.next_serial,
            seed,
        );

        self.active.insert(name.to_string(), instance);
        self.sync(name);

        tracing::info!(event = name, "event opened");
        Ok(OpenOutcome::Opened)
    }

    /// Open every stored, enabled config, logging failures instead of
    /// aborting.
    pub fn open_all(&mut self) {
        for name in self.config_names() {
            match self.open(&name) {
                Ok(_) => {}
                Err(OpenError::Disabled) => {}
                Err(error) => {
                    tracing::warn!(event = %name, %error, "failed to open event");
                }
            }
        }
    }

    /// Tear down an active instance, releasing everything it owns. Returns
    /// false for unknown names.
    pub fn close(&mut self, name: &str) -> bool {
        let unloading = self.unloading;
        let Some(instance) = self.active.get_mut(name) else {
            return false;
        };
        instance.destroy(unloading);
        self.sync(name);
        self.active.remove(name);

        self.triggers.retain(|_, trigger| trigger.event != name);
        tracing::info!(event = name, "event closed");
        true
    }

    /// Force-end everything; used when the owning process unloads.
    pub fn shutdown(&mut self) {
        self.unloading = true;
        for name in self.active_names() {
            self.close(&name);
        }
        self.triggers.clear();
    }

    fn validate_config(&self, config: &EventConfig, mode: &dyn EventMode) -> Result<(), String> {
        if !mode.offers_class_selection() && config.team_a.kits.is_empty() {
            return Err("you must set at least 1 kit".to_string());
        }
        if config.minimum_players == 0 {
            return Err("you must set the minimum players".to_string());
        }
        if config.maximum_players == 0 {
            return Err("you must set the maximum players".to_string());
        }
        if mode.requires_time_limit() && config.time_limit == 0 {
            return Err("you must set a time limit".to_string());
        }
        if mode.requires_score_limit() && config.score_limit == 0 {
            return Err("you must set a score limit".to_string());
        }

        for kit in &config.team_a.kits {
            if !self.providers.kits.is_kit(kit) {
                return Err(format!("invalid kit: {kit}"));
            }
        }

        let spawns_a = self.providers.spawns.load_spawns(&config.team_a.spawn_file);
        if spawns_a.map(|s| s.is_empty()).unwrap_or(true) {
            return Err(format!("invalid spawn file: {}", config.team_a.spawn_file));
        }

        if mode.is_team_mode() {
            let spawns_b = self.providers.spawns.load_spawns(&config.team_b.spawn_file);
            if spawns_b.map(|s| s.is_empty()).unwrap_or(true) {
                return Err(format!(
                    "invalid second spawn file: {}",
                    config.team_b.spawn_file
                ));
            }

            if config.team_b.kits.is_empty() {
                return Err("you must set at least 1 kit for team B".to_string());
            }
            for kit in &config.team_b.kits {
                if !self.providers.kits.is_kit(kit) {
                    return Err(format!("invalid kit: {kit}"));
                }
            }
        }

        if !config.zone_id.is_empty() && !self.providers.zones.zone_exists(&config.zone_id) {
            return Err(format!("invalid zone ID: {}", config.zone_id));
        }

        for parameter in mode.parameters() {
            match config.param(&parameter.field) {
                Some(value) => {
                    if value.kind() != parameter.kind {
                        return Err(format!(
                            "event parameter {} expects {:?}",
                            parameter.field, parameter.kind
                        ));
                    }
                    if let Some(reason) = mode.validate_parameter(&parameter.field, value) {
                        return Err(reason);
                    }
                }
                None if parameter.required => {
                    return Err(format!(
                        "missing event parameter: ({:?}){}",
                        parameter.kind, parameter.field
                    ));
                }
                None => {}
            }
        }

        Ok(())
    }

    // ----- participation -----

    /// Admit an actor into a named event. At most one session exists per
    /// actor across the whole process.
    pub fn join(
        &mut self,
        actor: ActorId,
        name: &str,
        team_preference: Team,
    ) -> Result<(), JoinError> {
        if self.owner_of.contains_key(&actor) {
            return Err(JoinError::AlreadyInEvent);
        }

        let permission = match self.active.get(name) {
            Some(instance) => instance.core.config.permission.clone(),
            None => return Err(JoinError::NotOpen),
        };
        if !permission.is_empty() && !self.providers.actors.has_permission(actor, &permission) {
            return Err(JoinError::NoPermission);
        }

        let display_name = self.providers.actors.display_name(actor);

        let result = match self.active.get_mut(name) {
            Some(instance) => instance
                .join(actor, display_name, team_preference)
                .map_err(JoinError::Rejected),
            None => Err(JoinError::NotOpen),
        };

        self.sync(name);
        result
    }

    pub fn leave(&mut self, actor: ActorId) {
        self.leave_with(actor, LeaveReason::Voluntary);
    }

    fn leave_with(&mut self, actor: ActorId, reason: LeaveReason) {
        let Some(name) = self.owner_of.get(&actor).cloned() else {
            return;
        };
        if let Some(instance) = self.active.get_mut(&name) {
            instance.leave(actor, reason);
        }
        self.sync(&name);
    }

    /// The event an actor currently has a session in, if any.
    pub fn event_of(&self, actor: ActorId) -> Option<&str> {
        self.owner_of.get(&actor).map(String::as_str)
    }

    pub fn select_class(&mut self, actor: ActorId, kit: &str) -> Result<(), String> {
        let Some(name) = self.owner_of.get(&actor).cloned() else {
            return Err("not taking part in an event".to_string());
        };
        let result = match self.active.get_mut(&name) {
            Some(instance) => instance.select_class(actor, kit),
            None => Err("not taking part in an event".to_string()),
        };
        self.sync(&name);
        result
    }

    /// Step a spectating participant to their next target.
    pub fn cycle_spectate(&mut self, actor: ActorId) {
        let Some(name) = self.owner_of.get(&actor).cloned() else {
            return;
        };
        if let Some(instance) = self.active.get_mut(&name) {
            instance.cycle_spectate(actor);
        }
        self.sync(&name);
    }

    /// Respawn request from the death screen.
    pub fn respawn_request(&mut self, actor: ActorId) {
        let Some(name) = self.owner_of.get(&actor).cloned() else {
            return;
        };
        if let Some(instance) = self.active.get_mut(&name) {
            instance.respawn_request(actor);
        }
        self.sync(&name);
    }

    // ----- world event intake -----

    /// Route a fire-and-forget world event to the owning instance; a no-op
    /// when the acting actor has no session.
    pub fn handle(&mut self, event: WorldEvent) {
        match event {
            WorldEvent::Connected { .. } => {}
            WorldEvent::Disconnected { actor } => {
                self.leave_with(actor, LeaveReason::Disconnected);
            }
            WorldEvent::EnteredZone { actor, zone } => {
                if let Some(name) = self.owner_of.get(&actor).cloned() {
                    if let Some(instance) = self.active.get_mut(&name) {
                        instance.on_entered_zone(actor, &zone);
                    }
                    self.sync(&name);
                }
            }
            WorldEvent::ExitedZone { actor, zone } => {
                if let Some(name) = self.owner_of.get(&actor).cloned() {
                    if let Some(instance) = self.active.get_mut(&name) {
                        instance.on_exited_zone(actor, &zone);
                    }
                    self.sync(&name);
                }
            }
            WorldEvent::TriggerEntered { actor, trigger } => {
                self.on_trigger_entered(actor, &trigger);
            }
            WorldEvent::ObjectDestroyed { object, by } => {
                let owner = self
                    .active
                    .iter()
                    .find(|(_, instance)| instance.core.tracks_object(object))
                    .map(|(name, _)| name.clone());

                if let Some(name) = owner {
                    let by = by.filter(|actor| self.owner_of.get(actor) == Some(&name));
                    if let Some(instance) = self.active.get_mut(&name) {
                        instance.on_object_destroyed(object, by);
                    }
                    self.sync(&name);
                }
            }
        }
    }

    /// Decide an incoming damage hit. Attackers outside the victim's event
    /// never record contribution.
    pub fn on_damage(
        &mut self,
        victim: ActorId,
        attacker: Option<ActorId>,
        damage: &DamageInfo,
    ) -> DamageVerdict {
        let Some(name) = self.owner_of.get(&victim).cloned() else {
            return DamageVerdict::Unchanged;
        };

        let attacker = attacker.filter(|a| self.owner_of.get(a) == Some(&name));
        let verdict = match self.active.get_mut(&name) {
            Some(instance) => instance.on_damage(victim, attacker, damage),
            None => DamageVerdict::Unchanged,
        };

        self.sync(&name);
        verdict
    }

    /// A participant died in the world. Returns true when the engine
    /// consumed the death (the world should suppress its own handling).
    pub fn on_death(
        &mut self,
        victim: ActorId,
        attacker: Option<ActorId>,
        damage: &DamageInfo,
    ) -> bool {
        let Some(name) = self.owner_of.get(&victim).cloned() else {
            return false;
        };

        let attacker = attacker.filter(|a| self.owner_of.get(a) == Some(&name));
        let handled = match self.active.get_mut(&name) {
            Some(instance) => instance.handle_death(victim, attacker, damage),
            None => false,
        };

        self.sync(&name);
        handled
    }

    /// Participant chat stays inside the event. Returns `Deny` when the
    /// engine relayed the message and the world should not.
    pub fn on_chat(&mut self, actor: ActorId, message: &str) -> CommandVerdict {
        let Some(name) = self.owner_of.get(&actor).cloned() else {
            return CommandVerdict::Allow;
        };

        if let Some(instance) = self.active.get_mut(&name) {
            instance.on_chat(actor, message);
        }
        self.sync(&name);
        CommandVerdict::Deny
    }

    /// Gate a participant's console/chat command against the blacklist.
    pub fn on_command(&mut self, actor: ActorId, command: &str) -> CommandVerdict {
        if !self.owner_of.contains_key(&actor) {
            return CommandVerdict::Allow;
        }

        let blocked = self
            .settings
            .command_blacklist
            .iter()
            .any(|entry| entry.trim_start_matches('/').eq_ignore_ascii_case(command));

        if blocked {
            self.notices
                .push("", Broadcast::actor(actor, Notice::CommandBlocked));
            CommandVerdict::Deny
        } else {
            CommandVerdict::Allow
        }
    }

    // ----- entry triggers -----

    pub fn add_trigger(
        &mut self,
        event: &str,
        id: &str,
        position: Position,
        radius: f32,
    ) -> Result<(), TriggerError> {
        if !self.active.contains_key(event) {
            return Err(TriggerError::UnknownEvent);
        }

        self.triggers.insert(
            id.to_string(),
            EntryTrigger {
                id: id.to_string(),
                event: event.to_string(),
                position,
                radius,
            },
        );
        Ok(())
    }

    pub fn remove_trigger(&mut self, id: &str) {
        self.triggers.remove(id);
    }

    pub fn trigger(&self, id: &str) -> Option<&EntryTrigger> {
        self.triggers.get(id)
    }

    fn on_trigger_entered(&mut self, actor: ActorId, trigger_id: &str) {
        let Some(trigger) = self.triggers.get(trigger_id) else {
            return;
        };
        let name = trigger.event.clone();

        if self.owner_of.contains_key(&actor) {
            return;
        }

        if let Err(error) = self.join(actor, &name, Team::None) {
            tracing::debug!(event = %name, actor = actor.0, %error, "trigger admission refused");
            if let Some(info) = self.event_info(&name) {
                self.notices.push(
                    &name,
                    Broadcast::actor(
                        actor,
                        Notice::TriggerInfo {
                            event: info.name,
                            mode: info.mode,
                            players: info.players,
                            capacity: info.capacity,
                            status: info.status,
                        },
                    ),
                );
            }
        }
    }

    // ----- tick -----

    /// Advance every active instance by one engine second.
    pub fn tick(&mut self) {
        for name in self.active_names() {
            if let Some(instance) = self.active.get_mut(&name) {
                instance.tick();
            }
            self.sync(&name);
        }
    }

    // ----- introspection -----

    pub fn active_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.active.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn status(&self, name: &str) -> Option<EventStatus> {
        self.active.get(name).map(|instance| instance.core.status)
    }

    pub fn scoreboard(&self, name: &str) -> Option<&[ScoreEntry]> {
        self.active
            .get(name)
            .map(|instance| instance.core.scores.as_slice())
    }

    pub fn results(&self, name: &str) -> Option<&EventResults> {
        self.active.get(name).map(|instance| &instance.core.last_result)
    }

    /// Active and pending participants of an event, for broadcast fan-out.
    pub fn participants(&self, name: &str) -> Vec<ActorId> {
        match self.active.get(name) {
            Some(instance) => {
                let mut actors = instance.core.active_actors();
                actors.extend(instance.core.pending_actors());
                actors
            }
            None => Vec::new(),
        }
    }

    pub fn event_info(&self, name: &str) -> Option<EventInfo> {
        self.active.get(name).map(|instance| EventInfo {
            name: instance.core.name.clone(),
            mode: instance.core.profile.mode_id.clone(),
            status: instance.core.status,
            round: instance.core.round,
            players: instance.core.active_count() + instance.core.pending_count(),
            capacity: instance.core.config.maximum_players,
        })
    }

    pub fn list_active(&self) -> Vec<EventInfo> {
        self.active_names()
            .iter()
            .filter_map(|name| self.event_info(name))
            .collect()
    }

    /// Direct access to an active instance, for hosts and tests that need
    /// more than the summaries.
    pub fn instance(&self, name: &str) -> Option<&EventInstance> {
        self.active.get(name)
    }

    pub fn instance_mut(&mut self, name: &str) -> Option<&mut EventInstance> {
        self.active.get_mut(name)
    }

    /// Drain the pending world commands in emission order.
    pub fn take_commands(&mut self) -> Vec<WorldCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Read the outbound broadcast stream from a cursor.
    pub fn notices_since(&self, cursor: NoticeCursor) -> (Vec<PostedBroadcast>, NoticeCursor) {
        self.notices.since(cursor)
    }

    /// Mirror an instance's accumulated outbox into the director-level
    /// queues and the ownership map.
    fn sync(&mut self, name: &str) {
        let Some(instance) = self.active.get_mut(name) else {
            return;
        };
        let outbox = instance.core.outbox.take();
        if outbox.is_empty() {
            return;
        }

        for actor in outbox.claimed {
            self.owner_of.insert(actor, name.to_string());
        }
        for actor in outbox.released {
            self.owner_of.remove(&actor);
        }

        self.commands.extend(outbox.commands);
        for broadcast in outbox.broadcasts {
            self.notices.push(name, broadcast);
        }
    }
}
