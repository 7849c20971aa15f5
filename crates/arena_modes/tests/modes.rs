use arena_core::{
    ActorId, DamageInfo, EventConfig, EventStatus, Notice, ParamValue, Position, Providers, Team,
    WorldCommand, WorldEvent,
};
use arena_engine::{EngineSettings, EventDirector, NoticeCursor, OpenError};

struct MemSpawns;

impl arena_core::SpawnProvider for MemSpawns {
    fn load_spawns(&self, file: &str) -> Option<Vec<Position>> {
        match file {
            "arena_a" | "arena_b" | "hostile_pits" => Some(
                (0..4)
                    .map(|i| Position::new(i as f32 * 10.0, 0.0, 0.0))
                    .collect(),
            ),
            _ => None,
        }
    }
}

struct MemKits;

impl arena_core::KitProvider for MemKits {
    fn is_kit(&self, kit: &str) -> bool {
        matches!(kit, "rifle" | "pistol" | "slasher_garb")
    }

    fn kit_items(&self, _kit: &str) -> Vec<String> {
        vec!["rifle".to_string()]
    }
}

struct MemZones;

impl arena_core::ZoneProvider for MemZones {
    fn zone_exists(&self, _zone: &str) -> bool {
        true
    }

    fn in_zone(&self, _zone: &str, _actor: ActorId) -> bool {
        true
    }
}

struct MemActors;

impl arena_core::ActorProvider for MemActors {
    fn display_name(&self, actor: ActorId) -> String {
        format!("player{}", actor.0)
    }

    fn has_permission(&self, _actor: ActorId, _permission: &str) -> bool {
        true
    }

    fn is_connected(&self, _actor: ActorId) -> bool {
        true
    }
}

fn providers() -> Providers {
    Providers {
        spawns: Box::new(MemSpawns),
        kits: Box::new(MemKits),
        zones: Box::new(MemZones),
        actors: Box::new(MemActors),
    }
}

fn director() -> EventDirector {
    let settings = EngineSettings {
        prestart_secs: 2,
        round_interval_secs: 2,
        invincibility_secs: 1,
        respawn_secs: 1,
        ..EngineSettings::default()
    };
    let mut director = EventDirector::new(settings, providers(), 11);
    arena_modes::register_all(&mut director);
    director
}

fn base_config(name: &str, mode: &str) -> EventConfig {
    let mut config = EventConfig::new(name, mode, &[]);
    config.minimum_players = 2;
    config.maximum_players = 8;
    config.time_limit = 300;
    config.rounds_to_play = 1;
    config.team_a.spawn_file = "arena_a".to_string();
    config.team_a.kits = vec!["rifle".to_string()];
    config.team_b.spawn_file = "arena_b".to_string();
    config.team_b.kits = vec!["pistol".to_string()];
    config
}

fn start(director: &mut EventDirector, name: &str, ids: &[u64]) {
    for id in ids {
        director.join(ActorId(*id), name, Team::None).unwrap();
    }
    for _ in 0..2 {
        director.tick();
    }
    assert_eq!(director.status(name), Some(EventStatus::Started));
}

fn notices_of(director: &EventDirector) -> Vec<Notice> {
    let (posted, _) = director.notices_since(NoticeCursor(0));
    posted.into_iter().map(|p| p.broadcast.notice).collect()
}

fn kill(director: &mut EventDirector, victim: u64, attacker: u64, weapon: Option<&str>) {
    let hit = DamageInfo {
        amount: 100.0,
        weapon: weapon.map(str::to_string),
        ..DamageInfo::default()
    };
    assert!(director.on_death(ActorId(victim), Some(ActorId(attacker)), &hit));
}

// ----- deathmatch -----

#[test]
fn solo_deathmatch_ends_at_the_score_limit() {
    let mut director = director();
    let mut config = base_config("pit", "deathmatch");
    config.score_limit = 2;
    director.upsert_config(config).unwrap();

    start(&mut director, "pit", &[1, 2, 3]);

    kill(&mut director, 2, 1, None);
    director.tick();
    kill(&mut director, 3, 1, None);

    for _ in 0..3 {
        director.tick();
    }

    let notices = notices_of(&director);
    let won = notices.iter().any(|n| match n {
        Notice::EventWin { winners } => winners.contains(&"player1".to_string()),
        _ => false,
    });
    assert!(won, "expected player1 as winner, got {notices:?}");
}

#[test]
fn team_deathmatch_requires_a_time_limit() {
    let mut director = director();
    let mut config = base_config("pit", "team_deathmatch");
    config.time_limit = 0;

    match director.upsert_config(config) {
        Err(OpenError::Invalid(reason)) => assert!(reason.contains("time limit")),
        other => panic!("expected a validation failure, got {other:?}"),
    }
}

#[test]
fn friendly_fire_can_be_scaled_away() {
    use arena_modes::{DeathmatchMode, DeathmatchSettings};

    let settings = EngineSettings {
        prestart_secs: 2,
        invincibility_secs: 0,
        ..EngineSettings::default()
    };
    let mut director = EventDirector::new(settings, providers(), 11);
    director.register_mode(
        "team_deathmatch",
        Box::new(DeathmatchMode::teams().with_settings(DeathmatchSettings {
            respawn_secs: 1,
            friendly_fire: 0.0,
        })),
    );

    director
        .upsert_config(base_config("pit", "team_deathmatch"))
        .unwrap();
    for (id, team) in [(1, Team::A), (2, Team::A), (3, Team::B), (4, Team::B)] {
        director.join(ActorId(id), "pit", team).unwrap();
    }
    for _ in 0..2 {
        director.tick();
    }
    director.tick();

    let verdict = director.on_damage(ActorId(2), Some(ActorId(1)), &DamageInfo::default());
    assert_eq!(verdict, arena_core::DamageVerdict::Scaled(0.0));

    let verdict = director.on_damage(ActorId(3), Some(ActorId(1)), &DamageInfo::default());
    assert_eq!(verdict, arena_core::DamageVerdict::Unchanged);
}

// ----- gun game -----

#[test]
fn downgrade_weapon_demotes_the_victim() {
    let mut director = director();
    let mut config = base_config("ladder", "gun_game");
    config.params.insert(
        "weaponSet".to_string(),
        ParamValue::StrList(vec![
            "pistol".to_string(),
            "smg".to_string(),
            "rifle".to_string(),
        ]),
    );
    director.upsert_config(config).unwrap();

    start(&mut director, "ladder", &[1, 2]);

    // player2 climbs to rank 2, then dies to the downgrade weapon.
    kill(&mut director, 1, 2, Some("pistol"));
    for _ in 0..2 {
        director.tick();
    }
    kill(&mut director, 2, 1, Some("machete"));
    for _ in 0..2 {
        director.tick();
    }

    let core = &director.instance("ladder").unwrap().core;
    let scores = &core.scores;
    let p2 = scores
        .iter()
        .find(|entry| entry.display_name == "player2")
        .unwrap();
    assert_eq!(p2.value1, 1.0, "rank should be back at the first rung");
}

#[test]
fn missing_weapon_ladder_fails_validation() {
    let mut director = director();
    let config = base_config("ladder", "gun_game");

    match director.upsert_config(config) {
        Err(OpenError::Invalid(reason)) => assert!(reason.contains("weaponSet")),
        other => panic!("expected a validation failure, got {other:?}"),
    }
}

// ----- slasher -----

fn slasher_config() -> EventConfig {
    let mut config = base_config("midnight", "slasher");
    config.time_limit = 0;
    config
        .params
        .insert("slasherWeapon".to_string(), ParamValue::Str("axe".to_string()));
    config
        .params
        .insert("slasherTime".to_string(), ParamValue::Int(4));
    config
        .params
        .insert("playerTime".to_string(), ParamValue::Int(4));
    config
}

fn find_slasher(director: &EventDirector, name: &str, ids: &[u64]) -> u64 {
    // The slasher is the one participant filtered out of the spectate pool.
    let core = &director.instance(name).unwrap().core;
    let targets = core.spectate_targets();
    *ids.iter()
        .find(|id| !targets.contains(&ActorId(**id)))
        .expect("one participant should be hidden from spectators")
}

#[test]
fn slasher_round_flips_to_the_hunt_phase() {
    let mut director = director();
    director.upsert_config(slasher_config()).unwrap();

    start(&mut director, "midnight", &[1, 2, 3]);

    let core = &director.instance("midnight").unwrap().core;
    assert_eq!(core.config.rounds_to_play, 3, "one round per participant");

    // Slasher phase runs out without any kills; survivors get armed.
    for _ in 0..4 {
        director.tick();
    }

    let notices = notices_of(&director);
    assert!(notices.iter().any(|n| matches!(
        n,
        Notice::Custom { key, .. } if key == "slasher.hunters_turn"
    )));

    // Drop everything emitted so far; the next tick runs the staged
    // weapon handouts.
    let _ = director.take_commands();
    director.tick();

    let slasher = find_slasher(&director, "midnight", &[1, 2, 3]);
    let armed: Vec<_> = director
        .take_commands()
        .into_iter()
        .filter_map(|c| match c {
            WorldCommand::GiveItem { actor, item, .. } if item == "axe" => Some(actor),
            _ => None,
        })
        .collect();
    assert!(
        !armed.iter().any(|a| a.0 == slasher),
        "the slasher must not be re-armed in the hunt phase"
    );
    assert_eq!(armed.len(), 2, "both survivors should receive the weapon");
}

#[test]
fn killing_the_slasher_ends_the_round() {
    let mut director = director();
    director.upsert_config(slasher_config()).unwrap();

    start(&mut director, "midnight", &[1, 2, 3]);
    director.tick();

    let slasher = find_slasher(&director, "midnight", &[1, 2, 3]);
    let hunter = [1, 2, 3].into_iter().find(|id| *id != slasher).unwrap();

    kill(&mut director, slasher, hunter, None);

    let notices = notices_of(&director);
    assert!(notices.iter().any(|n| matches!(
        n,
        Notice::Custom { key, .. } if key == "slasher.hunted_win"
    )));
}

// ----- horde -----

fn horde_config() -> EventConfig {
    let mut config = base_config("hold out", "horde");
    config.rounds_to_play = 2;
    config.params.insert(
        "hostileSpawnFile".to_string(),
        ParamValue::Str("hostile_pits".to_string()),
    );
    config
        .params
        .insert("hostilesPerPlayer".to_string(), ParamValue::Int(1));
    config
        .params
        .insert("playerLives".to_string(), ParamValue::Int(2));
    config
}

#[test]
fn a_full_wipe_ends_the_event_with_no_winners() {
    let mut director = director();
    director.upsert_config(horde_config()).unwrap();

    start(&mut director, "hold out", &[1, 2]);

    // playerLives 2 leaves one deadly death each; two kills wipe the team.
    kill(&mut director, 1, 2, None);
    kill(&mut director, 2, 1, None);

    for _ in 0..2 {
        director.tick();
    }

    let notices = notices_of(&director);
    assert!(notices
        .iter()
        .all(|n| !matches!(n, Notice::EventWin { .. })));
    assert!(notices.iter().any(|n| matches!(
        n,
        Notice::StatusChanged {
            status: EventStatus::Finished
        }
    )));
}

#[test]
fn hostiles_are_cleaned_up_when_the_round_ends() {
    let mut director = director();
    director.upsert_config(horde_config()).unwrap();

    start(&mut director, "hold out", &[1, 2]);

    for _ in 0..6 {
        director.tick();
    }

    let spawned: Vec<_> = director
        .take_commands()
        .into_iter()
        .filter_map(|c| match c {
            WorldCommand::SpawnHostile { object, .. } => Some(object),
            _ => None,
        })
        .collect();
    assert_eq!(spawned.len(), 2);

    // Clearing the wave credits the killer and ends the round.
    for object in &spawned {
        director.handle(WorldEvent::ObjectDestroyed {
            object: *object,
            by: Some(ActorId(1)),
        });
    }

    {
        let core = &director.instance("hold out").unwrap().core;
        assert_eq!(core.tracked_object_count(), 0);
        let kills = core.session(ActorId(1)).unwrap().kills;
        assert_eq!(kills, 2, "hostile kills credit the killer");
    }

    director.tick();
    let notices = notices_of(&director);
    assert!(notices
        .iter()
        .any(|n| matches!(n, Notice::NextRoundStartsIn { round: 1, .. })));
}
