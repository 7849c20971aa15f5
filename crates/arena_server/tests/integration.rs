use arena_core::{
    ActorId, CommandVerdict, DamageInfo, EventConfig, EventStatus, Notice, ParamValue, Position,
    Providers, Team, WorldEvent,
};
use arena_engine::{EngineSettings, EventDirector, NoticeCursor};
use arena_server::{spawn_tick_loop, ArenaServer};
use std::time::Duration;
use tokio::time::sleep;

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
        matches!(kit, "rifle" | "pistol" | "red_shirts" | "blue_shirts")
    }

    fn kit_items(&self, _kit: &str) -> Vec<String> {
        vec!["rifle".to_string()]
    }
}

struct MemZones;

impl arena_core::ZoneProvider for MemZones {
    fn zone_exists(&self, zone: &str) -> bool {
        zone == "arena_zone"
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

fn settings() -> EngineSettings {
    EngineSettings {
        prestart_secs: 3,
        round_interval_secs: 2,
        invincibility_secs: 1,
        respawn_secs: 2,
        command_blacklist: vec!["home".to_string()],
        ..EngineSettings::default()
    }
}

fn director() -> EventDirector {
    let mut director = EventDirector::new(settings(), providers(), 7);
    arena_modes::register_all(&mut director);
    director
}

fn server() -> ArenaServer {
    ArenaServer::new(director(), Duration::from_millis(10))
}

fn base_config(name: &str, mode: &str) -> EventConfig {
    let mut config = EventConfig::new(name, mode, &[]);
    config.minimum_players = 2;
    config.maximum_players = 8;
    config.time_limit = 120;
    config.rounds_to_play = 1;
    config.team_a.spawn_file = "arena_a".to_string();
    config.team_a.kits = vec!["rifle".to_string()];
    config.team_b.spawn_file = "arena_b".to_string();
    config.team_b.kits = vec!["pistol".to_string()];
    config
}

async fn start_with(server: &ArenaServer, name: &str, actors: &[(u64, Team)]) {
    for (id, team) in actors {
        server.join(ActorId(*id), name, *team).await.unwrap();
    }
    assert_eq!(server.status(name).await, Some(EventStatus::Prestarting));

    for _ in 0..3 {
        server.tick().await;
    }
    assert_eq!(server.status(name).await, Some(EventStatus::Started));
}

async fn notices_of(server: &ArenaServer) -> Vec<Notice> {
    let (posted, _) = server.notices_since(NoticeCursor(0)).await;
    posted.into_iter().map(|p| p.broadcast.notice).collect()
}

#[tokio::test]
async fn team_deathmatch_reaches_the_score_limit() {
    let server = server();

    let mut config = base_config("pit brawl", "team_deathmatch");
    config.score_limit = 2;
    server.upsert_config(config).await.unwrap();

    start_with(
        &server,
        "pit brawl",
        &[(1, Team::A), (2, Team::A), (3, Team::B), (4, Team::B)],
    )
    .await;

    let hit = DamageInfo::default();
    assert!(server.on_death(ActorId(3), Some(ActorId(1)), &hit).await);
    assert!(server.on_death(ActorId(4), Some(ActorId(1)), &hit).await);

    // End-of-round and end-of-event are deferred by a tick each.
    for _ in 0..3 {
        server.tick().await;
    }

    let notices = notices_of(&server).await;
    assert!(notices
        .iter()
        .any(|n| matches!(n, Notice::TeamWin { team: Team::A, .. })));
    assert!(notices.iter().any(|n| matches!(n, Notice::EventFinished)));
}

#[tokio::test]
async fn elimination_crowns_the_lone_survivor() {
    let server = server();
    server
        .upsert_config(base_config("last stand", "elimination"))
        .await
        .unwrap();

    start_with(
        &server,
        "last stand",
        &[(1, Team::None), (2, Team::None), (3, Team::None)],
    )
    .await;

    let hit = DamageInfo::default();
    assert!(server.on_death(ActorId(2), Some(ActorId(1)), &hit).await);
    assert!(server.on_death(ActorId(3), Some(ActorId(1)), &hit).await);

    for _ in 0..3 {
        server.tick().await;
    }

    let notices = notices_of(&server).await;
    let won = notices.iter().any(|n| match n {
        Notice::EventWin { winners } => winners == &vec!["player1".to_string()],
        _ => false,
    });
    assert!(won, "expected player1 to win, notices: {notices:?}");
}

#[tokio::test]
async fn gun_game_ladder_decides_the_winner() {
    let server = server();

    let mut config = base_config("ladder match", "gun_game");
    config.params.insert(
        "weaponSet".to_string(),
        ParamValue::StrList(vec!["pistol".to_string(), "rifle".to_string()]),
    );
    server.upsert_config(config).await.unwrap();

    start_with(
        &server,
        "ladder match",
        &[(1, Team::None), (2, Team::None)],
    )
    .await;

    let pistol_hit = DamageInfo {
        weapon: Some("pistol".to_string()),
        ..DamageInfo::default()
    };
    assert!(server.on_death(ActorId(2), Some(ActorId(1)), &pistol_hit).await);

    // Weapon swap is staged a tick later; the victim respawns after two.
    for _ in 0..3 {
        server.tick().await;
    }

    let rifle_hit = DamageInfo {
        weapon: Some("rifle".to_string()),
        ..DamageInfo::default()
    };
    assert!(server.on_death(ActorId(2), Some(ActorId(1)), &rifle_hit).await);

    for _ in 0..3 {
        server.tick().await;
    }

    let notices = notices_of(&server).await;
    let won = notices.iter().any(|n| match n {
        Notice::EventWin { winners } => winners == &vec!["player1".to_string()],
        _ => false,
    });
    assert!(won, "expected the ladder finisher to win, notices: {notices:?}");
}

#[tokio::test]
async fn horde_round_ends_when_the_wave_is_cleared() {
    let server = server();

    let mut config = base_config("hold the line", "horde");
    config.rounds_to_play = 2;
    config.params.insert(
        "hostileSpawnFile".to_string(),
        ParamValue::Str("hostile_pits".to_string()),
    );
    config.params.insert(
        "hostilesPerPlayer".to_string(),
        ParamValue::Int(1),
    );
    server.upsert_config(config).await.unwrap();

    start_with(
        &server,
        "hold the line",
        &[(1, Team::None), (2, Team::None)],
    )
    .await;

    // The wave spawns five seconds into the round.
    for _ in 0..6 {
        server.tick().await;
    }

    let hostiles: Vec<_> = server
        .take_commands()
        .await
        .into_iter()
        .filter_map(|c| match c {
            arena_core::WorldCommand::SpawnHostile { object, .. } => Some(object),
            _ => None,
        })
        .collect();
    assert_eq!(hostiles.len(), 2);

    for object in hostiles {
        server
            .handle(WorldEvent::ObjectDestroyed {
                object,
                by: Some(ActorId(1)),
            })
            .await;
    }

    server.tick().await;

    let notices = notices_of(&server).await;
    assert!(notices
        .iter()
        .any(|n| matches!(n, Notice::NextRoundStartsIn { round: 1, .. })));
}

#[tokio::test]
async fn chat_is_relayed_inside_the_event_only() {
    let server = server();
    server
        .upsert_config(base_config("pit brawl", "deathmatch"))
        .await
        .unwrap();
    server
        .join(ActorId(1), "pit brawl", Team::None)
        .await
        .unwrap();

    assert_eq!(
        server.on_chat(ActorId(1), "anyone here?").await,
        CommandVerdict::Deny
    );
    assert_eq!(
        server.on_chat(ActorId(99), "hello world").await,
        CommandVerdict::Allow
    );

    let notices = notices_of(&server).await;
    assert!(notices.iter().any(|n| matches!(
        n,
        Notice::Chat { from, .. } if from == "player1"
    )));
}

#[tokio::test]
async fn blacklisted_commands_are_denied_for_participants() {
    let server = server();
    server
        .upsert_config(base_config("pit brawl", "deathmatch"))
        .await
        .unwrap();
    server
        .join(ActorId(1), "pit brawl", Team::None)
        .await
        .unwrap();

    assert_eq!(
        server.on_command(ActorId(1), "home").await,
        CommandVerdict::Deny
    );
    assert_eq!(
        server.on_command(ActorId(1), "help").await,
        CommandVerdict::Allow
    );
    assert_eq!(
        server.on_command(ActorId(99), "home").await,
        CommandVerdict::Allow
    );
}

#[tokio::test]
async fn tick_loop_drives_the_match_in_real_time() {
    let server = server();
    server
        .upsert_config(base_config("pit brawl", "deathmatch"))
        .await
        .unwrap();

    let task = spawn_tick_loop(server.clone());

    server
        .join(ActorId(1), "pit brawl", Team::None)
        .await
        .unwrap();
    server
        .join(ActorId(2), "pit brawl", Team::None)
        .await
        .unwrap();

    sleep(Duration::from_millis(150)).await;
    assert_eq!(
        server.status("pit brawl").await,
        Some(EventStatus::Started)
    );

    server.shutdown().await;
    let _ = task.await;
}
