//! Headless arena demo: runs a scripted match against an in-memory world
//! and prints the engine's outbound stream as it happens.

use arena_core::{
    ActorId, DamageInfo, EventConfig, Notice, ParamValue, Position, Providers, Team, WorldCommand,
};
use arena_engine::{EngineSettings, EventDirector, NoticeCursor};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "headless_runner")]
#[command(about = "Run a scripted arena match without a game server")]
struct Args {
    /// Mode to run: deathmatch, team_deathmatch, elimination or gun_game
    #[arg(long, default_value = "team_deathmatch")]
    mode: String,

    /// Seed for spawn draws and team balancing
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Participants to simulate
    #[arg(long, default_value = "4")]
    players: u64,

    /// Engine seconds to simulate
    #[arg(long, default_value = "120")]
    seconds: u32,
}

struct DemoSpawns;

impl arena_core::SpawnProvider for DemoSpawns {
    fn load_spawns(&self, file: &str) -> Option<Vec<Position>> {
        match file {
            "arena_a" | "arena_b" => Some(
                (0..6)
                    .map(|i| {
                        let depth = if file == "arena_b" { 40.0 } else { 0.0 };
                        Position::new(i as f32 * 8.0, 0.0, depth)
                    })
                    .collect(),
            ),
            _ => None,
        }
    }
}

struct DemoKits;

impl arena_core::KitProvider for DemoKits {
    fn is_kit(&self, kit: &str) -> bool {
        matches!(kit, "rifle" | "pistol")
    }

    fn kit_items(&self, kit: &str) -> Vec<String> {
        vec![kit.to_string()]
    }
}

struct DemoZones;

impl arena_core::ZoneProvider for DemoZones {
    fn zone_exists(&self, zone: &str) -> bool {
        zone == "arena_zone"
    }

    fn in_zone(&self, _zone: &str, _actor: ActorId) -> bool {
        true
    }
}

struct DemoActors;

impl arena_core::ActorProvider for DemoActors {
    fn display_name(&self, actor: ActorId) -> String {
        format!("bot_{}", actor.0)
    }

    fn has_permission(&self, _actor: ActorId, _permission: &str) -> bool {
        true
    }

    fn is_connected(&self, _actor: ActorId) -> bool {
        true
    }
}

fn demo_config(mode: &str) -> EventConfig {
    let mut config = EventConfig::new("demo arena", mode, &[]);
    config.minimum_players = 2;
    config.maximum_players = 8;
    config.time_limit = 45;
    config.score_limit = 5;
    config.rounds_to_play = 2;
    config.zone_id = "arena_zone".to_string();
    config.rewards.kill_amount = 10;
    config.rewards.win_amount = 100;
    config.team_a.spawn_file = "arena_a".to_string();
    config.team_a.kits = vec!["rifle".to_string()];
    config.team_b.spawn_file = "arena_b".to_string();
    config.team_b.kits = vec!["pistol".to_string()];

    if mode == "gun_game" {
        config.params.insert(
            "weaponSet".to_string(),
            ParamValue::StrList(vec![
                "pistol".to_string(),
                "shotgun".to_string(),
                "rifle".to_string(),
            ]),
        );
    }

    config
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let providers = Providers {
        spawns: Box::new(DemoSpawns),
        kits: Box::new(DemoKits),
        zones: Box::new(DemoZones),
        actors: Box::new(DemoActors),
    };

    let settings = EngineSettings {
        prestart_secs: 5,
        round_interval_secs: 5,
        ..EngineSettings::default()
    };

    let mut director = EventDirector::new(settings, providers, args.seed);
    arena_modes::register_all(&mut director);

    if let Err(error) = director.upsert_config(demo_config(&args.mode)) {
        eprintln!("failed to open demo event: {error}");
        std::process::exit(1);
    }
    tracing::info!(mode = %args.mode, seed = args.seed, "demo event opened");

    let actors: Vec<ActorId> = (1..=args.players).map(ActorId).collect();
    for (index, actor) in actors.iter().enumerate() {
        let team = if index % 2 == 0 { Team::A } else { Team::B };
        if let Err(error) = director.join(*actor, "demo arena", team) {
            eprintln!("{actor:?} could not join: {error}");
        }
    }

    let mut cursor = NoticeCursor(0);
    let mut command_count = 0usize;

    for second in 1..=args.seconds {
        director.tick();

        // Fake some combat: every few seconds someone trades a kill.
        if second % 7 == 0 && actors.len() >= 2 {
            let victim = actors[(second as usize) % actors.len()];
            let attacker = actors[(second as usize + 1) % actors.len()];
            let hit = DamageInfo {
                amount: 50.0,
                ..DamageInfo::default()
            };
            director.on_damage(victim, Some(attacker), &hit);
            director.on_death(victim, Some(attacker), &hit);
        }

        for command in director.take_commands() {
            command_count += 1;
            if matches!(command, WorldCommand::GrantReward { .. }) {
                println!("[{second:>4}s] command: {command:?}");
            }
        }

        let (posted, next) = director.notices_since(cursor);
        cursor = next;
        for entry in posted {
            if !matches!(entry.broadcast.notice, Notice::TimerTick { .. }) {
                println!("[{second:>4}s] {:?}", entry.broadcast.notice);
            }
        }
    }

    println!("---");
    println!("simulated {command_count} world commands");
    for info in director.list_active() {
        println!(
            "{} [{}] status {:?} round {} players {}/{}",
            info.name, info.mode, info.status, info.round, info.players, info.capacity
        );
        if let Some(entries) = director.scoreboard(&info.name) {
            for entry in entries {
                if let Some((first, second)) = director.format_score(&info.mode, entry) {
                    println!(
                        "  #{} {} | {first} {second}",
                        entry.position, entry.display_name
                    );
                }
            }
        }
    }

    director.shutdown();
}
