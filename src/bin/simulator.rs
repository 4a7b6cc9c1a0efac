//! Baton Headless Battle Simulator
//!
//! Loads a party, a bestiary and a skill catalog, summons the requested
//! opponents and plays one battle from a decision script.
//!
//! Usage:
//!   cargo run --bin simulator -- [OPTIONS]
//!
//! Options:
//!   --party FILE        Party roster (default: data/party.json)
//!   --bestiary FILE     Opponent rows (default: data/shadows.json)
//!   --skills FILE       Skill catalog (default: data/skills.json)
//!   --script FILE       Decision script; without one everybody skips
//!   --opponents A,B     Opponents to summon by name
//!   --advantage SIDE    player | opponent | neutral (default: neutral)
//!   --seed N            RNG seed (default: 42)
//!   --max-rounds N      Give up after N rounds (default: 999)
//!   --json              Print the report as JSON
//!   --verbose           Debug logging

use baton::battle::{run_battle, Advantage, Battle, ScriptedDecisions};
use baton::core::{BattleConfig, DEFAULT_MAX_ROUNDS};
use baton::data::{load_party, load_skills, Bestiary};
use baton::error::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

// ── CLI Configuration ────────────────────────────────────────────────

struct SimConfig {
    party_path: String,
    bestiary_path: String,
    skills_path: String,
    script_path: Option<String>,
    opponents: Vec<String>,
    advantage: Advantage,
    seed: u64,
    max_rounds: u32,
    json: bool,
    verbose: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            party_path: "data/party.json".to_string(),
            bestiary_path: "data/shadows.json".to_string(),
            skills_path: "data/skills.json".to_string(),
            script_path: None,
            opponents: Vec::new(),
            advantage: Advantage::Neutral,
            seed: 42,
            max_rounds: DEFAULT_MAX_ROUNDS,
            json: false,
            verbose: false,
        }
    }
}

enum Parsed {
    Run(SimConfig),
    Help,
}

fn parse_args(args: &[String]) -> std::result::Result<Parsed, String> {
    let mut config = SimConfig::default();
    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        let mut value = || {
            i += 1;
            args.get(i)
                .cloned()
                .ok_or_else(|| format!("{flag} requires a value"))
        };
        match flag {
            "--party" => config.party_path = value()?,
            "--bestiary" => config.bestiary_path = value()?,
            "--skills" => config.skills_path = value()?,
            "--script" => config.script_path = Some(value()?),
            "--opponents" => {
                config.opponents = value()?
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            "--advantage" => config.advantage = value()?.parse()?,
            "--seed" => {
                config.seed = value()?
                    .parse()
                    .map_err(|_| "--seed requires a number".to_string())?;
            }
            "--max-rounds" => {
                config.max_rounds = value()?
                    .parse()
                    .map_err(|_| "--max-rounds requires a number".to_string())?;
            }
            "--json" => config.json = true,
            "--verbose" => config.verbose = true,
            "--help" | "-h" => return Ok(Parsed::Help),
            other => return Err(format!("Unknown argument: {other}")),
        }
        i += 1;
    }
    if config.opponents.is_empty() {
        return Err("--opponents requires at least one name".to_string());
    }
    Ok(Parsed::Run(config))
}

fn print_usage() {
    eprintln!(
        "Baton Headless Battle Simulator\n\
         \n\
         Usage: simulator --opponents A,B [OPTIONS]\n\
         \n\
         Options:\n\
         \x20 --party FILE        Party roster (default: data/party.json)\n\
         \x20 --bestiary FILE     Opponent rows (default: data/shadows.json)\n\
         \x20 --skills FILE       Skill catalog (default: data/skills.json)\n\
         \x20 --script FILE       Decision script; without one everybody skips\n\
         \x20 --opponents A,B     Opponents to summon by name\n\
         \x20 --advantage SIDE    player | opponent | neutral (default: neutral)\n\
         \x20 --seed N            RNG seed (default: 42)\n\
         \x20 --max-rounds N      Give up after N rounds (default: 999)\n\
         \x20 --json              Print the report as JSON\n\
         \x20 --verbose           Debug logging\n\
         \x20 --help, -h          Show this help"
    );
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(config: &SimConfig) -> Result<String> {
    let party = load_party(&config.party_path)?;
    let bestiary = Bestiary::load(&config.bestiary_path)?;
    let catalog = load_skills(&config.skills_path)?;
    let opponents = bestiary.summon(config.opponents.as_slice())?;

    let mut decisions = match &config.script_path {
        Some(path) => ScriptedDecisions::from_json(&fs::read_to_string(path)?)?,
        None => ScriptedDecisions::new(),
    };
    let battle_config = BattleConfig {
        advantage: config.advantage,
        ..BattleConfig::default()
    }
    .with_max_rounds(config.max_rounds);

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut battle = Battle::new(party, opponents);
    let report = run_battle(&mut battle, &catalog, &battle_config, &mut decisions, &mut rng)?;

    Ok(if config.json {
        report.to_json()
    } else {
        report.to_text()
    })
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let config = match parse_args(&args) {
        Ok(Parsed::Run(config)) => config,
        Ok(Parsed::Help) => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        Err(message) => {
            eprintln!("{message}");
            print_usage();
            return ExitCode::from(2);
        }
    };

    init_logging(config.verbose);

    match run(&config) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
