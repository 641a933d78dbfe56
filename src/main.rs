//! charsheet - rules core command line

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use charsheet::abilities;
use charsheet::dice::DiceRoller;
use charsheet::ruleset::{ReferenceData, RulesetIndex};
use charsheet::Settings;

/// Character sheet rules tool
#[derive(Parser, Debug)]
#[command(name = "charsheet", version, about = "Roll dice and query rules data")]
struct Args {
    /// Config file (defaults to ./charsheet.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Roll a dice formula such as "1d20+5" or "4d6kh3"
    Roll {
        formula: String,
        #[arg(short, long)]
        label: Option<String>,
    },
    /// Roll six ability scores (4d6, keep highest 3)
    Scores,
    /// Show derived values for an ability score and character level
    Ability {
        score: i32,
        #[arg(short, long, default_value_t = 1)]
        level: u32,
    },
    /// Look up a reference entity by key ("fireball|XPHB")
    Lookup {
        #[arg(short, long = "data", required = true)]
        data: Vec<PathBuf>,
        #[arg(value_enum)]
        category: Category,
        key: String,
    },
    /// List spells available to a class
    Spells {
        #[arg(short, long = "data", required = true)]
        data: Vec<PathBuf>,
        #[arg(long = "class")]
        class_name: String,
        /// Only spells of this level (0 for cantrips)
        #[arg(long)]
        level: Option<u8>,
    },
    /// List class features gained up to a level
    Features {
        #[arg(short, long = "data", required = true)]
        data: Vec<PathBuf>,
        #[arg(long = "class")]
        class_name: String,
        #[arg(long, default_value_t = 20)]
        level: u32,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Category {
    Race,
    Background,
    Feat,
    Class,
    Spell,
    Item,
}

#[derive(Serialize)]
struct AbilityReport {
    score: i32,
    modifier: i32,
    proficiency_bonus: i32,
    point_buy_cost: Option<u32>,
}

fn init_tracing(settings: &Settings) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| settings.log.filter.as_str().into());
    let json = settings.log.json;

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        .init();
}

fn load_index(paths: &[PathBuf], settings: &Settings) -> Result<RulesetIndex> {
    let mut data = ReferenceData::default();
    for path in paths {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let doc = ReferenceData::from_json_str(&json)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        debug!(path = %path.display(), "loaded reference data");
        data.extend(doc);
    }
    Ok(RulesetIndex::new(data, &settings.ruleset))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn load_settings(path: Option<&Path>) -> Result<Settings> {
    if let Some(path) = path {
        if !path.exists() {
            bail!("Config file not found: {}", path.display());
        }
    }
    Settings::load(path).context("Invalid configuration")
}

fn main() -> Result<()> {
    let args = Args::parse();
    let settings = load_settings(args.config.as_deref())?;
    init_tracing(&settings);

    match args.command {
        Command::Roll { formula, label } => {
            let mut roller = DiceRoller::thread().with_max_dice(settings.dice.max_dice);
            let outcome = roller.roll_text(&formula, label.as_deref())?;
            print_json(&outcome)?;
        }
        Command::Scores => {
            let mut roller = DiceRoller::thread();
            print_json(&roller.ability_scores())?;
        }
        Command::Ability { score, level } => {
            let report = AbilityReport {
                score,
                modifier: abilities::modifier(score),
                proficiency_bonus: abilities::proficiency_bonus(level)?,
                point_buy_cost: abilities::point_buy_cost(score).ok(),
            };
            print_json(&report)?;
        }
        Command::Lookup {
            data,
            category,
            key,
        } => {
            let index = load_index(&data, &settings)?;
            match category {
                Category::Race => print_json(index.race(&key)?)?,
                Category::Background => print_json(index.background(&key)?)?,
                Category::Feat => print_json(index.feat(&key)?)?,
                Category::Class => print_json(index.class(&key)?)?,
                Category::Spell => print_json(index.spell(&key)?)?,
                Category::Item => print_json(index.item(&key)?)?,
            }
        }
        Command::Spells {
            data,
            class_name,
            level,
        } => {
            let index = load_index(&data, &settings)?;
            let mut spells = index.spells_for_class(&class_name);
            if let Some(level) = level {
                spells.retain(|s| s.level == level);
            }
            spells.sort_by(|a, b| a.level.cmp(&b.level).then_with(|| a.name.cmp(&b.name)));
            print_json(&spells)?;
        }
        Command::Features {
            data,
            class_name,
            level,
        } => {
            let index = load_index(&data, &settings)?;
            index.class_by_name(&class_name)?;
            let mut features = index.class_features_up_to(&class_name, level);
            features.sort_by(|a, b| a.level.cmp(&b.level).then_with(|| a.name.cmp(&b.name)));
            print_json(&features)?;
        }
    }

    Ok(())
}
