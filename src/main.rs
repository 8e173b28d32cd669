//! initrack - apply one tracker action to a saved encounter

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use initrack::combat::{
    health_percentage, reduce, roll_initiatives, Action, EncounterContext, InitiativeState,
    RestKind, MAIN_POOL,
};
use initrack::{store, Config};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Tabletop initiative and hit point tracker
#[derive(Parser, Debug)]
#[command(name = "initrack", version, about = "Track a tabletop combat encounter")]
struct Args {
    /// Configuration file (default: initrack.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Encounter snapshot to read and update
    #[arg(short, long)]
    state: Option<PathBuf>,

    /// Roster definitions
    #[arg(short, long)]
    roster: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the turn order
    Show,
    /// Next combatant's turn
    Next,
    /// Previous combatant's turn
    Prev,
    /// Start the encounter over
    Reset,
    /// Roll initiative for combatants without one
    Roll,
    /// Set a combatant's initiative
    Init { name: String, value: i32 },
    /// Damage a combatant
    Damage {
        name: String,
        amount: i32,
        #[arg(long, default_value = MAIN_POOL)]
        pool: String,
    },
    /// Heal a combatant
    Heal {
        name: String,
        amount: i32,
        #[arg(long, default_value = MAIN_POOL)]
        pool: String,
    },
    /// Toggle a consumable box
    Use { key: String, index: u32 },
    /// Take a short or long rest
    Rest { kind: String },
}

/// Resolve a combatant name (or full identity key) to its identity key
fn resolve(context: &EncounterContext, name: &str) -> Result<String> {
    context
        .roster
        .iter()
        .find(|c| c.name == name || c.key() == name)
        .map(|c| c.key())
        .with_context(|| format!("no combatant named {}", name))
}

/// What a command does to the loaded encounter
enum Step {
    Show,
    Roll,
    Apply(Action),
}

fn step_for(context: &EncounterContext, command: Command) -> Result<Step> {
    let action = match command {
        Command::Show => return Ok(Step::Show),
        Command::Roll => return Ok(Step::Roll),
        Command::Next => Action::Advance,
        Command::Prev => Action::Rewind,
        Command::Reset => Action::Reset,
        Command::Init { name, value } => Action::SetInitiative {
            key: resolve(context, &name)?,
            value,
        },
        Command::Damage { name, amount, pool } => Action::Damage {
            key: resolve(context, &name)?,
            pool,
            amount,
        },
        Command::Heal { name, amount, pool } => Action::Heal {
            key: resolve(context, &name)?,
            pool,
            amount,
        },
        Command::Use { key, index } => Action::ToggleConsumable { key, index },
        Command::Rest { kind } => Action::Rest {
            kind: kind
                .parse::<RestKind>()
                .map_err(|_| anyhow::anyhow!("unknown rest kind: {}", kind))?,
        },
    };
    Ok(Step::Apply(action))
}

fn print_encounter(context: &EncounterContext, state: &InitiativeState) {
    println!("Round {}", state.round);
    for (index, combatant) in context.turn_order(state).iter().enumerate() {
        let key = combatant.key();
        let marker = if state.active_index == Some(index) { ">" } else { " " };
        let pools: Vec<String> = combatant
            .hp
            .pools()
            .into_iter()
            .map(|(pool, max)| {
                let current = state.pool_hp(&key, &pool).unwrap_or(max);
                let label = if pool == MAIN_POOL {
                    String::new()
                } else {
                    format!("{} ", pool)
                };
                format!(
                    "{}{}/{} ({:.0}%)",
                    label,
                    current,
                    max,
                    health_percentage(current, max)
                )
            })
            .collect();
        println!(
            "{} {:>3}  {} (AC {})  {}",
            marker,
            state.initiative(&key),
            combatant.name,
            combatant.armor_class,
            pools.join(", ")
        );
    }
    for (key, used) in &state.consumables {
        println!("  {}: {} used", key, used);
    }
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "initrack=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref()).context("failed to load configuration")?;
    if let Some(state) = args.state {
        config.state_path = state;
    }
    if let Some(roster) = args.roster {
        config.roster_path = roster;
    }

    let context = store::load_roster(&config.roster_path)?;
    let state = store::load_state(&config.state_path, &context)?;

    let next = match step_for(&context, args.command)? {
        Step::Show => state.clone(),
        Step::Roll => roll_initiatives(&context, &state, &mut rand::rng()),
        Step::Apply(action) => reduce(&context, &state, &action),
    };

    if next != state || !config.state_path.exists() {
        store::save_state(&config.state_path, &next, config.pretty)?;
        info!("saved {}", config.state_path.display());
    }

    print_encounter(&context, &next);
    Ok(())
}
