use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ecoship::{GameManager, GameOptions, RuleConfigLoader, RuleConfigSet};

#[derive(Debug, Parser)]
#[command(author, version, about = "ecoship autoplay runner")]
struct Cli {
    /// Directory of rule config JSON files (builtin rules when missing)
    #[arg(long, default_value = "configs")]
    configs: PathBuf,

    /// Board side length
    #[arg(long, default_value_t = 9)]
    size: i32,

    /// Number of blocks dealt into the deck
    #[arg(long, default_value_t = 20)]
    deck_size: usize,

    /// Deterministic seed string
    #[arg(long)]
    seed: Option<String>,

    /// Deck synthesizes blocks forever instead of running dry
    #[arg(long)]
    infinite: bool,

    /// Generated tiles start in a random state
    #[arg(long)]
    random_states: bool,

    /// Cap on autoplayed turns
    #[arg(long, default_value_t = 200)]
    max_turns: u32,

    /// Write the final board as JSON to this path
    #[arg(long)]
    dump_board: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let rules = if cli.configs.is_dir() {
        RuleConfigLoader::new(&cli.configs).load_set()?
    } else {
        RuleConfigSet::builtin()
    };

    let options = GameOptions {
        size: cli.size,
        initial_deck_size: cli.deck_size,
        seed: cli.seed,
        infinite_deck: cli.infinite,
        random_tile_states: cli.random_states,
        logging: true,
        ..GameOptions::default()
    };

    let mut game = GameManager::new(options, rules)?;
    let turns = game.autoplay(cli.max_turns)?;

    println!("Game finished in {} turns ({:?}).", turns, game.phase());
    for line in game.get_final_player_score_elements() {
        println!("{:>22}: {}", line.label, line.amount);
    }

    if let Some(path) = cli.dump_board {
        let json = serde_json::to_string_pretty(&game.board().snapshot())?;
        std::fs::write(&path, json)
            .with_context(|| format!("failed to write board dump {}", path.display()))?;
    }
    Ok(())
}
