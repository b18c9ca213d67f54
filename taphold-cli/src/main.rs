mod host;
mod keymap_file;
mod script;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::keymap_file::Keymap;

#[derive(Parser)]
#[command(name = "taphold-cli")]
#[command(about = "Host-loop simulator for the tap-hold keyboard engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay a key-event script through the classifiers at a 1 ms scan rate
    Replay {
        /// Path to the event script
        script: PathBuf,
        /// JSON keymap file (defaults to the built-in tables)
        #[arg(long)]
        keymap: Option<PathBuf>,
    },
    /// Print the active binding tables
    Show {
        /// JSON keymap file (defaults to the built-in tables)
        #[arg(long)]
        keymap: Option<PathBuf>,
    },
    /// Validate a JSON keymap file
    Check {
        /// JSON keymap file
        file: PathBuf,
    },
}

fn load_keymap(path: &Option<PathBuf>) -> Result<Keymap> {
    match path {
        Some(p) => Keymap::load(p),
        None => Ok(Keymap::default_tables()),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Replay { script, keymap } => {
            let keymap = load_keymap(&keymap)?;
            keymap.check()?;
            let contents = fs::read_to_string(&script)
                .with_context(|| format!("reading {}", script.display()))?;
            let events = script::parse_script(&contents).context("parsing event script")?;
            host::replay(&keymap, &events)?;
        }
        Command::Show { keymap } => {
            let keymap = load_keymap(&keymap)?;
            show(&keymap);
        }
        Command::Check { file } => {
            let keymap = Keymap::load(&file)?;
            keymap.check()?;
            // Constructing the engines surfaces capacity and timing errors.
            host::Simulator::new(&keymap)?;
            println!(
                "keymap OK: {} dual-role keys, {} tap-dance keys",
                keymap.dual_role.len(),
                keymap.dance.len()
            );
        }
    }

    Ok(())
}

fn show(keymap: &Keymap) {
    println!(
        "Dual-role keys (tapping term {} ms, hold delay {} ms):",
        keymap.tapping_term, keymap.hold_delay
    );
    for binding in &keymap.dual_role {
        let term = binding
            .term
            .map(|t| format!("  (term {} ms)", t))
            .unwrap_or_default();
        println!(
            "  tap {:<4} hold {:<4}{}",
            binding.tap.display_name(),
            binding.hold.display_name(),
            term
        );
    }
    if !keymap.dance.is_empty() {
        println!("Tap-dance keys:");
        for dance in &keymap.dance {
            println!(
                "  single {:<4} double {:<4}",
                dance.single.display_name(),
                dance.double.display_name()
            );
        }
    }
}
