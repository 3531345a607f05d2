use anyhow::{Context, Result};
use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use virtual_mines_core::{
    Controller, GameConfig, JsonFileStore, RngSource, SLOT_COUNT, Settings, UniformSource,
};

use command::{Command, Line, to_index};

mod command;
mod render;

/// Uncover gems, avoid the mines.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// JSON file holding the save slots
    #[arg(long, default_value = "virtual-mines-slots.json")]
    store: PathBuf,

    /// TOML settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Tiles on the board (overrides the settings file)
    #[arg(long)]
    total_tiles: Option<u16>,

    /// Payout scaling factor (overrides the settings file)
    #[arg(long)]
    house_edge: Option<f64>,

    /// Seconds between autosaves, 0 disables (overrides the settings file)
    #[arg(long)]
    autosave_secs: Option<u64>,

    /// Seed for reproducible boards
    #[arg(long)]
    seed: Option<u64>,

    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,
}

impl Args {
    fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading settings from {}", path.display()))?;
                toml::from_str::<Settings>(&text)
                    .with_context(|| format!("parsing settings in {}", path.display()))?
            }
            None => Settings::default(),
        };

        settings.game = GameConfig::new(
            self.total_tiles.unwrap_or(settings.game.total_tiles),
            self.house_edge.unwrap_or(settings.game.house_edge),
        );
        if let Some(secs) = self.autosave_secs {
            settings.autosave.interval_secs = secs;
        }
        Ok(settings)
    }

    fn source(&self) -> Box<dyn UniformSource + Send> {
        match self.seed {
            Some(seed) => Box::new(RngSource::from_seed(seed)),
            None => Box::new(RngSource::from_entropy()),
        }
    }
}

/// What the prompt loop should do after a command.
enum Flow {
    Continue,
    Quit,
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    let settings = args.settings()?;
    log::info!("Starting with {:?}", settings);

    let store = JsonFileStore::open(&args.store);
    let mut controller = Controller::new(store, settings, args.source())
        .with_save_hook(|slot| println!("\nSlot {} auto-saved!", slot + 1));

    println!(
        "Virtual Mines. Saving to {}. Type `help` for commands.\n",
        controller.store().path().display()
    );
    print!("{}", render::slots(&controller.slots()));

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    prompt(&mut stdout, &controller)?;
    for line in stdin.lock().lines() {
        let line = line.context("reading from stdin")?;
        if !line.trim().is_empty() {
            match Line::parse_line(&line) {
                Ok(Line { command }) => {
                    if let Flow::Quit = run(&mut controller, command) {
                        break;
                    }
                }
                Err(err) => println!("{}", err.render()),
            }
        }
        prompt(&mut stdout, &controller)?;
    }

    if controller.active_slot().is_some() {
        controller.save_and_exit()?;
    }
    Ok(())
}

fn prompt(stdout: &mut io::Stdout, controller: &Controller<JsonFileStore>) -> Result<()> {
    match controller.active_slot() {
        Some(slot) => print!("slot {}> ", slot + 1),
        None => print!("> "),
    }
    stdout.flush().context("flushing stdout")
}

fn run(controller: &mut Controller<JsonFileStore>, command: Command) -> Flow {
    let outcome = match command {
        Command::Help => {
            println!(
                "slots | load N | delete N | bet X | mines N | start [BET] [MINES] | \
                 reveal N | cashout | again | status | exit | quit"
            );
            Ok(())
        }
        Command::Slots => {
            print!("{}", render::slots(&controller.slots()));
            Ok(())
        }
        Command::Load { slot } => match to_index(slot).filter(|&i| i < SLOT_COUNT) {
            Some(index) => controller.load_slot(index).map(|status| show(&status)),
            None => {
                println!("Slots are numbered 1 to {SLOT_COUNT}");
                Ok(())
            }
        },
        Command::Delete { slot } => {
            if let Some(index) = to_index(slot) {
                controller.delete_slot(index);
            }
            print!("{}", render::slots(&controller.slots()));
            Ok(())
        }
        Command::Bet { amount } => controller.set_bet(amount).map(|status| show(&status)),
        Command::Mines { count } => controller.set_mine_count(count).map(|status| show(&status)),
        Command::Start { bet, mines } => controller.status().and_then(|current| {
            let bet = bet.unwrap_or(current.snapshot.bet_amount);
            let mines = mines.unwrap_or(current.snapshot.mine_count);
            controller.start_round(bet, mines).map(|status| show(&status))
        }),
        Command::Reveal { tile } => match to_index(tile) {
            Some(index) => controller.reveal_tile(index).map(|status| show(&status)),
            None => Ok(()),
        },
        Command::Cashout => controller.cash_out().map(|status| show(&status)),
        Command::Again => controller.play_again().map(|status| show(&status)),
        Command::Status => controller.status().map(|status| show(&status)),
        Command::Exit => controller.save_and_exit().map(|_| {
            println!("Game saved!");
            print!("{}", render::slots(&controller.slots()));
        }),
        Command::Quit => return Flow::Quit,
    };

    if let Err(err) = outcome {
        println!("{err}");
    }
    Flow::Continue
}

fn show(status: &virtual_mines_core::SessionStatus) {
    print!("{}", render::board(&status.snapshot.grid));
    print!("{}", render::status(status));
}
