use std::io::{self, BufRead, Write};

use anyhow::Context;
use clap::Parser;
use sweeper_core::{Coord, GameConfig, GameSession, RandomMineGenerator, SessionOptions};

use crate::app::{App, Clock, Flow};
use crate::command::{Command, CommandError};
use crate::render::Format;

mod app;
mod command;
mod logging;
mod render;

#[derive(Parser, Debug)]
#[command(version, about = "Minesweeper in the terminal", long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Board height
    #[arg(long, default_value_t = GameConfig::DEFAULT.rows(), value_parser = clap::value_parser!(Coord).range(1..))]
    rows: Coord,

    /// Board width
    #[arg(long, default_value_t = GameConfig::DEFAULT.cols(), value_parser = clap::value_parser!(Coord).range(1..))]
    cols: Coord,

    /// Number of mines, lowered to leave at least one safe cell
    #[arg(short, long, default_value_t = GameConfig::DEFAULT.mines)]
    mines: u16,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    /// Allow flags before the first reveal
    #[arg(long)]
    early_flags: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    format: Format,
}

fn seed_from_time() -> u64 {
    web_time::SystemTime::now()
        .duration_since(web_time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init(args.verbose.log_level_filter());

    let seed = args.seed.unwrap_or_else(seed_from_time);
    let config = GameConfig::new((args.rows, args.cols), args.mines);
    let options = SessionOptions {
        allow_early_flags: args.early_flags,
    };
    let session = GameSession::with_options(config, RandomMineGenerator::new(seed), options);
    log::debug!("seed: {}", session.generator().seed());
    let mut app = App::new(session, args.format);
    if args.format == Format::Text {
        app.set_notice(command::HELP);
    }

    let clock = Clock::start();
    let mut stdout = io::stdout().lock();
    app.draw(&mut stdout, clock.now())
        .context("failed to draw the board")?;

    for line in io::stdin().lock().lines() {
        let line = line.context("failed to read input")?;
        let now = clock.now();

        match line.parse::<Command>() {
            Ok(command) => {
                if app.handle(command, now) == Flow::Quit {
                    break;
                }
            }
            Err(CommandError::Empty) => {}
            Err(err) => app.set_notice(err.to_string()),
        }

        app.draw(&mut stdout, now)
            .context("failed to draw the board")?;
    }

    stdout.flush()?;
    log::debug!("App stopped");
    Ok(())
}
