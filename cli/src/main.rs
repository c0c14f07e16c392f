use std::io::{self, Write};
use std::time::Duration;

use anyhow::Context;
use cellsweep_core::{Game, Mode, RandomLayoutGenerator, spawn_game, spawn_ticker};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::command::{Command, HELP};
use crate::render::View;

mod command;
mod render;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Board preset: beginner, intermediate or advanced
    #[arg(default_value = "intermediate")]
    mode: String,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    /// Clock tick period in milliseconds
    #[arg(long, default_value_t = 100)]
    tick_ms: u64,

    /// Print every snapshot as a JSON line instead of drawing the board
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    let mode = Mode::from_name_or_default(&args.mode);
    let config = mode.config();
    log::debug!("mode: {}, seed: {:?}", mode, args.seed);
    let generator = match args.seed {
        Some(seed) => RandomLayoutGenerator::seeded(config, seed),
        None => RandomLayoutGenerator::from_entropy(config),
    };

    let Game {
        handle,
        mut snapshots,
        task,
    } = spawn_game(generator);
    let ticker = spawn_ticker(handle.clone(), Duration::from_millis(args.tick_ms.max(1)));

    let mut view = View::new(args.json);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    if !args.json {
        println!("{} {}x{} with {} mines", mode, mode.rows(), mode.columns(), mode.mines());
        println!("{HELP}");
    }

    loop {
        tokio::select! {
            snapshot = snapshots.recv() => {
                let Some(mut snapshot) = snapshot else {
                    break;
                };
                // only the newest of a burst is worth drawing
                while let Some(next) = snapshots.try_recv() {
                    snapshot = next;
                }
                view.show(snapshot, &mut io::stdout().lock())?;
            }
            line = lines.next_line() => {
                let Some(line) = line.context("reading stdin")? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<Command>().and_then(|cmd| cmd.check_bounds(mode)) {
                    Ok(Command::Press { coords, side }) => {
                        if view.accepts_presses() {
                            handle.press_tile(coords, side)?;
                        } else {
                            eprintln!("round is over, n starts a new game");
                        }
                    }
                    Ok(Command::NewGame) => handle.press_face()?,
                    Ok(Command::Help) => {
                        println!("{HELP}");
                        view.redraw(&mut io::stdout().lock())?;
                    }
                    Ok(Command::Quit) => break,
                    Err(err) => {
                        eprintln!("{err}");
                        io::stderr().flush()?;
                    }
                }
            }
        }
    }

    log::debug!("shutting down");
    // the coordinator may already be gone if the snapshot stream closed
    let _ = handle.shutdown();
    task.await.context("coordinator task")?;
    ticker.await.context("ticker task")?;
    Ok(())
}
