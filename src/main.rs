use clap::Parser;
use lc3_engine::config::EmulatorConfig;
use lc3_engine::emulator::Emulator;
use lc3_engine::hardware::keyboard::TerminalInputProvider;
use lc3_engine::host;
use lc3_engine::terminal::{self, RawModeWriter};
use std::error::Error;
use std::io;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Run an LC-3 image in the terminal, Esc or CTRL-C stops it.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Image file: big-endian origin followed by big-endian words
    image: PathBuf,
    /// Stop at the first reserved opcode or unimplemented trap
    #[arg(long)]
    strict: bool,
    /// Stop after this many instructions
    #[arg(long)]
    max_steps: Option<u64>,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(io::stderr)
        .init();
    let args = Args::parse();

    let config = if args.strict {
        EmulatorConfig::strict()
    } else {
        EmulatorConfig::default()
    };
    let mut emu = Emulator::with_config(config, RawModeWriter::new(io::stdout()));
    emu.load_image(&args.image)?;

    let run = {
        let _lock = terminal::set_terminal_raw(io::stdout());
        host::drive(&mut emu, &mut TerminalInputProvider, args.max_steps)
    };
    info!(
        steps = run.steps,
        stopped_by_user = run.stopped_by_user,
        diagnostics = ?emu.diagnostics(),
        "finished"
    );
    match run.error {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}
