use std::path::PathBuf;

use clap::Parser;
use tracing::Level;

use crate::cpu::SimPolicy;

/// MIPS32 five-stage pipeline simulator.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct SimArgs {
    /// Program image: one hex word per line
    pub program: PathBuf,

    /// Print cycle and instruction counts when the session ends
    #[arg(long)]
    pub history: bool,

    /// Stop `sim` after this many cycles even without a SYSCALL exit
    #[arg(long, value_name = "N")]
    pub max_cycles: Option<u64>,

    /// Write one CSV row per cycle to this file
    #[arg(long, value_name = "FILE")]
    pub trace: Option<PathBuf>,

    /// Read shell commands from a file instead of stdin
    #[arg(long, value_name = "FILE")]
    pub script: Option<PathBuf>,

    /// Log more detail; repeat for stage-level tracing
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl SimArgs {
    /// Log level selected by the number of `-v` flags
    pub fn log_level(&self) -> Level {
        match self.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }

    pub fn policy(&self) -> SimPolicy {
        SimPolicy {
            history: self.history,
            max_cycles: self.max_cycles,
            ..Default::default()
        }
    }
}
