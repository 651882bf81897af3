use std::fs::File;
use std::io::{self, BufReader};
use std::process::ExitCode;

use clap::Parser;
use sim_lib::dump;
use sim_lib::error::SimulatorResult;
use sim_lib::flags::SimArgs;
use sim_lib::loader;
use sim_lib::pipelined::Simulator;
use sim_lib::shell;
use sim_lib::trace::CycleTrace;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = SimArgs::parse();

    // RUST_LOG wins over -v
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level().as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &SimArgs) -> SimulatorResult<()> {
    let words = loader::load_program(&args.program)?;

    let mut sim = Simulator::new(args.policy())?;
    sim.load_program(words)?;
    if let Some(path) = &args.trace {
        sim.attach_trace(CycleTrace::create(path)?);
    }

    println!("**************************");
    println!("Welcome to MIPS SIM...");
    println!("**************************");
    let mut stdout = io::stdout().lock();
    match &args.script {
        Some(path) => {
            let script = File::open(path)?;
            shell::run_shell(&mut sim, BufReader::new(script), &mut stdout, false)?;
        }
        None => {
            dump::help(&mut stdout)?;
            shell::run_shell(&mut sim, io::stdin().lock(), &mut stdout, true)?;
        }
    }

    if let Some(mut trace) = sim.detach_trace() {
        trace.flush()?;
    }

    if sim.policy().history {
        let history = sim.history();
        println!("Cycles: {}", history.cycle_count);
        println!("Instructions: {}", history.inst_count);
        println!("Unimplemented: {}", history.unimplemented_count);
        if history.inst_count > 0 {
            println!(
                "CPI: {:.3}",
                history.cycle_count as f64 / history.inst_count as f64
            );
        }
    }

    Ok(())
}
