//! Interactive command interpreter
//!
//! Commands are matched on their leading letters, case-insensitively,
//! so `s`, `sim` and `SIMULATE` all run to completion while `sh` shows
//! the pipeline.

use std::io::{BufRead, Write};
use std::str::FromStr;

use tracing::{debug, info};

use crate::cpu::MIPS_REGS;
use crate::dump;
use crate::error::{CommandError, SimulatorResult};
use crate::pipelined::Simulator;

pub const PROMPT: &str = "MIPS SIM:> ";

/// One parsed shell command
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Run until SYSCALL exit
    Sim,
    Run(u64),
    Reset,
    Input { reg: usize, value: u32 },
    High(u32),
    Low(u32),
    Mdump { start: u32, stop: u32 },
    Rdump,
    Show,
    Print,
    Help,
    Quit,
}

/// Whether the interpreter keeps reading after a command
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Decimal or `0x` hex, optionally negative; negatives wrap to two's complement
pub fn parse_value(text: &str) -> Result<u32, CommandError> {
    let malformed = || CommandError::MalformedNumber(text.to_string());
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    if body.starts_with(['-', '+']) {
        return Err(malformed());
    }
    let magnitude = match body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        Some(hex) => i64::from_str_radix(hex, 16),
        None => body.parse::<i64>(),
    }
    .map_err(|_| malformed())?;

    let value = if negative { -magnitude } else { magnitude };
    if !(i32::MIN as i64..=u32::MAX as i64).contains(&value) {
        return Err(malformed());
    }
    Ok(value as u32)
}

/// Hex with or without the `0x` prefix
pub fn parse_address(text: &str) -> Result<u32, CommandError> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    u32::from_str_radix(digits, 16).map_err(|_| CommandError::MalformedNumber(text.to_string()))
}

pub fn parse_register(text: &str) -> Result<usize, CommandError> {
    let index = text
        .parse::<u32>()
        .map_err(|_| CommandError::MalformedNumber(text.to_string()))?;
    if index as usize >= MIPS_REGS {
        return Err(CommandError::RegisterOutOfRange(index));
    }
    Ok(index as usize)
}

fn argument<'a>(
    args: &mut impl Iterator<Item = &'a str>,
    command: &'static str,
    expected: &'static str,
) -> Result<&'a str, CommandError> {
    args.next()
        .ok_or(CommandError::MissingArgument { command, expected })
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Err(CommandError::Unknown(String::new()));
        };
        let lower = name.to_lowercase();
        let mut chars = lower.chars();
        let first = chars.next();
        let second = chars.next();

        if lower == "help" {
            return Ok(Command::Help);
        }

        let command = match (first, second) {
            (Some('s'), Some('h')) => Command::Show,
            (Some('s'), _) => Command::Sim,
            (Some('m'), _) => {
                let start = argument(&mut words, "mdump", "<start> <stop>")?;
                let stop = argument(&mut words, "mdump", "<start> <stop>")?;
                Command::Mdump {
                    start: parse_address(start)?,
                    stop: parse_address(stop)?,
                }
            }
            (Some('?'), _) => Command::Help,
            (Some('q'), _) => Command::Quit,
            (Some('r'), Some('d')) => Command::Rdump,
            (Some('r'), Some('e')) => Command::Reset,
            (Some('r'), _) => {
                let cycles = argument(&mut words, "run", "<n>")?;
                if cycles.starts_with('-') {
                    return Err(CommandError::MalformedNumber(cycles.to_string()));
                }
                Command::Run(parse_value(cycles)? as u64)
            }
            (Some('i'), _) => {
                let reg = argument(&mut words, "input", "<reg> <val>")?;
                let value = argument(&mut words, "input", "<reg> <val>")?;
                Command::Input {
                    reg: parse_register(reg)?,
                    value: parse_value(value)?,
                }
            }
            (Some('h'), _) => Command::High(parse_value(argument(&mut words, "high", "<val>")?)?),
            (Some('l'), _) => Command::Low(parse_value(argument(&mut words, "low", "<val>")?)?),
            (Some('p'), _) => Command::Print,
            _ => return Err(CommandError::Unknown(name.to_string())),
        };
        Ok(command)
    }
}

/// Apply one command to the simulator, writing any report to `out`
pub fn execute(
    sim: &mut Simulator,
    command: Command,
    out: &mut impl Write,
) -> SimulatorResult<Control> {
    debug!("command {:?}", command);
    match command {
        Command::Sim => {
            if !sim.is_running() {
                writeln!(out, "Simulation Stopped.")?;
            } else {
                let cycles = sim.run_to_completion();
                writeln!(out, "Simulation Finished after {} cycles.", cycles)?;
            }
        }
        Command::Run(cycles) => {
            if !sim.is_running() {
                writeln!(out, "Simulation Stopped.")?;
            } else {
                sim.run(cycles);
                if !sim.is_running() {
                    writeln!(out, "Simulation Stopped.")?;
                }
            }
        }
        Command::Reset => sim.reset(),
        Command::Input { reg, value } => sim.set_register(reg, value),
        Command::High(value) => sim.set_hi(value),
        Command::Low(value) => sim.set_lo(value),
        Command::Mdump { start, stop } => dump::mdump(sim.memory(), start, stop, out)?,
        Command::Rdump => dump::rdump(sim, out)?,
        Command::Show => dump::show_pipeline(sim.state().pc.read(), sim.pipeline(), out)?,
        Command::Print => dump::print_program(sim, out)?,
        Command::Help => dump::help(out)?,
        Command::Quit => {
            writeln!(out, "Exiting MIPS SIM! Good Bye...")?;
            return Ok(Control::Quit);
        }
    }
    Ok(Control::Continue)
}

/// Read commands from `input` until `quit` or end of input.
/// Bad commands are reported to `out` and leave the simulator untouched.
pub fn run_shell(
    sim: &mut Simulator,
    input: impl BufRead,
    out: &mut impl Write,
    prompt: bool,
) -> SimulatorResult<()> {
    if prompt {
        write!(out, "{PROMPT}")?;
        out.flush()?;
    }
    for line in input.lines() {
        let line = line?;
        if !line.trim().is_empty() {
            match line.parse::<Command>() {
                Ok(command) => {
                    if execute(sim, command, out)? == Control::Quit {
                        return Ok(());
                    }
                }
                Err(e) => writeln!(out, "{}", e)?,
            }
        }
        if prompt {
            write!(out, "{PROMPT}")?;
            out.flush()?;
        }
    }
    info!("End of command input");
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::cpu::SimPolicy;

    fn simulator() -> Simulator {
        let mut sim = Simulator::new(SimPolicy::default()).unwrap();
        sim.load_program(vec![0x2401_0005]).unwrap();
        sim
    }

    fn session(sim: &mut Simulator, script: &str) -> String {
        let mut out = Vec::new();
        run_shell(sim, script.as_bytes(), &mut out, false).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_prefix_matching() {
        assert_eq!("sim".parse(), Ok(Command::Sim));
        assert_eq!("S".parse(), Ok(Command::Sim));
        assert_eq!("show".parse(), Ok(Command::Show));
        assert_eq!("SH".parse(), Ok(Command::Show));
        assert_eq!("rdump".parse(), Ok(Command::Rdump));
        assert_eq!("reset".parse(), Ok(Command::Reset));
        assert_eq!("run 10".parse(), Ok(Command::Run(10)));
        assert_eq!("r 0x10".parse(), Ok(Command::Run(16)));
        assert_eq!("p".parse(), Ok(Command::Print));
        assert_eq!("?".parse(), Ok(Command::Help));
        assert_eq!("help".parse(), Ok(Command::Help));
        assert_eq!("quit".parse(), Ok(Command::Quit));
    }

    #[test]
    fn test_arguments() {
        assert_eq!(
            "input 3 -1".parse(),
            Ok(Command::Input { reg: 3, value: 0xFFFF_FFFF })
        );
        assert_eq!("high 0x10".parse(), Ok(Command::High(16)));
        assert_eq!("low -0x10".parse(), Ok(Command::Low((-16i32) as u32)));
        assert_eq!(
            "mdump 10000000 0x10000010".parse(),
            Ok(Command::Mdump { start: 0x1000_0000, stop: 0x1000_0010 })
        );
    }

    #[test]
    fn test_rejections() {
        assert_eq!("xyz".parse::<Command>(), Err(CommandError::Unknown("xyz".into())));
        assert_eq!("input 32 1".parse::<Command>(), Err(CommandError::RegisterOutOfRange(32)));
        assert_eq!(
            "high abc".parse::<Command>(),
            Err(CommandError::MalformedNumber("abc".into()))
        );
        assert!(matches!(
            "mdump 10".parse::<Command>(),
            Err(CommandError::MissingArgument { command: "mdump", .. })
        ));
        assert_eq!(
            "run -1".parse::<Command>(),
            Err(CommandError::MalformedNumber("-1".into()))
        );
        assert!(matches!(
            "run".parse::<Command>(),
            Err(CommandError::MissingArgument { command: "run", .. })
        ));
    }

    #[test]
    fn test_parse_value_bounds() {
        assert_eq!(parse_value("4294967295"), Ok(u32::MAX));
        assert_eq!(parse_value("-2147483648"), Ok(0x8000_0000));
        assert!(parse_value("4294967296").is_err());
        assert!(parse_value("-2147483649").is_err());
        assert!(parse_value("").is_err());
        assert!(parse_value("--5").is_err());
    }

    #[test]
    fn test_bad_command_leaves_state_untouched() {
        let mut sim = simulator();
        let before = *sim.arch();

        let output = session(&mut sim, "bogus\ninput 40 1\nhigh zz\n");
        assert!(output.contains("Invalid Command: 'bogus'"));
        assert!(output.contains("out of range"));
        assert!(output.contains("Malformed number 'zz'"));
        assert_eq!(*sim.arch(), before);
    }

    #[test]
    fn test_session_runs_program() {
        let mut sim = simulator();

        let output = session(&mut sim, "input 2 7\nrun 5\nrdump\nquit\nrun 5\n");
        assert!(output.contains("[R1]\t: 0x00000005"));
        assert!(output.contains("[R2]\t: 0x00000007"));
        assert!(output.contains("Good Bye"));
        // Nothing after quit is executed
        assert_eq!(sim.history().cycle_count, 5);
    }

    #[test]
    fn test_sim_after_halt_reports_stopped() {
        let mut sim = Simulator::new(SimPolicy::default()).unwrap();
        sim.load_program(vec![0x0000_000C]).unwrap();

        let output = session(&mut sim, "input 2 0xA\nsim\nsim\n");
        assert!(output.contains("Simulation Finished after 3 cycles."));
        assert!(output.contains("Simulation Stopped."));
    }

    #[test]
    fn test_reset_restores_program() {
        let mut sim = simulator();
        session(&mut sim, "sim\nreset\n");

        assert_eq!(sim.history().inst_count, 0);
        assert_eq!(sim.state().gpr[1].read(), 0);
        assert!(sim.is_running());
    }
}
