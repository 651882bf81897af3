use std::fs;
use std::io::Cursor;

use pretty_assertions::assert_eq;
use sim_lib::cpu::SimPolicy;
use sim_lib::loader;
use sim_lib::memory::{StorageInterface, MEM_DATA_BEGIN, MEM_TEXT_BEGIN};
use sim_lib::pipelined::Simulator;
use sim_lib::shell;
use sim_lib::trace::CycleTrace;

const PROGRAM: &str = "\
# r1 holds the data base on entry; r6 = 0x1000, r2 = 12, r3 = 30
34061000
2402000c
2403001e
00000000
00000000
00000000
# r4 = r2 + r3; store it, load it back into r5
00432020
00000000
00000000
00000000
ac240004
8c250004
# exit
2402000a
00000000
00000000
00000000
0000000c
";

fn load(text: &str) -> Simulator {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("program.hex");
    fs::write(&path, text).unwrap();

    let words = loader::load_program(&path).unwrap();
    let mut sim = Simulator::new(SimPolicy::default()).unwrap();
    sim.load_program(words).unwrap();
    sim.set_register(1, MEM_DATA_BEGIN);
    sim
}

#[test]
fn program_runs_to_syscall_exit() {
    let mut sim = load(PROGRAM);
    let cycles = sim.run_to_completion();

    assert!(!sim.is_running());
    let state = sim.state();
    assert_eq!(state.gpr[1].read(), 0x1000_0000);
    assert_eq!(state.gpr[4].read(), 42);
    assert_eq!(sim.memory().read32(MEM_DATA_BEGIN + 4), 42);
    assert_eq!(state.gpr[5].read(), 42);
    assert_eq!(state.gpr[2].read(), 0xA);
    assert_eq!(state.gpr[6].read(), 0x1000);
    assert_eq!(sim.history().unimplemented_count, 0);
    // The syscall halts in EX, two cycles after its fetch
    assert_eq!(cycles, 17 + 2);
}

#[test]
fn program_without_exit_drains() {
    // Without the exit sequence the load drains normally
    let program: String = PROGRAM.lines().take(14).collect::<Vec<_>>().join("\n");
    let mut sim = load(&program);
    sim.run_to_completion();

    assert!(sim.is_running());
    assert!(sim.is_drained());
    assert_eq!(sim.state().gpr[5].read(), 42);
    assert_eq!(sim.history().inst_count, sim.program().len() as u64);
}

#[test]
fn shell_session_with_trace() {
    let mut sim = load(PROGRAM);
    let dir = tempfile::tempdir().unwrap();
    let trace_path = dir.path().join("trace.csv");
    sim.attach_trace(CycleTrace::create(&trace_path).unwrap());

    let script = "run 3\nshow\nsim\nrdump\nmdump 0x10000000 0x10000008\nquit\n";
    let mut out = Vec::new();
    shell::run_shell(&mut sim, Cursor::new(script), &mut out, false).unwrap();
    let output = String::from_utf8(out).unwrap();

    assert!(output.contains("IF/ID.IR\t: 0x2403001e  addiu $3, $0, 30"));
    assert!(output.contains("[R4]\t: 0x0000002a"));
    assert!(output.contains("0x10000004 (268435460) :\t0x0000002a"));

    let mut trace = sim.detach_trace().unwrap();
    trace.flush().unwrap();
    drop(trace);

    let mut reader = csv::Reader::from_path(&trace_path).unwrap();
    let rows = reader.records().count() as u64;
    assert_eq!(rows, sim.history().cycle_count);
}

#[test]
fn reset_reloads_the_image() {
    let mut sim = load(PROGRAM);
    sim.run_to_completion();
    sim.reset();

    assert!(sim.is_running());
    assert_eq!(sim.state().pc.read(), MEM_TEXT_BEGIN);
    assert_eq!(sim.memory().read32(MEM_DATA_BEGIN + 4), 0);
    assert_eq!(sim.memory().read32(MEM_TEXT_BEGIN), 0x3406_1000);
    assert_eq!(sim.state().gpr[1].read(), 0);

    // A second run behaves like the first
    sim.set_register(1, MEM_DATA_BEGIN);
    let cycles = sim.run_to_completion();
    assert_eq!(cycles, 19);
    assert_eq!(sim.state().gpr[4].read(), 42);
    assert_eq!(sim.state().gpr[5].read(), 42);
    assert_eq!(sim.history().inst_count, 15);
}
