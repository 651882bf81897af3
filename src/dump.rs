//! Text dumps of simulator state for the interactive shell

use std::io::{self, Write};

use crate::instruction::Instruction;
use crate::memory::StorageInterface;
use crate::pipelined::pipeline::PipelineState;
use crate::pipelined::Simulator;

const RULE: &str = "-------------------------------------";

/// Counters, PC, R0-R31, HI and LO
pub fn rdump(sim: &Simulator, out: &mut impl Write) -> io::Result<()> {
    let state = sim.state();
    let history = sim.history();

    writeln!(out, "{RULE}")?;
    writeln!(out, "Dumping Register Content")?;
    writeln!(out, "{RULE}")?;
    writeln!(out, "# Instructions Executed\t: {}", history.inst_count)?;
    writeln!(out, "# Cycles Executed\t: {}", history.cycle_count)?;
    writeln!(out, "PC\t: {:#010x}", state.pc.read())?;
    writeln!(out, "{RULE}")?;
    writeln!(out, "[Register]\t[Value]")?;
    writeln!(out, "{RULE}")?;
    for (i, reg) in state.gpr.iter().enumerate() {
        writeln!(out, "[R{}]\t: {:#010x}", i, reg.read())?;
    }
    writeln!(out, "{RULE}")?;
    writeln!(out, "[HI]\t: {:#010x}", state.hi.read())?;
    writeln!(out, "[LO]\t: {:#010x}", state.lo.read())?;
    writeln!(out, "{RULE}")?;
    Ok(())
}

/// One word per 4-byte step over `start..=stop`
pub fn mdump(
    mem: &impl StorageInterface,
    start: u32,
    stop: u32,
    out: &mut impl Write,
) -> io::Result<()> {
    writeln!(out, "{RULE}")?;
    writeln!(out, "Memory content [{:#010x}..{:#010x}] :", start, stop)?;
    writeln!(out, "{RULE}")?;
    writeln!(out, "\t[Address in Hex (Dec) ]\t[Value]")?;
    for address in (start..=stop).step_by(4) {
        writeln!(
            out,
            "\t{:#010x} ({}) :\t{:#010x}",
            address,
            address,
            mem.read32(address)
        )?;
    }
    writeln!(out)?;
    Ok(())
}

fn latch(valid: bool, raw_inst: u32) -> String {
    match valid {
        true => format!("{:#010x}  {}", raw_inst, Instruction::new(raw_inst)),
        false => format!("{:#010x}  (bubble)", raw_inst),
    }
}

/// Contents of all four pipeline registers
pub fn show_pipeline(
    pc: u32,
    pipeline: &PipelineState,
    out: &mut impl Write,
) -> io::Result<()> {
    let PipelineState { if_id, id_ex, ex_mem, mem_wb } = pipeline;

    writeln!(out, "Current PC\t: {:#010x}", pc)?;
    writeln!(out, "IF/ID.IR\t: {}", latch(if_id.valid, if_id.raw_inst))?;
    writeln!(out, "IF/ID.PC\t: {:#010x}", if_id.npc)?;
    writeln!(out)?;
    writeln!(out, "ID/EX.IR\t: {}", latch(id_ex.valid, id_ex.raw_inst))?;
    writeln!(out, "ID/EX.A\t\t: {:#010x}", id_ex.a)?;
    writeln!(out, "ID/EX.B\t\t: {:#010x}", id_ex.b)?;
    writeln!(out, "ID/EX.imm\t: {:#010x}", id_ex.imm)?;
    writeln!(out)?;
    writeln!(out, "EX/MEM.IR\t: {}", latch(ex_mem.valid, ex_mem.raw_inst))?;
    writeln!(out, "EX/MEM.A\t: {:#010x}", ex_mem.a)?;
    writeln!(out, "EX/MEM.B\t: {:#010x}", ex_mem.b)?;
    writeln!(out, "EX/MEM.ALUOutput: {:#010x}", ex_mem.alu_output)?;
    writeln!(out)?;
    writeln!(out, "MEM/WB.IR\t: {}", latch(mem_wb.valid, mem_wb.raw_inst))?;
    writeln!(out, "MEM/WB.ALUOutput: {:#010x}", mem_wb.alu_output)?;
    writeln!(out, "MEM/WB.LMD\t: {:#010x}", mem_wb.lmd)?;
    Ok(())
}

/// Address, raw word and assembly of every loaded word
pub fn print_program(sim: &Simulator, out: &mut impl Write) -> io::Result<()> {
    let base = sim.text_base();
    for address in sim.program_range().step_by(4) {
        let raw = sim.memory().read32(address);
        writeln!(
            out,
            "[{:#010x}]\t{:#010x}\t{}",
            address,
            raw,
            Instruction::new(raw)
        )?;
    }
    if sim.program().is_empty() {
        writeln!(out, "No program loaded at {:#010x}", base)?;
    }
    Ok(())
}

pub fn help(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "------------------------------------------------------------------")?;
    writeln!(out)?;
    writeln!(out, "\t**********MIPS Pipeline Simulator Help**********")?;
    writeln!(out)?;
    writeln!(out, "sim\t\t\t-- simulate program to completion")?;
    writeln!(out, "run <n>\t\t\t-- simulate program for <n> cycles")?;
    writeln!(out, "rdump\t\t\t-- dump register values")?;
    writeln!(out, "reset\t\t\t-- clears all registers/memory and re-loads the program")?;
    writeln!(out, "input <reg> <val>\t-- set GPR <reg> to <val>")?;
    writeln!(out, "mdump <start> <stop>\t-- dump memory from <start> to <stop> address (hex)")?;
    writeln!(out, "high <val>\t\t-- set the HI register to <val>")?;
    writeln!(out, "low <val>\t\t-- set the LO register to <val>")?;
    writeln!(out, "print\t\t\t-- print the program loaded into memory")?;
    writeln!(out, "show\t\t\t-- print the current content of the pipeline registers")?;
    writeln!(out, "?\t\t\t-- display help menu")?;
    writeln!(out, "quit\t\t\t-- exit the simulator")?;
    writeln!(out)?;
    writeln!(out, "------------------------------------------------------------------")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::SimPolicy;
    use crate::memory::{Memory, MEM_DATA_BEGIN, MEM_TEXT_BEGIN};

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn simulator() -> Simulator {
        let mut sim = Simulator::new(SimPolicy::default()).unwrap();
        sim.load_program(vec![0x2401_0005, 0x0000_000C]).unwrap();
        sim
    }

    #[test]
    fn test_rdump_lists_every_register() {
        let mut sim = simulator();
        sim.set_register(31, 0xDEAD_BEEF);
        sim.set_lo(7);

        let text = render(|out| rdump(&sim, out));
        assert!(text.contains("[R0]\t: 0x00000000"));
        assert!(text.contains("[R31]\t: 0xdeadbeef"));
        assert!(text.contains("[LO]\t: 0x00000007"));
        assert!(text.contains("PC\t: 0x00400000"));
        let registers = text
            .lines()
            .filter(|line| line.starts_with("[R") && !line.starts_with("[Register"))
            .count();
        assert_eq!(registers, 32);
    }

    #[test]
    fn test_mdump_range_is_inclusive() {
        let mut mem = Memory::default();
        mem.write32(MEM_DATA_BEGIN + 8, 0x1234_5678);

        let text = render(|out| mdump(&mem, MEM_DATA_BEGIN, MEM_DATA_BEGIN + 8, out));
        assert!(text.contains("0x10000000 (268435456) :\t0x00000000"));
        assert!(text.contains("0x10000008 (268435464) :\t0x12345678"));
        assert_eq!(text.matches(" :\t").count(), 3);
    }

    #[test]
    fn test_mdump_empty_when_reversed() {
        let mem = Memory::default();
        let text = render(|out| mdump(&mem, 8, 4, out));
        assert_eq!(text.matches(" :\t").count(), 0);
    }

    #[test]
    fn test_print_program_disassembles() {
        let sim = simulator();
        let text = render(|out| print_program(&sim, out));

        assert!(text.contains("[0x00400000]\t0x24010005\taddiu $1, $0, 5"));
        assert!(text.contains("[0x00400004]\t0x0000000c\tsyscall"));
    }

    #[test]
    fn test_show_pipeline_marks_bubbles() {
        let mut sim = simulator();
        sim.cycle();

        let text = render(|out| show_pipeline(sim.state().pc.read(), sim.pipeline(), out));
        assert!(text.contains("IF/ID.IR\t: 0x24010005  addiu $1, $0, 5"));
        assert!(text.contains(&format!("IF/ID.PC\t: {:#010x}", MEM_TEXT_BEGIN + 4)));
        assert!(text.contains("ID/EX.IR\t: 0x00000000  (bubble)"));
    }

    #[test]
    fn test_help_lists_commands() {
        let text = render(|out| help(out));
        for command in ["sim", "run", "rdump", "reset", "input", "mdump", "high", "low", "print", "show", "quit"] {
            assert!(text.contains(command), "missing {command}");
        }
    }
}
