//! 5 stages of the pipelined datapath.
//! Each stage reads the latch its predecessor wrote last cycle
//! and overwrites the latch feeding its successor.

use std::ops::Range;

use tracing::{debug, trace};

use super::pipeline::PipelineState;
use crate::alu::{alu, alu_imm, divide, multiply};
use crate::cpu::{ArchState, CPUHistory, SYSCALL_CODE_REG, SYSCALL_EXIT};
use crate::error::{ExecutionError, Stage};
use crate::instruction::decode_helper::get_function;
use crate::instruction::{opcodes, Function, Instruction};
use crate::memory::StorageInterface;

/// What the EX stage did with the instruction in ID/EX
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecOutcome {
    /// ID/EX held no instruction
    Bubble,
    /// ALUOutput (result or effective address) was produced
    Output(u32),
    /// HI and/or LO were written
    HiLo,
    /// SYSCALL asked the simulator to stop
    Halt,
    /// Recognized branch or jump; control transfer is disabled
    Inert(Function),
    /// Recognized, but nothing to do (zero divisor, other SYSCALL codes)
    NoEffect,
}

fn unimplemented(stage: Stage, pc: u32, raw: u32) -> ExecutionError {
    ExecutionError::Unimplemented { stage, pc, raw }
}

/// IF stage
pub fn instruction_fetch(
    arch: &mut ArchState,
    mem: &impl StorageInterface,
    program: &Range<u32>,
    pipeline: &mut PipelineState,
) {
    // Increment PC by 4
    let pc = arch.current.pc.read();
    let npc = pc.wrapping_add(4);
    arch.next.pc.write(npc);

    let if_id = &mut pipeline.if_id;
    if !program.contains(&pc) {
        if_id.valid = false;
        return;
    }

    let raw_inst = mem.read32(pc);
    trace!("IF  pc={:#010x} inst={:#010x}", pc, raw_inst);

    if_id.valid = true;
    if_id.pc = pc;
    if_id.npc = npc;
    if_id.raw_inst = raw_inst;
}

/// ID stage
pub fn instruction_decode(
    arch: &ArchState,
    mem: &impl StorageInterface,
    pipeline: &mut PipelineState,
) {
    let if_id = pipeline.if_id;
    let id_ex = &mut pipeline.id_ex;
    if !if_id.valid {
        id_ex.valid = false;
        return;
    }

    // The word is fetched again through the owning PC
    let inst = Instruction::new(mem.read32(if_id.pc));
    trace!("ID  pc={:#010x} {}", if_id.pc, inst);

    id_ex.valid = true;
    id_ex.pc = if_id.pc;
    id_ex.raw_inst = inst.raw_inst;
    id_ex.opcode = inst.opcode;
    id_ex.funct = inst.funct;
    id_ex.rs = inst.rs;
    id_ex.rt = inst.rt;
    id_ex.rd = inst.rd;
    id_ex.shamt = inst.shamt;
    id_ex.imm = inst.imm;
    id_ex.target = inst.target;
    id_ex.a = arch.current.gpr[inst.rs].read();
    id_ex.b = arch.current.gpr[inst.rt].read();
}

/// EX stage
pub fn execute(
    arch: &mut ArchState,
    pipeline: &mut PipelineState,
) -> Result<ExecOutcome, ExecutionError> {
    use Function::*;

    let id_ex = pipeline.id_ex;
    let ex_mem = &mut pipeline.ex_mem;
    if !id_ex.valid {
        ex_mem.valid = false;
        return Ok(ExecOutcome::Bubble);
    }

    ex_mem.valid = true;
    ex_mem.pc = id_ex.pc;
    ex_mem.raw_inst = id_ex.raw_inst;
    ex_mem.opcode = id_ex.opcode;
    ex_mem.funct = id_ex.funct;
    ex_mem.a = id_ex.a;
    ex_mem.b = id_ex.b;
    ex_mem.dest = match id_ex.opcode {
        opcodes::SPECIAL => id_ex.rd,
        _ => id_ex.rt,
    };

    let not_implemented = || unimplemented(Stage::Execute, id_ex.pc, id_ex.raw_inst);
    let function = get_function(id_ex.opcode, id_ex.funct, id_ex.rt)
        .ok_or_else(not_implemented)?;
    let (a, b) = (id_ex.a, id_ex.b);

    let outcome = match function {
        f if f.is_control_transfer() => {
            debug!("EX  pc={:#010x} {:?} not taken: control transfer is disabled", id_ex.pc, f);
            ExecOutcome::Inert(f)
        }
        SYSCALL => {
            if arch.current.gpr[SYSCALL_CODE_REG].read() == SYSCALL_EXIT {
                ExecOutcome::Halt
            } else {
                ExecOutcome::NoEffect
            }
        }
        MFHI | MFLO => {
            let value = match function {
                MFHI => arch.current.hi.read(),
                _ => arch.current.lo.read(),
            };
            arch.next.gpr[id_ex.rd].write(value);
            ExecOutcome::Output(value)
        }
        MTHI => {
            arch.next.hi.write(a);
            ExecOutcome::HiLo
        }
        MTLO => {
            arch.next.lo.write(a);
            ExecOutcome::HiLo
        }
        MULT | MULTU => {
            let (hi, lo) = multiply(a, b, function == MULT);
            arch.next.hi.write(hi);
            arch.next.lo.write(lo);
            ExecOutcome::HiLo
        }
        DIV | DIVU => match divide(a, b, function == DIV) {
            Some((hi, lo)) => {
                arch.next.hi.write(hi);
                arch.next.lo.write(lo);
                ExecOutcome::HiLo
            }
            None => {
                debug!("EX  pc={:#010x} division by zero skipped", id_ex.pc);
                ExecOutcome::NoEffect
            }
        },
        _ => {
            let value = match id_ex.opcode {
                opcodes::SPECIAL => alu(function, a, b, id_ex.shamt),
                _ => alu_imm(function, a, id_ex.imm),
            };
            ExecOutcome::Output(value.ok_or_else(not_implemented)?)
        }
    };

    if let ExecOutcome::Output(value) = outcome {
        ex_mem.alu_output = value;
    }
    trace!("EX  pc={:#010x} {:?} -> {:?}", id_ex.pc, function, outcome);

    Ok(outcome)
}

/// MEM stage
pub fn memory_access(
    mem: &mut impl StorageInterface,
    pipeline: &mut PipelineState,
) -> Result<(), ExecutionError> {
    use Function::*;

    let ex_mem = pipeline.ex_mem;
    let mem_wb = &mut pipeline.mem_wb;
    if !ex_mem.valid {
        mem_wb.valid = false;
        return Ok(());
    }

    mem_wb.valid = true;
    mem_wb.pc = ex_mem.pc;
    mem_wb.raw_inst = ex_mem.raw_inst;
    mem_wb.opcode = ex_mem.opcode;
    mem_wb.funct = ex_mem.funct;
    mem_wb.dest = ex_mem.dest;

    if ex_mem.opcode == opcodes::SPECIAL {
        mem_wb.alu_output = ex_mem.alu_output;
        return Ok(());
    }

    // For I-type instructions dest is rt, which selects the REGIMM variant
    let function = get_function(ex_mem.opcode, ex_mem.funct, ex_mem.dest)
        .ok_or_else(|| unimplemented(Stage::Memory, ex_mem.pc, ex_mem.raw_inst))?;
    let address = ex_mem.alu_output;
    let b = ex_mem.b;

    match function {
        LB => {
            let data = mem.read32(address);
            mem_wb.lmd = match data & 0x80 {
                0 => data & 0x0000_00FF,
                _ => data | 0xFFFF_FF00,
            };
        }
        LH => {
            let data = mem.read32(address);
            mem_wb.lmd = match data & 0x8000 {
                0 => data & 0x0000_FFFF,
                _ => data | 0xFFFF_0000,
            };
        }
        LW => {
            mem_wb.alu_output = mem.read32(address);
        }
        SB => {
            let data = mem.read32(address);
            mem.write32(address, (data & 0xFFFF_FF00) | (b & 0x0000_00FF));
        }
        SH => {
            let data = mem.read32(address);
            mem.write32(address, (data & 0xFFFF_0000) | (b & 0x0000_FFFF));
        }
        SW => {
            mem.write32(address, b);
        }
        _ => {}
    }

    if function.is_load() || function.is_store() {
        trace!("MEM pc={:#010x} {:?} addr={:#010x}", ex_mem.pc, function, address);
    }
    if function != LW {
        mem_wb.alu_output = ex_mem.alu_output;
    }

    Ok(())
}

/// WB stage
pub fn write_back(
    arch: &mut ArchState,
    history: &mut CPUHistory,
    pipeline: &PipelineState,
) -> Result<(), ExecutionError> {
    use Function::*;

    let mem_wb = pipeline.mem_wb;
    if !mem_wb.valid {
        return Ok(());
    }

    // The instruction retires here whatever its opcode
    history.update_inst_count(1);

    let dest = mem_wb.dest;
    if mem_wb.opcode == opcodes::SPECIAL {
        let function = get_function(mem_wb.opcode, mem_wb.funct, 0);
        if function.is_some_and(Function::writes_back_rd) {
            trace!("WB  pc={:#010x} ${} <= {:#010x}", mem_wb.pc, dest, mem_wb.alu_output);
            arch.next.gpr[dest].write(mem_wb.alu_output);
        }
        return Ok(());
    }

    let not_implemented = || unimplemented(Stage::WriteBack, mem_wb.pc, mem_wb.raw_inst);
    let function = get_function(mem_wb.opcode, mem_wb.funct, dest)
        .ok_or_else(not_implemented)?;
    let value = match function {
        LB | LH => mem_wb.lmd,
        // MEM leaves the loaded word in ALUOutput, not LMD
        LW => mem_wb.alu_output,
        f if f.writes_back_rt() => mem_wb.alu_output,
        f if f.is_store() || f.is_control_transfer() => return Ok(()),
        _ => return Err(not_implemented()),
    };

    trace!("WB  pc={:#010x} ${} <= {:#010x}", mem_wb.pc, dest, value);
    arch.next.gpr[dest].write(value);

    Ok(())
}
