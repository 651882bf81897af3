//! Decoding helper functions.
//! Field masks follow the MIPS32 encoding.

use super::opcodes;
use super::Function;

pub(crate) const OPCODE_MASK: u32 = 0xFC00_0000;
pub(crate) const RS_MASK: u32 = 0x03E0_0000;
pub(crate) const RT_MASK: u32 = 0x001F_0000;
pub(crate) const RD_MASK: u32 = 0x0000_F800;
pub(crate) const SHAMT_MASK: u32 = 0x0000_07C0;
pub(crate) const FUNCT_MASK: u32 = 0x0000_003F;
pub(crate) const IMM_MASK: u32 = 0x0000_FFFF;
pub(crate) const TARGET_MASK: u32 = 0x03FF_FFFF;

pub fn raw_to_opcode(raw_inst: u32) -> u32 {
    (raw_inst & OPCODE_MASK) >> 26
}

pub fn raw_to_rs(raw_inst: u32) -> usize {
    ((raw_inst & RS_MASK) >> 21) as usize
}

pub fn raw_to_rt(raw_inst: u32) -> usize {
    ((raw_inst & RT_MASK) >> 16) as usize
}

pub fn raw_to_rd(raw_inst: u32) -> usize {
    ((raw_inst & RD_MASK) >> 11) as usize
}

pub fn raw_to_shamt(raw_inst: u32) -> u32 {
    (raw_inst & SHAMT_MASK) >> 6
}

pub fn raw_to_funct(raw_inst: u32) -> u32 {
    raw_inst & FUNCT_MASK
}

pub fn raw_to_imm(raw_inst: u32) -> u32 {
    raw_inst & IMM_MASK
}

pub fn raw_to_target(raw_inst: u32) -> u32 {
    raw_inst & TARGET_MASK
}

/// Sign-extends the low 16 bits
pub fn sign_extend_imm(imm: u32) -> u32 {
    imm as u16 as i16 as i32 as u32
}

/// Determines an instruction's mnemonic, e.g., ADDIU, SRA or BEQ.
/// `rt` only matters for the REGIMM group.
pub fn get_function(opcode: u32, funct: u32, rt: usize) -> Option<Function> {
    use Function::*;

    if opcode == opcodes::SPECIAL {
        return Some(match funct {
            opcodes::FUNCT_SLL => SLL,
            opcodes::FUNCT_SRL => SRL,
            opcodes::FUNCT_SRA => SRA,
            opcodes::FUNCT_JR => JR,
            opcodes::FUNCT_JALR => JALR,
            opcodes::FUNCT_SYSCALL => SYSCALL,
            opcodes::FUNCT_MFHI => MFHI,
            opcodes::FUNCT_MTHI => MTHI,
            opcodes::FUNCT_MFLO => MFLO,
            opcodes::FUNCT_MTLO => MTLO,
            opcodes::FUNCT_MULT => MULT,
            opcodes::FUNCT_MULTU => MULTU,
            opcodes::FUNCT_DIV => DIV,
            opcodes::FUNCT_DIVU => DIVU,
            opcodes::FUNCT_ADD => ADD,
            opcodes::FUNCT_ADDU => ADDU,
            opcodes::FUNCT_SUB => SUB,
            opcodes::FUNCT_SUBU => SUBU,
            opcodes::FUNCT_AND => AND,
            opcodes::FUNCT_OR => OR,
            opcodes::FUNCT_XOR => XOR,
            opcodes::FUNCT_NOR => NOR,
            opcodes::FUNCT_SLT => SLT,
            _ => return None,
        });
    }

    Some(match (opcode, rt) {
        (opcodes::REGIMM, opcodes::RT_BLTZ) => BLTZ,
        (opcodes::REGIMM, opcodes::RT_BGEZ) => BGEZ,
        (opcodes::J, _) => J,
        (opcodes::JAL, _) => JAL,
        (opcodes::BEQ, _) => BEQ,
        (opcodes::BNE, _) => BNE,
        (opcodes::BLEZ, _) => BLEZ,
        (opcodes::BGTZ, _) => BGTZ,
        (opcodes::ADDI, _) => ADDI,
        (opcodes::ADDIU, _) => ADDIU,
        (opcodes::SLTI, _) => SLTI,
        (opcodes::ANDI, _) => ANDI,
        (opcodes::ORI, _) => ORI,
        (opcodes::XORI, _) => XORI,
        (opcodes::LUI, _) => LUI,
        (opcodes::LB, _) => LB,
        (opcodes::LH, _) => LH,
        (opcodes::LW, _) => LW,
        (opcodes::SB, _) => SB,
        (opcodes::SH, _) => SH,
        (opcodes::SW, _) => SW,
        _ => return None,
    })
}
