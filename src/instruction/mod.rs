//! Instruction representation

use std::fmt;

pub mod decode_helper;

use decode_helper::*;

/// NOP: SLL $0, $0, 0
pub(crate) const NOP: u32 = 0x0000_0000;

/// Opcode, funct and REGIMM selector values of the supported subset
pub mod opcodes {
    pub const SPECIAL: u32 = 0x00;
    pub const REGIMM: u32 = 0x01;
    pub const J: u32 = 0x02;
    pub const JAL: u32 = 0x03;
    pub const BEQ: u32 = 0x04;
    pub const BNE: u32 = 0x05;
    pub const BLEZ: u32 = 0x06;
    pub const BGTZ: u32 = 0x07;
    pub const ADDI: u32 = 0x08;
    pub const ADDIU: u32 = 0x09;
    pub const SLTI: u32 = 0x0A;
    pub const ANDI: u32 = 0x0C;
    pub const ORI: u32 = 0x0D;
    pub const XORI: u32 = 0x0E;
    pub const LUI: u32 = 0x0F;
    pub const LB: u32 = 0x20;
    pub const LH: u32 = 0x21;
    pub const LW: u32 = 0x23;
    pub const SB: u32 = 0x28;
    pub const SH: u32 = 0x29;
    pub const SW: u32 = 0x2B;

    pub const FUNCT_SLL: u32 = 0x00;
    pub const FUNCT_SRL: u32 = 0x02;
    pub const FUNCT_SRA: u32 = 0x03;
    pub const FUNCT_JR: u32 = 0x08;
    pub const FUNCT_JALR: u32 = 0x09;
    pub const FUNCT_SYSCALL: u32 = 0x0C;
    pub const FUNCT_MFHI: u32 = 0x10;
    pub const FUNCT_MTHI: u32 = 0x11;
    pub const FUNCT_MFLO: u32 = 0x12;
    pub const FUNCT_MTLO: u32 = 0x13;
    pub const FUNCT_MULT: u32 = 0x18;
    pub const FUNCT_MULTU: u32 = 0x19;
    pub const FUNCT_DIV: u32 = 0x1A;
    pub const FUNCT_DIVU: u32 = 0x1B;
    pub const FUNCT_ADD: u32 = 0x20;
    pub const FUNCT_ADDU: u32 = 0x21;
    pub const FUNCT_SUB: u32 = 0x22;
    pub const FUNCT_SUBU: u32 = 0x23;
    pub const FUNCT_AND: u32 = 0x24;
    pub const FUNCT_OR: u32 = 0x25;
    pub const FUNCT_XOR: u32 = 0x26;
    pub const FUNCT_NOR: u32 = 0x27;
    pub const FUNCT_SLT: u32 = 0x2A;

    pub const RT_BLTZ: usize = 0x00;
    pub const RT_BGEZ: usize = 0x01;
}

/// Decoded instruction fields
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Instruction {
    /// Raw representation
    pub raw_inst: u32,
    pub opcode: u32,
    pub rs: usize,
    pub rt: usize,
    pub rd: usize,
    pub shamt: u32,
    pub funct: u32,
    /// Raw 16-bit immediate; sign handling is up to the consumer
    pub imm: u32,
    pub target: u32,
}

impl Instruction {
    pub fn new(raw_inst: u32) -> Self {
        Self {
            raw_inst,
            opcode: raw_to_opcode(raw_inst),
            rs: raw_to_rs(raw_inst),
            rt: raw_to_rt(raw_inst),
            rd: raw_to_rd(raw_inst),
            shamt: raw_to_shamt(raw_inst),
            funct: raw_to_funct(raw_inst),
            imm: raw_to_imm(raw_inst),
            target: raw_to_target(raw_inst),
        }
    }

    /// Mnemonic, or None outside the supported subset
    pub fn function(&self) -> Option<Function> {
        get_function(self.opcode, self.funct, self.rt)
    }
}

/// MIPS32 mnemonics understood by the pipeline
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Function {
    // R-type
    SLL,
    SRL,
    SRA,
    JR,
    JALR,
    SYSCALL,
    MFHI,
    MTHI,
    MFLO,
    MTLO,
    MULT,
    MULTU,
    DIV,
    DIVU,
    ADD,
    ADDU,
    SUB,
    SUBU,
    AND,
    OR,
    XOR,
    NOR,
    SLT,
    // REGIMM
    BLTZ,
    BGEZ,
    // I-type and J-type
    J,
    JAL,
    BEQ,
    BNE,
    BLEZ,
    BGTZ,
    ADDI,
    ADDIU,
    SLTI,
    ANDI,
    ORI,
    XORI,
    LUI,
    LB,
    LH,
    LW,
    SB,
    SH,
    SW,
}

impl Function {
    pub fn is_load(self) -> bool {
        matches!(self, Function::LB | Function::LH | Function::LW)
    }

    pub fn is_store(self) -> bool {
        matches!(self, Function::SB | Function::SH | Function::SW)
    }

    /// Branches and jumps. Decoded, but they never redirect the PC.
    pub fn is_control_transfer(self) -> bool {
        use Function::*;
        matches!(
            self,
            J | JAL | JR | JALR | BEQ | BNE | BLEZ | BGTZ | BLTZ | BGEZ
        )
    }

    /// I-type operations whose ALUOutput is written back to rt.
    /// LUI is computed in EX but never written back.
    pub fn writes_back_rt(self) -> bool {
        use Function::*;
        matches!(self, ADDI | ADDIU | SLTI | ANDI | ORI | XORI)
    }

    /// R-type operations whose ALUOutput is written back to rd
    pub fn writes_back_rd(self) -> bool {
        use Function::*;
        matches!(self, ADD | ADDU | SUB | SUBU | AND | OR | XOR | NOR)
    }

    pub fn mnemonic(self) -> String {
        format!("{:?}", self).to_lowercase()
    }
}

impl fmt::Display for Instruction {
    /// MIPS assembly rendering
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Function::*;

        if self.raw_inst == NOP {
            return write!(f, "nop");
        }
        let Some(function) = self.function() else {
            return write!(f, ".word {:#010x}", self.raw_inst);
        };
        let name = function.mnemonic();
        let (rs, rt, rd) = (self.rs, self.rt, self.rd);
        let simm = sign_extend_imm(self.imm) as i32;
        match function {
            SLL | SRL | SRA => {
                write!(f, "{} ${}, ${}, {}", name, rd, rt, self.shamt)
            }
            JR | MTHI | MTLO => write!(f, "{} ${}", name, rs),
            JALR => write!(f, "{} ${}, ${}", name, rd, rs),
            SYSCALL => write!(f, "{}", name),
            MFHI | MFLO => write!(f, "{} ${}", name, rd),
            MULT | MULTU | DIV | DIVU => write!(f, "{} ${}, ${}", name, rs, rt),
            ADD | ADDU | SUB | SUBU | AND | OR | XOR | NOR | SLT => {
                write!(f, "{} ${}, ${}, ${}", name, rd, rs, rt)
            }
            BLTZ | BGEZ | BLEZ | BGTZ => write!(f, "{} ${}, {}", name, rs, simm),
            BEQ | BNE => write!(f, "{} ${}, ${}, {}", name, rs, rt, simm),
            J | JAL => write!(f, "{} {:#010x}", name, self.target << 2),
            ADDI | ADDIU | SLTI => write!(f, "{} ${}, ${}, {}", name, rt, rs, simm),
            ANDI | ORI | XORI => {
                write!(f, "{} ${}, ${}, {:#x}", name, rt, rs, self.imm)
            }
            LUI => write!(f, "{} ${}, {:#x}", name, rt, self.imm),
            LB | LH | LW | SB | SH | SW => {
                write!(f, "{} ${}, {}(${})", name, rt, simm, rs)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_new_decodes_all_fields() {
        let inst = Instruction::new(0x2401_0005); // addiu $1, $0, 5

        assert_eq!(inst.opcode, opcodes::ADDIU);
        assert_eq!(inst.rs, 0);
        assert_eq!(inst.rt, 1);
        assert_eq!(inst.imm, 5);
        assert_eq!(inst.function(), Some(Function::ADDIU));
    }

    #[test]
    fn test_classification() {
        assert!(Function::LW.is_load());
        assert!(Function::SH.is_store());
        assert!(Function::JALR.is_control_transfer());
        assert!(Function::BGEZ.is_control_transfer());
        assert!(Function::ORI.writes_back_rt());
        assert!(!Function::LUI.writes_back_rt());
        assert!(Function::NOR.writes_back_rd());
        assert!(!Function::SLT.writes_back_rd());
        assert!(!Function::MFHI.writes_back_rd());
    }

    #[test]
    fn test_disassembly() {
        let cases = [
            (0x0000_0000, "nop"),
            (0x2401_0005, "addiu $1, $0, 5"),
            (0x2401_FFFB, "addiu $1, $0, -5"),
            (0x0022_1820, "add $3, $1, $2"),
            (0x0002_1883, "sra $3, $2, 2"),
            (0x0000_000C, "syscall"),
            (0x8FA2_0004, "lw $2, 4($29)"),
            (0xA062_FFFF, "sb $2, -1($3)"),
            (0x3C01_1000, "lui $1, 0x1000"),
            (0x0810_0004, "j 0x00400010"),
            (0x1022_0003, "beq $1, $2, 3"),
            (0xFC00_0000, ".word 0xfc000000"),
        ];
        for (raw, text) in cases {
            assert_eq!(Instruction::new(raw).to_string(), text);
        }
    }
}
