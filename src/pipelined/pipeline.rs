//! Pipeline state
//!
//! Latches are plain records. A stage only writes the fields it produces,
//! so anything it leaves alone keeps the value of an earlier instruction.
//! `valid` is false for bubbles: latches that never held an instruction
//! from the loaded program.

/// Pipeline state = 4 pipeline registers
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipelineState {
    pub if_id: IFIDRegister,
    pub id_ex: IDEXRegister,
    pub ex_mem: EXMEMRegister,
    pub mem_wb: MEMWBRegister,
}

impl PipelineState {
    /// No latch holds an instruction
    pub fn is_empty(&self) -> bool {
        !(self.if_id.valid
            || self.id_ex.valid
            || self.ex_mem.valid
            || self.mem_wb.valid)
    }
}

/// IF/ID register
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IFIDRegister {
    pub valid: bool,

    /// Program counter of the fetched instruction
    pub pc: u32,

    /// Next sequential PC
    pub npc: u32,

    /// Raw instruction
    pub raw_inst: u32,
}

/// ID/EX register
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IDEXRegister {
    pub valid: bool,

    /// Program counter
    pub pc: u32,

    /// Raw instruction
    pub raw_inst: u32,

    pub opcode: u32,
    pub funct: u32,
    pub rs: usize,
    pub rt: usize,
    pub rd: usize,
    pub shamt: u32,
    /// Raw immediate, not yet sign-extended
    pub imm: u32,
    pub target: u32,

    /// Value of register rs
    pub a: u32,
    /// Value of register rt
    pub b: u32,
}

/// EX/MEM register
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EXMEMRegister {
    pub valid: bool,

    /// Program counter
    pub pc: u32,

    /// Raw instruction
    pub raw_inst: u32,

    pub opcode: u32,
    pub funct: u32,

    /// Operand values carried from ID/EX
    pub a: u32,
    pub b: u32,

    /// Destination register: rd for R-type, rt otherwise
    pub dest: usize,

    /// ALU result or effective address
    pub alu_output: u32,
}

/// MEM/WB register
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MEMWBRegister {
    pub valid: bool,

    /// Program counter
    pub pc: u32,

    /// Raw instruction
    pub raw_inst: u32,

    pub opcode: u32,
    pub funct: u32,

    pub dest: usize,

    /// ALU result, or the loaded word for LW
    pub alu_output: u32,

    /// Load memory data for LB/LH
    pub lmd: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty() {
        let mut state = PipelineState::default();
        assert!(state.is_empty());

        state.ex_mem.valid = true;
        assert!(!state.is_empty());
    }
}
