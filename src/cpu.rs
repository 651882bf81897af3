//! MIPS32 architectural state

use crate::memory::MemoryLayout;

pub const MIPS_REGS: usize = 32;

/// Register read by SYSCALL to select the service
pub const SYSCALL_CODE_REG: usize = 2;
/// SYSCALL service code that stops the simulation
pub const SYSCALL_EXIT: u32 = 0xA;

/// Architectural state: one snapshot of the register file
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CPUState {
    /// Program counter
    pub pc: Register,
    /// General purpose registers.
    /// Register 0 is an ordinary register here; nothing keeps it at zero.
    pub gpr: [Register; MIPS_REGS],
    /// Multiply/divide result, high word
    pub hi: Register,
    /// Multiply/divide result, low word
    pub lo: Register,
}

impl CPUState {
    pub fn make(pc: u32) -> Self {
        Self {
            pc: Register::new(pc),
            gpr: [Register::new(0); MIPS_REGS],
            hi: Register::new(0),
            lo: Register::new(0),
        }
    }

    /// Zeroes registers, HI and LO, and points PC at `pc`
    pub fn reset(&mut self, pc: u32) {
        *self = Self::make(pc);
    }
}

/// Register file simulation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Register {
    /// Current data in the register
    data: u32,
}

impl Register {
    pub fn new(data: u32) -> Self {
        Self { data }
    }

    /// Reads the register
    pub fn read(&self) -> u32 {
        self.data
    }

    /// Writes to register
    pub fn write(&mut self, value: u32) {
        self.data = value;
    }
}

/// Double-buffered state.
/// Stages read `current`; every write of a cycle lands in `next`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArchState {
    pub current: CPUState,
    pub next: CPUState,
}

impl ArchState {
    pub fn make(pc: u32) -> Self {
        let state = CPUState::make(pc);
        Self { current: state, next: state }
    }

    /// current := next
    pub fn commit(&mut self) {
        self.current = self.next;
    }

    pub fn reset(&mut self, pc: u32) {
        self.current.reset(pc);
        self.next.reset(pc);
    }

    /// Sets a register in both snapshots.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below [`MIPS_REGS`]; callers validate it.
    pub fn set_register(&mut self, index: usize, value: u32) {
        self.current.gpr[index].write(value);
        self.next.gpr[index].write(value);
    }

    pub fn set_hi(&mut self, value: u32) {
        self.current.hi.write(value);
        self.next.hi.write(value);
    }

    pub fn set_lo(&mut self, value: u32) {
        self.current.lo.write(value);
        self.next.lo.write(value);
    }
}

/// Simulator policy
#[derive(Clone, Debug, Default)]
pub struct SimPolicy {
    /// Print cycle and instruction counts when the session ends
    pub history: bool,
    /// Upper bound on cycles for a single run-to-completion
    pub max_cycles: Option<u64>,
    /// Memory region table
    pub layout: MemoryLayout,
}

/// History module
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CPUHistory {
    pub cycle_count: u64,
    pub inst_count: u64,
    pub unimplemented_count: u64,
}

impl CPUHistory {
    /// Increments history cycle count
    pub fn update_cycle_count(&mut self, value: u64) {
        self.cycle_count += value;
    }

    /// Increments history instruction count
    pub fn update_inst_count(&mut self, value: u64) {
        self.inst_count += value;
    }
}
