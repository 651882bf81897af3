//! Pipelined implementation

use std::ops::Range;

use tracing::{info, warn};

use crate::cpu::{ArchState, CPUHistory, CPUState, SimPolicy};
use crate::error::{ExecutionError, LoadError, SimulatorResult};
use crate::memory::{Memory, StorageInterface};
use crate::pipelined::pipeline::PipelineState;
use crate::pipelined::stages::ExecOutcome;
use crate::trace::CycleTrace;

pub mod pipeline;
pub mod stages;

/// Everything the simulated machine owns.
/// Commands issued between cycles are the only outside access.
#[derive(Debug)]
pub struct Simulator {
    policy: SimPolicy,
    arch: ArchState,
    pipeline: PipelineState,
    memory: Memory,
    /// The loaded image, kept for reset and listing
    program: Vec<u32>,
    history: CPUHistory,
    running: bool,
    trace: Option<CycleTrace>,
}

impl Simulator {
    pub fn new(policy: SimPolicy) -> SimulatorResult<Self> {
        policy.layout.validate()?;
        let text_base = policy.layout.text.begin;
        Ok(Self {
            arch: ArchState::make(text_base),
            pipeline: PipelineState::default(),
            memory: Memory::new(&policy.layout),
            program: Vec::new(),
            history: CPUHistory::default(),
            running: true,
            trace: None,
            policy,
        })
    }

    /// Place a program image at the text base.
    /// The image replaces any earlier one.
    pub fn load_program(&mut self, words: Vec<u32>) -> SimulatorResult<()> {
        let capacity = self.policy.layout.text_capacity();
        if words.len() > capacity {
            return Err(LoadError::TooLarge { words: words.len(), capacity }.into());
        }
        self.memory.clear_region(self.text_base());
        self.memory.load_words(&words, self.text_base());
        info!(
            "Program loaded into memory: {} words written at {:#010x}",
            words.len(),
            self.text_base()
        );
        self.program = words;
        Ok(())
    }

    /// Write a CSV row after every cycle from now on
    pub fn attach_trace(&mut self, trace: CycleTrace) {
        self.trace = Some(trace);
    }

    pub fn detach_trace(&mut self) -> Option<CycleTrace> {
        self.trace.take()
    }

    /// Execute one cycle
    pub fn cycle(&mut self) {
        // Reverse order: every stage sees the latches of the previous cycle
        let retired = stages::write_back(&mut self.arch, &mut self.history, &self.pipeline);
        self.report(retired);

        let accessed = stages::memory_access(&mut self.memory, &mut self.pipeline);
        self.report(accessed);

        match stages::execute(&mut self.arch, &mut self.pipeline) {
            Ok(ExecOutcome::Halt) => {
                info!("SYSCALL exit at PC={:#010x}", self.pipeline.ex_mem.pc);
                self.running = false;
            }
            Ok(_) => {}
            Err(e) => self.report(Err(e)),
        }

        stages::instruction_decode(&self.arch, &self.memory, &mut self.pipeline);

        let program = self.program_range();
        stages::instruction_fetch(&mut self.arch, &self.memory, &program, &mut self.pipeline);

        self.arch.commit();
        self.history.update_cycle_count(1);

        self.record_trace();
    }

    fn report(&mut self, result: Result<(), ExecutionError>) {
        if let Err(e) = result {
            warn!("{}", e);
            self.history.unimplemented_count += 1;
        }
    }

    fn record_trace(&mut self) {
        let Some(trace) = self.trace.as_mut() else {
            return;
        };
        if let Err(e) = trace.record(&self.arch.current, &self.pipeline, &self.history) {
            warn!("Cycle trace disabled: {}", e);
            self.trace = None;
        }
    }

    /// Simulate for up to `cycles` cycles.
    /// Returns the number of cycles actually executed.
    pub fn run(&mut self, cycles: u64) -> u64 {
        if !self.running {
            info!("Simulation Stopped");
            return 0;
        }

        info!("Running simulator for {} cycles...", cycles);
        let mut executed = 0;
        while executed < cycles && self.running {
            self.cycle();
            executed += 1;
        }
        if !self.running {
            info!("Simulation Stopped");
        }
        executed
    }

    /// Simulate until SYSCALL exit, the pipeline drains,
    /// or the policy's cycle limit is reached
    pub fn run_to_completion(&mut self) -> u64 {
        if !self.running {
            info!("Simulation Stopped");
            return 0;
        }

        info!("Simulation Started...");
        let mut executed = 0;
        while self.running {
            if self.policy.max_cycles.is_some_and(|limit| executed >= limit) {
                warn!("Cycle limit of {} reached", executed);
                break;
            }
            self.cycle();
            executed += 1;
            if self.is_drained() {
                info!(
                    "Pipeline drained at PC={:#010x} without a SYSCALL exit",
                    self.arch.current.pc.read()
                );
                break;
            }
        }
        info!("Simulation Finished after {} cycles", executed);
        executed
    }

    /// No instruction in flight and nothing left to fetch
    pub fn is_drained(&self) -> bool {
        self.pipeline.is_empty()
            && !self.program_range().contains(&self.arch.current.pc.read())
    }

    /// Clears registers and memory, then reloads the program.
    /// The cycle count survives; the instruction counts restart.
    pub fn reset(&mut self) {
        let text_base = self.text_base();
        self.memory.reset();
        self.memory.load_words(&self.program, text_base);
        self.arch.reset(text_base);
        self.pipeline = PipelineState::default();
        self.history = CPUHistory {
            cycle_count: self.history.cycle_count,
            ..Default::default()
        };
        self.running = true;
        info!("Simulator reset; PC={:#010x}", text_base);
    }

    /// Set a general purpose register in both current and next state.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not a register number; the shell checks it.
    pub fn set_register(&mut self, index: usize, value: u32) {
        self.arch.set_register(index, value);
    }

    pub fn set_hi(&mut self, value: u32) {
        self.arch.set_hi(value);
    }

    pub fn set_lo(&mut self, value: u32) {
        self.arch.set_lo(value);
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn text_base(&self) -> u32 {
        self.policy.layout.text.begin
    }

    /// Addresses occupied by the loaded program
    pub fn program_range(&self) -> Range<u32> {
        let begin = self.text_base();
        let len = 4 * self.program.len() as u32;
        begin..begin.wrapping_add(len)
    }

    pub fn program(&self) -> &[u32] {
        &self.program
    }

    pub fn policy(&self) -> &SimPolicy {
        &self.policy
    }

    /// The committed register state
    pub fn state(&self) -> &CPUState {
        &self.arch.current
    }

    pub fn arch(&self) -> &ArchState {
        &self.arch
    }

    pub fn pipeline(&self) -> &PipelineState {
        &self.pipeline
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    pub fn history(&self) -> &CPUHistory {
        &self.history
    }
}
