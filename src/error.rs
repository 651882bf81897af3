use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the simulator
#[derive(Error, Debug)]
pub enum SimulatorError {
    #[error("Failed to load program: {0}")]
    LoadError(#[from] LoadError),

    #[error("CPU execution error: {0}")]
    ExecutionError(#[from] ExecutionError),

    #[error("Memory error: {0}")]
    MemoryError(#[from] MemoryError),

    #[error("Trace error: {0}")]
    TraceError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors related to reading a hex program image
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Can't open program file '{0}': {1}")]
    FileReadError(PathBuf, #[source] std::io::Error),

    #[error("Malformed word '{text}' at {path}:{line}")]
    ParseError { path: PathBuf, line: usize, text: String },

    #[error("Program of {words} words does not fit the text region ({capacity} words)")]
    TooLarge { words: usize, capacity: usize },
}

/// Pipeline stage that reported an error
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Execute,
    Memory,
    WriteBack,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Execute => "EX",
            Stage::Memory => "MEM",
            Stage::WriteBack => "WB",
        };
        f.write_str(name)
    }
}

/// Errors related to CPU execution.
/// None of these stop the pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("[{stage}] Instruction {raw:#010x} at PC={pc:#010x} is not implemented")]
    Unimplemented { stage: Stage, pc: u32, raw: u32 },
}

/// Errors related to memory configuration
#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("Region '{name}' is empty: begin={begin:#010x}, end={end:#010x}")]
    EmptyRegion { name: &'static str, begin: u32, end: u32 },

    #[error("Regions '{0}' and '{1}' overlap")]
    Overlap(&'static str, &'static str),
}

/// Errors raised while interpreting a shell command.
/// The shell prints these and keeps reading.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("Invalid Command: '{0}'. Type '?' for help.")]
    Unknown(String),

    #[error("'{command}' expects {expected}")]
    MissingArgument { command: &'static str, expected: &'static str },

    #[error("Malformed number '{0}'")]
    MalformedNumber(String),

    #[error("Register index {0} is out of range (0-31)")]
    RegisterOutOfRange(u32),
}

/// Type alias for Result with SimulatorError
pub type SimulatorResult<T> = Result<T, SimulatorError>;
