//! Per-cycle CSV trace of the pipeline

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::cpu::{CPUHistory, CPUState};
use crate::error::SimulatorResult;
use crate::pipelined::pipeline::PipelineState;

const HEADER: [&str; 12] = [
    "cycle",
    "pc",
    "if_id_pc",
    "if_id_inst",
    "id_ex_pc",
    "id_ex_inst",
    "ex_mem_pc",
    "ex_mem_inst",
    "mem_wb_pc",
    "mem_wb_inst",
    "instructions",
    "unimplemented",
];

/// CSV sink receiving one row per committed cycle
pub struct CycleTrace {
    writer: csv::Writer<Box<dyn Write>>,
}

impl std::fmt::Debug for CycleTrace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CycleTrace").finish_non_exhaustive()
    }
}

impl CycleTrace {
    /// Trace into a newly created file
    pub fn create(path: impl AsRef<Path>) -> SimulatorResult<Self> {
        let file = File::create(path)?;
        Self::from_writer(Box::new(file))
    }

    pub fn from_writer(sink: Box<dyn Write>) -> SimulatorResult<Self> {
        let mut writer = csv::Writer::from_writer(sink);
        writer.write_record(HEADER)?;
        Ok(Self { writer })
    }

    /// Append the state after a cycle commit.
    /// Bubbles are written as empty cells.
    pub fn record(
        &mut self,
        state: &CPUState,
        pipeline: &PipelineState,
        history: &CPUHistory,
    ) -> SimulatorResult<()> {
        let hex = |value: u32| format!("{:#010x}", value);
        let slot = |valid: bool, pc: u32, inst: u32| match valid {
            true => [hex(pc), hex(inst)],
            false => [String::new(), String::new()],
        };

        let [if_pc, if_inst] = slot(pipeline.if_id.valid, pipeline.if_id.pc, pipeline.if_id.raw_inst);
        let [id_pc, id_inst] = slot(pipeline.id_ex.valid, pipeline.id_ex.pc, pipeline.id_ex.raw_inst);
        let [ex_pc, ex_inst] = slot(pipeline.ex_mem.valid, pipeline.ex_mem.pc, pipeline.ex_mem.raw_inst);
        let [wb_pc, wb_inst] = slot(pipeline.mem_wb.valid, pipeline.mem_wb.pc, pipeline.mem_wb.raw_inst);

        self.writer.write_record([
            history.cycle_count.to_string(),
            hex(state.pc.read()),
            if_pc,
            if_inst,
            id_pc,
            id_inst,
            ex_pc,
            ex_inst,
            wb_pc,
            wb_inst,
            history.inst_count.to_string(),
            history.unimplemented_count.to_string(),
        ])?;
        Ok(())
    }

    pub fn flush(&mut self) -> SimulatorResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_follow_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace.csv");

        let mut trace = CycleTrace::create(&path).unwrap();
        let state = CPUState::make(0x0040_0004);
        let mut pipeline = PipelineState::default();
        pipeline.if_id.valid = true;
        pipeline.if_id.pc = 0x0040_0000;
        pipeline.if_id.raw_inst = 0x2401_0005;
        let history = CPUHistory { cycle_count: 1, ..Default::default() };
        trace.record(&state, &pipeline, &history).unwrap();
        trace.flush().unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.len(), HEADER.len());
        let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "1");
        assert_eq!(&rows[0][1], "0x00400004");
        assert_eq!(&rows[0][3], "0x24010005");
        assert_eq!(&rows[0][4], "");
    }
}
