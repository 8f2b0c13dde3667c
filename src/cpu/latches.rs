use crate::isa::Instruction;

/// The register between two pipeline stages: the in-flight instruction plus
/// whatever intermediates have been computed for it so far. A fresh cycle
/// propagates the producing stage's latch into the consumer's latch; a
/// flush clears `has_insn`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StageLatch {
    pub has_insn: bool,
    pub pc: i32,
    pub insn: Instruction,
    pub rs1_value: i32,
    pub rs2_value: i32,
    pub result_buffer: i32,
    pub memory_address: i32,
}

impl StageLatch {
    pub fn bubble() -> Self {
        StageLatch::default()
    }
}

/// The five-stage pipeline's latch state. Fetch's own "liveness" is tracked
/// separately (`fetch_active`) since it carries no computed intermediates of
/// its own — everything it produces is captured the moment it is copied into
/// `decode`.
#[derive(Debug, Clone, Default)]
pub struct Latches {
    pub fetch_active: bool,
    pub decode: StageLatch,
    pub execute: StageLatch,
    pub memory: StageLatch,
    pub writeback: StageLatch,
}
