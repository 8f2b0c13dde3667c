//! The CPU object: owns all architectural and micro-architectural state and
//! drives the cycle loop. Modeled as a single mutable `CpuState`-style
//! struct passed to each stage function, rather than pointer-chasing
//! between stage objects (SPEC_FULL.md §9).
pub mod btb;
pub mod flags;
pub mod latches;
pub mod memory;
pub mod registers;
pub mod scoreboard;
pub mod stages;

use btb::Btb;
use flags::Flags;
use latches::Latches;
use memory::{DataMemory, CODE_BASE};
use registers::RegisterFile;
use scoreboard::Scoreboard;

use crate::isa::Instruction;

/// The full simulator state: architectural registers/flags/memory, the
/// scoreboard, the BTB, and the five pipeline latches.
#[derive(Debug, Clone)]
pub struct Cpu {
    pub regs: RegisterFile,
    pub scoreboard: Scoreboard,
    pub flags: Flags,
    pub memory: DataMemory,
    pub btb: Btb,
    pub latches: Latches,
    pub pc: i32,
    pub stall: bool,
    pub fetch_from_next_cycle: bool,
    pub program: Vec<Instruction>,
    pub cycle: u64,
    pub retired: u64,
    pub halted: bool,
}

impl Cpu {
    pub fn new(program: Vec<Instruction>) -> Self {
        Cpu {
            regs: RegisterFile::default(),
            scoreboard: Scoreboard::default(),
            flags: Flags::default(),
            memory: DataMemory::default(),
            btb: Btb::default(),
            latches: Latches {
                fetch_active: true,
                ..Latches::default()
            },
            pc: CODE_BASE,
            stall: false,
            fetch_from_next_cycle: false,
            program,
            cycle: 0,
            retired: 0,
            halted: false,
        }
    }

    /// Advances the simulator by one cycle, running the five stages in
    /// reverse order (Writeback, Memory, Execute, Decode, Fetch). Returns
    /// `true` iff HALT retired this cycle.
    pub fn step(&mut self) -> bool {
        if self.halted {
            return true;
        }
        self.cycle += 1;
        let halted = stages::writeback::writeback_stage(self);
        stages::memory::memory_stage(self);
        stages::execute::execute_stage(self);
        stages::decode::decode_stage(self);
        stages::fetch::fetch_stage(self);
        if halted {
            self.halted = true;
        }
        halted
    }

    /// Runs until HALT retires or, if `cycle_budget` is set, until that many
    /// cycles have elapsed, whichever comes first.
    pub fn run(&mut self, cycle_budget: Option<u64>) {
        loop {
            if self.halted {
                break;
            }
            if let Some(budget) = cycle_budget {
                if self.cycle >= budget {
                    break;
                }
            }
            self.step();
        }
    }

    /// Commits `value` to `reg` and frees its scoreboard slot in the same
    /// call — the pattern every single-cycle Execute-stage producer uses.
    pub(crate) fn commit_at_execute(&mut self, reg: u8, value: i32) {
        self.regs.write(reg, value);
        self.scoreboard.free(reg);
    }

    /// Clears the Decode latch, arms a one-cycle fetch bubble, and leaves
    /// Fetch active so it picks up from the freshly-redirected `pc`.
    ///
    /// Also re-arms `fetch_active`: a speculatively-fetched `HALT` on the
    /// squashed path may have already cleared it, but that path is being
    /// discarded, so Fetch must keep running on the redirected one. A real
    /// (non-speculative) `HALT` never reaches here, since it halts the CPU
    /// at Writeback before any later instruction could trigger a flush.
    pub(crate) fn flush(&mut self) {
        self.latches.decode = latches::StageLatch::bubble();
        self.fetch_from_next_cycle = true;
        self.latches.fetch_active = true;
    }
}
