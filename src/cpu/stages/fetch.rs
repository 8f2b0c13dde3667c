use crate::cpu::latches::StageLatch;
use crate::cpu::memory::CODE_BASE;
use crate::cpu::Cpu;
use crate::isa::Opcode;

/// Fetch: copies the instruction at `PC` into the Decode latch and advances
/// `PC`, unless suppressed by a stall or a post-misprediction bubble.
pub fn fetch_stage(cpu: &mut Cpu) {
    if cpu.fetch_from_next_cycle {
        cpu.fetch_from_next_cycle = false;
        cpu.latches.decode = StageLatch::bubble();
        tracing::trace!(pc = cpu.pc, "fetch bubble after mis-speculation");
        return;
    }

    if !cpu.latches.fetch_active {
        cpu.latches.decode = StageLatch::bubble();
        return;
    }

    let pc = cpu.pc;
    let index = ((pc - CODE_BASE) / 4) as usize;
    assert!(
        index < cpu.program.len(),
        "fetch ran past the end of the program at pc={pc} (missing HALT?)"
    );
    let insn = cpu.program[index];

    if cpu.stall {
        tracing::trace!(pc, insn = %insn, "fetch re-presenting stalled instruction");
    } else {
        cpu.pc += 4;
    }

    cpu.latches.decode = StageLatch {
        has_insn: true,
        pc,
        insn,
        ..StageLatch::default()
    };

    if insn.opcode() == Opcode::Halt {
        cpu.latches.fetch_active = false;
    }
}
