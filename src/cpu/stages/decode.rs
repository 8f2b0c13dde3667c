use crate::cpu::latches::StageLatch;
use crate::cpu::Cpu;

/// Decode / register read: hazard check, operand read, destination
/// reservation, and branch prediction.
pub fn decode_stage(cpu: &mut Cpu) {
    let latch = cpu.latches.decode;
    cpu.stall = false;

    if !latch.has_insn {
        cpu.latches.execute = StageLatch::bubble();
        return;
    }

    let insn = latch.insn;

    // 1. Hazard check: any busy source register stalls Fetch and Decode.
    for src in insn.src_regs() {
        if cpu.scoreboard.is_busy(src) {
            cpu.stall = true;
            cpu.latches.execute = StageLatch::bubble();
            tracing::debug!(pc = latch.pc, insn = %insn, reg = src, "decode stall on busy register");
            return;
        }
    }

    // 2. Operand read.
    let rs1_value = cpu.regs.read(insn.rs1);
    let rs2_value = cpu.regs.read(insn.rs2);

    // 3. Destination reservation for producers that can't forward same-cycle.
    for reg in insn.decode_reservations() {
        cpu.scoreboard.reserve(reg);
    }

    // 4. Branch prediction for the four BTB-eligible conditional branches.
    if insn.opcode().predicts_via_btb() {
        let target = latch.pc.wrapping_add(insn.imm);
        cpu.btb.install(latch.pc, insn.opcode(), target);
        if cpu.btb.predict(latch.pc, insn.opcode()).is_taken() {
            cpu.pc = target;
            tracing::debug!(pc = latch.pc, target, "decode predicted taken, redirecting PC");
        }
    }

    cpu.latches.execute = StageLatch {
        has_insn: true,
        pc: latch.pc,
        insn,
        rs1_value,
        rs2_value,
        ..StageLatch::default()
    };
}
