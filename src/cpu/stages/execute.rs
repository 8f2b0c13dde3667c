use crate::cpu::latches::StageLatch;
use crate::cpu::Cpu;
use crate::isa::{Instruction, Opcode};

/// Execute: ALU computation, effective-address calculation, flag updates,
/// same-cycle commit for single-cycle producers, and all control-flow
/// resolution (branch prediction recovery, unconditional jumps).
pub fn execute_stage(cpu: &mut Cpu) {
    let latch = cpu.latches.execute;
    if !latch.has_insn {
        cpu.latches.memory = StageLatch::bubble();
        return;
    }

    let insn = latch.insn;
    let mut out = latch;

    match insn.opcode() {
        Opcode::Add => {
            out.result_buffer = latch.rs1_value.wrapping_add(latch.rs2_value);
            cpu.flags.update(out.result_buffer);
            cpu.commit_at_execute(insn.rd, out.result_buffer);
        }
        Opcode::Sub => {
            out.result_buffer = latch.rs1_value.wrapping_sub(latch.rs2_value);
            cpu.flags.update(out.result_buffer);
            cpu.commit_at_execute(insn.rd, out.result_buffer);
        }
        Opcode::Mul => {
            out.result_buffer = latch.rs1_value.wrapping_mul(latch.rs2_value);
            cpu.flags.update(out.result_buffer);
            cpu.commit_at_execute(insn.rd, out.result_buffer);
        }
        Opcode::And => {
            out.result_buffer = latch.rs1_value & latch.rs2_value;
            cpu.flags.update(out.result_buffer);
            cpu.commit_at_execute(insn.rd, out.result_buffer);
        }
        Opcode::Or => {
            out.result_buffer = latch.rs1_value | latch.rs2_value;
            cpu.flags.update(out.result_buffer);
            cpu.commit_at_execute(insn.rd, out.result_buffer);
        }
        Opcode::Xor => {
            out.result_buffer = latch.rs1_value ^ latch.rs2_value;
            cpu.flags.update(out.result_buffer);
            cpu.commit_at_execute(insn.rd, out.result_buffer);
        }
        Opcode::Addl => {
            out.result_buffer = latch.rs1_value.wrapping_add(insn.imm);
            cpu.flags.update(out.result_buffer);
            cpu.commit_at_execute(insn.rd, out.result_buffer);
        }
        Opcode::Subl => {
            out.result_buffer = latch.rs1_value.wrapping_sub(insn.imm);
            cpu.flags.update(out.result_buffer);
            cpu.commit_at_execute(insn.rd, out.result_buffer);
        }
        Opcode::Movc => {
            out.result_buffer = insn.imm;
            cpu.commit_at_execute(insn.rd, out.result_buffer);
        }
        Opcode::Cmp => {
            cpu.flags.update(latch.rs1_value.wrapping_sub(latch.rs2_value));
        }
        Opcode::Cml => {
            cpu.flags.update(latch.rs1_value.wrapping_sub(insn.imm));
        }
        Opcode::Load => {
            out.memory_address = latch.rs1_value.wrapping_add(insn.imm);
        }
        Opcode::Loadp => {
            out.memory_address = latch.rs1_value.wrapping_add(insn.imm);
            let incremented = latch.rs1_value.wrapping_add(4);
            cpu.commit_at_execute(insn.rs1, incremented);
        }
        Opcode::Store => {
            out.memory_address = latch.rs2_value.wrapping_add(insn.imm);
        }
        Opcode::Storep => {
            out.memory_address = latch.rs2_value.wrapping_add(insn.imm);
            let incremented = latch.rs2_value.wrapping_add(4);
            cpu.commit_at_execute(insn.rs2, incremented);
        }
        Opcode::Jump => {
            cpu.pc = latch.rs1_value.wrapping_add(insn.imm);
            cpu.flush();
        }
        Opcode::Jalr => {
            cpu.pc = latch.rs1_value.wrapping_add(insn.imm);
            cpu.flush();
        }
        Opcode::Bz | Opcode::Bnz | Opcode::Bp | Opcode::Bnp => {
            resolve_predicted_branch(cpu, &latch, insn);
        }
        Opcode::Bn | Opcode::Bnn => {
            let taken = match insn.opcode() {
                Opcode::Bn => cpu.flags.negative,
                Opcode::Bnn => !cpu.flags.negative,
                _ => unreachable!(),
            };
            if taken {
                cpu.pc = latch.pc.wrapping_add(insn.imm);
                cpu.flush();
            }
        }
        Opcode::Nop | Opcode::Halt => {}
    }

    cpu.latches.memory = out;
}

fn resolve_predicted_branch(cpu: &mut Cpu, latch: &StageLatch, insn: Instruction) {
    let actual = match insn.opcode() {
        Opcode::Bz => cpu.flags.zero,
        Opcode::Bnz => !cpu.flags.zero,
        Opcode::Bp => cpu.flags.positive,
        Opcode::Bnp => !cpu.flags.positive,
        _ => unreachable!("only the four BTB-predicted branches reach here"),
    };

    let predicted = cpu.btb.predict(latch.pc, insn.opcode()).is_taken();
    let target = latch.pc.wrapping_add(insn.imm);
    cpu.btb.update(latch.pc, insn.opcode(), actual, target);

    if predicted == actual {
        tracing::trace!(pc = latch.pc, "branch prediction correct, no recovery");
        return;
    }

    if predicted && !actual {
        cpu.pc = latch.pc.wrapping_add(4);
    } else {
        cpu.pc = target;
    }
    tracing::debug!(pc = latch.pc, new_pc = cpu.pc, "branch mis-predicted, recovering");
    cpu.flush();
}
