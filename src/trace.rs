//! Human-facing per-cycle state dump, colorized the way this codebase's
//! interactive pipeline viewers render bubble/stall cycles vs. normal ones.
use ansi_term::Colour::{Green, Red};

use crate::cpu::Cpu;

/// Prints R0..R15, the P/N/Z flags, and every non-zero data memory cell,
/// followed by a colorized one-line summary of whether this cycle stalled.
pub fn print_state(cpu: &Cpu, colored: bool) {
    println!("--- cycle {} (retired {}) ---", cpu.cycle, cpu.retired);
    for (reg, value) in cpu.regs.iter() {
        print!("R{reg:<2}={value:<8}");
        if reg % 4 == 3 {
            println!();
        }
    }
    println!();
    println!(
        "flags: P={} N={} Z={}",
        cpu.flags.positive as u8, cpu.flags.negative as u8, cpu.flags.zero as u8
    );
    for (addr, value) in cpu.memory.nonzero() {
        println!("mem[{addr}] = {value}");
    }

    let label = if cpu.stall { "STALL" } else { "NORMAL" };
    if colored {
        let painted = if cpu.stall {
            Red.paint(label)
        } else {
            Green.paint(label)
        };
        println!("{painted}");
    } else {
        println!("{label}");
    }
}
