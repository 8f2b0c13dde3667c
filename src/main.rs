use anyhow::{Context, Result};
use apex_pipe::{assemble, logging, trace, Cpu, SimError};
use clap::{Parser, Subcommand};
use std::ffi::OsString;

/// APEX 5-stage pipeline simulator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// assembly program file path
    program: String,

    #[command(subcommand)]
    mode: Option<Mode>,

    /// enable debug-level tracing
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// run up to N cycles non-interactively, no per-cycle prompt
    Simulate { n: u64 },
}

/// Parses CLI arguments, reporting a missing/malformed argument (including a
/// non-numeric cycle count for `simulate`) as `SimError::BadArgs` instead of
/// letting `clap` print its own message and exit directly — that way the CLI
/// boundary's one error type covers this path too, and it exits 1 like every
/// other `SimError` instead of clap's default exit code 2.
fn parse_args<I, T>(args: I) -> Result<Args, SimError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Args::try_parse_from(args).map_err(|e| SimError::BadArgs(e.to_string()))
}

fn main() -> Result<()> {
    let args = parse_args(std::env::args_os())?;
    logging::setup(args.verbose);

    let source = std::fs::read_to_string(&args.program)
        .with_context(|| format!("could not read file `{}`", &args.program))?;
    let program = assemble(&source).with_context(|| "failed to assemble program")?;
    let mut cpu = Cpu::new(program);

    match args.mode {
        Some(Mode::Simulate { n }) => {
            cpu.run(Some(n));
            trace::print_state(&cpu, false);
        }
        None => run_single_step(&mut cpu)?,
    }

    Ok(())
}

/// Interactive single-step mode: one cycle per keypress, `q` cancels.
fn run_single_step(cpu: &mut Cpu) -> Result<()> {
    use std::io::Read;

    loop {
        if cpu.halted {
            break;
        }
        trace::print_state(cpu, true);
        println!("press enter to step, or `q` + enter to quit");

        let mut input = [0u8; 1];
        std::io::stdin()
            .read_exact(&mut input)
            .context("failed to read keypress")?;
        if input[0] == b'q' {
            break;
        }
        cpu.step();
    }
    trace::print_state(cpu, true);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_program_argument_is_bad_args() {
        let err = parse_args(["apex-sim"]).unwrap_err();
        assert!(matches!(err, SimError::BadArgs(_)));
    }

    #[test]
    fn non_numeric_cycle_count_is_bad_args() {
        let err = parse_args(["apex-sim", "prog.asm", "simulate", "not-a-number"]).unwrap_err();
        assert!(matches!(err, SimError::BadArgs(_)));
    }

    #[test]
    fn valid_arguments_parse_successfully() {
        let args = parse_args(["apex-sim", "prog.asm"]).unwrap();
        assert_eq!(args.program, "prog.asm");
        assert!(args.mode.is_none());
    }
}
