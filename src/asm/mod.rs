//! Assembly front-end: turns APEX assembly text into the linear instruction
//! vector the pipeline core consumes. One instruction per line, `#`-prefixed
//! comments, case-insensitive mnemonics. There is no symbol table: every
//! branch/jump target in the ISA (§6 of SPEC_FULL.md) is a register-relative
//! or PC-relative immediate, never a label.
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use crate::error::SimError;
use crate::isa::{Instruction, Opcode};

#[derive(Parser)]
#[grammar = "src/asm/grammar.pest"]
struct ApexAsmParser;

/// Parses `src` into the linear instruction list Fetch indexes.
pub fn assemble(src: &str) -> Result<Vec<Instruction>, SimError> {
    let mut pairs = ApexAsmParser::parse(Rule::main, src).map_err(|e| SimError::ProgramLoad {
        path: "<source>".to_string(),
        reason: e.to_string(),
    })?;
    let main = pairs.next().expect("main always produces one pair");

    let mut program = Vec::new();
    for line in main.into_inner() {
        if line.as_rule() != Rule::line {
            continue; // EOI
        }
        let Some(instr) = line.into_inner().next() else {
            continue; // blank or comment-only line
        };
        // `instr` wraps whichever `op_*` alternative actually matched; unwrap
        // one more level to get the pair `parse_instr` dispatches on.
        let op_pair = instr
            .into_inner()
            .next()
            .expect("instr always wraps exactly one op_* alternative");
        program.push(parse_instr(op_pair)?);
    }
    Ok(program)
}

fn reg_of(p: &Pair<'_, Rule>) -> u8 {
    p.as_str()[1..]
        .parse()
        .expect("grammar guarantees digits after R")
}

fn imm_of(p: &Pair<'_, Rule>) -> i32 {
    p.as_str()[1..]
        .parse()
        .expect("grammar guarantees a signed integer after #")
}

fn parse_instr(instr: Pair<'_, Rule>) -> Result<Instruction, SimError> {
    let rule = instr.as_rule();
    let mut fields = instr.into_inner();

    let insn = match rule {
        Rule::op3 => {
            let mnemonic = fields.next().expect("mnem3").as_str().to_ascii_uppercase();
            let opcode = match mnemonic.as_str() {
                "ADD" => Opcode::Add,
                "SUB" => Opcode::Sub,
                "MUL" => Opcode::Mul,
                "AND" => Opcode::And,
                "OR" => Opcode::Or,
                "XOR" => Opcode::Xor,
                _ => unreachable!("grammar only admits these mnemonics for op3"),
            };
            let rd = reg_of(&fields.next().expect("rd"));
            let rs1 = reg_of(&fields.next().expect("rs1"));
            let rs2 = reg_of(&fields.next().expect("rs2"));
            Instruction {
                opcode: crate::isa::OpcodeSlot(opcode),
                rd,
                rs1,
                rs2,
                imm: 0,
            }
        }
        Rule::op_imm2 => {
            let mnemonic = fields
                .next()
                .expect("mnem_imm2")
                .as_str()
                .to_ascii_uppercase();
            let opcode = match mnemonic.as_str() {
                "ADDL" => Opcode::Addl,
                "SUBL" => Opcode::Subl,
                _ => unreachable!("grammar only admits these mnemonics for op_imm2"),
            };
            let rd = reg_of(&fields.next().expect("rd"));
            let rs1 = reg_of(&fields.next().expect("rs1"));
            let imm = imm_of(&fields.next().expect("imm"));
            Instruction {
                opcode: crate::isa::OpcodeSlot(opcode),
                rd,
                rs1,
                rs2: 0,
                imm,
            }
        }
        Rule::op_movc => {
            let rd = reg_of(&fields.next().expect("rd"));
            let imm = imm_of(&fields.next().expect("imm"));
            let mut insn = Instruction::new(Opcode::Movc);
            insn.rd = rd;
            insn.imm = imm;
            insn
        }
        Rule::op_cmp => {
            let rs1 = reg_of(&fields.next().expect("rs1"));
            let rs2 = reg_of(&fields.next().expect("rs2"));
            let mut insn = Instruction::new(Opcode::Cmp);
            insn.rs1 = rs1;
            insn.rs2 = rs2;
            insn
        }
        Rule::op_cml => {
            let rs1 = reg_of(&fields.next().expect("rs1"));
            let imm = imm_of(&fields.next().expect("imm"));
            let mut insn = Instruction::new(Opcode::Cml);
            insn.rs1 = rs1;
            insn.imm = imm;
            insn
        }
        Rule::op_mem => {
            let mnemonic = fields
                .next()
                .expect("mnem_mem")
                .as_str()
                .to_ascii_uppercase();
            let opcode = match mnemonic.as_str() {
                "LOAD" => Opcode::Load,
                "LOADP" => Opcode::Loadp,
                "STORE" => Opcode::Store,
                "STOREP" => Opcode::Storep,
                _ => unreachable!("grammar only admits these mnemonics for op_mem"),
            };
            // LOAD/LOADP: Rd,Rs1,#imm ; STORE/STOREP: Rs1,Rs2,#imm.
            let a = reg_of(&fields.next().expect("first operand"));
            let b = reg_of(&fields.next().expect("second operand"));
            let imm = imm_of(&fields.next().expect("imm"));
            let mut insn = Instruction::new(opcode);
            match opcode {
                Opcode::Load | Opcode::Loadp => {
                    insn.rd = a;
                    insn.rs1 = b;
                }
                Opcode::Store | Opcode::Storep => {
                    insn.rs1 = a;
                    insn.rs2 = b;
                }
                _ => unreachable!(),
            }
            insn.imm = imm;
            insn
        }
        Rule::op_jump => {
            let rs1 = reg_of(&fields.next().expect("rs1"));
            let imm = imm_of(&fields.next().expect("imm"));
            let mut insn = Instruction::new(Opcode::Jump);
            insn.rs1 = rs1;
            insn.imm = imm;
            insn
        }
        Rule::op_jalr => {
            let rd = reg_of(&fields.next().expect("rd"));
            let rs1 = reg_of(&fields.next().expect("rs1"));
            let imm = imm_of(&fields.next().expect("imm"));
            let mut insn = Instruction::new(Opcode::Jalr);
            insn.rd = rd;
            insn.rs1 = rs1;
            insn.imm = imm;
            insn
        }
        Rule::op_branch => {
            let mnemonic = fields
                .next()
                .expect("mnem_branch")
                .as_str()
                .to_ascii_uppercase();
            let opcode = match mnemonic.as_str() {
                "BZ" => Opcode::Bz,
                "BNZ" => Opcode::Bnz,
                "BP" => Opcode::Bp,
                "BNP" => Opcode::Bnp,
                "BN" => Opcode::Bn,
                "BNN" => Opcode::Bnn,
                _ => unreachable!("grammar only admits these mnemonics for op_branch"),
            };
            let imm = imm_of(&fields.next().expect("imm"));
            let mut insn = Instruction::new(opcode);
            insn.imm = imm;
            insn
        }
        Rule::op_nop => Instruction::new(Opcode::Nop),
        Rule::op_halt => Instruction::new(Opcode::Halt),
        _ => unreachable!("grammar only ever hands parse_instr an op_* rule"),
    };
    Ok(insn)
}

#[cfg(test)]
pub mod tests {
    use super::*;

    /// The RAW-hazard fixture from the end-to-end scenarios: a load
    /// immediately consumed by a dependent add.
    pub const RAW_HAZARD: &str = r#"
# R1 <- mem[0], then R2 <- R1 + R1
LOAD R1,R0,#0
ADD R2,R1,R1
HALT
"#;

    #[test]
    fn assembles_three_register_form() {
        let program = assemble("ADD R3,R1,R2\nHALT\n").unwrap();
        assert_eq!(program.len(), 2);
        assert_eq!(program[0].opcode(), Opcode::Add);
        assert_eq!(program[0].rd, 3);
        assert_eq!(program[0].rs1, 1);
        assert_eq!(program[0].rs2, 2);
    }

    #[test]
    fn assembles_loadp_and_storep_not_load_and_store() {
        let program = assemble("LOADP R1,R2,#4\nSTOREP R1,R2,#4\n").unwrap();
        assert_eq!(program[0].opcode(), Opcode::Loadp);
        assert_eq!(program[1].opcode(), Opcode::Storep);
    }

    #[test]
    fn assembles_bnz_and_bnp_not_bn_and_bp() {
        let program = assemble("BNZ #8\nBNP #8\n").unwrap();
        assert_eq!(program[0].opcode(), Opcode::Bnz);
        assert_eq!(program[1].opcode(), Opcode::Bnp);
    }

    #[test]
    fn negative_immediate() {
        let program = assemble("MOVC R1,#-5\n").unwrap();
        assert_eq!(program[0].imm, -5);
    }

    #[test]
    fn ignores_comments_and_blank_lines() {
        let program = assemble("\n# a comment\nNOP\n\nHALT\n").unwrap();
        assert_eq!(program.len(), 2);
    }

    #[test]
    fn case_insensitive_mnemonics_and_registers() {
        let program = assemble("movc r1,#5\n").unwrap();
        assert_eq!(program[0].opcode(), Opcode::Movc);
        assert_eq!(program[0].rd, 1);
    }

    #[test]
    fn rejects_malformed_source() {
        assert!(assemble("ADD R1,R2\n").is_err());
    }

    #[test]
    fn assembles_raw_hazard_fixture() {
        let program = assemble(RAW_HAZARD).unwrap();
        assert_eq!(program.len(), 3);
        assert_eq!(program[0].opcode(), Opcode::Load);
        assert_eq!(program[1].opcode(), Opcode::Add);
        assert_eq!(program[2].opcode(), Opcode::Halt);
    }
}
