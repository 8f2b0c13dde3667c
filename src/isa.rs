//! Instruction set definition for the APEX architecture.

/// Number of general-purpose registers.
pub const NUM_REGS: usize = 16;

/// Every opcode the pipeline understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::upper_case_acronyms)]
pub enum Opcode {
    Add,
    Sub,
    Mul,
    And,
    Or,
    Xor,
    Addl,
    Subl,
    Movc,
    Cmp,
    Cml,
    Load,
    Loadp,
    Store,
    Storep,
    Jump,
    Jalr,
    Bz,
    Bnz,
    Bp,
    Bnp,
    Bn,
    Bnn,
    Nop,
    Halt,
}

impl Opcode {
    pub fn mnemonic(self) -> &'static str {
        use Opcode::*;
        match self {
            Add => "ADD",
            Sub => "SUB",
            Mul => "MUL",
            And => "AND",
            Or => "OR",
            Xor => "XOR",
            Addl => "ADDL",
            Subl => "SUBL",
            Movc => "MOVC",
            Cmp => "CMP",
            Cml => "CML",
            Load => "LOAD",
            Loadp => "LOADP",
            Store => "STORE",
            Storep => "STOREP",
            Jump => "JUMP",
            Jalr => "JALR",
            Bz => "BZ",
            Bnz => "BNZ",
            Bp => "BP",
            Bnp => "BNP",
            Bn => "BN",
            Bnn => "BNN",
            Nop => "NOP",
            Halt => "HALT",
        }
    }

    /// Is this opcode one of the four BTB-predicted conditional branches?
    pub fn predicts_via_btb(self) -> bool {
        matches!(self, Opcode::Bz | Opcode::Bnz | Opcode::Bp | Opcode::Bnp)
    }

    /// Is this opcode any conditional branch (predicted or not)?
    pub fn is_conditional_branch(self) -> bool {
        matches!(
            self,
            Opcode::Bz | Opcode::Bnz | Opcode::Bp | Opcode::Bnp | Opcode::Bn | Opcode::Bnn
        )
    }

    /// Taken-biased (seeded history "11") vs not-taken-biased (seeded "00").
    /// Only meaningful for BTB-predicted opcodes.
    pub fn taken_biased(self) -> bool {
        matches!(self, Opcode::Bnz | Opcode::Bp)
    }
}

/// A single static (decoded) instruction. Unused fields for a given opcode
/// are left zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Instruction {
    pub opcode: OpcodeSlot,
    pub rd: u8,
    pub rs1: u8,
    pub rs2: u8,
    pub imm: i32,
}

/// `Opcode` wrapped so `Instruction` can `#[derive(Default)]` (NOP).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeSlot(pub Opcode);

impl Default for OpcodeSlot {
    fn default() -> Self {
        OpcodeSlot(Opcode::Nop)
    }
}

impl Instruction {
    pub fn opcode(&self) -> Opcode {
        self.opcode.0
    }

    pub fn new(opcode: Opcode) -> Self {
        Instruction {
            opcode: OpcodeSlot(opcode),
            rd: 0,
            rs1: 0,
            rs2: 0,
            imm: 0,
        }
    }

    /// Source registers this instruction reads, in the order the scoreboard
    /// hazard check should test them.
    pub fn src_regs(&self) -> Vec<u8> {
        use Opcode::*;
        match self.opcode() {
            Add | Sub | Mul | And | Or | Xor => vec![self.rs1, self.rs2],
            Addl | Subl => vec![self.rs1],
            Cmp => vec![self.rs1, self.rs2],
            Cml => vec![self.rs1],
            Load | Loadp => vec![self.rs1],
            Store | Storep => vec![self.rs1, self.rs2],
            Jump | Jalr => vec![self.rs1],
            Movc | Bz | Bnz | Bp | Bnp | Bn | Bnn | Nop | Halt => vec![],
        }
    }

    /// The architectural destination register of this instruction, regardless
    /// of which pipeline stage ultimately commits it.
    pub fn dest_reg(&self) -> Option<u8> {
        use Opcode::*;
        match self.opcode() {
            Add | Sub | Mul | And | Or | Xor | Addl | Subl | Movc | Load | Loadp | Jalr => {
                Some(self.rd)
            }
            _ => None,
        }
    }

    /// Registers that Decode must reserve as BUSY because their producer
    /// cannot forward the write in the same cycle it is computed.
    pub fn decode_reservations(&self) -> Vec<u8> {
        use Opcode::*;
        match self.opcode() {
            Load | Jalr => vec![self.rd],
            Loadp => vec![self.rd, self.rs1],
            Storep => vec![self.rs2],
            _ => vec![],
        }
    }
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Opcode::*;
        match self.opcode() {
            Add | Sub | Mul | And | Or | Xor => {
                write!(
                    f,
                    "{} R{},R{},R{}",
                    self.opcode().mnemonic(),
                    self.rd,
                    self.rs1,
                    self.rs2
                )
            }
            Addl | Subl => write!(
                f,
                "{} R{},R{},#{}",
                self.opcode().mnemonic(),
                self.rd,
                self.rs1,
                self.imm
            ),
            Movc => write!(f, "MOVC R{},#{}", self.rd, self.imm),
            Cmp => write!(f, "CMP R{},R{}", self.rs1, self.rs2),
            Cml => write!(f, "CML R{},#{}", self.rs1, self.imm),
            Load => write!(f, "LOAD R{},R{},#{}", self.rd, self.rs1, self.imm),
            Loadp => write!(f, "LOADP R{},R{},#{}", self.rd, self.rs1, self.imm),
            Store => write!(f, "STORE R{},R{},#{}", self.rs1, self.rs2, self.imm),
            Storep => write!(f, "STOREP R{},R{},#{}", self.rs1, self.rs2, self.imm),
            Jump => write!(f, "JUMP R{},#{}", self.rs1, self.imm),
            Jalr => write!(f, "JALR R{},R{},#{}", self.rd, self.rs1, self.imm),
            Bz | Bnz | Bp | Bnp | Bn | Bnn => {
                write!(f, "{} #{}", self.opcode().mnemonic(), self.imm)
            }
            Nop => write!(f, "NOP"),
            Halt => write!(f, "HALT"),
        }
    }
}
