/// The P/N/Z condition-flag register. Mutually exclusive by construction:
/// callers set all three together from a single result via `update`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    pub positive: bool,
    pub negative: bool,
    pub zero: bool,
}

impl Flags {
    /// Recomputes P/N/Z from a single signed result, as every flag-updating
    /// opcode does.
    pub fn update(&mut self, result: i32) {
        self.zero = result == 0;
        self.positive = result > 0;
        self.negative = result < 0;
    }
}
