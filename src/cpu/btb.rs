use crate::isa::Opcode;

/// Capacity of the branch target buffer.
pub const BTB_CAPACITY: usize = 4;

/// One cached branch: its last resolved target, a 2-bit taken/not-taken
/// history, and a confidence counter gating how much the history is trusted.
#[derive(Debug, Clone, Copy)]
pub struct BtbEntry {
    pub address: i32,
    /// `history[0]` is the most recent resolved outcome, `history[1]` the
    /// one before it.
    pub history: [bool; 2],
    pub target_address: i32,
    pub count: u32,
}

/// The outcome of a prediction query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prediction {
    Taken,
    NotTaken,
    NotInTable,
}

impl Prediction {
    pub fn is_taken(self) -> bool {
        matches!(self, Prediction::Taken)
    }
}

/// Fixed-capacity, FIFO-replaced branch target buffer.
#[derive(Debug, Clone)]
pub struct Btb {
    entries: [Option<BtbEntry>; BTB_CAPACITY],
    size: usize,
    oldest_index: usize,
}

impl Default for Btb {
    fn default() -> Self {
        Btb {
            entries: [None; BTB_CAPACITY],
            size: 0,
            oldest_index: 0,
        }
    }
}

impl Btb {
    fn find_index(&self, pc: i32) -> Option<usize> {
        self.entries[..self.size]
            .iter()
            .position(|e| e.map(|e| e.address) == Some(pc))
    }

    fn seed_history(opcode: Opcode) -> [bool; 2] {
        if opcode.taken_biased() {
            [true, true]
        } else {
            [false, false]
        }
    }

    /// Installs a fresh entry for `pc` if one does not already exist. A
    /// no-op when the PC is already tracked.
    pub fn install(&mut self, pc: i32, opcode: Opcode, target_address: i32) {
        if self.find_index(pc).is_some() {
            return;
        }
        let entry = BtbEntry {
            address: pc,
            history: Self::seed_history(opcode),
            target_address,
            count: 0,
        };
        if self.size < BTB_CAPACITY {
            self.entries[self.size] = Some(entry);
            self.size += 1;
        } else {
            self.entries[self.oldest_index] = Some(entry);
            self.oldest_index = (self.oldest_index + 1) % BTB_CAPACITY;
        }
    }

    /// Queries the prediction for `pc`, given the branch opcode's polarity.
    pub fn predict(&self, pc: i32, opcode: Opcode) -> Prediction {
        match self.find_index(pc) {
            None => Prediction::NotInTable,
            Some(i) => {
                let entry = self.entries[i].expect("index from find_index is populated");
                if entry.count < 1 {
                    return Prediction::NotTaken;
                }
                let taken = if opcode.taken_biased() {
                    entry.history[0] || entry.history[1]
                } else {
                    entry.history[0] && entry.history[1]
                };
                if taken {
                    Prediction::Taken
                } else {
                    Prediction::NotTaken
                }
            }
        }
    }

    /// Records a resolved outcome at Execute. If no entry exists yet
    /// (should not happen in practice since Decode always installs first),
    /// defensively installs one and then applies the update.
    pub fn update(&mut self, pc: i32, opcode: Opcode, outcome: bool, target_address: i32) {
        match self.find_index(pc) {
            Some(i) => {
                let entry = self.entries[i]
                    .as_mut()
                    .expect("index from find_index is populated");
                entry.history[1] = entry.history[0];
                entry.history[0] = outcome;
                entry.target_address = target_address;
                entry.count += 1;
            }
            None => {
                self.install(pc, opcode, target_address);
                self.update(pc, opcode, outcome, target_address);
            }
        }
    }

    /// The cached entry for `pc`, if any. Exposed for tracing/debugging and
    /// for tests that assert on prediction-history evolution directly.
    pub fn entry_for(&self, pc: i32) -> Option<BtbEntry> {
        self.find_index(pc).map(|i| self.entries[i].unwrap())
    }
}
