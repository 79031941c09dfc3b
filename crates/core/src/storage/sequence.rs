//! Monotonic ID sequences

/// Hands out strictly increasing IDs starting at 1
///
/// Each store owns its own sequences, so independent stores never
/// collide and deleted IDs are never handed out again.
#[derive(Debug, Clone)]
pub struct IdSequence {
    next: u64,
}

impl IdSequence {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Resume after IDs that are already in use
    pub fn starting_after(last: u64) -> Self {
        Self { next: last + 1 }
    }

    /// Take the next ID
    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }
}

impl Default for IdSequence {
    fn default() -> Self {
        Self::new()
    }
}
