use serde::{Deserialize, Serialize};

/// A monotonically increasing counter, handing out genome IDs, innovation IDs, node IDs and
/// generation numbers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdSequence {
    head: usize,
}

impl IdSequence {
    pub fn new(head: usize) -> Self {
        Self { head }
    }

    /// Take the next id
    #[inline]
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> usize {
        let id = self.head;
        self.head += 1;
        id
    }

    /// The id that [IdSequence::next] would hand out, without taking it
    #[inline]
    pub fn peek(&self) -> usize {
        self.head
    }

    pub fn reset(&mut self, head: usize) {
        self.head = head;
    }
}
