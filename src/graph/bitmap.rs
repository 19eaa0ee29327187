/// A fixed-capacity set of node indices, packed 64 to a word. Capacity is always a power of two
/// and only ever grows, so a detector reusing one bitmap stops reallocating once it has seen its
/// largest graph.
#[derive(Debug, Clone)]
pub struct Bitmap {
    words: Vec<u64>,
}

impl Bitmap {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(64).next_power_of_two();
        Self {
            words: vec![0; capacity / 64],
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.words.len() * 64
    }

    /// Grow to hold at least `capacity` bits. Existing contents are discarded on growth.
    pub fn ensure_capacity(&mut self, capacity: usize) {
        if capacity > self.capacity() {
            *self = Self::new(capacity);
        }
    }

    #[inline]
    pub fn get(&self, idx: usize) -> bool {
        self.words[idx / 64] & (1 << (idx % 64)) != 0
    }

    #[inline]
    pub fn set(&mut self, idx: usize) {
        self.words[idx / 64] |= 1 << (idx % 64);
    }

    #[inline]
    pub fn unset(&mut self, idx: usize) {
        self.words[idx / 64] &= !(1 << (idx % 64));
    }

    pub fn clear(&mut self) {
        self.words.fill(0);
    }
}
