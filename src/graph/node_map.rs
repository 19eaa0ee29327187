use fxhash::FxHashMap;

/// Maps a genome's node IDs onto dense node indices.
///
/// Input and output IDs are contiguous from zero and map onto themselves, so only hidden IDs,
/// which are sparse and historically assigned, need a lookup table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeIdMap {
    fixed: usize,
    hidden: FxHashMap<usize, usize>,
}

impl NodeIdMap {
    /// A map for `fixed` input+output nodes, followed by `hidden` IDs in the order given
    pub fn new(fixed: usize, hidden: &[usize]) -> Self {
        Self {
            fixed,
            hidden: hidden
                .iter()
                .enumerate()
                .map(|(offset, &id)| (id, fixed + offset))
                .collect(),
        }
    }

    /// Node index of `id`, or None if this map doesn't know about it
    #[inline]
    pub fn map(&self, id: usize) -> Option<usize> {
        if id < self.fixed {
            Some(id)
        } else {
            self.hidden.get(&id).copied()
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fixed + self.hidden.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The index to ID mapping, `inverse()[idx] == id`
    pub fn inverse(&self) -> Vec<usize> {
        let mut ids = (0..self.len()).collect::<Vec<_>>();
        for (&id, &idx) in &self.hidden {
            ids[idx] = id;
        }
        ids
    }
}
