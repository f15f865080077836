use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// One row of a weighted tile table. When an entry with several indices is
/// selected, one of its indices is picked uniformly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedTile {
    pub indices: Vec<u16>,
    pub weight: f32,
}

impl WeightedTile {
    pub fn new(indices: impl Into<Vec<u16>>, weight: f32) -> Self {
        Self {
            indices: indices.into(),
            weight,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightedTiles {
    entries: Vec<WeightedTile>,
}

impl WeightedTiles {
    pub fn new(entries: Vec<WeightedTile>) -> Self {
        Self { entries }
    }

    /// Every index that `sample` can return.
    pub fn all_indices(&self) -> impl Iterator<Item = u16> + '_ {
        self.usable_entries()
            .flat_map(|entry| entry.indices.iter().copied())
    }

    /// Returns `None` when no entry has a positive weight and at least one index.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<u16> {
        let usable: Vec<&WeightedTile> = self.usable_entries().collect();
        let entry = usable.choose_weighted(rng, |entry| entry.weight).ok()?;
        entry.indices.choose(rng).copied()
    }

    fn usable_entries(&self) -> impl Iterator<Item = &WeightedTile> {
        self.entries
            .iter()
            .filter(|entry| entry.weight.is_finite() && entry.weight > 0.0)
            .filter(|entry| !entry.indices.is_empty())
    }
}
