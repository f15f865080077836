use serde::{Deserialize, Serialize};

/// A rectangular stamp of tile indices, written row-major from its top-left anchor.
///
/// Serialized either as a single row (`[40, 6, 38]`) or as rows
/// (`[[40], [6], [38]]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PatternRepr", into = "PatternRepr")]
pub struct TilePattern {
    rows: Vec<Vec<u16>>,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PatternRepr {
    Rows(Vec<Vec<u16>>),
    Row(Vec<u16>),
}

impl From<PatternRepr> for TilePattern {
    fn from(repr: PatternRepr) -> Self {
        match repr {
            PatternRepr::Rows(rows) => Self::from_rows(rows),
            PatternRepr::Row(row) => Self::row(row),
        }
    }
}

impl From<TilePattern> for PatternRepr {
    fn from(pattern: TilePattern) -> Self {
        if pattern.rows.len() == 1 {
            PatternRepr::Row(pattern.rows.into_iter().next().unwrap_or_default())
        } else {
            PatternRepr::Rows(pattern.rows)
        }
    }
}

impl TilePattern {
    pub fn from_rows(rows: Vec<Vec<u16>>) -> Self {
        Self { rows }
    }

    /// A horizontal stamp.
    pub fn row(tiles: impl Into<Vec<u16>>) -> Self {
        Self {
            rows: vec![tiles.into()],
        }
    }

    /// A vertical stamp.
    pub fn column(tiles: impl IntoIterator<Item = u16>) -> Self {
        Self {
            rows: tiles.into_iter().map(|tile| vec![tile]).collect(),
        }
    }

    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn tile_at(&self, dx: usize, dy: usize) -> Option<u16> {
        self.rows.get(dy).and_then(|row| row.get(dx)).copied()
    }

    /// `(dx, dy, tile)` for every cell, relative to the anchor.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32, u16)> + '_ {
        self.rows.iter().enumerate().flat_map(|(dy, row)| {
            row.iter()
                .enumerate()
                .map(move |(dx, tile)| (dx as i32, dy as i32, *tile))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_and_column_shapes() {
        let row = TilePattern::row([40, 6, 38]);
        assert_eq!((row.width(), row.height()), (3, 1));
        assert_eq!(row.tile_at(1, 0), Some(6));

        let column = TilePattern::column([40, 6, 38]);
        assert_eq!((column.width(), column.height()), (1, 3));
        assert_eq!(column.tile_at(0, 2), Some(38));
    }

    #[test]
    fn json_accepts_flat_row_or_nested_rows() {
        let row: TilePattern = serde_json::from_str("[40, 6, 38]").expect("row");
        assert_eq!(row, TilePattern::row([40, 6, 38]));

        let column: TilePattern = serde_json::from_str("[[186], [205]]").expect("column");
        assert_eq!(column, TilePattern::column([186, 205]));
    }

    #[test]
    fn cells_are_row_major_offsets() {
        let pattern = TilePattern::from_rows(vec![vec![1, 2], vec![3]]);
        let cells: Vec<_> = pattern.cells().collect();
        assert_eq!(cells, vec![(0, 0, 1), (1, 0, 2), (0, 1, 3)]);
    }
}
