//! Position Book
//!
//! Positions per instrument. Snapshots overwrite; fills are merged by the
//! broker through [`Position::update`].

use std::collections::BTreeMap;

use crate::domain::position::Position;
use crate::domain::shared::InstrumentId;

/// Positions keyed by instrument.
#[derive(Debug, Clone, Default)]
pub struct PositionBook {
    positions: BTreeMap<InstrumentId, Position>,
}

impl PositionBook {
    /// Empty book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Position for `instrument`, flat if unknown.
    #[must_use]
    pub fn get(&self, instrument: &InstrumentId) -> Position {
        self.positions.get(instrument).copied().unwrap_or_default()
    }

    /// Replace the position for `instrument`.
    pub fn overwrite(&mut self, instrument: InstrumentId, position: Position) {
        self.positions.insert(instrument, position);
    }

    /// Non-flat positions.
    pub fn open(&self) -> impl Iterator<Item = (&InstrumentId, &Position)> {
        self.positions.iter().filter(|(_, position)| !position.is_flat())
    }

    /// Number of tracked instruments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if nothing is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
