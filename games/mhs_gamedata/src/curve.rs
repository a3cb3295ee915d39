//! Bounded numeric curves indexed by integer position.
//!
//! Curves are authored tables (for example "damage by level") that game
//! formulas sample by index. A curve covers the closed index range
//! `[min_position, max_position]`.

use rustc_hash::FxHashMap;

use crate::CurveId;

/// A bounded, integer-indexed numeric curve.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Curve {
    min_position: i32,
    values: Vec<f32>,
}

impl Curve {
    /// Create a curve whose first value sits at `min_position`.
    ///
    /// Returns `None` for an empty value list, since an empty curve has
    /// no valid domain to clamp into.
    pub fn new(min_position: i32, values: Vec<f32>) -> Option<Self> {
        if values.is_empty() || i32::try_from(values.len()).is_err() {
            return None;
        }
        Some(Curve {
            min_position,
            values,
        })
    }

    /// Lowest valid index.
    #[inline]
    pub fn min_position(&self) -> i32 {
        self.min_position
    }

    /// Highest valid index.
    #[inline]
    pub fn max_position(&self) -> i32 {
        // Length fits in i32 (checked in `new`).
        let span = self.values.len() as i32 - 1;
        self.min_position.saturating_add(span)
    }

    /// Whether `index` falls inside `[min_position, max_position]`.
    #[inline]
    pub fn index_in_range(&self, index: i32) -> bool {
        index >= self.min_position() && index <= self.max_position()
    }

    /// Value at `index`, or `None` when the index is outside the domain.
    pub fn get_at(&self, index: i32) -> Option<f32> {
        if !self.index_in_range(index) {
            return None;
        }
        let offset = usize::try_from(i64::from(index) - i64::from(self.min_position)).ok()?;
        self.values.get(offset).copied()
    }
}

/// Registry of named curves, populated once when game data loads.
#[derive(Clone, Debug, Default)]
pub struct CurveTable {
    curves: FxHashMap<CurveId, NamedCurve>,
}

#[derive(Clone, Debug)]
struct NamedCurve {
    name: String,
    curve: Curve,
}

impl CurveTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a curve under `id`, replacing any previous entry.
    pub fn insert(&mut self, id: CurveId, name: impl Into<String>, curve: Curve) {
        self.curves.insert(
            id,
            NamedCurve {
                name: name.into(),
                curve,
            },
        );
    }

    /// Look up a curve.
    pub fn get(&self, id: CurveId) -> Option<&Curve> {
        self.curves.get(&id).map(|entry| &entry.curve)
    }

    /// Display name of a curve, for diagnostics.
    pub fn name(&self, id: CurveId) -> &str {
        self.curves
            .get(&id)
            .map_or("<unknown curve>", |entry| entry.name.as_str())
    }

    /// Number of registered curves.
    pub fn len(&self) -> usize {
        self.curves.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }
}
