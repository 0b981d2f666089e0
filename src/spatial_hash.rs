//! Spatial Hash Grid (Broad Phase)
//!
//! A uniform grid over the plane. Every body is registered in each cell its
//! AABB overlaps; a reverse index (id -> occupied cells) makes removal
//! proportional to the body's own footprint instead of the whole grid.
//! Cells that empty out are pruned so a drifting world does not leak memory.
//!
//! Candidate pairs come from cell cohabitation and are a *superset* of the
//! true overlaps — callers run the narrow phase to confirm. Pairs are
//! deduplicated by their Cantor key and returned sorted by it, so downstream
//! iteration order is stable within a step.
//!
//! Author: Moroya Sakamoto

use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;

use crate::aabb::Aabb;
use crate::body::{Body, BodyId};
use crate::filter::{can_detect_collision, pair_key};

/// Grid cell coordinate.
type Cell = (i32, i32);

/// Cells a single body typically covers; spills to the heap beyond this.
type CellList = SmallVec<[Cell; 8]>;

// ============================================================================
// SpatialHash
// ============================================================================

/// Uniform-grid broad phase with a reverse index for O(|cells|) removal.
#[derive(Debug)]
pub struct SpatialHash {
    cell_size: f64,
    cells: HashMap<Cell, Vec<BodyId>>,
    /// Reverse index: which cells each body currently occupies. Matches
    /// `cells` exactly at all times.
    occupancy: HashMap<BodyId, CellList>,
}

impl SpatialHash {
    /// Create a grid with the given cell side length.
    #[must_use]
    pub fn new(cell_size: f64) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
            occupancy: HashMap::new(),
        }
    }

    /// Cell side length.
    #[inline]
    #[must_use]
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Register a body in every cell its AABB overlaps. A body that is
    /// already present is re-inserted (same as [`SpatialHash::update`]).
    pub fn insert(&mut self, body: &Body) {
        let id = body.id();
        if self.occupancy.contains_key(&id) {
            self.remove_id(id);
        }

        let mut occupied = CellList::new();
        for cell in self.cells_for(&body.aabb()) {
            self.cells.entry(cell).or_default().push(id);
            occupied.push(cell);
        }
        self.occupancy.insert(id, occupied);
    }

    /// Remove a body from the grid. Unknown ids are ignored.
    pub fn remove(&mut self, body: &Body) {
        self.remove_id(body.id());
    }

    /// Remove by id, pruning cells that become empty.
    pub fn remove_id(&mut self, id: BodyId) {
        let Some(occupied) = self.occupancy.remove(&id) else {
            return;
        };
        for cell in occupied {
            if let Some(ids) = self.cells.get_mut(&cell) {
                ids.retain(|&other| other != id);
                if ids.is_empty() {
                    self.cells.remove(&cell);
                }
            }
        }
    }

    /// Re-register a body after it moved.
    #[inline]
    pub fn update(&mut self, body: &Body) {
        self.insert(body);
    }

    /// Drop every body and cell.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.occupancy.clear();
    }

    /// All bodies whose cells overlap the region. A superset of the bodies
    /// actually intersecting it — callers filter with exact shape tests.
    #[must_use]
    pub fn query_region(&self, region: &Aabb) -> HashSet<BodyId> {
        let mut out = HashSet::new();
        for cell in self.cells_for(region) {
            if let Some(ids) = self.cells.get(&cell) {
                out.extend(ids.iter().copied());
            }
        }
        out
    }

    /// Candidate collision pairs: bodies sharing at least one cell, passing
    /// the bilateral detection filter, with static-static pairs dropped.
    /// Unique by Cantor key, smaller id first, sorted by key.
    #[must_use]
    pub fn pairs(&self, bodies: &HashMap<BodyId, Body>) -> Vec<(BodyId, BodyId)> {
        let mut seen: HashSet<u128> = HashSet::new();
        let mut out: Vec<(u128, (BodyId, BodyId))> = Vec::new();

        for ids in self.cells.values() {
            for (i, &first) in ids.iter().enumerate() {
                for &second in &ids[i + 1..] {
                    let key = pair_key(first, second);
                    if !seen.insert(key) {
                        continue;
                    }
                    let (id_a, id_b) = (first.min(second), first.max(second));
                    let (Some(a), Some(b)) = (bodies.get(&id_a), bodies.get(&id_b)) else {
                        continue;
                    };
                    if a.is_static() && b.is_static() {
                        continue;
                    }
                    if !can_detect_collision(a, b) {
                        continue;
                    }
                    out.push((key, (id_a, id_b)));
                }
            }
        }

        out.sort_unstable_by_key(|(key, _)| *key);
        out.into_iter().map(|(_, pair)| pair).collect()
    }

    /// Cells overlapped by an AABB, in row-major order.
    fn cells_for(&self, aabb: &Aabb) -> impl Iterator<Item = Cell> {
        let min_x = cell_coord(aabb.min.x, self.cell_size);
        let max_x = cell_coord(aabb.max.x, self.cell_size);
        let min_y = cell_coord(aabb.min.y, self.cell_size);
        let max_y = cell_coord(aabb.max.y, self.cell_size);
        (min_y..=max_y).flat_map(move |y| (min_x..=max_x).map(move |x| (x, y)))
    }

    /// Number of non-empty cells (grid health, used by tests and benches).
    #[inline]
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    #[cfg(test)]
    fn assert_consistent(&self) {
        for (cell, ids) in &self.cells {
            assert!(!ids.is_empty(), "empty cell {cell:?} not pruned");
            for id in ids {
                assert!(
                    self.occupancy[id].contains(cell),
                    "grid entry missing from reverse index"
                );
            }
        }
        for (id, occupied) in &self.occupancy {
            for cell in occupied {
                assert!(
                    self.cells[cell].contains(id),
                    "reverse index entry missing from grid"
                );
            }
        }
    }
}

#[inline]
fn cell_coord(v: f64, cell_size: f64) -> i32 {
    (v / cell_size).floor() as i32
}

// ============================================================================
// Tests
// ============================================================================
