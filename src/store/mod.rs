//! Rating store
//!
//! Provides:
//! - `PointStore`: the in-memory (group, solution) → point mapping
//! - `SnapshotFile`: the flat-file snapshot it is loaded from and saved to

pub mod snapshot;

use std::collections::HashMap;

use crate::types::{GroupId, Point, Roster, SolutionId};

pub use snapshot::{SnapshotError, SnapshotFile, SNAPSHOT_HEADER};

/// Current ratings for every (group, solution) pair of a roster.
///
/// The store is total from the outside: pairs that were never written read as
/// [`Point::CENTER`]. Pairs are overwritten, never removed.
#[derive(Debug, Clone, PartialEq)]
pub struct PointStore {
    roster: Roster,
    points: HashMap<(GroupId, SolutionId), Point>,
}

impl PointStore {
    /// Create an empty store; every pair reads as the center point
    pub fn new(roster: Roster) -> Self {
        Self {
            roster,
            points: HashMap::new(),
        }
    }

    /// Create a store with every pair explicitly set to the center point
    pub fn with_defaults(roster: Roster) -> Self {
        let mut store = Self::new(roster);
        let keys: Vec<_> = store.keys().collect();
        for (group, solution) in keys {
            store.points.insert((group, solution), Point::CENTER);
        }
        store
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Stored point for a pair, or the center point if it was never set
    pub fn get(&self, group: &GroupId, solution: SolutionId) -> Point {
        self.points
            .get(&(group.clone(), solution))
            .copied()
            .unwrap_or(Point::CENTER)
    }

    /// Overwrite the point for a pair.
    ///
    /// No range check happens here: callers clamp input first (see
    /// [`Point::clamped`]).
    pub fn set(&mut self, group: &GroupId, solution: SolutionId, point: Point) {
        self.points.insert((group.clone(), solution), point);
    }

    /// True if the pair has been written (loaded or set) at least once
    pub fn is_rated(&self, group: &GroupId, solution: SolutionId) -> bool {
        self.points.contains_key(&(group.clone(), solution))
    }

    /// Every pair of the roster, grouped by group in configured order, then by
    /// ascending solution id
    pub fn all_pairs(&self) -> Vec<(GroupId, SolutionId, Point)> {
        self.keys()
            .map(|(group, solution)| {
                let point = self.get(&group, solution);
                (group, solution, point)
            })
            .collect()
    }

    /// One group's points for every solution, ascending
    pub fn group_points(&self, group: &GroupId) -> Vec<(SolutionId, Point)> {
        self.roster
            .solutions()
            .map(|solution| (solution, self.get(group, solution)))
            .collect()
    }

    fn keys(&self) -> impl Iterator<Item = (GroupId, SolutionId)> + '_ {
        self.roster.groups().iter().flat_map(move |group| {
            self.roster.solutions().map(move |solution| (group.clone(), solution))
        })
    }
}
