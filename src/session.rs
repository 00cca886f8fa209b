//! Rating session
//!
//! Owns the store and its snapshot file for one process. Every mutation goes
//! through here so it is validated, clamped and written to disk before the next
//! read is served. A mutation whose save fails is rolled back in memory.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use tracing::{debug, error, info};

use crate::aggregate::{self, SummaryRow};
use crate::config::Config;
use crate::store::{PointStore, SnapshotFile};
use crate::types::{GroupId, LookupError, Point, Roster, SolutionId};

pub struct Session {
    store: PointStore,
    snapshot: SnapshotFile,
}

impl Session {
    /// Open the session described by a configuration
    pub fn open(config: &Config) -> Result<Self> {
        Self::from_parts(config.roster(), SnapshotFile::new(config.data_file.clone()))
    }

    /// Open a session over an explicit roster and snapshot file
    pub fn from_parts(roster: Roster, snapshot: SnapshotFile) -> Result<Self> {
        let store = snapshot.load(&roster)?;
        info!(
            "Session ready: {} groups x {} solutions from {}",
            roster.groups().len(),
            roster.num_solutions(),
            snapshot.path().display()
        );
        Ok(Self { store, snapshot })
    }

    pub fn store(&self) -> &PointStore {
        &self.store
    }

    pub fn roster(&self) -> &Roster {
        self.store.roster()
    }

    pub fn snapshot(&self) -> &SnapshotFile {
        &self.snapshot
    }

    /// Current point for a configured pair
    pub fn get(&self, group: &GroupId, solution: SolutionId) -> Result<Point, LookupError> {
        self.roster().check(group, solution)?;
        Ok(self.store.get(group, solution))
    }

    /// Clamp, store and persist one rating; returns what was stored
    pub fn update(&mut self, group: &GroupId, solution: SolutionId, point: Point) -> Result<Point> {
        self.roster().check(group, solution)?;
        let point = point.clamped()?;
        let previous = self.store.get(group, solution);
        self.store.set(group, solution, point);
        if let Err(e) = self.persist() {
            self.store.set(group, solution, previous);
            return Err(e);
        }
        debug!("{} / {} -> ({}, {})", group, solution, point.complexity, point.value);
        Ok(point)
    }

    /// Apply a whole column of slider values for one group, then persist once
    pub fn update_group(&mut self, group: &GroupId, points: &[(SolutionId, Point)]) -> Result<()> {
        let mut clamped = Vec::with_capacity(points.len());
        for (solution, point) in points {
            self.roster().check(group, *solution)?;
            clamped.push((*solution, point.clamped()?));
        }
        let previous: Vec<(SolutionId, Point)> = clamped
            .iter()
            .map(|(solution, _)| (*solution, self.store.get(group, *solution)))
            .collect();
        for (solution, point) in clamped {
            self.store.set(group, solution, point);
        }
        if let Err(e) = self.persist() {
            for (solution, point) in previous {
                self.store.set(group, solution, point);
            }
            return Err(e);
        }
        debug!("{}: {} ratings updated", group, points.len());
        Ok(())
    }

    /// Resolve a multi-select of group names
    pub fn view_groups<'a, I>(&self, names: I) -> Result<Vec<GroupId>, LookupError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.roster().select(names)
    }

    pub fn average(&self, groups: &[GroupId]) -> BTreeMap<SolutionId, Point> {
        aggregate::average(&self.store, groups)
    }

    pub fn summary(&self) -> Vec<SummaryRow> {
        aggregate::summary_table(&self.store)
    }

    fn persist(&self) -> Result<()> {
        self.snapshot.save(&self.store).map_err(|e| {
            error!("Failed to persist ratings: {:#}", e);
            e
        })
        .context("Ratings could not be saved, change discarded")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_clamps_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ratings.csv");
        let mut session = Session::from_parts(Roster::default(), SnapshotFile::new(&path)).unwrap();

        let group = GroupId::from("Group 1");
        let stored = session.update(&group, SolutionId::new(3), Point::new(11.0, 2.04)).unwrap();
        assert_eq!(stored, Point::new(10.0, 2.0));

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("Group 1,3,10.0,2.0\n"));
    }

    #[test]
    fn test_update_rejects_unknown_ids() {
        let dir = tempfile::tempdir().unwrap();
        let mut session =
            Session::from_parts(Roster::default(), SnapshotFile::new(dir.path().join("r.csv"))).unwrap();

        let err = session
            .update(&GroupId::from("Group 7"), SolutionId::new(1), Point::CENTER)
            .unwrap_err();
        assert!(err.downcast_ref::<LookupError>().is_some());

        let err = session
            .update(&GroupId::from("Group 1"), SolutionId::new(99), Point::CENTER)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LookupError>(),
            Some(LookupError::SolutionOutOfRange { solution: 99, max: 16 })
        ));
    }

    /// Turn the snapshot path into a directory so every save fails
    fn break_snapshot(path: &std::path::Path) {
        std::fs::remove_file(path).unwrap();
        std::fs::create_dir(path).unwrap();
    }

    #[test]
    fn test_failed_save_keeps_previous_point() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ratings.csv");
        let mut session = Session::from_parts(Roster::default(), SnapshotFile::new(&path)).unwrap();
        let group = GroupId::from("Group 1");
        session.update(&group, SolutionId::new(2), Point::new(3.0, 3.0)).unwrap();

        break_snapshot(&path);
        assert!(session.update(&group, SolutionId::new(1), Point::new(1.0, 9.0)).is_err());
        assert!(session.update(&group, SolutionId::new(2), Point::new(8.0, 8.0)).is_err());

        assert_eq!(session.get(&group, SolutionId::new(1)).unwrap(), Point::CENTER);
        assert_eq!(session.get(&group, SolutionId::new(2)).unwrap(), Point::new(3.0, 3.0));
    }

    #[test]
    fn test_failed_group_save_keeps_previous_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ratings.csv");
        let mut session = Session::from_parts(Roster::default(), SnapshotFile::new(&path)).unwrap();
        let group = GroupId::from("Group 3");
        session.update(&group, SolutionId::new(4), Point::new(2.0, 6.0)).unwrap();
        let before = session.store().group_points(&group);

        break_snapshot(&path);
        let column = [
            (SolutionId::new(4), Point::new(9.0, 9.0)),
            (SolutionId::new(5), Point::new(0.0, 0.0)),
            (SolutionId::new(4), Point::new(7.0, 7.0)),
        ];
        assert!(session.update_group(&group, &column).is_err());
        assert_eq!(session.store().group_points(&group), before);
    }

    #[test]
    fn test_update_group_is_all_or_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut session =
            Session::from_parts(Roster::default(), SnapshotFile::new(dir.path().join("r.csv"))).unwrap();
        let group = GroupId::from("Group 2");

        let bad = [(SolutionId::new(1), Point::new(1.0, 1.0)), (SolutionId::new(40), Point::new(1.0, 1.0))];
        assert!(session.update_group(&group, &bad).is_err());
        assert_eq!(session.get(&group, SolutionId::new(1)).unwrap(), Point::CENTER);

        let good = [(SolutionId::new(1), Point::new(1.0, 1.0)), (SolutionId::new(2), Point::new(2.0, 8.0))];
        session.update_group(&group, &good).unwrap();
        assert_eq!(session.get(&group, SolutionId::new(2)).unwrap(), Point::new(2.0, 8.0));
    }
}
