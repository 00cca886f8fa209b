//! Snapshot file - durable copy of the rating store
//!
//! Plain delimited text, one header line and one row per (group, solution):
//!
//! ```text
//! Group,Solution,Complexity,Value
//! Group 1,1,5.0,5.0
//! ```
//!
//! The whole file is rewritten on every save. There is no atomic rename, so a
//! crash in the middle of a write can leave a truncated file behind, which the
//! next load rejects.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::PointStore;
use crate::types::{GroupId, Point, Roster, SolutionId, COORD_MAX, COORD_MIN};

/// Header line every snapshot starts with
pub const SNAPSHOT_HEADER: &str = "Group,Solution,Complexity,Value";

const COLUMNS: [&str; 4] = ["Group", "Solution", "Complexity", "Value"];

/// A snapshot that cannot be turned into a store
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SnapshotError {
    #[error("snapshot is empty (expected header 'Group,Solution,Complexity,Value')")]
    Empty,
    #[error("line {line}: bad header '{found}' (expected 'Group,Solution,Complexity,Value')")]
    BadHeader { line: usize, found: String },
    #[error("line {line}: expected 4 fields, found {found}")]
    FieldCount { line: usize, found: usize },
    #[error("line {line}: unknown group '{group}'")]
    UnknownGroup { line: usize, group: String },
    #[error("line {line}: solution '{raw}' is not an integer in 1..={max}")]
    BadSolution { line: usize, raw: String, max: u32 },
    #[error("line {line}: {column} '{raw}' is not a number")]
    BadCoordinate { line: usize, column: &'static str, raw: String },
}

/// The backing file of a store
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the store for `roster`.
    ///
    /// A missing file is created with every pair at the center point. Groups the
    /// file does not mention read as center points.
    pub fn load(&self, roster: &Roster) -> Result<PointStore> {
        if !self.path.exists() {
            let store = PointStore::with_defaults(roster.clone());
            self.save(&store)?;
            info!("Created snapshot {} with default ratings", self.path.display());
            return Ok(store);
        }

        let text = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read snapshot {}", self.path.display()))?;
        let store = parse(&text, roster)
            .with_context(|| format!("Corrupt snapshot {}", self.path.display()))?;

        for group in roster.groups() {
            if !roster.solutions().any(|s| store.is_rated(group, s)) {
                info!("Group '{}' missing from snapshot, using default ratings", group);
            }
        }
        info!("Loaded snapshot {}", self.path.display());
        Ok(store)
    }

    /// Overwrite the file with the full contents of `store`
    pub fn save(&self, store: &PointStore) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        std::fs::write(&self.path, render(store))
            .with_context(|| format!("Failed to write snapshot {}", self.path.display()))?;
        debug!("Saved snapshot {}", self.path.display());
        Ok(())
    }
}

/// Serialize every pair of the store, in `all_pairs` order
pub fn render(store: &PointStore) -> String {
    let pairs = store.all_pairs();
    let mut out = String::with_capacity(32 * (pairs.len() + 1));
    out.push_str(SNAPSHOT_HEADER);
    out.push('\n');
    for (group, solution, point) in pairs {
        // Debug formatting of f64 is the shortest round-trip form and keeps ".0"
        let _ = writeln!(out, "{},{},{:?},{:?}", group, solution, point.complexity, point.value);
    }
    out
}

/// Parse snapshot text into a store for `roster`
pub fn parse(text: &str, roster: &Roster) -> Result<PointStore, SnapshotError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    let (header_line, header) = lines.next().ok_or(SnapshotError::Empty)?;
    let columns: Vec<&str> = header.split(',').map(str::trim).collect();
    if columns != COLUMNS {
        return Err(SnapshotError::BadHeader {
            line: header_line,
            found: header.to_string(),
        });
    }

    let mut store = PointStore::new(roster.clone());
    let mut seen: HashSet<(GroupId, SolutionId)> = HashSet::new();

    for (line, row) in lines {
        let (group, solution, point) = parse_row(line, row, roster)?;

        if !seen.insert((group.clone(), solution)) {
            warn!("line {}: duplicate row for {} / {}, keeping the first", line, group, solution);
            continue;
        }

        let clamped = Point::new(
            point.complexity.clamp(COORD_MIN, COORD_MAX),
            point.value.clamp(COORD_MIN, COORD_MAX),
        );
        if clamped != point {
            warn!(
                "line {}: ({}, {}) outside the rating plane, clamped to ({}, {})",
                line, point.complexity, point.value, clamped.complexity, clamped.value
            );
        }
        store.set(&group, solution, clamped);
    }

    Ok(store)
}

fn parse_row(line: usize, row: &str, roster: &Roster) -> Result<(GroupId, SolutionId, Point), SnapshotError> {
    let fields: Vec<&str> = row.split(',').map(str::trim).collect();
    if fields.len() != COLUMNS.len() {
        return Err(SnapshotError::FieldCount { line, found: fields.len() });
    }

    let group = roster
        .find_group(fields[0])
        .cloned()
        .ok_or_else(|| SnapshotError::UnknownGroup {
            line,
            group: fields[0].to_string(),
        })?;

    let solution = fields[1]
        .parse::<u32>()
        .ok()
        .and_then(|raw| roster.solution(raw).ok())
        .ok_or_else(|| SnapshotError::BadSolution {
            line,
            raw: fields[1].to_string(),
            max: roster.num_solutions(),
        })?;

    let complexity = parse_coordinate(line, "Complexity", fields[2])?;
    let value = parse_coordinate(line, "Value", fields[3])?;

    Ok((group, solution, Point::new(complexity, value)))
}

fn parse_coordinate(line: usize, column: &'static str, raw: &str) -> Result<f64, SnapshotError> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| SnapshotError::BadCoordinate {
            line,
            column,
            raw: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn g(name: &str) -> GroupId {
        GroupId::from(name)
    }

    #[test]
    fn test_render_default_store() {
        let store = PointStore::with_defaults(Roster::new(vec![g("Group 1")], 2));
        assert_eq!(
            render(&store),
            "Group,Solution,Complexity,Value\nGroup 1,1,5.0,5.0\nGroup 1,2,5.0,5.0\n"
        );
    }

    #[test]
    fn test_parse_any_order_and_integers() {
        let roster = Roster::default();
        let text = "Group,Solution,Complexity,Value\nGroup 3,2,1,9\n\nGroup 1,5,2.5,4.0\n";
        let store = parse(text, &roster).unwrap();
        assert_eq!(store.get(&g("Group 3"), SolutionId::new(2)), Point::new(1.0, 9.0));
        assert_eq!(store.get(&g("Group 1"), SolutionId::new(5)), Point::new(2.5, 4.0));
        assert_eq!(store.get(&g("Group 2"), SolutionId::new(5)), Point::CENTER);
    }

    #[test]
    fn test_parse_rejects_unknown_group() {
        let text = "Group,Solution,Complexity,Value\nGroup 9,1,5.0,5.0\n";
        let err = parse(text, &Roster::default()).unwrap_err();
        assert_eq!(err, SnapshotError::UnknownGroup { line: 2, group: "Group 9".into() });
    }

    #[test]
    fn test_parse_rejects_non_numeric() {
        let text = "Group,Solution,Complexity,Value\nGroup 1,1,high,5.0\n";
        let err = parse(text, &Roster::default()).unwrap_err();
        assert!(matches!(err, SnapshotError::BadCoordinate { line: 2, column: "Complexity", .. }));

        let text = "Group,Solution,Complexity,Value\nGroup 1,1,5.0,NaN\n";
        let err = parse(text, &Roster::default()).unwrap_err();
        assert!(matches!(err, SnapshotError::BadCoordinate { column: "Value", .. }));
    }

    #[test]
    fn test_parse_rejects_bad_solution_and_shape() {
        let roster = Roster::default();
        assert!(matches!(
            parse("Group,Solution,Complexity,Value\nGroup 1,17,5,5\n", &roster),
            Err(SnapshotError::BadSolution { .. })
        ));
        assert!(matches!(
            parse("Group,Solution,Complexity,Value\nGroup 1,1.5,5,5\n", &roster),
            Err(SnapshotError::BadSolution { .. })
        ));
        assert!(matches!(
            parse("Group,Solution,Complexity,Value\nGroup 1,1,5\n", &roster),
            Err(SnapshotError::FieldCount { line: 2, found: 3 })
        ));
        assert_eq!(parse("", &roster).unwrap_err(), SnapshotError::Empty);
        assert!(matches!(
            parse("Team,Item,X,Y\n", &roster),
            Err(SnapshotError::BadHeader { line: 1, .. })
        ));
    }

    #[test]
    fn test_parse_clamps_and_keeps_first_duplicate() {
        let text = "Group,Solution,Complexity,Value\nGroup 1,1,-2,14\nGroup 1,1,3,3\n";
        let store = parse(text, &Roster::default()).unwrap();
        assert_eq!(store.get(&g("Group 1"), SolutionId::new(1)), Point::new(0.0, 10.0));
    }
}
