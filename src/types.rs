//! Shared domain types
//!
//! Identifiers for groups and solutions, the rated point, and the roster
//! describing which groups and solutions exist for this process.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lower bound of both rating axes
pub const COORD_MIN: f64 = 0.0;
/// Upper bound of both rating axes
pub const COORD_MAX: f64 = 10.0;
/// Granularity of the input sliders
pub const COORD_STEP: f64 = 0.1;

/// Identifier of one rating group, e.g. "Group 1"
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for GroupId {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of one rated solution, numbered from 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SolutionId(u32);

impl SolutionId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for SolutionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Rejected coordinate input
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PointError {
    #[error("{axis} must be a finite number, got {raw}")]
    NotFinite { axis: &'static str, raw: f64 },
}

/// One group's assessment of one solution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub complexity: f64,
    pub value: f64,
}

impl Point {
    /// Default rating for anything not yet rated
    pub const CENTER: Point = Point { complexity: 5.0, value: 5.0 };

    pub const fn new(complexity: f64, value: f64) -> Self {
        Self { complexity, value }
    }

    /// Normalise raw input the way the sliders would: clamp into
    /// [`COORD_MIN`, `COORD_MAX`] and snap to [`COORD_STEP`].
    pub fn clamped(self) -> Result<Point, PointError> {
        Ok(Point {
            complexity: snap(self.complexity, "complexity")?,
            value: snap(self.value, "value")?,
        })
    }

    /// True when both coordinates already lie on the rating plane
    pub fn in_range(&self) -> bool {
        (COORD_MIN..=COORD_MAX).contains(&self.complexity) && (COORD_MIN..=COORD_MAX).contains(&self.value)
    }
}

impl Default for Point {
    fn default() -> Self {
        Point::CENTER
    }
}

fn snap(raw: f64, axis: &'static str) -> Result<f64, PointError> {
    if !raw.is_finite() {
        return Err(PointError::NotFinite { axis, raw });
    }
    // whole steps divided back down, so 34 steps is exactly 3.4
    let steps_per_unit = (1.0 / COORD_STEP).round();
    let steps = (raw.clamp(COORD_MIN, COORD_MAX) * steps_per_unit).round();
    Ok(steps / steps_per_unit)
}

/// Unknown group or solution at an input boundary
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LookupError {
    #[error("unknown group '{0}'")]
    UnknownGroup(String),
    #[error("solution {solution} is out of range (1..={max})")]
    SolutionOutOfRange { solution: u32, max: u32 },
}

/// The fixed set of groups and solutions for one process
#[derive(Debug, Clone, PartialEq)]
pub struct Roster {
    groups: Vec<GroupId>,
    num_solutions: u32,
}

impl Roster {
    pub fn new(groups: Vec<GroupId>, num_solutions: u32) -> Self {
        Self { groups, num_solutions }
    }

    /// Groups in configured order
    pub fn groups(&self) -> &[GroupId] {
        &self.groups
    }

    pub fn num_solutions(&self) -> u32 {
        self.num_solutions
    }

    /// Solution ids 1..=N in ascending order
    pub fn solutions(&self) -> impl Iterator<Item = SolutionId> {
        (1..=self.num_solutions).map(SolutionId)
    }

    pub fn find_group(&self, name: &str) -> Option<&GroupId> {
        self.groups.iter().find(|g| g.as_str() == name)
    }

    pub fn contains_group(&self, group: &GroupId) -> bool {
        self.groups.contains(group)
    }

    pub fn contains_solution(&self, solution: SolutionId) -> bool {
        (1..=self.num_solutions).contains(&solution.0)
    }

    /// Resolve a group name against the roster
    pub fn group(&self, name: &str) -> Result<GroupId, LookupError> {
        self.find_group(name)
            .cloned()
            .ok_or_else(|| LookupError::UnknownGroup(name.to_string()))
    }

    /// Resolve a raw solution number against the roster
    pub fn solution(&self, raw: u32) -> Result<SolutionId, LookupError> {
        let solution = SolutionId(raw);
        if self.contains_solution(solution) {
            Ok(solution)
        } else {
            Err(LookupError::SolutionOutOfRange { solution: raw, max: self.num_solutions })
        }
    }

    /// Validate both halves of a (group, solution) key
    pub fn check(&self, group: &GroupId, solution: SolutionId) -> Result<(), LookupError> {
        if !self.contains_group(group) {
            return Err(LookupError::UnknownGroup(group.to_string()));
        }
        self.solution(solution.0).map(|_| ())
    }

    /// Resolve a multi-select of group names into configured order, deduplicated
    pub fn select<'a, I>(&self, names: I) -> Result<Vec<GroupId>, LookupError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut wanted = Vec::new();
        for name in names {
            wanted.push(self.group(name)?);
        }
        Ok(self.groups.iter().filter(|g| wanted.contains(g)).cloned().collect())
    }
}

impl Default for Roster {
    fn default() -> Self {
        Self::new(
            vec![GroupId::from("Group 1"), GroupId::from("Group 2"), GroupId::from("Group 3")],
            16,
        )
    }
}
