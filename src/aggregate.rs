//! Aggregation over the rating store
//!
//! Averages across a chosen subset of groups, the per-solution summary table
//! across all groups, and sorting for that table.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::store::PointStore;
use crate::types::{GroupId, Point, SolutionId};

/// Column name of the ratio score in tables and sort keys
pub const RATIO_COLUMN: &str = "Value/Complexity Score";

/// Mean point per solution across exactly `groups`.
///
/// Each group counts once however often it is listed. No groups means no
/// averages: the result is empty rather than a division by zero.
pub fn average(store: &PointStore, groups: &[GroupId]) -> BTreeMap<SolutionId, Point> {
    let groups: BTreeSet<&GroupId> = groups.iter().collect();
    if groups.is_empty() {
        return BTreeMap::new();
    }

    store
        .roster()
        .solutions()
        .map(|solution| {
            let points: Vec<Point> = groups.iter().map(|group| store.get(group, solution)).collect();
            (solution, mean(&points))
        })
        .collect()
}

fn mean(points: &[Point]) -> Point {
    let n = points.len() as f64;
    let (complexity, value) = points
        .iter()
        .fold((0.0, 0.0), |(c, v), p| (c + p.complexity, v + p.value));
    Point::new(complexity / n, value / n)
}

/// One solution's line in the summary table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub solution: SolutionId,
    /// Every configured group's rating, in configured order
    pub groups: Vec<(GroupId, Point)>,
    pub average_complexity: f64,
    pub average_value: f64,
    /// `average_value / average_complexity`, or 0 when complexity averages 0
    pub ratio: f64,
    /// False when the ratio fell back to 0 because complexity averaged 0
    pub ratio_defined: bool,
}

/// Per-solution table over all configured groups, ascending by solution.
///
/// Averages always cover every configured group, independent of what a viewer
/// has selected for the plot.
pub fn summary_table(store: &PointStore) -> Vec<SummaryRow> {
    let roster = store.roster();
    roster
        .solutions()
        .map(|solution| {
            let groups: Vec<(GroupId, Point)> = roster
                .groups()
                .iter()
                .map(|group| (group.clone(), store.get(group, solution)))
                .collect();

            let points: Vec<Point> = groups.iter().map(|(_, p)| *p).collect();
            let avg = if points.is_empty() { Point::new(0.0, 0.0) } else { mean(&points) };

            let (ratio, ratio_defined) = if avg.complexity == 0.0 {
                (0.0, false)
            } else {
                (avg.value / avg.complexity, true)
            };

            SummaryRow {
                solution,
                groups,
                average_complexity: avg.complexity,
                average_value: avg.value,
                ratio,
                ratio_defined,
            }
        })
        .collect()
}

/// Which summary column to sort by
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortColumn {
    Solution,
    GroupComplexity(GroupId),
    GroupValue(GroupId),
    AverageComplexity,
    AverageValue,
    Ratio,
}

impl SortColumn {
    /// Parse a table column name such as `Group 1_Value` or `Average_Complexity`
    pub fn parse(name: &str, groups: &[GroupId]) -> Option<Self> {
        match name {
            "Solution" => return Some(SortColumn::Solution),
            "Average_Complexity" => return Some(SortColumn::AverageComplexity),
            "Average_Value" => return Some(SortColumn::AverageValue),
            RATIO_COLUMN | "ratio" => return Some(SortColumn::Ratio),
            _ => {}
        }
        groups.iter().find_map(|group| {
            let rest = name.strip_prefix(group.as_str())?;
            match rest {
                "_Complexity" => Some(SortColumn::GroupComplexity(group.clone())),
                "_Value" => Some(SortColumn::GroupValue(group.clone())),
                _ => None,
            }
        })
    }

    /// Column name as shown in the table header
    pub fn name(&self) -> String {
        match self {
            SortColumn::Solution => "Solution".to_string(),
            SortColumn::GroupComplexity(group) => format!("{}_Complexity", group),
            SortColumn::GroupValue(group) => format!("{}_Value", group),
            SortColumn::AverageComplexity => "Average_Complexity".to_string(),
            SortColumn::AverageValue => "Average_Value".to_string(),
            SortColumn::Ratio => RATIO_COLUMN.to_string(),
        }
    }

    fn key(&self, row: &SummaryRow) -> f64 {
        let group_point = |wanted: &GroupId| {
            row.groups
                .iter()
                .find(|(group, _)| group == wanted)
                .map(|(_, point)| *point)
                .unwrap_or(Point::CENTER)
        };
        match self {
            SortColumn::Solution => row.solution.get() as f64,
            SortColumn::GroupComplexity(group) => group_point(group).complexity,
            SortColumn::GroupValue(group) => group_point(group).value,
            SortColumn::AverageComplexity => row.average_complexity,
            SortColumn::AverageValue => row.average_value,
            SortColumn::Ratio => row.ratio,
        }
    }
}

/// Stable sort of summary rows; ties keep ascending solution order
pub fn sort_rows(rows: &mut [SummaryRow], column: &SortColumn, descending: bool) {
    rows.sort_by(|a, b| {
        let ord = column.key(a).total_cmp(&column.key(b));
        let ord = if descending { ord.reverse() } else { ord };
        ord.then_with(|| a.solution.cmp(&b.solution))
    });
}

/// Best-first ordering used when a caller just wants a ranking
pub fn ranking(store: &PointStore) -> Vec<SummaryRow> {
    let mut rows = summary_table(store);
    sort_rows(&mut rows, &SortColumn::Ratio, true);
    rows
}
