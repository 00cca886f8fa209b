//! Summary table rendering (HTML for the page, plain text for the CLI)

use std::fmt::Write as _;

use super::{escape, Selection};
use crate::aggregate::{SortColumn, SummaryRow};
use crate::types::GroupId;

/// Every column of the summary table, in display order
pub fn columns(groups: &[GroupId]) -> Vec<SortColumn> {
    let mut columns = vec![SortColumn::Solution];
    for group in groups {
        columns.push(SortColumn::GroupComplexity(group.clone()));
        columns.push(SortColumn::GroupValue(group.clone()));
    }
    columns.push(SortColumn::AverageComplexity);
    columns.push(SortColumn::AverageValue);
    columns.push(SortColumn::Ratio);
    columns
}

fn cell(row: &SummaryRow, column: &SortColumn) -> String {
    let group_point = |wanted: &GroupId| row.groups.iter().find(|(g, _)| g == wanted).map(|(_, p)| *p);
    match column {
        SortColumn::Solution => row.solution.to_string(),
        SortColumn::GroupComplexity(group) => group_point(group)
            .map(|p| format!("{:.1}", p.complexity))
            .unwrap_or_default(),
        SortColumn::GroupValue(group) => group_point(group)
            .map(|p| format!("{:.1}", p.value))
            .unwrap_or_default(),
        SortColumn::AverageComplexity => format!("{:.2}", row.average_complexity),
        SortColumn::AverageValue => format!("{:.2}", row.average_value),
        SortColumn::Ratio => format!("{:.3}", row.ratio),
    }
}

/// HTML table; column headers link to the same page sorted by that column
pub fn summary_html(rows: &[SummaryRow], groups: &[GroupId], selection: &Selection) -> String {
    let columns = columns(groups);
    let mut html = String::with_capacity(8 * 1024);
    html.push_str(r#"<table class="summary"><thead><tr>"#);

    for column in &columns {
        let active = selection.sort.as_ref() == Some(column);
        let mut next = selection.clone();
        next.descending = active && !selection.descending;
        next.sort = Some(column.clone());
        let arrow = match (active, selection.descending) {
            (true, true) => " ▼",
            (true, false) => " ▲",
            _ => "",
        };
        let _ = write!(
            html,
            r#"<th><a href="/?{}">{}{}</a></th>"#,
            escape(&next.query_string()),
            escape(&column.name()),
            arrow
        );
    }
    html.push_str("</tr></thead><tbody>");

    for row in rows {
        html.push_str("<tr>");
        for column in &columns {
            if *column == SortColumn::Ratio && !row.ratio_defined {
                let _ = write!(
                    html,
                    r#"<td class="undefined" title="average complexity is 0">{}*</td>"#,
                    cell(row, column)
                );
            } else {
                let _ = write!(html, "<td>{}</td>", cell(row, column));
            }
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");

    if rows.iter().any(|r| !r.ratio_defined) {
        html.push_str(r#"<p class="note">* average complexity is 0, score shown as 0</p>"#);
    }
    html
}

/// Fixed-width text table for terminals
pub fn summary_text(rows: &[SummaryRow], groups: &[GroupId]) -> String {
    let columns = columns(groups);
    let headers: Vec<String> = columns.iter().map(|c| c.name()).collect();
    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|column| {
                    let text = cell(row, column);
                    if *column == SortColumn::Ratio && !row.ratio_defined {
                        format!("{} (n/a)", text)
                    } else {
                        text
                    }
                })
                .collect()
        })
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            body.iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    let line = |out: &mut String, cells: &[String]| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:>width$}", c, width = *w))
            .collect();
        let _ = writeln!(out, "{}", padded.join("  ").trim_end());
    };

    line(&mut out, &headers[..]);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    line(&mut out, &rule[..]);
    for cells in &body {
        line(&mut out, &cells[..]);
    }
    out
}
