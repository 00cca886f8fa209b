//! The single HTML page: slider panel, view controls, plot and table

use std::fmt::Write as _;

use super::{escape, path_segment, quadrant_svg, summary_html, PlotStyle, Selection};
use crate::aggregate::{sort_rows, summary_table};
use crate::store::PointStore;
use crate::types::{GroupId, COORD_MAX, COORD_MIN, COORD_STEP};

const STYLE: &str = r#"
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 0; display: flex; color: #222; }
aside { width: 320px; padding: 16px; background: #f4f4f6; height: 100vh; overflow-y: auto; box-sizing: border-box; }
main { flex: 1; padding: 16px 24px; }
h1 { font-size: 1.4em; }
h2 { font-size: 1.1em; margin-top: 1.2em; }
.slider { margin: 6px 0; }
.slider label { display: block; font-size: 0.85em; }
.slider input { width: 220px; vertical-align: middle; }
.quadrant { max-width: 900px; width: 100%; }
table.summary { border-collapse: collapse; font-size: 0.85em; }
table.summary th, table.summary td { border: 1px solid #ccc; padding: 3px 6px; text-align: right; }
table.summary th a { color: inherit; text-decoration: none; }
td.undefined { color: #999; }
.note { font-size: 0.8em; color: #666; }
"#;

/// Everything the page needs besides the store
pub struct PageState<'a> {
    pub style: &'a PlotStyle,
    pub selection: &'a Selection,
}

fn hidden_inputs(pairs: &[(String, String)], skip: &[&str]) -> String {
    let mut html = String::new();
    for (key, value) in pairs.iter().filter(|(k, _)| !skip.contains(&k.as_str())) {
        let _ = write!(
            html,
            r#"<input type="hidden" name="{}" value="{}">"#,
            escape(key),
            escape(value)
        );
    }
    html
}

fn slider_panel(store: &PointStore, group: &GroupId, selection: &Selection) -> String {
    let mut html = String::with_capacity(8 * 1024);
    let roster = store.roster();

    html.push_str(r#"<form method="get" action="/"><label>Select Group to Add/Update Scores<br><select name="edit" onchange="this.form.submit()">"#);
    for candidate in roster.groups() {
        let selected = if candidate == group { " selected" } else { "" };
        let _ = write!(
            html,
            r#"<option value="{0}"{1}>{0}</option>"#,
            escape(candidate.as_str()),
            selected
        );
    }
    html.push_str("</select></label>");
    html.push_str(&hidden_inputs(&selection.to_pairs(), &["edit"]));
    html.push_str(r#"<noscript><button type="submit">Switch</button></noscript></form>"#);

    let _ = write!(
        html,
        r#"<form method="post" action="/groups/{}">"#,
        escape(&path_segment(group.as_str()))
    );
    html.push_str(&hidden_inputs(&selection.to_pairs(), &[]));

    for (solution, point) in store.group_points(group) {
        for (prefix, axis, value) in [("c", "Complexity", point.complexity), ("v", "Value", point.value)] {
            let _ = write!(
                html,
                r#"<div class="slider"><label>{axis} for Solution {solution}: <output>{value:.1}</output><br><input type="range" name="{prefix}{solution}" min="{COORD_MIN}" max="{COORD_MAX}" step="{COORD_STEP}" value="{value:.1}" oninput="this.previousElementSibling.previousElementSibling.value=Number(this.value).toFixed(1)" onchange="this.form.submit()"></label></div>"#
            );
        }
    }
    html.push_str(r#"<noscript><button type="submit">Save</button></noscript></form>"#);
    html
}

fn view_controls(store: &PointStore, selection: &Selection) -> String {
    let mut html = String::with_capacity(2 * 1024);
    html.push_str(r#"<form method="get" action="/"><label>Select Group(s) to View<br><select name="view" multiple size="4">"#);
    for group in store.roster().groups() {
        let selected = if selection.view.groups.contains(group) { " selected" } else { "" };
        let _ = write!(
            html,
            r#"<option value="{0}"{1}>{0}</option>"#,
            escape(group.as_str()),
            selected
        );
    }
    html.push_str("</select></label><br>");

    let checked = |on: bool| if on { " checked" } else { "" };
    let _ = write!(
        html,
        r#"<label><input type="checkbox" name="average" value="on"{}> Show Average</label><br>"#,
        checked(selection.view.show_average)
    );
    let _ = write!(
        html,
        r#"<label><input type="checkbox" name="hide" value="on"{}> Hide Group Values when Showing Average</label><br>"#,
        checked(selection.view.hide_groups)
    );
    html.push_str(&hidden_inputs(&selection.to_pairs(), &["view", "average", "hide"]));
    html.push_str(r#"<button type="submit">Update View</button></form>"#);
    html
}

/// Render the full page for the current selection
pub fn render_page(store: &PointStore, state: &PageState<'_>) -> String {
    let selection = state.selection;
    let roster = store.roster();
    let edit_group = selection
        .edit
        .clone()
        .or_else(|| roster.groups().first().cloned());

    let mut rows = summary_table(store);
    if let Some(column) = &selection.sort {
        sort_rows(&mut rows, column, selection.descending);
    }

    let mut html = String::with_capacity(64 * 1024);
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str("<title>Quadrant Rater</title>\n<style>");
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n<aside>\n<h2>Input Scores for Each Group</h2>\n");
    if let Some(group) = &edit_group {
        html.push_str(&slider_panel(store, group, selection));
    }
    html.push_str("\n</aside>\n<main>\n<h1>View Groups and Average</h1>\n");
    html.push_str(&view_controls(store, selection));
    html.push('\n');
    html.push_str(&quadrant_svg(store, &selection.view, state.style));
    html.push_str("\n<h2>Scores</h2>\n");
    html.push_str(&summary_html(&rows, roster.groups(), selection));
    html.push_str("\n</main>\n</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Point, Roster, SolutionId};

    #[test]
    fn test_page_defaults_to_first_group() {
        let mut store = PointStore::with_defaults(Roster::default());
        store.set(&GroupId::from("Group 1"), SolutionId::new(4), Point::new(7.3, 1.2));
        let style = PlotStyle::default();
        let selection = Selection::default();
        let html = render_page(&store, &PageState { style: &style, selection: &selection });

        assert!(html.contains(r#"action="/groups/Group%201""#));
        assert_eq!(html.matches(r#"type="range""#).count(), 32);
        assert!(html.contains(r#"name="c4" min="0" max="10" step="0.1" value="7.3""#));
        assert!(html.contains(r#"name="v4" min="0" max="10" step="0.1" value="1.2""#));
        assert!(html.contains("<svg"));
        assert!(html.contains(r#"<table class="summary">"#));
    }

    #[test]
    fn test_page_keeps_view_state_in_forms() {
        let store = PointStore::with_defaults(Roster::default());
        let style = PlotStyle::default();
        let selection = Selection {
            edit: Some(GroupId::from("Group 3")),
            view: super::super::ViewParams {
                groups: vec![GroupId::from("Group 2")],
                show_average: true,
                hide_groups: false,
            },
            ..Default::default()
        };
        let html = render_page(&store, &PageState { style: &style, selection: &selection });

        assert!(html.contains(r#"action="/groups/Group%203""#));
        assert!(html.contains(r#"<input type="hidden" name="view" value="Group 2">"#));
        assert!(html.contains(r#"<input type="checkbox" name="average" value="on" checked>"#));
        assert!(html.contains(r#"<option value="Group 2" selected>"#));
    }
}
