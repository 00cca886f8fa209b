//! Presentation layer
//!
//! Turns the store and its aggregates into SVG, HTML and plain text. Nothing in
//! here mutates state.

pub mod page;
pub mod plot;
pub mod table;

use crate::aggregate::SortColumn;
use crate::types::{GroupId, LookupError, Roster};

pub use page::{render_page, PageState};
pub use plot::{quadrant_svg, PlotStyle};
pub use table::{summary_html, summary_text};

/// What the viewer asked to see on the plot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewParams {
    /// Groups selected in the multi-select, in configured order
    pub groups: Vec<GroupId>,
    pub show_average: bool,
    /// Only honoured together with `show_average`
    pub hide_groups: bool,
}

impl ViewParams {
    /// Whether individual group markers are drawn
    pub fn shows_groups(&self) -> bool {
        !(self.show_average && self.hide_groups)
    }
}

/// View and table state decoded from query or form pairs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub view: ViewParams,
    /// Group whose sliders are shown
    pub edit: Option<GroupId>,
    pub sort: Option<SortColumn>,
    pub descending: bool,
}

impl Selection {
    /// Decode `view`, `average`, `hide`, `edit`, `sort` and `desc` pairs.
    /// Unknown keys are ignored; unknown groups are an error.
    pub fn from_pairs(pairs: &[(String, String)], roster: &Roster) -> Result<Self, LookupError> {
        let mut selection = Selection::default();
        let mut names = Vec::new();

        for (key, value) in pairs {
            match key.as_str() {
                "view" => names.push(value.as_str()),
                "average" => selection.view.show_average = is_on(value),
                "hide" => selection.view.hide_groups = is_on(value),
                "desc" => selection.descending = is_on(value),
                "edit" if !value.is_empty() => selection.edit = Some(roster.group(value)?),
                "sort" => selection.sort = SortColumn::parse(value, roster.groups()),
                _ => {}
            }
        }

        selection.view.groups = roster.select(names)?;
        Ok(selection)
    }

    /// Encode back into query pairs, the inverse of [`Selection::from_pairs`]
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(edit) = &self.edit {
            pairs.push(("edit".to_string(), edit.to_string()));
        }
        for group in &self.view.groups {
            pairs.push(("view".to_string(), group.to_string()));
        }
        if self.view.show_average {
            pairs.push(("average".to_string(), "on".to_string()));
        }
        if self.view.hide_groups {
            pairs.push(("hide".to_string(), "on".to_string()));
        }
        if let Some(sort) = &self.sort {
            pairs.push(("sort".to_string(), sort.name()));
        }
        if self.descending {
            pairs.push(("desc".to_string(), "on".to_string()));
        }
        pairs
    }

    /// URL query string (without the leading `?`)
    pub fn query_string(&self) -> String {
        query_string(&self.to_pairs())
    }
}

fn is_on(value: &str) -> bool {
    matches!(value, "on" | "true" | "1" | "yes")
}

/// Percent-encode pairs as `application/x-www-form-urlencoded`
pub fn query_string(pairs: &[(String, String)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

/// Percent-encode a single path segment
pub fn path_segment(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// Escape text for HTML and SVG content or attribute values
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
