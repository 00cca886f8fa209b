//! Quadrant plot as SVG
//!
//! Fixed data space [-0.2, 10.2] on both axes, crosshair through (5, 5) with
//! arrows pointing at "High", and two light guide circles around the center.
//! Group ratings are squares in the group colour; averages are circles in the
//! average colour, drawn on top.

use std::fmt::Write as _;

use super::{escape, ViewParams};
use crate::aggregate;
use crate::config::Config;
use crate::store::PointStore;
use crate::types::{GroupId, COORD_MAX, COORD_MIN};

const DOMAIN_MIN: f64 = COORD_MIN - 0.2;
const DOMAIN_MAX: f64 = COORD_MAX + 0.2;
const CENTER: f64 = (COORD_MIN + COORD_MAX) / 2.0;

const PLOT_SIZE: f64 = 600.0;
const MARGIN_X: f64 = 170.0;
const MARGIN_Y: f64 = 50.0;
const TOTAL_W: f64 = PLOT_SIZE + 2.0 * MARGIN_X;
const TOTAL_H: f64 = PLOT_SIZE + 2.0 * MARGIN_Y;

const GUIDE_RADII: [f64; 2] = [2.5, 5.0];
const SQUARE_SIDE: f64 = 24.0;
const AVERAGE_RADIUS: f64 = 13.0;

/// Colours used by the plot
#[derive(Debug, Clone, PartialEq)]
pub struct PlotStyle {
    pub group_colors: Vec<(GroupId, String)>,
    pub average_color: String,
}

impl PlotStyle {
    pub fn from_config(config: &Config) -> Self {
        Self {
            group_colors: config
                .groups
                .iter()
                .map(|g| (GroupId::new(g.name.clone()), g.color.clone()))
                .collect(),
            average_color: config.average_color.clone(),
        }
    }

    fn color_of(&self, group: &GroupId) -> &str {
        self.group_colors
            .iter()
            .find(|(g, _)| g == group)
            .map(|(_, color)| color.as_str())
            .unwrap_or("gray")
    }
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

fn x_of(x: f64) -> f64 {
    MARGIN_X + (x - DOMAIN_MIN) / (DOMAIN_MAX - DOMAIN_MIN) * PLOT_SIZE
}

fn y_of(y: f64) -> f64 {
    MARGIN_Y + (DOMAIN_MAX - y) / (DOMAIN_MAX - DOMAIN_MIN) * PLOT_SIZE
}

fn scale(len: f64) -> f64 {
    len / (DOMAIN_MAX - DOMAIN_MIN) * PLOT_SIZE
}

/// Render the quadrant plot for a view
#[must_use]
pub fn quadrant_svg(store: &PointStore, view: &ViewParams, style: &PlotStyle) -> String {
    let mut svg = String::with_capacity(16 * 1024);

    let _ = write!(
        svg,
        r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {TOTAL_W} {TOTAL_H}" font-family="sans-serif" class="quadrant">"##
    );
    svg.push_str(
        r##"<defs><marker id="arrow" viewBox="0 0 10 10" refX="9" refY="5" markerWidth="8" markerHeight="8" orient="auto-start-reverse"><path d="M0,0 L10,5 L0,10 z" fill="black"/></marker></defs>"##,
    );
    let _ = write!(svg, r##"<rect width="{TOTAL_W}" height="{TOTAL_H}" fill="white"/>"##);

    // Guide circles
    for radius in GUIDE_RADII {
        let _ = write!(
            svg,
            r##"<circle cx="{:.1}" cy="{:.1}" r="{:.1}" fill="none" stroke="lightgray" stroke-width="0.5"/>"##,
            x_of(CENTER),
            y_of(CENTER),
            scale(radius)
        );
    }

    // Crosshair axes
    let _ = write!(
        svg,
        r##"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="black" stroke-width="1.5" marker-end="url(#arrow)"/>"##,
        x_of(COORD_MIN),
        y_of(CENTER),
        x_of(COORD_MAX),
        y_of(CENTER)
    );
    let _ = write!(
        svg,
        r##"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="black" stroke-width="1.5" marker-end="url(#arrow)"/>"##,
        x_of(CENTER),
        y_of(COORD_MIN),
        x_of(CENTER),
        y_of(COORD_MAX)
    );

    // Axis labels
    let label = |svg: &mut String, x: f64, y: f64, anchor: &str, text: &str| {
        let _ = write!(
            svg,
            r##"<text x="{x:.1}" y="{y:.1}" text-anchor="{anchor}" dominant-baseline="central" font-size="18" font-weight="bold">{text}</text>"##
        );
    };
    label(&mut svg, x_of(DOMAIN_MAX) + 12.0, y_of(CENTER), "start", "High Complexity");
    label(&mut svg, x_of(DOMAIN_MIN) - 12.0, y_of(CENTER), "end", "Low Complexity");
    label(&mut svg, x_of(CENTER), y_of(DOMAIN_MAX) - 22.0, "middle", "High Value");
    label(&mut svg, x_of(CENTER), y_of(DOMAIN_MIN) + 22.0, "middle", "Low Value");

    if view.shows_groups() {
        for group in &view.groups {
            let color = escape(style.color_of(group));
            let _ = write!(svg, r##"<g class="group" data-group="{}">"##, escape(group.as_str()));
            for (solution, point) in store.group_points(group) {
                let (x, y) = (x_of(point.complexity), y_of(point.value));
                let _ = write!(
                    svg,
                    r##"<rect x="{:.1}" y="{:.1}" width="{SQUARE_SIDE}" height="{SQUARE_SIDE}" fill="{color}"><title>{} / {}: ({:.1}, {:.1})</title></rect>"##,
                    x - SQUARE_SIDE / 2.0,
                    y - SQUARE_SIDE / 2.0,
                    escape(group.as_str()),
                    solution,
                    point.complexity,
                    point.value
                );
                let _ = write!(
                    svg,
                    r##"<text x="{x:.1}" y="{y:.1}" text-anchor="middle" dominant-baseline="central" font-size="11" font-weight="bold" fill="white">{solution}</text>"##
                );
            }
            svg.push_str("</g>");
        }
    }

    if view.show_average {
        let color = escape(&style.average_color);
        svg.push_str(r##"<g class="average">"##);
        for (solution, point) in aggregate::average(store, &view.groups) {
            let (x, y) = (x_of(point.complexity), y_of(point.value));
            let _ = write!(
                svg,
                r##"<circle cx="{x:.1}" cy="{y:.1}" r="{AVERAGE_RADIUS}" fill="{color}"><title>Average {}: ({:.2}, {:.2})</title></circle>"##,
                solution,
                point.complexity,
                point.value
            );
            let _ = write!(
                svg,
                r##"<text x="{x:.1}" y="{y:.1}" text-anchor="middle" dominant-baseline="central" font-size="11" font-weight="bold" fill="black">{solution}</text>"##
            );
        }
        svg.push_str("</g>");
    }

    svg.push_str("</svg>");
    svg
}
