//! HTTP handlers for the page, the plot and the JSON API

use axum::{
    extract::{Form, Json, Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use tracing::{debug, error};

use crate::aggregate::{sort_rows, SortColumn};
use crate::render::{quadrant_svg, render_page, PageState, Selection};
use crate::server::ServerState;
use crate::store::snapshot;
use crate::types::{GroupId, LookupError, Point, PointError, SolutionId};

/// Query or form pairs, kept in order so repeated keys survive
type Pairs = Vec<(String, String)>;

/// One rating as exchanged over the JSON API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    pub group: String,
    pub solution: u32,
    pub complexity: f64,
    pub value: f64,
}

impl PointRecord {
    fn new(group: &GroupId, solution: SolutionId, point: Point) -> Self {
        Self {
            group: group.to_string(),
            solution: solution.get(),
            complexity: point.complexity,
            value: point.value,
        }
    }
}

/// Status response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub name: String,
    pub version: String,
    pub groups: Vec<String>,
    pub num_solutions: u32,
    pub data_file: String,
}

/// Average response
#[derive(Debug, Serialize, Deserialize)]
pub struct AverageResponse {
    pub groups: Vec<String>,
    pub averages: BTreeMap<u32, Point>,
}

fn error_response(status: StatusCode, error: &str, details: impl std::fmt::Display) -> Response {
    (
        status,
        Json(json!({
            "error": error,
            "details": details.to_string()
        })),
    )
        .into_response()
}

fn lookup_failure(e: LookupError) -> Response {
    error_response(StatusCode::NOT_FOUND, "Unknown group or solution", e)
}

/// Map a session failure onto a status code
fn session_failure(e: anyhow::Error) -> Response {
    if let Some(lookup) = e.downcast_ref::<LookupError>() {
        return lookup_failure(lookup.clone());
    }
    if let Some(point) = e.downcast_ref::<PointError>() {
        return error_response(StatusCode::BAD_REQUEST, "Invalid rating", point);
    }
    error!("Request failed: {:#}", e);
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save ratings", format!("{:#}", e))
}

/// The rating page
pub async fn index_handler(State(state): State<ServerState>, Query(pairs): Query<Pairs>) -> Response {
    let session = state.session.lock().await;
    let selection = match Selection::from_pairs(&pairs, session.roster()) {
        Ok(selection) => selection,
        Err(e) => return lookup_failure(e),
    };
    let page = PageState {
        style: &state.style,
        selection: &selection,
    };
    Html(render_page(session.store(), &page)).into_response()
}

/// Slider form for one group: `c<N>` and `v<N>` fields plus the view state
pub async fn group_form_handler(
    State(state): State<ServerState>,
    Path(group): Path<String>,
    Form(fields): Form<Pairs>,
) -> Response {
    let mut session = state.session.lock().await;
    let roster = session.roster();
    let group = match roster.group(&group) {
        Ok(group) => group,
        Err(e) => return lookup_failure(e),
    };

    let mut column: BTreeMap<SolutionId, Point> = BTreeMap::new();
    let mut view_state = Pairs::new();
    for (key, raw) in fields {
        let axis = key
            .strip_prefix('c')
            .map(|n| ('c', n))
            .or_else(|| key.strip_prefix('v').map(|n| ('v', n)))
            .and_then(|(axis, n)| n.parse::<u32>().ok().map(|n| (axis, n)));
        let Some((axis, n)) = axis else {
            view_state.push((key, raw));
            continue;
        };

        let solution = match roster.solution(n) {
            Ok(solution) => solution,
            Err(e) => return lookup_failure(e),
        };
        let number: f64 = match raw.trim().parse() {
            Ok(number) => number,
            Err(_) => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    "Invalid rating",
                    format!("{} '{}' is not a number", key, raw),
                )
            }
        };
        let point = column
            .entry(solution)
            .or_insert_with(|| session.store().get(&group, solution));
        if axis == 'c' {
            point.complexity = number;
        } else {
            point.value = number;
        }
    }

    let mut selection = match Selection::from_pairs(&view_state, roster) {
        Ok(selection) => selection,
        Err(e) => return lookup_failure(e),
    };
    selection.edit = Some(group.clone());

    let column: Vec<(SolutionId, Point)> = column.into_iter().collect();
    if let Err(e) = session.update_group(&group, &column) {
        return session_failure(e);
    }
    debug!("Form update for {} ({} solutions)", group, column.len());

    Redirect::to(&format!("/?{}", selection.query_string())).into_response()
}

/// The plot on its own, for the same view query as the page
pub async fn plot_handler(State(state): State<ServerState>, Query(pairs): Query<Pairs>) -> Response {
    let session = state.session.lock().await;
    let selection = match Selection::from_pairs(&pairs, session.roster()) {
        Ok(selection) => selection,
        Err(e) => return lookup_failure(e),
    };
    let svg = quadrant_svg(session.store(), &selection.view, &state.style);
    ([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response()
}

/// Status handler
pub async fn status_handler(State(state): State<ServerState>) -> impl IntoResponse {
    let session = state.session.lock().await;
    let roster = session.roster();
    Json(StatusResponse {
        status: "ok".to_string(),
        name: crate::NAME.to_string(),
        version: crate::VERSION.to_string(),
        groups: roster.groups().iter().map(|g| g.to_string()).collect(),
        num_solutions: roster.num_solutions(),
        data_file: session.snapshot().path().display().to_string(),
    })
}

/// Every rating, grouped by group then solution
pub async fn list_points_handler(State(state): State<ServerState>) -> impl IntoResponse {
    let session = state.session.lock().await;
    let records: Vec<PointRecord> = session
        .store()
        .all_pairs()
        .iter()
        .map(|(group, solution, point)| PointRecord::new(group, *solution, *point))
        .collect();
    Json(records)
}

pub async fn get_point_handler(
    State(state): State<ServerState>,
    Path((group, solution)): Path<(String, u32)>,
) -> Response {
    let session = state.session.lock().await;
    let lookup = session
        .roster()
        .group(&group)
        .and_then(|group| Ok((group, session.roster().solution(solution)?)));
    let (group, solution) = match lookup {
        Ok(ids) => ids,
        Err(e) => return lookup_failure(e),
    };
    match session.get(&group, solution) {
        Ok(point) => Json(PointRecord::new(&group, solution, point)).into_response(),
        Err(e) => lookup_failure(e),
    }
}

/// Set one rating; responds with the point actually stored.
///
/// Coordinates get the same normalisation as the page sliders: clamped to
/// 0..=10 and snapped to the 0.1 slider step, so 3.44 is stored as 3.4.
pub async fn set_point_handler(
    State(state): State<ServerState>,
    Json(req): Json<PointRecord>,
) -> Response {
    let mut session = state.session.lock().await;
    let lookup = session
        .roster()
        .group(&req.group)
        .and_then(|group| Ok((group, session.roster().solution(req.solution)?)));
    let (group, solution) = match lookup {
        Ok(ids) => ids,
        Err(e) => return lookup_failure(e),
    };

    match session.update(&group, solution, Point::new(req.complexity, req.value)) {
        Ok(stored) => (StatusCode::OK, Json(PointRecord::new(&group, solution, stored))).into_response(),
        Err(e) => session_failure(e),
    }
}

/// Averages over the `view` groups, keyed by solution
pub async fn average_handler(State(state): State<ServerState>, Query(pairs): Query<Pairs>) -> Response {
    let session = state.session.lock().await;
    let names = pairs.iter().filter(|(k, _)| k == "view").map(|(_, v)| v.as_str());
    let groups = match session.view_groups(names) {
        Ok(groups) => groups,
        Err(e) => return lookup_failure(e),
    };
    let averages = session
        .average(&groups)
        .into_iter()
        .map(|(solution, point)| (solution.get(), point))
        .collect();
    Json(AverageResponse {
        groups: groups.iter().map(|g| g.to_string()).collect(),
        averages,
    })
    .into_response()
}

/// Summary rows, optionally sorted by a column name
pub async fn summary_handler(State(state): State<ServerState>, Query(pairs): Query<Pairs>) -> Response {
    let session = state.session.lock().await;
    let mut rows = session.summary();
    let value_of = |key: &str| pairs.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v.as_str());

    if let Some(name) = value_of("sort").filter(|name| !name.is_empty()) {
        let Some(column) = SortColumn::parse(name, session.roster().groups()) else {
            return error_response(StatusCode::BAD_REQUEST, "Unknown sort column", name);
        };
        let descending = matches!(value_of("desc"), Some("on" | "true" | "1" | "yes"));
        sort_rows(&mut rows, &column, descending);
    }
    Json(rows).into_response()
}

/// The snapshot exactly as it is written to disk
pub async fn snapshot_handler(State(state): State<ServerState>) -> impl IntoResponse {
    let session = state.session.lock().await;
    (
        [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
        snapshot::render(session.store()),
    )
}
