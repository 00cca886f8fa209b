//! Integration tests for averages and the summary table

use quadrant_rater::aggregate::{average, ranking, sort_rows, summary_table, SortColumn};
use quadrant_rater::{GroupId, Point, PointStore, Roster, SolutionId};

fn g(name: &str) -> GroupId {
    GroupId::from(name)
}

fn two_groups() -> PointStore {
    PointStore::with_defaults(Roster::new(vec![g("A"), g("B")], 3))
}

#[test]
fn test_average_of_two_groups() {
    let mut store = two_groups();
    store.set(&g("A"), SolutionId::new(1), Point::new(2.0, 4.0));
    store.set(&g("B"), SolutionId::new(1), Point::new(4.0, 6.0));

    let avg = average(&store, &[g("A"), g("B")]);
    assert_eq!(avg.len(), 3);
    assert_eq!(avg[&SolutionId::new(1)], Point::new(3.0, 5.0));
    assert_eq!(avg[&SolutionId::new(2)], Point::CENTER);

    // listing a group twice does not weight it twice
    let avg = average(&store, &[g("A"), g("A"), g("B")]);
    assert_eq!(avg[&SolutionId::new(1)], Point::new(3.0, 5.0));
}

#[test]
fn test_average_over_no_groups_is_empty() {
    let store = two_groups();
    assert!(average(&store, &[]).is_empty());
}

#[test]
fn test_zero_complexity_ratio_is_flagged() {
    let mut store = two_groups();
    for group in [g("A"), g("B")] {
        store.set(&group, SolutionId::new(2), Point::new(0.0, 7.0));
    }

    let rows = summary_table(&store);
    let row = &rows[1];
    assert_eq!(row.solution, SolutionId::new(2));
    assert_eq!(row.average_complexity, 0.0);
    assert_eq!(row.ratio, 0.0);
    assert!(!row.ratio_defined);
    assert!(rows[0].ratio_defined);
    assert_eq!(rows[0].ratio, 1.0);
}

#[test]
fn test_summary_covers_every_group_regardless_of_view() {
    let mut store = two_groups();
    store.set(&g("B"), SolutionId::new(3), Point::new(8.0, 2.0));

    let rows = summary_table(&store);
    assert_eq!(rows.len(), 3);
    let row = &rows[2];
    assert_eq!(row.groups, vec![(g("A"), Point::CENTER), (g("B"), Point::new(8.0, 2.0))]);
    assert_eq!(row.average_complexity, 6.5);
    assert_eq!(row.average_value, 3.5);
}

#[test]
fn test_sorting_by_parsed_column_names() {
    let mut store = two_groups();
    store.set(&g("A"), SolutionId::new(1), Point::new(9.0, 1.0));
    store.set(&g("A"), SolutionId::new(3), Point::new(1.0, 9.0));

    let groups = store.roster().groups().to_vec();
    let mut rows = summary_table(&store);

    let column = SortColumn::parse("A_Complexity", &groups).unwrap();
    sort_rows(&mut rows, &column, false);
    let order: Vec<u32> = rows.iter().map(|r| r.solution.get()).collect();
    assert_eq!(order, vec![3, 2, 1]);

    let column = SortColumn::parse("Value/Complexity Score", &groups).unwrap();
    sort_rows(&mut rows, &column, true);
    let order: Vec<u32> = rows.iter().map(|r| r.solution.get()).collect();
    assert_eq!(order, vec![3, 2, 1]);

    assert!(SortColumn::parse("C_Value", &groups).is_none());

    let best: Vec<u32> = ranking(&store).iter().map(|r| r.solution.get()).collect();
    assert_eq!(best, vec![3, 2, 1]);
}
