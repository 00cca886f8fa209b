//! Integration tests for the rating store and its snapshot file:
//! - default completeness and missing-file creation
//! - save/load round trips and idempotent overwrites
//! - backfill of groups the file does not mention
//! - rejection of corrupt files

use quadrant_rater::store::{snapshot, SnapshotError, SnapshotFile, SNAPSHOT_HEADER};
use quadrant_rater::{GroupId, Point, PointStore, Roster, Session, SolutionId};

fn roster() -> Roster {
    Roster::default()
}

#[test]
fn test_fresh_store_reads_center_everywhere() {
    let store = PointStore::new(roster());
    for group in store.roster().groups() {
        for solution in store.roster().solutions() {
            assert_eq!(store.get(group, solution), Point::new(5.0, 5.0));
        }
    }
    assert_eq!(store.all_pairs().len(), 48);
}

#[test]
fn test_missing_file_is_created_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("group_data.csv");
    let file = SnapshotFile::new(&path);

    let store = file.load(&roster()).unwrap();
    assert!(path.exists());
    assert_eq!(store, PointStore::with_defaults(roster()));

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 49);
    assert_eq!(lines[0], SNAPSHOT_HEADER);
    assert_eq!(lines[1], "Group 1,1,5.0,5.0");
    assert_eq!(lines[48], "Group 3,16,5.0,5.0");
}

#[test]
fn test_round_trip_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = SnapshotFile::new(dir.path().join("ratings.csv"));

    let mut store = file.load(&roster()).unwrap();
    store.set(&GroupId::from("Group 2"), SolutionId::new(7), Point::new(3.4, 8.1));
    file.save(&store).unwrap();

    let reloaded = file.load(&roster()).unwrap();
    assert_eq!(reloaded.get(&GroupId::from("Group 2"), SolutionId::new(7)), Point::new(3.4, 8.1));
    assert_eq!(reloaded, store);
}

#[test]
fn test_identical_sets_give_identical_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ratings.csv");
    let group = GroupId::from("Group 1");

    let mut session = Session::from_parts(roster(), SnapshotFile::new(&path)).unwrap();
    session.update(&group, SolutionId::new(5), Point::new(6.2, 1.9)).unwrap();
    let once = std::fs::read(&path).unwrap();
    session.update(&group, SolutionId::new(5), Point::new(6.2, 1.9)).unwrap();
    let twice = std::fs::read(&path).unwrap();

    assert_eq!(once, twice);
}

#[test]
fn test_group_missing_from_file_loads_as_center() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ratings.csv");

    let mut text = format!("{}\n", SNAPSHOT_HEADER);
    for group in ["Group 1", "Group 2"] {
        for solution in 1..=16 {
            text.push_str(&format!("{},{},1.0,9.0\n", group, solution));
        }
    }
    std::fs::write(&path, &text).unwrap();

    let store = SnapshotFile::new(&path).load(&roster()).unwrap();
    for solution in store.roster().solutions() {
        assert_eq!(store.get(&GroupId::from("Group 1"), solution), Point::new(1.0, 9.0));
        assert_eq!(store.get(&GroupId::from("Group 3"), solution), Point::CENTER);
    }
    // loading alone does not rewrite the file
    assert_eq!(std::fs::read_to_string(&path).unwrap(), text);
}

#[test]
fn test_extra_groups_in_config_extend_an_old_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ratings.csv");
    std::fs::write(&path, "Group,Solution,Complexity,Value\nGroup 1,2,0.5,7.5\n").unwrap();

    let wider = Roster::new(
        vec![GroupId::from("Group 1"), GroupId::from("Group 4")],
        2,
    );
    let mut session = Session::from_parts(wider, SnapshotFile::new(&path)).unwrap();
    session
        .update(&GroupId::from("Group 4"), SolutionId::new(1), Point::new(2.0, 2.0))
        .unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(
        text,
        "Group,Solution,Complexity,Value\n\
         Group 1,1,5.0,5.0\n\
         Group 1,2,0.5,7.5\n\
         Group 4,1,2.0,2.0\n\
         Group 4,2,5.0,5.0\n"
    );
}

#[test]
fn test_corrupt_file_is_fatal_at_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ratings.csv");
    let original = "Group,Solution,Complexity,Value\nGroup 1,1,5.0,5.0\nGroup 1,2,lots,5.0\n";
    std::fs::write(&path, original).unwrap();

    let err = SnapshotFile::new(&path).load(&roster()).unwrap_err();
    match err.downcast_ref::<SnapshotError>() {
        Some(SnapshotError::BadCoordinate { line, column, raw }) => {
            assert_eq!(*line, 3);
            assert_eq!(*column, "Complexity");
            assert_eq!(raw, "lots");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(format!("{:#}", err).contains("ratings.csv"));

    // the corrupt file is left alone
    assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
    assert!(Session::from_parts(roster(), SnapshotFile::new(&path)).is_err());
}

#[test]
fn test_parse_rejects_bad_rows_with_line_numbers() {
    let cases = [
        ("", "empty"),
        ("Solution,Group,Complexity,Value\n", "header"),
        ("Group,Solution,Complexity,Value\nGroup 1,1,5.0\n", "fields"),
        ("Group,Solution,Complexity,Value\nGroup 9,1,5.0,5.0\n", "group"),
        ("Group,Solution,Complexity,Value\n\nGroup 1,17,5.0,5.0\n", "solution"),
        ("Group,Solution,Complexity,Value\nGroup 1,1,5.0,NaN\n", "coordinate"),
    ];

    for (text, kind) in cases {
        let err = snapshot::parse(text, &roster()).unwrap_err();
        let ok = match (kind, &err) {
            ("empty", SnapshotError::Empty) => true,
            ("header", SnapshotError::BadHeader { line: 1, .. }) => true,
            ("fields", SnapshotError::FieldCount { line: 2, found: 3 }) => true,
            ("group", SnapshotError::UnknownGroup { line: 2, .. }) => true,
            ("solution", SnapshotError::BadSolution { line: 3, max: 16, .. }) => true,
            ("coordinate", SnapshotError::BadCoordinate { line: 2, .. }) => true,
            _ => false,
        };
        assert!(ok, "{}: unexpected {:?}", kind, err);
    }
}

#[test]
fn test_out_of_range_rows_are_clamped_and_first_duplicate_wins() {
    let text = "Group,Solution,Complexity,Value\n\
                Group 1,1,12.0,-3.0\n\
                Group 1,2,1.0,1.0\n\
                Group 1,2,9.0,9.0\n";
    let store = snapshot::parse(text, &roster()).unwrap();
    assert_eq!(store.get(&GroupId::from("Group 1"), SolutionId::new(1)), Point::new(10.0, 0.0));
    assert_eq!(store.get(&GroupId::from("Group 1"), SolutionId::new(2)), Point::new(1.0, 1.0));
}
