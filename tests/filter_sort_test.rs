use hockey_stats::filter::filter;
use hockey_stats::schema::TableSchema;
use hockey_stats::sort::{sort, SortDirection};
use hockey_stats::table::{CellValue, Table};
use serde_json::{json, Map, Value};

fn records(values: Vec<Value>) -> Vec<Map<String, Value>> {
    values
        .into_iter()
        .map(|v| v.as_object().cloned().expect("record must be an object"))
        .collect()
}

fn bob_and_amy() -> Table {
    Table::from_records(
        &TableSchema::skaters(),
        &records(vec![
            json!({"player": "Bob", "team": "A", "goals": 5}),
            json!({"player": "Amy", "team": "B", "goals": 10}),
        ]),
    )
}

fn skaters() -> Table {
    Table::from_records(
        &TableSchema::skaters(),
        &records(vec![
            json!({"player": "Marek Halloway", "team": "Harbor City Gulls", "goals": 17, "points": 38}),
            json!({"player": "Jonas Trevik", "team": "Northfield Pines", "goals": 14, "points": 26}),
            json!({"player": "Ada Kerrigan", "team": "Riverside Otters", "goals": 5, "points": 27}),
            json!({"player": "Tomas Gull", "team": "Eastgate Comets", "goals": 9, "points": 20}),
            json!({"player": "Lena Brook", "team": "Westbrook Foxes", "goals": 11, "points": 19}),
        ]),
    )
}

fn names(table: &Table, rows: &[usize]) -> Vec<String> {
    let player = table.column_index("player").unwrap();
    rows.iter().map(|&r| table.cell(r, player).display()).collect()
}

fn searchable() -> Vec<&'static str> {
    vec!["player", "team"]
}

#[test]
fn test_bob_and_amy() {
    let table = bob_and_amy();
    let kept = filter(&table, "a", &searchable());
    assert_eq!(names(&table, &kept), vec!["Bob", "Amy"]);

    let ascending = sort(&table, &kept, "goals", SortDirection::Ascending).unwrap();
    assert_eq!(names(&table, &ascending), vec!["Bob", "Amy"]);

    let descending = sort(&table, &kept, "goals", SortDirection::Descending).unwrap();
    assert_eq!(names(&table, &descending), vec!["Amy", "Bob"]);
}

#[test]
fn test_no_match_is_empty() {
    let table = skaters();
    assert!(filter(&table, "zz-no-match", &searchable()).is_empty());
}

#[test]
fn test_empty_query_keeps_everything() {
    let table = skaters();
    assert_eq!(filter(&table, "", &searchable()), vec![0, 1, 2, 3, 4]);
}

#[test]
fn test_filter_matches_any_searchable_column() {
    let table = skaters();
    // "gull" hits a team name and a player name
    let kept = filter(&table, "GULL", &searchable());
    assert_eq!(names(&table, &kept), vec!["Marek Halloway", "Tomas Gull"]);

    let kept = filter(&table, "brook", &searchable());
    assert_eq!(names(&table, &kept), vec!["Lena Brook"]);
}

#[test]
fn test_filter_result_is_exactly_the_matching_rows() {
    let table = skaters();
    let query = "er";
    let kept = filter(&table, query, &searchable());
    let player = table.column_index("player").unwrap();
    let team = table.column_index("team").unwrap();
    for i in 0..table.len() {
        let matches = [player, team].iter().any(|&c| {
            table
                .cell(i, c)
                .display()
                .to_lowercase()
                .contains(query)
        });
        assert_eq!(kept.contains(&i), matches, "row {}", i);
    }
}

#[test]
fn test_non_searchable_columns_are_ignored() {
    let table = skaters();
    // "17" only appears in the goals column
    assert!(filter(&table, "17", &searchable()).is_empty());
}

#[test]
fn test_descending_reverses_strict_numeric_order() {
    let table = skaters();
    let all = filter(&table, "", &searchable());
    let ascending = sort(&table, &all, "points", SortDirection::Ascending).unwrap();
    let mut descending = sort(&table, &all, "points", SortDirection::Descending).unwrap();
    descending.reverse();
    assert_eq!(ascending, descending);
}

#[test]
fn test_sort_is_idempotent() {
    let table = skaters();
    let all = filter(&table, "", &searchable());
    let once = sort(&table, &all, "goals", SortDirection::Descending).unwrap();
    let twice = sort(&table, &once, "goals", SortDirection::Descending).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn test_sort_only_reorders_given_rows() {
    let table = skaters();
    let kept = filter(&table, "o", &searchable());
    let sorted = sort(&table, &kept, "goals", SortDirection::Ascending).unwrap();
    let mut a = kept.clone();
    let mut b = sorted.clone();
    a.sort_unstable();
    b.sort_unstable();
    assert_eq!(a, b);
}

#[test]
fn test_text_sort_is_case_insensitive() {
    let table = Table::from_records(
        &TableSchema::teams(),
        &records(vec![
            json!({"team": "otters"}),
            json!({"team": "Comets"}),
            json!({"team": "gulls"}),
            json!({"team": "Foxes"}),
        ]),
    );
    let rows = sort(&table, &[0, 1, 2, 3], "team", SortDirection::Ascending).unwrap();
    let team = table.column_index("team").unwrap();
    let order: Vec<String> = rows.iter().map(|&r| table.cell(r, team).display()).collect();
    assert_eq!(order, vec!["Comets", "Foxes", "gulls", "otters"]);
}

#[test]
fn test_text_sort_is_locale_aware() {
    let table = Table::from_records(
        &TableSchema::teams(),
        &records(vec![
            json!({"team": "Zurich"}),
            json!({"team": "Édmonton"}),
            json!({"team": "Florida"}),
        ]),
    );
    let team = table.column_index("team").unwrap();
    let order = |direction| -> Vec<String> {
        sort(&table, &[0, 1, 2], "team", direction)
            .unwrap()
            .iter()
            .map(|&r| table.cell(r, team).display())
            .collect()
    };
    assert_eq!(order(SortDirection::Ascending), vec!["Édmonton", "Florida", "Zurich"]);
    assert_eq!(order(SortDirection::Descending), vec!["Zurich", "Florida", "Édmonton"]);
}

#[test]
fn test_mixed_cells_have_a_total_order() {
    let table = Table::from_records(
        &TableSchema::teams(),
        &records(vec![
            json!({"team": "A", "wins": "n/a"}),
            json!({"team": "B"}),
            json!({"team": "C", "wins": 3}),
            json!({"team": "D", "wins": 1}),
        ]),
    );
    let wins = table.column_index("wins").unwrap();
    assert!(matches!(table.cell(0, wins), CellValue::Text(_)));

    let ascending = sort(&table, &[0, 1, 2, 3], "wins", SortDirection::Ascending).unwrap();
    assert_eq!(ascending, vec![3, 2, 0, 1]);
    let descending = sort(&table, &[0, 1, 2, 3], "wins", SortDirection::Descending).unwrap();
    assert_eq!(descending, vec![1, 0, 2, 3]);
}

#[test]
fn test_ties_keep_input_order() {
    let table = Table::from_records(
        &TableSchema::teams(),
        &records(vec![
            json!({"team": "A", "wins": 2}),
            json!({"team": "B", "wins": 1}),
            json!({"team": "C", "wins": 2}),
            json!({"team": "D", "wins": 1}),
        ]),
    );
    let ascending = sort(&table, &[0, 1, 2, 3], "wins", SortDirection::Ascending).unwrap();
    assert_eq!(ascending, vec![1, 3, 0, 2]);
    let descending = sort(&table, &[0, 1, 2, 3], "wins", SortDirection::Descending).unwrap();
    assert_eq!(descending, vec![0, 2, 1, 3]);
}

#[test]
fn test_unknown_column_is_an_error() {
    let table = skaters();
    let err = sort(&table, &[0, 1], "plusMinus", SortDirection::Ascending).unwrap_err();
    assert_eq!(err.to_string(), "unknown column: plusMinus");
}
