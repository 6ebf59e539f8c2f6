use arena_core::{Error, FilterSet, RowData, Scalar, UpdateSpec};
use arena_query::{
    build_delete, build_insert, build_select, build_update, to_named_records, Placeholder,
    QueryBuilder,
};
use indexmap::indexmap;

fn text(s: &str) -> Scalar {
    Scalar::from(s)
}

#[test]
fn test_insert_player_scenario() {
    let row: RowData = indexmap! {
        "riotID".to_string() => text("Abc#123"),
        "rank".to_string() => text("Gold"),
    };
    let plan = build_insert("Player", &row).unwrap();
    assert_eq!(plan.sql, "INSERT INTO Player (riotID, rank) VALUES (:1, :2)");
    assert_eq!(plan.binds, vec![text("Abc#123"), text("Gold")]);
}

#[test]
fn test_update_rank_scenario() {
    let spec: UpdateSpec = indexmap! {
        "old_rank".to_string() => text("Gold"),
        "new_rank".to_string() => text("Platinum"),
    };
    let plan = build_update("Player", &spec).unwrap();
    assert_eq!(plan.sql, "UPDATE Player SET rank = :1 WHERE rank = :2");
    assert_eq!(plan.binds, vec![text("Platinum"), text("Gold")]);
}

#[test]
fn test_empty_filter_select_scenario() {
    let plan = build_select("Player", &FilterSet::new());
    assert_eq!(plan.sql, "SELECT * FROM Player");
    assert!(plan.binds.is_empty());
}

#[test]
fn test_delete_single_key() {
    let plan = build_delete("Player", "riotID", text("nonexistent"));
    assert_eq!(plan.sql, "DELETE FROM Player WHERE riotID = :1");
    assert_eq!(plan.binds, vec![text("nonexistent")]);
}

#[test]
fn test_identifier_casing_passes_through() {
    let filters: FilterSet = indexmap! { "RiotId".to_string() => text("x") };
    let plan = build_select("pLaYeR", &filters);
    assert_eq!(plan.sql, "SELECT * FROM pLaYeR WHERE RiotId = :1");
}

#[test]
fn test_empty_string_values_are_bound() {
    let spec: UpdateSpec = indexmap! {
        "new_rank".to_string() => text(""),
        "old_riotID".to_string() => text(""),
    };
    let plan = build_update("Player", &spec).unwrap();
    assert_eq!(plan.binds, vec![text(""), text("")]);
}

#[test]
fn test_update_missing_partition_is_validation_error() {
    let spec: UpdateSpec = indexmap! { "rank".to_string() => text("Gold") };
    assert!(matches!(build_update("Player", &spec), Err(Error::Validation(_))));
}

#[test]
fn test_placeholder_styles_share_numbering() {
    let row: RowData = indexmap! {
        "riotID".to_string() => text("Abc#123"),
        "accountLevel".to_string() => Scalar::Int(45),
    };
    let colon = QueryBuilder::new(Placeholder::Colon).insert("Player", &row).unwrap();
    let question = QueryBuilder::new(Placeholder::Question).insert("Player", &row).unwrap();
    let dollar = QueryBuilder::new(Placeholder::Dollar).insert("Player", &row).unwrap();

    assert_eq!(question.sql, "INSERT INTO Player (riotID, accountLevel) VALUES (?1, ?2)");
    assert_eq!(dollar.sql, "INSERT INTO Player (riotID, accountLevel) VALUES ($1, $2)");
    assert_eq!(colon.binds, question.binds);
    assert_eq!(question.binds, dollar.binds);
}

#[test]
fn test_display_sql_for_logs() {
    let spec: UpdateSpec = indexmap! {
        "new_accountLevel".to_string() => Scalar::Int(46),
        "old_riotID".to_string() => text("Abc#123"),
    };
    let plan = QueryBuilder::new(Placeholder::Question).update("Player", &spec).unwrap();
    assert_eq!(
        plan.display_sql(),
        "UPDATE Player SET accountLevel = 46 WHERE riotID = 'Abc#123'"
    );
}

#[test]
fn test_named_records_follow_field_list() {
    let rows = vec![
        vec![text("Jett"), Scalar::Int(77), Scalar::Int(36)],
        vec![text("Sage"), Scalar::Int(8), Scalar::Int(17)],
    ];
    let records = to_named_records(rows, &["agentName", "totalKills", "totalDeaths"]);
    assert_eq!(records.len(), 2);
    assert_eq!(records[1]["agentName"], text("Sage"));
    assert_eq!(records[1]["totalDeaths"], Scalar::Int(17));
}
