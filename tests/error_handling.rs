mod common;

use arena_core::{ArenaConfig, Error, RowData, Scalar, UpdateSpec};
use arena_server::ApiError;
use arena_storage::{script, TableStore};
use axum::http::StatusCode;
use common::seeded_store;
use indexmap::indexmap;

#[test]
fn test_client_errors_are_distinguished() {
    assert!(Error::Validation("x".to_string()).is_client_error());
    assert!(Error::NotFound("x".to_string()).is_client_error());
    assert!(!Error::Database("x".to_string()).is_client_error());
    assert!(!Error::Configuration("x".to_string()).is_client_error());
}

#[test]
fn test_error_status_codes() {
    let cases = [
        (Error::Validation("missing".to_string()), StatusCode::BAD_REQUEST),
        (Error::NotFound("gone".to_string()), StatusCode::NOT_FOUND),
        (Error::Database("boom".to_string()), StatusCode::INTERNAL_SERVER_ERROR),
        (Error::Configuration("bad".to_string()), StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (err, status) in cases {
        assert_eq!(ApiError::from(err).status(), status);
    }
}

#[tokio::test]
async fn test_driver_message_is_preserved() {
    let store = seeded_store().await;
    let row: RowData = indexmap! {
        "riotID".to_string() => Scalar::from("NoLevel#1"),
    };
    match store.insert_row("Player", &row).await {
        Err(Error::Database(msg)) => {
            assert!(msg.starts_with("Failed to insert row: "));
            assert!(msg.contains("NOT NULL"));
        }
        other => panic!("Expected database error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_validation_precedes_database() {
    // The table does not exist, but the empty partition is reported first.
    let store = seeded_store().await;
    let spec: UpdateSpec = indexmap! { "new_rank".to_string() => Scalar::from("Gold") };
    assert!(matches!(
        store.update_row("NoSuchTable", &spec).await,
        Err(Error::Validation(_))
    ));
}

#[tokio::test]
async fn test_bad_script_reports_database_error() {
    let store = seeded_store().await;
    let db = store.database().clone();
    let result = script::run_script(&db, "INSERT INTO Nowhere VALUES (1);".to_string()).await;
    assert!(matches!(result, Err(Error::Database(_))));
    assert!(store.ping().await);
}

#[tokio::test]
async fn test_closed_pool_is_database_error() {
    let store = seeded_store().await;
    store.database().close().await;

    let err = store.describe_table("Player").await.unwrap_err();
    assert!(matches!(&err, Error::Database(msg) if msg.starts_with("Failed to acquire connection")));

    let masked = ApiError::masked(err, "Failed to fetch table headers.");
    assert_eq!(masked.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(masked.message(), "Failed to fetch table headers.");
}

#[test]
fn test_invalid_config_rejected() {
    let result = ArenaConfig::from_toml_str(
        r#"
        [database]
        min_connections = 5
        max_connections = 2
        "#,
    );
    assert!(matches!(result, Err(Error::Configuration(_))));

    let result = ArenaConfig::from_toml_str("[server]\nbind_port = 0\n");
    assert!(matches!(result, Err(Error::Configuration(_))));
}

#[test]
fn test_config_overrides_defaults() {
    let config = ArenaConfig::from_toml_str(
        r#"
        [server]
        enable_cors = false

        [database]
        url = "sqlite::memory:"
        init_script = "schema/arena.sql"
        "#,
    )
    .unwrap();
    assert!(!config.server.enable_cors);
    assert_eq!(config.server.bind_port, 8080);
    assert_eq!(config.database.max_connections, 3);
    assert_eq!(config.database.init_script.as_deref(), Some("schema/arena.sql"));
}

#[tokio::test]
async fn test_store_is_object_safe() {
    let store: Box<dyn TableStore> = Box::new(seeded_store().await);
    assert!(store.ping().await);
    assert_eq!(store.fetch_table("Agent").await.unwrap().row_count(), 4);
}
