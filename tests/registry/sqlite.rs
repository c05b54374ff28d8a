//! SQLite Registry Tests
//!
//! The registry over real database files in a temporary directory.

use crate::common::*;
use connreg::{SqliteConfig, SqliteEngine, MEMORY_FILENAME};
use tempfile::TempDir;

const FILES: usize = 100;

fn sqlite_registry(dir: &TempDir) -> ConnectionRegistry<SqliteEngine> {
    connreg::init_tracing("warn");
    ConnectionRegistry::new(SqliteEngine::in_dir(dir.path()))
}

#[test]
fn concurrent_connects_create_database_files() {
    let dir = TempDir::new().unwrap();
    let registry = sqlite_registry(&dir);

    concurrent_perform(FILES, |index| {
        let name = filename(index);
        let conn = registry.connect(&name).unwrap();
        assert_eq!(conn.filename(), name);
        conn.with(|db| db.execute_batch("CREATE TABLE IF NOT EXISTS t (x INTEGER)"))
            .unwrap()
            .unwrap();
    });

    assert_eq!(registry.count(), FILES);
    for index in 0..FILES {
        assert!(dir.path().join(filename(index)).exists());
    }

    registry.disconnect_all().unwrap();
    assert_eq!(registry.count(), 0);
}

#[test]
fn racing_connects_share_one_sqlite_connection() {
    let dir = TempDir::new().unwrap();
    let registry = sqlite_registry(&dir);

    concurrent_perform(64, |index| {
        let conn = registry.connect("shared.db").unwrap();
        conn.with(|db| {
            db.execute_batch("CREATE TABLE IF NOT EXISTS hits (i INTEGER)")?;
            db.execute("INSERT INTO hits (i) VALUES (?1)", [index as i64])
        })
        .unwrap()
        .unwrap();
    });

    assert_eq!(registry.stats().opens, 1);
    let conn = registry.lookup("shared.db").unwrap();
    let hits: i64 = conn
        .with(|db| db.query_row("SELECT COUNT(*) FROM hits", [], |row| row.get(0)))
        .unwrap()
        .unwrap();
    assert_eq!(hits, 64);
}

#[test]
fn data_survives_disconnect_and_reconnect() {
    let dir = TempDir::new().unwrap();
    let registry = sqlite_registry(&dir);

    let conn = registry.connect("keep.db").unwrap();
    conn.with(|db| db.execute_batch("CREATE TABLE kv (k TEXT, v TEXT); INSERT INTO kv VALUES ('a', 'b');"))
        .unwrap()
        .unwrap();
    registry.disconnect("keep.db").unwrap();
    assert!(matches!(conn.with(|_| ()), Err(Error::Disconnected(_))));

    let conn = registry.connect("keep.db").unwrap();
    let v: String = conn
        .with(|db| db.query_row("SELECT v FROM kv WHERE k = 'a'", [], |row| row.get(0)))
        .unwrap()
        .unwrap();
    assert_eq!(v, "b");
}

#[test]
fn open_failure_is_reported_with_identifier() {
    let dir = TempDir::new().unwrap();
    let engine = SqliteEngine::new(SqliteConfig::in_dir(dir.path()).read_only(true));
    let registry = ConnectionRegistry::new(engine);

    let err = registry.connect("missing.db").unwrap_err();
    match err {
        Error::EngineOpenFailed { id, .. } => assert_eq!(id.filename(), "missing.db"),
        other => panic!("expected EngineOpenFailed, got {}", other),
    }
    assert_eq!(registry.count(), 0);
}

#[test]
fn memory_databases_are_per_registry_entry() {
    let registry = ConnectionRegistry::new(SqliteEngine::default());
    let conn = registry.connect(MEMORY_FILENAME).unwrap();
    conn.with(|db| db.execute_batch("CREATE TABLE m (x INTEGER)"))
        .unwrap()
        .unwrap();
    assert_eq!(registry.connect(MEMORY_FILENAME).unwrap(), conn);
    registry.disconnect(MEMORY_FILENAME).unwrap();
    assert!(registry.is_empty());
}

#[test]
fn config_file_drives_registry() {
    let dir = TempDir::new().unwrap();
    let db_dir = dir.path().join("dbs");
    let config_path = dir.path().join(connreg::CONFIG_FILE_NAME);
    std::fs::write(
        &config_path,
        format!(
            "max_connections = 2\n\n[sqlite]\nbase_dir = {:?}\n",
            db_dir.to_str().unwrap()
        ),
    )
    .unwrap();

    let config = RegistryConfig::from_file(&config_path).unwrap();
    let engine = SqliteEngine::new(config.sqlite.clone());
    let registry = ConnectionRegistry::with_config(engine, config).unwrap();

    registry.connect("one.db").unwrap();
    registry.connect("two.db").unwrap();
    assert!(matches!(
        registry.connect("three.db"),
        Err(Error::CapacityExceeded { limit: 2, .. })
    ));
    assert!(db_dir.join("one.db").exists());
    assert!(!db_dir.join("three.db").exists());
}
