//! Sequential Registry Tests
//!
//! Single-threaded baseline: a filename is present exactly between its
//! connect and its disconnect.

use crate::common::*;

#[test]
fn interspersed_reads() {
    let t = TestRegistry::new();

    for index in 0..ITERATIONS {
        let name = filename(index);
        assert!(t.registry.lookup(&name).is_none(), "{} present before connect", name);

        let conn = t.registry.connect(&name).unwrap();
        assert_eq!(conn.filename(), name);

        let found = t
            .registry
            .lookup(&name)
            .unwrap_or_else(|| panic!("{} connection not found", name));
        assert_eq!(found.filename(), name);
        assert_eq!(found, conn);
        assert_eq!(t.registry.count(), index + 1);
    }

    for index in 0..ITERATIONS {
        let name = filename(index);
        assert!(t.registry.lookup(&name).is_some(), "{} absent before disconnect", name);

        t.registry.disconnect(&name).unwrap();
        assert!(
            t.registry.lookup(&name).is_none(),
            "{} connection should have been removed",
            name
        );
        assert_eq!(t.registry.count(), ITERATIONS - index - 1);
    }

    assert_eq!(t.engine.close_count(), ITERATIONS);
}

#[test]
fn connect_disconnect_lookup_is_absent() {
    let t = TestRegistry::new();
    t.registry.connect("a.db").unwrap();
    t.registry.disconnect("a.db").unwrap();
    assert!(t.registry.lookup("a.db").is_none());
    assert!(!t.registry.contains("a.db"));
    assert!(t.registry.is_empty());
}

#[test]
fn reconnect_opens_a_new_entry() {
    let t = TestRegistry::new();
    let first = t.registry.connect("a.db").unwrap();
    t.registry.disconnect("a.db").unwrap();
    let second = t.registry.connect("a.db").unwrap();

    assert_ne!(first, second);
    assert!(second.serial() > first.serial());
    assert_eq!(t.engine.opens_for("a.db"), 2);
    assert_eq!(t.engine.closes_for("a.db"), 1);
}

#[test]
fn handle_access_is_serialized_per_connection() {
    let t = TestRegistry::new();
    let conn = t.registry.connect("counter.db").unwrap();
    let again = t.registry.lookup("counter.db").unwrap();

    conn.with(|h| h.touch()).unwrap();
    assert_eq!(again.with(|h| h.touch()).unwrap(), 2);
}

#[test]
fn failed_close_then_disconnect_all_recovers() {
    let t = TestRegistry::new();
    for index in 0..10 {
        t.registry.connect(&filename(index)).unwrap();
    }
    t.engine.fail_close(&filename(3));

    let err = t.registry.disconnect_all().unwrap_err();
    assert_eq!(err.id().map(|id| id.filename()), Some("database4"));
    assert_eq!(t.registry.count(), 1);
    assert_no_leaks(&t);

    t.engine.clear_faults();
    t.registry.disconnect_all().unwrap();
    assert_eq!(t.registry.count(), 0);
    assert_eq!(t.engine.live_count(), 0);
}
