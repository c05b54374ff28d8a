//! Shared Registry Tests
//!
//! The process-wide registry. Only this test touches it, so the first `init`
//! in the binary is the one below.

use connreg::{shared, RegistryConfig, MEMORY_FILENAME};

#[test]
fn shared_registry_is_one_instance() {
    let config = RegistryConfig::default().with_max_connections(4);
    let first = shared::init(config).unwrap();
    let second = shared::init(RegistryConfig::default()).unwrap();

    assert!(std::ptr::eq(first, second));
    assert!(std::ptr::eq(first, shared::get()));
    assert!(std::ptr::eq(first, shared::try_get().unwrap()));
    // The first init's config wins
    assert_eq!(shared::get().config().max_connections, Some(4));

    let conn = shared::get().connect(MEMORY_FILENAME).unwrap();
    assert_eq!(shared::get().lookup(MEMORY_FILENAME), Some(conn));
    shared::get().disconnect_all().unwrap();
    assert_eq!(shared::get().count(), 0);
}
