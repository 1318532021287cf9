use std::sync::Arc;

use d1_middleware::prelude::*;
use d1_middleware::registry;

// The registration count is process-wide, so the whole lifecycle lives in a
// single test to keep it deterministic under the parallel test runner.
#[test]
fn registration_is_reference_counted() {
    let stub = Arc::new(StubDatabase::new());

    assert!(!registry::is_registered());
    let err = match registry::create_driver(D1ConnectionOptions::new(stub.clone())) {
        Ok(_) => panic!("expected unregistered driver creation to fail"),
        Err(err) => err,
    };
    assert!(matches!(err, D1MiddlewareError::ValidationError(_)));

    assert_eq!(registry::register(), 1);
    assert_eq!(registry::register(), 2);
    assert!(registry::is_registered());

    // Options validation still applies once registered.
    assert!(registry::create_driver(D1ConnectionOptions::default()).is_err());
    assert!(registry::create_driver(D1ConnectionOptions::new(stub.clone())).is_ok());

    // Nested unregistration: still registered until the count drains.
    assert_eq!(registry::unregister(), 1);
    assert!(registry::is_registered());
    assert!(registry::create_driver(D1ConnectionOptions::new(stub.clone())).is_ok());

    assert_eq!(registry::unregister(), 0);
    assert!(!registry::is_registered());

    // Unregistering below zero saturates instead of wrapping.
    assert_eq!(registry::unregister(), 0);
    assert!(registry::create_driver(D1ConnectionOptions::new(stub)).is_err());
}
