//! Global subscriber installation. Lives in its own test binary because the
//! global default can only be set once per process.

use frame_contract_logging::{init_logging, LogConfig};

#[test]
fn test_init_logging_once() {
    init_logging(LogConfig::new("init-test")).unwrap();

    let err = init_logging(LogConfig::new("init-test").verbose(true)).unwrap_err();
    assert!(err.to_string().contains("init-test"));
}
