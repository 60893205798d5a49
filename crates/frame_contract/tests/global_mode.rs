//! Process-wide mode changes. Kept to a single test so nothing else in this
//! binary observes the global mode mid-change.

use frame_contract::{
    get_mode, scoped_mode, set_mode, ContractConfig, ContractError, Mode,
};
use std::thread;

#[test]
fn test_global_mode_lifecycle() {
    // Set by name, case-insensitively.
    assert_eq!(set_mode("RAISE").unwrap(), Mode::Raise);
    assert_eq!(get_mode(), Mode::Raise);

    // Other threads see the global mode.
    let seen = thread::spawn(get_mode).join().unwrap();
    assert_eq!(seen, Mode::Raise);

    let err = set_mode("loud").unwrap_err();
    assert!(matches!(err, ContractError::InvalidMode(_)));
    assert_eq!(get_mode(), Mode::Raise);

    // Inside a scope set_mode replaces the override only.
    {
        let _scope = scoped_mode(Mode::Warn).unwrap();
        assert_eq!(set_mode(Mode::Critical).unwrap(), Mode::Critical);
        assert_eq!(get_mode(), Mode::Critical);
        assert_eq!(thread::spawn(get_mode).join().unwrap(), Mode::Raise);
    }
    assert_eq!(get_mode(), Mode::Raise);

    assert_eq!(ContractConfig::from_env_value(Some("warning")).apply(), Mode::Warn);
    assert_eq!(get_mode(), Mode::Warn);

    assert_eq!(ContractConfig::default().apply(), Mode::Silent);
    assert_eq!(get_mode(), Mode::Silent);
}
