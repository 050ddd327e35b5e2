/// Integration tests for the capture lifecycle state machine
use livecap::state::{CaptureState, StateError, StateManager};

#[test]
fn test_lifecycle_happy_path() {
    println!("\n=== Lifecycle Happy Path ===");

    let manager = StateManager::new();
    assert!(manager.current().is_idle());

    let chain = [
        CaptureState::AcquiringDevice,
        CaptureState::AwaitingSessionStart,
        CaptureState::Streaming,
        CaptureState::Stopping,
        CaptureState::Idle,
    ];

    for state in chain {
        let name = state.name();
        manager.transition(state).unwrap();
        println!("  -> {}", name);
    }

    assert!(manager.current().is_idle());
    println!("✓ Idle -> ... -> Streaming -> ... -> Idle");
}

#[test]
fn test_is_capturing_per_state() {
    println!("\n=== is_capturing Test ===");

    assert!(!CaptureState::Idle.is_capturing());
    assert!(CaptureState::AcquiringDevice.is_capturing());
    assert!(CaptureState::AwaitingSessionStart.is_capturing());
    assert!(CaptureState::Streaming.is_capturing());
    assert!(CaptureState::Stopping.is_capturing());
    assert!(!CaptureState::error("x").is_capturing());

    println!("✓ Only Idle and Error report not capturing");
}

#[test]
fn test_stop_reachable_from_every_active_state() {
    println!("\n=== Stop Reachability Test ===");

    let setups: Vec<Vec<CaptureState>> = vec![
        vec![CaptureState::AcquiringDevice],
        vec![CaptureState::AcquiringDevice, CaptureState::AwaitingSessionStart],
        vec![
            CaptureState::AcquiringDevice,
            CaptureState::AwaitingSessionStart,
            CaptureState::Streaming,
        ],
        vec![CaptureState::AcquiringDevice, CaptureState::error("failed")],
    ];

    for setup in setups {
        let manager = StateManager::new();
        for state in setup {
            manager.transition(state).unwrap();
        }

        manager.transition(CaptureState::Stopping).unwrap();
        manager.transition(CaptureState::Idle).unwrap();
        assert!(manager.current().is_idle());
    }

    println!("✓ Stopping -> Idle reachable from every non-idle state");
}

#[test]
fn test_illegal_shortcuts_rejected() {
    println!("\n=== Illegal Transition Test ===");

    let manager = StateManager::new();

    for illegal in [
        CaptureState::AwaitingSessionStart,
        CaptureState::Streaming,
        CaptureState::Stopping,
        CaptureState::error("no"),
    ] {
        let result = manager.transition(illegal);
        assert!(
            matches!(result, Err(StateError::InvalidTransition { .. })),
            "Idle must not jump ahead"
        );
        assert!(manager.current().is_idle(), "failed transition changes nothing");
    }

    println!("✓ Invalid edges rejected without state change");
}

#[test]
fn test_error_carries_reason() {
    println!("\n=== Error Reason Test ===");

    let manager = StateManager::new();
    manager.transition(CaptureState::AcquiringDevice).unwrap();
    manager
        .transition(CaptureState::error("connection refused"))
        .unwrap();

    let current = manager.current();
    assert_eq!(current.error_reason(), Some("connection refused"));
    assert!(!current.is_capturing());

    println!("✓ Error reason preserved: {:?}", current.error_reason());
}
