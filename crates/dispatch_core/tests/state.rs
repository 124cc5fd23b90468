use dispatch_core::{DispatchPhase, DispatchState};

#[test]
fn phases_advance_in_order_only() {
    let mut phase = DispatchPhase::Idle;
    for next in [
        DispatchPhase::Enumerating,
        DispatchPhase::Dispatching,
        DispatchPhase::Draining,
        DispatchPhase::Done,
    ] {
        phase = phase.advance_to(next).unwrap();
    }
    assert_eq!(phase, DispatchPhase::Done);
    assert_eq!(phase.next(), None);
}

#[test]
fn skipping_a_phase_is_rejected() {
    let err = DispatchPhase::Enumerating
        .advance_to(DispatchPhase::Draining)
        .unwrap_err();
    assert_eq!(err.from, DispatchPhase::Enumerating);
    assert_eq!(err.to, DispatchPhase::Draining);
    assert!(DispatchPhase::Done.advance_to(DispatchPhase::Idle).is_err());
}

#[test]
fn completion_count_is_monotonic_and_capped() {
    let mut state = DispatchState::new(3);
    assert_eq!(state.complete_one(), Some(1));
    assert_eq!(state.complete_one(), Some(2));
    assert!(!state.is_finished());
    assert_eq!(state.complete_one(), Some(3));
    assert!(state.is_finished());
    assert_eq!(state.complete_one(), None);
    assert_eq!(state.completed(), 3);
    assert_eq!(state.total(), 3);
}

#[test]
fn empty_run_is_finished_from_the_start() {
    let mut state = DispatchState::new(0);
    assert!(state.is_finished());
    assert_eq!(state.complete_one(), None);
}
