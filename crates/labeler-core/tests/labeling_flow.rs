use labeler_core::{
    Action, ActionOutcome, LabelCode, LabelSession, MemorySpotStore, Spot, spots_from_labels,
};

fn raws(session: &LabelSession) -> Vec<i8> {
    session.labels().codes().iter().map(|c| c.as_raw()).collect()
}

fn apply(session: &mut LabelSession, store: &mut MemorySpotStore, action: Action) -> ActionOutcome {
    session.apply(action, store).unwrap()
}

/// Whenever no interval is pending, every start has a unique matching end
/// with inner codes filling the span exclusively.
fn assert_balanced(session: &LabelSession) {
    assert!(!session.waiting_end());
    assert_eq!(
        session.labels().count(LabelCode::IntervalStart),
        session.labels().count(LabelCode::IntervalEnd)
    );
    // The canonical encoding accepts exactly the structurally valid arrays.
    spots_from_labels(session.labels()).unwrap();
}

#[test]
fn test_label_two_intervals_then_edit_them() {
    let mut store = MemorySpotStore::default();
    let mut session = LabelSession::new(20);
    session.set_loaded_count(20);

    // First interval: 3..8.
    apply(&mut session, &mut store, Action::Step { delta: 3 });
    assert_eq!(apply(&mut session, &mut store, Action::Begin), ActionOutcome::Applied);
    apply(&mut session, &mut store, Action::Step { delta: 5 });
    assert_eq!(apply(&mut session, &mut store, Action::End), ActionOutcome::Applied);
    assert_balanced(&session);

    // Second interval: 12..15.
    apply(&mut session, &mut store, Action::Step { delta: 4 });
    apply(&mut session, &mut store, Action::Begin);
    apply(&mut session, &mut store, Action::Step { delta: 3 });
    apply(&mut session, &mut store, Action::End);
    assert_balanced(&session);
    assert_eq!(
        spots_from_labels(session.labels()).unwrap(),
        vec![Spot::new(3, 8), Spot::new(12, 15)]
    );

    // Reopen the second interval at its end mark and close it earlier.
    assert_eq!(apply(&mut session, &mut store, Action::End), ActionOutcome::Applied);
    assert!(session.waiting_end());
    apply(&mut session, &mut store, Action::Step { delta: -1 });
    assert_eq!(session.cursor(), 14);
    assert_eq!(apply(&mut session, &mut store, Action::End), ActionOutcome::Applied);
    assert_balanced(&session);
    assert_eq!(
        spots_from_labels(session.labels()).unwrap(),
        vec![Spot::new(3, 8), Spot::new(12, 14)]
    );

    // Delete the first interval from an inner position.
    apply(&mut session, &mut store, Action::Step { delta: -9 });
    assert_eq!(session.cursor(), 5);
    assert_eq!(apply(&mut session, &mut store, Action::Delete), ActionOutcome::Applied);
    assert_balanced(&session);
    assert_eq!(
        spots_from_labels(session.labels()).unwrap(),
        vec![Spot::new(12, 14)]
    );
}

#[test]
fn test_begin_begin_is_idempotent_cancelling() {
    let mut store = MemorySpotStore::default();
    let mut session = LabelSession::new(8);
    session.set_loaded_count(8);

    apply(&mut session, &mut store, Action::Step { delta: 4 });
    let before = raws(&session);
    apply(&mut session, &mut store, Action::Begin);
    apply(&mut session, &mut store, Action::Begin);
    assert_eq!(raws(&session), before);
    assert!(!session.waiting_end());
}

#[test]
fn test_reopen_is_left_inverse_of_commit() {
    let mut store = MemorySpotStore::default();
    let mut session = LabelSession::new(10);
    session.set_loaded_count(10);

    apply(&mut session, &mut store, Action::Step { delta: 2 });
    apply(&mut session, &mut store, Action::Begin);
    let opened = raws(&session);

    apply(&mut session, &mut store, Action::Step { delta: 4 });
    apply(&mut session, &mut store, Action::End);
    assert_eq!(raws(&session), vec![0, 0, 1, 3, 3, 3, -1, 0, 0, 0]);

    // Reopening at the end mark restores the just-opened shape.
    apply(&mut session, &mut store, Action::End);
    assert_eq!(raws(&session), opened);
    assert!(session.waiting_end());
    assert_eq!(session.state().pending_start, Some(2));
}

#[test]
fn test_partial_load_navigation() {
    let mut store = MemorySpotStore::default();
    // A prior save holds an interval past the loaded prefix.
    let mut session = LabelSession::from_spots(100, &[Spot::new(5, 50)]).unwrap();
    session.set_loaded_count(10);

    // Seek from the loaded-in start mark to its far end.
    apply(&mut session, &mut store, Action::Step { delta: 5 });
    assert_eq!(
        apply(&mut session, &mut store, Action::End),
        ActionOutcome::CursorMoved(50)
    );
    assert_eq!(session.cursor(), 50);

    // The next step re-enters the loaded prefix.
    assert_eq!(
        apply(&mut session, &mut store, Action::Step { delta: 1 }),
        ActionOutcome::CursorMoved(0)
    );

    // More frames arrive; the cursor can now reach further.
    session.set_loaded_count(60);
    apply(&mut session, &mut store, Action::Step { delta: -1 });
    assert_eq!(session.cursor(), 59);
}

#[test]
fn test_cursor_wraps_at_loaded_boundary() {
    let mut store = MemorySpotStore::default();
    let mut session = LabelSession::new(10);
    session.set_loaded_count(10);

    apply(&mut session, &mut store, Action::Step { delta: 9 });
    assert_eq!(session.cursor(), 9);
    assert_eq!(
        apply(&mut session, &mut store, Action::Step { delta: 1 }),
        ActionOutcome::CursorMoved(0)
    );
}

#[test]
fn test_actions_before_any_load_are_inert() {
    let mut store = MemorySpotStore::default();
    let mut session = LabelSession::new(10);

    assert_eq!(
        apply(&mut session, &mut store, Action::Step { delta: 1 }),
        ActionOutcome::CursorMoved(0)
    );
    // Labeling at position 0 still works once something loads.
    session.set_loaded_count(1);
    assert_eq!(apply(&mut session, &mut store, Action::Begin), ActionOutcome::Applied);
}
