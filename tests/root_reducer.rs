mod common;

use serde_json::json;
use stockroom::mvi::Action;
use stockroom::slices::{root_reducer, SessionReducer, UserReducer};
use stockroom::store::{AppState, StateReducer};

fn script() -> Vec<Action> {
    vec![
        common::login("u1", "staff"),
        Action::new("session/setFilter").with_payload(json!({ "kind": "import", "search": "bolts" })),
        Action::new("session/setPage").with_payload(json!({ "page": 3 })),
        Action::new("inventory/loaded").with_payload(json!({ "rows": 42 })),
        Action::new("user/update").with_payload(json!({ "warehouse": "north" })),
        Action::new("user/logout"),
        common::login("u2", "manager"),
    ]
}

fn replay(actions: &[Action]) -> AppState {
    let root = root_reducer().unwrap();
    actions.iter().fold(root.initial_state(), |state, action| {
        root.reduce(&state, action).unwrap()
    })
}

#[test]
fn initial_state_has_every_slice() {
    let state = root_reducer().unwrap().initial_state();
    let keys: Vec<_> = state.keys().collect();
    assert_eq!(keys, vec!["session", "user"]);
    assert!(!state.slice::<UserReducer>().is_authenticated());
}

#[test]
fn unknown_action_keeps_every_reference() {
    let root = root_reducer().unwrap();
    let state = root
        .reduce(&root.initial_state(), &common::login("u1", "staff"))
        .unwrap();
    let next = root.reduce(&state, &Action::new("inventory/loaded")).unwrap();

    assert!(next.ptr_eq(&state));
    assert!(next.slice_ptr_eq(&state, "user"));
    assert!(next.slice_ptr_eq(&state, "session"));
}

#[test]
fn only_the_matching_slice_changes() {
    let root = root_reducer().unwrap();
    let state = root.initial_state();
    let next = root
        .reduce(
            &state,
            &Action::new("session/setPage").with_payload(json!({ "page": 2 })),
        )
        .unwrap();

    assert!(!next.ptr_eq(&state));
    assert!(next.slice_ptr_eq(&state, "user"));
    assert!(!next.slice_ptr_eq(&state, "session"));
}

#[test]
fn replay_is_deterministic() {
    let actions = script();
    let first = replay(&actions);
    let second = replay(&actions);

    assert_eq!(first.slice::<UserReducer>(), second.slice::<UserReducer>());
    assert_eq!(first.slice::<SessionReducer>(), second.slice::<SessionReducer>());
    assert_eq!(
        first.slice::<UserReducer>().current().unwrap().id,
        "u2"
    );
}

#[test]
fn every_prefix_replays_identically() {
    let actions = script();
    for end in 0..=actions.len() {
        let a = replay(&actions[..end]);
        let b = replay(&actions[..end]);
        assert_eq!(a.slice::<UserReducer>(), b.slice::<UserReducer>());
        assert_eq!(a.slice::<SessionReducer>(), b.slice::<SessionReducer>());
    }
}

#[test]
fn failing_slice_aborts_the_whole_action() {
    let root = root_reducer().unwrap();
    let state = root.initial_state();
    let result = root.reduce(&state, &Action::new("user/login"));
    assert!(result.is_err());
}
