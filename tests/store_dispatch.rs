mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::json;
use stockroom::mvi::Action;
use stockroom::slices::{root_reducer, SessionReducer, UserIntent, UserReducer};
use stockroom::store::{AppState, Middleware, Store, StoreError};

fn store() -> Store {
    Store::new(root_reducer().unwrap())
}

#[test]
fn dispatch_updates_state() {
    let store = store();
    store.dispatch(common::login("u1", "staff")).unwrap();
    let user = store.select::<UserReducer>();
    assert_eq!(user.current().unwrap().id, "u1");
}

#[test]
fn state_snapshots_are_immutable() {
    let store = store();
    let before = store.state();
    store.dispatch(common::login("u1", "staff")).unwrap();
    assert!(!before.slice::<UserReducer>().is_authenticated());
    assert!(store.state().slice::<UserReducer>().is_authenticated());
}

#[test]
fn listeners_see_the_updated_state() {
    let store = store();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let probe = store.clone();
    let sink = seen.clone();
    let _sub = store.subscribe(move |state| {
        // The store already holds the state passed to the listener.
        assert!(probe.state().ptr_eq(state));
        sink.lock().push(state.slice::<UserReducer>().is_authenticated());
    });

    store.dispatch(common::login("u1", "staff")).unwrap();
    store.dispatch(UserIntent::Logout).unwrap();
    assert_eq!(*seen.lock(), vec![true, false]);
}

#[test]
fn unsubscribe_detaches_listener() {
    let store = store();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let sub = store.subscribe(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    store.dispatch(Action::new("noop")).unwrap();
    assert!(sub.unsubscribe());
    store.dispatch(Action::new("noop")).unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(store.listener_count(), 0);
}

#[test]
fn reducer_error_propagates_and_keeps_state() {
    let store = store();
    store.dispatch(common::login("u1", "staff")).unwrap();
    let before = store.state();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let _sub = store.subscribe(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let err = store
        .dispatch(Action::new("session/setPage").with_payload(json!({ "page": 0 })))
        .unwrap_err();

    assert!(matches!(err, StoreError::Reduce(_)));
    assert!(store.state().ptr_eq(&before));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn reentrant_dispatch_fails_fast() {
    let store = store();
    let result = Arc::new(Mutex::new(None));
    let inner = store.clone();
    let slot = result.clone();
    let _sub = store.subscribe(move |_| {
        if slot.lock().is_none() {
            *slot.lock() = Some(inner.dispatch(UserIntent::Logout));
        }
    });

    store.dispatch(common::login("u1", "staff")).unwrap();

    let outcome = result.lock().take().unwrap();
    assert!(matches!(
        outcome,
        Err(StoreError::ReentrantDispatch { ref action, ref active })
            if action == "user/logout" && active == "user/login"
    ));
    // The outer dispatch still completed and the nested one had no effect.
    assert!(store.select::<UserReducer>().is_authenticated());
}

#[test]
fn dispatch_works_again_after_a_rejected_reentry() {
    let store = store();
    let inner = store.clone();
    let _sub = store.subscribe(move |_| {
        let _ = inner.dispatch(Action::new("noop"));
    });
    store.dispatch(Action::new("noop")).unwrap();
    store.dispatch(common::login("u1", "staff")).unwrap();
    assert!(store.select::<UserReducer>().is_authenticated());
}

#[test]
fn listener_can_hand_a_dispatch_to_another_thread() {
    let store = store();
    let handoff = Arc::new(Mutex::new(Vec::new()));
    let inner = store.clone();
    let pending = handoff.clone();
    let _sub = store.subscribe(move |state| {
        if state.slice::<UserReducer>().is_authenticated() {
            let store = inner.clone();
            // Not joined here: the spawned dispatch waits for this one.
            pending
                .lock()
                .push(std::thread::spawn(move || store.dispatch(UserIntent::Logout)));
        }
    });

    store.dispatch(common::login("u1", "staff")).unwrap();
    let handles: Vec<_> = handoff.lock().drain(..).collect();
    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    assert!(!store.select::<UserReducer>().is_authenticated());
}

#[test]
fn dispatches_from_other_threads_are_serialized() {
    let store = store();
    let handles: Vec<_> = (1..=8)
        .map(|page| {
            let store = store.clone();
            std::thread::spawn(move || {
                store
                    .dispatch(Action::new("session/setPage").with_payload(json!({ "page": page })))
                    .unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    let page = store.select::<SessionReducer>().page;
    assert!((1..=8).contains(&page));
}

struct Recorder {
    name: &'static str,
    log: Arc<Mutex<Vec<String>>>,
}

impl Middleware for Recorder {
    fn before(&self, _state: &AppState, action: Action) -> Option<Action> {
        self.log.lock().push(format!("{}:before:{}", self.name, action.kind()));
        Some(action)
    }

    fn after(&self, action: &Action, _previous: &AppState, _next: &AppState) {
        self.log.lock().push(format!("{}:after:{}", self.name, action.kind()));
    }
}

/// Swallows every action with the given tag.
struct Swallow(&'static str);

impl Middleware for Swallow {
    fn before(&self, _state: &AppState, action: Action) -> Option<Action> {
        (action.kind() != self.0).then_some(action)
    }
}

#[test]
fn middleware_runs_in_registration_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let store = Store::builder(root_reducer().unwrap())
        .middleware(Recorder {
            name: "a",
            log: log.clone(),
        })
        .middleware(Recorder {
            name: "b",
            log: log.clone(),
        })
        .build();

    store.dispatch(UserIntent::Logout).unwrap();

    assert_eq!(
        *log.lock(),
        vec![
            "a:before:user/logout",
            "b:before:user/logout",
            "a:after:user/logout",
            "b:after:user/logout",
        ]
    );
}

#[test]
fn middleware_can_swallow_actions() {
    let store = Store::builder(root_reducer().unwrap())
        .middleware(Swallow("user/login"))
        .build();
    let before = store.state();

    store.dispatch(common::login("u1", "staff")).unwrap();

    assert!(store.state().ptr_eq(&before));
}
