use futures::executor::block_on;
use lingostreak_core::audit::screen_at as screen;
use lingostreak_core::memory::{DEMO_EMAIL, DEMO_PASSWORD, DEMO_PUBLIC_EMAIL};
use lingostreak_core::{
    AuthEvent, AuthFailure, BackendError, BackendErrorKind, GateInput, InMemoryBackend,
    ProfileDraft, Screen, ScreenKind, SessionStore, SignUpOutcome, SnapshotRecorder, ThemeMode,
    resolve,
};
use std::rc::Rc;

fn store_over(backend: &Rc<InMemoryBackend>) -> SessionStore {
    SessionStore::new(backend.clone(), ThemeMode::Light)
}

#[test]
fn scenario_a_no_persisted_session_reaches_auth() {
    let backend = Rc::new(InMemoryBackend::demo());
    let store = store_over(&backend);
    assert_eq!(screen(&store, "/dashboard"), ScreenKind::Loading);
    let seen = SnapshotRecorder::attach(&store);

    block_on(store.bootstrap());

    assert_eq!(screen(&store, "/dashboard"), ScreenKind::Auth);
    assert_eq!(seen.len(), 1);
    seen.check().unwrap();
}

#[test]
fn scenario_b_password_sign_in_without_profile_reaches_onboarding() {
    let backend = Rc::new(InMemoryBackend::demo());
    let store = store_over(&backend);
    block_on(async {
        let mut events = store.bootstrap().await;
        let session = store
            .sign_in_with_password("user@example.com", "secret1")
            .await
            .unwrap();
        assert_eq!(session.email(), Some(DEMO_EMAIL));
        store.process_pending(&mut events).await;
    });
    let snapshot = store.snapshot();
    assert!(snapshot.signed_in());
    assert!(!snapshot.profile_pending);
    assert_eq!(screen(&store, "/dashboard"), ScreenKind::Onboarding);
    assert_eq!(backend.profile_fetches(), 1);
}

#[test]
fn scenario_c_onboarding_completes_without_reload() {
    let backend = Rc::new(InMemoryBackend::demo());
    let store = store_over(&backend);
    let seen = SnapshotRecorder::attach(&store);
    block_on(async {
        store.bootstrap().await;
        store
            .sign_in_with_password(DEMO_EMAIL, DEMO_PASSWORD)
            .await
            .unwrap();
        assert_eq!(screen(&store, "/tracker"), ScreenKind::Onboarding);

        let saved = store
            .complete_onboarding(ProfileDraft::new("learner_1", "fr"))
            .await
            .unwrap();
        assert_eq!(saved.username, "learner_1");
    });
    assert_eq!(
        resolve(GateInput::from_snapshot(&store.snapshot(), "/tracker")),
        Screen::App(lingostreak_core::Destination {
            route: lingostreak_core::AppRoute::Tracker,
            redirected: false,
        })
    );
    let user = backend.user_id_for(DEMO_EMAIL).unwrap();
    assert!(backend.stored_profile(&user).is_some());
    seen.check().unwrap();
}

#[test]
fn scenario_d_public_profile_without_session() {
    let backend = Rc::new(InMemoryBackend::demo());
    let store = store_over(&backend);
    block_on(store.bootstrap());
    assert_eq!(screen(&store, "/profile/alice"), ScreenKind::PublicProfile);
    let profile = block_on(store.public_profile("alice")).unwrap().unwrap();
    assert_eq!(profile.username, "alice");
    assert_eq!(block_on(store.public_profile("nobody")).unwrap(), None);
}

#[test]
fn scenario_e_late_profile_response_after_sign_out_is_discarded() {
    let backend = Rc::new(InMemoryBackend::demo());
    let store = store_over(&backend);
    let seen = SnapshotRecorder::attach(&store);
    block_on(async {
        store.bootstrap().await;
        store
            .sign_in_with_password(DEMO_PUBLIC_EMAIL, DEMO_PASSWORD)
            .await
            .unwrap();
        assert_eq!(screen(&store, "/dashboard"), ScreenKind::App);

        backend.hold_profile_fetches();
        futures::join!(store.reload_profile(), async {
            assert_eq!(backend.held_profile_fetches(), 1);
            store.sign_out().await;
            assert_eq!(screen(&store, "/dashboard"), ScreenKind::Auth);
            backend.release_profile_fetches();
        });
    });
    let snapshot = store.snapshot();
    assert!(snapshot.session.is_none());
    assert!(snapshot.profile.is_none());
    assert_eq!(screen(&store, "/dashboard"), ScreenKind::Auth);
    seen.check().unwrap();
}

#[test]
fn sign_out_twice_equals_once() {
    let backend = Rc::new(InMemoryBackend::demo());
    let store = store_over(&backend);
    block_on(async {
        store.bootstrap().await;
        store
            .sign_in_with_password(DEMO_PUBLIC_EMAIL, DEMO_PASSWORD)
            .await
            .unwrap();
        store.sign_out().await;
        let once = store.snapshot();
        store.sign_out().await;
        assert_eq!(store.snapshot(), once);
    });
    assert_eq!(backend.sign_out_calls(), 1);
}

#[test]
fn rejected_and_unavailable_sign_in_stay_signed_out() {
    let backend = Rc::new(InMemoryBackend::demo());
    let store = store_over(&backend);
    block_on(async {
        store.bootstrap().await;
        let err = store
            .sign_in_with_password(DEMO_EMAIL, "wrong-password")
            .await
            .unwrap_err();
        assert_eq!(err, AuthFailure::Rejected("Invalid login credentials".into()));

        let err = store.sign_in_with_password("", "").await.unwrap_err();
        assert!(err.is_rejection());

        backend.set_offline(true);
        let err = store
            .sign_in_with_password(DEMO_EMAIL, DEMO_PASSWORD)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthFailure::Unavailable(_)));
    });
    assert_eq!(screen(&store, "/dashboard"), ScreenKind::Auth);
}

#[test]
fn sign_up_pending_confirmation_stays_on_auth() {
    let backend = Rc::new(InMemoryBackend::demo().requiring_confirmation());
    let store = store_over(&backend);
    let outcome = block_on(async {
        store.bootstrap().await;
        store.sign_up("fresh@example.com", "secret1").await.unwrap()
    });
    assert_eq!(
        outcome,
        SignUpOutcome::ConfirmationPending {
            email: "fresh@example.com".into()
        }
    );
    assert_eq!(screen(&store, "/dashboard"), ScreenKind::Auth);
}

#[test]
fn failed_oauth_callback_is_reported_on_auth_screen() {
    let backend = Rc::new(InMemoryBackend::demo().with_failing_restore(BackendError::new(
        BackendErrorKind::Unauthorized,
        "Access denied by Google",
    )));
    let store = store_over(&backend);
    let seen = SnapshotRecorder::attach(&store);
    block_on(store.bootstrap());

    assert_eq!(screen(&store, "/dashboard"), ScreenKind::Auth);
    assert_eq!(
        store.snapshot().notice.as_deref(),
        Some("Access denied by Google")
    );
    seen.check().unwrap();

    block_on(store.sign_in_with_password(DEMO_PUBLIC_EMAIL, DEMO_PASSWORD)).unwrap();
    assert!(store.snapshot().notice.is_none());
    assert_eq!(screen(&store, "/dashboard"), ScreenKind::App);
}

#[test]
fn degraded_profile_fetch_lands_on_onboarding_with_notice() {
    let backend = Rc::new(InMemoryBackend::demo());
    let store = store_over(&backend);
    block_on(async {
        store.bootstrap().await;
        backend.fail_next_profile_fetches(1);
        store
            .sign_in_with_password(DEMO_PUBLIC_EMAIL, DEMO_PASSWORD)
            .await
            .unwrap();
    });
    let snapshot = store.snapshot();
    assert!(snapshot.notice.is_some());
    assert_eq!(screen(&store, "/dashboard"), ScreenKind::Onboarding);

    block_on(store.reload_profile());
    assert_eq!(screen(&store, "/dashboard"), ScreenKind::App);
    store.dismiss_notice();
    assert!(store.snapshot().notice.is_none());
}

#[test]
fn google_sign_in_arrives_through_events() {
    let backend = Rc::new(InMemoryBackend::demo());
    let store = store_over(&backend);
    block_on(async {
        let mut events = store.bootstrap().await;
        store.sign_in_with_google().await.unwrap();
        assert_eq!(screen(&store, "/feed"), ScreenKind::Auth);
        assert_eq!(store.process_pending(&mut events).await, 1);
    });
    assert_eq!(screen(&store, "/feed"), ScreenKind::App);
}

#[test]
fn persisted_session_is_restored() {
    let backend = Rc::new(InMemoryBackend::demo().with_persisted_session(DEMO_PUBLIC_EMAIL));
    let store = store_over(&backend);
    block_on(store.bootstrap());
    assert_eq!(screen(&store, "/leaderboard"), ScreenKind::App);
    assert_eq!(screen(&store, "/"), ScreenKind::App);
}

#[test]
fn token_refresh_keeps_profile() {
    let backend = Rc::new(InMemoryBackend::demo());
    let store = store_over(&backend);
    block_on(async {
        let mut events = store.bootstrap().await;
        let mut session = store
            .sign_in_with_password(DEMO_PUBLIC_EMAIL, DEMO_PASSWORD)
            .await
            .unwrap();
        session.access_token = String::from("rotated");
        backend.push_event(&AuthEvent::refreshed(session));
        store.process_pending(&mut events).await;
    });
    let snapshot = store.snapshot();
    assert_eq!(
        snapshot.session.as_ref().map(|s| s.access_token.as_str()),
        Some("rotated")
    );
    assert!(snapshot.onboarded());
    assert_eq!(backend.profile_fetches(), 1);
}

#[test]
fn external_sign_out_event_clears_everything() {
    let backend = Rc::new(InMemoryBackend::demo());
    let store = store_over(&backend);
    let seen = SnapshotRecorder::attach(&store);
    block_on(async {
        let mut events = store.bootstrap().await;
        store
            .sign_in_with_password(DEMO_PUBLIC_EMAIL, DEMO_PASSWORD)
            .await
            .unwrap();
        backend.push_event(&AuthEvent::signed_out());
        store.process_pending(&mut events).await;
    });
    assert_eq!(screen(&store, "/dashboard"), ScreenKind::Auth);
    seen.check().unwrap();
}

#[test]
fn onboarding_requires_a_session() {
    let backend = Rc::new(InMemoryBackend::demo());
    let store = store_over(&backend);
    block_on(store.bootstrap());
    let err = block_on(store.complete_onboarding(ProfileDraft::new("nobody_here", "de"))).unwrap_err();
    assert_eq!(err, AuthFailure::NotSignedIn);
}

#[test]
fn theme_toggles_and_notifies_once() {
    let backend = Rc::new(InMemoryBackend::new());
    let store = store_over(&backend);
    let seen = SnapshotRecorder::attach(&store);
    assert_eq!(store.toggle_theme(), ThemeMode::Dark);
    store.set_theme(ThemeMode::Dark);
    assert_eq!(seen.len(), 1);
    assert_eq!(store.snapshot().theme, ThemeMode::Dark);
}

#[test]
fn run_loop_applies_events_until_channel_closes() {
    let backend = Rc::new(InMemoryBackend::demo());
    let store = store_over(&backend);
    let (sender, events) = lingostreak_core::auth_channel();
    let alice = backend.user_id_for(DEMO_PUBLIC_EMAIL).unwrap();
    let session = lingostreak_core::Session::bearer("t", alice, None);
    sender.unbounded_send(AuthEvent::signed_in(session)).unwrap();
    drop(sender);
    block_on(store.run(events));
    let snapshot = store.snapshot();
    assert!(snapshot.initial_load_complete);
    assert!(snapshot.onboarded());
}
