//! Session store flows driven against the in-memory backend.
//!
//! Each check builds a fresh store, so iterations are independent. Flows that
//! do not depend on randomness ignore the seed.
use anyhow::{Context, Result, bail, ensure};
use futures::executor::block_on;
use lingostreak_core::memory::{DEMO_EMAIL, DEMO_PASSWORD, DEMO_PUBLIC_EMAIL, DEMO_PUBLIC_USERNAME};
use lingostreak_core::audit::screen_at;
use lingostreak_core::{
    AuthFailure, InMemoryBackend, ProfileDraft, ScreenKind, SessionStore, SignUpOutcome,
    ThemeMode,
};
use std::rc::Rc;

use crate::logic::{DEFAULT_STORM_STEPS, SnapshotRecorder, run_event_storm};

fn store_over(backend: &Rc<InMemoryBackend>) -> (SessionStore, SnapshotRecorder) {
    let store = SessionStore::new(backend.clone(), ThemeMode::Light);
    let recorder = SnapshotRecorder::attach(&store);
    (store, recorder)
}

fn expect_screen(store: &SessionStore, path: &str, expected: ScreenKind) -> Result<()> {
    let actual = screen_at(store, path);
    ensure!(
        actual == expected,
        "{path}: expected {expected:?}, gate chose {actual:?}"
    );
    Ok(())
}

/// No persisted session: loading first, then the auth screen.
pub fn no_persisted_session(_seed: u64) -> Result<()> {
    let backend = Rc::new(InMemoryBackend::demo());
    let (store, recorder) = store_over(&backend);
    expect_screen(&store, "/dashboard", ScreenKind::Loading)?;
    block_on(store.bootstrap());
    expect_screen(&store, "/dashboard", ScreenKind::Auth)?;
    ensure!(recorder.len() == 1, "expected one notification, saw {}", recorder.len());
    recorder.check()?;
    Ok(())
}

pub fn password_sign_in(_seed: u64) -> Result<()> {
    let backend = Rc::new(InMemoryBackend::demo());
    let (store, recorder) = store_over(&backend);
    block_on(async {
        let mut events = store.bootstrap().await;
        store
            .sign_in_with_password(DEMO_EMAIL, DEMO_PASSWORD)
            .await
            .context("demo sign-in")?;
        store.process_pending(&mut events).await;
        Ok::<(), anyhow::Error>(())
    })?;
    ensure!(!store.snapshot().profile_pending, "profile fetch still pending");
    expect_screen(&store, "/dashboard", ScreenKind::Onboarding)?;
    recorder.check()?;
    Ok(())
}

pub fn onboarding_completion(seed: u64) -> Result<()> {
    let backend = Rc::new(InMemoryBackend::demo());
    let (store, recorder) = store_over(&backend);
    let username = format!("learner_{}", seed % 10_000);
    block_on(async {
        store.bootstrap().await;
        store.sign_in_with_password(DEMO_EMAIL, DEMO_PASSWORD).await?;
        expect_screen(&store, "/tracker", ScreenKind::Onboarding)?;
        let saved = store
            .complete_onboarding(ProfileDraft::new(username.clone(), "fr"))
            .await?;
        ensure!(saved.username == username, "saved {:?}", saved.username);
        Ok::<(), anyhow::Error>(())
    })?;
    expect_screen(&store, "/tracker", ScreenKind::App)?;
    let user = backend
        .user_id_for(DEMO_EMAIL)
        .context("demo account missing")?;
    ensure!(
        backend.stored_profile(&user).is_some(),
        "profile not persisted"
    );
    recorder.check()?;
    Ok(())
}

/// Signed out visitors still reach `/profile/:username`.
pub fn public_profile_signed_out(_seed: u64) -> Result<()> {
    let backend = Rc::new(InMemoryBackend::demo());
    let (store, _) = store_over(&backend);
    block_on(store.bootstrap());
    expect_screen(&store, &format!("/profile/{DEMO_PUBLIC_USERNAME}"), ScreenKind::PublicProfile)?;
    expect_screen(&store, "/profile", ScreenKind::Auth)?;
    let found = block_on(store.public_profile(DEMO_PUBLIC_USERNAME))?;
    ensure!(
        found.is_some_and(|p| p.username == DEMO_PUBLIC_USERNAME),
        "public profile lookup failed"
    );
    ensure!(
        block_on(store.public_profile("nobody"))?.is_none(),
        "unknown username resolved"
    );
    Ok(())
}

pub fn late_profile_response(_seed: u64) -> Result<()> {
    let backend = Rc::new(InMemoryBackend::demo());
    let (store, recorder) = store_over(&backend);
    block_on(async {
        store.bootstrap().await;
        store
            .sign_in_with_password(DEMO_PUBLIC_EMAIL, DEMO_PASSWORD)
            .await?;
        expect_screen(&store, "/dashboard", ScreenKind::App)?;

        backend.hold_profile_fetches();
        let (_, held) = futures::join!(store.reload_profile(), async {
            let held = backend.held_profile_fetches();
            store.sign_out().await;
            backend.release_profile_fetches();
            held
        });
        ensure!(held == 1, "expected one parked fetch, saw {held}");
        Ok::<(), anyhow::Error>(())
    })?;
    let snapshot = store.snapshot();
    ensure!(
        snapshot.session.is_none() && snapshot.profile.is_none(),
        "late response restored state"
    );
    expect_screen(&store, "/dashboard", ScreenKind::Auth)?;
    recorder.check()?;
    Ok(())
}

pub fn sign_out_idempotent(_seed: u64) -> Result<()> {
    let backend = Rc::new(InMemoryBackend::demo());
    let (store, _) = store_over(&backend);
    block_on(async {
        store.bootstrap().await;
        store
            .sign_in_with_password(DEMO_PUBLIC_EMAIL, DEMO_PASSWORD)
            .await?;
        store.sign_out().await;
        let once = store.snapshot();
        store.sign_out().await;
        ensure!(store.snapshot() == once, "second sign-out changed state");
        Ok::<(), anyhow::Error>(())
    })?;
    ensure!(
        backend.sign_out_calls() == 1,
        "backend revoked {} times",
        backend.sign_out_calls()
    );
    Ok(())
}

pub fn sign_up_confirmation(seed: u64) -> Result<()> {
    let backend = Rc::new(InMemoryBackend::demo().requiring_confirmation());
    let (store, _) = store_over(&backend);
    let email = format!("fresh{seed}@example.com");
    let outcome = block_on(async {
        store.bootstrap().await;
        store.sign_up(&email, DEMO_PASSWORD).await
    })?;
    match outcome {
        SignUpOutcome::ConfirmationPending { email: pending } if pending == email => {}
        other => bail!("unexpected sign-up outcome {other:?}"),
    }
    expect_screen(&store, "/dashboard", ScreenKind::Auth)
}

pub fn rejected_credentials(_seed: u64) -> Result<()> {
    let backend = Rc::new(InMemoryBackend::demo());
    let (store, _) = store_over(&backend);
    block_on(async {
        store.bootstrap().await;
        match store.sign_in_with_password(DEMO_EMAIL, "wrong-password").await {
            Err(AuthFailure::Rejected(_)) => {}
            other => bail!("wrong password gave {other:?}"),
        }
        match store.sign_in_with_password("", "").await {
            Err(err) if err.is_rejection() => {}
            other => bail!("blank credentials gave {other:?}"),
        }
        Ok(())
    })?;
    expect_screen(&store, "/dashboard", ScreenKind::Auth)
}

pub fn offline_sign_in(_seed: u64) -> Result<()> {
    let backend = Rc::new(InMemoryBackend::demo());
    let (store, _) = store_over(&backend);
    block_on(store.bootstrap());
    backend.set_offline(true);
    match block_on(store.sign_in_with_password(DEMO_EMAIL, DEMO_PASSWORD)) {
        Err(AuthFailure::Unavailable(_)) => {}
        other => bail!("offline sign-in gave {other:?}"),
    }
    expect_screen(&store, "/dashboard", ScreenKind::Auth)
}

pub fn degraded_profile(_seed: u64) -> Result<()> {
    let backend = Rc::new(InMemoryBackend::demo());
    let (store, recorder) = store_over(&backend);
    block_on(async {
        store.bootstrap().await;
        backend.fail_next_profile_fetches(1);
        store
            .sign_in_with_password(DEMO_PUBLIC_EMAIL, DEMO_PASSWORD)
            .await
    })?;
    ensure!(store.snapshot().notice.is_some(), "no notice after failed fetch");
    expect_screen(&store, "/dashboard", ScreenKind::Onboarding)?;

    block_on(store.reload_profile());
    expect_screen(&store, "/dashboard", ScreenKind::App)?;
    store.dismiss_notice();
    ensure!(store.snapshot().notice.is_none(), "notice survived dismissal");
    recorder.check()?;
    Ok(())
}

pub fn google_oauth(_seed: u64) -> Result<()> {
    let backend = Rc::new(InMemoryBackend::demo());
    let (store, recorder) = store_over(&backend);
    let applied = block_on(async {
        let mut events = store.bootstrap().await;
        store.sign_in_with_google().await?;
        expect_screen(&store, "/feed", ScreenKind::Auth)?;
        Ok::<usize, anyhow::Error>(store.process_pending(&mut events).await)
    })?;
    ensure!(applied == 1, "expected one auth event, applied {applied}");
    expect_screen(&store, "/feed", ScreenKind::App)?;
    recorder.check()?;
    Ok(())
}

pub fn session_restore(_seed: u64) -> Result<()> {
    let backend = Rc::new(InMemoryBackend::demo().with_persisted_session(DEMO_PUBLIC_EMAIL));
    let (store, recorder) = store_over(&backend);
    block_on(store.bootstrap());
    expect_screen(&store, "/leaderboard", ScreenKind::App)?;
    expect_screen(&store, "/", ScreenKind::App)?;
    recorder.check()?;
    Ok(())
}

pub fn event_storm(seed: u64) -> Result<()> {
    let report = run_event_storm(seed, DEFAULT_STORM_STEPS)?;
    log::debug!(
        "storm seed {} ended on {:?} after {} notifications",
        report.seed,
        report.final_screen,
        report.notifications
    );
    Ok(())
}
