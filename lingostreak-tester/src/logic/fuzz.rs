//! Seeded random storms of user actions and backend notifications.
use anyhow::{Context, Result, ensure};
use futures::executor::block_on;
use lingostreak_core::memory::{DEMO_EMAIL, DEMO_PASSWORD, DEMO_PUBLIC_EMAIL};
use lingostreak_core::{
    AuthEvent, AuthEvents, GateInput, InMemoryBackend, ProfileDraft, ScreenKind, SessionStore,
    ThemeMode, resolve,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::rc::Rc;

use lingostreak_core::audit::SnapshotRecorder;

pub const DEFAULT_STORM_STEPS: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StormStep {
    SignIn { onboarded_account: bool },
    WrongPassword,
    SignOut,
    ExternalSignOut,
    TokenRefresh,
    Google,
    Onboard,
    ReloadProfile,
    FailNextFetch,
    SignOutDuringFetch,
    ToggleTheme,
    DismissNotice,
    Offline(bool),
}

impl StormStep {
    fn pick(rng: &mut ChaCha8Rng) -> Self {
        match rng.gen_range(0..13) {
            0 => Self::SignIn {
                onboarded_account: rng.gen_bool(0.5),
            },
            1 => Self::WrongPassword,
            2 => Self::SignOut,
            3 => Self::ExternalSignOut,
            4 => Self::TokenRefresh,
            5 => Self::Google,
            6 => Self::Onboard,
            7 => Self::ReloadProfile,
            8 => Self::FailNextFetch,
            9 => Self::SignOutDuringFetch,
            10 => Self::ToggleTheme,
            11 => Self::DismissNotice,
            _ => Self::Offline(rng.gen_bool(0.3)),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StormReport {
    pub seed: u64,
    pub steps: Vec<StormStep>,
    pub notifications: usize,
    pub final_screen: ScreenKind,
}

/// Plan the steps for `seed` without running them.
pub fn plan_storm(seed: u64, steps: usize) -> Vec<StormStep> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..steps).map(|_| StormStep::pick(&mut rng)).collect()
}

/// Drive a fresh store through a random storm, checking the invariants after
/// every step.
///
/// # Errors
///
/// Fails with the step number and the violated property.
pub fn run_event_storm(seed: u64, steps: usize) -> Result<StormReport> {
    let plan = plan_storm(seed, steps);
    let backend = Rc::new(InMemoryBackend::demo());
    let store = SessionStore::new(backend.clone(), ThemeMode::Light);
    let recorder = SnapshotRecorder::attach(&store);

    block_on(async {
        let mut events = store.bootstrap().await;
        for (index, step) in plan.iter().enumerate() {
            apply_step(&store, &backend, &mut events, *step, index)
                .await
                .with_context(|| format!("step {index} ({step:?}), seed {seed}"))?;
            store.process_pending(&mut events).await;
            recorder
                .check()
                .with_context(|| format!("after step {index} ({step:?}), seed {seed}"))?;
        }
        Ok::<(), anyhow::Error>(())
    })?;

    let snapshot = store.snapshot();
    Ok(StormReport {
        seed,
        steps: plan,
        notifications: recorder.len(),
        final_screen: resolve(GateInput::from_snapshot(&snapshot, "/dashboard")).kind(),
    })
}

async fn apply_step(
    store: &SessionStore,
    backend: &InMemoryBackend,
    events: &mut AuthEvents,
    step: StormStep,
    index: usize,
) -> Result<()> {
    let before = store.snapshot();
    match step {
        StormStep::SignIn { onboarded_account } => {
            let email = if onboarded_account {
                DEMO_PUBLIC_EMAIL
            } else {
                DEMO_EMAIL
            };
            if let Ok(session) = store.sign_in_with_password(email, DEMO_PASSWORD).await {
                store.process_pending(events).await;
                let after = store.snapshot();
                ensure!(
                    after.session.as_ref() == Some(&session),
                    "signed-in session not published"
                );
                ensure!(!after.profile_pending, "profile fetch left pending");
            }
        }
        StormStep::WrongPassword => {
            let result = store.sign_in_with_password(DEMO_EMAIL, "not-the-password").await;
            ensure!(result.is_err(), "wrong password accepted");
            ensure!(
                store.snapshot().session == before.session,
                "rejected sign-in changed the session"
            );
        }
        StormStep::SignOut => {
            store.sign_out().await;
            let after = store.snapshot();
            ensure!(
                after.session.is_none() && after.profile.is_none(),
                "sign-out left state behind"
            );
            store.sign_out().await;
            ensure!(store.snapshot() == after, "second sign-out changed state");
        }
        StormStep::ExternalSignOut => backend.push_event(&AuthEvent::signed_out()),
        StormStep::TokenRefresh => {
            if let Some(mut session) = before.session.clone() {
                session.access_token = format!("rotated-{index}");
                backend.push_event(&AuthEvent::refreshed(session));
                store.process_pending(events).await;
                let after = store.snapshot();
                ensure!(
                    after.profile.is_some() == before.profile.is_some(),
                    "token refresh changed the profile"
                );
            }
        }
        StormStep::Google => {
            // Offline the redirect itself fails; nothing else to check.
            let _ = store.sign_in_with_google().await;
        }
        StormStep::Onboard => {
            let draft = ProfileDraft::new(format!("learner_{index}"), "fr");
            match store.complete_onboarding(draft).await {
                Ok(saved) => {
                    let after = store.snapshot();
                    ensure!(
                        after.profile.as_ref() == Some(&saved),
                        "saved profile not published"
                    );
                }
                Err(_) if before.session.is_none() => {}
                Err(err) => log::debug!("onboarding refused: {err}"),
            }
        }
        StormStep::ReloadProfile => store.reload_profile().await,
        StormStep::FailNextFetch => backend.fail_next_profile_fetches(1),
        StormStep::SignOutDuringFetch => {
            backend.hold_profile_fetches();
            futures::join!(store.reload_profile(), async {
                store.sign_out().await;
                backend.release_profile_fetches();
            });
            let after = store.snapshot();
            ensure!(
                after.profile.is_none(),
                "late profile response resurrected the profile"
            );
        }
        StormStep::ToggleTheme => {
            let next = store.toggle_theme();
            ensure!(next != before.theme, "theme did not flip");
        }
        StormStep::DismissNotice => {
            store.dismiss_notice();
            ensure!(store.snapshot().notice.is_none(), "notice survived dismissal");
        }
        StormStep::Offline(offline) => backend.set_offline(offline),
    }
    Ok(())
}
