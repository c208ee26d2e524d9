// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;
use std::time::{Duration, Instant};

use super::*;

/// Walk a fresh state along the legal cycle until it reaches `target`.
fn state_at(target: Lifecycle) -> State {
    let state = State::new();
    for step in [Lifecycle::Startup, Lifecycle::Up, Lifecycle::Shutdown] {
        if state.current() == target {
            break;
        }
        assert!(state.advance(step));
    }
    assert_eq!(state.current(), target);
    state
}

#[test]
fn starts_down() {
    assert_eq!(State::new().current(), Lifecycle::Down);
}

#[yare::parameterized(
    down_to_startup = { Lifecycle::Down, Lifecycle::Startup, true },
    startup_to_up = { Lifecycle::Startup, Lifecycle::Up, true },
    up_to_shutdown = { Lifecycle::Up, Lifecycle::Shutdown, true },
    shutdown_to_down = { Lifecycle::Shutdown, Lifecycle::Down, true },
    down_to_up = { Lifecycle::Down, Lifecycle::Up, false },
    down_to_shutdown = { Lifecycle::Down, Lifecycle::Shutdown, false },
    startup_to_down = { Lifecycle::Startup, Lifecycle::Down, false },
    startup_to_shutdown = { Lifecycle::Startup, Lifecycle::Shutdown, false },
    up_to_startup = { Lifecycle::Up, Lifecycle::Startup, false },
    up_to_down = { Lifecycle::Up, Lifecycle::Down, false },
    shutdown_to_startup = { Lifecycle::Shutdown, Lifecycle::Startup, false },
    shutdown_to_up = { Lifecycle::Shutdown, Lifecycle::Up, false },
)]
fn transition_closure(from: Lifecycle, to: Lifecycle, legal: bool) {
    let state = state_at(from);
    assert_eq!(state.advance(to), legal);
    assert_eq!(state.current(), if legal { to } else { from });
}

#[yare::parameterized(
    down = { Lifecycle::Down },
    startup = { Lifecycle::Startup },
    up = { Lifecycle::Up },
    shutdown = { Lifecycle::Shutdown },
)]
fn same_state_is_an_accepted_no_op(at: Lifecycle) {
    let state = state_at(at);
    assert!(state.advance(at));
    assert_eq!(state.current(), at);
}

#[tokio::test]
async fn sleep_expires_on_its_own() {
    let state = State::new();
    let began = Instant::now();
    state.sleep(Duration::from_millis(20)).await;
    assert!(began.elapsed() >= Duration::from_millis(20));
}

#[tokio::test]
async fn transition_interrupts_sleep() -> anyhow::Result<()> {
    let state = Arc::new(State::new());
    let sleeper = Arc::clone(&state);
    let handle = tokio::spawn(async move {
        let began = Instant::now();
        sleeper.sleep(Duration::from_secs(600)).await;
        began.elapsed()
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(state.advance(Lifecycle::Startup));
    let slept = tokio::time::timeout(Duration::from_secs(2), handle).await??;
    assert!(slept < Duration::from_secs(1), "sleeper took {slept:?}");
    Ok(())
}

#[tokio::test]
async fn rejected_transition_leaves_sleep_alone() -> anyhow::Result<()> {
    let state = Arc::new(State::new());
    let sleeper = Arc::clone(&state);
    let handle = tokio::spawn(async move {
        sleeper.sleep(Duration::from_millis(300)).await;
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!state.advance(Lifecycle::Up));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!handle.is_finished());
    handle.await?;
    Ok(())
}

#[tokio::test]
async fn wait_blocks_until_barrier_clears() -> anyhow::Result<()> {
    let state = Arc::new(State::new());
    assert!(state.advance(Lifecycle::Startup));
    let waiter = Arc::clone(&state);
    let handle = tokio::spawn(async move {
        waiter.wait().await;
        waiter.current()
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!handle.is_finished());
    assert!(state.advance(Lifecycle::Up));
    let settled = tokio::time::timeout(Duration::from_secs(1), handle).await??;
    assert_eq!(settled, Lifecycle::Up);
    Ok(())
}

#[tokio::test]
async fn wait_returns_immediately_when_settled() {
    let state = State::new();
    let waited = tokio::time::timeout(Duration::from_millis(100), state.wait()).await;
    assert!(waited.is_ok());
}
