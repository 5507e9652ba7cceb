use super::*;
use std::sync::Arc;
use std::time::Duration;

#[test]
fn starts_unpaused_and_uncancelled() {
    let control = FlowControl::new();
    assert!(!control.is_paused());
    assert!(!control.cancel.is_cancelled());
}

#[tokio::test]
async fn wait_if_paused_returns_immediately_when_not_paused() {
    let control = FlowControl::new();
    tokio::time::timeout(Duration::from_millis(50), control.wait_if_paused())
        .await
        .expect("should not block when not paused");
}

#[tokio::test]
async fn resume_wakes_a_paused_waiter() {
    let control = Arc::new(FlowControl::new());
    control.pause();
    assert!(control.is_paused());

    let waiter = {
        let control = control.clone();
        tokio::spawn(async move {
            control.wait_if_paused().await;
        })
    };

    tokio::time::sleep(Duration::from_millis(20)).await;
    control.resume();

    tokio::time::timeout(Duration::from_millis(200), waiter)
        .await
        .expect("resume should wake the waiter")
        .unwrap();
    assert!(!control.is_paused());
}

#[tokio::test]
async fn abort_cancels_the_token_and_wakes_paused_waiters() {
    let control = Arc::new(FlowControl::new());
    control.pause();

    let waiter = {
        let control = control.clone();
        tokio::spawn(async move {
            control.wait_if_paused().await;
        })
    };

    tokio::time::sleep(Duration::from_millis(20)).await;
    control.abort("caller requested stop");

    tokio::time::timeout(Duration::from_millis(200), waiter)
        .await
        .expect("abort should wake a paused waiter")
        .unwrap();
    assert!(control.cancel.is_cancelled());
    assert_eq!(control.abort_reason(), "caller requested stop");
}

#[test]
fn abort_reason_defaults_when_never_aborted() {
    let control = FlowControl::new();
    assert_eq!(control.abort_reason(), "aborted");
}
