//! Unit tests for `JobHub`.
//!
//! These tests exercise the per-job subscriber hub directly, without
//! performing any HTTP upgrades. They verify subscribe/unsubscribe
//! semantics, best-effort delivery, per-job ordering, and terminal
//! close-out behaviour.

use axum::extract::ws::Message;
use reviewhub_api::ws::JobHub;
use reviewhub_core::job::JobStatus;
use reviewhub_core::snapshot::JobSnapshot;

fn snapshot(job_id: i64, status: JobStatus, progress: Option<f32>) -> JobSnapshot {
    JobSnapshot {
        job_id,
        status,
        progress,
        final_review_id: None,
        error: None,
        updated_at: chrono::Utc::now(),
    }
}

fn parse(msg: &Message) -> JobSnapshot {
    match msg {
        Message::Text(text) => serde_json::from_str(text.as_str()).expect("valid snapshot JSON"),
        other => panic!("Expected Text message, got: {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Test: new hub starts with zero subscribers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn new_hub_has_zero_subscribers() {
    let hub = JobHub::new();

    assert_eq!(hub.subscriber_count(1).await, 0);
}

// ---------------------------------------------------------------------------
// Test: subscribe() registers and unsubscribe() removes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn subscribe_and_unsubscribe() {
    let hub = JobHub::new();

    let (sub, _rx) = hub.subscribe(1).await;
    assert_eq!(hub.subscriber_count(1).await, 1);

    hub.unsubscribe(sub).await;
    assert_eq!(hub.subscriber_count(1).await, 0);
}

// ---------------------------------------------------------------------------
// Test: unsubscribe() is idempotent
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unsubscribe_twice_is_noop() {
    let hub = JobHub::new();

    let (sub, _rx) = hub.subscribe(1).await;
    let (_sub2, _rx2) = hub.subscribe(1).await;

    hub.unsubscribe(sub).await;
    hub.unsubscribe(sub).await;

    assert_eq!(hub.subscriber_count(1).await, 1);
}

// ---------------------------------------------------------------------------
// Test: publish() reaches every subscriber of the job
// ---------------------------------------------------------------------------

#[tokio::test]
async fn publish_reaches_all_subscribers() {
    let hub = JobHub::new();

    let (_s1, mut rx1) = hub.subscribe(1).await;
    let (_s2, mut rx2) = hub.subscribe(1).await;

    let delivered = hub
        .publish(1, &snapshot(1, JobStatus::Processing, Some(30.0)))
        .await;
    assert_eq!(delivered, 2);

    for rx in [&mut rx1, &mut rx2] {
        let msg = rx.recv().await.expect("subscriber should receive snapshot");
        let snap = parse(&msg);
        assert_eq!(snap.job_id, 1);
        assert_eq!(snap.status, JobStatus::Processing);
        assert_eq!(snap.progress, Some(30.0));
    }
}

// ---------------------------------------------------------------------------
// Test: publish() with no subscribers delivers to nobody
// ---------------------------------------------------------------------------

#[tokio::test]
async fn publish_without_subscribers_is_noop() {
    let hub = JobHub::new();

    let delivered = hub.publish(1, &snapshot(1, JobStatus::Processing, None)).await;

    assert_eq!(delivered, 0);
}

// ---------------------------------------------------------------------------
// Test: snapshots are scoped to their job id
// ---------------------------------------------------------------------------

#[tokio::test]
async fn publish_does_not_cross_jobs() {
    let hub = JobHub::new();

    let (_s1, mut rx1) = hub.subscribe(1).await;
    let (_s2, mut rx2) = hub.subscribe(2).await;

    hub.publish(1, &snapshot(1, JobStatus::Processing, None)).await;

    assert_eq!(parse(&rx1.recv().await.unwrap()).job_id, 1);
    assert!(
        rx2.try_recv().is_err(),
        "job 2 subscriber must not see job 1 snapshots"
    );
}

// ---------------------------------------------------------------------------
// Test: a closed subscriber channel is dropped without affecting others
// ---------------------------------------------------------------------------

#[tokio::test]
async fn publish_skips_and_deregisters_closed_channels() {
    let hub = JobHub::new();

    let (_s1, rx1) = hub.subscribe(1).await;
    let (_s2, mut rx2) = hub.subscribe(1).await;

    // Drop rx1 to close its channel.
    drop(rx1);

    let delivered = hub.publish(1, &snapshot(1, JobStatus::Processing, None)).await;
    assert_eq!(delivered, 1);
    assert_eq!(hub.subscriber_count(1).await, 1);

    let snap = parse(&rx2.recv().await.expect("rx2 should receive snapshot"));
    assert_eq!(snap.status, JobStatus::Processing);
}

// ---------------------------------------------------------------------------
// Test: per-job snapshots arrive in publish order
// ---------------------------------------------------------------------------

#[tokio::test]
async fn snapshots_arrive_in_publish_order() {
    let hub = JobHub::new();

    let (_sub, mut rx) = hub.subscribe(1).await;

    for progress in [10.0, 40.0, 70.0] {
        hub.publish(1, &snapshot(1, JobStatus::Processing, Some(progress)))
            .await;
    }

    for expected in [10.0, 40.0, 70.0] {
        let snap = parse(&rx.recv().await.unwrap());
        assert_eq!(snap.progress, Some(expected));
    }
}

// ---------------------------------------------------------------------------
// Test: a terminal snapshot is delivered, then the topic is closed out
// ---------------------------------------------------------------------------

#[tokio::test]
async fn terminal_snapshot_closes_and_deregisters() {
    let hub = JobHub::new();

    let (_s1, mut rx1) = hub.subscribe(1).await;
    let (_s2, mut rx2) = hub.subscribe(1).await;

    let mut done = snapshot(1, JobStatus::Completed, Some(100.0));
    done.final_review_id = Some(99);
    hub.publish(1, &done).await;

    for rx in [&mut rx1, &mut rx2] {
        let snap = parse(&rx.recv().await.expect("terminal snapshot expected"));
        assert_eq!(snap.status, JobStatus::Completed);
        assert_eq!(snap.final_review_id, Some(99));

        let msg = rx.recv().await.expect("Close frame expected");
        assert!(
            matches!(msg, Message::Close(None)),
            "Expected Close(None), got: {msg:?}"
        );

        // The channel is closed once the topic is dropped.
        assert!(rx.recv().await.is_none());
    }

    assert_eq!(hub.subscriber_count(1).await, 0);
}

// ---------------------------------------------------------------------------
// Test: subscribing after a terminal publish starts a fresh topic
// ---------------------------------------------------------------------------

#[tokio::test]
async fn subscribe_after_terminal_starts_fresh() {
    let hub = JobHub::new();

    let (_old, mut old_rx) = hub.subscribe(1).await;
    hub.publish(1, &snapshot(1, JobStatus::Failed, None)).await;

    // Old subscriber was closed out with the terminal snapshot.
    assert_eq!(parse(&old_rx.recv().await.unwrap()).status, JobStatus::Failed);

    // A late subscriber registers on a fresh topic and sees nothing until
    // something is published (the WebSocket handler is responsible for
    // sending it the current snapshot on connect).
    let (_sub, mut rx) = hub.subscribe(1).await;
    assert_eq!(hub.subscriber_count(1).await, 1);
    assert!(rx.try_recv().is_err());
}

// ---------------------------------------------------------------------------
// Test: shutdown_all() sends Close and clears every topic
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shutdown_all_sends_close_and_clears() {
    let hub = JobHub::new();

    let (_s1, mut rx1) = hub.subscribe(1).await;
    let (_s2, mut rx2) = hub.subscribe(2).await;

    hub.shutdown_all().await;

    assert_eq!(hub.subscriber_count(1).await, 0);
    assert_eq!(hub.subscriber_count(2).await, 0);

    for rx in [&mut rx1, &mut rx2] {
        let msg = rx.recv().await.expect("Close frame expected");
        assert!(
            matches!(msg, Message::Close(None)),
            "Expected Close(None), got: {msg:?}"
        );
        assert!(rx.recv().await.is_none(), "Channel should be closed");
    }
}
