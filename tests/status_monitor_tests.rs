//! Unit tests for the order status monitor
//!
//! All tests run on a paused tokio clock, so the 3 s polling interval costs
//! no wall-clock time and elapsed durations are exact.

use omnify::config::MonitorConfig;
use omnify::error::TransferError;
use omnify::monitor::{OrderStatus, StatusMonitor, POLL_EXHAUSTED_MESSAGE, PROCESSING_MESSAGE};
use std::time::Duration;

#[path = "helpers.rs"]
mod test_helpers;
use test_helpers::{default_monitor_config, job, ScriptedOrderStatusApi, DUMMY_ORDER_ID, DUMMY_TX_HASH};

// ============================================================================
// TERMINAL STATUSES
// ============================================================================

/// What is tested: SUCCESS on the third poll ends monitoring with the hash
/// Why: Monitoring must stop as soon as the order settles
#[tokio::test(start_paused = true)]
async fn test_success_on_third_poll() {
    let api = ScriptedOrderStatusApi::succeeding_after(2);
    let monitor = StatusMonitor::new(api.clone(), &default_monitor_config());

    let order = monitor.monitor(DUMMY_ORDER_ID).await;

    assert_eq!(order.status, OrderStatus::Success);
    assert_eq!(order.transaction_hash.as_deref(), Some(DUMMY_TX_HASH));
    assert_eq!(order.message, "Transaction completed successfully");
    assert_eq!(order.attempts, 3);
    assert_eq!(api.calls(), 3);
}

/// What is tested: a FAILED job ends monitoring immediately
/// Why: A rejected order will never succeed; polling further wastes the budget
#[tokio::test(start_paused = true)]
async fn test_failed_job_is_terminal() {
    let api = ScriptedOrderStatusApi::new(vec![Ok(vec![job("PENDING", None)])], Ok(vec![job("FAILED", None)]));
    let monitor = StatusMonitor::new(api.clone(), &default_monitor_config());

    let order = monitor.monitor(DUMMY_ORDER_ID).await;

    assert_eq!(order.status, OrderStatus::Failed);
    assert_eq!(order.message, "Transaction failed");
    assert_eq!(api.calls(), 2);
}

/// What is tested: only the first job of an order is consulted
/// Why: The first job is authoritative for the order
#[tokio::test(start_paused = true)]
async fn test_first_job_is_authoritative() {
    let api = ScriptedOrderStatusApi::new(vec![], Ok(vec![job("SUCCESS", Some(DUMMY_TX_HASH)), job("FAILED", None)]));
    let monitor = StatusMonitor::new(api.clone(), &default_monitor_config());

    let order = monitor.monitor(DUMMY_ORDER_ID).await;

    assert_eq!(order.status, OrderStatus::Success);
    assert_eq!(api.calls(), 1);
}

// ============================================================================
// ATTEMPT BUDGET
// ============================================================================

/// What is tested: an order that never settles is polled exactly 20 times
/// Why: The attempt budget bounds monitoring at about one minute
#[tokio::test(start_paused = true)]
async fn test_never_settles_exhausts_budget() {
    let api = ScriptedOrderStatusApi::always("PENDING");
    let monitor = StatusMonitor::new(api.clone(), &default_monitor_config());
    let start = tokio::time::Instant::now();

    let order = monitor.monitor(DUMMY_ORDER_ID).await;

    assert_eq!(api.calls(), 20);
    assert_eq!(order.attempts, 20);
    assert_eq!(order.status, OrderStatus::Failed);
    assert_eq!(order.message, "Transaction not confirmed after 20 status checks");

    // 19 pauses between 20 polls
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_secs(57), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(60), "elapsed {:?}", elapsed);
}

/// What is tested: consecutive polls are at least one interval apart
/// Why: Polls run strictly in sequence with a fixed pause
#[tokio::test(start_paused = true)]
async fn test_polls_are_spaced_by_interval() {
    let api = ScriptedOrderStatusApi::succeeding_after(4);
    let monitor = StatusMonitor::new(api.clone(), &default_monitor_config());

    monitor.monitor(DUMMY_ORDER_ID).await;

    let times = api.poll_times();
    assert_eq!(times.len(), 5);
    for pair in times.windows(2) {
        assert!(pair[1] - pair[0] >= Duration::from_millis(3000));
    }
}

/// What is tested: when every status check errors, the exhaustion message is reported
/// Why: Network failures while polling must end in FAILED, not hang or panic
#[tokio::test(start_paused = true)]
async fn test_poll_errors_exhaust_budget() {
    let api = ScriptedOrderStatusApi::new(vec![], Err(TransferError::Polling("connection refused".to_string())));
    let monitor = StatusMonitor::new(api.clone(), &default_monitor_config());

    let order = monitor.monitor(DUMMY_ORDER_ID).await;

    assert_eq!(api.calls(), 20);
    assert_eq!(order.status, OrderStatus::Failed);
    assert_eq!(order.message, POLL_EXHAUSTED_MESSAGE);
}

/// What is tested: transient errors and empty job lists do not end monitoring
/// Why: Jobs may not exist yet right after submission
#[tokio::test(start_paused = true)]
async fn test_transient_errors_then_success() {
    let api = ScriptedOrderStatusApi::new(
        vec![
            Err(TransferError::Polling("timeout".to_string())),
            Ok(vec![]),
            Ok(vec![job("RUNNING", None)]),
        ],
        Ok(vec![job("SUCCESS", Some(DUMMY_TX_HASH))]),
    );
    let monitor = StatusMonitor::new(api.clone(), &default_monitor_config());

    let order = monitor.monitor(DUMMY_ORDER_ID).await;

    assert_eq!(order.status, OrderStatus::Success);
    assert_eq!(api.calls(), 4);
}

/// What is tested: custom interval and attempt budget are honored
/// Why: Both are configuration values
#[tokio::test(start_paused = true)]
async fn test_custom_budget() {
    let api = ScriptedOrderStatusApi::always("PENDING");
    let config = MonitorConfig {
        polling_interval_ms: 500,
        max_attempts: 3,
    };
    let monitor = StatusMonitor::new(api.clone(), &config);
    let start = tokio::time::Instant::now();

    let order = monitor.monitor(DUMMY_ORDER_ID).await;

    assert_eq!(api.calls(), 3);
    assert_eq!(order.status, OrderStatus::Failed);
    assert!(start.elapsed() >= Duration::from_millis(1000));
    assert!(start.elapsed() < Duration::from_millis(1500));
}

// ============================================================================
// PROGRESS REPORTING
// ============================================================================

/// What is tested: every non-terminal poll is reported with its attempt number and the fixed processing text
/// Why: Callers display progress while the order is pending
#[tokio::test(start_paused = true)]
async fn test_progress_callback() {
    let api = ScriptedOrderStatusApi::succeeding_after(2);
    let monitor = StatusMonitor::new(api, &default_monitor_config());
    let mut seen = Vec::new();

    let order = monitor
        .monitor_with_progress(DUMMY_ORDER_ID, |progress| {
            assert_eq!(progress.status, OrderStatus::Processing);
            seen.push((progress.attempts, progress.message.clone()));
        })
        .await;

    assert_eq!(order.status, OrderStatus::Success);
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].0, 1);
    assert_eq!(seen[1].0, 2);
    assert!(seen.iter().all(|(_, message)| message == PROCESSING_MESSAGE), "messages: {:?}", seen);
}
