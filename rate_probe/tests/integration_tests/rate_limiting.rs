use crate::common::*;
use pretty_assertions::assert_eq;
use rate_probe::{ProbeOutcome, ProbeReport};

fn status_lines(lines: &[String]) -> Vec<&str> {
    lines
        .iter()
        .filter(|l| l.contains(": Status Code = "))
        .map(String::as_str)
        .collect()
}

#[tokio::test]
async fn test_no_rate_limit_runs_to_completion() {
    let target = MockTarget::start().await;
    target.respond_always(200).await;

    let (report, lines) = target.probe(&target.config(150)).await;

    assert_eq!(status_lines(&lines).len(), 150);
    assert_eq!(lines.len(), 150);
    assert_eq!(lines[0], "Request 1: Status Code = 200");
    assert_eq!(lines[149], "Request 150: Status Code = 200");
    assert!(!lines.iter().any(|l| l == "Rate limiter triggered!"));
    assert_eq!(report.outcome, ProbeOutcome::Exhausted);
    assert_eq!(report.exit_status(), ProbeReport::EXIT_COMPLETED);
    assert_eq!(target.request_count().await, 150);
}

#[tokio::test]
async fn test_rate_limit_429_after_burst_exceeded() {
    let target = MockTarget::start().await;
    target.respond_times(200, 46).await;
    target.rate_limit_always().await;

    let (report, lines) = target.probe(&target.config(150)).await;

    assert_eq!(status_lines(&lines).len(), 47);
    assert_eq!(
        &lines[45..],
        [
            "Request 46: Status Code = 200".to_string(),
            "Request 47: Status Code = 429".to_string(),
            "Rate limiter triggered!".to_string(),
            format!("Response: {RATE_LIMIT_MESSAGE}"),
        ]
    );
    assert_eq!(
        report.outcome,
        ProbeOutcome::RateLimited {
            request: 47,
            body: RATE_LIMIT_MESSAGE.to_string(),
        }
    );
    assert_eq!(report.requests_sent, 47);
    assert_eq!(report.exit_status(), ProbeReport::EXIT_RATE_LIMITED);
    // requests 48..150 never sent
    assert_eq!(target.request_count().await, 47);
}

#[tokio::test]
async fn test_rate_limited_on_first_request() {
    let target = MockTarget::start().await;
    target.rate_limit_always().await;

    let (report, lines) = target.probe(&target.config(10)).await;

    assert_eq!(
        lines,
        vec![
            "Request 1: Status Code = 429".to_string(),
            "Rate limiter triggered!".to_string(),
            format!("Response: {RATE_LIMIT_MESSAGE}"),
        ]
    );
    assert!(report.rate_limit_detected());
    assert_eq!(target.request_count().await, 1);
}

#[tokio::test]
async fn test_server_error_does_not_stop_probe() {
    let target = MockTarget::start().await;
    target.respond_times(200, 2).await;
    target.respond_times(500, 1).await;
    target.respond_always(200).await;

    let (report, lines) = target.probe(&target.config(5)).await;

    assert_eq!(
        lines,
        vec![
            "Request 1: Status Code = 200",
            "Request 2: Status Code = 200",
            "Request 3: Status Code = 500",
            "Request 4: Status Code = 200",
            "Request 5: Status Code = 200",
        ]
    );
    assert_eq!(report.outcome, ProbeOutcome::Exhausted);
    assert_eq!(report.status_counts.get(&500), Some(&1));
    assert_eq!(report.status_counts.get(&200), Some(&4));
    assert_eq!(target.request_count().await, 5);
}

#[tokio::test]
async fn test_missing_authorization_is_just_another_status() {
    // No mock matches a different token, wiremock answers 404
    let target = MockTarget::start().await;
    target.respond_always(200).await;

    let mut config = target.config(3);
    config.target = rate_probe::types::Target::new(
        &target.url(),
        rate_probe::types::BearerToken::new("wrong-token").unwrap(),
    )
    .unwrap();

    let (report, lines) = target.probe(&config).await;

    assert_eq!(status_lines(&lines).len(), 3);
    assert!(lines.iter().all(|l| l.ends_with("= 404")));
    assert_eq!(report.outcome, ProbeOutcome::Exhausted);
}
