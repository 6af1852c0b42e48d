//! Dispatch loop behaviour against a scripted venue

mod common;

use common::{ScriptedVenue, Step, broker, record, wait_for};
use relay_core::{Outcome, Page};
use relay_engine::{
    BrokerConfig, Decoded, EngineError, EngineEvent, RetryConfig, Submission, UnhandledConfig,
    UnhandledPolicy,
};
use relay_ports::{Notification, Reply, VenueCall, VenueError};
use std::time::Duration;

fn call(name: &str) -> Submission {
    Submission::ack(VenueCall::new(name, "opt10001"))
}

#[tokio::test(start_paused = true)]
async fn test_one_request_in_flight_and_spacing_respected() {
    let broker = broker(BrokerConfig::default());
    let venue = ScriptedVenue::new(broker.sink(), Duration::from_millis(10));
    let done = record(&broker, "stock_info");
    broker.start(venue.clone()).unwrap();

    for _ in 0..5 {
        broker.submit(call("stock_info")).unwrap();
    }
    wait_for(&done, 5).await;

    assert_eq!(venue.max_outstanding(), 1);
    let calls = venue.calls();
    assert_eq!(calls.len(), 5);
    for pair in calls.windows(2) {
        assert!(
            pair[1].0 - pair[0].0 >= Duration::from_millis(250),
            "dispatches only {:?} apart",
            pair[1].0 - pair[0].0
        );
    }
    assert!(done.lock().iter().all(|c| c.outcome() == Some(&Outcome::Ack)));
}

#[tokio::test(start_paused = true)]
async fn test_slow_replies_serialize_dispatches() {
    let broker = broker(BrokerConfig::default());
    let venue = ScriptedVenue::new(broker.sink(), Duration::from_millis(800));
    let done = record(&broker, "account_profit");
    broker.start(venue.clone()).unwrap();

    for _ in 0..3 {
        broker.submit(call("account_profit")).unwrap();
    }
    wait_for(&done, 3).await;

    assert_eq!(venue.max_outstanding(), 1);
    for pair in venue.calls().windows(2) {
        assert!(pair[1].0 - pair[0].0 >= Duration::from_millis(800));
    }
}

#[tokio::test(start_paused = true)]
async fn test_lost_reply_is_retried_before_next_request() {
    let broker = broker(BrokerConfig::default());
    let venue = ScriptedVenue::new(broker.sink(), Duration::from_millis(50));
    venue.script([Step::Drop]);
    let first = record(&broker, "first");
    let second = record(&broker, "second");
    broker.start(venue.clone()).unwrap();

    broker.submit(call("first")).unwrap();
    broker.submit(call("second")).unwrap();
    wait_for(&second, 1).await;

    assert_eq!(venue.call_names(), vec!["first", "first", "second"]);
    let calls = venue.calls();
    let retry_gap = calls[1].0 - calls[0].0;
    assert!(retry_gap >= Duration::from_secs(30), "retried after {retry_gap:?}");
    assert!(retry_gap <= Duration::from_secs(35), "retried after {retry_gap:?}");
    assert!(calls[2].0 > calls[1].0);

    let first = first.lock();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].attempts, 2);
    assert!(first[0].is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_retry_jumps_ahead_of_later_submissions() {
    let broker = broker(BrokerConfig::default());
    let venue = ScriptedVenue::new(broker.sink(), Duration::from_millis(50));
    venue.script([Step::Drop]);
    let done = record(&broker, "c");
    record(&broker, "a");
    record(&broker, "b");
    broker.start(venue.clone()).unwrap();

    broker.submit(call("a")).unwrap();
    while venue.calls().is_empty() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    broker.submit(call("b")).unwrap();
    broker.submit(call("c")).unwrap();
    wait_for(&done, 1).await;

    assert_eq!(venue.call_names(), vec!["a", "a", "b", "c"]);
}

#[tokio::test(start_paused = true)]
async fn test_retries_exhausted_reported_to_handler() {
    let config = BrokerConfig {
        retry: RetryConfig {
            max_attempts: 2,
            ..Default::default()
        },
        ..Default::default()
    };
    let broker = broker(config);
    let venue = ScriptedVenue::new(broker.sink(), Duration::from_millis(50));
    venue.script([Step::Drop, Step::Drop]);
    let done = record(&broker, "deposit_detail");
    broker.start(venue.clone()).unwrap();

    broker.submit(call("deposit_detail")).unwrap();
    wait_for(&done, 1).await;

    assert_eq!(venue.calls().len(), 2);
    let done = done.lock();
    assert_eq!(
        done[0].result,
        Err(EngineError::RetriesExhausted {
            name: "deposit_detail".into(),
            attempts: 2,
        })
    );
    assert_eq!(broker.in_flight(), None);
}

#[tokio::test(start_paused = true)]
async fn test_connectivity_fault_backs_off_and_retries() {
    let broker = broker(BrokerConfig::default());
    let venue = ScriptedVenue::new(broker.sink(), Duration::from_millis(50));
    venue.script([Step::Fail(VenueError::Disconnected("link down".into()))]);
    let done = record(&broker, "stock_info");
    let mut events = broker.subscribe();
    broker.start(venue.clone()).unwrap();

    broker.submit(call("stock_info")).unwrap();
    wait_for(&done, 1).await;

    assert_eq!(venue.calls().len(), 2);
    assert_eq!(done.lock()[0].attempts, 2);

    let mut saw_fault = false;
    let mut saw_retry = false;
    while let Ok(event) = events.try_recv() {
        match event {
            EngineEvent::ConnectivityFault { reason, .. } => {
                assert!(reason.contains("link down"));
                saw_fault = true;
            }
            EngineEvent::Retrying { attempt, .. } => {
                assert_eq!(attempt, 1);
                saw_retry = true;
            }
            _ => {}
        }
    }
    assert!(saw_fault && saw_retry);
}

#[tokio::test(start_paused = true)]
async fn test_rejected_call_fails_terminally() {
    let broker = broker(BrokerConfig::default());
    let venue = ScriptedVenue::new(broker.sink(), Duration::from_millis(50));
    venue.script([Step::Fail(VenueError::Rejected("unknown account".into()))]);
    let done = record(&broker, "send_order");
    broker.start(venue.clone()).unwrap();

    broker.submit(call("send_order")).unwrap();
    broker.submit(call("send_order")).unwrap();
    wait_for(&done, 2).await;

    assert_eq!(venue.calls().len(), 2);
    let done = done.lock();
    assert_eq!(
        done[0].result,
        Err(EngineError::Venue(VenueError::Rejected("unknown account".into())))
    );
    assert!(done[1].is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_completion_buffered_until_handler_registered() {
    let broker = broker(BrokerConfig::default());
    let venue = ScriptedVenue::new(broker.sink(), Duration::from_millis(50));
    broker.start(venue.clone()).unwrap();

    broker.submit(call("deposit_detail")).unwrap();
    while broker.unclaimed() == 0 {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let done = record(&broker, "deposit_detail");
    assert_eq!(done.lock().len(), 1);
    assert_eq!(broker.unclaimed(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_reject_policy_refuses_unhandled_names() {
    let config = BrokerConfig {
        unhandled: UnhandledConfig {
            policy: UnhandledPolicy::Reject,
            ..Default::default()
        },
        ..Default::default()
    };
    let broker = broker(config);

    let err = broker.submit(call("stock_info")).unwrap_err();
    assert_eq!(err, EngineError::NoHandler("stock_info".into()));

    record(&broker, "stock_info");
    assert!(broker.submit(call("stock_info")).is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_unsolicited_reply_leaves_permit_alone() {
    let broker = broker(BrokerConfig::default());
    let venue = ScriptedVenue::new(broker.sink(), Duration::from_millis(50));
    venue.script([Step::Drop]);
    record(&broker, "minute_chart");
    broker.start(venue.clone()).unwrap();

    let token = broker.submit(call("minute_chart")).unwrap();
    while broker.in_flight().is_none() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    broker
        .sink()
        .deliver(Notification::reply("stock_info", false, Page::empty()));

    assert_eq!(broker.in_flight(), Some(token));
    let stray: Vec<Reply> = broker.stray_replies();
    assert_eq!(stray.len(), 1);
    assert_eq!(stray[0].name.as_str(), "stock_info");
}

#[tokio::test(start_paused = true)]
async fn test_decoder_follow_ups_are_dispatched() {
    let broker = broker(BrokerConfig::default());
    let venue = ScriptedVenue::new(broker.sink(), Duration::from_millis(50));
    record(&broker, "load_conditions");
    let chained = record(&broker, "send_condition");
    broker.start(venue.clone()).unwrap();

    let submission = Submission::decoded(
        VenueCall::new("load_conditions", "GetConditionLoad"),
        |_: &Reply| {
            let follow_up = Submission::ack(VenueCall::new("send_condition", "SendCondition"));
            Ok::<_, EngineError>(Decoded::new(Outcome::Ack).with_follow_up(follow_up))
        },
    );
    broker.submit(submission).unwrap();
    wait_for(&chained, 1).await;

    assert_eq!(venue.call_names(), vec!["load_conditions", "send_condition"]);
}

#[tokio::test(start_paused = true)]
async fn test_lifecycle() {
    let broker = broker(BrokerConfig::default());
    let venue = ScriptedVenue::new(broker.sink(), Duration::from_millis(50));

    broker.start(venue.clone()).unwrap();
    assert!(broker.is_running());
    assert_eq!(broker.start(venue.clone()), Err(EngineError::AlreadyRunning));

    broker.shutdown().await;
    assert!(!broker.is_running());
    assert_eq!(broker.submit(call("stock_info")), Err(EngineError::ShutDown));
    assert_eq!(broker.start(venue), Err(EngineError::ShutDown));
}
