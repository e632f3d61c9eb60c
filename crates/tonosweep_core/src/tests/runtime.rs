//! Tests for the sweep runtime

use std::cell::RefCell;
use std::rc::Rc;

use super::{ints, xy_spec};
use crate::error::{NotificationError, SweepError};
use crate::model::{
    DimensionId, NotificationOutcome, SummaryReport, SweepMode, SweepSpecification,
};
use crate::notify::COMPLETION_SUBJECT;
use crate::runtime::{Clock, ManualClock, Phase, SweepRuntime, ceil_minutes, round_minutes};

fn runtime(mode: SweepMode) -> (SweepRuntime<ManualClock>, ManualClock) {
    let clock = ManualClock::default();
    let rt = SweepRuntime::with_clock(xy_spec(), 5, mode, clock.clone()).unwrap();
    (rt, clock)
}

#[test]
fn test_minute_rounding() {
    assert_eq!(round_minutes(0.0), 0);
    assert_eq!(round_minutes(29.9), 0);
    assert_eq!(round_minutes(30.0), 1);
    assert_eq!(round_minutes(89.0), 1);
    assert_eq!(round_minutes(90.0), 2);

    assert_eq!(ceil_minutes(0.0), 0);
    assert_eq!(ceil_minutes(59.0), 1);
    assert_eq!(ceil_minutes(60.0), 1);
    assert_eq!(ceil_minutes(61.0), 2);
    assert_eq!(ceil_minutes(-5.0), 0);
}

#[test]
fn test_construction_freezes_totals() {
    let (rt, _) = runtime(SweepMode::Single);
    assert_eq!(rt.total_dimensions(), 2);
    assert_eq!(rt.total_trials(), 25);
    assert_eq!(rt.frequency_count(), 5);
    assert!(rt.completed_dimensions().is_empty());
    assert_eq!(rt.phase(), Phase::Active);

    let (rt, _) = runtime(SweepMode::Paired);
    assert_eq!(rt.total_dimensions(), 1);
    assert_eq!(rt.total_trials(), 30);
}

#[test]
fn test_origin_time_is_captured_at_construction() {
    let clock = ManualClock::default();
    clock.advance_secs(1_000);
    let start = clock.now();
    let rt = SweepRuntime::with_clock(xy_spec(), 5, SweepMode::Single, clock.clone()).unwrap();
    clock.advance_secs(500);
    assert_eq!(rt.origin_time(), start);
}

#[test]
fn test_construction_rejects_single_key_pairing() {
    let spec = SweepSpecification::new().with("x", ints(&[1]));
    let err = SweepRuntime::new(spec, 5, SweepMode::Paired).unwrap_err();
    assert!(matches!(err, SweepError::InvalidSpecification(_)));
}

#[test]
fn test_register_completion_rejects_duplicates() {
    let (mut rt, _) = runtime(SweepMode::Single);
    rt.register_completion("x".into()).unwrap();
    assert_eq!(
        rt.register_completion("x".into()),
        Err(SweepError::DuplicateDimension("x".into()))
    );
    rt.register_completion("y".into()).unwrap();
    assert_eq!(rt.completed_dimensions().len(), rt.total_dimensions());
}

#[test]
fn test_pairs_are_unordered_for_registration() {
    let (mut rt, _) = runtime(SweepMode::Paired);
    rt.register_completion(("y", "x").into()).unwrap();
    assert_eq!(
        rt.register_completion(("x", "y").into()),
        Err(SweepError::DuplicateDimension(("x", "y").into()))
    );
}

#[test]
fn test_register_completion_rejects_unknown_dimensions() {
    let (mut rt, _) = runtime(SweepMode::Single);
    assert!(matches!(
        rt.register_completion("z".into()),
        Err(SweepError::UnknownDimension(_))
    ));
    // pair identifiers do not belong to a single-variable sweep
    assert!(matches!(
        rt.register_completion(("x", "y").into()),
        Err(SweepError::UnknownDimension(_))
    ));
    assert!(rt.completed_dimensions().is_empty());
}

#[test]
fn test_first_update_has_no_estimate() {
    let (rt, clock) = runtime(SweepMode::Single);
    clock.advance_secs(120);
    let status = rt.live_update(0, 0, &"x".into()).unwrap();
    assert_eq!(status.completed_trials, 0);
    assert_eq!(status.remaining_minutes, None);
    assert_eq!(status.elapsed_minutes, 2);
}

#[test]
fn test_live_update_ordinals() {
    let (rt, _) = runtime(SweepMode::Single);
    let status = rt.live_update(3, 2, &"x".into()).unwrap();
    assert_eq!(status.dimension_ordinal, 1);
    assert_eq!(status.total_dimensions, 2);
    assert_eq!(status.trial_ordinal, 3);
    assert_eq!(status.dimension_trial_count, 3);
    assert_eq!(status.frequency_ordinal, 4);
    assert_eq!(status.frequency_count, 5);
    assert_eq!(status.total_trials, 25);
}

#[test]
fn test_remaining_estimate_is_linear_and_rounds_up() {
    let (rt, clock) = runtime(SweepMode::Single);
    // 10 of 25 trials in 10 minutes: 25 minutes total, 15 left
    clock.advance_secs(600);
    let status = rt.live_update(0, 2, &"x".into()).unwrap();
    assert_eq!(status.completed_trials, 10);
    assert_eq!(status.remaining_minutes, Some(15));

    // 11 of 25 after 601s: 1365.9s total, 764.9s left -> 13 minutes
    clock.advance_secs(1);
    let status = rt.live_update(1, 2, &"x".into()).unwrap();
    assert_eq!(status.completed_trials, 11);
    assert_eq!(status.remaining_minutes, Some(13));
    assert_eq!(status.elapsed_minutes, 10);
}

#[test]
fn test_completed_dimensions_count_every_frequency() {
    let (mut rt, _) = runtime(SweepMode::Paired);
    let status = rt.live_update(4, 5, &("x", "y").into()).unwrap();
    assert_eq!(status.completed_trials, 29);
    assert_eq!(status.dimension_trial_count, 6);
    rt.register_completion(("x", "y").into()).unwrap();
    assert_eq!(rt.completed_dimensions().len(), 1);
}

#[test]
fn test_live_update_validation() {
    let (mut rt, _) = runtime(SweepMode::Single);
    assert!(matches!(
        rt.live_update(5, 0, &"x".into()),
        Err(SweepError::IndexOutOfRange { what: "frequency", index: 5, len: 5 })
    ));
    assert!(matches!(
        rt.live_update(0, 3, &"x".into()),
        Err(SweepError::IndexOutOfRange { what: "trial", index: 3, len: 3 })
    ));
    assert!(matches!(
        rt.live_update(0, 0, &"nope".into()),
        Err(SweepError::UnknownDimension(_))
    ));

    rt.register_completion("x".into()).unwrap();
    assert_eq!(
        rt.live_update(0, 0, &"x".into()),
        Err(SweepError::DimensionAlreadyCompleted("x".into()))
    );
}

#[test]
fn test_monotonic_completed_trials() {
    let (mut rt, _) = runtime(SweepMode::Single);
    let mut last = 0;
    for dim in ["x", "y"] {
        let id: DimensionId = dim.into();
        let trials = rt.dimension_trial_count(&id).unwrap();
        for trial in 0..trials {
            for freq in 0..rt.frequency_count() {
                let status = rt.live_update(freq, trial, &id).unwrap();
                assert!(status.completed_trials >= last);
                last = status.completed_trials;
            }
        }
        rt.register_completion(id).unwrap();
    }
    assert_eq!(last, rt.total_trials() - 1);
}

#[test]
fn test_final_report_rounds_up() {
    for (secs, minutes) in [(59, 1), (60, 1), (61, 2), (0, 0), (3_599, 60)] {
        let (mut rt, clock) = runtime(SweepMode::Single);
        clock.advance_secs(secs);
        let summary = rt.final_report(false).unwrap();
        assert_eq!(summary.elapsed_minutes, minutes, "{secs}s");
        assert_eq!(summary.notification, NotificationOutcome::NotRequested);
    }
}

#[test]
fn test_final_report_contents() {
    let (mut rt, clock) = runtime(SweepMode::Paired);
    rt.register_completion(("x", "y").into()).unwrap();
    clock.advance_secs(90);
    let summary = rt.final_report(false).unwrap();
    assert_eq!(summary.mode, SweepMode::Paired);
    assert_eq!(summary.total_dimensions, 1);
    assert_eq!(summary.frequency_count, 5);
    assert_eq!(summary.total_trials, 30);
    assert_eq!(summary.started_at, rt.origin_time());
    assert_eq!(
        summary.finished_at.duration_since(summary.started_at).as_secs(),
        90
    );
}

#[test]
fn test_use_after_completion_is_rejected() {
    let (mut rt, _) = runtime(SweepMode::Single);
    rt.final_report(false).unwrap();
    assert_eq!(rt.phase(), Phase::Complete);

    assert_eq!(
        rt.live_update(0, 0, &"x".into()),
        Err(SweepError::PostCompletionUse("live_update"))
    );
    assert_eq!(
        rt.register_completion("x".into()),
        Err(SweepError::PostCompletionUse("register_completion"))
    );
    assert_eq!(
        rt.final_report(false),
        Err(SweepError::PostCompletionUse("final_report"))
    );
}

#[test]
fn test_notification_is_delivered_once() {
    let sent: Rc<RefCell<Vec<(String, String)>>> = Rc::default();
    let log = sent.clone();
    let sink = move |subject: &str, body: &str| -> Result<(), NotificationError> {
        log.borrow_mut().push((subject.to_string(), body.to_string()));
        Ok(())
    };

    let clock = ManualClock::default();
    let mut rt = SweepRuntime::with_clock(xy_spec(), 5, SweepMode::Single, clock.clone())
        .unwrap()
        .with_notifier(Box::new(sink));
    clock.advance_secs(125);
    let summary = rt.final_report(true).unwrap();

    assert_eq!(summary.notification, NotificationOutcome::Delivered);
    let sent = sent.borrow();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, COMPLETION_SUBJECT);
    assert_eq!(sent[0].1, "TESTED 2 VARIABLES AT 5 FREQUENCIES IN 3 MINUTES");
}

#[test]
fn test_notification_failure_is_isolated() {
    let failing = |_: &str, _: &str| -> Result<(), NotificationError> {
        Err(NotificationError::Transport("authentication failed".to_string()))
    };

    let clock = ManualClock::default();
    let mut rt = SweepRuntime::with_clock(xy_spec(), 5, SweepMode::Single, clock.clone())
        .unwrap()
        .with_notifier(Box::new(failing));
    clock.advance_secs(61);
    let summary = rt.final_report(true).unwrap();

    assert_eq!(summary.elapsed_minutes, 2);
    assert_eq!(summary.total_dimensions, 2);
    assert!(matches!(
        summary.notification,
        NotificationOutcome::Failed(ref reason) if reason.contains("authentication failed")
    ));
}

#[test]
fn test_notification_without_sink() {
    let (mut rt, _) = runtime(SweepMode::Single);
    let summary = rt.final_report(true).unwrap();
    assert!(matches!(summary.notification, NotificationOutcome::Failed(_)));
}

#[test]
fn test_finish_then_notify_separately() {
    let sent: Rc<RefCell<Vec<String>>> = Rc::default();
    let log = sent.clone();
    let sink = move |_: &str, body: &str| -> Result<(), NotificationError> {
        log.borrow_mut().push(body.to_string());
        Ok(())
    };

    let clock = ManualClock::default();
    let mut rt = SweepRuntime::with_clock(xy_spec(), 5, SweepMode::Single, clock.clone())
        .unwrap()
        .with_notifier(Box::new(sink));

    assert_eq!(
        rt.send_notification(&unfinished_summary()),
        Err(SweepError::NotFinished("send_notification"))
    );

    clock.advance_secs(240);
    let summary = rt.finish().unwrap();
    assert_eq!(rt.phase(), Phase::Complete);
    assert_eq!(summary.notification, NotificationOutcome::NotRequested);
    assert!(sent.borrow().is_empty());

    // time spent delivering is not part of the summary
    clock.advance_secs(600);
    assert_eq!(rt.send_notification(&summary), Ok(NotificationOutcome::Delivered));
    assert_eq!(
        sent.borrow().as_slice(),
        ["TESTED 2 VARIABLES AT 5 FREQUENCIES IN 4 MINUTES"]
    );

    assert_eq!(
        rt.send_notification(&summary),
        Err(SweepError::NotificationAlreadySent)
    );
    assert_eq!(sent.borrow().len(), 1);
    assert_eq!(rt.finish(), Err(SweepError::PostCompletionUse("finish")));
}

fn unfinished_summary() -> SummaryReport {
    SummaryReport {
        mode: SweepMode::Single,
        total_dimensions: 2,
        frequency_count: 5,
        total_trials: 25,
        started_at: jiff::Timestamp::UNIX_EPOCH,
        finished_at: jiff::Timestamp::UNIX_EPOCH,
        elapsed_minutes: 0,
        notification: NotificationOutcome::NotRequested,
    }
}

#[test]
fn test_final_report_notify_sends_only_once() {
    let (mut rt, _) = runtime(SweepMode::Single);
    let summary = rt.final_report(true).unwrap();
    assert_eq!(
        rt.send_notification(&summary),
        Err(SweepError::NotificationAlreadySent)
    );
}
