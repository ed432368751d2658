
use std::sync::Arc;
use std::time::Duration;

use drill_core::evaluation::Evaluator;
use drill_core::model::{EvaluationResult, Language, ProblemId, Status};
use drill_core::session::{
    AutoSubmitGuard, Clock, PageSignal, SessionController, SessionError, SessionState,
    SubmitOutcome, SubmitReason, TickOutcome,
};
use drill_core::template;
use fakes::*;
use tokio::time;

use SessionState::*;
use SubmitReason::*;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_should_evaluate_once() {
    let evaluator = GatedEvaluator::new();
    let controller = SessionController::new(evaluator.clone());
    controller.start(fakes::problem(60), Language::Python).unwrap();
    controller.update_source(SOLUTION).unwrap();

    let tasks: Vec<_> = (0..32)
        .map(|i| {
            let c = controller.clone();
            let reason = [Timeout, Auto, Manual][i % 3];
            tokio::spawn(async move { c.request_submit(reason) })
        })
        .collect();
    let threads: Vec<_> = (0..8)
        .map(|_| {
            let c = controller.clone();
            std::thread::spawn(move || c.request_submit(Manual))
        })
        .collect();

    let mut outcomes = Vec::new();
    for t in tasks {
        outcomes.push(t.await.unwrap());
    }
    for t in threads {
        outcomes.push(t.join().unwrap());
    }

    assert_eq!(outcomes.iter().filter(|o| o.is_accepted()).count(), 1);
    assert!(outcomes.contains(&SubmitOutcome::Accepted { attempt: 1 }));
    assert_eq!(controller.state(), Submitting);
    assert_eq!(controller.request_submit(Manual), SubmitOutcome::Ignored(Submitting));

    evaluator.open();
    let submission = controller.wait_for_submission().await;
    assert_eq!(submission.attempt, 1);
    assert_eq!(&*submission.source, SOLUTION);
    assert_eq!(controller.state(), Submitted);
    assert_eq!(controller.request_submit(Auto), SubmitOutcome::Ignored(Submitted));
    assert_eq!(evaluator.inner.calls(), 1);
}

#[tokio::test]
async fn countdown_should_submit_on_timeout() {
    let evaluator = CountingEvaluator::new();
    let c = SessionController::new(evaluator.clone());
    assert_eq!(c.tick(), Err(SessionError::NotStarted));

    c.start(fakes::problem(3), Language::Java).unwrap();
    assert_eq!(c.remaining_seconds(), 3);
    assert_eq!(c.tick(), Ok(TickOutcome::Running { remaining: 2 }));
    assert_eq!(c.tick(), Ok(TickOutcome::Running { remaining: 1 }));
    assert_eq!(
        c.tick(),
        Ok(TickOutcome::Expired(SubmitOutcome::Accepted { attempt: 1 }))
    );
    assert_eq!(c.remaining_seconds(), 0);

    let submission = c.wait_for_submission().await;
    assert_eq!(submission.reason, Timeout);
    assert_eq!(submission.language, Language::Java);
    assert!(submission.result.is_success());

    assert_eq!(c.tick(), Ok(TickOutcome::Stopped(Submitted)));
    assert_eq!(c.remaining_seconds(), 0);
    assert_eq!(evaluator.calls(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn ticks_racing_a_submit_should_stop_at_the_transition() {
    const BUDGET: u32 = 100_000_000;

    let evaluator = GatedEvaluator::new();
    let c = SessionController::new(evaluator.clone());
    c.start(fakes::problem(BUDGET), Language::Python).unwrap();
    c.update_source(SOLUTION).unwrap();

    let tickers: Vec<_> = (0..4)
        .map(|_| {
            let c = c.clone();
            std::thread::spawn(move || {
                let mut running = 0u32;
                while let Ok(TickOutcome::Running { .. }) = c.tick() {
                    running += 1;
                }
                running
            })
        })
        .collect();

    std::thread::sleep(Duration::from_millis(2));
    assert!(c.request_submit(Manual).is_accepted());
    let at_submit = c.remaining_seconds();

    let running: u32 = tickers.into_iter().map(|t| t.join().unwrap()).sum();
    assert_eq!(c.remaining_seconds(), at_submit);
    assert_eq!(running, BUDGET - at_submit);
    assert_eq!(c.tick(), Ok(TickOutcome::Stopped(Submitting)));
    assert_eq!(c.remaining_seconds(), at_submit);

    evaluator.open();
    c.wait_for_submission().await;
    assert_eq!(c.tick(), Ok(TickOutcome::Stopped(Submitted)));
    assert_eq!(c.remaining_seconds(), at_submit);
}

#[tokio::test]
async fn source_should_be_frozen_at_submission() {
    let evaluator = GatedEvaluator::new();
    let c = SessionController::new(evaluator.clone());
    c.start(fakes::problem(60), Language::Python).unwrap();

    assert_eq!(c.update_source("first version"), Ok(true));
    assert!(c.request_submit(Manual).is_accepted());
    assert_eq!(c.update_source("second version"), Ok(false));

    evaluator.open();
    let submission = c.wait_for_submission().await;
    assert_eq!(&*submission.source, "first version");
    assert_eq!(c.snapshot().unwrap().source_text, "first version");
    assert_eq!(evaluator.inner.sources(), ["first version"]);

    assert_eq!(c.update_source("third version"), Ok(false));
    assert_eq!(c.snapshot().unwrap().source_text, "first version");
}

#[tokio::test(start_paused = true)]
async fn manual_submit_mid_countdown_should_evaluate_once() {
    let evaluator = CountingEvaluator::new();
    let c = SessionController::new(evaluator.clone());
    c.start(fakes::problem(5), Language::Python).unwrap();
    c.update_source(SOLUTION).unwrap();
    let ticker = c.drive(Clock::every_second());

    time::sleep(Duration::from_millis(3500)).await;
    assert_eq!(c.remaining_seconds(), 2);
    assert!(c.request_submit(Manual).is_accepted());

    let submission = c.wait_for_submission().await;
    ticker.await.unwrap();
    time::sleep(Duration::from_secs(5)).await;

    assert_eq!(submission.reason, Manual);
    assert_eq!(c.remaining_seconds(), 2);
    assert_eq!(c.state(), Submitted);
    assert_eq!(evaluator.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn clock_should_drive_session_to_timeout() {
    let evaluator = CountingEvaluator::new();
    let c = SessionController::new(evaluator.clone());
    c.start(fakes::problem(5), Language::Cpp).unwrap();

    c.drive(Clock::every_second()).await.unwrap();

    let submission = c.wait_for_submission().await;
    assert_eq!(submission.reason, Timeout);
    assert_eq!(c.remaining_seconds(), 0);
    assert_eq!(evaluator.calls(), 1);
}

#[tokio::test]
async fn evaluator_failure_should_still_submit() {
    let evaluators: [Arc<dyn Evaluator>; 2] =
        [Arc::new(FailingEvaluator), Arc::new(PanickingEvaluator)];
    for evaluator in evaluators {
        let name = evaluator.name();
        let c = SessionController::new(evaluator);
        c.start(fakes::problem(60), Language::Python).unwrap();
        c.update_source(SOLUTION).unwrap();
        assert!(c.request_submit(Manual).is_accepted());

        let submission = c.wait_for_submission().await;
        let res = &submission.result;
        assert_eq!(res.status(), Status::Error, "{}", name);
        assert_eq!(
            res.error_message(),
            Some(EvaluationResult::GRADING_FAILURE_MESSAGE)
        );
        assert_eq!(res.tests_passed().to_string(), "0/2");
        assert_eq!(c.state(), Submitted);
    }
}

#[tokio::test]
async fn start_should_be_refused_while_active() {
    let evaluator = GatedEvaluator::new();
    let c = SessionController::new(evaluator.clone());
    c.start(fakes::problem(60), Language::Python).unwrap();

    let other = fakes::problem(10);
    assert_eq!(
        c.start(other.clone(), Language::Java),
        Err(SessionError::AlreadyActive(ProblemId::new("two-sum"), InProgress))
    );

    c.request_submit(Manual);
    assert_eq!(
        c.start(other.clone(), Language::Java),
        Err(SessionError::AlreadyActive(ProblemId::new("two-sum"), Submitting))
    );

    evaluator.open();
    c.wait_for_submission().await;
    assert!(c.submission().is_some());

    c.start(other, Language::Java).unwrap();
    assert_eq!(c.state(), InProgress);
    assert_eq!(c.remaining_seconds(), 10);
    assert!(c.submission().is_none());

    let session = c.snapshot().unwrap();
    assert_eq!(session.language, Language::Java);
    assert_eq!(session.source_text, template::starter_code(Language::Java));
    assert_eq!(session.last_saved_at, None);
}

#[tokio::test]
async fn second_session_should_get_next_attempt() {
    let evaluator = CountingEvaluator::new();
    let c = SessionController::new(evaluator.clone());

    for expected in 1..=2 {
        c.start(fakes::problem(60), Language::Python).unwrap();
        c.update_source(SOLUTION).unwrap();
        assert_eq!(
            c.request_submit(Manual),
            SubmitOutcome::Accepted { attempt: expected }
        );
        assert_eq!(c.wait_for_submission().await.attempt, expected);
    }
    assert_eq!(evaluator.calls(), 2);
}

#[tokio::test]
async fn operations_before_start_should_be_rejected() {
    let c = SessionController::new(CountingEvaluator::new());
    assert_eq!(c.state(), Idle);
    assert_eq!(c.update_source("x"), Err(SessionError::NotStarted));
    assert_eq!(c.request_submit(Manual), SubmitOutcome::Ignored(Idle));
    assert_eq!(c.snapshot(), None);
    assert!(c.submission().is_none());
}

#[tokio::test]
async fn guard_should_submit_once_on_leave() {
    let evaluator = CountingEvaluator::new();
    let c = SessionController::new(evaluator.clone());
    let guard = AutoSubmitGuard::new(c.clone(), true);
    c.start(fakes::problem(60), Language::Python).unwrap();
    c.update_source(SOLUTION).unwrap();

    assert_eq!(guard.observe(PageSignal::TabVisible), None);
    assert_eq!(
        guard.observe(PageSignal::TabHidden),
        Some(SubmitOutcome::Accepted { attempt: 1 })
    );
    assert_eq!(guard.observe(PageSignal::PageUnload), None);

    let submission = c.wait_for_submission().await;
    assert_eq!(submission.reason, Auto);
    assert_eq!(guard.observe(PageSignal::TabHidden), None);
    assert_eq!(guard.fired_count(), 1);
    assert_eq!(evaluator.calls(), 1);
}

#[tokio::test]
async fn disabled_guard_should_leave_timer_and_manual_submit_alone() {
    let evaluator = CountingEvaluator::new();
    let c = SessionController::new(evaluator.clone());
    let guard = AutoSubmitGuard::new(c.clone(), false);
    c.start(fakes::problem(60), Language::Python).unwrap();
    c.update_source(SOLUTION).unwrap();

    assert_eq!(guard.observe(PageSignal::TabHidden), None);
    assert_eq!(guard.observe(PageSignal::PageUnload), None);
    assert_eq!(c.state(), InProgress);
    assert_eq!(c.tick(), Ok(TickOutcome::Running { remaining: 59 }));

    assert!(c.request_submit(Manual).is_accepted());
    assert_eq!(c.wait_for_submission().await.reason, Manual);
    assert_eq!(guard.fired_count(), 0);
}

#[tokio::test]
async fn guard_should_not_submit_blank_source() {
    let c = SessionController::new(CountingEvaluator::new());
    let guard = AutoSubmitGuard::new(c.clone(), true);
    c.start(fakes::problem(60), Language::Python).unwrap();
    c.update_source("  \n\t").unwrap();

    assert_eq!(guard.observe(PageSignal::PageUnload), None);
    assert_eq!(c.state(), InProgress);

    c.update_source(SOLUTION).unwrap();
    assert!(guard.observe(PageSignal::PageUnload).unwrap().is_accepted());
}
