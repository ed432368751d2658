use std::ops::ControlFlow;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Local;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::state::AtomicState;
use super::*;
use crate::evaluation::Evaluator;
use crate::model::{EvaluationResult, Language, Problem};
use crate::template;

/// Owns one practice session at a time and turns the first submission
/// request into exactly one evaluation. Cheap to clone; clones share the session.
#[derive(Clone)]
pub struct SessionController {
    shared: Arc<Shared>,
}

struct Shared {
    state: AtomicState,
    remaining: AtomicU32,
    attempt: AtomicU64,
    draft: Mutex<Option<Draft>>,
    evaluator: Arc<dyn Evaluator>,
    autosave: Option<AutoSaveScheduler>,
    published: watch::Sender<Option<Arc<Submission>>>,
    runtime: Handle,
}

struct Draft {
    problem: Arc<Problem>,
    language: Language,
    source: String,
}

impl SessionController {
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    pub fn new(evaluator: Arc<dyn Evaluator>) -> Self {
        Self::build(evaluator, None)
    }

    /// Like [`SessionController::new`], forwarding every edit to `autosave`.
    pub fn with_autosave(evaluator: Arc<dyn Evaluator>, autosave: AutoSaveScheduler) -> Self {
        Self::build(evaluator, Some(autosave))
    }

    fn build(evaluator: Arc<dyn Evaluator>, autosave: Option<AutoSaveScheduler>) -> Self {
        let (published, _) = watch::channel(None);
        Self {
            shared: Arc::new(Shared {
                state: AtomicState::new(SessionState::Idle),
                remaining: AtomicU32::new(0),
                attempt: AtomicU64::new(0),
                draft: Mutex::new(None),
                evaluator,
                autosave,
                published,
                runtime: Handle::current(),
            }),
        }
    }

    /// Starts a session with the language's starter code. Refused while the
    /// previous session is still running or being graded.
    pub fn start(
        &self,
        problem: impl Into<Arc<Problem>>,
        language: Language,
    ) -> Result<(), SessionError> {
        let problem = problem.into();
        let shared = &*self.shared;
        let mut draft = shared.lock_draft();

        let state = shared.state.load();
        if state.is_active() {
            let active_id = draft
                .as_ref()
                .map_or_else(|| problem.id.clone(), |d| d.problem.id.clone());
            return Err(SessionError::AlreadyActive(active_id, state));
        }

        log::info!(
            "Session started: '{}' in {} ({}s)",
            problem.id,
            language,
            problem.time_budget_secs
        );
        shared
            .remaining
            .store(problem.time_budget_secs, Ordering::SeqCst);
        *draft = Some(Draft {
            problem,
            language,
            source: template::starter_code(language),
        });
        shared.published.send_replace(None);
        shared.state.store(SessionState::InProgress);
        Ok(())
    }

    /// Replaces the source text. Returns `false` if the session has already
    /// been submitted and the edit was ignored.
    pub fn update_source(&self, text: impl Into<String>) -> Result<bool, SessionError> {
        let shared = &*self.shared;
        let mut draft = shared.lock_draft();

        match shared.state.load() {
            SessionState::Idle => Err(SessionError::NotStarted),
            SessionState::InProgress => {
                let d = draft.as_mut().ok_or(SessionError::NotStarted)?;
                d.source = text.into();
                if let Some(autosave) = &shared.autosave {
                    autosave.schedule(d.language, d.source.clone());
                }
                Ok(true)
            }
            state => {
                log::debug!("Ignored an edit while {}", state);
                Ok(false)
            }
        }
    }

    /// Freezes the source and starts grading it. Only the first request of a
    /// session is accepted; every later one is ignored.
    pub fn request_submit(&self, reason: SubmitReason) -> SubmitOutcome {
        let shared = &*self.shared;

        let state = shared.state.load();
        if state != SessionState::InProgress {
            log::debug!("Ignored {} submission while {}", reason, state);
            return SubmitOutcome::Ignored(state);
        }

        let (problem, language, source) = {
            let draft = shared.lock_draft();
            let Some(d) = draft.as_ref() else {
                return SubmitOutcome::Ignored(state);
            };
            if let Err(actual) = shared
                .state
                .transition(SessionState::InProgress, SessionState::Submitting)
            {
                log::debug!("Ignored {} submission while {}", reason, actual);
                return SubmitOutcome::Ignored(actual);
            }
            (d.problem.clone(), d.language, Arc::<str>::from(d.source.as_str()))
        };

        let attempt = shared.attempt.fetch_add(1, Ordering::SeqCst) + 1;
        log::info!("Submitting '{}' (attempt #{}, {})", problem.id, attempt, reason);

        let job = Job {
            attempt,
            reason,
            problem,
            language,
            source,
        };
        shared.runtime.spawn(job.run(self.shared.clone()));

        SubmitOutcome::Accepted { attempt }
    }

    /// Counts down one second. Reaching zero requests a
    /// [`Timeout`](SubmitReason::Timeout) submission.
    pub fn tick(&self) -> Result<TickOutcome, SessionError> {
        let shared = &*self.shared;
        let remaining = {
            // Same lock as the submit transition, so no decrement lands after it.
            let _draft = shared.lock_draft();
            match shared.state.load() {
                SessionState::Idle => return Err(SessionError::NotStarted),
                SessionState::InProgress => {}
                state => return Ok(TickOutcome::Stopped(state)),
            }
            let remaining = shared.remaining.load(Ordering::SeqCst).saturating_sub(1);
            shared.remaining.store(remaining, Ordering::SeqCst);
            remaining
        };

        if remaining == 0 {
            log::info!("Time is up");
            Ok(TickOutcome::Expired(
                self.request_submit(SubmitReason::Timeout),
            ))
        } else {
            Ok(TickOutcome::Running { remaining })
        }
    }

    /// Ticks this controller on every `clock` period until the session stops running.
    pub fn drive(&self, clock: Clock) -> JoinHandle<()> {
        let this = self.clone();
        clock.spawn(&self.shared.runtime, move || match this.tick() {
            Ok(TickOutcome::Running { .. }) => ControlFlow::Continue(()),
            _ => ControlFlow::Break(()),
        })
    }

    /// `Submitted` can be observed slightly before the submission is
    /// published; use [`wait_for_submission`](Self::wait_for_submission) to get it.
    pub fn state(&self) -> SessionState {
        self.shared.state.load()
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.shared.remaining.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> Option<Session> {
        let shared = &*self.shared;
        let draft = shared.lock_draft();
        let d = draft.as_ref()?;
        Some(Session {
            problem_id: d.problem.id.clone(),
            language: d.language,
            source_text: d.source.clone(),
            remaining_seconds: self.remaining_seconds(),
            state: shared.state.load(),
            last_saved_at: shared.autosave.as_ref().and_then(|a| a.last_saved_at()),
        })
    }

    pub fn source_is_blank(&self) -> bool {
        self.shared
            .lock_draft()
            .as_ref()
            .map_or(true, |d| d.source.trim().is_empty())
    }

    pub fn submission(&self) -> Option<Arc<Submission>> {
        self.shared.published.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<Submission>>> {
        self.shared.published.subscribe()
    }

    /// Resolves once the current session's submission is published.
    pub async fn wait_for_submission(&self) -> Arc<Submission> {
        let mut rx = self.subscribe();
        loop {
            if let Some(submission) = rx.borrow_and_update().clone() {
                return submission;
            }
            // The sender lives as long as `self`, so this never reports closed.
            let _ = rx.changed().await;
        }
    }
}

impl Shared {
    fn lock_draft(&self) -> MutexGuard<'_, Option<Draft>> {
        self.draft.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One accepted submission, graded on its own task.
struct Job {
    attempt: u64,
    reason: SubmitReason,
    problem: Arc<Problem>,
    language: Language,
    source: Arc<str>,
}

impl Job {
    async fn run(self, shared: Arc<Shared>) {
        let result = self.evaluate(shared.evaluator.clone()).await;

        if shared.attempt.load(Ordering::SeqCst) != self.attempt {
            log::debug!("Discarding the result of stale attempt #{}", self.attempt);
            return;
        }
        let _draft = shared.lock_draft();
        if let Err(state) = shared
            .state
            .transition(SessionState::Submitting, SessionState::Submitted)
        {
            log::debug!("Discarding attempt #{} while {}", self.attempt, state);
            return;
        }

        log::info!(
            "Graded attempt #{}: {} ({})",
            self.attempt,
            result.status(),
            result.tests_passed()
        );
        shared.published.send_replace(Some(Arc::new(Submission {
            attempt: self.attempt,
            reason: self.reason,
            problem_id: self.problem.id.clone(),
            language: self.language,
            source: self.source,
            result,
            submitted_at: Local::now(),
        })));
    }

    /// Runs the evaluator on a separate task so that a panic in it still
    /// ends the submission.
    async fn evaluate(&self, evaluator: Arc<dyn Evaluator>) -> EvaluationResult {
        let name = evaluator.name();
        let total = self.problem.num_testcases();
        let task = {
            let problem = self.problem.clone();
            let source = self.source.clone();
            let language = self.language;
            tokio::spawn(async move { evaluator.evaluate(&source, language, &problem).await })
        };

        match task.await {
            Ok(Ok(res)) => res,
            Ok(Err(e)) => {
                log::error!("{} evaluator failed: {:#}", name, e);
                EvaluationResult::grading_failure(total)
            }
            Err(e) => {
                log::error!("{} evaluator panicked: {}", name, e);
                EvaluationResult::grading_failure(total)
            }
        }
    }
}
