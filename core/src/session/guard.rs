use std::sync::atomic::{AtomicUsize, Ordering};

use super::{SessionController, SessionState, SubmitOutcome, SubmitReason};

/// Something that happened to the window (or terminal) the session lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum PageSignal {
    TabHidden,
    TabVisible,
    PageUnload,
}

impl PageSignal {
    pub const fn forces_submit(&self) -> bool {
        matches!(self, Self::TabHidden | Self::PageUnload)
    }
}

/// Submits on behalf of the user when they leave the session.
pub struct AutoSubmitGuard {
    controller: SessionController,
    enabled: bool,
    fired: AtomicUsize,
}

impl AutoSubmitGuard {
    pub fn new(controller: SessionController, enabled: bool) -> Self {
        Self {
            controller,
            enabled,
            fired: AtomicUsize::new(0),
        }
    }

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// How many times this guard asked for a submission.
    pub fn fired_count(&self) -> usize {
        self.fired.load(Ordering::SeqCst)
    }

    /// Returns the controller's answer if a submission was requested.
    pub fn observe(&self, signal: PageSignal) -> Option<SubmitOutcome> {
        if !signal.forces_submit() {
            return None;
        }
        if !self.enabled {
            log::debug!("Auto-submit is disabled; ignoring {}", signal);
            return None;
        }
        if self.controller.state() != SessionState::InProgress {
            return None;
        }
        if self.controller.source_is_blank() {
            log::debug!("Nothing written yet; ignoring {}", signal);
            return None;
        }

        self.fired.fetch_add(1, Ordering::SeqCst);
        log::info!("Auto-submitting on {}", signal);
        Some(self.controller.request_submit(SubmitReason::Auto))
    }
}
