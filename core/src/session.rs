pub mod autosave;
pub mod clock;
pub mod controller;
pub mod guard;
pub mod state;

pub use autosave::AutoSaveScheduler;
pub use clock::Clock;
pub use controller::SessionController;
pub use guard::{AutoSubmitGuard, PageSignal};
pub use state::*;

use crate::model::ProblemId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Session for '{0}' is still {1}")]
    AlreadyActive(ProblemId, SessionState),

    #[error("No session has been started")]
    NotStarted,
}
