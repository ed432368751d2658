pub mod error {
    #[allow(unused_imports)]
    pub(crate) use anyhow::{anyhow, bail, ensure, Context as _};
    pub use anyhow::{Error, Result};
}

use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Local};
use colored::Colorize;
use error::*;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::evaluation::Evaluator;
use crate::model::{EvaluationResult, Language, Problem};
use crate::session::{
    Clock, SessionController, SessionState, SubmitOutcome, SubmitReason, TickOutcome,
};
use crate::storage::SourceStore;
use crate::{style, template};

pub fn init_config(dir: impl AsRef<Path>) -> Result<PathBuf> {
    Config::init_in_dir(dir).context("Failed to write the example config")
}

/// Language given explicitly, or guessed from the file extension.
pub fn resolve_language(explicit: Option<Language>, filepath: impl AsRef<Path>) -> Result<Language> {
    let filepath = filepath.as_ref();
    explicit
        .or_else(|| Language::from_path(filepath))
        .with_context(|| format!("Cannot tell the language of {:?}; pass --lang", filepath))
}

/// Grades `filepath` once, with a spinner while the evaluator works.
pub async fn evaluate_file(
    evaluator: &dyn Evaluator,
    filepath: impl AsRef<Path>,
    language: Language,
    problem: &Problem,
) -> Result<EvaluationResult> {
    let filepath = filepath.as_ref();
    let source = fsutil::read_to_string(filepath)?;

    let spinner = ProgressBar::new_spinner()
        .with_style(ProgressStyle::default_spinner().template("{spinner} {msg}")?)
        .with_message(format!(
            "Grading {} with the {} evaluator ...",
            filepath.display(),
            evaluator.name()
        ));
    spinner.enable_steady_tick(Duration::from_millis(80));

    let res = evaluator.evaluate(&source, language, problem).await;

    spinner.finish_and_clear();
    let res = res.with_context(|| format!("Failed to grade {:?}", filepath))?;
    style::print_evaluation_result(&res);
    Ok(res)
}

/// Makes sure `filepath` holds something to edit: the saved draft when
/// `resume` is set and one exists, else the starter code. An existing file is
/// kept as is. Returns the file's contents.
pub fn prepare_source_file(
    filepath: impl AsRef<Path>,
    language: Language,
    store: Option<&dyn SourceStore>,
    resume: bool,
) -> Result<String> {
    let filepath = filepath.as_ref();

    let draft = match (store, resume) {
        (Some(store), true) => store.load(language)?,
        _ => None,
    };

    if let Some(draft) = draft {
        log::info!("Resuming the saved {} draft", language);
        fsutil::write_with_mkdir(filepath, &draft)?;
        return Ok(draft);
    }

    if template::write_if_absent(language, filepath)? {
        log::info!("Wrote the {} starter code to {:?}", language, filepath);
    } else {
        log::info!("Using the existing {:?}", filepath);
    }
    Ok(fsutil::read_to_string(filepath)?)
}

/// Polls `filepath` and feeds every change into `controller` until the
/// session leaves `InProgress`.
pub fn watch_source_file(
    filepath: impl AsRef<Path>,
    controller: SessionController,
    interval: Duration,
) -> JoinHandle<()> {
    let filepath = filepath.as_ref().to_owned();
    tokio::spawn(async move {
        let mut last_source: Option<String> = None;

        while controller.state() == SessionState::InProgress {
            match fsutil::read_to_string_if_exists(&filepath) {
                Ok(Some(source)) if Some(&source) != last_source.as_ref() => {
                    if let Err(e) = controller.update_source(source.as_str()) {
                        log::warn!("{}", e);
                        break;
                    }
                    last_source = Some(source);
                }
                Ok(_) => {}
                Err(e) => log::warn!("{}", e),
            }
            tokio::time::sleep(interval).await;
        }
        log::debug!("Stopped watching {:?}", filepath);
    })
}

/// Reads `filepath` into `controller` once. Returns `false` if the file is
/// missing or the edit was not applied.
pub fn sync_source_file(filepath: impl AsRef<Path>, controller: &SessionController) -> Result<bool> {
    match fsutil::read_to_string_if_exists(filepath)? {
        Some(source) => Ok(controller.update_source(source)?),
        None => Ok(false),
    }
}

/// Submits what is on disk now, not what the watcher saw last.
pub fn submit_source_file(
    filepath: impl AsRef<Path>,
    controller: &SessionController,
    reason: SubmitReason,
) -> SubmitOutcome {
    if let Err(e) = self::sync_source_file(filepath, controller) {
        log::warn!("{:#}", e);
    }
    controller.request_submit(reason)
}

/// Like [`SessionController::drive`], reading `filepath` once more right
/// before the tick that runs out of time.
pub fn drive_with_source_file(
    filepath: impl AsRef<Path>,
    controller: SessionController,
    clock: Clock,
) -> JoinHandle<()> {
    let filepath = filepath.as_ref().to_owned();
    clock.spawn(&Handle::current(), move || {
        if controller.remaining_seconds() <= 1 {
            if let Err(e) = self::sync_source_file(&filepath, &controller) {
                log::warn!("{:#}", e);
            }
        }
        match controller.tick() {
            Ok(TickOutcome::Running { .. }) => ControlFlow::Continue(()),
            _ => ControlFlow::Break(()),
        }
    })
}

pub fn print_countdown_line(remaining: u32, last_saved_at: Option<DateTime<Local>>) {
    let clock = style::format_countdown(remaining);
    let clock = if remaining <= 60 {
        clock.bright_red().bold()
    } else if remaining <= 300 {
        clock.bright_yellow().bold()
    } else {
        clock.cyan().bold()
    };
    let saved = last_saved_at
        .map(|t| format!(" (draft saved at {})", t.format("%H:%M:%S")))
        .unwrap_or_default();
    println!("⏱  {} left{}", clock, saved.dimmed());
}
