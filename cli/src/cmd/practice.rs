use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use drill_core::session::{
    AutoSaveScheduler, AutoSubmitGuard, Clock, PageSignal, SessionController, SessionState,
    SubmitOutcome, SubmitReason,
};
use drill_core::storage::{FsSourceStore, SourceStore};
use drill_core::{action, evaluation, style, Config};
use tokio::io::{AsyncBufReadExt as _, BufReader};
use tokio::task::JoinHandle;

use crate::config::GlobalConfig;
use crate::util;

use super::{ArgLanguage, GlobalArgs, SubcmdResult};

const FILE_POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, clap::Args)]
pub struct Args {
    /// Source file to edit during the session. Created from the starter code if missing.
    pub file: PathBuf,

    /// Defaults to the one implied by the file extension.
    #[arg(short, long, value_enum)]
    pub lang: Option<ArgLanguage>,

    /// Problem TOML file (default: the built-in "Two Sum").
    #[arg(short, long)]
    pub problem: Option<PathBuf>,

    /// Time budget in seconds.
    #[arg(long)]
    pub time: Option<u32>,

    /// Do not submit when the terminal is closed, interrupted or suspended.
    #[arg(long)]
    pub no_auto_submit: bool,

    /// Start from the auto-saved draft instead of the starter code.
    #[arg(long)]
    pub resume: bool,
}

pub async fn exec(args: &Args, global_args: &GlobalArgs) -> SubcmdResult {
    let global = GlobalConfig::from_file_and_args(global_args);
    let cfg = Config::load_or_default(util::current_dir())?;

    let mut problem = super::load_problem(args.problem.as_deref(), &cfg)?;
    if let Some(secs) = args.time {
        problem.time_budget_secs = secs;
    }
    let language = action::resolve_language(args.lang.map(Into::into), &args.file)?;
    let evaluator = evaluation::build_evaluator(&cfg.evaluator)?;

    let store = cfg.autosave.enabled.then(|| {
        let dir = cfg
            .autosave
            .resolve_dir(cfg.config_dir(), global.drafts_dir());
        Arc::new(FsSourceStore::new(dir))
    });
    let controller = match &store {
        Some(store) => {
            log::info!(
                "Drafts are auto-saved to {:?}",
                util::replace_homedir_to_tilde(store.dir())
            );
            let autosave = AutoSaveScheduler::spawn(store.clone(), cfg.autosave.debounce());
            SessionController::with_autosave(evaluator, autosave)
        }
        None => SessionController::new(evaluator),
    };

    let source = action::prepare_source_file(
        &args.file,
        language,
        store.as_deref().map(|s| s as &dyn SourceStore),
        args.resume,
    )?;

    style::print_problem(&problem);
    controller.start(problem, language)?;
    controller.update_source(source)?;

    let guard = Arc::new(AutoSubmitGuard::new(
        controller.clone(),
        cfg.session.auto_submit && !args.no_auto_submit,
    ));
    if guard.is_enabled() {
        self::listen_page_signals(&guard, &args.file).context("Failed to install signal handlers")?;
    }

    println!(
        "Edit {} in your editor. Type 'submit' and press Enter when you are done.",
        util::replace_homedir_to_tilde(&args.file).display()
    );
    action::print_countdown_line(controller.remaining_seconds(), None);

    let tasks = [
        action::drive_with_source_file(&args.file, controller.clone(), Clock::every_second()),
        action::watch_source_file(&args.file, controller.clone(), FILE_POLL_INTERVAL),
        self::print_countdown(controller.clone()),
        self::read_commands(&args.file, controller.clone()),
    ];

    let submission = controller.wait_for_submission().await;
    tasks.iter().for_each(JoinHandle::abort);

    if let Some(store) = &store {
        if let Err(e) = store.save(submission.language, &submission.source) {
            log::warn!("{:#}", e);
        }
    }
    style::print_submission(&submission);
    Ok(())
}

/// Prints the time left every five minutes, then more often near the end.
fn print_countdown(controller: SessionController) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        let mut last_printed = controller.remaining_seconds();

        while controller.state() == SessionState::InProgress {
            interval.tick().await;
            let remaining = controller.remaining_seconds();
            let due = remaining % 300 == 0 || matches!(remaining, 60 | 30 | 0..=10);
            if due && remaining != last_printed && remaining > 0 {
                let saved = controller.snapshot().and_then(|s| s.last_saved_at);
                action::print_countdown_line(remaining, saved);
                last_printed = remaining;
            }
        }
    })
}

fn read_commands(filepath: &Path, controller: SessionController) -> JoinHandle<()> {
    let filepath = filepath.to_owned();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            match line.trim() {
                "submit" | "s" => {
                    action::submit_source_file(&filepath, &controller, SubmitReason::Manual);
                    break;
                }
                "" | "status" => {
                    let saved = controller.snapshot().and_then(|s| s.last_saved_at);
                    action::print_countdown_line(controller.remaining_seconds(), saved);
                }
                other => println!("Unknown command '{}'. Try 'submit' or 'status'.", other),
            }
        }
    })
}

/// Ctrl-C, SIGHUP and SIGTERM count as closing the page; SIGTSTP (Ctrl-Z) as
/// hiding it. A closing signal the guard declines (nothing written yet, or
/// already submitting) exits the process.
fn listen_page_signals(guard: &Arc<AutoSubmitGuard>, filepath: &Path) -> anyhow::Result<()> {
    let g = guard.clone();
    let path = filepath.to_owned();
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if self::observe_with_source_file(&g, &path, PageSignal::PageUnload).is_none() {
                log::warn!("Interrupted");
                std::process::exit(130);
            }
        }
    });

    #[cfg(unix)]
    self::listen_unix_signals(guard, filepath)?;

    Ok(())
}

/// Picks up the latest edits on disk before the guard decides.
fn observe_with_source_file(
    guard: &AutoSubmitGuard,
    filepath: &Path,
    signal: PageSignal,
) -> Option<SubmitOutcome> {
    if let Err(e) = action::sync_source_file(filepath, guard.controller()) {
        log::warn!("{:#}", e);
    }
    guard.observe(signal)
}

#[cfg(unix)]
fn listen_unix_signals(guard: &Arc<AutoSubmitGuard>, filepath: &Path) -> anyhow::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    #[cfg(target_os = "linux")]
    const SIGTSTP: i32 = 20;
    #[cfg(not(target_os = "linux"))]
    const SIGTSTP: i32 = 18;

    let handlers = [
        (SignalKind::hangup(), PageSignal::PageUnload),
        (SignalKind::terminate(), PageSignal::PageUnload),
        (SignalKind::from_raw(SIGTSTP), PageSignal::TabHidden),
    ];
    for (kind, page_signal) in handlers {
        let mut stream = signal(kind)?;
        let guard = guard.clone();
        let path = filepath.to_owned();
        tokio::spawn(async move {
            while stream.recv().await.is_some() {
                let declined = self::observe_with_source_file(&guard, &path, page_signal).is_none();
                if declined && page_signal == PageSignal::PageUnload {
                    std::process::exit(1);
                }
            }
        });
    }
    Ok(())
}
