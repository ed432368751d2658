use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::sync::mpsc;
use tokio::time::{self, Instant};

use crate::model::Language;
use crate::storage::SourceStore;

type Draft = (Language, String);

/// Debounced draft persistence. Every [`schedule`](Self::schedule) restarts the
/// delay; once it elapses the latest text of each language is written to the
/// store. Drafts still pending when the last handle is dropped are written
/// right away.
#[derive(Debug, Clone)]
pub struct AutoSaveScheduler {
    tx: mpsc::UnboundedSender<Draft>,
    last_saved_at: Arc<Mutex<Option<DateTime<Local>>>>,
}

impl AutoSaveScheduler {
    pub const DEFAULT_DELAY: Duration = Duration::from_secs(30);

    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    pub fn spawn(store: Arc<dyn SourceStore>, delay: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let last_saved_at = Arc::new(Mutex::new(None));
        tokio::spawn(self::run(rx, store, delay, last_saved_at.clone()));
        Self { tx, last_saved_at }
    }

    /// Never blocks.
    pub fn schedule(&self, language: Language, text: impl Into<String>) {
        if self.tx.send((language, text.into())).is_err() {
            log::warn!("Auto-save worker has stopped; draft not saved");
        }
    }

    pub fn last_saved_at(&self) -> Option<DateTime<Local>> {
        *self
            .last_saved_at
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

async fn run(
    mut rx: mpsc::UnboundedReceiver<Draft>,
    store: Arc<dyn SourceStore>,
    delay: Duration,
    last_saved_at: Arc<Mutex<Option<DateTime<Local>>>>,
) {
    let mut pending: HashMap<Language, String> = HashMap::new();
    let sleep = time::sleep(delay);
    tokio::pin!(sleep);

    loop {
        tokio::select! {
            msg = rx.recv() => match msg {
                Some((language, text)) => {
                    pending.insert(language, text);
                    sleep.as_mut().reset(Instant::now() + delay);
                }
                None => {
                    flush(&store, &mut pending, &last_saved_at).await;
                    break;
                }
            },
            () = &mut sleep, if !pending.is_empty() => {
                flush(&store, &mut pending, &last_saved_at).await;
            }
        }
    }
    log::debug!("Auto-save worker stopped");
}

/// Writes run on the blocking pool.
async fn flush(
    store: &Arc<dyn SourceStore>,
    pending: &mut HashMap<Language, String>,
    last_saved_at: &Arc<Mutex<Option<DateTime<Local>>>>,
) {
    if pending.is_empty() {
        return;
    }
    let drafts: Vec<Draft> = pending.drain().collect();
    let store = store.clone();
    let last_saved_at = last_saved_at.clone();

    let saving = tokio::task::spawn_blocking(move || {
        for (language, text) in drafts {
            match store.save(language, &text) {
                Ok(()) => {
                    log::debug!("Saved {} draft ({} bytes)", language, text.len());
                    *last_saved_at
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner) = Some(Local::now());
                }
                Err(e) => log::warn!("Auto-save failed: {:#}", e),
            }
        }
    });
    if let Err(e) = saving.await {
        log::warn!("Auto-save task failed: {}", e);
    }
}
