use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use anyhow::Context as _;
use fsutil::SingleFileDriver;

use crate::model::Language;

/// Where in-progress drafts are kept, one per language.
pub trait SourceStore: Send + Sync {
    fn save(&self, language: Language, source: &str) -> anyhow::Result<()>;

    fn load(&self, language: Language) -> anyhow::Result<Option<String>>;
}

/// Drafts as `<dir>/draft.<ext>`.
#[derive(Debug, Clone)]
pub struct FsSourceStore {
    dir: PathBuf,
}

impl FsSourceStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_owned(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, language: Language) -> PathBuf {
        self.dir.join(format!("draft.{}", language.file_extension()))
    }

    fn driver(&self, language: Language) -> SingleFileDriver {
        SingleFileDriver::new(self.path_for(language))
    }
}

impl SourceStore for FsSourceStore {
    fn save(&self, language: Language, source: &str) -> anyhow::Result<()> {
        self.driver(language)
            .write(source)
            .with_context(|| format!("Failed to save {} draft", language))
    }

    fn load(&self, language: Language) -> anyhow::Result<Option<String>> {
        self.driver(language)
            .read()
            .with_context(|| format!("Failed to load {} draft", language))
    }
}

/// Keeps drafts in memory and remembers every write, in order.
#[derive(Debug, Default)]
pub struct MemorySourceStore {
    writes: Mutex<Vec<(Language, String)>>,
}

impl MemorySourceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> Vec<(Language, String)> {
        self.writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn latest(&self) -> HashMap<Language, String> {
        self.writes().into_iter().collect()
    }
}

impl SourceStore for MemorySourceStore {
    fn save(&self, language: Language, source: &str) -> anyhow::Result<()> {
        self.writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((language, source.to_owned()));
        Ok(())
    }

    fn load(&self, language: Language) -> anyhow::Result<Option<String>> {
        Ok(self.latest().remove(&language))
    }
}
