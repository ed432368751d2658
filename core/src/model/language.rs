use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Java,
    Cpp,
    JavaScript,
}

impl Language {
    pub const fn lowercase(&self) -> &'static str {
        use Language::*;
        match self {
            Python => "python",
            Java => "java",
            Cpp => "cpp",
            JavaScript => "javascript",
        }
    }

    pub const fn file_extension(&self) -> &'static str {
        use Language::*;
        match self {
            Python => "py",
            Java => "java",
            Cpp => "cpp",
            JavaScript => "js",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        use Language::*;
        match ext.to_ascii_lowercase().as_str() {
            "py" => Some(Python),
            "java" => Some(Java),
            "cpp" | "cc" | "cxx" => Some(Cpp),
            "js" | "mjs" => Some(JavaScript),
            _ => None,
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?;
        Self::from_extension(ext)
    }
}
