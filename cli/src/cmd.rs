pub mod evaluate;
pub mod init;
pub mod practice;
pub mod template;

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use drill_core::model::{Language, Problem};
use drill_core::Config;

#[derive(Debug, clap::Parser)]
#[command(author, version, about, long_about = None)]
pub struct GlobalArgs {
    #[command(subcommand)]
    pub subcmd: Subcommand,

    /// Where drafts are auto-saved (default: the user data dir).
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, clap::Subcommand)]
pub enum Subcommand {
    Init(init::Args),
    Template(template::Args),

    #[command(alias("e"))]
    Evaluate(evaluate::Args),

    #[command(alias("p"))]
    Practice(practice::Args),
}

pub type SubcmdResult = anyhow::Result<()>;

impl GlobalArgs {
    pub async fn exec_subcmd(&self) -> SubcmdResult {
        use Subcommand::*;
        match &self.subcmd {
            Init(args) => init::exec(args, self),
            Template(args) => template::exec(args, self),
            Evaluate(args) => evaluate::exec(args, self).await,
            Practice(args) => practice::exec(args, self).await,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
#[clap(rename_all = "lower")]
pub enum ArgLanguage {
    Python,
    Java,
    Cpp,
    JavaScript,
}

impl From<ArgLanguage> for Language {
    fn from(value: ArgLanguage) -> Self {
        use ArgLanguage::*;
        match value {
            Python => Language::Python,
            Java => Language::Java,
            Cpp => Language::Cpp,
            JavaScript => Language::JavaScript,
        }
    }
}

/// The problem at `filepath` (or the built-in one), with the config's time budget applied.
pub(crate) fn load_problem(filepath: Option<&Path>, cfg: &Config) -> anyhow::Result<Problem> {
    let mut problem = Problem::load(filepath).context("Failed to load the problem")?;
    if let Some(secs) = cfg.session.time_budget_secs {
        problem.time_budget_secs = secs;
    }
    Ok(problem)
}

#[cfg(test)]
mod test {
    use super::*;
    use clap::{CommandFactory, Parser};

    #[test]
    fn cli_should_be_well_formed() {
        GlobalArgs::command().debug_assert();
    }

    #[test]
    fn practice_alias_should_parse() {
        let args = GlobalArgs::try_parse_from([
            "drill", "p", "main.py", "--time", "60", "--no-auto-submit", "-l", "python",
        ])
        .unwrap();

        let Subcommand::Practice(p) = args.subcmd else {
            panic!("expected practice");
        };
        assert_eq!(p.file, Path::new("main.py"));
        assert_eq!(p.time, Some(60));
        assert!(p.no_auto_submit);
        assert!(!p.resume);
        assert_eq!(p.lang.map(Language::from), Some(Language::Python));
    }

    #[test]
    fn language_names_should_be_lowercase() {
        let args = GlobalArgs::try_parse_from(["drill", "template", "javascript"]).unwrap();
        let Subcommand::Template(t) = args.subcmd else {
            panic!("expected template");
        };
        assert_eq!(Language::from(t.lang), Language::JavaScript);
    }

    #[test]
    fn config_time_budget_should_override_problem() {
        let mut cfg = Config::default();
        assert_eq!(load_problem(None, &cfg).unwrap().time_budget_secs, 1800);

        cfg.session.time_budget_secs = Some(600);
        assert_eq!(load_problem(None, &cfg).unwrap().time_budget_secs, 600);
    }
}
