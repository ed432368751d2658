use std::path::PathBuf;

use drill_core::{action, evaluation, Config};

use crate::util;

use super::{ArgLanguage, GlobalArgs, SubcmdResult};

#[derive(Debug, clap::Args)]
pub struct Args {
    /// Source file to grade.
    pub file: PathBuf,

    /// Defaults to the one implied by the file extension.
    #[arg(short, long, value_enum)]
    pub lang: Option<ArgLanguage>,

    /// Problem TOML file (default: the built-in "Two Sum").
    #[arg(short, long)]
    pub problem: Option<PathBuf>,
}

pub async fn exec(args: &Args, _: &GlobalArgs) -> SubcmdResult {
    let cfg = Config::load_or_default(util::current_dir())?;
    let problem = super::load_problem(args.problem.as_deref(), &cfg)?;
    let language = action::resolve_language(args.lang.map(Into::into), &args.file)?;
    let evaluator = evaluation::build_evaluator(&cfg.evaluator)?;

    action::evaluate_file(evaluator.as_ref(), &args.file, language, &problem).await?;
    Ok(())
}
