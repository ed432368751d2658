use std::path::PathBuf;

use anyhow::ensure;
use drill_core::{model::Language, print_success, template};

use super::{ArgLanguage, GlobalArgs, SubcmdResult};

#[derive(Debug, clap::Args)]
pub struct Args {
    #[arg(value_enum)]
    pub lang: ArgLanguage,

    /// Write to this file instead of stdout. An existing file is never overwritten.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn exec(args: &Args, _: &GlobalArgs) -> SubcmdResult {
    let lang = Language::from(args.lang);
    let Some(output) = &args.output else {
        print!("{}", template::starter_code(lang));
        return Ok(());
    };

    let created = template::write_if_absent(lang, output)?;
    ensure!(created, "Already exists: {:?}", output);
    print_success!("Wrote the {} template to {}", lang, output.display());
    Ok(())
}
