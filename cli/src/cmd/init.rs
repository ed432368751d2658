use drill_core::{action, print_success};
use std::path::PathBuf;

use crate::util;

use super::{GlobalArgs, SubcmdResult};

#[derive(Debug, clap::Args)]
pub struct Args {
    #[arg(default_value = "./")]
    dir: PathBuf,
}

pub fn exec(args: &Args, _: &GlobalArgs) -> SubcmdResult {
    let path = action::init_config(&args.dir)?;
    print_success!(
        "Wrote {}. Edit it to change the time budget, auto-save and grading.",
        util::replace_homedir_to_tilde(path).to_string_lossy()
    );
    Ok(())
}
