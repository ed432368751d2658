pub mod language;
pub mod problem;
pub mod result;

pub use language::*;
pub use problem::*;
pub use result::*;
