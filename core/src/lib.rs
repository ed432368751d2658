pub mod action;
pub mod config;
pub mod evaluation;
pub mod model;
pub mod session;
pub mod storage;
pub mod style;
pub mod template;

mod asset;

pub use crate::config::Config;
