//! goalpost - Script or Module?
//!
//! Decides which of two mutually exclusive grammars an unmarked source file
//! parses under. Declared goals are authoritative; otherwise goals are tried
//! in policy order and the first that parses wins. Decisions are cached on
//! disk against a content fingerprint so unchanged files resolve in one
//! attempt.

pub mod cache;
pub mod cli;
pub mod config;
pub mod driver;
pub mod error;
pub mod goal;
pub mod grammar;
pub mod manifest;
pub mod resolver;
pub mod source;

pub use error::{GoalError, GoalResult};
pub use goal::{Goal, GoalOrder, GoalSource};
pub use resolver::{GoalResolver, Resolution};
pub use source::{Fingerprint, SourceUnit};
