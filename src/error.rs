//! Error types for goalpost
//!
//! All modules use `GoalResult<T>` as their return type.

use crate::goal::Goal;
use crate::grammar::Position;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for goalpost operations
pub type GoalResult<T> = Result<T, GoalError>;

/// All errors that can occur in goalpost
#[derive(Error, Debug)]
pub enum GoalError {
    // Resolution errors
    #[error("{}", syntax_message(*goal, *position, message, *declared))]
    Syntax {
        goal: Goal,
        position: Position,
        message: String,
        /// The goal was declared (manifest or `--goal`), not inferred
        declared: bool,
    },

    #[error("Unknown goal: {0} (expected one of: script, module)")]
    UnknownGoal(String),

    #[error("{failed} of {total} file(s) failed to resolve")]
    ResolutionFailed { failed: usize, total: usize },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid goal order: {0}")]
    GoalOrderInvalid(String),

    // Manifest errors
    #[error("Invalid manifest {path}: {reason}")]
    ManifestInvalid { path: PathBuf, reason: String },

    // Cache errors
    #[error("Failed to write cache record {path}: {reason}")]
    CacheWrite { path: PathBuf, reason: String },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

fn syntax_message(goal: Goal, position: Position, message: &str, declared: bool) -> String {
    if declared {
        format!("SyntaxError at {position} (declared goal {goal}): {message}")
    } else {
        format!("SyntaxError at {position} (goal {goal}): {message}")
    }
}

impl GoalError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Check if this is a syntax error from a parse attempt
    pub fn is_syntax(&self) -> bool {
        matches!(self, Self::Syntax { .. })
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Syntax { declared: true, .. } => Some(
                "The goal was declared explicitly; fix the source or remove the declaration (package.json \"type\", .mjs/.cjs, --goal)",
            ),
            Self::UnknownGoal(_) => Some("Use one of: script, module"),
            Self::ConfigInvalid { .. } => Some("Run: goalpost config init --force"),
            Self::GoalOrderInvalid(_) => {
                Some("List each goal at most once, e.g. order = [\"script\", \"module\"]")
            }
            Self::CacheWrite { .. } => Some("Run: goalpost cache clear --yes"),
            _ => None,
        }
    }
}
