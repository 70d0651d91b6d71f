//! Declared goal lookup
//!
//! A goal is declared for a file by its extension (`.mjs`, `.cjs`) or by the
//! goal field of the nearest package manifest (`"type"` in `package.json`).
//! Only that one field is read; the rest of the manifest is ignored.

use crate::config::schema::ManifestConfig;
use crate::error::{GoalError, GoalResult};
use crate::goal::Goal;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Finds the declared goal for a source file
#[derive(Debug, Clone)]
pub struct ManifestLookup {
    enabled: bool,
    file_name: String,
    field: String,
    extensions: bool,
}

impl ManifestLookup {
    /// Create a lookup from config
    pub fn new(config: &ManifestConfig) -> Self {
        Self {
            enabled: config.enabled,
            file_name: config.file_name.clone(),
            field: config.field.clone(),
            extensions: config.extensions,
        }
    }

    /// A lookup that never declares anything
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            file_name: String::new(),
            field: String::new(),
            extensions: false,
        }
    }

    /// Declared goal for `path`, if any
    ///
    /// The extension rule wins over the manifest. The first manifest found
    /// walking up from the file's directory ends the search, whether or not
    /// it has the goal field.
    pub async fn declared_goal(&self, path: &Path) -> GoalResult<Option<Goal>> {
        if !self.enabled {
            return Ok(None);
        }

        if self.extensions {
            if let Some(goal) = goal_for_extension(path) {
                debug!("{} declares {} by extension", path.display(), goal);
                return Ok(Some(goal));
            }
        }

        let Some(manifest) = self.find_manifest(path).await? else {
            return Ok(None);
        };

        let content = fs::read_to_string(&manifest)
            .await
            .map_err(|e| GoalError::io(format!("reading manifest {}", manifest.display()), e))?;
        let goal = parse_goal_field(&content, &self.field, &manifest)?;

        if let Some(goal) = goal {
            debug!(
                "{} declares {} via {}",
                path.display(),
                goal,
                manifest.display()
            );
        }
        Ok(goal)
    }

    async fn find_manifest(&self, path: &Path) -> GoalResult<Option<PathBuf>> {
        let Some(start) = path.parent() else {
            return Ok(None);
        };

        for dir in start.ancestors() {
            let candidate = dir.join(&self.file_name);
            match fs::metadata(&candidate).await {
                Ok(meta) if meta.is_file() => return Ok(Some(candidate)),
                Ok(_) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(GoalError::io(
                        format!("checking manifest {}", candidate.display()),
                        e,
                    ))
                }
            }
        }
        Ok(None)
    }
}

/// `.mjs` declares Module, `.cjs` declares Script
pub fn goal_for_extension(path: &Path) -> Option<Goal> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("mjs") => Some(Goal::Module),
        Some("cjs") => Some(Goal::Script),
        _ => None,
    }
}

/// Read the goal field from manifest JSON
fn parse_goal_field(content: &str, field: &str, path: &Path) -> GoalResult<Option<Goal>> {
    let invalid = |reason: String| GoalError::ManifestInvalid {
        path: path.to_path_buf(),
        reason,
    };

    let value: serde_json::Value =
        serde_json::from_str(content).map_err(|e| invalid(e.to_string()))?;
    let object = value
        .as_object()
        .ok_or_else(|| invalid("expected a JSON object".to_string()))?;

    match object.get(field) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => match s.as_str() {
            "module" => Ok(Some(Goal::Module)),
            "commonjs" | "script" => Ok(Some(Goal::Script)),
            other => Err(invalid(format!(
                "\"{field}\" must be \"module\" or \"commonjs\", found \"{other}\""
            ))),
        },
        Some(other) => Err(invalid(format!(
            "\"{field}\" must be a string, found {other}"
        ))),
    }
}
