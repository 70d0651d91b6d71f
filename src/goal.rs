//! Parse goals and the policy for ordering them
//!
//! A goal names one of the mutually exclusive grammars a source file can be
//! parsed under. `GoalOrder` is the attempt order used when nothing declares
//! the goal up front, and `GoalSource` records where a resolution starts from.

use crate::error::{GoalError, GoalResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A grammar variant the parser can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Goal {
    /// Classic (sloppy-mode capable) script grammar
    Script,
    /// Module grammar: strict, allows import/export declarations
    Module,
}

impl Goal {
    /// Every known goal, in default attempt order
    pub const ALL: &'static [Goal] = &[Goal::Script, Goal::Module];

    /// Lowercase name used in config, cache records and CLI output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Script => "script",
            Self::Module => "module",
        }
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Goal {
    type Err = GoalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "script" => Ok(Self::Script),
            "module" => Ok(Self::Module),
            other => Err(GoalError::UnknownGoal(other.to_string())),
        }
    }
}

/// Ordered, duplicate-free list of goals to attempt
///
/// The first goal is the primary goal. Goals left out of a configured order
/// are appended in `Goal::ALL` order so every known goal stays a candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalOrder(Vec<Goal>);

impl GoalOrder {
    /// Build an order from a preferred prefix
    pub fn new(preferred: &[Goal]) -> GoalResult<Self> {
        let mut goals: Vec<Goal> = Vec::with_capacity(Goal::ALL.len());
        for goal in preferred {
            if goals.contains(goal) {
                return Err(GoalError::GoalOrderInvalid(format!(
                    "goal '{goal}' listed more than once"
                )));
            }
            goals.push(*goal);
        }
        for goal in Goal::ALL {
            if !goals.contains(goal) {
                goals.push(*goal);
            }
        }
        Ok(Self(goals))
    }

    /// Order starting with the given goal, remaining goals in default order
    pub fn primary(goal: Goal) -> Self {
        let mut goals = vec![goal];
        goals.extend(Goal::ALL.iter().copied().filter(|g| *g != goal));
        Self(goals)
    }

    /// The goal attempted first
    pub fn first(&self) -> Goal {
        self.0[0]
    }

    /// Goals in attempt order
    pub fn goals(&self) -> &[Goal] {
        &self.0
    }

    /// This order with `goal` moved to the front
    pub fn led_by(&self, goal: Goal) -> Self {
        let mut goals = vec![goal];
        goals.extend(self.0.iter().copied().filter(|g| *g != goal));
        Self(goals)
    }
}

impl Default for GoalOrder {
    fn default() -> Self {
        Self(Goal::ALL.to_vec())
    }
}

/// Where a resolution gets its starting goal from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalSource {
    /// Authoritative declaration (manifest, file extension, `--goal`).
    /// Exactly one attempt; failure is terminal.
    Declared(Goal),
    /// A validated cache record. Tried first but allowed to fall back.
    Cached(Goal),
    /// Nothing known; every goal is tried in policy order.
    Ambiguous,
}

impl GoalSource {
    /// Short label for logs and CLI output
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Declared(_) => "declared",
            Self::Cached(_) => "cached",
            Self::Ambiguous => "ambiguous",
        }
    }
}

impl From<Option<Goal>> for GoalSource {
    fn from(declared: Option<Goal>) -> Self {
        match declared {
            Some(goal) => Self::Declared(goal),
            None => Self::Ambiguous,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn goal_display_and_parse() {
        assert_eq!(Goal::Script.to_string(), "script");
        assert_eq!("Module".parse::<Goal>().unwrap(), Goal::Module);
        assert!(matches!(
            "wasm".parse::<Goal>(),
            Err(GoalError::UnknownGoal(_))
        ));
    }

    #[test]
    fn goal_serde_lowercase() {
        let json = serde_json::to_string(&Goal::Module).unwrap();
        assert_eq!(json, "\"module\"");
        let goal: Goal = serde_json::from_str("\"script\"").unwrap();
        assert_eq!(goal, Goal::Script);
    }

    #[test]
    fn default_order_is_script_first() {
        let order = GoalOrder::default();
        assert_eq!(order.first(), Goal::Script);
        assert_eq!(order.goals(), &[Goal::Script, Goal::Module]);
    }

    #[test]
    fn order_appends_missing_goals() {
        let order = GoalOrder::new(&[Goal::Module]).unwrap();
        assert_eq!(order.goals(), &[Goal::Module, Goal::Script]);

        let order = GoalOrder::new(&[]).unwrap();
        assert_eq!(order, GoalOrder::default());
    }

    #[test]
    fn order_rejects_duplicates() {
        let err = GoalOrder::new(&[Goal::Script, Goal::Script]).unwrap_err();
        assert!(matches!(err, GoalError::GoalOrderInvalid(_)));
    }

    #[test]
    fn led_by_moves_goal_to_front() {
        let order = GoalOrder::default().led_by(Goal::Module);
        assert_eq!(order.goals(), &[Goal::Module, Goal::Script]);
        assert_eq!(GoalOrder::primary(Goal::Module), order);
    }

    #[test]
    fn source_from_option() {
        assert_eq!(GoalSource::from(Some(Goal::Module)), GoalSource::Declared(Goal::Module));
        assert_eq!(GoalSource::from(None), GoalSource::Ambiguous);
        assert_eq!(GoalSource::Cached(Goal::Script).kind(), "cached");
    }
}
