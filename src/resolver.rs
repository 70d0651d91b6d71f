//! Goal resolution
//!
//! Decides which goal a source unit parses under by evaluating an ordered
//! plan of candidate goals, first success wins. Only the last candidate of a
//! plan is allowed to fail terminally, so a resolution makes at most one
//! attempt per known goal and never guesses.
//!
//! | Source | Plan |
//! |--------|------|
//! | `Declared(g)` | `g` only, failure is terminal |
//! | `Cached(g)` | `g`, then the remaining goals in policy order |
//! | `Ambiguous` | every goal in policy order |

use crate::error::{GoalError, GoalResult};
use crate::goal::{Goal, GoalOrder, GoalSource};
use crate::grammar::{Bootstrap, GrammarAttempt, NoBootstrap, ParseFailure};
use crate::source::SourceUnit;
use std::sync::Arc;
use tracing::debug;

/// Successful outcome of a resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The goal the source parsed under
    pub goal: Goal,
    /// Goals attempted, in order; the last one is `goal`
    pub attempts: Vec<Goal>,
    /// What the resolution started from
    pub source: GoalSource,
}

/// A single step of a resolution plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub goal: Goal,
    pub throws_on_failure: bool,
}

/// Outcome of one non-terminal parse attempt
#[derive(Debug)]
enum Attempt {
    Parsed(Goal),
    Failed(ParseFailure),
}

/// Stateless decision engine; safe to share across threads
#[derive(Clone)]
pub struct GoalResolver {
    order: GoalOrder,
    bootstrap: Arc<dyn Bootstrap>,
}

impl GoalResolver {
    /// Create a resolver with the given attempt order
    pub fn new(order: GoalOrder) -> Self {
        Self {
            order,
            bootstrap: Arc::new(NoBootstrap),
        }
    }

    /// Use a goal-specific bootstrap before each attempt
    pub fn with_bootstrap(mut self, bootstrap: Arc<dyn Bootstrap>) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    /// The policy order used for ambiguous sources
    pub fn order(&self) -> &GoalOrder {
        &self.order
    }

    /// Candidate goals for a source, in evaluation order
    pub fn plan(&self, source: GoalSource) -> Vec<Candidate> {
        let goals: Vec<Goal> = match source {
            GoalSource::Declared(goal) => vec![goal],
            GoalSource::Cached(goal) => self.order.led_by(goal).goals().to_vec(),
            GoalSource::Ambiguous => self.order.goals().to_vec(),
        };

        let last = goals.len().saturating_sub(1);
        goals
            .into_iter()
            .enumerate()
            .map(|(i, goal)| Candidate {
                goal,
                throws_on_failure: i == last,
            })
            .collect()
    }

    /// Resolve the goal for a source unit
    ///
    /// Returns `GoalError::Syntax` carrying the failure of the last attempted
    /// goal when no candidate parses.
    pub fn resolve(
        &self,
        grammar: &dyn GrammarAttempt,
        unit: &SourceUnit,
        source: GoalSource,
    ) -> GoalResult<Resolution> {
        let declared = matches!(source, GoalSource::Declared(_));
        let plan = self.plan(source);
        let mut attempts = Vec::with_capacity(plan.len());

        for candidate in plan {
            attempts.push(candidate.goal);
            match self.parse(grammar, unit, candidate, declared)? {
                Attempt::Parsed(goal) => {
                    debug!(
                        "{} resolved as {} after {} attempt(s)",
                        unit.key,
                        goal,
                        attempts.len()
                    );
                    return Ok(Resolution {
                        goal,
                        attempts,
                        source,
                    });
                }
                Attempt::Failed(failure) => {
                    debug!(
                        "{} does not parse as {} ({}: {}), trying next goal",
                        unit.key, candidate.goal, failure.position, failure.message
                    );
                }
            }
        }

        Err(GoalError::Internal(format!(
            "no candidate goals for {}",
            unit.key
        )))
    }

    /// A single parse attempt under one goal
    fn parse(
        &self,
        grammar: &dyn GrammarAttempt,
        unit: &SourceUnit,
        candidate: Candidate,
        declared: bool,
    ) -> GoalResult<Attempt> {
        let prepared = self.bootstrap.prepare(&unit.bytes, candidate.goal);

        match grammar.attempt(&prepared, candidate.goal) {
            Ok(()) => Ok(Attempt::Parsed(candidate.goal)),
            Err(failure) if candidate.throws_on_failure => Err(GoalError::Syntax {
                goal: candidate.goal,
                position: failure.position,
                message: failure.message,
                declared,
            }),
            Err(failure) => Ok(Attempt::Failed(failure)),
        }
    }
}

impl Default for GoalResolver {
    fn default() -> Self {
        Self::new(GoalOrder::default())
    }
}
