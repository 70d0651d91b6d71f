//! Deadline wrapper for grammar attempts
//!
//! An attempt that does not finish within the limit counts as a parse
//! failure for that goal. The worker thread is detached, not cancelled.

use super::{GrammarAttempt, ParseFailure, Position};
use crate::goal::Goal;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::warn;

/// Runs each attempt of the inner grammar on a worker thread with a deadline
pub struct TimeLimited<G> {
    inner: Arc<G>,
    limit: Duration,
}

impl<G> TimeLimited<G> {
    pub fn new(inner: G, limit: Duration) -> Self {
        Self {
            inner: Arc::new(inner),
            limit,
        }
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }
}

impl<G: GrammarAttempt + 'static> GrammarAttempt for TimeLimited<G> {
    fn attempt(&self, source: &[u8], goal: Goal) -> Result<(), ParseFailure> {
        let (tx, rx) = mpsc::channel();
        let inner = Arc::clone(&self.inner);
        let source = source.to_vec();

        thread::Builder::new()
            .name(format!("goalpost-parse-{goal}"))
            .spawn(move || {
                // receiver may be gone after a timeout
                let _ = tx.send(inner.attempt(&source, goal));
            })
            .map_err(|e| {
                ParseFailure::new(
                    Position::start(),
                    format!("failed to start parse attempt: {e}"),
                )
            })?;

        match rx.recv_timeout(self.limit) {
            Ok(outcome) => outcome,
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    "{} attempt under {} timed out after {} ms",
                    self.inner.name(),
                    goal,
                    self.limit.as_millis()
                );
                Err(ParseFailure::new(
                    Position::start(),
                    format!("parse attempt timed out after {} ms", self.limit.as_millis()),
                ))
            }
            Err(RecvTimeoutError::Disconnected) => Err(ParseFailure::new(
                Position::start(),
                "parse attempt aborted",
            )),
        }
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::EcmaProbe;

    struct Sleepy(Duration);

    impl GrammarAttempt for Sleepy {
        fn attempt(&self, _source: &[u8], _goal: Goal) -> Result<(), ParseFailure> {
            thread::sleep(self.0);
            Ok(())
        }

        fn name(&self) -> &'static str {
            "sleepy"
        }
    }

    struct Panicky;

    impl GrammarAttempt for Panicky {
        fn attempt(&self, _source: &[u8], _goal: Goal) -> Result<(), ParseFailure> {
            panic!("grammar bug");
        }

        fn name(&self) -> &'static str {
            "panicky"
        }
    }

    #[test]
    fn passes_through_within_limit() {
        let timed = TimeLimited::new(EcmaProbe, Duration::from_secs(5));
        assert!(timed.attempt(b"export {};", Goal::Module).is_ok());
        assert!(timed.attempt(b"export {};", Goal::Script).is_err());
        assert_eq!(timed.name(), "ecma-probe");
    }

    #[test]
    fn timeout_is_a_failure() {
        let timed = TimeLimited::new(Sleepy(Duration::from_millis(500)), Duration::from_millis(20));
        let err = timed.attempt(b"foo();", Goal::Script).unwrap_err();
        assert!(err.message.contains("timed out after 20 ms"));
        assert_eq!(err.position, Position::start());
    }

    #[test]
    fn worker_panic_is_a_failure() {
        let timed = TimeLimited::new(Panicky, Duration::from_secs(5));
        let err = timed.attempt(b"foo();", Goal::Script).unwrap_err();
        assert_eq!(err.message, "parse attempt aborted");
    }
}
