//! Errors raised while building setups and invocations.
//!
//! The registry itself is infallible; only construction validates input.

use crate::member::Member;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SetupError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SetupError {
    /// Number of arguments or matchers does not match the member's parameters.
    #[error("{member} takes {expected} argument(s) but {actual} were supplied")]
    ArityMismatch {
        member: Member,
        expected: usize,
        actual: usize,
    },
}

impl SetupError {
    pub(crate) fn check_arity(member: &Member, actual: usize) -> Result<()> {
        let expected = member.arity();
        if expected == actual {
            Ok(())
        } else {
            Err(SetupError::ArityMismatch {
                member: member.clone(),
                expected,
                actual,
            })
        }
    }
}
