//! Invocation: one observed call against a mocked object.

use crate::error::{Result, SetupError};
use crate::member::Member;
use core::any::Any;
use core::fmt;
use std::sync::Arc;

/// Type-erased argument or return value.
pub type Argument = Arc<dyn Any + Send + Sync>;

/// Wrap a value as an [`Argument`].
pub fn arg<T: Any + Send + Sync>(value: T) -> Argument {
    Arc::new(value)
}

pub struct Invocation {
    member: Member,
    overrides: Vec<Member>,
    arguments: Vec<Argument>,
}

impl Invocation {
    /// Fails with `ArityMismatch` when `arguments` does not fit `member`.
    pub fn new(member: Member, arguments: Vec<Argument>) -> Result<Self> {
        SetupError::check_arity(&member, arguments.len())?;
        Ok(Invocation {
            member,
            overrides: Vec::new(),
            arguments,
        })
    }

    /// Declare base or interface members that the called member implements.
    /// Setups targeting any of them are pattern-compatible with this call.
    pub fn overriding<I>(mut self, bases: I) -> Self
    where
        I: IntoIterator<Item = Member>,
    {
        self.overrides.extend(bases);
        self
    }

    pub fn member(&self) -> &Member {
        &self.member
    }

    pub fn overrides(&self) -> &[Member] {
        &self.overrides
    }

    /// True when `target` is the called member or one it overrides.
    pub fn targets(&self, target: &Member) -> bool {
        self.member == *target || self.overrides.iter().any(|m| m == target)
    }

    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    pub fn argument<T: Any>(&self, index: usize) -> Option<&T> {
        self.arguments.get(index)?.downcast_ref::<T>()
    }
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("member", &format_args!("{}", self.member))
            .field("overrides", &self.overrides.len())
            .field("arguments", &self.arguments.len())
            .finish()
    }
}
