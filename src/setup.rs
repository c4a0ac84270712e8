//! Setup: one interception rule.
//!
//! Identity (member, shape, conditional flag) is fixed at build time. The
//! mutable parts are the shadowing state, which only the owning
//! `SetupCollection` advances, and the invocation count.

use crate::error::{Result, SetupError};
use crate::invocation::{Argument, Invocation};
use crate::matcher::{ArgumentMatcher, InvocationMatcher, Positional};
use crate::member::Member;
use crate::shape::InvocationShape;
use core::any::Any;
use core::fmt;
use core::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;

/// Shadowing state of a setup.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SetupState {
    Active,
    /// A newer setup with the same shape supersedes this one.
    Overridden,
}

impl SetupState {
    const fn to_u8(self) -> u8 {
        match self {
            SetupState::Active => 0,
            SetupState::Overridden => 1,
        }
    }

    const fn from_u8(v: u8) -> Self {
        match v {
            0 => SetupState::Active,
            _ => SetupState::Overridden,
        }
    }
}

/// Handle to a nested mock returned by a setup.
#[derive(Clone)]
pub struct InnerMock(Argument);

impl InnerMock {
    pub fn new<T: Any + Send + Sync>(mock: T) -> Self {
        InnerMock(Arc::new(mock))
    }

    pub fn from_shared(mock: Argument) -> Self {
        InnerMock(mock)
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// True when both handles refer to the same mock instance.
    pub fn ptr_eq(&self, other: &InnerMock) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for InnerMock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InnerMock({:p})", Arc::as_ptr(&self.0))
    }
}

/// What a matched setup hands back to the interceptor.
#[derive(Clone)]
pub enum Outcome {
    Default,
    Value(Argument),
    InnerMock(InnerMock),
}

impl fmt::Debug for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Default => f.write_str("Default"),
            Outcome::Value(_) => f.write_str("Value(..)"),
            Outcome::InnerMock(m) => write!(f, "{:?}", m),
        }
    }
}

type Condition = dyn Fn() -> bool + Send + Sync;

pub struct Setup {
    member: Member,
    shape: InvocationShape,
    matcher: Box<dyn InvocationMatcher>,
    condition: Option<Arc<Condition>>,
    outcome: Outcome,
    state: AtomicU8,
    invocation_count: AtomicUsize,
}

impl Setup {
    pub fn builder(member: Member) -> SetupBuilder {
        SetupBuilder::new(member)
    }

    pub fn member(&self) -> &Member {
        &self.member
    }

    pub fn shape(&self) -> &InvocationShape {
        &self.shape
    }

    pub fn is_conditional(&self) -> bool {
        self.condition.is_some()
    }

    /// Conditional setups neither shadow nor get shadowed.
    pub fn participates_in_shadowing(&self) -> bool {
        !self.is_conditional()
    }

    pub fn state(&self) -> SetupState {
        SetupState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_overridden(&self) -> bool {
        self.state() == SetupState::Overridden
    }

    /// Active -> Overridden. Returns false if already overridden.
    pub(crate) fn mark_overridden(&self) -> bool {
        self.state
            .compare_exchange(
                SetupState::Active.to_u8(),
                SetupState::Overridden.to_u8(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// True when the call targets this setup's member (directly or through an
    /// override), the matcher accepts it and the condition, if any, holds.
    pub fn matches(&self, invocation: &Invocation) -> bool {
        invocation.targets(&self.member)
            && self.matcher.matches(invocation)
            && self.condition.as_ref().map_or(true, |c| c())
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    pub fn inner_mock(&self) -> Option<&InnerMock> {
        match &self.outcome {
            Outcome::InnerMock(m) => Some(m),
            _ => None,
        }
    }

    pub fn record_invocation(&self) {
        self.invocation_count.fetch_add(1, Ordering::AcqRel);
    }

    pub fn invocation_count(&self) -> usize {
        self.invocation_count.load(Ordering::Acquire)
    }

    pub fn is_invoked(&self) -> bool {
        self.invocation_count() > 0
    }

    /// Forget recorded invocations.
    pub fn uninvoke(&self) {
        self.invocation_count.store(0, Ordering::Release);
    }
}

impl fmt::Debug for Setup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Setup")
            .field("shape", &format_args!("{}", self.shape))
            .field("conditional", &self.is_conditional())
            .field("state", &self.state())
            .field("invocations", &self.invocation_count())
            .field("outcome", &self.outcome)
            .finish()
    }
}

pub struct SetupBuilder {
    member: Member,
    shape: InvocationShape,
    matcher: Box<dyn InvocationMatcher>,
    condition: Option<Arc<Condition>>,
    outcome: Outcome,
}

impl SetupBuilder {
    /// Starts out matching any arguments.
    fn new(member: Member) -> Self {
        let matchers: Vec<_> = (0..member.arity()).map(|_| ArgumentMatcher::any()).collect();
        SetupBuilder {
            shape: InvocationShape::from_matchers(member.clone(), &matchers),
            matcher: Box::new(Positional(matchers)),
            member,
            condition: None,
            outcome: Outcome::Default,
        }
    }

    /// Match arguments positionally. One matcher per parameter.
    pub fn with(mut self, matchers: Vec<ArgumentMatcher>) -> Result<Self> {
        SetupError::check_arity(&self.member, matchers.len())?;
        self.shape = InvocationShape::from_matchers(self.member.clone(), &matchers);
        self.matcher = Box::new(Positional(matchers));
        Ok(self)
    }

    /// Use a caller-provided predicate. `shape` decides which other setups
    /// this one shadows.
    pub fn matching<M>(mut self, matcher: M, shape: InvocationShape) -> Self
    where
        M: InvocationMatcher + 'static,
    {
        self.matcher = Box::new(matcher);
        self.shape = shape;
        self
    }

    /// Only apply while `condition` holds. Makes the setup conditional.
    pub fn when<F>(mut self, condition: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        let condition: Arc<Condition> = Arc::new(condition);
        self.condition = Some(condition);
        self
    }

    pub fn returns<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.outcome = Outcome::Value(Arc::new(value));
        self
    }

    pub fn returns_inner_mock(mut self, mock: InnerMock) -> Self {
        self.outcome = Outcome::InnerMock(mock);
        self
    }

    pub fn build(self) -> Setup {
        Setup {
            member: self.member,
            shape: self.shape,
            matcher: self.matcher,
            condition: self.condition,
            outcome: self.outcome,
            state: AtomicU8::new(SetupState::Active.to_u8()),
            invocation_count: AtomicUsize::new(0),
        }
    }
}
