//! Argument matching seams.
//!
//! `InvocationMatcher` is the predicate a setup evaluates against a call.
//! `ArgumentMatcher` is a small per-argument building block; each matcher
//! carries a stable key so that setups built from equal matchers end up
//! with equal `InvocationShape`s.

use crate::invocation::Invocation;
use core::any::Any;
use core::fmt;
use std::sync::Arc;

/// Predicate evaluated by a setup against an incoming call.
///
/// Runs while the registry lock is held: it must not call back into the
/// registry that owns the setup.
pub trait InvocationMatcher: Send + Sync {
    fn matches(&self, invocation: &Invocation) -> bool;
}

impl<F> InvocationMatcher for F
where
    F: Fn(&Invocation) -> bool + Send + Sync,
{
    fn matches(&self, invocation: &Invocation) -> bool {
        self(invocation)
    }
}

type ArgPredicate = dyn Fn(&(dyn Any + Send + Sync)) -> bool + Send + Sync;

#[derive(Clone)]
pub struct ArgumentMatcher {
    key: Arc<str>,
    predicate: Option<Arc<ArgPredicate>>, // None matches anything
}

impl ArgumentMatcher {
    /// Matches any value.
    pub fn any() -> Self {
        ArgumentMatcher {
            key: Arc::from("any"),
            predicate: None,
        }
    }

    /// Matches values of type `T` equal to `expected`.
    pub fn eq<T>(expected: T) -> Self
    where
        T: PartialEq + fmt::Debug + Send + Sync + 'static,
    {
        let key: Arc<str> = Arc::from(format!("eq({:?})", expected));
        let predicate: Arc<ArgPredicate> = Arc::new(move |v: &(dyn Any + Send + Sync)| {
            v.downcast_ref::<T>().is_some_and(|v| *v == expected)
        });
        ArgumentMatcher {
            key,
            predicate: Some(predicate),
        }
    }

    /// Matches values of type `T` accepted by `f`. `description` is the
    /// matcher's identity: two predicates with the same description are
    /// treated as the same pattern.
    pub fn predicate<T, F>(description: &str, f: F) -> Self
    where
        T: 'static,
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let predicate: Arc<ArgPredicate> = Arc::new(move |v: &(dyn Any + Send + Sync)| {
            v.downcast_ref::<T>().is_some_and(&f)
        });
        ArgumentMatcher {
            key: Arc::from(description),
            predicate: Some(predicate),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub(crate) fn key_arc(&self) -> Arc<str> {
        Arc::clone(&self.key)
    }

    pub fn matches(&self, value: &(dyn Any + Send + Sync)) -> bool {
        match &self.predicate {
            None => true,
            Some(p) => p(value),
        }
    }
}

impl fmt::Debug for ArgumentMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

/// Positional matchers checked argument by argument.
pub(crate) struct Positional(pub(crate) Vec<ArgumentMatcher>);

impl InvocationMatcher for Positional {
    fn matches(&self, invocation: &Invocation) -> bool {
        let args = invocation.arguments();
        args.len() == self.0.len()
            && self
                .0
                .iter()
                .zip(args)
                .all(|(m, a)| m.matches(&**a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invocation::arg;
    use crate::member::Member;

    #[test]
    fn any_matches_every_type() {
        let m = ArgumentMatcher::any();
        assert!(m.matches(&5i32));
        assert!(m.matches(&"x"));
        assert_eq!(m.key(), "any");
    }

    /// Invariant: `eq` requires both the type and the value to match.
    #[test]
    fn eq_checks_type_and_value() {
        let m = ArgumentMatcher::eq(5i32);
        assert!(m.matches(&5i32));
        assert!(!m.matches(&6i32));
        assert!(!m.matches(&5i64));
        assert_eq!(m.key(), "eq(5)");
    }

    #[test]
    fn predicate_uses_description_as_key() {
        let m = ArgumentMatcher::predicate("is_even", |v: &i32| v % 2 == 0);
        assert!(m.matches(&4i32));
        assert!(!m.matches(&3i32));
        assert!(!m.matches(&"4"));
        assert_eq!(m.key(), "is_even");
    }

    #[test]
    fn positional_matches_all_arguments() {
        let member = Member::method("app::Service", "put", ["String", "i32"]);
        let p = Positional(vec![ArgumentMatcher::any(), ArgumentMatcher::eq(7i32)]);

        let hit = Invocation::new(member.clone(), vec![arg("k".to_string()), arg(7i32)]).unwrap();
        let miss = Invocation::new(member, vec![arg("k".to_string()), arg(8i32)]).unwrap();
        assert!(p.matches(&hit));
        assert!(!p.matches(&miss));
    }

    #[test]
    fn closures_are_invocation_matchers() {
        let member = Member::method("app::Service", "ping", [""; 0]);
        let inv = Invocation::new(member, vec![]).unwrap();
        let yes = |_: &Invocation| true;
        assert!(InvocationMatcher::matches(&yes, &inv));
    }
}
