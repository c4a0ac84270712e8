//! InvocationShape: equivalence key used to decide which setups shadow
//! each other.

use crate::matcher::ArgumentMatcher;
use crate::member::Member;
use core::fmt;
use std::sync::Arc;

/// Two setups with equal shapes describe the same call pattern.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct InvocationShape {
    member: Member,
    matchers: Arc<[Arc<str>]>,
}

impl InvocationShape {
    /// Build a shape from a member and the keys of its argument matchers.
    pub fn new<I, S>(member: Member, matcher_keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        InvocationShape {
            member,
            matchers: matcher_keys
                .into_iter()
                .map(|k| Arc::from(k.as_ref()))
                .collect(),
        }
    }

    pub(crate) fn from_matchers(member: Member, matchers: &[ArgumentMatcher]) -> Self {
        InvocationShape {
            member,
            matchers: matchers.iter().map(ArgumentMatcher::key_arc).collect(),
        }
    }

    pub fn member(&self) -> &Member {
        &self.member
    }

    pub fn matcher_keys(&self) -> impl ExactSizeIterator<Item = &str> {
        self.matchers.iter().map(|k| &**k)
    }
}

impl fmt::Display for InvocationShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}(", self.member.owner(), self.member.name())?;
        for (i, k) in self.matchers.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(k)?;
        }
        f.write_str(")")
    }
}
