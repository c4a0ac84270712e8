//! Member: stable descriptor of a mocked member.
//!
//! Identity is structural (owner, name, parameter types, kind), so two
//! descriptors obtained independently for the same member compare equal.

use core::fmt;
use std::sync::Arc;

/// What sort of member a descriptor names.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum MemberKind {
    Method,
    PropertyGet,
    PropertySet,
    EventAdd,
    EventRemove,
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Member {
    owner: Arc<str>,
    name: Arc<str>,
    parameters: Arc<[Arc<str>]>,
    kind: MemberKind,
}

impl Member {
    pub fn new<P, S>(owner: &str, name: &str, parameters: P, kind: MemberKind) -> Self
    where
        P: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Member {
            owner: Arc::from(owner),
            name: Arc::from(name),
            parameters: parameters
                .into_iter()
                .map(|p| Arc::from(p.as_ref()))
                .collect(),
            kind,
        }
    }

    pub fn method<P, S>(owner: &str, name: &str, parameters: P) -> Self
    where
        P: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(owner, name, parameters, MemberKind::Method)
    }

    pub fn property_getter(owner: &str, property: &str) -> Self {
        Self::new(owner, property, [""; 0], MemberKind::PropertyGet)
    }

    pub fn property_setter(owner: &str, property: &str, ty: &str) -> Self {
        Self::new(owner, property, [ty], MemberKind::PropertySet)
    }

    pub fn event_add(owner: &str, event: &str, handler: &str) -> Self {
        Self::new(owner, event, [handler], MemberKind::EventAdd)
    }

    pub fn event_remove(owner: &str, event: &str, handler: &str) -> Self {
        Self::new(owner, event, [handler], MemberKind::EventRemove)
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn parameters(&self) -> impl ExactSizeIterator<Item = &str> {
        self.parameters.iter().map(|p| &**p)
    }
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }
    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    pub fn is_property_accessor(&self) -> bool {
        matches!(self.kind, MemberKind::PropertyGet | MemberKind::PropertySet)
    }

    pub fn is_event_accessor(&self) -> bool {
        matches!(self.kind, MemberKind::EventAdd | MemberKind::EventRemove)
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.kind {
            MemberKind::Method => "",
            MemberKind::PropertyGet => "get ",
            MemberKind::PropertySet => "set ",
            MemberKind::EventAdd => "add ",
            MemberKind::EventRemove => "remove ",
        };
        write!(f, "{}{}::{}(", prefix, self.owner, self.name)?;
        for (i, p) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(p)?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of(m: &Member) -> u64 {
        let mut h = DefaultHasher::new();
        m.hash(&mut h);
        h.finish()
    }

    /// Invariant: independently built descriptors of the same member are equal
    /// and hash identically.
    #[test]
    fn structural_identity() {
        let a = Member::method("app::Calculator", "add", ["i32", "i32"]);
        let b = Member::method("app::Calculator", "add", vec!["i32".to_string(), "i32".into()]);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    /// Invariant: owner, parameter list and kind all participate in identity.
    #[test]
    fn identity_distinguishes_signature_parts() {
        let base = Member::method("app::Calculator", "add", ["i32", "i32"]);
        assert_ne!(base, Member::method("app::ICalculator", "add", ["i32", "i32"]));
        assert_ne!(base, Member::method("app::Calculator", "add", ["i64", "i64"]));
        assert_ne!(
            Member::property_getter("app::Calculator", "mode"),
            Member::method("app::Calculator", "mode", [""; 0])
        );
    }

    #[test]
    fn accessor_classification() {
        assert!(Member::property_getter("T", "p").is_property_accessor());
        assert!(Member::property_setter("T", "p", "i32").is_property_accessor());
        assert!(Member::event_add("T", "changed", "Handler").is_event_accessor());
        assert!(Member::event_remove("T", "changed", "Handler").is_event_accessor());

        let m = Member::method("T", "run", [""; 0]);
        assert!(!m.is_property_accessor());
        assert!(!m.is_event_accessor());
    }

    #[test]
    fn display_renders_signature() {
        let m = Member::method("app::Calculator", "add", ["i32", "i32"]);
        assert_eq!(m.to_string(), "app::Calculator::add(i32, i32)");
        assert_eq!(
            Member::property_getter("app::Calculator", "mode").to_string(),
            "get app::Calculator::mode()"
        );
        assert_eq!(m.arity(), 2);
    }

    #[test]
    fn accessors_expose_descriptor_parts() {
        let m = Member::property_setter("app::Calculator", "mode", "Mode");
        assert_eq!(m.owner(), "app::Calculator");
        assert_eq!(m.name(), "mode");
        assert_eq!(m.kind(), MemberKind::PropertySet);
        assert_eq!(m.parameters().collect::<Vec<_>>(), ["Mode"]);

        let run = Member::method("app::Calculator", "run", [""; 0]);
        assert_eq!(run.kind(), MemberKind::Method);
        assert_eq!(run.parameters().len(), 0);
    }
}
