use std::fmt;
use uuid::Uuid;

/// An opaque, totally-ordered replica identifier.
///
/// The algebra in [[crate::causal]] is generic over any ordered id type;
/// this is the ready-made instantiation an embedding store can use. Ids are
/// read and compared far more often than they are created, so they are
/// stored as immutable boxed strings and clones stay cheap to reason about.
/// Mint a globally-unique id with [[ReplicaId::random]], or build one from a
/// fixed string where the deployment already names its replicas.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReplicaId(Box<str>);

impl ReplicaId {
    /// Mint a fresh, globally-unique replica id.
    pub fn random() -> Self {
        Self::from(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ReplicaId {
    fn from(value: &str) -> Self {
        Self(Box::<str>::from(value))
    }
}

impl From<String> for ReplicaId {
    fn from(value: String) -> Self {
        Self(value.into_boxed_str())
    }
}

impl AsRef<str> for ReplicaId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ReplicaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // A bit shorter than the full generated Debug.
        write!(f, "r\"{}\"", self.0)
    }
}

impl fmt::Display for ReplicaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn literal_ids_order_lexicographically() {
        let a = ReplicaId::from("a");
        let b = ReplicaId::from("b");
        assert!(a < b);
        assert_eq!(a, ReplicaId::from("a".to_string()));
        assert_eq!(a.to_string(), "a");
        assert_eq!(b.as_str(), "b");
        assert_eq!(format!("{a:?}"), "r\"a\"");
    }

    #[test]
    fn random_ids_are_distinct() {
        let one = ReplicaId::random();
        let other = ReplicaId::random();
        assert_ne!(one, other);
    }

    proptest! {
        #[test]
        fn replica_id_invariants(s in "\\PC*") {
            let s_ref: &str = &s;
            let id = ReplicaId::from(s_ref);

            assert_eq!(id, id);
            assert_eq!(id.as_ref(), s_ref);
            assert_eq!(id.as_str(), s_ref);
            assert_eq!(id.to_string(), s.to_string());
        }

        #[test]
        fn ordering_matches_the_underlying_name(a in "\\PC*", b in "\\PC*") {
            let ia = ReplicaId::from(a.as_str());
            let ib = ReplicaId::from(b.as_str());
            assert_eq!(ia.cmp(&ib), a.as_str().cmp(b.as_str()));
        }
    }
}
