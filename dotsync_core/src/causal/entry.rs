use super::dots::{Dot, DotSet};
use std::fmt;

/// The per-replica bucket of a [[super::Clock]]: the retired dots for that
/// replica together with the dotted values that are still live.
///
/// `context` holds exactly the dots this bucket has seen *and retired*; the
/// dots of live values are carried by the values themselves, so the full
/// known dot set is `context ∪ dots(values)`. Values are kept newest first.
#[derive(Clone, Debug, PartialEq)]
pub struct Entry<Id, V> {
    id: Id,
    context: DotSet,
    values: Vec<(Dot, V)>,
}

impl<Id, V> Entry<Id, V> {
    /// The very first event authored by `id`: dot 1, nothing retired.
    pub(crate) fn first(id: Id, value: V) -> Self {
        Self {
            id,
            context: DotSet::new(),
            values: vec![(1, value)],
        }
    }

    /// A value-free bucket carrying only already-seen dots, as echoed back by
    /// a client context.
    pub(crate) fn from_context(id: Id, context: DotSet) -> Self {
        Self {
            id,
            context,
            values: Vec::new(),
        }
    }

    pub fn id(&self) -> &Id {
        &self.id
    }

    /// The retired dots of this bucket.
    pub fn context(&self) -> &DotSet {
        &self.context
    }

    /// The live dotted values, newest first.
    pub fn values(&self) -> &[(Dot, V)] {
        &self.values
    }

    /// The newest live dotted value.
    pub fn head(&self) -> Option<&(Dot, V)> {
        self.values.first()
    }

    /// All dots this bucket has knowledge of, live or retired.
    pub fn known(&self) -> DotSet {
        let mut known = self.context.clone();
        for (dot, _) in &self.values {
            known.insert(*dot);
        }
        known
    }

    /// The next unused dot for this replica: one past everything known,
    /// retired or live.
    pub(crate) fn next_dot(&self) -> Dot {
        let live_max = self
            .values
            .iter()
            .map(|(dot, _)| *dot)
            .max()
            .unwrap_or(0);
        self.context.max_dot().max(live_max) + 1
    }

    /// Records a fresh event carrying `value`. The context is left as-is;
    /// merging re-normalizes it later.
    pub(crate) fn record(&mut self, value: V) {
        let dot = self.next_dot();
        self.values.insert(0, (dot, value));
    }

    /// Keeps only the newest live value, retiring the dots of the rest.
    pub(crate) fn retain_head(self) -> Self {
        let Entry {
            id,
            mut context,
            mut values,
        } = self;
        let tail = if values.is_empty() {
            Vec::new()
        } else {
            values.split_off(1)
        };
        for (dot, _) in tail {
            context.insert(dot);
        }
        Entry {
            id,
            context,
            values,
        }
    }

    /// Retires every live value into the context.
    pub(crate) fn retire_values(self) -> Self {
        let Entry {
            id,
            mut context,
            values,
        } = self;
        for (dot, _) in values {
            context.insert(dot);
        }
        Entry {
            id,
            context,
            values: Vec::new(),
        }
    }

    pub(crate) fn map_values<U>(self, f: &mut impl FnMut(V) -> U) -> Entry<Id, U> {
        Entry {
            id: self.id,
            context: self.context,
            values: self
                .values
                .into_iter()
                .map(|(dot, value)| (dot, f(value)))
                .collect(),
        }
    }
}

impl<Id, V> Entry<Id, V>
where
    Id: PartialEq,
{
    /// Merges two buckets for the same replica.
    ///
    /// A value survives iff the merged retired context does not cover its
    /// dot; a dot that survives on both sides (the inputs share history) is
    /// kept once. Survivors keep their newest-first order, this side's
    /// values before `other`'s.
    pub(crate) fn sync(self, other: Self) -> Self {
        let Entry {
            id,
            mut context,
            values,
        } = self;
        let Entry {
            id: other_id,
            context: other_context,
            values: other_values,
        } = other;
        debug_assert!(id == other_id, "Only buckets of the same replica merge");

        context.union(&other_context);
        let mut live = DotSet::new();
        let values = values
            .into_iter()
            .chain(other_values)
            .filter(|(dot, _)| !context.contains(*dot) && live.insert(*dot))
            .collect();
        Entry {
            id,
            context,
            values,
        }
    }
}

impl<Id, V> fmt::Display for Entry<Id, V>
where
    Id: fmt::Display,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} [", self.id, self.context)?;
        for (index, (dot, value)) in self.values.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{dot}:{value:?}")?;
        }
        write!(f, "]")
    }
}
