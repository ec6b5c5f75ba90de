use super::dots::DotSet;
use itertools::Itertools;
use std::fmt;

/// The values-stripped causal summary of a [[super::Clock]]: one compact dot
/// set per replica, sorted by replica id.
///
/// This is what a client carries between a read and its next write:
/// [[super::Clock::join]] produces it, and [[super::Clock::with_context]]
/// turns it back into the context of the write.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VersionVector<Id> {
    entries: Vec<(Id, DotSet)>,
}

impl<Id> VersionVector<Id>
where
    Id: Ord,
{
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Builds a summary from unsorted pairs; duplicate ids are unioned.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Id, DotSet)>) -> Self {
        let mut summary = Self::new();
        for (id, dots) in pairs {
            match summary.entries.binary_search_by(|(i, _)| i.cmp(&id)) {
                Ok(pos) => summary.entries[pos].1.union(&dots),
                Err(pos) => summary.entries.insert(pos, (id, dots)),
            }
        }
        summary
    }

    /// Appends an entry that is known to sort after everything present.
    pub(crate) fn push_sorted(&mut self, id: Id, dots: DotSet) {
        debug_assert!(
            self.entries.last().is_none_or(|(last, _)| *last < id),
            "Summary entries must be appended in ascending id order"
        );
        self.entries.push((id, dots));
    }

    pub fn get(&self, id: &Id) -> Option<&DotSet> {
        self.entries
            .binary_search_by(|(i, _)| i.cmp(id))
            .ok()
            .map(|pos| &self.entries[pos].1)
    }
}

impl<Id> VersionVector<Id> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Id, &DotSet)> {
        self.entries.iter().map(|(id, dots)| (id, dots))
    }

    pub(crate) fn into_pairs(self) -> Vec<(Id, DotSet)> {
        self.entries
    }
}

impl<Id> fmt::Display for VersionVector<Id>
where
    Id: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self
            .entries
            .iter()
            .map(|(id, dots)| format!("{id} -> {dots}"))
            .join(", ");
        write!(f, "〈{entries}〉")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_are_sorted_and_unioned() {
        let summary = VersionVector::from_pairs([
            ("b", DotSet::from_base(1)),
            ("a", DotSet::from_base(2)),
            ("b", DotSet::from_parts(0, [3])),
        ]);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary.get(&"a"), Some(&DotSet::from_base(2)));
        assert_eq!(summary.get(&"b"), Some(&DotSet::from_parts(1, [3])));
        assert_eq!(summary.get(&"c"), None);

        let ids: Vec<_> = summary.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[test]
    fn string_representation() {
        let summary = VersionVector::from_pairs([
            ("a", DotSet::from_base(2)),
            ("b", DotSet::from_parts(1, [3])),
        ]);
        assert_eq!(summary.to_string(), "〈a -> 〈1-2〉, b -> 〈1, 3〉〉");
    }
}
