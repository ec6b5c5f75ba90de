use super::{
    entry::Entry,
    happened_before::{HappenedBeforeOrd, HappenedBeforeOrdering},
    version_vector::VersionVector,
};
use itertools::{EitherOrBoth, Itertools};
use std::{cmp::Ordering, fmt};

/// The full causal container stored for a single key: per-replica entries
/// plus the anonymous sibling values that carry no dot (yet).
///
/// Entries are sorted strictly ascending by replica id. Anonymous values are
/// values a client submitted but that no replica has written yet, or values
/// that outlived their dot; their order carries no meaning.
///
/// Clocks are pure values: every operation returns a fresh clock and never
/// mutates its arguments. [[Clock::default]] (no entries, no anonymous
/// values) is the neutral element of [[Clock::sync]].
#[derive(Clone, Debug, PartialEq)]
pub struct Clock<Id, V> {
    pub(super) entries: Vec<Entry<Id, V>>,
    pub(super) anonymous: Vec<V>,
}

impl<Id, V> Default for Clock<Id, V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            anonymous: Vec::new(),
        }
    }
}

impl<Id, V> Clock<Id, V> {
    /// A client clock holding a single value and no causal context.
    pub fn new(value: V) -> Self {
        Self::new_list([value])
    }

    /// A client clock holding several values and no causal context.
    pub fn new_list(values: impl IntoIterator<Item = V>) -> Self {
        Self {
            entries: Vec::new(),
            anonymous: values.into_iter().collect(),
        }
    }

    /// A client clock holding `value` under the summary echoed from a
    /// previous [[Clock::join]].
    pub fn with_context(context: VersionVector<Id>, value: V) -> Self {
        Self::with_context_list(context, [value])
    }

    /// A client clock holding several values under an echoed summary.
    pub fn with_context_list(
        context: VersionVector<Id>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let entries = context
            .into_pairs()
            .into_iter()
            .map(|(id, dots)| Entry::from_context(id, dots))
            .collect();
        Self {
            entries,
            anonymous: values.into_iter().collect(),
        }
    }

    /// The per-replica entries, ascending by id.
    pub fn entries(&self) -> &[Entry<Id, V>] {
        &self.entries
    }

    /// The values currently living without a dot.
    pub fn anonymous(&self) -> &[V] {
        &self.anonymous
    }

    /// The number of live values, dotted and anonymous.
    pub fn size(&self) -> usize {
        self.anonymous.len()
            + self
                .entries
                .iter()
                .map(|entry| entry.values().len())
                .sum::<usize>()
    }

    /// The replica ids with an entry, in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = &Id> {
        self.entries.iter().map(Entry::id)
    }

    /// All live values: anonymous first, then each entry's values newest to
    /// oldest, in entry order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.anonymous.iter().chain(
            self.entries
                .iter()
                .flat_map(|entry| entry.values().iter().map(|(_, value)| value)),
        )
    }

    /// Rewrites every live value with `f`, preserving structure and order.
    pub fn map<U>(self, mut f: impl FnMut(V) -> U) -> Clock<Id, U> {
        Clock {
            entries: self
                .entries
                .into_iter()
                .map(|entry| entry.map_values(&mut f))
                .collect(),
            anonymous: self.anonymous.into_iter().map(&mut f).collect(),
        }
    }
}

impl<Id, V> Clock<Id, V>
where
    Id: Ord,
{
    /// Whether `self`'s history is strictly contained in `other`'s.
    ///
    /// Anonymous values are ignored; only the per-replica dot knowledge
    /// counts. `less` and its converse both being false means the clocks are
    /// either equal or concurrent.
    pub fn less(&self, other: &Self) -> bool {
        greater(&other.entries, &self.entries, false)
    }

    /// Causal equality: the same replicas, with the same retired context and
    /// the same number of live values each. Value payloads are not compared.
    pub fn equal(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .zip(&other.entries)
                .all(|(ours, theirs)| {
                    ours.id() == theirs.id()
                        && ours.context() == theirs.context()
                        && ours.values().len() == theirs.values().len()
                })
    }
}

impl<Id, V> Clock<Id, V>
where
    Id: Ord + Clone,
{
    /// The causal summary of this clock: per replica, every known dot, live
    /// or retired. Clients echo this back as the context of their next
    /// write.
    pub fn join(&self) -> VersionVector<Id> {
        let mut summary = VersionVector::new();
        for entry in &self.entries {
            summary.push_sorted(entry.id().clone(), entry.known());
        }
        summary
    }
}

impl<Id, V> Clock<Id, V>
where
    Id: Ord,
    V: PartialEq,
{
    /// Merges two clocks.
    ///
    /// Entries merge id-by-id (see [[Entry]]); anonymous values survive
    /// unless one side causally dominates the other, in which case the
    /// dominated side's are dropped. Surviving anonymous values are
    /// deduplicated.
    pub fn sync(self, other: Self) -> Self {
        let self_dominated = self.less(&other);
        let other_dominated = other.less(&self);
        let Clock {
            entries: left,
            anonymous: left_anon,
        } = self;
        let Clock {
            entries: right,
            anonymous: right_anon,
        } = other;

        let anonymous = if self_dominated {
            right_anon
        } else if other_dominated {
            left_anon
        } else {
            let mut merged = Vec::with_capacity(left_anon.len() + right_anon.len());
            for value in left_anon.into_iter().chain(right_anon) {
                if !merged.contains(&value) {
                    merged.push(value);
                }
            }
            merged
        };

        let entries = left
            .into_iter()
            .merge_join_by(right, |ours, theirs| ours.id().cmp(theirs.id()))
            .map(|merged| match merged {
                EitherOrBoth::Left(entry) | EitherOrBoth::Right(entry) => entry,
                EitherOrBoth::Both(ours, theirs) => ours.sync(theirs),
            })
            .collect();

        Clock { entries, anonymous }
    }

    /// Folds a collection of clocks into one, starting from the neutral
    /// empty clock.
    pub fn sync_all(clocks: impl IntoIterator<Item = Self>) -> Self {
        clocks.into_iter().fold(Self::default(), Self::sync)
    }

    /// Turns a client clock into a written clock: the anonymous value is
    /// assigned the next dot authored by `id`.
    ///
    /// The receiver must be a client clock as produced by the constructors:
    /// exactly one anonymous value and no dotted values.
    pub fn update(mut self, id: Id) -> Self {
        let value = self.take_client_value();
        self.record_event(id, value)
    }

    /// Like [[Clock::update]], but first folds the server's clock into the
    /// client's context, so the result is strictly causally greater than
    /// both. This is the write path of a store replica.
    pub fn update_with(mut self, server: &Self, id: Id) -> Self
    where
        Id: Clone,
        V: Clone,
    {
        let value = self.take_client_value();
        let context = Clock {
            entries: self.entries,
            anonymous: Vec::new(),
        };
        context.sync(server.clone()).record_event(id, value)
    }

    fn take_client_value(&mut self) -> V {
        assert!(
            self.anonymous.len() == 1
                && self.entries.iter().all(|entry| entry.values().is_empty()),
            "update requires a client clock: exactly one anonymous value and no dotted values"
        );
        self.anonymous.remove(0)
    }

    /// Inserts a fresh event authored by `id` carrying `value`.
    fn record_event(mut self, id: Id, value: V) -> Self {
        match self
            .entries
            .binary_search_by(|entry| entry.id().cmp(&id))
        {
            Ok(pos) => self.entries[pos].record(value),
            Err(pos) => self.entries.insert(pos, Entry::first(id, value)),
        }
        self
    }
}

/// Walks both sorted entry lists and decides whether `a` knows at least
/// everything `b` knows; `strict` tracks whether `a` knows more.
fn greater<Id, V>(a: &[Entry<Id, V>], b: &[Entry<Id, V>], mut strict: bool) -> bool
where
    Id: Ord,
{
    let mut a = a.iter();
    let mut b = b.iter();
    let mut next_a = a.next();
    let mut next_b = b.next();
    loop {
        match (next_a, next_b) {
            (None, None) => return strict,
            (Some(_), None) => return true,
            (None, Some(_)) => return false,
            (Some(ours), Some(theirs)) => match ours.id().cmp(theirs.id()) {
                Ordering::Less => {
                    // `a` knows a replica `b` has never heard of.
                    strict = true;
                    next_a = a.next();
                }
                Ordering::Greater => return false,
                Ordering::Equal => {
                    let known_a = ours.known();
                    let known_b = theirs.known();
                    if known_a != known_b {
                        if known_b.is_subset(&known_a) {
                            strict = true;
                        } else {
                            return false;
                        }
                    }
                    next_a = a.next();
                    next_b = b.next();
                }
            },
        }
    }
}

impl<Id, V> HappenedBeforeOrd for Clock<Id, V>
where
    Id: Ord,
    V: PartialEq,
{
    fn hb_cmp(&self, other: &Self) -> HappenedBeforeOrdering {
        if self.equal(other) {
            HappenedBeforeOrdering::Equal
        } else if self.less(other) {
            HappenedBeforeOrdering::Before
        } else if other.less(self) {
            HappenedBeforeOrdering::After
        } else {
            HappenedBeforeOrdering::Concurrent
        }
    }
}

impl<Id, V> fmt::Display for Clock<Id, V>
where
    Id: fmt::Display,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.iter().map(|entry| entry.to_string()).join("; ");
        write!(f, "〈{entries}〉 + {:?}", self.anonymous)
    }
}
