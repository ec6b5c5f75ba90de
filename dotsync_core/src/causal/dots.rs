use itertools::Itertools;
use std::{collections::BTreeSet, fmt};

/// A single event counter authored by one replica.
///
/// Dot `n` is the `n`-th write that replica issued for the key; numbering
/// starts at 1, so 0 never names an event.
pub type Dot = u64;

/// A compact set of [[Dot]]s: the contiguous run `1..=base` plus a sparse set
/// of exceptions above it.
///
/// The representation is kept canonical at all times: `base` is the largest
/// counter whose full prefix is contained, and `exceptions` only holds dots
/// strictly greater than `base + 1` (a dot at `base + 1` is absorbed into the
/// run on insert). Structural equality therefore coincides with set equality.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct DotSet {
    base: Dot,
    exceptions: BTreeSet<Dot>,
}

impl DotSet {
    pub const fn new() -> Self {
        Self {
            base: 0,
            exceptions: BTreeSet::new(),
        }
    }

    /// The set `1..=base`.
    pub const fn from_base(base: Dot) -> Self {
        Self {
            base,
            exceptions: BTreeSet::new(),
        }
    }

    /// Builds a set from a run and arbitrary extra dots, re-normalizing as
    /// needed.
    pub fn from_parts(base: Dot, exceptions: impl IntoIterator<Item = Dot>) -> Self {
        let mut dots = Self::from_base(base);
        for dot in exceptions {
            dots.insert(dot);
        }
        dots
    }

    /// The end of the contiguous prefix; `1..=base()` is fully contained.
    pub const fn base(&self) -> Dot {
        self.base
    }

    /// The sparse dots above the contiguous prefix, in ascending order.
    pub fn exceptions(&self) -> impl Iterator<Item = Dot> {
        self.exceptions.iter().copied()
    }

    pub fn contains(&self, dot: Dot) -> bool {
        dot != 0 && (dot <= self.base || self.exceptions.contains(&dot))
    }

    /// The largest contained dot, or 0 for the empty set.
    pub fn max_dot(&self) -> Dot {
        self.exceptions
            .iter()
            .next_back()
            .copied()
            .unwrap_or(self.base)
    }

    /// Adds `dot`, returning whether it was newly added.
    ///
    /// A run that becomes contiguous through this insert is absorbed into the
    /// base, keeping the representation canonical.
    pub fn insert(&mut self, dot: Dot) -> bool {
        debug_assert!(dot > 0, "Dot counters start at 1");
        if self.contains(dot) {
            return false;
        }
        if dot == self.base + 1 {
            self.base = dot;
            self.absorb_run();
        } else {
            self.exceptions.insert(dot);
        }
        self.assert_valid();
        true
    }

    /// Merges every dot of `other` into `self`.
    pub fn union(&mut self, other: &DotSet) {
        if other.base > self.base {
            // Keep the larger run and re-file our exceptions against it.
            let displaced = std::mem::take(&mut self.exceptions);
            self.base = other.base;
            self.exceptions
                .extend(displaced.into_iter().filter(|&dot| dot > self.base));
            self.absorb_run();
        }
        for dot in &other.exceptions {
            self.insert(*dot);
        }
        self.assert_valid();
    }

    /// Whether every dot of `self` is also contained in `other`.
    pub fn is_subset(&self, other: &DotSet) -> bool {
        if self.base > other.base
            && !(other.base + 1..=self.base).all(|dot| other.exceptions.contains(&dot))
        {
            return false;
        }
        self.exceptions.iter().all(|&dot| other.contains(dot))
    }

    fn absorb_run(&mut self) {
        while self.exceptions.remove(&(self.base + 1)) {
            self.base += 1;
        }
    }

    fn is_valid(&self) -> bool {
        self.exceptions
            .first()
            .is_none_or(|&smallest| smallest > self.base + 1)
    }

    #[inline(always)]
    fn assert_valid(&self) {
        debug_assert!(self.is_valid(), "Non-canonical dot set: {self:?}");
    }
}

impl<const N: usize> From<[Dot; N]> for DotSet {
    fn from(dots: [Dot; N]) -> Self {
        Self::from_parts(0, dots)
    }
}

impl FromIterator<Dot> for DotSet {
    fn from_iter<I: IntoIterator<Item = Dot>>(dots: I) -> Self {
        Self::from_parts(0, dots)
    }
}

impl fmt::Display for DotSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::with_capacity(1 + self.exceptions.len());
        match self.base {
            0 => {}
            1 => parts.push("1".to_string()),
            base => parts.push(format!("1-{base}")),
        }
        parts.extend(self.exceptions.iter().map(|dot| dot.to_string()));
        write!(f, "〈{}〉", parts.iter().join(", "))
    }
}
