use super::clock::Clock;
use crate::errors::{EmptyClockError, EmptyClockSnafu};
use snafu::prelude::*;

/// Where the currently-winning value of a resolver scan came from.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Origin<Id> {
    /// The winner is one of the anonymous values.
    Anonymous,
    /// The winner is the newest dotted value of this replica's entry.
    Entry(Id),
}

impl<Id, V> Clock<Id, V>
where
    Id: Clone,
{
    /// Scans for the winning value under `le`: entry heads first, then the
    /// anonymous values, which take over whenever they tie or beat the
    /// running winner.
    ///
    /// `le(a, b)` must be reflexive ("a is at most b"); a value never loses
    /// to itself.
    fn winner(&self, le: impl Fn(&V, &V) -> bool) -> Result<(&V, Origin<Id>), EmptyClockError> {
        let mut best: Option<(&V, Origin<Id>)> = None;
        let heads = self
            .entries()
            .iter()
            .filter_map(|entry| entry.head().map(|(_, value)| (value, Origin::Entry(entry.id().clone()))));
        let anonymous = self
            .anonymous()
            .iter()
            .map(|value| (value, Origin::Anonymous));
        for (value, origin) in heads.chain(anonymous) {
            best = match best {
                Some((current, _)) if le(current, value) => Some((value, origin)),
                Some(kept) => Some(kept),
                None => Some((value, origin)),
            };
        }
        best.context(EmptyClockSnafu)
    }

    /// The winning value under the caller's reflexive `a ≤ b` predicate.
    pub fn last(&self, le: impl Fn(&V, &V) -> bool) -> Result<&V, EmptyClockError> {
        self.winner(le).map(|(value, _)| value)
    }
}

impl<Id, V> Clock<Id, V>
where
    Id: Ord + Clone,
    V: Clone + PartialEq,
{
    /// Collapses the clock to the winning value under `le`, keeping the full
    /// causal summary: every losing dot is retired, no history is lost.
    pub fn lww(self, le: impl Fn(&V, &V) -> bool) -> Result<Self, EmptyClockError> {
        let (winner, origin) = {
            let (value, origin) = self.winner(&le)?;
            (value.clone(), origin)
        };
        match origin {
            Origin::Anonymous => Ok(Self::with_context(self.join(), winner)),
            Origin::Entry(id) => {
                let entries = self
                    .entries
                    .into_iter()
                    .map(|entry| {
                        if *entry.id() == id {
                            entry.retain_head()
                        } else {
                            entry.retire_values()
                        }
                    })
                    .collect();
                Ok(Clock {
                    entries,
                    anonymous: Vec::new(),
                })
            }
        }
    }

    /// Folds every live value into a single replacement chosen by `f`,
    /// keeping the full causal summary.
    pub fn reconcile(self, f: impl FnOnce(&[&V]) -> V) -> Result<Self, EmptyClockError> {
        ensure!(self.size() > 0, EmptyClockSnafu);
        let merged = {
            let values: Vec<&V> = self.values().collect();
            f(&values)
        };
        Ok(Self::with_context(self.join(), merged))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::causal::dots::DotSet;
    use crate::causal::version_vector::VersionVector;

    type C = Clock<&'static str, u32>;

    fn le(a: &u32, b: &u32) -> bool {
        a <= b
    }

    /// `{[(a: seen 1-2, live 4:5 and 3:2), (b: seen 1), (c: live 1:3)], []}`,
    /// built through the write path so every dot is accounted for.
    fn sibling_heavy_clock() -> C {
        // Replica a writes twice in sequence, then twice concurrently.
        let first = Clock::new(0).update("a");
        let second = Clock::with_context(first.join(), 1).update_with(&first, "a");
        let third = Clock::with_context(second.join(), 2).update_with(&second, "a");
        let fourth = Clock::with_context(second.join(), 5).update_with(&third, "a");
        // Replica b writes blindly, and replica c supersedes b's value only.
        let with_b = Clock::new(9).update_with(&fourth, "b");
        let b_only = VersionVector::from_pairs([("b", DotSet::from_base(1))]);
        Clock::with_context(b_only, 3).update_with(&with_b, "c")
    }

    fn values_of(clock: &C) -> Vec<u32> {
        clock.values().copied().collect()
    }

    #[test]
    fn the_scenario_clock_has_the_expected_shape() {
        let clock = sibling_heavy_clock();
        let shapes: Vec<_> = clock
            .entries()
            .iter()
            .map(|entry| (*entry.id(), entry.context().clone(), entry.values().to_vec()))
            .collect();
        assert_eq!(
            shapes,
            vec![
                ("a", DotSet::from_base(2), vec![(4, 5), (3, 2)]),
                ("b", DotSet::from_base(1), vec![]),
                ("c", DotSet::new(), vec![(1, 3)]),
            ]
        );
        assert!(clock.anonymous().is_empty());
        assert_eq!(values_of(&clock), [5, 2, 3]);
    }

    #[test]
    fn last_picks_the_largest_entry_head() {
        let clock = sibling_heavy_clock();
        // Only heads compete: the sibling at dot 3 (value 2) is not a candidate.
        assert_eq!(*clock.last(le).expect("non-empty"), 5);
    }

    #[test]
    fn last_lets_anonymous_values_take_over() {
        let clock = sibling_heavy_clock();
        let with_anonymous = Clock {
            entries: clock.entries.clone(),
            anonymous: vec![10, 0],
        };
        assert_eq!(*with_anonymous.last(le).expect("non-empty"), 10);
    }

    #[test]
    fn lww_keeps_only_the_winning_dot() {
        let collapsed = sibling_heavy_clock().lww(le).expect("non-empty");
        let shapes: Vec<_> = collapsed
            .entries()
            .iter()
            .map(|entry| (*entry.id(), entry.context().clone(), entry.values().to_vec()))
            .collect();
        assert_eq!(
            shapes,
            vec![
                ("a", DotSet::from_base(3), vec![(4, 5)]),
                ("b", DotSet::from_base(1), vec![]),
                ("c", DotSet::from_base(1), vec![]),
            ]
        );
        assert!(collapsed.anonymous().is_empty());
        assert_eq!(collapsed.join(), sibling_heavy_clock().join());
    }

    #[test]
    fn lww_rebuilds_around_an_anonymous_winner() {
        let clock = sibling_heavy_clock();
        let with_anonymous = Clock {
            entries: clock.entries.clone(),
            anonymous: vec![10, 0],
        };
        let collapsed = with_anonymous.lww(le).expect("non-empty");
        assert_eq!(collapsed.anonymous(), &[10]);
        for entry in collapsed.entries() {
            assert!(entry.values().is_empty());
        }
        assert_eq!(collapsed.join(), clock.join());
        assert_eq!(
            collapsed.join().get(&"a"),
            Some(&DotSet::from_base(4))
        );
    }

    #[test]
    fn reconcile_folds_every_value() {
        let clock = sibling_heavy_clock();
        let summed = clock
            .clone()
            .reconcile(|values| values.iter().map(|value| **value).sum())
            .expect("non-empty");
        assert_eq!(summed.anonymous(), &[10]);
        assert_eq!(summed.size(), 1);
        assert_eq!(summed.join(), clock.join());

        let with_anonymous = Clock {
            entries: clock.entries.clone(),
            anonymous: vec![10, 0],
        };
        let smallest = with_anonymous
            .reconcile(|values| values.iter().map(|value| **value).min().unwrap_or(0))
            .expect("non-empty");
        assert_eq!(smallest.anonymous(), &[0]);
    }

    #[test]
    fn resolving_an_empty_clock_is_refused() {
        let empty = C::default();
        assert!(empty.last(le).is_err());
        assert!(empty.clone().lww(le).is_err());
        assert!(empty.reconcile(|_| 0).is_err());
    }

    #[test]
    fn ties_prefer_the_later_candidate() {
        // `le` is reflexive, so an equal anonymous value takes the win and
        // lww rebuilds around it instead of keeping the dotted original.
        let written = Clock::new(5).update("a");
        let tied = Clock {
            entries: written.entries.clone(),
            anonymous: vec![5],
        };
        let collapsed = tied.lww(le).expect("non-empty");
        assert_eq!(collapsed.anonymous(), &[5]);
        assert!(collapsed.entries().iter().all(|entry| entry.values().is_empty()));
    }
}
