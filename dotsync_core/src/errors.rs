use snafu::{Location, prelude::*};

/// Asking a clock that holds no values to resolve a winner.
///
/// Returned by [[crate::Clock::last]], [[crate::Clock::lww]] and
/// [[crate::Clock::reconcile]]; an empty clock has nothing to pick from and
/// the caller has to decide what that means for its key.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
#[snafu(display("The clock holds no values, so there is no winner to resolve (at {location})"))]
pub struct EmptyClockError {
    #[snafu(implicit)]
    location: Location,
}
