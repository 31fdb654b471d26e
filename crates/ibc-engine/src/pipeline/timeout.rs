//! Deadline handling for bounded runs.

use std::time::{Duration, Instant};

pub(crate) fn deadline_exceeded(deadline: Option<Instant>) -> bool {
    match deadline {
        Some(deadline) => Instant::now() >= deadline,
        None => false,
    }
}

pub(crate) fn deadline_from_timeout_secs(timeout_secs: u64) -> Option<Instant> {
    if timeout_secs == 0 {
        return None;
    }
    Instant::now().checked_add(Duration::from_secs(timeout_secs))
}

/// Whole seconds left before `deadline`, rounded up and at least 1 while
/// time remains; `Some(0)` once it has passed.
pub(crate) fn remaining_timeout_secs(deadline: Option<Instant>) -> Option<u64> {
    let deadline = deadline?;
    let now = Instant::now();
    if now >= deadline {
        return Some(0);
    }
    let remaining = deadline.saturating_duration_since(now);
    let rounded_up = if remaining.subsec_nanos() > 0 {
        remaining.as_secs().saturating_add(1)
    } else {
        remaining.as_secs()
    };
    Some(rounded_up.max(1))
}

/// Timeout to configure on the next solver (0 = none), or `None` when the
/// overall deadline has already passed.
pub(crate) fn attempt_timeout_secs(per_attempt: u64, deadline: Option<Instant>) -> Option<u64> {
    match remaining_timeout_secs(deadline) {
        Some(0) => None,
        Some(remaining) if per_attempt == 0 => Some(remaining),
        Some(remaining) => Some(per_attempt.min(remaining)),
        None => Some(per_attempt),
    }
}

pub(crate) fn timeout_unknown_reason(context: &str) -> String {
    format!("{context} timed out before completion.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_deadline_never_expires() {
        assert!(!deadline_exceeded(None));
        assert!(deadline_from_timeout_secs(0).is_none());
        assert!(remaining_timeout_secs(None).is_none());
    }

    #[test]
    fn past_deadline_is_exceeded() {
        let past = Instant::now() - Duration::from_secs(1);
        assert!(deadline_exceeded(Some(past)));
        assert_eq!(remaining_timeout_secs(Some(past)), Some(0));
    }

    #[test]
    fn future_deadline_rounds_up() {
        let future = Instant::now() + Duration::from_secs(60);
        let secs = remaining_timeout_secs(Some(future)).expect("deadline set");
        assert!((59..=61).contains(&secs));
        let close = Instant::now() + Duration::from_millis(50);
        assert!(remaining_timeout_secs(Some(close)).expect("deadline set") >= 1);
    }

    #[test]
    fn attempt_timeout_takes_the_tighter_limit() {
        assert_eq!(attempt_timeout_secs(0, None), Some(0));
        assert_eq!(attempt_timeout_secs(30, None), Some(30));
        let future = Instant::now() + Duration::from_secs(600);
        assert_eq!(attempt_timeout_secs(30, Some(future)), Some(30));
        let soon = Instant::now() + Duration::from_secs(10);
        let limited = attempt_timeout_secs(30, Some(soon)).expect("time left");
        assert!((9..=11).contains(&limited));
        let unlimited = attempt_timeout_secs(0, Some(soon)).expect("time left");
        assert!((9..=11).contains(&unlimited));
        let past = Instant::now() - Duration::from_secs(1);
        assert_eq!(attempt_timeout_secs(30, Some(past)), None);
    }

    #[test]
    fn timeout_reason_formats_context() {
        assert_eq!(
            timeout_unknown_reason("k = 2"),
            "k = 2 timed out before completion."
        );
    }
}
