//! Final pass/fail reduction and the diagnostic transcript.

use crate::visibility::CheckPoint;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Pass,
    Fail,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Pass => write!(f, "PASS"),
            Outcome::Fail => write!(f, "FAIL"),
        }
    }
}

/// The run's final result plus its ordered diagnostic transcript.
#[derive(Debug, Clone)]
pub struct Verdict {
    pub outcome: Outcome,
    pub lines: Vec<String>,
}

impl Verdict {
    pub fn new(outcome: Outcome, mut lines: Vec<String>) -> Self {
        lines.push(format!("RESULT: {}", outcome));
        Self { outcome, lines }
    }

    /// A run that died before producing check points (launch or navigation
    /// failure, or an unexpected error). Always FAIL, never a panic.
    pub fn aborted(mut lines: Vec<String>, reason: &str) -> Self {
        lines.push(format!("ERROR: {}", reason));
        Self::new(Outcome::Fail, lines)
    }

    pub fn passed(&self) -> bool {
        self.outcome == Outcome::Pass
    }

    /// Process exit code: 0 on PASS, 1 otherwise. Never any other value.
    pub fn exit_code(&self) -> i32 {
        match self.outcome {
            Outcome::Pass => 0,
            Outcome::Fail => 1,
        }
    }
}

/// Reduce the run to PASS or FAIL.
///
/// PASS requires resolution to have succeeded and the element to report
/// visible after the settle step, with containment not known to be false.
/// Unknown fields (failed best-effort reads) never flip a verdict on their
/// own: a missing bounding box is not treated as off-screen.
pub fn decide(found: bool, after_scroll: &CheckPoint) -> Outcome {
    if !found {
        return Outcome::Fail;
    }
    if after_scroll.visible != Some(true) {
        return Outcome::Fail;
    }
    if after_scroll.in_viewport == Some(false) {
        return Outcome::Fail;
    }
    Outcome::Pass
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visibility::{BoundingBox, Phase};

    fn check_point(visible: Option<bool>, in_viewport: Option<bool>) -> CheckPoint {
        CheckPoint {
            phase: Phase::AfterScroll,
            visible,
            bounding_box: visible.map(|_| BoundingBox {
                x: 0.0,
                y: 50.0,
                width: 100.0,
                height: 40.0,
            }),
            in_viewport,
        }
    }

    #[test]
    fn visible_and_contained_passes() {
        assert_eq!(decide(true, &check_point(Some(true), Some(true))), Outcome::Pass);
    }

    #[test]
    fn not_found_fails_regardless_of_checks() {
        assert_eq!(decide(false, &check_point(Some(true), Some(true))), Outcome::Fail);
    }

    #[test]
    fn hidden_after_scroll_fails() {
        assert_eq!(decide(true, &check_point(Some(false), Some(true))), Outcome::Fail);
    }

    #[test]
    fn out_of_viewport_fails() {
        assert_eq!(decide(true, &check_point(Some(true), Some(false))), Outcome::Fail);
    }

    #[test]
    fn unknown_visibility_fails() {
        assert_eq!(decide(true, &check_point(None, None)), Outcome::Fail);
    }

    #[test]
    fn unknown_containment_does_not_fail_a_visible_element() {
        assert_eq!(decide(true, &check_point(Some(true), None)), Outcome::Pass);
    }

    #[test]
    fn exit_codes_are_zero_or_one() {
        assert_eq!(Verdict::new(Outcome::Pass, vec![]).exit_code(), 0);
        assert_eq!(Verdict::new(Outcome::Fail, vec![]).exit_code(), 1);
    }

    #[test]
    fn transcript_ends_with_result_line() {
        let verdict = Verdict::new(Outcome::Pass, vec!["navigated".to_string()]);
        assert_eq!(verdict.lines.last().unwrap(), "RESULT: PASS");
    }

    #[test]
    fn aborted_runs_carry_the_reason_and_fail() {
        let verdict = Verdict::aborted(vec!["navigating".to_string()], "nav timeout");
        assert!(!verdict.passed());
        assert!(verdict.lines.iter().any(|l| l.contains("nav timeout")));
    }
}
