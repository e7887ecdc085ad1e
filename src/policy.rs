use std::collections::HashMap;

/// Tag key that opts an instance out of the stop sweep.
pub const AUTOSTOP_TAG_KEY: &str = "AutoStop";

/// Tag value (ASCII case-insensitive) that activates the opt-out.
pub const AUTOSTOP_OPT_OUT_VALUE: &str = "no";

/// The policy rule that produced an exclusion decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionRule {
    /// Instance carries `AutoStop=no` (value compared ASCII case-insensitively).
    AutoStopOptOut,
    /// No opt-out tag present; default is to stop.
    Default,
}

/// Outcome of evaluating the exclusion policy for one instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExclusionDecision {
    pub excluded: bool,
    pub rule: ExclusionRule,
}

/// Evaluate the exclusion policy over an instance's tag map.
///
/// Pure and total: no I/O, no error cases. The tag key match is exact; only
/// the value comparison is case-insensitive, and only for ASCII.
pub fn evaluate(tags: &HashMap<String, String>) -> ExclusionDecision {
    let opted_out = tags
        .get(AUTOSTOP_TAG_KEY)
        .is_some_and(|value| value.eq_ignore_ascii_case(AUTOSTOP_OPT_OUT_VALUE));

    if opted_out {
        ExclusionDecision {
            excluded: true,
            rule: ExclusionRule::AutoStopOptOut,
        }
    } else {
        ExclusionDecision {
            excluded: false,
            rule: ExclusionRule::Default,
        }
    }
}

/// True iff the instance is exempt from stopping.
pub fn is_excluded(tags: &HashMap<String, String>) -> bool {
    evaluate(tags).excluded
}
