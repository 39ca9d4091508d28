//! Reading the safety classifier's answer.

use travelbot_core::safety::SafetyVerdict;

/// Interpret a classifier response.
///
/// Only the exact token `SAFE` (after trimming and upper-casing) is
/// [`SafetyVerdict::Safe`]. The exact token `UNSAFE` is
/// [`SafetyVerdict::Unsafe`]; anything else, including an empty or
/// multi-word reply, is [`SafetyVerdict::Indeterminate`].
pub fn parse_verdict(response: &str) -> SafetyVerdict {
    match response.trim().to_uppercase().as_str() {
        "SAFE" => SafetyVerdict::Safe,
        "UNSAFE" => SafetyVerdict::Unsafe,
        _ => SafetyVerdict::Indeterminate,
    }
}
