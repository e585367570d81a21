//! The decision policy

/// Minimum recognition confidence an authorized entry needs.
///
/// Fixed policy constant, not per-request configurable. The comparison is
/// inclusive: a confidence of exactly 0.80 authorizes.
pub const CONFIDENCE_THRESHOLD: f64 = 0.80;

/// The whole decision policy: a registry grant plus sufficient confidence.
pub fn authorize(granted: bool, confidence: f64) -> bool {
    granted && confidence >= CONFIDENCE_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_inclusive() {
        assert!(authorize(true, 0.80));
        assert!(!authorize(true, 0.79999));
    }

    #[test]
    fn confidence_never_overrides_a_deny() {
        assert!(!authorize(false, 1.0));
    }

    #[test]
    fn high_confidence_with_grant_authorizes() {
        assert!(authorize(true, 0.95));
    }
}
