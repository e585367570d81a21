//! Plate candidates and the canonical plate form
//!
//! Normalization is the single source of truth for plate comparison:
//! recognition output and registry storage both pass through it before any
//! two plates are compared.

use serde::{Deserialize, Serialize};

/// Canonicalize plate text for comparison.
///
/// Uppercases and strips every character outside `[A-Z0-9]`. Idempotent:
/// re-normalizing a normalized plate is a no-op.
///
/// ```
/// use portcullis_types::normalize_plate;
///
/// assert_eq!(normalize_plate("B 1234 XYZ"), "B1234XYZ");
/// assert_eq!(normalize_plate("B1234XYZ"), "B1234XYZ");
/// ```
pub fn normalize_plate(raw: &str) -> String {
    raw.chars()
        .flat_map(char::to_uppercase)
        .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        .collect()
}

/// A single plate guess from the recognition service.
///
/// Ephemeral - produced by the Recognition Client, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlateCandidate {
    /// Raw plate text as the service returned it
    pub text: String,

    /// Confidence score in `[0, 1]`
    pub confidence: f64,

    /// Opaque region tag from the service (e.g. a country or plate style)
    pub region: String,
}

/// Candidates ranked by the recognition service's own ordering.
///
/// Index 0 is the primary candidate; callers may apply their own confidence
/// floor over the full list. An empty list is a valid outcome meaning
/// "no plate detected", distinct from a transport failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidates(Vec<PlateCandidate>);

impl RankedCandidates {
    pub fn new(mut candidates: Vec<PlateCandidate>) -> Self {
        // Service order wins ties; sort_by is stable so equal confidences
        // keep their original response position.
        candidates.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Self(candidates)
    }

    /// The highest-confidence candidate, if any plate was detected.
    pub fn primary(&self) -> Option<&PlateCandidate> {
        self.0.first()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlateCandidate> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Vec<PlateCandidate> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_spaces_and_uppercases() {
        assert_eq!(normalize_plate("B 1234 XYZ"), "B1234XYZ");
        assert_eq!(normalize_plate("b-1234-xyz"), "B1234XYZ");
        assert_eq!(normalize_plate("  d 99 ab  "), "D99AB");
    }

    #[test]
    fn normalize_is_idempotent() {
        for raw in ["B 1234 XYZ", "x!@#42", "", "ALREADY1", "ß123"] {
            let once = normalize_plate(raw);
            assert_eq!(normalize_plate(&once), once);
        }
    }

    #[test]
    fn normalize_drops_non_alphanumerics() {
        assert_eq!(normalize_plate("!@#$%"), "");
        assert_eq!(normalize_plate("A.B.1"), "AB1");
    }

    #[test]
    fn candidates_rank_by_confidence_descending() {
        let ranked = RankedCandidates::new(vec![
            PlateCandidate {
                text: "LOW".into(),
                confidence: 0.40,
                region: "eu".into(),
            },
            PlateCandidate {
                text: "HIGH".into(),
                confidence: 0.95,
                region: "eu".into(),
            },
        ]);

        assert_eq!(ranked.primary().unwrap().text, "HIGH");
    }

    #[test]
    fn ties_keep_response_order() {
        let ranked = RankedCandidates::new(vec![
            PlateCandidate {
                text: "FIRST".into(),
                confidence: 0.80,
                region: "eu".into(),
            },
            PlateCandidate {
                text: "SECOND".into(),
                confidence: 0.80,
                region: "eu".into(),
            },
        ]);

        assert_eq!(ranked.primary().unwrap().text, "FIRST");
    }

    #[test]
    fn empty_candidates_are_a_valid_outcome() {
        let ranked = RankedCandidates::new(vec![]);
        assert!(ranked.is_empty());
        assert!(ranked.primary().is_none());
    }
}
