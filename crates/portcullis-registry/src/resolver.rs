//! Authorization Resolver
//!
//! Given a normalized plate, decides whether an active registry entry grants
//! access. Fails closed: a registry outage resolves to a deny, never a grant.

use std::sync::Arc;

use portcullis_types::{normalize_plate, Authorization};
use tracing::{debug, warn};

use crate::traits::VehicleStore;

/// Resolves normalized plates against the vehicle registry.
pub struct AuthorizationResolver {
    store: Arc<dyn VehicleStore>,
}

impl AuthorizationResolver {
    pub fn new(store: Arc<dyn VehicleStore>) -> Self {
        Self { store }
    }

    /// Resolve a plate to an authorization decision.
    ///
    /// The input is re-normalized before lookup; normalization is idempotent
    /// so callers that already normalized lose nothing. Never returns an
    /// error: absence of a match and a registry failure both resolve to
    /// `granted: false`.
    pub async fn resolve(&self, plate: &str) -> Authorization {
        let normalized = normalize_plate(plate);
        if normalized.is_empty() {
            return Authorization::denied();
        }

        let matches = match self.store.find_active_by_plate(&normalized).await {
            Ok(matches) => matches,
            Err(err) => {
                // Fail closed. An outage must never read as a grant.
                warn!(plate = %normalized, error = %err, "registry lookup failed, denying");
                return Authorization::denied();
            }
        };

        match matches.len() {
            0 => {
                debug!(plate = %normalized, "no active entry matched");
                Authorization::denied()
            }
            n => {
                if n > 1 {
                    // Data-quality signal, not an error: pick the first
                    // (lowest id) deterministically.
                    warn!(plate = %normalized, matches = n, "ambiguous registry match");
                }
                Authorization::granted_to(matches[0].owner.clone())
            }
        }
    }
}
