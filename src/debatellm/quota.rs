//! Per-token request quotas.
//!
//! Each caller identity (token) carries a budget of permitted orchestration
//! calls. Authorization *reserves* one unit up front and the reservation is
//! either committed after the provider call succeeds or released when it
//! fails, so a failed call (including a retried-then-failed call) never
//! costs budget, while two concurrent calls can never both squeeze through a
//! budget of one.
//!
//! The record set is the only globally shared mutable state in the core; a
//! single mutex around the map makes `authorize` + `commit` effectively
//! atomic per token. Critical sections are a handful of map operations.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::debatellm::error::DebateError;

/// Mutable counter state for one token.
#[derive(Debug, Clone)]
struct QuotaRecord {
    remaining: u32,
    reserved: u32,
    created_at: DateTime<Utc>,
}

/// Read-only view of a token's quota, for the introspection endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct QuotaStatus {
    /// Requests still available (committed decrements only; in-flight
    /// reservations are not visible here).
    pub remaining: u32,
    pub created_at: DateTime<Utc>,
}

/// A reservation of one request against a token's budget.
///
/// Must be passed back to [`QuotaGuard::commit`] on success or
/// [`QuotaGuard::release`] on failure. The permit is consumed either way, so
/// a single authorization can never be settled twice.
#[derive(Debug)]
pub struct QuotaPermit {
    token: String,
}

impl QuotaPermit {
    /// The token this permit was issued against.
    pub fn token(&self) -> &str {
        &self.token
    }
}

/// Tracks remaining calls per caller token.
pub struct QuotaGuard {
    records: Mutex<HashMap<String, QuotaRecord>>,
}

impl Default for QuotaGuard {
    fn default() -> Self {
        QuotaGuard {
            records: Mutex::new(HashMap::new()),
        }
    }
}

impl QuotaGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token with its initial request allotment. The allotment is
    /// supplied by whatever token-issuance mechanism the embedding
    /// application uses. Re-registering a token resets its budget.
    pub fn register(&self, token: impl Into<String>, allotment: u32) {
        let mut records = self.records.lock().unwrap();
        records.insert(
            token.into(),
            QuotaRecord {
                remaining: allotment,
                reserved: 0,
                created_at: Utc::now(),
            },
        );
    }

    /// Reserve one request against `token`.
    ///
    /// Fails with `UnknownToken` for tokens never registered and
    /// `QuotaExhausted` when no unreserved budget remains. Two concurrent
    /// authorizations against a budget of one yield exactly one permit.
    pub fn authorize(&self, token: &str) -> Result<QuotaPermit, DebateError> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .get_mut(token)
            .ok_or_else(|| DebateError::UnknownToken(token.to_string()))?;
        if record.remaining <= record.reserved {
            return Err(DebateError::QuotaExhausted(token.to_string()));
        }
        record.reserved += 1;
        Ok(QuotaPermit {
            token: token.to_string(),
        })
    }

    /// Settle a permit after a successful call: the budget drops by exactly
    /// one.
    pub fn commit(&self, permit: QuotaPermit) {
        let mut records = self.records.lock().unwrap();
        if let Some(record) = records.get_mut(&permit.token) {
            record.remaining = record.remaining.saturating_sub(1);
            record.reserved = record.reserved.saturating_sub(1);
        }
    }

    /// Return a reservation after a failed call: the budget is unchanged.
    pub fn release(&self, permit: QuotaPermit) {
        let mut records = self.records.lock().unwrap();
        if let Some(record) = records.get_mut(&permit.token) {
            record.reserved = record.reserved.saturating_sub(1);
        }
    }

    /// Current quota state for `token`, if registered.
    pub fn status(&self, token: &str) -> Option<QuotaStatus> {
        let records = self.records.lock().unwrap();
        records.get(token).map(|record| QuotaStatus {
            remaining: record.remaining,
            created_at: record.created_at,
        })
    }
}
