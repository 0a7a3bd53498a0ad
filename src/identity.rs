use chrono::Utc;
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Generates opaque record identities.
///
/// Kept behind a trait so the token generator can be swapped for a
/// cryptographically unique one without touching callers.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self, prefix: &str) -> String;
}

/// Millisecond timestamp + process-wide counter + random token.
///
/// The counter keeps identities distinct even when several are handed
/// out on the same millisecond.
#[derive(Default)]
pub struct TokenIdGenerator {
    counter: AtomicU64,
}

impl TokenIdGenerator {
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
        }
    }
}

impl IdGenerator for TokenIdGenerator {
    fn next_id(&self, prefix: &str) -> String {
        let seq = self.counter.fetch_add(1, Ordering::Relaxed);
        let millis = Utc::now().timestamp_millis();
        let mut rng = rand::thread_rng();
        let token: String = (0..6)
            .map(|_| {
                let digit = rng.gen_range(0..36u32);
                char::from_digit(digit, 36).unwrap_or('0')
            })
            .collect();
        format!("{}_{:x}{:04x}{}", prefix, millis, seq & 0xffff, token)
    }
}

/// UUID v4 alternative with the same shape of output.
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&self, prefix: &str) -> String {
        format!("{}_{}", prefix, Uuid::new_v4().simple())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_token_ids_are_unique_within_a_tick() {
        let ids = TokenIdGenerator::new();
        let mut seen = HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(ids.next_id("evt")));
        }
    }

    #[test]
    fn test_ids_carry_their_prefix() {
        let ids = TokenIdGenerator::new();
        assert!(ids.next_id("tkt").starts_with("tkt_"));
        let uuids = UuidIdGenerator;
        assert!(uuids.next_id("evt").starts_with("evt_"));
    }
}
