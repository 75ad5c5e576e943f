// src/common/id_generator.rs
//! Base36 ID Generator
//!
//! Generates short random identifiers over lowercase letters and digits.
//! Used for pastes, pasties, users, OAuth browser sessions and states.
//!
//! Uniqueness is checked against a caller supplied predicate. The retry loop
//! is bounded: every `WIDEN_EVERY` collisions the length grows by one
//! character, and after `MAX_ATTEMPTS` samples generation gives up.

use rand::Rng;
use std::future::Future;
use tracing::warn;

use super::ApiError;

/// Base36 alphabet (lowercase letters + digits)
const BASE36_ALPHABET: &[u8; 36] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Default identifier length (36^8 ~ 2.8 trillion combinations)
pub const DEFAULT_ID_LENGTH: usize = 8;

/// Upper bound on samples for a single unique id
pub const MAX_ATTEMPTS: usize = 32;

/// Number of collisions after which the id gets one character longer
pub const WIDEN_EVERY: usize = 8;

/// Generate a random base36 string of specified length
pub fn generate_raw_id(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..BASE36_ALPHABET.len());
            BASE36_ALPHABET[idx] as char
        })
        .collect()
}

fn length_for_attempt(attempt: usize) -> usize {
    DEFAULT_ID_LENGTH + attempt / WIDEN_EVERY
}

/// Generate an id for which `exists` returns false
///
/// # Arguments
/// * `exists` - async predicate, usually a database existence check
///
/// # Example
/// ```ignore
/// let id = generate_unique_id(|id| async move { store.paste_exists(&id).await }).await?;
/// ```
pub async fn generate_unique_id<F, Fut>(mut exists: F) -> Result<String, ApiError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<bool, ApiError>>,
{
    for attempt in 0..MAX_ATTEMPTS {
        let candidate = generate_raw_id(length_for_attempt(attempt));
        if !exists(candidate.clone()).await? {
            return Ok(candidate);
        }
        warn!(attempt = attempt + 1, "Generated id collided, retrying");
    }

    Err(ApiError::InternalServer(format!(
        "failed to generate a unique id after {} attempts",
        MAX_ATTEMPTS
    )))
}

/// Synchronous variant of [`generate_unique_id`] for in-memory checks
/// (e.g. pasty ids that only need to be unique within one paste).
pub fn generate_unique_id_sync<F>(mut exists: F) -> Result<String, ApiError>
where
    F: FnMut(&str) -> bool,
{
    for attempt in 0..MAX_ATTEMPTS {
        let candidate = generate_raw_id(length_for_attempt(attempt));
        if !exists(&candidate) {
            return Ok(candidate);
        }
    }

    Err(ApiError::InternalServer(format!(
        "failed to generate a unique id after {} attempts",
        MAX_ATTEMPTS
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_generate_id_format() {
        let id = generate_raw_id(DEFAULT_ID_LENGTH);
        assert_eq!(id.len(), 8);
        assert!(id.bytes().all(|c| BASE36_ALPHABET.contains(&c)));
    }

    #[test]
    fn test_no_uppercase() {
        for _ in 0..100 {
            let id = generate_raw_id(16);
            assert_eq!(id, id.to_lowercase());
        }
    }

    #[test]
    fn test_uniqueness() {
        let mut ids = HashSet::new();
        for _ in 0..1000 {
            let id = generate_raw_id(DEFAULT_ID_LENGTH);
            assert!(ids.insert(id), "Duplicate ID generated");
        }
    }

    #[test]
    fn test_sync_skips_existing() {
        let mut taken = HashSet::new();
        for _ in 0..50 {
            let id = generate_unique_id_sync(|c| taken.contains(c)).unwrap();
            assert!(taken.insert(id));
        }
    }

    #[test]
    fn test_sync_widens_after_collisions() {
        // Every 8-char candidate "exists", so the generator must move to 9 chars.
        let id = generate_unique_id_sync(|c| c.len() == DEFAULT_ID_LENGTH).unwrap();
        assert_eq!(id.len(), DEFAULT_ID_LENGTH + 1);
    }

    #[test]
    fn test_sync_gives_up() {
        let mut calls = 0;
        let result = generate_unique_id_sync(|_| {
            calls += 1;
            true
        });
        assert!(matches!(result, Err(ApiError::InternalServer(_))));
        assert_eq!(calls, MAX_ATTEMPTS);
    }

    #[tokio::test]
    async fn test_async_gives_up() {
        let result = generate_unique_id(|_| async { Ok(true) }).await;
        assert!(matches!(result, Err(ApiError::InternalServer(_))));
    }

    #[tokio::test]
    async fn test_async_propagates_predicate_error() {
        let result =
            generate_unique_id(|_| async { Err(ApiError::InternalServer("db down".into())) })
                .await;
        assert!(matches!(result, Err(ApiError::InternalServer(msg)) if msg == "db down"));
    }

    #[tokio::test]
    async fn test_concurrent_generation_never_collides() {
        // The predicate reserves the candidate when it reports "free",
        // mimicking an insert guarded by a unique constraint.
        let taken: Arc<Mutex<HashSet<String>>> = Arc::new(Mutex::new(HashSet::new()));

        let mut handles = Vec::new();
        for _ in 0..64 {
            let taken = taken.clone();
            handles.push(tokio::spawn(async move {
                let mut ids = Vec::new();
                for _ in 0..50 {
                    let taken = taken.clone();
                    let id = generate_unique_id(move |candidate| {
                        let taken = taken.clone();
                        async move { Ok(!taken.lock().unwrap().insert(candidate)) }
                    })
                    .await
                    .unwrap();
                    ids.push(id);
                }
                ids
            }));
        }

        let mut all = HashSet::new();
        for handle in handles {
            for id in handle.await.unwrap() {
                assert!(all.insert(id), "Duplicate ID generated concurrently");
            }
        }
        assert_eq!(all.len(), 64 * 50);
        assert_eq!(taken.lock().unwrap().len(), 64 * 50);
    }
}
