use std::sync::{Mutex, PoisonError};

use rand::{rngs::StdRng, Rng, SeedableRng};

/// Characters a short key may contain.
pub const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Every generated key has exactly this many characters.
pub const KEY_LENGTH: usize = 6;

/// Random short-key source.
///
/// The RNG is seeded once when the generator is built and then reused for
/// every key, so rapid successive calls never share a seed.
#[derive(Debug)]
pub struct KeyGenerator {
    rng: Mutex<StdRng>,
}

impl KeyGenerator {
    /// Seed from operating-system entropy.
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic generator, for reproducing a key sequence.
    #[cfg(test)]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Produce the next random key.
    pub fn generate(&self) -> String {
        // The RNG state stays valid even if a holder panicked mid-draw.
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        (0..KEY_LENGTH)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
            .collect()
    }
}

impl Default for KeyGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether `key` has the shape of a generated key.
#[cfg(test)]
pub(crate) fn is_well_formed(key: &str) -> bool {
    key.len() == KEY_LENGTH && key.bytes().all(|b| ALPHABET.contains(&b))
}
