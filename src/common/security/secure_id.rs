/// Short unpredictable identifiers for message keys and session ids.
///
/// These ids are for collision avoidance and correlation, not for
/// authentication: never use them as secrets or bearer tokens.
use rand::distributions::Alphanumeric;
use rand::rngs::{OsRng, SmallRng};
use rand::{Rng, RngCore, SeedableRng};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Length used when the caller has no preference
pub const DEFAULT_ID_LENGTH: usize = 16;

const ALPHABET: &[u8; 62] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Largest multiple of 62 that fits in a byte; bytes at or above it are
/// discarded so every symbol is equally likely.
const REJECT_FROM: u8 = 248;

/// Randomness available to the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntropySource {
    /// Operating system CSPRNG, falling back to [`EntropySource::Pseudo`]
    /// if the OS source fails.
    #[default]
    Os,
    /// Seeded non-cryptographic generator, for environments without an OS
    /// random source.
    Pseudo,
}

/// Alphanumeric id generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdGenerator {
    source: EntropySource,
}

impl IdGenerator {
    pub fn new(source: EntropySource) -> Self {
        Self { source }
    }

    pub fn source(&self) -> EntropySource {
        self.source
    }

    /// Generate an id of `length` characters from `[A-Za-z0-9]`.
    pub fn generate(&self, length: usize) -> String {
        if length == 0 {
            return String::new();
        }

        if self.source == EntropySource::Os {
            if let Some(id) = os_id(length) {
                return id;
            }
            tracing::debug!("OS random source unavailable, using pseudo-random ids");
        }

        pseudo_id(length)
    }
}

fn os_id(length: usize) -> Option<String> {
    let mut id = String::with_capacity(length);
    let mut buf = [0u8; 64];

    while id.len() < length {
        OsRng.try_fill_bytes(&mut buf).ok()?;
        for &byte in buf.iter().filter(|&&b| b < REJECT_FROM) {
            id.push(ALPHABET[usize::from(byte % 62)] as char);
            if id.len() == length {
                break;
            }
        }
    }

    Some(id)
}

fn pseudo_id(length: usize) -> String {
    static SEQUENCE: AtomicU64 = AtomicU64::new(0);

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    let seed = nanos ^ SEQUENCE.fetch_add(1, Ordering::Relaxed).rotate_left(32);

    SmallRng::seed_from_u64(seed)
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Generate an id of `length` characters using the OS random source when
/// available.
pub fn generate_secure_id(length: usize) -> String {
    IdGenerator::default().generate(length)
}
