use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Letters allowed in the middle segment of an ID.
pub const ID_LETTERS: [char; 6] = ['L', 'P', 'K', 'M', 'N', 'O'];

/// Cosmetic "Data Verified" identifier, shaped `NNNN-XX-NNNN`.
///
/// Carries no meaning beyond decoration: it is attached to replies and
/// history rows, never fed back into an evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VerificationId(String);

impl VerificationId {
    /// Build an ID from any random source.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut s = String::with_capacity(12);
        push_digits(rng, &mut s, 4);
        s.push('-');
        for _ in 0..2 {
            s.push(ID_LETTERS[rng.gen_range(0..ID_LETTERS.len())]);
        }
        s.push('-');
        push_digits(rng, &mut s, 4);
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn push_digits<R: Rng + ?Sized>(rng: &mut R, out: &mut String, n: usize) {
    for _ in 0..n {
        let d = rng.gen_range(0..10u32);
        out.push(char::from_digit(d, 10).unwrap_or('0'));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidId(pub String);

impl fmt::Display for InvalidId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a NNNN-XX-NNNN verification id", self.0)
    }
}

impl std::error::Error for InvalidId {}

impl FromStr for VerificationId {
    type Err = InvalidId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('-').collect();
        let valid = match parts.as_slice() {
            [a, l, b] => {
                a.len() == 4
                    && b.len() == 4
                    && a.chars().all(|c| c.is_ascii_digit())
                    && b.chars().all(|c| c.is_ascii_digit())
                    && l.chars().count() == 2
                    && l.chars().all(|c| ID_LETTERS.contains(&c))
            }
            _ => false,
        };
        if valid {
            Ok(Self(s.to_string()))
        } else {
            Err(InvalidId(s.to_string()))
        }
    }
}

impl TryFrom<String> for VerificationId {
    type Error = InvalidId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<VerificationId> for String {
    fn from(id: VerificationId) -> Self {
        id.0
    }
}

impl fmt::Display for VerificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Source of verification IDs, swappable so replies can be made reproducible.
pub trait IdGenerator {
    fn next_id(&mut self) -> VerificationId;
}

/// Thread-local RNG; what the CLI uses by default.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn next_id(&mut self) -> VerificationId {
        VerificationId::generate(&mut rand::thread_rng())
    }
}

/// Deterministic sequence for tests and `--seed`.
#[derive(Debug, Clone)]
pub struct SeededIdGenerator {
    rng: StdRng,
}

impl SeededIdGenerator {
    pub fn new(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }
}

impl IdGenerator for SeededIdGenerator {
    fn next_id(&mut self) -> VerificationId {
        VerificationId::generate(&mut self.rng)
    }
}

impl<G: IdGenerator + ?Sized> IdGenerator for Box<G> {
    fn next_id(&mut self) -> VerificationId {
        (**self).next_id()
    }
}
