//! `numbot-engine` - nearest-reference evaluator.
//!
//! Pure engine crate: receives a query and a reference list, returns the
//! closest reference with a confidence score. No IO, no randomness.

pub mod confidence;
pub mod error;
pub mod evaluator;
pub mod model;
pub mod parse;

pub use error::EvalError;
pub use evaluator::evaluate;
pub use model::{ConfidenceFormula, Detail, EvalOptions, Evaluation, Mode, RankedRef, Region};

/// Reference list used when the user has not configured one.
pub const DEFAULT_REFS: [f64; 3] = [0.0, 1.0, 20.0];

/// Scale used by the `exp` formula when none (or a non-positive one) is given.
pub const DEFAULT_SCALE: f64 = 10.0;
