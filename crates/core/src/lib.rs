pub mod verification;

pub use verification::{IdGenerator, RandomIdGenerator, SeededIdGenerator, VerificationId};
