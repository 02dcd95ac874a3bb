pub mod operation;
pub mod parsefmt;
pub mod rational;

pub use rational::Rational;

/// Failure modes shared by construction and arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RationalError {
    /// A constructed or derived denominator would be zero.
    #[error("denominator cannot be zero")]
    DivisionByZero,
    /// An intermediate value left the 64-bit integer range.
    #[error("value exceeds 64-bit integer range")]
    Overflow,
}
