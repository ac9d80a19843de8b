//! Randomness port used by reviewer selection.

/// Source of uniform random indices.
///
/// Implementations are shared across concurrent requests and must
/// synchronize internally.
pub trait RandomSource: Send + Sync {
    /// Uniform index in `0..upper`. `upper` is always at least 1.
    fn index(&self, upper: usize) -> usize;
}
