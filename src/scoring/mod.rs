//! NetScore: weighted composite of the primary metrics
//!
//! # Scoring Formula
//!
//! ```text
//! NetScore = (0.20 × RampUp
//!          +  0.30 × Correctness
//!          +  0.20 × BusFactor
//!          +  0.30 × ResponsiveMaintainer) × License
//! ```
//!
//! License is a gate, not a weight: an incompatible license zeroes the
//! score. The four weights are configurable (`[scoring.weights]`) and must
//! sum to 1.0.
//!
//! # Failure Policy
//!
//! - A failed metric counts as 0 and does not invalidate the score.
//! - A score outside `[0, 1]` after that coercion is a validation failure:
//!   NetScore is `None` for the repository, reported as `null`.
//!
//! # Latency
//!
//! Each collector call is bracketed by wall-clock timestamps, so collectors
//! always run one after another. `NetScore_Latency` covers the whole pass,
//! aggregation included. Scores are reported to 1 decimal place and
//! latencies to 3 (seconds).

mod aggregator;
mod scorer;

pub use aggregator::{aggregate, round1, round3, CompositeScore, PrimaryScores};
pub use scorer::Scorer;
