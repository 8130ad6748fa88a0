//! Metric collectors
//!
//! Seven independent signals, each turning a repository into a score in
//! `[0, 1]` or a [`MetricResult::Failed`]:
//!
//! | Metric | Source | On fetch failure |
//! |---|---|---|
//! | RampUp | README section coverage | `Score(0.0)` |
//! | Correctness | closed / total issues, last 30 days | `Failed` |
//! | BusFactor | contributor count, clamped | `Failed` |
//! | ResponsiveMaintainer | first-response latency on open issues | `Failed` |
//! | License | LICENSE / README compatibility | `Failed` |
//! | PinningPractice | exact-pinned `package.json` dependencies | `Score(0.0)` |
//! | CodeReview | merged / total pull requests (GraphQL) | `Failed` |
//!
//! Collectors never return errors: every network or parse problem is logged
//! and folded into the result.

pub mod bus_factor;
pub mod code_review;
pub mod correctness;
pub mod license;
pub mod pinning;
pub mod ramp_up;
pub mod responsive_maintainer;

use crate::config::ScoringConfig;
use crate::http::{Endpoints, HttpClient};
use crate::models::RepositoryRef;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Names of the collected metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Metric {
    RampUp,
    Correctness,
    BusFactor,
    ResponsiveMaintainer,
    License,
    PinningPractice,
    CodeReview,
}

impl Metric {
    /// The five metrics that feed NetScore, in collection order
    pub const PRIMARY: [Metric; 5] = [
        Metric::RampUp,
        Metric::Correctness,
        Metric::BusFactor,
        Metric::ResponsiveMaintainer,
        Metric::License,
    ];

    /// Reported alongside NetScore but never weighted
    pub const EXTENDED: [Metric; 2] = [Metric::PinningPractice, Metric::CodeReview];

    pub fn name(&self) -> &'static str {
        match self {
            Metric::RampUp => "RampUp",
            Metric::Correctness => "Correctness",
            Metric::BusFactor => "BusFactor",
            Metric::ResponsiveMaintainer => "ResponsiveMaintainer",
            Metric::License => "License",
            Metric::PinningPractice => "PinningPractice",
            Metric::CodeReview => "CodeReview",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of one collector invocation. Produced fresh, never cached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricResult {
    Score(f64),
    Failed,
}

impl MetricResult {
    pub fn score(&self) -> Option<f64> {
        match self {
            MetricResult::Score(s) => Some(*s),
            MetricResult::Failed => None,
        }
    }

    /// Value used for weighting: failures count as zero evidence
    pub fn coerced(&self) -> f64 {
        self.score().unwrap_or(0.0)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, MetricResult::Failed)
    }
}

impl From<Option<f64>> for MetricResult {
    fn from(value: Option<f64>) -> Self {
        value.map(MetricResult::Score).unwrap_or(MetricResult::Failed)
    }
}

/// Where collectors fetch from
#[derive(Clone, Copy)]
pub struct ApiContext<'a> {
    pub http: &'a dyn HttpClient,
    pub endpoints: &'a Endpoints,
}

impl<'a> ApiContext<'a> {
    pub fn new(http: &'a dyn HttpClient, endpoints: &'a Endpoints) -> Self {
        Self { http, endpoints }
    }

    /// `{github_api}/repos/{owner}/{repo}{path}`
    pub fn repo_url(&self, repo: &RepositoryRef, path: &str) -> String {
        format!(
            "{}/repos/{}/{}{}",
            self.endpoints.github_api, repo.owner, repo.name, path
        )
    }
}

/// Run the collector for `metric`
pub fn collect(
    metric: Metric,
    ctx: &ApiContext<'_>,
    repo: &RepositoryRef,
    config: &ScoringConfig,
) -> MetricResult {
    match metric {
        Metric::RampUp => ramp_up::collect(ctx, repo),
        Metric::Correctness => correctness::collect(ctx, repo),
        Metric::BusFactor => {
            bus_factor::collect(ctx, repo, config.min_contributors, config.max_contributors)
        }
        Metric::ResponsiveMaintainer => responsive_maintainer::collect(ctx, repo),
        Metric::License => license::collect(ctx, repo),
        Metric::PinningPractice => pinning::collect(ctx, repo),
        Metric::CodeReview => code_review::collect(ctx, repo),
    }
}
