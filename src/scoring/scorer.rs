//! One repository scoring pass

use super::aggregator::{aggregate, round1, CompositeScore, PrimaryScores};
use crate::config::ScoringConfig;
use crate::http::{Endpoints, HttpClient};
use crate::metrics::{self, ApiContext, Metric, MetricResult};
use crate::models::RepositoryRef;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info, info_span};

/// Runs the collectors for a repository and aggregates them
pub struct Scorer<'a> {
    ctx: ApiContext<'a>,
    config: &'a ScoringConfig,
}

impl<'a> Scorer<'a> {
    pub fn new(
        http: &'a dyn HttpClient,
        endpoints: &'a Endpoints,
        config: &'a ScoringConfig,
    ) -> Self {
        Self {
            ctx: ApiContext::new(http, endpoints),
            config,
        }
    }

    /// Metrics collected per pass, in order
    fn metrics(&self) -> Vec<Metric> {
        let mut metrics = Metric::PRIMARY.to_vec();
        if self.config.extended_metrics {
            metrics.extend(Metric::EXTENDED);
        }
        metrics
    }

    /// Score `repo`, reporting it under `url`.
    ///
    /// Collectors run sequentially so each latency is attributable. Never
    /// fails: degraded metrics are recorded as failed and an invalid
    /// aggregate leaves `net_score` empty.
    pub fn composite_score(&self, url: &str, repo: &RepositoryRef) -> CompositeScore {
        let span = info_span!("score", owner = %repo.owner, repo = %repo.name);
        let _enter = span.enter();
        debug!("Calculating Net Score for {}", repo);

        let start = Instant::now();
        let mut results = BTreeMap::new();
        let mut latencies = BTreeMap::new();
        for metric in self.metrics() {
            let before = Instant::now();
            let result = metrics::collect(metric, &self.ctx, repo, self.config);
            latencies.insert(metric, before.elapsed().as_secs_f64());
            if let MetricResult::Failed = result {
                debug!(metric = %metric, "Error getting {} metric score", metric);
            }
            results.insert(metric, result);
        }

        let net_score = aggregate(&PrimaryScores::from_results(&results), &self.config.weights);
        let total_latency = start.elapsed().as_secs_f64();
        match net_score {
            Some(score) => info!("Net Score for {}: {}", repo, round1(score)),
            None => info!("Error computing Net Score for {}", repo),
        }
        info!("Net Score Latency: {:.3} seconds", total_latency);

        CompositeScore {
            url: url.to_string(),
            net_score,
            metrics: results,
            latencies,
            total_latency,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::StubHttp;
    use crate::metrics::ramp_up::SECTION_WEIGHTS;
    use serde_json::json;

    fn healthy_repo() -> StubHttp {
        let contributors: Vec<_> = (0..100).map(|i| json!({ "login": format!("u{i}") })).collect();
        let readme: String = SECTION_WEIGHTS
            .iter()
            .map(|(section, _)| format!("## {}\n", section))
            .collect();
        StubHttp::new()
            .with("https://api.github.com/repos/o/r/readme", readme)
            .with_json(
                "https://api.github.com/repos/o/r/issues?state=all&per_page=100&page=1",
                json!([{ "state": "closed" }, { "state": "closed" }]),
            )
            .with_json(
                "https://api.github.com/repos/o/r/contributors?per_page=100&page=1",
                json!(contributors),
            )
            .with_json(
                "https://api.github.com/repos/o/r/issues?state=open&per_page=100",
                json!([]),
            )
            .with_json("https://api.github.com/repos/o/r", json!({ "default_branch": "main" }))
            .with("https://raw.githubusercontent.com/o/r/main/LICENSE", "MIT License")
    }

    #[test]
    fn test_composite_score_primary_metrics() {
        let stub = healthy_repo();
        let endpoints = Endpoints::default();
        let config = ScoringConfig::default();
        let scorer = Scorer::new(&stub, &endpoints, &config);

        let score = scorer.composite_score("https://github.com/o/r", &RepositoryRef::new("o", "r"));
        assert_eq!(score.metrics.len(), 5);
        assert_eq!(score.latencies.len(), 5);
        assert_eq!(score.metrics[&Metric::License], MetricResult::Score(1.0));
        assert_eq!(score.metrics[&Metric::Correctness], MetricResult::Score(1.0));
        assert_eq!(score.metrics[&Metric::BusFactor], MetricResult::Score(1.0));
        // no open issues -> responsive maintainer 0
        assert_eq!(score.metrics[&Metric::ResponsiveMaintainer], MetricResult::Score(0.0));
        let net = score.net_score.unwrap();
        assert!((net - 0.7).abs() < 1e-9);
        assert!(score.total_latency >= score.latencies.values().sum::<f64>());
    }

    #[test]
    fn test_unreachable_repo_still_scores() {
        let stub = StubHttp::new();
        let endpoints = Endpoints::default();
        let config = ScoringConfig::default();
        let scorer = Scorer::new(&stub, &endpoints, &config);

        let score = scorer.composite_score("u", &RepositoryRef::new("o", "gone"));
        assert_eq!(score.net_score, Some(0.0));
        assert_eq!(score.metrics[&Metric::RampUp], MetricResult::Score(0.0));
        assert!(score.metrics[&Metric::License].is_failed());
    }

    #[test]
    fn test_extended_metrics_reported_not_weighted() {
        let stub = healthy_repo().with_json(
            "https://api.github.com/graphql",
            json!({ "data": { "repository": {
                "pullRequests": { "totalCount": 10 },
                "mergedPullRequests": { "totalCount": 9 }
            }}}),
        );
        let endpoints = Endpoints::default();
        let config = ScoringConfig {
            extended_metrics: true,
            ..ScoringConfig::default()
        };
        let scorer = Scorer::new(&stub, &endpoints, &config);

        let score = scorer.composite_score("u", &RepositoryRef::new("o", "r"));
        assert_eq!(score.metrics.len(), 7);
        assert_eq!(score.metrics[&Metric::CodeReview], MetricResult::Score(1.0));
        // package.json missing -> pinning 0, NetScore unchanged
        assert_eq!(score.metrics[&Metric::PinningPractice], MetricResult::Score(0.0));
        assert!((score.net_score.unwrap() - 0.7).abs() < 1e-9);
    }
}
