//! Weighted aggregation and the per-repository score record

use crate::config::ScoringWeights;
use crate::metrics::{Metric, MetricResult};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;
use tracing::debug;

/// Outputs of the five primary collectors for one repository
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrimaryScores {
    pub ramp_up: MetricResult,
    pub correctness: MetricResult,
    pub bus_factor: MetricResult,
    pub responsive_maintainer: MetricResult,
    pub license: MetricResult,
}

impl PrimaryScores {
    /// Look up the primary metrics in `results`; absent ones count as failed
    pub fn from_results(results: &BTreeMap<Metric, MetricResult>) -> Self {
        let get = |m: Metric| results.get(&m).copied().unwrap_or(MetricResult::Failed);
        Self {
            ramp_up: get(Metric::RampUp),
            correctness: get(Metric::Correctness),
            bus_factor: get(Metric::BusFactor),
            responsive_maintainer: get(Metric::ResponsiveMaintainer),
            license: get(Metric::License),
        }
    }
}

/// Combine the primary metrics into NetScore.
///
/// Failed metrics are coerced to 0 first. Returns `None` if any coerced
/// value lies outside `[0, 1]`.
pub fn aggregate(scores: &PrimaryScores, weights: &ScoringWeights) -> Option<f64> {
    let values = [
        scores.ramp_up.coerced(),
        scores.correctness.coerced(),
        scores.bus_factor.coerced(),
        scores.responsive_maintainer.coerced(),
        scores.license.coerced(),
    ];
    if let Some(bad) = values.iter().find(|v| !(0.0..=1.0).contains(*v)) {
        debug!("Invalid metric value {} for net score", bad);
        return None;
    }
    let [ramp_up, correctness, bus_factor, responsive_maintainer, license] = values;
    let weighted = weights.ramp_up * ramp_up
        + weights.correctness * correctness
        + weights.bus_factor * bus_factor
        + weights.responsive_maintainer * responsive_maintainer;
    Some(weighted * license)
}

/// Round to 1 decimal place (reported scores)
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Round to 3 decimal places (reported latencies, seconds)
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Result of one repository scoring pass. Immutable once returned.
///
/// Scores and latencies are stored unrounded; rounding happens when the
/// record is rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeScore {
    pub url: String,
    pub net_score: Option<f64>,
    pub metrics: BTreeMap<Metric, MetricResult>,
    /// Seconds spent in each collector
    pub latencies: BTreeMap<Metric, f64>,
    /// Seconds for the whole pass, aggregation included
    pub total_latency: f64,
}

impl CompositeScore {
    /// NetScore rounded for reporting
    pub fn rounded_net_score(&self) -> Option<f64> {
        self.net_score.map(round1)
    }

    /// One-line JSON record:
    /// `{"URL", "NetScore", "NetScore_Latency", "<Metric>", "<Metric>_Latency", ...}`
    pub fn to_record(&self) -> String {
        // Serializing string keys and f64/null values cannot fail
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Metrics in reporting order: primary first, then extended
    fn reported_metrics(&self) -> impl Iterator<Item = Metric> + '_ {
        Metric::PRIMARY
            .into_iter()
            .chain(Metric::EXTENDED)
            .filter(|m| self.metrics.contains_key(m))
    }
}

impl Serialize for CompositeScore {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3 + 2 * self.metrics.len()))?;
        map.serialize_entry("URL", &self.url)?;
        map.serialize_entry("NetScore", &self.rounded_net_score())?;
        map.serialize_entry("NetScore_Latency", &round3(self.total_latency))?;
        for metric in self.reported_metrics() {
            let score = self.metrics.get(&metric).and_then(MetricResult::score);
            let latency = self.latencies.get(&metric).copied().unwrap_or(0.0);
            map.serialize_entry(metric.name(), &score.map(round1))?;
            map.serialize_entry(&format!("{}_Latency", metric.name()), &round3(latency))?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MetricResult::{Failed, Score};

    fn primary(r: f64, c: f64, b: f64, rm: f64, l: f64) -> PrimaryScores {
        PrimaryScores {
            ramp_up: Score(r),
            correctness: Score(c),
            bus_factor: Score(b),
            responsive_maintainer: Score(rm),
            license: Score(l),
        }
    }

    #[test]
    fn test_half_scores_aggregate_to_half() {
        let net = aggregate(&primary(0.5, 0.5, 0.5, 0.5, 1.0), &ScoringWeights::default());
        assert!((net.unwrap() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_license_gate_zeroes_score() {
        for v in [0.0, 0.3, 1.0] {
            let net = aggregate(&primary(v, v, v, v, 0.0), &ScoringWeights::default());
            assert_eq!(net, Some(0.0));
        }
    }

    #[test]
    fn test_failed_metric_counts_as_zero() {
        let mut scores = primary(1.0, 1.0, 1.0, 1.0, 1.0);
        scores.correctness = Failed;
        let net = aggregate(&scores, &ScoringWeights::default()).unwrap();
        assert!((net - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_range_is_invalid() {
        let weights = ScoringWeights::default();
        assert_eq!(aggregate(&primary(1.5, 0.5, 0.5, 0.5, 1.0), &weights), None);
        assert_eq!(aggregate(&primary(0.5, -0.2, 0.5, 0.5, 1.0), &weights), None);
        assert_eq!(aggregate(&primary(0.5, 0.5, 0.5, 0.5, f64::NAN), &weights), None);
    }

    #[test]
    fn test_all_failed_scores_zero() {
        let scores = PrimaryScores::from_results(&BTreeMap::new());
        assert_eq!(aggregate(&scores, &ScoringWeights::default()), Some(0.0));
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round1(0.44), 0.4);
        assert_eq!(round1(0.46), 0.5);
        assert_eq!(round3(1.23449), 1.234);
        assert_eq!(round3(0.0006), 0.001);
    }

    #[test]
    fn test_record_layout() {
        let mut metrics = BTreeMap::new();
        let mut latencies = BTreeMap::new();
        metrics.insert(Metric::RampUp, Score(0.6451));
        latencies.insert(Metric::RampUp, 0.12345);
        metrics.insert(Metric::License, Failed);
        latencies.insert(Metric::License, 0.5);
        let score = CompositeScore {
            url: "https://github.com/o/r".to_string(),
            net_score: Some(0.1935),
            metrics,
            latencies,
            total_latency: 1.0004,
        };

        let record = score.to_record();
        assert!(record.starts_with(r#"{"URL":"https://github.com/o/r","NetScore":0.2,"NetScore_Latency":1.0,"#));
        let value: serde_json::Value = serde_json::from_str(&record).unwrap();
        assert_eq!(value["RampUp"], 0.6);
        assert_eq!(value["RampUp_Latency"], 0.123);
        assert!(value["License"].is_null());
        assert_eq!(value["License_Latency"], 0.5);
        assert!(value.get("Correctness").is_none());
    }

    #[test]
    fn test_invalid_net_score_serializes_null() {
        let score = CompositeScore {
            url: "u".to_string(),
            net_score: None,
            metrics: BTreeMap::new(),
            latencies: BTreeMap::new(),
            total_latency: 0.0,
        };
        let value: serde_json::Value = serde_json::from_str(&score.to_record()).unwrap();
        assert!(value["NetScore"].is_null());
    }
}
