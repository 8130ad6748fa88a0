//! RampUp: documentation completeness from README section coverage

use super::{ApiContext, MetricResult};
use crate::http::ACCEPT_RAW;
use crate::models::RepositoryRef;
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, error, info, warn};

/// README sections a newcomer looks for, with their weights
pub const SECTION_WEIGHTS: &[(&str, u32)] = &[
    ("table of contents", 2),
    ("installation", 3),
    ("examples", 3),
    ("troubleshooting", 2),
    ("faq", 2),
    ("key features", 3),
    ("usage", 3),
    ("license", 1),
    ("setup", 2),
    ("dependencies", 2),
    ("roadmap", 2),
    ("testing", 3),
    ("getting started", 3),
];

static SECTION_PATTERNS: OnceLock<Vec<(Regex, u32)>> = OnceLock::new();

fn section_patterns() -> &'static [(Regex, u32)] {
    SECTION_PATTERNS.get_or_init(|| {
        SECTION_WEIGHTS
            .iter()
            .map(|(section, weight)| {
                let pattern = format!(r"(?i)\b{}\b", regex::escape(section));
                (Regex::new(&pattern).expect("valid section regex"), *weight)
            })
            .collect()
    })
}

fn max_score() -> u32 {
    SECTION_WEIGHTS.iter().map(|(_, w)| w).sum()
}

/// Sections mentioned in `readme` (case-insensitive, whole words)
pub fn matched_sections(readme: &str) -> Vec<(&'static str, u32)> {
    SECTION_WEIGHTS
        .iter()
        .zip(section_patterns())
        .filter(|(_, (pattern, _))| pattern.is_match(readme))
        .map(|(entry, _)| *entry)
        .collect()
}

/// Weighted fraction of known sections mentioned in `readme`
pub fn ramp_up_score(readme: &str) -> f64 {
    if readme.trim().is_empty() {
        return 0.0;
    }
    let matched: u32 = matched_sections(readme).iter().map(|(_, w)| w).sum();
    f64::from(matched) / f64::from(max_score())
}

/// Fetch the README and score it. A missing or unreadable README is zero
/// evidence, not a failure.
pub fn collect(ctx: &ApiContext<'_>, repo: &RepositoryRef) -> MetricResult {
    let url = ctx.repo_url(repo, "/readme");
    let readme = match ctx.http.get_text(&url, Some(ACCEPT_RAW)) {
        Ok(text) => text,
        Err(e) => {
            error!("Error fetching README for {}: {}", repo, e);
            return MetricResult::Score(0.0);
        }
    };

    if readme.trim().is_empty() {
        warn!("README content is empty for {}", repo);
        return MetricResult::Score(0.0);
    }

    for (section, weight) in matched_sections(&readme) {
        debug!("Matched section \"{}\" with weight {}", section, weight);
    }
    let score = ramp_up_score(&readme);
    info!("Ramp-up score for {}: {}", repo, score);
    MetricResult::Score(score)
}
