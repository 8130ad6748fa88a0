//! Batch scoring over a URL list
//!
//! URLs are processed in fixed-size batches (5 by default), strictly in
//! order. Each resolved URL is scored and written as one NDJSON record;
//! URLs that do not resolve are skipped. A bad URL never aborts its batch
//! or the batches after it.

use crate::config::ScoringConfig;
use crate::http::{Endpoints, HttpClient};
use crate::metrics::ApiContext;
use crate::resolver;
use crate::scoring::Scorer;
use std::io::Write;
use tracing::{debug, info, warn};

/// Drives resolver and scorer over batches of URLs
pub struct BatchRunner<'a> {
    ctx: ApiContext<'a>,
    scorer: Scorer<'a>,
    batch_size: usize,
}

impl<'a> BatchRunner<'a> {
    /// `batch_size` of 0 is treated as 1
    pub fn new(
        http: &'a dyn HttpClient,
        endpoints: &'a Endpoints,
        scoring: &'a ScoringConfig,
        batch_size: usize,
    ) -> Self {
        Self {
            ctx: ApiContext::new(http, endpoints),
            scorer: Scorer::new(http, endpoints, scoring),
            batch_size: batch_size.max(1),
        }
    }

    /// Score every URL, writing records to `out`.
    ///
    /// Returns the fraction of each batch that produced a NetScore, one
    /// entry per batch.
    pub fn run<S: AsRef<str>>(&self, urls: &[S], out: &mut dyn Write) -> Vec<f64> {
        let fractions: Vec<f64> = urls
            .chunks(self.batch_size)
            .enumerate()
            .map(|(index, batch)| {
                let fraction = self.process_batch(batch, out);
                info!(
                    "Batch {}: {:.0}% of {} URL(s) processed",
                    index + 1,
                    fraction * 100.0,
                    batch.len()
                );
                fraction
            })
            .collect();
        debug!("Finished {} batch(es)", fractions.len());
        fractions
    }

    /// Score one batch; returns `processed / batch.len()`
    pub fn process_batch<S: AsRef<str>>(&self, batch: &[S], out: &mut dyn Write) -> f64 {
        if batch.is_empty() {
            return 0.0;
        }
        let mut processed = 0usize;
        for url in batch {
            let url = url.as_ref().trim();
            let Some(repo) = resolver::handle_url(&self.ctx, url) else {
                debug!("URL not compatible, expected a github.com or npmjs.com URL: {}", url);
                continue;
            };

            let score = self.scorer.composite_score(url, &repo);
            if let Err(e) = writeln!(out, "{}", score.to_record()) {
                warn!("Failed to write score record for {}: {}", url, e);
            }
            if score.net_score.is_some() {
                processed += 1;
            } else {
                debug!("Error performing Net Score analysis for {}", repo);
            }
        }
        debug!("Processed {}/{} URLs", processed, batch.len());
        processed as f64 / batch.len() as f64
    }
}
