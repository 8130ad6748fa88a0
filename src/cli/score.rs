//! `netscore score` - batch scoring of a URL file

use anyhow::{bail, Context, Result};
use netscore::batch::BatchRunner;
use netscore::config::NetScoreConfig;
use netscore::http::GitHubHttp;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Non-blank, trimmed lines of a URL file
pub(super) fn read_urls(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read URL file {}", path.display()))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

pub(super) fn run(
    config: &NetScoreConfig,
    url_file: &Path,
    extended: bool,
    batch_size: Option<usize>,
) -> Result<()> {
    let Some(token) = config.github_token.as_deref() else {
        bail!("GITHUB_TOKEN is not set");
    };
    let urls = read_urls(url_file)?;

    let mut scoring = config.scoring.clone();
    scoring.extended_metrics |= extended;
    let batch_size = batch_size.filter(|&n| n > 0).unwrap_or(config.batch.size);

    let client = GitHubHttp::new(token, &config.http);
    let runner = BatchRunner::new(&client, client.endpoints(), &scoring, batch_size);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let fractions = runner.run(&urls, &mut out);
    out.flush().context("Failed to flush score records")?;

    let full = fractions.iter().filter(|&&f| f >= 1.0).count();
    info!(
        "Scored {} URL(s) in {} batch(es); {} batch(es) fully processed",
        urls.len(),
        fractions.len(),
        full
    );
    Ok(())
}
