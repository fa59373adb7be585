use std::sync::Arc;
use std::time::Instant;

use fingerprint::{extract, hash, FingerprintConfig, Fingerprints};
use index::{FingerprintIndex, SongCatalog};
use tracing::debug;

use crate::metrics::MatchMetrics;
use crate::score::score_matches;
use crate::types::{MatchConfig, MatchError, MatchHit, MatchResult};


/// Query-time service over an immutable index and its catalog.
///
/// `Matcher` is `Send + Sync`; clone it or wrap it in an `Arc` to serve
/// concurrent queries against one shared index.
#[derive(Clone)]
pub struct Matcher {
    index: Arc<FingerprintIndex>,
    catalog: Arc<SongCatalog>,
    fingerprint_cfg: FingerprintConfig,
    cfg: MatchConfig,
    metrics: Option<Arc<dyn MatchMetrics>>,
}

impl Matcher {
    /// Construct a matcher that takes ownership of an index and catalog.
    pub fn new(
        index: FingerprintIndex,
        catalog: SongCatalog,
        fingerprint_cfg: FingerprintConfig,
        cfg: MatchConfig,
    ) -> Result<Self, MatchError> {
        Self::with_shared(Arc::new(index), Arc::new(catalog), fingerprint_cfg, cfg)
    }

    /// Construct a matcher from shared index and catalog handles.
    ///
    /// Both configs are validated. The index is checked against the catalog,
    /// so every hit can be resolved to a name, and against the fingerprint
    /// settings it was built with, so queries hash the same way.
    pub fn with_shared(
        index: Arc<FingerprintIndex>,
        catalog: Arc<SongCatalog>,
        fingerprint_cfg: FingerprintConfig,
        cfg: MatchConfig,
    ) -> Result<Self, MatchError> {
        fingerprint_cfg.validate()?;
        cfg.validate()?;
        index.check_catalog(&catalog)?;
        index.check_fingerprint_config(&fingerprint_cfg)?;
        Ok(Self {
            index,
            catalog,
            fingerprint_cfg,
            cfg,
            metrics: None,
        })
    }

    /// Report latency and hit counts of every query to `metrics`.
    pub fn with_metrics(mut self, metrics: Arc<dyn MatchMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn index(&self) -> &FingerprintIndex {
        &self.index
    }

    pub fn catalog(&self) -> &SongCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &MatchConfig {
        &self.cfg
    }

    /// Query-side hash set of a clip (`song_id` left unset).
    pub fn query_hashes(&self, samples: &[f32], sample_rate: u32) -> Result<Fingerprints, MatchError> {
        let landmarks = extract(samples, sample_rate, &self.fingerprint_cfg)?;
        Ok(hash(&landmarks, None, &self.fingerprint_cfg)?)
    }

    /// Unfiltered scores of a precomputed query hash set.
    pub fn score(&self, query: &Fingerprints) -> Vec<MatchResult> {
        score_matches(query, &self.index)
    }

    /// Identify a clip: ranked hits, best first.
    ///
    /// Hits below `min_score` are dropped and at most `max_results` are
    /// returned. A clip that collides with nothing yields an empty vector.
    pub fn identify(&self, samples: &[f32], sample_rate: u32) -> Result<Vec<MatchHit>, MatchError> {
        let start = Instant::now();
        let query = self.query_hashes(samples, sample_rate)?;

        let window_secs =
            self.fingerprint_cfg.window_size(sample_rate) as f64 / f64::from(sample_rate);
        let hits: Vec<MatchHit> = self
            .score(&query)
            .into_iter()
            .filter(|r| r.score >= self.cfg.min_score)
            .take(self.cfg.max_results)
            .map(|r| self.resolve(r, window_secs))
            .collect();

        let latency = start.elapsed();
        if let Some(metrics) = &self.metrics {
            metrics.record_match(query.len(), latency, hits.len());
        }
        debug!(
            query_hashes = query.len(),
            hits = hits.len(),
            best_score = hits.first().map(|h| h.score).unwrap_or(0),
            latency_micros = latency.as_micros(),
            "match_success"
        );
        Ok(hits)
    }

    /// The top hit of [`identify`](Self::identify), if any.
    pub fn best_match(&self, samples: &[f32], sample_rate: u32) -> Result<Option<MatchHit>, MatchError> {
        Ok(self.identify(samples, sample_rate)?.into_iter().next())
    }

    fn resolve(&self, result: MatchResult, window_secs: f64) -> MatchHit {
        let path = self.catalog.source(result.song_id).unwrap_or_default().to_string();
        MatchHit {
            song_id: result.song_id,
            name: index::display_name(&path),
            path,
            offset: result.offset,
            offset_seconds: result.offset as f64 * window_secs,
            score: result.score,
        }
    }
}
