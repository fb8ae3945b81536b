//! Cached analysis across repeated requests
//!
//! Metric comparison is deterministic, so a finished [`MetricReport`] can be
//! reused for as long as the dataset, assignment column, metric and config
//! stay the same. [`Analyzer`] fixes the config for its lifetime and keys the
//! cache on the other three. Only the most recent dataset's entries are kept,
//! so the cache never holds more than one report per metric.

use rustc_hash::FxHashMap;

use crate::config::AnalysisConfig;
use crate::error::{ConfigError, Result};
use crate::model::{AnalysisReport, Dataset, MetricReport};
use crate::report::{AnalysisPlan, AnalysisRequest, evaluate_metrics};

/// Cache key: (dataset fingerprint, assignment column, metric name)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub dataset: u64,
    pub assignment_column: String,
    pub metric: String,
}

/// Finished metric reports keyed by [`CacheKey`]
#[derive(Debug, Clone, Default)]
pub struct MetricCache {
    entries: FxHashMap<CacheKey, MetricReport>,
    hits: u64,
    misses: u64,
}

impl MetricCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an entry, counting the hit or miss
    pub fn get(&mut self, key: &CacheKey) -> Option<&MetricReport> {
        match self.entries.get(key) {
            Some(report) => {
                self.hits += 1;
                Some(report)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, key: CacheKey, report: MetricReport) {
        self.entries.insert(key, report);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn hits(&self) -> u64 {
        self.hits
    }

    #[must_use]
    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Drop entries computed for any other dataset
    pub fn retain_dataset(&mut self, fingerprint: u64) {
        self.entries.retain(|key, _| key.dataset == fingerprint);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Analysis engine bound to one validated configuration, with a metric cache
#[derive(Debug, Clone)]
pub struct Analyzer {
    config: AnalysisConfig,
    cache: MetricCache,
}

impl Analyzer {
    pub fn new(config: AnalysisConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            cache: MetricCache::new(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    #[must_use]
    pub fn cache(&self) -> &MetricCache {
        &self.cache
    }

    /// Forget every cached report; hit and miss counters are kept
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Same as [`crate::assemble`], computing only metrics not already cached
    pub fn analyze(
        &mut self,
        dataset: &Dataset,
        request: &AnalysisRequest,
    ) -> Result<AnalysisReport> {
        let plan = AnalysisPlan::resolve(dataset, request, &self.config)?;
        let fingerprint = dataset.fingerprint();
        self.cache.retain_dataset(fingerprint);
        let key_for = |metric: &str| CacheKey {
            dataset: fingerprint,
            assignment_column: request.assignment_column.clone(),
            metric: metric.to_string(),
        };

        let mut reports = Vec::with_capacity(plan.metrics.len());
        let mut missing = Vec::new();
        for metric in &plan.metrics {
            match self.cache.get(&key_for(metric)) {
                Some(report) => reports.push(report.clone()),
                None => missing.push(metric.clone()),
            }
        }

        if !missing.is_empty() {
            tracing::debug!(count = missing.len(), "computing uncached metrics");
            let computed = evaluate_metrics(
                dataset,
                &request.assignment_column,
                &missing,
                &self.config,
            );
            for report in computed {
                self.cache.insert(key_for(&report.metric), report.clone());
                reports.push(report);
            }
        }

        Ok(plan.finish(reports))
    }
}
