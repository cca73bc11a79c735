use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    path::Path,
    sync::{Arc, Mutex},
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractionSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub matches_processed: u64,
    pub page_failures: u64,
    pub missing_scores: u64,
    pub missing_stats: u64,
    pub missing_halftimes: u64,
}

impl Default for ExtractionSummary {
    fn default() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            matches_processed: 0,
            page_failures: 0,
            missing_scores: 0,
            missing_stats: 0,
            missing_halftimes: 0,
        }
    }
}

impl ExtractionSummary {
    pub fn write_json(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Counters shared by every extraction worker.
#[derive(Clone, Default)]
pub struct ExtractionMetrics {
    summary: Arc<Mutex<ExtractionSummary>>,
}

impl ExtractionMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    fn update(&self, f: impl FnOnce(&mut ExtractionSummary)) {
        let mut summary = self.summary.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut summary);
    }

    pub fn record_processed(&self) {
        self.update(|s| s.matches_processed += 1);
    }

    pub fn record_page_failure(&self) {
        self.update(|s| s.page_failures += 1);
    }

    pub fn record_missing_score(&self) {
        self.update(|s| s.missing_scores += 1);
    }

    pub fn record_missing_stats(&self) {
        self.update(|s| s.missing_stats += 1);
    }

    pub fn record_missing_halftime(&self) {
        self.update(|s| s.missing_halftimes += 1);
    }

    pub fn finish(&self) {
        self.update(|s| s.finished_at = Some(Utc::now()));
    }

    pub fn summary(&self) -> ExtractionSummary {
        self.summary
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn write_summary(&self, path: &Path) -> anyhow::Result<()> {
        self.summary().write_json(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let metrics = ExtractionMetrics::new();
        metrics.record_processed();
        metrics.record_processed();
        metrics.record_missing_score();
        metrics.record_missing_halftime();
        metrics.record_page_failure();

        let summary = metrics.summary();
        assert_eq!(summary.matches_processed, 2);
        assert_eq!(summary.missing_scores, 1);
        assert_eq!(summary.missing_stats, 0);
        assert_eq!(summary.missing_halftimes, 1);
        assert_eq!(summary.page_failures, 1);
        assert!(summary.finished_at.is_none());
    }

    #[test]
    fn test_clones_share_counters() {
        let metrics = ExtractionMetrics::new();
        let worker_view = metrics.clone();
        worker_view.record_missing_stats();
        metrics.finish();

        let summary = metrics.summary();
        assert_eq!(summary.missing_stats, 1);
        assert!(summary.finished_at.is_some());
    }

    #[test]
    fn test_write_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");
        let metrics = ExtractionMetrics::new();
        metrics.record_processed();
        metrics.write_summary(&path).unwrap();

        let written: ExtractionSummary = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written.matches_processed, 1);
    }
}
