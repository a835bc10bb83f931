use serde::Serialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Receives `(label, elapsed)` pairs for each benchmarked stage.
pub trait TimingSink {
    fn record(&mut self, label: &'static str, elapsed: Duration);
}

/// Discards every sample.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl TimingSink for NullSink {
    fn record(&mut self, _label: &'static str, _elapsed: Duration) {}
}

/// Runs `work` and reports its wall time to `sink`, whether or not it fails.
pub fn time_stage<T, F>(sink: &mut dyn TimingSink, label: &'static str, work: F) -> T
where
    F: FnOnce() -> T,
{
    let start = Instant::now();
    let result = work();
    sink.record(label, start.elapsed());
    result
}

#[derive(Clone, Copy, Debug, Serialize)]
pub struct StageTimingSummary {
    pub label: &'static str,
    pub last_ms: f64,
    pub average_ms: f64,
    pub max_ms: f64,
    pub samples: u64,
}

#[derive(Default)]
struct StageTiming {
    first_seen: usize,
    last_ms: f64,
    total_ms: f64,
    max_ms: f64,
    samples: u64,
}

/// Aggregates stage timings and logs each one as it lands.
pub struct StageProfiler {
    timings: HashMap<&'static str, StageTiming>,
}

impl StageProfiler {
    pub fn new() -> Self {
        Self { timings: HashMap::new() }
    }

    pub fn scope(&mut self, label: &'static str) -> StageScope<'_> {
        StageScope { label, profiler: self, start: Instant::now() }
    }

    /// Summaries in the order stages first reported.
    pub fn summaries(&self) -> Vec<StageTimingSummary> {
        let mut ordered: Vec<(&&'static str, &StageTiming)> = self.timings.iter().collect();
        ordered.sort_by_key(|(_, timing)| timing.first_seen);
        ordered
            .into_iter()
            .map(|(&label, timing)| StageTimingSummary {
                label,
                last_ms: timing.last_ms,
                average_ms: if timing.samples == 0 { 0.0 } else { timing.total_ms / timing.samples as f64 },
                max_ms: timing.max_ms,
                samples: timing.samples,
            })
            .collect()
    }

    pub fn summary(&self, label: &str) -> Option<StageTimingSummary> {
        self.summaries().into_iter().find(|summary| summary.label == label)
    }
}

impl Default for StageProfiler {
    fn default() -> Self {
        Self::new()
    }
}

impl TimingSink for StageProfiler {
    fn record(&mut self, label: &'static str, elapsed: Duration) {
        let duration_ms = elapsed.as_secs_f64() * 1000.0;
        log::info!("{label}: {duration_ms:.3} ms");
        let next_order = self.timings.len();
        let entry = self
            .timings
            .entry(label)
            .or_insert_with(|| StageTiming { first_seen: next_order, ..Default::default() });
        entry.last_ms = duration_ms;
        entry.max_ms = entry.max_ms.max(duration_ms);
        entry.total_ms += duration_ms;
        entry.samples += 1;
    }
}

pub struct StageScope<'a> {
    label: &'static str,
    profiler: &'a mut StageProfiler,
    start: Instant,
}

impl<'a> Drop for StageScope<'a> {
    fn drop(&mut self) {
        self.profiler.record(self.label, self.start.elapsed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregates_repeated_labels_in_first_seen_order() {
        let mut profiler = StageProfiler::new();
        profiler.record("sample_curves", Duration::from_millis(4));
        profiler.record("generate_curves", Duration::from_millis(2));
        profiler.record("sample_curves", Duration::from_millis(8));

        let summaries = profiler.summaries();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].label, "sample_curves");
        assert_eq!(summaries[0].samples, 2);
        assert!((summaries[0].average_ms - 6.0).abs() < 1e-6);
        assert!((summaries[0].max_ms - 8.0).abs() < 1e-6);
        assert!((summaries[0].last_ms - 8.0).abs() < 1e-6);
        assert_eq!(summaries[1].label, "generate_curves");
    }

    #[test]
    fn scope_records_on_drop() {
        let mut profiler = StageProfiler::new();
        {
            let _span = profiler.scope("transform_sequential");
        }
        assert_eq!(profiler.summary("transform_sequential").map(|s| s.samples), Some(1));
    }

    #[test]
    fn time_stage_reports_failed_work_too() {
        let mut profiler = StageProfiler::new();
        let result: Result<(), &str> = time_stage(&mut profiler, "generate_keyframes", || Err("boom"));
        assert!(result.is_err());
        assert!(profiler.summary("generate_keyframes").is_some());
    }
}
