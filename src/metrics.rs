//! Run metrics recorded through the `metrics` facade.
//!
//! Nothing here installs a recorder; without one the macros are no-ops, so
//! library users and tests pay nothing unless they opt in.

macro_rules! run_metric {
    (counter, $name:literal) => {
        concat!("market_scraper_", $name, "_total")
    };
    (histogram, $name:literal) => {
        concat!("market_scraper_", $name)
    };
}

/// Counters and histograms for one scrape run.
pub struct ScrapeMetrics;

impl ScrapeMetrics {
    pub fn record_source_success(drafts: usize, duration_secs: f64) {
        ::metrics::counter!(run_metric!(counter, "sources_succeeded")).increment(1);
        ::metrics::counter!(run_metric!(counter, "drafts_extracted")).increment(drafts as u64);
        ::metrics::histogram!(run_metric!(histogram, "source_duration_seconds"))
            .record(duration_secs);
    }

    pub fn record_source_error() {
        ::metrics::counter!(run_metric!(counter, "sources_failed")).increment(1);
    }

    pub fn record_unique_records(count: usize) {
        ::metrics::histogram!(run_metric!(histogram, "unique_records")).record(count as f64);
    }

    pub fn record_enhancement(enhanced: bool) {
        if enhanced {
            ::metrics::counter!(run_metric!(counter, "enhancements_applied")).increment(1);
        } else {
            ::metrics::counter!(run_metric!(counter, "enhancements_failed")).increment(1);
        }
    }

    pub fn record_run(duration_secs: f64) {
        ::metrics::counter!(run_metric!(counter, "runs")).increment(1);
        ::metrics::histogram!(run_metric!(histogram, "run_duration_seconds")).record(duration_secs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names_follow_convention() {
        assert_eq!(run_metric!(counter, "runs"), "market_scraper_runs_total");
        assert_eq!(
            run_metric!(histogram, "unique_records"),
            "market_scraper_unique_records"
        );
    }

    #[test]
    fn test_recording_without_recorder_is_a_no_op() {
        ScrapeMetrics::record_source_success(3, 0.25);
        ScrapeMetrics::record_source_error();
        ScrapeMetrics::record_enhancement(false);
        ScrapeMetrics::record_run(1.0);
    }
}
