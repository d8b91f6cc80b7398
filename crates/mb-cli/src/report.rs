use mb_harness::{BenchConfig, BenchReport, RepeatSample, SweepPoint};

/// `Repeat <k>: <secs> s`
pub fn repeat_line(sample: &RepeatSample) -> String {
    format!(
        "Repeat {}: {:.6} s",
        sample.repeat,
        sample.elapsed.as_secs_f64()
    )
}

/// Mean time followed by the configuration that produced it.
pub fn summary_line(config: &BenchConfig, report: &BenchReport) -> String {
    format!(
        "Mean: {:.6} s (n={} {}={} repeats={})",
        report.mean_secs(),
        config.n,
        config.strategy.worker_noun(),
        config.workers,
        config.repeats
    )
}

pub fn sweep_line(point: &SweepPoint) -> String {
    format!(
        "Mean: {:.6} s (n={} {}={} repeats={})",
        point.mean_secs,
        point.n,
        point.strategy.worker_noun(),
        point.workers,
        point.repeats
    )
}
