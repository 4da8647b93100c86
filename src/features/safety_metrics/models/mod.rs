mod safety_metrics;

pub use safety_metrics::SafetyMetrics;
