mod safety_metrics_service;

pub use safety_metrics_service::SafetyMetricsService;
