mod safety_metrics_dto;

pub use safety_metrics_dto::SafetyMetricsResponseDto;
