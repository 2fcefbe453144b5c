// Library interface for hreff modules
// Integration tests and the CLI both go through these exports

pub mod config;
pub mod efficiency;
pub mod error;
pub mod export;
pub mod heart_rate;
pub mod import;
pub mod logging;
pub mod measure;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod scrub;
pub mod summary;

// Re-export commonly used types for convenience
pub use config::AnalysisConfig;
pub use error::{HrEffError, Result};
pub use export::ExportFormat;
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use measure::Measure;
pub use models::{ActivityRecord, ActivityTable, ActivityType};
pub use pipeline::{ActivityPipeline, PipelineOutput, PipelineReport};
pub use summary::{summarize, TypeSummary};
