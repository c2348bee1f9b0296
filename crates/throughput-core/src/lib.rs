pub mod aggregates;
pub mod charts;
pub mod collapse;
pub mod config;
pub mod error;
pub mod export;
pub mod loader;
pub mod metrics;
pub mod pipeline;
pub mod recommender;
pub mod render;
pub mod summary;

pub use config::{AnalysisConfig, HourWindow, ZeroPickerPolicy};
pub use error::{AnalysisError, Result};
pub use loader::{load_dataset, Dataset, InputPaths};
pub use pipeline::{publish, run_analysis, AnalysisReport};
pub use throughput_parser::formats::schema;
pub use throughput_parser::TableKind;
