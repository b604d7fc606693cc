//! Episode driver and its observers
//!
//! This module provides:
//! - The driver loop that runs an agent in an environment
//! - Explore/exploit schedules for choosing actions
//! - Observers recording progress and metrics during a run

pub mod observers;
pub mod training;

pub use observers::{MetricsObserver, MetricsSummary, ProgressObserver};
pub use training::{
    ActionSelection, EpisodeSummary, RunResult, StepRecord, TrainingConfig, TrainingPipeline,
};

pub use crate::ports::{Agent, Observer};
