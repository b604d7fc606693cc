//! Observer port - abstraction for run observation and data collection
//!
//! This port defines the interface for observing episode-driver events,
//! allowing composable data collection without coupling the driver to
//! specific output formats or metrics.

use crate::{
    Result,
    pipeline::{EpisodeSummary, StepRecord},
};

/// Observer trait for monitoring a run
///
/// # Event Sequence
///
/// The observer methods are called in the following order:
/// 1. `on_run_start(total_episodes)` - Once at the beginning
/// 2. For each episode:
///    - `on_episode_start(episode)`
///    - `on_step(...)` - For each environment step, after learning
///    - `on_episode_end(summary)`
/// 3. `on_run_end()` - Once at the end
///
/// # Examples
///
/// ```no_run
/// use qlearn::{pipeline::EpisodeSummary, ports::Observer};
///
/// struct WinCounter {
///     wins: usize,
/// }
///
/// impl Observer for WinCounter {
///     fn on_episode_end(&mut self, summary: &EpisodeSummary) -> qlearn::Result<()> {
///         if summary.won {
///             self.wins += 1;
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Observer: Send {
    /// Called once before the first episode.
    fn on_run_start(&mut self, _total_episodes: usize) -> Result<()> {
        Ok(())
    }

    /// Called when an episode starts (0-based index).
    fn on_episode_start(&mut self, _episode: usize) -> Result<()> {
        Ok(())
    }

    /// Called after every environment step.
    ///
    /// The record is produced after any learning update for the step.
    fn on_step(&mut self, _record: &StepRecord) -> Result<()> {
        Ok(())
    }

    /// Called when an episode reaches a terminal or truncated state.
    fn on_episode_end(&mut self, _summary: &EpisodeSummary) -> Result<()> {
        Ok(())
    }

    /// Called once after the last episode.
    ///
    /// Use this to finalize outputs or display summaries.
    fn on_run_end(&mut self) -> Result<()> {
        Ok(())
    }
}
