//! Observer implementations for the episode driver
//!
//! Observers allow composable data collection during a run without coupling
//! the driver to specific output formats.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use super::training::EpisodeSummary;
use crate::{Result, ports::Observer};

/// Progress bar observer - Shows run progress
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    wins: usize,
}

impl ProgressObserver {
    /// Create a new progress observer
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            wins: 0,
        }
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_run_start(&mut self, total_episodes: usize) -> Result<()> {
        let pb = ProgressBar::new(total_episodes as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes (wins: {msg})")
                .map_err(|e| crate::Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        if summary.won {
            self.wins += 1;
        }

        if let Some(pb) = &self.progress_bar {
            pb.set_position(summary.episode as u64 + 1);
            pb.set_message(self.wins.to_string());
        }
        Ok(())
    }

    fn on_run_end(&mut self) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(self.wins.to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct EpisodeLog {
    returns: Vec<f64>,
    lengths: Vec<usize>,
    wins: usize,
    truncated: usize,
}

/// Metrics observer - Tracks per-episode returns and lengths
///
/// Clones share the same log, so a clone kept by the caller can read the
/// metrics after the observer itself has been handed to a pipeline.
#[derive(Clone, Default)]
pub struct MetricsObserver {
    log: Arc<Mutex<EpisodeLog>>,
}

impl MetricsObserver {
    /// Create a new metrics observer
    pub fn new() -> Self {
        Self::default()
    }

    fn log(&self) -> MutexGuard<'_, EpisodeLog> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn episodes(&self) -> usize {
        self.log().returns.len()
    }

    /// Undiscounted return of every finished episode, in order
    pub fn returns(&self) -> Vec<f64> {
        self.log().returns.clone()
    }

    /// Get current win rate
    pub fn win_rate(&self) -> f64 {
        let log = self.log();
        if log.returns.is_empty() {
            0.0
        } else {
            log.wins as f64 / log.returns.len() as f64
        }
    }

    pub fn mean_return(&self) -> f64 {
        let log = self.log();
        if log.returns.is_empty() {
            0.0
        } else {
            log.returns.iter().sum::<f64>() / log.returns.len() as f64
        }
    }

    /// Get average episode length
    pub fn mean_length(&self) -> f64 {
        let log = self.log();
        if log.lengths.is_empty() {
            0.0
        } else {
            log.lengths.iter().sum::<usize>() as f64 / log.lengths.len() as f64
        }
    }

    /// Get metrics summary
    pub fn summary(&self) -> MetricsSummary {
        let (episodes, wins, truncated, best_return) = {
            let log = self.log();
            (
                log.returns.len(),
                log.wins,
                log.truncated,
                log.returns.iter().copied().reduce(f64::max),
            )
        };
        MetricsSummary {
            episodes,
            wins,
            truncated,
            win_rate: self.win_rate(),
            mean_return: self.mean_return(),
            best_return: best_return.unwrap_or(0.0),
            mean_length: self.mean_length(),
        }
    }
}

/// Summary of run metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub episodes: usize,
    pub wins: usize,
    pub truncated: usize,
    pub win_rate: f64,
    pub mean_return: f64,
    pub best_return: f64,
    pub mean_length: f64,
}

impl Observer for MetricsObserver {
    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        let mut log = self.log();
        log.returns.push(summary.total_reward);
        log.lengths.push(summary.steps);
        if summary.won {
            log.wins += 1;
        }
        if summary.truncated {
            log.truncated += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(episode: usize, steps: usize, total_reward: f64, won: bool) -> EpisodeSummary {
        EpisodeSummary {
            episode,
            steps,
            total_reward,
            final_reward: if won { 1.0 } else { 0.0 },
            won,
            truncated: false,
        }
    }

    #[test]
    fn test_metrics_observer() {
        let mut observer = MetricsObserver::new();

        assert_eq!(observer.win_rate(), 0.0);

        // Simulate 3 episodes
        observer.on_episode_end(&summary(0, 4, 1.0, true)).unwrap();
        observer.on_episode_end(&summary(1, 2, 0.0, false)).unwrap();
        observer.on_episode_end(&summary(2, 6, 1.0, true)).unwrap();

        assert_eq!(observer.episodes(), 3);
        assert!((observer.win_rate() - 0.666).abs() < 0.01);
        assert_eq!(observer.mean_length(), 4.0);

        let metrics = observer.summary();
        assert_eq!(metrics.wins, 2);
        assert_eq!(metrics.best_return, 1.0);
    }

    #[test]
    fn test_metrics_clones_share_log() {
        let observer = MetricsObserver::new();
        let mut handle = observer.clone();
        handle.on_episode_end(&summary(0, 10, 10.0, true)).unwrap();
        assert_eq!(observer.returns(), vec![10.0]);
    }
}
