//! Tabular Q-learning
//!
//! Q-learning is off-policy temporal difference control: after every
//! transition (s, a, s', r) the estimate for (s, a) moves toward the observed
//! reward plus the discounted best estimate available from s'.
//!
//! ```text
//! Q(s,a) ← Q(s,a) + α · (r + γ · max_a' Q(s',a') − Q(s,a))
//! ```
//!
//! Rows of the action-value table are created lazily as all-zero vectors.
//! Greedy selection breaks near-ties uniformly at random.
//!
//! ## Usage Example
//!
//! ```
//! use qlearn::{
//!     config::Hyperparameters,
//!     ports::Agent,
//!     q_learning::QLearningAgent,
//!     types::{ActionSpace, Observation},
//! };
//!
//! let space = ActionSpace::new(2)?;
//! let mut agent = QLearningAgent::new(space, Hyperparameters::new(0.5, 0.9)?).with_seed(1);
//!
//! let s0 = Observation::Discrete(0);
//! let s1 = Observation::Discrete(1);
//! agent.learn(&s0, 0, &s1, 1.0)?;
//!
//! assert_eq!(agent.q_values(&s0).as_ref(), &[0.5, 0.0]);
//! assert_eq!(agent.act(&s0), 0);
//! # Ok::<(), qlearn::Error>(())
//! ```

pub mod agent;
pub mod q_table;
pub mod serialization;

pub use agent::QLearningAgent;
pub use q_table::ActionValueTable;
pub use serialization::{AgentState, SavedAgent, TrainingMetadata};
