//! Cart-pole balancing
//!
//! A pole is hinged to a cart moving along a frictionless track. The agent
//! pushes the cart left (0) or right (1) and earns a reward of 1 for every
//! step the pole stays upright. Continuous state is bucketized with a
//! [`Discretizer`] so it can key an action-value table.

use std::f64::consts::PI;

use rand::{Rng, SeedableRng, rngs::StdRng};

use super::{EnvId, Environment, Step, StepInfo, discretizer::Discretizer};
use crate::{
    Error, Result,
    types::{ActionIndex, ActionSpace, Observation},
};

const GRAVITY: f64 = 9.8;
const MASS_CART: f64 = 1.0;
const MASS_POLE: f64 = 0.1;
const TOTAL_MASS: f64 = MASS_CART + MASS_POLE;
/// Half the pole's length
const LENGTH: f64 = 0.5;
const POLE_MASS_LENGTH: f64 = MASS_POLE * LENGTH;
const FORCE_MAG: f64 = 10.0;
const TAU: f64 = 0.02;

/// Pole angle past which the episode ends
pub const THETA_THRESHOLD: f64 = 12.0 * 2.0 * PI / 360.0;
/// Cart position past which the episode ends
pub const X_THRESHOLD: f64 = 2.4;
const RESET_BOUND: f64 = 0.05;

/// Raw cart-pole state: `[x, x_dot, theta, theta_dot]`
pub type CartPoleState = [f64; 4];

#[derive(Debug, Clone)]
pub struct CartPole {
    state: CartPoleState,
    discretizer: Discretizer,
    max_steps: usize,
    steps: usize,
    done: bool,
    rng: StdRng,
}

impl CartPole {
    pub const MAX_STEPS: usize = 200;

    pub fn new() -> Self {
        Self {
            state: [0.0; 4],
            discretizer: Discretizer::cart_pole(),
            max_steps: Self::MAX_STEPS,
            steps: 0,
            done: false,
            rng: StdRng::from_rng(&mut rand::rng()),
        }
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn raw_state(&self) -> CartPoleState {
        self.state
    }

    pub fn discretizer(&self) -> &Discretizer {
        &self.discretizer
    }

    fn observe(&self) -> Observation {
        self.discretizer.discretize(&self.state)
    }

    /// One Euler integration step of the cart-pole dynamics.
    fn integrate(state: CartPoleState, action: ActionIndex) -> CartPoleState {
        let [x, x_dot, theta, theta_dot] = state;
        let force = if action == 1 { FORCE_MAG } else { -FORCE_MAG };
        let (sin, cos) = theta.sin_cos();

        let temp = (force + POLE_MASS_LENGTH * theta_dot * theta_dot * sin) / TOTAL_MASS;
        let theta_acc = (GRAVITY * sin - cos * temp)
            / (LENGTH * (4.0 / 3.0 - MASS_POLE * cos * cos / TOTAL_MASS));
        let x_acc = temp - POLE_MASS_LENGTH * theta_acc * cos / TOTAL_MASS;

        [
            x + TAU * x_dot,
            x_dot + TAU * x_acc,
            theta + TAU * theta_dot,
            theta_dot + TAU * theta_acc,
        ]
    }

    fn out_of_bounds(state: &CartPoleState) -> bool {
        state[0].abs() > X_THRESHOLD || state[2].abs() > THETA_THRESHOLD
    }
}

impl Default for CartPole {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for CartPole {
    fn id(&self) -> EnvId {
        EnvId::CartPole
    }

    fn action_space(&self) -> ActionSpace {
        ActionSpace::fixed::<2>()
    }

    fn reset(&mut self) -> Observation {
        for value in &mut self.state {
            *value = self.rng.random_range(-RESET_BOUND..RESET_BOUND);
        }
        self.steps = 0;
        self.done = false;
        self.observe()
    }

    fn step(&mut self, action: ActionIndex) -> Result<Step> {
        if self.done {
            return Err(Error::EpisodeFinished);
        }
        let action = self.action_space().check(action)?;

        self.state = Self::integrate(self.state, action);
        self.steps += 1;

        let terminal = Self::out_of_bounds(&self.state);
        let truncated = !terminal && self.steps >= self.max_steps;
        self.done = terminal || truncated;

        Ok(Step {
            observation: self.observe(),
            reward: 1.0,
            done: self.done,
            info: StepInfo {
                steps: self.steps,
                truncated,
            },
        })
    }

    fn render(&self) -> String {
        let [x, x_dot, theta, theta_dot] = self.state;
        format!(
            "x={x:+.3} x_dot={x_dot:+.3} theta={theta:+.3} theta_dot={theta_dot:+.3} -> {}",
            self.observe()
        )
    }

    fn set_rng_seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }
}
