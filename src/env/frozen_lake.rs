//! Frozen lake grid world
//!
//! The agent walks from `S` to `G` across frozen tiles `F`; stepping on a hole
//! `H` ends the episode with no reward. On a slippery lake the agent moves in
//! the intended direction or one of the two perpendicular directions, each
//! with probability 1/3.

use rand::{Rng, SeedableRng, rngs::StdRng};

use super::{EnvId, Environment, Step, StepInfo};
use crate::{
    Error, Result,
    types::{ActionIndex, ActionSpace, Observation},
};

pub const LEFT: ActionIndex = 0;
pub const DOWN: ActionIndex = 1;
pub const RIGHT: ActionIndex = 2;
pub const UP: ActionIndex = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Start,
    Frozen,
    Hole,
    Goal,
}

impl Tile {
    fn from_char(c: char) -> Option<Self> {
        match c {
            'S' => Some(Tile::Start),
            'F' => Some(Tile::Frozen),
            'H' => Some(Tile::Hole),
            'G' => Some(Tile::Goal),
            _ => None,
        }
    }

    fn as_char(self) -> char {
        match self {
            Tile::Start => 'S',
            Tile::Frozen => 'F',
            Tile::Hole => 'H',
            Tile::Goal => 'G',
        }
    }
}

pub const MAP_4X4: [&str; 4] = ["SFFF", "FHFH", "FFFH", "HFFG"];

#[derive(Debug, Clone)]
pub struct FrozenLake {
    tiles: Vec<Tile>,
    nrow: usize,
    ncol: usize,
    start: usize,
    position: usize,
    slippery: bool,
    max_steps: usize,
    steps: usize,
    done: bool,
    last_action: Option<ActionIndex>,
    rng: StdRng,
}

impl FrozenLake {
    pub const MAX_STEPS: usize = 100;

    /// Slippery 4x4 lake
    pub fn new() -> Self {
        let tiles = MAP_4X4
            .iter()
            .flat_map(|row| row.chars())
            .filter_map(Tile::from_char)
            .collect();
        Self::from_tiles(tiles, 4, 4, true)
    }

    /// Build a lake from rows of `S`, `F`, `H` and `G`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] for an empty or ragged map,
    /// an unknown tile, or a map without exactly one start tile.
    pub fn from_map(rows: &[&str], slippery: bool) -> Result<Self> {
        let invalid = |message: String| Error::InvalidConfiguration { message };

        let ncol = rows.first().map(|row| row.chars().count()).unwrap_or(0);
        if ncol == 0 {
            return Err(invalid("frozen lake map is empty".to_string()));
        }

        let mut tiles = Vec::with_capacity(rows.len() * ncol);
        for (r, row) in rows.iter().enumerate() {
            if row.chars().count() != ncol {
                return Err(invalid(format!("row {r} has a different width")));
            }
            for c in row.chars() {
                let tile = Tile::from_char(c)
                    .ok_or_else(|| invalid(format!("unknown tile '{c}' in row {r}")))?;
                tiles.push(tile);
            }
        }

        let starts = tiles.iter().filter(|&&tile| tile == Tile::Start).count();
        if starts != 1 {
            return Err(invalid(format!("expected one start tile, found {starts}")));
        }

        Ok(Self::from_tiles(tiles, rows.len(), ncol, slippery))
    }

    fn from_tiles(tiles: Vec<Tile>, nrow: usize, ncol: usize, slippery: bool) -> Self {
        let start = tiles
            .iter()
            .position(|&tile| tile == Tile::Start)
            .unwrap_or(0);
        Self {
            tiles,
            nrow,
            ncol,
            start,
            position: start,
            slippery,
            max_steps: Self::MAX_STEPS,
            steps: 0,
            done: false,
            last_action: None,
            rng: StdRng::from_rng(&mut rand::rng()),
        }
    }

    pub fn with_slippery(mut self, slippery: bool) -> Self {
        self.slippery = slippery;
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn position(&self) -> usize {
        self.position
    }

    fn move_from(&self, position: usize, direction: ActionIndex) -> usize {
        let (row, col) = (position / self.ncol, position % self.ncol);
        let (row, col) = match direction {
            LEFT => (row, col.saturating_sub(1)),
            DOWN => ((row + 1).min(self.nrow - 1), col),
            RIGHT => (row, (col + 1).min(self.ncol - 1)),
            _ => (row.saturating_sub(1), col),
        };
        row * self.ncol + col
    }
}

impl Default for FrozenLake {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for FrozenLake {
    fn id(&self) -> EnvId {
        EnvId::FrozenLake
    }

    fn action_space(&self) -> ActionSpace {
        ActionSpace::fixed::<4>()
    }

    fn reset(&mut self) -> Observation {
        self.position = self.start;
        self.steps = 0;
        self.done = false;
        self.last_action = None;
        Observation::Discrete(self.position as u64)
    }

    fn step(&mut self, action: ActionIndex) -> Result<Step> {
        if self.done {
            return Err(Error::EpisodeFinished);
        }
        let action = self.action_space().check(action)?;

        let direction = if self.slippery {
            // intended direction or one of its two perpendiculars
            (action + self.rng.random_range(0..3) + 3) % 4
        } else {
            action
        };

        self.position = self.move_from(self.position, direction);
        self.steps += 1;
        self.last_action = Some(action);

        let tile = self.tiles[self.position];
        let reward = if tile == Tile::Goal { 1.0 } else { 0.0 };
        let terminal = matches!(tile, Tile::Hole | Tile::Goal);
        let truncated = !terminal && self.steps >= self.max_steps;
        self.done = terminal || truncated;

        Ok(Step {
            observation: Observation::Discrete(self.position as u64),
            reward,
            done: self.done,
            info: StepInfo {
                steps: self.steps,
                truncated,
            },
        })
    }

    fn render(&self) -> String {
        let mut out = String::new();
        if let Some(action) = self.last_action {
            let name = match action {
                LEFT => "Left",
                DOWN => "Down",
                RIGHT => "Right",
                _ => "Up",
            };
            out.push_str(&format!("  ({name})\n"));
        }
        for (i, tile) in self.tiles.iter().enumerate() {
            out.push(if i == self.position { '@' } else { tile.as_char() });
            if (i + 1) % self.ncol == 0 {
                out.push('\n');
            }
        }
        out
    }

    fn set_rng_seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }
}
