use anyhow::ensure;
use rand::{rngs::SmallRng, Rng, SeedableRng};
use strum::{EnumCount, EnumIter, FromRepr, IntoEnumIterator};

use crate::{
    action::Action,
    env::{Game, State},
};

const REWARD_ALIVE: f32 = 0.1;
const REWARD_HIT: f32 = -10.0;

/// Length of the state vector produced by [`Dodge`]
pub const STATE_WIDTH: usize = 2 * Move::COUNT + 2;

/// Moves available in [`Dodge`], in one-hot index order
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr, EnumCount, EnumIter)]
#[repr(usize)]
pub enum Move {
    Stay = 0,
    Up,
    Down,
    Left,
    Right,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
}

impl Move {
    /// Offset as `(dx, dy)`, with `y` growing downwards
    pub fn delta(self) -> (i32, i32) {
        match self {
            Move::Stay => (0, 0),
            Move::Up => (0, -1),
            Move::Down => (0, 1),
            Move::Left => (-1, 0),
            Move::Right => (1, 0),
            Move::UpLeft => (-1, -1),
            Move::UpRight => (1, -1),
            Move::DownLeft => (-1, 1),
            Move::DownRight => (1, 1),
        }
    }
}

impl From<Move> for Action {
    fn from(value: Move) -> Self {
        Action::one_hot(value as usize, Move::COUNT)
    }
}

/// A grid arena where obstacles rain down one row per tick and the player must sidestep them
///
/// State layout: nine danger flags (the destination of each [`Move`] will hold an obstacle after
/// the next tick), nine wall flags (the move would leave the arena), then the player's position
/// scaled to `[0, 1]`. Surviving a tick scores a point.
#[derive(Debug, Clone)]
pub struct Dodge {
    width: i32,
    height: i32,
    spawn_chance: f64,
    player: (i32, i32),
    obstacles: Vec<(i32, i32)>,
    score: i64,
    hit: bool,
    rng: SmallRng,
}

impl Dodge {
    /// **Panics** if the arena is smaller than 2x2 or a side does not fit in an `i32`
    pub fn new(width: usize, height: usize, seed: u64) -> Self {
        assert!(width >= 2 && height >= 2, "Dodge arena must be at least 2x2");
        let (Ok(width), Ok(height)) = (i32::try_from(width), i32::try_from(height)) else {
            panic!("Dodge arena of {width}x{height} is too large");
        };
        Self {
            width,
            height,
            spawn_chance: 0.15,
            player: (width / 2, height - 1),
            obstacles: Vec::new(),
            score: 0,
            hit: false,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Probability that each column spawns an obstacle per tick, clamped to `[0, 1]`
    ///
    /// **Panics** if `spawn_chance` is NaN
    pub fn with_spawn_chance(mut self, spawn_chance: f64) -> Self {
        assert!(!spawn_chance.is_nan(), "spawn chance must be a number");
        self.spawn_chance = spawn_chance.clamp(0.0, 1.0);
        self
    }

    pub fn player(&self) -> (i32, i32) {
        self.player
    }

    pub fn obstacles(&self) -> &[(i32, i32)] {
        &self.obstacles
    }

    fn in_bounds(&self, (x, y): (i32, i32)) -> bool {
        (0..self.width).contains(&x) && (0..self.height).contains(&y)
    }

    fn destination(&self, m: Move) -> (i32, i32) {
        let (dx, dy) = m.delta();
        (self.player.0 + dx, self.player.1 + dy)
    }

    /// Move the player, then let every obstacle fall and spawn a new row
    fn tick(&mut self, m: Move) {
        let dest = self.destination(m);
        if self.in_bounds(dest) {
            self.player = dest;
        }

        let height = self.height;
        for o in self.obstacles.iter_mut() {
            o.1 += 1;
        }
        self.obstacles.retain(|o| o.1 < height);
        for x in 0..self.width {
            if self.rng.gen_bool(self.spawn_chance) {
                self.obstacles.push((x, 0));
            }
        }

        self.hit = self.obstacles.contains(&self.player);
        if !self.hit {
            self.score += 1;
        }
    }
}

impl Game for Dodge {
    fn state(&mut self) -> anyhow::Result<State> {
        let danger = Move::iter().map(|m| {
            let (x, y) = self.destination(m);
            self.obstacles.contains(&(x, y - 1)) as u8 as f32
        });
        let wall = Move::iter().map(|m| !self.in_bounds(self.destination(m)) as u8 as f32);
        let position = [
            self.player.0 as f32 / (self.width - 1) as f32,
            self.player.1 as f32 / (self.height - 1) as f32,
        ];
        Ok(danger.chain(wall).chain(position).collect())
    }

    fn take_action(&mut self, action: &Action) -> anyhow::Result<()> {
        ensure!(
            action.len() == Move::COUNT,
            "expected {} moves, got an action of length {}",
            Move::COUNT,
            action.len()
        );
        let m = Move::from_repr(action.index()).unwrap_or(Move::Stay);
        self.tick(m);
        Ok(())
    }

    fn reward(&mut self) -> anyhow::Result<(f32, bool)> {
        Ok(if self.hit {
            (REWARD_HIT, true)
        } else {
            (REWARD_ALIVE, false)
        })
    }

    fn score(&self) -> i64 {
        self.score
    }

    fn restart(&mut self) -> anyhow::Result<()> {
        self.player = (self.width / 2, self.height - 1);
        self.obstacles.clear();
        self.score = 0;
        self.hit = false;
        Ok(())
    }
}
