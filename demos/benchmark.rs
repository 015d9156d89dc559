use burn::backend::{ndarray::NdArrayDevice, Autodiff, NdArray};
use dodgebot::{
    action::Action,
    bench::{Benchmark, Strategy, StrategyFactory},
    env::Game,
    gym::{
        dodge::{Move, STATE_WIDTH},
        Dodge,
    },
    model::{Mlp, MlpConfig, Model},
};
use log::info;
use once_cell::sync::Lazy;
use rand::{rngs::SmallRng, SeedableRng};
use strum::{EnumCount, IntoEnumIterator};

type B = Autodiff<NdArray>;

static DEVICE: Lazy<NdArrayDevice> = Lazy::new(NdArrayDevice::default);

const NUM_RUNS: usize = 10;
const WARMUP_TICKS: usize = 8;

/// A game with obstacles already on screen
fn busy_game() -> Dodge {
    let mut game = Dodge::new(9, 12, 5).with_spawn_chance(0.3);
    for _ in 0..WARMUP_TICKS {
        game.take_action(&Move::Stay.into())
            .expect("Stay is a valid move");
        if game.reward().map_or(false, |(_, over)| over) {
            game.restart().expect("Dodge restarts cannot fail");
        }
    }
    game
}

/// Picks any move
struct RandomMove {
    game: Dodge,
    rng: SmallRng,
}

impl Strategy for RandomMove {
    fn run(&mut self) -> anyhow::Result<()> {
        let action = Action::random(Move::COUNT, &mut self.rng);
        self.game.take_action(&action)
    }
}

/// Picks the first move that is neither walled nor about to be hit
struct SafestMove {
    game: Dodge,
}

impl Strategy for SafestMove {
    fn run(&mut self) -> anyhow::Result<()> {
        let state = self.game.state()?;
        let m = Move::iter()
            .find(|&m| state[m as usize] == 0.0 && state[Move::COUNT + m as usize] == 0.0)
            .unwrap_or(Move::Stay);
        self.game.take_action(&m.into())
    }
}

/// Picks the move the model values most
struct Greedy<'a> {
    game: Dodge,
    model: &'a Mlp<B>,
}

impl Strategy for Greedy<'_> {
    fn run(&mut self) -> anyhow::Result<()> {
        let state = self.game.state()?;
        let action = Action::greedy(&self.model.predict(&state)?)?;
        self.game.take_action(&action)
    }
}

fn boxed<'a, S: Strategy + 'a>(strategy: S) -> Box<dyn Strategy + 'a> {
    Box::new(strategy)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let model = MlpConfig::new(STATE_WIDTH, 256, Move::COUNT).init::<B>(&*DEVICE);

    let strategies: Vec<(&str, StrategyFactory)> = vec![
        (
            "random",
            Box::new(|| {
                boxed(RandomMove {
                    game: busy_game(),
                    rng: SmallRng::seed_from_u64(0),
                })
            }),
        ),
        ("safest", Box::new(|| boxed(SafestMove { game: busy_game() }))),
        (
            "model",
            Box::new(|| {
                boxed(Greedy {
                    game: busy_game(),
                    model: &model,
                })
            }),
        ),
    ];

    let report = Benchmark::new(NUM_RUNS).run(strategies)?;
    for r in &report.results {
        info!(
            "{}: min {:.6}s max {:.6}s avg {:.6}s",
            r.name, r.min_time, r.max_time, r.avg_time
        );
    }
    report.write_csv("benchmark_result.csv")?;

    Ok(())
}
