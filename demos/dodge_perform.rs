use burn::{
    backend::{ndarray::NdArrayDevice, Autodiff, NdArray},
    config::Config,
};
use dodgebot::{
    algo::DQNAgent,
    config::AgentConfig,
    gym::{
        dodge::{Move, STATE_WIDTH},
        Dodge,
    },
    model::MlpConfig,
    report::mean_score,
};
use log::{info, warn};
use once_cell::sync::Lazy;
use strum::EnumCount;

type B = Autodiff<NdArray>;

static DEVICE: Lazy<NdArrayDevice> = Lazy::new(NdArrayDevice::default);

const ARTIFACT_DIR: &str = "local/dodge";
const NUM_EPISODES: u32 = 20;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = AgentConfig::load(format!("{ARTIFACT_DIR}/agent.json")).unwrap_or_else(|_| {
        warn!("No saved agent config, using defaults");
        AgentConfig::new()
    });
    // checkpointing during play would overwrite the trained weights with themselves
    let config = config.with_save_every(0);

    let model_config = MlpConfig::new(STATE_WIDTH, 256, Move::COUNT);
    let checkpoint = format!("{ARTIFACT_DIR}/model");
    let model = match model_config.init::<B>(&*DEVICE).load(&checkpoint) {
        Ok(model) => model,
        Err(e) => {
            warn!("{e:#}; playing with an untrained model");
            model_config.init::<B>(&*DEVICE)
        }
    };

    let mut agent = DQNAgent::new(Dodge::new(9, 12, 1), model, &config)?;
    agent.perform(|a| a.episode() >= NUM_EPISODES)?;
    info!(
        "Played {} games, mean score {:.2}, best {}",
        agent.episode(),
        mean_score(agent.scores()),
        agent.scores().iter().max().copied().unwrap_or_default()
    );

    Ok(())
}
