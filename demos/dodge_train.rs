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
};
use strum::EnumCount;

type B = Autodiff<NdArray>;

const ARTIFACT_DIR: &str = "local/dodge";
const NUM_EPISODES: u32 = 200;

fn main() -> anyhow::Result<()> {
    std::fs::create_dir_all(ARTIFACT_DIR)?;
    let device = NdArrayDevice::default();

    let config = AgentConfig::new();
    config.save(format!("{ARTIFACT_DIR}/agent.json"))?;

    let model = MlpConfig::new(STATE_WIDTH, 256, Move::COUNT)
        .with_checkpoint(Some(format!("{ARTIFACT_DIR}/model")))
        .init::<B>(&device);
    let game = Dodge::new(9, 12, 0);

    #[cfg(feature = "viz")]
    {
        use anyhow::anyhow;
        use dodgebot::viz::{self, PlotSink, SCORE_PLOTS};

        viz::init_logger(log::LevelFilter::Info)?;
        let (handle, tx) = viz::init(&SCORE_PLOTS, NUM_EPISODES);
        let mut agent = DQNAgent::with_sink(game, model, PlotSink::new(tx), &config)?;
        agent.train(|a| a.episode() >= NUM_EPISODES)?;

        // hang up so the window shows the final plots
        drop(agent);
        handle
            .join()
            .map_err(|_| anyhow!("plot thread panicked"))??;
    }

    #[cfg(not(feature = "viz"))]
    {
        use dodgebot::report::mean_score;

        env_logger::init();
        let mut agent = DQNAgent::new(game, model, &config)?;
        agent.train(|a| a.episode() >= NUM_EPISODES)?;
        log::info!(
            "Trained {} episodes, mean score {:.2}",
            agent.episode(),
            mean_score(agent.scores())
        );
    }

    Ok(())
}
