use std::{
    io,
    sync::mpsc::{self, Sender},
    thread::{self, JoinHandle},
};

use log::{warn, LevelFilter, SetLoggerError};

use crate::report::{mean_score, ScoreSink};

mod app;
mod components;
mod tui;

pub use app::App;

/// Plots fed by [`PlotSink`], in [`Update::data`] order
pub const SCORE_PLOTS: [&str; 2] = ["Score", "Mean score"];

/// Format for updating plot data
pub struct Update {
    pub episode: u32,
    pub data: Vec<f64>,
}

/// Spawn the plot window on its own thread
///
/// ### Returns
/// - a handle to join once training is done; the window stays open until `q` is pressed
/// - the sender feeding it updates
pub fn init(plots: &[&'static str], episodes: u32) -> (JoinHandle<io::Result<()>>, Sender<Update>) {
    let (tx, rx) = mpsc::channel();
    let plots = plots.to_vec();
    let handle = thread::spawn(move || App::new(&plots, episodes).run(rx));
    (handle, tx)
}

/// Route every log record at `level` or above into the window's log tab
///
/// Replaces a terminal logger, which would draw over the window. Fails if a logger is already set.
pub fn init_logger(level: LevelFilter) -> Result<(), SetLoggerError> {
    tui_logger::init_logger(level)?;
    tui_logger::set_default_level(level);
    log::set_max_level(level);
    Ok(())
}

/// A [`ScoreSink`] forwarding the latest score and the running mean to the plot window
pub struct PlotSink {
    tx: Sender<Update>,
    closed: bool,
}

impl PlotSink {
    pub fn new(tx: Sender<Update>) -> Self {
        Self { tx, closed: false }
    }
}

impl ScoreSink for PlotSink {
    fn record(&mut self, scores: &[i64]) {
        let Some(&last) = scores.last() else {
            return;
        };
        let update = Update {
            episode: scores.len() as u32,
            data: vec![last as f64, mean_score(scores)],
        };
        if self.tx.send(update).is_err() && !self.closed {
            warn!("Plot window closed, dropping further score updates");
            self.closed = true;
        }
    }
}
