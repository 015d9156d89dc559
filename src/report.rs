/// Receives the score history after every finished episode
///
/// Sinks are fire-and-forget; the learning loop never inspects what they do with the scores.
pub trait ScoreSink {
    fn record(&mut self, scores: &[i64]);
}

/// Discards scores
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ScoreSink for NullSink {
    fn record(&mut self, _scores: &[i64]) {}
}

/// Keeps a copy of the latest score history
#[derive(Debug, Clone, Default)]
pub struct ScoreHistory {
    pub scores: Vec<i64>,
    pub updates: usize,
}

impl ScoreSink for ScoreHistory {
    fn record(&mut self, scores: &[i64]) {
        self.scores = scores.to_vec();
        self.updates += 1;
    }
}

/// Running mean of the score history, as plotted next to the raw scores
pub fn mean_score(scores: &[i64]) -> f64 {
    if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<i64>() as f64 / scores.len() as f64
    }
}
