use crate::{
    error::{Error, Result},
    memory::Transition,
    model::Model,
    util,
};

/// Replace the chosen action's value with the one-step Bellman backup
///
/// `q_old[action] = reward + gamma * max(q_next)`; every other entry is left as predicted so it
/// contributes no correction when trained on.
///
/// **Panics** if `action` is out of range for `q_old`
pub fn bellman_target(
    mut q_old: Vec<f32>,
    q_next: &[f32],
    action: usize,
    reward: f32,
    gamma: f32,
) -> Vec<f32> {
    let q_next_max = util::max(q_next).unwrap_or(0.0);
    q_old[action] = reward + gamma * q_next_max;
    q_old
}

/// Build the supervised training target for a transition using the model's current predictions
pub fn build_target<M: Model>(model: &M, transition: &Transition, gamma: f32) -> Result<Vec<f32>> {
    let q_old = predict(model, &transition.state)?;
    let q_next = predict(model, &transition.next_state)?;
    if transition.action.len() != q_old.len() {
        return Err(Error::InvalidAction {
            len: transition.action.len(),
        });
    }

    Ok(bellman_target(
        q_old,
        &q_next,
        transition.action.index(),
        transition.reward,
        gamma,
    ))
}

/// Predict after checking the input width, then check the output width
pub(crate) fn predict<M: Model>(model: &M, state: &[f32]) -> Result<Vec<f32>> {
    let expected = model.input_dim();
    if state.len() != expected {
        return Err(Error::StateWidth {
            expected,
            got: state.len(),
        });
    }
    let q = model.predict(state).map_err(Error::Model)?;
    if q.len() != model.output_dim() {
        return Err(Error::OutputWidth {
            expected: model.output_dim(),
            got: q.len(),
        });
    }
    Ok(q)
}
