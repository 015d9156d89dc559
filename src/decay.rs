use crate::error::{Error, Result};

/// A rule for decaying a hyperparameter once per episode
pub trait Decay {
    /// Apply one decay step to `value`
    fn step(&self, value: f32) -> f32;
}

/// A value that never changes
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Constant;

impl Decay for Constant {
    fn step(&self, value: f32) -> f32 {
        value
    }
}

/// v<sub>n+1</sub> = max(v<sub>n</sub> * r, v<sub>f</sub>)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Multiplicative {
    rate: f32,
    vf: f32,
}

impl Multiplicative {
    /// `rate` must lie in `(0, 1]` so repeated steps never increase the value
    pub fn new(rate: f32, vf: f32) -> Result<Self> {
        if !(rate > 0.0 && rate <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "decay rate must be in (0, 1], got {rate}"
            )));
        }
        if !vf.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "decay floor must be finite, got {vf}"
            )));
        }
        Ok(Self { rate, vf })
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn floor(&self) -> f32 {
        self.vf
    }
}

impl Decay for Multiplicative {
    fn step(&self, value: f32) -> f32 {
        (value * self.rate).max(self.vf)
    }
}
