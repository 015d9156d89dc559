use anyhow::{anyhow, ensure};
use burn::{
    module::AutodiffModule,
    nn::{
        loss::{MseLoss, Reduction},
        Linear, LinearConfig,
    },
    optim::{adaptor::OptimizerAdaptor, GradientsParams, Optimizer, Sgd, SgdConfig},
    prelude::*,
    record::CompactRecorder,
    tensor::{activation::relu, backend::AutodiffBackend},
};
use log::info;

use super::Model;

/// A single hidden layer perceptron
#[derive(Module, Debug)]
pub struct Network<B: Backend> {
    hidden: Linear<B>,
    output: Linear<B>,
}

impl<B: Backend> Network<B> {
    /// In shape: `[batch, input]`
    ///
    /// Out shape: `[batch, output]`
    pub fn forward(&self, input: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = relu(self.hidden.forward(input));
        self.output.forward(x)
    }
}

#[derive(Config, Debug)]
pub struct MlpConfig {
    /// Width of the state vector
    pub input: usize,
    pub hidden: usize,
    /// Number of actions
    pub output: usize,
    #[config(default = 0.01)]
    pub lr: f64,
    /// File path (without extension) used by [`Model::save`]; saving is a no-op without one
    #[config(default = "None")]
    pub checkpoint: Option<String>,
}

impl MlpConfig {
    pub fn init<B: AutodiffBackend>(&self, device: &B::Device) -> Mlp<B> {
        Mlp {
            net: Network {
                hidden: LinearConfig::new(self.input, self.hidden).init(device),
                output: LinearConfig::new(self.hidden, self.output).init(device),
            },
            optimizer: SgdConfig::new().init(),
            loss: MseLoss::new(),
            config: self.clone(),
            device: device.clone(),
        }
    }
}

type SgdOptimizer<B> = OptimizerAdaptor<Sgd<<B as AutodiffBackend>::InnerBackend>, Network<B>, B>;

/// A burn-backed [`Model`] trained with plain SGD on a mean squared error loss
pub struct Mlp<B: AutodiffBackend> {
    net: Network<B>,
    optimizer: SgdOptimizer<B>,
    loss: MseLoss<B>,
    config: MlpConfig,
    device: B::Device,
}

impl<B: AutodiffBackend> Mlp<B> {
    pub fn config(&self) -> &MlpConfig {
        &self.config
    }

    /// Take one gradient step and return the loss measured before it
    pub fn fit(&mut self, state: &[f32], target: &[f32]) -> anyhow::Result<f32> {
        self.check_input(state)?;
        ensure!(
            target.len() == self.config.output,
            "target has width {}, expected {}",
            target.len(),
            self.config.output
        );

        let input = Tensor::<B, 1>::from_floats(state, &self.device).unsqueeze::<2>();
        let target = Tensor::<B, 1>::from_floats(target, &self.device).unsqueeze::<2>();

        let output = self.net.forward(input);
        let loss = self.loss.forward(output, target, Reduction::Mean);
        let value = loss.clone().into_data().convert::<f32>().value[0];

        let grads = GradientsParams::from_grads(loss.backward(), &self.net);
        self.net = self.optimizer.step(self.config.lr, self.net.clone(), grads);

        Ok(value)
    }

    /// Restore parameters previously written by [`Model::save`]
    pub fn load(mut self, path: &str) -> anyhow::Result<Self> {
        self.net = self
            .net
            .load_file(path, &CompactRecorder::new(), &self.device)
            .map_err(|e| anyhow!("loading checkpoint from {path}: {e:?}"))?;
        Ok(self)
    }

    fn check_input(&self, state: &[f32]) -> anyhow::Result<()> {
        ensure!(
            state.len() == self.config.input,
            "state has width {}, expected {}",
            state.len(),
            self.config.input
        );
        Ok(())
    }
}

impl<B: AutodiffBackend> Model for Mlp<B> {
    fn input_dim(&self) -> usize {
        self.config.input
    }

    fn output_dim(&self) -> usize {
        self.config.output
    }

    fn predict(&self, state: &[f32]) -> anyhow::Result<Vec<f32>> {
        self.check_input(state)?;
        let input = Tensor::<B::InnerBackend, 1>::from_floats(state, &self.device).unsqueeze::<2>();
        let output = self.net.valid().forward(input);
        Ok(output.into_data().convert::<f32>().value)
    }

    fn train(&mut self, state: &[f32], target: &[f32]) -> anyhow::Result<()> {
        self.fit(state, target).map(|_| ())
    }

    fn save(&self) -> anyhow::Result<()> {
        let Some(path) = self.config.checkpoint.as_deref() else {
            return Ok(());
        };
        self.net
            .clone()
            .save_file(path, &CompactRecorder::new())
            .map_err(|e| anyhow!("saving checkpoint to {path}: {e:?}"))?;
        info!("Saved model checkpoint to {path}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use burn::backend::{ndarray::NdArrayDevice, Autodiff, NdArray};
    use tempdir::TempDir;

    use super::*;

    type B = Autodiff<NdArray>;

    fn mlp() -> Mlp<B> {
        MlpConfig::new(4, 16, 3)
            .with_lr(0.05)
            .init::<B>(&NdArrayDevice::default())
    }

    #[test]
    fn predict_has_output_width() {
        let model = mlp();
        let q = model.predict(&[0.0, 1.0, 0.0, 1.0]).unwrap();
        assert_eq!(q.len(), 3);
        assert!(q.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn predict_is_pure() {
        let model = mlp();
        let s = [0.5, -0.5, 1.0, 0.0];
        assert_eq!(model.predict(&s).unwrap(), model.predict(&s).unwrap());
    }

    #[test]
    fn rejects_wrong_width() {
        let mut model = mlp();
        assert!(model.predict(&[1.0, 2.0]).is_err());
        assert!(model.train(&[1.0, 2.0], &[0.0, 0.0, 0.0]).is_err());
        assert!(model.train(&[0.0; 4], &[0.0]).is_err());
    }

    #[test]
    fn training_reduces_loss() {
        let mut model = mlp();
        let state = [1.0, 0.0, 0.5, -0.5];
        let target = [1.0, -1.0, 0.5];

        let first = model.fit(&state, &target).unwrap();
        let mut last = first;
        for _ in 0..200 {
            last = model.fit(&state, &target).unwrap();
        }
        assert!(last < first, "loss went from {first} to {last}");
    }

    #[test]
    fn save_without_checkpoint_is_noop() {
        assert!(mlp().save().is_ok());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = TempDir::new("dodgebot").unwrap();
        let path = dir.path().join("model").to_string_lossy().into_owned();
        let device = NdArrayDevice::default();
        let config = MlpConfig::new(4, 8, 2).with_checkpoint(Some(path.clone()));

        let model = config.init::<B>(&device);
        model.save().unwrap();

        let restored = config.init::<B>(&device).load(&path).unwrap();
        let s = [0.1, 0.2, 0.3, 0.4];
        let (a, b) = (model.predict(&s).unwrap(), restored.predict(&s).unwrap());
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() < 1e-2, "{x} vs {y}");
        }
    }
}
