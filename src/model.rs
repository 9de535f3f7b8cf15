use crate::data::{NUM_CLASSES, NUM_INPUTS};
use burn::{
    nn::{Initializer, Linear, LinearConfig, Relu},
    prelude::*,
};

/// Maps a batch of flattened digit images `[batch_size, 784]` to one score
/// per class `[batch_size, 10]`.
///
/// Both model flavors in this module implement it, so the training loop
/// does not care how the layers were composed.
pub trait DigitClassifier<B: Backend> {
    fn forward(&self, images: Tensor<B, 2>) -> Tensor<B, 2>;
}

#[derive(Config, Debug)]
pub struct MlpConfig {
    #[config(default = 64)]
    pub hidden_size: usize,
    /// Standard deviation of the zero-mean gaussian the weights start from.
    #[config(default = 0.01)]
    pub init_std: f64,
}

/// The hand-written flavor: every layer is a named field and the forward
/// pass chains them explicitly.
#[derive(Module, Debug)]
pub struct Mlp<B: Backend> {
    hidden1: Linear<B>,
    hidden2: Linear<B>,
    output: Linear<B>,
    activation: Relu,
}

/// The sequential flavor: the same architecture assembled by pushing layers
/// into a list and folding the input through it.
#[derive(Module, Debug)]
pub struct MlpStack<B: Backend> {
    layers: Vec<Linear<B>>,
    activation: Relu,
}

impl MlpConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> Mlp<B> {
        Mlp {
            hidden1: self.linear(NUM_INPUTS, self.hidden_size).init(device),
            hidden2: self.linear(self.hidden_size, self.hidden_size).init(device),
            output: self.linear(self.hidden_size, NUM_CLASSES).init(device),
            activation: Relu::new(),
        }
    }

    pub fn init_stacked<B: Backend>(&self, device: &B::Device) -> MlpStack<B> {
        let widths = [NUM_INPUTS, self.hidden_size, self.hidden_size, NUM_CLASSES];
        let layers = widths
            .windows(2)
            .map(|pair| self.linear(pair[0], pair[1]).init(device))
            .collect();

        MlpStack {
            layers,
            activation: Relu::new(),
        }
    }

    fn linear(&self, d_input: usize, d_output: usize) -> LinearConfig {
        LinearConfig::new(d_input, d_output).with_initializer(Initializer::Normal {
            mean: 0.0,
            std: self.init_std,
        })
    }
}

impl<B: Backend> DigitClassifier<B> for Mlp<B> {
    fn forward(&self, images: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = self.activation.forward(self.hidden1.forward(images));
        let x = self.activation.forward(self.hidden2.forward(x));

        self.output.forward(x)
    }
}

impl<B: Backend> DigitClassifier<B> for MlpStack<B> {
    fn forward(&self, images: Tensor<B, 2>) -> Tensor<B, 2> {
        let last = self.layers.len() - 1;
        let mut x = images;

        for (i, layer) in self.layers.iter().enumerate() {
            x = layer.forward(x);
            // The output layer produces raw scores, no activation.
            if i < last {
                x = self.activation.forward(x);
            }
        }

        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::tensor::Distribution;

    type TestBackend = NdArray;

    #[test]
    fn outputs_one_score_per_class() {
        let device = Default::default();
        let model: Mlp<TestBackend> = MlpConfig::new().init(&device);
        let images = Tensor::zeros([5, NUM_INPUTS], &device);

        assert_eq!(model.forward(images).dims(), [5, NUM_CLASSES]);
    }

    #[test]
    fn stacked_flavor_matches_the_handwritten_shape() {
        let device = Default::default();
        let config = MlpConfig::new();
        let handwritten: Mlp<TestBackend> = config.init(&device);
        let stacked: MlpStack<TestBackend> = config.init_stacked(&device);
        let images =
            Tensor::<TestBackend, 2>::random([3, NUM_INPUTS], Distribution::Default, &device);

        assert_eq!(
            handwritten.forward(images.clone()).dims(),
            stacked.forward(images).dims()
        );
    }

    #[test]
    fn both_flavors_share_the_parameter_count() {
        let device = Default::default();
        let config = MlpConfig::new();
        let handwritten: Mlp<TestBackend> = config.init(&device);
        let stacked: MlpStack<TestBackend> = config.init_stacked(&device);

        assert_eq!(handwritten.num_params(), stacked.num_params());
    }

    #[test]
    fn stack_holds_one_linear_per_affine_transform() {
        let device = Default::default();
        let stacked: MlpStack<TestBackend> = MlpConfig::new().init_stacked(&device);

        assert_eq!(stacked.layers.len(), 3);
    }

    #[test]
    fn seeded_init_is_reproducible() {
        let device = Default::default();
        let images =
            Tensor::<TestBackend, 2>::random([2, NUM_INPUTS], Distribution::Default, &device);

        <TestBackend as Backend>::seed(42);
        let first: Mlp<TestBackend> = MlpConfig::new().init(&device);
        <TestBackend as Backend>::seed(42);
        let second: Mlp<TestBackend> = MlpConfig::new().init(&device);

        assert_eq!(
            first.forward(images.clone()).into_data(),
            second.forward(images).into_data()
        );
    }
}
