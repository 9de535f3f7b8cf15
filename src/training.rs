use crate::{
    data::{MnistBatch, MnistBatcher},
    model::{DigitClassifier, MlpConfig},
};
use burn::{
    data::{
        dataloader::{DataLoader, DataLoaderBuilder},
        dataset::vision::MnistDataset,
    },
    module::AutodiffModule,
    nn::loss::CrossEntropyLoss,
    optim::{GradientsParams, Optimizer, SgdConfig},
    prelude::*,
    tensor::{ElementConversion, backend::AutodiffBackend},
};
use std::sync::Arc;

#[derive(Config)]
pub struct TrainingConfig {
    #[config(default = 10)]
    pub num_epochs: usize,
    #[config(default = 64)]
    pub batch_size: usize,
    #[config(default = 42)]
    pub seed: u64,
    #[config(default = 1e-2)]
    pub learning_rate: f64,
    pub optimizer: SgdConfig,
    pub model: MlpConfig,
}

/// Train an MLP on MNIST with the default configuration, reporting average
/// loss and train/test accuracy after every epoch.
pub fn run<B: AutodiffBackend>(device: B::Device) {
    let config = TrainingConfig::new(SgdConfig::new(), MlpConfig::new());
    B::seed(config.seed);

    // Build the hand-written flavor first, then train its stacked
    // equivalent, the same tour the two `MlpConfig` initializers offer.
    let handwritten = config.model.init::<B>(&device);
    let model = config.model.init_stacked::<B>(&device);
    log::info!(
        "hand-written mlp: {} parameters, stacked mlp: {} parameters",
        handwritten.num_params(),
        model.num_params()
    );

    let dataloader_train: Arc<dyn DataLoader<B, MnistBatch<B>>> =
        DataLoaderBuilder::new(MnistBatcher::default())
            .batch_size(config.batch_size)
            .shuffle(config.seed)
            .set_device(device.clone())
            .build(MnistDataset::train());

    // Unshuffled loaders for the per-epoch accuracy sweep, on the inner
    // backend since no gradients are needed there.
    let dataloader_train_eval: Arc<dyn DataLoader<B::InnerBackend, MnistBatch<B::InnerBackend>>> =
        DataLoaderBuilder::new(MnistBatcher::default())
            .batch_size(config.batch_size)
            .set_device(device.clone())
            .build(MnistDataset::train());
    let dataloader_test: Arc<dyn DataLoader<B::InnerBackend, MnistBatch<B::InnerBackend>>> =
        DataLoaderBuilder::new(MnistBatcher::default())
            .batch_size(config.batch_size)
            .set_device(device.clone())
            .build(MnistDataset::test());

    fit(
        model,
        &config,
        dataloader_train,
        dataloader_train_eval,
        dataloader_test,
    );
}

/// The manual training loop: per batch, forward, softmax cross-entropy,
/// backward, one SGD step; per epoch, an accuracy sweep over the full
/// training and test sets.
pub fn fit<B, M>(
    mut model: M,
    config: &TrainingConfig,
    dataloader_train: Arc<dyn DataLoader<B, MnistBatch<B>>>,
    dataloader_train_eval: Arc<dyn DataLoader<B::InnerBackend, MnistBatch<B::InnerBackend>>>,
    dataloader_test: Arc<dyn DataLoader<B::InnerBackend, MnistBatch<B::InnerBackend>>>,
) -> M
where
    B: AutodiffBackend,
    M: AutodiffModule<B> + DigitClassifier<B>,
    M::InnerModule: DigitClassifier<B::InnerBackend>,
{
    let mut optim = config.optimizer.init();

    for epoch in 1..config.num_epochs + 1 {
        let mut loss_sum = 0.0;
        let mut num_examples = 0;

        for (iteration, batch) in dataloader_train.iter().enumerate() {
            let [batch_size, _] = batch.images.dims();
            let output = model.forward(batch.images);
            let loss = CrossEntropyLoss::new(None, &output.device()).forward(output, batch.targets);

            // Gradients for the current backward pass, linked to each
            // parameter of the model.
            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(config.learning_rate, model, grads);

            let batch_loss: f64 = loss.into_scalar().elem();
            loss_sum += batch_loss * batch_size as f64;
            num_examples += batch_size;
            log::debug!("[Train - Epoch {epoch} - Iteration {iteration}] Loss {batch_loss:.4}");
        }

        // The accuracy sweeps run on the model without autodiff.
        let model_valid = model.valid();
        let train_accuracy = evaluate(&model_valid, dataloader_train_eval.as_ref());
        let test_accuracy = evaluate(&model_valid, dataloader_test.as_ref());

        println!(
            "[Epoch {epoch}/{}] Loss {:.4} | Train accuracy {:.2} % | Test accuracy {:.2} %",
            config.num_epochs,
            loss_sum / num_examples as f64,
            100.0 * train_accuracy,
            100.0 * test_accuracy,
        );
    }

    model
}

/// Fraction of the loader's examples the model classifies correctly.
fn evaluate<B, M>(model: &M, loader: &dyn DataLoader<B, MnistBatch<B>>) -> f64
where
    B: Backend,
    M: DigitClassifier<B>,
{
    let mut correct = 0;
    let mut total = 0;

    for batch in loader.iter() {
        let [batch_size, _] = batch.images.dims();
        correct += num_correct(model.forward(batch.images), batch.targets);
        total += batch_size;
    }

    correct as f64 / total as f64
}

/// How many argmax predictions match their targets.
fn num_correct<B: Backend>(output: Tensor<B, 2>, targets: Tensor<B, 1, Int>) -> i64 {
    let predictions = output.argmax(1).squeeze(1);

    predictions.equal(targets).int().sum().into_scalar().elem()
}
