use anyhow::Context;
use neurograph::learning::LearningProgress;
use neurograph::learning::MomentumBackpropagation;
use neurograph::nets::MlpConfig;
use neurograph::LearningRule;
use neurograph::TrainingSet;
use tracing::info;
use tracing_subscriber::EnvFilter;

const TD_SAMPLE: [[f64; 3]; 4] = [
    [0.0, 0.0, 0.0], // 0 ^ 0 = 0
    [0.0, 1.0, 1.0], // 0 ^ 1 = 1
    [1.0, 0.0, 1.0], // 1 ^ 0 = 1
    [1.0, 1.0, 0.0], // 1 ^ 1 = 0
];

const LEARN_RATE: f64 = 0.7;
const MAX_ERROR: f64 = 0.01;
const MAX_ITERATIONS: usize = 50_000;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut network = MlpConfig::new([2, 3, 1]).build().context("building network")?;
    let mut rule = MomentumBackpropagation::new().with_learning_rate(LEARN_RATE).with_momentum(0.7);
    rule.set_max_error(MAX_ERROR);
    rule.set_max_iterations(MAX_ITERATIONS);
    rule.add_observer(Box::new(|progress: &LearningProgress| {
        if progress.iteration % 1000 == 0 {
            info!(
                iteration = progress.iteration,
                error = ?progress.total_network_error,
                "training"
            );
        }
    }));
    network.set_learning_rule(Box::new(rule));

    let mut tdata = TrainingSet::with_sizes(2, 1);
    for [a, b, xor] in TD_SAMPLE {
        tdata.add_supervised(vec![a, b], vec![xor])?;
    }

    let training = network.learn_in_background(tdata);
    let (mut network, outcome) = training.join()?;
    outcome.context("training XOR")?;

    for [a, b, _] in TD_SAMPLE {
        network.set_input(&[a, b])?;
        network.calculate();
        println!("{a} ^ {b} = {}", network.output()[0]);
    }

    Ok(())
}
