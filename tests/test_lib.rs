use approx::assert_relative_eq;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use neurograph::learning::DynamicBackPropagation;
use neurograph::learning::MomentumBackpropagation;
use neurograph::nets;
use neurograph::nets::MlpConfig;
use neurograph::LearningRule;
use neurograph::NetworkType;
use neurograph::NeuralError;
use neurograph::NeuralNetwork;
use neurograph::NeuronKindSpec;
use neurograph::NeuronSpec;
use neurograph::TrainingSet;
use neurograph::Transfer;

const TD_SAMPLE: [[f64; 3]; 4] = [
    [0.0, 0.0, 0.0], // 0 ^ 0 = 0
    [0.0, 1.0, 1.0], // 0 ^ 1 = 1
    [1.0, 0.0, 1.0], // 1 ^ 0 = 1
    [1.0, 1.0, 0.0], // 1 ^ 1 = 0
];

fn xor_set() -> TrainingSet {
    let mut set = TrainingSet::with_sizes(2, 1);
    for [a, b, xor] in TD_SAMPLE {
        set.add_supervised(vec![a, b], vec![xor]).unwrap();
    }
    set
}

const XOR_SEED: u64 = 1;
const XOR_MAX_ERROR: f64 = 0.01;
const XOR_MAX_ITERATIONS: usize = 10_000;

/// Trains a 2-3-1 tanh perceptron from a fixed start and checks that it
/// stopped on the error goal rather than the epoch limit.
fn train_xor(rule: Box<dyn LearningRule>) -> NeuralNetwork {
    let mut network = MlpConfig::new([2, 3, 1])
        .with_transfer(Transfer::tanh())
        .build()
        .unwrap();
    network.randomize_weights(&mut ChaCha8Rng::seed_from_u64(XOR_SEED));
    network.set_learning_rule(rule);
    network
        .learn_to_error_within(&xor_set(), XOR_MAX_ERROR, XOR_MAX_ITERATIONS)
        .unwrap();

    let progress = network.learning_rule().unwrap().progress();
    println!("converged after {} epochs", progress.iteration);
    assert!(progress.iteration < XOR_MAX_ITERATIONS);
    assert!(progress.total_network_error.unwrap() < XOR_MAX_ERROR);
    network
}

fn assert_solves_xor(network: &mut NeuralNetwork) {
    for [a, b, xor] in TD_SAMPLE {
        network.set_input(&[a, b]).unwrap();
        network.calculate();
        let output = network.output()[0];

        println!("{a} ^ {b} = {output}");
        assert!((output - xor).abs() < 0.3, "{a} ^ {b} gave {output}");
    }
}

#[test]
fn test_xor() {
    let mut network = train_xor(Box::new(MomentumBackpropagation::new()));
    assert_solves_xor(&mut network);
}

#[test]
fn test_xor_dynamic() {
    let mut network = train_xor(Box::new(DynamicBackPropagation::new()));
    assert_solves_xor(&mut network);
}

#[test]
fn test_mlp_layout() {
    let network = MlpConfig::new([2, 3, 1]).build().unwrap();

    assert_eq!(network.network_type(), NetworkType::MultiLayerPerceptron);
    assert_eq!(network.layer_count(), 3);
    // bias neurons in every layer but the last
    assert_eq!(network.layer(0).unwrap().len(), 3);
    assert_eq!(network.layer(1).unwrap().len(), 4);
    assert_eq!(network.layer(2).unwrap().len(), 1);
    assert_eq!(network.input_neurons().len(), 2);
    assert_eq!(network.output_neurons().len(), 1);

    let bias = network.layer(1).unwrap().neuron_at(3).unwrap();
    assert!(network.neuron(bias).unwrap().is_bias());
    assert!(!network.neuron(bias).unwrap().has_input_connections());

    let output = network.output_neurons()[0];
    assert_eq!(network.neuron(output).unwrap().input_connections().len(), 4);
}

#[test]
fn test_mlp_direct_connections_skip_bias() {
    let mut network = MlpConfig::new([2, 2, 1]).build().unwrap();
    nets::connect_inputs_to_outputs(&mut network).unwrap();

    let output = network.output_neurons()[0];
    // 2 hidden + hidden bias + 2 direct inputs
    assert_eq!(network.neuron(output).unwrap().input_connections().len(), 5);
}

#[test]
fn test_mlp_needs_two_layers() {
    assert!(matches!(
        MlpConfig::new([3]).build(),
        Err(NeuralError::Configuration(_))
    ));
    assert!(matches!(
        MlpConfig::new([2, 0, 1]).build(),
        Err(NeuralError::Configuration(_))
    ));
}

#[test]
fn test_input_size_mismatch() {
    let mut network = nets::adaline(3).unwrap();
    assert_eq!(
        network.set_input(&[1.0, 2.0]),
        Err(NeuralError::VectorSizeMismatch { expected: 3, actual: 2 })
    );
}

#[test]
fn test_forward_pass() {
    let mut network = NeuralNetwork::new(NetworkType::Custom);
    let inputs = network.add_layer();
    let outputs = network.add_layer();
    network.add_neurons(inputs, 2, &NeuronSpec::default()).unwrap();
    network.add_neuron(outputs, &NeuronSpec::new(Transfer::sigmoid())).unwrap();
    network.full_connect_weighted(inputs, outputs, 0.5).unwrap();
    network.set_default_io();

    network.set_input(&[1.0, 1.0]).unwrap();
    network.calculate();
    assert_relative_eq!(network.output()[0], 1.0 / (1.0 + (-1.0f64).exp()), epsilon = 1e-12);

    network.reset();
    assert_eq!(network.output(), vec![0.0]);
}

#[test]
fn test_bias_neurons_take_no_connections() {
    let mut network = NeuralNetwork::new(NetworkType::Custom);
    let layer = network.add_layer();
    let source = network.add_neuron(layer, &NeuronSpec::default()).unwrap();
    let bias = network.add_neuron(layer, &NeuronSpec::bias()).unwrap();

    assert!(matches!(network.connect(source, bias), Err(NeuralError::Configuration(_))));
    assert!(network.connect(bias, source).is_ok());

    network.calculate();
    assert_eq!(network.neuron(bias).unwrap().output(), 1.0);
}

#[test]
fn test_remove_neuron_drops_its_connections() {
    let mut network = nets::adaline(2).unwrap();
    let first = network.input_neurons()[0];
    let output = network.output_neurons()[0];
    assert!(network.connection_between(first, output).is_some());

    network.remove_neuron(first).unwrap();

    assert!(network.connection_between(first, output).is_none());
    assert_eq!(network.input_neurons().len(), 1);
    assert_eq!(network.layer(0).unwrap().len(), 1);
    assert_eq!(network.weights(output).len(), 1);
}

#[test]
fn test_removed_neuron_handle_is_stale() {
    let mut network = nets::adaline(2).unwrap();
    let first = network.input_neurons()[0];
    let output = network.output_neurons()[0];
    network.remove_neuron(first).unwrap();

    assert!(network.neuron(first).is_none());
    assert_eq!(network.connect(first, output), Err(NeuralError::UnknownNeuron(first)));
    assert_eq!(network.connect(output, first), Err(NeuralError::UnknownNeuron(first)));
    assert_eq!(network.set_input_neurons(vec![first]), Err(NeuralError::UnknownNeuron(first)));
    assert_eq!(network.set_output_neurons(vec![first]), Err(NeuralError::UnknownNeuron(first)));
    assert_eq!(network.remove_neuron(first), Err(NeuralError::UnknownNeuron(first)));
}

#[test]
fn test_foreign_handles_are_rejected() {
    let mut small = nets::adaline(1).unwrap();
    let large = nets::adaline(5).unwrap();
    let foreign = *large.input_neurons().last().unwrap();
    let foreign_output = large.output_neurons()[0];
    let foreign_connection = large.connection_between(foreign, foreign_output).unwrap();
    let output = small.output_neurons()[0];

    assert!(small.neuron(foreign).is_none());
    assert!(small.weights(foreign).is_empty());
    assert!(small.connection(foreign_connection).is_none());
    assert_eq!(small.connect(foreign, output), Err(NeuralError::UnknownNeuron(foreign)));
    assert_eq!(small.disconnect(foreign, output), Err(NeuralError::UnknownNeuron(foreign)));
}

#[test]
fn test_disconnect_frees_the_connection() {
    let mut network = nets::adaline(2).unwrap();
    let [first, second] = [network.input_neurons()[0], network.input_neurons()[1]];
    let output = network.output_neurons()[0];
    let id = network.connection_between(first, output).unwrap();

    assert_eq!(network.disconnect(first, output), Ok(true));
    assert_eq!(network.disconnect(first, output), Ok(false));
    assert!(network.connection(id).is_none());
    assert_eq!(network.weights(output).len(), 1);

    // the freed slot is reused by the next connection
    let reused = network.connect_weighted(first, output, 0.3).unwrap();
    assert_eq!(reused, id);
    assert_eq!(network.connection(reused).unwrap().from_neuron(), first);
    assert!(network.connection_between(second, output).is_some());

    network.remove_neuron(second).unwrap();
    assert_eq!(network.disconnect(second, output), Err(NeuralError::UnknownNeuron(second)));
}

#[test]
fn test_remove_layer() {
    let mut network = MlpConfig::new([2, 3, 1]).build().unwrap();
    let id = network.layer(2).unwrap().id();
    network.remove_layer(1).unwrap();

    assert_eq!(network.layer_count(), 2);
    assert_eq!(network.index_of_layer(id), Some(1));
    let output = network.output_neurons()[0];
    assert!(!network.neuron(output).unwrap().has_input_connections());
    assert_eq!(network.remove_layer(5), Err(NeuralError::UnknownLayer(5)));
}

#[test]
fn test_delayed_connection_reads_history() {
    let mut network = NeuralNetwork::new(NetworkType::Custom);
    let layer = network.add_layer();
    let source = network
        .add_neuron(layer, &NeuronSpec::default().with_kind(NeuronKindSpec::Delayed))
        .unwrap();
    let target_layer = network.add_layer();
    let target = network.add_neuron(target_layer, &NeuronSpec::default()).unwrap();
    network.connect_delayed(source, target, 1.0, 1).unwrap();
    network.set_input_neurons(vec![source]).unwrap();
    network.set_output_neurons(vec![target]).unwrap();

    network.set_input(&[2.0]).unwrap();
    network.calculate();
    // nothing was output one step ago
    assert_eq!(network.output(), vec![0.0]);

    network.set_input(&[3.0]).unwrap();
    network.calculate();
    assert_eq!(network.output(), vec![2.0]);
}

#[test]
fn test_weight_initialization() {
    let mut network = MlpConfig::new([4, 5, 2]).build().unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    network.initialize_weights_in(-0.1, 0.1, &mut rng);
    for layer in network.layers() {
        for &neuron in layer.neurons() {
            assert!(network.weights(neuron).iter().all(|w| (-0.1..0.1).contains(w)));
        }
    }

    network.initialize_weights(0.25);
    let output = network.output_neurons()[0];
    assert!(network.weights(output).iter().all(|&w| w == 0.25));
}

#[test]
fn test_seeded_randomization_is_reproducible() {
    let mut first = MlpConfig::new([2, 3, 1]).build().unwrap();
    let mut second = MlpConfig::new([2, 3, 1]).build().unwrap();
    first.randomize_weights(&mut ChaCha8Rng::seed_from_u64(42));
    second.randomize_weights(&mut ChaCha8Rng::seed_from_u64(42));

    let output = first.output_neurons()[0];
    assert_eq!(first.weights(output), second.weights(output));
    assert!(first.weights(output).iter().all(|w| (-0.5..0.5).contains(w)));
}

#[test]
fn test_persistence_round_trip() {
    let mut network = MlpConfig::new([2, 3, 1]).build().unwrap();
    network.randomize_weights(&mut ChaCha8Rng::seed_from_u64(3));

    let json = serde_json::to_string(&network).unwrap();
    let mut restored: NeuralNetwork = serde_json::from_str(&json).unwrap();

    assert!(restored.learning_rule().is_none());
    assert_eq!(restored.network_type(), NetworkType::MultiLayerPerceptron);
    for [a, b, _] in TD_SAMPLE {
        network.set_input(&[a, b]).unwrap();
        network.calculate();
        restored.set_input(&[a, b]).unwrap();
        restored.calculate();
        assert_relative_eq!(network.output()[0], restored.output()[0], epsilon = 1e-12);
    }

    let output = restored.output_neurons()[0];
    let connection = restored.neuron(output).unwrap().input_connections()[0];
    let weight = restored.connection(connection).unwrap().weight();
    assert_eq!(weight.previous_value(), weight.value());
}
