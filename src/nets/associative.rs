use super::layer_of;
use crate::error::Result;
use crate::learning::BinaryHebbianLearning;
use crate::learning::HopfieldLearning;
use crate::network::NetworkType;
use crate::network::NeuralNetwork;
use crate::neuron::NeuronKindSpec;
use crate::neuron::NeuronSpec;
use crate::transfer::Transfer;

/// Initial weight of every lateral Hopfield connection.
pub const HOPFIELD_LATERAL_WEIGHT: f64 = 0.1;

fn bipolar_unit() -> NeuronSpec {
    NeuronSpec::new(Transfer::Step {
        y_high: 1.0,
        y_low: 0.0,
    })
    .with_kind(NeuronKindSpec::InputOutput { bias: 0.0 })
}

/// Single fully recurrent layer of step units, each both input and output.
///
/// The attached rule is binary Hebbian learning; patterns are usually
/// stored with [`HopfieldLearning`], which [`store_patterns`] attaches.
pub fn hopfield(neurons: usize) -> Result<NeuralNetwork> {
    let mut network = NeuralNetwork::new(NetworkType::Hopfield);
    let layer = layer_of(&mut network, neurons, &bipolar_unit())?;
    network.connect_lateral_weighted(layer, HOPFIELD_LATERAL_WEIGHT)?;
    network.set_default_io();
    network.set_learning_rule(Box::new(BinaryHebbianLearning::new()));
    Ok(network)
}

/// Replaces the attached rule with one-shot Hopfield pattern storage.
pub fn store_patterns(network: &mut NeuralNetwork) {
    network.set_learning_rule(Box::new(HopfieldLearning::new()));
}

/// Bidirectional associative memory: two layers of step units connected
/// both ways.
pub fn bam(inputs: usize, outputs: usize) -> Result<NeuralNetwork> {
    let mut network = NeuralNetwork::new(NetworkType::Bam);
    let input_layer = layer_of(&mut network, inputs, &bipolar_unit())?;
    let output_layer = layer_of(&mut network, outputs, &bipolar_unit())?;
    network.full_connect(input_layer, output_layer)?;
    network.full_connect(output_layer, input_layer)?;
    network.set_default_io();
    network.set_learning_rule(Box::new(BinaryHebbianLearning::new()));
    Ok(network)
}
