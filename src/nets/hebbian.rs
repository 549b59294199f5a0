use super::layer_of;
use crate::error::Result;
use crate::learning::InstarLearning;
use crate::learning::OutstarLearning;
use crate::learning::SupervisedHebbianLearning;
use crate::learning::UnsupervisedHebbianLearning;
use crate::network::NetworkType;
use crate::network::NeuralNetwork;
use crate::neuron::NeuronSpec;
use crate::transfer::Transfer;

fn two_layers(
    network_type: NetworkType,
    inputs: usize,
    input_spec: &NeuronSpec,
    outputs: usize,
    output_spec: &NeuronSpec,
) -> Result<NeuralNetwork> {
    let mut network = NeuralNetwork::new(network_type);
    let input_layer = layer_of(&mut network, inputs, input_spec)?;
    let output_layer = layer_of(&mut network, outputs, output_spec)?;
    network.full_connect(input_layer, output_layer)?;
    network.set_default_io();
    Ok(network)
}

/// Ramp units clipped to `[-1, 1]` trained with supervised Hebbian
/// learning.
pub fn supervised_hebbian(inputs: usize, outputs: usize) -> Result<NeuralNetwork> {
    let spec = NeuronSpec::new(Transfer::Ramp {
        slope: 1.0,
        x_low: -1.0,
        x_high: 1.0,
        y_low: -1.0,
        y_high: 1.0,
    });
    let mut network = two_layers(NetworkType::SupervisedHebbian, inputs, &spec, outputs, &spec)?;
    network.set_learning_rule(Box::new(SupervisedHebbianLearning::new()));
    Ok(network)
}

pub fn unsupervised_hebbian(inputs: usize, outputs: usize) -> Result<NeuralNetwork> {
    let spec = NeuronSpec::new(Transfer::linear());
    let mut network = two_layers(NetworkType::UnsupervisedHebbian, inputs, &spec, outputs, &spec)?;
    network.set_learning_rule(Box::new(UnsupervisedHebbianLearning::new()));
    Ok(network)
}

/// Step inputs converging on one step output that learns to recognise a
/// pattern.
pub fn instar(inputs: usize) -> Result<NeuralNetwork> {
    let spec = NeuronSpec::new(Transfer::step());
    let mut network = two_layers(NetworkType::Instar, inputs, &spec, 1, &spec)?;
    network.set_learning_rule(Box::new(InstarLearning::new()));
    Ok(network)
}

/// One step input fanning out to ramp outputs that learn to reproduce a
/// pattern.
pub fn outstar(outputs: usize) -> Result<NeuralNetwork> {
    let input_spec = NeuronSpec::new(Transfer::step());
    let output_spec = NeuronSpec::new(Transfer::ramp());
    let mut network = two_layers(NetworkType::Outstar, 1, &input_spec, outputs, &output_spec)?;
    network.set_learning_rule(Box::new(OutstarLearning::new()));
    Ok(network)
}
