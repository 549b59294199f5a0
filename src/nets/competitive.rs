use super::layer_of;
use crate::error::NeuralError;
use crate::error::Result;
use crate::input::InputFunction;
use crate::input::SummingFunction;
use crate::input::WeightsFunction;
use crate::learning::CompetitiveLearning;
use crate::learning::KohonenLearning;
use crate::network::NetworkType;
use crate::network::NeuralNetwork;
use crate::neuron::NeuronKindSpec;
use crate::neuron::NeuronSpec;
use crate::transfer::Transfer;

/// Self-organising map: input layer fully connected to a map layer whose
/// cells output the negative distance between input and weight vector.
pub fn kohonen(inputs: usize, cells: usize) -> Result<NeuralNetwork> {
    let mut network = NeuralNetwork::new(NetworkType::Kohonen);
    let map_spec = NeuronSpec::new(Transfer::linear())
        .with_input(InputFunction::composite(
            WeightsFunction::Difference,
            SummingFunction::Intensity,
        ));

    let input_layer = layer_of(&mut network, inputs, &NeuronSpec::default())?;
    let map_layer = layer_of(&mut network, cells, &map_spec)?;
    network.full_connect(input_layer, map_layer)?;
    network.set_default_io();
    network.set_learning_rule(Box::new(KohonenLearning::new()));
    Ok(network)
}

/// Appends a winner-take-all layer of ramp units with `-1/n` lateral
/// inhibition delayed by one step.
fn competitive_layer(
    network: &mut NeuralNetwork,
    count: usize,
    input: InputFunction,
) -> Result<usize> {
    if count == 0 {
        return Err(NeuralError::Configuration("layers need at least one neuron".into()));
    }
    let spec = NeuronSpec::new(Transfer::ramp())
        .with_kind(NeuronKindSpec::Competitive)
        .with_input(input);
    let layer = network.add_competitive_layer();
    network.add_neurons(layer, count, &spec)?;
    network.connect_lateral_delayed(layer, -1.0 / count as f64, 1)?;
    Ok(layer)
}

/// Input layer fully connected to a competitive layer trained with
/// competitive learning.
pub fn competitive_network(inputs: usize, outputs: usize) -> Result<NeuralNetwork> {
    let mut network = NeuralNetwork::new(NetworkType::Competitive);
    let input_layer = layer_of(&mut network, inputs, &NeuronSpec::default())?;
    let weighted_sum =
        InputFunction::composite(WeightsFunction::WeightedInput, SummingFunction::Sum);
    let output_layer = competitive_layer(&mut network, outputs, weighted_sum)?;
    network.full_connect(input_layer, output_layer)?;
    network.set_default_io();
    network.set_learning_rule(Box::new(CompetitiveLearning::new()));
    Ok(network)
}

/// Winner-take-all selector: each input feeds its own competitive unit
/// with weight 1. No learning rule.
pub fn max_net(neurons: usize) -> Result<NeuralNetwork> {
    let mut network = NeuralNetwork::new(NetworkType::MaxNet);
    let input_layer = layer_of(&mut network, neurons, &NeuronSpec::default())?;
    let output_layer = competitive_layer(&mut network, neurons, InputFunction::WeightedSum)?;
    network.forward_connect(input_layer, output_layer, 1.0)?;
    network.set_default_io();
    Ok(network)
}
