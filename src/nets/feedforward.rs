use serde::Deserialize;
use serde::Serialize;

use super::layer_of;
use crate::error::NeuralError;
use crate::error::Result;
use crate::input::InputFunction;
use crate::input::SummingFunction;
use crate::input::WeightsFunction;
use crate::learning::BinaryDeltaRule;
use crate::learning::Lms;
use crate::learning::MomentumBackpropagation;
use crate::network::NetworkType;
use crate::network::NeuralNetwork;
use crate::neuron::NeuronKindSpec;
use crate::neuron::NeuronSpec;
use crate::transfer::Transfer;

/// Linear inputs fully connected to a single linear output, trained with
/// LMS.
pub fn adaline(inputs: usize) -> Result<NeuralNetwork> {
    let mut network = NeuralNetwork::new(NetworkType::Adaline);
    let spec = NeuronSpec::default();
    let input_layer = layer_of(&mut network, inputs, &spec)?;
    let output_layer = layer_of(&mut network, 1, &spec)?;
    network.full_connect(input_layer, output_layer)?;
    network.set_default_io();
    network.set_learning_rule(Box::new(Lms::new()));
    Ok(network)
}

/// Single layer of step threshold units trained with the binary delta rule.
pub fn perceptron(inputs: usize, outputs: usize) -> Result<NeuralNetwork> {
    perceptron_with(inputs, outputs, Transfer::step())
}

/// Perceptron with a custom output transfer function. Thresholds start at
/// random values in `[0, 1)`.
pub fn perceptron_with(inputs: usize, outputs: usize, transfer: Transfer) -> Result<NeuralNetwork> {
    let mut network = NeuralNetwork::new(NetworkType::Perceptron);
    let input_layer = layer_of(&mut network, inputs, &NeuronSpec::new(Transfer::linear()))?;
    let output_spec =
        NeuronSpec::new(transfer).with_kind(NeuronKindSpec::Threshold { thresh: None });
    let output_layer = layer_of(&mut network, outputs, &output_spec)?;
    network.full_connect(input_layer, output_layer)?;
    network.set_default_io();
    network.set_learning_rule(Box::new(BinaryDeltaRule::new()));
    Ok(network)
}

/// Shape of a multi-layer perceptron.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlpConfig {
    /// Neuron count per layer, input layer first.
    pub layers: Vec<usize>,
    /// Transfer function of every non-input neuron.
    pub transfer: Transfer,
    /// Adds a bias neuron to every layer except the output layer.
    pub use_bias: bool,
}

impl MlpConfig {
    pub fn new(layers: impl Into<Vec<usize>>) -> Self {
        Self {
            layers: layers.into(),
            transfer: Transfer::sigmoid(),
            use_bias: true,
        }
    }

    pub fn with_transfer(mut self, transfer: Transfer) -> Self {
        self.transfer = transfer;
        self
    }

    pub fn with_bias(mut self, use_bias: bool) -> Self {
        self.use_bias = use_bias;
        self
    }

    pub fn build(&self) -> Result<NeuralNetwork> {
        multi_layer_perceptron(self)
    }
}

/// Fully connected layered network trained with momentum back-propagation.
pub fn multi_layer_perceptron(config: &MlpConfig) -> Result<NeuralNetwork> {
    if config.layers.len() < 2 {
        return Err(NeuralError::Configuration(
            "a multi-layer perceptron needs an input and an output layer".into(),
        ));
    }

    let mut network = NeuralNetwork::new(NetworkType::MultiLayerPerceptron);
    let last = config.layers.len() - 1;
    let input_spec = NeuronSpec::new(Transfer::linear());
    let spec = NeuronSpec::new(config.transfer).with_input(InputFunction::WeightedSum);

    for (index, &count) in config.layers.iter().enumerate() {
        let layer = layer_of(&mut network, count, if index == 0 { &input_spec } else { &spec })?;
        if config.use_bias && index < last {
            network.add_neuron(layer, &NeuronSpec::bias())?;
        }
        if index > 0 {
            network.full_connect(layer - 1, layer)?;
        }
    }

    network.set_default_io();
    network.set_learning_rule(Box::new(MomentumBackpropagation::new()));
    Ok(network)
}

/// Adds direct connections from every input neuron to every output neuron,
/// leaving out bias neurons.
pub fn connect_inputs_to_outputs(network: &mut NeuralNetwork) -> Result<()> {
    let last = network
        .layer_count()
        .checked_sub(1)
        .ok_or(NeuralError::UnknownLayer(0))?;
    network.full_connect_without_bias(0, last)
}

/// Radial basis function network: Gaussian units measuring the distance
/// between input and weight vectors, followed by a linear output layer.
pub fn rbf_network(inputs: usize, rbf_units: usize, outputs: usize) -> Result<NeuralNetwork> {
    let mut network = NeuralNetwork::new(NetworkType::RbfNetwork);
    let linear = NeuronSpec::new(Transfer::linear());
    let rbf_spec = NeuronSpec::new(Transfer::gaussian())
        .with_input(InputFunction::composite(
            WeightsFunction::Difference,
            SummingFunction::Intensity,
        ));

    let input_layer = layer_of(&mut network, inputs, &linear)?;
    let rbf_layer = layer_of(&mut network, rbf_units, &rbf_spec)?;
    let output_layer = layer_of(&mut network, outputs, &linear)?;
    network.full_connect(input_layer, rbf_layer)?;
    network.full_connect(rbf_layer, output_layer)?;
    network.set_default_io();
    network.set_learning_rule(Box::new(Lms::new()));
    Ok(network)
}
