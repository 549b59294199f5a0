//! Ready-made network topologies, each wired the classic way and shipped
//! with its usual learning rule attached.

mod associative;
mod competitive;
mod feedforward;
mod hebbian;

pub use associative::bam;
pub use associative::hopfield;
pub use associative::store_patterns;
pub use competitive::competitive_network;
pub use competitive::kohonen;
pub use competitive::max_net;
pub use feedforward::adaline;
pub use feedforward::connect_inputs_to_outputs;
pub use feedforward::multi_layer_perceptron;
pub use feedforward::perceptron;
pub use feedforward::perceptron_with;
pub use feedforward::rbf_network;
pub use feedforward::MlpConfig;
pub use hebbian::instar;
pub use hebbian::outstar;
pub use hebbian::supervised_hebbian;
pub use hebbian::unsupervised_hebbian;

use crate::error::NeuralError;
use crate::error::Result;
use crate::network::NeuralNetwork;
use crate::neuron::NeuronSpec;

/// Appends a layer of `count` identical neurons.
fn layer_of(network: &mut NeuralNetwork, count: usize, spec: &NeuronSpec) -> Result<usize> {
    if count == 0 {
        return Err(NeuralError::Configuration("layers need at least one neuron".into()));
    }
    let layer = network.add_layer();
    network.add_neurons(layer, count, spec)?;
    Ok(layer)
}
