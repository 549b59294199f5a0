//! Graph-based artificial neural networks.
//!
//! A [`NeuralNetwork`] owns its layers, neurons and connections. Neurons
//! combine weighted inputs through an [`InputFunction`], pass the result
//! through a [`Transfer`] function and feed it on. A [`LearningRule`]
//! attached to the network adjusts the weights from a [`TrainingSet`],
//! on the calling thread or in the background.
//!
//! ```no_run
//! use neurograph::nets::MlpConfig;
//! use neurograph::TrainingSet;
//!
//! # fn main() -> neurograph::Result<()> {
//! let mut network = MlpConfig::new([2, 3, 1]).build()?;
//! let mut set = TrainingSet::with_sizes(2, 1);
//! set.add_supervised(vec![0.0, 1.0], vec![1.0])?;
//! set.add_supervised(vec![1.0, 1.0], vec![0.0])?;
//! network.learn_to_error_within(&set, 0.01, 10_000)?;
//! network.set_input(&[0.0, 1.0])?;
//! network.calculate();
//! println!("{:?}", network.output());
//! # Ok(())
//! # }
//! ```

pub mod background;
pub mod connection;
pub mod error;
pub mod input;
pub mod layer;
pub mod learning;
pub mod nets;
pub mod network;
pub mod neuron;
pub mod random;
pub mod registry;
pub mod training;
pub mod transfer;
mod wiring;

pub use background::BackgroundLearning;
pub use connection::Connection;
pub use connection::ConnectionId;
pub use connection::Weight;
pub use error::NeuralError;
pub use error::Result;
pub use input::InputFunction;
pub use input::SummingFunction;
pub use input::WeightsFunction;
pub use layer::Layer;
pub use layer::LayerId;
pub use learning::LearningProgress;
pub use learning::LearningRule;
pub use network::NetworkType;
pub use network::NeuralNetwork;
pub use neuron::Neuron;
pub use neuron::NeuronId;
pub use neuron::NeuronKind;
pub use neuron::NeuronKindSpec;
pub use neuron::NeuronSpec;
pub use training::TrainingElement;
pub use training::TrainingSet;
pub use transfer::Transfer;
pub use transfer::TransferFunction;
