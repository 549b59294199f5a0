use thiserror::Error;

use crate::neuron::NeuronId;

/// Errors raised by network construction, execution and training.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NeuralError {
    /// A vector does not have the length the network or training set expects.
    #[error("vector size mismatch: expected {expected}, got {actual}")]
    VectorSizeMismatch { expected: usize, actual: usize },

    /// A supervised rule was handed a training element without a target.
    #[error("training element {index} has no desired output")]
    MissingDesiredOutput { index: usize },

    /// A registry lookup named a type that does not exist.
    #[error("unknown {kind} `{name}`")]
    UnknownType { kind: &'static str, name: String },

    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("neuron {0:?} does not belong to this network")]
    UnknownNeuron(NeuronId),

    #[error("layer {0} does not exist")]
    UnknownLayer(usize),

    #[error("learning is already running for this rule")]
    AlreadyRunning,

    #[error("no learning rule is attached to the network")]
    NoLearningRule,

    #[error("background learning thread panicked")]
    LearningThreadPanicked,
}

pub type Result<T> = std::result::Result<T, NeuralError>;
