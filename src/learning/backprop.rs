use crate::error::NeuralError;
use crate::error::Result;
use crate::learning::supervised::adjust_hidden_layers;
use crate::learning::supervised::adjust_output_neurons;
use crate::learning::supervised::lms_update;
use crate::learning::supervised::momentum_update;
use crate::learning::SupervisedLearning;
use crate::learning::SupervisedState;
use crate::learning::DEFAULT_LEARNING_RATE;
use crate::network::NeuralNetwork;

pub const DEFAULT_MOMENTUM: f64 = 0.25;

/// Standard error back-propagation for layered feed-forward networks.
pub struct BackPropagation {
    state: SupervisedState,
}

impl BackPropagation {
    pub fn new() -> Self {
        Self {
            state: SupervisedState::new(DEFAULT_LEARNING_RATE),
        }
    }
}

impl Default for BackPropagation {
    fn default() -> Self {
        Self::new()
    }
}

impl SupervisedLearning for BackPropagation {
    fn supervised(&self) -> &SupervisedState {
        &self.state
    }

    fn supervised_mut(&mut self) -> &mut SupervisedState {
        &mut self.state
    }

    fn update_network_weights(
        &mut self,
        network: &mut NeuralNetwork,
        pattern_error: &[f64],
        _desired: &[f64],
    ) -> Result<()> {
        let learning_rate = self.state.iteration.learning_rate;
        let update =
            |network: &mut NeuralNetwork, neuron| lms_update(network, neuron, learning_rate);
        adjust_output_neurons(network, pattern_error, update)?;
        adjust_hidden_layers(network, update)
    }
}

supervised_rule!(BackPropagation, "back_propagation");

/// Back-propagation with a momentum term on every weight change.
pub struct MomentumBackpropagation {
    state: SupervisedState,
    pub momentum: f64,
}

impl MomentumBackpropagation {
    pub fn new() -> Self {
        Self {
            state: SupervisedState::new(DEFAULT_LEARNING_RATE),
            momentum: DEFAULT_MOMENTUM,
        }
    }

    pub fn with_momentum(mut self, momentum: f64) -> Self {
        self.momentum = momentum;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.state.iteration.learning_rate = learning_rate;
        self
    }
}

impl Default for MomentumBackpropagation {
    fn default() -> Self {
        Self::new()
    }
}

fn momentum_backpropagate(
    network: &mut NeuralNetwork,
    pattern_error: &[f64],
    learning_rate: f64,
    momentum: f64,
) -> Result<()> {
    let update = |network: &mut NeuralNetwork, neuron| {
        momentum_update(network, neuron, learning_rate, momentum)
    };
    adjust_output_neurons(network, pattern_error, update)?;
    adjust_hidden_layers(network, update)
}

impl SupervisedLearning for MomentumBackpropagation {
    fn supervised(&self) -> &SupervisedState {
        &self.state
    }

    fn supervised_mut(&mut self) -> &mut SupervisedState {
        &mut self.state
    }

    fn update_network_weights(
        &mut self,
        network: &mut NeuralNetwork,
        pattern_error: &[f64],
        _desired: &[f64],
    ) -> Result<()> {
        let learning_rate = self.state.iteration.learning_rate;
        momentum_backpropagate(network, pattern_error, learning_rate, self.momentum)
    }
}

supervised_rule!(MomentumBackpropagation, "momentum_backpropagation");

/// Bounds and step of a parameter adapted between epochs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adaptation {
    min: f64,
    max: f64,
    pub change: f64,
    pub enabled: bool,
}

impl Adaptation {
    pub fn new(min: f64, max: f64, change: f64) -> Result<Self> {
        if min > max {
            return Err(NeuralError::Configuration(format!(
                "adaptation bounds are inverted: min {min} > max {max}"
            )));
        }
        Ok(Self {
            min,
            max,
            change,
            enabled: true,
        })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Moves `value` by the error decrease scaled by `change`, clamped to
    /// the bounds.
    fn adapt(&self, value: f64, error_change: f64) -> f64 {
        num::clamp(value + error_change * self.change, self.min, self.max)
    }
}

impl Default for Adaptation {
    fn default() -> Self {
        Self {
            min: 0.1,
            max: 0.9,
            change: 0.99926,
            enabled: true,
        }
    }
}

/// Momentum back-propagation that grows learning rate and momentum while
/// the error falls and shrinks them while it rises.
pub struct DynamicBackPropagation {
    state: SupervisedState,
    pub momentum: f64,
    pub learning_rate_adaptation: Adaptation,
    pub momentum_adaptation: Adaptation,
}

impl DynamicBackPropagation {
    pub fn new() -> Self {
        Self {
            state: SupervisedState::new(DEFAULT_LEARNING_RATE),
            momentum: DEFAULT_MOMENTUM,
            learning_rate_adaptation: Adaptation::default(),
            momentum_adaptation: Adaptation::default(),
        }
    }
}

impl Default for DynamicBackPropagation {
    fn default() -> Self {
        Self::new()
    }
}

impl SupervisedLearning for DynamicBackPropagation {
    fn supervised(&self) -> &SupervisedState {
        &self.state
    }

    fn supervised_mut(&mut self) -> &mut SupervisedState {
        &mut self.state
    }

    fn update_network_weights(
        &mut self,
        network: &mut NeuralNetwork,
        pattern_error: &[f64],
        _desired: &[f64],
    ) -> Result<()> {
        let learning_rate = self.state.iteration.learning_rate;
        momentum_backpropagate(network, pattern_error, learning_rate, self.momentum)
    }

    fn after_epoch(&mut self) {
        if self.state.iteration.current() == 0 {
            return;
        }
        let error_change = self.state.previous_epoch_error() - self.state.total_network_error();
        if self.learning_rate_adaptation.enabled {
            let learning_rate = self.state.iteration.learning_rate;
            self.state.iteration.learning_rate =
                self.learning_rate_adaptation.adapt(learning_rate, error_change);
        }
        if self.momentum_adaptation.enabled {
            self.momentum = self.momentum_adaptation.adapt(self.momentum, error_change);
        }
    }
}

supervised_rule!(DynamicBackPropagation, "dynamic_back_propagation");
