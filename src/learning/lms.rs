use crate::error::Result;
use crate::learning::supervised::adjust_output_neurons;
use crate::learning::supervised::lms_update;
use crate::learning::supervised::missing_threshold;
use crate::learning::supervised::threshold_update;
use crate::learning::SupervisedLearning;
use crate::learning::SupervisedState;
use crate::learning::DEFAULT_LEARNING_RATE;
use crate::network::NeuralNetwork;

/// Added to the threshold distance in the binary delta rule so a neuron
/// sitting exactly on its threshold still learns.
pub const DEFAULT_ERROR_CORRECTION: f64 = 0.1;

/// Least mean squares (Widrow-Hoff): every output neuron takes its output
/// error as neuron error and moves each input weight by
/// `lr * error * input`.
pub struct Lms {
    state: SupervisedState,
}

impl Lms {
    pub fn new() -> Self {
        Self {
            state: SupervisedState::new(DEFAULT_LEARNING_RATE),
        }
    }
}

impl Default for Lms {
    fn default() -> Self {
        Self::new()
    }
}

impl SupervisedLearning for Lms {
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
        let outputs = network.output_neurons().to_vec();
        for (&neuron, &error) in outputs.iter().zip(pattern_error) {
            network.neurons[neuron.0].error = error;
            lms_update(network, neuron, learning_rate);
        }
        Ok(())
    }
}

supervised_rule!(Lms, "lms");

/// Perceptron rule: LMS on the weights plus `thresh -= lr * error` on each
/// output neuron's threshold.
pub struct PerceptronLearning {
    state: SupervisedState,
}

impl PerceptronLearning {
    pub fn new() -> Self {
        Self {
            state: SupervisedState::new(DEFAULT_LEARNING_RATE),
        }
    }
}

impl Default for PerceptronLearning {
    fn default() -> Self {
        Self::new()
    }
}

impl SupervisedLearning for PerceptronLearning {
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
        let outputs = network.output_neurons().to_vec();
        for (&neuron, &error) in outputs.iter().zip(pattern_error) {
            network.neurons[neuron.0].error = error;
            threshold_update(network, neuron, learning_rate)?;
        }
        Ok(())
    }
}

supervised_rule!(PerceptronLearning, "perceptron");

/// Perceptron variant for step outputs: the neuron error is scaled by the
/// distance between net input and threshold, so the update stays useful
/// when the output is saturated.
pub struct BinaryDeltaRule {
    state: SupervisedState,
    pub error_correction: f64,
}

impl BinaryDeltaRule {
    pub fn new() -> Self {
        Self {
            state: SupervisedState::new(DEFAULT_LEARNING_RATE),
            error_correction: DEFAULT_ERROR_CORRECTION,
        }
    }
}

impl Default for BinaryDeltaRule {
    fn default() -> Self {
        Self::new()
    }
}

impl SupervisedLearning for BinaryDeltaRule {
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
        let outputs = network.output_neurons().to_vec();
        for (&neuron, &output_error) in outputs.iter().zip(pattern_error) {
            let target = &mut network.neurons[neuron.0];
            let thresh = target.thresh().ok_or_else(|| missing_threshold(neuron))?;
            let thresh_error = thresh - target.net_input;
            target.error = output_error * (thresh_error.abs() + self.error_correction);
            threshold_update(network, neuron, learning_rate)?;
        }
        Ok(())
    }
}

supervised_rule!(BinaryDeltaRule, "binary_delta");

/// Delta rule for differentiable outputs: `error = e * f'(net)`, then LMS.
pub struct SigmoidDeltaRule {
    state: SupervisedState,
}

impl SigmoidDeltaRule {
    pub fn new() -> Self {
        Self {
            state: SupervisedState::new(DEFAULT_LEARNING_RATE),
        }
    }
}

impl Default for SigmoidDeltaRule {
    fn default() -> Self {
        Self::new()
    }
}

impl SupervisedLearning for SigmoidDeltaRule {
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
        adjust_output_neurons(network, pattern_error, |network, neuron| {
            lms_update(network, neuron, learning_rate);
        })
    }
}

supervised_rule!(SigmoidDeltaRule, "sigmoid_delta");

/// Supervised Hebbian learning: each output neuron's input weights move
/// by `lr * input * desired`.
pub struct SupervisedHebbianLearning {
    state: SupervisedState,
}

impl SupervisedHebbianLearning {
    pub fn new() -> Self {
        Self {
            state: SupervisedState::new(DEFAULT_LEARNING_RATE),
        }
    }
}

impl Default for SupervisedHebbianLearning {
    fn default() -> Self {
        Self::new()
    }
}

impl SupervisedLearning for SupervisedHebbianLearning {
    fn supervised(&self) -> &SupervisedState {
        &self.state
    }

    fn supervised_mut(&mut self) -> &mut SupervisedState {
        &mut self.state
    }

    fn update_network_weights(
        &mut self,
        network: &mut NeuralNetwork,
        _pattern_error: &[f64],
        desired: &[f64],
    ) -> Result<()> {
        let learning_rate = self.state.iteration.learning_rate;
        let outputs = network.output_neurons().to_vec();
        for (&neuron, &desired) in outputs.iter().zip(desired) {
            network.update_input_weights(neuron, |input, weight| {
                weight.inc(learning_rate * input * desired);
            });
        }
        Ok(())
    }
}

supervised_rule!(SupervisedHebbianLearning, "supervised_hebbian");
