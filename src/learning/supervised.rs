use std::sync::Arc;

use tracing::debug;

use crate::error::NeuralError;
use crate::error::Result;
use crate::learning::Iteration;
use crate::learning::LearningProgress;
use crate::network::NeuralNetwork;
use crate::neuron::NeuronId;
use crate::training::TrainingElement;
use crate::training::TrainingSet;
use crate::transfer::TransferFunction;

/// Total error below which supervised training stops by default.
pub const DEFAULT_MAX_ERROR: f64 = 0.01;

/// Error bookkeeping shared by supervised rules.
pub struct SupervisedState {
    pub iteration: Iteration,
    total_network_error: f64,
    previous_epoch_error: f64,
    max_error: f64,
    min_error_change: f64,
    min_error_change_iterations_limit: usize,
    min_error_change_iterations_count: usize,
}

impl SupervisedState {
    pub fn new(learning_rate: f64) -> Self {
        Self {
            iteration: Iteration::new(learning_rate),
            total_network_error: 0.0,
            previous_epoch_error: 0.0,
            max_error: DEFAULT_MAX_ERROR,
            min_error_change: f64::INFINITY,
            min_error_change_iterations_limit: usize::MAX,
            min_error_change_iterations_count: 0,
        }
    }

    pub fn total_network_error(&self) -> f64 {
        self.total_network_error
    }

    pub(crate) fn set_total_network_error(&mut self, error: f64) {
        self.total_network_error = error;
    }

    pub fn previous_epoch_error(&self) -> f64 {
        self.previous_epoch_error
    }

    pub fn max_error(&self) -> f64 {
        self.max_error
    }

    pub fn set_max_error(&mut self, max_error: f64) {
        self.max_error = max_error;
    }

    pub fn min_error_change(&self) -> f64 {
        self.min_error_change
    }

    /// Stops training once the epoch error changes by at most `change` for
    /// `iterations` consecutive epochs.
    pub fn set_stall_limit(&mut self, change: f64, iterations: usize) {
        self.min_error_change = change;
        self.min_error_change_iterations_limit = iterations;
    }

    pub fn min_error_change_iterations_limit(&self) -> usize {
        self.min_error_change_iterations_limit
    }

    pub fn min_error_change_iterations_count(&self) -> usize {
        self.min_error_change_iterations_count
    }

    pub(crate) fn reset(&mut self) {
        self.iteration.set_current(0);
        self.total_network_error = 0.0;
        self.previous_epoch_error = 0.0;
        self.min_error_change_iterations_count = 0;
    }

    fn begin_epoch(&mut self) {
        self.previous_epoch_error = self.total_network_error;
        self.total_network_error = 0.0;
    }

    fn has_reached_stop_condition(&mut self) -> bool {
        if self.total_network_error < self.max_error {
            debug!(error = self.total_network_error, "max error reached");
            return true;
        }
        if self.error_change_stalled() {
            debug!(error = self.total_network_error, "error change stalled");
            return true;
        }
        false
    }

    fn error_change_stalled(&mut self) -> bool {
        let change = (self.previous_epoch_error - self.total_network_error).abs();
        if change <= self.min_error_change {
            self.min_error_change_iterations_count += 1;
        } else {
            self.min_error_change_iterations_count = 0;
        }
        self.min_error_change_iterations_count >= self.min_error_change_iterations_limit
    }

    pub(crate) fn progress(&self) -> LearningProgress {
        LearningProgress {
            iteration: self.iteration.current(),
            learning_rate: self.iteration.learning_rate,
            total_network_error: Some(self.total_network_error),
            previous_epoch_error: Some(self.previous_epoch_error),
        }
    }
}

/// A rule that learns from input/desired-output pairs.
pub trait SupervisedLearning: Send {
    fn supervised(&self) -> &SupervisedState;

    fn supervised_mut(&mut self) -> &mut SupervisedState;

    /// Adjusts weights for one pattern given its output error
    /// (`desired - actual`) and the desired output itself.
    fn update_network_weights(
        &mut self,
        network: &mut NeuralNetwork,
        pattern_error: &[f64],
        desired: &[f64],
    ) -> Result<()>;

    /// Feeds one training element forward and learns from the error.
    fn learn_pattern(
        &mut self,
        network: &mut NeuralNetwork,
        element: &TrainingElement,
        index: usize,
    ) -> Result<()> {
        let desired = element
            .desired_output()
            .ok_or(NeuralError::MissingDesiredOutput { index })?;
        network.set_input(element.input())?;
        network.calculate();
        let error = pattern_error(&network.output(), desired)?;
        self.update_total_network_error(&error);
        self.update_network_weights(network, &error, desired)
    }

    /// Accumulates the least-mean-squares share of one pattern:
    /// `sum(e^2) / (2 * n)`.
    fn update_total_network_error(&mut self, pattern_error: &[f64]) {
        let sum: f64 = pattern_error.iter().map(|e| e * e).sum();
        let state = self.supervised_mut();
        let error = state.total_network_error() + sum / (2.0 * pattern_error.len() as f64);
        state.set_total_network_error(error);
    }

    /// Runs after the stop check of every epoch.
    fn after_epoch(&mut self) {}
}

/// `desired - actual`, element-wise.
pub(crate) fn pattern_error(output: &[f64], desired: &[f64]) -> Result<Vec<f64>> {
    if output.len() != desired.len() {
        return Err(NeuralError::VectorSizeMismatch {
            expected: output.len(),
            actual: desired.len(),
        });
    }
    Ok(desired.iter().zip(output).map(|(d, o)| d - o).collect())
}

pub(crate) fn supervised_epoch<R>(
    rule: &mut R,
    network: &mut NeuralNetwork,
    training_set: &TrainingSet,
) -> Result<()>
where
    R: SupervisedLearning + ?Sized,
{
    let state = rule.supervised_mut();
    state.begin_epoch();
    let control = Arc::clone(&state.iteration.control);

    for (index, element) in training_set.iter().enumerate() {
        if control.is_stopped() {
            break;
        }
        rule.learn_pattern(network, element, index)?;
    }

    if rule.supervised_mut().has_reached_stop_condition() {
        control.stop();
    }
    rule.after_epoch();
    Ok(())
}

/// Implements [`IterativeLearning`](crate::learning::IterativeLearning) and
/// [`LearningRule`](crate::learning::LearningRule) for a supervised rule.
macro_rules! supervised_rule {
    ($rule:ty, $name:literal) => {
        impl $crate::learning::IterativeLearning for $rule {
            fn iteration(&self) -> &$crate::learning::Iteration {
                &$crate::learning::SupervisedLearning::supervised(self).iteration
            }

            fn iteration_mut(&mut self) -> &mut $crate::learning::Iteration {
                &mut $crate::learning::SupervisedLearning::supervised_mut(self).iteration
            }

            fn do_learning_epoch(
                &mut self,
                network: &mut $crate::network::NeuralNetwork,
                training_set: &$crate::training::TrainingSet,
            ) -> $crate::error::Result<()> {
                $crate::learning::supervised::supervised_epoch(self, network, training_set)
            }

            fn reset(&mut self) {
                $crate::learning::SupervisedLearning::supervised_mut(self).reset();
            }

            fn set_max_error(&mut self, max_error: f64) {
                $crate::learning::SupervisedLearning::supervised_mut(self).set_max_error(max_error);
            }

            fn progress(&self) -> $crate::learning::LearningProgress {
                $crate::learning::SupervisedLearning::supervised(self).progress()
            }
        }

        iterative_rule!($rule, $name);
    };
}

/// `w += lr * error * input` for every input weight of the neuron.
pub(crate) fn lms_update(network: &mut NeuralNetwork, neuron: NeuronId, learning_rate: f64) {
    let error = network.neurons[neuron.0].error;
    network.update_input_weights(neuron, |input, weight| {
        weight.inc(learning_rate * error * input);
    });
}

/// LMS update followed by `thresh -= lr * error`.
pub(crate) fn threshold_update(
    network: &mut NeuralNetwork,
    neuron: NeuronId,
    learning_rate: f64,
) -> Result<()> {
    lms_update(network, neuron, learning_rate);
    let target = &mut network.neurons[neuron.0];
    let thresh = target.thresh().ok_or_else(|| missing_threshold(neuron))?;
    let error = target.error;
    target.set_thresh(thresh - learning_rate * error);
    Ok(())
}

pub(crate) fn missing_threshold(neuron: NeuronId) -> NeuralError {
    NeuralError::Configuration(format!("neuron {} has no threshold", neuron.index()))
}

/// LMS update with a momentum term; connections with zero input are left
/// alone.
pub(crate) fn momentum_update(
    network: &mut NeuralNetwork,
    neuron: NeuronId,
    learning_rate: f64,
    momentum: f64,
) {
    let error = network.neurons[neuron.0].error;
    network.update_input_weights(neuron, |input, weight| {
        if input == 0.0 {
            return;
        }
        let current = weight.value();
        let delta = learning_rate * error * input + momentum * (current - weight.previous_value());
        weight.set_previous_value(current);
        weight.inc(delta);
    });
}

fn transfer_derivative(network: &NeuralNetwork, neuron: NeuronId) -> Result<f64> {
    let target = &network.neurons[neuron.0];
    target.transfer.derivative(target.net_input).ok_or_else(|| {
        NeuralError::Configuration(format!(
            "transfer function of neuron {} has no derivative",
            neuron.index()
        ))
    })
}

/// Sets `error = e * f'(net)` on every output neuron and applies `update`.
/// Outputs with zero error are skipped.
pub(crate) fn adjust_output_neurons(
    network: &mut NeuralNetwork,
    pattern_error: &[f64],
    mut update: impl FnMut(&mut NeuralNetwork, NeuronId),
) -> Result<()> {
    let outputs = network.output_neurons().to_vec();
    for (&neuron, &error) in outputs.iter().zip(pattern_error) {
        if error == 0.0 {
            network.neurons[neuron.0].error = 0.0;
            continue;
        }
        let derivative = transfer_derivative(network, neuron)?;
        network.neurons[neuron.0].error = error * derivative;
        update(network, neuron);
    }
    Ok(())
}

/// Back-propagates errors from the last hidden layer down to the first
/// and applies `update` to every hidden neuron.
pub(crate) fn adjust_hidden_layers(
    network: &mut NeuralNetwork,
    mut update: impl FnMut(&mut NeuralNetwork, NeuronId),
) -> Result<()> {
    let last_hidden = network.layer_count().saturating_sub(1);
    for layer in (1..last_hidden).rev() {
        for neuron in network.layers[layer].neurons.clone() {
            let delta_sum: f64 = network.neurons[neuron.0]
                .outputs
                .iter()
                .map(|&id| {
                    let connection = &network.connections[id.0];
                    network.neurons[connection.to_neuron().0].error * connection.weight().value()
                })
                .sum();
            let derivative = transfer_derivative(network, neuron)?;
            network.neurons[neuron.0].error = derivative * delta_sum;
            update(network, neuron);
        }
    }
    Ok(())
}
