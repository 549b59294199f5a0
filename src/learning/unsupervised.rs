use std::sync::Arc;

use tracing::debug;

use crate::error::NeuralError;
use crate::error::Result;
use crate::learning::Iteration;
use crate::learning::DEFAULT_LEARNING_RATE;
use crate::network::NeuralNetwork;
use crate::training::TrainingSet;

/// A rule that learns from inputs alone. Each pattern is fed forward and
/// then [`adjust_weights`](Self::adjust_weights) reads the resulting
/// activations.
pub trait UnsupervisedLearning: Send {
    fn unsupervised(&self) -> &Iteration;

    fn unsupervised_mut(&mut self) -> &mut Iteration;

    fn adjust_weights(&mut self, network: &mut NeuralNetwork) -> Result<()>;
}

/// One pass over the training set. Every unsupervised rule here learns in
/// a single epoch, so the run is stopped afterwards.
pub(crate) fn unsupervised_epoch<R>(
    rule: &mut R,
    network: &mut NeuralNetwork,
    training_set: &TrainingSet,
) -> Result<()>
where
    R: UnsupervisedLearning + ?Sized,
{
    let control = Arc::clone(&rule.unsupervised().control);
    for element in training_set {
        if control.is_stopped() {
            break;
        }
        network.set_input(element.input())?;
        network.calculate();
        rule.adjust_weights(network)?;
    }
    control.stop();
    Ok(())
}

macro_rules! unsupervised_rule {
    ($rule:ident, $name:literal) => {
        pub struct $rule {
            iteration: Iteration,
        }

        impl $rule {
            pub fn new() -> Self {
                Self {
                    iteration: Iteration::new(DEFAULT_LEARNING_RATE),
                }
            }
        }

        impl Default for $rule {
            fn default() -> Self {
                Self::new()
            }
        }

        impl $crate::learning::IterativeLearning for $rule {
            fn iteration(&self) -> &Iteration {
                &self.iteration
            }

            fn iteration_mut(&mut self) -> &mut Iteration {
                &mut self.iteration
            }

            fn do_learning_epoch(
                &mut self,
                network: &mut NeuralNetwork,
                training_set: &TrainingSet,
            ) -> Result<()> {
                unsupervised_epoch(self, network, training_set)
            }
        }

        iterative_rule!($rule, $name);
    };
}

/// Applies `delta(input, output, weight)` to every input weight of every
/// output neuron.
fn adjust_output_weights(network: &mut NeuralNetwork, delta: impl Fn(f64, f64, f64) -> f64) {
    for neuron in network.output_neurons().to_vec() {
        let output = network.neurons[neuron.0].output;
        network.update_input_weights(neuron, |input, weight| {
            let change = delta(input, output, weight.value());
            weight.inc(change);
        });
    }
}

unsupervised_rule!(UnsupervisedHebbianLearning, "unsupervised_hebbian");

/// Plain Hebb rule: `dw = lr * input * output`.
impl UnsupervisedLearning for UnsupervisedHebbianLearning {
    fn unsupervised(&self) -> &Iteration {
        &self.iteration
    }

    fn unsupervised_mut(&mut self) -> &mut Iteration {
        &mut self.iteration
    }

    fn adjust_weights(&mut self, network: &mut NeuralNetwork) -> Result<()> {
        let learning_rate = self.iteration.learning_rate;
        adjust_output_weights(network, |input, output, _| input * output * learning_rate);
        Ok(())
    }
}

unsupervised_rule!(OjaLearning, "oja");

/// Oja's normalised Hebb rule: `dw = lr * output * (input - output * w)`.
impl UnsupervisedLearning for OjaLearning {
    fn unsupervised(&self) -> &Iteration {
        &self.iteration
    }

    fn unsupervised_mut(&mut self) -> &mut Iteration {
        &mut self.iteration
    }

    fn adjust_weights(&mut self, network: &mut NeuralNetwork) -> Result<()> {
        let learning_rate = self.iteration.learning_rate;
        adjust_output_weights(network, |input, output, weight| {
            (input - output * weight) * output * learning_rate
        });
        Ok(())
    }
}

unsupervised_rule!(OutstarLearning, "outstar");

/// Grossberg outstar: weights out of the active input move towards the
/// output pattern, `dw = lr * input * (output - w)`.
impl UnsupervisedLearning for OutstarLearning {
    fn unsupervised(&self) -> &Iteration {
        &self.iteration
    }

    fn unsupervised_mut(&mut self) -> &mut Iteration {
        &mut self.iteration
    }

    fn adjust_weights(&mut self, network: &mut NeuralNetwork) -> Result<()> {
        let learning_rate = self.iteration.learning_rate;
        adjust_output_weights(network, |input, output, weight| {
            learning_rate * input * (output - weight)
        });
        Ok(())
    }
}

unsupervised_rule!(InstarLearning, "instar");

/// Grossberg instar: weights into an active output move towards the input
/// pattern, `dw = lr * (input - w) * output`.
impl UnsupervisedLearning for InstarLearning {
    fn unsupervised(&self) -> &Iteration {
        &self.iteration
    }

    fn unsupervised_mut(&mut self) -> &mut Iteration {
        &mut self.iteration
    }

    fn adjust_weights(&mut self, network: &mut NeuralNetwork) -> Result<()> {
        let learning_rate = self.iteration.learning_rate;
        adjust_output_weights(network, |input, output, weight| {
            learning_rate * (input - weight) * output
        });
        Ok(())
    }
}

unsupervised_rule!(BinaryHebbianLearning, "binary_hebbian");

/// Hebb rule for bipolar activations: the weight moves by `lr` towards
/// agreement when input and output share a sign, away otherwise.
impl UnsupervisedLearning for BinaryHebbianLearning {
    fn unsupervised(&self) -> &Iteration {
        &self.iteration
    }

    fn unsupervised_mut(&mut self) -> &mut Iteration {
        &mut self.iteration
    }

    fn adjust_weights(&mut self, network: &mut NeuralNetwork) -> Result<()> {
        let learning_rate = self.iteration.learning_rate;
        adjust_output_weights(network, |input, output, _| {
            let agree = (input > 0.0 && output > 0.0) || (input <= 0.0 && output <= 0.0);
            if agree {
                learning_rate
            } else {
                -learning_rate
            }
        });
        Ok(())
    }
}

unsupervised_rule!(CompetitiveLearning, "competitive");

/// Winner-take-all learning: only the winner of the first competitive
/// layer learns, pulling its feed-forward weights towards the input.
impl UnsupervisedLearning for CompetitiveLearning {
    fn unsupervised(&self) -> &Iteration {
        &self.iteration
    }

    fn unsupervised_mut(&mut self) -> &mut Iteration {
        &mut self.iteration
    }

    fn adjust_weights(&mut self, network: &mut NeuralNetwork) -> Result<()> {
        let layer = network
            .layers()
            .iter()
            .find(|layer| layer.is_competitive())
            .ok_or_else(|| NeuralError::Configuration("network has no competitive layer".into()))?;
        let Some(winner) = layer.winner() else {
            debug!("no winner to adjust");
            return Ok(());
        };

        let learning_rate = self.iteration.learning_rate;
        let home = network.neurons[winner.0].layer;
        for index in 0..network.neurons[winner.0].inputs.len() {
            let id = network.neurons[winner.0].inputs[index];
            if network.is_lateral(id, home) {
                continue;
            }
            let input = network.connection_input(id);
            let weight = network.connections[id.0].weight_mut();
            let change = learning_rate * (input - weight.value());
            weight.inc(change);
        }
        Ok(())
    }
}
