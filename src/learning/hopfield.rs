use std::sync::Arc;

use tracing::info;

use crate::error::NeuralError;
use crate::error::Result;
use crate::learning::LearningControl;
use crate::learning::LearningProgress;
use crate::learning::LearningRule;
use crate::learning::Observer;
use crate::network::NeuralNetwork;
use crate::training::TrainingSet;

/// One-shot Hebbian storage of bipolar patterns in a Hopfield layer:
/// `w_ij = w_ji = sum over patterns of p[i] * p[j]`.
pub struct HopfieldLearning {
    control: Arc<LearningControl>,
    observers: Vec<Observer>,
}

impl HopfieldLearning {
    pub fn new() -> Self {
        Self {
            control: LearningControl::new(),
            observers: Vec::new(),
        }
    }
}

impl Default for HopfieldLearning {
    fn default() -> Self {
        Self::new()
    }
}

impl LearningRule for HopfieldLearning {
    fn name(&self) -> &'static str {
        "hopfield"
    }

    fn run(&mut self, network: &mut NeuralNetwork, training_set: &TrainingSet) -> Result<()> {
        let neurons = network
            .layer(0)
            .ok_or(NeuralError::UnknownLayer(0))?
            .neurons
            .clone();
        let short = training_set.iter().find(|element| element.input().len() < neurons.len());
        if let Some(element) = short {
            return Err(NeuralError::VectorSizeMismatch {
                expected: neurons.len(),
                actual: element.input().len(),
            });
        }
        info!(rule = self.name(), patterns = training_set.len(), "learning started");

        for (i, &ni) in neurons.iter().enumerate() {
            for (j, &nj) in neurons.iter().enumerate() {
                if i == j {
                    continue;
                }
                let missing = || {
                    NeuralError::Configuration(format!(
                        "hopfield neurons {} and {} are not connected both ways",
                        ni.index(),
                        nj.index()
                    ))
                };
                let cij = network.connection_between(ni, nj).ok_or_else(missing)?;
                let cji = network.connection_between(nj, ni).ok_or_else(missing)?;
                let w: f64 = training_set
                    .iter()
                    .map(|element| element.input()[i] * element.input()[j])
                    .sum();
                network.connections[cij.0].weight_mut().set_value(w);
                network.connections[cji.0].weight_mut().set_value(w);
            }
        }

        let progress = self.progress();
        for observer in &mut self.observers {
            observer(&progress);
        }
        self.control.publish(&progress);
        Ok(())
    }

    fn control(&self) -> &Arc<LearningControl> {
        &self.control
    }

    fn progress(&self) -> LearningProgress {
        LearningProgress::default()
    }

    fn add_observer(&mut self, observer: Observer) {
        self.observers.push(observer);
    }
}
