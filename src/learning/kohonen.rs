use std::sync::Arc;

use tracing::debug;
use tracing::info;

use crate::error::NeuralError;
use crate::error::Result;
use crate::learning::LearningControl;
use crate::learning::LearningProgress;
use crate::learning::LearningRule;
use crate::learning::Observer;
use crate::network::NeuralNetwork;
use crate::neuron::NeuronId;
use crate::training::TrainingElement;
use crate::training::TrainingSet;

pub const DEFAULT_KOHONEN_LEARNING_RATE: f64 = 0.9;

/// Map cells at or beyond this distance never win.
const MAX_DISTANCE: f64 = 100.0;

/// Self-organising map training in two phases: a coarse ordering phase and
/// a fine-tuning phase at half the learning rate.
///
/// The map layer (layer 1) is treated as a square grid of side
/// `floor(sqrt(cells))`. The cell closest to the input wins and moves its
/// weights towards the input at the full rate; grid neighbours within the
/// phase radius move at `rate / (ring + 1)`.
pub struct KohonenLearning {
    pub learning_rate: f64,
    iterations: [usize; 2],
    radius: [usize; 2],
    current_iteration: usize,
    control: Arc<LearningControl>,
    observers: Vec<Observer>,
}

impl KohonenLearning {
    pub fn new() -> Self {
        Self {
            learning_rate: DEFAULT_KOHONEN_LEARNING_RATE,
            iterations: [100, 0],
            radius: [1, 1],
            current_iteration: 0,
            control: LearningControl::new(),
            observers: Vec::new(),
        }
    }

    /// Number of epochs of the ordering and tuning phases.
    pub fn set_iterations(&mut self, ordering: usize, tuning: usize) {
        self.iterations = [ordering, tuning];
    }

    pub fn iterations(&self) -> [usize; 2] {
        self.iterations
    }

    /// Neighbourhood radius of the ordering and tuning phases.
    pub fn set_radius(&mut self, ordering: usize, tuning: usize) {
        self.radius = [ordering, tuning];
    }

    pub fn current_iteration(&self) -> usize {
        self.current_iteration
    }

    fn notify(&mut self) {
        let progress = LearningRule::progress(self);
        for observer in &mut self.observers {
            observer(&progress);
        }
        self.control.publish(&progress);
    }

    fn learn_pattern(
        &self,
        network: &mut NeuralNetwork,
        element: &TrainingElement,
        radius: usize,
        side: usize,
    ) -> Result<()> {
        network.set_input(element.input())?;
        network.calculate();

        let cells = network.layers[1].neurons.clone();
        let Some((winner_index, winner)) = closest_cell(network, &cells) else {
            return Ok(());
        };
        if network.neurons[winner.0].output == 0.0 {
            return Ok(());
        }

        adjust_cell(network, winner, self.learning_rate);
        for (index, &cell) in cells.iter().enumerate() {
            if index == winner_index {
                continue;
            }
            let ring = grid_distance(winner_index, index, side).filter(|&ring| ring <= radius);
            if let Some(ring) = ring {
                adjust_cell(network, cell, self.learning_rate / (ring + 1) as f64);
            }
        }
        Ok(())
    }
}

impl Default for KohonenLearning {
    fn default() -> Self {
        Self::new()
    }
}

/// First cell with the smallest output below [`MAX_DISTANCE`].
fn closest_cell(network: &NeuralNetwork, cells: &[NeuronId]) -> Option<(usize, NeuronId)> {
    let mut closest = None;
    let mut min_output = MAX_DISTANCE;
    for (index, &cell) in cells.iter().enumerate() {
        let output = network.neurons[cell.0].output;
        if output < min_output {
            min_output = output;
            closest = Some((index, cell));
        }
    }
    closest
}

fn adjust_cell(network: &mut NeuralNetwork, cell: NeuronId, rate: f64) {
    network.update_input_weights(cell, |input, weight| {
        let change = rate * (input - weight.value());
        weight.inc(change);
    });
}

/// Chebyshev distance between two cells of a `side x side` grid laid out
/// row by row. Cells outside the grid have no distance.
fn grid_distance(a: usize, b: usize, side: usize) -> Option<usize> {
    if side == 0 || a >= side * side || b >= side * side {
        return None;
    }
    let rows = (a / side).abs_diff(b / side);
    let columns = (a % side).abs_diff(b % side);
    Some(rows.max(columns))
}

impl LearningRule for KohonenLearning {
    fn name(&self) -> &'static str {
        "kohonen"
    }

    fn run(&mut self, network: &mut NeuralNetwork, training_set: &TrainingSet) -> Result<()> {
        let cells = network
            .layer(1)
            .ok_or_else(|| NeuralError::Configuration("kohonen training needs a map layer".into()))?
            .len();
        let side = (cells as f64).sqrt() as usize;
        info!(rule = self.name(), cells, side, "learning started");

        for phase in 0..2 {
            for k in 0..self.iterations[phase] {
                for element in training_set {
                    if self.control.is_stopped() {
                        break;
                    }
                    self.learn_pattern(network, element, self.radius[phase], side)?;
                }
                self.current_iteration = k;
                self.notify();
                if self.control.is_stopped() {
                    debug!(phase, iteration = k, "kohonen learning stopped");
                    return Ok(());
                }
                self.control.wait_while_paused();
            }
            self.learning_rate *= 0.5;
            debug!(phase, learning_rate = self.learning_rate, "phase finished");
        }

        info!(rule = self.name(), "learning finished");
        Ok(())
    }

    fn control(&self) -> &Arc<LearningControl> {
        &self.control
    }

    fn progress(&self) -> LearningProgress {
        LearningProgress {
            iteration: self.current_iteration,
            learning_rate: self.learning_rate,
            total_network_error: None,
            previous_epoch_error: None,
        }
    }

    fn add_observer(&mut self, observer: Observer) {
        self.observers.push(observer);
    }

    fn set_max_iterations(&mut self, max_iterations: usize) {
        self.iterations[0] = max_iterations;
    }
}
