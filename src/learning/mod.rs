//! Learning rules and the epoch loop that drives them.
//!
//! A rule is attached to a [`NeuralNetwork`] and trained with
//! [`NeuralNetwork::learn`] or in the background. Iterative rules share one
//! loop: run an epoch, count it, notify observers, honour pause, repeat
//! until something stops the run. Supervised and unsupervised rules plug in
//! their own epoch through [`IterativeLearning`].

use std::sync::Arc;

use tracing::debug;
use tracing::info;
use tracing::trace;

use crate::error::Result;
use crate::network::NeuralNetwork;
use crate::training::TrainingSet;

/// Implements [`LearningRule`] for a rule that runs the shared epoch loop.
macro_rules! iterative_rule {
    ($rule:ty, $name:literal) => {
        impl $crate::learning::LearningRule for $rule {
            fn name(&self) -> &'static str {
                $name
            }

            fn run(
                &mut self,
                network: &mut $crate::network::NeuralNetwork,
                training_set: &$crate::training::TrainingSet,
            ) -> $crate::error::Result<()> {
                $crate::learning::run_iterative(self, network, training_set)
            }

            fn control(&self) -> &::std::sync::Arc<$crate::learning::LearningControl> {
                &$crate::learning::IterativeLearning::iteration(self).control
            }

            fn progress(&self) -> $crate::learning::LearningProgress {
                $crate::learning::IterativeLearning::progress(self)
            }

            fn add_observer(&mut self, observer: $crate::learning::Observer) {
                $crate::learning::IterativeLearning::iteration_mut(self).observers.push(observer);
            }

            fn set_max_iterations(&mut self, max_iterations: usize) {
                $crate::learning::IterativeLearning::iteration_mut(self)
                    .set_max_iterations(max_iterations);
            }

            fn set_max_error(&mut self, max_error: f64) {
                $crate::learning::IterativeLearning::set_max_error(self, max_error);
            }
        }
    };
}

#[macro_use]
mod supervised;
mod unsupervised;

mod backprop;
mod control;
mod hopfield;
mod kohonen;
mod lms;

pub use backprop::BackPropagation;
pub use backprop::DynamicBackPropagation;
pub use backprop::MomentumBackpropagation;
pub use control::LearningControl;
pub use control::RunGuard;
pub use hopfield::HopfieldLearning;
pub use kohonen::KohonenLearning;
pub use lms::BinaryDeltaRule;
pub use lms::Lms;
pub use lms::PerceptronLearning;
pub use lms::SigmoidDeltaRule;
pub use lms::SupervisedHebbianLearning;
pub use supervised::SupervisedLearning;
pub use supervised::SupervisedState;
pub use unsupervised::BinaryHebbianLearning;
pub use unsupervised::CompetitiveLearning;
pub use unsupervised::InstarLearning;
pub use unsupervised::OjaLearning;
pub use unsupervised::OutstarLearning;
pub use unsupervised::UnsupervisedHebbianLearning;
pub use unsupervised::UnsupervisedLearning;

/// Learning rate every iterative rule starts with.
pub const DEFAULT_LEARNING_RATE: f64 = 0.1;

/// Snapshot of a training run handed to observers after each epoch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LearningProgress {
    pub iteration: usize,
    pub learning_rate: f64,
    /// Error of the last completed epoch, for supervised rules.
    pub total_network_error: Option<f64>,
    pub previous_epoch_error: Option<f64>,
}

/// Callback run on the training thread after every epoch.
pub type Observer = Box<dyn FnMut(&LearningProgress) + Send>;

/// A training algorithm that can be attached to a network.
pub trait LearningRule: Send {
    fn name(&self) -> &'static str;

    /// Trains `network` on `training_set` until the rule's stop criteria
    /// fire, without claiming the control. Prefer [`learn`](Self::learn).
    fn run(&mut self, network: &mut NeuralNetwork, training_set: &TrainingSet) -> Result<()>;

    fn control(&self) -> &Arc<LearningControl>;

    fn progress(&self) -> LearningProgress;

    fn add_observer(&mut self, observer: Observer);

    fn set_max_iterations(&mut self, _max_iterations: usize) {}

    fn set_max_error(&mut self, _max_error: f64) {}

    /// Claims the control, clears any earlier stop request and trains.
    fn learn(&mut self, network: &mut NeuralNetwork, training_set: &TrainingSet) -> Result<()> {
        let _running = self.control().begin()?;
        self.run(network, training_set)
    }

    fn stop(&self) {
        self.control().stop();
    }

    fn is_stopped(&self) -> bool {
        self.control().is_stopped()
    }
}

/// Bookkeeping shared by all iterative rules.
pub struct Iteration {
    pub learning_rate: f64,
    current: usize,
    max: Option<usize>,
    pub(crate) control: Arc<LearningControl>,
    pub(crate) observers: Vec<Observer>,
}

impl Iteration {
    pub fn new(learning_rate: f64) -> Self {
        Self {
            learning_rate,
            current: 0,
            max: None,
            control: LearningControl::new(),
            observers: Vec::new(),
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub(crate) fn set_current(&mut self, current: usize) {
        self.current = current;
    }

    pub fn max_iterations(&self) -> Option<usize> {
        self.max
    }

    pub fn set_max_iterations(&mut self, max_iterations: usize) {
        self.max = Some(max_iterations);
    }

    pub fn clear_max_iterations(&mut self) {
        self.max = None;
    }

    /// Counts one finished epoch and reports whether the iteration limit
    /// has been reached. Unbounded runs wrap back to 1 instead of
    /// overflowing.
    fn advance(&mut self) -> bool {
        self.current += 1;
        match self.max {
            Some(max) => self.current >= max,
            None => {
                if self.current == usize::MAX {
                    self.current = 1;
                }
                false
            }
        }
    }

    pub(crate) fn notify(&mut self, progress: &LearningProgress) {
        for observer in &mut self.observers {
            observer(progress);
        }
        self.control.publish(progress);
    }
}

impl Default for Iteration {
    fn default() -> Self {
        Self::new(DEFAULT_LEARNING_RATE)
    }
}

/// A rule whose training is a sequence of epochs over the training set.
pub trait IterativeLearning {
    fn iteration(&self) -> &Iteration;

    fn iteration_mut(&mut self) -> &mut Iteration;

    /// One pass over the training set.
    fn do_learning_epoch(
        &mut self,
        network: &mut NeuralNetwork,
        training_set: &TrainingSet,
    ) -> Result<()>;

    /// Clears per-run state before the first epoch.
    fn reset(&mut self) {
        self.iteration_mut().set_current(0);
    }

    fn set_max_error(&mut self, _max_error: f64) {}

    fn progress(&self) -> LearningProgress {
        let iteration = self.iteration();
        LearningProgress {
            iteration: iteration.current(),
            learning_rate: iteration.learning_rate,
            total_network_error: None,
            previous_epoch_error: None,
        }
    }

    fn learning_rate(&self) -> f64 {
        self.iteration().learning_rate
    }

    fn set_learning_rate(&mut self, learning_rate: f64) {
        self.iteration_mut().learning_rate = learning_rate;
    }

    fn current_iteration(&self) -> usize {
        self.iteration().current()
    }
}

pub(crate) fn run_iterative<R>(
    rule: &mut R,
    network: &mut NeuralNetwork,
    training_set: &TrainingSet,
) -> Result<()>
where
    R: IterativeLearning + LearningRule + ?Sized,
{
    let control = Arc::clone(&rule.iteration().control);
    IterativeLearning::reset(rule);
    info!(rule = rule.name(), patterns = training_set.len(), "learning started");

    while !control.is_stopped() {
        rule.do_learning_epoch(network, training_set)?;

        if rule.iteration_mut().advance() {
            debug!(rule = rule.name(), "iteration limit reached");
            control.stop();
        }

        let progress = IterativeLearning::progress(rule);
        trace!(
            iteration = progress.iteration,
            error = ?progress.total_network_error,
            "epoch finished"
        );
        rule.iteration_mut().notify(&progress);
        control.wait_while_paused();
    }

    info!(
        rule = rule.name(),
        iterations = rule.current_iteration(),
        "learning finished"
    );
    Ok(())
}

/// Runs exactly one epoch outside the usual loop and notifies observers.
/// Stop criteria hit during the epoch are left set for the caller to
/// inspect.
pub fn do_one_learning_iteration<R>(
    rule: &mut R,
    network: &mut NeuralNetwork,
    training_set: &TrainingSet,
) -> Result<()>
where
    R: IterativeLearning + ?Sized,
{
    rule.do_learning_epoch(network, training_set)?;
    let progress = rule.progress();
    rule.iteration_mut().notify(&progress);
    Ok(())
}
