//! Training on a dedicated thread.
//!
//! The network moves into the worker for the duration of the run, so it
//! cannot be read or changed while it learns. [`BackgroundLearning::join`]
//! hands it back.

use std::sync::Arc;
use std::thread;
use std::thread::JoinHandle;

use tracing::debug;

use crate::error::NeuralError;
use crate::error::Result;
use crate::learning::LearningControl;
use crate::learning::LearningProgress;
use crate::network::NeuralNetwork;
use crate::training::TrainingSet;

/// Handle of a training run started with
/// [`NeuralNetwork::learn_in_background`].
#[derive(Debug)]
pub struct BackgroundLearning {
    control: Arc<LearningControl>,
    handle: JoinHandle<(NeuralNetwork, Result<()>)>,
}

impl BackgroundLearning {
    pub fn stop(&self) {
        self.control.stop();
    }

    pub fn pause(&self) {
        self.control.pause();
    }

    pub fn resume(&self) {
        self.control.resume();
    }

    pub fn is_paused(&self) -> bool {
        self.control.is_paused()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Progress as of the last finished epoch.
    pub fn progress(&self) -> LearningProgress {
        self.control.progress()
    }

    pub fn control(&self) -> &Arc<LearningControl> {
        &self.control
    }

    /// Waits for the run to end and returns the network together with the
    /// outcome of training.
    pub fn join(self) -> Result<(NeuralNetwork, Result<()>)> {
        self.handle.join().map_err(|_| NeuralError::LearningThreadPanicked)
    }
}

impl NeuralNetwork {
    /// Starts training with the attached rule on a new thread.
    ///
    /// The run is claimed before this returns, so a [`stop`] issued right
    /// away is never lost. Errors such as a missing rule surface from
    /// [`join`](BackgroundLearning::join).
    ///
    /// [`stop`]: BackgroundLearning::stop
    pub fn learn_in_background(self, training_set: TrainingSet) -> BackgroundLearning {
        let control = self
            .learning_rule()
            .map(|rule| Arc::clone(rule.control()))
            .unwrap_or_default();
        let started = control.begin();

        let handle = thread::spawn(move || {
            let mut network = self;
            let result = started.and_then(|_running| network.run_learning_rule(&training_set));
            debug!(ok = result.is_ok(), "background learning finished");
            (network, result)
        });

        BackgroundLearning { control, handle }
    }
}
