use std::sync::Arc;

use parking_lot::Condvar;
use parking_lot::Mutex;

use crate::error::NeuralError;
use crate::error::Result;
use crate::learning::LearningProgress;

#[derive(Debug, Default)]
struct ControlState {
    running: bool,
    stopped: bool,
    paused: bool,
}

/// Flags shared between a training loop and whoever supervises it.
///
/// Stop is honoured before every training pattern; pause blocks the loop
/// between epochs until resumed or stopped. Both are advisory: an epoch
/// already in flight always runs to its next checkpoint.
#[derive(Debug, Default)]
pub struct LearningControl {
    state: Mutex<ControlState>,
    resumed: Condvar,
    progress: Mutex<LearningProgress>,
}

impl LearningControl {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Claims the control for one training run and clears a previous stop
    /// request. Fails while another run holds it.
    pub fn begin(self: &Arc<Self>) -> Result<RunGuard> {
        let mut state = self.state.lock();
        if state.running {
            return Err(NeuralError::AlreadyRunning);
        }
        state.running = true;
        state.stopped = false;
        Ok(RunGuard {
            control: Arc::clone(self),
        })
    }

    pub fn stop(&self) {
        self.state.lock().stopped = true;
        self.resumed.notify_all();
    }

    pub fn is_stopped(&self) -> bool {
        self.state.lock().stopped
    }

    pub fn pause(&self) {
        self.state.lock().paused = true;
    }

    pub fn resume(&self) {
        self.state.lock().paused = false;
        self.resumed.notify_all();
    }

    pub fn is_paused(&self) -> bool {
        self.state.lock().paused
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().running
    }

    /// Latest progress published by the training loop.
    pub fn progress(&self) -> LearningProgress {
        self.progress.lock().clone()
    }

    pub(crate) fn publish(&self, progress: &LearningProgress) {
        *self.progress.lock() = progress.clone();
    }

    pub(crate) fn wait_while_paused(&self) {
        let mut state = self.state.lock();
        while state.paused && !state.stopped {
            self.resumed.wait(&mut state);
        }
    }
}

/// Marks a training run as active until dropped.
#[derive(Debug)]
pub struct RunGuard {
    control: Arc<LearningControl>,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.control.state.lock().running = false;
    }
}
