use rand::Rng;
use serde::Deserialize;
use serde::Serialize;

use crate::neuron::NeuronId;
use crate::random;

/// A connection weight.
///
/// Only `value` is persisted; `previous_value` is momentum bookkeeping and
/// comes back equal to `value` after deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Weight {
    value: f64,
    previous_value: f64,
}

impl Weight {
    /// Weight with no pending momentum: the previous value equals `value`.
    pub fn new(value: f64) -> Self {
        Self {
            value,
            previous_value: value,
        }
    }

    /// A weight drawn uniformly from `[-0.5, 0.5)` using the shared generator.
    pub fn random() -> Self {
        Self::new(random::next_f64() - 0.5)
    }

    /// Like [`random`](Self::random) but draws from `rng`.
    pub fn random_with<R: Rng>(rng: &mut R) -> Self {
        Self::new(rng.gen::<f64>() - 0.5)
    }

    /// Current weight.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Overwrites the weight; the previous value is kept.
    pub fn set_value(&mut self, value: f64) {
        self.value = value;
    }

    /// Weight before the last momentum update.
    pub fn previous_value(&self) -> f64 {
        self.previous_value
    }

    /// Records the value the next momentum step is measured from.
    pub fn set_previous_value(&mut self, value: f64) {
        self.previous_value = value;
    }

    /// Adds `amount` to the weight.
    pub fn inc(&mut self, amount: f64) {
        self.value += amount;
    }

    /// Subtracts `amount` from the weight.
    pub fn dec(&mut self, amount: f64) {
        self.value -= amount;
    }

    /// Resets to a uniform sample from `[-0.5, 0.5)`.
    pub fn randomize<R: Rng>(&mut self, rng: &mut R) {
        *self = Self::random_with(rng);
    }

    /// Resets to a uniform sample from `[min, max)`.
    pub fn randomize_in<R: Rng>(&mut self, min: f64, max: f64, rng: &mut R) {
        *self = Self::new(min + rng.gen::<f64>() * (max - min));
    }
}

impl Default for Weight {
    fn default() -> Self {
        Self::random()
    }
}

impl From<f64> for Weight {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<Weight> for f64 {
    fn from(weight: Weight) -> Self {
        weight.value
    }
}

/// Handle of a connection inside its owning network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionId(pub(crate) usize);

impl ConnectionId {
    /// Slot of the connection in the network arena.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Directed, weighted edge between two neurons.
///
/// The target neuron lists the connection among its inputs; the source
/// lists it among its outputs so errors can be propagated backwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    from: NeuronId,
    to: NeuronId,
    weight: Weight,
    /// Read the source's output this many calculations in the past.
    delay: Option<usize>,
    /// Freed slot waiting to be reused by the next new connection.
    #[serde(default)]
    pub(crate) removed: bool,
}

impl Connection {
    pub(crate) fn new(from: NeuronId, to: NeuronId, weight: Weight, delay: Option<usize>) -> Self {
        Self {
            from,
            to,
            weight,
            delay,
            removed: false,
        }
    }

    /// Source neuron.
    pub fn from_neuron(&self) -> NeuronId {
        self.from
    }

    /// Target neuron; the connection is one of its inputs.
    pub fn to_neuron(&self) -> NeuronId {
        self.to
    }

    pub fn weight(&self) -> &Weight {
        &self.weight
    }

    pub fn weight_mut(&mut self) -> &mut Weight {
        &mut self.weight
    }

    /// Calculations of lag, or `None` for an immediate connection.
    pub fn delay(&self) -> Option<usize> {
        self.delay
    }
}
