//! Connection factory methods: single connections between neurons and the
//! standard layer-to-layer and within-layer wiring patterns.
//!
//! Bias neurons never receive connections; every pattern silently skips
//! them as targets.

use crate::connection::ConnectionId;
use crate::connection::Weight;
use crate::error::NeuralError;
use crate::error::Result;
use crate::network::NeuralNetwork;
use crate::neuron::NeuronId;

impl NeuralNetwork {
    /// Connects two neurons with a random weight from `[-0.5, 0.5)`.
    pub fn connect(&mut self, from: NeuronId, to: NeuronId) -> Result<ConnectionId> {
        self.checked_connection(from, to, Weight::random(), None)
    }

    pub fn connect_weighted(
        &mut self,
        from: NeuronId,
        to: NeuronId,
        weight: f64,
    ) -> Result<ConnectionId> {
        self.checked_connection(from, to, Weight::new(weight), None)
    }

    /// Connects two neurons so that `to` reads the output `from` had
    /// `delay` calculations ago.
    pub fn connect_delayed(
        &mut self,
        from: NeuronId,
        to: NeuronId,
        weight: f64,
        delay: usize,
    ) -> Result<ConnectionId> {
        self.checked_connection(from, to, Weight::new(weight), Some(delay))
    }

    fn checked_connection(
        &mut self,
        from: NeuronId,
        to: NeuronId,
        weight: Weight,
        delay: Option<usize>,
    ) -> Result<ConnectionId> {
        self.neuron(from).ok_or(NeuralError::UnknownNeuron(from))?;
        let target = self.neuron(to).ok_or(NeuralError::UnknownNeuron(to))?;
        if target.is_bias() {
            return Err(NeuralError::Configuration("bias neurons take no input connections".into()));
        }
        Ok(self.add_connection(from, to, weight, delay))
    }

    /// Connects every neuron of `from` to every neuron of `to` with random
    /// weights.
    pub fn full_connect(&mut self, from: usize, to: usize) -> Result<()> {
        self.connect_layers(from, to, true, Weight::random)
    }

    pub fn full_connect_weighted(&mut self, from: usize, to: usize, weight: f64) -> Result<()> {
        self.connect_layers(from, to, true, || Weight::new(weight))
    }

    /// Like [`full_connect`](Self::full_connect) but leaves out the bias
    /// neurons of the source layer.
    pub fn full_connect_without_bias(&mut self, from: usize, to: usize) -> Result<()> {
        self.connect_layers(from, to, false, Weight::random)
    }

    fn connect_layers(
        &mut self,
        from: usize,
        to: usize,
        with_bias: bool,
        mut weight: impl FnMut() -> Weight,
    ) -> Result<()> {
        let sources = self.layer(from).ok_or(NeuralError::UnknownLayer(from))?.neurons.clone();
        let targets = self.layer(to).ok_or(NeuralError::UnknownLayer(to))?.neurons.clone();

        for &source in &sources {
            if !with_bias && self.neurons[source.0].is_bias() {
                continue;
            }
            for &target in &targets {
                if self.neurons[target.0].is_bias() {
                    continue;
                }
                self.add_connection(source, target, weight(), None);
            }
        }

        Ok(())
    }

    /// Connects neuron `i` of `from` to neuron `i` of `to`.
    pub fn forward_connect(&mut self, from: usize, to: usize, weight: f64) -> Result<()> {
        let sources = self.layer(from).ok_or(NeuralError::UnknownLayer(from))?.neurons.clone();
        let targets = self.layer(to).ok_or(NeuralError::UnknownLayer(to))?.neurons.clone();
        if targets.len() < sources.len() {
            return Err(NeuralError::VectorSizeMismatch {
                expected: sources.len(),
                actual: targets.len(),
            });
        }

        for (&source, &target) in sources.iter().zip(&targets) {
            self.checked_connection(source, target, Weight::new(weight), None)?;
        }

        Ok(())
    }

    /// Connects every pair of distinct neurons within a layer, both
    /// directions, with random weights.
    pub fn connect_lateral(&mut self, layer: usize) -> Result<()> {
        self.connect_within(layer, None, Weight::random)
    }

    pub fn connect_lateral_weighted(&mut self, layer: usize, weight: f64) -> Result<()> {
        self.connect_within(layer, None, || Weight::new(weight))
    }

    pub fn connect_lateral_delayed(
        &mut self,
        layer: usize,
        weight: f64,
        delay: usize,
    ) -> Result<()> {
        self.connect_within(layer, Some(delay), || Weight::new(weight))
    }

    fn connect_within(
        &mut self,
        layer: usize,
        delay: Option<usize>,
        mut weight: impl FnMut() -> Weight,
    ) -> Result<()> {
        let neurons = self.layer(layer).ok_or(NeuralError::UnknownLayer(layer))?.neurons.clone();

        for &from in &neurons {
            for &to in &neurons {
                if from == to || self.neurons[to.0].is_bias() {
                    continue;
                }
                self.add_connection(from, to, weight(), delay);
            }
        }

        Ok(())
    }
}
