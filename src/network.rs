use std::fmt;

use rand::Rng;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::connection::Connection;
use crate::connection::ConnectionId;
use crate::connection::Weight;
use crate::error::NeuralError;
use crate::error::Result;
use crate::layer::Competition;
use crate::layer::Layer;
use crate::layer::LayerId;
use crate::learning::LearningRule;
use crate::neuron::Neuron;
use crate::neuron::NeuronId;
use crate::neuron::NeuronKind;
use crate::neuron::NeuronKindSpec;
use crate::neuron::NeuronSpec;
use crate::training::TrainingSet;

/// Architecture tag of a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkType {
    Adaline,
    Perceptron,
    MultiLayerPerceptron,
    Hopfield,
    Kohonen,
    SupervisedHebbian,
    UnsupervisedHebbian,
    Competitive,
    MaxNet,
    Instar,
    Outstar,
    RbfNetwork,
    Bam,
    #[default]
    Custom,
}

/// The neural network.
///
/// Neurons and connections live in arenas owned by the network and are
/// addressed by [`NeuronId`] / [`ConnectionId`]; layers hold neuron handles
/// in order. Forward propagation calculates layers in order, so layers must
/// be arranged topologically.
#[derive(Serialize, Deserialize)]
pub struct NeuralNetwork {
    network_type: NetworkType,
    pub(crate) layers: Vec<Layer>,
    pub(crate) neurons: Vec<Neuron>,
    pub(crate) connections: Vec<Connection>,
    #[serde(default)]
    free_connections: Vec<ConnectionId>,
    input_neurons: Vec<NeuronId>,
    output_neurons: Vec<NeuronId>,
    next_layer_id: usize,
    #[serde(skip)]
    learning_rule: Option<Box<dyn LearningRule>>,
}

impl NeuralNetwork {
    /// Empty network of the given type, with no rule attached.
    pub fn new(network_type: NetworkType) -> Self {
        Self {
            network_type,
            layers: Vec::new(),
            neurons: Vec::new(),
            connections: Vec::new(),
            free_connections: Vec::new(),
            input_neurons: Vec::new(),
            output_neurons: Vec::new(),
            next_layer_id: 0,
            learning_rule: None,
        }
    }

    pub fn network_type(&self) -> NetworkType {
        self.network_type
    }

    pub fn set_network_type(&mut self, network_type: NetworkType) {
        self.network_type = network_type;
    }

    /// Layers in calculation order.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Layer at `index`, if there is one.
    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    pub fn layer_mut(&mut self, index: usize) -> Option<&mut Layer> {
        self.layers.get_mut(index)
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Position of the layer with the given identity.
    pub fn index_of_layer(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|layer| layer.id == id)
    }

    /// Appends an empty layer and returns its index.
    pub fn add_layer(&mut self) -> usize {
        self.push_layer(self.layers.len(), None)
    }

    /// Appends an empty winner-take-all layer and returns its index.
    pub fn add_competitive_layer(&mut self) -> usize {
        self.push_layer(self.layers.len(), Some(Competition::default()))
    }

    /// Inserts an empty layer at `index`, shifting later layers up.
    pub fn insert_layer(&mut self, index: usize) -> Result<usize> {
        if index > self.layers.len() {
            return Err(NeuralError::UnknownLayer(index));
        }
        Ok(self.push_layer(index, None))
    }

    fn push_layer(&mut self, index: usize, competition: Option<Competition>) -> usize {
        let id = LayerId(self.next_layer_id);
        self.next_layer_id += 1;
        self.layers.insert(index, Layer::new(id, competition));
        index
    }

    /// Removes a layer together with its neurons and all their connections.
    pub fn remove_layer(&mut self, index: usize) -> Result<()> {
        let layer = self.layers.get(index).ok_or(NeuralError::UnknownLayer(index))?;
        for id in layer.neurons.clone() {
            self.detach_neuron(id);
        }
        self.layers.remove(index);
        Ok(())
    }

    /// Builds a neuron from `spec` and appends it to layer `layer`.
    pub fn add_neuron(&mut self, layer: usize, spec: &NeuronSpec) -> Result<NeuronId> {
        let position = self.layer(layer).ok_or(NeuralError::UnknownLayer(layer))?.len();
        self.insert_neuron(layer, position, spec)
    }

    /// Appends `count` neurons built from the same spec.
    pub fn add_neurons(
        &mut self,
        layer: usize,
        count: usize,
        spec: &NeuronSpec,
    ) -> Result<Vec<NeuronId>> {
        (0..count).map(|_| self.add_neuron(layer, spec)).collect()
    }

    /// Builds a neuron from `spec` and inserts it at `position` in layer `layer`.
    pub fn insert_neuron(
        &mut self,
        layer: usize,
        position: usize,
        spec: &NeuronSpec,
    ) -> Result<NeuronId> {
        let target = self.layers.get(layer).ok_or(NeuralError::UnknownLayer(layer))?;
        if position > target.len() {
            return Err(NeuralError::Configuration(format!(
                "neuron position {position} is past the end of layer {layer}"
            )));
        }
        let layer_id = target.id;

        let id = NeuronId(self.neurons.len());
        let mut neuron = Neuron::from_spec(spec);
        neuron.layer = Some(layer_id);
        self.neurons.push(neuron);
        self.layers[layer].neurons.insert(position, id);

        if spec.kind == NeuronKindSpec::Competitive {
            self.add_connection(id, id, 1.0.into(), None);
        }

        Ok(id)
    }

    /// Removes a neuron from its layer and disconnects it from the rest
    /// of the network. The handle is stale afterwards.
    pub fn remove_neuron(&mut self, id: NeuronId) -> Result<()> {
        self.neuron(id).ok_or(NeuralError::UnknownNeuron(id))?;
        self.detach_neuron(id);
        Ok(())
    }

    fn detach_neuron(&mut self, id: NeuronId) {
        let neuron = &self.neurons[id.0];
        let connections: Vec<ConnectionId> =
            neuron.inputs.iter().chain(&neuron.outputs).copied().collect();
        for connection in connections {
            self.release_connection(connection);
        }
        for layer in &mut self.layers {
            layer.neurons.retain(|&n| n != id);
        }
        let neuron = &mut self.neurons[id.0];
        neuron.layer = None;
        neuron.removed = true;
        self.input_neurons.retain(|&n| n != id);
        self.output_neurons.retain(|&n| n != id);
    }

    /// Removes the connection from `from` into `to`. Returns `false` when
    /// the two neurons are not connected.
    pub fn disconnect(&mut self, from: NeuronId, to: NeuronId) -> Result<bool> {
        self.neuron(from).ok_or(NeuralError::UnknownNeuron(from))?;
        self.neuron(to).ok_or(NeuralError::UnknownNeuron(to))?;
        match self.connection_between(from, to) {
            Some(id) => {
                self.release_connection(id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Unlinks a connection from both endpoints and frees its slot.
    fn release_connection(&mut self, id: ConnectionId) {
        let connection = &mut self.connections[id.0];
        if connection.removed {
            return;
        }
        connection.removed = true;
        let (from, to) = (connection.from_neuron(), connection.to_neuron());
        self.neurons[from.0].outputs.retain(|&c| c != id);
        self.neurons[to.0].inputs.retain(|&c| c != id);
        self.free_connections.push(id);
    }

    /// Stores a new connection, reusing a freed slot when one exists.
    pub(crate) fn add_connection(
        &mut self,
        from: NeuronId,
        to: NeuronId,
        weight: Weight,
        delay: Option<usize>,
    ) -> ConnectionId {
        let connection = Connection::new(from, to, weight, delay);
        let id = match self.free_connections.pop() {
            Some(id) => {
                self.connections[id.0] = connection;
                id
            }
            None => {
                self.connections.push(connection);
                ConnectionId(self.connections.len() - 1)
            }
        };
        self.neurons[to.0].inputs.push(id);
        self.neurons[from.0].outputs.push(id);
        id
    }

    /// Neuron by handle; `None` for removed neurons and handles from
    /// another network.
    pub fn neuron(&self, id: NeuronId) -> Option<&Neuron> {
        self.neurons.get(id.0).filter(|neuron| !neuron.removed)
    }

    pub fn neuron_mut(&mut self, id: NeuronId) -> Option<&mut Neuron> {
        self.neurons.get_mut(id.0).filter(|neuron| !neuron.removed)
    }

    /// Connection by handle; `None` once it has been disconnected.
    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(id.0).filter(|connection| !connection.removed)
    }

    pub fn connection_mut(&mut self, id: ConnectionId) -> Option<&mut Connection> {
        self.connections.get_mut(id.0).filter(|connection| !connection.removed)
    }

    /// The live connection from `from` into `to`, if any.
    pub fn connection_between(&self, from: NeuronId, to: NeuronId) -> Option<ConnectionId> {
        self.neuron(to)?
            .inputs
            .iter()
            .copied()
            .find(|&id| self.connections[id.0].from_neuron() == from)
    }

    /// Current weight values of a neuron's input connections, in order.
    pub fn weights(&self, neuron: NeuronId) -> Vec<f64> {
        self.neuron(neuron)
            .map(|n| n.inputs.iter().map(|&id| self.connections[id.0].weight().value()).collect())
            .unwrap_or_default()
    }

    /// Input seen through a connection: the source's output, or its past
    /// output for delayed connections.
    pub(crate) fn connection_input(&self, id: ConnectionId) -> f64 {
        let connection = &self.connections[id.0];
        let source = &self.neurons[connection.from_neuron().0];
        match connection.delay() {
            Some(delay) => source.delayed_output(delay),
            None => source.output,
        }
    }

    /// Neurons that receive [`set_input`](Self::set_input) values, in order.
    pub fn input_neurons(&self) -> &[NeuronId] {
        &self.input_neurons
    }

    /// Neurons read by [`output`](Self::output), in order.
    pub fn output_neurons(&self) -> &[NeuronId] {
        &self.output_neurons
    }

    /// Replaces the input neurons; fails on a removed or unknown handle.
    pub fn set_input_neurons(&mut self, neurons: Vec<NeuronId>) -> Result<()> {
        self.check_neurons(&neurons)?;
        self.input_neurons = neurons;
        Ok(())
    }

    /// Replaces the output neurons; fails on a removed or unknown handle.
    pub fn set_output_neurons(&mut self, neurons: Vec<NeuronId>) -> Result<()> {
        self.check_neurons(&neurons)?;
        self.output_neurons = neurons;
        Ok(())
    }

    fn check_neurons(&self, neurons: &[NeuronId]) -> Result<()> {
        match neurons.iter().find(|&&id| self.neuron(id).is_none()) {
            Some(&id) => Err(NeuralError::UnknownNeuron(id)),
            None => Ok(()),
        }
    }

    /// Inputs become the non-bias neurons of the first layer, outputs all
    /// neurons of the last layer.
    pub fn set_default_io(&mut self) {
        self.input_neurons = self
            .layers
            .first()
            .map(|layer| {
                layer
                    .neurons
                    .iter()
                    .copied()
                    .filter(|&id| !self.neurons[id.0].is_bias())
                    .collect()
            })
            .unwrap_or_default();
        self.output_neurons = self
            .layers
            .last()
            .map(|layer| layer.neurons.clone())
            .unwrap_or_default();
    }

    /// Sets the net input of every input neuron.
    pub fn set_input(&mut self, input: &[f64]) -> Result<()> {
        if input.len() != self.input_neurons.len() {
            return Err(NeuralError::VectorSizeMismatch {
                expected: self.input_neurons.len(),
                actual: input.len(),
            });
        }

        for (&id, &value) in self.input_neurons.iter().zip(input) {
            self.neurons[id.0].set_external_input(value);
        }

        Ok(())
    }

    /// Outputs of the output neurons, in order.
    pub fn output(&self) -> Vec<f64> {
        self.output_neurons.iter().map(|id| self.neurons[id.0].output).collect()
    }

    /// Forwards the current input through every layer in order.
    pub fn calculate(&mut self) {
        for index in 0..self.layers.len() {
            self.calculate_layer(index);
        }
    }

    /// Calculates the neurons of one layer.
    pub fn calculate_layer(&mut self, index: usize) {
        let Some(layer) = self.layers.get(index) else {
            return;
        };

        if layer.is_competitive() {
            self.compete(index);
        } else {
            for id in layer.neurons.clone() {
                self.calculate_neuron(id);
            }
        }
    }

    /// Recomputes one neuron from its incoming connections. Neurons without
    /// inputs keep their externally set net input.
    pub(crate) fn calculate_neuron(&mut self, id: NeuronId) {
        let neuron = &self.neurons[id.0];
        if neuron.takes_connection_input() {
            let competitive = matches!(neuron.kind, NeuronKind::Competitive { .. });
            let lateral = neuron.is_competing();
            let pairs = neuron
                .inputs
                .iter()
                .filter(|&&c| !competitive || self.is_lateral(c, neuron.layer) == lateral)
                .map(|&c| (self.connection_input(c), self.connections[c.0].weight().value()));
            let net = neuron.input_function.calculate(pairs);
            self.neurons[id.0].net_input = net;
        }
        self.neurons[id.0].fire();
    }

    /// Applies `update` to every input weight of a neuron, passing the
    /// input currently seen through that connection.
    pub(crate) fn update_input_weights(
        &mut self,
        neuron: NeuronId,
        mut update: impl FnMut(f64, &mut Weight),
    ) {
        for index in 0..self.neurons[neuron.0].inputs.len() {
            let id = self.neurons[neuron.0].inputs[index];
            let input = self.connection_input(id);
            update(input, self.connections[id.0].weight_mut());
        }
    }

    pub(crate) fn is_lateral(&self, connection: ConnectionId, layer: Option<LayerId>) -> bool {
        let from = self.connections[connection.0].from_neuron();
        self.neurons[from.0].layer == layer
    }

    /// Recalculates a competitive layer until exactly one neuron fires or
    /// the iteration cap is passed. Without convergence the previous winner
    /// is kept.
    fn compete(&mut self, index: usize) {
        let neurons = self.layers[index].neurons.clone();
        let max_iterations = self.layers[index]
            .competition
            .as_ref()
            .map_or(0, |competition| competition.max_iterations);

        let mut has_winner = false;
        let mut iterations = 0;
        while !has_winner {
            let mut firing = 0;
            for &id in &neurons {
                self.calculate_neuron(id);
                if self.neurons[id.0].output > 0.0 {
                    firing += 1;
                }
            }

            if iterations > max_iterations {
                break;
            }
            if firing == 1 {
                has_winner = true;
            }
            iterations += 1;
        }

        if !has_winner {
            debug!(layer = index, iterations, "competition did not converge");
            return;
        }

        let mut max_output = f64::MIN;
        let mut winner = None;
        for &id in &neurons {
            let neuron = &mut self.neurons[id.0];
            neuron.set_competing(false);
            if neuron.output > max_output {
                max_output = neuron.output;
                winner = Some(id);
            }
        }
        if let Some(competition) = self.layers[index].competition.as_mut() {
            competition.winner = winner;
        }
    }

    /// Zeroes net input and output of every neuron.
    pub fn reset(&mut self) {
        for index in 0..self.layers.len() {
            self.reset_layer(index);
        }
    }

    pub fn reset_layer(&mut self, index: usize) {
        if let Some(layer) = self.layers.get(index) {
            for id in layer.neurons.clone() {
                self.neurons[id.0].reset();
            }
        }
    }

    /// Randomizes every input weight into `[-0.5, 0.5)`.
    pub fn randomize_weights<R: Rng>(&mut self, rng: &mut R) {
        for index in 0..self.layers.len() {
            self.randomize_layer_weights(index, rng);
        }
    }

    pub fn randomize_layer_weights<R: Rng>(&mut self, index: usize, rng: &mut R) {
        for id in self.layer_connections(index) {
            self.connections[id.0].weight_mut().randomize(rng);
        }
    }

    /// Sets every input weight to `value`.
    pub fn initialize_weights(&mut self, value: f64) {
        for index in 0..self.layers.len() {
            self.initialize_layer_weights(index, value);
        }
    }

    pub fn initialize_layer_weights(&mut self, index: usize, value: f64) {
        for id in self.layer_connections(index) {
            self.connections[id.0].weight_mut().set_value(value);
        }
    }

    /// Draws every input weight uniformly from `[min, max)`.
    pub fn initialize_weights_in<R: Rng>(&mut self, min: f64, max: f64, rng: &mut R) {
        for index in 0..self.layers.len() {
            self.initialize_layer_weights_in(index, min, max, rng);
        }
    }

    pub fn initialize_layer_weights_in<R: Rng>(
        &mut self,
        index: usize,
        min: f64,
        max: f64,
        rng: &mut R,
    ) {
        for id in self.layer_connections(index) {
            self.connections[id.0].weight_mut().randomize_in(min, max, rng);
        }
    }

    fn layer_connections(&self, index: usize) -> Vec<ConnectionId> {
        self.layers
            .get(index)
            .map(|layer| {
                layer
                    .neurons
                    .iter()
                    .flat_map(|id| self.neurons[id.0].inputs.iter().copied())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Attaches `rule`, replacing any previous one.
    pub fn set_learning_rule(&mut self, rule: Box<dyn LearningRule>) {
        self.learning_rule = Some(rule);
    }

    /// The attached rule, if any.
    pub fn learning_rule(&self) -> Option<&dyn LearningRule> {
        self.learning_rule.as_deref()
    }

    pub fn learning_rule_mut(&mut self) -> Option<&mut (dyn LearningRule + 'static)> {
        self.learning_rule.as_deref_mut()
    }

    /// Detaches the rule and hands it back.
    pub fn take_learning_rule(&mut self) -> Option<Box<dyn LearningRule>> {
        self.learning_rule.take()
    }

    /// Trains with the attached rule on the calling thread.
    pub fn learn(&mut self, training_set: &TrainingSet) -> Result<()> {
        let mut rule = self.learning_rule.take().ok_or(NeuralError::NoLearningRule)?;
        let result = rule.learn(self, training_set);
        self.learning_rule = Some(rule);
        result
    }

    /// Runs the attached rule without claiming its control; the caller
    /// already holds the run guard.
    pub(crate) fn run_learning_rule(&mut self, training_set: &TrainingSet) -> Result<()> {
        let mut rule = self.learning_rule.take().ok_or(NeuralError::NoLearningRule)?;
        let result = rule.run(self, training_set);
        self.learning_rule = Some(rule);
        result
    }

    /// Trains until the total error drops below `max_error`.
    pub fn learn_to_error(&mut self, training_set: &TrainingSet, max_error: f64) -> Result<()> {
        self.learning_rule_mut().ok_or(NeuralError::NoLearningRule)?.set_max_error(max_error);
        self.learn(training_set)
    }

    /// Trains until the total error drops below `max_error` or
    /// `max_iterations` epochs have run.
    pub fn learn_to_error_within(
        &mut self,
        training_set: &TrainingSet,
        max_error: f64,
        max_iterations: usize,
    ) -> Result<()> {
        let rule = self.learning_rule_mut().ok_or(NeuralError::NoLearningRule)?;
        rule.set_max_error(max_error);
        rule.set_max_iterations(max_iterations);
        self.learn(training_set)
    }

    /// Asks the attached rule to stop after the current training pattern.
    pub fn stop_learning(&self) {
        if let Some(rule) = self.learning_rule() {
            rule.control().stop();
        }
    }
}

impl fmt::Debug for NeuralNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NeuralNetwork")
            .field("network_type", &self.network_type)
            .field("layers", &self.layers)
            .field("neurons", &self.neurons.len())
            .field("connections", &(self.connections.len() - self.free_connections.len()))
            .field("input_neurons", &self.input_neurons)
            .field("output_neurons", &self.output_neurons)
            .field("learning_rule", &self.learning_rule.as_ref().map(|rule| rule.name()))
            .finish()
    }
}
