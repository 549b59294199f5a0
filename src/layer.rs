use serde::Deserialize;
use serde::Serialize;

use crate::neuron::NeuronId;

/// Default iteration cap of a winner-take-all layer.
pub const DEFAULT_COMPETITION_ITERATIONS: usize = 100;

/// Stable identity of a layer, unaffected by layer insertion or removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerId(pub(crate) usize);

/// Winner-take-all state of a competitive layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competition {
    pub max_iterations: usize,
    pub(crate) winner: Option<NeuronId>,
}

impl Default for Competition {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_COMPETITION_ITERATIONS,
            winner: None,
        }
    }
}

/// Ordered group of neurons. Position inside the layer is meaningful to
/// several learning rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub(crate) id: LayerId,
    pub(crate) neurons: Vec<NeuronId>,
    pub(crate) competition: Option<Competition>,
}

impl Layer {
    pub(crate) fn new(id: LayerId, competition: Option<Competition>) -> Self {
        Self {
            id,
            neurons: Vec::new(),
            competition,
        }
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn neurons(&self) -> &[NeuronId] {
        &self.neurons
    }

    pub fn neuron_at(&self, index: usize) -> Option<NeuronId> {
        self.neurons.get(index).copied()
    }

    pub fn index_of(&self, neuron: NeuronId) -> Option<usize> {
        self.neurons.iter().position(|&id| id == neuron)
    }

    pub fn len(&self) -> usize {
        self.neurons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neurons.is_empty()
    }

    pub fn is_competitive(&self) -> bool {
        self.competition.is_some()
    }

    /// Neuron that won the last converged competition.
    pub fn winner(&self) -> Option<NeuronId> {
        self.competition.as_ref().and_then(|competition| competition.winner)
    }

    pub fn competition(&self) -> Option<&Competition> {
        self.competition.as_ref()
    }

    pub fn competition_mut(&mut self) -> Option<&mut Competition> {
        self.competition.as_mut()
    }
}
