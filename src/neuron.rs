use std::collections::VecDeque;

use serde::Deserialize;
use serde::Serialize;

use crate::connection::ConnectionId;
use crate::input::InputFunction;
use crate::layer::LayerId;
use crate::random;
use crate::transfer::Transfer;
use crate::transfer::TransferFunction;

/// Number of past outputs a delayed neuron remembers.
pub const DELAY_BUFFER_SIZE: usize = 5;

/// Handle of a neuron inside its owning network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NeuronId(pub(crate) usize);

impl NeuronId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Output history of a delayed neuron, most recent first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelayBuffer {
    history: VecDeque<f64>,
}

impl DelayBuffer {
    pub fn new() -> Self {
        Self {
            history: VecDeque::from([0.0]),
        }
    }

    pub fn push(&mut self, output: f64) {
        self.history.push_front(output);
        self.history.truncate(DELAY_BUFFER_SIZE);
    }

    /// Output `delay` calculations ago; 0 is the latest. Slots not yet
    /// filled read as 0.
    pub fn get(&self, delay: usize) -> f64 {
        self.history.get(delay).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

impl Default for DelayBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Behavioural variant of a neuron and the state that variant carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NeuronKind {
    Standard,
    /// Always outputs 1.
    Bias,
    /// Applies the transfer function to `net - thresh`.
    Threshold { thresh: f64 },
    /// Serves as both input and output; an externally set net input is
    /// used for exactly one calculation.
    InputOutput {
        bias: f64,
        #[serde(skip)]
        external_input: bool,
    },
    /// Remembers its recent outputs for delayed connections.
    Delayed { history: DelayBuffer },
    /// Alternates between feed-forward and lateral input; driven by a
    /// competitive layer.
    Competitive {
        history: DelayBuffer,
        #[serde(skip)]
        competing: bool,
    },
}

/// A single unit of the network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neuron {
    pub(crate) net_input: f64,
    pub(crate) output: f64,
    pub(crate) error: f64,
    pub(crate) input_function: InputFunction,
    pub(crate) transfer: Transfer,
    pub(crate) kind: NeuronKind,
    pub(crate) inputs: Vec<ConnectionId>,
    pub(crate) outputs: Vec<ConnectionId>,
    pub(crate) layer: Option<LayerId>,
    /// Set once the neuron is removed; its handle is stale from then on.
    #[serde(default)]
    pub(crate) removed: bool,
}

impl Neuron {
    pub(crate) fn from_spec(spec: &NeuronSpec) -> Self {
        let kind = match spec.kind {
            NeuronKindSpec::Standard => NeuronKind::Standard,
            NeuronKindSpec::Bias => NeuronKind::Bias,
            NeuronKindSpec::Threshold { thresh } => NeuronKind::Threshold {
                thresh: thresh.unwrap_or_else(random::next_f64),
            },
            NeuronKindSpec::InputOutput { bias } => NeuronKind::InputOutput {
                bias,
                external_input: false,
            },
            NeuronKindSpec::Delayed => NeuronKind::Delayed {
                history: DelayBuffer::new(),
            },
            NeuronKindSpec::Competitive => NeuronKind::Competitive {
                history: DelayBuffer::new(),
                competing: false,
            },
        };
        let output = if kind == NeuronKind::Bias { 1.0 } else { 0.0 };

        Self {
            net_input: 0.0,
            output,
            error: 0.0,
            input_function: spec.input,
            transfer: spec.transfer,
            kind,
            inputs: Vec::new(),
            outputs: Vec::new(),
            layer: None,
            removed: false,
        }
    }

    pub fn net_input(&self) -> f64 {
        self.net_input
    }

    pub fn output(&self) -> f64 {
        self.output
    }

    pub fn error(&self) -> f64 {
        self.error
    }

    pub fn input_function(&self) -> &InputFunction {
        &self.input_function
    }

    pub fn transfer(&self) -> &Transfer {
        &self.transfer
    }

    pub fn kind(&self) -> &NeuronKind {
        &self.kind
    }

    pub fn input_connections(&self) -> &[ConnectionId] {
        &self.inputs
    }

    pub fn output_connections(&self) -> &[ConnectionId] {
        &self.outputs
    }

    pub fn has_input_connections(&self) -> bool {
        !self.inputs.is_empty()
    }

    pub fn layer(&self) -> Option<LayerId> {
        self.layer
    }

    pub fn is_bias(&self) -> bool {
        matches!(self.kind, NeuronKind::Bias)
    }

    pub fn thresh(&self) -> Option<f64> {
        match self.kind {
            NeuronKind::Threshold { thresh } => Some(thresh),
            _ => None,
        }
    }

    /// Returns `false` when the neuron has no threshold.
    pub fn set_thresh(&mut self, value: f64) -> bool {
        match &mut self.kind {
            NeuronKind::Threshold { thresh } => {
                *thresh = value;
                true
            }
            _ => false,
        }
    }

    pub fn bias(&self) -> Option<f64> {
        match self.kind {
            NeuronKind::InputOutput { bias, .. } => Some(bias),
            _ => None,
        }
    }

    pub fn is_competing(&self) -> bool {
        matches!(self.kind, NeuronKind::Competitive { competing: true, .. })
    }

    pub(crate) fn set_competing(&mut self, value: bool) {
        if let NeuronKind::Competitive { competing, .. } = &mut self.kind {
            *competing = value;
        }
    }

    pub(crate) fn delay_buffer(&self) -> Option<&DelayBuffer> {
        match &self.kind {
            NeuronKind::Delayed { history } | NeuronKind::Competitive { history, .. } => {
                Some(history)
            }
            _ => None,
        }
    }

    /// Output `delay` calculations ago, or the current output for neurons
    /// that keep no history.
    pub fn delayed_output(&self, delay: usize) -> f64 {
        match self.delay_buffer() {
            Some(history) => history.get(delay),
            None => self.output,
        }
    }

    /// Sets the net input from outside the network (input neurons).
    pub(crate) fn set_external_input(&mut self, value: f64) {
        self.net_input = value;
        if let NeuronKind::InputOutput { external_input, .. } = &mut self.kind {
            *external_input = true;
        }
    }

    /// Whether the next calculation should recompute the net input from
    /// the given incoming connections.
    pub(crate) fn takes_connection_input(&self) -> bool {
        match self.kind {
            NeuronKind::Bias => false,
            NeuronKind::InputOutput { external_input, .. } => {
                !external_input && self.has_input_connections()
            }
            NeuronKind::Competitive { .. } => true,
            _ => self.has_input_connections(),
        }
    }

    /// Applies the transfer function to the current net input and updates
    /// the per-kind state.
    pub(crate) fn fire(&mut self) {
        match &mut self.kind {
            NeuronKind::Bias => {
                self.output = 1.0;
            }
            NeuronKind::Threshold { thresh } => {
                self.output = self.transfer.output(self.net_input - *thresh);
            }
            NeuronKind::InputOutput {
                bias,
                external_input,
            } => {
                self.output = self.transfer.output(self.net_input + *bias);
                if *external_input {
                    *external_input = false;
                    self.net_input = 0.0;
                }
            }
            NeuronKind::Delayed { history } => {
                self.output = self.transfer.output(self.net_input);
                history.push(self.output);
            }
            NeuronKind::Competitive { history, competing } => {
                self.output = self.transfer.output(self.net_input);
                history.push(self.output);
                *competing = true;
            }
            NeuronKind::Standard => {
                self.output = self.transfer.output(self.net_input);
            }
        }
    }

    pub(crate) fn reset(&mut self) {
        self.net_input = 0.0;
        self.output = if self.is_bias() { 1.0 } else { 0.0 };
        self.set_competing(false);
    }
}

/// Construction-time choice of neuron variant.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NeuronKindSpec {
    #[default]
    Standard,
    Bias,
    /// `None` draws the threshold uniformly from `[0, 1)`.
    Threshold {
        thresh: Option<f64>,
    },
    InputOutput {
        bias: f64,
    },
    Delayed,
    Competitive,
}

/// Typed recipe for building neurons.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NeuronSpec {
    pub kind: NeuronKindSpec,
    pub input: InputFunction,
    pub transfer: Transfer,
}

impl NeuronSpec {
    pub fn new(transfer: Transfer) -> Self {
        Self {
            transfer,
            ..Self::default()
        }
    }

    pub fn with_kind(mut self, kind: NeuronKindSpec) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_input(mut self, input: InputFunction) -> Self {
        self.input = input;
        self
    }

    pub fn with_transfer(mut self, transfer: Transfer) -> Self {
        self.transfer = transfer;
        self
    }

    pub fn bias() -> Self {
        Self::default().with_kind(NeuronKindSpec::Bias)
    }
}
