use std::ops::Index;

use serde::Deserialize;
use serde::Serialize;

use crate::error::NeuralError;
use crate::error::Result;

/// One training example: an input vector and, for supervised learning,
/// the desired output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingElement {
    input: Vec<f64>,
    desired_output: Option<Vec<f64>>,
    label: Option<String>,
}

impl TrainingElement {
    pub fn unsupervised(input: Vec<f64>) -> Self {
        Self {
            input,
            desired_output: None,
            label: None,
        }
    }

    pub fn supervised(input: Vec<f64>, desired_output: Vec<f64>) -> Self {
        Self {
            input,
            desired_output: Some(desired_output),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn input(&self) -> &[f64] {
        &self.input
    }

    pub fn desired_output(&self) -> Option<&[f64]> {
        self.desired_output.as_deref()
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn is_supervised(&self) -> bool {
        self.desired_output.is_some()
    }
}

/// Ordered collection of training elements. A non-zero input or output
/// size is enforced on every insertion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingSet {
    elements: Vec<TrainingElement>,
    input_size: usize,
    output_size: usize,
    label: Option<String>,
}

impl TrainingSet {
    /// An unconstrained training set.
    pub fn new() -> Self {
        Self::default()
    }

    /// A training set whose inputs must have `input_size` elements and
    /// desired outputs `output_size` elements; 0 leaves a side unconstrained.
    pub fn with_sizes(input_size: usize, output_size: usize) -> Self {
        Self {
            input_size,
            output_size,
            ..Self::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn add(&mut self, element: TrainingElement) -> Result<()> {
        if self.input_size != 0 && element.input.len() != self.input_size {
            return Err(NeuralError::VectorSizeMismatch {
                expected: self.input_size,
                actual: element.input.len(),
            });
        }
        if let Some(desired) = &element.desired_output {
            if self.output_size != 0 && desired.len() != self.output_size {
                return Err(NeuralError::VectorSizeMismatch {
                    expected: self.output_size,
                    actual: desired.len(),
                });
            }
        }

        self.elements.push(element);
        Ok(())
    }

    pub fn add_supervised(&mut self, input: Vec<f64>, desired_output: Vec<f64>) -> Result<()> {
        self.add(TrainingElement::supervised(input, desired_output))
    }

    pub fn add_unsupervised(&mut self, input: Vec<f64>) -> Result<()> {
        self.add(TrainingElement::unsupervised(input))
    }

    pub fn remove(&mut self, index: usize) -> Option<TrainingElement> {
        (index < self.elements.len()).then(|| self.elements.remove(index))
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }

    pub fn get(&self, index: usize) -> Option<&TrainingElement> {
        self.elements.get(index)
    }

    pub fn elements(&self) -> &[TrainingElement] {
        &self.elements
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TrainingElement> {
        self.elements.iter()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn output_size(&self) -> usize {
        self.output_size
    }

    /// True when the set holds at least one element and every element
    /// carries a desired output.
    pub fn is_supervised(&self) -> bool {
        !self.elements.is_empty() && self.elements.iter().all(TrainingElement::is_supervised)
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

impl Index<usize> for TrainingSet {
    type Output = TrainingElement;

    fn index(&self, index: usize) -> &Self::Output {
        &self.elements[index]
    }
}

impl<'a> IntoIterator for &'a TrainingSet {
    type Item = &'a TrainingElement;
    type IntoIter = std::slice::Iter<'a, TrainingElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}
