//! Input functions reduce a neuron's incoming `(input, weight)` pairs to a
//! single net input.
//!
//! An input function is either the fused [`InputFunction::WeightedSum`] or a
//! composition of a [`WeightsFunction`] (applied pairwise) and a
//! [`SummingFunction`] (reducing the resulting vector). `WeightedSum` and
//! `WeightedInput` followed by `Sum` produce bit-identical results.

use serde::Deserialize;
use serde::Serialize;

/// Pairwise combination of a connection's input and weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightsFunction {
    /// `input * weight`
    #[default]
    WeightedInput,
    /// `input - weight`, for distance based layers.
    Difference,
}

impl WeightsFunction {
    pub fn apply(&self, input: f64, weight: f64) -> f64 {
        match self {
            WeightsFunction::WeightedInput => input * weight,
            WeightsFunction::Difference => input - weight,
        }
    }

    /// Elementwise application over parallel input and weight slices.
    pub fn calculate(&self, inputs: &[f64], weights: &[f64]) -> Vec<f64> {
        inputs
            .iter()
            .zip(weights)
            .map(|(&input, &weight)| self.apply(input, weight))
            .collect()
    }
}

/// Reduction of the weighted vector to one scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummingFunction {
    #[default]
    Sum,
    SumSqr,
    /// Negative euclidean norm, `-sqrt(sum(x^2))`.
    Intensity,
    /// 1 when every element is at least 0.5, else 0.
    And,
    /// 1 when any element is at least 0.5, else 0.
    Or,
    Min,
    Max,
    Product,
}

impl SummingFunction {
    pub fn calculate(&self, vector: &[f64]) -> f64 {
        use SummingFunction::*;

        match self {
            Sum => vector.iter().fold(0.0, |sum, &x| sum + x),
            SumSqr => vector.iter().fold(0.0, |sum, &x| sum + x * x),
            Intensity => -vector.iter().fold(0.0, |sum, &x| sum + x * x).sqrt(),
            And => bool_to_unit(vector.iter().all(|&x| x >= 0.5)),
            Or => bool_to_unit(vector.iter().any(|&x| x >= 0.5)),
            Min => vector.iter().copied().fold(f64::INFINITY, f64::min),
            Max => vector.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Product => vector.iter().fold(1.0, |product, &x| product * x),
        }
    }
}

fn bool_to_unit(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputFunction {
    /// `sum(input * weight)` without materialising the weighted vector.
    WeightedSum,
    Composite {
        weights: WeightsFunction,
        summing: SummingFunction,
    },
}

impl InputFunction {
    pub fn composite(weights: WeightsFunction, summing: SummingFunction) -> Self {
        InputFunction::Composite { weights, summing }
    }

    /// Net input for the given `(input, weight)` pairs.
    pub fn calculate<I>(&self, pairs: I) -> f64
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        match self {
            InputFunction::WeightedSum => pairs
                .into_iter()
                .fold(0.0, |sum, (input, weight)| sum + input * weight),
            InputFunction::Composite { weights, summing } => {
                let vector: Vec<f64> = pairs
                    .into_iter()
                    .map(|(input, weight)| weights.apply(input, weight))
                    .collect();
                summing.calculate(&vector)
            }
        }
    }
}

impl Default for InputFunction {
    fn default() -> Self {
        InputFunction::WeightedSum
    }
}
