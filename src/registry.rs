//! Name lookup for neuron and function types, for building networks from
//! textual configuration.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::error::NeuralError;
use crate::input::InputFunction;
use crate::input::SummingFunction;
use crate::input::WeightsFunction;
use crate::neuron::NeuronKindSpec;
use crate::neuron::NeuronSpec;
use crate::transfer::Transfer;

/// Declares a fieldless type-name enum with `FromStr` and `Display` over
/// the given snake_case names.
macro_rules! type_names {
    (
        $(#[$meta:meta])* $kind:literal,
        $name:ident { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = NeuralError;

            fn from_str(name: &str) -> Result<Self, Self::Err> {
                match name {
                    $($text => Ok($name::$variant),)+
                    _ => Err(NeuralError::UnknownType {
                        kind: $kind,
                        name: name.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

type_names! {
    "transfer function",
    TransferType {
        Linear => "linear",
        Step => "step",
        Ramp => "ramp",
        Sigmoid => "sigmoid",
        Tanh => "tanh",
        Trapezoid => "trapezoid",
        Gaussian => "gaussian",
        Sgn => "sgn",
    }
}

type_names! {
    "weights function",
    WeightsType {
        WeightedInput => "weighted_input",
        Difference => "difference",
    }
}

type_names! {
    "summing function",
    SummingType {
        Sum => "sum",
        SumSqr => "sum_sqr",
        Intensity => "intensity",
        And => "and",
        Or => "or",
        Min => "min",
        Max => "max",
        Product => "product",
    }
}

type_names! {
    "neuron type",
    NeuronType {
        Neuron => "neuron",
        Bias => "bias",
        Threshold => "threshold",
        InputOutput => "input_output",
        Delayed => "delayed",
        Competitive => "competitive",
    }
}

impl TransferType {
    /// The transfer function with its default parameters.
    pub fn build(self) -> Transfer {
        match self {
            TransferType::Linear => Transfer::linear(),
            TransferType::Step => Transfer::step(),
            TransferType::Ramp => Transfer::ramp(),
            TransferType::Sigmoid => Transfer::sigmoid(),
            TransferType::Tanh => Transfer::tanh(),
            TransferType::Trapezoid => Transfer::trapezoid(),
            TransferType::Gaussian => Transfer::gaussian(),
            TransferType::Sgn => Transfer::Sgn,
        }
    }
}

impl From<WeightsType> for WeightsFunction {
    fn from(kind: WeightsType) -> Self {
        match kind {
            WeightsType::WeightedInput => WeightsFunction::WeightedInput,
            WeightsType::Difference => WeightsFunction::Difference,
        }
    }
}

impl From<SummingType> for SummingFunction {
    fn from(kind: SummingType) -> Self {
        match kind {
            SummingType::Sum => SummingFunction::Sum,
            SummingType::SumSqr => SummingFunction::SumSqr,
            SummingType::Intensity => SummingFunction::Intensity,
            SummingType::And => SummingFunction::And,
            SummingType::Or => SummingFunction::Or,
            SummingType::Min => SummingFunction::Min,
            SummingType::Max => SummingFunction::Max,
            SummingType::Product => SummingFunction::Product,
        }
    }
}

impl From<NeuronType> for NeuronKindSpec {
    /// Threshold neurons get a random threshold, input/output neurons a
    /// zero bias.
    fn from(kind: NeuronType) -> Self {
        match kind {
            NeuronType::Neuron => NeuronKindSpec::Standard,
            NeuronType::Bias => NeuronKindSpec::Bias,
            NeuronType::Threshold => NeuronKindSpec::Threshold { thresh: None },
            NeuronType::InputOutput => NeuronKindSpec::InputOutput { bias: 0.0 },
            NeuronType::Delayed => NeuronKindSpec::Delayed,
            NeuronType::Competitive => NeuronKindSpec::Competitive,
        }
    }
}

impl NeuronSpec {
    /// Builds a spec from type names. The weighted-input/sum pair maps to
    /// the fused weighted sum.
    pub fn from_names(
        neuron: &str,
        weights: &str,
        summing: &str,
        transfer: &str,
    ) -> crate::error::Result<Self> {
        let kind = neuron.parse::<NeuronType>()?.into();
        let weights: WeightsType = weights.parse()?;
        let summing: SummingType = summing.parse()?;
        let transfer = transfer.parse::<TransferType>()?.build();

        let input = match (weights, summing) {
            (WeightsType::WeightedInput, SummingType::Sum) => InputFunction::WeightedSum,
            (weights, summing) => InputFunction::composite(weights.into(), summing.into()),
        };

        Ok(NeuronSpec { kind, input, transfer })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_display() {
        for kind in TransferType::ALL {
            assert_eq!(kind.to_string().parse::<TransferType>().unwrap(), *kind);
        }
        for kind in SummingType::ALL {
            assert_eq!(kind.as_str().parse::<SummingType>().unwrap(), *kind);
        }
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert_eq!(
            "softmax".parse::<TransferType>(),
            Err(NeuralError::UnknownType {
                kind: "transfer function",
                name: "softmax".into()
            })
        );
        assert!("Sum".parse::<SummingType>().is_err());
    }

    #[test]
    fn spec_from_names() {
        let spec = NeuronSpec::from_names("threshold", "weighted_input", "sum", "step").unwrap();
        assert_eq!(spec.kind, NeuronKindSpec::Threshold { thresh: None });
        assert_eq!(spec.input, InputFunction::WeightedSum);
        assert_eq!(spec.transfer, Transfer::step());

        let spec = NeuronSpec::from_names("neuron", "difference", "intensity", "gaussian").unwrap();
        assert_eq!(
            spec.input,
            InputFunction::composite(WeightsFunction::Difference, SummingFunction::Intensity)
        );
    }

    #[test]
    fn bad_name_fails_the_whole_spec() {
        assert!(NeuronSpec::from_names("neuron", "weighted_input", "sum", "relu").is_err());
    }
}
