use approx::assert_relative_eq;

use neurograph::registry::TransferType;
use neurograph::InputFunction;
use neurograph::NeuralError;
use neurograph::SummingFunction;
use neurograph::Transfer;
use neurograph::TransferFunction;
use neurograph::WeightsFunction;

/// Net inputs from -5 to 5 in steps of 0.25.
fn nets() -> impl Iterator<Item = f64> {
    (-20..=20).map(|i| f64::from(i) * 0.25)
}

fn numeric_derivative(transfer: &Transfer, net: f64) -> f64 {
    let h = 1e-6;
    (transfer.output(net + h) - transfer.output(net - h)) / (2.0 * h)
}

#[test]
fn test_derivatives_match_finite_differences() {
    let transfers = [
        Transfer::linear(),
        Transfer::Linear { slope: 2.5 },
        Transfer::sigmoid(),
        Transfer::Sigmoid { slope: 3.0 },
        Transfer::gaussian(),
        Transfer::Gaussian { sigma: 1.5 },
    ];
    for transfer in &transfers {
        for net in nets() {
            let derivative = transfer.derivative(net).unwrap();
            assert_relative_eq!(derivative, numeric_derivative(transfer, net), epsilon = 1e-6);
        }
    }
}

#[test]
fn test_tanh() {
    let tanh = Transfer::Tanh { slope: 2.0 };
    assert_eq!(tanh.output(0.0), 0.0);
    for net in nets() {
        let o = tanh.output(net);
        assert!(o > -1.0 && o < 1.0);
        assert_relative_eq!(tanh.derivative(net).unwrap(), 2.0 * (1.0 - o * o), epsilon = 1e-12);
    }
}

#[test]
fn test_tanh_derivative_is_twice_the_slope() {
    let tanh = Transfer::tanh();
    assert_relative_eq!(tanh.derivative(0.0).unwrap(), 1.0);
    assert_relative_eq!(numeric_derivative(&tanh, 0.0), 0.5, epsilon = 1e-6);

    for transfer in [Transfer::tanh(), Transfer::Tanh { slope: 3.0 }] {
        for net in nets() {
            let derivative = transfer.derivative(net).unwrap();
            let numeric = numeric_derivative(&transfer, net);
            assert_relative_eq!(derivative, 2.0 * numeric, epsilon = 1e-6);
        }
    }
}

#[test]
fn test_sigmoid_midpoint() {
    assert_eq!(Transfer::sigmoid().output(0.0), 0.5);
    assert_eq!(Transfer::sigmoid().derivative(0.0), Some(0.25));
}

#[test]
fn test_step_and_sgn() {
    let step = Transfer::Step { y_high: 1.0, y_low: -1.0 };
    assert_eq!(step.output(0.0), -1.0);
    assert_eq!(step.output(1e-9), 1.0);
    assert_eq!(step.derivative(0.5), None);

    assert_eq!(Transfer::Sgn.output(0.0), -1.0);
    assert_eq!(Transfer::Sgn.output(0.2), 1.0);
    assert_eq!(Transfer::Sgn.derivative(0.2), None);
}

#[test]
fn test_ramp() {
    let ramp = Transfer::ramp();
    assert_eq!(ramp.output(-1.0), 0.0);
    assert_eq!(ramp.output(0.5), 0.5);
    assert_eq!(ramp.output(2.0), 1.0);
    assert_eq!(ramp.derivative(0.5), None);
}

#[test]
fn test_trapezoid() {
    let trapezoid = Transfer::trapezoid();
    assert_eq!(trapezoid.output(-1.0), 0.0);
    assert_relative_eq!(trapezoid.output(0.5), 0.5);
    assert_eq!(trapezoid.output(1.5), 1.0);
    assert_relative_eq!(trapezoid.output(2.5), 0.5);
    assert_eq!(trapezoid.output(4.0), 0.0);
}

#[test]
fn test_summing_functions() {
    let vector = [0.2, 0.6, -0.4];
    assert_relative_eq!(SummingFunction::Sum.calculate(&vector), 0.4, epsilon = 1e-12);
    assert_relative_eq!(SummingFunction::SumSqr.calculate(&vector), 0.56, epsilon = 1e-12);
    let intensity = SummingFunction::Intensity.calculate(&vector);
    assert_relative_eq!(intensity, -(0.56f64).sqrt(), epsilon = 1e-12);
    assert_eq!(SummingFunction::Min.calculate(&vector), -0.4);
    assert_eq!(SummingFunction::Max.calculate(&vector), 0.6);
    assert_relative_eq!(SummingFunction::Product.calculate(&vector), -0.048, epsilon = 1e-12);

    assert_eq!(SummingFunction::And.calculate(&vector), 0.0);
    assert_eq!(SummingFunction::And.calculate(&[0.5, 0.9]), 1.0);
    assert_eq!(SummingFunction::Or.calculate(&vector), 1.0);
    assert_eq!(SummingFunction::Or.calculate(&[0.1, 0.49]), 0.0);
}

#[test]
fn test_weights_functions() {
    let (inputs, weights) = ([1.0, 2.0], [0.5, -1.0]);
    assert_eq!(WeightsFunction::WeightedInput.calculate(&inputs, &weights), vec![0.5, -2.0]);
    assert_eq!(WeightsFunction::Difference.calculate(&inputs, &weights), vec![0.5, 3.0]);
}

#[test]
fn test_weighted_sum_matches_composite() {
    let pairs = [(0.31, -1.7), (2.9, 0.013), (-0.4, 0.77), (1.0, 1.0)];
    let fused = InputFunction::WeightedSum.calculate(pairs);
    let composite = InputFunction::composite(WeightsFunction::WeightedInput, SummingFunction::Sum)
        .calculate(pairs);
    assert_eq!(fused, composite);
}

#[test]
fn test_transfer_names() {
    for ty in TransferType::ALL {
        assert_eq!(ty.as_str().parse::<TransferType>(), Ok(*ty));
    }
    assert_eq!("sigmoid".parse::<TransferType>().map(TransferType::build), Ok(Transfer::sigmoid()));
    assert!(matches!(
        "softmax".parse::<TransferType>(),
        Err(NeuralError::UnknownType { kind: "transfer function", .. })
    ));
}
