use serde::Deserialize;
use serde::Serialize;

/// Implement this trait to your struct to have custom transfer functions.
pub trait TransferFunction {
    /// Neuron output for the given net input.
    fn output(&self, net: f64) -> f64;

    /// First derivative at `net`, `None` when the function is not differentiable.
    fn derivative(&self, net: f64) -> Option<f64>;
}

/// Builtin transfer functions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Transfer {
    Linear {
        slope: f64,
    },
    Step {
        y_high: f64,
        y_low: f64,
    },
    Ramp {
        slope: f64,
        x_low: f64,
        x_high: f64,
        y_low: f64,
        y_high: f64,
    },
    Sigmoid {
        slope: f64,
    },
    Tanh {
        slope: f64,
    },
    Gaussian {
        sigma: f64,
    },
    Sgn,
    Trapezoid {
        left_low: f64,
        left_high: f64,
        right_low: f64,
        right_high: f64,
    },
}

impl Transfer {
    pub fn linear() -> Self {
        Transfer::Linear { slope: 1.0 }
    }

    pub fn step() -> Self {
        Transfer::Step {
            y_high: 1.0,
            y_low: 0.0,
        }
    }

    pub fn ramp() -> Self {
        Transfer::Ramp {
            slope: 1.0,
            x_low: 0.0,
            x_high: 1.0,
            y_low: 0.0,
            y_high: 1.0,
        }
    }

    pub fn sigmoid() -> Self {
        Transfer::Sigmoid { slope: 1.0 }
    }

    pub fn tanh() -> Self {
        Transfer::Tanh { slope: 1.0 }
    }

    pub fn gaussian() -> Self {
        Transfer::Gaussian { sigma: 0.5 }
    }

    pub fn trapezoid() -> Self {
        Transfer::Trapezoid {
            left_low: 0.0,
            left_high: 1.0,
            right_low: 3.0,
            right_high: 2.0,
        }
    }
}

impl Default for Transfer {
    fn default() -> Self {
        Transfer::linear()
    }
}

impl TransferFunction for Transfer {
    fn output(&self, net: f64) -> f64 {
        use Transfer::*;

        match *self {
            Linear { slope } => slope * net,
            Step { y_high, y_low } => {
                if net > 0.0 {
                    y_high
                } else {
                    y_low
                }
            }
            Ramp {
                slope,
                x_low,
                x_high,
                y_low,
                y_high,
            } => {
                if net < x_low {
                    y_low
                } else if net > x_high {
                    y_high
                } else {
                    slope * net
                }
            }
            Sigmoid { slope } => 1.0 / (1.0 + (-slope * net).exp()),
            Tanh { slope } => {
                let e = (-slope * net).exp();
                (1.0 - e) / (1.0 + e)
            }
            Gaussian { sigma } => (-0.5 * (net / sigma).powi(2)).exp(),
            Sgn => {
                if net > 0.0 {
                    1.0
                } else {
                    -1.0
                }
            }
            Trapezoid {
                left_low,
                left_high,
                right_low,
                right_high,
            } => {
                if net >= left_high && net <= right_high {
                    1.0
                } else if net > left_low && net < left_high {
                    (net - left_low) / (left_high - left_low)
                } else if net > right_high && net < right_low {
                    (right_low - net) / (right_low - right_high)
                } else {
                    0.0
                }
            }
        }
    }

    fn derivative(&self, net: f64) -> Option<f64> {
        use Transfer::*;

        match *self {
            Linear { slope } => Some(slope),
            Sigmoid { slope } => {
                let o = self.output(net);
                Some(slope * o * (1.0 - o))
            }
            // The output is tanh(slope * net / 2), so this is twice its true
            // slope. Backpropagation depends on the larger step.
            Tanh { slope } => {
                let o = self.output(net);
                Some(slope * (1.0 - o * o))
            }
            Gaussian { sigma } => {
                let o = self.output(net);
                Some(o * (-net / (sigma * sigma)))
            }
            Step { .. } | Ramp { .. } | Sgn | Trapezoid { .. } => None,
        }
    }
}
