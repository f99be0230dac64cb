//! Residual and boundary-penalty construction.
//!
//! The solver only knows how to minimise a sum of squares of real numbers.
//! [`ImpedanceProblem`] turns a complex, bounded fit into that form: the
//! weighted complex misfit at `N` frequencies is split into `2N` interleaved
//! real and imaginary parts, and one penalty element per parameter is
//! appended, giving `2N + P` residuals.

use std::f64::consts::PI;

use ndarray::Array1;
use num_complex::Complex64;

use crate::error::{Result, ZFitError};
use crate::model::ModelPlugin;
use crate::parameters::Bounds;
use crate::problem::Problem;
use crate::spectrum::TargetSpectrum;

/// Convert frequencies in Hz to angular frequencies in rad/s.
pub fn angular_frequencies(frequencies_hz: &Array1<f64>) -> Array1<f64> {
    frequencies_hz.mapv(|f| 2.0 * PI * f)
}

/// Weighted data residuals, real and imaginary parts interleaved.
///
/// Element `2i` is `Re((target[i] - predicted[i]) * weight[i])`, element
/// `2i + 1` the imaginary part. The output always has `2N` entries.
///
/// # Errors
///
/// * `ZFitError::DimensionMismatch` if `predicted` does not have one value
///   per target sample
pub fn data_residuals(
    target: &TargetSpectrum,
    predicted: &Array1<Complex64>,
) -> Result<Array1<f64>> {
    let n = target.len();
    if predicted.len() != n {
        return Err(ZFitError::DimensionMismatch(format!(
            "model returned {} impedances for {} frequencies",
            predicted.len(),
            n
        )));
    }

    let mut out = Array1::zeros(2 * n);
    for i in 0..n {
        let diff = (target.impedance[i] - predicted[i]) * target.weights[i];
        out[2 * i] = diff.re;
        out[2 * i + 1] = diff.im;
    }
    Ok(out)
}

/// Unscaled penalty per parameter, see [`Bounds::penalty`].
pub fn boundary_penalties(params: &Array1<f64>, bounds: &[Bounds]) -> Array1<f64> {
    params
        .iter()
        .zip(bounds.iter())
        .map(|(&x, b)| b.penalty(x))
        .collect()
}

/// Penalties scaled by `penalty_weight · n_samples`.
///
/// The data cost grows with the number of samples; scaling the penalty the
/// same way keeps the constraint strength independent of dataset size.
pub fn scaled_penalties(
    params: &Array1<f64>,
    bounds: &[Bounds],
    penalty_weight: f64,
    n_samples: usize,
) -> Array1<f64> {
    let scale = penalty_weight * n_samples as f64;
    boundary_penalties(params, bounds).mapv(|p| scale * p)
}

/// A fit of one model plugin against one target spectrum, as a least-squares problem.
///
/// Holds only borrowed, immutable inputs, so any number of problems can be
/// evaluated concurrently.
pub struct ImpedanceProblem<'a, M: ModelPlugin + ?Sized> {
    model: &'a M,
    target: &'a TargetSpectrum,
    omega: Array1<f64>,
    bounds: Vec<Bounds>,
}

impl<'a, M: ModelPlugin + ?Sized> ImpedanceProblem<'a, M> {
    /// Bind a model to a target. The target is validated first.
    pub fn new(model: &'a M, target: &'a TargetSpectrum) -> Result<Self> {
        target.validate()?;
        let weight = model.penalty_weight();
        if !(weight.is_finite() && weight > 0.0) {
            return Err(ZFitError::Configuration(format!(
                "model '{}': penalty weight must be positive and finite, got {}",
                model.name(),
                weight
            )));
        }
        Ok(Self {
            model,
            target,
            omega: target.angular_frequencies(),
            bounds: model.parameter_spec().bounds(),
        })
    }

    pub fn model(&self) -> &M {
        self.model
    }

    pub fn target(&self) -> &TargetSpectrum {
        self.target
    }

    /// Number of frequency samples `N`.
    pub fn sample_count(&self) -> usize {
        self.target.len()
    }

    /// Model impedance at the target's frequencies.
    pub fn predict(&self, params: &Array1<f64>) -> Result<Array1<Complex64>> {
        self.check_len(params)?;
        Ok(self.model.evaluate(&self.omega, params))
    }

    /// The `2N` data residuals alone.
    pub fn data_residuals(&self, params: &Array1<f64>) -> Result<Array1<f64>> {
        let predicted = self.predict(params)?;
        data_residuals(self.target, &predicted)
    }

    /// The `P` scaled penalty elements alone.
    pub fn penalties(&self, params: &Array1<f64>) -> Result<Array1<f64>> {
        self.check_len(params)?;
        Ok(scaled_penalties(
            params,
            &self.bounds,
            self.model.penalty_weight(),
            self.sample_count(),
        ))
    }

    fn check_len(&self, params: &Array1<f64>) -> Result<()> {
        let expected = self.model.parameter_count();
        if params.len() != expected {
            return Err(ZFitError::DimensionMismatch(format!(
                "model '{}' takes {} parameters, got {}",
                self.model.name(),
                expected,
                params.len()
            )));
        }
        Ok(())
    }
}

impl<'a, M: ModelPlugin + ?Sized> Problem for ImpedanceProblem<'a, M> {
    /// Combined residual vector of length `2N + P`.
    ///
    /// A non-finite element is an evaluation failure, reported with the
    /// offending parameter vector instead of being masked.
    fn eval(&self, params: &Array1<f64>) -> Result<Array1<f64>> {
        let data = self.data_residuals(params)?;
        let penalties = self.penalties(params)?;

        let n_data = data.len();
        let mut combined = Vec::with_capacity(n_data + penalties.len());
        combined.extend(data.iter().copied());
        combined.extend(penalties.iter().copied());

        if let Some(pos) = combined.iter().position(|r| !r.is_finite()) {
            let message = if pos < n_data {
                format!(
                    "model '{}' gave a non-finite impedance at {} Hz",
                    self.model.name(),
                    self.target.frequencies_hz[pos / 2]
                )
            } else {
                format!(
                    "non-finite penalty for parameter '{}'",
                    self.model.parameter_spec().entries()[pos - n_data].name
                )
            };
            return Err(ZFitError::Numerical {
                message,
                parameters: params.to_vec(),
            });
        }

        Ok(Array1::from_vec(combined))
    }

    fn parameter_count(&self) -> usize {
        self.model.parameter_count()
    }

    fn residual_count(&self) -> usize {
        2 * self.sample_count() + self.model.parameter_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CircuitModel;
    use crate::parameters::ParameterSpec;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn resistor() -> CircuitModel {
        let spec = ParameterSpec::from_tuples(&[("R", 1.0, (0.0, 10.0))]).unwrap();
        CircuitModel::new("r", spec, 2.0, |_, p| Complex64::new(p[0], 0.0)).unwrap()
    }

    fn capacitor() -> CircuitModel {
        let spec = ParameterSpec::from_tuples(&[("C", 1e-6, (0.0, f64::INFINITY))]).unwrap();
        CircuitModel::new("c", spec, 1.0, |w, p| {
            Complex64::new(1.0, 0.0) / Complex64::new(0.0, w * p[0])
        })
        .unwrap()
    }

    #[test]
    fn test_angular_frequencies() {
        let w = angular_frequencies(&array![1.0, 0.5]);
        assert_relative_eq!(w[0], 2.0 * PI);
        assert_relative_eq!(w[1], PI);
    }

    #[test]
    fn test_data_residuals_interleave() {
        let target = TargetSpectrum::with_weights(
            array![1.0, 2.0],
            array![Complex64::new(3.0, 4.0), Complex64::new(1.0, -1.0)],
            array![1.0, 2.0],
        )
        .unwrap();
        let predicted = array![Complex64::new(1.0, 1.0), Complex64::new(0.0, 0.0)];

        let r = data_residuals(&target, &predicted).unwrap();
        assert_eq!(r, array![2.0, 3.0, 2.0, -2.0]);

        let short = array![Complex64::new(1.0, 1.0)];
        assert!(data_residuals(&target, &short).is_err());
    }

    #[test]
    fn test_scaled_penalties() {
        let bounds = vec![Bounds::new(0.0, 1.0).unwrap(), Bounds::min_only(0.0).unwrap()];
        let p = scaled_penalties(&array![2.0, -1.0], &bounds, 1e3, 50);
        assert_relative_eq!(p[0], 5e4);
        assert_relative_eq!(p[1], -5e4);
    }

    #[test]
    fn test_combined_layout() {
        let model = resistor();
        let target = TargetSpectrum::new(
            array![1.0, 2.0, 3.0],
            array![
                Complex64::new(5.0, 0.0),
                Complex64::new(5.0, 1.0),
                Complex64::new(5.0, 0.0)
            ],
        )
        .unwrap();
        let problem = ImpedanceProblem::new(&model, &target).unwrap();

        let r = problem.eval(&array![12.0]).unwrap();
        assert_eq!(r.len(), problem.residual_count());
        assert_eq!(r.len(), 2 * 3 + 1);
        assert_eq!(r[0], -7.0);
        assert_eq!(r[3], 1.0);
        // weight 2, N = 3, 2 above the upper bound
        assert_eq!(r[6], 12.0);
    }

    #[test]
    fn test_wrong_parameter_count() {
        let model = resistor();
        let target = TargetSpectrum::new(array![1.0], array![Complex64::new(1.0, 0.0)]).unwrap();
        let problem = ImpedanceProblem::new(&model, &target).unwrap();
        assert!(matches!(
            problem.eval(&array![1.0, 2.0]),
            Err(ZFitError::DimensionMismatch(_))
        ));
    }

    #[test]
    fn test_non_finite_is_numerical_error() {
        let model = capacitor();
        let target = TargetSpectrum::new(
            array![10.0, 20.0],
            Array1::from_elem(2, Complex64::new(0.0, -1.0)),
        )
        .unwrap();
        let problem = ImpedanceProblem::new(&model, &target).unwrap();

        match problem.eval(&array![0.0]) {
            Err(ZFitError::Numerical { parameters, message }) => {
                assert_eq!(parameters, vec![0.0]);
                assert!(message.contains("10 Hz"));
            }
            other => panic!("Expected Numerical error, got {:?}", other),
        }
    }
}
