//! Measured impedance spectra to be fitted.

use ndarray::Array1;
use num_complex::Complex64;

use crate::error::{Result, ZFitError};

/// A frequency-domain impedance target.
///
/// `frequencies_hz`, `impedance` and `weights` are index-aligned. Each
/// weight scales that frequency's contribution to the residual.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetSpectrum {
    /// Sample frequencies in Hz, finite and strictly positive
    pub frequencies_hz: Array1<f64>,

    /// Complex impedance measured at each frequency
    pub impedance: Array1<Complex64>,

    /// Non-negative per-sample modeling weight
    pub weights: Array1<f64>,
}

impl TargetSpectrum {
    /// Create a spectrum with unit weights.
    pub fn new(frequencies_hz: Array1<f64>, impedance: Array1<Complex64>) -> Result<Self> {
        let weights = Array1::ones(frequencies_hz.len());
        Self::with_weights(frequencies_hz, impedance, weights)
    }

    /// Create a spectrum with explicit modeling weights.
    pub fn with_weights(
        frequencies_hz: Array1<f64>,
        impedance: Array1<Complex64>,
        weights: Array1<f64>,
    ) -> Result<Self> {
        let spectrum = Self {
            frequencies_hz,
            impedance,
            weights,
        };
        spectrum.validate()?;
        Ok(spectrum)
    }

    /// Build from the usual instrument columns `Z'` and `-Z''`.
    ///
    /// The target is `Z' - j·(-Z'')`, so a capacitive sample with a positive
    /// `-Z''` reading ends up with a negative imaginary part.
    pub fn from_real_neg_imag(
        frequencies_hz: Array1<f64>,
        z_real: &Array1<f64>,
        neg_z_imag: &Array1<f64>,
    ) -> Result<Self> {
        if z_real.len() != neg_z_imag.len() {
            return Err(ZFitError::InvalidInput(format!(
                "{} real parts but {} imaginary parts",
                z_real.len(),
                neg_z_imag.len()
            )));
        }
        let impedance = z_real
            .iter()
            .zip(neg_z_imag.iter())
            .map(|(&re, &neg_im)| Complex64::new(re, -neg_im))
            .collect();
        Self::new(frequencies_hz, impedance)
    }

    /// Build from magnitude and phase (degrees).
    pub fn from_polar(
        frequencies_hz: Array1<f64>,
        magnitude: &Array1<f64>,
        phase_deg: &Array1<f64>,
    ) -> Result<Self> {
        if magnitude.len() != phase_deg.len() {
            return Err(ZFitError::InvalidInput(format!(
                "{} magnitudes but {} phases",
                magnitude.len(),
                phase_deg.len()
            )));
        }
        let impedance = magnitude
            .iter()
            .zip(phase_deg.iter())
            .map(|(&m, &p)| Complex64::from_polar(m, p.to_radians()))
            .collect();
        Self::new(frequencies_hz, impedance)
    }

    /// Number of frequency samples.
    pub fn len(&self) -> usize {
        self.frequencies_hz.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies_hz.is_empty()
    }

    /// Angular frequencies `2π·f` in rad/s.
    pub fn angular_frequencies(&self) -> Array1<f64> {
        crate::residual::angular_frequencies(&self.frequencies_hz)
    }

    /// Check the invariants the fitting engine relies on.
    ///
    /// Zero or negative frequencies are rejected here rather than left to
    /// each circuit formula, since any capacitive `1/(jωC)` term diverges at
    /// `ω = 0`.
    pub fn validate(&self) -> Result<()> {
        let n = self.frequencies_hz.len();
        if n == 0 {
            return Err(ZFitError::InvalidInput("spectrum is empty".to_string()));
        }
        if self.impedance.len() != n || self.weights.len() != n {
            return Err(ZFitError::InvalidInput(format!(
                "length mismatch: {} frequencies, {} impedances, {} weights",
                n,
                self.impedance.len(),
                self.weights.len()
            )));
        }
        if let Some((i, f)) = self
            .frequencies_hz
            .iter()
            .enumerate()
            .find(|(_, f)| !(f.is_finite() && **f > 0.0))
        {
            return Err(ZFitError::InvalidInput(format!(
                "frequency {} at index {} must be finite and positive",
                f, i
            )));
        }
        if let Some((i, z)) = self
            .impedance
            .iter()
            .enumerate()
            .find(|(_, z)| !z.is_finite())
        {
            return Err(ZFitError::InvalidInput(format!(
                "impedance {} at index {} is not finite",
                z, i
            )));
        }
        if let Some((i, w)) = self
            .weights
            .iter()
            .enumerate()
            .find(|(_, w)| !(w.is_finite() && **w >= 0.0))
        {
            return Err(ZFitError::InvalidInput(format!(
                "weight {} at index {} must be finite and non-negative",
                w, i
            )));
        }
        Ok(())
    }
}
