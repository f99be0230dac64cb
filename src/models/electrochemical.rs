//! Electrochemical cell models: solution resistance in series with an
//! interface of double-layer capacitance, charge transfer and diffusion.

use std::f64::consts::FRAC_PI_2;

use num_complex::Complex64;

use crate::error::Result;
use crate::model::CircuitModel;
use crate::parameters::ParameterSpec;

use super::lumped::capacitor;

/// Semi-infinite Warburg diffusion element, `W·ω^(-1/2)·(1 - j)`.
pub fn warburg(omega: f64, w: f64) -> Complex64 {
    Complex64::new(1.0, -1.0) * (w / omega.sqrt())
}

/// Constant-phase element, `1 / (Yq·(jω)^n)`.
///
/// `n = 1` is an ideal capacitor, `n = 0` a resistor.
pub fn constant_phase(omega: f64, yq: f64, n: f64) -> Complex64 {
    (Complex64::from_polar(omega.powf(n), n * FRAC_PI_2) * yq).inv()
}

/// `Rs + (C ∥ Rf)`
pub fn r_cr() -> Result<CircuitModel> {
    let spec = ParameterSpec::from_tuples(&[
        ("Rs", 1243.0, (1e-3, 1e5)),
        ("C", 8e-7, (1e-7, 1e-4)),
        ("Rf", 1e5, (1e4, 1e6)),
    ])?;
    Ok(CircuitModel::new("R(CR)", spec, 6.0, |w, p| {
        Complex64::new(1.0 / p[2], w * p[1]).inv() + p[0]
    })?
    .with_description("Rs + (C || Rf)"))
}

/// `Rs + (Q ∥ (Rf + W))` with a constant-phase double layer.
pub fn r_q_rw() -> Result<CircuitModel> {
    let spec = ParameterSpec::from_tuples(&[
        ("Rs", 490.0, (1.0, 1e3)),
        ("Yq", 3.6e-6, (1e-7, 1e-5)),
        ("n", 0.8, (0.5, 1.0)),
        ("Rf", 1e5, (1e4, 1e6)),
        ("W", 5e3, (1.0, 1e6)),
    ])?;
    Ok(CircuitModel::new("R(Q(RW))", spec, 10.0, |w, p| {
        let zq = constant_phase(w, p[1], p[2]);
        let zrw = warburg(w, p[4]) + p[3];
        (zq.inv() + zrw.inv()).inv() + p[0]
    })?
    .with_description("Rs + (Q || (Rf + W))"))
}

/// `Rs + (C ∥ (Rf + W))`
pub fn r_c_rw() -> Result<CircuitModel> {
    let spec = ParameterSpec::from_tuples(&[
        ("Rs", 500.0, (1e-3, 1e3)),
        ("C", 3e-6, (1e-7, 1e-4)),
        ("Rf", 1e5, (1e4, 1e6)),
        ("W", 5.5e4, (1.0, 1e6)),
    ])?;
    Ok(CircuitModel::new("R(C(RW))", spec, 6.0, |w, p| {
        let zc = capacitor(w, p[1]);
        let zrw = warburg(w, p[3]) + p[2];
        (zc.inv() + zrw.inv()).inv() + p[0]
    })?
    .with_description("Rs + (C || (Rf + W))"))
}
