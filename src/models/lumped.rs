//! Lumped R, L, C networks.
//!
//! Series elements add impedances, parallel branches add admittances.

use num_complex::Complex64;

use crate::error::Result;
use crate::model::CircuitModel;
use crate::parameters::ParameterSpec;

const INF: f64 = f64::INFINITY;

/// Reactance of an inductor `L` at `omega`.
pub(crate) fn inductor(omega: f64, l: f64) -> Complex64 {
    Complex64::new(0.0, omega * l)
}

/// Reactance of a capacitor `C` at `omega`.
pub(crate) fn capacitor(omega: f64, c: f64) -> Complex64 {
    Complex64::new(0.0, omega * c).inv()
}

/// Impedance of branches in parallel.
pub(crate) fn parallel(branches: &[Complex64]) -> Complex64 {
    branches
        .iter()
        .map(|z| z.inv())
        .sum::<Complex64>()
        .inv()
}

/// `C ∥ R`
pub fn cpr() -> Result<CircuitModel> {
    let spec = ParameterSpec::from_tuples(&[
        ("R", 1e3, (0.0, INF)),
        ("C", 10e-12, (1e-12, INF)),
    ])?;
    Ok(CircuitModel::new("cpr", spec, 1e10, |w, p| {
        Complex64::new(1.0 / p[0], w * p[1]).inv()
    })?
    .with_description("C || R"))
}

/// `L + R`
pub fn lsr() -> Result<CircuitModel> {
    let spec = ParameterSpec::from_tuples(&[("R", 1e3, (0.0, INF)), ("L", 1e-6, (0.0, INF))])?;
    Ok(
        CircuitModel::new("lsr", spec, 10.0, |w, p| inductor(w, p[1]) + p[0])?
            .with_description("L + R"),
    )
}

/// `L + Rdc` with a skin-effect resistance growing as `√ω`.
pub fn lsr_skin() -> Result<CircuitModel> {
    let spec = ParameterSpec::from_tuples(&[
        ("L", 1e-6, (0.0, INF)),
        ("Rdc", 100e-3, (0.0, INF)),
        ("s", 1e-3, (0.0, INF)),
    ])?;
    Ok(CircuitModel::new("lsr_skin", spec, 1e3, |w, p| {
        inductor(w, p[0]) + p[1] + p[2] * w.sqrt()
    })?
    .with_description("L + Rdc + skin effect"))
}

/// `Ls + (Cp ∥ Rp)`
pub fn ls_cpr() -> Result<CircuitModel> {
    let spec = ParameterSpec::from_tuples(&[
        ("Ls", 1e-6, (0.0, INF)),
        ("Cp", 10e-12, (1e-12, INF)),
        ("Rp", 1e3, (0.0, INF)),
    ])?;
    Ok(CircuitModel::new("ls(cpr)", spec, 1e3, |w, p| {
        Complex64::new(1.0 / p[2], w * p[1]).inv() + inductor(w, p[0])
    })?
    .with_description("Ls + (Cp || Rp)"))
}

/// `Ls + Rs + (Cp ∥ Rp)`
pub fn lsrs_cpr() -> Result<CircuitModel> {
    let spec = ParameterSpec::from_tuples(&[
        ("Ls", 200e-9, (0.0, INF)),
        ("Rs", 500e-3, (0.0, INF)),
        ("Cp", 1e-9, (1e-12, INF)),
        ("Rp", 200.0, (0.0, INF)),
    ])?;
    Ok(CircuitModel::new("lsrs(cpr)", spec, 1e3, |w, p| {
        Complex64::new(1.0 / p[3], w * p[2]).inv() + inductor(w, p[0]) + p[1]
    })?
    .with_description("Ls + Rs + (Cp || Rp)"))
}

/// `(C + Rc) ∥ (L + Rl)`
pub fn csr_p_lsr() -> Result<CircuitModel> {
    let spec = ParameterSpec::from_tuples(&[
        ("Rc", 1e-3, (0.0, INF)),
        ("C", 10e-12, (1e-12, INF)),
        ("Rl", 1e-3, (1e-12, INF)),
        ("L", 1e-6, (0.0, INF)),
    ])?;
    Ok(CircuitModel::new("(csr)p(lsr)", spec, 1e3, |w, p| {
        parallel(&[capacitor(w, p[1]) + p[0], inductor(w, p[3]) + p[2]])
    })?
    .with_description("(C + Rc) || (L + Rl)"))
}

/// `Rp ∥ (C + Rc) ∥ (L + Rl)`
pub fn rp_csr_p_lsr() -> Result<CircuitModel> {
    let spec = ParameterSpec::from_tuples(&[
        ("Rp", 100e3, (0.0, INF)),
        ("Rc", 1e-3, (0.0, INF)),
        ("C", 10e-12, (1e-12, INF)),
        ("Rl", 10e-3, (1e-12, INF)),
        ("L", 1e-6, (0.0, INF)),
    ])?;
    Ok(CircuitModel::new("rp(csr)p(lsr)", spec, 1e4, |w, p| {
        parallel(&[
            Complex64::new(p[0], 0.0),
            capacitor(w, p[2]) + p[1],
            inductor(w, p[4]) + p[3],
        ])
    })?
    .with_description("Rp || (C + Rc) || (L + Rl)"))
}

/// `R ∥ C ∥ (L + Rl)`
pub fn rpcp_lsr() -> Result<CircuitModel> {
    let spec = ParameterSpec::from_tuples(&[
        ("R", 1e3, (0.0, INF)),
        ("C", 10e-12, (0.0, INF)),
        ("L", 1e-6, (0.0, INF)),
        ("Rl", 50e-3, (1e-3, INF)),
    ])?;
    Ok(CircuitModel::new("rpcp(lsr)", spec, 100.0, |w, p| {
        let y = Complex64::new(1.0 / p[0], w * p[1]) + (inductor(w, p[2]) + p[3]).inv();
        y.inv()
    })?
    .with_description("R || C || (L + Rl)"))
}

/// Piezoelectric transducer with two motional branches:
/// `(R1 + C1) ∥ (R2 + C2 + L2) ∥ (R3 + C3 + L3)`.
pub fn xdcr2() -> Result<CircuitModel> {
    let spec = ParameterSpec::from_tuples(&[
        ("R1", 100.0, (10.0, 1e3)),
        ("C1", 200e-12, (10e-12, 1e-9)),
        ("R2", 100.0, (10.0, 1e3)),
        ("C2", 200e-12, (10e-12, 1e-9)),
        ("L2", 36e-6, (1e-6, 100e-6)),
        ("R3", 20.0, (1.0, 1e3)),
        ("C3", 300e-12, (10e-12, 1e-9)),
        ("L3", 20e-6, (1e-6, 100e-6)),
    ])?;
    Ok(CircuitModel::new("xdcr2", spec, 1.0, |w, p| {
        parallel(&[
            capacitor(w, p[1]) + p[0],
            capacitor(w, p[3]) + inductor(w, p[4]) + p[2],
            capacitor(w, p[6]) + inductor(w, p[7]) + p[5],
        ])
    })?
    .with_description("(R1 + C1) || (R2 + C2 + L2) || (R3 + C3 + L3)"))
}
