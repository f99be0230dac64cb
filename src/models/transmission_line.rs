//! Segmented cable models terminated in a fixed resistive load.
//!
//! The per-metre parameters are scaled to one segment and the load is
//! transformed back through the segments, last segment first.

use num_complex::Complex64;

use crate::error::Result;
use crate::model::CircuitModel;
use crate::parameters::ParameterSpec;

use super::lumped::inductor;

/// Cable length in metres.
pub const LENGTH_M: f64 = 3.0;

/// Load at the far end of the cable, in ohms.
pub const LOAD_OHMS: f64 = 49.9;

const SKIN_SEGMENTS: usize = 6;
const SKIN_BRANCHES: usize = 5;
const T_SEGMENTS: usize = 3;

/// Skin-effect impedance: parallel R/L branches with resistance rising and
/// inductance falling by `√10` per branch.
fn skin_ladder(omega: f64, r: f64, ls: f64) -> Complex64 {
    (0..SKIN_BRANCHES)
        .map(|k| {
            let factor = 10f64.powf(k as f64 / 2.0);
            (inductor(omega, ls / factor) + r * factor).inv()
        })
        .sum::<Complex64>()
        .inv()
}

/// Line with skin effect: six segments over three metres.
///
/// Parameters are per metre: series inductance `Lpm`, skin inductance
/// `Lspm`, series resistance `Rpm`, shunt capacitance `Cpm` and shunt
/// conductance `Gpm`.
pub fn trans_line1() -> Result<CircuitModel> {
    let spec = ParameterSpec::from_tuples(&[
        ("Lpm", 700e-9, (10e-9, 1e-6)),
        ("Lspm", 200e-9, (10e-9, 1e-6)),
        ("Rpm", 400e-3, (100e-3, 800e-3)),
        ("Cpm", 40e-12, (20e-12, 100e-12)),
        ("Gpm", 1e-6, (10e-9, 10e-6)),
    ])?;
    Ok(CircuitModel::new("trans_line1", spec, 1e5, |w, p| {
        let per_segment = LENGTH_M / SKIN_SEGMENTS as f64;
        let l = p[0] * per_segment / 2.0;
        let ls = p[1] * per_segment / 2.0;
        let r = p[2] * per_segment / 2.0;
        let c = p[3] * per_segment;
        let g = p[4] * per_segment;

        let skin = skin_ladder(w, r, ls);
        let half = skin + inductor(w, l);
        (0..SKIN_SEGMENTS).fold(Complex64::new(LOAD_OHMS, 0.0), |z, _| {
            let shunt = ((z + half).inv() + Complex64::new(g, w * c)).inv();
            shunt + half
        })
    })?
    .with_description("3 m line, 6 segments, 5-branch skin effect, 49.9 ohm load"))
}

/// Line of three symmetric T sections over three metres.
///
/// Parameters are per metre: `Lpm`, `Rpm`, `Cpm`, `Gpm`.
pub fn trans_line2() -> Result<CircuitModel> {
    let spec = ParameterSpec::from_tuples(&[
        ("Lpm", 700e-9, (600e-9, 1e-6)),
        ("Rpm", 1.0, (0.7, 1.5)),
        ("Cpm", 40e-12, (40e-12, 70e-12)),
        ("Gpm", 40e-12, (40e-12, 70e-12)),
    ])?;
    Ok(CircuitModel::new("trans_line2", spec, 1e5, |w, p| {
        let per_segment = LENGTH_M / T_SEGMENTS as f64;
        let leg = Complex64::new(0.5 * p[1] * per_segment, 0.5 * w * p[0] * per_segment);
        let shunt = Complex64::new(p[3] * per_segment, w * p[2] * per_segment);

        (0..T_SEGMENTS).fold(Complex64::new(LOAD_OHMS, 0.0), |z, _| {
            ((z + leg).inv() + shunt).inv() + leg
        })
    })?
    .with_description("3 m line, 3 T sections, 49.9 ohm load"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_skin_ladder_dc_is_parallel_resistance() {
        let r = 0.1;
        let expected = 1.0
            / (0..SKIN_BRANCHES)
                .map(|k| 1.0 / (r * 10f64.powf(k as f64 / 2.0)))
                .sum::<f64>();
        let z = skin_ladder(1e-9, r, 1e-7);
        assert_relative_eq!(z.re, expected, max_relative = 1e-9);
    }

    #[test]
    fn test_lines_approach_load_at_low_frequency() {
        let model = trans_line2().unwrap();
        let z = model.impedance_at(1.0, &[700e-9, 1.0, 40e-12, 40e-12]);
        // Series resistance of the whole line plus the load
        assert_relative_eq!(z.re, LOAD_OHMS + 3.0, max_relative = 1e-6);

        let model = trans_line1().unwrap();
        let z = model.impedance_at(1.0, &[700e-9, 200e-9, 0.4, 40e-12, 1e-9]);
        assert!(z.re > LOAD_OHMS && z.re < LOAD_OHMS + 1.0);
        assert!(z.im.abs() < 1e-3);
    }

    #[test]
    fn test_lines_are_finite_across_band() {
        let line1 = trans_line1().unwrap();
        let line2 = trans_line2().unwrap();
        let p1 = [700e-9, 200e-9, 0.4, 40e-12, 1e-6];
        let p2 = [700e-9, 1.0, 40e-12, 40e-12];
        for k in 0..40 {
            let w = 2.0 * std::f64::consts::PI * 10f64.powf(3.0 + k as f64 * 0.15);
            let a = line1.impedance_at(w, &p1);
            let b = line2.impedance_at(w, &p2);
            assert!(a.re.is_finite() && a.im.is_finite());
            assert!(b.re.is_finite() && b.im.is_finite());
        }
    }
}
