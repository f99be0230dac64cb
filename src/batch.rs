//! Many independent fits, and statistics of their parameters grouped by
//! applied potential.

use std::collections::BTreeMap;

use ndarray::Array1;
use rayon::prelude::*;
use serde::Serialize;

use crate::error::{Result, ZFitError};
use crate::fit::{FitResult, Fitter};
use crate::lm::LmConfig;
use crate::model::ModelPlugin;
use crate::spectrum::TargetSpectrum;

/// Fit one model to every spectrum in parallel.
///
/// Results come back in input order. A failing spectrum only fails its own
/// entry.
pub fn fit_batch<M: ModelPlugin + ?Sized>(
    model: &M,
    spectra: &[TargetSpectrum],
    config: &LmConfig,
) -> Vec<Result<FitResult>> {
    let fitter = Fitter::with_config(config.clone());
    spectra
        .par_iter()
        .enumerate()
        .map(|(index, spectrum)| {
            let _span = tracing::debug_span!("batch_item", index).entered();
            fitter.fit(model, spectrum)
        })
        .collect()
}

/// Summary of one parameter over the fits sharing a potential.
///
/// `std` is the sample standard deviation and is `NaN` for a single fit.
/// Quartiles interpolate linearly between order statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSummary {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl ParameterSummary {
    fn from_values(name: &str, values: &mut [f64]) -> Self {
        values.sort_by(|a, b| a.total_cmp(b));
        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let std = if count > 1 {
            let ss: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
            (ss / (count - 1) as f64).sqrt()
        } else {
            f64::NAN
        };

        Self {
            name: name.to_string(),
            count,
            mean,
            std,
            min: values[0],
            q25: quantile(values, 0.25),
            median: quantile(values, 0.5),
            q75: quantile(values, 0.75),
            max: values[count - 1],
        }
    }
}

/// Linear-interpolated quantile of sorted, non-empty data.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// All parameter summaries for one potential.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PotentialGroup {
    /// Potential rounded to three decimals
    pub potential: f64,
    pub parameters: Vec<ParameterSummary>,
}

/// Fitted parameters summarised per applied potential.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PotentialStatistics {
    pub parameter_names: Vec<String>,

    /// Groups in ascending potential order
    pub groups: Vec<PotentialGroup>,
}

impl PotentialStatistics {
    /// Group `(potential, fitted parameters)` rows.
    ///
    /// Potentials equal to three decimals share a group.
    ///
    /// # Errors
    ///
    /// * `ZFitError::DimensionMismatch` if a row has the wrong number of values
    /// * `ZFitError::InvalidInput` if a potential is not finite
    pub fn from_rows(names: &[String], rows: &[(f64, Array1<f64>)]) -> Result<Self> {
        let mut grouped: BTreeMap<i64, Vec<&Array1<f64>>> = BTreeMap::new();
        for (i, (potential, values)) in rows.iter().enumerate() {
            if !potential.is_finite() {
                return Err(ZFitError::InvalidInput(format!(
                    "row {}: potential must be finite, got {}",
                    i, potential
                )));
            }
            if values.len() != names.len() {
                return Err(ZFitError::DimensionMismatch(format!(
                    "row {}: expected {} parameters, got {}",
                    i,
                    names.len(),
                    values.len()
                )));
            }
            let key = (potential * 1000.0).round() as i64;
            grouped.entry(key).or_default().push(values);
        }

        let groups = grouped
            .into_iter()
            .map(|(key, members)| PotentialGroup {
                potential: key as f64 / 1000.0,
                parameters: names
                    .iter()
                    .enumerate()
                    .map(|(j, name)| {
                        let mut column: Vec<f64> = members.iter().map(|row| row[j]).collect();
                        ParameterSummary::from_values(name, &mut column)
                    })
                    .collect(),
            })
            .collect();

        Ok(Self {
            parameter_names: names.to_vec(),
            groups,
        })
    }

    /// Group the successful fits of a batch by their potentials.
    ///
    /// Failed fits and their potentials are skipped.
    pub fn from_fits<'a, I>(fits: I) -> Result<Self>
    where
        I: IntoIterator<Item = (f64, &'a FitResult)>,
    {
        let mut names: Option<Vec<String>> = None;
        let mut rows = Vec::new();
        for (potential, fit) in fits {
            if !fit.success {
                continue;
            }
            match &names {
                Some(existing) if existing != &fit.parameter_names => {
                    return Err(ZFitError::DimensionMismatch(format!(
                        "cannot mix models '{:?}' and '{:?}'",
                        existing, fit.parameter_names
                    )));
                }
                Some(_) => {}
                None => names = Some(fit.parameter_names.clone()),
            }
            rows.push((potential, fit.fitted_parameters.clone()));
        }
        Self::from_rows(&names.unwrap_or_default(), &rows)
    }
}
