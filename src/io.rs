//! Delimited-text spectra in, parameter tables and fitted curves out.
//!
//! Input rows are `[potential,] frequency, a, b`. With
//! [`ImportKind::RealImag`] `a` is `Z'` and `b` is `-Z''`, the usual sign
//! convention of impedance analysers. With [`ImportKind::MagnitudePhase`]
//! `a` is `|Z|` and `b` the phase in degrees.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use ndarray::Array1;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::batch::PotentialStatistics;
use crate::error::{Result, ZFitError};
use crate::spectrum::TargetSpectrum;

/// Column separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delimiter {
    #[default]
    Tab,
    /// Any run of spaces
    Space,
    Comma,
}

impl Delimiter {
    fn byte(self) -> u8 {
        match self {
            Delimiter::Tab => b'\t',
            Delimiter::Space => b' ',
            Delimiter::Comma => b',',
        }
    }

    /// Non-empty fields of a record; a run of spaces yields empty fields
    /// between its separators.
    fn fields(self, record: &StringRecord) -> Vec<&str> {
        match self {
            Delimiter::Space => record.iter().filter(|f| !f.is_empty()).collect(),
            _ => record.iter().collect(),
        }
    }
}

/// Meaning of the two value columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportKind {
    /// `Z'` and `-Z''`
    #[default]
    RealImag,
    /// `|Z|` and phase in degrees
    MagnitudePhase,
}

/// Layout of a spectrum file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataFormat {
    pub delimiter: Delimiter,

    /// Header lines to skip before the data
    pub skip_rows: usize,

    /// Whether the first column holds the applied potential
    pub potential_column: bool,

    pub import: ImportKind,
}

impl Default for DataFormat {
    fn default() -> Self {
        Self {
            delimiter: Delimiter::Tab,
            skip_rows: 1,
            potential_column: false,
            import: ImportKind::RealImag,
        }
    }
}

/// A spectrum read from text, with the potential it was measured at.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasuredSpectrum {
    pub spectrum: TargetSpectrum,

    /// Taken from the first data row when the format has a potential column
    pub potential: Option<f64>,
}

/// Read one spectrum.
///
/// The first `skip_rows` lines are skipped, and so are blank lines. Columns
/// beyond the expected ones are ignored.
///
/// # Errors
///
/// * `ZFitError::InvalidInput` naming the line of the first malformed row,
///   or if the data is empty or fails spectrum validation
/// * `ZFitError::Csv` if the text cannot be read
pub fn read_spectrum<R: Read>(reader: R, format: &DataFormat) -> Result<MeasuredSpectrum> {
    let mut reader = ReaderBuilder::new()
        .delimiter(format.delimiter.byte())
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let offset = usize::from(format.potential_column);
    let mut potential = None;
    let mut freq = Vec::new();
    let mut a = Vec::new();
    let mut b = Vec::new();

    for record in reader.records() {
        let record = record?;
        let line_no = record.position().map_or(0, |pos| pos.line());
        if line_no <= format.skip_rows as u64 {
            continue;
        }

        let fields = format.delimiter.fields(&record);
        if fields.iter().all(|f| f.is_empty()) {
            continue;
        }
        if fields.len() < offset + 3 {
            return Err(ZFitError::InvalidInput(format!(
                "line {}: expected {} columns, found {}",
                line_no,
                offset + 3,
                fields.len()
            )));
        }

        let parse = |col: usize| -> Result<f64> {
            fields[col].parse::<f64>().map_err(|_| {
                ZFitError::InvalidInput(format!(
                    "line {}: column {} is not a number: '{}'",
                    line_no,
                    col + 1,
                    fields[col]
                ))
            })
        };

        if format.potential_column && potential.is_none() {
            potential = Some(parse(0)?);
        }
        freq.push(parse(offset)?);
        a.push(parse(offset + 1)?);
        b.push(parse(offset + 2)?);
    }

    if freq.is_empty() {
        return Err(ZFitError::InvalidInput("no data rows".to_string()));
    }

    let freq = Array1::from_vec(freq);
    let a = Array1::from_vec(a);
    let b = Array1::from_vec(b);
    let spectrum = match format.import {
        ImportKind::RealImag => TargetSpectrum::from_real_neg_imag(freq, &a, &b)?,
        ImportKind::MagnitudePhase => TargetSpectrum::from_polar(freq, &a, &b)?,
    };

    Ok(MeasuredSpectrum {
        spectrum,
        potential,
    })
}

/// Read one spectrum from a file.
pub fn read_spectrum_file<P: AsRef<Path>>(path: P, format: &DataFormat) -> Result<MeasuredSpectrum> {
    let file = File::open(path)?;
    read_spectrum(file, format)
}

/// Write fitted parameters, one row per fit, potential last.
pub fn write_parameter_table<W: Write>(
    mut writer: W,
    names: &[String],
    rows: &[(f64, Array1<f64>)],
) -> Result<()> {
    for name in names {
        write!(writer, "{}\t", name)?;
    }
    writeln!(writer, "potential")?;

    for (potential, values) in rows {
        if values.len() != names.len() {
            return Err(ZFitError::DimensionMismatch(format!(
                "expected {} parameters, got {}",
                names.len(),
                values.len()
            )));
        }
        for v in values {
            write!(writer, "{}\t", v)?;
        }
        writeln!(writer, "{:.3}", potential)?;
    }
    Ok(())
}

/// Write a fitted curve: frequency, `Z'`, `-Z''`, `|Z|`, `-phase`.
///
/// The phase is the full four-quadrant angle `atan2(Z'', Z')` in degrees,
/// so a negative real part lands in (90°, 180°] rather than folding back
/// into ±90° as `atan(Z''/Z')` would.
pub fn write_fitted_report<W: Write>(
    mut writer: W,
    frequencies_hz: &Array1<f64>,
    fitted: &Array1<Complex64>,
) -> Result<()> {
    if frequencies_hz.len() != fitted.len() {
        return Err(ZFitError::DimensionMismatch(format!(
            "{} frequencies but {} impedance values",
            frequencies_hz.len(),
            fitted.len()
        )));
    }

    writeln!(writer, "Frequency[Hz]\tZ'[Ohm]\t-Z''[Ohm]\tZ[Ohm]\t-Phase[deg]")?;
    for (f, z) in frequencies_hz.iter().zip(fitted.iter()) {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}",
            f,
            z.re,
            -z.im,
            z.norm(),
            -z.arg().to_degrees()
        )?;
    }
    Ok(())
}

/// Write per-potential statistics, one row per potential and parameter.
pub fn write_statistics<W: Write>(
    mut writer: W,
    stats: &PotentialStatistics,
) -> Result<()> {
    writeln!(
        writer,
        "potential\tparameter\tcount\tmean\tstd\tmin\t25%\t50%\t75%\tmax"
    )?;
    for group in &stats.groups {
        for s in &group.parameters {
            writeln!(
                writer,
                "{:.3}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                group.potential, s.name, s.count, s.mean, s.std, s.min, s.q25, s.median, s.q75, s.max
            )?;
        }
    }
    Ok(())
}
