use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use super::domain::{Kra, KraId, MeasurementType, ReviewPeriod, ThresholdBands};

#[derive(Debug)]
pub enum KraImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidField {
        line: usize,
        field: &'static str,
        value: String,
    },
}

impl std::fmt::Display for KraImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KraImportError::Io(err) => write!(f, "failed to read KRA sheet: {}", err),
            KraImportError::Csv(err) => write!(f, "invalid KRA sheet data: {}", err),
            KraImportError::InvalidField { line, field, value } => write!(
                f,
                "KRA sheet row {} has unrecognised {} '{}'",
                line, field, value
            ),
        }
    }
}

impl std::error::Error for KraImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            KraImportError::Io(err) => Some(err),
            KraImportError::Csv(err) => Some(err),
            KraImportError::InvalidField { .. } => None,
        }
    }
}

impl From<std::io::Error> for KraImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for KraImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Reads KRA definitions exported from the KRA setup sheet.
///
/// Expected headers: `id,title,measurement_type,target,achieved,weightage,period`
/// with optional `amber_min,green_min` columns for a per-KRA band override.
/// Rows are returned unvalidated; pass them through `validate_kra_set`.
pub struct KraSheetImporter;

impl KraSheetImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Kra>, KraImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Kra>, KraImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut kras = Vec::new();

        for (index, record) in csv_reader.deserialize::<KraRow>().enumerate() {
            let row = record?;
            // header occupies line 1
            kras.push(row.into_kra(index + 2)?);
        }

        tracing::debug!(count = kras.len(), "imported KRA sheet");
        Ok(kras)
    }
}

#[derive(Debug, Deserialize)]
struct KraRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    id: Option<String>,
    title: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    measurement_type: Option<String>,
    target: f64,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    achieved: Option<String>,
    weightage: u32,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    period: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    amber_min: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    green_min: Option<String>,
}

impl KraRow {
    fn into_kra(self, line: usize) -> Result<Kra, KraImportError> {
        let measurement_type = match self.measurement_type.as_deref() {
            Some(raw) => MeasurementType::parse(raw).ok_or_else(|| KraImportError::InvalidField {
                line,
                field: "measurement_type",
                value: raw.to_string(),
            })?,
            None => MeasurementType::default(),
        };

        let period = match self.period.as_deref() {
            Some(raw) => ReviewPeriod::parse(raw).ok_or_else(|| KraImportError::InvalidField {
                line,
                field: "period",
                value: raw.to_string(),
            })?,
            None => ReviewPeriod::default(),
        };

        let achieved = parse_number(line, "achieved", self.achieved.as_deref())?.unwrap_or(0.0);

        let thresholds = match (
            parse_number(line, "amber_min", self.amber_min.as_deref())?,
            parse_number(line, "green_min", self.green_min.as_deref())?,
        ) {
            (Some(amber_min), Some(green_min)) => {
                Some(ThresholdBands::from_boundaries(amber_min, green_min))
            }
            (None, None) => None,
            (Some(_), None) => {
                return Err(KraImportError::InvalidField {
                    line,
                    field: "green_min",
                    value: String::new(),
                })
            }
            (None, Some(_)) => {
                return Err(KraImportError::InvalidField {
                    line,
                    field: "amber_min",
                    value: String::new(),
                })
            }
        };

        let id = self
            .id
            .map(KraId)
            .unwrap_or_else(|| KraId(slugify(&self.title)));

        Ok(Kra {
            id,
            title: self.title,
            measurement_type,
            target: self.target,
            achieved,
            weightage: self.weightage,
            thresholds,
            period,
        })
    }
}

fn parse_number(
    line: usize,
    field: &'static str,
    raw: Option<&str>,
) -> Result<Option<f64>, KraImportError> {
    raw.map(|value| {
        value
            .trim_end_matches('%')
            .trim()
            .parse::<f64>()
            .map_err(|_| KraImportError::InvalidField {
                line,
                field,
                value: value.to_string(),
            })
    })
    .transpose()
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for ch in title.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}
