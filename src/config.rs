//! Pipeline Configuration Module
//! Dataset shapes (file pattern, delimiter, fallback, allow-list, layout).

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Canonical column names, available on every loaded table.
pub const REGION_COL: &str = "SIGLA_UF_BENEFICIARIO_BOLSA";
pub const MUNICIPALITY_COL: &str = "MUNICIPIO_BENEFICIARIO_BOLSA";
pub const COURSE_COL: &str = "NOME_CURSO_BOLSA";
pub const YEAR_COL: &str = "ANO_CONCESSAO_BOLSA";
pub const SEX_COL: &str = "SEXO_BENEFICIARIO_BOLSA";

pub const CANONICAL_COLUMNS: [&str; 5] =
    [REGION_COL, MUNICIPALITY_COL, COURSE_COL, YEAR_COL, SEX_COL];

/// Historical column names and their canonical replacement.
pub const COLUMN_RENAMES: [(&str, &str); 3] = [
    ("UF_BENEFICIARIO", REGION_COL),
    ("SEXO_BENEFICIARIO", SEX_COL),
    ("MUNICIPIO_BENEFICIARIO", MUNICIPALITY_COL),
];

const MUNICIPALITIES: [&str; 5] = ["SANTOS", "SAO VICENTE", "PRAIA GRANDE", "CUBATAO", "GUARUJA"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Delimiter {0:?} must be a single ASCII character other than a quote or line break")]
    InvalidDelimiter(char),
}

/// Bar arrangement per year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ChartLayout {
    /// Female segment stacked on top of the male one
    #[default]
    Stacked,
    /// Adjacent bars with a per-year total
    Grouped,
}

/// Retry applied when the primary (UTF-8) decode fails.
///
/// The retry always decodes as Latin-1; `delimiter` swaps the field
/// separator for the retry, `None` keeps the primary one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackRule {
    #[serde(default)]
    pub delimiter: Option<char>,
}

/// Everything that differs between dataset shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    pub glob_pattern: String,
    pub delimiter: char,
    #[serde(default)]
    pub fallback: FallbackRule,
    #[serde(default = "default_region_code")]
    pub region_code: String,
    pub municipalities: Vec<String>,
    #[serde(default)]
    pub layout: ChartLayout,
}

fn default_region_code() -> String {
    "SP".to_string()
}

impl PipelineConfig {
    /// Load a custom shape from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: PipelineConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Delimiters end up as single CSV separator bytes.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for delimiter in std::iter::once(self.delimiter).chain(self.fallback.delimiter) {
            if !delimiter.is_ascii() || matches!(delimiter, '"' | '\n' | '\r') {
                return Err(ConfigError::InvalidDelimiter(delimiter));
            }
        }
        Ok(())
    }

    /// Separator byte for a primary (UTF-8) parse.
    pub fn primary_separator(&self) -> u8 {
        self.delimiter as u8
    }

    /// Separator byte for the Latin-1 retry.
    pub fn fallback_separator(&self) -> u8 {
        self.fallback.delimiter.unwrap_or(self.delimiter) as u8
    }
}

/// Built-in dataset shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum DatasetShape {
    /// `pda-prouni-*.csv`, `;` separated
    #[default]
    Pda,
    /// `prouni_*.csv`, `,` separated, `;` + Latin-1 on retry
    Prouni,
}

impl DatasetShape {
    pub fn config(self) -> PipelineConfig {
        match self {
            DatasetShape::Pda => PipelineConfig {
                name: "pda".to_string(),
                glob_pattern: "pda-prouni-*.csv".to_string(),
                delimiter: ';',
                fallback: FallbackRule::default(),
                region_code: default_region_code(),
                municipalities: MUNICIPALITIES.iter().map(|m| m.to_string()).collect(),
                layout: ChartLayout::Stacked,
            },
            // Source files of this shape mix upper and lower case municipality names.
            DatasetShape::Prouni => PipelineConfig {
                name: "prouni".to_string(),
                glob_pattern: "prouni_*.csv".to_string(),
                delimiter: ',',
                fallback: FallbackRule {
                    delimiter: Some(';'),
                },
                region_code: default_region_code(),
                municipalities: MUNICIPALITIES
                    .iter()
                    .map(|m| m.to_string())
                    .chain(MUNICIPALITIES.iter().map(|m| m.to_lowercase()))
                    .collect(),
                layout: ChartLayout::Grouped,
            },
        }
    }
}
