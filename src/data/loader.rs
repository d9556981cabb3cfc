//! CSV Data Loader Module
//! Discovers dataset files, decodes them and normalizes the schema using Polars.

use crate::config::{PipelineConfig, CANONICAL_COLUMNS, COLUMN_RENAMES};
use polars::prelude::*;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

const BOM: char = '\u{feff}';

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),
    #[error("Failed to list dataset files: {0}")]
    Glob(#[from] glob::GlobError),
    #[error("No files matching {pattern} in {dir}")]
    NoFiles { pattern: String, dir: String },
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse CSV {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: PolarsError,
    },
    #[error("{file}: missing required column {column}")]
    MissingColumn { file: String, column: String },
}

/// Text encoding a file was decoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Latin1,
}

impl std::fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TextEncoding::Utf8 => write!(f, "utf-8"),
            TextEncoding::Latin1 => write!(f, "latin-1"),
        }
    }
}

/// Decode as UTF-8 (BOM tolerated), falling back to Latin-1.
pub fn decode(bytes: Vec<u8>) -> (String, TextEncoding) {
    match String::from_utf8(bytes) {
        Ok(text) => {
            let text = match text.strip_prefix(BOM) {
                Some(stripped) => stripped.to_string(),
                None => text,
            };
            (text, TextEncoding::Utf8)
        }
        Err(e) => {
            let text = e.into_bytes().iter().map(|&b| b as char).collect();
            (text, TextEncoding::Latin1)
        }
    }
}

/// Matching files in `dir`, sorted by path.
pub fn discover(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, LoaderError> {
    let full_pattern = dir.join(pattern);
    let mut paths = glob::glob(&full_pattern.to_string_lossy())?
        .collect::<Result<Vec<_>, _>>()?;
    paths.sort();

    if paths.is_empty() {
        return Err(LoaderError::NoFiles {
            pattern: pattern.to_string(),
            dir: dir.display().to_string(),
        });
    }

    debug!("Discovered {} file(s) for {}", paths.len(), pattern);
    Ok(paths)
}

/// One source file projected onto the canonical columns.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub path: PathBuf,
    pub encoding: TextEncoding,
    /// Column names after trimming and renaming, before projection
    pub columns: Vec<String>,
    pub df: DataFrame,
}

/// Loads dataset files of one shape.
pub struct DatasetLoader<'a> {
    config: &'a PipelineConfig,
}

impl<'a> DatasetLoader<'a> {
    pub fn new(config: &'a PipelineConfig) -> Self {
        Self { config }
    }

    /// Read, decode, parse and normalize a single file.
    pub fn load(&self, path: &Path) -> Result<LoadedTable, LoaderError> {
        let file = path.display().to_string();
        info!("Reading {}...", file);

        let bytes = std::fs::read(path).map_err(|source| LoaderError::Io {
            path: file.clone(),
            source,
        })?;

        let (text, encoding) = decode(bytes);
        let separator = match encoding {
            TextEncoding::Utf8 => self.config.primary_separator(),
            TextEncoding::Latin1 => {
                warn!(
                    "{} is not valid UTF-8, retrying as latin-1 with separator {:?}",
                    file,
                    self.config.fallback_separator() as char
                );
                self.config.fallback_separator()
            }
        };

        let mut df = parse_csv(text, separator).map_err(|source| LoaderError::Csv {
            path: file.clone(),
            source,
        })?;
        normalize_columns(&mut df).map_err(|source| LoaderError::Csv {
            path: file.clone(),
            source,
        })?;

        let columns = column_names(&df);
        info!("Columns of {} ({}): {:?}", file, encoding, columns);

        let df = project_canonical(&df, &file)?;

        Ok(LoadedTable {
            path: path.to_path_buf(),
            encoding,
            columns,
            df,
        })
    }
}

/// Parse delimited text with every column kept as a string.
fn parse_csv(text: String, separator: u8) -> PolarsResult<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .map_parse_options(|opts| opts.with_separator(separator))
        .into_reader_with_file_handle(Cursor::new(text.into_bytes()))
        .finish()
}

fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Trim header whitespace and map historical names onto canonical ones.
pub fn normalize_columns(df: &mut DataFrame) -> PolarsResult<()> {
    let padded: Vec<(String, String)> = df
        .get_column_names()
        .iter()
        .filter(|s| s.trim() != s.as_str())
        .map(|s| (s.to_string(), s.trim().to_string()))
        .collect();
    for (name, trimmed) in padded {
        df.rename(&name, trimmed.into())?;
    }

    for (historical, canonical) in COLUMN_RENAMES {
        if df.get_column_index(historical).is_none() {
            continue;
        }
        if df.get_column_index(canonical).is_some() {
            warn!(
                "Both {} and {} present, keeping {}",
                historical, canonical, canonical
            );
            continue;
        }
        df.rename(historical, canonical.into())?;
    }

    Ok(())
}

/// Keep only the canonical columns, in canonical order.
pub fn project_canonical(df: &DataFrame, file: &str) -> Result<DataFrame, LoaderError> {
    if let Some(missing) = CANONICAL_COLUMNS
        .iter()
        .find(|c| df.get_column_index(c).is_none())
    {
        return Err(LoaderError::MissingColumn {
            file: file.to_string(),
            column: missing.to_string(),
        });
    }

    df.select(CANONICAL_COLUMNS).map_err(|source| LoaderError::Csv {
        path: file.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DatasetShape, COURSE_COL, MUNICIPALITY_COL, REGION_COL, SEX_COL};

    const PDA_HEADER: &str =
        " ANO_CONCESSAO_BOLSA ;UF_BENEFICIARIO;MUNICIPIO_BENEFICIARIO;NOME_CURSO_BOLSA;SEXO_BENEFICIARIO;RACA_BENEFICIARIO_BOLSA\n";

    fn cell(df: &DataFrame, column: &str, row: usize) -> Option<String> {
        df.column(column)
            .unwrap()
            .str()
            .unwrap()
            .get(row)
            .map(|s| s.to_string())
    }

    #[test]
    fn test_decode_strips_bom() {
        let mut bytes = "\u{feff}A;B\n".as_bytes().to_vec();
        bytes.extend_from_slice(b"1;2\n");
        let (text, encoding) = decode(bytes);
        assert_eq!(text, "A;B\n1;2\n");
        assert_eq!(encoding, TextEncoding::Utf8);
    }

    #[test]
    fn test_decode_falls_back_to_latin1() {
        // "SÃO" in latin-1
        let (text, encoding) = decode(vec![b'S', 0xC3, b'O']);
        assert_eq!(text, "SÃO");
        assert_eq!(encoding, TextEncoding::Latin1);

        let (text, _) = decode(vec![b'C', 0xEA, b'n', b'c', b'i', b'a']);
        assert_eq!(text, "Cência");
    }

    #[test]
    fn test_discover_sorts_and_filters() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["pda-prouni-2019.csv", "pda-prouni-2017.csv", "prouni_2018.csv", "notes.txt"] {
            std::fs::write(dir.path().join(name), "x\n").unwrap();
        }

        let paths = discover(dir.path(), "pda-prouni-*.csv").unwrap();
        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, ["pda-prouni-2017.csv", "pda-prouni-2019.csv"]);
    }

    #[test]
    fn test_discover_no_match() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover(dir.path(), "prouni_*.csv").unwrap_err();
        assert!(matches!(err, LoaderError::NoFiles { .. }));
    }

    #[test]
    fn test_load_normalizes_historical_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pda-prouni-2016.csv");
        let body = format!(
            "{}2016;SP;SANTOS;Engenharia Civil;M;Branca\n2016;RJ;NITEROI;Direito;F;Parda\n",
            PDA_HEADER
        );
        std::fs::write(&path, body).unwrap();

        let config = DatasetShape::Pda.config();
        let table = DatasetLoader::new(&config).load(&path).unwrap();

        assert_eq!(table.encoding, TextEncoding::Utf8);
        assert!(table.columns.contains(&"RACA_BENEFICIARIO_BOLSA".to_string()));
        assert!(table.columns.contains(&REGION_COL.to_string()));
        assert_eq!(column_names(&table.df), CANONICAL_COLUMNS);
        assert_eq!(table.df.height(), 2);
        assert_eq!(cell(&table.df, MUNICIPALITY_COL, 0).as_deref(), Some("SANTOS"));
        assert_eq!(cell(&table.df, SEX_COL, 1).as_deref(), Some("F"));
    }

    #[test]
    fn test_load_latin1_uses_fallback_separator() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prouni_2015.csv");
        let mut body = b"SIGLA_UF_BENEFICIARIO_BOLSA;MUNICIPIO_BENEFICIARIO_BOLSA;NOME_CURSO_BOLSA;ANO_CONCESSAO_BOLSA;SEXO_BENEFICIARIO_BOLSA\n".to_vec();
        body.extend_from_slice(b"SP;GUARUJA;Ci\xEAncia da Computa\xE7\xE3o;2015;F\n");
        std::fs::write(&path, body).unwrap();

        let config = DatasetShape::Prouni.config();
        let table = DatasetLoader::new(&config).load(&path).unwrap();

        assert_eq!(table.encoding, TextEncoding::Latin1);
        assert_eq!(
            cell(&table.df, COURSE_COL, 0).as_deref(),
            Some("Ciência da Computação")
        );
    }

    #[test]
    fn test_load_missing_required_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pda-prouni-2020.csv");
        std::fs::write(&path, "ANO_CONCESSAO_BOLSA;UF_BENEFICIARIO\n2020;SP\n").unwrap();

        let config = DatasetShape::Pda.config();
        let err = DatasetLoader::new(&config).load(&path).unwrap_err();
        match err {
            LoaderError::MissingColumn { column, .. } => assert_eq!(column, MUNICIPALITY_COL),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rename_skipped_when_canonical_present() {
        let mut df = DataFrame::new(vec![
            Column::new("UF_BENEFICIARIO".into(), ["RJ"]),
            Column::new(REGION_COL.into(), ["SP"]),
        ])
        .unwrap();

        normalize_columns(&mut df).unwrap();
        assert_eq!(cell(&df, REGION_COL, 0).as_deref(), Some("SP"));
        assert!(df.get_column_index("UF_BENEFICIARIO").is_some());
    }
}
