//! Report Pipeline
//! discovery -> load -> filter -> concat -> aggregate, for one dataset shape.

use crate::config::PipelineConfig;
use crate::data::{discover, CategoryVocabulary, DatasetLoader, FilterError, LoaderError, RecordFilter};
use crate::stats::{concat_tables, AggregateError, GroupedCounts, FEMALE, MALE};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Loader(#[from] LoaderError),
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
}

/// Outcome of one run.
#[derive(Debug, Clone)]
pub struct Report {
    pub files: Vec<PathBuf>,
    pub rows_read: usize,
    pub rows_kept: usize,
    pub counts: GroupedCounts,
}

pub struct Pipeline {
    config: PipelineConfig,
    vocabulary: CategoryVocabulary,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, vocabulary: CategoryVocabulary) -> Self {
        Self { config, vocabulary }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run over every matching file in `dir`.
    pub fn run(&self, dir: &Path) -> Result<Report, PipelineError> {
        let files = discover(dir, &self.config.glob_pattern)?;
        let loader = DatasetLoader::new(&self.config);
        let filter = RecordFilter::new(&self.config, &self.vocabulary)?;

        let mut rows_read = 0;
        let mut filtered = Vec::with_capacity(files.len());
        for path in &files {
            let table = loader.load(path)?;
            rows_read += table.df.height();
            let kept = filter.apply(&table.df)?;
            debug!(
                "{} ({}, {} columns): {} of {} rows kept",
                table.path.display(),
                table.encoding,
                table.columns.len(),
                kept.height(),
                table.df.height()
            );
            filtered.push(kept);
        }

        let combined = concat_tables(filtered)?;
        let counts = GroupedCounts::from_table(&combined)?;

        info!(
            "{} file(s), {} rows read, {} rows kept, {} year(s)",
            files.len(),
            rows_read,
            combined.height(),
            counts.years().count()
        );

        for year in counts.years() {
            debug!(
                "{}: {} grant(s), M {:.1}%, F {:.1}%",
                year,
                counts.year_total(year),
                counts.share(year, MALE).unwrap_or(0.0),
                counts.share(year, FEMALE).unwrap_or(0.0)
            );
        }

        Ok(Report {
            files,
            rows_read,
            rows_kept: combined.height(),
            counts,
        })
    }
}
