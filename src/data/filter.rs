//! Record Filter Module
//! Keeps rows by region, municipality allow-list and course category.

use crate::config::{PipelineConfig, COURSE_COL, MUNICIPALITY_COL, REGION_COL};
use crate::data::categories::{CategoryError, CategoryVocabulary, CourseMatcher};
use polars::prelude::*;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error(transparent)]
    Category(#[from] CategoryError),
}

/// Conjunction of the region, municipality and course predicates.
pub struct RecordFilter {
    region_code: String,
    municipalities: HashSet<String>,
    courses: CourseMatcher,
}

impl RecordFilter {
    pub fn new(
        config: &PipelineConfig,
        vocabulary: &CategoryVocabulary,
    ) -> Result<Self, FilterError> {
        Ok(Self {
            region_code: config.region_code.clone(),
            municipalities: config.municipalities.iter().cloned().collect(),
            courses: CourseMatcher::new(vocabulary)?,
        })
    }

    /// Row-level predicate. Null fields never match.
    pub fn keeps(&self, region: Option<&str>, municipality: Option<&str>, course: Option<&str>) -> bool {
        region == Some(self.region_code.as_str())
            && municipality.is_some_and(|m| self.municipalities.contains(m))
            && course.is_some_and(|c| self.courses.is_match(c))
    }

    /// Filter a canonical table; the column set is unchanged.
    pub fn apply(&self, df: &DataFrame) -> Result<DataFrame, FilterError> {
        let region = df.column(REGION_COL)?.str()?;
        let municipality = df.column(MUNICIPALITY_COL)?.str()?;
        let course = df.column(COURSE_COL)?.str()?;

        let mask: Vec<bool> = region
            .into_iter()
            .zip(municipality.into_iter())
            .zip(course.into_iter())
            .map(|((r, m), c)| self.keeps(r, m, c))
            .collect();

        let mask = BooleanChunked::from_slice("mask".into(), &mask);
        Ok(df.filter(&mask)?)
    }
}
