//! Aggregation Module
//! Concatenates filtered tables and counts grants per (year, sex).

use crate::config::{CANONICAL_COLUMNS, SEX_COL, YEAR_COL};
use polars::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::warn;

pub const MALE: &str = "M";
pub const FEMALE: &str = "F";

#[derive(Error, Debug)]
pub enum AggregateError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Empty table with the canonical string columns.
pub fn empty_table() -> Result<DataFrame, AggregateError> {
    let columns = CANONICAL_COLUMNS
        .iter()
        .map(|name| Column::new((*name).into(), Vec::<String>::new()))
        .collect();
    Ok(DataFrame::new(columns)?)
}

/// Stack tables vertically, keeping input and row order.
pub fn concat_tables(tables: Vec<DataFrame>) -> Result<DataFrame, AggregateError> {
    let mut tables = tables.into_iter();
    let Some(mut combined) = tables.next() else {
        return empty_table();
    };
    for df in tables {
        combined.vstack_mut(&df)?;
    }
    Ok(combined)
}

/// Grant counts keyed by year, then by sex.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupedCounts {
    counts: BTreeMap<String, BTreeMap<String, usize>>,
}

impl GroupedCounts {
    /// Count rows per (year, sex). Rows with a missing year or sex are not grouped.
    pub fn from_table(df: &DataFrame) -> Result<Self, AggregateError> {
        let years = df.column(YEAR_COL)?.str()?;
        let sexes = df.column(SEX_COL)?.str()?;

        let mut grouped = Self::default();
        let mut unexpected: BTreeSet<&str> = BTreeSet::new();

        for (year, sex) in years.into_iter().zip(sexes.into_iter()) {
            let (Some(year), Some(sex)) = (year, sex) else {
                continue;
            };
            if sex != MALE && sex != FEMALE {
                unexpected.insert(sex);
            }
            grouped.add(year, sex, 1);
        }

        if !unexpected.is_empty() {
            warn!(
                "Unexpected sex values {:?} are counted but not charted",
                unexpected
            );
        }

        Ok(grouped)
    }

    pub fn add(&mut self, year: &str, sex: &str, n: usize) {
        *self
            .counts
            .entry(year.to_string())
            .or_default()
            .entry(sex.to_string())
            .or_default() += n;
    }

    pub fn count(&self, year: &str, sex: &str) -> usize {
        self.counts
            .get(year)
            .and_then(|by_sex| by_sex.get(sex))
            .copied()
            .unwrap_or(0)
    }

    /// Rows in a year across every observed sex value.
    pub fn year_total(&self, year: &str) -> usize {
        self.counts
            .get(year)
            .map(|by_sex| by_sex.values().sum())
            .unwrap_or(0)
    }

    /// Percentage of a year's rows (all sexes) that have `sex`.
    pub fn share(&self, year: &str, sex: &str) -> Option<f64> {
        let total = self.year_total(year);
        if total == 0 {
            return None;
        }
        Some(100.0 * self.count(year, sex) as f64 / total as f64)
    }

    pub fn years(&self) -> impl Iterator<Item = &str> {
        self.counts.keys().map(|y| y.as_str())
    }

    pub fn total(&self) -> usize {
        self.counts.keys().map(|y| self.year_total(y)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Male/female series per year, ascending, absent groups filled with 0.
    pub fn series(&self) -> Vec<YearSeries> {
        self.counts
            .keys()
            .map(|year| YearSeries {
                year: year.clone(),
                male: self.count(year, MALE),
                female: self.count(year, FEMALE),
            })
            .collect()
    }
}

/// Male and female grant counts for one year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearSeries {
    pub year: String,
    pub male: usize,
    pub female: usize,
}

impl YearSeries {
    pub fn total(&self) -> usize {
        self.male + self.female
    }

    pub fn male_pct(&self) -> Option<f64> {
        self.pct(self.male)
    }

    pub fn female_pct(&self) -> Option<f64> {
        self.pct(self.female)
    }

    fn pct(&self, n: usize) -> Option<f64> {
        let total = self.total();
        (total > 0).then(|| 100.0 * n as f64 / total as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{COURSE_COL, MUNICIPALITY_COL, REGION_COL};

    fn table(rows: &[(Option<&str>, Option<&str>)]) -> DataFrame {
        let n = rows.len();
        let years: Vec<Option<&str>> = rows.iter().map(|r| r.0).collect();
        let sexes: Vec<Option<&str>> = rows.iter().map(|r| r.1).collect();
        DataFrame::new(vec![
            Column::new(REGION_COL.into(), vec!["SP"; n]),
            Column::new(MUNICIPALITY_COL.into(), vec!["SANTOS"; n]),
            Column::new(COURSE_COL.into(), vec!["Engenharia"; n]),
            Column::new(YEAR_COL.into(), years),
            Column::new(SEX_COL.into(), sexes),
        ])
        .unwrap()
    }

    #[test]
    fn test_concat_preserves_order() {
        let a = table(&[(Some("2019"), Some("M"))]);
        let b = table(&[(Some("2018"), Some("F")), (Some("2020"), Some("M"))]);

        let combined = concat_tables(vec![a, b]).unwrap();
        let years: Vec<Option<&str>> = combined
            .column(YEAR_COL)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(years, [Some("2019"), Some("2018"), Some("2020")]);
    }

    #[test]
    fn test_concat_nothing_is_empty_canonical_table() {
        let combined = concat_tables(Vec::new()).unwrap();
        assert_eq!(combined.height(), 0);
        assert_eq!(combined.width(), CANONICAL_COLUMNS.len());

        let counts = GroupedCounts::from_table(&combined).unwrap();
        assert!(counts.is_empty());
        assert!(counts.series().is_empty());
    }

    #[test]
    fn test_grouping_partitions_rows_by_year_and_sex() {
        let df = table(&[
            (Some("2020"), Some("M")),
            (Some("2020"), Some("F")),
            (Some("2020"), Some("F")),
            (Some("2019"), Some("M")),
            (Some("2021"), Some("X")),
            (None, Some("M")),
            (Some("2021"), None),
        ]);

        let counts = GroupedCounts::from_table(&df).unwrap();
        assert_eq!(counts.years().collect::<Vec<_>>(), ["2019", "2020", "2021"]);
        assert_eq!(counts.count("2020", MALE), 1);
        assert_eq!(counts.count("2020", FEMALE), 2);
        assert_eq!(counts.count("2019", FEMALE), 0);
        assert_eq!(counts.year_total("2021"), 1);
        assert_eq!(counts.total(), 5);

        let series = counts.series();
        assert_eq!(
            series[0],
            YearSeries {
                year: "2019".to_string(),
                male: 1,
                female: 0
            }
        );
        for s in &series {
            if s.year != "2021" {
                assert_eq!(s.total(), counts.year_total(&s.year));
            }
        }
    }

    #[test]
    fn test_percentages_sum_to_hundred() {
        let mut counts = GroupedCounts::default();
        counts.add("2018", MALE, 7);
        counts.add("2018", FEMALE, 5);

        let series = &counts.series()[0];
        let sum = series.male_pct().unwrap() + series.female_pct().unwrap();
        assert!((sum - 100.0).abs() < 1e-9);
        assert!((counts.share("2018", MALE).unwrap() - 58.333333).abs() < 1e-4);
    }

    #[test]
    fn test_zero_total_has_no_percentage() {
        let mut counts = GroupedCounts::default();
        counts.add("2022", "X", 3);

        let series = &counts.series()[0];
        assert_eq!(series.total(), 0);
        assert_eq!(series.male_pct(), None);
        assert_eq!(counts.share("2022", "X"), Some(100.0));
        assert_eq!(counts.share("1999", MALE), None);
    }
}
