//! Chart Layout Module
//! Turns per-year series into bar geometry and text labels.
//!
//! Years sit at integer x positions (0, 1, 2, ...) and are shown through
//! `ChartModel::year_labels`. Both the interactive plot and the static
//! export draw from the same model.

use crate::config::ChartLayout;
use crate::stats::YearSeries;

pub const TITLE: &str = "Quantidade de Bolsas por Sexo por Ano";
pub const Y_AXIS_LABEL: &str = "Quantidade de Bolsas";
pub const X_AXIS_LABEL: &str = "Ano";
pub const MALE_LEGEND: &str = "Homens";
pub const FEMALE_LEGEND: &str = "Mulheres";

/// Bar width when both sexes share one x position.
pub const STACKED_BAR_WIDTH: f64 = 0.6;
/// Bar width (and half the pair spacing) for side-by-side bars.
pub const GROUPED_BAR_WIDTH: f64 = 0.4;

/// Label offset above a bar, relative to the tallest column.
const LABEL_OFFSET_RATIO: f64 = 0.01;
/// Extra headroom for the per-year total line.
const TOTAL_OFFSET_RATIO: f64 = 0.06;

/// Index of the year drawn at `x`, when `x` is a whole tick.
pub fn year_index(x: f64) -> Option<usize> {
    let idx = x.round();
    if (x - idx).abs() > 1e-6 || idx < 0.0 {
        return None;
    }
    Some(idx as usize)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn legend(self) -> &'static str {
        match self {
            Sex::Male => MALE_LEGEND,
            Sex::Female => FEMALE_LEGEND,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarGeom {
    pub sex: Sex,
    /// Bar center
    pub x: f64,
    pub width: f64,
    pub base: f64,
    pub height: f64,
}

impl BarGeom {
    pub fn top(&self) -> f64 {
        self.base + self.height
    }
}

/// Text anchored at its bottom center.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelGeom {
    pub x: f64,
    pub y: f64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartModel {
    pub layout: ChartLayout,
    pub year_labels: Vec<String>,
    pub bars: Vec<BarGeom>,
    pub labels: Vec<LabelGeom>,
    /// Upper bound of the value axis, labels included
    pub y_max: f64,
}

impl ChartModel {
    pub fn build(series: &[YearSeries], layout: ChartLayout) -> Self {
        let tallest = series
            .iter()
            .map(|s| match layout {
                ChartLayout::Stacked => s.total(),
                ChartLayout::Grouped => s.male.max(s.female),
            })
            .max()
            .unwrap_or(0) as f64;
        let offset = (tallest * LABEL_OFFSET_RATIO).max(0.5);

        let mut model = Self {
            layout,
            year_labels: series.iter().map(|s| s.year.clone()).collect(),
            bars: Vec::new(),
            labels: Vec::new(),
            y_max: 0.0,
        };

        for (i, s) in series.iter().enumerate() {
            let x = i as f64;
            match layout {
                ChartLayout::Stacked => model.push_stacked(x, s, offset),
                ChartLayout::Grouped => {
                    model.push_grouped(x, s, offset, tallest * TOTAL_OFFSET_RATIO)
                }
            }
        }

        // Labels are bottom-anchored, leave room for the text height.
        let top = model
            .bars
            .iter()
            .map(BarGeom::top)
            .chain(model.labels.iter().map(|l| l.y + offset * 4.0))
            .fold(0.0, f64::max);
        model.y_max = (top * 1.05).max(1.0);
        model
    }

    fn push_stacked(&mut self, x: f64, s: &YearSeries, offset: f64) {
        let male = s.male as f64;
        let female = s.female as f64;

        self.bars.push(BarGeom {
            sex: Sex::Male,
            x,
            width: STACKED_BAR_WIDTH,
            base: 0.0,
            height: male,
        });
        self.bars.push(BarGeom {
            sex: Sex::Female,
            x,
            width: STACKED_BAR_WIDTH,
            base: male,
            height: female,
        });

        if let (Some(male_pct), Some(female_pct)) = (s.male_pct(), s.female_pct()) {
            self.labels.push(LabelGeom {
                x,
                y: male + offset,
                text: format!("{:.1}% H", male_pct),
            });
            self.labels.push(LabelGeom {
                x,
                y: male + female + offset,
                text: format!("{:.1}% F", female_pct),
            });
        }
    }

    fn push_grouped(&mut self, x: f64, s: &YearSeries, offset: f64, total_offset: f64) {
        let half = GROUPED_BAR_WIDTH / 2.0;
        let columns = [
            (Sex::Male, x - half, s.male, s.male_pct()),
            (Sex::Female, x + half, s.female, s.female_pct()),
        ];

        for (sex, bar_x, count, pct) in columns {
            self.bars.push(BarGeom {
                sex,
                x: bar_x,
                width: GROUPED_BAR_WIDTH,
                base: 0.0,
                height: count as f64,
            });
            if let Some(pct) = pct {
                self.labels.push(LabelGeom {
                    x: bar_x,
                    y: count as f64 + offset,
                    text: format!("{} ({:.1}%)", count, pct),
                });
            }
        }

        if s.total() > 0 {
            let taller = s.male.max(s.female) as f64;
            self.labels.push(LabelGeom {
                x,
                y: taller + offset + total_offset,
                text: format!("Total: {}", s.total()),
            });
        }
    }

    pub fn bars_for(&self, sex: Sex) -> impl Iterator<Item = &BarGeom> {
        self.bars.iter().filter(move |b| b.sex == sex)
    }

    pub fn is_empty(&self) -> bool {
        self.year_labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(year: &str, male: usize, female: usize) -> YearSeries {
        YearSeries {
            year: year.to_string(),
            male,
            female,
        }
    }

    #[test]
    fn test_stacked_female_sits_on_male() {
        let model = ChartModel::build(&[series("2020", 30, 10)], ChartLayout::Stacked);

        let male: Vec<_> = model.bars_for(Sex::Male).collect();
        let female: Vec<_> = model.bars_for(Sex::Female).collect();
        assert_eq!(male[0].height, 30.0);
        assert_eq!(female[0].base, 30.0);
        assert_eq!(female[0].top(), 40.0);

        let texts: Vec<_> = model.labels.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, ["75.0% H", "25.0% F"]);
        assert!(model.labels[1].y > 40.0);
        assert!(model.y_max >= model.labels[1].y);
    }

    #[test]
    fn test_grouped_labels_counts_and_total() {
        let model = ChartModel::build(
            &[series("2019", 1, 1), series("2020", 3, 1)],
            ChartLayout::Grouped,
        );

        assert_eq!(model.bars.len(), 4);
        assert_eq!(model.bars[0].x, -0.2);
        assert_eq!(model.bars[1].x, 0.2);

        let texts: Vec<_> = model.labels.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(
            texts,
            [
                "1 (50.0%)",
                "1 (50.0%)",
                "Total: 2",
                "3 (75.0%)",
                "1 (25.0%)",
                "Total: 4"
            ]
        );

        let total = &model.labels[5];
        assert_eq!(total.x, 1.0);
        assert!(total.y > model.labels[3].y);
    }

    #[test]
    fn test_zero_total_year_has_no_labels() {
        let model = ChartModel::build(&[series("2021", 0, 0)], ChartLayout::Grouped);
        assert_eq!(model.bars.len(), 2);
        assert!(model.labels.is_empty());
        assert_eq!(model.y_max, 1.0);
    }

    #[test]
    fn test_empty_input_builds_empty_chart() {
        let model = ChartModel::build(&[], ChartLayout::Stacked);
        assert!(model.is_empty());
        assert!(model.bars.is_empty());
    }

    #[test]
    fn test_year_index_only_on_whole_ticks() {
        assert_eq!(year_index(1.0), Some(1));
        assert_eq!(year_index(0.5), None);
        assert_eq!(year_index(-1.0), None);
        assert_eq!(year_index(2.0000000001), Some(2));
    }
}
