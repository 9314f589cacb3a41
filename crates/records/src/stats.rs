//! Aggregate statistics over a user's reading history.

use diagnosis::Category;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::types::Reading;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadingStats {
    pub count: usize,
    /// Mean systolic rounded to the nearest integer, 0 without readings
    pub avg_systolic: i32,
    /// Mean diastolic rounded to the nearest integer, 0 without readings
    pub avg_diastolic: i32,
    /// Readings per category, every category present, least severe first
    pub by_category: BTreeMap<Category, usize>,
    pub latest: Option<Reading>,
}

impl ReadingStats {
    pub fn from_readings(readings: &[Reading]) -> Self {
        let mut by_category: BTreeMap<Category, usize> =
            Category::ALL.into_iter().map(|c| (c, 0)).collect();

        let (mut systolic_sum, mut diastolic_sum) = (0i64, 0i64);
        for reading in readings {
            systolic_sum += i64::from(reading.systolic);
            diastolic_sum += i64::from(reading.diastolic);
            *by_category.entry(reading.diagnosis).or_insert(0) += 1;
        }

        let count = readings.len();
        let latest = readings.iter().max_by_key(|r| r.created_at).cloned();

        Self {
            count,
            avg_systolic: rounded_mean(systolic_sum, count),
            avg_diastolic: rounded_mean(diastolic_sum, count),
            by_category,
            latest,
        }
    }

    /// Most severe category seen in the history.
    pub fn worst_category(&self) -> Option<Category> {
        self.by_category
            .iter()
            .rev()
            .find(|(_, n)| **n > 0)
            .map(|(c, _)| *c)
    }
}

fn rounded_mean(sum: i64, count: usize) -> i32 {
    if count == 0 {
        return 0;
    }
    (sum as f64 / count as f64).round() as i32
}
