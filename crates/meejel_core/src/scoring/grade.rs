//! Grade → multiplier lookup table.

use crate::model::principle::Grade;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Invalid grade table input.
#[derive(Debug, Clone, PartialEq)]
pub enum GradeTableError {
    MissingGrade(Grade),
    /// Multiplier is negative, NaN or infinite.
    InvalidMultiplier { grade: Grade, value: f64 },
}

impl Display for GradeTableError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingGrade(grade) => {
                write!(f, "grade table has no multiplier for `{}`", grade.label())
            }
            Self::InvalidMultiplier { grade, value } => write!(
                f,
                "grade `{}` has invalid multiplier {value}; expected a finite non-negative number",
                grade.label()
            ),
        }
    }
}

impl Error for GradeTableError {}

/// Complete mapping from every [`Grade`] to its weight multiplier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradeTable {
    low: f64,
    medium: f64,
    high: f64,
}

impl GradeTable {
    /// Builds a table from explicit multipliers.
    pub fn new(low: f64, medium: f64, high: f64) -> Result<Self, GradeTableError> {
        let table = Self { low, medium, high };
        for grade in Grade::ALL {
            let value = table.multiplier(grade);
            if !value.is_finite() || value < 0.0 {
                return Err(GradeTableError::InvalidMultiplier { grade, value });
            }
        }
        Ok(table)
    }

    /// Builds a table from a label-keyed map; every grade must be present.
    pub fn from_map(multipliers: &BTreeMap<Grade, f64>) -> Result<Self, GradeTableError> {
        let lookup = |grade: Grade| {
            multipliers
                .get(&grade)
                .copied()
                .ok_or(GradeTableError::MissingGrade(grade))
        };
        Self::new(
            lookup(Grade::Low)?,
            lookup(Grade::Medium)?,
            lookup(Grade::High)?,
        )
    }

    pub fn multiplier(&self, grade: Grade) -> f64 {
        match grade {
            Grade::Low => self.low,
            Grade::Medium => self.medium,
            Grade::High => self.high,
        }
    }

    pub fn to_map(&self) -> BTreeMap<Grade, f64> {
        Grade::ALL
            .into_iter()
            .map(|grade| (grade, self.multiplier(grade)))
            .collect()
    }
}

impl Default for GradeTable {
    fn default() -> Self {
        Self {
            low: 1.0,
            medium: 2.0,
            high: 3.0,
        }
    }
}
