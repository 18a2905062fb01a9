use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::domain::{Programme, ProgrammeId};

/// Failures while loading programme reference data.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read programme catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid programme catalog CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("programme {0} is listed more than once")]
    DuplicateProgramme(ProgrammeId),
    #[error("programme {id} has an invalid target ({target}); targets must be finite and non-negative")]
    InvalidTarget { id: ProgrammeId, target: f64 },
    #[error("programme catalog is empty")]
    Empty,
}

/// Ordered, immutable list of programmes available for reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgrammeCatalog {
    programmes: Vec<Programme>,
}

impl ProgrammeCatalog {
    pub fn new(programmes: Vec<Programme>) -> Result<Self, CatalogError> {
        if programmes.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        for programme in &programmes {
            if !seen.insert(programme.id) {
                return Err(CatalogError::DuplicateProgramme(programme.id));
            }
            if !programme.target.is_finite() || programme.target < 0.0 {
                return Err(CatalogError::InvalidTarget {
                    id: programme.id,
                    target: programme.target,
                });
            }
        }

        Ok(Self { programmes })
    }

    /// Built-in reference programmes used when no catalog file is configured.
    pub fn standard() -> Self {
        let programme = |id: u32,
                         name: &str,
                         department: &str,
                         indicator: &str,
                         target: f64,
                         unit: &str| {
            Programme {
                id: ProgrammeId(id),
                name: name.to_string(),
                department: department.to_string(),
                indicator: indicator.to_string(),
                quarter: "Q3 2024".to_string(),
                target,
                unit: unit.to_string(),
            }
        };

        Self {
            programmes: vec![
                programme(
                    1,
                    "Community Health Outreach",
                    "Department of Health",
                    "Residents screened",
                    1000.0,
                    "people",
                ),
                programme(
                    2,
                    "Rural Roads Rehabilitation",
                    "Ministry of Transport",
                    "Road resurfaced",
                    120.0,
                    "km",
                ),
                programme(
                    3,
                    "Digital Skills for Youth",
                    "Department of Education",
                    "Learners certified",
                    2500.0,
                    "learners",
                ),
                programme(
                    4,
                    "Clean Water Access",
                    "Water and Sanitation Agency",
                    "Boreholes commissioned",
                    80.0,
                    "boreholes",
                ),
                programme(
                    5,
                    "Small Business Grants",
                    "Ministry of Trade",
                    "Grants disbursed",
                    450.0,
                    "grants",
                ),
            ],
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Parse a CSV export with `id,name,department,indicator,quarter,target,unit` headers.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut programmes = Vec::new();
        for row in csv_reader.deserialize::<CatalogRow>() {
            programmes.push(row?.into_programme());
        }

        Self::new(programmes)
    }

    pub fn find(&self, id: ProgrammeId) -> Option<&Programme> {
        self.programmes.iter().find(|programme| programme.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Programme> {
        self.programmes.iter()
    }

    pub fn programmes(&self) -> &[Programme] {
        &self.programmes
    }

    pub fn len(&self) -> usize {
        self.programmes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programmes.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct CatalogRow {
    id: u32,
    name: String,
    department: String,
    indicator: String,
    quarter: String,
    target: f64,
    unit: String,
}

impl CatalogRow {
    fn into_programme(self) -> Programme {
        Programme {
            id: ProgrammeId(self.id),
            name: self.name,
            department: self.department,
            indicator: self.indicator,
            quarter: self.quarter,
            target: self.target,
            unit: self.unit,
        }
    }
}
