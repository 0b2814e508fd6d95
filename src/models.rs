use serde::{Deserialize, Serialize};

/// Rolling sum of newly confirmed cases for one county.
pub type CaseCount = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountyRecord {
    pub name: String,
    pub population: u64,
}

/// Last resolved (county, cases) pair. Owned by whoever drives the
/// recompute between requests; the core only receives and returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub county: String,
    pub cases: CaseCount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Trigger {
    #[value(name = "county")]
    CountyChanged,
    #[value(name = "attendees")]
    AttendeeChanged,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Attendance {
    /// Raw exponential slider position in [0, 3].
    Slider(f64),
    Count(u32),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskResult {
    pub percentage: f64,
    pub label: String,
}
