//! Row Types
//!
//! Shapes of the remote rows this crate reads. Rows are owned and validated
//! by the remote schema; nothing here enforces invariants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A construction project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    /// Contract value
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub main_job_site_id: Option<String>,
    /// Embedded primary job site, when requested and present
    #[serde(default)]
    pub main_job_site: Option<JobSite>,
}

/// A physical job site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSite {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub full_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employer {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub employer_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worker {
    pub id: String,
    pub first_name: String,
    pub surname: String,
}

impl Worker {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.surname).trim().to_string()
    }
}

/// A worker placement row with its worker embedded
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Placement {
    #[serde(default)]
    pub workers: Option<Worker>,
}

/// User profile; `id` matches the authenticated user id
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

/// An organiser's visit to a site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteVisit {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub project_id: Option<String>,
}
