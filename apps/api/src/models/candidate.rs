use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::lfa::aggregate::{average, count, Rounding};
use crate::lfa::filter::Filterable;
use crate::lfa::paginate::{SortValue, Sortable};
use crate::lfa::Record;
use crate::models::status::StatusMachine;
use crate::models::{require_email, require_range, require_text, status_breakdown, today, Entity};
use crate::repo::{Repositories, Repository};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateStatus {
    #[default]
    Applied,
    PhoneScreen,
    Interview,
    Offer,
    Hired,
    Rejected,
}

impl StatusMachine for CandidateStatus {
    const ENTITY: &'static str = "candidate";
    const INITIAL: Self = CandidateStatus::Applied;
    const VARIANTS: &'static [Self] = &[
        CandidateStatus::Applied,
        CandidateStatus::PhoneScreen,
        CandidateStatus::Interview,
        CandidateStatus::Offer,
        CandidateStatus::Hired,
        CandidateStatus::Rejected,
    ];

    fn as_str(self) -> &'static str {
        match self {
            CandidateStatus::Applied => "applied",
            CandidateStatus::PhoneScreen => "phone_screen",
            CandidateStatus::Interview => "interview",
            CandidateStatus::Offer => "offer",
            CandidateStatus::Hired => "hired",
            CandidateStatus::Rejected => "rejected",
        }
    }

    fn allowed_next(self) -> &'static [Self] {
        use CandidateStatus::*;
        match self {
            Applied => &[PhoneScreen, Rejected],
            PhoneScreen => &[Interview, Rejected],
            Interview => &[Offer, Rejected],
            Offer => &[Hired, Rejected],
            Hired | Rejected => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub role: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Where the candidate came from: referral, job board, LinkedIn, ...
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub status: CandidateStatus,
    #[serde(default)]
    pub experience_years: u32,
    /// Recruiter rating, 0–5.
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default = "today")]
    pub applied_on: NaiveDate,
}

impl Record for Candidate {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Filterable for Candidate {
    const CATEGORICAL_FIELDS: &'static [&'static str] = &["status", "source", "location", "role"];
    const NUMERIC_FIELDS: &'static [&'static str] = &["rating", "experience_years"];

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str(), self.email.as_str(), self.role.as_str()];
        fields.extend(self.tags.iter().map(String::as_str));
        fields
    }

    fn categorical(&self, field: &str) -> Option<&str> {
        match field {
            "status" => Some(self.status.as_str()),
            "source" => self.source.as_deref(),
            "location" => self.location.as_deref(),
            "role" => Some(self.role.as_str()),
            _ => None,
        }
    }

    fn numeric(&self, field: &str) -> Option<f64> {
        match field {
            "rating" => self.rating,
            "experience_years" => Some(f64::from(self.experience_years)),
            _ => None,
        }
    }
}

impl Sortable for Candidate {
    const SORT_FIELDS: &'static [&'static str] =
        &["name", "applied_on", "rating", "experience_years"];

    fn sort_value(&self, field: &str) -> Option<SortValue> {
        match field {
            "name" => Some(SortValue::Text(self.name.clone())),
            "applied_on" => Some(SortValue::Text(self.applied_on.to_string())),
            "rating" => self.rating.map(SortValue::Number),
            "experience_years" => Some(SortValue::Number(f64::from(self.experience_years))),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CandidateStats {
    pub total: usize,
    pub by_status: BTreeMap<&'static str, usize>,
    /// Candidates not yet hired or rejected.
    pub in_pipeline: usize,
    pub hired: usize,
    pub average_rating: f64,
}

impl Entity for Candidate {
    const KIND: &'static str = "candidate";
    const COLLECTION: &'static str = "candidates";

    type Status = CandidateStatus;
    type Stats = CandidateStats;

    fn status(&self) -> CandidateStatus {
        self.status
    }

    fn with_status(&self, status: CandidateStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    fn with_id(self, id: String) -> Self {
        Self { id, ..self }
    }

    fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        require_text(&mut errors, "name", &self.name);
        require_email(&mut errors, &self.email);
        require_text(&mut errors, "role", &self.role);
        require_range(&mut errors, "rating", self.rating, 0.0, 5.0);
        errors
    }

    fn summarize(store: &[Self]) -> CandidateStats {
        CandidateStats {
            total: store.len(),
            by_status: status_breakdown(store),
            in_pipeline: count(store, |c| !c.status.is_terminal()),
            hired: count(store, |c| c.status == CandidateStatus::Hired),
            average_rating: average(store.iter().filter_map(|c| c.rating), Rounding::OneDecimal),
        }
    }

    fn repository(repos: &Repositories) -> &Arc<dyn Repository<Self>> {
        &repos.candidates
    }
}
