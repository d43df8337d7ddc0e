use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::lfa::aggregate::{count, sum, Rounding};
use crate::lfa::filter::Filterable;
use crate::lfa::paginate::{SortValue, Sortable};
use crate::lfa::Record;
use crate::models::status::StatusMachine;
use crate::models::{require_text, status_breakdown, today, Entity};
use crate::repo::{Repositories, Repository};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    #[default]
    Draft,
    Sent,
    Signed,
    Cancelled,
    Expired,
}

impl StatusMachine for ContractStatus {
    const ENTITY: &'static str = "contract";
    const INITIAL: Self = ContractStatus::Draft;
    const VARIANTS: &'static [Self] = &[
        ContractStatus::Draft,
        ContractStatus::Sent,
        ContractStatus::Signed,
        ContractStatus::Cancelled,
        ContractStatus::Expired,
    ];

    fn as_str(self) -> &'static str {
        match self {
            ContractStatus::Draft => "draft",
            ContractStatus::Sent => "sent",
            ContractStatus::Signed => "signed",
            ContractStatus::Cancelled => "cancelled",
            ContractStatus::Expired => "expired",
        }
    }

    fn allowed_next(self) -> &'static [Self] {
        use ContractStatus::*;
        match self {
            Draft => &[Sent, Cancelled],
            Sent => &[Signed, Cancelled],
            Signed => &[Expired],
            Cancelled | Expired => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractType {
    Permanent,
    FixedTerm,
    Temporary,
}

impl ContractType {
    pub fn as_str(self) -> &'static str {
        match self {
            ContractType::Permanent => "permanent",
            ContractType::FixedTerm => "fixed_term",
            ContractType::Temporary => "temporary",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ContractType::Permanent => "Permanent employment",
            ContractType::FixedTerm => "Fixed-term employment",
            ContractType::Temporary => "Temporary assignment",
        }
    }

    pub fn requires_end_date(self) -> bool {
        !matches!(self, ContractType::Permanent)
    }
}

fn default_currency() -> String {
    "USD".to_string()
}

/// Placement contract between a candidate and a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    #[serde(default)]
    pub id: String,
    pub candidate_id: String,
    pub client_id: String,
    pub title: String,
    pub contract_type: ContractType,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Annual salary for permanent roles, total fee otherwise.
    pub compensation: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub status: ContractStatus,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Record for Contract {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Filterable for Contract {
    const CATEGORICAL_FIELDS: &'static [&'static str] =
        &["status", "contract_type", "candidate_id", "client_id", "currency"];
    const NUMERIC_FIELDS: &'static [&'static str] = &["compensation"];

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.title.as_str(),
            self.candidate_id.as_str(),
            self.client_id.as_str(),
        ]
    }

    fn categorical(&self, field: &str) -> Option<&str> {
        match field {
            "status" => Some(self.status.as_str()),
            "contract_type" => Some(self.contract_type.as_str()),
            "candidate_id" => Some(self.candidate_id.as_str()),
            "client_id" => Some(self.client_id.as_str()),
            "currency" => Some(self.currency.as_str()),
            _ => None,
        }
    }

    fn numeric(&self, field: &str) -> Option<f64> {
        match field {
            "compensation" => Some(self.compensation),
            _ => None,
        }
    }
}

impl Sortable for Contract {
    const SORT_FIELDS: &'static [&'static str] = &["title", "start_date", "compensation"];

    fn sort_value(&self, field: &str) -> Option<SortValue> {
        match field {
            "title" => Some(SortValue::Text(self.title.clone())),
            "start_date" => Some(SortValue::Text(self.start_date.to_string())),
            "compensation" => Some(SortValue::Number(self.compensation)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ContractStats {
    pub total: usize,
    pub by_status: BTreeMap<&'static str, usize>,
    pub awaiting_signature: usize,
    pub signed_value: f64,
}

impl Entity for Contract {
    const KIND: &'static str = "contract";
    const COLLECTION: &'static str = "contracts";
    // drafted through POST /contracts/generate, which checks both parties
    const GENERIC_CREATE: bool = false;

    type Status = ContractStatus;
    type Stats = ContractStats;

    fn status(&self) -> ContractStatus {
        self.status
    }

    fn with_status(&self, status: ContractStatus) -> Self {
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
        require_text(&mut errors, "title", &self.title);
        require_text(&mut errors, "candidate_id", &self.candidate_id);
        require_text(&mut errors, "client_id", &self.client_id);
        require_text(&mut errors, "currency", &self.currency);
        if self.compensation <= 0.0 {
            errors.push("compensation must be positive".to_string());
        }
        match self.end_date {
            Some(end) if end <= self.start_date => {
                errors.push(format!(
                    "end_date {end} must be after start_date {}",
                    self.start_date
                ));
            }
            None if self.contract_type.requires_end_date() => {
                errors.push(format!(
                    "{} contracts need an end_date",
                    self.contract_type.as_str()
                ));
            }
            _ => {}
        }
        errors
    }

    fn summarize(store: &[Self]) -> ContractStats {
        ContractStats {
            total: store.len(),
            by_status: status_breakdown(store),
            awaiting_signature: count(store, |c| c.status == ContractStatus::Sent),
            signed_value: sum(
                store
                    .iter()
                    .filter(|c| c.status == ContractStatus::Signed)
                    .map(|c| c.compensation),
                Rounding::Cents,
            ),
        }
    }

    fn repository(repos: &Repositories) -> &Arc<dyn Repository<Self>> {
        &repos.contracts
    }
}

impl Contract {
    /// Whether the contract covers `on`. Open-ended contracts never lapse.
    pub fn is_current(&self, on: NaiveDate) -> bool {
        self.start_date <= on && self.end_date.map_or(true, |end| on <= end)
    }

    pub fn is_current_today(&self) -> bool {
        self.is_current(today())
    }
}
