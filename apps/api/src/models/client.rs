use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::lfa::aggregate::{average, count, sum, Rounding};
use crate::lfa::filter::Filterable;
use crate::lfa::paginate::{SortValue, Sortable};
use crate::lfa::Record;
use crate::models::status::StatusMachine;
use crate::models::{require_email, require_range, require_text, Entity};
use crate::repo::{Repositories, Repository};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientStatus {
    #[default]
    Prospect,
    Active,
    OnHold,
    Churned,
}

impl StatusMachine for ClientStatus {
    const ENTITY: &'static str = "client";
    const INITIAL: Self = ClientStatus::Prospect;
    const VARIANTS: &'static [Self] = &[
        ClientStatus::Prospect,
        ClientStatus::Active,
        ClientStatus::OnHold,
        ClientStatus::Churned,
    ];

    fn as_str(self) -> &'static str {
        match self {
            ClientStatus::Prospect => "prospect",
            ClientStatus::Active => "active",
            ClientStatus::OnHold => "on_hold",
            ClientStatus::Churned => "churned",
        }
    }

    fn allowed_next(self) -> &'static [Self] {
        use ClientStatus::*;
        match self {
            Prospect => &[Active],
            Active => &[OnHold, Churned],
            OnHold => &[Active, Churned],
            // win-back
            Churned => &[Prospect],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    #[serde(default)]
    pub id: String,
    pub company: String,
    pub contact_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub industry: String,
    #[serde(default)]
    pub account_manager: Option<String>,
    #[serde(default)]
    pub status: ClientStatus,
    #[serde(default)]
    pub open_positions: u32,
    #[serde(default)]
    pub outstanding_debt: f64,
    /// Latest satisfaction survey, 1–5.
    #[serde(default)]
    pub satisfaction: Option<f64>,
}

impl Record for Client {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Filterable for Client {
    const CATEGORICAL_FIELDS: &'static [&'static str] = &["status", "industry", "account_manager"];
    const NUMERIC_FIELDS: &'static [&'static str] =
        &["satisfaction", "outstanding_debt", "open_positions"];

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.company.as_str(),
            self.contact_name.as_str(),
            self.email.as_str(),
            self.industry.as_str(),
        ]
    }

    fn categorical(&self, field: &str) -> Option<&str> {
        match field {
            "status" => Some(self.status.as_str()),
            "industry" => Some(self.industry.as_str()),
            "account_manager" => self.account_manager.as_deref(),
            _ => None,
        }
    }

    fn numeric(&self, field: &str) -> Option<f64> {
        match field {
            "satisfaction" => self.satisfaction,
            "outstanding_debt" => Some(self.outstanding_debt),
            "open_positions" => Some(f64::from(self.open_positions)),
            _ => None,
        }
    }
}

impl Sortable for Client {
    const SORT_FIELDS: &'static [&'static str] =
        &["company", "outstanding_debt", "open_positions", "satisfaction"];

    fn sort_value(&self, field: &str) -> Option<SortValue> {
        match field {
            "company" => Some(SortValue::Text(self.company.clone())),
            "outstanding_debt" => Some(SortValue::Number(self.outstanding_debt)),
            "open_positions" => Some(SortValue::Number(f64::from(self.open_positions))),
            "satisfaction" => self.satisfaction.map(SortValue::Number),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClientStats {
    pub total: usize,
    pub active: usize,
    pub total_outstanding_debt: f64,
    pub open_positions: u64,
    pub average_satisfaction: f64,
}

impl Entity for Client {
    const KIND: &'static str = "client";
    const COLLECTION: &'static str = "clients";

    type Status = ClientStatus;
    type Stats = ClientStats;

    fn status(&self) -> ClientStatus {
        self.status
    }

    fn with_status(&self, status: ClientStatus) -> Self {
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
        require_text(&mut errors, "company", &self.company);
        require_text(&mut errors, "contact_name", &self.contact_name);
        require_email(&mut errors, &self.email);
        require_text(&mut errors, "industry", &self.industry);
        require_range(&mut errors, "satisfaction", self.satisfaction, 1.0, 5.0);
        if self.outstanding_debt < 0.0 {
            errors.push("outstanding_debt cannot be negative".to_string());
        }
        errors
    }

    fn summarize(store: &[Self]) -> ClientStats {
        ClientStats {
            total: store.len(),
            active: count(store, |c| c.status == ClientStatus::Active),
            total_outstanding_debt: sum(
                store.iter().map(|c| c.outstanding_debt),
                Rounding::Cents,
            ),
            open_positions: store.iter().map(|c| u64::from(c.open_positions)).sum(),
            average_satisfaction: average(
                store.iter().filter_map(|c| c.satisfaction),
                Rounding::OneDecimal,
            ),
        }
    }

    fn repository(repos: &Repositories) -> &Arc<dyn Repository<Self>> {
        &repos.clients
    }
}
