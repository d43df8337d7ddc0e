use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
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
pub enum InvoiceStatus {
    #[default]
    Draft,
    Sent,
    Paid,
    Overdue,
    Void,
}

impl StatusMachine for InvoiceStatus {
    const ENTITY: &'static str = "invoice";
    const INITIAL: Self = InvoiceStatus::Draft;
    const VARIANTS: &'static [Self] = &[
        InvoiceStatus::Draft,
        InvoiceStatus::Sent,
        InvoiceStatus::Paid,
        InvoiceStatus::Overdue,
        InvoiceStatus::Void,
    ];

    fn as_str(self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
            InvoiceStatus::Void => "void",
        }
    }

    fn allowed_next(self) -> &'static [Self] {
        use InvoiceStatus::*;
        match self {
            Draft => &[Sent, Void],
            Sent => &[Paid, Overdue, Void],
            Overdue => &[Paid, Void],
            Paid | Void => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    #[serde(default)]
    pub id: String,
    pub number: String,
    pub client_id: String,
    pub amount: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "today")]
    pub issued_on: NaiveDate,
    pub due_on: NaiveDate,
    #[serde(default)]
    pub status: InvoiceStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl Invoice {
    /// Still owed by the client.
    pub fn is_outstanding(&self) -> bool {
        matches!(self.status, InvoiceStatus::Sent | InvoiceStatus::Overdue)
    }

    /// Sent but unpaid past its due date; a candidate for `overdue`.
    pub fn is_past_due(&self, on: NaiveDate) -> bool {
        self.status == InvoiceStatus::Sent && self.due_on < on
    }
}

impl Record for Invoice {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Filterable for Invoice {
    const CATEGORICAL_FIELDS: &'static [&'static str] = &["status", "client_id", "currency"];
    const NUMERIC_FIELDS: &'static [&'static str] = &["amount"];

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.number.as_str(), self.client_id.as_str()];
        if let Some(notes) = &self.notes {
            fields.push(notes.as_str());
        }
        fields
    }

    fn categorical(&self, field: &str) -> Option<&str> {
        match field {
            "status" => Some(self.status.as_str()),
            "client_id" => Some(self.client_id.as_str()),
            "currency" => Some(self.currency.as_str()),
            _ => None,
        }
    }

    fn numeric(&self, field: &str) -> Option<f64> {
        match field {
            "amount" => Some(self.amount),
            _ => None,
        }
    }
}

impl Sortable for Invoice {
    const SORT_FIELDS: &'static [&'static str] = &["number", "amount", "issued_on", "due_on"];

    fn sort_value(&self, field: &str) -> Option<SortValue> {
        match field {
            "number" => Some(SortValue::Text(self.number.clone())),
            "amount" => Some(SortValue::Number(self.amount)),
            "issued_on" => Some(SortValue::Text(self.issued_on.to_string())),
            "due_on" => Some(SortValue::Text(self.due_on.to_string())),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InvoiceStats {
    pub total: usize,
    pub by_status: BTreeMap<&'static str, usize>,
    pub outstanding_amount: f64,
    pub paid_amount: f64,
    /// Sent invoices already past their due date but not yet marked overdue.
    pub past_due: usize,
}

impl Entity for Invoice {
    const KIND: &'static str = "invoice";
    const COLLECTION: &'static str = "invoices";

    type Status = InvoiceStatus;
    type Stats = InvoiceStats;

    fn status(&self) -> InvoiceStatus {
        self.status
    }

    fn with_status(&self, status: InvoiceStatus) -> Self {
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
        require_text(&mut errors, "number", &self.number);
        require_text(&mut errors, "client_id", &self.client_id);
        if self.amount <= 0.0 {
            errors.push("amount must be positive".to_string());
        }
        if self.due_on < self.issued_on {
            errors.push(format!(
                "due_on {} is before issued_on {}",
                self.due_on, self.issued_on
            ));
        }
        errors
    }

    fn summarize(store: &[Self]) -> InvoiceStats {
        let now = today();
        InvoiceStats {
            total: store.len(),
            by_status: status_breakdown(store),
            outstanding_amount: sum(
                store
                    .iter()
                    .filter(|i| i.is_outstanding())
                    .map(|i| i.amount),
                Rounding::Cents,
            ),
            paid_amount: sum(
                store
                    .iter()
                    .filter(|i| i.status == InvoiceStatus::Paid)
                    .map(|i| i.amount),
                Rounding::Cents,
            ),
            past_due: count(store, |i| i.is_past_due(now)),
        }
    }

    fn repository(repos: &Repositories) -> &Arc<dyn Repository<Self>> {
        &repos.invoices
    }
}
