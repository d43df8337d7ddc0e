use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::lfa::aggregate::{average, count, percentage, sum, Rounding};
use crate::lfa::filter::Filterable;
use crate::lfa::paginate::{SortValue, Sortable};
use crate::lfa::Record;
use crate::models::status::StatusMachine;
use crate::models::{require_email, require_range, require_text, Entity};
use crate::repo::{Repositories, Repository};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VendorStatus {
    #[default]
    Pending,
    Active,
    Suspended,
    Terminated,
}

impl StatusMachine for VendorStatus {
    const ENTITY: &'static str = "vendor";
    const INITIAL: Self = VendorStatus::Pending;
    const VARIANTS: &'static [Self] = &[
        VendorStatus::Pending,
        VendorStatus::Active,
        VendorStatus::Suspended,
        VendorStatus::Terminated,
    ];

    fn as_str(self) -> &'static str {
        match self {
            VendorStatus::Pending => "pending",
            VendorStatus::Active => "active",
            VendorStatus::Suspended => "suspended",
            VendorStatus::Terminated => "terminated",
        }
    }

    fn allowed_next(self) -> &'static [Self] {
        use VendorStatus::*;
        match self {
            Pending => &[Active, Terminated],
            Active => &[Suspended, Terminated],
            Suspended => &[Active, Terminated],
            Terminated => &[],
        }
    }
}

/// A supplier of recruiting services: job boards, background checks,
/// staffing partners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vendor {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub contact_name: String,
    pub email: String,
    pub category: String,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub status: VendorStatus,
    /// 0–5.
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub contract_value: f64,
    #[serde(default)]
    pub used_capacity: u32,
    #[serde(default)]
    pub total_capacity: u32,
}

impl Record for Vendor {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Filterable for Vendor {
    const CATEGORICAL_FIELDS: &'static [&'static str] = &["status", "category"];
    const NUMERIC_FIELDS: &'static [&'static str] = &["rating", "contract_value"];

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![
            self.name.as_str(),
            self.contact_name.as_str(),
            self.email.as_str(),
            self.category.as_str(),
        ];
        fields.extend(self.services.iter().map(String::as_str));
        fields
    }

    fn categorical(&self, field: &str) -> Option<&str> {
        match field {
            "status" => Some(self.status.as_str()),
            "category" => Some(self.category.as_str()),
            _ => None,
        }
    }

    fn numeric(&self, field: &str) -> Option<f64> {
        match field {
            "rating" => self.rating,
            "contract_value" => Some(self.contract_value),
            _ => None,
        }
    }
}

impl Sortable for Vendor {
    const SORT_FIELDS: &'static [&'static str] = &["name", "rating", "contract_value"];

    fn sort_value(&self, field: &str) -> Option<SortValue> {
        match field {
            "name" => Some(SortValue::Text(self.name.clone())),
            "rating" => self.rating.map(SortValue::Number),
            "contract_value" => Some(SortValue::Number(self.contract_value)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VendorStats {
    pub total: usize,
    pub active: usize,
    pub average_rating: f64,
    pub total_contract_value: f64,
    /// Used capacity over total capacity across all vendors, percent.
    pub capacity_utilisation: f64,
}

impl Entity for Vendor {
    const KIND: &'static str = "vendor";
    const COLLECTION: &'static str = "vendors";

    type Status = VendorStatus;
    type Stats = VendorStats;

    fn status(&self) -> VendorStatus {
        self.status
    }

    fn with_status(&self, status: VendorStatus) -> Self {
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
        require_text(&mut errors, "contact_name", &self.contact_name);
        require_email(&mut errors, &self.email);
        require_text(&mut errors, "category", &self.category);
        require_range(&mut errors, "rating", self.rating, 0.0, 5.0);
        if self.used_capacity > self.total_capacity {
            errors.push(format!(
                "used_capacity ({}) exceeds total_capacity ({})",
                self.used_capacity, self.total_capacity
            ));
        }
        errors
    }

    fn summarize(store: &[Self]) -> VendorStats {
        let used: u64 = store.iter().map(|v| u64::from(v.used_capacity)).sum();
        let total: u64 = store.iter().map(|v| u64::from(v.total_capacity)).sum();
        VendorStats {
            total: store.len(),
            active: count(store, |v| v.status == VendorStatus::Active),
            average_rating: average(store.iter().filter_map(|v| v.rating), Rounding::OneDecimal),
            total_contract_value: sum(store.iter().map(|v| v.contract_value), Rounding::Cents),
            capacity_utilisation: percentage(used as f64, total as f64),
        }
    }

    fn repository(repos: &Repositories) -> &Arc<dyn Repository<Self>> {
        &repos.vendors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lfa::filter::{apply_filter, FilterConfig};

    fn vendor(id: &str, rating: Option<f64>, used: u32, total: u32) -> Vendor {
        Vendor {
            id: id.to_string(),
            name: format!("Vendor {id}"),
            contact_name: "Omer".to_string(),
            email: "omer@example.com".to_string(),
            category: "job_board".to_string(),
            services: vec!["sourcing".to_string()],
            status: VendorStatus::Active,
            rating,
            contract_value: 1000.0,
            used_capacity: used,
            total_capacity: total,
        }
    }

    #[test]
    fn test_rating_threshold_example() {
        let store = vec![vendor("1", Some(4.8), 0, 10), vendor("2", Some(4.3), 0, 10)];
        let config = FilterConfig::default().at_least("rating", 4.5);
        let result = apply_filter(&store, &config);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "1");
    }

    #[test]
    fn test_capacity_utilisation() {
        let store = vec![vendor("1", None, 30, 50), vendor("2", None, 10, 50)];
        assert_eq!(Vendor::summarize(&store).capacity_utilisation, 40.0);
    }

    #[test]
    fn test_capacity_utilisation_zero_capacity() {
        let store = vec![vendor("1", None, 0, 0)];
        assert_eq!(Vendor::summarize(&store).capacity_utilisation, 0.0);
    }

    #[test]
    fn test_used_over_total_invalid() {
        assert_eq!(vendor("1", None, 11, 10).validate().len(), 1);
    }

    #[test]
    fn test_terminated_is_final() {
        assert!(VendorStatus::Terminated.is_terminal());
        assert!(VendorStatus::Suspended.can_transition_to(VendorStatus::Active));
    }
}
