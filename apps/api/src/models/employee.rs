use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::lfa::aggregate::{average, count, percentage, Rounding};
use crate::lfa::filter::Filterable;
use crate::lfa::paginate::{SortValue, Sortable};
use crate::lfa::Record;
use crate::models::status::StatusMachine;
use crate::models::{require_email, require_range, require_text, today, Entity};
use crate::repo::{Repositories, Repository};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    #[default]
    Onboarding,
    Active,
    AtRisk,
    Resigned,
}

impl StatusMachine for EmployeeStatus {
    const ENTITY: &'static str = "employee";
    const INITIAL: Self = EmployeeStatus::Onboarding;
    const VARIANTS: &'static [Self] = &[
        EmployeeStatus::Onboarding,
        EmployeeStatus::Active,
        EmployeeStatus::AtRisk,
        EmployeeStatus::Resigned,
    ];

    fn as_str(self) -> &'static str {
        match self {
            EmployeeStatus::Onboarding => "onboarding",
            EmployeeStatus::Active => "active",
            EmployeeStatus::AtRisk => "at_risk",
            EmployeeStatus::Resigned => "resigned",
        }
    }

    fn allowed_next(self) -> &'static [Self] {
        use EmployeeStatus::*;
        match self {
            Onboarding => &[Active, Resigned],
            Active => &[AtRisk, Resigned],
            AtRisk => &[Active, Resigned],
            Resigned => &[],
        }
    }
}

/// A placed employee tracked on the retention dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub email: String,
    pub department: String,
    pub position: String,
    /// Client company the employee is placed with.
    #[serde(default)]
    pub client: Option<String>,
    #[serde(default)]
    pub status: EmployeeStatus,
    /// Latest pulse survey, 0–10.
    #[serde(default)]
    pub satisfaction: Option<f64>,
    #[serde(default)]
    pub tenure_months: u32,
    #[serde(default)]
    pub last_check_in: Option<NaiveDate>,
    #[serde(default = "today")]
    pub started_on: NaiveDate,
}

impl Record for Employee {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Filterable for Employee {
    const CATEGORICAL_FIELDS: &'static [&'static str] = &["status", "department", "client"];
    const NUMERIC_FIELDS: &'static [&'static str] = &["satisfaction", "tenure_months"];

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.name.as_str(),
            self.email.as_str(),
            self.department.as_str(),
            self.position.as_str(),
        ]
    }

    fn categorical(&self, field: &str) -> Option<&str> {
        match field {
            "status" => Some(self.status.as_str()),
            "department" => Some(self.department.as_str()),
            "client" => self.client.as_deref(),
            _ => None,
        }
    }

    fn numeric(&self, field: &str) -> Option<f64> {
        match field {
            "satisfaction" => self.satisfaction,
            "tenure_months" => Some(f64::from(self.tenure_months)),
            _ => None,
        }
    }
}

impl Sortable for Employee {
    const SORT_FIELDS: &'static [&'static str] =
        &["name", "satisfaction", "tenure_months", "last_check_in"];

    fn sort_value(&self, field: &str) -> Option<SortValue> {
        match field {
            "name" => Some(SortValue::Text(self.name.clone())),
            "satisfaction" => self.satisfaction.map(SortValue::Number),
            "tenure_months" => Some(SortValue::Number(f64::from(self.tenure_months))),
            "last_check_in" => self.last_check_in.map(|d| SortValue::Text(d.to_string())),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EmployeeStats {
    pub total: usize,
    /// Everyone who has not resigned.
    pub headcount: usize,
    pub at_risk: usize,
    pub average_satisfaction: f64,
    /// Share of tracked employees still employed, percent.
    pub retention_rate: f64,
}

impl Entity for Employee {
    const KIND: &'static str = "employee";
    const COLLECTION: &'static str = "employees";

    type Status = EmployeeStatus;
    type Stats = EmployeeStats;

    fn status(&self) -> EmployeeStatus {
        self.status
    }

    fn with_status(&self, status: EmployeeStatus) -> Self {
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
        require_text(&mut errors, "department", &self.department);
        require_text(&mut errors, "position", &self.position);
        require_range(&mut errors, "satisfaction", self.satisfaction, 0.0, 10.0);
        errors
    }

    fn summarize(store: &[Self]) -> EmployeeStats {
        let headcount = count(store, |e| e.status != EmployeeStatus::Resigned);
        EmployeeStats {
            total: store.len(),
            headcount,
            at_risk: count(store, |e| e.status == EmployeeStatus::AtRisk),
            average_satisfaction: average(
                store.iter().filter_map(|e| e.satisfaction),
                Rounding::Integer,
            ),
            retention_rate: percentage(headcount as f64, store.len() as f64),
        }
    }

    fn repository(repos: &Repositories) -> &Arc<dyn Repository<Self>> {
        &repos.employees
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee(id: &str, status: EmployeeStatus, satisfaction: Option<f64>) -> Employee {
        Employee {
            id: id.to_string(),
            name: format!("Employee {id}"),
            email: format!("e{id}@example.com"),
            department: "Engineering".to_string(),
            position: "Developer".to_string(),
            client: None,
            status,
            satisfaction,
            tenure_months: 12,
            last_check_in: None,
            started_on: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
        }
    }

    #[test]
    fn test_retention_rate_and_integer_average() {
        let store = vec![
            employee("1", EmployeeStatus::Active, Some(8.0)),
            employee("2", EmployeeStatus::AtRisk, Some(4.0)),
            employee("3", EmployeeStatus::Resigned, Some(3.0)),
            employee("4", EmployeeStatus::Onboarding, None),
        ];
        let stats = Employee::summarize(&store);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.headcount, 3);
        assert_eq!(stats.at_risk, 1);
        assert_eq!(stats.retention_rate, 75.0);
        // (8 + 4 + 3) / 3 = 5
        assert_eq!(stats.average_satisfaction, 5.0);
    }

    #[test]
    fn test_empty_store_rates_are_zero() {
        let stats = Employee::summarize(&[]);
        assert_eq!(stats.retention_rate, 0.0);
        assert_eq!(stats.average_satisfaction, 0.0);
    }

    #[test]
    fn test_at_risk_can_recover() {
        assert!(EmployeeStatus::AtRisk.can_transition_to(EmployeeStatus::Active));
        assert!(!EmployeeStatus::Resigned.can_transition_to(EmployeeStatus::Active));
    }
}
