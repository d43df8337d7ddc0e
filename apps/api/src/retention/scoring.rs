//! Deterministic rule-based flight-risk scorer.
//!
//! Score contributions (clamped to 0 – 100):
//! - satisfaction (0–10): < 5 → 40, < 7 → 20, unknown → 15
//! - tenure: < 6 months → 15, < 12 months → 5
//! - check-in: never → 20, more than twice the interval → 25, past the interval → 10
//! - currently flagged `at_risk` → 20

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::models::employee::{Employee, EmployeeStatus};
use crate::retention::{RetentionScorer, RiskAssessment, RiskLevel};

pub const CHECK_IN_INTERVAL_DAYS: i64 = 30;

pub struct RuleBasedScorer {
    pub check_in_interval_days: i64,
}

impl Default for RuleBasedScorer {
    fn default() -> Self {
        Self {
            check_in_interval_days: CHECK_IN_INTERVAL_DAYS,
        }
    }
}

impl RuleBasedScorer {
    pub fn score(&self, employee: &Employee, on: NaiveDate) -> (u32, Vec<String>, Option<i64>) {
        let mut score = 0u32;
        let mut factors = Vec::new();

        match employee.satisfaction {
            Some(s) if s < 5.0 => {
                score += 40;
                factors.push(format!("low satisfaction ({s}/10)"));
            }
            Some(s) if s < 7.0 => {
                score += 20;
                factors.push(format!("middling satisfaction ({s}/10)"));
            }
            Some(_) => {}
            None => {
                score += 15;
                factors.push("no satisfaction survey on record".to_string());
            }
        }

        if employee.tenure_months < 6 {
            score += 15;
            factors.push(format!("short tenure ({} months)", employee.tenure_months));
        } else if employee.tenure_months < 12 {
            score += 5;
            factors.push(format!(
                "under a year of tenure ({} months)",
                employee.tenure_months
            ));
        }

        let days_since = employee
            .last_check_in
            .map(|d| (on - d).num_days().max(0));
        match days_since {
            None => {
                score += 20;
                factors.push("never checked in".to_string());
            }
            Some(days) if days > self.check_in_interval_days * 2 => {
                score += 25;
                factors.push(format!("last check-in {days} days ago"));
            }
            Some(days) if days > self.check_in_interval_days => {
                score += 10;
                factors.push(format!("check-in overdue ({days} days)"));
            }
            Some(_) => {}
        }

        if employee.status == EmployeeStatus::AtRisk {
            score += 20;
            factors.push("flagged at risk by account manager".to_string());
        }

        (score.min(100), factors, days_since)
    }
}

#[async_trait]
impl RetentionScorer for RuleBasedScorer {
    fn backend(&self) -> &'static str {
        "rule_based"
    }

    fn check_in_interval_days(&self) -> i64 {
        self.check_in_interval_days
    }

    async fn assess(&self, employee: &Employee, on: NaiveDate) -> RiskAssessment {
        let (risk_score, factors, days_since_check_in) = self.score(employee, on);
        RiskAssessment {
            employee_id: employee.id.clone(),
            name: employee.name.clone(),
            department: employee.department.clone(),
            client: employee.client.clone(),
            status: employee.status,
            risk_score,
            level: RiskLevel::from_score(risk_score),
            factors,
            days_since_check_in,
        }
    }
}
