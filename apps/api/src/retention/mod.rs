//! Retention insights: per-employee flight-risk scores rolled up into a
//! report with department breakdowns and follow-up recommendations.
//!
//! `AppState` holds an `Arc<dyn RetentionScorer>`; the default is the
//! deterministic `RuleBasedScorer`.

pub mod handlers;
pub mod scoring;

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::lfa::aggregate::{average, Rounding};
use crate::models::employee::{Employee, EmployeeStatus};

pub use scoring::RuleBasedScorer;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_score(score: u32) -> Self {
        if score >= 60 {
            RiskLevel::High
        } else if score >= 30 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

/// One scored employee.
#[derive(Debug, Clone, Serialize)]
pub struct RiskAssessment {
    pub employee_id: String,
    pub name: String,
    pub department: String,
    pub client: Option<String>,
    pub status: EmployeeStatus,
    pub risk_score: u32, // 0 – 100
    pub level: RiskLevel,
    /// Human-readable reasons that contributed to the score.
    pub factors: Vec<String>,
    pub days_since_check_in: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DepartmentRisk {
    pub department: String,
    pub headcount: usize,
    pub average_risk: f64,
    pub high_risk: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RetentionReport {
    pub generated_at: DateTime<Utc>,
    pub scorer_backend: &'static str,
    pub total_scored: usize,
    pub by_level: BTreeMap<&'static str, usize>,
    pub departments: Vec<DepartmentRisk>,
    /// Highest risk first.
    pub insights: Vec<RiskAssessment>,
    pub recommendations: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait RetentionScorer: Send + Sync {
    /// Short backend name reported alongside results.
    fn backend(&self) -> &'static str;

    /// Days after which an employee's last check-in counts as overdue.
    fn check_in_interval_days(&self) -> i64 {
        scoring::CHECK_IN_INTERVAL_DAYS
    }

    async fn assess(&self, employee: &Employee, on: NaiveDate) -> RiskAssessment;
}

// ────────────────────────────────────────────────────────────────────────────
// Report assembly
// ────────────────────────────────────────────────────────────────────────────

/// Scores every current employee (optionally one department) and builds the
/// report. Resigned employees are skipped.
pub async fn build_report(
    scorer: &dyn RetentionScorer,
    employees: &[Employee],
    department: Option<&str>,
    on: NaiveDate,
) -> RetentionReport {
    let mut insights = Vec::new();
    for employee in employees {
        if employee.status == EmployeeStatus::Resigned {
            continue;
        }
        if let Some(dept) = department {
            if !employee.department.eq_ignore_ascii_case(dept) {
                continue;
            }
        }
        insights.push(scorer.assess(employee, on).await);
    }
    insights.sort_by(|a, b| {
        b.risk_score
            .cmp(&a.risk_score)
            .then_with(|| a.name.cmp(&b.name))
    });

    let mut by_level = BTreeMap::from([("low", 0), ("medium", 0), ("high", 0)]);
    for insight in &insights {
        *by_level.entry(insight.level.as_str()).or_insert(0) += 1;
    }

    let departments = department_breakdown(&insights);
    let recommendations = recommendations(
        &insights,
        &departments,
        scorer.check_in_interval_days(),
    );

    RetentionReport {
        generated_at: Utc::now(),
        scorer_backend: scorer.backend(),
        total_scored: insights.len(),
        by_level,
        departments,
        insights,
        recommendations,
    }
}

fn department_breakdown(insights: &[RiskAssessment]) -> Vec<DepartmentRisk> {
    let mut groups: BTreeMap<&str, Vec<&RiskAssessment>> = BTreeMap::new();
    for insight in insights {
        groups.entry(insight.department.as_str()).or_default().push(insight);
    }
    groups
        .into_iter()
        .map(|(department, members)| DepartmentRisk {
            department: department.to_string(),
            headcount: members.len(),
            average_risk: average(
                members.iter().map(|m| f64::from(m.risk_score)),
                Rounding::OneDecimal,
            ),
            high_risk: members.iter().filter(|m| m.level == RiskLevel::High).count(),
        })
        .collect()
}

fn recommendations(
    insights: &[RiskAssessment],
    departments: &[DepartmentRisk],
    check_in_interval_days: i64,
) -> Vec<String> {
    let mut out = Vec::new();
    for insight in insights.iter().filter(|i| i.level == RiskLevel::High) {
        let overdue = insight
            .days_since_check_in
            .map_or(true, |d| d > check_in_interval_days);
        if overdue {
            out.push(format!("Schedule a check-in with {} this week", insight.name));
        } else {
            out.push(format!(
                "Review workload and satisfaction with {} and their manager",
                insight.name
            ));
        }
    }
    for dept in departments.iter().filter(|d| d.average_risk >= 50.0) {
        out.push(format!(
            "{} averages {} risk across {} people; plan a team-level retention review",
            dept.department, dept.average_risk, dept.headcount
        ));
    }
    if out.is_empty() {
        out.push("No employees at high risk; keep the regular check-in cadence".to_string());
    }
    out
}
