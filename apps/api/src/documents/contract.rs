//! Contract drafting and the markdown contract layout.

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::documents::RenderError;
use crate::errors::AppError;
use crate::models::candidate::{Candidate, CandidateStatus};
use crate::models::client::{Client, ClientStatus};
use crate::models::contract::{Contract, ContractStatus, ContractType};
use crate::models::status::StatusMachine;
use crate::models::Entity;
use crate::repo::Repositories;

/// A contract with both parties resolved, ready to render.
#[derive(Debug, Clone)]
pub struct ContractDocument {
    pub contract: Contract,
    pub candidate: Candidate,
    pub client: Client,
}

impl ContractDocument {
    pub fn file_name(&self, extension: &str) -> String {
        let slug: String = self
            .candidate
            .name
            .to_lowercase()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
            .collect();
        format!("contract-{}-{slug}.{extension}", self.contract.id)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContractRequest {
    pub candidate_id: String,
    pub client_id: String,
    /// Defaults to the candidate's role.
    #[serde(default)]
    pub title: Option<String>,
    pub contract_type: ContractType,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    pub compensation: f64,
    #[serde(default)]
    pub currency: Option<String>,
}

/// Resolves the candidate and client a stored contract refers to.
pub async fn compose(
    repos: &Repositories,
    contract: Contract,
) -> Result<ContractDocument, AppError> {
    let candidate = repos
        .candidates
        .get(&contract.candidate_id)
        .await?
        .ok_or_else(|| RenderError::MissingParty {
            role: "candidate",
            id: contract.candidate_id.clone(),
        })?;
    let client = repos
        .clients
        .get(&contract.client_id)
        .await?
        .ok_or_else(|| RenderError::MissingParty {
            role: "client",
            id: contract.client_id.clone(),
        })?;
    Ok(ContractDocument {
        contract,
        candidate,
        client,
    })
}

/// Drafts a contract for a candidate who has reached the offer stage.
pub async fn generate_contract(
    repos: &Repositories,
    req: GenerateContractRequest,
) -> Result<Contract, AppError> {
    let candidate = repos
        .candidates
        .get(&req.candidate_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("candidate '{}' not found", req.candidate_id)))?;
    if !matches!(
        candidate.status,
        CandidateStatus::Offer | CandidateStatus::Hired
    ) {
        return Err(AppError::UnprocessableEntity(format!(
            "candidate '{}' is '{}'; contracts need an offer or hire",
            candidate.id,
            candidate.status.as_str()
        )));
    }

    let client = repos
        .clients
        .get(&req.client_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("client '{}' not found", req.client_id)))?;
    if client.status == ClientStatus::Churned {
        return Err(AppError::UnprocessableEntity(format!(
            "client '{}' has churned",
            client.company
        )));
    }

    let contract = Contract {
        id: Uuid::new_v4().to_string(),
        candidate_id: candidate.id.clone(),
        client_id: client.id.clone(),
        title: req.title.unwrap_or_else(|| candidate.role.clone()),
        contract_type: req.contract_type,
        start_date: req.start_date,
        end_date: req.end_date,
        compensation: req.compensation,
        currency: req.currency.unwrap_or_else(|| "USD".to_string()),
        status: ContractStatus::Draft,
        created_at: Utc::now(),
    };
    let errors = contract.validate();
    if !errors.is_empty() {
        return Err(AppError::Validation(errors.join("; ")));
    }

    let contract = repos.contracts.insert(contract).await?;
    info!(
        "Drafted contract {} for {} at {}",
        contract.id, candidate.name, client.company
    );
    Ok(contract)
}

/// `USD 1,234.50`. Amounts beyond what whole cents can carry exactly are
/// printed unformatted.
fn money(amount: f64, currency: &str) -> String {
    const MAX_EXACT_CENTS: f64 = 9_007_199_254_740_992.0; // 2^53
    let cents = (amount.abs() * 100.0).round();
    if !cents.is_finite() || cents > MAX_EXACT_CENTS {
        return format!("{currency} {amount}");
    }
    let cents = cents as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::new();
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{currency} {sign}{grouped}.{:02}", cents % 100)
}

pub fn render_contract_md(doc: &ContractDocument) -> String {
    let contract = &doc.contract;
    let mut md = format!("# {} — {}\n\n", contract.contract_type.label(), contract.title);
    md.push_str(&format!("- **Contract:** {}\n", contract.id));
    md.push_str(&format!("- **Status:** {}\n", contract.status.as_str()));
    md.push_str(&format!(
        "- **Prepared:** {}\n\n",
        contract.created_at.format("%Y-%m-%d")
    ));

    md.push_str("## Parties\n\n");
    md.push_str(&format!(
        "- **Employer:** {} ({})\n",
        doc.client.company, doc.client.industry
    ));
    md.push_str(&format!(
        "- **Employer contact:** {} <{}>\n",
        doc.client.contact_name, doc.client.email
    ));
    md.push_str(&format!(
        "- **Employee:** {} <{}>\n",
        doc.candidate.name, doc.candidate.email
    ));
    if let Some(location) = &doc.candidate.location {
        md.push_str(&format!("- **Location:** {location}\n"));
    }
    md.push('\n');

    md.push_str("## Term\n\n");
    md.push_str(&format!("- **Start date:** {}\n", contract.start_date));
    match contract.end_date {
        Some(end) => md.push_str(&format!("- **End date:** {end}\n")),
        None => md.push_str("- **End date:** open-ended\n"),
    }
    md.push('\n');

    md.push_str("## Compensation\n\n");
    let basis = match contract.contract_type {
        ContractType::Permanent => "per year",
        ContractType::FixedTerm | ContractType::Temporary => "for the full term",
    };
    md.push_str(&format!(
        "{} {basis}, payable under the employer's standard payroll schedule.\n\n",
        money(contract.compensation, &contract.currency)
    ));

    md.push_str("## Signatures\n\n");
    md.push_str(&format!("- {}: ______________________\n", doc.client.company));
    md.push_str(&format!("- {}: ______________________\n", doc.candidate.name));
    md
}
