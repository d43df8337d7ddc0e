use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::errors::AppError;
use crate::models::candidate::{Candidate, CandidateStats};
use crate::models::chat::{ChatRoom, ChatRoomStats};
use crate::models::client::{Client, ClientStats};
use crate::models::contract::{Contract, ContractStats};
use crate::models::employee::{Employee, EmployeeStats};
use crate::models::invoice::{Invoice, InvoiceStats};
use crate::models::vendor::{Vendor, VendorStats};
use crate::models::Entity;
use crate::state::AppState;

/// Store-wide stats for every back-office page in one response.
#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub generated_at: DateTime<Utc>,
    pub candidates: CandidateStats,
    pub clients: ClientStats,
    pub vendors: VendorStats,
    pub employees: EmployeeStats,
    pub chat_rooms: ChatRoomStats,
    pub contracts: ContractStats,
    /// Contracts whose term covers today.
    pub current_contracts: usize,
    pub invoices: InvoiceStats,
}

/// GET /api/v1/dashboard
pub async fn handle_dashboard(
    State(state): State<AppState>,
) -> Result<Json<DashboardSummary>, AppError> {
    let repos = &state.repos;
    let contracts = repos.contracts.list().await?;

    Ok(Json(DashboardSummary {
        generated_at: Utc::now(),
        candidates: Candidate::summarize(&repos.candidates.list().await?),
        clients: Client::summarize(&repos.clients.list().await?),
        vendors: Vendor::summarize(&repos.vendors.list().await?),
        employees: Employee::summarize(&repos.employees.list().await?),
        chat_rooms: ChatRoom::summarize(&repos.chat_rooms.list().await?),
        current_contracts: contracts.iter().filter(|c| c.is_current_today()).count(),
        contracts: Contract::summarize(&contracts),
        invoices: Invoice::summarize(&repos.invoices.list().await?),
    }))
}
