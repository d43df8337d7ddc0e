use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::documents::contract::{compose, generate_contract, GenerateContractRequest};
use crate::errors::AppError;
use crate::models::contract::Contract;
use crate::state::AppState;

/// POST /api/v1/contracts/generate
pub async fn handle_generate_contract(
    State(state): State<AppState>,
    Json(req): Json<GenerateContractRequest>,
) -> Result<(StatusCode, Json<Contract>), AppError> {
    let contract = generate_contract(&state.repos, req).await?;
    Ok((StatusCode::CREATED, Json(contract)))
}

/// GET /api/v1/contracts/:id/document
pub async fn handle_contract_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let contract = state
        .repos
        .contracts
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("contract '{id}' not found")))?;
    let document = compose(&state.repos, contract).await?;
    let rendered = state.renderer.render(&document).await?;

    Ok((
        [
            (header::CONTENT_TYPE, rendered.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", rendered.file_name),
            ),
        ],
        rendered.bytes,
    )
        .into_response())
}
