//! Generic list/detail/mutation routes shared by every back-office entity.
//!
//! `record_routes::<T>()` is nested under `/api/v1/<collection>`; everything
//! an entity needs comes from its `Entity` impl.

use std::collections::{HashMap, HashSet};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::lfa::filter::FilterConfig;
use crate::lfa::selection::{CheckState, SelectionSet};
use crate::lfa::view::{derive_view, visible_ids, DerivedView, ViewQuery};
use crate::models::status::{check_transition, StatusMachine};
use crate::models::Entity;
use crate::state::AppState;

pub fn record_routes<T: Entity>() -> Router<AppState> {
    let root = if T::GENERIC_CREATE {
        get(handle_list::<T>).post(handle_create::<T>)
    } else {
        get(handle_list::<T>)
    };
    Router::new()
        .route("/", root)
        .route("/stats", get(handle_stats::<T>))
        .route("/bulk-status", post(handle_bulk_status::<T>))
        .route("/selection", post(handle_selection::<T>))
        .route(
            "/:id",
            get(handle_get::<T>)
                .put(handle_update::<T>)
                .delete(handle_delete::<T>),
        )
        .route("/:id/status", patch(handle_change_status::<T>))
}

// ────────────────────────────────────────────────────────────────────────────
// Request / response bodies
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Deserialize)]
pub struct StatusChange<S> {
    pub status: S,
}

#[derive(Debug, Deserialize)]
pub struct BulkStatusRequest<S> {
    pub ids: Vec<String>,
    pub status: S,
}

#[derive(Debug, Serialize)]
pub struct BulkStatusResponse<T> {
    pub updated: usize,
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionOp {
    Toggle,
    Select,
    SelectAll,
    ToggleAll,
    Clear,
}

#[derive(Debug, Deserialize)]
pub struct SelectionRequest {
    pub op: SelectionOp,
    /// Target row for `toggle` and `select`.
    #[serde(default)]
    pub id: Option<String>,
    /// Selection held by the client before this operation.
    #[serde(default)]
    pub selected: Vec<String>,
    /// Same filter params as the list route.
    #[serde(default)]
    pub filters: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct SelectionResponse {
    pub selected: Vec<String>,
    pub check_state: CheckState,
    pub visible_count: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

async fn find<T: Entity>(state: &AppState, id: &str) -> Result<T, AppError> {
    T::repository(&state.repos)
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} '{id}' not found", T::KIND)))
}

fn ensure_valid<T: Entity>(record: &T) -> Result<(), AppError> {
    let errors = record.validate();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors.join("; ")))
    }
}

/// GET /api/v1/:collection
pub async fn handle_list<T: Entity>(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<DerivedView<T, T::Stats>>, AppError> {
    let query = ViewQuery::from_params::<T>(&params, state.config.page_limits())?;
    let store = T::repository(&state.repos).list().await?;
    Ok(Json(derive_view(&store, &query, T::summarize)))
}

/// GET /api/v1/:collection/stats
pub async fn handle_stats<T: Entity>(
    State(state): State<AppState>,
) -> Result<Json<T::Stats>, AppError> {
    let store = T::repository(&state.repos).list().await?;
    Ok(Json(T::summarize(&store)))
}

/// GET /api/v1/:collection/:id
pub async fn handle_get<T: Entity>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<T>, AppError> {
    Ok(Json(find::<T>(&state, &id).await?))
}

/// POST /api/v1/:collection
pub async fn handle_create<T: Entity>(
    State(state): State<AppState>,
    Json(record): Json<T>,
) -> Result<(StatusCode, Json<T>), AppError> {
    let record = if record.id().trim().is_empty() {
        record.with_id(Uuid::new_v4().to_string())
    } else {
        record
    };
    let initial = <T::Status as StatusMachine>::INITIAL;
    if record.status() != initial {
        return Err(AppError::UnprocessableEntity(format!(
            "new {} records start as '{}', not '{}'",
            T::KIND,
            initial.as_str(),
            record.status().as_str()
        )));
    }
    ensure_valid(&record)?;

    let created = T::repository(&state.repos).insert(record).await?;
    info!("Created {} {}", T::KIND, created.id());
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/v1/:collection/:id
///
/// Replaces every editable field. Status is not editable here; use the
/// status route so the transition table applies. The write only lands if the
/// record is still the one that was checked, otherwise 409.
pub async fn handle_update<T: Entity>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(record): Json<T>,
) -> Result<Json<T>, AppError> {
    let existing = find::<T>(&state, &id).await?;
    if !record.id().is_empty() && record.id() != id {
        return Err(AppError::Validation(format!(
            "body id '{}' does not match path id '{id}'",
            record.id()
        )));
    }
    let record = record.with_id(id);
    if record.status() != existing.status() {
        return Err(AppError::UnprocessableEntity(format!(
            "status cannot be changed with PUT; PATCH /api/v1/{}/{}/status instead",
            T::COLLECTION,
            record.id()
        )));
    }
    ensure_valid(&record)?;

    let updated = T::repository(&state.repos).swap(&existing, record).await?;
    info!("Updated {} {}", T::KIND, updated.id());
    Ok(Json(updated))
}

/// DELETE /api/v1/:collection/:id?confirm=true
pub async fn handle_delete<T: Entity>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<DeleteParams>,
) -> Result<StatusCode, AppError> {
    find::<T>(&state, &id).await?;
    if !params.confirm {
        return Err(AppError::ConfirmationRequired(format!(
            "deleting {} '{id}' cannot be undone; repeat with ?confirm=true",
            T::KIND
        )));
    }
    T::repository(&state.repos).delete(&id).await?;
    info!("Deleted {} {id}", T::KIND);
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/v1/:collection/:id/status
pub async fn handle_change_status<T: Entity>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(change): Json<StatusChange<T::Status>>,
) -> Result<Json<T>, AppError> {
    let existing = find::<T>(&state, &id).await?;
    let from = existing.status();
    check_transition(from, change.status)?;

    let next = existing.with_status(change.status);
    let updated = T::repository(&state.repos).swap(&existing, next).await?;
    info!(
        "{} {id}: {} -> {}",
        T::KIND,
        from.as_str(),
        change.status.as_str()
    );
    Ok(Json(updated))
}

/// POST /api/v1/:collection/bulk-status
///
/// Every listed record must accept the transition or nothing is written.
pub async fn handle_bulk_status<T: Entity>(
    State(state): State<AppState>,
    Json(req): Json<BulkStatusRequest<T::Status>>,
) -> Result<Json<BulkStatusResponse<T>>, AppError> {
    if req.ids.is_empty() {
        return Err(AppError::Validation("ids must not be empty".to_string()));
    }
    let repo = T::repository(&state.repos);
    let store = repo.list().await?;

    let mut seen = HashSet::new();
    let mut changed = Vec::new();
    for id in &req.ids {
        if !seen.insert(id.as_str()) {
            continue;
        }
        let record = store
            .iter()
            .find(|r| r.id() == id)
            .ok_or_else(|| AppError::NotFound(format!("{} '{id}' not found", T::KIND)))?;
        check_transition(record.status(), req.status)
            .map_err(|e| AppError::UnprocessableEntity(format!("{id}: {e}")))?;
        changed.push((record.clone(), record.with_status(req.status)));
    }

    let items = repo.swap_many(changed).await?;
    info!(
        "Moved {} {} records to '{}'",
        items.len(),
        T::KIND,
        req.status.as_str()
    );
    Ok(Json(BulkStatusResponse {
        updated: items.len(),
        items,
    }))
}

/// POST /api/v1/:collection/selection
pub async fn handle_selection<T: Entity>(
    State(state): State<AppState>,
    Json(req): Json<SelectionRequest>,
) -> Result<Json<SelectionResponse>, AppError> {
    let filter = FilterConfig::from_params::<T>(&req.filters)?;
    let store = T::repository(&state.repos).list().await?;
    let visible = visible_ids(&store, &filter);

    let mut selection = SelectionSet::from_ids(req.selected);
    selection.retain_visible(&visible);

    let target = || {
        req.id
            .as_deref()
            .ok_or_else(|| AppError::Validation("'id' is required for this operation".to_string()))
    };
    match req.op {
        SelectionOp::Toggle => {
            selection.toggle(target()?, &visible)?;
        }
        SelectionOp::Select => selection.select(target()?, &visible)?,
        SelectionOp::SelectAll => selection.select_all_visible(&visible),
        SelectionOp::ToggleAll => selection.toggle_all(&visible),
        SelectionOp::Clear => selection.clear(),
    }

    Ok(Json(SelectionResponse {
        check_state: selection.check_state(&visible),
        selected: selection.ids(),
        visible_count: visible.len(),
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::models::candidate::{Candidate, CandidateStatus};
    use crate::repo::{seed, InMemoryRepository, RepoResult, Repository};

    /// Moves a candidate to `status` right after every read, as a request
    /// landing between another handler's read and its write would.
    struct RacingCandidates {
        inner: InMemoryRepository<Candidate>,
        id: &'static str,
        status: CandidateStatus,
    }

    impl RacingCandidates {
        async fn interfere(&self) -> RepoResult<()> {
            if let Some(current) = self.inner.get(self.id).await? {
                self.inner.update(current.with_status(self.status)).await?;
            }
            Ok(())
        }
    }

    #[async_trait]
    impl Repository<Candidate> for RacingCandidates {
        async fn list(&self) -> RepoResult<Arc<Vec<Candidate>>> {
            let snapshot = self.inner.list().await?;
            self.interfere().await?;
            Ok(snapshot)
        }

        async fn get(&self, id: &str) -> RepoResult<Option<Candidate>> {
            let read = self.inner.get(id).await?;
            self.interfere().await?;
            Ok(read)
        }

        async fn insert(&self, record: Candidate) -> RepoResult<Candidate> {
            self.inner.insert(record).await
        }

        async fn update(&self, record: Candidate) -> RepoResult<Candidate> {
            self.inner.update(record).await
        }

        async fn swap(
            &self,
            expected: &Candidate,
            replacement: Candidate,
        ) -> RepoResult<Candidate> {
            self.inner.swap(expected, replacement).await
        }

        async fn swap_many(
            &self,
            changes: Vec<(Candidate, Candidate)>,
        ) -> RepoResult<Vec<Candidate>> {
            self.inner.swap_many(changes).await
        }

        async fn delete(&self, id: &str) -> RepoResult<Candidate> {
            self.inner.delete(id).await
        }
    }

    /// Seeded state whose candidate store moves `cand-001` (interview) to
    /// `status` behind every read.
    fn racing_state(status: CandidateStatus) -> AppState {
        let mut state = AppState::for_tests();
        let inner =
            InMemoryRepository::with_records("candidate", seed::fixtures().candidates).unwrap();
        state.repos.candidates = Arc::new(RacingCandidates {
            inner,
            id: "cand-001",
            status,
        });
        state
    }

    async fn stored_status(state: &AppState) -> CandidateStatus {
        find::<Candidate>(state, "cand-001").await.unwrap().status
    }

    #[tokio::test]
    async fn test_put_does_not_revert_concurrent_status_change() {
        let state = racing_state(CandidateStatus::Offer);
        let stale = seed::fixtures()
            .candidates
            .into_iter()
            .find(|c| c.id == "cand-001")
            .unwrap();
        assert_eq!(stale.status, CandidateStatus::Interview);

        let err = handle_update::<Candidate>(
            State(state.clone()),
            Path("cand-001".to_string()),
            Json(Candidate {
                location: Some("Jerusalem".to_string()),
                ..stale
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(stored_status(&state).await, CandidateStatus::Offer);
    }

    #[tokio::test]
    async fn test_status_change_from_stale_read_conflicts() {
        let state = racing_state(CandidateStatus::Rejected);
        let err = handle_change_status::<Candidate>(
            State(state.clone()),
            Path("cand-001".to_string()),
            Json(StatusChange {
                status: CandidateStatus::Offer,
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(stored_status(&state).await, CandidateStatus::Rejected);
    }

    #[tokio::test]
    async fn test_bulk_status_from_stale_snapshot_writes_nothing() {
        let state = racing_state(CandidateStatus::Offer);
        let err = handle_bulk_status::<Candidate>(
            State(state.clone()),
            Json(BulkStatusRequest {
                ids: vec!["cand-001".to_string(), "cand-002".to_string()],
                status: CandidateStatus::Rejected,
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(stored_status(&state).await, CandidateStatus::Offer);
        let avi = find::<Candidate>(&state, "cand-002").await.unwrap();
        assert_eq!(avi.status, CandidateStatus::Applied);
    }
}
