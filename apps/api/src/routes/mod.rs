pub mod dashboard;
pub mod health;
pub mod records;

use axum::{
    routing::{get, post},
    Router,
};

use crate::documents::handlers as documents;
use crate::messaging::handlers as messaging;
use crate::models::candidate::Candidate;
use crate::models::chat::ChatRoom;
use crate::models::client::Client;
use crate::models::contract::Contract;
use crate::models::employee::Employee;
use crate::models::invoice::Invoice;
use crate::models::vendor::Vendor;
use crate::models::Entity;
use crate::retention::handlers as retention;
use crate::state::AppState;
use records::record_routes;

fn collection<T: Entity>() -> String {
    format!("/api/v1/{}", T::COLLECTION)
}

pub fn build_router(state: AppState) -> Router {
    let candidates = record_routes::<Candidate>()
        .route("/:id/contact", post(messaging::handle_contact_candidate));

    let chat_rooms = record_routes::<ChatRoom>()
        .route(
            "/:id/messages",
            get(messaging::handle_list_messages).post(messaging::handle_send_message),
        )
        .route(
            "/:id/messages/:message_id/retry",
            post(messaging::handle_retry_message),
        );

    let contracts = record_routes::<Contract>()
        .route("/generate", post(documents::handle_generate_contract))
        .route("/:id/document", get(documents::handle_contract_document));

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/dashboard", get(dashboard::handle_dashboard))
        .route(
            "/api/v1/retention/insights",
            get(retention::handle_retention_insights),
        )
        .nest(&collection::<Candidate>(), candidates)
        .nest(&collection::<Client>(), record_routes::<Client>())
        .nest(&collection::<Vendor>(), record_routes::<Vendor>())
        .nest(&collection::<Employee>(), record_routes::<Employee>())
        .nest(&collection::<ChatRoom>(), chat_rooms)
        .nest(&collection::<Contract>(), contracts)
        .nest(&collection::<Invoice>(), record_routes::<Invoice>())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(v) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        let resp = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    fn app() -> Router {
        build_router(AppState::for_tests())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(&app(), Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "hireboard-api");
    }

    #[tokio::test]
    async fn test_list_filters_but_stats_cover_full_store() {
        let (status, body) = send(
            &app(),
            Method::GET,
            "/api/v1/candidates?q=DANA&status=interview",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_matching"], 1);
        assert_eq!(body["items"][0]["id"], "cand-001");
        assert_eq!(body["stats"]["total"], 6);
    }

    #[tokio::test]
    async fn test_list_all_sentinel_is_identity() {
        let (_, body) = send(
            &app(),
            Method::GET,
            "/api/v1/candidates?status=all&q=",
            None,
        )
        .await;
        assert_eq!(body["total_matching"], 6);
    }

    #[tokio::test]
    async fn test_list_pagination_and_sort() {
        let (status, body) = send(
            &app(),
            Method::GET,
            "/api/v1/candidates?sort=rating&order=desc&page=2&page_size=2",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_pages"], 3);
        assert_eq!(body["items"].as_array().unwrap().len(), 2);
        // ratings desc: 4.8, 4.6, 4.5, 4.2, ...
        assert_eq!(body["items"][0]["id"], "cand-005");
        assert_eq!(body["items"][1]["id"], "cand-004");
    }

    #[tokio::test]
    async fn test_unknown_filter_param_rejected() {
        let (status, body) =
            send(&app(), Method::GET, "/api/v1/vendors?colour=red", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_get_missing_is_404() {
        let (status, _) = send(&app(), Method::GET, "/api/v1/clients/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_requires_initial_status() {
        let app = app();
        let candidate = json!({
            "name": "Maya Ron",
            "email": "maya.ron@example.com",
            "role": "Backend Engineer"
        });
        let (status, body) =
            send(&app, Method::POST, "/api/v1/candidates", Some(candidate.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "applied");
        let id = body["id"].as_str().unwrap().to_string();
        assert!(!id.is_empty());

        let (status, _) = send(&app, Method::GET, &format!("/api/v1/candidates/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);

        let mut hired = candidate;
        hired["status"] = json!("hired");
        let (status, _) = send(&app, Method::POST, "/api/v1/candidates", Some(hired)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_create_invalid_record_is_400() {
        let (status, body) = send(
            &app(),
            Method::POST,
            "/api/v1/candidates",
            Some(json!({ "name": "", "email": "nope", "role": "QA" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]["message"].as_str().unwrap().contains("email"));
    }

    #[tokio::test]
    async fn test_update_cannot_change_status() {
        let app = app();
        let (_, mut client) = send(&app, Method::GET, "/api/v1/clients/client-002", None).await;
        client["open_positions"] = json!(5);
        let (status, body) = send(
            &app,
            Method::PUT,
            "/api/v1/clients/client-002",
            Some(client.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["open_positions"], 5);

        client["status"] = json!("churned");
        let (status, _) =
            send(&app, Method::PUT, "/api/v1/clients/client-002", Some(client)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let app = app();
        let (status, body) =
            send(&app, Method::DELETE, "/api/v1/invoices/inv-004", None).await;
        assert_eq!(status, StatusCode::PRECONDITION_REQUIRED);
        assert_eq!(body["error"]["code"], "CONFIRMATION_REQUIRED");

        let (status, _) = send(&app, Method::GET, "/api/v1/invoices/inv-004", None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            &app,
            Method::DELETE,
            "/api/v1/invoices/inv-004?confirm=true",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, Method::GET, "/api/v1/invoices/inv-004", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_status_transition_checked() {
        let app = app();
        let (status, body) = send(
            &app,
            Method::PATCH,
            "/api/v1/candidates/cand-001/status",
            Some(json!({ "status": "offer" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "offer");

        let (status, body) = send(
            &app,
            Method::PATCH,
            "/api/v1/candidates/cand-002/status",
            Some(json!({ "status": "hired" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("cannot move from 'applied' to 'hired'"));
    }

    #[tokio::test]
    async fn test_bulk_status_is_all_or_nothing() {
        let app = app();
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/v1/candidates/bulk-status",
            Some(json!({ "ids": ["cand-001", "cand-006"], "status": "rejected" })),
        )
        .await;
        // cand-006 is already rejected
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let (_, body) = send(&app, Method::GET, "/api/v1/candidates/cand-001", None).await;
        assert_eq!(body["status"], "interview");

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/candidates/bulk-status",
            Some(json!({ "ids": ["cand-001", "cand-002", "cand-001"], "status": "rejected" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["updated"], 2);
    }

    #[tokio::test]
    async fn test_selection_select_all_then_clear() {
        let app = app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/candidates/selection",
            Some(json!({ "op": "select_all", "filters": { "location": "Tel Aviv" } })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["selected"], json!(["cand-001", "cand-003", "cand-006"]));
        assert_eq!(body["check_state"], "checked");
        assert_eq!(body["visible_count"], 3);

        let (_, body) = send(
            &app,
            Method::POST,
            "/api/v1/candidates/selection",
            Some(json!({ "op": "clear", "selected": ["cand-001", "cand-003"] })),
        )
        .await;
        assert_eq!(body["selected"], json!([]));
        assert_eq!(body["check_state"], "unchecked");
    }

    #[tokio::test]
    async fn test_selection_prunes_rows_outside_filter() {
        let (_, body) = send(
            &app(),
            Method::POST,
            "/api/v1/candidates/selection",
            Some(json!({
                "op": "toggle",
                "id": "cand-003",
                "selected": ["cand-002"],
                "filters": { "location": "Tel Aviv" }
            })),
        )
        .await;
        assert_eq!(body["selected"], json!(["cand-003"]));
        assert_eq!(body["check_state"], "indeterminate");
    }

    #[tokio::test]
    async fn test_stats_route() {
        let (status, body) = send(&app(), Method::GET, "/api/v1/vendors/stats", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 4);
        assert_eq!(body["active"], 2);
    }

    #[tokio::test]
    async fn test_dashboard() {
        let (status, body) = send(&app(), Method::GET, "/api/v1/dashboard", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["candidates"]["total"], 6);
        assert_eq!(body["invoices"]["total"], 4);
        assert_eq!(body["chat_rooms"]["total"], 3);
    }

    #[tokio::test]
    async fn test_chat_send_and_list_messages() {
        let app = app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/api/v1/chat-rooms/room-003/messages",
            Some(json!({ "sender": "Sara Klein", "body": "Pipeline review is done" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "sent");

        let (status, body) =
            send(&app, Method::GET, "/api/v1/chat-rooms/room-003/messages", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);

        let (_, room) = send(&app, Method::GET, "/api/v1/chat-rooms/room-003", None).await;
        assert_eq!(room["unread"], 0);
    }

    #[tokio::test]
    async fn test_contact_candidate_over_whatsapp() {
        let (status, body) = send(
            &app(),
            Method::POST,
            "/api/v1/candidates/cand-001/contact",
            Some(json!({ "channel": "whatsapp", "body": "Interview confirmed for Thursday" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["recipient"], "+972501112233");
    }

    #[tokio::test]
    async fn test_generate_contract_and_download_document() {
        let app = app();
        let (status, contract) = send(
            &app,
            Method::POST,
            "/api/v1/contracts/generate",
            Some(json!({
                "candidate_id": "cand-003",
                "client_id": "client-001",
                "contract_type": "permanent",
                "start_date": "2025-01-01",
                "compensation": 110000.0
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(contract["status"], "draft");
        let id = contract["id"].as_str().unwrap();

        let resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/api/v1/contracts/{id}/document"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()[header::CONTENT_TYPE],
            "text/markdown; charset=utf-8"
        );
        assert!(resp.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .contains("noa-shapiro.md"));
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(String::from_utf8_lossy(&bytes).contains("Nimbus Payments"));
    }

    #[tokio::test]
    async fn test_contracts_cannot_be_posted_directly() {
        let app = app();
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/v1/contracts",
            Some(json!({
                "candidate_id": "cand-404",
                "client_id": "client-404",
                "title": "Ghost role",
                "contract_type": "permanent",
                "start_date": "2025-01-01",
                "compensation": 50000.0,
                "currency": "USD",
                "status": "draft",
                "created_at": "2025-01-01T00:00:00Z"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

        let (status, body) = send(&app, Method::GET, "/api/v1/contracts", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_matching"], 2);
    }

    #[tokio::test]
    async fn test_concurrent_status_patches_one_wins() {
        let app = app();
        let app = &app;
        let patch = move || {
            send(
                app,
                Method::PATCH,
                "/api/v1/candidates/cand-001/status",
                Some(json!({ "status": "offer" })),
            )
        };
        let ((a, _), (b, _)) = tokio::join!(patch(), patch());
        let mut outcomes = [a, b];
        outcomes.sort();
        // the loser either read the new status (422) or lost the write (409)
        assert_eq!(outcomes[0], StatusCode::OK);
        assert!(matches!(
            outcomes[1],
            StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY
        ));
    }

    #[tokio::test]
    async fn test_retention_insights_by_department() {
        let (status, body) = send(
            &app(),
            Method::GET,
            "/api/v1/retention/insights?department=engineering",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_scored"], 2);
        assert_eq!(body["insights"][0]["employee_id"], "emp-002");
    }
}
