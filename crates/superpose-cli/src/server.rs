use crate::fetch::{FetchError, StructureProvider};
use crate::service::{AlignmentService, ServiceError};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

/// The alignment request wire format.
#[derive(Debug, Deserialize)]
pub struct AlignRequest {
    pub structure_id_1: String,
    pub structure_id_2: String,
}

/// Success response: the RMSD in the same length units as the input
/// coordinates (Angstroms for PDB data), plus the optional advisory
/// cross-check summary.
#[derive(Debug, Serialize)]
pub struct AlignResponse {
    pub rmsd: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisory: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Builds the service router.
///
/// `/align` is the canonical route; `/calculate_rmsd` is kept as an alias for
/// clients of the original service.
pub fn router<P: StructureProvider + 'static>(service: Arc<AlignmentService<P>>) -> Router {
    Router::new()
        .route("/align", post(align_handler::<P>))
        .route("/calculate_rmsd", post(align_handler::<P>))
        .with_state(service)
}

async fn align_handler<P: StructureProvider + 'static>(
    State(service): State<Arc<AlignmentService<P>>>,
    Json(request): Json<AlignRequest>,
) -> Response {
    match service
        .align(&request.structure_id_1, &request.structure_id_2)
        .await
    {
        Ok(outcome) => {
            info!(
                id_1 = %request.structure_id_1,
                id_2 = %request.structure_id_2,
                rmsd = outcome.report.superposition.rmsd,
                matched = outcome.report.matched_residues,
                "Alignment request served."
            );
            Json(AlignResponse {
                rmsd: outcome.report.superposition.rmsd,
                advisory: outcome.advisory,
            })
            .into_response()
        }
        Err(error) => {
            let status = status_for(&error);
            warn!(
                id_1 = %request.structure_id_1,
                id_2 = %request.structure_id_2,
                %status,
                %error,
                "Alignment request failed."
            );
            (
                status,
                Json(ErrorResponse {
                    error: error.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// Maps the failure taxonomy to HTTP statuses so callers can tell data
/// problems (bad identifiers, mismatched numbering) from infrastructure
/// problems (timeouts, unreachable archive).
fn status_for(error: &ServiceError) -> StatusCode {
    match error {
        ServiceError::Fetch(fetch) => match fetch.as_ref() {
            FetchError::InvalidId { .. } => StatusCode::BAD_REQUEST,
            FetchError::NotFound { .. } => StatusCode::NOT_FOUND,
            FetchError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            FetchError::Http { .. } | FetchError::Parse { .. } => StatusCode::BAD_GATEWAY,
        },
        ServiceError::Engine(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

/// Runs the HTTP service until ctrl-c.
pub async fn serve<P: StructureProvider + 'static>(
    addr: SocketAddr,
    service: Arc<AlignmentService<P>>,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Alignment service listening.");
    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(%error, "Failed to install ctrl-c handler.");
        return;
    }
    info!("Shutdown signal received.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use superpose::core::models::structure::ChainSelection;
    use superpose::engine::error::EngineError;

    fn fetch_error(error: FetchError) -> ServiceError {
        ServiceError::Fetch(Arc::new(error))
    }

    #[test]
    fn data_problems_map_to_client_errors() {
        let not_found = fetch_error(FetchError::NotFound { id: "1abc".into() });
        assert_eq!(status_for(&not_found), StatusCode::NOT_FOUND);

        let invalid = fetch_error(FetchError::InvalidId { id: "../x".into() });
        assert_eq!(status_for(&invalid), StatusCode::BAD_REQUEST);

        let engine = ServiceError::Engine(EngineError::NoChainFound {
            structure_id: "1abc".into(),
            selection: ChainSelection::FirstSeen,
        });
        assert_eq!(status_for(&engine), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn infrastructure_problems_map_to_gateway_errors() {
        let timeout = fetch_error(FetchError::Timeout {
            id: "1abc".into(),
            seconds: 30,
        });
        assert_eq!(status_for(&timeout), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn request_format_matches_the_published_interface() {
        let request: AlignRequest =
            serde_json::from_str(r#"{"structure_id_1": "1abc", "structure_id_2": "2xyz"}"#)
                .unwrap();
        assert_eq!(request.structure_id_1, "1abc");
        assert_eq!(request.structure_id_2, "2xyz");
    }

    #[test]
    fn success_response_serializes_rmsd_only_when_no_advisory() {
        let response = AlignResponse {
            rmsd: 1.25,
            advisory: None,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"rmsd":1.25}"#);

        let with_advisory = AlignResponse {
            rmsd: 0.0,
            advisory: Some("cross-check (exit status: 0): ok".into()),
        };
        let json = serde_json::to_string(&with_advisory).unwrap();
        assert!(json.contains("advisory"));
    }
}
