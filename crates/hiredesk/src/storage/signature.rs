use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha1::{Digest, Sha1};

use crate::config::UploadSignerConfig;

/// Everything a browser needs to upload straight to the media CDN. The
/// signing secret itself never leaves the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadSignature {
    pub signature: String,
    pub timestamp: i64,
    pub cloud_name: String,
    pub api_key: String,
}

/// Sign one direct-upload request. The CDN recomputes the same digest over
/// the alphabetically ordered parameters, so the serialization here is
/// `folder=<folder>&timestamp=<timestamp>` with the secret appended.
pub fn sign_upload_request(
    config: &UploadSignerConfig,
    folder: &str,
    timestamp: i64,
) -> UploadSignature {
    let mut hasher = Sha1::new();
    hasher.update(format!("folder={folder}&timestamp={timestamp}").as_bytes());
    hasher.update(config.api_secret.as_bytes());
    let signature = hasher
        .finalize()
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect();

    UploadSignature {
        signature,
        timestamp,
        cloud_name: config.cloud_name.clone(),
        api_key: config.api_key.clone(),
    }
}

/// Router builder exposing the upload signature endpoint. Without signer
/// configuration the endpoint answers but refuses to sign.
pub fn upload_signature_router(config: Option<UploadSignerConfig>) -> Router {
    Router::new()
        .route("/api/v1/uploads/signature", post(signature_handler))
        .with_state(config)
}

#[derive(Debug, Deserialize)]
pub struct SignatureRequest {
    pub folder: String,
}

pub(crate) async fn signature_handler(
    State(config): State<Option<UploadSignerConfig>>,
    axum::Json(request): axum::Json<SignatureRequest>,
) -> Response {
    let Some(config) = config else {
        let payload = json!({
            "error": "upload signing is not configured",
        });
        return (StatusCode::SERVICE_UNAVAILABLE, axum::Json(payload)).into_response();
    };

    let signature = sign_upload_request(&config, &request.folder, Utc::now().timestamp());
    (StatusCode::OK, axum::Json(signature)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> UploadSignerConfig {
        UploadSignerConfig {
            cloud_name: "demo-cloud".to_string(),
            api_key: "123456789".to_string(),
            api_secret: "local-test-secret".to_string(),
        }
    }

    #[test]
    fn signature_matches_the_reference_digest() {
        let signed = sign_upload_request(&config(), "ids", 1_700_000_000);
        assert_eq!(signed.signature, "847b53c05eefd39170dbce4ae3f6c43fc2b81aa6");
        assert_eq!(signed.timestamp, 1_700_000_000);
        assert_eq!(signed.cloud_name, "demo-cloud");
        assert_eq!(signed.api_key, "123456789");
    }

    #[test]
    fn folder_changes_the_signature() {
        let ids = sign_upload_request(&config(), "ids", 1_700_000_000);
        let cvs = sign_upload_request(&config(), "cvs", 1_700_000_000);
        assert_eq!(cvs.signature, "8598172f894d7fbd434207fff02633fd391a243c");
        assert_ne!(ids.signature, cvs.signature);
    }

    #[test]
    fn secret_changes_the_signature() {
        let mut other = config();
        other.api_secret = "a-different-secret".to_string();
        let signed = sign_upload_request(&config(), "ids", 1_700_000_000);
        let resigned = sign_upload_request(&other, "ids", 1_700_000_000);
        assert_ne!(signed.signature, resigned.signature);
    }

    #[test]
    fn response_never_carries_the_secret() {
        let signed = sign_upload_request(&config(), "ids", 1_700_000_000);
        let encoded = serde_json::to_string(&signed).unwrap();
        assert!(!encoded.contains("local-test-secret"));
    }
}
