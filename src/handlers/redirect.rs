use crate::AppState;
use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// GET /short/:key
///
/// Resolve the key against the registry and answer with a 302 to the stored
/// URL. Unknown keys, including ones that do not decode to UTF-8, are a
/// plain 404.
pub async fn redirect(
    State(state): State<Arc<AppState>>,
    key: Result<Path<String>, PathRejection>,
) -> Response {
    let Ok(Path(key)) = key else {
        return super::not_found().await;
    };
    let Some(original_url) = state.registry.resolve(&key) else {
        return super::not_found().await;
    };

    // Stored URLs are unvalidated; control characters cannot go in a header.
    match HeaderValue::from_str(&original_url) {
        Ok(location) => (StatusCode::FOUND, [(header::LOCATION, location)]).into_response(),
        Err(_) => {
            tracing::warn!(
                "Short key '{}' points at a URL that is not a valid Location header",
                key
            );
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
        }
    }
}
