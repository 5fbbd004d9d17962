use crate::{error::ShortenError, AppState};
use askama::Template;
use axum::{
    extract::{Form, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;

// ── Template structs ───────────────────────────────────────────────────────

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate;

#[derive(Template)]
#[template(path = "shortened.html")]
struct ShortenedTemplate {
    original_url: String,
    short_url: String,
}

// ── Form types ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ShortenForm {
    #[serde(default)]
    url: String,
}

// ── Handlers ───────────────────────────────────────────────────────────────

/// GET /
pub async fn index() -> Response {
    IndexTemplate.into_response()
}

/// POST /shorten
///
/// Only the form body is read, never the query string. A missing or
/// unparseable form is treated the same as an empty `url`.
pub async fn shorten(
    State(state): State<Arc<AppState>>,
    form: Option<Form<ShortenForm>>,
) -> Response {
    let original_url = form.map(|Form(f)| f.url).unwrap_or_default();

    match state.registry.shorten(&original_url) {
        Ok(key) => ShortenedTemplate {
            short_url: state.config.short_url(&key),
            original_url,
        }
        .into_response(),
        Err(ShortenError::InvalidInput) => {
            (StatusCode::BAD_REQUEST, "Url is required").into_response()
        }
        Err(e @ ShortenError::KeySpaceExhausted(_)) => {
            tracing::error!("Failed to shorten '{}': {}", original_url, e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "No short key available, try again",
            )
                .into_response()
        }
    }
}

/// Any method other than POST on /shorten.
pub async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "POST")],
        "Method not allowed",
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use crate::handlers::test_support::{body_text, form_post, get, short_key_in, test_state};
    use crate::{app, keygen::is_well_formed};
    use axum::http::{header, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn index_renders_the_form() {
        let res = app(test_state()).oneshot(get("/")).await.unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html"));
        let body = body_text(res).await;
        assert!(body.contains(r#"action="/shorten""#));
        assert!(body.contains(r#"name="url""#));
    }

    #[tokio::test]
    async fn shorten_returns_a_link_to_the_new_key() {
        let state = test_state();
        let res = app(state.clone())
            .oneshot(form_post("/shorten", "url=http%3A%2F%2Fexample.com"))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        let body = body_text(res).await;
        assert!(body.contains("example.com"));
        assert!(body.contains("localhost:8080"));

        let key = short_key_in(&body);
        assert!(is_well_formed(&key), "bad key {key:?}");
        assert_eq!(state.registry.resolve(&key).unwrap(), "http://example.com");
    }

    #[tokio::test]
    async fn submitted_url_is_escaped_in_the_page() {
        let res = app(test_state())
            .oneshot(form_post("/shorten", "url=%3Cscript%3Ealert(1)%3C%2Fscript%3E"))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        let body = body_text(res).await;
        assert!(!body.contains("<script>"));
        assert!(body.contains("&lt;script&gt;"));
    }

    #[tokio::test]
    async fn empty_url_is_bad_request() {
        let state = test_state();
        let res = app(state.clone())
            .oneshot(form_post("/shorten", "url="))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(res).await, "Url is required");
        assert!(state.registry.is_empty());
    }

    #[tokio::test]
    async fn whitespace_url_is_accepted_verbatim() {
        let state = test_state();
        let res = app(state.clone())
            .oneshot(form_post("/shorten", "url=%20"))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        let key = short_key_in(&body_text(res).await);
        assert_eq!(state.registry.resolve(&key).unwrap(), " ");
    }

    #[tokio::test]
    async fn url_in_query_string_is_ignored() {
        let state = test_state();
        let res = app(state.clone())
            .oneshot(form_post("/shorten?url=http%3A%2F%2Fexample.com", "url="))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(state.registry.is_empty());
    }

    #[tokio::test]
    async fn missing_url_field_is_bad_request() {
        let res = app(test_state())
            .oneshot(form_post("/shorten", "other=1"))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn get_on_shorten_is_method_not_allowed() {
        let res = app(test_state()).oneshot(get("/shorten")).await.unwrap();

        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(res.headers()[header::ALLOW], "POST");
        assert_eq!(body_text(res).await, "Method not allowed");
    }
}
