use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

pub mod redirect;
pub mod shorten;

/// Fallback for every path no route matches.
pub async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not found").into_response()
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::{config::AppConfig, registry::UrlRegistry, AppState};
    use axum::{
        body::Body,
        http::{header, Request},
        response::Response,
    };
    use std::sync::Arc;

    pub fn test_state() -> Arc<AppState> {
        let config = AppConfig::from_lookup(|_| None).expect("default config");
        Arc::new(AppState {
            registry: UrlRegistry::new(),
            config,
        })
    }

    pub fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    pub fn form_post(uri: &str, body: &'static str) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    /// Pull the short key out of a rendered "shortened" page.
    pub fn short_key_in(body: &str) -> String {
        let body = body.replace("&#x2f;", "/");
        let start = body.find("/short/").expect("short link in body") + "/short/".len();
        body[start..start + crate::keygen::KEY_LENGTH].to_owned()
    }

    pub async fn body_text(res: Response) -> String {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }
}
