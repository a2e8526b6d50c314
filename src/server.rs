use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{FromRequest, Multipart, Query, Request, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};

use crate::{config::Config, options::RenderOptions, render};

pub fn router(config: Config) -> Router {
    Router::new()
        .route(
            "/pdf",
            post(handle_pdf)
                .options(handle_preflight)
                .fallback(method_not_allowed),
        )
        .with_state(Arc::new(config))
}

async fn handle_pdf(
    State(config): State<Arc<Config>>,
    Query(params): Query<HashMap<String, String>>,
    request: Request,
) -> Response {
    let html = match read_html(request).await {
        Ok(html) => html,
        Err(status) => return status.into_response(),
    };
    if html.is_empty() {
        return StatusCode::BAD_REQUEST.into_response();
    }

    // All validation happens before the renderer is spawned, so error
    // responses never carry a partial body.
    let opts = match RenderOptions::from_query(&params) {
        Ok(opts) => opts,
        Err(err) => return (StatusCode::BAD_REQUEST, err.to_string()).into_response(),
    };

    match render::render(&config.renderer, &opts.to_args(), html).await {
        Ok(body) => ([(header::CONTENT_TYPE, "application/pdf")], body).into_response(),
        Err(err) => {
            tracing::error!("An error occurred: {err}");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Pulls the HTML out of the request: the `htmlfile` multipart field when the
/// request is a form upload, otherwise the raw body.
async fn read_html(request: Request) -> Result<Vec<u8>, StatusCode> {
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.starts_with("multipart/form-data"))
        .unwrap_or(false);

    if is_multipart {
        let mut multipart = Multipart::from_request(request, &())
            .await
            .map_err(|_| StatusCode::BAD_REQUEST)?;
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|_| StatusCode::BAD_REQUEST)?
        {
            if field.name() == Some("htmlfile") {
                let bytes = field.bytes().await.map_err(|_| StatusCode::BAD_REQUEST)?;
                return Ok(bytes.to_vec());
            }
        }
        Ok(Vec::new())
    } else {
        let bytes = axum::body::to_bytes(request.into_body(), usize::MAX)
            .await
            .map_err(|_| StatusCode::BAD_REQUEST)?;
        Ok(bytes.to_vec())
    }
}

async fn handle_preflight() -> impl IntoResponse {
    [
        (header::ACCESS_CONTROL_ALLOW_METHODS, "POST, OPTIONS"),
        (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
    ]
}

async fn method_not_allowed() -> impl IntoResponse {
    (StatusCode::METHOD_NOT_ALLOWED, [(header::ALLOW, "POST")])
}
