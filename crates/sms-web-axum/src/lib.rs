use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::post,
    Router,
};
use bytes::Bytes;
use sms_contact::{ContactProcessor, ResponseConverter};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub const CONTACT_PATH: &str = "/api/contact";

#[derive(Clone)]
pub struct AppState {
    pub processor: ContactProcessor,
}

/// Router settings that live outside the contact flow.
#[derive(Debug, Clone)]
pub struct RouterOptions {
    /// The single origin browsers may call from.
    pub allowed_origin: String,
    /// Largest accepted request body, in bytes.
    pub max_body_size: usize,
}

/// Axum-specific response converter
pub struct AxumResponseConverter;

impl ResponseConverter for AxumResponseConverter {
    type ResponseType = axum::response::Response;

    fn from_contact_response(response: sms_core::ContactResponse) -> Self::ResponseType {
        let status = StatusCode::from_u16(response.status.as_u16())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (
            status,
            [(header::CONTENT_TYPE, response.content_type)],
            response.body,
        )
            .into_response()
    }
}

/// Handler: POST /api/contact
pub async fn contact(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    let response = state.processor.process_contact(&body).await;
    AxumResponseConverter::from_contact_response(response)
}

/// Build the relay router with CORS, body limit and request tracing.
pub fn router(
    state: AppState,
    options: &RouterOptions,
) -> Result<Router, header::InvalidHeaderValue> {
    let origin = HeaderValue::from_str(&options.allowed_origin)?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Ok(Router::new()
        .route(CONTACT_PATH, post(contact))
        .layer(DefaultBodyLimit::max(options.max_body_size))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}
