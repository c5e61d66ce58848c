use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    Form, Json,
    extract::{FromRequest, Multipart, Query, Request, State},
    http::header,
};
use serde::Deserialize;

use crate::http_server::error::{ApiError, ApiResult};
use crate::http_server::state::AppState;
use crate::resolver::types::ResolvedPlaylist;

/// The `url` field of a urlencoded or multipart body.
///
/// An unreadable or missing body yields an empty `url`, which the resolver rejects as an
/// unsupported link inside the normal response envelope.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SongListForm {
    #[serde(default)]
    url: String,
}

impl<S: Send + Sync> FromRequest<S> for SongListForm {
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("multipart/form-data"));

        let parsed = if is_multipart {
            read_multipart(req, state).await
        } else {
            Form::<SongListForm>::from_request(req, state)
                .await
                .map(|Form(form)| form)
                .map_err(|e| e.to_string())
        };

        Ok(parsed.unwrap_or_else(|reason| {
            tracing::debug!("Unreadable songlist body: {}", reason);
            Self::default()
        }))
    }
}

async fn read_multipart<S: Send + Sync>(req: Request, state: &S) -> Result<SongListForm, String> {
    let mut multipart = Multipart::from_request(req, state)
        .await
        .map_err(|e| e.to_string())?;

    while let Some(field) = multipart.next_field().await.map_err(|e| e.to_string())? {
        if field.name() == Some("url") {
            let url = field.text().await.map_err(|e| e.to_string())?;
            return Ok(SongListForm { url });
        }
    }

    Ok(SongListForm::default())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SongListQuery {
    /// `true` keeps raw track titles
    #[serde(default)]
    detailed: String,
}

pub async fn songlist(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<SongListQuery>,
    form: SongListForm,
) -> Result<Json<ApiResult<ResolvedPlaylist>>, ApiError> {
    let detailed = query.detailed == "true";
    let playlist = app_state
        .resolver
        .resolve(&app_state.counter, form.url.trim(), detailed)
        .await?;

    Ok(Json(ApiResult::success(playlist)))
}
