//! Extractors whose rejections come back as `{error, code}` JSON instead of
//! axum's plain-text bodies.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        FromRequest, FromRequestParts, Path, Query, Request,
    },
    http::request::Parts,
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use taskpulse_core::UserId;

use super::error::ApiError;

/// `Json<T>` with a 400 `VALIDATION_ERROR` on a malformed body.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e: JsonRejection| ApiError::validation(e.body_text()))?;
        Ok(Self(value))
    }
}

/// `Query<T>` with a 400 `VALIDATION_ERROR` on a malformed query string.
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e: QueryRejection| ApiError::validation(e.body_text()))?;
        Ok(Self(value))
    }
}

/// `Path<T>` with a 400 `VALIDATION_ERROR` when a segment does not parse.
pub struct ApiPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e: PathRejection| ApiError::validation(e.body_text()))?;
        Ok(Self(value))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Int(i64),
    Text(String),
}

/// Deserialize an optional owner id given as a JSON number or a numeric
/// string. Query strings always arrive as text. Blank means absent.
pub fn owner_id<'de, D>(deserializer: D) -> Result<Option<UserId>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawId>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawId::Int(id)) => Ok(Some(UserId(id))),
        Some(RawId::Text(raw)) => {
            let raw = raw.trim();
            if raw.is_empty() {
                return Ok(None);
            }
            raw.parse::<i64>().map(|id| Some(UserId(id))).map_err(|_| {
                serde::de::Error::custom(format!("user_id must be an integer, got {raw:?}"))
            })
        }
    }
}
