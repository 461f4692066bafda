// src/middleware/json.rs

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Request},
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
};

/// Corpo JSON lido sem exigir `Content-Type`. Corpo vazio ou `null` vale como `{}`.
/// Falhas viram o mesmo envelope de erro das demais rotas.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<T> FromRequest<AppState> for JsonBody<T>
where
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();
        let locale = Locale::from_request_parts(&mut parts, state)
            .await
            .unwrap_or_default();
        let reject = |e: AppError| e.to_api_error(&locale, &state.i18n_store);

        let bytes = Bytes::from_request(Request::from_parts(parts, body), state)
            .await
            .map_err(|_| reject(AppError::InvalidBody))?;

        parse_body(&bytes).map(JsonBody).map_err(reject)
    }
}

pub fn parse_body<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, AppError> {
    let value = if bytes.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        serde_json::from_slice::<Value>(bytes).map_err(|_| AppError::InvalidBody)?
    };
    let value = match value {
        Value::Null => Value::Object(Map::new()),
        other => other,
    };
    serde_json::from_value(value).map_err(|_| AppError::InvalidBody)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::relacionamento::{DesvincularPayload, VincularPayload};

    #[test]
    fn empty_or_null_body_is_an_empty_object() {
        let payload: VincularPayload = parse_body(b"").unwrap();
        assert!(payload.sk_chip.is_none());
        let payload: DesvincularPayload = parse_body(b" null ").unwrap();
        assert!(payload.sk_chip.is_none());
    }

    #[test]
    fn malformed_or_non_object_body_is_invalid() {
        assert!(matches!(
            parse_body::<Map<String, Value>>(b"{\"sk_chip\": "),
            Err(AppError::InvalidBody)
        ));
        assert!(matches!(
            parse_body::<Map<String, Value>>(b"[1, 2]"),
            Err(AppError::InvalidBody)
        ));
    }
}
