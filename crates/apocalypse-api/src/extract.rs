use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// JSON body extractor that maps every failure to `400 Bad Request`:
/// unreadable bodies, bodies over the router's `DefaultBodyLimit`, and
/// payloads that do not decode. The `Content-Type` header is not checked.
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::Decode(e.body_text()))?;

        serde_json::from_slice(&bytes)
            .map(JsonBody)
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Query-string pairs in request order. Lookups return the first value of a
/// repeated key, so `?status=false&status=true` reads as `false`.
#[derive(Debug, Default)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn first(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl<S> FromRequestParts<S> for QueryParams
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::Decode(e.body_text()))?;
        Ok(QueryParams(pairs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn params(uri: &str) -> QueryParams {
        let (mut parts, _) = Request::builder().uri(uri).body(()).unwrap().into_parts();
        QueryParams::from_request_parts(&mut parts, &()).await.unwrap()
    }

    #[tokio::test]
    async fn repeated_key_keeps_first_value() {
        let q = params("/survivors/infected?status=false&status=true").await;
        assert_eq!(q.first("status"), Some("false"));
    }

    #[tokio::test]
    async fn values_are_percent_decoded() {
        let q = params("/robotcpu?category=Fly%69ng&sortby=serialNumber").await;
        assert_eq!(q.first("category"), Some("Flying"));
        assert_eq!(q.first("sortby"), Some("serialNumber"));
        assert_eq!(q.first("missing"), None);
    }

    #[tokio::test]
    async fn no_query_string_is_empty() {
        let q = params("/robotcpu").await;
        assert_eq!(q.first("category"), None);
    }
}
