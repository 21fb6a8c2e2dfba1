//! [`Params`] extractor definitions.

use axum::{
    async_trait,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

use crate::Error;

/// Maximum allowed size of an urlencoded request body.
const BODY_LIMIT: usize = 16 * 1024;

/// Extractor of request parameters from the URL query string or an
/// `application/x-www-form-urlencoded` request body.
///
/// The body takes precedence whenever both are provided.
#[derive(Clone, Copy, Debug)]
pub struct Params<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for Params<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(
        req: Request,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        let query = req.uri().query().unwrap_or_default().to_owned();

        let form = if req
            .headers()
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| {
                v.starts_with("application/x-www-form-urlencoded")
            }) {
            let bytes = axum::body::to_bytes(req.into_body(), BODY_LIMIT)
                .await
                .map_err(|e| invalid(&e))?;
            String::from_utf8(bytes.to_vec()).map_err(|e| invalid(&e))?
        } else {
            String::new()
        };

        let params = if form.is_empty() { query } else { form };

        serde_urlencoded::from_str(&params)
            .map(Self)
            .map_err(|e| invalid(&e))
    }
}

/// Creates a new [`Error`] describing invalid request parameters.
fn invalid(e: &impl ToString) -> Error {
    Error {
        code: "INVALID_PARAMS",
        status_code: http::StatusCode::BAD_REQUEST,
        message: e.to_string(),
        backtrace: None,
    }
}

#[cfg(test)]
mod spec {
    use axum::{
        body::Body,
        extract::{FromRequest as _, Request},
    };
    use serde::Deserialize;

    use super::Params;

    #[derive(Debug, Deserialize)]
    struct TestParams {
        area: f64,
    }

    #[tokio::test]
    async fn extracts_from_query_string() {
        let req = Request::builder()
            .uri("/landParcel/1?area=42")
            .body(Body::empty())
            .unwrap();

        let Params(TestParams { area }) =
            Params::from_request(req, &()).await.unwrap();
        assert_eq!(area, 42.0);
    }

    #[tokio::test]
    async fn extracts_from_urlencoded_body() {
        let req = Request::builder()
            .method("POST")
            .uri("/landParcel/1")
            .header(
                http::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body(Body::from("area=42"))
            .unwrap();

        let Params(TestParams { area }) =
            Params::from_request(req, &()).await.unwrap();
        assert_eq!(area, 42.0);
    }

    #[tokio::test]
    async fn body_takes_precedence_over_query() {
        let req = Request::builder()
            .method("POST")
            .uri("/landParcel/1?area=1")
            .header(
                http::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body(Body::from("area=2"))
            .unwrap();

        let Params(TestParams { area }) =
            Params::from_request(req, &()).await.unwrap();
        assert_eq!(area, 2.0);
    }

    #[tokio::test]
    async fn rejects_malformed_parameters() {
        let req = Request::builder()
            .uri("/landParcel/1?area=not-a-number")
            .body(Body::empty())
            .unwrap();

        let err = Params::<TestParams>::from_request(req, &())
            .await
            .unwrap_err();
        assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);
    }
}
