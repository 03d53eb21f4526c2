#[cfg(test)]
mod handler_tests {
    use axum::{extract::State, response::IntoResponse, Json};
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;

    use crate::error::ServiceError;
    use crate::server::{handlers, types::PREDICTION_MESSAGE};
    use crate::test_support::{test_state, valid_body};

    #[tokio::test]
    async fn test_health_check_handler() {
        let response = handlers::health_check().await;
        assert_eq!(response, "OK");
    }

    #[tokio::test]
    async fn test_predict_handler_success() {
        let dir = TempDir::new().unwrap();
        let state = Arc::new(test_state(dir.path()));

        let Json(response) = handlers::predict(State(state), Ok(Json(valid_body())))
            .await
            .unwrap();

        assert_eq!(response.prediction, 45900.38);
        assert_eq!(response.message, PREDICTION_MESSAGE);
    }

    #[tokio::test]
    async fn test_predict_handler_unknown_category() {
        let dir = TempDir::new().unwrap();
        let state = Arc::new(test_state(dir.path()));

        let mut body = valid_body();
        body["Job Title"] = json!("Astronaut");

        let result = handlers::predict(State(state), Ok(Json(body))).await;
        match result {
            Err(ServiceError::UnknownCategory { column, classes }) => {
                assert_eq!(column, "Job Title");
                assert_eq!(classes.len(), 3);
            }
            other => panic!("Expected UnknownCategory, got {:?}", other.map(|j| j.0)),
        }
    }

    #[tokio::test]
    async fn test_predict_handler_missing_field() {
        let dir = TempDir::new().unwrap();
        let state = Arc::new(test_state(dir.path()));

        let mut body = valid_body();
        body.as_object_mut().unwrap().remove("Age");

        let result = handlers::predict(State(state), Ok(Json(body))).await;
        let response = result.unwrap_err().into_response();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_metrics_handler_without_recorder() {
        let dir = TempDir::new().unwrap();
        let state = Arc::new(test_state(dir.path()));

        let body = handlers::metrics_report(State(state)).await;
        assert!(body.is_empty());
    }
}

// Test for the server routes module
#[cfg(test)]
mod route_tests {
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use metrics_exporter_prometheus::PrometheusBuilder;
    use tempfile::TempDir;
    use tower::ServiceExt; // for `app.oneshot()`

    use crate::server::routes;
    use crate::test_support::test_state;

    #[tokio::test]
    async fn test_health_route() {
        let dir = TempDir::new().unwrap();
        let app = routes::create_router(test_state(dir.path()), false);

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"OK");
    }

    #[tokio::test]
    async fn test_metrics_route() {
        let dir = TempDir::new().unwrap();
        let handle = PrometheusBuilder::new().build_recorder().handle();
        let state = test_state(dir.path()).with_metrics(handle);
        let app = routes::create_router(state, false);

        let response = app
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let dir = TempDir::new().unwrap();
        let app = routes::create_router(test_state(dir.path()), true);

        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/predict")
            .header(header::ORIGIN, "http://localhost:8080")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert!(response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    }

    #[tokio::test]
    async fn test_predict_requires_post() {
        let dir = TempDir::new().unwrap();
        let app = routes::create_router(test_state(dir.path()), false);

        let response = app
            .oneshot(Request::get("/predict").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
