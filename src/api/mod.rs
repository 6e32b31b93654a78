// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{auth::identity_middleware, state::AppState};

pub mod auth;
pub mod health;
pub mod users;

pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health::health))
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/auth", get(auth::session));

    let user_routes = Router::new()
        .route("/user", post(users::create_user))
        .route(
            "/user/{guid}",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        );

    Router::new()
        .nest("/public", public_routes)
        .merge(user_routes)
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .layer(middleware::from_fn_with_state(
            state.identity_policy,
            identity_middleware,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TimeoutLayer::new(state.request_timeout))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, Response, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::auth::{
        HashCost, IdentityHeaderPolicy, LocalBackend, PasswordHasher, IDENTITY_HEADER,
    };
    use crate::storage::{CredentialStore, InMemoryStore};

    fn test_state() -> AppState {
        let store: Arc<dyn CredentialStore> = Arc::new(InMemoryStore::new());
        let hasher = PasswordHasher::new(HashCost {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap();
        let backend = Arc::new(LocalBackend::new(store.clone(), hasher));
        AppState::new(store, backend)
    }

    fn request(method: Method, uri: &str, user: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(IDENTITY_HEADER, user);
        }
        match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(app: &Router, req: Request<Body>) -> Response<Body> {
        app.clone().oneshot(req).await.unwrap()
    }

    async fn json_body(response: Response<Body>) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn credentials(email: &str, password: &str) -> Value {
        json!({"email": email, "password": password, "name": "Ada", "occupation": "Engineer"})
    }

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let app = router(AppState::default());
        let _ = app.into_make_service();
    }

    #[tokio::test]
    async fn signup_login_and_ownership_end_to_end() {
        let app = router(test_state());

        let response = send(
            &app,
            request(Method::POST, "/public/signup", None, Some(credentials("a@b.com", "pw1"))),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert_eq!(body["code"], "01");

        let response = send(
            &app,
            request(Method::POST, "/public/signup", None, Some(credentials("a@b.com", "pw2"))),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(json_body(response).await["error_code"], "email_already_used");

        let response = send(
            &app,
            request(Method::POST, "/public/login", None, Some(credentials("a@b.com", "pw1"))),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let header = response
            .headers()
            .get(IDENTITY_HEADER)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        let guid = json_body(response).await["user_guid"]
            .as_str()
            .unwrap()
            .to_string();
        assert_eq!(header, guid);

        let response = send(
            &app,
            request(Method::POST, "/public/login", None, Some(credentials("a@b.com", "wrong"))),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["error_code"], "invalid_credentials");

        let uri = format!("/user/{guid}");
        let response = send(&app, request(Method::GET, &uri, Some(&guid), None)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let user = json_body(response).await;
        assert_eq!(user["guid"], guid.as_str());
        assert_eq!(user["name"], "Ada");

        let other = Uuid::new_v4().to_string();
        let response = send(&app, request(Method::GET, &uri, Some(&other), None)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(json_body(response).await["error_code"], "no_permission");
    }

    #[tokio::test]
    async fn unknown_email_login_is_not_found() {
        let app = router(test_state());
        let response = send(
            &app,
            request(Method::POST, "/public/login", None, Some(credentials("x@y.com", "pw"))),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["error_code"], "no_such_user");
    }

    #[tokio::test]
    async fn session_check_follows_login() {
        let app = router(test_state());
        send(
            &app,
            request(Method::POST, "/public/signup", None, Some(credentials("a@b.com", "pw1"))),
        )
        .await;
        let guid = app
            .clone()
            .oneshot(request(
                Method::POST,
                "/public/login",
                None,
                Some(credentials("a@b.com", "pw1")),
            ))
            .await
            .unwrap()
            .headers()
            .get(IDENTITY_HEADER)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();

        let response = send(&app, request(Method::GET, "/public/auth", Some(&guid), None)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(IDENTITY_HEADER).unwrap().to_str().unwrap(),
            guid
        );

        let stranger = Uuid::new_v4().to_string();
        let response =
            send(&app, request(Method::GET, "/public/auth", Some(&stranger), None)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = send(&app, request(Method::GET, "/public/auth", None, None)).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn malformed_identity_downgrades_to_no_permission() {
        let app = router(test_state());
        let uri = format!("/user/{}", Uuid::new_v4());
        let response = send(&app, request(Method::GET, &uri, Some("garbage"), None)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn malformed_identity_rejected_under_reject_policy() {
        let app = router(test_state().with_identity_policy(IdentityHeaderPolicy::Reject));
        let uri = format!("/user/{}", Uuid::new_v4());
        let response = send(&app, request(Method::GET, &uri, Some("garbage"), None)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error_code"], "malformed_identity");
    }

    #[tokio::test]
    async fn profile_update_and_delete() {
        let app = router(test_state());
        let body = json_body(
            send(
                &app,
                request(Method::POST, "/public/signup", None, Some(credentials("a@b.com", "pw1"))),
            )
            .await,
        )
        .await;
        let guid = body["user_guid"].as_str().unwrap().to_string();
        let uri = format!("/user/{guid}");

        let response = send(
            &app,
            request(
                Method::PATCH,
                &uri,
                Some(&guid),
                Some(json!({"occupation": "Architect"})),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let user = json_body(send(&app, request(Method::GET, &uri, Some(&guid), None)).await).await;
        assert_eq!(user["name"], "Ada");
        assert_eq!(user["occupation"], "Architect");

        let response = send(&app, request(Method::DELETE, &uri, Some(&guid), None)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(
            &app,
            request(Method::PATCH, &uri, Some(&guid), Some(json!({"name": "Grace"}))),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        // The email is free again after deletion
        let response = send(
            &app,
            request(Method::POST, "/public/signup", None, Some(credentials("a@b.com", "pw3"))),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn create_profile_requires_identity() {
        let app = router(test_state());
        let response = send(
            &app,
            request(Method::POST, "/user", None, Some(json!({"name": "Grace"}))),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let creator = Uuid::new_v4().to_string();
        let response = send(
            &app,
            request(Method::POST, "/user", Some(&creator), Some(json!({"name": "Grace"}))),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn responses_carry_request_id() {
        let app = router(test_state());
        let response = send(&app, request(Method::GET, "/public/health", None, None)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }
}
