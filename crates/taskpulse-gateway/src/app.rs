use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use taskpulse_channels::NotificationSender;
use taskpulse_core::config::TaskpulseConfig;
use taskpulse_tasks::TaskRepository;
use taskpulse_users::AuthGate;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Central shared state, passed as `Arc<AppState>` to all Axum handlers.
pub struct AppState {
    pub config: TaskpulseConfig,
    pub auth: AuthGate,
    pub tasks: TaskRepository,
    /// Outbound transport for the "task accepted" message. None when no
    /// WhatsApp credentials are configured; the reminder engine is then not
    /// running either.
    pub notifier: Option<Arc<dyn NotificationSender>>,
}

impl AppState {
    pub fn new(
        config: TaskpulseConfig,
        auth: AuthGate,
        tasks: TaskRepository,
        notifier: Option<Arc<dyn NotificationSender>>,
    ) -> Self {
        Self {
            config,
            auth,
            tasks,
            notifier,
        }
    }
}

/// Assemble the full Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(crate::http::health::health_handler))
        .route("/api/auth/login", post(crate::http::auth::login_handler))
        .route(
            "/api/tasks",
            get(crate::http::tasks::list_handler).post(crate::http::tasks::create_handler),
        )
        .route(
            "/api/tasks/{id}",
            put(crate::http::tasks::update_handler).delete(crate::http::tasks::delete_handler),
        )
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
    };
    use rusqlite::Connection;
    use serde_json::{json, Value};
    use std::sync::Mutex;
    use std::time::Duration;
    use taskpulse_channels::ChannelError;
    use tower::ServiceExt;

    #[derive(Default)]
    struct Recorder {
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl NotificationSender for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }
        async fn send(&self, address: &str, body: &str) -> Result<(), ChannelError> {
            self.sent
                .lock()
                .unwrap()
                .push((address.to_string(), body.to_string()));
            Ok(())
        }
    }

    fn router_with(notifier: Option<Arc<dyn NotificationSender>>) -> Router {
        let conn = Connection::open_in_memory().expect("in-memory db");
        conn.execute_batch("PRAGMA foreign_keys=ON;").unwrap();
        taskpulse_users::db::init_db(&conn).unwrap();
        taskpulse_tasks::db::init_db(&conn).unwrap();
        let db = Arc::new(std::sync::Mutex::new(conn));
        let state = AppState::new(
            TaskpulseConfig::default(),
            AuthGate::new(db.clone()),
            TaskRepository::new(db),
            notifier,
        );
        build_router(Arc::new(state))
    }

    fn router() -> Router {
        router_with(None)
    }

    async fn call(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        call_raw(router, method, uri, body.map(|json| json.to_string())).await
    }

    async fn call_raw(
        router: &Router,
        method: Method,
        uri: &str,
        body: Option<String>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(text) => builder
                .header("content-type", "application/json")
                .body(Body::from(text))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response body should be JSON")
        };
        (status, value)
    }

    async fn login(router: &Router, name: &str, phone: Option<&str>) -> i64 {
        let (status, body) = call(
            router,
            Method::POST,
            "/api/auth/login",
            Some(json!({"name": name, "pin": "1234", "phone": phone})),
        )
        .await;
        assert!(status.is_success(), "login failed: {body}");
        body["user_id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn login_creates_then_recognises_user() {
        let router = router();
        let (status, first) = call(
            &router,
            Method::POST,
            "/api/auth/login",
            Some(json!({"name": "ada", "pin": "1234"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(first["is_new"], json!(true));

        let (status, second) = call(
            &router,
            Method::POST,
            "/api/auth/login",
            Some(json!({"name": "ada", "pin": "1234", "phone": "+15550001"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(second["user_id"], first["user_id"]);
        assert_eq!(second["phone"], json!("+15550001"));
        assert!(second.get("is_new").is_none());
        assert!(second.get("pin").is_none());
    }

    #[tokio::test]
    async fn wrong_pin_and_blank_fields_are_rejected() {
        let router = router();
        login(&router, "ada", None).await;

        let (status, body) = call(
            &router,
            Method::POST,
            "/api/auth/login",
            Some(json!({"name": "ada", "pin": "9999"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], json!("UNAUTHORIZED"));

        let (status, body) = call(
            &router,
            Method::POST,
            "/api/auth/login",
            Some(json!({"name": "  ", "pin": "1"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], json!("VALIDATION_ERROR"));
    }

    #[tokio::test]
    async fn task_lifecycle() {
        let router = router();
        let ada = login(&router, "ada", None).await;

        let (status, task) = call(
            &router,
            Method::POST,
            "/api/tasks",
            Some(json!({"user_id": ada, "title": "ship it", "deadline": "2030-01-01T12:00"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(task["deadline"], json!("2030-01-01T12:00:00Z"));
        assert_eq!(task["notified_2h"], json!(false));
        let id = task["id"].as_i64().unwrap();

        let (status, list) = call(&router, Method::GET, &format!("/api/tasks?user_id={ada}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 1);

        let (status, updated) = call(
            &router,
            Method::PUT,
            &format!("/api/tasks/{id}"),
            Some(json!({"user_id": ada, "completed": true})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["completed"], json!(true));

        let (status, _) = call(
            &router,
            Method::DELETE,
            &format!("/api/tasks/{id}?user_id={ada}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = call(
            &router,
            Method::DELETE,
            &format!("/api/tasks/{id}?user_id={ada}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], json!("NOT_FOUND"));
    }

    #[tokio::test]
    async fn other_users_tasks_look_missing() {
        let router = router();
        let ada = login(&router, "ada", None).await;
        let bob = login(&router, "bob", None).await;
        let (_, task) = call(
            &router,
            Method::POST,
            "/api/tasks",
            Some(json!({"user_id": ada, "title": "private"})),
        )
        .await;
        let id = task["id"].as_i64().unwrap();

        let (status, _) = call(
            &router,
            Method::PUT,
            &format!("/api/tasks/{id}"),
            Some(json!({"user_id": bob, "completed": true})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, list) = call(&router, Method::GET, &format!("/api/tasks?user_id={ada}"), None).await;
        assert_eq!(list[0]["completed"], json!(false));
        let (_, list) = call(&router, Method::GET, &format!("/api/tasks?user_id={bob}"), None).await;
        assert!(list.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_or_unknown_owner_is_unauthorized() {
        let router = router();
        let (status, _) = call(&router, Method::GET, "/api/tasks", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = call(
            &router,
            Method::POST,
            "/api/tasks",
            Some(json!({"title": "orphan"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = call(
            &router,
            Method::POST,
            "/api/tasks",
            Some(json!({"user_id": 4242, "title": "orphan"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn invalid_input_is_a_bad_request() {
        let router = router();
        let ada = login(&router, "ada", None).await;
        for body in [
            json!({"user_id": ada, "title": "  "}),
            json!({"user_id": ada, "title": "t", "deadline": "soonish"}),
        ] {
            let (status, err) = call(&router, Method::POST, "/api/tasks", Some(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(err["code"], json!("VALIDATION_ERROR"));
        }
        let (_, list) = call(&router, Method::GET, &format!("/api/tasks?user_id={ada}"), None).await;
        assert!(list.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_sends_acceptance_to_owner_with_address() {
        let recorder = Arc::new(Recorder::default());
        let router = router_with(Some(recorder.clone()));
        let ada = login(&router, "ada", Some("+15550001")).await;
        let bob = login(&router, "bob", None).await;

        for owner in [ada, bob] {
            let (status, _) = call(
                &router,
                Method::POST,
                "/api/tasks",
                Some(json!({"user_id": owner, "title": "water plants"})),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        for _ in 0..50 {
            if !recorder.sent.lock().unwrap().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        let sent = recorder.sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "+15550001");
        assert!(sent[0].1.contains("'water plants'"));
    }

    #[tokio::test]
    async fn health_reports_reminder_state() {
        let (status, body) = call(&router(), Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], json!("ok"));
        assert_eq!(body["reminders"]["enabled"], json!(false));

        let with_sender = router_with(Some(Arc::new(Recorder::default())));
        let (_, body) = call(&with_sender, Method::GET, "/health", None).await;
        assert_eq!(body["reminders"]["enabled"], json!(true));
        assert_eq!(body["reminders"]["interval_secs"], json!(60));
    }

    #[tokio::test]
    async fn update_without_completed_is_rejected_and_keeps_state() {
        let router = router();
        let ada = login(&router, "ada", None).await;
        let (_, task) = call(
            &router,
            Method::POST,
            "/api/tasks",
            Some(json!({"user_id": ada, "title": "done already"})),
        )
        .await;
        let id = task["id"].as_i64().unwrap();
        call(
            &router,
            Method::PUT,
            &format!("/api/tasks/{id}"),
            Some(json!({"user_id": ada, "completed": true})),
        )
        .await;

        let (status, body) = call(
            &router,
            Method::PUT,
            &format!("/api/tasks/{id}"),
            Some(json!({"user_id": ada})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], json!("VALIDATION_ERROR"));

        let (_, list) = call(&router, Method::GET, &format!("/api/tasks?user_id={ada}"), None).await;
        assert_eq!(list[0]["completed"], json!(true));
    }

    #[tokio::test]
    async fn malformed_requests_get_json_errors() {
        let router = router();
        let ada = login(&router, "ada", None).await;

        let (status, body) = call_raw(
            &router,
            Method::POST,
            "/api/tasks",
            Some("{\"user_id\": 1, \"title\": ".to_string()),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], json!("VALIDATION_ERROR"));

        let (status, body) = call_raw(&router, Method::POST, "/api/auth/login", Some("not json".to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], json!("VALIDATION_ERROR"));

        let (status, body) = call(&router, Method::GET, "/api/tasks?user_id=abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], json!("VALIDATION_ERROR"));
        assert!(body["error"].as_str().unwrap().contains("user_id"));

        let (status, body) = call(
            &router,
            Method::PUT,
            "/api/tasks/not-a-number",
            Some(json!({"user_id": ada, "completed": true})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], json!("VALIDATION_ERROR"));
    }

    #[tokio::test]
    async fn numeric_string_user_id_is_accepted() {
        let router = router();
        let ada = login(&router, "ada", None).await;

        let (status, task) = call(
            &router,
            Method::POST,
            "/api/tasks",
            Some(json!({"user_id": ada.to_string(), "title": "t"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(task["user_id"], json!(ada));

        let (status, _) = call(&router, Method::GET, "/api/tasks?user_id=", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
