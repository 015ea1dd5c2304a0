use super::*;
use std::sync::{Arc, Mutex as StdMutex};

use axum::{extract::State, http::HeaderMap, routing::post, Json, Router};
use serde_json::{json, Value};
use shared::error::ErrorCode;
use tokio::net::TcpListener;
use uuid::Uuid;

#[derive(Clone)]
struct GraphQlServerState {
    requests: Arc<StdMutex<Vec<Value>>>,
    admin_secrets: Arc<StdMutex<Vec<Option<String>>>>,
    response: Arc<StdMutex<Value>>,
}

async fn handle_graphql(
    State(state): State<GraphQlServerState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.requests.lock().expect("lock").push(body);
    state.admin_secrets.lock().expect("lock").push(
        headers
            .get("x-hasura-admin-secret")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
    );
    let response = state.response.lock().expect("lock").clone();
    Json(response)
}

async fn spawn_graphql_server(response: Value) -> (RemoteAppClient, GraphQlServerState) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let state = GraphQlServerState {
        requests: Arc::new(StdMutex::new(Vec::new())),
        admin_secrets: Arc::new(StdMutex::new(Vec::new())),
        response: Arc::new(StdMutex::new(response)),
    };
    let app = Router::new()
        .route("/v1/graphql", post(handle_graphql))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    let client = RemoteAppClient::new(RemoteAppSettings {
        graphql_url: format!("http://{addr}/v1/graphql"),
        admin_secret: Some("test-secret".to_string()),
    });
    (client, state)
}

fn sample_input() -> RemoteUserUpdateInput {
    RemoteUserUpdateInput {
        display_name: "Janet Cooper".to_string(),
        email: "janet@example.com".to_string(),
        avatar_url: "https://cdn.example.com/avatars/janet.png".to_string(),
        email_verified: true,
    }
}

#[tokio::test]
async fn update_user_posts_the_documented_variables() {
    let user_id = UserId(Uuid::from_u128(7));
    let (client, state) = spawn_graphql_server(json!({
        "data": { "updateUser": { "id": user_id.0 } }
    }))
    .await;

    client
        .update_user(user_id, sample_input())
        .await
        .expect("update");

    let requests = state.requests.lock().expect("lock").clone();
    assert_eq!(requests.len(), 1);
    let query = requests[0]["query"].as_str().expect("query");
    assert!(query.contains("updateRemoteAppUser"));

    let variables = &requests[0]["variables"];
    assert_eq!(variables["id"], json!(user_id.0));
    let user = variables["user"].as_object().expect("user object");
    let mut keys: Vec<&str> = user.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        vec!["avatarUrl", "displayName", "email", "emailVerified"]
    );
    assert_eq!(user["displayName"], json!("Janet Cooper"));
    assert_eq!(user["emailVerified"], json!(true));

    let secrets = state.admin_secrets.lock().expect("lock").clone();
    assert_eq!(secrets, vec![Some("test-secret".to_string())]);
}

#[tokio::test]
async fn graphql_errors_surface_as_remote_api_errors() {
    let (client, _state) = spawn_graphql_server(json!({
        "errors": [{
            "message": "check constraint of an insert/update permission has failed",
            "extensions": { "code": "permission-error" }
        }]
    }))
    .await;

    let err = client
        .update_user(UserId(Uuid::from_u128(7)), sample_input())
        .await
        .expect_err("must fail");

    match err.downcast_ref::<GraphQlError>() {
        Some(GraphQlError::Api(api)) => {
            assert_eq!(api.code, ErrorCode::Forbidden);
            assert!(api.message.contains("permission"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn a_response_without_data_is_an_error() {
    let (client, _state) = spawn_graphql_server(json!({ "data": null })).await;

    let err = client
        .update_user(UserId(Uuid::from_u128(7)), sample_input())
        .await
        .expect_err("must fail");

    assert!(matches!(
        err.downcast_ref::<GraphQlError>(),
        Some(GraphQlError::MissingData)
    ));
}

#[tokio::test]
async fn an_acknowledgement_without_the_user_ref_is_an_error() {
    let (client, _state) =
        spawn_graphql_server(json!({ "data": { "updateUser": null } })).await;

    let err = client
        .update_user(UserId(Uuid::from_u128(7)), sample_input())
        .await
        .expect_err("must fail");

    assert!(err.to_string().contains("returned no user"));
}

#[tokio::test]
async fn allowed_roles_parse_the_comma_separated_list() {
    let app_id = ApplicationId(Uuid::from_u128(42));
    let (client, state) = spawn_graphql_server(json!({
        "data": { "app": { "authUserDefaultAllowedRoles": "user, me ,editor," } }
    }))
    .await;

    let roles = client.allowed_roles(app_id).await.expect("roles");
    assert_eq!(roles, vec!["user", "me", "editor"]);

    let requests = state.requests.lock().expect("lock").clone();
    let query = requests[0]["query"].as_str().expect("query");
    assert!(query.contains("getRoles"));
    assert_eq!(requests[0]["variables"]["id"], json!(app_id.0));
}

#[tokio::test]
async fn an_absent_app_yields_no_roles() {
    let (client, _state) = spawn_graphql_server(json!({ "data": { "app": null } })).await;

    let roles = client
        .allowed_roles(ApplicationId(Uuid::from_u128(42)))
        .await
        .expect("roles");
    assert!(roles.is_empty());
}

#[test]
fn parse_allowed_roles_drops_blank_entries() {
    assert_eq!(parse_allowed_roles("user,me"), vec!["user", "me"]);
    assert_eq!(parse_allowed_roles(" user , ,me "), vec!["user", "me"]);
    assert!(parse_allowed_roles("").is_empty());
}

#[test]
fn settings_load_from_the_environment_over_defaults() {
    std::env::remove_var("REMOTE_APP_GRAPHQL_URL");
    std::env::remove_var("REMOTE_APP_ADMIN_SECRET");
    let defaults = load_settings();
    assert_eq!(defaults.graphql_url, "http://127.0.0.1:8080/v1/graphql");
    assert!(defaults.admin_secret.is_none());

    std::env::set_var("REMOTE_APP_GRAPHQL_URL", "https://db.example.app/v1/graphql");
    std::env::set_var("REMOTE_APP_ADMIN_SECRET", "s3cret");
    let loaded = load_settings();
    assert_eq!(loaded.graphql_url, "https://db.example.app/v1/graphql");
    assert_eq!(loaded.admin_secret.as_deref(), Some("s3cret"));

    std::env::remove_var("REMOTE_APP_GRAPHQL_URL");
    std::env::remove_var("REMOTE_APP_ADMIN_SECRET");
}
