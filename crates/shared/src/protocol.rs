//! Wire types for the remote application's GraphQL endpoint.

use serde::{Deserialize, Serialize};

use crate::domain::{ApplicationId, UserId};

#[derive(Debug, Clone, Serialize)]
pub struct GraphQlRequest<V> {
    pub query: String,
    pub variables: V,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlResponse<T> {
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Option<Vec<GraphQlErrorItem>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlErrorItem {
    pub message: String,
    #[serde(default)]
    pub extensions: Option<GraphQlErrorExtensions>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlErrorExtensions {
    #[serde(default)]
    pub code: Option<String>,
}

/// The narrow update payload: exactly the attributes the update mutation
/// accepts. Phone, locale and role edits are deliberately absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteUserUpdateInput {
    pub display_name: String,
    pub email: String,
    pub avatar_url: String,
    pub email_verified: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateUserVariables {
    pub id: UserId,
    pub user: RemoteUserUpdateInput,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserData {
    pub update_user: Option<UpdatedUserRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdatedUserRef {
    pub id: UserId,
}

#[derive(Debug, Clone, Serialize)]
pub struct GetRolesVariables {
    pub id: ApplicationId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetRolesData {
    pub app: Option<AppRoleSettings>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppRoleSettings {
    #[serde(default)]
    pub auth_user_default_allowed_roles: Option<String>,
}
