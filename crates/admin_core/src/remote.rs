//! Reqwest-backed gateway onto the remote application's GraphQL endpoint.
//! Consumes the protocol (plain POSTed documents); it is not a query
//! engine.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::{ApplicationId, UserId},
    error::RemoteApiError,
    protocol::{
        GetRolesData, GetRolesVariables, GraphQlRequest, GraphQlResponse, RemoteUserUpdateInput,
        UpdateUserData, UpdateUserVariables,
    },
};
use thiserror::Error;
use tracing::debug;

use crate::{RoleQueryGateway, UserMutationGateway};

const ADMIN_SECRET_HEADER: &str = "x-hasura-admin-secret";

pub const UPDATE_USER_MUTATION: &str = "\
mutation updateRemoteAppUser($id: uuid!, $user: users_set_input!) {
  updateUser(pk_columns: { id: $id }, _set: $user) {
    id
  }
}";

pub const GET_ROLES_QUERY: &str = "\
query getRoles($id: uuid!) {
  app(id: $id) {
    authUserDefaultAllowedRoles
  }
}";

#[derive(Debug, Error)]
pub enum GraphQlError {
    #[error("graphql transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error(transparent)]
    Api(#[from] RemoteApiError),
    #[error("graphql response carried no data")]
    MissingData,
}

/// Endpoint coordinates for one remote application.
#[derive(Debug, Clone)]
pub struct RemoteAppSettings {
    pub graphql_url: String,
    pub admin_secret: Option<String>,
}

impl Default for RemoteAppSettings {
    fn default() -> Self {
        Self {
            graphql_url: "http://127.0.0.1:8080/v1/graphql".into(),
            admin_secret: None,
        }
    }
}

pub fn load_settings() -> RemoteAppSettings {
    let mut settings = RemoteAppSettings::default();

    if let Ok(v) = std::env::var("REMOTE_APP_GRAPHQL_URL") {
        settings.graphql_url = v;
    }
    if let Ok(v) = std::env::var("REMOTE_APP_ADMIN_SECRET") {
        settings.admin_secret = Some(v);
    }

    settings
}

/// Per-application GraphQL client implementing both gateway traits.
pub struct RemoteAppClient {
    http: Client,
    settings: RemoteAppSettings,
}

impl RemoteAppClient {
    pub fn new(settings: RemoteAppSettings) -> Self {
        Self {
            http: Client::new(),
            settings,
        }
    }

    async fn execute<V, T>(&self, query: &str, variables: V) -> Result<T, GraphQlError>
    where
        V: Serialize,
        T: DeserializeOwned,
    {
        let mut request = self.http.post(&self.settings.graphql_url).json(&GraphQlRequest {
            query: query.to_string(),
            variables,
        });
        if let Some(secret) = &self.settings.admin_secret {
            request = request.header(ADMIN_SECRET_HEADER, secret);
        }

        let envelope: GraphQlResponse<T> = request
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(first) = envelope.errors.into_iter().flatten().next() {
            return Err(GraphQlError::Api(RemoteApiError::from(first)));
        }
        envelope.data.ok_or(GraphQlError::MissingData)
    }
}

#[async_trait]
impl UserMutationGateway for RemoteAppClient {
    async fn update_user(&self, id: UserId, input: RemoteUserUpdateInput) -> Result<()> {
        let data: UpdateUserData = self
            .execute(UPDATE_USER_MUTATION, UpdateUserVariables { id, user: input })
            .await?;
        let updated = data
            .update_user
            .ok_or_else(|| anyhow!("update mutation returned no user for {id}"))?;
        debug!(user_id = %updated.id, "remote user update acknowledged");
        Ok(())
    }
}

#[async_trait]
impl RoleQueryGateway for RemoteAppClient {
    async fn allowed_roles(&self, application_id: ApplicationId) -> Result<Vec<String>> {
        let data: GetRolesData = self
            .execute(GET_ROLES_QUERY, GetRolesVariables { id: application_id })
            .await?;
        let raw = data
            .app
            .and_then(|app| app.auth_user_default_allowed_roles)
            .unwrap_or_default();
        Ok(parse_allowed_roles(&raw))
    }
}

/// The backend stores the allowed-role list as one comma-separated string.
pub fn parse_allowed_roles(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|role| !role.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[path = "tests/remote_tests.rs"]
mod tests;
