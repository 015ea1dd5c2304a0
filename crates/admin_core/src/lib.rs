use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::{
    domain::{ApplicationId, GrantedRole, RemoteUser, UserId},
    protocol::RemoteUserUpdateInput,
};
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};

pub mod form;
pub mod presenter;
pub mod remote;
pub mod validate;
pub mod view;

pub use form::{FieldEdit, FieldErrors, FormField, FormWorkingCopy, UserFormValues};
pub use presenter::{classify, MemberRowAction};
pub use view::RoleOption;

const UPDATE_LOADING_MESSAGE: &str = "Updating user's settings...";
const UPDATE_SUCCESS_MESSAGE: &str = "User settings updated successfully!";
const UPDATE_ERROR_MESSAGE: &str = "Failed to update user settings.";
const PASSWORD_DIALOG_TITLE: &str = "Change Password";
const DELETE_DIALOG_TITLE: &str = "Delete User";
const USER_ID_COPY_LABEL: &str = "User ID";

/// Remote write for user records. The in-flight payload is the narrow
/// four-field input; everything else the form tracks stays local.
#[async_trait]
pub trait UserMutationGateway: Send + Sync {
    async fn update_user(&self, id: UserId, input: RemoteUserUpdateInput) -> Result<()>;
}

pub struct MissingUserMutationGateway;

#[async_trait]
impl UserMutationGateway for MissingUserMutationGateway {
    async fn update_user(&self, id: UserId, _input: RemoteUserUpdateInput) -> Result<()> {
        Err(anyhow!("user mutation gateway unavailable for user {id}"))
    }
}

/// Read side for the project's assignable-role list.
#[async_trait]
pub trait RoleQueryGateway: Send + Sync {
    async fn allowed_roles(&self, application_id: ApplicationId) -> Result<Vec<String>>;
}

pub struct MissingRoleQueryGateway;

#[async_trait]
impl RoleQueryGateway for MissingRoleQueryGateway {
    async fn allowed_roles(&self, application_id: ApplicationId) -> Result<Vec<String>> {
        Err(anyhow!(
            "role query gateway unavailable for application {application_id}"
        ))
    }
}

/// Progress surface for the submit flow. Exactly one of
/// `success`/`error` follows each `loading`, always before `submit`
/// returns to the caller.
pub trait NotificationSink: Send + Sync {
    fn loading(&self, message: &str);
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// Sink for embedders that surface progress some other way.
pub struct SilentNotificationSink;

impl NotificationSink for SilentNotificationSink {
    fn loading(&self, _message: &str) {}
    fn success(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    EditUserPassword,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogScope {
    Dialog,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogRequest {
    pub title: String,
    pub user_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertDialogRequest {
    pub title: String,
    pub message: String,
    pub destructive: bool,
}

/// Modal lifecycle owner. `on_dirty_state_change` lets the host veto a
/// close attempt while edits are unsaved; it fires once per aggregate
/// transition, never per keystroke.
pub trait DialogHost: Send + Sync {
    fn open_dialog(&self, kind: DialogKind, request: DialogRequest);
    fn open_alert_dialog(&self, request: AlertDialogRequest);
    fn on_dirty_state_change(&self, is_dirty: bool, scope: DialogScope);
}

/// Fire-and-forget clipboard copy; `label` names the copied value for the
/// host's own confirmation surface.
pub trait Clipboard: Send + Sync {
    fn copy(&self, text: &str, label: &str);
}

pub struct NoopClipboard;

impl Clipboard for NoopClipboard {
    fn copy(&self, _text: &str, _label: &str) {}
}

/// State transitions the UI layer can subscribe to instead of polling the
/// working copy.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    DirtyStateChanged { is_dirty: bool },
    ValidationRejected { errors: FieldErrors },
    SubmitStarted,
    SubmitSucceeded { user: RemoteUser },
    SubmitFailed { message: String },
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("validation failed for {} field(s)", .0.len())]
    Validation(FieldErrors),
    #[error("update mutation failed: {0}")]
    Mutation(#[source] anyhow::Error),
    #[error("another submit is already in flight for this session")]
    AlreadyInFlight,
}

struct SessionState {
    form: FormWorkingCopy,
    submit_in_flight: bool,
    cached_roles: Option<Vec<String>>,
}

/// One user-edit session: owns the form working copy, sequences the
/// submit flow against the remote gateway, and keeps the dialog host
/// informed about unsaved edits. Sessions are independent; dropping one
/// discards its working copy.
pub struct EditUserSession {
    user: RemoteUser,
    application_id: ApplicationId,
    mutation_gateway: Arc<dyn UserMutationGateway>,
    role_gateway: Arc<dyn RoleQueryGateway>,
    notifications: Arc<dyn NotificationSink>,
    dialog_host: Arc<dyn DialogHost>,
    clipboard: Arc<dyn Clipboard>,
    inner: Mutex<SessionState>,
    events: broadcast::Sender<SessionEvent>,
}

impl EditUserSession {
    /// Seeds a working copy from the user snapshot and announces the
    /// pristine dirty state to the dialog host.
    pub fn open(
        user: RemoteUser,
        application_id: ApplicationId,
        mutation_gateway: Arc<dyn UserMutationGateway>,
        role_gateway: Arc<dyn RoleQueryGateway>,
        notifications: Arc<dyn NotificationSink>,
        dialog_host: Arc<dyn DialogHost>,
        clipboard: Arc<dyn Clipboard>,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(64);
        let form = FormWorkingCopy::seeded_from(&user);
        let session = Arc::new(Self {
            user,
            application_id,
            mutation_gateway,
            role_gateway,
            notifications,
            dialog_host,
            clipboard,
            inner: Mutex::new(SessionState {
                form,
                submit_in_flight: false,
                cached_roles: None,
            }),
            events,
        });

        session
            .dialog_host
            .on_dirty_state_change(false, DialogScope::Dialog);
        session
    }

    pub fn user(&self) -> &RemoteUser {
        &self.user
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Applies one field edit. Dirty recomputation and error clearing are
    /// the reducer's job; this layer only fans out the aggregate
    /// transition when it flips.
    pub async fn set_field(&self, edit: FieldEdit) {
        let transition = {
            let mut guard = self.inner.lock().await;
            guard.form.apply(edit)
        };

        if let Some(is_dirty) = transition {
            self.dialog_host
                .on_dirty_state_change(is_dirty, DialogScope::Dialog);
            let _ = self
                .events
                .send(SessionEvent::DirtyStateChanged { is_dirty });
        }
    }

    pub async fn is_dirty(&self) -> bool {
        self.inner.lock().await.form.is_dirty()
    }

    pub async fn working_copy(&self) -> FormWorkingCopy {
        self.inner.lock().await.form.clone()
    }

    pub async fn field_error(&self, field: FormField) -> Option<String> {
        self.inner
            .lock()
            .await
            .form
            .field_error(field)
            .map(str::to_string)
    }

    /// Validates and saves the working copy as one all-or-nothing write of
    /// the four mapped fields. On success the submitted values become the
    /// new dirty-comparison baseline.
    pub async fn submit(&self) -> Result<RemoteUser, SubmitError> {
        let values = {
            let mut guard = self.inner.lock().await;
            if guard.submit_in_flight {
                return Err(SubmitError::AlreadyInFlight);
            }

            if let Err(errors) = validate::check(guard.form.values()) {
                guard.form.record_errors(&errors);
                let _ = self.events.send(SessionEvent::ValidationRejected {
                    errors: errors.clone(),
                });
                return Err(SubmitError::Validation(errors));
            }

            guard.submit_in_flight = true;
            guard.form.values().clone()
        };

        self.notifications.loading(UPDATE_LOADING_MESSAGE);
        let _ = self.events.send(SessionEvent::SubmitStarted);

        let input = RemoteUserUpdateInput {
            display_name: values.display_name.clone(),
            email: values.email.clone(),
            avatar_url: values.avatar_url.clone(),
            email_verified: values.email_verified,
        };
        let outcome = self.mutation_gateway.update_user(self.user.id, input).await;

        let mut guard = self.inner.lock().await;
        guard.submit_in_flight = false;
        match outcome {
            Ok(()) => {
                let was_dirty = guard.form.is_dirty();
                guard.form.rebase(values.clone());
                drop(guard);

                self.notifications.success(UPDATE_SUCCESS_MESSAGE);
                if was_dirty {
                    self.dialog_host
                        .on_dirty_state_change(false, DialogScope::Dialog);
                    let _ = self
                        .events
                        .send(SessionEvent::DirtyStateChanged { is_dirty: false });
                }

                let user = self.committed_user(&values);
                info!(user_id = %self.user.id, "user update committed");
                let _ = self
                    .events
                    .send(SessionEvent::SubmitSucceeded { user: user.clone() });
                Ok(user)
            }
            Err(err) => {
                drop(guard);
                self.notifications.error(UPDATE_ERROR_MESSAGE);
                warn!(user_id = %self.user.id, "user update failed: {err}");
                let _ = self.events.send(SessionEvent::SubmitFailed {
                    message: err.to_string(),
                });
                Err(SubmitError::Mutation(err))
            }
        }
    }

    /// The user snapshot as of the just-committed save: immutable fields
    /// from session start, editable fields from the submitted values.
    fn committed_user(&self, values: &UserFormValues) -> RemoteUser {
        RemoteUser {
            id: self.user.id,
            display_name: values.display_name.clone(),
            avatar_url: values.avatar_url.clone(),
            email: values.email.clone(),
            email_verified: values.email_verified,
            phone_number: values.phone_number.clone(),
            phone_number_verified: values.phone_number_verified,
            locale: values.locale.clone(),
            default_role: values.default_role.clone(),
            roles: values
                .roles
                .iter()
                .map(|role| GrantedRole { role: role.clone() })
                .collect(),
            created_at: self.user.created_at,
            last_seen: self.user.last_seen,
        }
    }

    /// Opens the password sub-dialog with the user identity as payload.
    /// No session state changes.
    pub fn request_password_change(&self) {
        self.dialog_host.open_dialog(
            DialogKind::EditUserPassword,
            DialogRequest {
                title: PASSWORD_DIALOG_TITLE.to_string(),
                user_id: self.user.id,
            },
        );
    }

    /// Opens the delete confirmation. Confirmation handling (and the
    /// eventual delete mutation) belong to the dialog host.
    pub fn request_delete(&self) {
        self.dialog_host.open_alert_dialog(AlertDialogRequest {
            title: DELETE_DIALOG_TITLE.to_string(),
            message: format!(
                "Are you sure you want to delete the \"{}\" user? This cannot be undone.",
                self.user.display_name
            ),
            destructive: true,
        });
    }

    pub fn copy_user_id(&self) {
        self.clipboard
            .copy(&self.user.id.to_string(), USER_ID_COPY_LABEL);
    }

    /// The project's assignable-role list, read through the gateway at
    /// most once per session (cache-first).
    pub async fn project_roles(&self) -> Result<Vec<String>> {
        {
            let guard = self.inner.lock().await;
            if let Some(roles) = &guard.cached_roles {
                return Ok(roles.clone());
            }
        }

        let roles = self.role_gateway.allowed_roles(self.application_id).await?;
        let mut guard = self.inner.lock().await;
        guard.cached_roles = Some(roles.clone());
        Ok(roles)
    }

    /// Role checkboxes for the form: every project role, checked when the
    /// working copy currently grants it.
    pub async fn role_options(&self) -> Result<Vec<RoleOption>> {
        let roles = self.project_roles().await?;
        let guard = self.inner.lock().await;
        Ok(view::role_options(&roles, &guard.form.values().roles))
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
