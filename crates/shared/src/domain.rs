use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

id_newtype!(UserId);
id_newtype!(ApplicationId);
id_newtype!(WorkspaceId);

/// A role granted to a remote-app user, as returned by the users query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantedRole {
    pub role: String,
}

/// Snapshot of a remote-app user record at the moment an edit session opens.
///
/// `id`, `created_at` and `last_seen` are immutable from the session's
/// perspective; every editable field goes through the form working copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteUser {
    pub id: UserId,
    pub display_name: String,
    pub avatar_url: String,
    pub email: String,
    pub email_verified: bool,
    #[serde(default)]
    pub phone_number: Option<String>,
    pub phone_number_verified: bool,
    pub locale: String,
    pub default_role: String,
    pub roles: Vec<GrantedRole>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,
}

impl RemoteUser {
    pub fn granted_role_names(&self) -> Vec<String> {
        self.roles.iter().map(|granted| granted.role.clone()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberUser {
    pub id: UserId,
    pub display_name: String,
    pub email: String,
    pub avatar_url: String,
}

/// A user's membership in a workspace, with the role carried as the
/// backend's free-form type string (e.g. "owner", "member").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceMember {
    pub workspace_id: WorkspaceId,
    #[serde(rename = "type")]
    pub member_type: String,
    pub user: MemberUser,
}

/// Render input for one member row, recomputed per render from query data.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberRowView {
    pub member_type: String,
    pub viewer_is_owner: bool,
    pub is_self: bool,
}

impl MemberRowView {
    /// Projects a membership record into row-render terms for a concrete
    /// viewer. `viewer_is_owner` is the viewer's own elevated status, not
    /// the row's.
    pub fn for_viewer(member: &WorkspaceMember, viewer_is_owner: bool, viewer_id: UserId) -> Self {
        Self {
            member_type: member.member_type.clone(),
            viewer_is_owner,
            is_self: member.user.id == viewer_id,
        }
    }
}
