//! Member row presenter: decides which action affordance a workspace
//! member row shows for a given viewer.

use shared::domain::MemberRowView;

/// The three mutually exclusive affordances a row can render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberRowAction {
    /// The viewer's own row, viewer is an owner: raw membership type.
    SelfBadge { label: String },
    /// An owner looking at someone else: management menu (delegated).
    ManageMenu,
    /// Everyone else sees the row's role, capitalized.
    RoleBadge { label: String },
}

pub fn classify(view: &MemberRowView) -> MemberRowAction {
    match (view.viewer_is_owner, view.is_self) {
        (true, true) => MemberRowAction::SelfBadge {
            label: view.member_type.clone(),
        },
        (true, false) => MemberRowAction::ManageMenu,
        // A non-owner viewing their own row still gets a role badge; rows
        // never render without an affordance.
        (false, _) => MemberRowAction::RoleBadge {
            label: capitalize(&view.member_type),
        },
    }
}

/// Whether the row shows the "Me" chip next to the display name.
pub fn shows_self_chip(view: &MemberRowView) -> bool {
    view.is_self
}

/// Uppercases the first character only; the rest of the string is kept
/// verbatim.
pub fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::{MemberUser, UserId, WorkspaceId, WorkspaceMember};
    use uuid::Uuid;

    fn view(viewer_is_owner: bool, is_self: bool, member_type: &str) -> MemberRowView {
        MemberRowView {
            member_type: member_type.to_string(),
            viewer_is_owner,
            is_self,
        }
    }

    #[test]
    fn row_view_derives_selfness_from_the_viewer_identity() {
        let member = WorkspaceMember {
            workspace_id: WorkspaceId(Uuid::from_u128(1)),
            member_type: "owner".to_string(),
            user: MemberUser {
                id: UserId(Uuid::from_u128(7)),
                display_name: "Jane Cooper".to_string(),
                email: "jane@example.com".to_string(),
                avatar_url: "https://cdn.example.com/avatars/jane.png".to_string(),
            },
        };

        let own_row = MemberRowView::for_viewer(&member, true, UserId(Uuid::from_u128(7)));
        assert!(own_row.is_self);
        assert_eq!(classify(&own_row), MemberRowAction::SelfBadge {
            label: "owner".to_string()
        });

        let other_row = MemberRowView::for_viewer(&member, true, UserId(Uuid::from_u128(8)));
        assert!(!other_row.is_self);
        assert_eq!(classify(&other_row), MemberRowAction::ManageMenu);
    }

    #[test]
    fn owner_viewing_self_gets_unformatted_self_badge() {
        let action = classify(&view(true, true, "owner"));
        assert_eq!(
            action,
            MemberRowAction::SelfBadge {
                label: "owner".to_string()
            }
        );
    }

    #[test]
    fn owner_viewing_other_member_gets_manage_menu() {
        let action = classify(&view(true, false, "member"));
        assert_eq!(action, MemberRowAction::ManageMenu);
    }

    #[test]
    fn non_owner_viewing_other_member_gets_capitalized_role_badge() {
        let action = classify(&view(false, false, "member"));
        assert_eq!(
            action,
            MemberRowAction::RoleBadge {
                label: "Member".to_string()
            }
        );
    }

    #[test]
    fn non_owner_viewing_self_still_gets_role_badge() {
        let action = classify(&view(false, true, "member"));
        assert_eq!(
            action,
            MemberRowAction::RoleBadge {
                label: "Member".to_string()
            }
        );
    }

    #[test]
    fn self_chip_follows_row_identity_not_ownership() {
        assert!(shows_self_chip(&view(false, true, "member")));
        assert!(shows_self_chip(&view(true, true, "owner")));
        assert!(!shows_self_chip(&view(true, false, "member")));
    }

    #[test]
    fn capitalize_touches_only_the_first_character() {
        assert_eq!(capitalize("member"), "Member");
        assert_eq!(capitalize("OWNER"), "OWNER");
        assert_eq!(capitalize(""), "");
    }
}
