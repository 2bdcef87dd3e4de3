//! Pure authorization-for-display decisions.
//!
//! Every role check the components need lives here, so the rules are
//! testable independent of rendering. These gates are a usability
//! affordance mirrored by the server, not a security boundary: the server
//! re-checks every mutation.

use crate::types::TeamRole;

/// An action one member row can offer against another (or the viewer's own).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberAction {
    /// Raise the target to Admin.
    Promote,
    /// Lower the target to Member.
    Demote,
    /// Remove the target from the team.
    Remove,
    /// Leave the team: the viewer acting on their own row. Distinct from
    /// `Remove` even though both hit the same deletion endpoint.
    Leave,
}

/// Decides whether `viewer` may perform `action` against a member row of
/// role `target`; `is_self` marks the viewer's own row.
pub fn can_perform(
    viewer: TeamRole,
    action: MemberAction,
    target: TeamRole,
    is_self: bool,
) -> bool {
    match action {
        MemberAction::Promote | MemberAction::Demote => viewer == TeamRole::Owner && !is_self,
        MemberAction::Remove => {
            if is_self || target == TeamRole::Owner {
                return false;
            }
            match viewer {
                TeamRole::Owner => true,
                TeamRole::Admin => target == TeamRole::Member,
                TeamRole::Member => false,
            }
        }
        MemberAction::Leave => is_self,
    }
}

/// Renaming the team requires Admin or Owner.
pub fn can_rename_team(viewer: TeamRole) -> bool {
    matches!(viewer, TeamRole::Owner | TeamRole::Admin)
}

/// The danger zone section is visible to Admin and Owner.
pub fn can_view_danger_zone(viewer: TeamRole) -> bool {
    matches!(viewer, TeamRole::Owner | TeamRole::Admin)
}

/// Deleting the team is Owner-only.
pub fn can_delete_team(viewer: TeamRole) -> bool {
    viewer == TeamRole::Owner
}

/// Inviting, revoking and resending invitations requires Admin or Owner.
pub fn can_manage_invitations(viewer: TeamRole) -> bool {
    matches!(viewer, TeamRole::Owner | TeamRole::Admin)
}

/// Creating and revoking service keys requires Admin or Owner.
pub fn can_manage_keys(viewer: TeamRole) -> bool {
    matches!(viewer, TeamRole::Owner | TeamRole::Admin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use TeamRole::{Admin, Member, Owner};

    #[test]
    fn test_promote_demote_owner_only() {
        for action in [MemberAction::Promote, MemberAction::Demote] {
            assert!(can_perform(Owner, action, Member, false));
            assert!(can_perform(Owner, action, Admin, false));
            assert!(!can_perform(Owner, action, Member, true));
            assert!(!can_perform(Admin, action, Member, false));
            assert!(!can_perform(Member, action, Member, false));
        }
    }

    #[test]
    fn test_remove_never_self_never_owner() {
        assert!(!can_perform(Owner, MemberAction::Remove, Owner, true));
        assert!(!can_perform(Admin, MemberAction::Remove, Admin, true));
        assert!(!can_perform(Owner, MemberAction::Remove, Owner, false));
        assert!(!can_perform(Admin, MemberAction::Remove, Owner, false));
    }

    #[test]
    fn test_owner_removes_anyone_else() {
        assert!(can_perform(Owner, MemberAction::Remove, Admin, false));
        assert!(can_perform(Owner, MemberAction::Remove, Member, false));
    }

    #[test]
    fn test_admin_removes_plain_members_only() {
        assert!(can_perform(Admin, MemberAction::Remove, Member, false));
        assert!(!can_perform(Admin, MemberAction::Remove, Admin, false));
    }

    #[test]
    fn test_member_removes_nobody() {
        assert!(!can_perform(Member, MemberAction::Remove, Member, false));
    }

    #[test]
    fn test_leave_is_self_only_any_role() {
        for viewer in [Owner, Admin, Member] {
            assert!(can_perform(viewer, MemberAction::Leave, viewer, true));
            assert!(!can_perform(viewer, MemberAction::Leave, Member, false));
        }
    }

    #[test]
    fn test_rename_gate() {
        assert!(can_rename_team(Owner));
        assert!(can_rename_team(Admin));
        assert!(!can_rename_team(Member));
    }

    #[test]
    fn test_danger_zone_vs_delete() {
        // Admins see the danger zone but only the owner may delete.
        assert!(can_view_danger_zone(Admin));
        assert!(can_view_danger_zone(Owner));
        assert!(!can_view_danger_zone(Member));

        assert!(can_delete_team(Owner));
        assert!(!can_delete_team(Admin));
        assert!(!can_delete_team(Member));
    }

    #[test]
    fn test_invitation_and_key_management() {
        for gate in [can_manage_invitations, can_manage_keys] {
            assert!(gate(Owner));
            assert!(gate(Admin));
            assert!(!gate(Member));
        }
    }
}
