use uuid::Uuid;

use crate::claims::Claims;

/// Everything a permission-gated route can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ViewUser,
    UpdateUser,
    DeleteUser,
    ListUsers,
    ViewUserOrders,
    ViewUserFranchises,
    CreateFranchise,
    DeleteFranchise,
    CreateStore,
    DeleteStore,
    EditMenu,
}

impl Action {
    /// Actions a caller may perform on their own records without any
    /// privileged role.
    fn self_scoped(self) -> bool {
        matches!(
            self,
            Action::ViewUser
                | Action::UpdateUser
                | Action::ViewUserOrders
                | Action::ViewUserFranchises
        )
    }

    /// Actions a franchisee may perform within their own franchise.
    fn franchise_scoped(self) -> bool {
        matches!(
            self,
            Action::DeleteFranchise | Action::CreateStore | Action::DeleteStore
        )
    }
}

/// The resource an action is aimed at. Absent fields simply never match the
/// corresponding rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct Target {
    pub owner_id: Option<Uuid>,
    pub franchise_id: Option<Uuid>,
}

impl Target {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn owner(id: Uuid) -> Self {
        Self {
            owner_id: Some(id),
            franchise_id: None,
        }
    }

    pub fn franchise(id: Uuid) -> Self {
        Self {
            owner_id: None,
            franchise_id: Some(id),
        }
    }
}

/// Pure decision function. Rules are evaluated in a fixed order and the first
/// match wins: admin, then self scope, then franchise scope, then deny.
pub fn can_act(claims: &Claims, action: Action, target: &Target) -> bool {
    if claims.is_admin() {
        return true;
    }

    if action.self_scoped() && target.owner_id == Some(claims.sub) {
        return true;
    }

    if action.franchise_scoped() {
        if let Some(franchise_id) = target.franchise_id {
            return claims.has_franchise(franchise_id);
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::Role;

    const ALL_ACTIONS: &[Action] = &[
        Action::ViewUser,
        Action::UpdateUser,
        Action::DeleteUser,
        Action::ListUsers,
        Action::ViewUserOrders,
        Action::ViewUserFranchises,
        Action::CreateFranchise,
        Action::DeleteFranchise,
        Action::CreateStore,
        Action::DeleteStore,
        Action::EditMenu,
    ];

    fn identity(roles: Vec<Role>) -> Claims {
        Claims {
            sub: Uuid::new_v4(),
            name: "caller".to_string(),
            email: "caller@test.com".to_string(),
            roles,
            iat: 0,
            exp: i64::MAX,
            jti: Uuid::new_v4(),
        }
    }

    #[test]
    fn admin_is_permitted_everything() {
        let admin = identity(vec![Role::Admin]);
        let franchise = Uuid::new_v4();
        for &action in ALL_ACTIONS {
            assert!(can_act(&admin, action, &Target::none()), "{action:?}");
            assert!(
                can_act(&admin, action, &Target::franchise(franchise)),
                "{action:?}"
            );
            assert!(
                can_act(&admin, action, &Target::owner(Uuid::new_v4())),
                "{action:?}"
            );
        }
    }

    #[test]
    fn self_scope_matches_owner_only() {
        let diner = identity(vec![Role::Diner]);
        for action in [
            Action::ViewUser,
            Action::UpdateUser,
            Action::ViewUserOrders,
            Action::ViewUserFranchises,
        ] {
            assert!(can_act(&diner, action, &Target::owner(diner.sub)));
            assert!(!can_act(&diner, action, &Target::owner(Uuid::new_v4())));
            assert!(!can_act(&diner, action, &Target::none()));
        }
    }

    #[test]
    fn owner_match_does_not_leak_into_admin_actions() {
        let diner = identity(vec![Role::Diner]);
        for action in [
            Action::DeleteUser,
            Action::ListUsers,
            Action::CreateFranchise,
            Action::EditMenu,
        ] {
            assert!(!can_act(&diner, action, &Target::owner(diner.sub)));
        }
    }

    #[test]
    fn franchisee_is_scoped_to_their_franchise() {
        let franchise = Uuid::new_v4();
        let other = Uuid::new_v4();
        let franchisee = identity(vec![
            Role::Diner,
            Role::Franchisee {
                object_id: franchise,
            },
        ]);

        for action in [Action::CreateStore, Action::DeleteStore, Action::DeleteFranchise] {
            assert!(can_act(&franchisee, action, &Target::franchise(franchise)));
            assert!(!can_act(&franchisee, action, &Target::franchise(other)));
            assert!(!can_act(&franchisee, action, &Target::none()));
        }
    }

    #[test]
    fn franchise_scope_does_not_grant_admin_actions() {
        let franchise = Uuid::new_v4();
        let franchisee = identity(vec![Role::Franchisee {
            object_id: franchise,
        }]);

        assert!(!can_act(
            &franchisee,
            Action::CreateFranchise,
            &Target::none()
        ));
        assert!(!can_act(&franchisee, Action::ListUsers, &Target::none()));
        assert!(!can_act(&franchisee, Action::EditMenu, &Target::none()));
    }

    #[test]
    fn one_qualifying_role_is_enough() {
        let franchise = Uuid::new_v4();
        let mixed = identity(vec![
            Role::Franchisee {
                object_id: Uuid::new_v4(),
            },
            Role::Franchisee {
                object_id: franchise,
            },
        ]);
        assert!(can_act(
            &mixed,
            Action::CreateStore,
            &Target::franchise(franchise)
        ));
    }

    #[test]
    fn empty_role_set_is_denied_everything_but_self() {
        let bare = identity(vec![]);
        assert!(can_act(&bare, Action::ViewUser, &Target::owner(bare.sub)));
        assert!(!can_act(&bare, Action::CreateFranchise, &Target::none()));
        assert!(!can_act(
            &bare,
            Action::CreateStore,
            &Target::franchise(Uuid::new_v4())
        ));
    }
}
