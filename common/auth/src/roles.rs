use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role assignment carried in user records and token claims.
///
/// Serialized with the `role` tag so a diner assignment is `{"role":"diner"}`
/// and a franchisee assignment carries the franchise it applies to as
/// `{"role":"franchisee","objectId":"..."}`. A franchisee role without a
/// franchise id is unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Role {
    Diner,
    Admin,
    Franchisee {
        #[serde(rename = "objectId")]
        object_id: Uuid,
    },
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// The franchise this assignment grants authority over, if any.
    pub fn franchise_scope(&self) -> Option<Uuid> {
        match self {
            Role::Franchisee { object_id } => Some(*object_id),
            _ => None,
        }
    }
}
