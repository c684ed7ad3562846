/// Authorization rules for FarmHub resources
///
/// One capability check (subject + action + resource -> allow/deny)
/// replaces per-resource permission classes. All role and ownership rules
/// live in this module; handlers only supply the facts.
///
/// # Permission Model
///
/// - **Admin** (staff): full access to everything.
/// - **Agent**: full access to farms and farmers; like any authenticated
///   user elsewhere.
/// - **Farmer**: read access plus writes scoped to what they own: their
///   cows, those cows' milk records, their activities.
/// - **Unassigned**: read-only on most resources.
///
/// Collection-level checks (`allows`) gate route entry; object-level
/// checks (`allows_object`) add ownership facts from the loaded row.
/// Listing visibility (a farmer seeing only their own herd) is enforced by
/// query scoping in the models, not here.
///
/// # Example
///
/// ```
/// use farmhub_shared::auth::authorization::{allows, Action, ResourceKind};
/// use farmhub_shared::auth::middleware::AuthContext;
/// use farmhub_shared::models::user::UserRole;
/// use uuid::Uuid;
///
/// let agent = AuthContext {
///     user_id: Uuid::new_v4(),
///     role: UserRole::Agent,
///     farmer: None,
/// };
///
/// assert!(allows(&agent, Action::Create, ResourceKind::Farm));
/// assert!(!allows(&agent, Action::Create, ResourceKind::Agent));
/// ```

use uuid::Uuid;

use super::middleware::AuthContext;
use crate::models::user::UserRole;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// The subject may not perform this action
    #[error("{0}")]
    Forbidden(String),
}

/// Client-facing denial message for a failed check
fn denial_message(action: Action, kind: ResourceKind) -> String {
    match (action, kind) {
        (Action::Create, ResourceKind::Cow) => {
            "Only admin, agents, and farmers can create cows.".to_string()
        }
        (Action::Create, ResourceKind::MilkRecord) => {
            "Only admin, agents, and farmers can create milk records.".to_string()
        }
        (Action::Create, ResourceKind::Activity) => {
            "Only admin, agents, and farmers can create activities.".to_string()
        }
        (Action::Create, ResourceKind::Farmer) => {
            "Only admin and agents can create farmers.".to_string()
        }
        _ => "You do not have permission to perform this action.".to_string(),
    }
}

/// What the subject is trying to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

impl Action {
    /// Anything that mutates state
    pub fn is_write(&self) -> bool {
        !matches!(self, Action::Read)
    }
}

/// The resource type being acted on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Farm,
    Farmer,
    Agent,
    Cow,
    MilkRecord,
    Activity,
}

/// Ownership facts for object-level checks, read off the loaded row
#[derive(Debug, Clone, Copy, Default)]
pub struct OwnershipFacts {
    /// `created_by` of the row
    pub created_by: Option<Uuid>,

    /// The user who owns the row through the farmer chain:
    /// `farmer.user`, `cow.farmer.user`, or `activity.farmer.user`
    pub owner_user: Option<Uuid>,
}

/// Collection-level rule: may `auth` perform `action` on resources of `kind`?
///
/// Callers are already authenticated (the middleware rejects anonymous
/// requests), so `Read` is allowed everywhere except the admin-only agent
/// registry.
pub fn allows(auth: &AuthContext, action: Action, kind: ResourceKind) -> bool {
    if auth.role.is_admin() {
        return true;
    }

    match kind {
        ResourceKind::Farm | ResourceKind::Farmer => {
            !action.is_write() || auth.role.is_agent()
        }
        ResourceKind::Agent => false,
        ResourceKind::Cow | ResourceKind::MilkRecord | ResourceKind::Activity => match action {
            Action::Read => true,
            // Creation needs a farmer profile; further create-side rules
            // (forced self-assignment, foreign-cow rejection) live in the
            // handlers that know the payload.
            Action::Create => auth.has_farmer_profile(),
            // Ownership decides; checked per object.
            Action::Update | Action::Delete => true,
        },
    }
}

/// Object-level rule, with ownership facts from the loaded row
pub fn allows_object(
    auth: &AuthContext,
    action: Action,
    kind: ResourceKind,
    facts: &OwnershipFacts,
) -> bool {
    if !action.is_write() {
        return true;
    }
    if auth.role.is_admin() {
        return true;
    }

    let is_creator = facts.created_by == Some(auth.user_id);
    let is_owner = facts.owner_user == Some(auth.user_id);

    match kind {
        ResourceKind::Farm | ResourceKind::Farmer => auth.role.is_agent(),
        ResourceKind::Agent => false,
        ResourceKind::Cow | ResourceKind::MilkRecord => is_creator || is_owner,
        ResourceKind::Activity => {
            if auth.role.is_agent() {
                return true;
            }
            if auth.role.is_farmer() {
                return is_owner;
            }
            is_creator
        }
    }
}

/// Collection-level check returning the API-facing error
pub fn require(auth: &AuthContext, action: Action, kind: ResourceKind) -> Result<(), AuthzError> {
    if allows(auth, action, kind) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(denial_message(action, kind)))
    }
}

/// Object-level check returning the API-facing error
pub fn require_object(
    auth: &AuthContext,
    action: Action,
    kind: ResourceKind,
    facts: &OwnershipFacts,
) -> Result<(), AuthzError> {
    if allows_object(auth, action, kind, facts) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(denial_message(action, kind)))
    }
}

/// Gate for a cow's milk-record collection
///
/// Admins and agents reach any cow's records; a farmer only their own
/// cows'; unassigned users none at all.
pub fn require_cow_records_access(
    auth: &AuthContext,
    cow_owner_user: Uuid,
) -> Result<(), AuthzError> {
    let allowed = match auth.role {
        UserRole::Admin | UserRole::Agent => true,
        UserRole::Farmer => cow_owner_user == auth.user_id,
        UserRole::Unassigned => false,
    };

    if allowed {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(
            "You can only access milk records for your own cows".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::middleware::FarmerIdentity;

    fn subject(role: UserRole, with_profile: bool) -> AuthContext {
        AuthContext {
            user_id: Uuid::new_v4(),
            role,
            farmer: with_profile.then(|| FarmerIdentity {
                farmer_id: Uuid::new_v4(),
                farm_id: Uuid::new_v4(),
            }),
        }
    }

    #[test]
    fn test_admin_allowed_everywhere() {
        let admin = subject(UserRole::Admin, false);
        for kind in [
            ResourceKind::Farm,
            ResourceKind::Farmer,
            ResourceKind::Agent,
            ResourceKind::Cow,
            ResourceKind::MilkRecord,
            ResourceKind::Activity,
        ] {
            assert!(allows(&admin, Action::Create, kind));
            assert!(allows_object(
                &admin,
                Action::Delete,
                kind,
                &OwnershipFacts::default()
            ));
        }
    }

    #[test]
    fn test_farm_writes_limited_to_admin_and_agent() {
        assert!(allows(&subject(UserRole::Agent, false), Action::Create, ResourceKind::Farm));
        assert!(!allows(&subject(UserRole::Farmer, true), Action::Create, ResourceKind::Farm));
        assert!(!allows(
            &subject(UserRole::Unassigned, false),
            Action::Delete,
            ResourceKind::Farm
        ));
        assert!(allows(&subject(UserRole::Farmer, true), Action::Read, ResourceKind::Farm));
    }

    #[test]
    fn test_agent_registry_is_admin_only() {
        assert!(!allows(&subject(UserRole::Agent, false), Action::Read, ResourceKind::Agent));
        assert!(allows(&subject(UserRole::Admin, false), Action::Read, ResourceKind::Agent));
    }

    #[test]
    fn test_cow_create_needs_farmer_profile() {
        assert!(allows(&subject(UserRole::Farmer, true), Action::Create, ResourceKind::Cow));
        assert!(!allows(
            &subject(UserRole::Unassigned, false),
            Action::Create,
            ResourceKind::Cow
        ));
        // Agents have no farmer profile and no herd of their own
        assert!(!allows(&subject(UserRole::Agent, false), Action::Create, ResourceKind::Cow));
    }

    #[test]
    fn test_cow_object_write_for_owner_and_creator() {
        let farmer = subject(UserRole::Farmer, true);

        let own = OwnershipFacts {
            created_by: None,
            owner_user: Some(farmer.user_id),
        };
        assert!(allows_object(&farmer, Action::Update, ResourceKind::Cow, &own));

        let created = OwnershipFacts {
            created_by: Some(farmer.user_id),
            owner_user: None,
        };
        assert!(allows_object(&farmer, Action::Update, ResourceKind::Cow, &created));

        let foreign = OwnershipFacts {
            created_by: Some(Uuid::new_v4()),
            owner_user: Some(Uuid::new_v4()),
        };
        assert!(!allows_object(&farmer, Action::Delete, ResourceKind::Cow, &foreign));
    }

    #[test]
    fn test_activity_object_rules() {
        let agent = subject(UserRole::Agent, false);
        let foreign = OwnershipFacts {
            created_by: Some(Uuid::new_v4()),
            owner_user: Some(Uuid::new_v4()),
        };
        assert!(allows_object(&agent, Action::Update, ResourceKind::Activity, &foreign));

        let farmer = subject(UserRole::Farmer, true);
        assert!(!allows_object(&farmer, Action::Update, ResourceKind::Activity, &foreign));

        let own = OwnershipFacts {
            created_by: None,
            owner_user: Some(farmer.user_id),
        };
        assert!(allows_object(&farmer, Action::Update, ResourceKind::Activity, &own));

        let creator = subject(UserRole::Unassigned, false);
        let created = OwnershipFacts {
            created_by: Some(creator.user_id),
            owner_user: None,
        };
        assert!(allows_object(&creator, Action::Update, ResourceKind::Activity, &created));
    }

    #[test]
    fn test_cow_records_gate() {
        let owner = Uuid::new_v4();

        assert!(require_cow_records_access(&subject(UserRole::Admin, false), owner).is_ok());
        assert!(require_cow_records_access(&subject(UserRole::Agent, false), owner).is_ok());

        let mut farmer = subject(UserRole::Farmer, true);
        assert!(require_cow_records_access(&farmer, owner).is_err());
        farmer.user_id = owner;
        assert!(require_cow_records_access(&farmer, owner).is_ok());

        assert!(require_cow_records_access(&subject(UserRole::Unassigned, false), owner).is_err());
    }
}
