//! Authorization policy shared by every service.
//!
//! Rules are evaluated in order, first match wins:
//!
//! 1. no principal: `Deny(Unauthorized)`
//! 2. admin or staff: `Allow`, except `ChangeRole` which only admins hold
//! 3. owner of the row: the per-resource owner rights below
//! 4. anything else: `Deny(Forbidden)`
use uuid::Uuid;

use crate::{
    api::error,
    modules::{invoice::schema::InvoiceStatus, profile::schema::UserRole},
};

/// An authenticated caller with its resolved role.
///
/// `role` is `None` when the caller has no profile row; such a caller only
/// ever gets owner rights.
#[derive(Debug, Clone, PartialEq)]
pub struct Principal {
    pub id: Uuid,
    pub email: String,
    pub role: Option<UserRole>,
}

impl Principal {
    pub fn is_elevated(&self) -> bool {
        self.role.is_some_and(|r| r.is_elevated())
    }

    pub fn is_admin(&self) -> bool {
        self.role == Some(UserRole::Admin)
    }

    pub fn is_client(&self) -> bool {
        self.role == Some(UserRole::Client)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
    /// Set or clear a conversation's assigned admin.
    Assign,
    ChangeRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Profile { owner_id: Uuid },
    Conversation { client_id: Uuid, admin_id: Option<Uuid> },
    Invoice { client_id: Uuid, status: InvoiceStatus },
    File { owner_id: Uuid },
    Idea { submitted_by: Uuid },
    /// The inquiry and idea inboxes as a whole.
    Submissions,
    /// Listing every profile.
    Directory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    Unauthorized,
    Forbidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// Reports a denial as-is.
    pub fn into_result(self) -> Result<(), error::SystemError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(DenyReason::Unauthorized) => {
                Err(error::SystemError::unauthorized("Unauthorized"))
            }
            Decision::Deny(DenyReason::Forbidden) => Err(error::SystemError::forbidden("Forbidden")),
        }
    }

    /// Reports a forbidden row as missing so callers cannot discover which ids exist.
    pub fn conceal(self, what: &'static str) -> Result<(), error::SystemError> {
        match self {
            Decision::Deny(DenyReason::Forbidden) => {
                Err(error::SystemError::not_found(format!("{what} not found")))
            }
            other => other.into_result(),
        }
    }
}

pub fn authorize(principal: Option<&Principal>, resource: &Resource, action: Action) -> Decision {
    let Some(principal) = principal else {
        return Decision::Deny(DenyReason::Unauthorized);
    };

    if principal.is_elevated() {
        if action == Action::ChangeRole && !principal.is_admin() {
            return Decision::Deny(DenyReason::Forbidden);
        }
        return Decision::Allow;
    }

    if owner_allows(principal.id, resource, action) {
        return Decision::Allow;
    }

    Decision::Deny(DenyReason::Forbidden)
}

fn owner_allows(id: Uuid, resource: &Resource, action: Action) -> bool {
    match *resource {
        Resource::Profile { owner_id } => {
            owner_id == id && matches!(action, Action::Read | Action::Update)
        }
        Resource::Conversation { client_id, admin_id } => {
            let party = client_id == id || admin_id == Some(id);
            // Create here means posting a message into the thread.
            party && matches!(action, Action::Read | Action::Update | Action::Create)
        }
        Resource::Invoice { client_id, status } => {
            client_id == id && status != InvoiceStatus::Draft && action == Action::Read
        }
        Resource::File { owner_id } => {
            owner_id == id && matches!(action, Action::Read | Action::Update | Action::Delete)
        }
        Resource::Idea { submitted_by } => {
            submitted_by == id && matches!(action, Action::Read | Action::Create)
        }
        Resource::Submissions | Resource::Directory => false,
    }
}

/// Shorthand for services: authorize and surface the denial unchanged.
pub fn require(
    principal: &Principal,
    resource: &Resource,
    action: Action,
) -> Result<(), error::SystemError> {
    authorize(Some(principal), resource, action).into_result()
}

/// Shorthand for services: authorize and report forbidden rows as missing.
pub fn require_visible(
    principal: &Principal,
    resource: &Resource,
    action: Action,
    what: &'static str,
) -> Result<(), error::SystemError> {
    authorize(Some(principal), resource, action).conceal(what)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(role: Option<UserRole>) -> Principal {
        Principal { id: Uuid::now_v7(), email: "p@example.com".into(), role }
    }

    const ALL_ACTIONS: [Action; 6] = [
        Action::Read,
        Action::Create,
        Action::Update,
        Action::Delete,
        Action::Assign,
        Action::ChangeRole,
    ];

    #[test]
    fn anonymous_is_unauthorized_everywhere() {
        let resource = Resource::Profile { owner_id: Uuid::now_v7() };
        for action in ALL_ACTIONS {
            assert_eq!(
                authorize(None, &resource, action),
                Decision::Deny(DenyReason::Unauthorized)
            );
        }
    }

    #[test]
    fn admin_may_do_everything() {
        let admin = principal(Some(UserRole::Admin));
        let other = Uuid::now_v7();
        for action in ALL_ACTIONS {
            assert!(authorize(Some(&admin), &Resource::Profile { owner_id: other }, action)
                .is_allowed());
        }
    }

    #[test]
    fn staff_cannot_reassign_roles() {
        let staff = principal(Some(UserRole::Staff));
        let resource = Resource::Profile { owner_id: Uuid::now_v7() };
        assert!(authorize(Some(&staff), &resource, Action::Update).is_allowed());
        assert_eq!(
            authorize(Some(&staff), &resource, Action::ChangeRole),
            Decision::Deny(DenyReason::Forbidden)
        );
    }

    #[test]
    fn client_owns_profile_but_not_its_role() {
        let client = principal(Some(UserRole::Client));
        let own = Resource::Profile { owner_id: client.id };
        assert!(authorize(Some(&client), &own, Action::Read).is_allowed());
        assert!(authorize(Some(&client), &own, Action::Update).is_allowed());
        assert!(!authorize(Some(&client), &own, Action::ChangeRole).is_allowed());
        assert!(!authorize(Some(&client), &own, Action::Delete).is_allowed());

        let foreign = Resource::Profile { owner_id: Uuid::now_v7() };
        assert_eq!(
            authorize(Some(&client), &foreign, Action::Read),
            Decision::Deny(DenyReason::Forbidden)
        );
    }

    #[test]
    fn conversation_parties_can_post_but_not_assign() {
        let client = principal(Some(UserRole::Client));
        let conversation = Resource::Conversation { client_id: client.id, admin_id: None };
        assert!(authorize(Some(&client), &conversation, Action::Create).is_allowed());
        assert!(!authorize(Some(&client), &conversation, Action::Assign).is_allowed());

        let stranger = principal(Some(UserRole::Client));
        assert!(!authorize(Some(&stranger), &conversation, Action::Read).is_allowed());
    }

    #[test]
    fn clients_never_see_draft_invoices() {
        let client = principal(Some(UserRole::Client));
        let draft = Resource::Invoice { client_id: client.id, status: InvoiceStatus::Draft };
        let sent = Resource::Invoice { client_id: client.id, status: InvoiceStatus::Sent };
        assert!(!authorize(Some(&client), &draft, Action::Read).is_allowed());
        assert!(authorize(Some(&client), &sent, Action::Read).is_allowed());
        assert!(!authorize(Some(&client), &sent, Action::Update).is_allowed());
    }

    #[test]
    fn missing_profile_gets_no_elevated_rights() {
        let nobody = principal(None);
        assert!(!authorize(Some(&nobody), &Resource::Submissions, Action::Read).is_allowed());
        assert!(authorize(
            Some(&nobody),
            &Resource::Profile { owner_id: nobody.id },
            Action::Read
        )
        .is_allowed());
    }

    #[test]
    fn concealed_denials_read_as_not_found() {
        let denied = Decision::Deny(DenyReason::Forbidden);
        assert!(matches!(denied.conceal("Conversation"), Err(error::SystemError::NotFound(_))));
        assert!(matches!(denied.into_result(), Err(error::SystemError::Forbidden(_))));
        assert!(matches!(
            Decision::Deny(DenyReason::Unauthorized).conceal("Conversation"),
            Err(error::SystemError::Unauthorized(_))
        ));
    }
}
