//! Role authorization policy for back-office team management.
//!
//! Privilege is ordered `admin` > `lead_moderator` > `moderator`. Every call
//! site that creates or removes a team member consults the functions here and
//! applies its mutation only on [`Decision::Allow`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{AppError, Result};

/// Back-office role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    LeadModerator,
    Moderator,
}

impl Role {
    #[cfg(test)]
    pub const ALL: [Role; 3] = [Role::Admin, Role::LeadModerator, Role::Moderator];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::LeadModerator => "lead_moderator",
            Role::Moderator => "moderator",
        }
    }

    /// Parse a stored role, degrading unknown values to the least privileged role
    pub fn from_stored(s: &str) -> Self {
        s.parse().unwrap_or(Role::Moderator)
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "lead_moderator" => Ok(Role::LeadModerator),
            "moderator" => Ok(Role::Moderator),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a policy check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(&'static str),
}

impl Decision {
    #[cfg(test)]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// Convert a denial into a 403
    pub fn into_result(self) -> Result<()> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(AppError::Forbidden(reason.to_string())),
        }
    }
}

/// Identity and role of a team member as seen by the policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Member {
    pub id: i64,
    pub role: Role,
}

pub fn can_create(creator: Role, target: Role) -> Decision {
    match (creator, target) {
        (Role::Admin, _) => Decision::Allow,
        (Role::LeadModerator, Role::Moderator) => Decision::Allow,
        (Role::LeadModerator, _) => Decision::Deny("Lead Moderators can only create Moderators."),
        (Role::Moderator, _) => Decision::Deny("Moderators cannot create users."),
    }
}

pub fn can_delete(deleter: Member, target: Member) -> Decision {
    if deleter.id == target.id {
        return Decision::Deny("You cannot delete yourself.");
    }

    match (deleter.role, target.role) {
        (Role::Admin, _) => Decision::Allow,
        (Role::LeadModerator, Role::Moderator) => Decision::Allow,
        (Role::LeadModerator, _) => Decision::Deny("You can only delete Moderators."),
        (Role::Moderator, _) => Decision::Deny("Unauthorized action."),
    }
}

pub fn can_approve_withdrawals(role: Role) -> bool {
    matches!(role, Role::Admin | Role::LeadModerator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_table() {
        for target in Role::ALL {
            assert_eq!(can_create(Role::Admin, target), Decision::Allow);
            assert!(!can_create(Role::Moderator, target).is_allowed());
        }

        assert_eq!(
            can_create(Role::LeadModerator, Role::Moderator),
            Decision::Allow
        );
        assert_eq!(
            can_create(Role::LeadModerator, Role::LeadModerator),
            Decision::Deny("Lead Moderators can only create Moderators.")
        );
        assert_eq!(
            can_create(Role::LeadModerator, Role::Admin),
            Decision::Deny("Lead Moderators can only create Moderators.")
        );
        assert_eq!(
            can_create(Role::Moderator, Role::Moderator),
            Decision::Deny("Moderators cannot create users.")
        );
    }

    #[test]
    fn delete_table() {
        let member = |id, role| Member { id, role };

        for deleter in Role::ALL {
            for target in Role::ALL {
                let expected = match (deleter, target) {
                    (Role::Admin, _) => true,
                    (Role::LeadModerator, Role::Moderator) => true,
                    _ => false,
                };
                assert_eq!(
                    can_delete(member(1, deleter), member(2, target)).is_allowed(),
                    expected,
                    "{deleter} deleting {target}"
                );
            }
        }

        assert_eq!(
            can_delete(member(1, Role::LeadModerator), member(2, Role::Admin)),
            Decision::Deny("You can only delete Moderators.")
        );
        assert_eq!(
            can_delete(member(1, Role::Moderator), member(2, Role::Moderator)),
            Decision::Deny("Unauthorized action.")
        );
    }

    #[test]
    fn self_delete_is_always_denied() {
        for role in Role::ALL {
            let me = Member { id: 7, role };
            assert_eq!(
                can_delete(me, me),
                Decision::Deny("You cannot delete yourself.")
            );
        }
    }

    #[test]
    fn withdrawal_approval() {
        assert!(can_approve_withdrawals(Role::Admin));
        assert!(can_approve_withdrawals(Role::LeadModerator));
        assert!(!can_approve_withdrawals(Role::Moderator));
    }

    #[test]
    fn unknown_stored_role_is_least_privileged() {
        assert_eq!(Role::from_stored("lead_moderator"), Role::LeadModerator);
        assert_eq!(Role::from_stored("superuser"), Role::Moderator);
        assert!("Admin".parse::<Role>().is_err());
    }

    #[test]
    fn denial_maps_to_forbidden() {
        let err = Decision::Deny("nope").into_result().unwrap_err();
        assert!(matches!(err, AppError::Forbidden(msg) if msg == "nope"));
    }
}
