//! Trustful role/action dispatch.
//!
//! Which attestation actions a community role may take. The enforcement itself
//! lives in the attestation contract; this table only decides what the
//! event pages offer to each role.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Community role in the attestation system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Contract administrator
    Root,
    /// Event manager
    Manager,
    /// Checked-in attendee
    Villager,
    /// Connected wallet with no role
    Default,
}

/// Attestation action offered by the event pages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrustfulAction {
    /// Grant the manager role
    AssignManager,
    /// Revoke the manager role
    RevokeManager,
    /// Check a villager in
    CheckInVillager,
    /// Check a villager out
    CheckOutVillager,
    /// Attest a badge to someone
    GiveBadge,
    /// Reply to a received badge
    ReplyBadge,
    /// Open a session
    CreateSession,
    /// Close a session
    CloseSession,
    /// Revoke an attestation
    RevokeAttestation,
}

impl TrustfulAction {
    /// Every action, in menu order
    pub const ALL: [Self; 9] = [
        Self::AssignManager,
        Self::RevokeManager,
        Self::CheckInVillager,
        Self::CheckOutVillager,
        Self::GiveBadge,
        Self::ReplyBadge,
        Self::CreateSession,
        Self::CloseSession,
        Self::RevokeAttestation,
    ];
}

impl Role {
    /// Whether this role may take `action`
    #[must_use]
    pub const fn permits(self, action: TrustfulAction) -> bool {
        use TrustfulAction as A;
        match self {
            Self::Root => matches!(
                action,
                A::AssignManager | A::RevokeManager | A::RevokeAttestation
            ),
            Self::Manager => matches!(
                action,
                A::CheckInVillager
                    | A::CheckOutVillager
                    | A::GiveBadge
                    | A::ReplyBadge
                    | A::CreateSession
                    | A::CloseSession
            ),
            Self::Villager => matches!(
                action,
                A::CheckOutVillager
                    | A::GiveBadge
                    | A::ReplyBadge
                    | A::CreateSession
                    | A::CloseSession
            ),
            Self::Default => false,
        }
    }

    /// Actions this role may take, in menu order
    #[must_use]
    pub fn allowed_actions(self) -> Vec<TrustfulAction> {
        TrustfulAction::ALL
            .into_iter()
            .filter(|action| self.permits(*action))
            .collect()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Root => "ROOT",
            Self::Manager => "MANAGER",
            Self::Villager => "VILLAGER",
            Self::Default => "DEFAULT",
        };
        f.write_str(name)
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ROOT" => Ok(Self::Root),
            "MANAGER" => Ok(Self::Manager),
            "VILLAGER" => Ok(Self::Villager),
            "DEFAULT" => Ok(Self::Default),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_role_has_no_actions() {
        assert!(Role::Default.allowed_actions().is_empty());
    }

    #[test]
    fn test_root_manages_managers_only() {
        assert_eq!(
            Role::Root.allowed_actions(),
            vec![
                TrustfulAction::AssignManager,
                TrustfulAction::RevokeManager,
                TrustfulAction::RevokeAttestation,
            ]
        );
    }

    #[test]
    fn test_villager_cannot_check_in_others() {
        assert!(!Role::Villager.permits(TrustfulAction::CheckInVillager));
        assert!(Role::Villager.permits(TrustfulAction::CheckOutVillager));
        assert!(Role::Manager.permits(TrustfulAction::CheckInVillager));
    }

    #[test]
    fn test_role_parse_roundtrip() {
        for role in [Role::Root, Role::Manager, Role::Villager, Role::Default] {
            assert_eq!(role.to_string().parse::<Role>(), Ok(role));
        }
        assert_eq!("manager".parse::<Role>(), Ok(Role::Manager));
        assert!("mayor".parse::<Role>().is_err());
    }
}
