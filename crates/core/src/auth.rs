use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Prefix carried by granted authority labels (`ROLE_ADMIN`, `ROLE_TEACHER_MATH`).
pub const AUTHORITY_PREFIX: &str = "ROLE_";

/// Coarse permission level of a caller.
///
/// Variants are declared from most to least privileged so the derived
/// ordering ranks `Admin` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    /// Full administrative access.
    Admin,
    /// Staff access, optionally restricted to one discipline.
    Teacher,
    /// Student or default account.
    User,
}

impl Tier {
    /// Returns the bare tier name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Teacher => "TEACHER",
            Self::User => "USER",
        }
    }

    /// Returns the granted authority label for this tier.
    #[must_use]
    pub fn authority(&self) -> String {
        format!("{AUTHORITY_PREFIX}{}", self.as_str())
    }

    /// Parses an exact tier name, with or without the authority prefix.
    #[must_use]
    pub fn from_label(value: &str) -> Option<Self> {
        let normalized = value.trim().to_uppercase();
        let bare = normalized
            .strip_prefix(AUTHORITY_PREFIX)
            .unwrap_or(normalized.as_str());

        match bare {
            "ADMIN" => Some(Self::Admin),
            "TEACHER" => Some(Self::Teacher),
            "USER" => Some(Self::User),
            _ => None,
        }
    }
}

impl Display for Tier {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Effective role of an authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Administrator.
    Admin,
    /// Teacher, restricted to `subject` when one is known.
    Teacher {
        /// Discipline the teacher may grade and view.
        subject: Option<String>,
    },
    /// Student or default account.
    User,
}

impl Role {
    /// Returns the base tier of the role.
    #[must_use]
    pub fn tier(&self) -> Tier {
        match self {
            Self::Admin => Tier::Admin,
            Self::Teacher { .. } => Tier::Teacher,
            Self::User => Tier::User,
        }
    }

    /// Returns the teacher's discipline scope. Always `None` for other tiers.
    #[must_use]
    pub fn scope_subject(&self) -> Option<&str> {
        match self {
            Self::Teacher { subject } => subject
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty()),
            Self::Admin | Self::User => None,
        }
    }
}

/// Request-scoped identity produced by the authentication filter.
///
/// Built once per request and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    subject_id: String,
    role: Role,
    granted_tiers: BTreeSet<Tier>,
    authorities: Vec<String>,
    group_id: Option<String>,
}

impl Identity {
    /// Creates an identity. The role's own tier is always part of the granted set.
    #[must_use]
    pub fn new(
        subject_id: impl Into<String>,
        role: Role,
        granted_tiers: impl IntoIterator<Item = Tier>,
        authorities: Vec<String>,
        group_id: Option<String>,
    ) -> Self {
        let mut granted_tiers: BTreeSet<Tier> = granted_tiers.into_iter().collect();
        granted_tiers.insert(role.tier());

        Self {
            subject_id: subject_id.into(),
            role,
            granted_tiers,
            authorities,
            group_id: group_id.filter(|value| !value.trim().is_empty()),
        }
    }

    /// Returns the subject identifier (user id) the identity was issued for.
    #[must_use]
    pub fn subject_id(&self) -> &str {
        self.subject_id.as_str()
    }

    /// Returns the effective role.
    #[must_use]
    pub fn role(&self) -> &Role {
        &self.role
    }

    /// Returns the effective (highest) tier.
    #[must_use]
    pub fn tier(&self) -> Tier {
        self.role.tier()
    }

    /// Returns every tier granted to the identity, implied ones included.
    #[must_use]
    pub fn granted_tiers(&self) -> &BTreeSet<Tier> {
        &self.granted_tiers
    }

    /// Returns whether the tier was granted directly or by implication.
    #[must_use]
    pub fn has_tier(&self, tier: Tier) -> bool {
        self.granted_tiers.contains(&tier)
    }

    /// Returns the teacher's discipline scope, if any.
    #[must_use]
    pub fn scope_subject(&self) -> Option<&str> {
        self.role.scope_subject()
    }

    /// Returns the caller's group, if any.
    #[must_use]
    pub fn group_id(&self) -> Option<&str> {
        self.group_id.as_deref()
    }

    /// Returns the granted authority labels in grant order.
    #[must_use]
    pub fn authorities(&self) -> &[String] {
        self.authorities.as_slice()
    }

    /// Returns the authority labels joined for the `roles` token claim.
    #[must_use]
    pub fn roles_claim(&self) -> String {
        self.authorities.join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::{Identity, Role, Tier};

    #[test]
    fn tier_parses_prefixed_and_bare_labels() {
        assert_eq!(Tier::from_label("ROLE_ADMIN"), Some(Tier::Admin));
        assert_eq!(Tier::from_label(" teacher "), Some(Tier::Teacher));
        assert_eq!(Tier::from_label("ROLE_TEACHER_MATH"), None);
    }

    #[test]
    fn admin_ranks_above_teacher_and_user() {
        assert!(Tier::Admin < Tier::Teacher);
        assert!(Tier::Teacher < Tier::User);
    }

    #[test]
    fn blank_teacher_subject_counts_as_unscoped() {
        let role = Role::Teacher {
            subject: Some("  ".to_owned()),
        };
        assert_eq!(role.scope_subject(), None);
    }

    #[test]
    fn identity_always_grants_its_own_tier() {
        let identity = Identity::new(
            "u-1",
            Role::Teacher { subject: None },
            [],
            vec!["ROLE_TEACHER".to_owned()],
            Some(String::new()),
        );

        assert!(identity.has_tier(Tier::Teacher));
        assert!(!identity.has_tier(Tier::Admin));
        assert_eq!(identity.group_id(), None);
        assert_eq!(identity.roles_claim(), "ROLE_TEACHER");
    }
}
