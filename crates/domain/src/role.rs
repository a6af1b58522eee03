//! Role resolution from free-text role strings.
//!
//! Stored roles are free text (`ADMIN`, `teacher`, `ROLE_TEACHER_MATH`, ...).
//! They are resolved exactly once, at authentication time, into a base tier,
//! implied tiers and an optional discipline hint.

use std::collections::BTreeSet;

use classbook_core::auth::AUTHORITY_PREFIX;
use classbook_core::{Role, Tier};

/// Ordered keyword table mapping compound teacher roles to disciplines.
///
/// The first keyword contained in the role string wins, so more specific
/// keywords must precede shorter ones they contain.
pub const SUBJECT_KEYWORDS: &[(&str, &str)] = &[
    ("MATH", "Mathematics"),
    ("PHYSICS", "Physics"),
    ("HISTORY", "History"),
    ("RUSSIAN", "Russian Language"),
    ("INFORM", "Computer Science"),
    ("CS", "Computer Science"),
    ("ENGLISH", "English Language"),
    ("BIO", "Biology"),
    ("CHEM", "Chemistry"),
    ("GEO", "Geography"),
    ("LIT", "Literature"),
];

/// Outcome of resolving one raw role string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleResolution {
    label: String,
    base_tier: Tier,
    implied_tiers: Vec<Tier>,
    scope_subject_hint: Option<&'static str>,
}

impl RoleResolution {
    /// Returns the normalized role label without the authority prefix.
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_str()
    }

    /// Returns the base tier.
    #[must_use]
    pub fn base_tier(&self) -> Tier {
        self.base_tier
    }

    /// Returns tiers implied by the role, excluding the base tier.
    #[must_use]
    pub fn implied_tiers(&self) -> &[Tier] {
        self.implied_tiers.as_slice()
    }

    /// Returns the discipline derived from a compound teacher role.
    #[must_use]
    pub fn scope_subject_hint(&self) -> Option<&'static str> {
        self.scope_subject_hint
    }

    /// Returns the base tier together with every implied tier.
    #[must_use]
    pub fn granted_tiers(&self) -> BTreeSet<Tier> {
        std::iter::once(self.base_tier)
            .chain(self.implied_tiers.iter().copied())
            .collect()
    }

    /// Returns granted authority labels: the role's own label first, then
    /// the implied tiers.
    #[must_use]
    pub fn authorities(&self) -> Vec<String> {
        std::iter::once(format!("{AUTHORITY_PREFIX}{}", self.label))
            .chain(self.implied_tiers.iter().map(Tier::authority))
            .collect()
    }

    /// Builds the closed role value. An explicit subject stored on the user
    /// record takes precedence over the keyword hint.
    #[must_use]
    pub fn into_role(self, explicit_subject: Option<&str>) -> Role {
        match self.base_tier {
            Tier::Admin => Role::Admin,
            Tier::User => Role::User,
            Tier::Teacher => Role::Teacher {
                subject: explicit_subject
                    .map(str::trim)
                    .filter(|value| !value.is_empty())
                    .map(ToOwned::to_owned)
                    .or_else(|| self.scope_subject_hint.map(ToOwned::to_owned)),
            },
        }
    }
}

/// Resolves a raw stored role string.
///
/// Empty or missing roles resolve to `USER`. Exact tier names map directly,
/// any other string containing `TEACHER` is a compound teacher role, and
/// everything else falls back to `USER`.
#[must_use]
pub fn resolve_role(raw_role: Option<&str>) -> RoleResolution {
    let normalized = raw_role
        .map(|value| value.trim().to_uppercase())
        .unwrap_or_default();
    let normalized = normalized
        .strip_prefix(AUTHORITY_PREFIX)
        .map(ToOwned::to_owned)
        .unwrap_or(normalized);

    if let Some(tier) = Tier::from_label(normalized.as_str()) {
        let implied_tiers = match tier {
            Tier::Admin => vec![Tier::Teacher, Tier::User],
            Tier::Teacher | Tier::User => Vec::new(),
        };

        return RoleResolution {
            label: tier.as_str().to_owned(),
            base_tier: tier,
            implied_tiers,
            scope_subject_hint: None,
        };
    }

    if normalized.contains(Tier::Teacher.as_str()) {
        let scope_subject_hint = subject_for_role(normalized.as_str());
        return RoleResolution {
            label: normalized,
            base_tier: Tier::Teacher,
            implied_tiers: vec![Tier::Teacher],
            scope_subject_hint,
        };
    }

    RoleResolution {
        label: Tier::User.as_str().to_owned(),
        base_tier: Tier::User,
        implied_tiers: Vec::new(),
        scope_subject_hint: None,
    }
}

/// Returns the discipline for the first table keyword contained in `role`.
#[must_use]
pub fn subject_for_role(role: &str) -> Option<&'static str> {
    let upper = role.to_uppercase();
    SUBJECT_KEYWORDS
        .iter()
        .find(|(keyword, _)| upper.contains(keyword))
        .map(|(_, subject)| *subject)
}

/// Tiers and discipline hint recovered from a list of authority labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantedAuthorities {
    /// Every tier granted by any label.
    pub tiers: BTreeSet<Tier>,
    /// Discipline hint of the first compound teacher label, if any.
    pub scope_subject_hint: Option<&'static str>,
}

impl GrantedAuthorities {
    /// Returns the highest granted tier, if any label was recognized.
    #[must_use]
    pub fn effective_tier(&self) -> Option<Tier> {
        self.tiers.iter().next().copied()
    }

    /// Builds the closed role value for the effective tier.
    #[must_use]
    pub fn into_role(self, explicit_subject: Option<&str>) -> Role {
        match self.effective_tier() {
            Some(Tier::Admin) => Role::Admin,
            Some(Tier::Teacher) => Role::Teacher {
                subject: explicit_subject
                    .map(str::trim)
                    .filter(|value| !value.is_empty())
                    .map(ToOwned::to_owned)
                    .or_else(|| self.scope_subject_hint.map(ToOwned::to_owned)),
            },
            Some(Tier::User) | None => Role::User,
        }
    }
}

/// Resolves the authority labels carried by a token's `roles` claim.
#[must_use]
pub fn resolve_authorities<'a>(labels: impl IntoIterator<Item = &'a str>) -> GrantedAuthorities {
    let mut tiers = BTreeSet::new();
    let mut scope_subject_hint = None;

    for label in labels.into_iter().filter(|label| !label.trim().is_empty()) {
        let resolution = resolve_role(Some(label));
        if scope_subject_hint.is_none() {
            scope_subject_hint = resolution.scope_subject_hint();
        }
        tiers.extend(resolution.granted_tiers());
    }

    GrantedAuthorities {
        tiers,
        scope_subject_hint,
    }
}
