//! Duplicate Guard - name collision check run before a submission writes anything.
//!
//! Best effort only. Two concurrent submissions can both pass it; the unique
//! name index in the store is what finally decides, see `actions::submit`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domains::competitions::errors::CompetitionError;
use crate::domains::competitions::models::Competition;
use crate::kernel::{BaseResourceStore, StoreError};

/// How a proposed name is compared against existing competition names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameMatch {
    /// Existing name starts with the proposed name, ignoring case.
    /// "Spring" collides with "Spring Classic"; "Spring Classic 2" does not.
    #[default]
    Prefix,
    /// Names are equal ignoring case.
    Exact,
}

impl NameMatch {
    pub fn matches(self, existing: &str, proposed: &str) -> bool {
        let existing = existing.to_lowercase();
        let proposed = proposed.to_lowercase();
        match self {
            NameMatch::Prefix => existing.starts_with(&proposed),
            NameMatch::Exact => existing == proposed,
        }
    }
}

impl std::fmt::Display for NameMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NameMatch::Prefix => write!(f, "prefix"),
            NameMatch::Exact => write!(f, "exact"),
        }
    }
}

impl std::str::FromStr for NameMatch {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prefix" => Ok(NameMatch::Prefix),
            "exact" => Ok(NameMatch::Exact),
            other => Err(anyhow::anyhow!("Invalid name match mode: {}", other)),
        }
    }
}

/// Outcome of a duplicate check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DuplicateCheck {
    None,
    ExistsValid(Competition),
    ExistsPending(Competition),
}

impl DuplicateCheck {
    fn from_existing(existing: Option<Competition>) -> Self {
        match existing {
            None => DuplicateCheck::None,
            Some(c) if c.valid => DuplicateCheck::ExistsValid(c),
            Some(c) => DuplicateCheck::ExistsPending(c),
        }
    }

    /// The error to report for a collision with `name`, if any.
    pub fn into_error(self, name: &str) -> Option<CompetitionError> {
        match self {
            DuplicateCheck::None => None,
            DuplicateCheck::ExistsValid(_) => Some(CompetitionError::DuplicateCompetition {
                name: name.to_string(),
                pending: false,
            }),
            DuplicateCheck::ExistsPending(_) => Some(CompetitionError::DuplicateCompetition {
                name: name.to_string(),
                pending: true,
            }),
        }
    }
}

/// Look for an existing competition that collides with `name`.
pub async fn check_name(
    store: &dyn BaseResourceStore,
    name: &str,
    mode: NameMatch,
) -> Result<DuplicateCheck, StoreError> {
    let existing = store.find_competition_by_name(name, mode).await?;
    let check = DuplicateCheck::from_existing(existing);
    if let DuplicateCheck::ExistsValid(c) | DuplicateCheck::ExistsPending(c) = &check {
        debug!(
            proposed = %name,
            existing = %c.name,
            competition_id = %c.id,
            mode = %mode,
            "Competition name collides"
        );
    }
    Ok(check)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::UserId;
    use crate::domains::competitions::models::CompetitionDescriptor;
    use crate::kernel::InMemoryResourceStore;

    #[test]
    fn prefix_match_is_case_insensitive_and_anchored() {
        let mode = NameMatch::Prefix;
        assert!(mode.matches("Spring Classic", "spring classic"));
        assert!(mode.matches("Spring Classic", "SPRING"));
        assert!(!mode.matches("Spring Classic", "Spring Classic 2024"));
        assert!(!mode.matches("The Spring Classic", "Spring"));
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        assert!(NameMatch::Prefix.matches("C++ Open", "c++"));
        assert!(!NameMatch::Prefix.matches("Cup Open", "c.p"));
    }

    #[test]
    fn exact_match_ignores_case_only() {
        assert!(NameMatch::Exact.matches("Spring Classic", "spring CLASSIC"));
        assert!(!NameMatch::Exact.matches("Spring Classic", "Spring"));
    }

    #[test]
    fn parses_mode_from_config() {
        assert_eq!("Exact".parse::<NameMatch>().unwrap(), NameMatch::Exact);
        assert_eq!("prefix".parse::<NameMatch>().unwrap(), NameMatch::Prefix);
        assert!("fuzzy".parse::<NameMatch>().is_err());
    }

    #[tokio::test]
    async fn distinguishes_valid_from_pending_collisions() {
        let store = InMemoryResourceStore::new();
        let director = UserId::new();

        let mut approved = Competition::pending(&CompetitionDescriptor::new("Winter Cup"), director);
        approved.valid = true;
        store.seed_competition(approved);
        store.seed_competition(Competition::pending(
            &CompetitionDescriptor::new("Summer Games"),
            director,
        ));

        let valid = check_name(&store, "winter", NameMatch::Prefix).await.unwrap();
        assert!(matches!(valid, DuplicateCheck::ExistsValid(_)));

        let pending = check_name(&store, "Summer Games", NameMatch::Prefix)
            .await
            .unwrap();
        assert!(matches!(pending, DuplicateCheck::ExistsPending(_)));

        let free = check_name(&store, "Autumn", NameMatch::Prefix).await.unwrap();
        assert_eq!(free, DuplicateCheck::None);
        assert!(free.into_error("Autumn").is_none());
    }
}
