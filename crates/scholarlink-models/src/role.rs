//! The closed set of roles a principal can hold.
//!
//! Every authorization decision in ScholarLink is made against a [`Role`]
//! value; adding a role means adding a variant here and a home route in
//! the guard's route table.

use serde::{Deserialize, Serialize};

/// The single role attached to a principal.
///
/// Serialized in `snake_case` on the wire and in tokens.
///
/// # Examples
///
/// ```
/// use scholarlink_models::Role;
///
/// let role: Role = "program_chair".parse().unwrap();
/// assert_eq!(role, Role::ProgramChair);
/// assert_eq!(role.to_string(), "program_chair");
/// ```
#[derive(
    Serialize,
    Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    /// A student enrolled in a program.
    Scholar,
    /// A thesis or research supervisor.
    Supervisor,
    /// The chair of an academic program.
    ProgramChair,
    /// Full administrative access.
    Administrator,
    /// Administrative access without write permissions.
    AdministratorReadonly,
}

impl Role {
    /// Whether this role belongs to the administrative family.
    pub fn is_administrative(self) -> bool {
        matches!(self, Self::Administrator | Self::AdministratorReadonly)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&Role::AdministratorReadonly).unwrap();
        assert_eq!(json, "\"administrator_readonly\"");
    }

    #[test]
    fn display_matches_serde_for_every_role() {
        for role in Role::iter() {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{role}\""));
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!("dean".parse::<Role>().is_err());
        assert!(serde_json::from_str::<Role>("\"dean\"").is_err());
    }

    #[test]
    fn administrative_family() {
        assert!(Role::Administrator.is_administrative());
        assert!(Role::AdministratorReadonly.is_administrative());
        assert!(!Role::Scholar.is_administrative());
    }
}
