//! Signed identity token claims.

use serde::{Deserialize, Serialize};

use crate::principal::{ExternalId, Principal, PrincipalId};
use crate::role::Role;

/// Claims carried inside a signed identity token.
///
/// `iat` and `exp` are seconds since the Unix epoch.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IdentityClaims {
    /// Principal id.
    pub sub: PrincipalId,
    /// Login identifier of the principal.
    pub external_id: ExternalId,
    /// Role at the time of issuance.
    pub role: Role,
    /// Issued-at.
    pub iat: i64,
    /// Expiry.
    pub exp: i64,
}

impl IdentityClaims {
    /// The identity asserted by these claims, without the time window.
    pub fn identity(&self) -> VerifiedIdentity {
        VerifiedIdentity {
            id: self.sub,
            external_id: self.external_id.clone(),
            role: self.role,
        }
    }
}

/// The subset of principal fields a token asserts.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedIdentity {
    /// Principal id (token `sub`).
    pub id: PrincipalId,
    /// Login identifier.
    pub external_id: ExternalId,
    /// Role.
    pub role: Role,
}

impl From<&Principal> for VerifiedIdentity {
    fn from(p: &Principal) -> Self {
        Self {
            id: p.id,
            external_id: p.external_id.clone(),
            role: p.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_wire_names() {
        let claims = IdentityClaims {
            sub: PrincipalId::new(),
            external_id: ExternalId::new("abc"),
            role: Role::Supervisor,
            iat: 10,
            exp: 20,
        };
        let value = serde_json::to_value(&claims).unwrap();
        assert_eq!(value["externalId"], "abc");
        assert_eq!(value["role"], "supervisor");
        assert_eq!(value["iat"], 10);
        assert_eq!(value["exp"], 20);
        assert_eq!(claims.identity().id, claims.sub);
    }
}
