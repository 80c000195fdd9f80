use serde::{Deserialize, Serialize};

#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Serialize,
    Deserialize,
    strum_macros::EnumString,
    strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    Student,
    Faculty,
    Admin,
    SecurityGuard,
}

impl Role {
    pub fn from_claim(value: &str) -> Option<Self> {
        value.parse().ok()
    }

    /// Faculty and admins may approve or reject requests
    pub fn can_respond(&self) -> bool {
        matches!(self, Role::Faculty | Role::Admin)
    }

    pub fn can_verify(&self) -> bool {
        matches!(self, Role::SecurityGuard | Role::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_claim_names() {
        assert_eq!(Role::from_claim("security_guard"), Some(Role::SecurityGuard));
        assert_eq!(Role::from_claim("faculty"), Some(Role::Faculty));
        assert_eq!(Role::from_claim("hr"), None);
        assert_eq!(Role::SecurityGuard.to_string(), "security_guard");
    }
}
