//! ULID-backed identifiers for the entities that take part in membership resolution.
//!
//! Each scope gets its own type so an organization id can never be passed
//! where a project id is expected.

macro_rules! ulid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(ulid::Ulid);

        impl $name {
            /// Generate a new random ULID.
            pub fn new() -> Self {
                Self(ulid::Ulid::new())
            }

            /// Get as string for storage/display.
            pub fn as_str(&self) -> String {
                self.0.to_string()
            }

            /// Parse from string.
            pub fn from_string(s: &str) -> Result<Self, ulid::DecodeError> {
                Ok(Self(ulid::Ulid::from_string(s)?))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = ulid::DecodeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_string(s)
            }
        }
    };
}

ulid_id!(
    /// Organization ID. Top of the two-level scope hierarchy.
    OrganizationId
);

ulid_id!(
    /// Project ID. Every project belongs to exactly one organization.
    ProjectId
);

ulid_id!(
    /// User ID. Supplied by the identity provider and trusted as-is.
    UserId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_new_id() {
        let id1 = UserId::new();
        let id2 = UserId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn parse_valid_ulid() {
        let original = ProjectId::new();
        let parsed = ProjectId::from_string(&original.as_str()).unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn parse_invalid_ulid() {
        assert!(OrganizationId::from_string("invalid").is_err());
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = UserId::new();
        let json = serde_json::to_value(&id).unwrap();
        assert_eq!(json, serde_json::Value::String(id.as_str()));
    }
}
