//! Strongly-typed identifiers for domain entities

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
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
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }
    };
}

/// Every record id can stand in as a relationship endpoint
macro_rules! endpoint_id {
    ($($name:ident),*) => {
        $(
            impl From<$name> for EntityId {
                fn from(id: $name) -> EntityId {
                    EntityId(id.0)
                }
            }
        )*
    };
}

define_id!(WorldId);
define_id!(CharacterId);
define_id!(LoreItemId);
define_id!(EventId);
define_id!(RelationshipId);
define_id!(EntityId);
define_id!(RecommendationId);
define_id!(PatternId);

endpoint_id!(CharacterId, LoreItemId, EventId);

/// Namespace for ids derived from an observation key rather than drawn at random
const DERIVED_ID_NAMESPACE: Uuid = Uuid::from_u128(0x6c6f_7265_7765_6176_6572_2d72_6563_0001);

impl RecommendationId {
    /// Stable id for the same observation across analysis runs
    pub fn derive(key: &str) -> Self {
        Self(Uuid::new_v5(&DERIVED_ID_NAMESPACE, key.as_bytes()))
    }
}

impl PatternId {
    pub fn derive(key: &str) -> Self {
        Self(Uuid::new_v5(&DERIVED_ID_NAMESPACE, format!("pattern:{key}").as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_ids_are_stable() {
        assert_eq!(
            RecommendationId::derive("family:a:b:Family"),
            RecommendationId::derive("family:a:b:Family")
        );
        assert_ne!(
            RecommendationId::derive("family:a:b:Family"),
            RecommendationId::derive("family:a:c:Family")
        );
    }

    #[test]
    fn test_entity_id_shares_uuid() {
        let character = CharacterId::new();
        let endpoint: EntityId = character.into();
        assert_eq!(endpoint.as_uuid(), character.as_uuid());
    }
}
