//! Relationship deduplication - Suppress pairs that are already related

use std::collections::{HashMap, HashSet};

use crate::domain::value_objects::{EntityId, Relationship};

/// Unordered endpoint pairs of the existing relationships
#[derive(Debug, Clone, Default)]
pub struct RelationshipIndex {
    pairs: HashSet<(EntityId, EntityId)>,
    degree: HashMap<EntityId, usize>,
}

impl RelationshipIndex {
    pub fn new(relationships: &[Relationship]) -> Self {
        let mut index = Self::default();
        for relationship in relationships {
            index.insert(relationship.source.id, relationship.target.id);
        }
        index
    }

    fn insert(&mut self, a: EntityId, b: EntityId) {
        if self.pairs.insert(ordered(a, b)) {
            *self.degree.entry(a).or_default() += 1;
            if a != b {
                *self.degree.entry(b).or_default() += 1;
            }
        }
    }

    /// True if any relationship joins `a` and `b`, in either direction
    pub fn contains(&self, a: EntityId, b: EntityId) -> bool {
        self.pairs.contains(&ordered(a, b))
    }

    /// Number of distinct partners the record is related to
    pub fn degree(&self, id: EntityId) -> usize {
        self.degree.get(&id).copied().unwrap_or(0)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }
}

fn ordered(a: EntityId, b: EntityId) -> (EntityId, EntityId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Linear check over a relationship list, for callers without an index
pub fn relationship_exists(relationships: &[Relationship], a: EntityId, b: EntityId) -> bool {
    relationships.iter().any(|r| r.connects(a, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{
        EntityRef, EntityType, RelationshipDraft, RelationshipId, RelationshipStrength, WorldId,
    };

    fn relationship(a: EntityId, b: EntityId) -> Relationship {
        RelationshipDraft::new(
            WorldId::new(),
            EntityRef::new(a, EntityType::Character, "A"),
            EntityRef::new(b, EntityType::Character, "B"),
            "Friend",
            RelationshipStrength::Weak,
        )
        .into_relationship(RelationshipId::new(), chrono::Utc::now())
    }

    #[test]
    fn test_contains_checks_both_directions() {
        let (a, b, c) = (EntityId::new(), EntityId::new(), EntityId::new());
        let existing = vec![relationship(a, b)];
        let index = RelationshipIndex::new(&existing);

        assert!(index.contains(a, b));
        assert!(index.contains(b, a));
        assert!(!index.contains(a, c));
        assert!(relationship_exists(&existing, b, a));
        assert!(!relationship_exists(&existing, c, b));
    }

    #[test]
    fn test_degree_counts_each_side() {
        let (a, b, c) = (EntityId::new(), EntityId::new(), EntityId::new());
        let index = RelationshipIndex::new(&[relationship(a, b), relationship(c, a), relationship(b, a)]);

        assert_eq!(index.degree(a), 2);
        assert_eq!(index.degree(b), 1);
        assert_eq!(index.degree(c), 1);
        assert_eq!(index.degree(EntityId::new()), 0);
        assert_eq!(index.len(), 2);
    }
}
