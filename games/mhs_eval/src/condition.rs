//! Condition collections iterated by `ForEachConditionInContext`.

use std::rc::Rc;

use mhs_gamedata::PrototypeId;
use mhs_properties::PropertyCollectionRef;

/// One condition: its property collection and keyword prototypes.
#[derive(Clone, Debug, PartialEq)]
pub struct Condition {
    pub properties: PropertyCollectionRef,
    pub keywords: Rc<[PrototypeId]>,
}

impl Condition {
    pub fn new(properties: PropertyCollectionRef, keywords: impl Into<Rc<[PrototypeId]>>) -> Self {
        Condition {
            properties,
            keywords: keywords.into(),
        }
    }
}

/// Ordered set of conditions attached to an entity.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConditionCollection {
    conditions: Vec<Condition>,
}

impl ConditionCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, condition: Condition) {
        self.conditions.push(condition);
    }

    pub fn get(&self, index: usize) -> Option<&Condition> {
        self.conditions.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Condition> {
        self.conditions.iter()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

impl FromIterator<Condition> for ConditionCollection {
    fn from_iter<I: IntoIterator<Item = Condition>>(iter: I) -> Self {
        ConditionCollection {
            conditions: iter.into_iter().collect(),
        }
    }
}
