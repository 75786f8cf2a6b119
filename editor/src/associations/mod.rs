//! Ordered field associations.
//!
//! An [`AssociationList`] is the export's field order. Every operation takes
//! `&self` and returns a new list, so a list handed to an observer never
//! changes underneath it.
//!
//! ```text
//! [id-0 name->Name] [id-1 mail->Email] [id-2 ""->""]
//!        │                 │                 │
//!   source field      target key      appended, not yet set
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AssociationError, AssociationResult};
use crate::models::{DefinitionMap, FieldMapping};

/// Identity of an association, stable across reorders.
///
/// Allocated from the list's counter; never reused after a removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssociationId(u64);

impl AssociationId {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for AssociationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "id-{}", self.0)
    }
}

/// One source-field-to-target-key line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Association {
    pub id: AssociationId,
    pub source_field: String,
    pub target_key: String,
}

/// Ordered associations plus the id counter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssociationList {
    items: Vec<Association>,
    next_id: u64,
}

impl AssociationList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a list from a stored definition, in document order.
    pub fn from_definition(definition: &DefinitionMap) -> Self {
        let mut list = Self::new();
        for (field, mapping) in definition.iter() {
            let id = list.allocate_id();
            list.items.push(Association {
                id,
                source_field: field.to_string(),
                target_key: mapping.change_key.clone(),
            });
        }
        list
    }

    fn allocate_id(&mut self) -> AssociationId {
        let id = AssociationId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn as_slice(&self) -> &[Association] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Association> {
        self.items.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Association> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add an empty association with a fresh id.
    pub fn append(&self) -> Self {
        let mut next = self.clone();
        let id = next.allocate_id();
        next.items.push(Association {
            id,
            source_field: String::new(),
            target_key: String::new(),
        });
        next
    }

    /// Remove the association at `index`. Out of bounds is a no-op.
    pub fn remove_at(&self, index: usize) -> Self {
        let mut next = self.clone();
        if index < next.items.len() {
            next.items.remove(index);
        }
        next
    }

    /// Move one association from `from` to `to`.
    ///
    /// `None` means the move was cancelled. A destination past the end lands
    /// on the last position; an unknown source is a no-op.
    pub fn reorder(&self, from: usize, to: Option<usize>) -> Self {
        let Some(to) = to else {
            return self.clone();
        };
        if from == to || from >= self.items.len() {
            return self.clone();
        }

        let mut next = self.clone();
        let moved = next.items.remove(from);
        let to = to.min(next.items.len());
        next.items.insert(to, moved);
        next
    }

    pub fn set_source_field(
        &self,
        index: usize,
        value: impl Into<String>,
    ) -> AssociationResult<Self> {
        let mut next = self.clone();
        next.item_mut(index)?.source_field = value.into();
        Ok(next)
    }

    pub fn set_target_key(
        &self,
        index: usize,
        value: impl Into<String>,
    ) -> AssociationResult<Self> {
        let mut next = self.clone();
        next.item_mut(index)?.target_key = value.into();
        Ok(next)
    }

    fn item_mut(&mut self, index: usize) -> AssociationResult<&mut Association> {
        let len = self.items.len();
        self.items
            .get_mut(index)
            .ok_or(AssociationError::IndexOutOfRange { index, len })
    }

    /// Persisted `definition` object.
    ///
    /// A source field used twice keeps its first position and takes the last
    /// target key, the way assigning object keys in sequence behaves.
    pub fn to_definition(&self) -> DefinitionMap {
        self.items
            .iter()
            .map(|a| (a.source_field.clone(), FieldMapping::new(a.target_key.clone())))
            .collect()
    }
}

impl<'a> IntoIterator for &'a AssociationList {
    type Item = &'a Association;
    type IntoIter = std::slice::Iter<'a, Association>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn list_of(fields: &[&str]) -> AssociationList {
        let mut list = AssociationList::new();
        for (i, field) in fields.iter().enumerate() {
            list = list.append().set_source_field(i, *field).unwrap();
        }
        list
    }

    fn fields(list: &AssociationList) -> Vec<&str> {
        list.iter().map(|a| a.source_field.as_str()).collect()
    }

    #[test]
    fn test_reorder_same_index_is_identity() {
        let list = list_of(&["a", "b", "c"]);
        for i in 0..3 {
            assert_eq!(list.reorder(i, Some(i)), list);
        }
    }

    #[test]
    fn test_reorder_cancelled_is_noop() {
        let list = list_of(&["a", "b", "c"]);
        assert_eq!(list.reorder(0, None), list);
    }

    #[test]
    fn test_reorder_forward_and_back() {
        let list = list_of(&["A", "B", "C"]);

        let moved = list.reorder(0, Some(2));
        assert_eq!(fields(&moved), vec!["B", "C", "A"]);

        let restored = moved.reorder(2, Some(0));
        assert_eq!(fields(&restored), vec!["A", "B", "C"]);
        assert_eq!(restored, list);
    }

    #[test]
    fn test_reorder_keeps_ids_with_elements() {
        let list = list_of(&["A", "B", "C"]);
        let moved = list.reorder(2, Some(1));

        assert_eq!(fields(&moved), vec!["A", "C", "B"]);
        assert_eq!(moved.get(1).unwrap().id, list.get(2).unwrap().id);
    }

    #[test]
    fn test_reorder_out_of_range() {
        let list = list_of(&["A", "B", "C"]);
        assert_eq!(list.reorder(7, Some(0)), list);
        assert_eq!(fields(&list.reorder(0, Some(99))), vec!["B", "C", "A"]);
    }

    #[test]
    fn test_append_ids_never_recycle() {
        let list = list_of(&["a", "b", "c"]);
        let removed = list.remove_at(2).remove_at(0);
        let appended = removed.append();

        assert_eq!(appended.len(), removed.len() + 1);
        assert_eq!(&appended.as_slice()[..removed.len()], removed.as_slice());

        let new_id = appended.get(appended.len() - 1).unwrap().id;
        assert!(list.iter().all(|a| a.id != new_id));
        assert_eq!(new_id.to_string(), "id-3");
    }

    #[test]
    fn test_append_is_copy_on_write() {
        let list = list_of(&["a"]);
        let _ = list.append();
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_remove_at() {
        let list = list_of(&["a", "b", "c"]);
        assert_eq!(fields(&list.remove_at(1)), vec!["a", "c"]);
        assert_eq!(list.remove_at(3), list);
    }

    #[test]
    fn test_set_out_of_range() {
        let list = list_of(&["a"]);
        assert_eq!(
            list.set_target_key(1, "x"),
            Err(AssociationError::IndexOutOfRange { index: 1, len: 1 })
        );
        assert!(list.set_source_field(5, "x").is_err());
    }

    #[test]
    fn test_set_touches_one_element() {
        let list = list_of(&["a", "b"]);
        let next = list.set_target_key(1, "B").unwrap();

        assert_eq!(next.get(0), list.get(0));
        assert_eq!(next.get(1).unwrap().target_key, "B");
        assert_eq!(next.get(1).unwrap().source_field, "b");
    }

    #[test]
    fn test_definition_round_trip() {
        let list = list_of(&["x", "z"])
            .set_target_key(0, "y")
            .unwrap()
            .set_target_key(1, "w")
            .unwrap();

        let definition = list.to_definition();
        assert_eq!(
            serde_json::to_value(&definition).unwrap(),
            json!({"x": {"changeKey": "y"}, "z": {"changeKey": "w"}})
        );

        let reloaded = AssociationList::from_definition(&definition);
        assert_eq!(fields(&reloaded), vec!["x", "z"]);
        assert_eq!(reloaded.get(1).unwrap().target_key, "w");
    }

    #[test]
    fn test_duplicate_source_field_last_write_wins() {
        let list = list_of(&["x", "x"])
            .set_target_key(0, "1")
            .unwrap()
            .set_target_key(1, "2")
            .unwrap();

        assert_eq!(
            serde_json::to_value(list.to_definition()).unwrap(),
            json!({"x": {"changeKey": "2"}})
        );
    }

    #[test]
    fn test_seeded_counter_continues() {
        let definition: DefinitionMap = serde_json::from_value(json!({
            "a": {"changeKey": "A"},
            "b": {"changeKey": "B"}
        }))
        .unwrap();
        let list = AssociationList::from_definition(&definition).append();

        let ids: Vec<String> = list.iter().map(|a| a.id.to_string()).collect();
        assert_eq!(ids, vec!["id-0", "id-1", "id-2"]);
    }

    fn numbered(len: usize) -> AssociationList {
        let names: Vec<String> = (0..len).map(|i| format!("f{}", i)).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        list_of(&refs)
    }

    fn sorted_ids(list: &AssociationList) -> Vec<AssociationId> {
        let mut ids: Vec<_> = list.iter().map(|a| a.id).collect();
        ids.sort();
        ids
    }

    proptest! {
        #[test]
        fn reorder_to_same_index_is_identity(len in 0usize..12, index in 0usize..16) {
            let list = numbered(len);
            prop_assert_eq!(list.reorder(index, Some(index)), list);
        }

        #[test]
        fn reorder_is_undone_by_reverse_move(
            (len, from, to) in (1usize..12).prop_flat_map(|len| (Just(len), 0..len, 0..len))
        ) {
            let list = numbered(len);
            let moved = list.reorder(from, Some(to));

            prop_assert_eq!(moved.len(), len);
            prop_assert_eq!(sorted_ids(&moved), sorted_ids(&list));
            prop_assert_eq!(moved.get(to).map(|a| a.id), list.get(from).map(|a| a.id));
            prop_assert_eq!(moved.reorder(to, Some(from)), list);
        }

        #[test]
        fn append_after_removals_uses_fresh_id(
            len in 0usize..12,
            removals in proptest::collection::vec(0usize..16, 0..8),
        ) {
            let list = numbered(len);
            let trimmed = removals.iter().fold(list.clone(), |acc, &i| acc.remove_at(i));
            let appended = trimmed.append();

            prop_assert_eq!(appended.len(), trimmed.len() + 1);
            prop_assert_eq!(&appended.as_slice()[..trimmed.len()], trimmed.as_slice());

            let new = appended.get(trimmed.len()).unwrap();
            prop_assert!(list.iter().all(|a| a.id != new.id));
            prop_assert_eq!(new.source_field.as_str(), "");
            prop_assert_eq!(new.target_key.as_str(), "");
        }
    }
}
