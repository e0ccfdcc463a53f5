//! Row Model
//!
//! In-memory view of one field list. Rows are kept in document order, so a
//! row's position is its index; every operation restores indices `0..len`.

use std::collections::HashMap;
use std::fmt;

use crate::ident::IndexPrefix;

/// Errors raised by field list operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldListError {
    #[error("cannot remove the only remaining row")]
    LastRow,

    #[error("no row is bound to control {0}")]
    UnknownControl(ControlId),

    #[error("field list has no rows")]
    NoRows,

    #[error("first row has no indexed identifier")]
    NoIndexedIdentifier,

    #[error("DOM operation failed: {0}")]
    Dom(String),
}

/// Identifier of an add/remove control, unique on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlId {
    pub widget: usize,
    pub seq: u32,
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "form_button_{}_{}", self.widget, self.seq)
    }
}

/// Monotonic control id source for one widget
#[derive(Debug)]
pub struct ControlIds {
    widget: usize,
    next: u32,
}

impl ControlIds {
    pub fn new(widget: usize) -> Self {
        Self { widget, next: 1 }
    }

    pub fn allocate(&mut self) -> ControlId {
        let id = ControlId { widget: self.widget, seq: self.next };
        self.next += 1;
        id
    }
}

/// Values owned by each row's control, handed back when the row goes away
#[derive(Debug)]
pub struct ControlSlots<T> {
    slots: HashMap<ControlId, T>,
}

impl<T> Default for ControlSlots<T> {
    fn default() -> Self {
        Self { slots: HashMap::new() }
    }
}

impl<T> ControlSlots<T> {
    pub fn insert(&mut self, control: ControlId, value: T) {
        self.slots.insert(control, value);
    }

    /// Take the value bound to `control`; None once released
    pub fn release(&mut self, control: ControlId) -> Option<T> {
        self.slots.remove(&control)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// A row of form fields that can be cloned and renumbered
pub trait RowNode: Sized {
    /// Deep copy of the row, detached from the list
    fn duplicate(&self) -> Result<Self, FieldListError>;
    /// Drop any remove controls carried over from the source row
    fn strip_controls(&mut self) -> Result<(), FieldListError>;
    /// Reset entered values
    fn clear_values(&mut self) -> Result<(), FieldListError>;
    /// All `id`/`for`/`name` values in the row, excluding controls
    fn identifiers(&self) -> Vec<String>;
    /// Identifiers of the row's own fields: label `for`, input `id` and `name`.
    ///
    /// The list's index prefix is detected from these.
    fn field_identifiers(&self) -> Vec<String> {
        self.identifiers()
    }
    /// Replace each identifier for which `rewrite` returns a new value
    fn rewrite_identifiers(&mut self, rewrite: &dyn Fn(&str) -> Option<String>);
}

struct Row<R> {
    node: R,
    control: ControlId,
}

/// Ordered rows of one list plus their shared identifier prefix
pub struct FieldList<R: RowNode> {
    prefix: IndexPrefix,
    rows: Vec<Row<R>>,
}

impl<R: RowNode> FieldList<R> {
    /// Build from rows in document order, each with the id of its remove control
    pub fn new(rows: Vec<(R, ControlId)>) -> Result<Self, FieldListError> {
        let first = rows.first().ok_or(FieldListError::NoRows)?;
        let prefix = IndexPrefix::detect(&first.0.field_identifiers(), 0)
            .ok_or(FieldListError::NoIndexedIdentifier)?;
        Ok(Self {
            prefix,
            rows: rows.into_iter().map(|(node, control)| Row { node, control }).collect(),
        })
    }

    pub fn prefix(&self) -> &IndexPrefix {
        &self.prefix
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &R> {
        self.rows.iter().map(|row| &row.node)
    }

    /// Position of the row whose remove control is `control`
    pub fn position_of(&self, control: ControlId) -> Option<usize> {
        self.rows.iter().position(|row| row.control == control)
    }

    /// Append a blank copy of the first row, numbered as the next index.
    ///
    /// Returns the new row so the caller can insert it and bind `control` to it.
    pub fn add(&mut self, control: ControlId) -> Result<&R, FieldListError> {
        let first = self.rows.first().ok_or(FieldListError::NoRows)?;
        let index = self.rows.len();

        let mut node = first.node.duplicate()?;
        node.strip_controls()?;
        node.clear_values()?;
        let prefix = &self.prefix;
        node.rewrite_identifiers(&|value| prefix.rewrite(value, 0, index));

        self.rows.push(Row { node, control });
        tracing::debug!("added row {} to list '{}'", index, self.prefix.as_str());
        Ok(&self.rows[index].node)
    }

    /// Remove the row bound to `control` and shift later rows down by one.
    ///
    /// The last remaining row is never removed. Returns the detached row.
    pub fn remove(&mut self, control: ControlId) -> Result<R, FieldListError> {
        let position = self.position_of(control).ok_or(FieldListError::UnknownControl(control))?;
        if self.rows.len() <= 1 {
            return Err(FieldListError::LastRow);
        }

        let removed = self.rows.remove(position);
        let prefix = &self.prefix;
        for (index, row) in self.rows.iter_mut().enumerate().skip(position) {
            row.node.rewrite_identifiers(&|value| prefix.rewrite(value, index + 1, index));
        }
        tracing::debug!("removed row {} from list '{}'", position, self.prefix.as_str());
        Ok(removed.node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Row stand-in: a label carried through clones plus attribute values
    #[derive(Debug, Clone, PartialEq)]
    struct FakeRow {
        label: String,
        identifiers: Vec<String>,
        value: String,
        has_control: bool,
    }

    impl FakeRow {
        fn new(label: &str, prefix: &str, index: usize) -> Self {
            Self {
                label: label.to_string(),
                identifiers: vec![
                    format!("{}-{}", prefix, index),
                    format!("{}-{}-note", prefix, index),
                ],
                value: format!("value {}", label),
                has_control: true,
            }
        }

        fn with_identifiers(label: &str, identifiers: Vec<String>) -> Self {
            Self {
                label: label.to_string(),
                identifiers,
                value: format!("value {}", label),
                has_control: true,
            }
        }
    }

    impl RowNode for FakeRow {
        fn duplicate(&self) -> Result<Self, FieldListError> {
            Ok(self.clone())
        }

        fn strip_controls(&mut self) -> Result<(), FieldListError> {
            self.has_control = false;
            Ok(())
        }

        fn clear_values(&mut self) -> Result<(), FieldListError> {
            self.value.clear();
            Ok(())
        }

        fn identifiers(&self) -> Vec<String> {
            self.identifiers.clone()
        }

        fn rewrite_identifiers(&mut self, rewrite: &dyn Fn(&str) -> Option<String>) {
            for ident in self.identifiers.iter_mut() {
                if let Some(new) = rewrite(ident) {
                    *ident = new;
                }
            }
        }
    }

    fn make_list(count: usize) -> (FieldList<FakeRow>, ControlIds) {
        let mut ids = ControlIds::new(0);
        let rows = (0..count)
            .map(|i| (FakeRow::new(&format!("row{}", i), "keywords", i), ids.allocate()))
            .collect();
        (FieldList::new(rows).unwrap(), ids)
    }

    fn indices(list: &FieldList<FakeRow>) -> Vec<usize> {
        list.nodes()
            .map(|row| {
                let first = list.prefix().index_of(&row.identifiers[0]).unwrap();
                let second = list.prefix().index_of(&row.identifiers[1]).unwrap();
                assert_eq!(first, second, "identifiers in one row disagree");
                first
            })
            .collect()
    }

    fn labels(list: &FieldList<FakeRow>) -> Vec<String> {
        list.nodes().map(|row| row.label.clone()).collect()
    }

    fn control_at(list: &FieldList<FakeRow>, position: usize) -> ControlId {
        list.rows[position].control
    }

    #[test]
    fn test_remove_any_row_keeps_indices_contiguous() {
        for count in 2..6 {
            for position in 0..count {
                let (mut list, _) = make_list(count);
                let mut expected = labels(&list);
                expected.remove(position);

                let control = control_at(&list, position);
                let removed = list.remove(control).unwrap();

                assert_eq!(removed.label, format!("row{}", position));
                assert_eq!(indices(&list), (0..count - 1).collect::<Vec<_>>());
                assert_eq!(labels(&list), expected);
            }
        }
    }

    #[test]
    fn test_remove_only_row_is_refused() {
        let (mut list, _) = make_list(1);
        let before: Vec<FakeRow> = list.nodes().cloned().collect();

        let result = list.remove(control_at(&list, 0));

        assert_eq!(result.unwrap_err(), FieldListError::LastRow);
        assert_eq!(list.nodes().cloned().collect::<Vec<_>>(), before);
    }

    #[test]
    fn test_remove_highest_row_leaves_others_untouched() {
        let (mut list, _) = make_list(3);
        let before: Vec<FakeRow> = list.nodes().take(2).cloned().collect();

        list.remove(control_at(&list, 2)).unwrap();

        assert_eq!(list.nodes().cloned().collect::<Vec<_>>(), before);
    }

    #[test]
    fn test_remove_unknown_control() {
        let (mut list, mut ids) = make_list(2);
        let stray = ids.allocate();
        assert_eq!(list.remove(stray).unwrap_err(), FieldListError::UnknownControl(stray));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_add_appends_blank_row_with_next_index() {
        let (mut list, mut ids) = make_list(3);
        let before: Vec<FakeRow> = list.nodes().cloned().collect();

        let control = ids.allocate();
        let added = list.add(control).unwrap().clone();

        assert_eq!(list.len(), 4);
        assert_eq!(added.identifiers, vec!["keywords-3".to_string(), "keywords-3-note".to_string()]);
        assert!(added.value.is_empty());
        assert!(!added.has_control);
        assert_eq!(list.nodes().take(3).cloned().collect::<Vec<_>>(), before);
        assert_eq!(list.position_of(control), Some(3));
    }

    #[test]
    fn test_add_then_remove_restores_identifiers() {
        let (mut list, mut ids) = make_list(2);
        let before: Vec<Vec<String>> = list.nodes().map(|r| r.identifiers.clone()).collect();

        let control = ids.allocate();
        list.add(control).unwrap();
        list.remove(control).unwrap();

        let after: Vec<Vec<String>> = list.nodes().map(|r| r.identifiers.clone()).collect();
        assert_eq!(after, before);
    }

    #[test]
    fn test_remove_after_adds() {
        let (mut list, mut ids) = make_list(1);
        let second = ids.allocate();
        let third = ids.allocate();
        list.add(second).unwrap();
        list.add(third).unwrap();

        list.remove(second).unwrap();

        assert_eq!(indices(&list), vec![0, 1]);
        assert_eq!(list.position_of(third), Some(1));
    }

    /// List whose rows carry the identifiers `layout(i)` for row `i`
    fn make_widget_list(count: usize, layout: fn(usize) -> Vec<String>) -> (FieldList<FakeRow>, ControlIds) {
        let mut ids = ControlIds::new(0);
        let rows = (0..count)
            .map(|i| (FakeRow::with_identifiers(&format!("row{}", i), layout(i)), ids.allocate()))
            .collect();
        (FieldList::new(rows).unwrap(), ids)
    }

    fn identifiers(list: &FieldList<FakeRow>) -> Vec<Vec<String>> {
        list.nodes().map(|row| row.identifiers.clone()).collect()
    }

    fn flatpickr_row(i: usize) -> Vec<String> {
        vec![
            format!("dates-{}", i),
            format!("dates-{}", i),
            format!("flatpickr-clear-button-dates-{}", i),
        ]
    }

    fn select2_row(i: usize) -> Vec<String> {
        vec![
            format!("entities-{}", i),
            format!("entities-{}", i),
            format!("entities-{}", i),
            format!("select2-entities-{}-container", i),
        ]
    }

    #[test]
    fn test_flatpickr_rows_attach_add_and_remove() {
        let (mut list, mut ids) = make_widget_list(2, flatpickr_row);
        assert_eq!(list.prefix().as_str(), "dates");

        let control = ids.allocate();
        let added = list.add(control).unwrap().clone();
        assert_eq!(added.identifiers, flatpickr_row(2));

        list.remove(control_at(&list, 0)).unwrap();

        assert_eq!(identifiers(&list), vec![flatpickr_row(0), flatpickr_row(1)]);
        assert_eq!(labels(&list), vec!["row1".to_string(), "row0".to_string()]);
    }

    #[test]
    fn test_select2_rows_attach_add_and_remove() {
        let (mut list, mut ids) = make_widget_list(3, select2_row);
        assert_eq!(list.prefix().as_str(), "entities");

        let control = ids.allocate();
        assert_eq!(list.add(control).unwrap().identifiers, select2_row(3));

        list.remove(control_at(&list, 1)).unwrap();

        assert_eq!(identifiers(&list), (0..3).map(select2_row).collect::<Vec<_>>());
        assert_eq!(labels(&list), vec!["row0".to_string(), "row2".to_string(), "row0".to_string()]);
        assert_eq!(list.position_of(control), Some(2));
    }

    #[test]
    fn test_new_rejects_unindexed_rows() {
        let row = FakeRow {
            label: "x".to_string(),
            identifiers: vec!["title".to_string()],
            value: String::new(),
            has_control: false,
        };
        let mut ids = ControlIds::new(0);
        assert_eq!(
            FieldList::new(vec![(row, ids.allocate())]).err(),
            Some(FieldListError::NoIndexedIdentifier)
        );
        assert_eq!(FieldList::<FakeRow>::new(Vec::new()).err(), Some(FieldListError::NoRows));
    }

    #[test]
    fn test_removed_row_releases_its_control_slot() {
        let (mut list, mut ids) = make_list(3);
        let mut slots = ControlSlots::default();
        let handle = std::rc::Rc::new(());
        for position in 0..3 {
            slots.insert(control_at(&list, position), std::rc::Rc::clone(&handle));
        }
        let added = ids.allocate();
        list.add(added).unwrap();
        slots.insert(added, std::rc::Rc::clone(&handle));
        assert_eq!(std::rc::Rc::strong_count(&handle), 5);

        let control = control_at(&list, 1);
        list.remove(control).unwrap();
        drop(slots.release(control));

        assert_eq!(std::rc::Rc::strong_count(&handle), 4);
        assert_eq!(slots.len(), 3);
        assert!(slots.release(control).is_none());
    }

    #[test]
    fn test_control_ids_are_unique_per_widget() {
        let mut a = ControlIds::new(0);
        let mut b = ControlIds::new(1);
        let first = a.allocate();
        let second = a.allocate();
        assert_ne!(first, second);
        assert_eq!(first.to_string(), "form_button_0_1");
        assert_eq!(b.allocate().to_string(), "form_button_1_1");
    }
}
