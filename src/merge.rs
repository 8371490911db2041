//! Insert-or-append of a property into a structural container.
//!
//! XML-derived data is ambiguous about whether a property holds one value
//! or many. [`insert_or_append`] resolves that at the insertion point and
//! refuses to insert a second element with the same `id`.

use crate::diagnostics::Diagnostic;
use crate::node::{Node, Value};

/// Result of a single insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The value was added.
    Inserted,
    /// An element with the same `id` already exists; nothing changed.
    Duplicate { id: String },
}

impl MergeOutcome {
    /// The diagnostic to report for this outcome, if any.
    pub fn diagnostic(&self) -> Option<Diagnostic> {
        match self {
            MergeOutcome::Inserted => None,
            MergeOutcome::Duplicate { id } => {
                Some(Diagnostic::EntryAlreadyExists { id: id.clone() })
            }
        }
    }
}

/// Insert `value` under `property` in `container`.
///
/// - A list container is searched for an element that already carries
///   `property`; that element becomes the target.
/// - If the target already has an element with the same `id` as `value`,
///   the insert is skipped and [`MergeOutcome::Duplicate`] is returned.
/// - An existing list gets `value` appended; an existing single value is
///   promoted to `[existing, value]`.
/// - Otherwise a node target gets the property set, and a list target gets
///   a new `{property: value}` wrapper appended.
///
/// A scalar container (for example an empty `<servers/>`) is replaced by
/// an empty node first.
pub fn insert_or_append(container: &mut Value, property: &str, value: Value) -> MergeOutcome {
    if matches!(container, Value::Scalar(_)) {
        *container = Value::Node(Node::new());
    }

    let carrier = match container {
        Value::List(items) => items
            .iter()
            .position(|item| item.as_node().is_some_and(|n| n.contains(property))),
        _ => None,
    };
    let target = match (container, carrier) {
        (Value::List(items), Some(pos)) => &mut items[pos],
        (other, _) => other,
    };

    let id = value.id().map(str::to_owned);

    match target {
        Value::Node(node) => match node.get_mut(property) {
            Some(existing) => {
                if let Some(id) = find_duplicate(existing.items(), id.as_deref()) {
                    return MergeOutcome::Duplicate { id };
                }
                existing.append(value);
            }
            None => node.insert(property, value),
        },
        Value::List(items) => {
            if let Some(id) = find_duplicate(items, id.as_deref()) {
                return MergeOutcome::Duplicate { id };
            }
            items.push(Value::Node(Node::new().with(property, value)));
        }
        Value::Scalar(_) => {
            *target = Value::Node(Node::new().with(property, value));
        }
    }

    MergeOutcome::Inserted
}

fn find_duplicate(candidates: &[Value], id: Option<&str>) -> Option<String> {
    let id = id?;
    candidates
        .iter()
        .any(|candidate| candidate.has_id(id))
        .then(|| id.to_string())
}
