//! # Field Paths — Dotted Addresses Into Value Trees
//!
//! A [`FieldPath`] addresses a node inside either representation of a
//! schema document, or inside a data instance. Paths are written in dotted
//! form (`Address.properties.0.value`) and parsed once into tagged
//! [`PathSegment`]s, so resolution never has to sniff whether a segment is
//! a key or an index.
//!
//! ## Operations
//!
//! - [`get`] follows a path and returns the node, if every segment exists.
//! - [`set`] returns a new tree with the leaf written, creating intermediate
//!   containers as needed.
//! - [`delete`] returns a new tree with the leaf removed and every container
//!   along the path that became empty pruned away.
//!
//! `set` and `delete` never mutate their input. A failed `set` leaves the
//! caller holding the untouched original.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::error::{json_type_name, PathError};

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// An object key.
    Field(String),
    /// An array position.
    Index(usize),
}

impl PathSegment {
    /// Classify a single segment of dotted text.
    ///
    /// A segment made only of ASCII digits is an index; anything else is a
    /// field name.
    pub fn parse(text: &str) -> Self {
        if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(index) = text.parse::<usize>() {
                return Self::Index(index);
            }
        }
        Self::Field(text.to_string())
    }

    /// The object key this segment addresses when applied to an object.
    pub fn as_key(&self) -> Cow<'_, str> {
        match self {
            Self::Field(name) => Cow::Borrowed(name),
            Self::Index(index) => Cow::Owned(index.to_string()),
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => f.write_str(name),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(name: &str) -> Self {
        Self::Field(name.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// A parsed dotted path. The empty path addresses the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    /// The path addressing the root of a tree.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Parse dotted text into a path.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::EmptySegment`] for `"a..b"`, `".a"` or `"a."`.
    pub fn parse(text: &str) -> Result<Self, PathError> {
        if text.is_empty() {
            return Ok(Self::root());
        }
        text.split('.')
            .enumerate()
            .map(|(position, part)| {
                if part.is_empty() {
                    Err(PathError::EmptySegment {
                        path: text.to_string(),
                        position,
                    })
                } else {
                    Ok(PathSegment::parse(part))
                }
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    /// The segments of this path, root first.
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Returns true if this path addresses the root.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if this path has no segments.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append a segment in place.
    pub fn push(&mut self, segment: impl Into<PathSegment>) {
        self.0.push(segment.into());
    }

    /// A new path with `segment` appended.
    pub fn child(&self, segment: impl Into<PathSegment>) -> Self {
        let mut path = self.clone();
        path.push(segment);
        path
    }

    /// The path without its last segment, or `None` at the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, init) = self.0.split_last()?;
        Some(Self(init.to_vec()))
    }

    /// The last segment, or `None` at the root.
    pub fn last(&self) -> Option<&PathSegment> {
        self.0.last()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(&self.0))
    }
}

impl FromStr for FieldPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Vec<PathSegment>> for FieldPath {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }
}

impl FromIterator<PathSegment> for FieldPath {
    fn from_iter<I: IntoIterator<Item = PathSegment>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn render(segments: &[PathSegment]) -> String {
    segments
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

/// Follow `path` through `tree`.
///
/// Returns `None` as soon as a segment is absent. An index segment applied
/// to an object looks up its decimal key; a field segment applied to an
/// array is always absent.
pub fn get<'a>(tree: &'a Value, path: &FieldPath) -> Option<&'a Value> {
    path.segments()
        .iter()
        .try_fold(tree, |node, segment| child(node, segment))
}

fn child<'a>(node: &'a Value, segment: &PathSegment) -> Option<&'a Value> {
    match (node, segment) {
        (Value::Object(map), segment) => map.get(segment.as_key().as_ref()),
        (Value::Array(items), PathSegment::Index(index)) => items.get(*index),
        _ => None,
    }
}

fn child_mut<'a>(node: &'a mut Value, segment: &PathSegment) -> Option<&'a mut Value> {
    match (node, segment) {
        (Value::Object(map), segment) => map.get_mut(segment.as_key().as_ref()),
        (Value::Array(items), PathSegment::Index(index)) => items.get_mut(*index),
        _ => None,
    }
}

/// Number of `null`s [`set`] may insert to reach an index past the end of
/// an array.
pub const MAX_INDEX_GAP: usize = 1024;

/// Return a copy of `tree` with `value` written at `path`.
///
/// Missing intermediate containers are created: an array when the next
/// segment is an index, an object otherwise. `null` intermediates count as
/// missing. Writing past the end of an array pads it with `null`, at most
/// [`MAX_INDEX_GAP`] of them.
///
/// # Errors
///
/// Returns [`PathError::InvalidPath`] if the path passes through a string,
/// number or boolean, or addresses an array by field name, and
/// [`PathError::IndexOutOfRange`] if an index lies more than
/// [`MAX_INDEX_GAP`] past the end of its array. The input tree is never
/// modified.
pub fn set(tree: &Value, path: &FieldPath, value: Value) -> Result<Value, PathError> {
    set_in(tree.clone(), path.segments(), 0, value)
}

fn set_in(
    node: Value,
    segments: &[PathSegment],
    depth: usize,
    value: Value,
) -> Result<Value, PathError> {
    let Some(segment) = segments.get(depth) else {
        return Ok(value);
    };

    match node {
        Value::Object(mut map) => {
            let key = segment.as_key().into_owned();
            let existing = map.get_mut(&key).map(Value::take).unwrap_or(Value::Null);
            let updated = set_in(existing, segments, depth + 1, value)?;
            map.insert(key, updated);
            Ok(Value::Object(map))
        }
        Value::Array(mut items) => match segment {
            PathSegment::Index(index) => {
                let index = *index;
                if index - index.min(items.len()) > MAX_INDEX_GAP {
                    return Err(PathError::IndexOutOfRange {
                        path: render(&segments[..depth]),
                        index,
                        len: items.len(),
                    });
                }
                let existing = items.get_mut(index).map(Value::take).unwrap_or(Value::Null);
                let updated = set_in(existing, segments, depth + 1, value)?;
                if index < items.len() {
                    items[index] = updated;
                } else {
                    items.resize(index, Value::Null);
                    items.push(updated);
                }
                Ok(Value::Array(items))
            }
            PathSegment::Field(_) => Err(PathError::InvalidPath {
                path: render(&segments[..depth]),
                found: "array",
            }),
        },
        Value::Null => {
            let fresh = match segment {
                PathSegment::Index(_) => Value::Array(Vec::new()),
                PathSegment::Field(_) => Value::Object(Map::new()),
            };
            set_in(fresh, segments, depth, value)
        }
        scalar => Err(PathError::InvalidPath {
            path: render(&segments[..depth]),
            found: json_type_name(&scalar),
        }),
    }
}

/// Return a copy of `tree` with the node at `path` removed.
///
/// Every container on the path that is left empty by the removal is
/// removed from its own parent in turn. Returns `None` when the tree itself
/// ends up empty (or when `path` is the root), signalling that the caller
/// should clear the value entirely. A path that does not resolve yields the
/// tree unchanged.
pub fn delete(tree: &Value, path: &FieldPath) -> Option<Value> {
    if path.is_root() {
        return None;
    }
    let mut pruned = tree.clone();
    if remove_at(&mut pruned, path.segments()) && is_empty_container(&pruned) {
        tracing::debug!(path = %path, "deletion emptied the whole tree");
        return None;
    }
    Some(pruned)
}

/// Remove the node at `segments` below `node`. Returns true if anything
/// was removed.
fn remove_at(node: &mut Value, segments: &[PathSegment]) -> bool {
    let Some((segment, rest)) = segments.split_first() else {
        return false;
    };

    if rest.is_empty() {
        return detach(node, segment);
    }

    let emptied = {
        let Some(next) = child_mut(node, segment) else {
            return false;
        };
        if !remove_at(next, rest) {
            return false;
        }
        is_empty_container(next)
    };

    if emptied {
        detach(node, segment);
    }
    true
}

fn detach(node: &mut Value, segment: &PathSegment) -> bool {
    match (node, segment) {
        (Value::Object(map), segment) => map.shift_remove(segment.as_key().as_ref()).is_some(),
        (Value::Array(items), PathSegment::Index(index)) if *index < items.len() => {
            items.remove(*index);
            true
        }
        _ => false,
    }
}

fn is_empty_container(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}
