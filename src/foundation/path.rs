use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::fmt;

/// One step into a JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Object member.
    Key(String),
    /// Array element.
    Index(usize),
}

/// Location of a value inside an animation graph, e.g. `ks.p` or `shapes[0].it[1].c`.
///
/// Paths are relative to whatever the owner anchors them to (a layer for property slots, the
/// document root for validation problems).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PropertyPath(SmallVec<[PathSegment; 6]>);

impl PropertyPath {
    /// Empty path (the anchor itself).
    pub fn root() -> Self {
        Self::default()
    }

    /// Return a copy of `self` extended by an object key.
    pub fn key(&self, k: impl Into<String>) -> Self {
        let mut out = self.clone();
        out.0.push(PathSegment::Key(k.into()));
        out
    }

    /// Return a copy of `self` extended by an array index.
    pub fn index(&self, i: usize) -> Self {
        let mut out = self.clone();
        out.0.push(PathSegment::Index(i));
        out
    }

    /// Segments in order from the anchor.
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Last object key on the path, if any.
    pub fn last_key(&self) -> Option<&str> {
        self.0.iter().rev().find_map(|s| match s {
            PathSegment::Key(k) => Some(k.as_str()),
            PathSegment::Index(_) => None,
        })
    }

    /// Return `true` when the path has no segments.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Resolve this path inside `root`, returning the addressed value.
    pub fn resolve<'a>(&self, root: &'a serde_json::Value) -> Option<&'a serde_json::Value> {
        self.0.iter().try_fold(root, |v, seg| match seg {
            PathSegment::Key(k) => v.get(k.as_str()),
            PathSegment::Index(i) => v.get(*i),
        })
    }

    /// Mutable variant of [`PropertyPath::resolve`].
    pub fn resolve_mut<'a>(
        &self,
        root: &'a mut serde_json::Value,
    ) -> Option<&'a mut serde_json::Value> {
        self.0.iter().try_fold(root, |v, seg| match seg {
            PathSegment::Key(k) => v.get_mut(k.as_str()),
            PathSegment::Index(i) => v.get_mut(*i),
        })
    }

    /// Resolve a path anchored at an object map (a layer's flattened properties).
    pub fn resolve_in<'a>(
        &self,
        map: &'a BTreeMap<String, serde_json::Value>,
    ) -> Option<&'a serde_json::Value> {
        let (PathSegment::Key(first), rest) = self.0.split_first()? else {
            return None;
        };
        rest.iter().try_fold(map.get(first)?, |v, seg| match seg {
            PathSegment::Key(k) => v.get(k.as_str()),
            PathSegment::Index(i) => v.get(*i),
        })
    }

    /// Mutable variant of [`PropertyPath::resolve_in`].
    pub fn resolve_in_mut<'a>(
        &self,
        map: &'a mut BTreeMap<String, serde_json::Value>,
    ) -> Option<&'a mut serde_json::Value> {
        let (PathSegment::Key(first), rest) = self.0.split_first()? else {
            return None;
        };
        rest.iter().try_fold(map.get_mut(first)?, |v, seg| match seg {
            PathSegment::Key(k) => v.get_mut(k.as_str()),
            PathSegment::Index(i) => v.get_mut(*i),
        })
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.0.iter().enumerate() {
            match seg {
                PathSegment::Key(k) if i == 0 => write!(f, "{k}")?,
                PathSegment::Key(k) => write!(f, ".{k}")?,
                PathSegment::Index(idx) => write!(f, "[{idx}]")?,
            }
        }
        Ok(())
    }
}

impl<S: Into<String>> FromIterator<S> for PropertyPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(|s| PathSegment::Key(s.into())).collect())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/path.rs"]
mod tests;
