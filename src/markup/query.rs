//! Tag-path queries over a markup tree.
//!
//! Paths are slash-separated steps, each either `local`, `prefix:local` or
//! `*`. Prefixes are looked up in the [`Namespaces`] harvested from the part,
//! with `default` naming the unprefixed namespace. A bare `local` matches in
//! any namespace.
//!
//! - `sheets/sheet` starts at the children of the element queried from.
//! - `.//sheet` (or `//sheet`) starts at any descendant.
//!
//! An empty match set is an empty result, not an error.

use std::collections::BTreeMap;

use super::{Element, Node};
use crate::error::{Result, SheetpatchError};
use crate::namespaces::Namespaces;

/// What a query returns for each matched element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    /// The matched elements themselves.
    Raw,
    /// Each element's direct text content.
    Text,
    /// Each element's attributes, keyed by qualified name.
    Attributes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResult<'a> {
    Nodes(Vec<&'a Element>),
    Text(Vec<String>),
    Attributes(Vec<BTreeMap<String, String>>),
}

impl QueryResult<'_> {
    pub fn len(&self) -> usize {
        match self {
            Self::Nodes(v) => v.len(),
            Self::Text(v) => v.len(),
            Self::Attributes(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Run `path` from `root` and shape the matches according to `mode`.
pub fn query<'a>(
    root: &'a Element,
    path: &str,
    namespaces: &Namespaces,
    mode: QueryMode,
) -> Result<QueryResult<'a>> {
    let nodes = select(root, path, namespaces)?;
    Ok(match mode {
        QueryMode::Raw => QueryResult::Nodes(nodes),
        QueryMode::Text => QueryResult::Text(nodes.into_iter().map(Element::text).collect()),
        QueryMode::Attributes => {
            QueryResult::Attributes(nodes.into_iter().map(attribute_map).collect())
        }
    })
}

/// Matched elements, in document order.
pub fn select<'a>(
    root: &'a Element,
    path: &str,
    namespaces: &Namespaces,
) -> Result<Vec<&'a Element>> {
    let located = locate(root, path, namespaces)?;
    Ok(located
        .iter()
        .filter_map(|indices| element_at(root, indices))
        .collect())
}

/// Direct text content of every matched element.
pub fn select_text(root: &Element, path: &str, namespaces: &Namespaces) -> Result<Vec<String>> {
    Ok(select(root, path, namespaces)?
        .into_iter()
        .map(Element::text)
        .collect())
}

/// Attribute map of every matched element.
pub fn select_attributes(
    root: &Element,
    path: &str,
    namespaces: &Namespaces,
) -> Result<Vec<BTreeMap<String, String>>> {
    Ok(select(root, path, namespaces)?
        .into_iter()
        .map(attribute_map)
        .collect())
}

/// First matched element, borrowed mutably for in-place edits.
pub fn select_first_mut<'a>(
    root: &'a mut Element,
    path: &str,
    namespaces: &Namespaces,
) -> Result<Option<&'a mut Element>> {
    let located = locate(root, path, namespaces)?;
    let Some(indices) = located.into_iter().next() else {
        return Ok(None);
    };

    let mut current = root;
    for index in indices {
        match current.children_mut().get_mut(index) {
            Some(Node::Element(child)) => current = child,
            _ => return Ok(None),
        }
    }
    Ok(Some(current))
}

fn attribute_map(element: &Element) -> BTreeMap<String, String> {
    element
        .attributes()
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

struct Step<'p> {
    namespace: Option<String>,
    local: &'p str,
}

impl Step<'_> {
    fn matches(&self, element: &Element) -> bool {
        (self.local == "*" || element.local_name() == self.local)
            && self
                .namespace
                .as_deref()
                .map_or(true, |ns| element.namespace() == Some(ns))
    }
}

fn parse_path<'p>(path: &'p str, namespaces: &Namespaces) -> Result<(bool, Vec<Step<'p>>)> {
    let (descendant, rest) = if let Some(rest) = path.strip_prefix(".//") {
        (true, rest)
    } else if let Some(rest) = path.strip_prefix("//") {
        (true, rest)
    } else {
        (false, path.strip_prefix("./").unwrap_or(path))
    };

    let mut steps = Vec::new();
    for raw in rest.split('/') {
        if raw.is_empty() {
            return Err(SheetpatchError::Parse(format!("empty step in path '{path}'")));
        }
        let step = match raw.split_once(':') {
            Some((prefix, local)) => {
                let uri = namespaces.get(prefix).ok_or_else(|| {
                    SheetpatchError::Parse(format!(
                        "unknown namespace prefix '{prefix}' in path '{path}'"
                    ))
                })?;
                Step {
                    namespace: Some(uri.to_string()),
                    local,
                }
            }
            None => Step {
                namespace: None,
                local: raw,
            },
        };
        steps.push(step);
    }
    Ok((descendant, steps))
}

/// Child-index paths (from `root`) of every match.
fn locate(root: &Element, path: &str, namespaces: &Namespaces) -> Result<Vec<Vec<usize>>> {
    let (descendant, steps) = parse_path(path, namespaces)?;
    let Some((first, rest)) = steps.split_first() else {
        return Ok(Vec::new());
    };

    let mut current = Vec::new();
    if descendant {
        collect_descendants(root, first, &mut Vec::new(), &mut current);
    } else {
        collect_children(root, first, &[], &mut current);
    }

    for step in rest {
        let mut next = Vec::new();
        for indices in &current {
            if let Some(element) = element_at(root, indices) {
                collect_children(element, step, indices, &mut next);
            }
        }
        current = next;
    }

    Ok(current)
}

fn collect_children(element: &Element, step: &Step, prefix: &[usize], out: &mut Vec<Vec<usize>>) {
    for (i, node) in element.children().iter().enumerate() {
        if let Node::Element(child) = node {
            if step.matches(child) {
                let mut indices = prefix.to_vec();
                indices.push(i);
                out.push(indices);
            }
        }
    }
}

fn collect_descendants(
    element: &Element,
    step: &Step,
    trail: &mut Vec<usize>,
    out: &mut Vec<Vec<usize>>,
) {
    for (i, node) in element.children().iter().enumerate() {
        if let Node::Element(child) = node {
            trail.push(i);
            if step.matches(child) {
                out.push(trail.clone());
            }
            collect_descendants(child, step, trail, out);
            trail.pop();
        }
    }
}

fn element_at<'a>(root: &'a Element, indices: &[usize]) -> Option<&'a Element> {
    let mut current = root;
    for &index in indices {
        match current.children().get(index) {
            Some(Node::Element(child)) => current = child,
            _ => return None,
        }
    }
    Some(current)
}
