//! Gradient resolution
//!
//! A reference such as `fill:url(#g)` can be replaced by a literal color
//! whenever the gradient behind it has fewer than two stops. Gradients may
//! borrow their stops from another gradient through `href`/`xlink:href`;
//! the chain is followed to the gradient that has no further link.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace, warn};

use super::document::{Document, NodeId};
use crate::core::ArtboxError;

/// Color used for gradients without stops and for ids that do not exist
pub const TRANSPARENT: &str = "rgba(0,0,0,0)";

/// Tag names treated as gradient definitions
pub const GRADIENT_TAGS: &[&str] = &["linearGradient", "radialGradient"];

static STOP_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"stop-color:([^;]*)(?:;|$)").expect("valid regex"));

/// Whether `name` is a gradient tag
pub fn is_gradient_tag(name: &str) -> bool {
    GRADIENT_TAGS.contains(&name)
}

/// Result of resolving a gradient id
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorExpr {
    /// Literal color such as `#ff0000` or `rgba(0,0,0,0)`
    Literal(String),
    /// The gradient must stay; references keep pointing at it
    Reference(String),
}

impl ColorExpr {
    pub fn is_reference(&self) -> bool {
        matches!(self, ColorExpr::Reference(_))
    }
}

impl fmt::Display for ColorExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorExpr::Literal(color) => f.write_str(color),
            ColorExpr::Reference(id) => write!(f, "url(#{})", id),
        }
    }
}

/// Map from `id` attribute to the element declaring it
#[derive(Debug, Default, Clone)]
pub struct IdIndex {
    ids: HashMap<String, NodeId>,
}

impl IdIndex {
    /// Index every live element with a non-empty `id`; later duplicates win
    pub fn build(document: &Document) -> Self {
        let mut ids = HashMap::new();
        for root in document.roots() {
            for node in document.descendants(*root) {
                if let Some(id) = document.element(node).and_then(|e| e.id()) {
                    ids.insert(id.to_string(), node);
                }
            }
        }
        debug!(id_count = ids.len(), "Built identifier index");
        Self { ids }
    }

    pub fn get(&self, id: &str) -> Option<NodeId> {
        self.ids.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Target id of an `href`/`xlink:href` of the form `#other`
fn link_target(document: &Document, node: NodeId) -> Option<&str> {
    document
        .attribute(node, "href")
        .or_else(|| document.attribute(node, "xlink:href"))
        .and_then(|href| href.strip_prefix('#'))
        .filter(|target| !target.is_empty())
}

/// Follow inheritance links from `start` to the element that has none
///
/// A link to an unknown id ends the chain at the current element. A link
/// back to an element already on the chain also ends it there, so cyclic
/// documents terminate.
pub fn walk_chain(document: &Document, index: &IdIndex, start: NodeId) -> NodeId {
    let mut current = start;
    let mut visited = HashSet::from([start]);

    while let Some(target) = link_target(document, current) {
        let Some(next) = index.get(target) else {
            trace!(link = %target, "Inheritance link points at unknown id");
            break;
        };
        if !visited.insert(next) {
            warn!(link = %target, "Cyclic gradient inheritance, stopping walk");
            break;
        }
        current = next;
    }
    current
}

/// Per-document resolver holding the identifier index and the resolution cache
#[derive(Debug)]
pub struct GradientResolver {
    index: IdIndex,
    cache: HashMap<String, ColorExpr>,
}

impl GradientResolver {
    /// Build the index for `document`; must run before any rewriting
    pub fn new(document: &Document) -> Self {
        Self {
            index: IdIndex::build(document),
            cache: HashMap::new(),
        }
    }

    pub fn index(&self) -> &IdIndex {
        &self.index
    }

    /// Resolve `id` to a literal color or a reference to itself
    ///
    /// Unknown ids resolve to [`TRANSPARENT`]; a referenced element that is
    /// not a gradient (a `pattern`, for instance) is kept as a reference.
    pub fn resolve(&mut self, document: &Document, id: &str) -> Result<ColorExpr, ArtboxError> {
        if let Some(cached) = self.cache.get(id) {
            return Ok(cached.clone());
        }

        let resolved = self.resolve_uncached(document, id)?;
        trace!(id, resolved = %resolved, "Resolved gradient");
        self.cache.insert(id.to_string(), resolved.clone());
        Ok(resolved)
    }

    fn resolve_uncached(&self, document: &Document, id: &str) -> Result<ColorExpr, ArtboxError> {
        let Some(start) = self.index.get(id) else {
            debug!(id, "Unknown paint server id, treating as transparent");
            return Ok(ColorExpr::Literal(TRANSPARENT.to_string()));
        };

        let terminal = walk_chain(document, &self.index, start);
        if !document.tag_name(terminal).is_some_and(is_gradient_tag) {
            return Ok(ColorExpr::Reference(id.to_string()));
        }

        let stops: Vec<NodeId> = document.child_elements_named(terminal, "stop").collect();
        match stops.as_slice() {
            [] => Ok(ColorExpr::Literal(TRANSPARENT.to_string())),
            [stop] => {
                let style = document.attribute(*stop, "style").unwrap_or_default();
                STOP_COLOR
                    .captures(style)
                    .map(|caps| ColorExpr::Literal(caps[1].trim().to_string()))
                    .ok_or_else(|| ArtboxError::malformed_stop(id))
            }
            _ => Ok(ColorExpr::Reference(id.to_string())),
        }
    }
}
