//! Gradient-style cleanup for editor exports
//!
//! Some vector editors reject `fill:url(#id)` pointing at single-stop
//! gradients, which is how Inkscape stores flat swatch colors. The fix runs
//! in two passes over a document:
//!
//! 1. index ids, then rewrite every `style` (and `fill`/`stroke` attribute)
//!    children first, flattening single-stop and empty gradients;
//! 2. remove every gradient in a `defs` container that no longer resolves
//!    to itself.
//!
//! Running the fix on its own output changes nothing.
//!
//! Only the exact `fill:url(#id)` and `stroke:url(#id)` spellings with ids
//! made of `[A-Za-z0-9_-]` are rewritten. Other references to a pruned
//! gradient (`fill: url(#id)`, `url('#id')`, ids containing `.`) are left
//! dangling and reported with a warning.

use std::fs;
use std::path::Path;

use tracing::{debug, info, span, trace, warn, Level};

use super::document::{Document, NodeId};
use super::gradient::{is_gradient_tag, ColorExpr, GradientResolver};
use super::style::{rewrite_paint_attribute, rewrite_style};
use crate::core::walk::collect_with_extensions;
use crate::core::{ArtboxError, BatchReport};

/// Directory the CLI scans when none is given
pub const DEFAULT_VECTOR_DIR: &str = "vector";

/// Presentation attributes that may carry a `url(#id)` paint
const PAINT_ATTRIBUTES: &[&str] = &["fill", "stroke"];

/// Rewrite styles and prune dead gradients; returns whether anything changed
pub fn fix_document(document: &mut Document) -> Result<bool, ArtboxError> {
    let fix_span = span!(Level::DEBUG, "fix_document");
    let _enter = fix_span.enter();

    let mut resolver = GradientResolver::new(document);
    let restyled = rewrite_styles(document, &mut resolver)?;
    let pruned = prune_dead_gradients(document, &mut resolver)?;

    debug!(restyled, pruned, "Gradient fix finished");
    Ok(restyled || pruned)
}

/// First pass: rewrite style strings bottom-up
pub fn rewrite_styles(
    document: &mut Document,
    resolver: &mut GradientResolver,
) -> Result<bool, ArtboxError> {
    let mut changed = false;

    for node in document.post_order() {
        if let Some(style) = document.attribute(node, "style").map(str::to_owned) {
            let rewritten = rewrite_style(&style, |id| resolver.resolve(document, id))?;
            if let Some(rewritten) = rewritten {
                trace!(node = node.index(), before = %style, after = %rewritten, "Rewrote style");
                set_attribute(document, node, "style", rewritten);
                changed = true;
            }
        }

        for name in PAINT_ATTRIBUTES {
            if let Some(value) = document.attribute(node, name).map(str::to_owned) {
                let rewritten = rewrite_paint_attribute(&value, |id| resolver.resolve(document, id))?;
                if let Some(rewritten) = rewritten {
                    set_attribute(document, node, name, rewritten);
                    changed = true;
                }
            }
        }
    }

    Ok(changed)
}

/// Second pass: drop gradients in `defs` that no longer resolve to themselves
pub fn prune_dead_gradients(
    document: &mut Document,
    resolver: &mut GradientResolver,
) -> Result<bool, ArtboxError> {
    let mut removed: Vec<String> = Vec::new();

    for defs in document.elements_named("defs") {
        let mut dead: Vec<NodeId> = Vec::new();
        for child in document.children(defs) {
            let Some(element) = document.element(*child) else {
                continue;
            };
            if !is_gradient_tag(element.name()) {
                continue;
            }
            let Some(id) = element.id() else {
                continue;
            };
            let id = id.to_string();
            let resolved = resolver.resolve(document, &id)?;
            if resolved != ColorExpr::Reference(id.clone()) {
                trace!(id = %id, "Gradient flattened, removing definition");
                dead.push(*child);
                removed.push(id);
            }
        }

        for child in dead {
            document.remove(child);
        }
    }

    if removed.is_empty() {
        return Ok(false);
    }
    debug!(removed = removed.len(), "Pruned gradient definitions");
    dangling_references(document, &removed);
    Ok(true)
}

/// Ids from `removed` still referenced through `url(...)` by a live element
///
/// Each hit is logged with `warn!`; the result is in document order.
pub fn dangling_references(document: &Document, removed: &[String]) -> Vec<String> {
    let mut dangling = Vec::new();
    for root in document.roots() {
        for node in document.descendants(*root) {
            let Some(element) = document.element(node) else {
                continue;
            };
            for (name, value) in element.attributes() {
                for target in url_targets(value) {
                    if removed.iter().any(|id| id == target) {
                        warn!(
                            node = node.index(),
                            attribute = name,
                            id = target,
                            "Reference to pruned gradient left unresolved"
                        );
                        dangling.push(target.to_string());
                    }
                }
            }
        }
    }
    dangling
}

/// Local ids inside every `url(...)` of an attribute value
fn url_targets(value: &str) -> impl Iterator<Item = &str> {
    value.split("url(").skip(1).filter_map(|rest| {
        let inner = &rest[..rest.find(')')?];
        inner
            .trim_matches(|c: char| c.is_ascii_whitespace() || c == '"' || c == '\'')
            .strip_prefix('#')
    })
}

fn set_attribute(document: &mut Document, node: NodeId, name: &str, value: String) {
    if let Some(element) = document.element_mut(node) {
        element.set_attribute(name, value);
    }
}

/// Fix markup text; `Some(markup)` when the document changed
pub fn fix_markup(markup: &str) -> Result<Option<String>, ArtboxError> {
    let mut document = Document::parse(markup)?;
    if fix_document(&mut document)? {
        Ok(Some(document.to_markup()?))
    } else {
        Ok(None)
    }
}

/// Fix one file in place; the file is only written when it changed
pub fn fix_svg_file(path: &Path) -> Result<bool, ArtboxError> {
    let markup = fs::read_to_string(path)?;
    match fix_markup(&markup)? {
        Some(fixed) => {
            info!(path = %path.display(), "Writing");
            fs::write(path, fixed)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Fix every `.svg` below `dir`; a failing file is recorded and skipped
pub fn fix_svg_tree(dir: &Path) -> Result<BatchReport, ArtboxError> {
    let tree_span = span!(Level::INFO, "fix_svg_tree", dir = %dir.display());
    let _enter = tree_span.enter();

    let mut report = BatchReport::new();
    for path in collect_with_extensions(dir, &["svg"])? {
        report.processed += 1;
        match fix_svg_file(&path) {
            Ok(true) => report.record_written(path),
            Ok(false) => trace!(path = %path.display(), "Unchanged"),
            Err(err) => report.record_failure(&path, err),
        }
    }

    info!(%report, "SVG style fix finished");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untouched_document_is_unchanged() {
        let svg = r#"<svg><rect style="fill:#000"/></svg>"#;
        assert_eq!(fix_markup(svg).unwrap(), None);
    }

    #[test]
    fn test_flattened_gradient_is_pruned() {
        let svg = r#"<svg><defs><linearGradient id="g1"><stop style="stop-color:#ff0000;stop-opacity:1"/></linearGradient></defs><rect style="fill:url(#g1);stroke:none"/></svg>"#;
        assert_eq!(
            fix_markup(svg).unwrap().as_deref(),
            Some(r#"<svg><defs></defs><rect style="fill:#ff0000;stroke:none"/></svg>"#)
        );
    }

    #[test]
    fn test_visibility_only_counts_as_change() {
        let svg = r#"<svg><g style="visibility:visible;opacity:1"/></svg>"#;
        assert_eq!(
            fix_markup(svg).unwrap().as_deref(),
            Some(r#"<svg><g style="opacity:1"/></svg>"#)
        );
    }

    #[test]
    fn test_paint_attribute_is_resolved_before_pruning() {
        let svg = r##"<svg><defs><linearGradient id="g"><stop style="stop-color:#abc;"/></linearGradient></defs><rect fill="url(#g)"/></svg>"##;
        assert_eq!(
            fix_markup(svg).unwrap().as_deref(),
            Some(r##"<svg><defs></defs><rect fill="#abc"/></svg>"##)
        );
    }

    #[test]
    fn test_spaced_reference_is_reported_as_dangling() {
        let svg = r#"<svg><defs><linearGradient id="g"><stop style="stop-color:#123456;"/></linearGradient><linearGradient id="a.b"/></defs><rect style="fill: url(#g)"/><rect fill="url(#a.b)"/></svg>"#;
        let mut document = Document::parse(svg).unwrap();
        assert!(fix_document(&mut document).unwrap());
        assert!(document.elements_named("linearGradient").is_empty());

        let removed = ["g".to_string(), "a.b".to_string()];
        assert_eq!(dangling_references(&document, &removed), ["g", "a.b"]);
    }

    #[test]
    fn test_url_targets() {
        let targets: Vec<_> = url_targets("fill: url( '#x' );stroke:url(#y)").collect();
        assert_eq!(targets, ["x", "y"]);
        assert_eq!(url_targets("url(http://a/b)").count(), 0);
        assert_eq!(url_targets("url(#open").count(), 0);
    }

    #[test]
    fn test_malformed_stop_aborts_document() {
        let svg = r#"<svg><defs><linearGradient id="g"><stop style="opacity:1"/></linearGradient></defs><rect style="fill:url(#g)"/></svg>"#;
        assert!(matches!(
            fix_markup(svg),
            Err(ArtboxError::MalformedGradientStop { .. })
        ));
    }
}
