//! Text-level rewriting of `style` declarations
//!
//! Style strings are treated as text: only the matched declarations change,
//! everything else keeps its bytes and its order.

use std::sync::LazyLock;

use regex::Regex;

use super::gradient::ColorExpr;
use crate::core::ArtboxError;

static DEFAULT_VISIBILITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"visibility:visible(?:;|$)").expect("valid regex"));
static FILL_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"fill:url\(#([A-Za-z0-9_-]+)\)").expect("valid regex"));
static STROKE_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"stroke:url\(#([A-Za-z0-9_-]+)\)").expect("valid regex"));
static PAINT_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[ \t\r\n]*url\(#([A-Za-z0-9_-]+)\)[ \t\r\n]*$").expect("valid regex")
});

/// Delete every `visibility:visible` declaration together with its terminator
pub fn strip_default_visibility(style: &str) -> String {
    DEFAULT_VISIBILITY.replace_all(style, "").into_owned()
}

/// Replace each `<property>:url(#id)` match of `pattern` with `<property>:<resolved>`
fn replace_references<F>(
    text: &str,
    pattern: &Regex,
    property: &str,
    resolve: &mut F,
) -> Result<String, ArtboxError>
where
    F: FnMut(&str) -> Result<ColorExpr, ArtboxError>,
{
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in pattern.captures_iter(text) {
        let whole = caps.get_match();
        out.push_str(&text[last..whole.start()]);
        out.push_str(property);
        out.push(':');
        out.push_str(&resolve(&caps[1])?.to_string());
        last = whole.end();
    }
    out.push_str(&text[last..]);
    Ok(out)
}

/// Rewrite one style string
///
/// Order: drop `visibility:visible`, then resolve `fill:url(#id)`, then
/// `stroke:url(#id)`. Returns `None` when the result equals the input.
pub fn rewrite_style<F>(style: &str, mut resolve: F) -> Result<Option<String>, ArtboxError>
where
    F: FnMut(&str) -> Result<ColorExpr, ArtboxError>,
{
    let rewritten = strip_default_visibility(style);
    let rewritten = replace_references(&rewritten, &FILL_REFERENCE, "fill", &mut resolve)?;
    let rewritten = replace_references(&rewritten, &STROKE_REFERENCE, "stroke", &mut resolve)?;
    Ok((rewritten != style).then_some(rewritten))
}

/// Rewrite a `fill`/`stroke` presentation attribute whose value is `url(#id)`
pub fn rewrite_paint_attribute<F>(value: &str, mut resolve: F) -> Result<Option<String>, ArtboxError>
where
    F: FnMut(&str) -> Result<ColorExpr, ArtboxError>,
{
    let Some(caps) = PAINT_REFERENCE.captures(value) else {
        return Ok(None);
    };
    let resolved = resolve(&caps[1])?;
    if resolved.is_reference() {
        return Ok(None);
    }
    Ok(Some(resolved.to_string()))
}
