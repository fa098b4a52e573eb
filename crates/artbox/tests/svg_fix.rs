//! End-to-end behavior of the gradient-style fix

use std::fs;

use artbox::svg::{fix_markup, fix_svg_file, fix_svg_tree, Document, TRANSPARENT};
use proptest::prelude::*;

const INKSCAPE_EXPORT: &str = r##"<?xml version="1.0" encoding="UTF-8" standalone="no"?>
<!-- Created with Inkscape (http://www.inkscape.org/) -->
<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="64" height="64">
  <defs id="defs2">
    <linearGradient id="swatch1"><stop style="stop-color:#ff0000;stop-opacity:1" offset="0"/></linearGradient>
    <linearGradient id="empty"/>
    <linearGradient id="ramp"><stop style="stop-color:#000000;" offset="0"/><stop style="stop-color:#ffffff;" offset="1"/></linearGradient>
    <linearGradient id="alias" xlink:href="#swatch1" x1="0" y1="0" x2="1" y2="1"/>
  </defs>
  <g id="layer1" style="display:inline;visibility:visible">
    <path d="M 0,0 H 10" style="fill:url(#alias);stroke:url(#empty);stroke-width:2"/>
    <rect width="4" height="4" style="fill:url(#ramp);visibility:visible;opacity:0.5"/>
  </g>
</svg>
"##;

fn fixed(markup: &str) -> String {
    fix_markup(markup).unwrap().expect("document should change")
}

#[test]
fn test_untouched_markup_is_byte_identical() {
    let svg = "<?xml version=\"1.0\"?>\n<svg>\n  <!-- note -->\n  <rect style=\"fill:#000;stroke:none\"/>\n</svg>\n";
    assert_eq!(fix_markup(svg).unwrap(), None);
    assert_eq!(Document::parse(svg).unwrap().to_markup().unwrap(), svg);
}

#[test]
fn test_inkscape_export() {
    let out = fixed(INKSCAPE_EXPORT);

    assert!(out.contains(r#"style="fill:#ff0000;stroke:rgba(0,0,0,0);stroke-width:2""#));
    assert!(out.contains(r#"style="fill:url(#ramp);opacity:0.5""#));
    assert!(out.contains(r#"style="display:inline;""#));

    assert!(out.contains(r#"id="ramp""#));
    assert!(!out.contains(r#"id="swatch1""#));
    assert!(!out.contains(r#"id="empty""#));
    assert!(!out.contains(r#"id="alias""#));

    assert!(out.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?>"));
    assert!(out.contains("<!-- Created with Inkscape (http://www.inkscape.org/) -->"));
}

#[test]
fn test_second_run_changes_nothing() {
    let once = fixed(INKSCAPE_EXPORT);
    assert_eq!(fix_markup(&once).unwrap(), None);
}

#[test]
fn test_zero_stop_stroke_is_transparent() {
    let out = fixed(r#"<svg><defs><linearGradient id="g2"/></defs><path style="stroke:url(#g2)"/></svg>"#);
    assert!(out.contains(&format!("stroke:{}", TRANSPARENT)));
}

#[test]
fn test_multi_stop_gradient_survives() {
    let svg = r#"<svg><defs><linearGradient id="g3"><stop style="stop-color:#000;"/><stop style="stop-color:#fff;"/></linearGradient></defs><path style="fill:url(#g3)"/></svg>"#;
    assert_eq!(fix_markup(svg).unwrap(), None);
}

#[test]
fn test_chain_through_three_gradients() {
    let svg = r##"<svg><defs><linearGradient id="g4" xlink:href="#g5"/><linearGradient id="g5" xlink:href="#g6"/><linearGradient id="g6"><stop style="stop-color:#00ff00;"/></linearGradient></defs><path style="fill:url(#g4)"/></svg>"##;
    let out = fixed(svg);
    assert!(out.contains("fill:#00ff00"));
    // g5 and g6 are unreferenced now but each still resolves to a color, so all go
    assert!(!out.contains("linearGradient"));
}

#[test]
fn test_gradient_outside_defs_is_kept() {
    let svg = r#"<svg><linearGradient id="g"><stop style="stop-color:#123;"/></linearGradient><path style="fill:url(#g)"/></svg>"#;
    let out = fixed(svg);
    assert!(out.contains("fill:#123"));
    assert!(out.contains(r#"<linearGradient id="g">"#));
}

#[test]
fn test_radial_gradients_are_handled() {
    let svg = r#"<svg><defs><radialGradient id="r"><stop style="stop-color:blue"/></radialGradient></defs><circle style="fill:url(#r)"/></svg>"#;
    assert_eq!(fixed(svg), r#"<svg><defs></defs><circle style="fill:blue"/></svg>"#);
}

#[test]
fn test_escaped_attributes_survive() {
    let svg = r#"<svg><text title="a &amp; b" style="visibility:visible">x &lt; y</text></svg>"#;
    assert_eq!(
        fixed(svg),
        r#"<svg><text title="a &amp; b" style="">x &lt; y</text></svg>"#
    );
}

#[test]
fn test_fix_file_only_writes_on_change() {
    let dir = tempfile::Builder::new().prefix("artbox").tempdir().unwrap();
    let clean = dir.path().join("clean.svg");
    let dirty = dir.path().join("dirty.svg");
    fs::write(&clean, "<svg><rect/></svg>").unwrap();
    fs::write(&dirty, r#"<svg><g style="visibility:visible"/></svg>"#).unwrap();

    assert!(!fix_svg_file(&clean).unwrap());
    assert!(fix_svg_file(&dirty).unwrap());
    assert_eq!(fs::read_to_string(&dirty).unwrap(), r#"<svg><g style=""/></svg>"#);
}

#[test]
fn test_tree_reports_failures_and_continues() {
    let dir = tempfile::Builder::new().prefix("artbox").tempdir().unwrap();
    let nested = dir.path().join("set");
    fs::create_dir_all(&nested).unwrap();
    fs::write(
        nested.join("bad.svg"),
        r#"<svg><defs><linearGradient id="g"><stop/></linearGradient></defs><rect style="fill:url(#g)"/></svg>"#,
    )
    .unwrap();
    fs::write(nested.join("good.svg"), r#"<svg><g style="visibility:visible;"/></svg>"#).unwrap();
    fs::write(nested.join("notes.txt"), "ignored").unwrap();

    let report = fix_svg_tree(dir.path()).unwrap();
    assert_eq!(report.processed, 2);
    assert_eq!(report.written, vec![nested.join("good.svg")]);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].path.ends_with("bad.svg"));
}

proptest! {
    #[test]
    fn prop_styles_without_references_are_left_alone(
        declarations in proptest::collection::vec("[a-z-]{1,8}:[a-z0-9#.]{1,8}", 0..6)
    ) {
        let style = declarations.join(";");
        prop_assume!(!style.contains("visibility:visible"));
        let svg = format!(r#"<svg><rect style="{}"/></svg>"#, style);
        prop_assert_eq!(fix_markup(&svg).unwrap(), None);
    }

    #[test]
    fn prop_fix_is_idempotent(color in "#[0-9a-f]{6}", visible in any::<bool>()) {
        let visibility = if visible { "visibility:visible;" } else { "" };
        let svg = format!(
            r#"<svg><defs><linearGradient id="g"><stop style="stop-color:{};"/></linearGradient></defs><path style="{}fill:url(#g)"/></svg>"#,
            color, visibility
        );
        let once = fix_markup(&svg).unwrap().unwrap();
        let expected = format!("fill:{}", color);
        prop_assert!(once.contains(&expected));
        prop_assert_eq!(fix_markup(&once).unwrap(), None);
    }
}
