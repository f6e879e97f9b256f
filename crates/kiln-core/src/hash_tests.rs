use crate::hash::{ContentHash, FilenameTemplate, TemplateError};

#[test]
fn hash_is_stable_hex() {
    let hash = ContentHash::of(b"hello");
    assert_eq!(hash, ContentHash::of(b"hello"));
    assert_eq!(hash.to_string(), "3610a686");
    assert_ne!(hash, ContentHash::of(b"hello!"));
}

#[test]
fn render_bundle_name() {
    let template = FilenameTemplate::parse("app-[contenthash].bundle.js").unwrap();
    let name = template.render("app", ".js", b"hello");
    assert_eq!(name, "app-3610a686.bundle.js");
}

#[test]
fn render_is_idempotent_per_content() {
    let template = FilenameTemplate::parse("[name]-[contenthash].js").unwrap();
    let a = template.render("app", ".js", b"console.log(1)");
    let b = template.render("app", ".js", b"console.log(1)");
    let c = template.render("app", ".js", b"console.log(2)");
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn render_asset_name_with_ext() {
    let template = FilenameTemplate::parse("[contenthash][ext]").unwrap();
    let name = template.render("logo", ".png", b"\x89PNG");
    assert!(name.ends_with(".png"));
    assert_eq!(name.len(), 8 + 4);

    let bare = template.render("LICENSE", "", b"mit");
    assert_eq!(bare.len(), 8);
}

#[test]
fn template_requires_contenthash() {
    let err = FilenameTemplate::parse("app.bundle.js").unwrap_err();
    assert_eq!(err, TemplateError::MissingContentHash("app.bundle.js".into()));
}

#[test]
fn template_rejects_unknown_placeholder() {
    let err = FilenameTemplate::parse("[hash]-[contenthash].js").unwrap_err();
    assert!(matches!(err, TemplateError::UnknownPlaceholder { ref token, .. } if token == "hash"));
}

#[test]
fn template_rejects_unclosed_and_separators() {
    assert!(matches!(
        FilenameTemplate::parse("app-[contenthash.js"),
        Err(TemplateError::Unclosed(_))
    ));
    assert!(matches!(
        FilenameTemplate::parse("js/[contenthash].js"),
        Err(TemplateError::PathSeparator(_))
    ));
}
