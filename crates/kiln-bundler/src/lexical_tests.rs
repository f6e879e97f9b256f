use indoc::indoc;

use crate::lexical::{Region, Regions};

fn region_of(source: &str, needle: &str) -> Region {
    let at = source.find(needle).unwrap();
    Regions::scan(source).at(at)
}

#[test]
fn comments_and_strings() {
    let source = indoc! {r#"
        // line comment
        const a = "double // not a comment";
        /* block
           comment */ const b = 'single';
        call();
    "#};
    assert_eq!(region_of(source, "line comment"), Region::Comment);
    assert_eq!(region_of(source, "not a comment"), Region::Literal);
    assert_eq!(region_of(source, "comment */"), Region::Comment);
    assert_eq!(region_of(source, "const b"), Region::Code);
    assert_eq!(region_of(source, "single"), Region::Literal);
    assert_eq!(region_of(source, "call"), Region::Code);
}

#[test]
fn template_substitutions_are_code() {
    let source = "const t = `head ${ fn({ a: 1 }) } tail`; after();";
    assert_eq!(region_of(source, "head"), Region::Literal);
    assert_eq!(region_of(source, "fn("), Region::Code);
    assert_eq!(region_of(source, "a: 1"), Region::Code);
    assert_eq!(region_of(source, "tail"), Region::Literal);
    assert_eq!(region_of(source, "after"), Region::Code);
}

#[test]
fn regex_literal_versus_division() {
    let source = r#"const re = /["'\/]+/g; const half = total / 2; const q = "x";"#;
    assert_eq!(region_of(source, "[\""), Region::Literal);
    assert_eq!(region_of(source, "const half"), Region::Code);
    assert_eq!(region_of(source, " 2;"), Region::Code);
    assert_eq!(region_of(source, "x\""), Region::Literal);
}

#[test]
fn continues_literal_only_past_the_opening() {
    let source = "`one\n  two`";
    let regions = Regions::scan(source);
    assert!(!regions.continues_literal(0));
    assert!(regions.continues_literal(5));
    assert!(!regions.continues_literal(source.len()));
}

#[test]
fn masking_comments_keeps_offsets() {
    let source = "a(); /* é */ b(); // c\nd();";
    let masked = Regions::scan(source).mask_comments(source);
    assert_eq!(masked.len(), source.len());
    assert_eq!(masked.find("b()"), source.find("b()"));
    assert_eq!(masked.find("d()"), source.find("d()"));
    assert!(!masked.contains('/'));
}
