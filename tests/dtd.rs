use glyphxml::{
    parse, parse_dtd, parse_with_loader, ContentCategory, ContentModelNode, ErrorKind,
    MemoryLoader, Modifier, SequenceType,
};

const SVG_FONT_DTD: &[u8] = b"<!-- subset of the SVG 1.1 font module -->\n\
<!ELEMENT font (desc?, font-face, missing-glyph, (glyph | hkern | vkern)*)>\n\
<!ATTLIST font id ID #IMPLIED horiz-adv-x CDATA #REQUIRED>\n\
<!ELEMENT font-face (font-face-src?)>\n\
<!ELEMENT missing-glyph ANY>\n\
<!ELEMENT glyph ANY>\n\
<!ELEMENT hkern EMPTY>\n\
<!ELEMENT vkern EMPTY>\n\
<!ELEMENT desc (#PCDATA)>\n";

#[test]
fn content_model_array_detection() {
    let model = ContentModelNode::parse("(a,b*,c)").unwrap();
    assert!(model.is_array("b"));
    assert!(!model.is_array("a"));

    let model = ContentModelNode::parse("(a|b)*").unwrap();
    assert!(model.is_array("a"));
    assert!(model.is_array("b"));
    assert_eq!(model.sequence_type(), SequenceType::Choice);
}

#[test]
fn unbalanced_model_is_grammar_error() {
    let err = ContentModelNode::parse("((a,b)").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Grammar);

    let errors = parse_dtd(b"<!ELEMENT a (b,(c|d)>").unwrap_err();
    assert_eq!(errors.kind(), ErrorKind::Grammar);
}

#[test]
fn svg_font_dtd() {
    let dtd = parse_dtd(SVG_FONT_DTD).unwrap();
    assert_eq!(dtd.len(), 7);

    assert!(dtd.is_element_an_array("font", "glyph"));
    assert!(dtd.is_element_an_array("font", "hkern"));
    assert!(!dtd.is_element_an_array("font", "font-face"));
    assert!(!dtd.is_element_an_array("font", "desc"));
    assert!(!dtd.is_element_an_array("font-face", "font-face-src"));

    let font = dtd.element("font").unwrap();
    assert_eq!(font.category(), ContentCategory::Children);
    assert_eq!(font.modifier_of("desc"), Some(Modifier::Optional));
    assert_eq!(font.modifier_of("missing-glyph"), Some(Modifier::None));
    assert_eq!(font.model().children().len(), 4);

    assert_eq!(dtd.element("hkern").unwrap().category(), ContentCategory::Empty);
    assert_eq!(dtd.element("glyph").unwrap().category(), ContentCategory::Any);
    assert_eq!(
        dtd.element("desc").unwrap().model().children()[0].name(),
        Some("#PCDATA")
    );
}

#[test]
fn element_markup_in_dtd_is_rejected() {
    let errors = parse_dtd(b"<!ELEMENT a (b)>\n<a/>").unwrap_err();
    assert_eq!(errors.kind(), ErrorKind::Structural);
}

#[test]
fn document_with_external_dtd() {
    let loader = MemoryLoader::new()
        .with_public("-//W3C//DTD SVG 1.1//EN", SVG_FONT_DTD)
        .with_system("glyph.dtd", "<!ELEMENT glyph (path+)>");
    let doc = parse_with_loader(
        b"<?xml version=\"1.0\"?>\n\
          <!DOCTYPE font PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \"glyph.dtd\">\n\
          <font><font-face/><missing-glyph/><glyph/></font>",
        &loader,
    )
    .unwrap();

    assert!(doc.warnings().is_empty());
    assert!(doc.is_element_an_array("font", "glyph"));
    assert!(doc.is_element_an_array("glyph", "path"));
    assert!(!doc.is_element_an_array("font", "font-face"));
    assert_eq!(doc.root_element().unwrap().child_element_count(), 3);
}

#[test]
fn internal_subset_overrides_external() {
    let loader = MemoryLoader::new().with_system("a.dtd", "<!ELEMENT a (b)>");
    let doc = parse_with_loader(
        b"<!DOCTYPE a SYSTEM \"a.dtd\" [ <!ELEMENT a (b+)> ]><a><b/><b/></a>",
        &loader,
    )
    .unwrap();
    assert!(doc.is_element_an_array("a", "b"));
}

#[test]
fn missing_external_dtd_is_a_warning() {
    let loader = MemoryLoader::new();
    let doc = parse_with_loader(b"<!DOCTYPE a SYSTEM \"nowhere.dtd\"><a/>", &loader).unwrap();
    assert_eq!(doc.warnings().len(), 1);
    assert!(doc.warnings()[0].contains("nowhere.dtd"));
    assert!(!doc.is_element_an_array("a", "b"));
}

#[test]
fn empty_external_content_is_absent() {
    let loader = MemoryLoader::new().with_system("empty.dtd", "");
    let doc = parse_with_loader(b"<!DOCTYPE a SYSTEM \"empty.dtd\"><a/>", &loader).unwrap();
    assert_eq!(doc.warnings().len(), 1);
    assert_eq!(doc.doctype().map(|d| d.len()), Some(0));
}

#[test]
fn without_loader_external_ids_are_only_recorded() {
    let doc = parse(b"<!DOCTYPE font PUBLIC \"-//X//EN\" \"x.dtd\"><font/>").unwrap();
    let doctype = doc.doctype().unwrap();
    assert_eq!(doctype.name(), "font");
    assert_eq!(doctype.public_id(), Some("-//X//EN"));
    assert_eq!(doctype.system_id(), Some("x.dtd"));
    assert!(doctype.is_empty());
}

#[cfg(feature = "loader-cache")]
#[test]
fn cached_loader_serves_repeat_parses() {
    use glyphxml::{CachedLoader, Parser};

    let loader = CachedLoader::new(MemoryLoader::new().with_system("a.dtd", "<!ELEMENT a (b*)>"));
    let parser = Parser::new().with_loader(&loader);
    for _ in 0..3 {
        let doc = parser.parse(b"<!DOCTYPE a SYSTEM \"a.dtd\"><a/>").unwrap();
        assert!(doc.is_element_an_array("a", "b"));
    }
    assert_eq!(loader.len(), 1);
}

fn deep_model(depth: usize) -> String {
    format!("<!ELEMENT a {}b{}>", "(".repeat(depth), ")".repeat(depth))
}

#[test]
fn deeply_nested_model_is_limit_error() {
    let errors = parse_dtd(deep_model(20_000).as_bytes()).unwrap_err();
    assert_eq!(errors.kind(), ErrorKind::Limit);

    let mut document = format!("<!DOCTYPE a [{}]><a/>", deep_model(20_000));
    assert_eq!(parse(document.as_bytes()).unwrap_err().kind(), ErrorKind::Limit);

    document = format!("<!DOCTYPE a [{}]><a/>", deep_model(8));
    assert!(parse(document.as_bytes()).is_ok());
}

#[test]
fn deeply_nested_external_model_is_a_warning() {
    let loader = MemoryLoader::new().with_system("deep.dtd", deep_model(20_000));
    let doc = parse_with_loader(b"<!DOCTYPE a SYSTEM \"deep.dtd\"><a/>", &loader).unwrap();
    assert_eq!(doc.warnings().len(), 1);
    assert!(doc.root_element().is_some());
}
