//! Path Parser
//!
//! Single forward pass over markup events producing a [`PathMap`].
//!
//! - Options: namespace inclusion and value transforms
//! - Namespace: prefix scope stack
//! - Arena: element records in document order, keyed at end of stream

mod arena;
pub mod namespace;
pub mod options;

use tracing::{debug, trace};

use crate::error::{MapError, Result};
use crate::map::PathMap;
use crate::path::BufferPool;
use crate::reader::{SliceReader, StartElement, XmlEvent};

use arena::{ElementArena, ElementId};
use namespace::NamespaceScope;
pub use options::{BuiltinTransform, ParseOptions, ValueTransform};

/// Parse a document held in memory
pub fn parse_bytes(input: &[u8], options: &ParseOptions) -> Result<PathMap> {
    let pool = BufferPool::new();
    parse_events(SliceReader::new(input), options, &pool)
}

pub fn parse_str(input: &str, options: &ParseOptions) -> Result<PathMap> {
    parse_bytes(input.as_bytes(), options)
}

/// Parse any event stream, e.g. one produced by [`SliceReader`]
pub fn parse_events<I>(events: I, options: &ParseOptions, pool: &BufferPool) -> Result<PathMap>
where
    I: IntoIterator<Item = Result<XmlEvent>>,
{
    let mut parser = PathParser::new(options);
    for event in events {
        parser.handle(event?)?;
    }
    parser.finish(pool)
}

/// Per-call parser state
struct PathParser<'o> {
    options: &'o ParseOptions,
    scope: NamespaceScope,
    arena: ElementArena,
    stack: Vec<ElementId>,
    namespaces: Vec<(String, String)>,
    root_seen: bool,
}

impl<'o> PathParser<'o> {
    fn new(options: &'o ParseOptions) -> Self {
        PathParser {
            options,
            scope: NamespaceScope::new(),
            arena: ElementArena::new(),
            stack: Vec::with_capacity(16),
            namespaces: Vec::new(),
            root_seen: false,
        }
    }

    fn handle(&mut self, event: XmlEvent) -> Result<()> {
        match event {
            XmlEvent::StartElement(e) => self.open(&e),
            XmlEvent::EmptyElement(e) => {
                self.open(&e)?;
                self.close(&e.name)
            }
            XmlEvent::EndElement(e) => self.close(&e.name),
            XmlEvent::Text(t) | XmlEvent::CData(t) => self.text(&t),
            other => {
                trace!(?other, "skipping non-content event");
                Ok(())
            }
        }
    }

    fn open(&mut self, element: &StartElement) -> Result<()> {
        if self.stack.is_empty() {
            if self.root_seen {
                return Err(MapError::syntax("multiple root elements"));
            }
            self.root_seen = true;
        }

        self.scope.push_scope();
        for attr in &element.attributes {
            if let Some(prefix) = attr.declared_prefix() {
                self.scope.declare(prefix, &attr.value);
                if self.options.include_namespaces
                    && !attr.value.is_empty()
                    && !self.namespaces.iter().any(|(p, _)| p == prefix)
                {
                    self.namespaces.push((prefix.to_string(), attr.value.clone()));
                }
            }
        }

        let name = self.resolve_name(element.prefix(), element.local_name());
        let id = self.arena.open(self.stack.last().copied(), name);

        for attr in &element.attributes {
            if attr.is_namespace_declaration() {
                continue;
            }
            let attr_name = self.resolve_name(attr.prefix(), attr.local_name());
            let value = self.options.transform(&attr.value);
            self.arena.add_attribute(id, attr_name, value);
        }

        self.stack.push(id);
        Ok(())
    }

    fn close(&mut self, name: &str) -> Result<()> {
        if self.stack.pop().is_none() {
            return Err(MapError::syntax(format!("unexpected end tag </{}>", name)));
        }
        self.scope.pop_scope();
        Ok(())
    }

    fn text(&mut self, content: &str) -> Result<()> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Ok(());
        }
        match self.stack.last() {
            Some(&id) => {
                let value = self.options.transform(trimmed);
                self.arena.set_text(id, value);
                Ok(())
            }
            None => Err(MapError::syntax("character data outside root element")),
        }
    }

    /// `prefix:local` when the prefix is in scope and namespaces are kept
    fn resolve_name(&self, prefix: Option<&str>, local: &str) -> String {
        match prefix {
            Some(p) if self.options.include_namespaces && self.scope.resolve(p).is_some() => {
                format!("{}:{}", p, local)
            }
            _ => local.to_string(),
        }
    }

    fn finish(self, pool: &BufferPool) -> Result<PathMap> {
        if !self.stack.is_empty() {
            let open: Vec<&str> = self
                .stack
                .iter()
                .filter_map(|&id| self.arena.name(id))
                .collect();
            return Err(MapError::syntax(format!(
                "unexpected EOF: unclosed elements <{}>",
                open.join("><")
            )));
        }
        if !self.root_seen {
            return Err(MapError::EmptyInput);
        }

        let elements = self.arena.len();
        let mut map = self.arena.into_path_map(pool);
        if map.is_empty() {
            return Err(MapError::EmptyInput);
        }
        for (prefix, uri) in &self.namespaces {
            map.declare_namespace(prefix, uri);
        }

        debug!(elements, entries = map.len(), "parsed document into path map");
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(xml: &str) -> PathMap {
        parse_str(xml, &ParseOptions::default()).unwrap()
    }

    fn expected(pairs: &[(&str, &str)]) -> PathMap {
        pairs.iter().copied().collect()
    }

    const SOAP: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
        <soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"
                       xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
            <soap:Header>
                <ns1:AuthHeader xmlns:ns1="http://example.com/auth">
                    <ns1:Username>john.doe</ns1:Username>
                    <ns1:Token>abc123</ns1:Token>
                </ns1:AuthHeader>
            </soap:Header>
            <soap:Body>
                <ns2:Specs xmlns:ns2="http://example.com/products">
                    <ns3:Spec xmlns:ns3="http://example.com/specs">
                        <ns3:Name>CPU</ns3:Name>
                    </ns3:Spec>
                    <ns3:Spec xmlns:ns3="http://example.com/specs">
                        <ns3:Name>RAM</ns3:Name>
                    </ns3:Spec>
                </ns2:Specs>
            </soap:Body>
        </soap:Envelope>"#;

    #[test]
    fn test_single_element() {
        assert_eq!(parse("<root>value</root>"), expected(&[("/root", "value")]));
    }

    #[test]
    fn test_nested_elements() {
        let xml = "<root>\n  <child>child value</child>\n  <another><nested>nested value</nested></another>\n</root>";
        assert_eq!(
            parse(xml),
            expected(&[
                ("/root/child", "child value"),
                ("/root/another/nested", "nested value"),
            ])
        );
    }

    #[test]
    fn test_repeated_elements_with_attributes() {
        let xml = r#"<root><item id="1">first</item><item id="2">second</item></root>"#;
        assert_eq!(
            parse(xml),
            expected(&[
                ("/root/item[1]", "first"),
                ("/root/item[2]", "second"),
                ("/root/item[1]/@id", "1"),
                ("/root/item[2]/@id", "2"),
            ])
        );
    }

    #[test]
    fn test_repeated_subtrees_indexed() {
        let xml = "<root><items>\
            <item><name>P1</name><details><color>red</color></details></item>\
            <item><name>P2</name><details><color>blue</color></details></item>\
            <item><name>P3</name></item>\
            </items></root>";
        assert_eq!(
            parse(xml),
            expected(&[
                ("/root/items/item[1]/name", "P1"),
                ("/root/items/item[1]/details/color", "red"),
                ("/root/items/item[2]/name", "P2"),
                ("/root/items/item[2]/details/color", "blue"),
                ("/root/items/item[3]/name", "P3"),
            ])
        );
    }

    #[test]
    fn test_same_name_under_different_parents_not_indexed() {
        let xml = "<root><a><x>1</x></a><b><x>2</x></b></root>";
        assert_eq!(parse(xml), expected(&[("/root/a/x", "1"), ("/root/b/x", "2")]));
    }

    #[test]
    fn test_namespaces_included() {
        let map = parse(SOAP);
        assert_eq!(
            map.get("/soap:Envelope/soap:Header/ns1:AuthHeader/ns1:Username"),
            Some("john.doe")
        );
        assert_eq!(
            map.get("/soap:Envelope/soap:Body/ns2:Specs/ns3:Spec[2]/ns3:Name"),
            Some("RAM")
        );
        assert_eq!(map.len(), 4);
        assert!(map.namespaces().iter().any(|(p, _)| p == "soap"));
        assert!(map.namespaces().iter().any(|(p, _)| p == "ns3"));
    }

    #[test]
    fn test_namespaces_dropped() {
        let opts = ParseOptions::new().with_namespaces(false);
        let map = parse_str(SOAP, &opts).unwrap();
        assert_eq!(map.get("/Envelope/Header/AuthHeader/Token"), Some("abc123"));
        assert_eq!(map.get("/Envelope/Body/Specs/Spec[1]/Name"), Some("CPU"));
        assert!(map.namespaces().is_empty());
    }

    #[test]
    fn test_undeclared_prefix_dropped() {
        assert_eq!(parse("<a:root>v</a:root>"), expected(&[("/root", "v")]));
    }

    #[test]
    fn test_prefixed_attribute() {
        let xml = r#"<root xmlns:x="urn:x" x:id="7" xml:lang="en" plain="p"/>"#;
        assert_eq!(
            parse(xml),
            expected(&[
                ("/root/@x:id", "7"),
                ("/root/@xml:lang", "en"),
                ("/root/@plain", "p"),
            ])
        );
    }

    #[test]
    fn test_default_namespace_keeps_local_names() {
        let xml = r#"<root xmlns="urn:d"><item>v</item></root>"#;
        let map = parse(xml);
        assert_eq!(map, expected(&[("/root/item", "v")]));
        assert_eq!(map.namespaces(), &[(String::new(), "urn:d".to_string())]);
    }

    #[test]
    fn test_value_transform_applies_to_text_and_attributes() {
        let opts = ParseOptions::new().with_value_transform(str::to_uppercase);
        let xml = r#"<root><items><item>hello</item><item>world</item></items><meta id="test">info</meta></root>"#;
        assert_eq!(
            parse_str(xml, &opts).unwrap(),
            expected(&[
                ("/root/items/item[1]", "HELLO"),
                ("/root/items/item[2]", "WORLD"),
                ("/root/meta", "INFO"),
                ("/root/meta/@id", "TEST"),
            ])
        );
    }

    #[test]
    fn test_transform_chain_order() {
        let opts = ParseOptions::new()
            .with_value_transform(|s| s.trim().to_string())
            .with_value_transform(|s| format!("{}!", s));
        let xml = r#"<root><meta id="  test  ">info</meta></root>"#;
        assert_eq!(
            parse_str(xml, &opts).unwrap(),
            expected(&[("/root/meta", "info!"), ("/root/meta/@id", "test!")])
        );
    }

    #[test]
    fn test_transform_never_touches_paths() {
        let opts = ParseOptions::new().with_value_transform(str::to_uppercase);
        let map = parse_str("<root><leaf>x</leaf></root>", &opts).unwrap();
        assert_eq!(map.get("/root/leaf"), Some("X"));
    }

    // Separate text runs inside one element collapse to the last run.
    // Pinned as current behavior; concatenation is deliberately not attempted.
    #[test]
    fn test_last_text_run_wins() {
        let map = parse("<root>first<!-- split -->second</root>");
        assert_eq!(map, expected(&[("/root", "second")]));

        let map = parse("<root>before<child>c</child>after</root>");
        assert_eq!(map.get("/root"), Some("after"));
    }

    #[test]
    fn test_cdata_is_text() {
        assert_eq!(
            parse("<root><![CDATA[ <b>raw</b> ]]></root>"),
            expected(&[("/root", "<b>raw</b>")])
        );
    }

    #[test]
    fn test_document_order_recorded() {
        let map = parse("<root><z>1</z><a>2</a></root>");
        assert!(map.order_of("/root/z").unwrap() < map.order_of("/root/a").unwrap());
    }

    #[test]
    fn test_empty_input() {
        let err = parse_str("", &ParseOptions::default()).unwrap_err();
        assert_eq!(err, MapError::EmptyInput);
    }

    #[test]
    fn test_root_without_content_is_empty() {
        let err = parse_str("<root><a/></root>", &ParseOptions::default()).unwrap_err();
        assert_eq!(err, MapError::EmptyInput);
    }

    #[test]
    fn test_unclosed_elements() {
        let err = parse_str("<root>", &ParseOptions::default()).unwrap_err();
        assert!(err.is_syntax());

        let events = vec![Ok(XmlEvent::start("root", &[])), Ok(XmlEvent::start("a", &[]))];
        let err = parse_events(events, &ParseOptions::default(), &BufferPool::new()).unwrap_err();
        assert_eq!(
            err,
            MapError::syntax("unexpected EOF: unclosed elements <root><a>")
        );
    }

    #[test]
    fn test_multiple_roots() {
        let err = parse_str("<root1></root1><root2></root2>", &ParseOptions::default()).unwrap_err();
        assert_eq!(err, MapError::syntax("multiple root elements"));
        assert_eq!(err.to_string(), "XML syntax error: multiple root elements");
    }

    #[test]
    fn test_text_outside_root() {
        let err = parse_str("<root>v</root>trailing", &ParseOptions::default()).unwrap_err();
        assert!(err.is_syntax());
    }

    #[test]
    fn test_tokenizer_error_is_syntax() {
        let err = parse_str("<root></other>", &ParseOptions::default()).unwrap_err();
        assert!(err.is_syntax());
    }

    #[test]
    fn test_synthetic_event_stream() {
        let events = vec![
            Ok(XmlEvent::start("root", &[])),
            Ok(XmlEvent::start("item", &[("k", "1")])),
            Ok(XmlEvent::end("item")),
            Ok(XmlEvent::start("item", &[("k", "2")])),
            Ok(XmlEvent::end("item")),
            Ok(XmlEvent::end("root")),
        ];
        let map = parse_events(events, &ParseOptions::default(), &BufferPool::new()).unwrap();
        assert_eq!(
            map,
            expected(&[("/root/item[1]/@k", "1"), ("/root/item[2]/@k", "2")])
        );
    }

    #[test]
    fn test_stray_end_event() {
        let events = vec![Ok(XmlEvent::end("root"))];
        let err = parse_events(events, &ParseOptions::default(), &BufferPool::new()).unwrap_err();
        assert!(err.is_syntax());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;
        use std::collections::{BTreeSet, HashMap};

        #[derive(Debug, Clone)]
        struct Node {
            name: &'static str,
            text: Option<String>,
            attr: Option<String>,
            children: Vec<Node>,
        }

        // Every leaf carries text so no element drops out of the map
        fn node() -> impl Strategy<Value = Node> {
            let leaf = (
                prop::sample::select(vec!["a", "b", "c"]),
                "[a-z]{1,5}",
                prop::option::of("[a-z]{1,3}"),
            )
                .prop_map(|(name, text, attr)| Node {
                    name,
                    text: Some(text),
                    attr,
                    children: Vec::new(),
                });
            leaf.prop_recursive(4, 32, 4, |inner| {
                (
                    prop::sample::select(vec!["a", "b", "c"]),
                    prop::option::of("[a-z]{1,5}"),
                    prop::collection::vec(inner, 1..4),
                )
                    .prop_map(|(name, text, children)| Node {
                        name,
                        text,
                        attr: None,
                        children,
                    })
            })
        }

        fn document() -> impl Strategy<Value = String> {
            prop::collection::vec(node(), 1..4).prop_map(|children| {
                let mut out = String::from("<root>");
                for child in &children {
                    render(child, &mut out);
                }
                out.push_str("</root>");
                out
            })
        }

        fn render(node: &Node, out: &mut String) {
            out.push('<');
            out.push_str(node.name);
            if let Some(attr) = &node.attr {
                out.push_str(&format!(" k=\"{}\"", attr));
            }
            out.push('>');
            if let Some(text) = &node.text {
                out.push_str(text);
            }
            for child in &node.children {
                render(child, out);
            }
            out.push_str(&format!("</{}>", node.name));
        }

        fn split_index(segment: &str) -> (&str, Option<u32>) {
            match segment.find('[') {
                Some(i) => (
                    &segment[..i],
                    segment[i + 1..segment.len() - 1].parse().ok(),
                ),
                None => (segment, None),
            }
        }

        proptest! {
            #[test]
            fn prop_round_trip(xml in document()) {
                let first = parse(&xml);
                let emitted = first.to_xml(false).unwrap();
                let second = parse_bytes(&emitted, &ParseOptions::default()).unwrap();
                prop_assert_eq!(first, second);
            }

            #[test]
            fn prop_sibling_indices_contiguous(xml in document()) {
                let map = parse(&xml);
                // (parent prefix, name) -> indices seen; None marks an unindexed use
                let mut groups: HashMap<(String, String), BTreeSet<Option<u32>>> = HashMap::new();
                for key in map.keys() {
                    let mut parent = String::new();
                    for segment in key.split('/').skip(1) {
                        if segment.starts_with('@') {
                            break;
                        }
                        let (name, index) = split_index(segment);
                        groups
                            .entry((parent.clone(), name.to_string()))
                            .or_default()
                            .insert(index);
                        parent.push('/');
                        parent.push_str(segment);
                    }
                }
                for ((parent, name), indices) in groups {
                    if indices.contains(&None) {
                        prop_assert_eq!(indices.len(), 1, "{}/{} mixes indexed and bare", parent, name);
                        continue;
                    }
                    let expected: BTreeSet<Option<u32>> = (1..=indices.len() as u32).map(Some).collect();
                    prop_assert!(indices.len() >= 2);
                    prop_assert_eq!(indices, expected);
                }
            }
        }
    }
}
