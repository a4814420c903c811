//! XML load/serialize for the element tree
//!
//! Parsing goes through `roxmltree`; serialization is hand-written so the
//! output is fully determined by the tree: fixed indentation, attributes in
//! stored order, whitespace-only text dropped and other text trimmed. Feeding
//! the output back through `parse` yields an equal tree, which is what makes
//! repeated reconciliation byte-stable.

use crate::model::tree::{Attribute, Element, NamespaceDecl, Node, XmlDocument};
use thiserror::Error;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// Indentation used when writing manifest-like documents
pub const DEFAULT_INDENT: &str = "    ";

#[derive(Error, Debug)]
pub enum XmlCodecError {
    #[error("document is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("{0}")]
    Syntax(#[from] roxmltree::Error),
}

/// Escape text content
///
/// A raw carriage return would be read back as a line feed, so it is
/// written as a character reference.
pub(crate) fn escape_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\r' => out.push_str("&#13;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape an attribute value so the parser reads back exactly `raw`
pub(crate) fn escape_attribute(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            _ => out.push(c),
        }
    }
    out
}

/// Strip a UTF-8 BOM and decode
pub(crate) fn decode(input: &[u8]) -> Result<&str, XmlCodecError> {
    let body = input.strip_prefix(UTF8_BOM).unwrap_or(input);
    Ok(std::str::from_utf8(body)?)
}

/// The `<?xml ...?>` declaration, verbatim, if the text starts with one
pub(crate) fn leading_declaration(text: &str) -> Option<String> {
    let trimmed = text.trim_start();
    if !trimmed.starts_with("<?xml") {
        return None;
    }
    let end = trimmed.find("?>")?;
    Some(trimmed[..end + 2].to_string())
}

/// Parse bytes into an [`XmlDocument`]
pub fn parse(input: &[u8]) -> Result<XmlDocument, XmlCodecError> {
    let text = decode(input)?;
    let parsed = roxmltree::Document::parse(text)?;

    let mut prolog = Vec::new();
    let mut epilog = Vec::new();
    let mut root = None;
    for node in parsed.root().children() {
        if node.is_element() {
            root = Some(convert_element(node));
            continue;
        }
        if let Some(misc) = convert_misc(node) {
            if root.is_none() {
                prolog.push(misc);
            } else {
                epilog.push(misc);
            }
        }
    }

    // roxmltree rejects documents without a root element, so this always holds
    let root = root.unwrap_or_else(|| convert_element(parsed.root_element()));

    Ok(XmlDocument {
        declaration: leading_declaration(text),
        prolog,
        root,
        epilog,
    })
}

fn convert_misc(node: roxmltree::Node<'_, '_>) -> Option<Node> {
    if node.is_comment() {
        return node.text().map(|t| Node::Comment(t.to_string()));
    }
    if let Some(pi) = node.pi() {
        return Some(Node::ProcessingInstruction {
            target: pi.target.to_string(),
            data: pi.value.map(str::to_string),
        });
    }
    if node.is_text() {
        let trimmed = node.text().map(str::trim).unwrap_or_default();
        if !trimmed.is_empty() {
            return Some(Node::Text(trimmed.to_string()));
        }
    }
    None
}

fn convert_element(node: roxmltree::Node<'_, '_>) -> Element {
    let tag = node.tag_name();
    let prefix = tag.namespace().and_then(|uri| node.lookup_prefix(uri));
    let mut el = match prefix {
        Some(prefix) => Element::with_prefix(prefix, tag.name()),
        None => Element::new(tag.name()),
    };

    // roxmltree reports every namespace in scope; keep only the ones this
    // element introduces.
    let inherited: Vec<(Option<&str>, &str)> = node
        .parent_element()
        .map(|parent| parent.namespaces().map(|ns| (ns.name(), ns.uri())).collect())
        .unwrap_or_default();
    for ns in node.namespaces() {
        if ns.uri() == XML_NS || inherited.contains(&(ns.name(), ns.uri())) {
            continue;
        }
        el.push_parsed_namespace(NamespaceDecl {
            prefix: ns.name().map(str::to_string),
            uri: ns.uri().to_string(),
        });
    }

    for attr in node.attributes() {
        let namespace = attr.namespace();
        let prefix = match namespace {
            Some(XML_NS) => Some("xml".to_string()),
            Some(uri) => node.lookup_prefix(uri).map(str::to_string),
            None => None,
        };
        el.push_parsed_attribute(Attribute {
            prefix,
            namespace: namespace.map(str::to_string),
            name: attr.name().to_string(),
            value: attr.value().to_string(),
        });
    }

    for child in node.children() {
        if child.is_element() {
            el.append_child(Node::Element(convert_element(child)));
        } else if let Some(misc) = convert_misc(child) {
            el.append_child(misc);
        }
    }
    el
}

/// Serialize a document with the given indentation unit
pub fn to_string(doc: &XmlDocument, indent: &str) -> String {
    let mut out = String::new();
    if let Some(declaration) = &doc.declaration {
        out.push_str(declaration);
        out.push('\n');
    }
    for node in &doc.prolog {
        write_node(&mut out, node, 0, indent);
    }
    write_element(&mut out, &doc.root, 0, indent);
    for node in &doc.epilog {
        write_node(&mut out, node, 0, indent);
    }
    out
}

fn write_node(out: &mut String, node: &Node, depth: usize, indent: &str) {
    match node {
        Node::Element(el) => write_element(out, el, depth, indent),
        Node::Text(text) => {
            push_indent(out, depth, indent);
            out.push_str(&escape_text(text));
            out.push('\n');
        }
        Node::Comment(text) => {
            push_indent(out, depth, indent);
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->\n");
        }
        Node::ProcessingInstruction { target, data } => {
            push_indent(out, depth, indent);
            out.push_str("<?");
            out.push_str(target);
            if let Some(data) = data {
                out.push(' ');
                out.push_str(data);
            }
            out.push_str("?>\n");
        }
    }
}

fn write_element(out: &mut String, el: &Element, depth: usize, indent: &str) {
    push_indent(out, depth, indent);
    let tag = el.qualified_name();
    out.push('<');
    out.push_str(&tag);

    for ns in el.namespaces() {
        match &ns.prefix {
            Some(prefix) => out.push_str(&format!(" xmlns:{}=\"", prefix)),
            None => out.push_str(" xmlns=\""),
        }
        out.push_str(&escape_attribute(&ns.uri));
        out.push('"');
    }
    for attr in el.attributes() {
        out.push(' ');
        out.push_str(&attr.qualified_name());
        out.push_str("=\"");
        out.push_str(&escape_attribute(&attr.value));
        out.push('"');
    }

    let children = el.children();
    if children.is_empty() {
        out.push_str(" />\n");
        return;
    }

    if children.iter().all(|c| matches!(c, Node::Text(_))) {
        out.push('>');
        out.push_str(&escape_text(&el.text().unwrap_or_default()));
        out.push_str(&format!("</{}>\n", tag));
        return;
    }

    out.push_str(">\n");
    for child in children {
        write_node(out, child, depth + 1, indent);
    }
    push_indent(out, depth, indent);
    out.push_str(&format!("</{}>\n", tag));
}

fn push_indent(out: &mut String, depth: usize, indent: &str) {
    for _ in 0..depth {
        out.push_str(indent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tree::ANDROID_NS;

    const MANIFEST: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!-- generated -->
<manifest xmlns:android="http://schemas.android.com/apk/res/android" xmlns:tools="http://schemas.android.com/tools" package="com.example.game">
  <application android:label="Game" tools:replace="android:label">
    <activity android:name="com.unity3d.player.UnityPlayerActivity">
      <intent-filter>
        <action android:name="android.intent.action.MAIN"/>
        <category android:name="android.intent.category.LAUNCHER"/>
      </intent-filter>
      <meta-data android:name="unityplayer.UnityActivity" android:value="true"/>
    </activity>
  </application>
</manifest>
"#;

    #[test]
    fn test_parse_keeps_namespaces_and_attributes() {
        let doc = parse(MANIFEST.as_bytes()).unwrap();
        let root = doc.root();
        assert_eq!(root.name(), "manifest");
        assert_eq!(root.namespaces().len(), 2);
        assert_eq!(root.attribute(None, "package"), Some("com.example.game"));

        let app = root.child_elements().next().unwrap();
        assert!(app.namespaces().is_empty());
        assert_eq!(app.attributes()[1].qualified_name(), "tools:replace");
        assert_eq!(app.attribute(Some(ANDROID_NS), "label"), Some("Game"));
    }

    #[test]
    fn test_declaration_and_comment_preserved() {
        let doc = parse(MANIFEST.as_bytes()).unwrap();
        let out = to_string(&doc, DEFAULT_INDENT);
        assert!(out.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<!-- generated -->\n"));
    }

    #[test]
    fn test_serialize_is_a_fixed_point() {
        let first = to_string(&parse(MANIFEST.as_bytes()).unwrap(), DEFAULT_INDENT);
        let second = to_string(&parse(first.as_bytes()).unwrap(), DEFAULT_INDENT);
        assert_eq!(first, second);
    }

    #[test]
    fn test_reparse_yields_equal_tree() {
        let doc = parse(MANIFEST.as_bytes()).unwrap();
        let again = parse(to_string(&doc, DEFAULT_INDENT).as_bytes()).unwrap();
        assert_eq!(doc, again);
    }

    #[test]
    fn test_attribute_escaping_round_trips() {
        let xml = "<a v=\"x &amp; &quot;y&quot; &#10;z\"><b>1 &lt; 2</b></a>";
        let doc = parse(xml.as_bytes()).unwrap();
        assert_eq!(doc.root().attribute(None, "v"), Some("x & \"y\" \nz"));
        let again = parse(to_string(&doc, DEFAULT_INDENT).as_bytes()).unwrap();
        assert_eq!(doc, again);
    }

    #[test]
    fn test_carriage_return_in_text_survives_two_passes() {
        let xml = "<x><y>a&#13;b</y></x>";
        let first = to_string(&parse(xml.as_bytes()).unwrap(), DEFAULT_INDENT);
        assert!(first.contains("a&#13;b"));
        let second = to_string(&parse(first.as_bytes()).unwrap(), DEFAULT_INDENT);
        assert_eq!(first, second);
    }

    #[test]
    fn test_bom_is_accepted() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(b"<manifest/>");
        let doc = parse(&bytes).unwrap();
        assert_eq!(doc.root().name(), "manifest");
        assert!(doc.declaration().is_none());
    }

    #[test]
    fn test_malformed_input_is_error() {
        assert!(matches!(
            parse(b"<manifest><application></manifest>"),
            Err(XmlCodecError::Syntax(_))
        ));
        assert!(matches!(parse(&[0xff, 0xfe, 0x00]), Err(XmlCodecError::Encoding(_))));
    }
}
