//! Ordered, attributed element tree
//!
//! The tree exposes creation and append primitives only. There is no way to
//! remove or reorder an existing child through this API, so every node that
//! was loaded is still present, in its original position, when the document
//! is serialized again.

use crate::merge::AppendOnly;

/// Android resource namespace used by manifest attributes
pub const ANDROID_NS: &str = "http://schemas.android.com/apk/res/android";

/// A namespace binding used when creating qualified attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Namespace<'a> {
    pub prefix: &'a str,
    pub uri: &'a str,
}

/// The `android:` namespace binding
pub const ANDROID: Namespace<'static> = Namespace {
    prefix: "android",
    uri: ANDROID_NS,
};

/// `xmlns` / `xmlns:prefix` declaration carried by an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceDecl {
    pub prefix: Option<String>,
    pub uri: String,
}

/// Attribute with its namespace qualifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub prefix: Option<String>,
    pub namespace: Option<String>,
    pub name: String,
    pub value: String,
}

impl Attribute {
    /// Name as written in the document (`prefix:name` or `name`)
    pub fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}:{}", prefix, self.name),
            None => self.name.clone(),
        }
    }

    fn is(&self, namespace: Option<&str>, name: &str) -> bool {
        self.namespace.as_deref() == namespace && self.name == name
    }
}

/// Child of an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
    ProcessingInstruction { target: String, data: Option<String> },
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }
}

/// Tagged node with ordered attributes and ordered children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    prefix: Option<String>,
    name: String,
    namespaces: Vec<NamespaceDecl>,
    attributes: Vec<Attribute>,
    children: Vec<Node>,
}

impl Element {
    /// Create an unprefixed element
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            prefix: None,
            name: name.into(),
            namespaces: Vec::new(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Create an element whose tag carries a namespace prefix
    pub fn with_prefix(prefix: impl Into<String>, name: impl Into<String>) -> Self {
        let mut el = Self::new(name);
        el.prefix = Some(prefix.into());
        el
    }

    /// Local tag name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Tag as written in the document
    pub fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}:{}", prefix, self.name),
            None => self.name.clone(),
        }
    }

    pub fn namespaces(&self) -> &[NamespaceDecl] {
        &self.namespaces
    }

    /// Declare a namespace on this element (no-op if already declared)
    pub fn declare_namespace(&mut self, prefix: Option<&str>, uri: &str) {
        let exists = self
            .namespaces
            .iter()
            .any(|ns| ns.prefix.as_deref() == prefix && ns.uri == uri);
        if !exists {
            self.namespaces.push(NamespaceDecl {
                prefix: prefix.map(str::to_string),
                uri: uri.to_string(),
            });
        }
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Look up an attribute value by namespace URI and local name
    pub fn attribute(&self, namespace: Option<&str>, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.is(namespace, name))
            .map(|a| a.value.as_str())
    }

    /// Shorthand for `android:`-qualified attribute lookup
    pub fn android_attribute(&self, name: &str) -> Option<&str> {
        self.attribute(Some(ANDROID_NS), name)
    }

    /// Set an attribute, keeping its position if it already exists
    pub fn set_attribute(
        &mut self,
        namespace: Option<Namespace<'_>>,
        name: &str,
        value: impl Into<String>,
    ) {
        let uri = namespace.map(|ns| ns.uri);
        let value = value.into();
        match self.attributes.iter_mut().find(|a| a.is(uri, name)) {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute {
                prefix: namespace.map(|ns| ns.prefix.to_string()),
                namespace: uri.map(str::to_string),
                name: name.to_string(),
                value,
            }),
        }
    }

    /// Builder form of [`Element::set_attribute`]
    pub fn attr(mut self, namespace: Option<Namespace<'_>>, name: &str, value: &str) -> Self {
        self.set_attribute(namespace, name, value);
        self
    }

    pub(crate) fn push_parsed_attribute(&mut self, attribute: Attribute) {
        self.attributes.push(attribute);
    }

    pub(crate) fn push_parsed_namespace(&mut self, decl: NamespaceDecl) {
        self.namespaces.push(decl);
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Direct element children in document order
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Direct element children with the given local name
    pub fn child_elements_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.child_elements().filter(move |el| el.name == name)
    }

    /// Append a child at the end of the child list, returning its index
    pub fn append_child(&mut self, child: Node) -> usize {
        self.children.push(child);
        self.children.len() - 1
    }

    /// Builder form of [`Element::append_child`] for element children
    pub fn child(mut self, child: Element) -> Self {
        self.append_child(Node::Element(child));
        self
    }

    /// Concatenated text content of direct text children
    pub fn text(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .children
            .iter()
            .filter_map(|n| match n {
                Node::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.concat())
        }
    }
}

impl AppendOnly for Element {
    type Item = Node;

    fn items(&self) -> &[Node] {
        &self.children
    }

    fn append(&mut self, item: Node) {
        self.append_child(item);
    }
}

/// Address of an element as child indices from the root element
///
/// Because children are never removed or reordered, a path stays valid for
/// the lifetime of the document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ElementPath(Vec<usize>);

impl ElementPath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }
}

/// Whole XML document: optional declaration, prolog/epilog misc nodes, root element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    pub(crate) declaration: Option<String>,
    pub(crate) prolog: Vec<Node>,
    pub(crate) root: Element,
    pub(crate) epilog: Vec<Node>,
}

impl XmlDocument {
    pub fn new(root: Element) -> Self {
        Self {
            declaration: Some(r#"<?xml version="1.0" encoding="utf-8"?>"#.to_string()),
            prolog: Vec::new(),
            root,
            epilog: Vec::new(),
        }
    }

    /// The XML declaration as it appeared in the input, if any
    pub fn declaration(&self) -> Option<&str> {
        self.declaration.as_deref()
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn element(&self, path: &ElementPath) -> Option<&Element> {
        let mut current = &self.root;
        for &index in path.indices() {
            current = current.children.get(index)?.as_element()?;
        }
        Some(current)
    }

    pub fn element_mut(&mut self, path: &ElementPath) -> Option<&mut Element> {
        let mut current = &mut self.root;
        for &index in path.indices() {
            current = current.children.get_mut(index)?.as_element_mut()?;
        }
        Some(current)
    }

    /// Full pre-order traversal of every element, root included
    pub fn descendants(&self) -> Vec<(ElementPath, &Element)> {
        let mut out = Vec::new();
        let mut stack = vec![(ElementPath::root(), &self.root)];
        while let Some((path, el)) = stack.pop() {
            // Push in reverse so the first child is visited first
            for (index, child) in el.children.iter().enumerate().rev() {
                if let Node::Element(child_el) = child {
                    stack.push((path.child(index), child_el));
                }
            }
            out.push((path, el));
        }
        out
    }

    /// Paths of every element matching `predicate`, in document order
    pub fn find_all<P>(&self, predicate: P) -> Vec<ElementPath>
    where
        P: Fn(&Element) -> bool,
    {
        self.descendants()
            .into_iter()
            .filter(|(_, el)| predicate(el))
            .map(|(path, _)| path)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> XmlDocument {
        let activity = Element::new("activity")
            .attr(Some(ANDROID), "name", "MainActivity")
            .child(Element::new("intent-filter"));
        let application = Element::new("application").child(activity);
        let mut root = Element::new("manifest").child(application);
        root.declare_namespace(Some("android"), ANDROID_NS);
        XmlDocument::new(root)
    }

    #[test]
    fn test_find_all_is_preorder() {
        let doc = sample();
        let names: Vec<String> = doc
            .descendants()
            .iter()
            .map(|(_, el)| el.name().to_string())
            .collect();
        assert_eq!(
            names,
            vec!["manifest", "application", "activity", "intent-filter"]
        );
    }

    #[test]
    fn test_path_resolves_element() {
        let doc = sample();
        let paths = doc.find_all(|el| el.name() == "activity");
        assert_eq!(paths.len(), 1);
        let activity = doc.element(&paths[0]).unwrap();
        assert_eq!(activity.android_attribute("name"), Some("MainActivity"));
    }

    #[test]
    fn test_set_attribute_keeps_position() {
        let mut el = Element::new("data")
            .attr(Some(ANDROID), "scheme", "http")
            .attr(Some(ANDROID), "host", "a.com");
        el.set_attribute(Some(ANDROID), "scheme", "https");
        let names: Vec<String> = el.attributes().iter().map(|a| a.qualified_name()).collect();
        assert_eq!(names, vec!["android:scheme", "android:host"]);
        assert_eq!(el.android_attribute("scheme"), Some("https"));
    }

    #[test]
    fn test_append_child_goes_last() {
        let mut doc = sample();
        let path = doc.find_all(|el| el.name() == "activity").remove(0);
        let activity = doc.element_mut(&path).unwrap();
        let index = activity.append_child(Node::Element(Element::new("meta-data")));
        assert_eq!(index, 1);
        assert_eq!(activity.children()[0].as_element().unwrap().name(), "intent-filter");
    }

    #[test]
    fn test_stale_path_is_none() {
        let doc = sample();
        let bogus = ElementPath::root().child(7);
        assert!(doc.element(&bogus).is_none());
    }
}
