//! Owned markup tree for package parts.
//!
//! quick-xml gives a streaming reader; rewriting a part in place needs the
//! whole element tree. [`Document::parse`] builds that tree from a part's
//! text, keeping every qualified name exactly as written so re-emission keeps
//! the part's prefixes and namespace declarations. [`Document::to_xml`]
//! serializes it back.

pub mod query;

use std::io::Cursor;

use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::{Result, SheetpatchError};
use crate::xml_helpers::{
    attributes, escape_attribute, namespace_declaration, qualified_name, split_qname,
};

pub use query::{query, select, select_attributes, select_first_mut, select_text};
pub use query::{QueryMode, QueryResult};

/// A child of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Unescaped character data.
    Text(String),
    /// Comment body as written, without the `<!--`/`-->` delimiters.
    Comment(String),
    /// Processing instruction content as written, e.g. `mso-application progid="Excel.Sheet"`.
    ProcessingInstruction(String),
}

impl Node {
    fn write<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        match self {
            Self::Element(e) => e.write(writer)?,
            Self::Text(t) => writer.write_event(Event::Text(BytesText::new(t)))?,
            Self::Comment(c) => writer.write_event(Event::Comment(BytesText::from_escaped(c)))?,
            Self::ProcessingInstruction(p) => {
                writer.write_event(Event::PI(BytesText::from_escaped(p)))?;
            }
        }
        Ok(())
    }
}

/// An element with its resolved namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    namespace: Option<String>,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    /// Create an empty element. `name` is the qualified name to emit.
    pub fn new(name: impl Into<String>, namespace: Option<&str>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.map(str::to_string),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Qualified name as written, e.g. `"x:row"`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn local_name(&self) -> &str {
        split_qname(&self.name).1
    }

    /// Resolved namespace URI, if the element is in one.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Attribute value by qualified name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Replace an attribute's value, appending it if absent.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    /// Builder form of [`Element::set_attribute`].
    #[must_use]
    pub fn with_attribute(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Direct text content (text children concatenated, nested elements skipped).
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    pub fn push_text(&mut self, text: impl Into<String>) {
        self.children.push(Node::Text(text.into()));
    }

    /// Insert a child element before the node at `index` (clamped to the end).
    pub fn insert(&mut self, index: usize, child: Element) {
        let index = index.min(self.children.len());
        self.children.insert(index, Node::Element(child));
    }

    /// Position of the first child element with local name `local`.
    pub fn position_of(&self, local: &str) -> Option<usize> {
        self.children
            .iter()
            .position(|node| matches!(node, Node::Element(e) if e.local_name() == local))
    }

    pub fn clear_children(&mut self) {
        self.children.clear();
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }

    fn write<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let mut start = BytesStart::new(self.name.as_str());
        for (key, value) in &self.attributes {
            let escaped = escape_attribute(value);
            start.push_attribute(Attribute::from((key.as_bytes(), escaped.as_bytes())));
        }

        if self.children.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        for child in &self.children {
            child.write(writer)?;
        }
        writer.write_event(Event::End(BytesEnd::new(self.name.as_str())))?;
        Ok(())
    }
}

/// The `<?xml ...?>` declaration of a part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub version: String,
    pub encoding: Option<String>,
    pub standalone: Option<String>,
}

impl Declaration {
    fn from_event(decl: &BytesDecl) -> Result<Self> {
        fn lossy(bytes: &[u8]) -> String {
            String::from_utf8_lossy(bytes).into_owned()
        }
        Ok(Self {
            version: lossy(&decl.version()?),
            encoding: decl.encoding().transpose()?.map(|e| lossy(&e)),
            standalone: decl.standalone().transpose()?.map(|s| lossy(&s)),
        })
    }
}

/// A parsed part: optional declaration, the root element, and any comments
/// or processing instructions around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    declaration: Option<Declaration>,
    prolog: Vec<Node>,
    root: Element,
    epilog: Vec<Node>,
}

impl Document {
    /// A document without declaration around `root`.
    pub fn new(root: Element) -> Self {
        Self {
            declaration: None,
            prolog: Vec::new(),
            root,
            epilog: Vec::new(),
        }
    }

    /// Parse a part's text into a tree. Malformed markup fails with a parse error.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(false);

        let mut declaration = None;
        let mut root: Option<Element> = None;
        let mut stack: Vec<Element> = Vec::new();
        let mut prolog = Vec::new();
        let mut epilog = Vec::new();
        // Namespace scopes, innermost last: (prefix, uri) pairs declared per open element.
        let mut scopes: Vec<Vec<(String, String)>> = Vec::new();

        loop {
            match reader.read_event()? {
                Event::Decl(ref d) => declaration = Some(Declaration::from_event(d)?),
                Event::Start(ref e) => {
                    let (element, scope) = open_element(e, &scopes)?;
                    scopes.push(scope);
                    stack.push(element);
                }
                Event::Empty(ref e) => {
                    let (element, _) = open_element(e, &scopes)?;
                    attach(element, &mut stack, &mut root)?;
                }
                Event::End(_) => {
                    scopes.pop();
                    let element = stack.pop().ok_or_else(|| {
                        SheetpatchError::Parse("unexpected closing tag".to_string())
                    })?;
                    attach(element, &mut stack, &mut root)?;
                }
                Event::Text(ref t) => {
                    if let Some(parent) = stack.last_mut() {
                        parent.push_text(t.unescape()?.into_owned());
                    }
                }
                Event::CData(c) => {
                    if let Some(parent) = stack.last_mut() {
                        parent.push_text(String::from_utf8_lossy(&c.into_inner()).into_owned());
                    }
                }
                Event::Comment(c) => {
                    let body = String::from_utf8_lossy(&c.into_inner()).into_owned();
                    let node = Node::Comment(body);
                    place_misc(node, &mut stack, root.is_some(), &mut prolog, &mut epilog);
                }
                Event::PI(p) => {
                    let body = String::from_utf8_lossy(&p.into_inner()).into_owned();
                    let node = Node::ProcessingInstruction(body);
                    place_misc(node, &mut stack, root.is_some(), &mut prolog, &mut epilog);
                }
                Event::Eof => break,
                // Package parts never carry a DTD.
                Event::DocType(_) => {}
            }
        }

        if !stack.is_empty() {
            return Err(SheetpatchError::Parse(format!(
                "unclosed element <{}>",
                stack.last().map(Element::name).unwrap_or_default()
            )));
        }
        let root =
            root.ok_or_else(|| SheetpatchError::Parse("document has no root element".to_string()))?;

        Ok(Self {
            declaration,
            prolog,
            root,
            epilog,
        })
    }

    pub fn declaration(&self) -> Option<&Declaration> {
        self.declaration.as_ref()
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }

    /// Serialize the tree, re-emitting the original declaration if there was one.
    pub fn to_xml(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        if let Some(decl) = &self.declaration {
            writer.write_event(Event::Decl(BytesDecl::new(
                &decl.version,
                decl.encoding.as_deref(),
                decl.standalone.as_deref(),
            )))?;
            writer.write_event(Event::Text(BytesText::from_escaped("\r\n")))?;
        }
        for node in &self.prolog {
            node.write(&mut writer)?;
        }
        self.root.write(&mut writer)?;
        for node in &self.epilog {
            node.write(&mut writer)?;
        }
        Ok(writer.into_inner().into_inner())
    }
}

/// Build an element from a start tag, resolving its namespace against the open scopes.
fn open_element(
    e: &BytesStart,
    scopes: &[Vec<(String, String)>],
) -> Result<(Element, Vec<(String, String)>)> {
    let name = qualified_name(e)?;
    let attrs = attributes(e)?;

    let scope: Vec<(String, String)> = attrs
        .iter()
        .filter_map(|(key, value)| {
            namespace_declaration(key).map(|prefix| (prefix.to_string(), value.clone()))
        })
        .collect();

    let prefix = split_qname(&name).0.unwrap_or("");
    let namespace = std::iter::once(&scope)
        .chain(scopes.iter().rev())
        .flat_map(|s| s.iter().rev())
        .find(|(p, _)| p == prefix)
        .map(|(_, uri)| uri.clone())
        .filter(|uri| !uri.is_empty());

    let element = Element {
        name,
        namespace,
        attributes: attrs,
        children: Vec::new(),
    };
    Ok((element, scope))
}

/// Attach a comment or processing instruction to the open element, or to the
/// document before or after the root.
fn place_misc(
    node: Node,
    stack: &mut [Element],
    after_root: bool,
    prolog: &mut Vec<Node>,
    epilog: &mut Vec<Node>,
) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None if after_root => epilog.push(node),
        None => prolog.push(node),
    }
}

fn attach(element: Element, stack: &mut [Element], root: &mut Option<Element>) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.push(element),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(SheetpatchError::Parse(
                "document has more than one root element".to_string(),
            ))
        }
    }
    Ok(())
}
