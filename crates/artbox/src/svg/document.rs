//! Arena-backed markup tree
//!
//! Nodes live in a single `Vec` and are addressed by [`NodeId`] handles.
//! Every node records its parent handle and its ordered child handles, so
//! removing a node only touches its parent's child list. Removed handles stay
//! allocated but report `false` from [`Document::is_alive`].
//!
//! Attribute values are kept exactly as written in the source, with entity
//! references unexpanded. Non-element content (text, comments, declarations,
//! processing instructions, doctype, CDATA) is kept as the original
//! `quick-xml` event and written back untouched.

use std::borrow::Cow;

use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::{Reader, Writer};
use tracing::{debug, span, trace, Level};

use crate::core::ArtboxError;

/// Stable handle to a node in a [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// An element: tag name plus ordered attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    self_closing: bool,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            self_closing: true,
        }
    }

    /// Builder-style attribute setter
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, replacing the value in place if it already exists
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Non-empty `id` attribute
    pub fn id(&self) -> Option<&str> {
        self.attribute("id").filter(|id| !id.is_empty())
    }
}

/// Payload of a node
#[derive(Debug, Clone)]
pub enum NodeKind {
    Element(Element),
    /// Any other markup, written back verbatim
    Other(Event<'static>),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    alive: bool,
}

/// A parsed markup document with one or more top-level nodes
#[derive(Debug, Clone, Default)]
pub struct Document {
    nodes: Vec<NodeData>,
    roots: Vec<NodeId>,
}

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse markup into a document
    pub fn parse(markup: &str) -> Result<Self, ArtboxError> {
        let parse_span = span!(Level::DEBUG, "parse_markup", input_len = markup.len());
        let _enter = parse_span.enter();

        let mut reader = Reader::from_str(markup);
        let mut document = Document::new();
        let mut open: Vec<NodeId> = Vec::new();

        loop {
            let parent = open.last().copied();
            match reader.read_event() {
                Ok(Event::Start(start)) => {
                    let element = element_from_start(&start, false, reader.buffer_position() as u64)?;
                    let id = document.append(parent, NodeKind::Element(element));
                    open.push(id);
                }
                Ok(Event::Empty(start)) => {
                    let element = element_from_start(&start, true, reader.buffer_position() as u64)?;
                    document.append(parent, NodeKind::Element(element));
                }
                Ok(Event::End(_)) => {
                    open.pop();
                }
                Ok(Event::Eof) => break,
                Ok(other) => {
                    document.append(parent, NodeKind::Other(other.into_owned()));
                }
                Err(err) => {
                    return Err(ArtboxError::markup(
                        err.to_string(),
                        reader.error_position() as u64,
                    ))
                }
            }
        }

        if let Some(unclosed) = open.last() {
            let name = document
                .element(*unclosed)
                .map(|e| e.name().to_string())
                .unwrap_or_default();
            return Err(ArtboxError::markup(
                format!("unclosed element <{}>", name),
                reader.buffer_position() as u64,
            ));
        }

        debug!(node_count = document.nodes.len(), "Parsed markup");
        Ok(document)
    }

    /// Serialize the live nodes back to markup
    pub fn to_markup(&self) -> Result<String, ArtboxError> {
        let mut writer = Writer::new(Vec::new());
        for root in &self.roots {
            self.write_node(&mut writer, *root)?;
        }
        String::from_utf8(writer.into_inner())
            .map_err(|err| ArtboxError::markup(err.to_string(), 0))
    }

    fn write_node(&self, writer: &mut Writer<Vec<u8>>, id: NodeId) -> Result<(), ArtboxError> {
        let node = &self.nodes[id.0];
        match &node.kind {
            NodeKind::Other(event) => writer.write_event(event.borrow())?,
            NodeKind::Element(element) => {
                let mut start = BytesStart::new(element.name.as_str());
                for (key, value) in &element.attributes {
                    let value = if value.contains('"') {
                        Cow::Owned(value.replace('"', "&quot;"))
                    } else {
                        Cow::Borrowed(value.as_str())
                    };
                    // Values are already escaped; push them as raw bytes.
                    start.push_attribute(Attribute {
                        key: QName(key.as_bytes()),
                        value: match value {
                            Cow::Borrowed(v) => Cow::Borrowed(v.as_bytes()),
                            Cow::Owned(v) => Cow::Owned(v.into_bytes()),
                        },
                    });
                }

                if node.children.is_empty() && element.self_closing {
                    writer.write_event(Event::Empty(start))?;
                } else {
                    writer.write_event(Event::Start(start))?;
                    for child in &node.children {
                        self.write_node(writer, *child)?;
                    }
                    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
                }
            }
        }
        Ok(())
    }

    /// Append a node under `parent`, or as a new top-level node when `None`
    pub fn append(&mut self, parent: Option<NodeId>, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent,
            children: Vec::new(),
            alive: true,
        });
        match parent {
            Some(parent) => self.nodes[parent.0].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    /// Append an element under `parent`
    pub fn append_element(&mut self, parent: Option<NodeId>, element: Element) -> NodeId {
        let id = self.append(parent, NodeKind::Element(element));
        if let Some(parent) = parent {
            if let NodeKind::Element(p) = &mut self.nodes[parent.0].kind {
                p.self_closing = false;
            }
        }
        id
    }

    /// Detach `id` from its parent and invalidate it and its subtree
    pub fn remove(&mut self, id: NodeId) {
        if !self.is_alive(id) {
            return;
        }
        match self.nodes[id.0].parent.take() {
            Some(parent) => self.nodes[parent.0].children.retain(|child| *child != id),
            None => self.roots.retain(|root| *root != id),
        }
        for dead in self.descendants(id) {
            self.nodes[dead.0].alive = false;
        }
        trace!(node = id.0, "Removed node");
    }

    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes.get(id.0).is_some_and(|node| node.alive)
    }

    /// Top-level nodes in document order
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|node| node.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.0)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.nodes.get(id.0).map(|node| &node.kind)
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.kind(id) {
            Some(NodeKind::Element(element)) => Some(element),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match self.nodes.get_mut(id.0).map(|node| &mut node.kind) {
            Some(NodeKind::Element(element)) => Some(element),
            _ => None,
        }
    }

    /// Tag name of an element node
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(Element::name)
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|element| element.attribute(name))
    }

    /// Direct element children with the given tag name
    pub fn child_elements_named<'a>(
        &'a self,
        id: NodeId,
        name: &'a str,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.children(id)
            .iter()
            .copied()
            .filter(move |child| self.tag_name(*child) == Some(name))
    }

    /// `id` and everything below it, pre-order
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Every live node, children before their parent
    pub fn post_order(&self) -> Vec<NodeId> {
        fn visit(doc: &Document, id: NodeId, out: &mut Vec<NodeId>) {
            for child in doc.children(id) {
                visit(doc, *child, out);
            }
            out.push(id);
        }

        let mut out = Vec::new();
        for root in &self.roots {
            visit(self, *root, &mut out);
        }
        out
    }

    /// Every live element with the given tag name, document order
    pub fn elements_named(&self, name: &str) -> Vec<NodeId> {
        self.roots
            .iter()
            .flat_map(|root| self.descendants(*root))
            .filter(|id| self.tag_name(*id) == Some(name))
            .collect()
    }

    /// Number of live element nodes
    pub fn element_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| node.alive && matches!(node.kind, NodeKind::Element(_)))
            .count()
    }
}

fn element_from_start(
    start: &BytesStart<'_>,
    self_closing: bool,
    position: u64,
) -> Result<Element, ArtboxError> {
    let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    element.self_closing = self_closing;
    for attribute in start.attributes() {
        let attribute =
            attribute.map_err(|err| ArtboxError::markup(err.to_string(), position))?;
        element.attributes.push((
            String::from_utf8_lossy(attribute.key.as_ref()).into_owned(),
            String::from_utf8_lossy(&attribute.value).into_owned(),
        ));
    }
    Ok(element)
}
