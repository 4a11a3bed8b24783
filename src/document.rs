//! HTML documents as mutable node trees.
//!
//! Every page the generator touches is parsed whole with `html5ever` into a
//! `markup5ever_rcdom` tree, edited in place, and serialized back. The editing
//! surface is intentionally small:
//!
//! - [`Document::find_first`] locates the first element matching a [`Selector`]
//! - [`Document::replace`] swaps a node for freshly parsed markup
//! - [`Document::append_child`] adds markup at the end of an element
//! - [`Document::remove`] detaches a node
//! - [`Document::serialize`] turns the tree back into HTML text
//!
//! Inserted markup is carried as a [`Fragment`]: a string that is parsed into
//! new nodes on every insertion, so the same fragment (the sidebar, for
//! instance) can be injected into any number of documents without sharing
//! nodes between trees.

use html5ever::serialize::{SerializeOpts, TraversalScope, serialize};
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};
use html5ever::{LocalName, Namespace, ParseOpts, QualName, parse_document, parse_fragment};
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};
use std::fs;
use std::io;
use std::path::Path;
use std::rc::Rc;

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Element lookup by tag name and an optional attribute.
///
/// `class` is matched against the individual tokens of the class list, so
/// `Selector::class("div", "sidebar")` matches `<div class="sidebar no-print">`.
/// Every other attribute must be equal to the expected value.
#[derive(Debug, Clone, Copy)]
pub struct Selector<'a> {
    tag: &'a str,
    attr: Option<(&'a str, &'a str)>,
}

impl<'a> Selector<'a> {
    pub fn tag(tag: &'a str) -> Self {
        Self { tag, attr: None }
    }

    pub fn class(tag: &'a str, class: &'a str) -> Self {
        Self::attr(tag, "class", class)
    }

    pub fn id(tag: &'a str, id: &'a str) -> Self {
        Self::attr(tag, "id", id)
    }

    pub fn attr(tag: &'a str, name: &'a str, value: &'a str) -> Self {
        Self {
            tag,
            attr: Some((name, value)),
        }
    }

    fn matches(&self, node: &Handle) -> bool {
        let NodeData::Element { name, attrs, .. } = &node.data else {
            return false;
        };
        if !(*name.local).eq_ignore_ascii_case(self.tag) {
            return false;
        }
        let Some((attr_name, expected)) = self.attr else {
            return true;
        };
        attrs
            .borrow()
            .iter()
            .filter(|a| &*a.name.local == attr_name)
            .any(|a| {
                if attr_name == "class" {
                    a.value.split_whitespace().any(|token| token == expected)
                } else {
                    &*a.value == expected
                }
            })
    }
}

/// Markup waiting to be inserted into a [`Document`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    markup: String,
}

impl Fragment {
    pub fn new(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
        }
    }

    /// Parse the markup into detached nodes, as if it appeared inside `<body>`.
    fn nodes(&self) -> Vec<Handle> {
        let context = QualName::new(
            None,
            Namespace::from(HTML_NAMESPACE),
            LocalName::from("body"),
        );
        let dom = parse_fragment(RcDom::default(), ParseOpts::default(), context, vec![])
            .one(self.markup.as_str());

        // The fragment parser wraps the result in a synthetic <html> root.
        // Taking the children out before `dom` drops keeps the tree teardown
        // from emptying nodes that now belong to us.
        let root = dom.document.children.borrow().first().cloned();
        let nodes = match root {
            Some(root) => std::mem::take(&mut *root.children.borrow_mut()),
            None => Vec::new(),
        };
        for node in &nodes {
            node.parent.set(None);
        }
        nodes
    }
}

impl From<maud::Markup> for Fragment {
    fn from(markup: maud::Markup) -> Self {
        Self::new(markup.into_string())
    }
}

/// A parsed HTML document.
pub struct Document {
    dom: RcDom,
    has_body_tag: bool,
}

impl Document {
    pub fn parse(source: &str) -> Self {
        let dom = parse_document(RcDom::default(), ParseOpts::default()).one(source);
        Self {
            dom,
            has_body_tag: has_body_start_tag(source),
        }
    }

    pub fn read(path: &Path) -> io::Result<Self> {
        let source = fs::read_to_string(path)?;
        Ok(Self::parse(&source))
    }

    pub fn write(&self, path: &Path) -> io::Result<()> {
        fs::write(path, self.serialize()?)
    }

    pub fn serialize(&self) -> io::Result<String> {
        let mut out = Vec::new();
        let document: SerializableHandle = self.dom.document.clone().into();
        serialize(
            &mut out,
            &document,
            SerializeOpts {
                traversal_scope: TraversalScope::ChildrenOnly(None),
                ..Default::default()
            },
        )?;
        String::from_utf8(out).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// The `<body>` element, if the source declared one.
    ///
    /// The HTML5 tree builder synthesizes a body for any input; pages that
    /// never wrote a `<body>` tag are reported as having none.
    pub fn body(&self) -> Option<Handle> {
        if !self.has_body_tag {
            return None;
        }
        self.find_first(Selector::tag("body"))
    }

    pub fn head(&self) -> Option<Handle> {
        self.find_first(Selector::tag("head"))
    }

    /// First element in document order matching `selector`.
    pub fn find_first(&self, selector: Selector<'_>) -> Option<Handle> {
        find_within(&self.dom.document, selector)
    }

    /// Replace `node` with the parsed fragment at the same position.
    ///
    /// Returns `false` if `node` is not attached to the tree.
    pub fn replace(&self, node: &Handle, fragment: &Fragment) -> bool {
        let Some((parent, index)) = detach(node) else {
            return false;
        };
        let nodes = fragment.nodes();
        for new in &nodes {
            new.parent.set(Some(Rc::downgrade(&parent)));
        }
        parent.children.borrow_mut().splice(index..index, nodes);
        true
    }

    /// Append the parsed fragment as the last children of `parent`.
    pub fn append_child(&self, parent: &Handle, fragment: &Fragment) {
        for node in fragment.nodes() {
            node.parent.set(Some(Rc::downgrade(parent)));
            parent.children.borrow_mut().push(node);
        }
    }

    /// Detach `node` from the tree. Returns `false` if it was already detached.
    pub fn remove(&self, node: &Handle) -> bool {
        detach(node).is_some()
    }
}

/// First element under `root` (excluding `root` itself) matching `selector`.
pub fn find_within(root: &Handle, selector: Selector<'_>) -> Option<Handle> {
    let mut stack: Vec<Handle> = root.children.borrow().iter().rev().cloned().collect();
    while let Some(node) = stack.pop() {
        if selector.matches(&node) {
            return Some(node);
        }
        stack.extend(node.children.borrow().iter().rev().cloned());
    }
    None
}

/// Concatenated text of every text node under `node`.
pub fn text_content(node: &Handle) -> String {
    let mut text = String::new();
    let mut stack = vec![node.clone()];
    while let Some(current) = stack.pop() {
        if let NodeData::Text { contents } = &current.data {
            text.push_str(&contents.borrow());
        }
        stack.extend(current.children.borrow().iter().rev().cloned());
    }
    text
}

/// Watches the token stream for a `<body>` start tag.
///
/// Raw-text elements switch the tokenizer state the same way the tree builder
/// does, so `<body` inside a script or a comment is not a tag.
#[derive(Default)]
struct BodyTagSink {
    found: bool,
}

impl TokenSink for BodyTagSink {
    type Handle = ();

    fn process_token(&mut self, token: Token, _line_number: u64) -> TokenSinkResult<()> {
        let Token::TagToken(tag) = token else {
            return TokenSinkResult::Continue;
        };
        if tag.kind != TagKind::StartTag {
            return TokenSinkResult::Continue;
        }
        match &*tag.name {
            "body" => {
                self.found = true;
                TokenSinkResult::Continue
            }
            "title" | "textarea" => TokenSinkResult::RawData(RawKind::Rcdata),
            "style" | "xmp" | "iframe" | "noembed" | "noframes" | "noscript" => {
                TokenSinkResult::RawData(RawKind::Rawtext)
            }
            "script" => TokenSinkResult::RawData(RawKind::ScriptData),
            "plaintext" => TokenSinkResult::Plaintext,
            _ => TokenSinkResult::Continue,
        }
    }
}

/// Whether `source` contains a real `<body>` start tag.
fn has_body_start_tag(source: &str) -> bool {
    let mut tokenizer = Tokenizer::new(BodyTagSink::default(), TokenizerOpts::default());
    let mut input = BufferQueue::default();
    input.push_back(StrTendril::from_slice(source));
    let _ = tokenizer.feed(&mut input);
    tokenizer.end();
    tokenizer.sink.found
}

/// Remove `node` from its parent's children, returning the parent and the
/// index it occupied.
fn detach(node: &Handle) -> Option<(Handle, usize)> {
    let parent = node.parent.take()?.upgrade()?;
    let index = parent
        .children
        .borrow()
        .iter()
        .position(|child| Rc::ptr_eq(child, node))?;
    parent.children.borrow_mut().remove(index);
    Some((parent, index))
}
