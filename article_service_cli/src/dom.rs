//! Minimal node-capability view over a parsed document.
//!
//! The extraction heuristic only needs to query elements, read attributes and
//! text, and drop subtrees. [`DocumentTree`] captures exactly that, so the
//! heuristic runs the same against [`HtmlTree`] and against hand-built trees.

use std::collections::HashSet;
use std::hash::Hash;

use ego_tree::NodeId;
use scraper::{ElementRef, Html};

/// Element predicate, roughly one simple CSS selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query<'a> {
    /// `tag`
    Tag(&'a str),
    /// `.class` (exact whitespace-separated token)
    Class(&'a str),
    /// `[attr*=needle]`, case-sensitive substring of the raw attribute value
    AttrContains { attr: &'a str, needle: &'a str },
    /// `tag[attr=value]`
    TagAttr {
        tag: &'a str,
        attr: &'a str,
        value: &'a str,
    },
}

impl Query<'_> {
    pub fn matches<'e, F>(&self, tag: &str, attr: F) -> bool
    where
        F: Fn(&str) -> Option<&'e str>,
    {
        match *self {
            Query::Tag(name) => tag.eq_ignore_ascii_case(name),
            Query::Class(name) => attr("class")
                .map(|classes| classes.split_whitespace().any(|c| c == name))
                .unwrap_or(false),
            Query::AttrContains { attr: key, needle } => {
                attr(key).map(|v| v.contains(needle)).unwrap_or(false)
            }
            Query::TagAttr {
                tag: name,
                attr: key,
                value,
            } => tag.eq_ignore_ascii_case(name) && attr(key) == Some(value),
        }
    }
}

pub trait DocumentTree {
    type Node: Copy + Eq + Hash;

    /// Every element matching `query`, in document order.
    fn select(&self, query: &Query<'_>) -> Vec<Self::Node>;

    /// `None` for the root and for detached subtrees.
    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    fn attr(&self, node: Self::Node, name: &str) -> Option<&str>;

    /// Concatenated text of all descendant text nodes.
    fn text(&self, node: Self::Node) -> String;

    /// Removes `node` and its subtree from the document.
    fn detach(&mut self, node: Self::Node);

    /// Elements matching `query` below any of `scopes`, in document order and
    /// without duplicates when scopes nest.
    fn select_within(&self, scopes: &[Self::Node], query: &Query<'_>) -> Vec<Self::Node> {
        let scopes: HashSet<Self::Node> = scopes.iter().copied().collect();
        self.select(query)
            .into_iter()
            .filter(|node| self.ancestors(*node).any(|a| scopes.contains(&a)))
            .collect()
    }

    /// True when `node` is a strict descendant of `ancestor`.
    fn contains(&self, ancestor: Self::Node, node: Self::Node) -> bool {
        self.ancestors(node).any(|a| a == ancestor)
    }

    /// Parent first, up to the root.
    fn ancestors(&self, node: Self::Node) -> impl Iterator<Item = Self::Node> + '_ {
        std::iter::successors(self.parent(node), move |current| self.parent(*current))
    }

    fn first_text(&self, query: &Query<'_>) -> Option<String> {
        self.select(query).first().map(|node| self.text(*node))
    }

    fn first_attr(&self, query: &Query<'_>, name: &str) -> Option<String> {
        self.select(query)
            .first()
            .and_then(|node| self.attr(*node, name))
            .map(str::to_string)
    }
}

/// [`DocumentTree`] backed by an html5ever parse.
#[derive(Debug, Clone)]
pub struct HtmlTree {
    html: Html,
}

impl HtmlTree {
    pub fn parse(source: &str) -> Self {
        Self {
            html: Html::parse_document(source),
        }
    }

    fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> {
        self.html.tree.root().descendants().filter_map(ElementRef::wrap)
    }
}

impl DocumentTree for HtmlTree {
    type Node = NodeId;

    fn select(&self, query: &Query<'_>) -> Vec<NodeId> {
        self.elements()
            .filter(|el| {
                let element = el.value();
                query.matches(element.name(), |name| element.attr(name))
            })
            .map(|el| el.id())
            .collect()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.html.tree.get(node)?.parent().map(|p| p.id())
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.html
            .tree
            .get(node)
            .and_then(|n| n.value().as_element())
            .and_then(|el| el.attr(name))
    }

    fn text(&self, node: NodeId) -> String {
        self.html
            .tree
            .get(node)
            .and_then(ElementRef::wrap)
            .map(|el| el.text().collect())
            .unwrap_or_default()
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(mut n) = self.html.tree.get_mut(node) {
            n.detach();
        }
    }
}
