use tracing::debug;

use crate::dom::{DocumentTree, HtmlTree, Query};
use crate::{ExtractError, ExtractedArticle, MIN_PARAGRAPH_CHARS, UNTITLED};

/// Likely article containers, most specific first.
const CONTAINERS: [(&str, Query<'static>); 8] = [
    ("article", Query::Tag("article")),
    (
        "[class*=content]",
        Query::AttrContains {
            attr: "class",
            needle: "content",
        },
    ),
    (
        "[class*=article]",
        Query::AttrContains {
            attr: "class",
            needle: "article",
        },
    ),
    (
        "[id*=content]",
        Query::AttrContains {
            attr: "id",
            needle: "content",
        },
    ),
    (
        "[id*=article]",
        Query::AttrContains {
            attr: "id",
            needle: "article",
        },
    ),
    ("main", Query::Tag("main")),
    (".post-content", Query::Class("post-content")),
    (".entry-content", Query::Class("entry-content")),
];

const NOISE: [Query<'static>; 8] = [
    Query::Tag("script"),
    Query::Tag("style"),
    Query::Tag("nav"),
    Query::Tag("footer"),
    Query::Tag("header"),
    Query::Tag("aside"),
    Query::Class("ads"),
    Query::Class("advertisement"),
];

const PARAGRAPH: Query<'static> = Query::Tag("p");

/// Where the accepted paragraphs came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSource {
    /// A container selector matched and yielded qualifying paragraphs.
    Container(&'static str),
    /// No container worked; every paragraph of the page was scanned.
    FullDocument,
}

#[derive(Debug, Clone)]
pub struct ArticleExtractor {
    min_paragraph_chars: usize,
}

impl Default for ArticleExtractor {
    fn default() -> Self {
        Self {
            min_paragraph_chars: MIN_PARAGRAPH_CHARS,
        }
    }
}

impl ArticleExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extract(&self, html: &str, url: &str) -> Result<ExtractedArticle, ExtractError> {
        let tree = HtmlTree::parse(html);
        self.extract_tree(&tree, url).map(|(article, _)| article)
    }

    pub fn extract_tree<T>(
        &self,
        tree: &T,
        url: &str,
    ) -> Result<(ExtractedArticle, ContentSource), ExtractError>
    where
        T: DocumentTree + Clone,
    {
        let title = resolve_title(tree);
        let (paragraphs, source) = self
            .resolve_paragraphs(tree)
            .ok_or(ExtractError::NoContent)?;
        debug!(url, ?source, paragraphs = paragraphs.len(), "article content resolved");
        Ok((
            ExtractedArticle::new(url.to_string(), title, paragraphs),
            source,
        ))
    }

    /// Container scan first, whole-page scan only when no container yields text.
    pub fn resolve_paragraphs<T>(&self, tree: &T) -> Option<(Vec<String>, ContentSource)>
    where
        T: DocumentTree + Clone,
    {
        for (selector, query) in CONTAINERS.iter() {
            let scopes = tree.select(query);
            if scopes.is_empty() {
                continue;
            }

            let mut cleaned = tree.clone();
            for noise in NOISE.iter() {
                for node in cleaned.select_within(&scopes, noise) {
                    cleaned.detach(node);
                }
            }

            let paragraphs = self.qualifying(&cleaned, cleaned.select_within(&scopes, &PARAGRAPH));
            if !paragraphs.is_empty() {
                return Some((paragraphs, ContentSource::Container(*selector)));
            }
        }

        let paragraphs = self.qualifying(tree, tree.select(&PARAGRAPH));
        if paragraphs.is_empty() {
            None
        } else {
            Some((paragraphs, ContentSource::FullDocument))
        }
    }

    fn qualifying<T: DocumentTree>(&self, tree: &T, nodes: Vec<T::Node>) -> Vec<String> {
        nodes
            .into_iter()
            .filter_map(|node| {
                let text = tree.text(node);
                let text = text.trim();
                (text.chars().count() > self.min_paragraph_chars).then(|| text.to_string())
            })
            .collect()
    }
}

/// First non-blank of: `h1`, `og:title`, `meta[name=title]`, `title`.
pub fn resolve_title<T: DocumentTree>(tree: &T) -> String {
    let candidates = [
        tree.first_text(&Query::Tag("h1")),
        tree.first_attr(
            &Query::TagAttr {
                tag: "meta",
                attr: "property",
                value: "og:title",
            },
            "content",
        ),
        tree.first_attr(
            &Query::TagAttr {
                tag: "meta",
                attr: "name",
                value: "title",
            },
            "content",
        ),
        tree.first_text(&Query::Tag("title")),
    ];

    candidates
        .into_iter()
        .flatten()
        .map(|candidate| candidate.trim().to_string())
        .find(|candidate| !candidate.is_empty())
        .unwrap_or_else(|| UNTITLED.to_string())
}
