//! Query primitives over one entry of a parsed page.

use std::collections::HashSet;

use scraper::{ElementRef, Node, Selector};

use crate::fragment::Fragment;
use crate::normalize::collapse_whitespace;

const HEADINGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];
const INLINE_LABELS: &[&str] = &["b", "strong", "th", "td"];

/// Which kind of element may carry a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    /// Headings, bold spans and table cells.
    Any,
    /// Bold spans and table cells.
    Inline,
    /// `h1` to `h6`.
    Heading,
}

impl LabelKind {
    fn admits(self, tag: &str) -> bool {
        match self {
            LabelKind::Any => is_heading(tag) || INLINE_LABELS.contains(&tag),
            LabelKind::Inline => INLINE_LABELS.contains(&tag),
            LabelKind::Heading => is_heading(tag),
        }
    }
}

fn is_heading(tag: &str) -> bool {
    HEADINGS.contains(&tag)
}

/// Case-insensitive, whitespace-normalized label text without a trailing colon.
pub fn label_key(text: &str) -> String {
    let collapsed = collapse_whitespace(text);
    collapsed
        .trim_end_matches(':')
        .trim_end()
        .to_lowercase()
}

/// Entry headings (`h1` with text) in document order.
pub fn entry_headings<'a>(root: ElementRef<'a>) -> Vec<ElementRef<'a>> {
    root.descendants()
        .filter_map(ElementRef::wrap)
        .filter(|e| e.value().name() == "h1")
        .filter(|e| !e.text().collect::<String>().trim().is_empty())
        .collect()
}

/// The enclosing block of every entry on the page. One element per entry, so a
/// block holding two entries appears twice.
pub fn entry_blocks<'a>(root: ElementRef<'a>) -> Vec<ElementRef<'a>> {
    entry_headings(root)
        .into_iter()
        .map(|h| h.parent().and_then(ElementRef::wrap).unwrap_or(h))
        .collect()
}

pub struct Navigator<'a> {
    scope: ElementRef<'a>,
    labels: HashSet<String>,
}

impl<'a> Navigator<'a> {
    /// `labels` are the known field labels; a value ends where one of them starts.
    pub fn new<I, S>(scope: ElementRef<'a>, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Navigator {
            scope,
            labels: labels.into_iter().map(|l| label_key(l.as_ref())).collect(),
        }
    }

    fn elements(&self) -> impl Iterator<Item = ElementRef<'a>> {
        self.scope.descendants().filter_map(ElementRef::wrap)
    }

    /// The first heading, bold span or table cell whose text is `label`.
    pub fn find_label(&self, label: &str) -> Option<ElementRef<'a>> {
        self.find_label_of(label, LabelKind::Any)
    }

    pub fn find_label_of(&self, label: &str, kind: LabelKind) -> Option<ElementRef<'a>> {
        let key = label_key(label);
        self.elements().find(|e| {
            kind.admits(e.value().name()) && label_key(&e.text().collect::<String>()) == key
        })
    }

    /// All matches of [`Navigator::find_label_of`], in document order.
    pub fn find_labels_of(&self, label: &str, kind: LabelKind) -> Vec<ElementRef<'a>> {
        let key = label_key(label);
        self.elements()
            .filter(|e| {
                kind.admits(e.value().name()) && label_key(&e.text().collect::<String>()) == key
            })
            .collect()
    }

    fn is_known_label(&self, elem: ElementRef<'_>) -> bool {
        LabelKind::Inline.admits(elem.value().name())
            && self
                .labels
                .contains(&label_key(&elem.text().collect::<String>()))
    }

    /// The siblings following `node` up to the next known label, heading or
    /// the end of the enclosing block.
    pub fn text_after(&self, node: ElementRef<'a>) -> Fragment {
        let mut fragment = Fragment::new();
        for sibling in node.next_siblings() {
            if let Some(elem) = ElementRef::wrap(sibling) {
                if is_heading(elem.value().name()) || self.is_known_label(elem) {
                    break;
                }
                fragment.push_element(elem);
            } else if let Node::Text(text) = sibling.value() {
                fragment.push_text(text);
            }
        }
        fragment
    }

    /// The siblings following the heading `node` up to the next heading.
    pub fn section_after(&self, node: ElementRef<'a>) -> Fragment {
        let mut fragment = Fragment::new();
        for sibling in node.next_siblings() {
            if let Some(elem) = ElementRef::wrap(sibling) {
                if is_heading(elem.value().name()) {
                    break;
                }
                fragment.push_element(elem);
            } else if let Node::Text(text) = sibling.value() {
                fragment.push_text(text);
            }
        }
        fragment
    }

    /// The minimal element enclosing the label and its value.
    pub fn block_for(&self, label: &str) -> Option<ElementRef<'a>> {
        let node = self.find_label(label)?;
        node.parent().and_then(ElementRef::wrap)
    }

    /// The content of the first `tag` heading.
    pub fn heading(&self, tag: &str) -> Option<Fragment> {
        self.elements()
            .find(|e| e.value().name() == tag)
            .map(Fragment::of_children)
    }

    /// The content of the first element matching `selector`.
    pub fn select_first(&self, selector: &Selector) -> Option<Fragment> {
        self.scope.select(selector).next().map(Fragment::of_children)
    }

    /// Whitespace-collapsed text of the whole scope.
    pub fn block_text(&self) -> String {
        collapse_whitespace(&self.scope.text().collect::<String>())
    }

    /// The text between `start` and the following `end`, both matched
    /// case-sensitively in [`Navigator::block_text`].
    pub fn text_between(&self, start: &str, end: &str) -> Option<String> {
        let text = self.block_text();
        let from = text.find(start)? + start.len();
        let to = text[from..].find(end)? + from;
        Some(text[from..to].to_owned())
    }
}
