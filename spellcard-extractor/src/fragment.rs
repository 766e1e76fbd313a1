//! Raw field values lifted out of the document tree.
//!
//! A [`Fragment`] keeps the little structure the cards care about (emphasis
//! and line breaks) and flattens everything else to text. Elements with no
//! card text, such as scripts, are dropped but still reported.

use scraper::{ElementRef, Node};

use crate::normalize::{self, Context, BREAK};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis {
    Bold,
    Italic,
}

impl Emphasis {
    fn command(self) -> &'static str {
        match self {
            Emphasis::Bold => "\\textbf",
            Emphasis::Italic => "\\textit",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Emphasis(Emphasis, Fragment),
    Break,
    /// Markup with no card equivalent, kept as its text content.
    Flattened { tag: String, text: String },
    /// Markup whose content has no place on a card.
    Dropped { tag: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    segments: Vec<Segment>,
}

impl Fragment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(s: &str) -> Self {
        let mut fragment = Self::new();
        fragment.push_text(s);
        fragment
    }

    /// The content of `elem`, without `elem` itself.
    pub fn of_children(elem: ElementRef<'_>) -> Self {
        let mut fragment = Self::new();
        for child in elem.children() {
            if let Some(child_elem) = ElementRef::wrap(child) {
                fragment.push_element(child_elem);
            } else if let Node::Text(text) = child.value() {
                fragment.push_text(text);
            }
        }
        fragment
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn push_text(&mut self, text: &str) {
        if let Some(Segment::Text(last)) = self.segments.last_mut() {
            last.push_str(text);
        } else {
            self.segments.push(Segment::Text(text.to_owned()));
        }
    }

    pub fn push_break(&mut self) {
        self.segments.push(Segment::Break);
    }

    pub fn push_segment(&mut self, segment: Segment) {
        match segment {
            Segment::Text(text) => self.push_text(&text),
            other => self.segments.push(other),
        }
    }

    /// Appends `elem` (the element itself, not only its children).
    pub fn push_element(&mut self, elem: ElementRef<'_>) {
        match elem.value().name() {
            "b" | "strong" => self
                .segments
                .push(Segment::Emphasis(Emphasis::Bold, Self::of_children(elem))),
            "i" | "em" => self
                .segments
                .push(Segment::Emphasis(Emphasis::Italic, Self::of_children(elem))),
            "br" | "hr" => self.push_break(),
            "p" | "div" | "li" => {
                self.push_break();
                self.extend(Self::of_children(elem));
                self.push_break();
            }
            "ul" | "ol" => {
                for item in elem.children().filter_map(ElementRef::wrap) {
                    self.push_element(item);
                }
            }
            "table" => self.push_table(elem),
            "a" | "span" | "font" | "nobr" | "td" | "th" => self.extend(Self::of_children(elem)),
            "script" | "style" | "img" => self.segments.push(Segment::Dropped {
                tag: elem.value().name().to_owned(),
            }),
            tag => self.segments.push(Segment::Flattened {
                tag: tag.to_owned(),
                text: elem.text().collect(),
            }),
        }
    }

    fn push_table(&mut self, table: ElementRef<'_>) {
        let rows = table
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|e| e.value().name() == "tr");
        for row in rows {
            self.push_break();
            let cells = row
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|e| matches!(e.value().name(), "td" | "th"));
            for (i, cell) in cells.enumerate() {
                if i > 0 {
                    self.push_text("; ");
                }
                self.extend(Self::of_children(cell));
            }
        }
        self.push_break();
    }

    pub fn extend(&mut self, other: Fragment) {
        for segment in other.segments {
            self.push_segment(segment);
        }
    }

    /// Text content with emphasis dropped and breaks as spaces.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Emphasis(_, inner) => out.push_str(&inner.plain_text()),
                Segment::Break => out.push(' '),
                Segment::Flattened { text, .. } => out.push_str(text),
                Segment::Dropped { .. } => {}
            }
        }
        out
    }

    /// Tags of every flattened or dropped element, nested ones included.
    pub fn unsupported_tags(&self) -> Vec<String> {
        let mut tags = Vec::new();
        for segment in &self.segments {
            match segment {
                Segment::Emphasis(_, inner) => tags.extend(inner.unsupported_tags()),
                Segment::Flattened { tag, .. } | Segment::Dropped { tag } => {
                    tags.push(tag.clone())
                }
                Segment::Text(_) | Segment::Break => {}
            }
        }
        tags
    }

    /// TeX for [`normalize::normalize`]: text is escaped, emphasis becomes
    /// TeX commands wrapping normalized content, breaks become [`BREAK`].
    ///
    /// The tag of every flattened or dropped element is pushed to `flattened`.
    pub fn render(&self, flattened: &mut Vec<String>) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(&normalize::escape(text)),
                Segment::Emphasis(emphasis, inner) => {
                    let inner = normalize::normalize(&inner.render(flattened), Context::Inline);
                    if inner.is_empty() {
                        continue;
                    }
                    out.push_str(emphasis.command());
                    out.push('{');
                    out.push_str(&inner);
                    out.push('}');
                }
                Segment::Break => {
                    out.push(' ');
                    out.push_str(BREAK);
                    out.push(' ');
                }
                Segment::Flattened { tag, text } => {
                    flattened.push(tag.clone());
                    out.push_str(&normalize::escape(text));
                }
                Segment::Dropped { tag } => flattened.push(tag.clone()),
            }
        }
        out
    }

    /// Splits the fragment at top-level italic runs.
    ///
    /// Returns the segments before the first italic run, from the first to the
    /// last italic run, and after the last one. `None` if there is no italic run.
    pub fn split_italics(&self) -> Option<(Fragment, Fragment, Fragment)> {
        let is_italic = |s: &Segment| matches!(s, Segment::Emphasis(Emphasis::Italic, _));
        let first = self.segments.iter().position(is_italic)?;
        let last = self.segments.iter().rposition(is_italic)?;
        let part = |segments: &[Segment]| Fragment {
            segments: segments.to_vec(),
        };
        Some((
            part(&self.segments[..first]),
            part(&self.segments[first..=last]),
            part(&self.segments[last + 1..]),
        ))
    }
}
