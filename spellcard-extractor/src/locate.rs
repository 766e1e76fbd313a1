//! Field lookup strategies and the locator that runs them.
//!
//! Tables of [`FieldRule`]s are usually written with
//! [`field_table!`](crate::field_table).

use scraper::Selector;

use crate::diagnostics::Diagnostics;
use crate::fragment::Fragment;
use crate::navigate::{LabelKind, Navigator};
use crate::normalize::{normalize, Context};

/// How one field is found in a page.
#[derive(Debug)]
pub struct FieldRule {
    pub field: &'static str,
    pub context: Context,
    /// Tried in order; the first one giving a non-empty value wins.
    pub strategies: &'static [Strategy],
    /// Applied to the located value; the single group is kept.
    pub capture: Option<fn() -> &'static regex::Regex>,
    /// Drop emphasis from the value.
    pub plain: bool,
}

impl FieldRule {
    pub fn labels(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.strategies.iter().flat_map(|s| s.lookup.labels())
    }
}

/// One named lookup rule.
#[derive(Debug, Clone, Copy)]
pub struct Strategy {
    pub name: &'static str,
    pub lookup: Lookup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// Content of the first heading with this tag.
    Heading(&'static str),
    /// Siblings after a bold or table-cell label.
    TextAfter(&'static str),
    /// Entry text between two words.
    TextBetween(&'static str, &'static str),
    /// Content of the first element matching a CSS selector.
    TextOf(&'static str),
    /// Siblings after a heading, up to the next heading.
    SectionAfter(&'static str),
    /// A fixed value.
    Literal(&'static str),
    /// One part of a crafting requirements line.
    Crafting(&'static str, CraftPart),
}

impl Lookup {
    /// Labels that end the value of a neighbouring field.
    fn labels(&self) -> Vec<&'static str> {
        match *self {
            Lookup::TextAfter(label) | Lookup::Crafting(label, _) => vec![label],
            Lookup::TextBetween(start, end) => vec![start, end],
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CraftPart {
    Feat,
    Spells,
    Other,
}

/// Names that mark a crafting feat when a requirements line has no italics.
const CRAFTING_FEATS: &[&str] = &["Craft", "Forge", "Brew", "Scribe"];

/// Result of locating one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Located {
    Found { strategy: &'static str, text: String },
    /// A strategy matched but every match was empty.
    Blank { strategy: &'static str },
    Absent,
}

/// Every label the rules look for, plus `extra`.
pub fn known_labels(rules: &[FieldRule], extra: &[&'static str]) -> Vec<&'static str> {
    let mut labels: Vec<&'static str> = rules.iter().flat_map(|r| r.labels()).collect();
    labels.extend_from_slice(extra);
    labels
}

/// Runs every rule against `nav`. Values are normalized for the rule's context.
pub fn locate(
    nav: &Navigator<'_>,
    rules: &[FieldRule],
    diagnostics: &mut Diagnostics,
) -> Vec<(&'static str, Located)> {
    rules
        .iter()
        .map(|rule| (rule.field, locate_field(nav, rule, diagnostics)))
        .collect()
}

pub fn locate_field(nav: &Navigator<'_>, rule: &FieldRule, diagnostics: &mut Diagnostics) -> Located {
    let mut blank = None;
    for strategy in rule.strategies {
        for fragment in candidates(nav, &strategy.lookup) {
            let (raw, flattened) = if rule.plain {
                (plain(&fragment).render(&mut Vec::new()), fragment.unsupported_tags())
            } else {
                let mut flattened = Vec::new();
                (fragment.render(&mut flattened), flattened)
            };
            let text = finish(rule, &raw);
            if text.is_empty() {
                blank.get_or_insert(strategy.name);
                continue;
            }
            for tag in flattened {
                diagnostics.flattened(rule.field, tag);
            }
            tracing::debug!(field = rule.field, strategy = strategy.name, "located");
            diagnostics.provenance.insert(rule.field, strategy.name);
            return Located::Found {
                strategy: strategy.name,
                text,
            };
        }
    }
    match blank {
        Some(strategy) => {
            diagnostics.provenance.insert(rule.field, strategy);
            Located::Blank { strategy }
        }
        None => Located::Absent,
    }
}

fn finish(rule: &FieldRule, raw: &str) -> String {
    let mut text = normalize(raw, rule.context);
    if rule.context == Context::Inline {
        text = trim_separators(&text).to_owned();
    }
    if let Some(capture) = rule.capture {
        text = capture()
            .captures(&text)
            .and_then(|caps| caps.get(1))
            .map_or_else(String::new, |m| m.as_str().to_owned());
        text = trim_separators(&normalize(&text, rule.context)).to_owned();
    }
    text
}

fn trim_separators(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_whitespace() || c == ';' || c == ',')
}

/// Every fragment a lookup can produce, best first.
fn candidates(nav: &Navigator<'_>, lookup: &Lookup) -> Vec<Fragment> {
    match *lookup {
        Lookup::Heading(tag) => nav.heading(tag).into_iter().collect(),
        Lookup::TextAfter(label) => nav
            .find_labels_of(label, LabelKind::Inline)
            .into_iter()
            .map(|node| nav.text_after(node))
            .collect(),
        Lookup::TextBetween(start, end) => nav
            .text_between(start, end)
            .map(|text| Fragment::text(&text))
            .into_iter()
            .collect(),
        Lookup::TextOf(selector) => Selector::parse(selector)
            .ok()
            .and_then(|selector| nav.select_first(&selector))
            .into_iter()
            .collect(),
        Lookup::SectionAfter(label) => nav
            .find_labels_of(label, LabelKind::Heading)
            .into_iter()
            .map(|node| nav.section_after(node))
            .collect(),
        Lookup::Literal(value) => vec![Fragment::text(value)],
        Lookup::Crafting(label, part) => nav
            .find_label_of(label, LabelKind::Inline)
            .map(|node| nav.text_after(node))
            .and_then(|requirements| crafting_part(&requirements, part))
            .into_iter()
            .collect(),
    }
}

/// Splits a requirements line into feat, spells and other requirements.
///
/// With italics, the feat precedes the first italic run, the spells span the
/// italic runs and the rest follows. Without, comma-separated parts naming a
/// crafting feat are the feat and everything else is other requirements.
pub fn split_requirements(requirements: &Fragment) -> (Fragment, Option<Fragment>, Fragment) {
    if let Some((feat, spells, other)) = requirements.split_italics() {
        return (feat, Some(plain(&spells)), other);
    }
    let text = requirements.plain_text();
    let (feats, others): (Vec<&str>, Vec<&str>) = text
        .split(", ")
        .partition(|part| CRAFTING_FEATS.iter().any(|f| part.contains(f)));
    (
        Fragment::text(&feats.join(", ")),
        None,
        Fragment::text(&others.join(", ")),
    )
}

fn trim_punctuation(s: &str) -> String {
    s.trim_matches(|c: char| c.is_whitespace() || " ,.;:".contains(c))
        .to_owned()
}

fn plain(fragment: &Fragment) -> Fragment {
    Fragment::text(&fragment.plain_text())
}

fn crafting_part(requirements: &Fragment, part: CraftPart) -> Option<Fragment> {
    let (feat, spells, other) = split_requirements(requirements);
    let fragment = match part {
        CraftPart::Feat => feat,
        CraftPart::Spells => spells?,
        CraftPart::Other => other,
    };
    let text = fragment.plain_text();
    let mut text = trim_punctuation(&text);
    if part == CraftPart::Feat && text.ends_with(" and") {
        text = trim_punctuation(&text[..text.len() - " and".len()]);
    }
    if text.is_empty() {
        None
    } else {
        Some(Fragment::text(&text))
    }
}
