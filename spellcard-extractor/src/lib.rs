//! This crate turns Archives of Nethys spell and magic item pages into
//! records for TeX spell cards.
//!
//! A page is parsed with [`scraper`], its single entry is located, and every
//! field is looked up through an ordered list of named strategies (see
//! [`field_table!`](macro.field_table.html)). Values are normalized for TeX,
//! variant groups are resolved and the record is validated as a whole:
//! every missing field is reported at once.
//!
//! # Examples
//! ```
//! use spellcard_extractor::{HtmlExtractor, SpellRecord};
//!
//! fn main() {
//!     let input = r#"
//!         <div>
//!             <h1>Vampiric Touch</h1>
//!             <b>Source</b> PRPG Core Rulebook pg. 365<br>
//!             <b>School</b> necromancy; <b>Level</b> sorcerer/wizard 3<br>
//!             <b>Casting Time</b> 1 standard action<br>
//!             <b>Components</b> V, S<br>
//!             <b>Range</b> touch<br>
//!             <b>Target</b> living creature touched<br>
//!             <b>Duration</b> instantaneous/1 hour; see text<br>
//!             <b>Saving Throw</b> none; <b>Spell Resistance</b> yes
//!             <h3>Description</h3>
//!             You must succeed on a melee touch attack. Your touch deals
//!             <b>1d6 points of damage</b> per two caster levels.
//!         </div>
//!     "#;
//!     let spell = SpellRecord::extract_from_str(input).unwrap();
//!     assert_eq!(spell.school, "necromancy");
//!     assert_eq!(spell.area_target_effect.target(), Some("living creature touched"));
//!     assert!(spell.description.contains(r"\textbf{1d6 points of damage}"));
//! }
//! ```

// macro-generated paths name this crate
extern crate self as spellcard_extractor;

#[doc(hidden)]
pub extern crate lazy_static;
#[doc(hidden)]
pub extern crate regex;
#[doc(hidden)]
pub extern crate scraper;

pub mod cli;
pub mod compact;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod extract;
pub mod fragment;
pub mod loader;
pub mod locate;
pub mod navigate;
pub mod normalize;
pub mod record;
pub mod resolve;
pub mod schema;

pub use config::Config;
pub use diagnostics::Diagnostics;
pub use error::{Error, Problem, ValidationReport};
pub use extract::{extract_record, extract_with, ExtractOptions, Extraction};
pub use normalize::{normalize, Context};
pub use record::{assemble, ItemRecord, Record, RecordKind, SpellRecord};
pub use resolve::{AreaTargetEffect, Crafting, FieldMap, FieldValue};
pub use schema::Schema;

/// Generates static tables of [`FieldRule`](locate::FieldRule)s.
///
/// # Syntax
///
/// ## Defining tables
/// Zero or more tables can be defined. Each becomes a
/// `static NAME: &[FieldRule]`; attributes and visibility are kept.
/// ```text
/// field_table! {
///     /// Lookup rules of spells.
///     pub SPELL_FIELDS {
///         // fields...
///     }
/// }
/// ```
///
/// ## Defining fields
/// A field is a name and a parenthesized rule: one or more strategies
/// separated by `|`, tried in order, followed by options.
/// ```text
/// field_table! {
///     FIELDS {
///         name = (heading "h1", plain),
///         spell_resistance = (text after "Spell Resistance" | text after "SR" | literal "no"),
///         source = (text after "Source", capture with r"^(.+?)(?:\s+pg\.|$)"),
///     }
/// }
/// ```
///
/// ## Strategies
/// * `heading "h1"`: the content of the first heading with that tag.
/// * `text after "Label"`: the siblings after a bold or table-cell label, up
///   to the next known label or heading.
/// * `text between "Start" and "End"`: the entry text between two words.
/// * `text of "selector"`: the content of the first element matching a CSS
///   selector. Invalid selectors are a compile error.
/// * `section after "Heading"`: the siblings after a heading, up to the next
///   heading. Fields using it keep their paragraph breaks.
/// * `literal "value"`: a fixed value, usually the last resort.
/// * `craft feat of "Label"` (or `spells`, `other`): one part of a crafting
///   requirements line.
///
/// ## Options
/// * `capture with "regex"`: keeps the only capture group of the regex. The
///   regex must compile and have exactly one group.
/// * `plain`: drops emphasis from the value.
pub use spellcard_extractor_macros::field_table;

/// A trait for extracting records from HTML documents.
///
/// It is implemented for every [`Schema`]; use [`extract_with`] to also get
/// the [`Diagnostics`] of a run.
pub trait HtmlExtractor
where
    Self: Sized,
{
    /// Extracts data from [`scraper::element_ref::ElementRef`].
    fn extract(elem: &scraper::ElementRef) -> Result<Self, Error>;
    /// Parses HTML string and extracts data from it.
    fn extract_from_str(html_str: &str) -> Result<Self, Error> {
        let html = scraper::Html::parse_document(html_str);
        HtmlExtractor::extract(&html.root_element())
    }
}

#[cfg(test)]
mod test;
