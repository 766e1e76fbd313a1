//! The page-to-record pipeline.

use scraper::{ElementRef, Html};

use crate::diagnostics::Diagnostics;
use crate::error::Error;
use crate::locate::{known_labels, locate};
use crate::navigate::{entry_blocks, Navigator};
use crate::record::{ItemRecord, Record, RecordKind, SpellRecord};
use crate::resolve::{FieldMap, FieldValue};
use crate::schema::Schema;
use crate::HtmlExtractor;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Abbreviate values to save card space.
    pub compact: bool,
}

/// A record together with what was noticed while extracting it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction<T> {
    pub record: T,
    pub diagnostics: Diagnostics,
}

impl<T> Extraction<T> {
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Extraction<U> {
        Extraction {
            record: f(self.record),
            diagnostics: self.diagnostics,
        }
    }
}

/// The single entry block of `root`.
///
/// A page without an entry heading is searched as a whole; the missing name
/// is then reported by validation.
pub fn entry_scope<'a>(root: ElementRef<'a>) -> Result<ElementRef<'a>, Error> {
    let blocks = entry_blocks(root);
    match blocks.len() {
        0 => Ok(root),
        1 => Ok(blocks[0]),
        entries => Err(Error::AmbiguousDocument { entries }),
    }
}

/// Locates every field of `T` in `root`. Values are normalized, and compacted
/// when requested, but not yet validated.
pub fn locate_fields<T: Schema>(
    root: ElementRef<'_>,
    options: &ExtractOptions,
    diagnostics: &mut Diagnostics,
) -> Result<FieldMap, Error> {
    let scope = entry_scope(root)?;
    let nav = Navigator::new(scope, known_labels(T::rules(), T::boundaries()));
    let mut fields: FieldMap = locate(&nav, T::rules(), diagnostics)
        .into_iter()
        .map(|(field, located)| (field, FieldValue::from(located)))
        .collect();
    if options.compact {
        T::compact(&mut fields);
    }
    Ok(fields)
}

pub fn extract_with<T: Schema>(
    root: ElementRef<'_>,
    options: &ExtractOptions,
) -> Result<Extraction<T>, Error> {
    let mut diagnostics = Diagnostics::new();
    let fields = locate_fields::<T>(root, options, &mut diagnostics)?;
    let record = T::assemble(&fields, &mut diagnostics)?;
    tracing::info!(
        kind = %T::KIND,
        flattened = diagnostics.flattened_markup(),
        discarded = diagnostics.discarded.len(),
        "extracted record"
    );
    Ok(Extraction {
        record,
        diagnostics,
    })
}

/// Parses `html` and extracts a record of `kind`.
pub fn extract_record(
    html: &str,
    kind: RecordKind,
    options: &ExtractOptions,
) -> Result<Extraction<Record>, Error> {
    let document = Html::parse_document(html);
    let root = document.root_element();
    Ok(match kind {
        RecordKind::Spell => extract_with::<SpellRecord>(root, options)?.map(Record::from),
        RecordKind::Item => extract_with::<ItemRecord>(root, options)?.map(Record::from),
    })
}

impl<T: Schema> HtmlExtractor for T {
    fn extract(elem: &ElementRef) -> Result<Self, Error> {
        extract_with(*elem, &ExtractOptions::default()).map(|extraction| extraction.record)
    }
}
