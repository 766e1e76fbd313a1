//! Where each field of a spell or item lives on an Archives of Nethys page.

use crate::compact;
use crate::diagnostics::Diagnostics;
use crate::error::ValidationReport;
use crate::field_table;
use crate::locate::FieldRule;
use crate::record::{ItemRecord, Record, RecordKind, SpellRecord};
use crate::resolve::FieldMap;

field_table! {
    /// Lookup rules of [`SpellRecord`] fields.
    pub SPELL_FIELDS {
        name = (heading "h1", plain),
        source = (text after "Source", plain, capture with r"^(.+?)(?:\s+pg\.|$)"),
        school = (text after "School"),
        level = (text after "Level"),
        casting_time = (text after "Casting Time" | text after "Time"),
        components = (text after "Components"),
        range = (text after "Range"),
        area = (text after "Area"),
        target = (text after "Target" | text after "Targets"),
        effect = (text after "Effect"),
        duration = (text after "Duration"),
        save = (text after "Saving Throw" | text after "Save" | literal "none"),
        spell_resistance = (text after "Spell Resistance" | text after "SR" | literal "no"),
        description = (section after "Description"),
    }

    /// Lookup rules of [`ItemRecord`] fields.
    pub ITEM_FIELDS {
        name = (heading "h1", plain),
        source = (
            text after "Source" | text between "Source" and "Aura",
            plain,
            capture with r"^(.+?)(?:\s+pg\.|$)"
        ),
        aura = (text after "Aura" | text between "Aura" and "CL"),
        caster_level = (text after "CL" | text after "Caster Level"),
        slot = (text after "Slot"),
        price = (text after "Price"),
        weight = (text after "Weight"),
        description = (section after "Description"),
        feat = (craft feat of "Requirements"),
        spells = (craft spells of "Requirements"),
        other_requirements = (craft other of "Requirements"),
    }
}

/// Labels that end a value without being fields themselves.
const SPELL_BOUNDARIES: &[&str] = &[
    "Domain",
    "Subdomain",
    "Bloodline",
    "Mystery",
    "Patron",
    "Elemental School",
    "Psychic Discipline",
];
const ITEM_BOUNDARIES: &[&str] = &["Cost", "Group"];

/// A record type together with the rules that extract it.
pub trait Schema: Sized + Into<Record> {
    const KIND: RecordKind;

    fn rules() -> &'static [FieldRule];

    fn boundaries() -> &'static [&'static str];

    /// Shortens located values in place before assembly.
    fn compact(fields: &mut FieldMap);

    fn assemble(fields: &FieldMap, diagnostics: &mut Diagnostics)
        -> Result<Self, ValidationReport>;
}

impl Schema for SpellRecord {
    const KIND: RecordKind = RecordKind::Spell;

    fn rules() -> &'static [FieldRule] {
        SPELL_FIELDS
    }

    fn boundaries() -> &'static [&'static str] {
        SPELL_BOUNDARIES
    }

    fn compact(fields: &mut FieldMap) {
        compact::compact_spell(fields)
    }

    fn assemble(
        fields: &FieldMap,
        diagnostics: &mut Diagnostics,
    ) -> Result<Self, ValidationReport> {
        SpellRecord::assemble(fields, diagnostics)
    }
}

impl Schema for ItemRecord {
    const KIND: RecordKind = RecordKind::Item;

    fn rules() -> &'static [FieldRule] {
        ITEM_FIELDS
    }

    fn boundaries() -> &'static [&'static str] {
        ITEM_BOUNDARIES
    }

    fn compact(fields: &mut FieldMap) {
        compact::compact_item(fields)
    }

    fn assemble(fields: &FieldMap, _: &mut Diagnostics) -> Result<Self, ValidationReport> {
        ItemRecord::assemble(fields)
    }
}
