//! The two card records, their validation and their JSON form.
//!
//! Records are written as one JSON object per file with every schema field
//! present. Omitted optional values are `null` and blank ones `""`, so a
//! card template can tell the two apart.

use std::convert::TryFrom;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::diagnostics::Diagnostics;
use crate::error::{Error, Problem, ValidationReport};
use crate::normalize::{normalize, Context};
use crate::resolve::{AreaTargetEffect, Crafting, FieldMap, FieldValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Spell,
    Item,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecordKind::Spell => "spell",
            RecordKind::Item => "item",
        })
    }
}

/// Collects every problem of one record instead of stopping at the first.
struct Checker {
    problems: Vec<Problem>,
}

impl Checker {
    fn new() -> Self {
        Checker {
            problems: Vec::new(),
        }
    }

    fn escaped(&mut self, field: &'static str, text: &str) {
        if normalize(text, Context::Block) != text {
            self.problems.push(Problem::Unescaped { field });
        }
    }

    fn required(&mut self, fields: &FieldMap, field: &'static str) -> String {
        match fields.get(field) {
            FieldValue::Present(text) => {
                self.escaped(field, text);
                text.clone()
            }
            FieldValue::Blank => {
                self.problems.push(Problem::FieldBlank { field });
                String::new()
            }
            FieldValue::Absent => {
                self.problems.push(Problem::FieldMissing { field });
                String::new()
            }
        }
    }

    fn optional(&mut self, fields: &FieldMap, field: &'static str) {
        if let FieldValue::Present(text) = fields.get(field) {
            self.escaped(field, text);
        }
    }

    fn group<T>(&mut self, resolved: Result<T, Problem>) -> Option<T> {
        match resolved {
            Ok(value) => Some(value),
            Err(problem) => {
                self.problems.push(problem);
                None
            }
        }
    }

    fn finish<T>(self, kind: RecordKind, record: Option<T>) -> Result<T, ValidationReport> {
        match record {
            Some(record) if self.problems.is_empty() => Ok(record),
            _ => Err(ValidationReport {
                kind,
                problems: self.problems,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "SpellDoc", try_from = "SpellDoc")]
pub struct SpellRecord {
    pub name: String,
    pub school: String,
    pub level: String,
    pub casting_time: String,
    pub components: String,
    pub range: String,
    pub area_target_effect: AreaTargetEffect,
    pub duration: String,
    pub save: String,
    pub spell_resistance: String,
    pub description: String,
    pub source: String,
}

impl SpellRecord {
    /// Field names in output order.
    pub const FIELDS: [&'static str; 14] = [
        "name",
        "school",
        "level",
        "casting_time",
        "components",
        "range",
        "area",
        "target",
        "effect",
        "duration",
        "save",
        "spell_resistance",
        "description",
        "source",
    ];

    pub fn assemble(
        fields: &FieldMap,
        diagnostics: &mut Diagnostics,
    ) -> Result<Self, ValidationReport> {
        let mut check = Checker::new();
        let name = check.required(fields, "name");
        let school = check.required(fields, "school");
        let level = check.required(fields, "level");
        let casting_time = check.required(fields, "casting_time");
        let components = check.required(fields, "components");
        let range = check.required(fields, "range");
        for member in AreaTargetEffect::MEMBERS.iter().copied() {
            check.optional(fields, member);
        }
        let area_target_effect = check.group(AreaTargetEffect::resolve(fields, diagnostics));
        let duration = check.required(fields, "duration");
        let save = check.required(fields, "save");
        let spell_resistance = check.required(fields, "spell_resistance");
        let description = check.required(fields, "description");
        let source = check.required(fields, "source");

        let record = area_target_effect.map(|area_target_effect| SpellRecord {
            name,
            school,
            level,
            casting_time,
            components,
            range,
            area_target_effect,
            duration,
            save,
            spell_resistance,
            description,
            source,
        });
        check.finish(RecordKind::Spell, record)
    }

    pub fn fields(&self) -> FieldMap {
        FieldMap::from(SpellDoc::from(self.clone()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "ItemDoc", try_from = "ItemDoc")]
pub struct ItemRecord {
    pub name: String,
    pub aura: String,
    pub caster_level: String,
    pub slot: String,
    pub price: String,
    pub weight: String,
    pub description: String,
    pub crafting: Crafting,
    pub source: String,
}

impl ItemRecord {
    /// Field names in output order.
    pub const FIELDS: [&'static str; 11] = [
        "name",
        "aura",
        "caster_level",
        "slot",
        "price",
        "weight",
        "description",
        "feat",
        "spells",
        "other_requirements",
        "source",
    ];

    pub fn assemble(fields: &FieldMap) -> Result<Self, ValidationReport> {
        let mut check = Checker::new();
        let name = check.required(fields, "name");
        let aura = check.required(fields, "aura");
        let caster_level = check.required(fields, "caster_level");
        let slot = check.required(fields, "slot");
        let price = check.required(fields, "price");
        let weight = check.required(fields, "weight");
        let description = check.required(fields, "description");
        for member in Crafting::MEMBERS.iter().copied() {
            check.optional(fields, member);
        }
        let crafting = check.group(Crafting::resolve(fields));
        let source = check.required(fields, "source");

        let record = crafting.map(|crafting| ItemRecord {
            name,
            aura,
            caster_level,
            slot,
            price,
            weight,
            description,
            crafting,
            source,
        });
        check.finish(RecordKind::Item, record)
    }

    pub fn fields(&self) -> FieldMap {
        FieldMap::from(ItemDoc::from(self.clone()))
    }
}

/// The flat on-disk shape of a [`SpellRecord`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SpellDoc {
    name: FieldValue,
    school: FieldValue,
    level: FieldValue,
    casting_time: FieldValue,
    components: FieldValue,
    range: FieldValue,
    area: FieldValue,
    target: FieldValue,
    effect: FieldValue,
    duration: FieldValue,
    save: FieldValue,
    spell_resistance: FieldValue,
    description: FieldValue,
    source: FieldValue,
}

impl From<SpellRecord> for SpellDoc {
    fn from(r: SpellRecord) -> Self {
        let opt = |s: Option<&str>| FieldValue::from(s.map(str::to_owned));
        SpellDoc {
            area: opt(r.area_target_effect.area()),
            target: opt(r.area_target_effect.target()),
            effect: opt(r.area_target_effect.effect()),
            name: FieldValue::from_text(r.name),
            school: FieldValue::from_text(r.school),
            level: FieldValue::from_text(r.level),
            casting_time: FieldValue::from_text(r.casting_time),
            components: FieldValue::from_text(r.components),
            range: FieldValue::from_text(r.range),
            duration: FieldValue::from_text(r.duration),
            save: FieldValue::from_text(r.save),
            spell_resistance: FieldValue::from_text(r.spell_resistance),
            description: FieldValue::from_text(r.description),
            source: FieldValue::from_text(r.source),
        }
    }
}

impl From<SpellDoc> for FieldMap {
    fn from(d: SpellDoc) -> Self {
        let values = vec![
            d.name,
            d.school,
            d.level,
            d.casting_time,
            d.components,
            d.range,
            d.area,
            d.target,
            d.effect,
            d.duration,
            d.save,
            d.spell_resistance,
            d.description,
            d.source,
        ];
        SpellRecord::FIELDS.iter().copied().zip(values).collect()
    }
}

impl TryFrom<SpellDoc> for SpellRecord {
    type Error = ValidationReport;

    fn try_from(doc: SpellDoc) -> Result<Self, ValidationReport> {
        SpellRecord::assemble(&FieldMap::from(doc), &mut Diagnostics::new())
    }
}

/// The flat on-disk shape of an [`ItemRecord`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ItemDoc {
    name: FieldValue,
    aura: FieldValue,
    caster_level: FieldValue,
    slot: FieldValue,
    price: FieldValue,
    weight: FieldValue,
    description: FieldValue,
    feat: FieldValue,
    spells: FieldValue,
    other_requirements: FieldValue,
    source: FieldValue,
}

impl From<ItemRecord> for ItemDoc {
    fn from(r: ItemRecord) -> Self {
        ItemDoc {
            name: FieldValue::from_text(r.name),
            aura: FieldValue::from_text(r.aura),
            caster_level: FieldValue::from_text(r.caster_level),
            slot: FieldValue::from_text(r.slot),
            price: FieldValue::from_text(r.price),
            weight: FieldValue::from_text(r.weight),
            description: FieldValue::from_text(r.description),
            feat: FieldValue::from_text(r.crafting.feat),
            spells: r.crafting.spells,
            other_requirements: r.crafting.other_requirements,
            source: FieldValue::from_text(r.source),
        }
    }
}

impl From<ItemDoc> for FieldMap {
    fn from(d: ItemDoc) -> Self {
        let values = vec![
            d.name,
            d.aura,
            d.caster_level,
            d.slot,
            d.price,
            d.weight,
            d.description,
            d.feat,
            d.spells,
            d.other_requirements,
            d.source,
        ];
        ItemRecord::FIELDS.iter().copied().zip(values).collect()
    }
}

impl TryFrom<ItemDoc> for ItemRecord {
    type Error = ValidationReport;

    fn try_from(doc: ItemDoc) -> Result<Self, ValidationReport> {
        ItemRecord::assemble(&FieldMap::from(doc))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Record {
    Spell(SpellRecord),
    Item(ItemRecord),
}

impl Record {
    /// Pretty-printed JSON with a trailing newline.
    pub fn to_json(&self) -> Result<String, Error> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    /// Parses and re-validates a record written by [`Record::to_json`].
    pub fn from_json(kind: RecordKind, json: &str) -> Result<Record, Error> {
        Ok(match kind {
            RecordKind::Spell => {
                let doc: SpellDoc = serde_json::from_str(json)?;
                Record::Spell(SpellRecord::try_from(doc)?)
            }
            RecordKind::Item => {
                let doc: ItemDoc = serde_json::from_str(json)?;
                Record::Item(ItemRecord::try_from(doc)?)
            }
        })
    }
}

impl From<SpellRecord> for Record {
    fn from(r: SpellRecord) -> Self {
        Record::Spell(r)
    }
}

impl From<ItemRecord> for Record {
    fn from(r: ItemRecord) -> Self {
        Record::Item(r)
    }
}

/// Validates `fields` as a record of `kind`, reporting every problem at once.
pub fn assemble(fields: &FieldMap, kind: RecordKind) -> Result<Record, ValidationReport> {
    assemble_with(fields, kind, &mut Diagnostics::new())
}

pub fn assemble_with(
    fields: &FieldMap,
    kind: RecordKind,
    diagnostics: &mut Diagnostics,
) -> Result<Record, ValidationReport> {
    Ok(match kind {
        RecordKind::Spell => SpellRecord::assemble(fields, diagnostics)?.into(),
        RecordKind::Item => ItemRecord::assemble(fields)?.into(),
    })
}
