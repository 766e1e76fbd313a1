//! Three-state field values and the variant groups built from them.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

use crate::diagnostics::Diagnostics;
use crate::error::Problem;
use crate::locate::Located;

pub const AREA_TARGET_EFFECT: &str = "area/target/effect";
pub const CRAFTING: &str = "crafting";

/// A field value that keeps "omitted" apart from "present but empty".
///
/// Serialized as `null`, `""` and the text respectively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Present(String),
    Blank,
    Absent,
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Absent
    }
}

impl FieldValue {
    /// `Blank` for empty or whitespace-only text.
    pub fn from_text<S: Into<String>>(text: S) -> Self {
        let text = text.into();
        if text.trim().is_empty() {
            FieldValue::Blank
        } else {
            FieldValue::Present(text)
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Present(s) => Some(s),
            FieldValue::Blank => Some(""),
            FieldValue::Absent => None,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, FieldValue::Present(_))
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, FieldValue::Absent)
    }

    pub fn map_present<F: FnOnce(&str) -> String>(self, f: F) -> Self {
        match self {
            FieldValue::Present(s) => FieldValue::from_text(f(&s)),
            other => other,
        }
    }
}

impl From<Located> for FieldValue {
    fn from(located: Located) -> Self {
        match located {
            Located::Found { text, .. } => FieldValue::from_text(text),
            Located::Blank { .. } => FieldValue::Blank,
            Located::Absent => FieldValue::Absent,
        }
    }
}

impl From<Option<String>> for FieldValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(FieldValue::Absent, FieldValue::from_text)
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Present(s) => serializer.serialize_str(s),
            FieldValue::Blank => serializer.serialize_str(""),
            FieldValue::Absent => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FieldValueVisitor;

        impl<'de> Visitor<'de> for FieldValueVisitor {
            type Value = FieldValue;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string or null")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<FieldValue, E> {
                Ok(FieldValue::from_text(v))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<FieldValue, E> {
                Ok(FieldValue::from_text(v))
            }

            fn visit_none<E: de::Error>(self) -> Result<FieldValue, E> {
                Ok(FieldValue::Absent)
            }

            fn visit_unit<E: de::Error>(self) -> Result<FieldValue, E> {
                Ok(FieldValue::Absent)
            }

            fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<FieldValue, D::Error> {
                d.deserialize_str(self)
            }
        }

        deserializer.deserialize_option(FieldValueVisitor)
    }
}

/// Field name to value. Names that were never inserted read as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap(BTreeMap<&'static str, FieldValue>);

impl FieldMap {
    pub fn insert(&mut self, field: &'static str, value: FieldValue) {
        self.0.insert(field, value);
    }

    pub fn get(&self, field: &str) -> &FieldValue {
        static ABSENT: FieldValue = FieldValue::Absent;
        self.0.get(field).unwrap_or(&ABSENT)
    }

    pub fn get_mut(&mut self, field: &str) -> Option<&mut FieldValue> {
        self.0.get_mut(field)
    }
}

impl std::iter::FromIterator<(&'static str, FieldValue)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (&'static str, FieldValue)>>(iter: I) -> Self {
        FieldMap(iter.into_iter().collect())
    }
}

/// Members of a group that were located at all, blank ones included.
fn found(fields: &FieldMap, members: &[&'static str]) -> Vec<&'static str> {
    members
        .iter()
        .copied()
        .filter(|m| !fields.get(m).is_absent())
        .collect()
}

/// The one populated member of the area/target/effect group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AreaTargetEffect {
    Area(String),
    Target(String),
    Effect(String),
}

impl AreaTargetEffect {
    /// In order of precedence.
    pub const MEMBERS: [&'static str; 3] = ["area", "target", "effect"];

    /// Keeps the highest-precedence populated member. The others are recorded
    /// in `diagnostics` as discarded.
    pub fn resolve(fields: &FieldMap, diagnostics: &mut Diagnostics) -> Result<Self, Problem> {
        let winner = Self::MEMBERS
            .iter()
            .copied()
            .find(|m| fields.get(m).is_present());
        let winner = match winner {
            Some(winner) => winner,
            None => {
                return Err(Problem::VariantGroupViolation {
                    group: AREA_TARGET_EFFECT,
                    found: found(fields, &Self::MEMBERS),
                })
            }
        };
        for member in found(fields, &Self::MEMBERS) {
            if member != winner {
                diagnostics.discarded(AREA_TARGET_EFFECT, member);
            }
        }

        let text = fields.get(winner).as_str().unwrap_or_default().to_owned();
        Ok(match winner {
            "area" => AreaTargetEffect::Area(text),
            "target" => AreaTargetEffect::Target(text),
            _ => AreaTargetEffect::Effect(text),
        })
    }

    pub fn field(&self) -> &'static str {
        match self {
            AreaTargetEffect::Area(_) => "area",
            AreaTargetEffect::Target(_) => "target",
            AreaTargetEffect::Effect(_) => "effect",
        }
    }

    pub fn text(&self) -> &str {
        match self {
            AreaTargetEffect::Area(s) | AreaTargetEffect::Target(s) | AreaTargetEffect::Effect(s) => s,
        }
    }

    pub fn area(&self) -> Option<&str> {
        match self {
            AreaTargetEffect::Area(s) => Some(s),
            _ => None,
        }
    }

    pub fn target(&self) -> Option<&str> {
        match self {
            AreaTargetEffect::Target(s) => Some(s),
            _ => None,
        }
    }

    pub fn effect(&self) -> Option<&str> {
        match self {
            AreaTargetEffect::Effect(s) => Some(s),
            _ => None,
        }
    }
}

/// Crafting requirements of an item. The feat is mandatory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crafting {
    pub feat: String,
    pub spells: FieldValue,
    pub other_requirements: FieldValue,
}

impl Crafting {
    pub const MEMBERS: [&'static str; 3] = ["feat", "spells", "other_requirements"];

    pub fn resolve(fields: &FieldMap) -> Result<Self, Problem> {
        match fields.get("feat") {
            FieldValue::Present(feat) => Ok(Crafting {
                feat: feat.clone(),
                spells: fields.get("spells").clone(),
                other_requirements: fields.get("other_requirements").clone(),
            }),
            _ => Err(Problem::VariantGroupViolation {
                group: CRAFTING,
                found: found(fields, &Self::MEMBERS),
            }),
        }
    }
}
