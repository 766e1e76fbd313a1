//! Non-fatal findings of one extraction run.

use std::collections::BTreeMap;

/// Unsupported inline markup that was flattened to its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizationWarning {
    pub field: &'static str,
    pub tag: String,
}

/// A variant group member that was found but lost to a higher-precedence one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discarded {
    pub group: &'static str,
    pub field: &'static str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// Field name to the name of the strategy that produced its value.
    pub provenance: BTreeMap<&'static str, &'static str>,
    pub warnings: Vec<NormalizationWarning>,
    pub discarded: Vec<Discarded>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flattened(&mut self, field: &'static str, tag: String) {
        tracing::warn!(field, tag = %tag, "flattened unsupported markup");
        self.warnings.push(NormalizationWarning { field, tag });
    }

    pub fn discarded(&mut self, group: &'static str, field: &'static str) {
        tracing::warn!(group, field, "discarded lower-precedence variant");
        self.discarded.push(Discarded { group, field });
    }

    /// How many elements were flattened to plain text.
    pub fn flattened_markup(&self) -> usize {
        self.warnings.len()
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty() && self.discarded.is_empty()
    }
}
