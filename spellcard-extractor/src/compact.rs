//! Card-space abbreviations, applied only on request.
//!
//! Every function here takes and returns normalized text and never
//! introduces characters that would need escaping.

use lazy_static::lazy_static;
use regex::Regex;

use crate::resolve::FieldMap;

/// Book titles and class names with their card abbreviations.
const ABBREVIATIONS: &[(&str, &str)] = &[
    ("PRPG Core Rulebook", "PF Core"),
    ("Core Rulebook", "PF Core"),
    ("Ultimate Equipment", "PF Ult Equip"),
    ("Ultimate Magic", "PF Ult Magic"),
    ("Ultimate Combat", "PF Ult Combat"),
    ("Advanced Player's Guide", "PF Adv Play"),
    ("Advanced Class Guide", "PF Adv Class"),
    ("Pathfinder Society Field Guide", "PFSoc Field Guide"),
    ("Pathfinder Society Primer", "PFSoc Primer"),
    ("Cheliax, Empire of Devils", "PFC Cheliax"),
    ("Champions of Purity", "PFPC Champions of Purity"),
    ("Advanced Class Origins", "PFPC Adv Class Origins"),
    ("Magic Tactics Toolbox", "PFPC Magic Tactics Toolbox"),
    ("Monster Codex", "PF Monster Codex"),
    ("Adventurer's Guide", "PF Adventurer Guide"),
    ("adept", "ade"),
    ("alchemist", "alc"),
    ("antipaladin", "apal"),
    ("arcanist", "arc"),
    ("bard", "bar"),
    ("bloodrager", "brag"),
    ("cleric", "cle"),
    ("druid", "dru"),
    ("hunter", "hun"),
    ("inquisitor", "inq"),
    ("investigator", "inv"),
    ("magus", "mag"),
    ("medium", "med"),
    ("mesmerist", "mes"),
    ("occultist", "occ"),
    ("oracle", "ora"),
    ("paladin", "pal"),
    ("psychic", "psy"),
    ("ranger", "ran"),
    ("redmantisassassin", "rma"),
    ("shaman", "sha"),
    ("skald", "ska"),
    ("sorcerer", "sor"),
    ("spiritualist", "spi"),
    ("summoner", "sum"),
    ("summoner (unchained)", "sumU"),
    ("warpriest", "war"),
    ("witch", "wit"),
    ("wizard", "wiz"),
];

lazy_static! {
    static ref COMPONENT_SEPARATOR: Regex = Regex::new(r"([VSMF)]), ").unwrap();
    static ref COMPONENT_PAREN: Regex = Regex::new(r"([MF]) \(").unwrap();
    static ref GOLD: Regex = Regex::new(r" gp\b").unwrap();
    static ref POUNDS: Regex = Regex::new(r" lbs?\.").unwrap();
    static ref FEET: Regex = Regex::new(r"[ -]ft\b\.?").unwrap();
    static ref LEVELS: Regex = Regex::new(r"levels?").unwrap();
    static ref MINUTES: Regex = Regex::new(r"minutes?|min\.").unwrap();
    static ref CLASS_LEVEL: Regex = Regex::new(r"^(.+?)\s+(\d+)$").unwrap();
    static ref DIGITS: Regex = Regex::new(r"\d+").unwrap();
}

/// The card abbreviation of a book title or class name, or `name` itself.
pub fn abbreviate(name: &str) -> &str {
    match ABBREVIATIONS.iter().find(|(long, _)| *long == name) {
        Some((_, short)) => *short,
        None => {
            tracing::debug!(name, "no abbreviation");
            name
        }
    }
}

pub fn source(source: &str) -> String {
    if source.contains("PRPG Core Rulebook") {
        return "PF Core".to_owned();
    }
    abbreviate(source).to_owned()
}

/// Summarizes a class level list such as `cleric 3, druid 3, sorcerer/wizard 4`
/// as the majority level followed by the exceptions: `3 (sor/wiz 4)`.
///
/// Lists that do not parse are returned unchanged.
pub fn level(levels: &str) -> String {
    let mut classes: Vec<(&str, u32)> = Vec::new();
    for entry in levels.split(',') {
        let caps = match CLASS_LEVEL.captures(entry.trim()) {
            Some(caps) => caps,
            None => return levels.to_owned(),
        };
        let level = match caps[2].parse() {
            Ok(level) => level,
            Err(_) => return levels.to_owned(),
        };
        let class = caps.get(1).map_or("", |m| m.as_str());
        classes.push((class, level));
    }

    // level, count; in order of first appearance
    let mut counts: Vec<(u32, usize)> = Vec::new();
    for (_, level) in &classes {
        match counts.iter_mut().find(|(l, _)| l == level) {
            Some((_, count)) => *count += 1,
            None => counts.push((*level, 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    if counts.len() == 1 {
        return counts[0].0.to_string();
    }
    let total: usize = counts.iter().map(|(_, c)| c).sum();
    let main = if counts[0].1 * 2 >= total && counts[0].1 > counts[1].1 {
        Some(counts.remove(0).0)
    } else {
        None
    };

    let exceptions = counts
        .iter()
        .map(|(level, _)| {
            let mut names: Vec<String> = classes
                .iter()
                .filter(|(_, l)| l == level)
                .map(|(class, _)| abbreviate_class(class))
                .collect();
            names.sort();
            format!("{} {}", names.join("/"), level)
        })
        .collect::<Vec<_>>()
        .join(", ");

    match main {
        Some(main) => format!("{} ({})", main, exceptions),
        None => exceptions,
    }
}

fn abbreviate_class(class: &str) -> String {
    if let Some((_, short)) = ABBREVIATIONS.iter().find(|(long, _)| *long == class) {
        return (*short).to_owned();
    }
    class
        .split('/')
        .map(abbreviate)
        .collect::<Vec<_>>()
        .join("/")
}

pub fn components(components: &str) -> String {
    let s = COMPONENT_SEPARATOR.replace_all(components, "$1,");
    let s = COMPONENT_PAREN.replace_all(&s, "$1(");
    let s = GOLD.replace_all(&s, "gp");
    POUNDS.replace_all(&s, "lb").into_owned()
}

pub fn range(range: &str) -> String {
    for keyword in ["close", "medium", "long"].iter() {
        if range.starts_with(keyword) {
            return (*keyword).to_owned();
        }
    }
    FEET.replace_all(range, "ft").into_owned()
}

/// Area, target and effect lengths.
pub fn measure(text: &str) -> String {
    let s = LEVELS.replace_all(text, "lvl");
    let s = s.replace(" per ", "/");
    let s = FEET.replace_all(&s, "ft");
    POUNDS.replace_all(&s, "lb").into_owned()
}

pub fn duration(duration: &str) -> String {
    MINUTES.replace_all(&measure(duration), "min").into_owned()
}

pub fn save(save: &str) -> String {
    save.replace("Reflex", "Ref").replace("Fortitude", "Fort")
}

pub fn caster_level(cl: &str) -> String {
    DIGITS
        .find(cl)
        .map_or_else(|| cl.to_owned(), |m| m.as_str().to_owned())
}

fn apply(fields: &mut FieldMap, field: &str, f: fn(&str) -> String) {
    if let Some(value) = fields.get_mut(field) {
        let old = std::mem::take(value);
        *value = old.map_present(f);
    }
}

pub fn compact_spell(fields: &mut FieldMap) {
    apply(fields, "source", source);
    apply(fields, "level", level);
    apply(fields, "components", components);
    apply(fields, "range", range);
    for field in ["area", "target", "effect"].iter() {
        apply(fields, field, measure);
    }
    apply(fields, "duration", duration);
    apply(fields, "save", save);
}

pub fn compact_item(fields: &mut FieldMap) {
    apply(fields, "source", source);
    apply(fields, "caster_level", caster_level);
    apply(fields, "weight", |w| POUNDS.replace_all(w, "lb").into_owned());
}
