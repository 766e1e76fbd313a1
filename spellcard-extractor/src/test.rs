use pretty_assertions::assert_eq;
use proptest::prelude::*;
use scraper::Html;

use spellcard_extractor::diagnostics::{Discarded, NormalizationWarning};
use spellcard_extractor::fragment::Fragment;
use spellcard_extractor::locate::{locate, split_requirements, Located};
use spellcard_extractor::navigate::{entry_blocks, Navigator};
use spellcard_extractor::normalize::{escape, BREAK};
use spellcard_extractor::*;

const VAMPIRIC_TOUCH: &str = include_str!("testdata/vampiric_touch.html");
const BAG_OF_HOLDING: &str = include_str!("testdata/bag_of_holding.html");
const TWO_ENTRIES: &str = include_str!("testdata/two_entries.html");

const DRAIN_LIFE: &str = r#"
    <div>
        <h1>Drain Life</h1>
        <b>Source</b> Core Rulebook<br>
        <b>School</b> Necromancy; <b>Level</b> 3<br>
        <b>Time</b> 1 standard action<br>
        <b>Components</b> V, S, M<br>
        <b>Range</b> touch<br>
        <b>Target</b> one creature<br>
        <b>Duration</b> 1 round/level<br>
        <b>Save</b> Fortitude negates; <b>SR</b> yes
        <h3>Description</h3>
        You <b>drain</b> life.
    </div>
"#;

fn spell(fields: &[(&'static str, &str)]) -> FieldMap {
    let mut map: FieldMap = [
        ("name", "Drain Life"),
        ("school", "necromancy"),
        ("level", "3"),
        ("casting_time", "1 standard action"),
        ("components", "V, S, M"),
        ("range", "touch"),
        ("duration", "1 round/level"),
        ("save", "Fortitude negates"),
        ("spell_resistance", "yes"),
        ("description", r"You \textbf{drain} life."),
        ("source", "Core Rulebook"),
    ]
    .iter()
    .map(|(k, v)| (*k, FieldValue::from_text(*v)))
    .collect();
    for (k, v) in fields {
        map.insert(k, FieldValue::from_text(*v));
    }
    map
}

#[test]
fn end_to_end_spell() {
    let extraction: Extraction<SpellRecord> = extract_with(
        Html::parse_document(DRAIN_LIFE).root_element(),
        &ExtractOptions::default(),
    )
    .unwrap();
    let spell = extraction.record;

    assert_eq!(
        spell,
        SpellRecord {
            name: "Drain Life".to_owned(),
            school: "Necromancy".to_owned(),
            level: "3".to_owned(),
            casting_time: "1 standard action".to_owned(),
            components: "V, S, M".to_owned(),
            range: "touch".to_owned(),
            area_target_effect: AreaTargetEffect::Target("one creature".to_owned()),
            duration: "1 round/level".to_owned(),
            save: "Fortitude negates".to_owned(),
            spell_resistance: "yes".to_owned(),
            description: r"You \textbf{drain} life.".to_owned(),
            source: "Core Rulebook".to_owned(),
        }
    );

    let provenance = &extraction.diagnostics.provenance;
    assert_eq!(provenance["casting_time"], r#"text after "Time""#);
    assert_eq!(provenance["save"], r#"text after "Save""#);
    assert_eq!(provenance["spell_resistance"], r#"text after "SR""#);
    assert_eq!(provenance["name"], "heading h1");
    assert!(!provenance.contains_key("area"));

    let json: serde_json::Value =
        serde_json::from_str(&Record::from(spell).to_json().unwrap()).unwrap();
    assert_eq!(json["target"], "one creature");
    assert_eq!(json["area"], serde_json::Value::Null);
    assert_eq!(json["effect"], serde_json::Value::Null);
    assert_eq!(json["description"], r"You \textbf{drain} life.");
}

#[test]
fn spell_page() {
    let extraction: Extraction<SpellRecord> = extract_with(
        Html::parse_document(VAMPIRIC_TOUCH).root_element(),
        &ExtractOptions::default(),
    )
    .unwrap();

    assert_eq!(
        extraction.record,
        SpellRecord {
            name: "Vampiric Touch".to_owned(),
            school: "necromancy".to_owned(),
            level: "magus 3, sorcerer/wizard 3, witch 3".to_owned(),
            casting_time: "1 standard action".to_owned(),
            components: "V, S".to_owned(),
            range: "touch".to_owned(),
            area_target_effect: AreaTargetEffect::Target("living creature touched".to_owned()),
            duration: "instantaneous/1 hour; see text".to_owned(),
            save: "none".to_owned(),
            spell_resistance: "yes".to_owned(),
            description: concat!(
                "You must succeed on a melee touch attack. Your touch deals 1d6 points of ",
                "damage per two caster levels (maximum 10d6). You gain temporary hit points ",
                "equal to the damage you deal.\\\\However, you can't gain more than the ",
                "subject's current hit points +10, which is enough to kill the subject. ",
                "The temporary hit points disappear 1 hour later."
            )
            .to_owned(),
            source: "PRPG Core Rulebook".to_owned(),
        }
    );
    assert!(extraction.diagnostics.is_clean());
}

#[test]
fn compact_spell_page() {
    let extraction: Extraction<SpellRecord> = extract_with(
        Html::parse_document(VAMPIRIC_TOUCH).root_element(),
        &ExtractOptions { compact: true },
    )
    .unwrap();
    let spell = extraction.record;

    assert_eq!(spell.source, "PF Core");
    assert_eq!(spell.level, "3");
    assert_eq!(spell.components, "V,S");
    assert_eq!(spell.save, "none");
    assert_eq!(spell.name, "Vampiric Touch");
    assert!(spell.description.starts_with("You must succeed"));
}

#[test]
fn item_page() {
    let extraction: Extraction<ItemRecord> = extract_with(
        Html::parse_document(BAG_OF_HOLDING).root_element(),
        &ExtractOptions::default(),
    )
    .unwrap();

    assert_eq!(
        extraction.record,
        ItemRecord {
            name: "Bag of Holding".to_owned(),
            aura: "moderate conjuration".to_owned(),
            caster_level: "9th".to_owned(),
            slot: "none".to_owned(),
            price: "2,500 gp (type I), 5,000 gp (type II)".to_owned(),
            weight: "15 lbs.".to_owned(),
            description: concat!(
                "This appears to be a common cloth sack about 2 feet by 4 feet in size. ",
                "The bag of holding opens into a nondimensional space: its inside is larger ",
                "than its outside dimensions.\\\\Bag; Bag Weight; Contents Limit\\\\",
                "Type I; 15 lbs.; 250 lbs.\\\\If a bag of holding is overloaded, or if sharp ",
                "objects pierce it, the bag immediately ruptures \\& is ruined."
            )
            .to_owned(),
            crafting: Crafting {
                feat: "Craft Wondrous Item".to_owned(),
                spells: FieldValue::Present("secret chest".to_owned()),
                other_requirements: FieldValue::Absent,
            },
            source: "Core Rulebook".to_owned(),
        }
    );

    let json: serde_json::Value =
        serde_json::from_str(&Record::from(extraction.record).to_json().unwrap()).unwrap();
    assert_eq!(json["spells"], "secret chest");
    assert_eq!(json["other_requirements"], serde_json::Value::Null);
}

#[test]
fn compact_item_page() {
    let item: Extraction<ItemRecord> = extract_with(
        Html::parse_document(BAG_OF_HOLDING).root_element(),
        &ExtractOptions { compact: true },
    )
    .unwrap();

    assert_eq!(item.record.source, "PF Core");
    assert_eq!(item.record.caster_level, "9");
    assert_eq!(item.record.weight, "15lb");
    assert_eq!(item.record.crafting.feat, "Craft Wondrous Item");
}

#[test]
fn item_without_bold_labels() {
    let html = r#"
        <div>
            <h1>Pearl of Power</h1>
            <p>Source Core Rulebook pg. 531 Aura strong transmutation CL 17th</p>
            <b>Slot</b> none; <b>Price</b> 1,000 gp; <b>Weight</b> &mdash;
            <h3>Description</h3>
            This seemingly normal pearl lets a spellcaster recall a spell.
            <h3>Construction</h3>
            <b>Requirements</b> Craft Wondrous Item, creator must be able to cast spells of the spell's level; <b>Cost</b> 500 gp
        </div>
    "#;
    let item = ItemRecord::extract_from_str(html);
    let report = match item {
        Err(Error::Validation(report)) => report,
        other => panic!("unexpected result: {:?}", other),
    };
    // CL has no bold label on this page
    assert_eq!(
        report.problems,
        vec![Problem::FieldMissing {
            field: "caster_level"
        }]
    );

    let mut diagnostics = Diagnostics::new();
    let fields = extract::locate_fields::<ItemRecord>(
        Html::parse_document(html).root_element(),
        &ExtractOptions::default(),
        &mut diagnostics,
    )
    .unwrap();
    assert_eq!(
        fields.get("source"),
        &FieldValue::Present("Core Rulebook".to_owned())
    );
    assert_eq!(
        fields.get("aura"),
        &FieldValue::Present("strong transmutation".to_owned())
    );
    assert_eq!(fields.get("weight"), &FieldValue::Present("---".to_owned()));
    assert_eq!(
        fields.get("feat"),
        &FieldValue::Present("Craft Wondrous Item".to_owned())
    );
    assert_eq!(fields.get("spells"), &FieldValue::Absent);
    assert_eq!(
        fields.get("other_requirements"),
        &FieldValue::Present("creator must be able to cast spells of the spell's level".to_owned())
    );
    assert_eq!(
        diagnostics.provenance["aura"],
        r#"text between "Aura" and "CL""#
    );
}

#[test]
fn ambiguous_page() {
    match SpellRecord::extract_from_str(TWO_ENTRIES) {
        Err(Error::AmbiguousDocument { entries }) => assert_eq!(entries, 2),
        other => panic!("unexpected result: {:?}", other),
    }
    match extract_record(TWO_ENTRIES, RecordKind::Item, &ExtractOptions::default()) {
        Err(Error::AmbiguousDocument { entries }) => assert_eq!(entries, 2),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn empty_headings_are_not_entries() {
    let html = r#"
        <div><h1> </h1></div>
        <div><h1>Shield</h1><b>School</b> abjuration</div>
    "#;
    let document = Html::parse_document(html);
    let blocks = entry_blocks(document.root_element());
    assert_eq!(blocks.len(), 1);
    assert!(blocks[0].text().any(|t| t == "Shield"));
}

#[test]
fn missing_fields_are_reported_together() {
    let html = DRAIN_LIFE
        .replace("<b>School</b> Necromancy; ", "")
        .replace("<b>Range</b> touch<br>", "");
    let report = match SpellRecord::extract_from_str(&html) {
        Err(Error::Validation(report)) => report,
        other => panic!("unexpected result: {:?}", other),
    };

    assert_eq!(report.kind, RecordKind::Spell);
    assert_eq!(
        report.problems,
        vec![
            Problem::FieldMissing { field: "school" },
            Problem::FieldMissing { field: "range" },
        ]
    );
    let message = report.to_string();
    assert!(message.contains("`school`"));
    assert!(message.contains("`range`"));
}

#[test]
fn every_problem_in_one_report() {
    let mut fields = spell(&[("school", "")]);
    fields.insert("range", FieldValue::Absent);
    fields.insert("description", FieldValue::from_text("100%"));

    let report = assemble(&fields, RecordKind::Spell).unwrap_err();
    assert_eq!(
        report.problems,
        vec![
            Problem::FieldBlank { field: "school" },
            Problem::FieldMissing { field: "range" },
            Problem::VariantGroupViolation {
                group: "area/target/effect",
                found: vec![],
            },
            Problem::Unescaped {
                field: "description"
            },
        ]
    );
    assert!(report.names_field("school"));
    assert!(report.names_field("range"));
    assert!(!report.names_field("name"));
}

#[test]
fn variant_precedence() {
    let mut diagnostics = Diagnostics::new();
    let both = spell(&[("area", "A"), ("target", "T")]);
    let resolved = AreaTargetEffect::resolve(&both, &mut diagnostics).unwrap();
    assert_eq!(resolved, AreaTargetEffect::Area("A".to_owned()));
    assert_eq!(
        diagnostics.discarded,
        vec![Discarded {
            group: "area/target/effect",
            field: "target"
        }]
    );

    let target = spell(&[("target", "T")]);
    match assemble(&target, RecordKind::Spell).unwrap() {
        Record::Spell(spell) => {
            assert_eq!(spell.area_target_effect, AreaTargetEffect::Target("T".to_owned()));
            assert_eq!(spell.area_target_effect.text(), "T");
        }
        other => panic!("unexpected record: {:?}", other),
    }

    let all = spell(&[("area", "A"), ("target", "T"), ("effect", "E")]);
    let mut diagnostics = Diagnostics::new();
    let record = SpellRecord::assemble(&all, &mut diagnostics).unwrap();
    assert_eq!(record.area_target_effect.field(), "area");
    assert_eq!(diagnostics.discarded.len(), 2);

    let none = spell(&[("target", "")]);
    let report = assemble(&none, RecordKind::Spell).unwrap_err();
    assert_eq!(
        report.problems,
        vec![Problem::VariantGroupViolation {
            group: "area/target/effect",
            found: vec!["target"],
        }]
    );
}

#[test]
fn crafting_group() {
    let item = |feat: FieldValue, spells: FieldValue| -> FieldMap {
        let mut fields: FieldMap = [
            ("name", "Ring of Feather Falling"),
            ("aura", "faint transmutation"),
            ("caster_level", "1st"),
            ("slot", "ring"),
            ("price", "2,200 gp"),
            ("weight", "---"),
            ("description", "This ring is crafted with a feather pattern."),
            ("source", "Core Rulebook"),
        ]
        .iter()
        .map(|(k, v)| (*k, FieldValue::from_text(*v)))
        .collect();
        fields.insert("feat", feat);
        fields.insert("spells", spells);
        fields.insert("other_requirements", FieldValue::Blank);
        fields
    };

    let ok = item(
        FieldValue::from_text("Forge Ring"),
        FieldValue::from_text(r"\textit{feather fall}"),
    );
    match assemble(&ok, RecordKind::Item).unwrap() {
        Record::Item(ring) => {
            assert_eq!(ring.crafting.feat, "Forge Ring");
            assert_eq!(ring.crafting.other_requirements, FieldValue::Blank);
        }
        other => panic!("unexpected record: {:?}", other),
    }

    let missing = item(FieldValue::Absent, FieldValue::from_text("feather fall"));
    assert_eq!(
        assemble(&missing, RecordKind::Item).unwrap_err().problems,
        vec![Problem::VariantGroupViolation {
            group: "crafting",
            found: vec!["spells", "other_requirements"],
        }]
    );
}

#[test]
fn blank_and_absent_are_serialized_apart() {
    let record = ItemRecord {
        name: "Ring of Feather Falling".to_owned(),
        aura: "faint transmutation".to_owned(),
        caster_level: "1st".to_owned(),
        slot: "ring".to_owned(),
        price: "2,200 gp".to_owned(),
        weight: "---".to_owned(),
        description: "This ring is crafted with a feather pattern.".to_owned(),
        crafting: Crafting {
            feat: "Forge Ring".to_owned(),
            spells: FieldValue::Absent,
            other_requirements: FieldValue::Blank,
        },
        source: "Core Rulebook".to_owned(),
    };
    let json = Record::from(record.clone()).to_json().unwrap();
    assert!(json.contains(r#""spells": null"#));
    assert!(json.contains(r#""other_requirements": """#));

    match Record::from_json(RecordKind::Item, &json).unwrap() {
        Record::Item(parsed) => assert_eq!(parsed, record),
        other => panic!("unexpected record: {:?}", other),
    }
}

#[test]
fn spell_json_round_trip() {
    let record = SpellRecord {
        name: "Fireball".to_owned(),
        school: "evocation [fire]".to_owned(),
        level: "sorcerer/wizard 3".to_owned(),
        casting_time: "1 standard action".to_owned(),
        components: "V, S, M (a ball of bat guano and sulfur)".to_owned(),
        range: "long (400 ft. + 40 ft./level)".to_owned(),
        area_target_effect: AreaTargetEffect::Area("20-ft.-radius spread".to_owned()),
        duration: "instantaneous".to_owned(),
        save: "Reflex half".to_owned(),
        spell_resistance: "yes".to_owned(),
        description: r"A \textit{fireball} spell generates a searing explosion.\\It deals 1d6 points of fire damage per caster level.".to_owned(),
        source: "PRPG Core Rulebook".to_owned(),
    };

    let json = Record::from(record.clone()).to_json().unwrap();
    assert!(json.starts_with("{\n  \"name\": \"Fireball\",\n  \"school\""));
    let parsed = Record::from_json(RecordKind::Spell, &json).unwrap();
    assert_eq!(parsed, Record::Spell(record.clone()));

    let parsed_fields = match parsed {
        Record::Spell(spell) => spell.fields(),
        other => panic!("unexpected record: {:?}", other),
    };
    assert_eq!(parsed_fields, record.fields());
    assert_eq!(parsed_fields.get("target"), &FieldValue::Absent);
}

#[test]
fn malformed_json_records() {
    let incomplete = r#"{ "name": "Fireball", "area": "20-ft.-radius spread" }"#;
    match Record::from_json(RecordKind::Spell, incomplete) {
        Err(Error::Validation(report)) => {
            assert!(report.names_field("school"));
            assert!(report.names_field("source"));
        }
        other => panic!("unexpected result: {:?}", other),
    }

    let unknown = r#"{ "name": "Fireball", "url": "https://aonprd.com/" }"#;
    assert!(matches!(
        Record::from_json(RecordKind::Spell, unknown),
        Err(Error::Json(_))
    ));
}

#[test]
fn escaping() {
    let cases = [
        (r"50% & $5 #1 a_b", r"50\% \& \$5 \#1 a\_b"),
        (r"{x}", r"\{x\}"),
        (r"a\b", r"a\textbackslash{}b"),
        (r"C:\", r"C:\textbackslash{}"),
        ("~^", r"\textasciitilde{}\textasciicircum{}"),
        (r"\textbf{x}", r"\textbf{x}"),
        (r"\foo", r"\textbackslash{}foo"),
        (r"\textbf{open", r"\textbf{open}"),
        ("\u{201c}quoted\u{201d} \u{2013} \u{2014}", "``quoted'' -- ---"),
        ("  spaced \t out \n ", "spaced out"),
    ];
    for (raw, escaped) in cases.iter() {
        assert_eq!(normalize(raw, Context::Inline), *escaped, "input: {:?}", raw);
    }
}

#[test]
fn stray_braces_and_commands() {
    let description = r"Use {braces} and \commands, 100% of the time; } stray";
    let normalized = normalize(description, Context::Block);
    assert_eq!(
        normalized,
        r"Use \{braces\} and \textbackslash{}commands, 100\% of the time; \} stray"
    );

    let scanned = normalized.replace(r"\textbackslash{}", "");
    let chars: Vec<char> = scanned.chars().collect();
    for (i, c) in chars.iter().enumerate() {
        match c {
            '{' | '}' => assert!(i > 0 && chars[i - 1] == '\\', "bare {:?} in {:?}", c, normalized),
            '\\' => assert!(
                matches!(chars.get(i + 1), Some('{') | Some('}') | Some('%')),
                "bare backslash in {:?}",
                normalized
            ),
            _ => {}
        }
    }
}

#[test]
fn breaks() {
    assert_eq!(normalize("one\n\ntwo", Context::Block), "one two");
    assert_eq!(normalize(r"one\\two", Context::Inline), "one two");
    assert_eq!(normalize(r"one \\ \\ two", Context::Block), r"one\\two");
    assert_eq!(normalize(r"\\ one \\", Context::Block), "one");
    assert_eq!(normalize("one\ntwo", Context::Block), "one two");
}

#[test]
fn page_text_is_escaped_literally() {
    assert_eq!(
        escape(r"type \textbf{x} and \\ here"),
        r"type \textbackslash{}textbf\{x\} and \textbackslash{}\textbackslash{} here"
    );
    assert_eq!(escape("\n 50% ~ \u{2013}\t"), r" 50\% \textasciitilde{} -- ");

    let document = Html::parse_document(r#"<div><h3>Description</h3>Path C:\<i>dir</i> end</div>"#);
    let nav = Navigator::new(document.root_element(), Vec::<&str>::new());
    let heading = nav.find_label("Description").unwrap();
    let rendered = nav.section_after(heading).render(&mut Vec::new());
    assert_eq!(
        normalize(&rendered, Context::Block),
        r"Path C:\textbackslash{}\textit{dir} end"
    );
}

#[test]
fn tex_in_page_text_is_not_markup() {
    let html = DRAIN_LIFE.replace(
        "You <b>drain</b> life.",
        r"Type \textbf{x} and \\ here, <i>then \\</i> stop.",
    );
    let spell = SpellRecord::extract_from_str(&html).unwrap();
    assert_eq!(
        spell.description,
        r"Type \textbackslash{}textbf\{x\} and \textbackslash{}\textbackslash{} here, \textit{then \textbackslash{}\textbackslash{}} stop."
    );
    assert!(!spell.description.contains(BREAK));
}

#[test]
fn source_line_breaks_are_spaces() {
    let html = DRAIN_LIFE.replace(
        "You <b>drain</b> life.",
        "First sentence.\n\n      Second sentence.<br>Third.",
    );
    let spell = SpellRecord::extract_from_str(&html).unwrap();
    assert_eq!(
        spell.description,
        r"First sentence. Second sentence.\\Third."
    );
}

#[test]
fn flattened_markup_in_plain_fields() {
    let html = DRAIN_LIFE.replace("<h1>Drain Life</h1>", "<h1>Drain Life<sup>M</sup></h1>");
    let extraction: Extraction<SpellRecord> = extract_with(
        Html::parse_document(&html).root_element(),
        &ExtractOptions::default(),
    )
    .unwrap();

    assert_eq!(extraction.record.name, "Drain LifeM");
    assert_eq!(
        extraction.diagnostics.warnings,
        vec![NormalizationWarning {
            field: "name",
            tag: "sup".to_owned()
        }]
    );
}

#[test]
fn dropped_markup_is_reported() {
    let html = DRAIN_LIFE.replace(
        "You <b>drain</b> life.",
        "You <b>drain</b> life.<script>var x = 1;</script>",
    );
    let extraction: Extraction<SpellRecord> = extract_with(
        Html::parse_document(&html).root_element(),
        &ExtractOptions::default(),
    )
    .unwrap();

    assert_eq!(extraction.record.description, r"You \textbf{drain} life.");
    assert_eq!(
        extraction.diagnostics.warnings,
        vec![NormalizationWarning {
            field: "description",
            tag: "script".to_owned()
        }]
    );
    assert_eq!(extraction.diagnostics.flattened_markup(), 1);
}

proptest! {
    #[test]
    fn escaped_text_survives_normalization(raw in "\\PC*") {
        let escaped = escape(&raw);
        let normalized = normalize(&escaped, Context::Block);
        prop_assert_eq!(normalized.as_str(), escaped.trim());
        prop_assert!(!normalized.contains(BREAK));
    }

    #[test]
    fn normalize_is_idempotent(raw in "\\PC*") {
        for context in [Context::Inline, Context::Block].iter() {
            let once = normalize(&raw, *context);
            prop_assert_eq!(normalize(&once, *context), once.clone());
        }
    }

    #[test]
    fn normalize_is_idempotent_on_tex_like_input(raw in r"[a-z \\{}%&#$_~^\n]*") {
        let once = normalize(&raw, Context::Block);
        prop_assert_eq!(normalize(&once, Context::Block), once.clone());
    }
}

#[test]
fn emphasis_and_flattened_markup() {
    let html = r#"
        <div>
            <h3>Description</h3>
            The <i>target</i> takes <strong>2d6</strong> damage<sup>1</sup>.
            <b></b>
            <ul><li>first</li><li>second</li></ul>
        </div>
    "#;
    let document = Html::parse_document(html);
    let nav = Navigator::new(document.root_element(), Vec::<&str>::new());
    let heading = nav.find_label("description").unwrap();
    let mut flattened = Vec::new();
    let rendered = nav.section_after(heading).render(&mut flattened);

    assert_eq!(
        normalize(&rendered, Context::Block),
        r"The \textit{target} takes \textbf{2d6} damage1.\\first\\second"
    );
    assert_eq!(flattened, vec!["sup".to_owned()]);
}

#[test]
fn flattened_markup_is_a_warning() {
    let html = DRAIN_LIFE.replace("You <b>drain</b> life.", "You <u>drain</u> life.");
    let extraction: Extraction<SpellRecord> = extract_with(
        Html::parse_document(&html).root_element(),
        &ExtractOptions::default(),
    )
    .unwrap();

    assert_eq!(extraction.record.description, "You drain life.");
    assert_eq!(
        extraction.diagnostics.warnings,
        vec![NormalizationWarning {
            field: "description",
            tag: "u".to_owned()
        }]
    );
    assert_eq!(extraction.diagnostics.flattened_markup(), 1);
}

#[test]
fn navigator() {
    let html = r#"
        <div id="entry">
            <h1>Shield</h1>
            <strong> School: </strong> abjuration [force]; <b>Level</b> sorcerer/wizard 1<br>
            <b>Domain</b> protection 1
            <table><tr><td>Range</td><td>personal</td></tr></table>
        </div>
    "#;
    let document = Html::parse_document(html);
    let nav = Navigator::new(
        document.root_element(),
        vec!["School", "Level", "Domain", "Range"],
    );

    let school = nav.find_label("SCHOOL").unwrap();
    assert_eq!(school.value().name(), "strong");
    let mut flattened = Vec::new();
    assert_eq!(
        nav.text_after(school).render(&mut flattened).trim(),
        "abjuration [force];"
    );

    let level = nav.find_label("level").unwrap();
    assert_eq!(
        normalize(&nav.text_after(level).render(&mut flattened), Context::Inline),
        "sorcerer/wizard 1"
    );

    let range = nav.find_label("Range").unwrap();
    assert_eq!(range.value().name(), "td");
    assert_eq!(
        normalize(&nav.text_after(range).render(&mut flattened), Context::Inline),
        "personal"
    );

    assert_eq!(nav.block_for("Domain").unwrap().value().attr("id"), Some("entry"));
    assert!(nav.find_label("Components").is_none());
    assert!(nav.block_for("Components").is_none());
    assert_eq!(
        nav.text_between("Domain", "Range").as_deref(),
        Some(" protection 1 ")
    );
    assert!(flattened.is_empty());
}

field_table! {
    /// Exercises every strategy kind.
    TEST_FIELDS {
        title = (text of "#title" | heading "h2"),
        code = (text after "Code", capture with "^([A-Z]+)-"),
        notes = (section after "Notes"),
        fallback = (text after "Missing" | literal "n/a"),
        blank = (text after "Blank"),
        absent = (text after "Nowhere"),
    }
}

#[test]
fn field_table_strategies() {
    let html = r#"
        <div>
            <h2>Heading Title</h2>
            <b>Code</b> ABC-123; <b>Blank</b> ;
            <h4>Notes</h4>
            <p>First note.</p><p>Second &amp; last.</p>
        </div>
    "#;
    let document = Html::parse_document(html);
    let nav = Navigator::new(
        document.root_element(),
        locate::known_labels(TEST_FIELDS, &[]),
    );
    let mut diagnostics = Diagnostics::new();
    let located = locate(&nav, TEST_FIELDS, &mut diagnostics);

    assert_eq!(
        located,
        vec![
            (
                "title",
                Located::Found {
                    strategy: r#"heading h2"#,
                    text: "Heading Title".to_owned()
                }
            ),
            (
                "code",
                Located::Found {
                    strategy: r#"text after "Code""#,
                    text: "ABC".to_owned()
                }
            ),
            (
                "notes",
                Located::Found {
                    strategy: r#"section after "Notes""#,
                    text: r"First note.\\Second \& last.".to_owned()
                }
            ),
            (
                "fallback",
                Located::Found {
                    strategy: r#"literal "n/a""#,
                    text: "n/a".to_owned()
                }
            ),
            (
                "blank",
                Located::Blank {
                    strategy: r#"text after "Blank""#
                }
            ),
            ("absent", Located::Absent),
        ]
    );
    assert_eq!(TEST_FIELDS[0].strategies.len(), 2);
    assert_eq!(TEST_FIELDS[2].context, Context::Block);
    assert_eq!(TEST_FIELDS[0].context, Context::Inline);
}

#[test]
fn crafting_requirements() {
    let split = |html: &str| {
        let document = Html::parse_fragment(html);
        let nav = Navigator::new(document.root_element(), vec!["Requirements", "Cost"]);
        let label = nav.find_label("Requirements").unwrap();
        let (feat, spells, other) = split_requirements(&nav.text_after(label));
        (
            feat.plain_text().trim().to_owned(),
            spells.map(|s| s.plain_text()),
            other.plain_text().trim().to_owned(),
        )
    };

    assert_eq!(
        split("<b>Requirements</b> Craft Wondrous Item and <i>fly</i>, <i>levitate</i>; creator must be 5th level; <b>Cost</b> 1 gp"),
        (
            "Craft Wondrous Item and".to_owned(),
            Some("fly, levitate".to_owned()),
            "; creator must be 5th level;".to_owned()
        )
    );
    assert_eq!(
        split("<b>Requirements</b> Craft Magic Arms and Armor, Brew Potion, creator must be good"),
        (
            "Craft Magic Arms and Armor, Brew Potion".to_owned(),
            None,
            "creator must be good".to_owned()
        )
    );
}

#[test]
fn trailing_and_is_dropped_from_feat() {
    let html = r#"
        <div>
            <h1>Winged Boots</h1>
            <b>Requirements</b> Craft Wondrous Item and <i>fly</i>; <b>Cost</b> 8,000 gp
        </div>
    "#;
    let mut diagnostics = Diagnostics::new();
    let fields = extract::locate_fields::<ItemRecord>(
        Html::parse_document(html).root_element(),
        &ExtractOptions::default(),
        &mut diagnostics,
    )
    .unwrap();
    assert_eq!(
        fields.get("feat"),
        &FieldValue::Present("Craft Wondrous Item".to_owned())
    );
    assert_eq!(fields.get("spells"), &FieldValue::Present("fly".to_owned()));
    assert_eq!(fields.get("other_requirements"), &FieldValue::Absent);
}

#[test]
fn fragments() {
    let mut fragment = Fragment::text("a");
    fragment.push_text("b");
    fragment.push_break();
    fragment.push_text("c");
    assert_eq!(fragment.segments().len(), 3);
    assert_eq!(fragment.plain_text(), "ab c");
    assert!(fragment.split_italics().is_none());
    assert!(Fragment::new().is_empty());
}

#[test]
fn compaction() {
    assert_eq!(compact::level("cleric 3, druid 3, sorcerer/wizard 4"), "3 (sor/wiz 4)");
    assert_eq!(compact::level("bard 2, cleric 3"), "bar 2, cle 3");
    assert_eq!(compact::level("see text"), "see text");
    assert_eq!(
        compact::components("V, S, M (a drop of blood, 25 gp)"),
        "V,S,M(a drop of blood, 25gp)"
    );
    assert_eq!(compact::range("medium (100 ft. + 10 ft./level)"), "medium");
    assert_eq!(compact::range("30 ft."), "30ft");
    assert_eq!(compact::measure("one creature per level"), "one creature/lvl");
    assert_eq!(compact::measure("20-ft.-radius spread"), "20ft-radius spread");
    assert_eq!(compact::duration("10 minutes/level"), "10 min/lvl");
    assert_eq!(compact::save("Fortitude negates, Reflex half"), "Fort negates, Ref half");
    assert_eq!(compact::caster_level("17th"), "17");
    assert_eq!(compact::source("Ultimate Magic"), "PF Ult Magic");
    assert_eq!(compact::source("Some Homebrew"), "Some Homebrew");
}

#[test]
fn config() {
    let config = Config::from_yaml("timeout_secs: 5\ncompact: true\n").unwrap();
    assert_eq!(config.timeout_secs, 5);
    assert!(config.compact);
    assert_eq!(config.max_retries, Config::default().max_retries);
    assert_eq!(Config::from_yaml("").unwrap(), Config::default());
    assert!(matches!(
        Config::from_yaml("timeout: 5"),
        Err(Error::Config(_))
    ));
}

#[test]
fn allowed_urls() {
    let allowed = Config::default().allowed_prefixes;
    assert!(loader::check_url("https://aonprd.com/SpellDisplay.aspx?ItemName=Shield", &allowed).is_ok());
    assert!(loader::check_url("https://www.aonprd.com/MagicWondrousDisplay.aspx", &allowed).is_ok());
    assert!(matches!(
        loader::check_url("https://example.com/aonprd.com/", &allowed),
        Err(Error::InvalidInput(_))
    ));
    assert!(matches!(
        loader::check_url("not a url", &allowed),
        Err(Error::InvalidInput(_))
    ));
}
