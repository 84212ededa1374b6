use std::collections::HashSet;

use serde_json::to_value;

use crate::domain::{FieldKind, Variant, parse_form_schema, presets};

#[test]
fn both_variants_share_one_namespace() {
    let short = Variant::Short.schema();
    let long = Variant::Long.schema();
    assert_eq!(short.id, presets::SHOW_NAMESPACE);
    assert_eq!(long.id, short.id);
    assert!(!short.has_media());
    assert!(long.has_media());
}

#[test]
fn field_names_are_unique() {
    for variant in [Variant::Short, Variant::Long] {
        let schema = variant.schema();
        let names: HashSet<_> = schema.fields.iter().map(|field| &field.name).collect();
        assert_eq!(names.len(), schema.fields.len(), "{variant:?}");
    }
}

#[test]
fn presets_pass_their_own_meta_schema() {
    for variant in [Variant::Short, Variant::Long] {
        let schema = variant.schema();
        let document = to_value(&schema).unwrap();
        let parsed = parse_form_schema(&document).unwrap();
        assert_eq!(parsed, schema);
    }
}

#[test]
fn long_form_keeps_free_text_and_consent_out_of_drafts() {
    let schema = presets::long_form();
    let transient: Vec<_> = schema
        .fields
        .iter()
        .filter(|field| !field.persists_in_draft())
        .map(|field| field.name.as_str())
        .collect();
    assert_eq!(transient, ["experience", "whyYou", "video", "consent"]);
}

#[test]
fn long_form_age_window() {
    let schema = presets::long_form();
    let age = schema.field("age").unwrap();
    assert_eq!(age.kind, FieldKind::Number);
    assert_eq!((age.constraints.min, age.constraints.max), (Some(21), Some(70)));
}
