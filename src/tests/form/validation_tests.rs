use crate::{
    domain::{FieldKind, FieldSchema, IssueKind},
    form::{FieldIssue, FieldValue, is_email, is_phone, is_url, validate, validate_field},
    tests::support::*,
};

fn issue(field: &FieldSchema, value: Option<FieldValue>) -> Option<FieldIssue> {
    validate_field(field, value.as_ref()).err().map(|err| err.issue)
}

#[test]
fn email_checks_are_conjunctive() {
    for ok in ["ada@example.com", "a.b+tag@mail.example.ng", "o'neil@example.co.uk"] {
        assert!(is_email(ok), "{ok}");
    }
    // Each of these passes the loose shape but fails the structural check.
    for bad in [".ada@example.com", "ada..obi@example.com", "ada@example.c", "ada@-example.com"] {
        assert!(!is_email(bad), "{bad}");
    }
    for bad in ["ada", "ada@example", "ada @example.com", ""] {
        assert!(!is_email(bad), "{bad}");
    }
}

#[test]
fn phone_shapes() {
    for ok in ["+2348012345678", "08012345678", "+234 801 234 5678", "+44 20 7946 0958"] {
        assert!(is_phone(ok), "{ok}");
    }
    for bad in ["phone", "++2348012345678", "0801-234-5678-9999-1", "12a45"] {
        assert!(!is_phone(bad), "{bad}");
    }
}

#[test]
fn phone_needs_minimum_length() {
    let field = FieldSchema::new("phone", "Phone", FieldKind::Phone);
    assert_eq!(
        issue(&field, Some(FieldValue::text("+23480"))),
        Some(FieldIssue::InvalidPhone)
    );
    assert_eq!(issue(&field, Some(FieldValue::text("+2348012345678"))), None);
    let short = FieldSchema::new("phone", "Phone", FieldKind::Phone).min_length(7);
    assert_eq!(issue(&short, Some(FieldValue::text("8012345"))), None);
}

#[test]
fn text_minimum_length_counts_characters() {
    let field = FieldSchema::new("whyYou", "Why", FieldKind::Text).min_length(20);
    assert_eq!(
        issue(&field, Some(FieldValue::text("too short"))),
        Some(FieldIssue::TooShort { min: 20 })
    );
    assert_eq!(issue(&field, Some(FieldValue::text("é".repeat(20)))), None);
    assert_eq!(issue(&field, None), Some(FieldIssue::TooShort { min: 20 }));
}

#[test]
fn number_range_is_inclusive() {
    let field = FieldSchema::new("age", "Age", FieldKind::Number).range(21, 70);
    assert_eq!(issue(&field, Some(FieldValue::Integer(21))), None);
    assert_eq!(issue(&field, Some(FieldValue::Integer(70))), None);
    for outside in [20, 71, -1] {
        assert_eq!(
            issue(&field, Some(FieldValue::Integer(outside))),
            Some(FieldIssue::OutOfRange {
                min: Some(21),
                max: Some(70)
            })
        );
    }
    assert_eq!(issue(&field, None), Some(FieldIssue::Required));
    assert_eq!(
        issue(&field, Some(FieldValue::text("thirty"))),
        Some(FieldIssue::NotANumber)
    );
}

#[test]
fn optional_url_may_be_empty_but_not_malformed() {
    let field = FieldSchema::new("socialMedia", "Social", FieldKind::Url).optional();
    assert_eq!(issue(&field, None), None);
    assert_eq!(issue(&field, Some(FieldValue::text(""))), None);
    assert_eq!(
        issue(&field, Some(FieldValue::text("instagram"))),
        Some(FieldIssue::InvalidUrl)
    );
    assert!(is_url("https://instagram.com/ada"));

    let required = FieldSchema::new("socials", "Socials", FieldKind::Url);
    assert_eq!(issue(&required, None), Some(FieldIssue::InvalidUrl));
}

#[test]
fn enum_must_be_in_the_closed_set() {
    let field = FieldSchema::new("referral", "Referral", FieldKind::choices(["social", "tv"]));
    assert_eq!(issue(&field, Some(FieldValue::text("tv"))), None);
    assert_eq!(
        issue(&field, Some(FieldValue::text("radio"))),
        Some(FieldIssue::InvalidChoice)
    );
}

#[test]
fn consent_must_be_literally_true() {
    let field = FieldSchema::new("consent", "Consent", FieldKind::Boolean);
    assert_eq!(issue(&field, Some(FieldValue::Bool(true))), None);
    assert_eq!(
        issue(&field, Some(FieldValue::Bool(false))),
        Some(FieldIssue::ConsentRequired)
    );
    assert_eq!(
        issue(&field, Some(FieldValue::text("true"))),
        Some(FieldIssue::ConsentRequired)
    );
}

#[test]
fn media_is_left_to_the_gate() {
    let field = FieldSchema::new("video", "Video", FieldKind::video());
    assert_eq!(issue(&field, None), None);
}

#[test]
fn schema_messages_override_defaults() {
    let field = FieldSchema::new("age", "Age", FieldKind::Number)
        .range(21, 70)
        .with_message(IssueKind::OutOfRange, "Too young or too old.");
    let err = validate_field(&field, Some(&FieldValue::Integer(90))).unwrap_err();
    assert_eq!(err.message, "Too young or too old.");
    let err = validate_field(&field, Some(&FieldValue::text("x"))).unwrap_err();
    assert_eq!(err.message, FieldIssue::NotANumber.to_string());
}

#[test]
fn valid_applicant_passes_whole_form() {
    let session = filled_session(applicant_schema());
    assert!(validate(session.schema(), session.values()).is_valid());
}

#[test]
fn empty_form_reports_every_required_field() {
    let schema = applicant_schema();
    let report = validate(&schema, &Default::default());
    assert_eq!(report.len(), schema.fields.len());
}
