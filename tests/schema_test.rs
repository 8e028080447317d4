//! Tests for declarative schema validation.

use huginn::schema::{ArrayLength, FieldType, Schema, ViolationKind, validate};
use serde_json::json;

fn career_schema() -> Schema {
    let career = Schema::new()
        .required("title", FieldType::String)
        .required(
            "skills",
            FieldType::array_of(FieldType::String).length(ArrayLength::AtLeast(1)),
        );
    Schema::new()
        .optional("intro", FieldType::String)
        .required(
            "careers",
            FieldType::array_of(FieldType::Object(career)).length(ArrayLength::AtLeast(2)),
        )
}

#[test]
fn valid_value_is_returned_unchanged() {
    let value = json!({
        "careers": [
            {"title": "Coach", "skills": ["leadership"]},
            {"title": "Nurse", "skills": ["empathy"], "extra": 1}
        ],
        "unexpected": true
    });
    assert_eq!(validate(value.clone(), &career_schema()).unwrap(), value);
}

#[test]
fn missing_required_field() {
    let violation = validate(json!({}), &career_schema()).unwrap_err();
    assert_eq!(violation.path, "careers");
    assert_eq!(violation.kind, ViolationKind::Missing);
}

#[test]
fn null_counts_as_missing() {
    let violation = validate(json!({"careers": null}), &career_schema()).unwrap_err();
    assert_eq!(violation.kind, ViolationKind::Missing);
}

#[test]
fn optional_field_may_be_absent_or_null_but_not_mistyped() {
    let careers = json!([
        {"title": "a", "skills": ["x"]},
        {"title": "b", "skills": ["y"]}
    ]);
    assert!(validate(json!({"careers": careers.clone()}), &career_schema()).is_ok());
    assert!(validate(json!({"careers": careers.clone(), "intro": null}), &career_schema()).is_ok());

    let violation =
        validate(json!({"careers": careers, "intro": 5}), &career_schema()).unwrap_err();
    assert_eq!(violation.path, "intro");
    assert!(matches!(
        violation.kind,
        ViolationKind::WrongType {
            expected: "string",
            found: "number"
        }
    ));
}

#[test]
fn array_length_is_enforced() {
    let violation = validate(
        json!({"careers": [{"title": "a", "skills": ["x"]}]}),
        &career_schema(),
    )
    .unwrap_err();
    assert_eq!(violation.path, "careers");
    assert!(matches!(
        violation.kind,
        ViolationKind::WrongLength { found: 1, .. }
    ));
}

#[test]
fn nested_paths_point_at_the_offending_element() {
    let violation = validate(
        json!({"careers": [
            {"title": "a", "skills": ["x"]},
            {"title": 7, "skills": ["y"]}
        ]}),
        &career_schema(),
    )
    .unwrap_err();
    assert_eq!(violation.path, "careers[1].title");
    assert_eq!(violation.to_string(), "careers[1].title: expected string, found number");
}

#[test]
fn exact_length() {
    let schema = Schema::new().required(
        "options",
        FieldType::array_of(FieldType::String).length(ArrayLength::Exact(4)),
    );
    assert!(validate(json!({"options": ["a", "b", "c", "d"]}), &schema).is_ok());
    assert!(validate(json!({"options": ["a", "b", "c"]}), &schema).is_err());
    assert!(validate(json!({"options": ["a", "b", "c", "d", "e"]}), &schema).is_err());
}

#[test]
fn scalar_types() {
    let schema = Schema::new()
        .required("n", FieldType::Number)
        .required("i", FieldType::Integer)
        .required("b", FieldType::Boolean);
    assert!(validate(json!({"n": 1.5, "i": 2, "b": false}), &schema).is_ok());
    assert!(validate(json!({"n": 1.5, "i": 2.5, "b": false}), &schema).is_err());
    assert!(validate(json!({"n": "1", "i": 2, "b": false}), &schema).is_err());
}

#[test]
fn non_object_root_is_rejected() {
    let violation = validate(json!([1, 2]), &career_schema()).unwrap_err();
    assert_eq!(violation.path, "$");
}

#[test]
fn first_violation_is_reported() {
    let schema = Schema::new()
        .required("a", FieldType::String)
        .required("b", FieldType::String);
    let violation = validate(json!({}), &schema).unwrap_err();
    assert_eq!(violation.path, "a");
}
