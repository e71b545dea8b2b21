use std::collections::{BTreeSet, HashSet};

use super::common::*;
use crate::workflows::prediction::{
    AssessmentForm, FieldValue, ObservationBundle, PayloadEncoder, RiskFactor, SexCode,
    SubjectReference, Symptom, ValidatedAssessment, VocabularyEmission, CODING_SYSTEM,
};

fn codes(bundle: &ObservationBundle) -> Vec<&str> {
    bundle.observations().map(|observation| observation.code()).collect()
}

fn value_of(bundle: &ObservationBundle, code: &str) -> f64 {
    bundle
        .observation(code)
        .unwrap_or_else(|| panic!("missing observation {code}"))
        .value()
}

#[test]
fn zero_filled_bundle_lists_whole_vocabularies_in_order() {
    let bundle = PayloadEncoder::default().encode(&validated(&assessment_form()), issued());

    assert_eq!(
        codes(&bundle),
        vec![
            "age",
            "sexe",
            "fr_asthme",
            "fr_bpco",
            "fr_diabete",
            "fr_maladie_cardiovasculaire",
            "fr_neoplasie",
            "fr_obese",
            "symp_cephalees",
            "symp_digestifs",
            "symp_dyspnee",
            "symp_fievre",
            "symp_myalgies",
            "symp_toux",
        ]
    );
    assert_eq!(value_of(&bundle, "age"), 45.0);
    assert_eq!(value_of(&bundle, "sexe"), 1.0);
    assert_eq!(value_of(&bundle, "fr_asthme"), 1.0);
    for code in [
        "fr_bpco",
        "fr_diabete",
        "fr_maladie_cardiovasculaire",
        "fr_neoplasie",
        "fr_obese",
    ] {
        assert_eq!(value_of(&bundle, code), 0.0, "{code}");
    }
    assert_eq!(value_of(&bundle, "symp_toux"), 1.0);
    assert_eq!(value_of(&bundle, "symp_fievre"), 1.0);
    assert_eq!(value_of(&bundle, "symp_dyspnee"), 0.0);

    let unique: HashSet<&str> = codes(&bundle).into_iter().collect();
    assert_eq!(unique.len(), bundle.observations().count());
}

#[test]
fn sparse_bundle_lists_only_selected_members() {
    let encoder = PayloadEncoder::new(VocabularyEmission::Sparse, SubjectReference::default());
    let bundle = encoder.encode(&validated(&assessment_form()), issued());

    assert_eq!(
        codes(&bundle),
        vec!["age", "sexe", "fr_asthme", "symp_fievre", "symp_toux"]
    );
    assert!(bundle
        .observations()
        .skip(2)
        .all(|observation| observation.value() == 1.0));
}

#[test]
fn blank_vitals_are_omitted_and_measured_ones_emitted_once() {
    let blank = PayloadEncoder::default().encode(&validated(&assessment_form()), issued());
    assert!(blank.observation("temperature").is_none());
    assert!(blank.observation("oxygen").is_none());

    let form = AssessmentForm {
        temperature: Some(FieldValue::from("38.5")),
        oxygen: Some(FieldValue::from(94.0)),
        ..assessment_form()
    };
    let bundle = PayloadEncoder::default().encode(&validated(&form), issued());
    let temperatures: Vec<_> = bundle
        .observations()
        .filter(|observation| observation.code() == "temperature")
        .collect();
    assert_eq!(temperatures.len(), 1);
    assert_eq!(temperatures[0].value(), 38.5);
    assert_eq!(temperatures[0].display(), "Température");
    let emitted = codes(&bundle);
    assert_eq!(emitted[emitted.len() - 2..].to_vec(), vec!["temperature", "oxygen"]);
}

#[test]
fn zero_vitals_count_as_not_measured() {
    let assessment = ValidatedAssessment::new(
        60,
        SexCode(2),
        Some(0.0),
        Some(0.0),
        BTreeSet::from([RiskFactor::Obese]),
        BTreeSet::from([Symptom::Dyspnee]),
    );
    let bundle = PayloadEncoder::default().encode(&assessment, issued());
    assert!(bundle.observation("temperature").is_none());
    assert!(bundle.observation("oxygen").is_none());
}

#[test]
fn display_labels_follow_vocabulary_codes() {
    let bundle = PayloadEncoder::default().encode(&validated(&assessment_form()), issued());
    let cardio = bundle
        .observation("fr_maladie_cardiovasculaire")
        .expect("cardio observation present");
    assert_eq!(cardio.display(), "maladie cardiovasculaire");
    assert_eq!(cardio.code.coding[0].system, CODING_SYSTEM);
    assert_eq!(
        bundle
            .observation("symp_cephalees")
            .expect("symptom present")
            .display(),
        "cephalees"
    );
}

#[test]
fn serialized_bundle_matches_wire_shape() {
    let bundle = PayloadEncoder::default().encode(&validated(&assessment_form()), issued());
    let json = bundle.to_json().expect("bundle serializes");

    assert!(json.starts_with(
        r#"[{"subject":{"reference":"patient-id"},"issued":"2024-03-01T10:00:00.000Z","component":[{"valueQuantity":{"value":45},"code":{"coding":[{"code":"age","display":"Age","system":"http://comunicare.io"}]}}"#
    ));

    let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
    let records = value.as_array().expect("top-level array");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["component"][2]["valueQuantity"]["value"], 1);
}

#[test]
fn encoding_is_deterministic_for_a_fixed_timestamp() {
    let encoder = PayloadEncoder::default();
    let assessment = validated(&assessment_form());
    let first = encoder.encode(&assessment, issued()).to_json().expect("json");
    let second = encoder.encode(&assessment, issued()).to_json().expect("json");
    assert_eq!(first, second);
}

#[test]
fn subject_display_is_written_when_set() {
    let subject = SubjectReference {
        reference: "patient-42".to_string(),
        display: Some("Jane Doe".to_string()),
    };
    let bundle = PayloadEncoder::new(VocabularyEmission::ZeroFilled, subject)
        .encode(&validated(&assessment_form()), issued());
    let json = bundle.to_json().expect("json");
    assert!(json.contains(r#""subject":{"reference":"patient-42","display":"Jane Doe"}"#));
}
