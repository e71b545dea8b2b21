use serde_json::json;

use super::common::*;
use crate::i18n::{Language, MessageCatalog};
use crate::workflows::prediction::{format_probability, interpret, ModelMethod, ResponseError};

#[test]
fn summary_only_response_formats_as_percentage() {
    let result = interpret(&summary_response(0.62)).expect("response interprets");

    assert_eq!(result.summary_probability, Some(0.62));
    assert_eq!(result.formatted_summary(), "62%");
    assert_eq!(result.models.len(), 3);
    assert!(result
        .models
        .iter()
        .all(|model| model.ambulatory_probability == 0.0
            && model.hospitalization_probability == 0.0));
}

#[test]
fn per_model_probabilities_follow_rationale_and_outcome() {
    let result = interpret(&detailed_response()).expect("response interprets");

    let methods: Vec<ModelMethod> = result.models.iter().map(|model| model.method).collect();
    assert_eq!(methods, ModelMethod::ordered().to_vec());

    let forest = result.model(ModelMethod::RandomForest).expect("RF present");
    assert_eq!(forest.ambulatory_probability, 0.7);
    assert_eq!(forest.hospitalization_probability, 0.3);

    let boosting = result.model(ModelMethod::GradientBoosting).expect("GBT present");
    assert_eq!(boosting.ambulatory_probability, 0.55);
    assert_eq!(boosting.hospitalization_probability, 0.45);
}

#[test]
fn missing_model_defaults_to_zero() {
    let result = interpret(&detailed_response()).expect("response interprets");
    let network = result.model(ModelMethod::NeuralNetwork).expect("NN row present");
    assert_eq!(network.ambulatory_probability, 0.0);
    assert_eq!(network.hospitalization_probability, 0.0);
}

#[test]
fn missing_data_leaves_summary_unavailable() {
    let result = interpret(&raw(json!({ "success": true }))).expect("response interprets");
    assert_eq!(result.summary_probability, None);
    assert_eq!(result.formatted_summary(), "N/A");

    let empty = interpret(&raw(json!({ "success": true, "data": [] }))).expect("interprets");
    assert_eq!(empty.summary_probability, None);
}

#[test]
fn service_failures_carry_the_server_message() {
    assert_eq!(
        interpret(&raw(json!({ "success": false, "message": "model offline" }))),
        Err(ResponseError::Service {
            message: Some("model offline".to_string()),
        })
    );
    assert_eq!(
        interpret(&raw(json!({ "success": false }))),
        Err(ResponseError::Service { message: None })
    );
    assert_eq!(
        interpret(&raw(json!({ "success": "true" }))),
        Err(ResponseError::MalformedResponse)
    );
}

#[test]
fn interpretation_is_idempotent() {
    let response = detailed_response();
    assert_eq!(interpret(&response), interpret(&response));
}

#[test]
fn view_translates_method_labels() {
    let result = interpret(&detailed_response()).expect("response interprets");
    let view = result.view(&MessageCatalog::for_language(Language::En));

    assert_eq!(view.summary, "35%");
    let labels: Vec<&str> = view.details.iter().map(|row| row.method.as_str()).collect();
    assert_eq!(labels, vec!["Random forest", "Neural network", "Gradient boosting"]);
    assert_eq!(view.details[0].ambulatory, "70%");
    assert_eq!(view.details[0].hospitalization, "30%");
    assert_eq!(view.details[1].hospitalization, format_probability(Some(0.0)));
}
