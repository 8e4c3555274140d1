//! Integration tests for `EnsembleService` prediction.

mod support;

use emotion_ensemble::{
    EmotionLabel, EmotionPredictor, EnsembleError, EnsembleService, LabelDecodeError,
    LabelRegistry, ModelAdapter, ModelLoadError, RawPrediction,
};
use rstest::{fixture, rstest};
use std::{sync::Arc, thread};
use support::{StubClassifier, approx_eq, failing_model, stub_model};

const FIRST: [f32; 5] = [0.8, 0.1, 0.05, 0.03, 0.02];
const SECOND: [f32; 5] = [0.6, 0.1, 0.1, 0.1, 0.1];

#[fixture]
fn two_model_service() -> EnsembleService {
    EnsembleService::from_models(
        LabelRegistry::default(),
        vec![stub_model("first", &FIRST), stub_model("second", &SECOND)],
    )
}

#[rstest]
fn predict_averages_every_model(two_model_service: EnsembleService) {
    let scores = two_model_service
        .predict("I can't believe you would betray me like this!")
        .unwrap_or_else(|e| panic!("predict failed: {e}"));
    let expected = [
        (EmotionLabel::Anger, 0.70),
        (EmotionLabel::Fear, 0.10),
        (EmotionLabel::Joy, 0.075),
        (EmotionLabel::Sadness, 0.065),
        (EmotionLabel::Surprise, 0.06),
    ];
    assert_eq!(scores.len(), expected.len());
    for (label, value) in expected {
        let actual = scores
            .get(label)
            .unwrap_or_else(|| panic!("missing {label}"));
        assert!(approx_eq(actual, value, 1e-6), "{label}: {actual} != {value}");
    }
    assert_eq!(scores.dominant().map(|(label, _)| label), Some(EmotionLabel::Anger));
}

#[rstest]
fn single_model_scores_pass_through() {
    let service = EnsembleService::from_models(
        LabelRegistry::default(),
        vec![stub_model("solo", &[0.021, 0.023, 0.912, 0.031, 0.013])],
    );
    let scores = service
        .predict("I finally got the promotion! This is the best day ever!")
        .unwrap_or_else(|e| panic!("predict failed: {e}"));
    let values: Vec<f32> = scores.iter().map(|(_, score)| score).collect();
    assert_eq!(values, vec![0.021, 0.023, 0.912, 0.031, 0.013]);
}

#[rstest]
fn any_model_failure_fails_the_request() {
    let service = EnsembleService::from_models(
        LabelRegistry::default(),
        vec![stub_model("healthy", &FIRST), failing_model("broken")],
    );
    let Err(err) = service.predict("I feel so lonely and empty inside.") else {
        panic!("expected inference failure");
    };
    let EnsembleError::Inference(inner) = err else {
        panic!("expected EnsembleError::Inference, got {err:?}");
    };
    assert_eq!(inner.model, "broken");
}

#[rstest]
fn out_of_range_label_fails_the_request() {
    let model = ModelAdapter::new(
        "odd",
        StubClassifier::from_predictions(vec![
            RawPrediction::new("LABEL_0", 0.5),
            RawPrediction::new("LABEL_99", 0.5),
        ]),
    );
    let service = EnsembleService::from_models(LabelRegistry::default(), vec![model]);
    assert!(matches!(
        service.predict("Wow! I never expected a surprise party!"),
        Err(EnsembleError::LabelDecode(LabelDecodeError::OutOfRange { index: 99, .. }))
    ));
}

#[rstest]
fn repeated_label_scores_are_summed() {
    let model = ModelAdapter::new(
        "echo",
        StubClassifier::from_predictions(vec![
            RawPrediction::new("LABEL_1", 0.4),
            RawPrediction::new("LABEL_1", 0.4),
        ]),
    );
    let service = EnsembleService::from_models(LabelRegistry::default(), vec![model]);
    let scores = service
        .predict("I heard a strange noise outside and I'm scared to look.")
        .unwrap_or_else(|e| panic!("predict failed: {e}"));
    assert!(approx_eq(
        scores.get(EmotionLabel::Fear).unwrap_or(f32::NAN),
        0.8,
        1e-6
    ));
    assert_eq!(scores.get(EmotionLabel::Joy), Some(0.0));
}

#[rstest]
fn failed_loads_are_skipped() {
    let outcomes = vec![
        Ok(stub_model("kept", &SECOND)),
        Err(ModelLoadError::BackendUnavailable {
            model: "missing".into(),
            backend: "onnx",
        }),
    ];
    let service = EnsembleService::from_outcomes(LabelRegistry::default(), outcomes);
    assert_eq!(service.active_model_count(), 1);
    assert_eq!(service.active_models().collect::<Vec<_>>(), vec!["kept"]);
    assert_eq!(service.load_failures().len(), 1);
    let scores = service
        .predict("I heard a strange noise outside and I'm scared to look.")
        .unwrap_or_else(|e| panic!("predict failed: {e}"));
    assert_eq!(scores.get(EmotionLabel::Anger), Some(0.6));
}

#[rstest]
fn no_active_models_fails_every_request() {
    let outcomes = vec![Err(ModelLoadError::BackendUnavailable {
        model: "missing".into(),
        backend: "provider-api",
    })];
    let service = EnsembleService::from_outcomes(LabelRegistry::default(), outcomes);
    assert!(matches!(
        service.predict("hello"),
        Err(EnsembleError::NoModelsAvailable)
    ));
}

#[rstest]
fn custom_registry_order_relabels_indices() {
    let registry = LabelRegistry::new(vec![
        EmotionLabel::Joy,
        EmotionLabel::Anger,
        EmotionLabel::Fear,
        EmotionLabel::Sadness,
        EmotionLabel::Surprise,
    ])
    .unwrap_or_else(|e| panic!("registry: {e}"));
    let service = EnsembleService::from_models(registry, vec![stub_model("solo", &FIRST)]);
    let scores = service
        .predict("text")
        .unwrap_or_else(|e| panic!("predict failed: {e}"));
    assert_eq!(scores.get(EmotionLabel::Joy), Some(0.8));
    assert_eq!(scores.get(EmotionLabel::Anger), Some(0.1));
}

#[rstest]
fn trace_reports_dominant_emotion(two_model_service: EnsembleService) {
    let prediction = two_model_service
        .trace("I can't believe you would betray me like this!")
        .unwrap_or_else(|e| panic!("trace failed: {e}"));
    assert_eq!(prediction.dominant, Some(EmotionLabel::Anger));
    assert_eq!(prediction.text, "I can't believe you would betray me like this!");
    let json = serde_json::to_value(&prediction).unwrap_or_else(|e| panic!("serialise: {e}"));
    assert_eq!(json["dominant"], "Anger");
    assert!(json["scores"]["Surprise"].is_number());
}

#[rstest]
fn concurrent_predictions_agree(two_model_service: EnsembleService) {
    let service = Arc::new(two_model_service);
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let service = Arc::clone(&service);
            thread::spawn(move || service.predict("shared"))
        })
        .collect();
    for handle in handles {
        let scores = handle
            .join()
            .unwrap_or_else(|_| panic!("thread panicked"))
            .unwrap_or_else(|e| panic!("predict failed: {e}"));
        assert!(approx_eq(
            scores.get(EmotionLabel::Anger).unwrap_or(f32::NAN),
            0.7,
            1e-6
        ));
    }
}
