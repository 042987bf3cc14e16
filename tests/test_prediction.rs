//! Integration test: distance prediction over the store

use std::sync::Arc;
use yardtrack::domain::MeasurementInput;
use yardtrack::prediction::{
    MissingCoordinatePolicy, PredictionConfig, PredictionRequest, PredictionService, TrainerKind,
    WorkerConfig,
};
use yardtrack::store::{Store, StoreSnapshot};
use yardtrack::YardError;

const POSITIONS: [(i64, f64, f64); 6] = [
    (1, 0.0, 0.0),
    (2, 1.0, 2.0),
    (3, 3.0, 1.0),
    (4, 2.0, 5.0),
    (5, 6.0, 3.0),
    (6, 4.0, 4.0),
];

const MARKERS: [(i64, f64, f64); 6] = [
    (1, 1.0, 1.0),
    (2, 5.0, 0.0),
    (3, 2.0, 2.0),
    (4, 0.0, 6.0),
    (5, 7.0, 7.0),
    (6, 3.0, 0.0),
];

/// Positions and markers 1..=6, with `measured` measurements pairing
/// position i to marker i at distance i + 0.5.
fn seeded_store(measured: usize) -> Store {
    let positions: Vec<_> = POSITIONS
        .iter()
        .map(|(id, x, y)| serde_json::json!({ "id": id, "x": x, "y": y }))
        .collect();
    let markers: Vec<_> = MARKERS
        .iter()
        .map(|(id, x, y)| serde_json::json!({ "id": id, "aruco_code": format!("FX-{}", id), "x": x, "y": y }))
        .collect();
    let measurements: Vec<_> = (1..=measured as i64)
        .map(|i| {
            serde_json::json!({
                "id": i,
                "distance": i as f64 + 0.5,
                "position_id": i,
                "marker_id": i,
            })
        })
        .collect();

    let json = serde_json::json!({
        "positions": positions,
        "fixed_markers": markers,
        "measurements": measurements,
    });
    let snapshot = StoreSnapshot::from_json(&json.to_string()).unwrap();
    Store::from_snapshot(snapshot).unwrap()
}

fn service(store: Arc<Store>, config: PredictionConfig) -> PredictionService {
    let config = config.with_min_training_samples(5);
    PredictionService::new(store, &config, WorkerConfig::default())
}

fn request(position_id: i64, marker_id: i64) -> PredictionRequest {
    PredictionRequest {
        position_id,
        marker_id,
    }
}

#[tokio::test]
async fn test_prediction_with_five_samples() {
    let store = Arc::new(seeded_store(5));
    let predictions = service(store, PredictionConfig::default());

    let result = predictions.predict_distance(request(1, 1)).await.unwrap();
    assert_eq!(result.training_sample_count, 5);
    assert!(result.predicted_distance.is_finite());
    // Five samples, five parameters: the fit interpolates the training rows.
    assert!((result.predicted_distance - 1.5).abs() < 1e-6);
}

#[tokio::test]
async fn test_two_samples_are_not_enough() {
    let store = Arc::new(seeded_store(2));
    let predictions = service(store, PredictionConfig::default());

    let err = predictions.predict_distance(request(1, 1)).await.unwrap_err();
    assert!(matches!(
        err,
        YardError::InsufficientTrainingData { required: 5, available: 2 }
    ));
}

#[tokio::test]
async fn test_unknown_position_or_marker_is_not_found() {
    for measured in [0, 5] {
        let store = Arc::new(seeded_store(measured));
        let predictions = service(store, PredictionConfig::default());

        let err = predictions.predict_distance(request(999, 1)).await.unwrap_err();
        assert!(matches!(err, YardError::NotFound(_)));

        let err = predictions.predict_distance(request(1, 999)).await.unwrap_err();
        assert!(matches!(err, YardError::NotFound(_)));
    }
}

#[tokio::test]
async fn test_new_measurement_changes_prediction() {
    let store = Arc::new(seeded_store(5));
    let predictions = service(Arc::clone(&store), PredictionConfig::default());

    let before = predictions.predict_distance(request(1, 1)).await.unwrap();

    store
        .create_measurement(MeasurementInput {
            distance: Some(9.0),
            position_id: Some(6),
            marker_id: Some(6),
        })
        .await
        .unwrap();

    let after = predictions.predict_distance(request(1, 1)).await.unwrap();
    assert_eq!(after.training_sample_count, 6);
    assert!((after.predicted_distance - before.predicted_distance).abs() > 0.1);
    assert!((after.predicted_distance - 0.795_658_951).abs() < 1e-6);
}

#[tokio::test]
async fn test_prediction_is_deterministic() {
    for trainer in [TrainerKind::Ols, TrainerKind::Sgd] {
        let store = Arc::new(seeded_store(6));
        let predictions = service(store, PredictionConfig::default().with_trainer(trainer));

        let first = predictions.predict_distance(request(2, 3)).await.unwrap();
        let second = predictions.predict_distance(request(2, 3)).await.unwrap();
        assert_eq!(first, second, "trainer {} is not deterministic", trainer);
    }
}

#[tokio::test]
async fn test_missing_coordinates_policy() {
    let store = seeded_store(5);
    let partial = store
        .create_position(yardtrack::domain::PositionInput {
            recorded_at: None,
            x: None,
            y: Some(2.0),
            motorcycle_id: None,
            yard_id: None,
        })
        .await
        .unwrap();
    store
        .create_measurement(MeasurementInput {
            distance: Some(2.0),
            position_id: Some(partial.id),
            marker_id: Some(1),
        })
        .await
        .unwrap();
    let store = Arc::new(store);

    let exclude = service(Arc::clone(&store), PredictionConfig::default());
    let result = exclude.predict_distance(request(1, 1)).await.unwrap();
    assert_eq!(result.training_sample_count, 5);

    // A query against a position without coordinates cannot be answered
    // unless missing values are substituted.
    let err = exclude.predict_distance(request(partial.id, 1)).await.unwrap_err();
    assert!(matches!(err, YardError::InvalidNumericInput(_)));

    let zero = service(
        Arc::clone(&store),
        PredictionConfig::default().with_missing_coordinates(MissingCoordinatePolicy::Zero),
    );
    let result = zero.predict_distance(request(partial.id, 1)).await.unwrap();
    assert_eq!(result.training_sample_count, 6);
    assert!(result.predicted_distance.is_finite());
}

#[tokio::test]
async fn test_incomplete_measurements_are_skipped() {
    let store = seeded_store(5);
    store
        .create_measurement(MeasurementInput {
            distance: None,
            position_id: Some(2),
            marker_id: Some(2),
        })
        .await
        .unwrap();
    let predictions = service(Arc::new(store), PredictionConfig::default());

    let result = predictions.predict_distance(request(3, 3)).await.unwrap();
    assert_eq!(result.training_sample_count, 5);
}

#[tokio::test]
async fn test_insufficient_data_wins_over_missing_query_coordinates() {
    let store = seeded_store(2);
    let partial = store
        .create_position(yardtrack::domain::PositionInput {
            recorded_at: None,
            x: None,
            y: Some(3.0),
            motorcycle_id: None,
            yard_id: None,
        })
        .await
        .unwrap();
    let predictions = service(Arc::new(store), PredictionConfig::default());

    let err = predictions
        .predict_distance(request(partial.id, 1))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        YardError::InsufficientTrainingData { required: 5, available: 2 }
    ));
}
