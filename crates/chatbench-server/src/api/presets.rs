//! Preset CRUD handlers.

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};
use chatbench_models::{NewPreset, Preset, PresetSummary};
use serde::{Deserialize, Serialize};

use super::{error::ApiError, state::AppState};

#[derive(Debug, Serialize, Deserialize)]
pub struct PresetSaved {
    pub message: String,
    pub id: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PresetUpdated {
    pub message: String,
    pub changes: u64,
}

fn parse_body(payload: Result<Json<NewPreset>, JsonRejection>) -> Result<NewPreset, ApiError> {
    let Json(preset) = payload?;
    if preset.name.trim().is_empty() {
        return Err(ApiError::BadRequest("name must not be empty".to_string()));
    }
    preset
        .params
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    Ok(preset)
}

/// Ids that do not parse cannot name a stored preset.
fn preset_id(path: Result<Path<u64>, PathRejection>) -> Result<u64, ApiError> {
    path.map(|Path(id)| id).map_err(|_| ApiError::NotFound("Preset"))
}

pub async fn create_preset(
    State(state): State<AppState>,
    payload: Result<Json<NewPreset>, JsonRejection>,
) -> Result<Json<PresetSaved>, ApiError> {
    let preset = parse_body(payload)?;
    let created = state.storage.presets.create(preset)?;
    tracing::info!(id = created.id, name = %created.name, "Preset saved");

    Ok(Json(PresetSaved {
        message: "Preset saved successfully".to_string(),
        id: created.id,
    }))
}

pub async fn list_presets(
    State(state): State<AppState>,
) -> Result<Json<Vec<PresetSummary>>, ApiError> {
    Ok(Json(state.storage.presets.list_summaries()?))
}

pub async fn get_preset(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<Preset>, ApiError> {
    let id = preset_id(id)?;
    state
        .storage
        .presets
        .get(id)?
        .map(Json)
        .ok_or(ApiError::NotFound("Preset"))
}

pub async fn update_preset(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
    payload: Result<Json<NewPreset>, JsonRejection>,
) -> Result<Json<PresetUpdated>, ApiError> {
    let id = preset_id(id)?;
    let preset = parse_body(payload)?;
    match state.storage.presets.update(id, preset)? {
        Some(_) => Ok(Json(PresetUpdated {
            message: "Preset updated successfully".to_string(),
            changes: 1,
        })),
        None => Err(ApiError::NotFound("Preset")),
    }
}

pub async fn delete_preset(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<PresetSaved>, ApiError> {
    let id = preset_id(id)?;
    if !state.storage.presets.delete(id)? {
        return Err(ApiError::NotFound("Preset"));
    }
    tracing::info!(id, "Preset deleted");
    Ok(Json(PresetSaved {
        message: "Preset deleted successfully".to_string(),
        id,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatbench_core::AppCore;
    use chatbench_models::GenerationParameters;
    use std::sync::Arc;
    use tempfile::{TempDir, tempdir};

    async fn create_test_app() -> (AppState, TempDir) {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let app = Arc::new(AppCore::new(db_path, None).await.unwrap());
        (app, temp_dir)
    }

    fn new_preset(name: &str) -> NewPreset {
        NewPreset::new(name, GenerationParameters::default())
    }

    #[tokio::test]
    async fn test_list_presets_empty() {
        let (app, _tmp_dir) = create_test_app().await;
        let result = list_presets(State(app)).await;

        assert!(result.unwrap().0.is_empty());
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let (app, _tmp_dir) = create_test_app().await;

        let saved = create_preset(State(app.clone()), Ok(Json(new_preset("poet"))))
            .await
            .unwrap()
            .0;
        assert_eq!(saved.id, 1);

        let preset = get_preset(State(app), Ok(Path(saved.id))).await.unwrap().0;
        assert_eq!(preset.name, "poet");
    }

    #[tokio::test]
    async fn test_create_rejects_out_of_range_params() {
        let (app, _tmp_dir) = create_test_app().await;
        let mut preset = new_preset("hot");
        preset.params.completion.temperature = 3.5;

        let err = create_preset(State(app), Ok(Json(preset)))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_missing_preset_is_not_found() {
        let (app, _tmp_dir) = create_test_app().await;

        assert!(matches!(
            get_preset(State(app.clone()), Ok(Path(9))).await,
            Err(ApiError::NotFound("Preset"))
        ));
        assert!(matches!(
            update_preset(State(app.clone()), Ok(Path(9)), Ok(Json(new_preset("x")))).await,
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            delete_preset(State(app), Ok(Path(9))).await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let (app, _tmp_dir) = create_test_app().await;
        let saved = create_preset(State(app.clone()), Ok(Json(new_preset("a"))))
            .await
            .unwrap()
            .0;

        let updated = update_preset(State(app.clone()), Ok(Path(saved.id)), Ok(Json(new_preset("b"))))
            .await
            .unwrap()
            .0;
        assert_eq!(updated.changes, 1);

        let deleted = delete_preset(State(app.clone()), Ok(Path(saved.id)))
            .await
            .unwrap()
            .0;
        assert_eq!(deleted.id, saved.id);
        assert!(list_presets(State(app)).await.unwrap().0.is_empty());
    }
}
