use serde::Serialize;
use sightread::{
    FallbackSource, MeterSpec, NotationSource, Settings, SightreadError, MAX_REQUESTED_MEASURES,
};
use wasm_bindgen::prelude::*;

#[derive(Serialize)]
struct BindingError {
    message: String,
}

fn error_to_binding_error(e: SightreadError) -> BindingError {
    BindingError {
        message: e.to_string(),
    }
}

fn to_js_error(e: SightreadError) -> JsValue {
    let payload = error_to_binding_error(e);
    let json = serde_json::to_string(&payload).unwrap_or_else(|_| payload.message.clone());
    JsValue::from_str(&json)
}

fn requested_meter(time_signature: &str) -> MeterSpec {
    MeterSpec::from_token(time_signature).unwrap_or_default()
}

fn requested_measures(measures: u32) -> usize {
    measures.min(MAX_REQUESTED_MEASURES) as usize
}

fn offline_notation(settings: &Settings, key_index: usize) -> Result<String, JsValue> {
    FallbackSource::new(key_index)
        .generate(settings)
        .map_err(to_js_error)
}

/// Append a metronome voice to ABC notation (returns it unchanged when off)
#[wasm_bindgen]
pub fn inject_metronome(abc: &str, metronome_on: bool, measures: u32, time_signature: &str) -> String {
    sightread::inject_metronome(
        abc,
        metronome_on,
        requested_measures(measures),
        requested_meter(time_signature),
    )
}

/// Analyse ABC notation and return the metronome plan as JSON
#[wasm_bindgen]
pub fn plan_metronome(abc: &str, measures: u32, time_signature: &str) -> String {
    let plan = sightread::plan_metronome(abc, requested_measures(measures), requested_meter(time_signature));
    serde_json::to_string(&plan).unwrap_or_else(|_| "{}".to_string())
}

/// Same as `plan_metronome`, returned as a JS object
#[wasm_bindgen]
pub fn plan_metronome_object(abc: &str, measures: u32, time_signature: &str) -> Result<JsValue, JsValue> {
    let plan = sightread::plan_metronome(abc, requested_measures(measures), requested_meter(time_signature));
    serde_wasm_bindgen::to_value(&plan).map_err(JsValue::from)
}

/// Offline exercise for the settings object (camelCase or kebab-case keys)
#[wasm_bindgen]
pub fn fallback_notation(settings: JsValue, key_index: usize) -> Result<String, JsValue> {
    let settings: Settings = serde_wasm_bindgen::from_value(settings)
        .map_err(|e| to_js_error(SightreadError::SettingsError(e.to_string())))?;
    settings.validate().map_err(to_js_error)?;
    offline_notation(&settings, key_index)
}

/// Offline exercise for settings passed as a JSON string
#[wasm_bindgen]
pub fn fallback_notation_json(settings_json: &str, key_index: usize) -> Result<String, JsValue> {
    let settings = Settings::from_json(settings_json).map_err(to_js_error)?;
    offline_notation(&settings, key_index)
}

/// Extract the ABC notation from a generative-service reply
#[wasm_bindgen]
pub fn decode_response(text: &str) -> Result<String, JsValue> {
    sightread::decode_response(text).map_err(to_js_error)
}
