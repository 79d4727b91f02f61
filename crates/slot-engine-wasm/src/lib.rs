//! WASM bindings for slot-engine.
//!
//! Exposes drop zone computation, drop evaluation and conflict resolution to
//! the calendar UI via `wasm-bindgen`. Snapshots, outcomes and commands cross
//! the boundary as JSON strings in the same camelCase shape the UI already
//! uses for its appointments.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p slot-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir packages/slot-engine-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/slot_engine_wasm.wasm
//! ```

use chrono::NaiveDate;
use serde::Deserialize;
use slot_engine::{
    availability, ConflictInfo, EngineConfig, PendingMove, ResolutionStrategy, Schedule,
};
use wasm_bindgen::prelude::*;

/// The conflict half of an `evaluateDrop` result, passed back unchanged when
/// the user picks a strategy. The `outcome` tag is ignored.
#[derive(Deserialize)]
struct ConflictPayload {
    conflict: ConflictInfo,
    pending: PendingMove,
}

// ---------------------------------------------------------------------------
// Helpers: parse inputs, serialize outputs
// ---------------------------------------------------------------------------

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("Invalid date '{}': {}", s, e))
}

fn parse_schedule(json: &str) -> Result<Schedule, String> {
    Schedule::from_json(json).map_err(|e| e.to_string())
}

fn parse_config(json: Option<&str>) -> Result<EngineConfig, String> {
    let config = match json {
        Some(json) => serde_json::from_str::<EngineConfig>(json)
            .map_err(|e| format!("Invalid config JSON: {}", e))?,
        None => EngineConfig::default(),
    };
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization error: {}", e))
}

fn compute_drop_zones_json(
    appointments_json: &str,
    provider_id: &str,
    date: &str,
) -> Result<String, String> {
    let appointments: Vec<slot_engine::Appointment> = serde_json::from_str(appointments_json)
        .map_err(|e| format!("Invalid appointments JSON: {}", e))?;
    appointments
        .iter()
        .try_for_each(slot_engine::Appointment::validate)
        .map_err(|e| e.to_string())?;
    let date = parse_date(date)?;
    to_json(&slot_engine::compute_drop_zones(&appointments, provider_id, date))
}

fn compute_all_drop_zones_json(schedule_json: &str, date: &str) -> Result<String, String> {
    let schedule = parse_schedule(schedule_json)?;
    let date = parse_date(date)?;
    to_json(&availability::compute_all_drop_zones(&schedule, date))
}

fn evaluate_drop_json(
    schedule_json: &str,
    appointment_id: &str,
    target_provider_id: &str,
    raw_minutes: i64,
    config_json: Option<&str>,
) -> Result<String, String> {
    let schedule = parse_schedule(schedule_json)?;
    let config = parse_config(config_json)?;
    let dragged = schedule
        .require_appointment(appointment_id)
        .map_err(|e| e.to_string())?;

    let outcome = slot_engine::evaluate_drop_with(
        &config,
        &schedule.appointments,
        &schedule.providers,
        dragged,
        target_provider_id,
        raw_minutes,
    );
    to_json(&outcome)
}

fn resolve_conflict_json(
    strategy: &str,
    conflict_json: &str,
    schedule_json: &str,
    config_json: Option<&str>,
) -> Result<String, String> {
    let strategy: ResolutionStrategy = strategy.parse().map_err(|e: slot_engine::SlotError| e.to_string())?;
    let payload: ConflictPayload = serde_json::from_str(conflict_json)
        .map_err(|e| format!("Invalid conflict JSON: {}", e))?;
    let schedule = parse_schedule(schedule_json)?;
    let config = parse_config(config_json)?;

    let commands = slot_engine::resolve_conflict(
        strategy,
        &payload.pending,
        &payload.conflict,
        &schedule.appointments,
        &config,
    )
    .map_err(|e| e.to_string())?;
    to_json(&commands)
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Drop zones for one provider on `date` (`YYYY-MM-DD`).
///
/// `appointments_json` is a JSON array of appointments. Returns a JSON array of
/// `{providerId, startMinutes, endMinutes, isValid}` objects.
#[wasm_bindgen(js_name = "computeDropZones")]
pub fn compute_drop_zones(
    appointments_json: &str,
    provider_id: &str,
    date: &str,
) -> Result<String, JsValue> {
    compute_drop_zones_json(appointments_json, provider_id, date).map_err(|e| JsValue::from_str(&e))
}

/// Drop zones for every provider of a `{providers, appointments}` snapshot,
/// ordered by display name.
#[wasm_bindgen(js_name = "computeAllDropZones")]
pub fn compute_all_drop_zones(schedule_json: &str, date: &str) -> Result<String, JsValue> {
    compute_all_drop_zones_json(schedule_json, date).map_err(|e| JsValue::from_str(&e))
}

/// Evaluate dropping `appointment_id` on `target_provider_id` at `raw_minutes`.
///
/// Returns a JSON object tagged by `outcome`: `move` with a `command`,
/// `conflict` with `conflict` and `pending`, or `rejected` with a `reason`.
#[wasm_bindgen(js_name = "evaluateDrop")]
pub fn evaluate_drop(
    schedule_json: &str,
    appointment_id: &str,
    target_provider_id: &str,
    raw_minutes: i32,
    config_json: Option<String>,
) -> Result<String, JsValue> {
    evaluate_drop_json(
        schedule_json,
        appointment_id,
        target_provider_id,
        i64::from(raw_minutes),
        config_json.as_deref(),
    )
    .map_err(|e| JsValue::from_str(&e))
}

/// Settle a conflict returned by `evaluateDrop`.
///
/// `strategy` is one of `cancel`, `force`, `swap`, `move-next`. Returns a JSON
/// array of move commands.
#[wasm_bindgen(js_name = "resolveConflict")]
pub fn resolve_conflict(
    strategy: &str,
    conflict_json: &str,
    schedule_json: &str,
    config_json: Option<String>,
) -> Result<String, JsValue> {
    resolve_conflict_json(strategy, conflict_json, schedule_json, config_json.as_deref())
        .map_err(|e| JsValue::from_str(&e))
}

#[wasm_bindgen(js_name = "snapToQuarterHour")]
pub fn snap_to_quarter_hour(minutes: i32) -> i32 {
    slot_engine::time::snap_to_quarter_hour(i64::from(minutes)) as i32
}

/// Minutes since midnight of the first `HH:MM` in the string; 0 if none.
#[wasm_bindgen(js_name = "timeToMinutes")]
pub fn time_to_minutes(time_str: &str) -> i32 {
    slot_engine::time::time_to_minutes(time_str) as i32
}

#[wasm_bindgen(js_name = "minutesToTime")]
pub fn minutes_to_time(minutes: i32) -> String {
    slot_engine::time::minutes_to_time(i64::from(minutes))
}
