#![cfg(target_arch = "wasm32")]

//! Browser bindings for the worksheet page
//!
//! Snapshots and trial records cross the boundary as JSON strings.

use std::sync::Once;

use wasm_bindgen::prelude::*;

use crate::controller::{FrameTicket, LabController};
use crate::error::LabError;
use crate::settings::LabSettings;
use crate::sim::CollisionMode;
use crate::worksheet::{EntryField, Puck, Stage};

static INIT: Once = Once::new();

fn init_logging() {
    INIT.call_once(|| {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);
    });
}

fn js_error(err: LabError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn parse_mode(mode: &str) -> Result<CollisionMode, JsValue> {
    CollisionMode::from_str(mode).ok_or_else(|| JsValue::from_str("mode must be '1D' or '2D'"))
}

fn parse_stage(stage: &str) -> Result<Stage, JsValue> {
    match stage {
        "before" => Ok(Stage::Before),
        "after" => Ok(Stage::After),
        _ => Err(JsValue::from_str("stage must be 'before' or 'after'")),
    }
}

fn parse_puck(puck: &str) -> Result<Puck, JsValue> {
    match puck {
        "A" | "a" => Ok(Puck::A),
        "B" | "b" => Ok(Puck::B),
        _ => Err(JsValue::from_str("puck must be 'A' or 'B'")),
    }
}

fn parse_field(field: &str) -> Result<EntryField, JsValue> {
    match field {
        "p" => Ok(EntryField::Momentum),
        "px" => Ok(EntryField::MomentumX),
        "py" => Ok(EntryField::MomentumY),
        _ => Err(JsValue::from_str("field must be 'p', 'px' or 'py'")),
    }
}

/// The simulator and worksheet as one JS object
#[wasm_bindgen]
pub struct CollisionLab {
    controller: LabController,
    ticket: Option<FrameTicket>,
    settings: LabSettings,
}

#[wasm_bindgen]
impl CollisionLab {
    #[wasm_bindgen(constructor)]
    pub fn new() -> CollisionLab {
        init_logging();
        let settings = LabSettings::load();
        let seed = js_sys::Date::now() as u64;
        log::info!("Collision lab ready ({} mode)", settings.mode);
        CollisionLab {
            controller: LabController::from_settings(&settings, seed),
            ticket: None,
            settings,
        }
    }

    pub fn start(&mut self, angle_deg: f64, speed: f64) {
        self.ticket = Some(self.controller.start(angle_deg, speed));
    }

    pub fn stop(&mut self) {
        self.ticket = None;
        self.controller.stop();
    }

    pub fn reset(&mut self) {
        self.ticket = None;
        self.controller.reset();
    }

    #[wasm_bindgen(js_name = setMode)]
    pub fn set_mode(&mut self, mode: &str) -> Result<(), JsValue> {
        let mode = parse_mode(mode)?;
        self.ticket = None;
        self.controller.set_mode(mode);
        self.remember_controls();
        Ok(())
    }

    #[wasm_bindgen(js_name = setAngle)]
    pub fn set_angle(&mut self, angle_deg: f64) {
        self.ticket = None;
        self.controller.set_angle(angle_deg);
        self.remember_controls();
    }

    #[wasm_bindgen(js_name = setSpeed)]
    pub fn set_speed(&mut self, speed: f64) {
        self.ticket = None;
        self.controller.set_speed(speed);
        self.remember_controls();
    }

    /// Advance one frame; call from requestAnimationFrame while it returns true
    pub fn frame(&mut self) -> bool {
        self.ticket = self.ticket.and_then(|t| self.controller.on_frame(t));
        self.ticket.is_some()
    }

    #[wasm_bindgen(js_name = getSnapshot)]
    pub fn get_snapshot(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.controller.snapshot())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(js_name = exportTrialData)]
    pub fn export_trial_data(&mut self, mode: &str, index: usize) -> Result<String, JsValue> {
        let mode = parse_mode(mode)?;
        let record = self.controller.export_trial_data(mode, index).map_err(js_error)?;
        serde_json::to_string(record).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(js_name = getWorksheet)]
    pub fn get_worksheet(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.controller.worksheet())
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Store a typed answer and report whether it is within tolerance
    #[wasm_bindgen(js_name = enterMomentum)]
    pub fn enter_momentum(
        &mut self,
        mode: &str,
        index: usize,
        stage: &str,
        puck: &str,
        field: &str,
        value: &str,
    ) -> Result<bool, JsValue> {
        let mode = parse_mode(mode)?;
        let (stage, puck, field) = (parse_stage(stage)?, parse_puck(puck)?, parse_field(field)?);
        let trial = self
            .controller
            .worksheet_mut()
            .trial_mut(mode, index)
            .map_err(js_error)?;
        trial.set_entry(stage, puck, field, value).map_err(js_error)?;
        trial.check_entry(stage, puck, field).map_err(js_error)
    }
}

impl CollisionLab {
    /// Persist the current launch controls as the next session's defaults
    fn remember_controls(&mut self) {
        self.settings.remember_controls(&self.controller.snapshot());
        self.settings.save();
    }
}

impl Default for CollisionLab {
    fn default() -> Self {
        Self::new()
    }
}

/// Check a typed answer against a reference value
#[wasm_bindgen]
pub fn validate(user: &str, reference: &str) -> bool {
    crate::worksheet::validate(user, reference)
}
