//! Lab settings
//!
//! Persisted in LocalStorage on the web; read from a JSON file natively.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::controller::FrameSnapshot;
use crate::error::LabError;
use crate::sim::{CollisionMode, Restitution};

/// Lab configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabSettings {
    /// Fixed seed for reproducible runs (None = seed from the clock)
    pub seed: Option<u64>,
    /// Mode selected when the lab opens
    pub mode: CollisionMode,
    /// Launch angle (degrees, 2-D only)
    pub angle_deg: f64,
    /// Launch speed (px/frame)
    pub speed: f64,
    /// How restitution is drawn per collision
    pub restitution: Restitution,
    /// Launch mass jitter (g, +/-)
    pub mass_variation_g: f64,
    /// Draw the spark-dot trail
    pub show_trail: bool,
}

impl Default for LabSettings {
    fn default() -> Self {
        Self {
            seed: None,
            mode: CollisionMode::OneD,
            angle_deg: 0.0,
            speed: LAUNCH_SPEED_DEFAULT,
            restitution: Restitution::default(),
            mass_variation_g: MASS_VARIATION_G,
            show_trail: true,
        }
    }
}

impl LabSettings {
    /// Parse settings from JSON (missing fields take defaults)
    pub fn from_json(json: &str) -> Result<Self, LabError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validated()
    }

    pub fn to_json(&self) -> Result<String, LabError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulator cannot use
    fn validated(self) -> Result<Self, LabError> {
        if !self.speed.is_finite() || !self.angle_deg.is_finite() {
            return Err(LabError::Settings("launch angle and speed must be numbers".into()));
        }
        if !(self.mass_variation_g >= 0.0 && self.mass_variation_g < PUCK_MASS_G) {
            return Err(LabError::Settings(format!(
                "mass variation {} g out of range",
                self.mass_variation_g
            )));
        }
        let e_range = match self.restitution {
            Restitution::Fixed(e) => (e, e),
            Restitution::Random { center, spread } => (center - spread, center + spread),
        };
        if !(e_range.0 >= 0.0 && e_range.1 <= 1.0) {
            return Err(LabError::Settings(format!(
                "restitution must stay within 0..=1, got {:.3}..={:.3}",
                e_range.0, e_range.1
            )));
        }
        Ok(self)
    }

    /// Keep the launch controls shown in a snapshot as the next session's defaults
    pub fn remember_controls(&mut self, snapshot: &FrameSnapshot) {
        self.mode = snapshot.mode;
        self.angle_deg = snapshot.angle_deg;
        self.speed = snapshot.speed;
    }

    /// Read settings from a JSON file
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_path(path: impl AsRef<std::path::Path>) -> Result<Self, LabError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "collision_lab_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {e}"),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }
}
