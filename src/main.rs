//! Collision Lab headless runner
//!
//! Runs three trials per collision mode and prints the filled worksheet as
//! JSON. The browser build uses the `web` bindings instead.
//!
//! Usage: `collision-lab [settings.json]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Collision Lab (native) starting...");

    if let Err(e) = run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is the `CollisionLab` binding, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn run() -> Result<(), collision_lab::LabError> {
    use collision_lab::consts::TRIALS_PER_MODE;
    use collision_lab::{CollisionMode, LabController, LabSettings};

    let settings = match std::env::args().nth(1) {
        Some(path) => LabSettings::from_path(&path)?,
        None => LabSettings::default(),
    };
    let clock_seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default();
    let mut lab = LabController::from_settings(&settings, clock_seed);

    // Spread the 2-D shots across the aiming range
    let angles = [-10.0, 5.0, 12.0];
    for mode in [CollisionMode::OneD, CollisionMode::TwoD] {
        lab.set_mode(mode);
        for (index, angle) in angles.iter().enumerate().take(TRIALS_PER_MODE) {
            let ticket = lab.start(*angle, settings.speed);
            let frames = lab.run_to_completion(ticket, 100_000);
            log::info!("{mode} trial {} ran {frames} frames", index + 1);

            let record = lab.export_trial_data(mode, index)?;
            if let Some(drift) = record.conservation_error_percent() {
                log::info!("{mode} trial {}: momentum drift {drift:.2}%", index + 1);
            }
        }
    }

    println!("{}", serde_json::to_string_pretty(lab.worksheet())?);
    Ok(())
}
