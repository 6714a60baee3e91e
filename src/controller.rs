//! Lab controller
//!
//! Owns the simulation and the worksheet, and is the only thing the UI talks
//! to. The UI schedules frames however it likes (animation callback, timer,
//! test loop) and hands back the ticket it was given; stopping or resetting
//! invalidates every outstanding ticket, so a late callback cannot step a run
//! that was already torn down.

use serde::{Deserialize, Serialize};

use crate::error::LabError;
use crate::settings::LabSettings;
use crate::sim::{Body, CollisionMode, Simulation, SparkDot, step};
use crate::worksheet::{TrialRecord, Worksheet};

/// Permission to run exactly one frame of the current run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameTicket {
    generation: u64,
}

/// Everything the table view needs to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub bodies: [Body; 2],
    pub trail: Vec<SparkDot>,
    pub running: bool,
    pub has_collided: bool,
    pub frame: u64,
    pub mode: CollisionMode,
    pub angle_deg: f64,
    pub speed: f64,
}

pub struct LabController {
    sim: Simulation,
    worksheet: Worksheet,
    generation: u64,
    show_trail: bool,
}

impl LabController {
    pub fn new(seed: u64) -> Self {
        Self::from_settings(&LabSettings::default(), seed)
    }

    /// Build a controller; `fallback_seed` is used when the settings carry none
    pub fn from_settings(settings: &LabSettings, fallback_seed: u64) -> Self {
        let seed = settings.seed.unwrap_or(fallback_seed);
        let mut sim = Simulation::new(seed, settings.mode)
            .with_restitution(settings.restitution)
            .with_mass_variation(settings.mass_variation_g);
        sim.set_angle(settings.angle_deg);
        sim.set_speed(settings.speed);
        Self {
            sim,
            worksheet: Worksheet::new(),
            generation: 0,
            show_trail: settings.show_trail,
        }
    }

    /// Invalidate every outstanding frame ticket
    fn cancel_frames(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    fn ticket(&self) -> FrameTicket {
        FrameTicket {
            generation: self.generation,
        }
    }

    /// Reset the table and launch with the given angle and speed
    pub fn start(&mut self, angle_deg: f64, speed: f64) -> FrameTicket {
        self.cancel_frames();
        self.sim.reset();
        self.sim.set_angle(angle_deg);
        self.sim.set_speed(speed);
        self.sim.launch();
        self.ticket()
    }

    /// Freeze the run where it is
    pub fn stop(&mut self) {
        self.cancel_frames();
        self.sim.running = false;
    }

    /// Put the pucks back on their marks
    pub fn reset(&mut self) {
        self.cancel_frames();
        self.sim.reset();
    }

    pub fn set_mode(&mut self, mode: CollisionMode) {
        self.reset();
        self.sim.set_mode(mode);
    }

    pub fn set_angle(&mut self, angle_deg: f64) {
        self.reset();
        self.sim.set_angle(angle_deg);
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.reset();
        self.sim.set_speed(speed);
    }

    /// Ticket for the next frame, if a run is in progress
    pub fn pending_frame(&self) -> Option<FrameTicket> {
        self.sim.running.then(|| self.ticket())
    }

    /// Run one frame; returns the ticket for the next one while the run lasts
    pub fn on_frame(&mut self, ticket: FrameTicket) -> Option<FrameTicket> {
        if ticket.generation != self.generation {
            log::debug!("Dropping stale frame ticket");
            return None;
        }
        step(&mut self.sim);
        self.pending_frame()
    }

    /// Drive frames until the run halts or `max_frames` have passed
    pub fn run_to_completion(&mut self, ticket: FrameTicket, max_frames: u64) -> u64 {
        let mut next = Some(ticket);
        let mut frames = 0;
        while let Some(ticket) = next {
            if frames >= max_frames {
                break;
            }
            next = self.on_frame(ticket);
            frames += 1;
        }
        frames
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            bodies: self.sim.bodies,
            trail: if self.show_trail {
                self.sim.trail.iter().copied().collect()
            } else {
                Vec::new()
            },
            running: self.sim.running,
            has_collided: self.sim.has_collided,
            frame: self.sim.frame,
            mode: self.sim.mode,
            angle_deg: self.sim.angle_deg,
            speed: self.sim.speed,
        }
    }

    /// Copy the last run's collision into a worksheet slot
    ///
    /// Nothing changes when the run has not collided yet.
    pub fn export_trial_data(
        &mut self,
        mode: CollisionMode,
        index: usize,
    ) -> Result<&TrialRecord, LabError> {
        let (Some(before), Some(after)) = (self.sim.before, self.sim.after) else {
            log::warn!("Trial export rejected: no collision yet");
            return Err(LabError::NoCollisionYet);
        };
        if self.sim.mode != mode {
            log::warn!("Trial export rejected: run was {}, table is {}", self.sim.mode, mode);
            return Err(LabError::ModeMismatch {
                run: self.sim.mode,
                requested: mode,
            });
        }

        let record = TrialRecord::from_captures(mode, &before, &after);
        let stored = self.worksheet.commit(index, record)?;
        log::info!(
            "Exported {} trial {} (momentum drift {:.2}%)",
            mode,
            index + 1,
            stored.conservation_error_percent().unwrap_or(0.0)
        );
        Ok(stored)
    }

    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    pub fn worksheet(&self) -> &Worksheet {
        &self.worksheet
    }

    pub fn worksheet_mut(&mut self) -> &mut Worksheet {
        &mut self.worksheet
    }
}
