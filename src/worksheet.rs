//! Lab worksheet: trial records and answer checking
//!
//! Each collision mode has its own table of three trials. A trial is filled
//! from a finished run in one go and never updated by later runs; students
//! then type their own momentum values next to the computed ones.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::consts::{TRIALS_PER_MODE, VALIDATION_TOLERANCE};
use crate::error::LabError;
use crate::measure::{LinearMeasurement, PlanarMeasurement, percent_difference};
use crate::sim::{Capture, CollisionMode};

/// Parse a worksheet field as a finite number
pub fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Accept `user` when it is within 5% of `reference`
#[inline]
pub fn within_tolerance(user: f64, reference: f64) -> bool {
    (user - reference).abs() <= VALIDATION_TOLERANCE * reference.abs()
}

/// Check a typed answer against a reference value; unparseable input is
/// simply not a match
pub fn validate(user: &str, reference: &str) -> bool {
    match (parse_number(user), parse_number(reference)) {
        (Some(u), Some(r)) => within_tolerance(u, r),
        _ => false,
    }
}

/// Before or after the collision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Before,
    After,
}

/// Launched puck A or target puck B
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Puck {
    A,
    B,
}

impl Puck {
    pub fn index(self) -> usize {
        match self {
            Puck::A => 0,
            Puck::B => 1,
        }
    }
}

/// Answer fields a student fills in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryField {
    /// Momentum magnitude (1-D trials)
    Momentum,
    /// Momentum x component (2-D trials)
    MomentumX,
    /// Momentum y component (2-D trials)
    MomentumY,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearReading {
    #[serde(flatten)]
    pub measured: LinearMeasurement,
    /// Student's momentum, as typed
    #[serde(default)]
    pub entered: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanarReading {
    #[serde(flatten)]
    pub measured: PlanarMeasurement,
    #[serde(default)]
    pub entered_x: String,
    #[serde(default)]
    pub entered_y: String,
}

/// Head-on trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearTrial {
    pub mass_g: [f64; 2],
    pub before: [LinearReading; 2],
    pub after: [LinearReading; 2],
}

/// Glancing trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanarTrial {
    pub mass_g: [f64; 2],
    pub before: [PlanarReading; 2],
    pub after: [PlanarReading; 2],
}

/// One worksheet row set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode")]
pub enum TrialRecord {
    #[serde(rename = "1D")]
    OneD(LinearTrial),
    #[serde(rename = "2D")]
    TwoD(PlanarTrial),
}

impl TrialRecord {
    /// Build a record from the captured pre/post collision state
    pub fn from_captures(mode: CollisionMode, before: &Capture, after: &Capture) -> Self {
        match mode {
            CollisionMode::OneD => {
                let reading = |c: &Capture, i: usize| LinearReading {
                    measured: LinearMeasurement::from_velocity(c.vel[i], c.mass_g[i]),
                    entered: String::new(),
                };
                TrialRecord::OneD(LinearTrial {
                    mass_g: before.mass_g,
                    before: [reading(before, 0), reading(before, 1)],
                    after: [reading(after, 0), reading(after, 1)],
                })
            }
            CollisionMode::TwoD => {
                let reading = |c: &Capture, i: usize| PlanarReading {
                    measured: PlanarMeasurement::from_velocity(c.vel[i], c.mass_g[i]),
                    entered_x: String::new(),
                    entered_y: String::new(),
                };
                TrialRecord::TwoD(PlanarTrial {
                    mass_g: before.mass_g,
                    before: [reading(before, 0), reading(before, 1)],
                    after: [reading(after, 0), reading(after, 1)],
                })
            }
        }
    }

    pub fn mode(&self) -> CollisionMode {
        match self {
            TrialRecord::OneD(_) => CollisionMode::OneD,
            TrialRecord::TwoD(_) => CollisionMode::TwoD,
        }
    }

    fn field_error(&self, field: EntryField) -> LabError {
        LabError::FieldNotInMode {
            field,
            mode: self.mode(),
        }
    }

    fn slot_mut(
        &mut self,
        stage: Stage,
        puck: Puck,
        field: EntryField,
    ) -> Result<&mut String, LabError> {
        let err = self.field_error(field);
        let i = puck.index();
        match (self, field) {
            (TrialRecord::OneD(t), EntryField::Momentum) => Ok(match stage {
                Stage::Before => &mut t.before[i].entered,
                Stage::After => &mut t.after[i].entered,
            }),
            (TrialRecord::TwoD(t), EntryField::MomentumX | EntryField::MomentumY) => {
                let reading = match stage {
                    Stage::Before => &mut t.before[i],
                    Stage::After => &mut t.after[i],
                };
                Ok(if field == EntryField::MomentumX {
                    &mut reading.entered_x
                } else {
                    &mut reading.entered_y
                })
            }
            _ => Err(err),
        }
    }

    /// Store a student's answer as typed
    pub fn set_entry(
        &mut self,
        stage: Stage,
        puck: Puck,
        field: EntryField,
        value: impl Into<String>,
    ) -> Result<(), LabError> {
        *self.slot_mut(stage, puck, field)? = value.into();
        Ok(())
    }

    /// The student's answer as typed
    pub fn entry(&self, stage: Stage, puck: Puck, field: EntryField) -> Result<&str, LabError> {
        let i = puck.index();
        let text: &String = match (self, field) {
            (TrialRecord::OneD(t), EntryField::Momentum) => match stage {
                Stage::Before => &t.before[i].entered,
                Stage::After => &t.after[i].entered,
            },
            (TrialRecord::TwoD(t), EntryField::MomentumX) => match stage {
                Stage::Before => &t.before[i].entered_x,
                Stage::After => &t.after[i].entered_x,
            },
            (TrialRecord::TwoD(t), EntryField::MomentumY) => match stage {
                Stage::Before => &t.before[i].entered_y,
                Stage::After => &t.after[i].entered_y,
            },
            _ => return Err(self.field_error(field)),
        };
        Ok(text.as_str())
    }

    /// Computed value the answer is checked against
    pub fn expected(&self, stage: Stage, puck: Puck, field: EntryField) -> Result<f64, LabError> {
        let i = puck.index();
        match (self, field) {
            (TrialRecord::OneD(t), EntryField::Momentum) => Ok(match stage {
                Stage::Before => t.before[i].measured.momentum,
                Stage::After => t.after[i].measured.momentum,
            }),
            (TrialRecord::TwoD(t), EntryField::MomentumX) => Ok(match stage {
                Stage::Before => t.before[i].measured.momentum_x,
                Stage::After => t.after[i].measured.momentum_x,
            }),
            (TrialRecord::TwoD(t), EntryField::MomentumY) => Ok(match stage {
                Stage::Before => t.before[i].measured.momentum_y,
                Stage::After => t.after[i].measured.momentum_y,
            }),
            _ => Err(self.field_error(field)),
        }
    }

    /// Whether the student's answer is within tolerance
    pub fn check_entry(
        &self,
        stage: Stage,
        puck: Puck,
        field: EntryField,
    ) -> Result<bool, LabError> {
        let expected = self.expected(stage, puck, field)?;
        let entered = self.entry(stage, puck, field)?;
        Ok(parse_number(entered).is_some_and(|v| within_tolerance(v, expected)))
    }

    /// System momentum (kg·cm/s); 1-D trials report the scalar sum on x
    pub fn total_momentum(&self, stage: Stage) -> DVec2 {
        match self {
            TrialRecord::OneD(t) => {
                let readings = match stage {
                    Stage::Before => &t.before,
                    Stage::After => &t.after,
                };
                DVec2::new(readings.iter().map(|r| r.measured.momentum).sum(), 0.0)
            }
            TrialRecord::TwoD(t) => {
                let readings = match stage {
                    Stage::Before => &t.before,
                    Stage::After => &t.after,
                };
                readings
                    .iter()
                    .map(|r| DVec2::new(r.measured.momentum_x, r.measured.momentum_y))
                    .sum()
            }
        }
    }

    /// How far the system momentum drifted across the collision (%)
    pub fn conservation_error_percent(&self) -> Option<f64> {
        percent_difference(
            self.total_momentum(Stage::Before).length(),
            self.total_momentum(Stage::After).length(),
        )
    }
}

/// Both trial tables
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Worksheet {
    pub one_d: [Option<TrialRecord>; TRIALS_PER_MODE],
    pub two_d: [Option<TrialRecord>; TRIALS_PER_MODE],
}

impl Worksheet {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, mode: CollisionMode) -> &[Option<TrialRecord>; TRIALS_PER_MODE] {
        match mode {
            CollisionMode::OneD => &self.one_d,
            CollisionMode::TwoD => &self.two_d,
        }
    }

    fn table_mut(&mut self, mode: CollisionMode) -> &mut [Option<TrialRecord>; TRIALS_PER_MODE] {
        match mode {
            CollisionMode::OneD => &mut self.one_d,
            CollisionMode::TwoD => &mut self.two_d,
        }
    }

    /// Write a record into its mode's table, replacing whatever was there
    pub fn commit(&mut self, index: usize, record: TrialRecord) -> Result<&TrialRecord, LabError> {
        let slot = self
            .table_mut(record.mode())
            .get_mut(index)
            .ok_or(LabError::TrialOutOfRange(index))?;
        let stored: &TrialRecord = slot.insert(record);
        Ok(stored)
    }

    pub fn trial(&self, mode: CollisionMode, index: usize) -> Result<&TrialRecord, LabError> {
        self.table(mode)
            .get(index)
            .ok_or(LabError::TrialOutOfRange(index))?
            .as_ref()
            .ok_or(LabError::EmptyTrial(index))
    }

    pub fn trial_mut(
        &mut self,
        mode: CollisionMode,
        index: usize,
    ) -> Result<&mut TrialRecord, LabError> {
        self.table_mut(mode)
            .get_mut(index)
            .ok_or(LabError::TrialOutOfRange(index))?
            .as_mut()
            .ok_or(LabError::EmptyTrial(index))
    }

    /// Number of filled trials for a mode
    pub fn completed(&self, mode: CollisionMode) -> usize {
        self.table(mode).iter().filter(|t| t.is_some()).count()
    }
}
