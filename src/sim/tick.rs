//! Per-frame simulation step
//!
//! One call advances the table by one animation frame (1/60 s).

use super::collision::{detect, reflect_off_walls, resolve_collision};
use super::state::{Capture, Simulation};
use crate::consts::*;

/// Advance the simulation by one frame
pub fn step(sim: &mut Simulation) {
    if !sim.running {
        return;
    }

    // Unit-step Euler integration
    for body in &mut sim.bodies {
        body.pos += body.vel;
    }

    for body in &mut sim.bodies {
        reflect_off_walls(body, TABLE_WIDTH, TABLE_HEIGHT);
    }

    resolve_pair(sim);

    // Air-table drag
    for body in &mut sim.bodies {
        body.vel *= FRICTION;
    }

    sim.frame += 1;
    if sim.frame % SPARK_INTERVAL_FRAMES == 0 {
        sim.record_spark();
    }

    if sim.has_collided && sim.kinetic_energy() < REST_ENERGY {
        for body in &mut sim.bodies {
            body.vel = glam::DVec2::ZERO;
        }
        sim.running = false;
        log::info!(
            "Pucks at rest after {} frames ({} collision(s))",
            sim.frame,
            sim.collision_count
        );
    }
}

/// Detect and resolve the puck-puck collision, capturing the first one
fn resolve_pair(sim: &mut Simulation) {
    let [a, b] = &sim.bodies;
    if !detect(a, b) {
        return;
    }

    let first = !sim.has_collided;
    let before = Capture::of(a, b);
    let e = sim.draw_restitution();

    let [a, b] = &mut sim.bodies;
    if !resolve_collision(a, b, e) {
        return;
    }
    sim.collision_count += 1;

    if first {
        sim.before = Some(before);
        sim.after = Some(Capture::of(a, b));
        sim.first_restitution = Some(e);
        sim.has_collided = true;
        log::info!(
            "Collision at frame {} (e = {:.3}): A {:?} -> {:?}, B {:?} -> {:?}",
            sim.frame,
            e,
            before.vel[0],
            a.vel,
            before.vel[1],
            b.vel
        );
    } else {
        log::debug!(
            "Collision #{} at frame {} (e = {:.3}), captures unchanged",
            sim.collision_count,
            sim.frame,
            e
        );
    }
}
