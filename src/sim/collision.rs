//! Collision detection and response for round pucks
//!
//! Detection is a discrete circle-circle overlap test once per frame. A fast
//! puck can skip past a thin overlap between frames; at lab speeds the pucks
//! are far wider than one frame of travel.

use glam::DVec2;

use super::state::Body;
use crate::consts::WALL_DAMPING;

/// Check whether two pucks touch or overlap
#[inline]
pub fn detect(a: &Body, b: &Body) -> bool {
    a.pos.distance(b.pos) <= a.radius + b.radius
}

/// Unit normal pointing from `a` toward `b`
fn contact_normal(a: &Body, b: &Body) -> (DVec2, f64) {
    let delta = b.pos - a.pos;
    let dist = delta.length();
    if dist > f64::EPSILON {
        (delta / dist, dist)
    } else {
        // Coincident centres, any direction separates them
        (DVec2::X, 0.0)
    }
}

/// Resolve a puck-puck collision with restitution `e`
///
/// Applies the impulse along the line of centres, split by mass share, then
/// pushes each puck half the overlap apart. Returns false and leaves both
/// pucks untouched when they are already separating.
pub fn resolve_collision(a: &mut Body, b: &mut Body, e: f64) -> bool {
    let (normal, dist) = contact_normal(a, b);

    // Relative velocity along the normal (negative = approaching)
    let vn = (b.vel - a.vel).dot(normal);
    if vn >= 0.0 {
        return false;
    }

    let total_mass = a.mass_g + b.mass_g;
    let impulse = (1.0 + e) * vn / total_mass;
    a.vel += normal * impulse * b.mass_g;
    b.vel -= normal * impulse * a.mass_g;

    let overlap = a.radius + b.radius - dist;
    if overlap > 0.0 {
        let push = normal * (overlap / 2.0);
        a.pos -= push;
        b.pos += push;
    }

    true
}

/// Bounce a puck off the table edges
///
/// Any axis past `[radius, bound - radius]` has its velocity negated and
/// damped, and its position clamped back onto the table. Returns whether a
/// wall was hit.
pub fn reflect_off_walls(body: &mut Body, width: f64, height: f64) -> bool {
    let hit_x = reflect_axis(&mut body.pos.x, &mut body.vel.x, body.radius, width);
    let hit_y = reflect_axis(&mut body.pos.y, &mut body.vel.y, body.radius, height);
    hit_x || hit_y
}

fn reflect_axis(pos: &mut f64, vel: &mut f64, radius: f64, bound: f64) -> bool {
    if *pos - radius < 0.0 {
        *vel = -*vel * WALL_DAMPING;
        *pos = radius;
        true
    } else if *pos + radius > bound {
        *vel = -*vel * WALL_DAMPING;
        *pos = bound - radius;
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn puck(x: f64, y: f64, vx: f64, vy: f64, mass_g: f64) -> Body {
        Body {
            pos: DVec2::new(x, y),
            vel: DVec2::new(vx, vy),
            radius: 30.0,
            mass_g,
        }
    }

    fn normal_momentum(a: &Body, b: &Body, n: DVec2) -> f64 {
        a.mass_g * a.vel.dot(n) + b.mass_g * b.vel.dot(n)
    }

    #[test]
    fn test_detect_touching_counts() {
        let a = puck(100.0, 100.0, 0.0, 0.0, 505.0);
        let b = puck(160.0, 100.0, 0.0, 0.0, 505.0);
        assert!(detect(&a, &b));

        let c = puck(160.01, 100.0, 0.0, 0.0, 505.0);
        assert!(!detect(&a, &c));
    }

    #[test]
    fn test_elastic_equal_mass_head_on_swaps() {
        let mut a = puck(100.0, 100.0, 5.0, 0.0, 505.0);
        let mut b = puck(158.0, 100.0, 0.0, 0.0, 505.0);

        assert!(resolve_collision(&mut a, &mut b, 1.0));
        assert!(a.vel.length() < 1e-12);
        assert!((b.vel.x - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_restitution_scales_separation() {
        let mut a = puck(100.0, 100.0, 4.0, 0.0, 500.0);
        let mut b = puck(159.0, 100.0, -2.0, 0.0, 510.0);
        let e = 0.9;

        assert!(resolve_collision(&mut a, &mut b, e));
        // Separation speed = e * approach speed
        assert!(((b.vel.x - a.vel.x) - e * 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_overlap_split_evenly() {
        let mut a = puck(100.0, 100.0, 1.0, 0.0, 505.0);
        let mut b = puck(150.0, 100.0, 0.0, 0.0, 505.0);

        resolve_collision(&mut a, &mut b, 0.9);
        assert!((a.pos.x - 95.0).abs() < 1e-12);
        assert!((b.pos.x - 155.0).abs() < 1e-12);
        assert!((a.pos.distance(b.pos) - 60.0).abs() < 1e-12);
    }

    #[test]
    fn test_separating_contact_untouched() {
        let mut a = puck(100.0, 100.0, -1.0, 0.0, 505.0);
        let mut b = puck(150.0, 100.0, 1.0, 0.0, 505.0);
        let (a0, b0) = (a, b);

        assert!(!resolve_collision(&mut a, &mut b, 0.9));
        assert_eq!(a, a0);
        assert_eq!(b, b0);
    }

    #[test]
    fn test_glancing_conserves_normal_momentum() {
        let mut a = puck(100.0, 100.0, 5.0, 0.0, 502.0);
        let mut b = puck(150.0, 130.0, 0.0, 0.0, 508.0);
        let n = (b.pos - a.pos).normalize();
        let before = normal_momentum(&a, &b, n);

        assert!(resolve_collision(&mut a, &mut b, 0.88));
        assert!((normal_momentum(&a, &b, n) - before).abs() < 1e-9);
        // Target leaves along the line of centres
        assert!(b.vel.normalize().dot(n) > 0.999_999);
    }

    #[test]
    fn test_wall_reflection_right() {
        let mut body = puck(480.0, 200.0, 4.0, 1.0, 505.0);
        assert!(reflect_off_walls(&mut body, 500.0, 400.0));
        assert_eq!(body.pos.x, 470.0);
        assert!((body.vel.x - (-3.2)).abs() < 1e-12);
        assert_eq!(body.vel.y, 1.0);
    }

    #[test]
    fn test_wall_reflection_top_left_corner() {
        let mut body = puck(10.0, 5.0, -2.0, -3.0, 505.0);
        assert!(reflect_off_walls(&mut body, 500.0, 400.0));
        assert_eq!(body.pos, DVec2::new(30.0, 30.0));
        assert!((body.vel.x - 1.6).abs() < 1e-12);
        assert!((body.vel.y - 2.4).abs() < 1e-12);
    }

    #[test]
    fn test_wall_no_hit_inside() {
        let mut body = puck(250.0, 200.0, 3.0, 3.0, 505.0);
        let before = body;
        assert!(!reflect_off_walls(&mut body, 500.0, 400.0));
        assert_eq!(body, before);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn normal_momentum_conserved(
                m1 in 450.0f64..560.0,
                m2 in 450.0f64..560.0,
                v1x in -10.0f64..10.0,
                v1y in -10.0f64..10.0,
                v2x in -10.0f64..10.0,
                v2y in -10.0f64..10.0,
                offset_angle in 0.0f64..std::f64::consts::TAU,
                e in 0.0f64..=1.0,
            ) {
                let dir = DVec2::new(offset_angle.cos(), offset_angle.sin());
                let mut a = puck(250.0, 200.0, v1x, v1y, m1);
                let mut b = puck(250.0 + dir.x * 58.0, 200.0 + dir.y * 58.0, v2x, v2y, m2);
                let n = (b.pos - a.pos).normalize();
                let p_before = normal_momentum(&a, &b, n);
                let vn_before = (b.vel - a.vel).dot(n);

                if resolve_collision(&mut a, &mut b, e) {
                    prop_assert!((normal_momentum(&a, &b, n) - p_before).abs() < 1e-7);
                    let vn_after = (b.vel - a.vel).dot(n);
                    prop_assert!((vn_after + e * vn_before).abs() < 1e-9);
                    // Tangential velocities are untouched
                    let t = n.perp();
                    prop_assert!((a.vel.dot(t) - DVec2::new(v1x, v1y).dot(t)).abs() < 1e-9);
                    prop_assert!((b.vel.dot(t) - DVec2::new(v2x, v2y).dot(t)).abs() < 1e-9);
                } else {
                    prop_assert!(vn_before >= 0.0);
                }
            }

            #[test]
            fn separating_contact_is_noop(
                vx in -10.0f64..10.0,
                vy in -10.0f64..10.0,
                away in 0.0f64..10.0,
            ) {
                // b moves away from a along +x at least as fast as a follows
                let mut a = puck(200.0, 200.0, vx, vy, 505.0);
                let mut b = puck(250.0, 200.0, vx + away, vy, 505.0);
                let (a0, b0) = (a, b);

                prop_assert!(!resolve_collision(&mut a, &mut b, 0.9));
                prop_assert_eq!(a, a0);
                prop_assert_eq!(b, b0);
            }
        }
    }
}
