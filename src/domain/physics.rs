/// Collision and movement predicates.
///
/// Everything here is a pure function over scalars so the tick code,
/// the generator, and the tests all go through the same arithmetic.
/// Intervals are expressed as center + half-extent, matching the entities.

use super::entity::{Platform, Player, PowerUp};

/// Do two center/half-extent intervals overlap?
#[inline]
pub fn spans_overlap(ca: f32, ha: f32, cb: f32, hb: f32) -> bool {
    ca + ha > cb - hb && ca - ha < cb + hb
}

/// Is the player's lower edge inside the platform's vertical band?
/// This is the landing test: only the feet matter, not the whole body,
/// so a platform can be passed from below on the way up.
#[inline]
pub fn feet_in_band(player: &Player, platform: &Platform) -> bool {
    let feet = player.y - player.half_h();
    feet < platform.y + platform.half_h() && feet > platform.y - platform.half_h()
}

/// Full landing check (x overlap + feet in band). Direction of travel is
/// the caller's business; this is geometry only.
#[inline]
pub fn lands_on(player: &Player, platform: &Platform) -> bool {
    spans_overlap(player.x, player.half_w(), platform.x, platform.half_w())
        && feet_in_band(player, platform)
}

/// Two-axis AABB overlap between the player and a power-up.
#[inline]
pub fn touches_powerup(player: &Player, pu: &PowerUp) -> bool {
    spans_overlap(player.x, player.half_w(), pu.x, pu.half())
        && spans_overlap(player.y, player.half_h(), pu.y, pu.half())
}

/// The y the player rests at after landing on `platform`.
#[inline]
pub fn rest_height(player: &Player, platform: &Platform) -> f32 {
    platform.y + platform.half_h() + player.half_h()
}

/// Wrap a horizontal position across the arena edges. The half-width margin
/// lets the sprite leave the screen completely before it re-enters on the
/// other side.
#[inline]
pub fn wrap_x(x: f32, half_w: f32, arena_w: f32) -> f32 {
    if x > arena_w + half_w {
        -half_w
    } else if x < -half_w {
        arena_w + half_w
    } else {
        x
    }
}

/// Reflect a drifting platform at the arena edges. Returns the new
/// (x, vel_x). The turnaround is a plain sign flip, not a physical rebound.
#[inline]
pub fn drift(x: f32, vel_x: f32, half_w: f32, arena_w: f32) -> (f32, f32) {
    let nx = x + vel_x;
    if nx < half_w || nx > arena_w - half_w {
        (nx, -vel_x)
    } else {
        (nx, vel_x)
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::PlatformKind;

    fn player_at(x: f32, y: f32) -> Player {
        Player::new(x, y, 50.0, 60.0)
    }

    fn platform_at(x: f32, y: f32) -> Platform {
        Platform::new(x, y, 60.0, 10.0, PlatformKind::Static)
    }

    // ── spans_overlap ──

    #[test]
    fn spans_touching_edges_do_not_overlap() {
        // [0,10] vs [10,20]: shared edge only
        assert!(!spans_overlap(5.0, 5.0, 15.0, 5.0));
        assert!(spans_overlap(5.0, 5.0, 14.0, 5.0));
    }

    // ── landing geometry (scenario from the original tuning) ──

    #[test]
    fn falling_player_lands_and_rests_on_top() {
        // Player at y=200, feet at 170; platform at y=190 spans x ∈ [180,240],
        // vertical band [185,195]. Feet at 170 are below the band, so no hit —
        // but once the player has fallen to y=200 with feet inside the band:
        let p = player_at(200.0, 200.0);
        let plat = platform_at(210.0, 190.0);
        // feet = 200 - 30 = 170 → below band
        assert!(!feet_in_band(&p, &plat));

        let p = player_at(200.0, 222.0); // feet = 192, inside [185,195]
        assert!(lands_on(&p, &plat));
        assert_eq!(rest_height(&p, &plat), 225.0); // 190 + 5 + 30
    }

    #[test]
    fn no_landing_without_x_overlap() {
        let p = player_at(100.0, 222.0); // body [75,125], platform [180,240]
        let plat = platform_at(210.0, 190.0);
        assert!(feet_in_band(&p, &plat));
        assert!(!lands_on(&p, &plat));
    }

    // ── power-up overlap ──

    #[test]
    fn powerup_touch_is_two_axis() {
        let p = player_at(200.0, 300.0);
        let near = PowerUp::new(220.0, 310.0, 20.0);
        let same_x_far_y = PowerUp::new(200.0, 400.0, 20.0);
        assert!(touches_powerup(&p, &near));
        assert!(!touches_powerup(&p, &same_x_far_y));
    }

    // ── wrapping ──

    #[test]
    fn wraps_only_past_the_margin() {
        // arena 400, half-width 25
        assert_eq!(wrap_x(426.0, 25.0, 400.0), -25.0);
        assert_eq!(wrap_x(-26.0, 25.0, 400.0), 425.0);
        // Inside the margin: untouched
        assert_eq!(wrap_x(410.0, 25.0, 400.0), 410.0);
        assert_eq!(wrap_x(-10.0, 25.0, 400.0), -10.0);
    }

    // ── drifting platforms ──

    #[test]
    fn drift_reflects_at_edges() {
        // Heading right into the right edge (arena 400, half 30)
        let (x, v) = drift(369.0, 2.0, 30.0, 400.0);
        assert_eq!(x, 371.0);
        assert_eq!(v, -2.0);

        // Free travel keeps the velocity
        let (x, v) = drift(200.0, 2.0, 30.0, 400.0);
        assert_eq!(x, 202.0);
        assert_eq!(v, 2.0);

        // Heading left into the left edge
        let (_, v) = drift(31.0, -2.0, 30.0, 400.0);
        assert_eq!(v, 2.0);
    }
}
