/// World generator: keeps a strip of platforms ahead of the camera and
/// retires what scrolls away below.
///
/// Invariant maintained here: `world.platforms` is sorted by strictly
/// increasing y. `spawn_initial` builds it that way, `extend` only appends
/// above the current top, and `prune` is stable. The landing scan in
/// `step.rs` relies on this order for its lowest-platform-wins tie-break.

use rand::rngs::StdRng;
use rand::Rng;

use crate::config::{GeneratorConfig, WorldConfig};
use crate::domain::entity::{Platform, PlatformKind, PowerUp};
use super::world::WorldState;

/// Vertical band the three starting power-ups are scattered into.
const STARTING_POWERUP_BAND: std::ops::Range<f32> = 200.0..1200.0;
const STARTING_POWERUPS: usize = 3;

/// y of the guaranteed anchor platform under the spawn point.
const ANCHOR_Y: f32 = 50.0;

/// How far above the top platform a fresh power-up appears.
const POWERUP_LEAD: f32 = 50.0;

/// Build the starting field: a fixed anchor platform centered under the
/// player, then `initial_platforms - 1` more at `spacing` intervals, plus a
/// few power-ups scattered through the opening climb.
pub fn spawn_initial(world: &mut WorldState) {
    world.platforms.clear();
    world.power_ups.clear();

    let anchor = Platform::new(
        world.arena.width / 2.0,
        ANCHOR_Y,
        world.generator.platform_width,
        world.generator.platform_height,
        PlatformKind::Static,
    );
    world.platforms.push(anchor);

    let mut y = ANCHOR_Y;
    for _ in 1..world.generator.initial_platforms {
        y += world.generator.spacing;
        let p = roll_platform(&mut world.rng, &world.generator, &world.arena, y);
        world.platforms.push(p);
    }

    for _ in 0..STARTING_POWERUPS {
        let half = world.generator.powerup_size / 2.0;
        let x = world.rng.gen_range(half..world.arena.width - half);
        let py = world.rng.gen_range(STARTING_POWERUP_BAND);
        world.power_ups.push(PowerUp::new(x, py, world.generator.powerup_size));
    }
}

/// Top up the strip above the camera. Each appended platform pays out
/// `platform_score`; occasionally a power-up rides along just above the top.
///
/// Precondition: `spawn_initial` has run. An empty platform list here is a
/// programming defect, not a runtime condition.
pub fn extend(world: &mut WorldState) {
    assert!(
        !world.platforms.is_empty(),
        "extend called before spawn_initial: platform list is empty",
    );

    let ceiling = world.camera.y + world.arena.height + world.generator.spacing;
    while top_y(world) < ceiling {
        let y = top_y(world) + world.generator.spacing;
        let p = roll_platform(&mut world.rng, &world.generator, &world.arena, y);
        world.platforms.push(p);
        world.score += world.generator.platform_score;
    }

    if world.rng.gen_range(0..world.generator.powerup_chance) == 0 {
        let half = world.generator.powerup_size / 2.0;
        let x = world.rng.gen_range(half..world.arena.width - half);
        let y = top_y(world) + POWERUP_LEAD;
        world.power_ups.push(PowerUp::new(x, y, world.generator.powerup_size));
    }
}

/// Retire everything strictly below the camera's bottom edge (minus the
/// object's own extent). `retain` keeps survivor order intact.
pub fn prune(world: &mut WorldState) {
    let cam = world.camera.y;
    world.platforms.retain(|p| p.y >= cam - p.height);
    world.power_ups.retain(|pu| pu.y >= cam - pu.size);
}

/// Advance every drifting platform and reflect it at the arena edges.
/// Broken breakables are already non-Moving by construction, so no
/// broken-check is needed here.
pub fn drift_platforms(world: &mut WorldState) {
    let arena_w = world.arena.width;
    for p in &mut world.platforms {
        if let PlatformKind::Moving { vel_x } = p.kind {
            let (nx, nv) = crate::domain::physics::drift(p.x, vel_x, p.half_w(), arena_w);
            p.x = nx;
            p.kind = PlatformKind::Moving { vel_x: nv };
        }
    }
}

// ── Rolls ──

fn top_y(world: &WorldState) -> f32 {
    // Safe: callers assert non-empty
    world.platforms[world.platforms.len() - 1].y
}

/// A platform at height `y` with random x and a weighted random kind:
/// 20% moving, 20% breakable, 60% static.
fn roll_platform(rng: &mut StdRng, gen: &GeneratorConfig, arena: &WorldConfig, y: f32) -> Platform {
    let half = gen.platform_width / 2.0;
    let x = rng.gen_range(half..=arena.width - half);
    let kind = match rng.gen_range(0..10) {
        0 | 1 => PlatformKind::Moving { vel_x: gen.drift_speed },
        2 | 3 => PlatformKind::Breakable { broken: false },
        _ => PlatformKind::Static,
    };
    Platform::new(x, y, gen.platform_width, gen.platform_height, kind)
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use rand::SeedableRng;

    fn world_with_seed(seed: u64) -> WorldState {
        let mut w = WorldState::new(&GameConfig::default_values());
        w.rng = StdRng::seed_from_u64(seed);
        w
    }

    #[test]
    fn initial_field_is_nonempty_and_strictly_ascending() {
        let mut w = world_with_seed(1);
        spawn_initial(&mut w);
        assert_eq!(w.platforms.len(), 10);
        for pair in w.platforms.windows(2) {
            assert!(pair[0].y < pair[1].y);
        }
        assert_eq!(w.power_ups.len(), 3);
    }

    #[test]
    fn every_platform_stays_inside_the_arena() {
        // Many seeds, initial + extended generation
        for seed in 0..20 {
            let mut w = world_with_seed(seed);
            spawn_initial(&mut w);
            w.camera.y = 2000.0;
            extend(&mut w);
            for p in &w.platforms {
                assert!(p.x - p.half_w() >= 0.0, "seed {seed}: left edge {}", p.x);
                assert!(p.x + p.half_w() <= w.arena.width, "seed {seed}: right edge {}", p.x);
            }
            for pu in &w.power_ups {
                assert!(pu.x - pu.half() >= 0.0);
                assert!(pu.x + pu.half() <= w.arena.width);
            }
        }
    }

    #[test]
    fn extend_covers_the_window_plus_lead() {
        let mut w = world_with_seed(3);
        spawn_initial(&mut w);
        w.camera.y = 1500.0;
        extend(&mut w);
        let top = w.platforms.last().unwrap().y;
        assert!(top >= w.camera.y + w.arena.height);
        // ...and each step paid out
        assert!(w.score > 0);
        assert_eq!(w.score % w.generator.platform_score, 0);
    }

    #[test]
    fn extend_keeps_strict_ordering_and_spacing() {
        let mut w = world_with_seed(4);
        spawn_initial(&mut w);
        w.camera.y = 3000.0;
        extend(&mut w);
        for pair in w.platforms.windows(2) {
            assert_eq!(pair[1].y - pair[0].y, w.generator.spacing);
        }
    }

    #[test]
    #[should_panic(expected = "before spawn_initial")]
    fn extend_without_init_is_a_defect() {
        let mut w = world_with_seed(5);
        extend(&mut w);
    }

    #[test]
    fn prune_removes_exactly_the_sunken_and_keeps_order() {
        let mut w = world_with_seed(6);
        let gen = w.generator.clone();
        for i in 0..6 {
            w.platforms.push(Platform::new(
                100.0, i as f32 * 80.0,
                gen.platform_width, gen.platform_height,
                PlatformKind::Static,
            ));
        }
        w.power_ups.push(PowerUp::new(50.0, 100.0, gen.powerup_size));
        w.power_ups.push(PowerUp::new(60.0, 400.0, gen.powerup_size));

        w.camera.y = 200.0;
        prune(&mut w);

        // Platforms at y=0, 80, 160 are below 200 - 10 = 190 → gone.
        // y=160 < 190 → gone; y=240, 320, 400 survive.
        let ys: Vec<f32> = w.platforms.iter().map(|p| p.y).collect();
        assert_eq!(ys, vec![240.0, 320.0, 400.0]);
        // Power-up at 100 < 200 - 20 = 180 → gone; 400 stays.
        assert_eq!(w.power_ups.len(), 1);
        assert_eq!(w.power_ups[0].y, 400.0);
    }

    #[test]
    fn prune_boundary_is_strict() {
        let mut w = world_with_seed(7);
        let gen = w.generator.clone();
        // Exactly at camera_y - height: survives
        w.platforms.push(Platform::new(
            100.0, 190.0,
            gen.platform_width, gen.platform_height,
            PlatformKind::Static,
        ));
        w.camera.y = 200.0;
        prune(&mut w);
        assert_eq!(w.platforms.len(), 1);
    }

    #[test]
    fn drifting_platform_oscillates_between_edges() {
        let mut w = world_with_seed(8);
        let gen = w.generator.clone();
        w.platforms.push(Platform::new(
            w.arena.width - gen.platform_width / 2.0 - 1.0, 80.0,
            gen.platform_width, gen.platform_height,
            PlatformKind::Moving { vel_x: 2.0 },
        ));

        // Run long enough to bounce off both walls
        for _ in 0..1000 {
            drift_platforms(&mut w);
            let p = &w.platforms[0];
            assert!(p.x >= p.half_w() - 2.0 && p.x <= w.arena.width - p.half_w() + 2.0);
        }
        // Velocity must have flipped at least once
        match w.platforms[0].kind {
            PlatformKind::Moving { .. } => {}
            _ => panic!("kind changed"),
        }
    }
}
