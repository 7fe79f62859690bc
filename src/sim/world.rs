/// WorldState: the complete snapshot of a running session.
///
/// One explicit struct owns every entity, the camera, the score, and the
/// RNG; it is created at startup, reset in place on each new run, and
/// dropped on exit. Nothing else holds game state.
///
/// ## Camera
///
/// The camera is a single scalar: the world y of the bottom of the visible
/// window. It ratchets — `follow` only ever raises it — and is reset to 0
/// when a run starts. The renderer maps
/// `screen_row = f(world_y - camera.y)`.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::{GameConfig, GeneratorConfig, PhysicsConfig, SpeedConfig, WorldConfig};
use crate::domain::entity::{Platform, Player, PowerUp};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Menu,
    Playing,
    GameOver,
}

/// One-directional scroll offset. `y` is the world height of the window's
/// bottom edge.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub y: f32,
}

impl Camera {
    pub fn new() -> Self {
        Camera { y: 0.0 }
    }

    /// Raise the window so the player sits at its vertical midpoint.
    /// Never lowers it: falling does not scroll the world back down.
    pub fn follow(&mut self, player_y: f32, view_h: f32) {
        if player_y > self.y + view_h / 2.0 {
            self.y = player_y - view_h / 2.0;
        }
    }
}

pub struct WorldState {
    // ── Entities ──
    pub player: Player,
    /// Sorted by strictly increasing y: the generator only appends above
    /// the previous top, and pruning is stable.
    pub platforms: Vec<Platform>,
    pub power_ups: Vec<PowerUp>,

    // ── Scroll / scoring ──
    pub camera: Camera,
    pub score: u32,
    /// Best score of any run this process. Never written down anywhere.
    pub high_score: u32,

    // ── Meta ──
    pub phase: Phase,
    pub tick: u64,
    /// Free-running counter for menu/game-over blink animations.
    pub anim_tick: u32,

    // ── Tuning (copied out of GameConfig at startup) ──
    pub speed: SpeedConfig,
    pub arena: WorldConfig,
    pub physics: PhysicsConfig,
    pub generator: GeneratorConfig,

    // ── Randomness ──
    pub rng: StdRng,
}

impl WorldState {
    pub fn new(config: &GameConfig) -> Self {
        WorldState {
            player: Player::new(
                config.world.width / 2.0,
                config.world.height / 5.0,
                config.physics.player_width,
                config.physics.player_height,
            ),
            platforms: vec![],
            power_ups: vec![],
            camera: Camera::new(),
            score: 0,
            high_score: 0,
            phase: Phase::Menu,
            tick: 0,
            anim_tick: 0,
            speed: config.speed.clone(),
            arena: config.world.clone(),
            physics: config.physics.clone(),
            generator: config.generator.clone(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Background stage index 0..=3, advancing every 100 points.
    /// Drives the renderer's sky color cycle.
    pub fn stage(&self) -> u32 {
        (self.score / 100) % 4
    }

    /// Has the player dropped out of the camera window?
    /// Strict comparison: a player exactly at the boundary is still alive.
    pub fn fallen_out(&self) -> bool {
        self.player.y < self.camera.y - self.player.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    #[test]
    fn camera_only_ratchets_upward() {
        let mut cam = Camera::new();
        cam.follow(500.0, 600.0); // player above midpoint → raise to 200
        assert_eq!(cam.y, 200.0);
        cam.follow(100.0, 600.0); // player fell → camera stays
        assert_eq!(cam.y, 200.0);
        cam.follow(900.0, 600.0);
        assert_eq!(cam.y, 600.0);
    }

    #[test]
    fn fall_boundary_is_strict() {
        let mut w = WorldState::new(&GameConfig::default_values());
        w.camera.y = 100.0;
        w.player.y = 40.0; // 40 < 100 - 60 = 40 is false
        assert!(!w.fallen_out());
        w.player.y = 39.0;
        assert!(w.fallen_out());
    }

    #[test]
    fn stage_cycles_every_400_points() {
        let mut w = WorldState::new(&GameConfig::default_values());
        w.score = 250;
        assert_eq!(w.stage(), 2);
        w.score = 399;
        assert_eq!(w.stage(), 3);
        w.score = 400;
        assert_eq!(w.stage(), 0);
    }
}
