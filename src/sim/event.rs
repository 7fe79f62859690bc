/// Events emitted during a simulation step.
/// The presentation layer consumes these for sound; the renderer reads
/// world state directly.

#[derive(Clone, Debug)]
#[allow(dead_code)]
pub enum GameEvent {
    Bounced { boosted: bool },
    PlatformBroken { x: f32, y: f32 },
    BoostPicked,
    BoostExpired,
    NewHighScore { score: u32 },
    Fell,
}
