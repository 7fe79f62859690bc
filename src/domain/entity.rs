/// Entities: Player, Platform, PowerUp.
///
/// All positions are center points in world units; y grows upward.
/// Extents are stored per entity so collision code never reaches
/// back into the config.

/// What a platform does, as a tagged variant.
/// A broken Moving platform or a drifting Breakable one cannot be expressed,
/// which is the point.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum PlatformKind {
    Static,
    Moving { vel_x: f32 },
    Breakable { broken: bool },
}

#[derive(Clone, Copy, Debug)]
pub struct Platform {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub kind: PlatformKind,
}

impl Platform {
    pub fn new(x: f32, y: f32, width: f32, height: f32, kind: PlatformKind) -> Self {
        Platform { x, y, width, height, kind }
    }

    #[inline]
    pub fn half_w(&self) -> f32 {
        self.width / 2.0
    }

    #[inline]
    pub fn half_h(&self) -> f32 {
        self.height / 2.0
    }

    /// A broken breakable is permanently out of play: no collision, no draw.
    #[inline]
    pub fn collidable(&self) -> bool {
        !matches!(self.kind, PlatformKind::Breakable { broken: true })
    }

    /// Mark a breakable platform broken. Returns true if it broke just now.
    pub fn crumble(&mut self) -> bool {
        match self.kind {
            PlatformKind::Breakable { broken: false } => {
                self.kind = PlatformKind::Breakable { broken: true };
                true
            }
            _ => false,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct PowerUp {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub active: bool,
}

impl PowerUp {
    pub fn new(x: f32, y: f32, size: f32) -> Self {
        PowerUp { x, y, size, active: true }
    }

    #[inline]
    pub fn half(&self) -> f32 {
        self.size / 2.0
    }
}

/// The avatar. `boost_ticks > 0` means the spring boost is live; a single
/// countdown replaces a flag + timer pair so the two can never disagree.
#[derive(Clone, Copy, Debug)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub vel_x: f32,
    pub vel_y: f32,
    pub width: f32,
    pub height: f32,
    pub boost_ticks: u32,
}

impl Player {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Player {
            x, y,
            vel_x: 0.0,
            vel_y: 0.0,
            width, height,
            boost_ticks: 0,
        }
    }

    #[inline]
    pub fn half_w(&self) -> f32 {
        self.width / 2.0
    }

    #[inline]
    pub fn half_h(&self) -> f32 {
        self.height / 2.0
    }

    #[inline]
    pub fn boost_active(&self) -> bool {
        self.boost_ticks > 0
    }
}

/// Horizontal steering (continuous while key held).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Steer {
    Left,
    Right,
}

/// Input sampled once per simulation tick.
#[derive(Clone, Copy, Debug)]
pub struct FrameInput {
    pub steer: Option<Steer>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakable_crumbles_once() {
        let mut p = Platform::new(100.0, 50.0, 60.0, 10.0, PlatformKind::Breakable { broken: false });
        assert!(p.collidable());
        assert!(p.crumble());
        assert!(!p.collidable());
        // Second landing attempt does nothing
        assert!(!p.crumble());
        assert_eq!(p.kind, PlatformKind::Breakable { broken: true });
    }

    #[test]
    fn static_and_moving_never_crumble() {
        let mut s = Platform::new(0.0, 0.0, 60.0, 10.0, PlatformKind::Static);
        let mut m = Platform::new(0.0, 0.0, 60.0, 10.0, PlatformKind::Moving { vel_x: 2.0 });
        assert!(!s.crumble());
        assert!(!m.crumble());
        assert!(s.collidable());
        assert!(m.collidable());
    }
}
