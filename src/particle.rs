use crate::surface::Surface;

pub const LIFESPAN_FULL: f32 = 255.0;
const LIFESPAN_DECAY: f32 = 4.0;
const DRAG: f32 = 0.9;

const ROCKET_WEIGHT: f32 = 6.0;
const DEBRIS_WEIGHT: f32 = 3.0;

/// Rocket particles ascend until their firework detonates; debris particles
/// decay and are evicted once their lifespan runs out.
#[derive(Clone, Debug)]
pub enum ParticleKind {
    Rocket,
    Debris { lifespan: f32 },
}

#[derive(Clone, Debug)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    ax: f32,
    ay: f32,
    hue: f32,
    kind: ParticleKind,
}

impl Particle {
    pub fn rocket(x: f32, y: f32, hue: f32, rng: &mut fastrand::Rng) -> Self {
        Self {
            x,
            y,
            vx: 0.0,
            vy: -(10.0 + rng.f32() * 5.0),
            ax: 0.0,
            ay: 0.0,
            hue,
            kind: ParticleKind::Rocket,
        }
    }

    /// Isotropic spray: uniform direction, speed in [2, 10].
    pub fn debris(x: f32, y: f32, hue: f32, rng: &mut fastrand::Rng) -> Self {
        let angle = rng.f32() * std::f32::consts::TAU;
        let speed = 2.0 + rng.f32() * 8.0;
        Self {
            x,
            y,
            vx: angle.cos() * speed,
            vy: angle.sin() * speed,
            ax: 0.0,
            ay: 0.0,
            hue,
            kind: ParticleKind::Debris {
                lifespan: LIFESPAN_FULL,
            },
        }
    }

    /// Forces accumulate into acceleration; `update` applies and clears them.
    pub fn apply_force(&mut self, fx: f32, fy: f32) {
        self.ax += fx;
        self.ay += fy;
    }

    pub fn update(&mut self) {
        // Drag and decay hit the carried-over velocity before this tick's
        // forces integrate, so fresh acceleration is never damped.
        if let ParticleKind::Debris { lifespan } = &mut self.kind {
            self.vx *= DRAG;
            self.vy *= DRAG;
            *lifespan -= LIFESPAN_DECAY;
        }
        self.vx += self.ax;
        self.vy += self.ay;
        self.x += self.vx;
        self.y += self.vy;
        self.ax = 0.0;
        self.ay = 0.0;
    }

    /// Only debris expires; rockets are retired by their firework's
    /// explosion, never by this predicate.
    pub fn is_done(&self) -> bool {
        match self.kind {
            ParticleKind::Rocket => false,
            ParticleKind::Debris { lifespan } => lifespan < 0.0,
        }
    }

    pub fn draw(&self, surface: &mut dyn Surface) {
        match self.kind {
            ParticleKind::Rocket => {
                surface.point_hsb(self.x, self.y, self.hue, 1.0, ROCKET_WEIGHT);
            }
            ParticleKind::Debris { lifespan } => {
                let alpha = (lifespan / LIFESPAN_FULL).clamp(0.0, 1.0);
                surface.point_hsb(self.x, self.y, self.hue, alpha, DEBRIS_WEIGHT);
            }
        }
    }

    #[cfg(test)]
    pub fn lifespan(&self) -> Option<f32> {
        match self.kind {
            ParticleKind::Rocket => None,
            ParticleKind::Debris { lifespan } => Some(lifespan),
        }
    }
}
