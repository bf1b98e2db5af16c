use crate::particle::Particle;
use crate::surface::Surface;

pub const COUNTDOWN_TICKS: i32 = 60;
pub const DEBRIS_COUNT: usize = 100;

/// One shell: a single ascending rocket that detonates into a batch of
/// debris sharing its hue. Finished once the debris has burned out.
pub struct Firework {
    hue: f32,
    rocket: Particle,
    exploded: bool,
    debris: Vec<Particle>,
    countdown: i32,
}

impl Firework {
    pub fn new(x: f32, y: f32, rng: &mut fastrand::Rng) -> Self {
        let hue = rng.f32() * 255.0;
        Self {
            hue,
            rocket: Particle::rocket(x, y, hue, rng),
            exploded: false,
            debris: Vec::new(),
            countdown: COUNTDOWN_TICKS,
        }
    }

    pub fn update(&mut self, gravity: (f32, f32), rng: &mut fastrand::Rng) {
        if !self.exploded {
            self.rocket.apply_force(gravity.0, gravity.1);
            self.rocket.update();
            self.countdown -= 1;
            // Detonate at countdown expiry or apex (vertical velocity no
            // longer negative means the rocket has stopped rising).
            if self.countdown <= 0 || self.rocket.vy >= 0.0 {
                self.explode(rng);
            }
        }

        // Runs on the transition tick too: fresh debris gets its first
        // gravity kick in the same update that spawned it.
        self.debris.retain_mut(|p| {
            p.apply_force(gravity.0, gravity.1);
            p.update();
            !p.is_done()
        });
    }

    fn explode(&mut self, rng: &mut fastrand::Rng) {
        self.debris.reserve(DEBRIS_COUNT);
        for _ in 0..DEBRIS_COUNT {
            self.debris
                .push(Particle::debris(self.rocket.x, self.rocket.y, self.hue, rng));
        }
        self.exploded = true;
    }

    pub fn draw(&self, surface: &mut dyn Surface) {
        if !self.exploded {
            self.rocket.draw(surface);
        }
        for p in &self.debris {
            p.draw(surface);
        }
    }

    pub fn is_finished(&self) -> bool {
        self.exploded && self.debris.is_empty()
    }

    #[cfg(test)]
    pub fn exploded(&self) -> bool {
        self.exploded
    }

    #[cfg(test)]
    pub fn debris_len(&self) -> usize {
        self.debris.len()
    }
}
