use crate::firework::Firework;
use crate::surface::Surface;

/// Launches are gated to every fifth tick, then decided by a Bernoulli
/// trial. Both conditions must hold for a spawn.
pub const SPAWN_PERIOD: u64 = 5;
pub const SPAWN_CHANCE: f32 = 0.3;

/// The active set of fireworks. Spawns from the bottom edge at a random
/// x, ticks every shell in insertion order, and evicts finished ones in
/// the same tick.
#[derive(Default)]
pub struct FireworkShow {
    fireworks: Vec<Firework>,
}

impl FireworkShow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.fireworks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn maybe_spawn(
        &mut self,
        frame: u64,
        chance: f32,
        surface_w: f32,
        surface_h: f32,
        rng: &mut fastrand::Rng,
    ) {
        if frame % SPAWN_PERIOD == 0 && rng.f32() < chance {
            self.fireworks
                .push(Firework::new(rng.f32() * surface_w, surface_h, rng));
        }
    }

    /// One update and one draw per shell per tick; a shell that finishes
    /// here is gone before the next tick sees it.
    pub fn tick(&mut self, gravity: (f32, f32), surface: &mut dyn Surface, rng: &mut fastrand::Rng) {
        self.fireworks.retain_mut(|fw| {
            fw.update(gravity, rng);
            fw.draw(surface);
            !fw.is_finished()
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::NullSurface;

    const GRAVITY: (f32, f32) = (0.0, 0.2);

    #[test]
    fn spawns_only_on_period_boundaries() {
        let mut rng = fastrand::Rng::with_seed(20);
        let mut show = FireworkShow::new();
        for frame in 1..=10u64 {
            let before = show.len();
            show.maybe_spawn(frame, 1.0, 400.0, 400.0, &mut rng);
            if frame % SPAWN_PERIOD == 0 {
                assert_eq!(show.len(), before + 1, "frame {frame}");
            } else {
                assert_eq!(show.len(), before, "frame {frame}");
            }
        }
        assert_eq!(show.len(), 2);
    }

    #[test]
    fn zero_chance_never_spawns() {
        let mut rng = fastrand::Rng::with_seed(21);
        let mut show = FireworkShow::new();
        for frame in 1..=100u64 {
            show.maybe_spawn(frame, 0.0, 400.0, 400.0, &mut rng);
        }
        assert!(show.is_empty());
    }

    #[test]
    fn finished_shells_are_evicted_same_tick() {
        let mut rng = fastrand::Rng::with_seed(22);
        let mut show = FireworkShow::new();
        show.maybe_spawn(SPAWN_PERIOD, 1.0, 400.0, 400.0, &mut rng);
        assert_eq!(show.len(), 1);

        let mut surface = NullSurface::new(400.0, 400.0);
        // A shell lives at most 60 ascent ticks plus 64 debris ticks.
        for _ in 0..130 {
            show.tick(GRAVITY, &mut surface, &mut rng);
        }
        assert!(show.is_empty());
    }
}
