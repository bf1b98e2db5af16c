use crate::intake::ScoreEvent;
use crate::show::{FireworkShow, SPAWN_CHANCE};
use crate::surface::Surface;

const MSG_IDLE: &str = "Try again";
const MSG_TOP: &str = "Congratulations! Outstanding score!";
const MSG_MIDDLE: &str = "Good result, keep it up.";
const MSG_LOW: &str = "More practice needed!";

const GREEN: (u8, u8, u8) = (0, 200, 50);
const AMBER: (u8, u8, u8) = (255, 181, 35);
const RED: (u8, u8, u8) = (200, 0, 0);
const BLACK: (u8, u8, u8) = (0, 0, 0);
const WHITE: (u8, u8, u8) = (255, 255, 255);

const BOX_ALPHA: f32 = 204.0 / 255.0;
const BOX_H: f32 = 80.0;
const IDLE_BOX_W: f32 = 400.0;
const TIER_BOX_W: f32 = 450.0;
const SCORE_BOX_W: f32 = 300.0;

/// What the scheduler should do after a tick. The controller never
/// sleeps or blocks on its own; it only reports whether further ticks
/// are worthwhile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Schedule {
    Continue,
    Pause,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tier {
    Top,
    Middle,
    Low,
}

pub struct OverlayConfig {
    pub gravity: (f32, f32),
    pub spawn_chance: f32,
    /// Top-tier shows keep spawning until the frame counter passes this
    /// ceiling (then the show winds down once the sky is empty).
    pub tick_ceiling: u64,
    pub trail_alpha: f32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            gravity: (0.0, 0.2),
            spawn_chance: SPAWN_CHANCE,
            tick_ceiling: 600,
            trail_alpha: 25.0 / 255.0,
        }
    }
}

/// Render/animation controller. Owns all shared animation state: the
/// latest score, the firework population, the frame counter, and the
/// RNG. `recv_score` and `tick` are its only mutating entry points.
pub struct Overlay {
    score: f64,
    max_score: f64,
    show: FireworkShow,
    frame_count: u64,
    config: OverlayConfig,
    rng: fastrand::Rng,
}

impl Overlay {
    pub fn new(config: OverlayConfig, rng: fastrand::Rng) -> Self {
        Self {
            score: 0.0,
            max_score: 0.0,
            show: FireworkShow::new(),
            frame_count: 0,
            config,
            rng,
        }
    }

    /// Latest score wins, no merging. Spawning stays frame-driven, so a
    /// repeated event changes nothing but the stored values.
    pub fn recv_score(&mut self, ev: &ScoreEvent) {
        self.score = ev.score;
        self.max_score = ev.max_score;
    }

    /// Zero is the "no score yet" sentinel.
    pub fn has_score(&self) -> bool {
        self.score != 0.0
    }

    /// Defined as 0 when `max_score` is 0, which lands in the low tier;
    /// NaN never reaches tier selection.
    fn percentage(&self) -> f64 {
        if self.max_score == 0.0 {
            0.0
        } else {
            self.score / self.max_score * 100.0
        }
    }

    pub fn tier(&self) -> Tier {
        let pct = self.percentage();
        if pct >= 90.0 {
            Tier::Top
        } else if pct >= 60.0 {
            Tier::Middle
        } else {
            Tier::Low
        }
    }

    #[cfg(test)]
    pub fn active_fireworks(&self) -> usize {
        self.show.len()
    }

    #[cfg(test)]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn tick(&mut self, surface: &mut dyn Surface) -> Schedule {
        self.frame_count += 1;
        let w = surface.width();
        let h = surface.height();

        if !self.has_score() {
            // Waiting state: hard clear, static retry message, park.
            surface.clear();
            draw_text_box(surface, MSG_IDLE, w / 2.0, h / 2.0, IDLE_BOX_W, BLACK);
            return Schedule::Pause;
        }

        // Translucent dark wash instead of a clear: last frame's debris
        // lingers faintly, which is what sells the firework trails.
        surface.fade(self.config.trail_alpha);

        let tier = self.tier();
        let (msg, color) = match tier {
            Tier::Top => (MSG_TOP, GREEN),
            Tier::Middle => (MSG_MIDDLE, AMBER),
            Tier::Low => (MSG_LOW, RED),
        };

        if tier == Tier::Top {
            self.show
                .maybe_spawn(self.frame_count, self.config.spawn_chance, w, h, &mut self.rng);
        }

        draw_text_box(surface, msg, w / 2.0, h / 2.0 - 100.0, TIER_BOX_W, color);
        let fraction = format!("score: {}/{}", self.score, self.max_score);
        draw_text_box(surface, &fraction, w / 2.0, h / 2.0, SCORE_BOX_W, BLACK);

        self.show.tick(self.config.gravity, surface, &mut self.rng);

        // Below the top tier the frame is static once the sky is empty.
        // Top tier keeps ticking for future spawns until the ceiling.
        if self.show.is_empty() {
            match tier {
                Tier::Top if self.frame_count <= self.config.tick_ceiling => Schedule::Continue,
                _ => Schedule::Pause,
            }
        } else {
            Schedule::Continue
        }
    }
}

fn draw_text_box(surface: &mut dyn Surface, text: &str, cx: f32, cy: f32, w: f32, color: (u8, u8, u8)) {
    surface.fill_round_rect(cx, cy, w, BOX_H, WHITE, BOX_ALPHA);
    surface.text_centered(text, cx, cy, color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::ScoreEvent;

    /// Records draw calls so scenarios can assert on what was rendered.
    struct RecordingSurface {
        w: f32,
        h: f32,
        clears: u32,
        fades: u32,
        points: u32,
        texts: Vec<(String, (u8, u8, u8))>,
    }

    impl RecordingSurface {
        fn new() -> Self {
            Self {
                w: 400.0,
                h: 400.0,
                clears: 0,
                fades: 0,
                points: 0,
                texts: Vec::new(),
            }
        }

        fn reset(&mut self) {
            self.clears = 0;
            self.fades = 0;
            self.points = 0;
            self.texts.clear();
        }

        fn has_text(&self, needle: &str) -> bool {
            self.texts.iter().any(|(t, _)| t == needle)
        }

        fn color_of(&self, needle: &str) -> Option<(u8, u8, u8)> {
            self.texts.iter().find(|(t, _)| t == needle).map(|(_, c)| *c)
        }
    }

    impl Surface for RecordingSurface {
        fn width(&self) -> f32 {
            self.w
        }
        fn height(&self) -> f32 {
            self.h
        }
        fn clear(&mut self) {
            self.clears += 1;
        }
        fn fade(&mut self, _alpha: f32) {
            self.fades += 1;
        }
        fn point_hsb(&mut self, _x: f32, _y: f32, _hue: f32, _alpha: f32, _weight: f32) {
            self.points += 1;
        }
        fn fill_round_rect(
            &mut self,
            _cx: f32,
            _cy: f32,
            _w: f32,
            _h: f32,
            _color: (u8, u8, u8),
            _alpha: f32,
        ) {
        }
        fn text_centered(&mut self, text: &str, _cx: f32, _cy: f32, color: (u8, u8, u8)) {
            self.texts.push((text.to_string(), color));
        }
    }

    fn overlay(seed: u64) -> Overlay {
        Overlay::new(OverlayConfig::default(), fastrand::Rng::with_seed(seed))
    }

    fn event(score: f64, max: f64) -> ScoreEvent {
        ScoreEvent {
            score,
            max_score: max,
        }
    }

    #[test]
    fn idle_frame_clears_draws_retry_and_pauses() {
        let mut ov = overlay(1);
        let mut s = RecordingSurface::new();
        assert_eq!(ov.tick(&mut s), Schedule::Pause);
        assert_eq!(s.clears, 1);
        assert_eq!(s.fades, 0);
        assert_eq!(s.points, 0);
        assert!(s.has_text(MSG_IDLE));
        assert_eq!(ov.active_fireworks(), 0);
    }

    #[test]
    fn top_tier_renders_green_message_and_keeps_ticking() {
        let mut ov = overlay(2);
        let mut s = RecordingSurface::new();
        ov.recv_score(&event(95.0, 100.0));
        assert_eq!(ov.tier(), Tier::Top);

        assert_eq!(ov.tick(&mut s), Schedule::Continue);
        assert_eq!(s.fades, 1);
        assert_eq!(s.clears, 0);
        assert_eq!(s.color_of(MSG_TOP), Some(GREEN));
        assert!(s.has_text("score: 95/100"));
    }

    #[test]
    fn top_tier_eventually_spawns_fireworks() {
        let mut ov = overlay(3);
        let mut s = RecordingSurface::new();
        ov.recv_score(&event(95.0, 100.0));
        let mut seen = 0usize;
        for _ in 0..100 {
            ov.tick(&mut s);
            seen = seen.max(ov.active_fireworks());
        }
        assert!(seen > 0);
    }

    #[test]
    fn middle_tier_is_amber_spawns_nothing_and_pauses_at_once() {
        let mut ov = overlay(4);
        let mut s = RecordingSurface::new();
        ov.recv_score(&event(70.0, 100.0));
        assert_eq!(ov.tier(), Tier::Middle);

        assert_eq!(ov.tick(&mut s), Schedule::Pause);
        assert_eq!(s.color_of(MSG_MIDDLE), Some(AMBER));
        assert!(s.has_text("score: 70/100"));
        for _ in 0..50 {
            assert_eq!(ov.tick(&mut s), Schedule::Pause);
            assert_eq!(ov.active_fireworks(), 0);
        }
        assert_eq!(s.points, 0);
    }

    #[test]
    fn low_tier_is_red_and_pauses_at_once() {
        let mut ov = overlay(5);
        let mut s = RecordingSurface::new();
        ov.recv_score(&event(40.0, 100.0));
        assert_eq!(ov.tier(), Tier::Low);

        assert_eq!(ov.tick(&mut s), Schedule::Pause);
        assert_eq!(s.color_of(MSG_LOW), Some(RED));
        assert_eq!(ov.active_fireworks(), 0);
    }

    #[test]
    fn zero_max_score_lands_in_the_low_tier() {
        let mut ov = overlay(6);
        let mut s = RecordingSurface::new();
        ov.recv_score(&event(5.0, 0.0));
        assert_eq!(ov.tier(), Tier::Low);
        assert_eq!(ov.tick(&mut s), Schedule::Pause);
        assert!(s.has_text("score: 5/0"));
    }

    #[test]
    fn duplicate_events_trigger_no_extra_bursts() {
        let mut ov = overlay(7);
        ov.recv_score(&event(95.0, 100.0));
        let before = ov.active_fireworks();
        ov.recv_score(&event(95.0, 100.0));
        ov.recv_score(&event(95.0, 100.0));
        // Spawning is frame-driven; the event itself launches nothing.
        assert_eq!(ov.active_fireworks(), before);
        assert_eq!(ov.tier(), Tier::Top);
    }

    #[test]
    fn top_tier_pauses_past_the_tick_ceiling() {
        let config = OverlayConfig {
            spawn_chance: 0.0,
            tick_ceiling: 3,
            ..OverlayConfig::default()
        };
        let mut ov = Overlay::new(config, fastrand::Rng::with_seed(8));
        let mut s = RecordingSurface::new();
        ov.recv_score(&event(100.0, 100.0));

        assert_eq!(ov.tick(&mut s), Schedule::Continue);
        assert_eq!(ov.tick(&mut s), Schedule::Continue);
        assert_eq!(ov.tick(&mut s), Schedule::Continue);
        assert_eq!(ov.tick(&mut s), Schedule::Pause);
    }

    #[test]
    fn new_score_reuses_state_without_loss() {
        let mut ov = overlay(9);
        let mut s = RecordingSurface::new();
        ov.recv_score(&event(70.0, 100.0));
        assert_eq!(ov.tick(&mut s), Schedule::Pause);
        let frames = ov.frame_count();

        // A fresh event overwrites values; the counter keeps running.
        ov.recv_score(&event(40.0, 100.0));
        s.reset();
        assert_eq!(ov.tick(&mut s), Schedule::Pause);
        assert_eq!(ov.frame_count(), frames + 1);
        assert!(s.has_text("score: 40/100"));
    }
}
