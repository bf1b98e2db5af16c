use std::io::{BufWriter, Stdout, Write};

/// Logical canvas units per half-block pixel. The simulation runs in
/// canvas units; the terminal grid is a scaled-down viewport onto it.
const SCALE: f32 = 4.0;

/// Drawing-surface capability: what the overlay needs from its canvas.
/// Particles draw in HSB at full saturation/brightness, text and boxes
/// in RGB. Coordinates are logical canvas units, origin top-left.
pub trait Surface {
    fn width(&self) -> f32;
    fn height(&self) -> f32;
    /// Clear everything to the backdrop. No trail survives.
    fn clear(&mut self);
    /// Paint a translucent dark overlay: prior particle light decays by
    /// `alpha`, leaving a fading trail. Text layers do not persist.
    fn fade(&mut self, alpha: f32);
    fn point_hsb(&mut self, x: f32, y: f32, hue: f32, alpha: f32, weight: f32);
    /// Filled rounded rectangle centered on (cx, cy), blended over the
    /// content below it at render time.
    fn fill_round_rect(&mut self, cx: f32, cy: f32, w: f32, h: f32, color: (u8, u8, u8), alpha: f32);
    fn text_centered(&mut self, text: &str, cx: f32, cy: f32, color: (u8, u8, u8));
}

/// HSB with all channels in [0, 255], full-range hue wheel.
pub fn hsb_to_rgb(hue: f32, sat: f32, bri: f32) -> (u8, u8, u8) {
    let h = (hue.rem_euclid(255.0)) / 255.0 * 6.0;
    let s = (sat / 255.0).clamp(0.0, 1.0);
    let v = (bri / 255.0).clamp(0.0, 1.0);

    let c = v * s;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let m = v - c;
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    (
        ((r + m) * 255.0) as u8,
        ((g + m) * 255.0) as u8,
        ((b + m) * 255.0) as u8,
    )
}

#[derive(Clone, Copy)]
struct BoxCell {
    color: (u8, u8, u8),
    alpha: f32,
}

#[derive(Clone, Copy)]
struct Glyph {
    ch: char,
    fg: (u8, u8, u8),
}

/// Terminal implementation: a truecolor half-block pixel buffer (one cell
/// is two stacked pixels) plus a per-cell text layer that wins over the
/// pixels it covers. Starts hidden; nothing is flushed until the first
/// score event reveals it.
pub struct TermSurface {
    cols: usize,
    rows: usize,
    pw: usize,
    ph: usize,
    backdrop: (u8, u8, u8),
    light: Vec<(f32, f32, f32)>,
    boxes: Vec<Option<BoxCell>>,
    glyphs: Vec<Option<Glyph>>,
    visible: bool,
    output_buf: Vec<u8>,
}

impl TermSurface {
    pub fn new(cols: usize, rows: usize, backdrop: (u8, u8, u8)) -> Self {
        let pw = cols;
        let ph = rows * 2;
        Self {
            cols,
            rows,
            pw,
            ph,
            backdrop,
            light: vec![(0.0, 0.0, 0.0); pw * ph],
            boxes: vec![None; cols * rows],
            glyphs: vec![None; cols * rows],
            visible: false,
            output_buf: Vec::with_capacity(cols * rows * 25),
        }
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    fn stamp(&mut self, px: i32, py: i32, rgb: (f32, f32, f32)) {
        if px < 0 || py < 0 || px >= self.pw as i32 || py >= self.ph as i32 {
            return;
        }
        let idx = py as usize * self.pw + px as usize;
        let cell = &mut self.light[idx];
        cell.0 = cell.0.max(rgb.0);
        cell.1 = cell.1.max(rgb.1);
        cell.2 = cell.2.max(rgb.2);
    }

    fn pixel_color(&self, idx: usize) -> (u8, u8, u8) {
        let (r, g, b) = self.light[idx];
        (
            (self.backdrop.0 as f32 + r).min(255.0) as u8,
            (self.backdrop.1 as f32 + g).min(255.0) as u8,
            (self.backdrop.2 as f32 + b).min(255.0) as u8,
        )
    }

    /// Flush the current frame. While hidden nothing is written, but the
    /// buffers still carry the frame's content.
    pub fn render(&mut self, stdout: &mut BufWriter<Stdout>) -> std::io::Result<()> {
        if !self.visible {
            return Ok(());
        }

        self.output_buf.clear();
        self.output_buf.extend_from_slice(b"\x1b[H");

        for row in 0..self.rows {
            let mut prev_fg: Option<(u8, u8, u8)> = None;
            let mut prev_bg: Option<(u8, u8, u8)> = None;

            for col in 0..self.cols {
                let top = self.pixel_color(row * 2 * self.pw + col);
                let bot = self.pixel_color((row * 2 + 1) * self.pw + col);
                let cell = row * self.cols + col;

                let (ch, fg, bg) = match (self.boxes[cell], self.glyphs[cell]) {
                    (Some(bx), glyph) => {
                        // Box fill blends over the pixel content beneath it.
                        let under = (
                            (top.0 as f32 + bot.0 as f32) * 0.5,
                            (top.1 as f32 + bot.1 as f32) * 0.5,
                            (top.2 as f32 + bot.2 as f32) * 0.5,
                        );
                        let bg = (
                            (bx.color.0 as f32 * bx.alpha + under.0 * (1.0 - bx.alpha)) as u8,
                            (bx.color.1 as f32 * bx.alpha + under.1 * (1.0 - bx.alpha)) as u8,
                            (bx.color.2 as f32 * bx.alpha + under.2 * (1.0 - bx.alpha)) as u8,
                        );
                        match glyph {
                            Some(g) => (g.ch, g.fg, bg),
                            None => (' ', bg, bg),
                        }
                    }
                    (None, Some(g)) => (g.ch, g.fg, top),
                    (None, None) => ('▄', bot, top),
                };

                if prev_bg != Some(bg) {
                    write!(self.output_buf, "\x1b[48;2;{};{};{}m", bg.0, bg.1, bg.2)?;
                    prev_bg = Some(bg);
                }
                if prev_fg != Some(fg) {
                    write!(self.output_buf, "\x1b[38;2;{};{};{}m", fg.0, fg.1, fg.2)?;
                    prev_fg = Some(fg);
                }
                let mut utf8 = [0u8; 4];
                self.output_buf
                    .extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
            }
            self.output_buf.extend_from_slice(b"\x1b[0m");
            if row + 1 < self.rows {
                self.output_buf.extend_from_slice(b"\r\n");
            }
        }

        stdout.write_all(&self.output_buf)?;
        stdout.flush()?;
        Ok(())
    }

    fn cell_of(&self, x: f32, y: f32) -> (i32, i32) {
        ((x / SCALE) as i32, (y / (SCALE * 2.0)) as i32)
    }
}

impl Surface for TermSurface {
    fn width(&self) -> f32 {
        self.pw as f32 * SCALE
    }

    fn height(&self) -> f32 {
        self.ph as f32 * SCALE
    }

    fn clear(&mut self) {
        self.light.fill((0.0, 0.0, 0.0));
        self.boxes.fill(None);
        self.glyphs.fill(None);
    }

    fn fade(&mut self, alpha: f32) {
        let keep = (1.0 - alpha).clamp(0.0, 1.0);
        for cell in &mut self.light {
            cell.0 *= keep;
            cell.1 *= keep;
            cell.2 *= keep;
        }
        self.boxes.fill(None);
        self.glyphs.fill(None);
    }

    fn point_hsb(&mut self, x: f32, y: f32, hue: f32, alpha: f32, weight: f32) {
        let (r, g, b) = hsb_to_rgb(hue, 255.0, 255.0);
        let a = alpha.clamp(0.0, 1.0);
        let rgb = (r as f32 * a, g as f32 * a, b as f32 * a);
        let px = (x / SCALE) as i32;
        let py = (y / SCALE) as i32;

        self.stamp(px, py, rgb);
        // Heavier strokes (the rocket) get a faint one-pixel halo.
        if weight > 4.0 {
            let halo = (rgb.0 * 0.5, rgb.1 * 0.5, rgb.2 * 0.5);
            self.stamp(px - 1, py, halo);
            self.stamp(px + 1, py, halo);
            self.stamp(px, py - 1, halo);
            self.stamp(px, py + 1, halo);
        }
    }

    fn fill_round_rect(&mut self, cx: f32, cy: f32, w: f32, h: f32, color: (u8, u8, u8), alpha: f32) {
        let (c0, r0) = self.cell_of(cx - w * 0.5, cy - h * 0.5);
        let (c1, r1) = self.cell_of(cx + w * 0.5, cy + h * 0.5);
        let c0 = c0.max(0);
        let r0 = r0.max(0);
        let c1 = c1.min(self.cols as i32 - 1);
        let r1 = r1.min(self.rows as i32 - 1);

        for row in r0..=r1 {
            for col in c0..=c1 {
                // Leave the four corner cells open for a rounded look.
                let corner = (row == r0 || row == r1) && (col == c0 || col == c1);
                if corner && r1 > r0 && c1 > c0 {
                    continue;
                }
                self.boxes[row as usize * self.cols + col as usize] =
                    Some(BoxCell { color, alpha });
            }
        }
    }

    fn text_centered(&mut self, text: &str, cx: f32, cy: f32, color: (u8, u8, u8)) {
        let (c_mid, row) = self.cell_of(cx, cy);
        if row < 0 || row >= self.rows as i32 {
            return;
        }
        let len = text.chars().count() as i32;
        let start = c_mid - len / 2;
        for (i, ch) in text.chars().enumerate() {
            let col = start + i as i32;
            if col < 0 || col >= self.cols as i32 {
                continue;
            }
            self.glyphs[row as usize * self.cols + col as usize] =
                Some(Glyph { ch, fg: color });
        }
    }
}

/// Test stub that accepts every draw call and records nothing.
#[cfg(test)]
pub struct NullSurface {
    w: f32,
    h: f32,
}

#[cfg(test)]
impl NullSurface {
    pub fn new(w: f32, h: f32) -> Self {
        Self { w, h }
    }
}

#[cfg(test)]
impl Surface for NullSurface {
    fn width(&self) -> f32 {
        self.w
    }
    fn height(&self) -> f32 {
        self.h
    }
    fn clear(&mut self) {}
    fn fade(&mut self, _alpha: f32) {}
    fn point_hsb(&mut self, _x: f32, _y: f32, _hue: f32, _alpha: f32, _weight: f32) {}
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
    fn text_centered(&mut self, _text: &str, _cx: f32, _cy: f32, _color: (u8, u8, u8)) {}
}
