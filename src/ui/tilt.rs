//! Pointer-driven card tilt with exponential ease-out.
//!
//! The pointer position inside the preview card picks a target rotation in
//! `[-MAX_TILT, MAX_TILT]` degrees on both axes.  Each frame the current
//! rotation closes a fixed fraction of the remaining gap, so the card lags
//! slightly behind the pointer and settles smoothly.

use ratatui::layout::Rect;

/// Largest rotation on either axis, in degrees.
pub const MAX_TILT: f64 = 8.0;

#[derive(Debug, Clone)]
pub struct Tilt {
    /// Current rotation about the horizontal axis (pointer up/down).
    x: f64,
    /// Current rotation about the vertical axis (pointer left/right).
    y: f64,
    target_x: f64,
    target_y: f64,
    /// Fraction of the remaining gap closed per tick.
    speed: f64,
}

impl Default for Tilt {
    fn default() -> Self {
        Self::new(0.3)
    }
}

impl Tilt {
    pub fn new(speed: f64) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            target_x: 0.0,
            target_y: 0.0,
            speed: speed.clamp(0.05, 0.95),
        }
    }

    /// Aim at the pointer.  Top edge tilts towards `+MAX_TILT` on x, left
    /// edge towards `-MAX_TILT` on y.  Pointers outside `card` recentre.
    pub fn point_at(&mut self, column: u16, row: u16, card: Rect) {
        let inside = card.width > 0
            && card.height > 0
            && (card.x..card.x + card.width).contains(&column)
            && (card.y..card.y + card.height).contains(&row);
        if !inside {
            self.recenter();
            return;
        }
        let rx = ratio(row - card.y, card.height);
        let ry = ratio(column - card.x, card.width);
        self.target_x = MAX_TILT - rx * 2.0 * MAX_TILT;
        self.target_y = ry * 2.0 * MAX_TILT - MAX_TILT;
    }

    pub fn recenter(&mut self) {
        self.target_x = 0.0;
        self.target_y = 0.0;
    }

    /// Ease towards the target.  Call once per frame.
    pub fn tick(&mut self) {
        self.x += (self.target_x - self.x) * self.speed;
        self.y += (self.target_y - self.y) * self.speed;
        if (self.target_x - self.x).abs() < 0.05 {
            self.x = self.target_x;
        }
        if (self.target_y - self.y).abs() < 0.05 {
            self.y = self.target_y;
        }
    }

    /// `(rotate_x, rotate_y)` in degrees.
    pub fn angles(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    /// Horizontal shift, in cells, for a card row `offset` rows from the
    /// card's vertical centre.  Rotation about the vertical axis leans the
    /// card sideways.
    pub fn row_shift(&self, offset: f64) -> i16 {
        (offset * self.y.to_radians().tan()).round() as i16
    }

    #[cfg(test)]
    pub fn is_animating(&self) -> bool {
        self.x != self.target_x || self.y != self.target_y
    }
}

/// Position of `offset` within `len` cells as a ratio in `[0, 1]`,
/// measured at cell centres.
fn ratio(offset: u16, len: u16) -> f64 {
    if len <= 1 {
        return 0.5;
    }
    f64::from(offset) / f64::from(len - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CARD: Rect = Rect {
        x: 10,
        y: 5,
        width: 21,
        height: 11,
    };

    fn settle(tilt: &mut Tilt) {
        for _ in 0..200 {
            tilt.tick();
        }
    }

    #[test]
    fn corners_reach_the_maximum() {
        let mut tilt = Tilt::default();
        tilt.point_at(10, 5, CARD);
        settle(&mut tilt);
        assert_eq!(tilt.angles(), (MAX_TILT, -MAX_TILT));

        tilt.point_at(30, 15, CARD);
        settle(&mut tilt);
        assert_eq!(tilt.angles(), (-MAX_TILT, MAX_TILT));
        assert!(!tilt.is_animating());
    }

    #[test]
    fn centre_and_outside_are_flat() {
        let mut tilt = Tilt::default();
        tilt.point_at(20, 10, CARD);
        settle(&mut tilt);
        assert_eq!(tilt.angles(), (0.0, 0.0));

        tilt.point_at(10, 5, CARD);
        tilt.tick();
        assert!(tilt.is_animating());
        tilt.point_at(0, 0, CARD);
        settle(&mut tilt);
        assert_eq!(tilt.angles(), (0.0, 0.0));
    }

    #[test]
    fn easing_lags_behind_the_pointer() {
        let mut tilt = Tilt::new(0.5);
        tilt.point_at(30, 10, CARD);
        tilt.tick();
        let (_, y) = tilt.angles();
        assert!(y > 0.0 && y < MAX_TILT);
    }

    #[test]
    fn lean_grows_away_from_the_centre() {
        let mut tilt = Tilt::default();
        tilt.point_at(30, 10, CARD);
        settle(&mut tilt);
        assert_eq!(tilt.row_shift(0.0), 0);
        assert!(tilt.row_shift(-10.0) < 0);
        assert!(tilt.row_shift(10.0) > 0);
    }
}
