use crate::config::ZoomConfig;
use crate::text::layout::BoxRect;

/// Session-wide ceiling of the semantic scale. Doubling or halving it is
/// how participants zoom; the bounds never move.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomScale {
    pub min_y: f64,
    pub max_y: f64,
    pub current_max_y: f64,
    initial: f64,
}

impl ZoomScale {
    pub fn new(initial: f64, min_y: f64, max_y: f64) -> Self {
        let current_max_y = initial.clamp(min_y, max_y);
        Self {
            min_y,
            max_y,
            current_max_y,
            initial: current_max_y,
        }
    }

    pub fn from_config(config: &ZoomConfig) -> Self {
        Self::new(config.initial, config.min, config.max)
    }

    /// Double the ceiling. Returns false at the upper bound.
    pub fn zoom_in(&mut self) -> bool {
        if self.current_max_y >= self.max_y {
            return false;
        }
        self.current_max_y = (self.current_max_y * 2.0).min(self.max_y);
        true
    }

    /// Halve the ceiling. Returns false at the lower bound.
    pub fn zoom_out(&mut self) -> bool {
        if self.current_max_y <= self.min_y {
            return false;
        }
        self.current_max_y = (self.current_max_y / 2.0).max(self.min_y);
        true
    }

    pub fn reset(&mut self) {
        self.current_max_y = self.initial;
    }

    /// Ceiling used as a divisor; zero is replaced by one.
    fn divisor(&self) -> f64 {
        if self.current_max_y == 0.0 {
            1.0
        } else {
            self.current_max_y
        }
    }
}

/// Pixel height to semantic value. Pixel 0 is the top of the box and maps
/// to the ceiling.
pub fn pixel_to_value(y: f64, height: f64, max_y: f64) -> f64 {
    (height - y) * max_y / height
}

/// Semantic value to pixel height, guarding a zero ceiling.
pub fn value_to_pixel(value: f64, height: f64, max_y: f64) -> f64 {
    let max_y = if max_y == 0.0 { 1.0 } else { max_y };
    height - value * height / max_y
}

/// Canvas the participant draws the suspense line on. Holds the pixel trace
/// relative to its top-left corner, the semantic values derived from it and
/// the time every point was recorded.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawBox {
    pub origin: (f64, f64),
    pub width: f64,
    pub height: f64,
    pub pixels: Vec<(f64, f64)>,
    pub values: Vec<(f64, f64)>,
    pub times: Vec<f64>,
    pub starting_time: Option<f64>,
}

impl DrawBox {
    pub fn new(rect: BoxRect) -> Self {
        Self {
            origin: (rect.x, rect.y),
            width: rect.width,
            height: rect.height,
            pixels: Vec::new(),
            values: Vec::new(),
            times: Vec::new(),
            starting_time: None,
        }
    }

    /// First time the box was shown; later calls keep the first stamp.
    pub fn set_starting_time(&mut self, at: f64) {
        if self.starting_time.is_none() {
            self.starting_time = Some(at);
        }
    }

    pub fn contains(&self, (x, y): (f64, f64)) -> bool {
        (0.0..=self.width).contains(&x) && (0.0..=self.height).contains(&y)
    }

    pub fn to_value(&self, (x, y): (f64, f64), zoom: &ZoomScale) -> (f64, f64) {
        (x, pixel_to_value(y, self.height, zoom.current_max_y))
    }

    pub fn to_pixel(&self, (x, value): (f64, f64), zoom: &ZoomScale) -> (f64, f64) {
        (x, value_to_pixel(value, self.height, zoom.divisor()))
    }

    pub fn map_from_pixel(&mut self, zoom: &ZoomScale) {
        self.values = self.pixels.iter().map(|&p| self.to_value(p, zoom)).collect();
    }

    pub fn map_to_pixel(&mut self, zoom: &ZoomScale) {
        self.pixels = self.values.iter().map(|&v| self.to_pixel(v, zoom)).collect();
    }

    pub fn erase(&mut self) {
        self.pixels.clear();
        self.values.clear();
        self.times.clear();
    }

    fn last_x(&self) -> Option<f64> {
        self.pixels.last().map(|&(x, _)| x)
    }

    fn push(&mut self, point: (f64, f64), at: f64) {
        if self.last_x().is_some_and(|last| point.0 <= last) {
            return;
        }
        self.pixels.push(point);
        self.times.push(at);
    }

    /// Record pointer motion from `old` to `new`. Motion is left to right
    /// only; gaps wider than one pixel are filled by linear interpolation.
    pub fn record_mouse(&mut self, old: (f64, f64), new: (f64, f64), at: f64, zoom: &ZoomScale) {
        let (old_x, old_y) = (old.0.round(), old.1);
        let (new_x, new_y) = (new.0.round(), new.1);
        if new_x <= old_x {
            return;
        }

        if new_x == old_x + 1.0 {
            self.push((old_x, old_y), at);
            self.push((new_x, new_y), at);
        } else {
            let slope = (new_y - old_y) / (new_x - old_x);
            let intercept = (new_x * old_y - new_y * old_x) / (new_x - old_x);
            let mut x = old_x;
            while x < new_x {
                self.push((x, slope * x + intercept), at);
                x += 1.0;
            }
        }
        self.map_from_pixel(zoom);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draw_box() -> DrawBox {
        DrawBox::new(BoxRect::new(5.0, 2.0, 200.0, 100.0))
    }

    fn zoom() -> ZoomScale {
        ZoomScale::new(10.0, 0.1, 1000.0)
    }

    #[test]
    fn test_pixel_value_round_trip() {
        for max_y in [0.1, 1.0, 10.0, 640.0] {
            for y in [0.0, 12.5, 50.0, 99.0, 100.0] {
                let v = pixel_to_value(y, 100.0, max_y);
                assert!((value_to_pixel(v, 100.0, max_y) - y).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_pixel_to_value_inverts_axis() {
        assert_eq!(pixel_to_value(0.0, 100.0, 10.0), 10.0);
        assert_eq!(pixel_to_value(100.0, 100.0, 10.0), 0.0);
        assert_eq!(pixel_to_value(50.0, 100.0, 10.0), 5.0);
    }

    #[test]
    fn test_value_to_pixel_zero_ceiling() {
        assert_eq!(value_to_pixel(0.5, 100.0, 0.0), 50.0);
    }

    #[test]
    fn test_record_interpolates_fast_motion() {
        let mut b = draw_box();
        b.record_mouse((0.0, 50.0), (5.0, 30.0), 1.5, &zoom());
        assert_eq!(b.pixels.len(), 5);
        let xs: Vec<f64> = b.pixels.iter().map(|p| p.0).collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        for (i, &(_, y)) in b.pixels.iter().enumerate() {
            assert!((y - (50.0 - 4.0 * i as f64)).abs() < 1e-9);
        }
        assert_eq!(b.values.len(), 5);
        for (i, &(_, v)) in b.values.iter().enumerate() {
            assert!((v - (5.0 + 0.4 * i as f64)).abs() < 1e-9);
        }
        assert!(b.times.iter().all(|&t| t == 1.5));
    }

    #[test]
    fn test_record_single_step_keeps_both_endpoints() {
        let mut b = draw_box();
        b.record_mouse((3.0, 40.0), (4.0, 20.0), 1.0, &zoom());
        assert_eq!(b.pixels, vec![(3.0, 40.0), (4.0, 20.0)]);
        b.record_mouse((4.0, 20.0), (5.0, 10.0), 2.0, &zoom());
        assert_eq!(b.pixels, vec![(3.0, 40.0), (4.0, 20.0), (5.0, 10.0)]);
        assert_eq!(b.times, vec![1.0, 1.0, 2.0]);
    }

    #[test]
    fn test_record_ignores_backward_and_vertical_motion() {
        let mut b = draw_box();
        b.record_mouse((5.0, 40.0), (5.0, 10.0), 1.0, &zoom());
        b.record_mouse((5.0, 40.0), (2.0, 10.0), 1.0, &zoom());
        assert!(b.pixels.is_empty());
        assert!(b.values.is_empty());
        assert!(b.times.is_empty());
    }

    #[test]
    fn test_record_is_monotonic() {
        let mut b = draw_box();
        let path = [(0.0, 50.0), (1.0, 45.0), (4.0, 60.0), (4.0, 20.0), (3.0, 20.0), (9.0, 0.0), (10.0, 5.0)];
        for pair in path.windows(2) {
            b.record_mouse(pair[0], pair[1], 0.0, &zoom());
        }
        assert!(b.pixels.windows(2).all(|w| w[0].0 < w[1].0));
        assert_eq!(b.pixels.len(), b.times.len());
        assert_eq!(b.pixels.len(), b.values.len());
    }

    #[test]
    fn test_rezoom_keeps_values_and_moves_pixels() {
        let mut b = draw_box();
        let mut z = zoom();
        b.record_mouse((0.0, 50.0), (1.0, 50.0), 0.0, &z);
        assert_eq!(b.values, vec![(0.0, 5.0), (1.0, 5.0)]);
        assert!(z.zoom_in());
        b.map_to_pixel(&z);
        assert_eq!(b.pixels, vec![(0.0, 75.0), (1.0, 75.0)]);
        b.map_from_pixel(&z);
        assert_eq!(b.values, vec![(0.0, 5.0), (1.0, 5.0)]);
    }

    #[test]
    fn test_erase_clears_everything() {
        let mut b = draw_box();
        b.record_mouse((0.0, 50.0), (3.0, 50.0), 0.0, &zoom());
        b.erase();
        assert!(b.pixels.is_empty() && b.values.is_empty() && b.times.is_empty());
    }

    #[test]
    fn test_starting_time_set_once() {
        let mut b = draw_box();
        b.set_starting_time(3.0);
        b.set_starting_time(9.0);
        assert_eq!(b.starting_time, Some(3.0));
    }

    #[test]
    fn test_zoom_doubles_within_bounds() {
        let mut z = zoom();
        assert!(z.zoom_in());
        assert_eq!(z.current_max_y, 20.0);
        assert!(z.zoom_in());
        assert_eq!(z.current_max_y, 40.0);
        z.reset();
        assert_eq!(z.current_max_y, 10.0);
    }

    #[test]
    fn test_zoom_clamps_and_stops_at_bounds() {
        let mut z = ZoomScale::new(600.0, 0.1, 1000.0);
        assert!(z.zoom_in());
        assert_eq!(z.current_max_y, 1000.0);
        assert!(!z.zoom_in());
        assert_eq!(z.current_max_y, 1000.0);

        let mut z = ZoomScale::new(0.15, 0.1, 1000.0);
        assert!(z.zoom_out());
        assert_eq!(z.current_max_y, 0.1);
        assert!(!z.zoom_out());
    }

    #[test]
    fn test_contains() {
        let b = draw_box();
        assert!(b.contains((0.0, 0.0)));
        assert!(b.contains((200.0, 100.0)));
        assert!(!b.contains((201.0, 10.0)));
        assert!(!b.contains((10.0, -1.0)));
    }
}
