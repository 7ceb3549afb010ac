use std::collections::BTreeMap;

/// One whitespace-delimited token of the experiment text together with its
/// layout geometry and the suspense samples recorded for it.
#[derive(Clone, Debug, PartialEq)]
pub struct WordUnit {
    pub text: String,
    /// 1-based position of the word in the whole text.
    pub number: usize,
    /// 1-based source row the word came from.
    pub paragraph: usize,
    pub properties: BTreeMap<String, String>,
    pub width: f64,
    pub height: f64,
    pub position_x: f64,
    pub position_y: f64,
    /// Start of the word if its whole screen were rendered on one line.
    pub cumulative_x: f64,
    pub cumulative_end: f64,
    /// Flattened width of the word's whole screen.
    pub cumulative_total: f64,
    /// Width of the drawing box the flattened range is scaled into.
    pub screen_width: f64,
    pub screen_number: usize,
    pub line_on_screen: usize,
    pub checked: bool,
    pub values: Vec<f64>,
    pub times: Vec<f64>,
}

impl WordUnit {
    pub fn new(text: &str, number: usize, paragraph: usize, properties: BTreeMap<String, String>) -> Self {
        Self {
            text: text.to_string(),
            number,
            paragraph,
            properties,
            width: 0.0,
            height: 0.0,
            position_x: 0.0,
            position_y: 0.0,
            cumulative_x: 0.0,
            cumulative_end: 0.0,
            cumulative_total: 0.0,
            screen_width: 0.0,
            screen_number: 0,
            line_on_screen: 0,
            checked: false,
            values: Vec::new(),
            times: Vec::new(),
        }
    }

    fn scaled(&self, cumulative: f64) -> f64 {
        if self.cumulative_total <= 0.0 {
            return 0.0;
        }
        self.screen_width * cumulative / self.cumulative_total
    }

    /// Pixel range of the drawing box that belongs to this word.
    pub fn draw_range(&self) -> (f64, f64) {
        (self.scaled(self.cumulative_x), self.scaled(self.cumulative_end))
    }

    /// Mark the word as drawn once the pointer has passed its end.
    pub fn check(&mut self, mouse_x: f64, slack: f64) -> bool {
        let (_, max_x) = self.draw_range();
        if mouse_x > 0.0 && mouse_x >= max_x - slack {
            self.checked = true;
        }
        self.checked
    }

    pub fn uncheck(&mut self) {
        self.checked = false;
        self.delete_values();
    }

    pub fn delete_values(&mut self) {
        self.values.clear();
        self.times.clear();
    }

    /// Keep every sample that falls within the word's range and return the
    /// mean of the kept values.
    ///
    /// A range narrower than the sample spacing can fall between two
    /// samples. Such a word gets the trace interpolated at its midpoint,
    /// stamped with the time of the later neighbour.
    pub fn store_values(&mut self, points: &[(f64, f64)], times: &[f64]) -> Option<f64> {
        let (min_x, max_x) = self.draw_range();
        let mut sum = 0.0;
        let mut kept = 0usize;
        for (&(x, value), &time) in points.iter().zip(times) {
            if min_x <= x && x <= max_x {
                self.values.push(value);
                self.times.push(time);
                sum += value;
                kept += 1;
            }
        }
        if kept > 0 {
            return Some(sum / kept as f64);
        }

        let (value, time) = interpolate_at((min_x + max_x) / 2.0, points, times)?;
        self.values.push(value);
        self.times.push(time);
        Some(value)
    }

    pub fn mean_value(&self) -> Option<f64> {
        if self.values.is_empty() {
            return None;
        }
        Some(self.values.iter().sum::<f64>() / self.values.len() as f64)
    }
}

/// Trace value at `x` from its x-sorted samples. Outside the trace the
/// nearest end is used.
fn interpolate_at(x: f64, points: &[(f64, f64)], times: &[f64]) -> Option<(f64, f64)> {
    let len = points.len().min(times.len());
    if len == 0 {
        return None;
    }
    let after = points[..len].partition_point(|&(px, _)| px < x);
    if after == 0 {
        return Some((points[0].1, times[0]));
    }
    if after == len {
        return Some((points[len - 1].1, times[len - 1]));
    }
    let ((x0, v0), (x1, v1)) = (points[after - 1], points[after]);
    let value = v0 + (v1 - v0) * (x - x0) / (x1 - x0);
    Some((value, times[after]))
}
