use crate::error::{Error, Result};
use crate::session::draw_box::value_to_pixel;
use crate::text::layout::BoxRect;

/// Marker of a slot that has not received a value yet.
pub const UNFILLED: f64 = -1.0;

/// Recap of the suspense values recorded so far: one slot per word of the
/// main text, filled strictly in order as screens are completed.
#[derive(Clone, Debug, PartialEq)]
pub struct MemoryBox {
    pub origin: (f64, f64),
    pub width: f64,
    pub height: f64,
    /// `(x, value)` per slot; x is fixed, value starts at [`UNFILLED`].
    pub slots: Vec<(f64, f64)>,
    /// Set when new values arrived and the recap should be redrawn.
    pub due: bool,
}

impl MemoryBox {
    pub fn new(rect: BoxRect, slot_count: usize) -> Result<Self> {
        if slot_count == 0 {
            return Err(Error::ZeroSlotMemoryBox);
        }
        let width = rect.width.max(0.0) as usize;
        let slots = (0..slot_count)
            .map(|i| (((i * width) / slot_count) as f64, UNFILLED))
            .collect();
        Ok(Self {
            origin: (rect.x, rect.y),
            width: rect.width,
            height: rect.height,
            slots,
            due: false,
        })
    }

    /// Write `value` into the first unfilled slot.
    pub fn update_values(&mut self, value: f64) -> Result<usize> {
        let index = self
            .slots
            .iter()
            .position(|&(_, v)| v == UNFILLED)
            .ok_or(Error::NoFreeSlot)?;
        self.slots[index].1 = value;
        self.due = true;
        Ok(index)
    }

    pub fn filled(&self) -> usize {
        self.slots.iter().filter(|&&(_, v)| v != UNFILLED).count()
    }

    /// Forget all recorded values, e.g. after the training phase.
    pub fn restart(&mut self) {
        for slot in &mut self.slots {
            slot.1 = UNFILLED;
        }
        self.due = true;
    }

    /// Ceiling of the recap scale: the largest recorded value.
    pub fn display_max(&self) -> f64 {
        self.slots
            .iter()
            .map(|&(_, v)| v)
            .fold(UNFILLED, f64::max)
            .max(0.0)
    }

    /// Pixel positions of the filled slots under the recap's own ceiling.
    /// Slots sharing an x position are drawn once.
    pub fn map_to_pixel(&self) -> Vec<(f64, f64)> {
        let max_y = self.display_max();
        let mut drawn: Vec<(f64, f64)> = Vec::new();
        for &(x, value) in &self.slots {
            if value == UNFILLED || drawn.last().is_some_and(|&(last, _)| last == x) {
                continue;
            }
            drawn.push((x, value_to_pixel(value, self.height, max_y)));
        }
        drawn
    }
}
