use ratatui::layout::Rect;

use suspense::text::layout::{BoxRect, LayoutGeometry};

/// Terminal area the experiment may use: everything above the status line.
pub fn experiment_area(area: Rect) -> Rect {
    Rect {
        height: area.height.saturating_sub(1),
        ..area
    }
}

/// Cell rectangle of a pixel box, clipped to `area`. One cell is one pixel.
pub fn to_rect(b: BoxRect, area: Rect) -> Rect {
    let rect = Rect::new(
        b.x.max(0.0) as u16,
        b.y.max(0.0) as u16,
        b.width.max(0.0) as u16,
        b.height.max(0.0) as u16,
    );
    rect.intersection(area)
}

pub struct ScreenLayout {
    pub text: Rect,
    pub draw: Rect,
    pub memory: Rect,
    pub status: Rect,
}

impl ScreenLayout {
    pub fn new(area: Rect, geometry: &LayoutGeometry) -> Self {
        let usable = experiment_area(area);
        Self {
            text: to_rect(geometry.textbox, usable),
            draw: to_rect(geometry.drawbox, usable),
            memory: to_rect(geometry.memorybox, usable),
            status: Rect::new(area.x, area.y + usable.height, area.width, area.height - usable.height),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use suspense::config::Proportions;

    #[test]
    fn test_status_line_is_last_row() {
        let area = Rect::new(0, 0, 100, 61);
        let geometry = LayoutGeometry::from_screen(100.0, 60.0, &Proportions::default(), 3, 1.0).unwrap();
        let layout = ScreenLayout::new(area, &geometry);
        assert_eq!(layout.status, Rect::new(0, 60, 100, 1));
        assert_eq!(layout.text, Rect::new(10, 27, 80, 21));
        assert_eq!(layout.draw, Rect::new(10, 3, 80, 21));
        assert!(layout.memory.bottom() <= 60);
    }

    #[test]
    fn test_to_rect_clips() {
        let area = Rect::new(0, 0, 20, 10);
        assert_eq!(to_rect(BoxRect::new(15.0, 5.0, 10.0, 10.0), area), Rect::new(15, 5, 5, 5));
    }
}
