//! Layout geometry
//!
//! Pages are laid out as a single full-width column, so an element's layout
//! is its vertical extent in document coordinates. The visible fraction of an
//! element's area therefore equals the fraction of its height inside the
//! viewport.

/// Vertical extent of an element (or the viewport) in document coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bounds {
    pub top: f32,
    pub height: f32,
}

impl Bounds {
    pub const fn new(top: f32, height: f32) -> Self {
        Self { top, height }
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Height of the overlap between two extents (0 when disjoint)
    pub fn overlap(&self, other: &Bounds) -> f32 {
        let top = self.top.max(other.top);
        let bottom = self.bottom().min(other.bottom());
        (bottom - top).max(0.0)
    }

    /// Fraction of `self` that lies inside `viewport`, in `0.0..=1.0`
    ///
    /// A zero-height element counts as fully visible when its top edge lies
    /// inside the viewport.
    pub fn visible_fraction(&self, viewport: &Bounds) -> f32 {
        if self.height <= 0.0 {
            let inside = self.top >= viewport.top && self.top <= viewport.bottom();
            return if inside { 1.0 } else { 0.0 };
        }
        (self.overlap(viewport) / self.height).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_fraction_partial() {
        let viewport = Bounds::new(0.0, 800.0);
        let element = Bounds::new(700.0, 200.0);
        assert!((element.visible_fraction(&viewport) - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_visible_fraction_disjoint() {
        let viewport = Bounds::new(0.0, 800.0);
        let element = Bounds::new(1200.0, 100.0);
        assert_eq!(element.visible_fraction(&viewport), 0.0);
    }

    #[test]
    fn test_zero_height_element() {
        let viewport = Bounds::new(100.0, 800.0);
        assert_eq!(Bounds::new(300.0, 0.0).visible_fraction(&viewport), 1.0);
        assert_eq!(Bounds::new(50.0, 0.0).visible_fraction(&viewport), 0.0);
    }
}
