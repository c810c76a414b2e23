#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in pixel space. `x`/`y` is the top-left corner, y grows downward.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2 {
            x: self.x + self.w * 0.5,
            y: self.y + self.h * 0.5,
        }
    }

    pub fn set_left(&mut self, left: f32) {
        self.x = left;
    }

    pub fn set_right(&mut self, right: f32) {
        self.x = right - self.w;
    }

    pub fn set_top(&mut self, top: f32) {
        self.y = top;
    }

    pub fn set_bottom(&mut self, bottom: f32) {
        self.y = bottom - self.h;
    }

    /// Strict overlap: rectangles that only share an edge do not collide.
    pub fn collides(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Half-open containment, right and bottom edges excluded.
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_edges_do_not_collide() {
        let a = Rect::new(0.0, 0.0, 16.0, 16.0);
        let b = Rect::new(16.0, 0.0, 16.0, 16.0);
        assert!(!a.collides(&b));
        assert!(!b.collides(&a));
    }

    #[test]
    fn partial_overlap_collides_both_ways() {
        let a = Rect::new(0.0, 0.0, 8.0, 15.0);
        let b = Rect::new(7.5, 14.9, 16.0, 16.0);
        assert!(a.collides(&b));
        assert!(b.collides(&a));
    }

    #[test]
    fn edge_setters_keep_size() {
        let mut rect = Rect::new(3.0, 4.0, 8.0, 15.0);
        rect.set_right(32.0);
        rect.set_bottom(48.0);
        assert_eq!(rect, Rect::new(24.0, 33.0, 8.0, 15.0));
        rect.set_left(1.0);
        rect.set_top(2.0);
        assert_eq!(rect.right(), 9.0);
        assert_eq!(rect.bottom(), 17.0);
    }

    #[test]
    fn contains_point_excludes_far_edges() {
        let rect = Rect::new(0.0, 0.0, 8.0, 15.0);
        assert!(rect.contains_point(Vec2::new(0.0, 0.0)));
        assert!(rect.contains_point(Vec2::new(4.0, 14.9)));
        assert!(!rect.contains_point(Vec2::new(8.0, 3.0)));
        assert!(!rect.contains_point(Vec2::new(3.0, 15.0)));
    }
}
