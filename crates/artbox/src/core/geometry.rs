//! Integer geometry for grid layout and aspect-preserving scaling
//!
//! All scaling uses integer arithmetic so cell placement is reproducible
//! pixel for pixel. A non-empty source never scales to a zero-sized target.

/// Width and height in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either dimension is zero
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// True when the size is wider than tall
    pub fn is_landscape(&self) -> bool {
        self.width > self.height
    }

    /// Per-axis maximum of two sizes
    pub fn max(self, other: Size) -> Size {
        Size::new(self.width.max(other.width), self.height.max(other.height))
    }
}

impl From<(u32, u32)> for Size {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width, height)
    }
}

/// Axis-aligned rectangle with a signed origin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i64, y: i64, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn max_x(&self) -> i64 {
        self.x + self.width as i64
    }

    pub fn max_y(&self) -> i64 {
        self.y + self.height as i64
    }

    /// Whether `other` lies completely inside this rectangle
    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.max_x() <= self.max_x()
            && other.max_y() <= self.max_y()
    }
}

/// `value * numer / denom` in 64-bit, clamped to at least one pixel
fn scale(value: u32, numer: u32, denom: u32) -> u32 {
    let scaled = value as u64 * numer as u64 / denom.max(1) as u64;
    (scaled as u32).max(1)
}

/// Scale `size` so its longer side equals `long_side`
pub fn scale_to_long_side(size: Size, long_side: u32) -> Size {
    if size.is_empty() {
        return Size::default();
    }
    if size.is_landscape() {
        Size::new(long_side, scale(size.height, long_side, size.width))
    } else {
        Size::new(scale(size.width, long_side, size.height), long_side)
    }
}

/// Scale `size` to the given height, keeping the aspect ratio
pub fn scale_to_height(size: Size, height: u32) -> Size {
    if size.is_empty() {
        return Size::default();
    }
    Size::new(scale(size.width, height, size.height), height)
}

/// Fit `size` into `frame`, centered on both axes
///
/// Landscape sources take the frame width, everything else the frame height.
pub fn fit_centered(size: Size, frame: Rect) -> Rect {
    if size.is_empty() {
        return Rect::new(frame.x, frame.y, 0, 0);
    }
    let target = if size.is_landscape() {
        Size::new(frame.width, scale(size.height, frame.width, size.width))
    } else {
        Size::new(scale(size.width, frame.height, size.height), frame.height)
    };
    Rect::new(
        frame.x + (frame.width / 2) as i64 - (target.width / 2) as i64,
        frame.y + (frame.height / 2) as i64 - (target.height / 2) as i64,
        target.width,
        target.height,
    )
}

/// Fit `size` into `frame`, horizontally centered and resting on the bottom edge
pub fn fit_into_frame(size: Size, frame: Rect) -> Rect {
    if size.is_empty() {
        return Rect::new(frame.x, frame.max_y(), 0, 0);
    }
    let target = if size.width < size.height {
        Size::new(scale(size.width, frame.height, size.height), frame.height)
    } else {
        Size::new(frame.width, scale(size.height, frame.width, size.width))
    };
    let center_x = frame.x + (frame.width / 2) as i64;
    Rect::new(
        center_x - (target.width / 2) as i64,
        frame.max_y() - target.height as i64,
        target.width,
        target.height,
    )
}

/// Offset that centers `inner` inside `outer`
///
/// Negative when `inner` is larger on an axis.
pub fn center_offset(inner: Size, outer: Size) -> (i64, i64) {
    (
        (outer.width / 2) as i64 - (inner.width / 2) as i64,
        (outer.height / 2) as i64 - (inner.height / 2) as i64,
    )
}

/// Rows needed to place `count` items in `columns` columns
pub fn grid_rows(count: usize, columns: usize) -> usize {
    let columns = columns.max(1);
    count.div_ceil(columns)
}
