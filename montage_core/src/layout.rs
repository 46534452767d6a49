// Copyright 2026 the Montage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Page geometry for the stage frame and the gallery grid.
//!
//! Presenters position elements absolutely inside a content column. The
//! column is the viewport minus page padding, capped at
//! [`MAX_CONTENT_WIDTH`]. The stage frame is the largest 16:9 rectangle that
//! fits the column; the gallery grid switches between 2, 3 and 4 columns at
//! the small and medium breakpoints.

use kurbo::{Point, Rect, Size};

/// Widest the content column gets, in CSS pixels.
pub const MAX_CONTENT_WIDTH: f64 = 1024.0;

/// Padding between the viewport edge and the content column.
pub const PAGE_PADDING: f64 = 24.0;

/// Width-over-height ratio of the stage frame.
pub const STAGE_ASPECT: f64 = 16.0 / 9.0;

/// Viewport width at which the gallery grows to 3 columns.
pub const BREAKPOINT_SM: f64 = 640.0;

/// Viewport width at which the gallery grows to 4 columns.
pub const BREAKPOINT_MD: f64 = 768.0;

/// Space between gallery tiles.
pub const TILE_GAP: f64 = 16.0;

/// Height of a tile's thumbnail image.
pub const TILE_IMAGE_HEIGHT: f64 = 160.0;

/// Height of a tile's caption strip.
pub const TILE_CAPTION_HEIGHT: f64 = 36.0;

/// Width of the content column for a viewport.
#[must_use]
pub fn content_width(viewport: Size) -> f64 {
    (viewport.width - 2.0 * PAGE_PADDING).clamp(0.0, MAX_CONTENT_WIDTH)
}

/// The 16:9 stage frame, relative to the content column's origin.
///
/// Fits both the column width and the viewport height minus padding.
#[must_use]
pub fn stage_frame(viewport: Size) -> Rect {
    let max_w = content_width(viewport);
    let max_h = (viewport.height - 2.0 * PAGE_PADDING).max(0.0);
    let width = max_w.min(max_h * STAGE_ASPECT);
    let height = width / STAGE_ASPECT;
    let x = (max_w - width) / 2.0;
    Rect::from_origin_size(Point::new(x, 0.0), Size::new(width, height))
}

/// Number of gallery columns for a viewport width.
#[must_use]
pub fn gallery_columns(viewport_width: f64) -> usize {
    if viewport_width < BREAKPOINT_SM {
        2
    } else if viewport_width < BREAKPOINT_MD {
        3
    } else {
        4
    }
}

/// Gallery grid geometry for one viewport size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GalleryGrid {
    /// Tiles per row.
    pub columns: usize,
    /// Size of every tile, image plus caption.
    pub tile_size: Size,
}

impl GalleryGrid {
    /// Computes the grid for `viewport`.
    #[must_use]
    pub fn for_viewport(viewport: Size) -> Self {
        let columns = gallery_columns(viewport.width);
        let width = content_width(viewport);
        let cols = columns as f64;
        let tile_width = ((width - TILE_GAP * (cols - 1.0)) / cols).max(0.0);
        Self {
            columns,
            tile_size: Size::new(tile_width, TILE_IMAGE_HEIGHT + TILE_CAPTION_HEIGHT),
        }
    }

    /// Rectangle of the tile at `index`, relative to the grid origin.
    #[must_use]
    pub fn tile_rect(&self, index: usize) -> Rect {
        let (col, row) = ((index % self.columns) as f64, (index / self.columns) as f64);
        let origin = Point::new(
            col * (self.tile_size.width + TILE_GAP),
            row * (self.tile_size.height + TILE_GAP),
        );
        Rect::from_origin_size(origin, self.tile_size)
    }

    /// Total height taken by `count` tiles.
    #[must_use]
    pub fn content_height(&self, count: usize) -> f64 {
        if count == 0 {
            return 0.0;
        }
        let rows = count.div_ceil(self.columns) as f64;
        rows * self.tile_size.height + (rows - 1.0) * TILE_GAP
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn content_column_is_capped() {
        assert!(approx(content_width(Size::new(1920.0, 1080.0)), MAX_CONTENT_WIDTH));
        assert!(approx(content_width(Size::new(400.0, 800.0)), 352.0));
        assert!(approx(content_width(Size::new(10.0, 10.0)), 0.0));
    }

    #[test]
    fn stage_frame_is_sixteen_by_nine() {
        let frame = stage_frame(Size::new(1920.0, 1080.0));
        assert!(approx(frame.width(), 1024.0));
        assert!(approx(frame.height(), 576.0));
        assert!(approx(frame.x0, 0.0));
    }

    #[test]
    fn short_viewports_letterbox_horizontally() {
        let frame = stage_frame(Size::new(1200.0, 400.0));
        assert!(approx(frame.height(), 352.0), "height {}", frame.height());
        assert!(approx(frame.width() / frame.height(), STAGE_ASPECT));
        assert!(frame.x0 > 0.0, "frame should be centered in the column");
    }

    #[test]
    fn columns_follow_breakpoints() {
        assert_eq!(gallery_columns(320.0), 2);
        assert_eq!(gallery_columns(640.0), 3);
        assert_eq!(gallery_columns(767.0), 3);
        assert_eq!(gallery_columns(1280.0), 4);
    }

    #[test]
    fn tiles_wrap_into_rows() {
        let grid = GalleryGrid::for_viewport(Size::new(1072.0, 900.0));
        assert_eq!(grid.columns, 4);
        assert!(approx(grid.tile_size.width, (1024.0 - 3.0 * TILE_GAP) / 4.0));
        let fifth = grid.tile_rect(4);
        assert!(approx(fifth.x0, 0.0));
        assert!(approx(fifth.y0, grid.tile_size.height + TILE_GAP));
        assert!(approx(grid.content_height(5), 2.0 * grid.tile_size.height + TILE_GAP));
        assert!(approx(grid.content_height(0), 0.0));
    }
}
