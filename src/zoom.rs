//! Toggle-zoom and drag-to-pan for one image inside one scrollable viewport.

use serde::Serialize;

use crate::effect::{Effect, Surface};

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq)]
pub struct ScrollOffset {
    pub left: f64,
    pub top: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Layout of the viewport after the zoomed size has been applied.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewportMetrics {
    pub content_width: f64,
    pub content_height: f64,
    pub client_width: f64,
    pub client_height: f64,
}

impl ViewportMetrics {
    fn centered(&self) -> ScrollOffset {
        ScrollOffset {
            left: ((self.content_width - self.client_width) / 2.0).max(0.0),
            top: ((self.content_height - self.client_height) / 2.0).max(0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Drag {
    origin: Point,
    scroll_origin: ScrollOffset,
    moved: bool,
}

#[derive(Debug, Clone)]
pub struct ZoomPan {
    surface: Surface,
    drag_threshold_px: f64,
    zoomed: bool,
    drag: Option<Drag>,
    suppress_click: bool,
    generation: u64,
}

impl ZoomPan {
    pub fn new(surface: Surface, drag_threshold_px: f64) -> Self {
        Self {
            surface,
            drag_threshold_px,
            zoomed: false,
            drag: None,
            suppress_click: false,
            generation: 0,
        }
    }

    pub fn is_zoomed(&self) -> bool {
        self.zoomed
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn toggle(&mut self) -> Vec<Effect> {
        self.zoomed = !self.zoomed;
        self.generation += 1;
        self.drag = None;
        self.suppress_click = false;

        let mut effects = vec![Effect::ZoomChanged {
            surface: self.surface,
            zoomed: self.zoomed,
        }];
        if self.zoomed {
            effects.push(Effect::ScheduleLayout {
                surface: self.surface,
                generation: self.generation,
            });
        }
        effects
    }

    /// Centers the enlarged content. Requests from an earlier toggle or image are dropped.
    pub fn after_layout(&mut self, generation: u64, metrics: ViewportMetrics) -> Option<Effect> {
        if !self.zoomed || generation != self.generation {
            tracing::debug!(
                surface = ?self.surface,
                generation,
                current = self.generation,
                "ignoring stale layout callback"
            );
            return None;
        }
        Some(Effect::ScrollTo {
            surface: self.surface,
            offset: metrics.centered(),
        })
    }

    /// Returns `false` when not zoomed; the press is then left to click handling.
    pub fn pointer_down(&mut self, at: Point, scroll: ScrollOffset) -> bool {
        // A drag released off the image never gets its click.
        self.suppress_click = false;
        if !self.zoomed {
            return false;
        }
        self.drag = Some(Drag {
            origin: at,
            scroll_origin: scroll,
            moved: false,
        });
        true
    }

    pub fn pointer_move(&mut self, at: Point) -> Option<Effect> {
        let threshold = self.drag_threshold_px;
        let drag = self.drag.as_mut()?;

        let dx = at.x - drag.origin.x;
        let dy = at.y - drag.origin.y;
        if !drag.moved && dx.abs() <= threshold && dy.abs() <= threshold {
            return None;
        }
        drag.moved = true;

        Some(Effect::ScrollTo {
            surface: self.surface,
            offset: ScrollOffset {
                left: (drag.scroll_origin.left - dx).max(0.0),
                top: (drag.scroll_origin.top - dy).max(0.0),
            },
        })
    }

    pub fn pointer_up(&mut self) {
        if let Some(drag) = self.drag.take() {
            if drag.moved {
                self.suppress_click = true;
            }
        }
    }

    /// Consumes the click that ends a drag. Returns whether the click may navigate.
    pub fn take_click(&mut self) -> bool {
        !std::mem::take(&mut self.suppress_click)
    }

    /// Zoom belongs to an image, so every image change goes through here.
    pub fn reset(&mut self) -> Option<Effect> {
        let was_zoomed = self.zoomed;
        self.zoomed = false;
        self.drag = None;
        self.suppress_click = false;
        self.generation += 1;

        was_zoomed.then_some(Effect::ZoomChanged {
            surface: self.surface,
            zoomed: false,
        })
    }
}
