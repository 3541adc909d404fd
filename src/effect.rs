use serde::Serialize;

use crate::route::Route;
use crate::zoom::ScrollOffset;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    Reader,
    Gallery,
}

/// Identity of the image a surface is currently showing.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct ImageToken(pub u64);

/// Observable outcome of a state transition.
///
/// `SyncFragment`, `SaveProgress` and `Prefetch` are applied by the viewer itself;
/// everything is also handed to the rendering adapter.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    SurfaceOpened {
        surface: Surface,
    },
    SurfaceClosed {
        surface: Surface,
    },
    ShowImage {
        surface: Surface,
        token: ImageToken,
        src: String,
        alt: String,
    },
    ImageReady {
        surface: Surface,
        token: ImageToken,
    },
    Caption {
        surface: Surface,
        #[serde(skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },
    SyncFragment {
        route: Route,
    },
    SaveProgress {
        volume: u32,
        page: u32,
    },
    Prefetch {
        src: String,
    },
    ZoomChanged {
        surface: Surface,
        zoomed: bool,
    },
    /// Run `after_layout` with this generation once the size change has been laid out.
    ScheduleLayout {
        surface: Surface,
        generation: u64,
    },
    ScrollTo {
        surface: Surface,
        offset: ScrollOffset,
    },
    Placeholder {
        surface: Surface,
        message: String,
    },
}
