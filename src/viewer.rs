//! Route dispatch and effect application for the reader and gallery surfaces.

use std::sync::Arc;

use serde::Serialize;

use crate::assets::AssetLayout;
use crate::config::ViewerConfig;
use crate::effect::{Effect, ImageToken, Surface};
use crate::formats::{Manifest, PersistedProgress};
use crate::gallery::{GalleryController, GallerySession};
use crate::input::{self, Action, Direction, Key, Rect};
use crate::prefetch::AssetLoader;
use crate::progress::ProgressStore;
use crate::reader::{ReaderController, ReaderMode, VolumeNavEntry};
use crate::route::Route;
use crate::router::{History, Router};
use crate::storage::KeyValueStorage;
use crate::zoom::{Point, ScrollOffset, ViewportMetrics, ZoomPan};

const UNAVAILABLE_MESSAGE: &str = "Content is not available.";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ReaderSnapshot {
    pub volume: u32,
    pub page: u32,
    pub page_count: u32,
    pub mode: ReaderMode,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ViewerSnapshot {
    pub fragment: String,
    pub content_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reader: Option<ReaderSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gallery: Option<GallerySession>,
    pub zoomed: bool,
    pub image_loaded: bool,
}

pub struct Viewer {
    content_available: bool,
    reader: ReaderController,
    gallery: GalleryController,
    router: Router,
    progress: ProgressStore,
    loader: Box<dyn AssetLoader>,
    placeholder: Option<Surface>,
}

impl Viewer {
    /// `manifest` is `None` when loading failed; the viewer then shows placeholders.
    pub fn new(
        manifest: Option<Manifest>,
        config: &ViewerConfig,
        history: Box<dyn History>,
        storage: Box<dyn KeyValueStorage>,
        loader: Box<dyn AssetLoader>,
    ) -> Self {
        let content_available = manifest.is_some();
        let manifest = Arc::new(manifest.unwrap_or_default());
        let assets = AssetLayout::from_config(config);

        Self {
            content_available,
            reader: ReaderController::new(
                Arc::clone(&manifest),
                assets,
                config.drag_threshold_px,
            ),
            gallery: GalleryController::new(manifest, config.drag_threshold_px),
            router: Router::new(history),
            progress: ProgressStore::new(storage),
            loader,
            placeholder: None,
        }
    }

    /// Dispatches whatever the location shows at startup. Saved progress is read but
    /// not applied.
    pub fn start(&mut self) -> Vec<Effect> {
        if let Some(progress) = self.progress.load() {
            tracing::info!(
                volume = progress.volume,
                page = progress.page,
                "saved progress available"
            );
        }
        let fragment = self.router.fragment();
        self.navigate(&fragment)
    }

    /// Entry point for every route change the host observes.
    pub fn navigate(&mut self, fragment: &str) -> Vec<Effect> {
        let route = Route::parse(fragment);
        tracing::debug!(fragment, ?route, "route change");
        self.dispatch(route)
    }

    /// Drains route changes queued by the history (back, forward, link clicks).
    pub fn pump(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        while let Some(fragment) = self.router.next_route_change() {
            effects.extend(self.navigate(&fragment));
        }
        effects
    }

    /// A link click: adds a history entry, then dispatches it.
    pub fn follow_link(&mut self, route: Route) -> Vec<Effect> {
        self.router.write_navigable(route);
        self.pump()
    }

    pub fn dispatch(&mut self, route: Route) -> Vec<Effect> {
        let mut effects = Vec::new();
        match route {
            Route::Home => {
                self.placeholder = None;
                effects.extend(self.reader.close());
                effects.extend(self.gallery.close());
            }
            Route::Read { volume, page } => {
                effects.extend(self.gallery.teardown());
                if self.content_available {
                    effects.extend(self.reader.open(volume, i64::from(page)));
                } else {
                    effects.extend(self.placeholder_for(Surface::Reader));
                }
            }
            Route::Gallery { index } => {
                effects.extend(self.reader.teardown());
                if self.content_available {
                    effects.extend(self.gallery.open(i64::from(index)));
                } else {
                    effects.extend(self.placeholder_for(Surface::Gallery));
                }
            }
        }

        // Clamped or rejected targets leave the fragment showing what is actually open.
        if self.content_available {
            let shown = self.session_route();
            let synced = effects
                .iter()
                .rev()
                .find_map(|e| match e {
                    Effect::SyncFragment { route } => Some(*route),
                    _ => None,
                })
                .unwrap_or(route);
            if synced != shown {
                effects.push(Effect::SyncFragment { route: shown });
            }
        }

        self.apply(effects)
    }

    pub fn previous(&mut self) -> Vec<Effect> {
        self.perform(Action::Previous)
    }

    pub fn next(&mut self) -> Vec<Effect> {
        self.perform(Action::Next)
    }

    pub fn close(&mut self) -> Vec<Effect> {
        self.perform(Action::Close)
    }

    pub fn toggle_zoom(&mut self) -> Vec<Effect> {
        self.perform(Action::ToggleZoom)
    }

    pub fn start_reading(&mut self) -> Vec<Effect> {
        self.perform(Action::StartReading)
    }

    /// Keys are only consulted while a surface is open.
    pub fn key(&mut self, key: Key) -> Vec<Effect> {
        let action = if let Some(session) = self.reader.session() {
            input::reader_action(key, session.mode())
        } else if self.gallery.is_open() {
            input::gallery_action(key)
        } else {
            None
        };
        match action {
            Some(action) => self.perform(action),
            None => Vec::new(),
        }
    }

    /// Click on the image. A click that ends a drag does not navigate.
    pub fn click(&mut self, click_x: f64, width: f64) -> Vec<Effect> {
        let Some(zoom) = self.active_zoom_mut() else {
            return Vec::new();
        };
        if !zoom.take_click() {
            tracing::debug!("click after drag ignored");
            return Vec::new();
        }

        if self
            .reader
            .session()
            .is_some_and(|s| s.mode() == ReaderMode::Cover)
        {
            return self.perform(Action::StartReading);
        }
        match input::click_direction(click_x, width) {
            Direction::Previous => self.perform(Action::Previous),
            Direction::Next => self.perform(Action::Next),
        }
    }

    /// Click on the gallery dialog; anything outside the dialog box closes it.
    pub fn backdrop_click(&mut self, x: f64, y: f64, dialog: Rect) -> Vec<Effect> {
        if !self.gallery.is_open() || dialog.contains(x, y) {
            return Vec::new();
        }
        let effects = self.gallery.close();
        self.apply(effects)
    }

    pub fn pointer_down(&mut self, at: Point, scroll: ScrollOffset) -> bool {
        self.active_zoom_mut()
            .is_some_and(|zoom| zoom.pointer_down(at, scroll))
    }

    pub fn pointer_move(&mut self, at: Point) -> Vec<Effect> {
        self.active_zoom_mut()
            .and_then(|zoom| zoom.pointer_move(at))
            .into_iter()
            .collect()
    }

    pub fn pointer_up(&mut self) {
        if let Some(zoom) = self.active_zoom_mut() {
            zoom.pointer_up();
        }
    }

    /// Post-layout callback requested by an earlier `Effect::ScheduleLayout`.
    pub fn after_layout(
        &mut self,
        surface: Surface,
        generation: u64,
        metrics: ViewportMetrics,
    ) -> Vec<Effect> {
        let zoom = match surface {
            Surface::Reader => self.reader.zoom_mut(),
            Surface::Gallery => self.gallery.zoom_mut(),
        };
        zoom.after_layout(generation, metrics).into_iter().collect()
    }

    pub fn image_loaded(&mut self, surface: Surface, token: ImageToken) -> Vec<Effect> {
        let effect = match surface {
            Surface::Reader => self.reader.on_image_loaded(token),
            Surface::Gallery => self.gallery.on_image_loaded(token),
        };
        effect.into_iter().collect()
    }

    pub fn current_image(&self, surface: Surface) -> Option<ImageToken> {
        match surface {
            Surface::Reader => self.reader.current_token(),
            Surface::Gallery => self.gallery.current_token(),
        }
    }

    /// Last saved reading position, for a manual "continue reading" affordance.
    pub fn resume_point(&self) -> Option<PersistedProgress> {
        self.progress.load()
    }

    pub fn volume_nav(&self) -> Vec<VolumeNavEntry> {
        self.reader.volume_nav()
    }

    pub fn fragment(&self) -> String {
        self.router.fragment()
    }

    pub fn history_mut(&mut self) -> &mut dyn History {
        self.router.history_mut()
    }

    pub fn reader(&self) -> &ReaderController {
        &self.reader
    }

    pub fn gallery(&self) -> &GalleryController {
        &self.gallery
    }

    pub fn snapshot(&self) -> ViewerSnapshot {
        let reader = self.reader.session().map(|s| ReaderSnapshot {
            volume: s.volume,
            page: s.page,
            page_count: s.page_count,
            mode: s.mode(),
        });
        let (zoomed, image_loaded) = if self.reader.is_open() {
            (self.reader.zoom().is_zoomed(), self.reader.image_loaded())
        } else if self.gallery.is_open() {
            (self.gallery.zoom().is_zoomed(), self.gallery.image_loaded())
        } else {
            (false, false)
        };

        ViewerSnapshot {
            fragment: self.router.fragment(),
            content_available: self.content_available,
            reader,
            gallery: self.gallery.session(),
            zoomed,
            image_loaded,
        }
    }

    fn session_route(&self) -> Route {
        if let Some(session) = self.reader.session() {
            return Route::Read {
                volume: session.volume,
                page: session.page,
            };
        }
        if let Some(session) = self.gallery.session() {
            return Route::Gallery {
                index: u32::try_from(session.index).unwrap_or(u32::MAX),
            };
        }
        Route::Home
    }

    fn perform(&mut self, action: Action) -> Vec<Effect> {
        let effects = if self.reader.is_open() {
            match action {
                Action::Previous => self.reader.retreat(),
                Action::Next => self.reader.advance(),
                Action::Close => self.reader.close(),
                Action::ToggleZoom => self.reader.toggle_zoom(),
                Action::StartReading => self.reader.start_reading(),
            }
        } else if self.gallery.is_open() {
            match action {
                Action::Previous => self.gallery.prev(),
                Action::Next => self.gallery.next(),
                Action::Close => self.gallery.close(),
                Action::ToggleZoom => self.gallery.toggle_zoom(),
                Action::StartReading => Vec::new(),
            }
        } else {
            Vec::new()
        };
        self.apply(effects)
    }

    fn active_zoom_mut(&mut self) -> Option<&mut ZoomPan> {
        if self.reader.is_open() {
            Some(self.reader.zoom_mut())
        } else if self.gallery.is_open() {
            Some(self.gallery.zoom_mut())
        } else {
            None
        }
    }

    fn placeholder_for(&mut self, surface: Surface) -> Option<Effect> {
        if self.placeholder == Some(surface) {
            return None;
        }
        self.placeholder = Some(surface);
        Some(Effect::Placeholder {
            surface,
            message: UNAVAILABLE_MESSAGE.to_owned(),
        })
    }

    fn apply(&mut self, effects: Vec<Effect>) -> Vec<Effect> {
        for effect in &effects {
            match effect {
                Effect::SyncFragment { route } => {
                    self.router.write_silently(*route);
                }
                Effect::SaveProgress { volume, page } => self.progress.save(*volume, *page),
                Effect::Prefetch { src } => self.loader.prefetch(src),
                _ => {}
            }
        }
        effects
    }
}
