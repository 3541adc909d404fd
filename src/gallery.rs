use std::sync::Arc;

use serde::Serialize;

use crate::effect::{Effect, ImageToken, Surface};
use crate::formats::Manifest;
use crate::input::Direction;
use crate::route::Route;
use crate::zoom::ZoomPan;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct GallerySession {
    pub index: usize,
}

pub struct GalleryController {
    manifest: Arc<Manifest>,
    zoom: ZoomPan,
    session: Option<GallerySession>,
    shown: Option<(ImageToken, bool)>,
    next_token: u64,
}

impl GalleryController {
    pub fn new(manifest: Arc<Manifest>, drag_threshold_px: f64) -> Self {
        Self {
            manifest,
            zoom: ZoomPan::new(Surface::Gallery, drag_threshold_px),
            session: None,
            shown: None,
            next_token: 0,
        }
    }

    pub fn session(&self) -> Option<GallerySession> {
        self.session
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn zoom(&self) -> &ZoomPan {
        &self.zoom
    }

    pub fn zoom_mut(&mut self) -> &mut ZoomPan {
        &mut self.zoom
    }

    pub fn current_token(&self) -> Option<ImageToken> {
        self.shown.map(|(token, _)| token)
    }

    pub fn image_loaded(&self) -> bool {
        self.shown.is_some_and(|(_, loaded)| loaded)
    }

    /// No-op for an empty gallery; otherwise the index is clamped to the last artwork.
    pub fn open(&mut self, requested_index: i64) -> Vec<Effect> {
        let count = self.manifest.artwork_count();
        if count == 0 {
            tracing::debug!("ignoring gallery open without artworks");
            return Vec::new();
        }
        let last = i64::try_from(count - 1).unwrap_or(i64::MAX);
        let index = requested_index.clamp(0, last) as usize;

        if self.session.is_some_and(|s| s.index == index) {
            return Vec::new();
        }

        let mut effects = Vec::new();
        if self.session.is_none() {
            effects.push(Effect::SurfaceOpened {
                surface: Surface::Gallery,
            });
        }
        self.session = Some(GallerySession { index });
        effects.extend(self.commit(Direction::Next));
        effects
    }

    pub fn next(&mut self) -> Vec<Effect> {
        self.step(Direction::Next)
    }

    pub fn prev(&mut self) -> Vec<Effect> {
        self.step(Direction::Previous)
    }

    pub fn toggle_zoom(&mut self) -> Vec<Effect> {
        if self.session.is_none() {
            return Vec::new();
        }
        self.zoom.toggle()
    }

    pub fn close(&mut self) -> Vec<Effect> {
        let mut effects = self.teardown();
        if !effects.is_empty() {
            effects.push(Effect::SyncFragment { route: Route::Home });
        }
        effects
    }

    pub(crate) fn teardown(&mut self) -> Vec<Effect> {
        if self.session.take().is_none() {
            return Vec::new();
        }
        self.shown = None;
        let mut effects: Vec<Effect> = self.zoom.reset().into_iter().collect();
        effects.push(Effect::SurfaceClosed {
            surface: Surface::Gallery,
        });
        tracing::debug!("gallery closed");
        effects
    }

    pub fn on_image_loaded(&mut self, token: ImageToken) -> Option<Effect> {
        match self.shown.as_mut() {
            Some((current, loaded)) if *current == token && !*loaded => {
                *loaded = true;
                Some(Effect::ImageReady {
                    surface: Surface::Gallery,
                    token,
                })
            }
            Some((current, _)) if *current == token => None,
            _ => {
                tracing::debug!(token = token.0, "ignoring stale gallery image load");
                None
            }
        }
    }

    fn step(&mut self, direction: Direction) -> Vec<Effect> {
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };
        let count = self.manifest.artwork_count();
        match direction {
            Direction::Previous if session.index > 0 => session.index -= 1,
            Direction::Next if session.index + 1 < count => session.index += 1,
            _ => return Vec::new(),
        }
        self.commit(direction)
    }

    fn commit(&mut self, direction: Direction) -> Vec<Effect> {
        let Some(GallerySession { index }) = self.session else {
            return Vec::new();
        };
        let Some(artwork) = self.manifest.artwork(index) else {
            return Vec::new();
        };

        self.next_token += 1;
        let token = ImageToken(self.next_token);
        self.shown = Some((token, false));

        let mut effects: Vec<Effect> = self.zoom.reset().into_iter().collect();
        effects.push(Effect::ShowImage {
            surface: Surface::Gallery,
            token,
            src: artwork.src.clone(),
            alt: artwork.title.clone().unwrap_or_else(|| "Artwork".to_owned()),
        });
        effects.push(Effect::Caption {
            surface: Surface::Gallery,
            title: artwork.title.clone(),
            note: artwork.note.clone(),
        });
        effects.push(Effect::SyncFragment {
            route: Route::Gallery {
                index: u32::try_from(index).unwrap_or(u32::MAX),
            },
        });

        let neighbour = match direction {
            Direction::Next => index.checked_add(1),
            Direction::Previous => index.checked_sub(1),
        };
        if let Some(next) = neighbour.and_then(|i| self.manifest.artwork(i)) {
            effects.push(Effect::Prefetch {
                src: next.src.clone(),
            });
        }
        tracing::debug!(index, "gallery showing artwork");
        effects
    }
}
