//! Paged reader: `Closed -> Cover -> Reading -> Closed`.

use std::sync::Arc;

use serde::Serialize;

use crate::assets::AssetLayout;
use crate::effect::{Effect, ImageToken, Surface};
use crate::formats::Manifest;
use crate::route::Route;
use crate::zoom::ZoomPan;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReaderMode {
    Cover,
    Reading,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ReaderSession {
    pub volume: u32,
    pub page_count: u32,
    pub title: String,
    pub page: u32,
}

impl ReaderSession {
    pub fn mode(&self) -> ReaderMode {
        if self.page == 0 {
            ReaderMode::Cover
        } else {
            ReaderMode::Reading
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct VolumeNavEntry {
    pub number: u32,
    pub title: String,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ShownImage {
    token: ImageToken,
    loaded: bool,
}

pub struct ReaderController {
    manifest: Arc<Manifest>,
    assets: AssetLayout,
    zoom: ZoomPan,
    session: Option<ReaderSession>,
    shown: Option<ShownImage>,
    next_token: u64,
}

impl ReaderController {
    pub fn new(manifest: Arc<Manifest>, assets: AssetLayout, drag_threshold_px: f64) -> Self {
        Self {
            manifest,
            assets,
            zoom: ZoomPan::new(Surface::Reader, drag_threshold_px),
            session: None,
            shown: None,
            next_token: 0,
        }
    }

    pub fn session(&self) -> Option<&ReaderSession> {
        self.session.as_ref()
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

    pub fn image_loaded(&self) -> bool {
        self.shown.is_some_and(|shown| shown.loaded)
    }

    /// Unknown volumes are ignored. The page is clamped into `[0, page_count]`.
    pub fn open(&mut self, volume: u32, requested_page: i64) -> Vec<Effect> {
        let Some(found) = self.manifest.volume(volume) else {
            tracing::debug!(volume, "ignoring open for unknown volume");
            return Vec::new();
        };
        let page = requested_page.clamp(0, i64::from(found.page_count)) as u32;

        if let Some(session) = &self.session {
            if session.volume == volume && session.page == page {
                return Vec::new();
            }
        }

        let mut effects = Vec::new();
        let same_volume = self.session.as_ref().is_some_and(|s| s.volume == volume);
        if self.session.is_none() {
            effects.push(Effect::SurfaceOpened {
                surface: Surface::Reader,
            });
        }
        if !same_volume {
            effects.push(Effect::Caption {
                surface: Surface::Reader,
                title: Some(found.title.clone()),
                note: found.subtitle.clone(),
            });
        }

        self.session = Some(ReaderSession {
            volume,
            page_count: found.page_count,
            title: found.title.clone(),
            page,
        });
        tracing::debug!(volume, page, "reader opened");
        effects.extend(self.commit());
        effects
    }

    /// Next page; on the cover this is the same as `start_reading`.
    pub fn advance(&mut self) -> Vec<Effect> {
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };
        if session.page >= session.page_count {
            return Vec::new();
        }
        session.page += 1;
        self.commit()
    }

    /// Previous page; from page 1 this returns to the cover.
    pub fn retreat(&mut self) -> Vec<Effect> {
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };
        if session.mode() == ReaderMode::Cover {
            return Vec::new();
        }
        session.page -= 1;
        self.commit()
    }

    pub fn start_reading(&mut self) -> Vec<Effect> {
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };
        if session.mode() != ReaderMode::Cover {
            return Vec::new();
        }
        session.page = 1;
        self.commit()
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

    /// Closes without touching the fragment, for hand-over to another route.
    pub(crate) fn teardown(&mut self) -> Vec<Effect> {
        if self.session.take().is_none() {
            return Vec::new();
        }
        self.shown = None;
        let mut effects: Vec<Effect> = self.zoom.reset().into_iter().collect();
        effects.push(Effect::SurfaceClosed {
            surface: Surface::Reader,
        });
        tracing::debug!("reader closed");
        effects
    }

    /// Marks the current page as loaded. Completions for superseded pages are ignored.
    pub fn on_image_loaded(&mut self, token: ImageToken) -> Option<Effect> {
        match self.shown.as_mut() {
            Some(shown) if shown.token == token => {
                if shown.loaded {
                    return None;
                }
                shown.loaded = true;
                Some(Effect::ImageReady {
                    surface: Surface::Reader,
                    token,
                })
            }
            _ => {
                tracing::debug!(token = token.0, "ignoring stale reader image load");
                None
            }
        }
    }

    pub fn current_token(&self) -> Option<ImageToken> {
        self.shown.map(|shown| shown.token)
    }

    pub fn volume_nav(&self) -> Vec<VolumeNavEntry> {
        let active = self.session.as_ref().map(|s| s.volume);
        self.manifest
            .volumes
            .iter()
            .map(|v| VolumeNavEntry {
                number: v.number,
                title: v.title.clone(),
                active: Some(v.number) == active,
            })
            .collect()
    }

    // Everything a page change implies: new image, zoom reset, fragment, progress, prefetch.
    fn commit(&mut self) -> Vec<Effect> {
        let Some(session) = self.session.as_ref() else {
            return Vec::new();
        };
        let (volume, page, page_count) = (session.volume, session.page, session.page_count);
        let alt = if page == 0 {
            format!("{}, cover", session.title)
        } else {
            format!("{}, page {page}", session.title)
        };

        self.next_token += 1;
        let token = ImageToken(self.next_token);
        self.shown = Some(ShownImage {
            token,
            loaded: false,
        });

        let mut effects: Vec<Effect> = self.zoom.reset().into_iter().collect();
        effects.push(Effect::ShowImage {
            surface: Surface::Reader,
            token,
            src: self.assets.page_image(volume, page),
            alt,
        });
        effects.push(Effect::SyncFragment {
            route: Route::Read { volume, page },
        });
        if page >= 1 {
            effects.push(Effect::SaveProgress { volume, page });
        }
        if page < page_count {
            effects.push(Effect::Prefetch {
                src: self.assets.page_image(volume, page + 1),
            });
        }
        effects
    }
}
