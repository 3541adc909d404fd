//! Scripted viewer sessions.
//!
//! One event per line; blank lines and lines starting with `#` followed by a space
//! are skipped. Events:
//!
//! ```text
//! navigate <fragment>        address-bar edit or link click (new history entry)
//! back | forward             browser history buttons
//! key <name>                 ArrowLeft, ArrowRight, Escape, Space, or one character
//! prev | next | close | zoom | start
//! click <x> <width>          click on the image
//! backdrop <x> <y> <left> <top> <right> <bottom>
//! down <x> <y> [<scroll_left> <scroll_top>]
//! move <x> <y>
//! up
//! layout <content_w> <content_h> <client_w> <client_h>
//! loaded [<token>]           image load completion (default: current image)
//! ```

use std::io::Write as _;
use std::path::Path;
use std::str::FromStr;

use anyhow::Context as _;
use serde::Serialize;

use crate::cli::ReplayArgs;
use crate::effect::{Effect, ImageToken, Surface};
use crate::input::{Key, Rect};
use crate::prefetch::{AssetLoader, HttpPrefetcher, NoopLoader};
use crate::router::MemoryHistory;
use crate::storage::{JsonFileStorage, KeyValueStorage, MemoryStorage};
use crate::viewer::{Viewer, ViewerSnapshot};
use crate::zoom::{Point, ScrollOffset, ViewportMetrics};

#[derive(Debug, Clone, PartialEq)]
pub enum ScriptEvent {
    Navigate(String),
    Back,
    Forward,
    Key(Key),
    Previous,
    Next,
    Close,
    Zoom,
    Start,
    Click { x: f64, width: f64 },
    Backdrop { x: f64, y: f64, dialog: Rect },
    PointerDown { at: Point, scroll: ScrollOffset },
    PointerMove(Point),
    PointerUp,
    Layout(ViewportMetrics),
    Loaded(Option<u64>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScriptLine {
    pub line: usize,
    pub text: String,
    pub event: ScriptEvent,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub step: usize,
    pub event: String,
    pub effects: Vec<Effect>,
    pub state: ViewerSnapshot,
}

impl FromStr for ScriptEvent {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (command, rest) = s.split_once(char::is_whitespace).unwrap_or((s, ""));
        let rest = rest.trim();

        let event = match command {
            "navigate" => Self::Navigate(rest.to_owned()),
            "back" => Self::Back,
            "forward" => Self::Forward,
            "key" => Self::Key(rest.parse()?),
            "prev" => Self::Previous,
            "next" => Self::Next,
            "close" => Self::Close,
            "zoom" => Self::Zoom,
            "start" => Self::Start,
            "click" => {
                let [x, width] = numbers::<2>(rest)?;
                Self::Click { x, width }
            }
            "backdrop" => {
                let [x, y, left, top, right, bottom] = numbers::<6>(rest)?;
                Self::Backdrop {
                    x,
                    y,
                    dialog: Rect {
                        left,
                        top,
                        right,
                        bottom,
                    },
                }
            }
            "down" => {
                let values = parse_numbers(rest)?;
                let (x, y, left, top) = match values.as_slice() {
                    [x, y] => (*x, *y, 0.0, 0.0),
                    [x, y, left, top] => (*x, *y, *left, *top),
                    _ => anyhow::bail!("down takes 2 or 4 numbers"),
                };
                Self::PointerDown {
                    at: Point { x, y },
                    scroll: ScrollOffset { left, top },
                }
            }
            "move" => {
                let [x, y] = numbers::<2>(rest)?;
                Self::PointerMove(Point { x, y })
            }
            "up" => Self::PointerUp,
            "layout" => {
                let [content_width, content_height, client_width, client_height] =
                    numbers::<4>(rest)?;
                Self::Layout(ViewportMetrics {
                    content_width,
                    content_height,
                    client_width,
                    client_height,
                })
            }
            "loaded" if rest.is_empty() => Self::Loaded(None),
            "loaded" => Self::Loaded(Some(rest.parse().context("parse image token")?)),
            other => anyhow::bail!("unknown event: {other}"),
        };
        Ok(event)
    }
}

fn parse_numbers(raw: &str) -> anyhow::Result<Vec<f64>> {
    raw.split_whitespace()
        .map(|v| v.parse::<f64>().with_context(|| format!("parse number: {v}")))
        .collect()
}

fn numbers<const N: usize>(raw: &str) -> anyhow::Result<[f64; N]> {
    let values = parse_numbers(raw)?;
    let count = values.len();
    values
        .try_into()
        .map_err(|_| anyhow::anyhow!("expected {N} numbers, got {count}"))
}

pub fn parse_script(text: &str) -> anyhow::Result<Vec<ScriptLine>> {
    let mut lines = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == "#" || trimmed.starts_with("# ") {
            continue;
        }
        let event = raw
            .parse::<ScriptEvent>()
            .with_context(|| format!("script line {line}: {trimmed}"))?;
        lines.push(ScriptLine {
            line,
            text: trimmed.to_owned(),
            event,
        });
    }
    Ok(lines)
}

pub fn read_script(path: &Path) -> anyhow::Result<Vec<ScriptLine>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read script: {}", path.display()))?;
    parse_script(&text)
}

/// Replays a script against a fresh viewer and prints one JSON report per step.
pub async fn run(args: ReplayArgs) -> anyhow::Result<()> {
    let config = args.layout.config()?;
    let script = read_script(Path::new(&args.script))?;
    let manifest = crate::manifest::load_or_unavailable(&args.manifest).await;

    let storage: Box<dyn KeyValueStorage> = match &args.storage {
        Some(path) => Box::new(JsonFileStorage::new(path)),
        None => Box::new(MemoryStorage::new()),
    };
    let loader: Box<dyn AssetLoader> = match &args.prefetch_base {
        Some(base) => Box::new(HttpPrefetcher::new(base)?),
        None => Box::new(NoopLoader),
    };
    let history = Box::new(MemoryHistory::new(&args.start));

    let mut viewer = Viewer::new(manifest, &config, history, storage, loader);
    let reports = drive(&mut viewer, &script);

    let mut stdout = std::io::stdout().lock();
    for report in &reports {
        serde_json::to_writer(&mut stdout, report).context("serialize step report")?;
        writeln!(stdout).context("write step report")?;
    }
    tracing::info!(
        steps = reports.len(),
        fragment = %viewer.fragment(),
        "replay finished"
    );
    Ok(())
}

/// Drives `viewer` through the script. Step 0 reports startup dispatch.
pub fn drive(viewer: &mut Viewer, script: &[ScriptLine]) -> Vec<StepReport> {
    let mut runner = Runner {
        pending_layout: None,
    };

    let effects = viewer.start();
    runner.observe(&effects);
    let mut reports = vec![StepReport {
        step: 0,
        event: "start".to_owned(),
        effects,
        state: viewer.snapshot(),
    }];

    for (index, line) in script.iter().enumerate() {
        let effects = runner.apply(viewer, &line.event);
        runner.observe(&effects);
        tracing::debug!(line = line.line, event = %line.text, effects = effects.len(), "replayed");
        reports.push(StepReport {
            step: index + 1,
            event: line.text.clone(),
            effects,
            state: viewer.snapshot(),
        });
    }
    reports
}

struct Runner {
    pending_layout: Option<(Surface, u64)>,
}

impl Runner {
    fn observe(&mut self, effects: &[Effect]) {
        for effect in effects {
            if let Effect::ScheduleLayout {
                surface,
                generation,
            } = effect
            {
                self.pending_layout = Some((*surface, *generation));
            }
        }
    }

    fn apply(&mut self, viewer: &mut Viewer, event: &ScriptEvent) -> Vec<Effect> {
        match event {
            ScriptEvent::Navigate(fragment) => {
                viewer.history_mut().push(fragment);
                viewer.pump()
            }
            ScriptEvent::Back => {
                viewer.history_mut().back();
                viewer.pump()
            }
            ScriptEvent::Forward => {
                viewer.history_mut().forward();
                viewer.pump()
            }
            ScriptEvent::Key(key) => viewer.key(*key),
            ScriptEvent::Previous => viewer.previous(),
            ScriptEvent::Next => viewer.next(),
            ScriptEvent::Close => viewer.close(),
            ScriptEvent::Zoom => viewer.toggle_zoom(),
            ScriptEvent::Start => viewer.start_reading(),
            ScriptEvent::Click { x, width } => viewer.click(*x, *width),
            ScriptEvent::Backdrop { x, y, dialog } => viewer.backdrop_click(*x, *y, *dialog),
            ScriptEvent::PointerDown { at, scroll } => {
                viewer.pointer_down(*at, *scroll);
                Vec::new()
            }
            ScriptEvent::PointerMove(at) => viewer.pointer_move(*at),
            ScriptEvent::PointerUp => {
                viewer.pointer_up();
                Vec::new()
            }
            ScriptEvent::Layout(metrics) => match self.pending_layout.take() {
                Some((surface, generation)) => viewer.after_layout(surface, generation, *metrics),
                None => Vec::new(),
            },
            ScriptEvent::Loaded(token) => {
                let surface = if viewer.reader().is_open() {
                    Surface::Reader
                } else {
                    Surface::Gallery
                };
                let token = token
                    .map(ImageToken)
                    .or_else(|| viewer.current_image(surface));
                match token {
                    Some(token) => viewer.image_loaded(surface, token),
                    None => Vec::new(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_skips_comments_and_blank_lines() -> anyhow::Result<()> {
        let script = parse_script(
            "# open the second volume\n\nnavigate #/read/2/0\nkey Space\nclick 10 900\n",
        )?;
        let events: Vec<_> = script.iter().map(|l| l.event.clone()).collect();
        assert_eq!(
            events,
            vec![
                ScriptEvent::Navigate("#/read/2/0".to_owned()),
                ScriptEvent::Key(Key::Space),
                ScriptEvent::Click {
                    x: 10.0,
                    width: 900.0
                },
            ]
        );
        assert_eq!(script[0].line, 3);
        Ok(())
    }

    #[test]
    fn parse_pointer_and_layout_events() -> anyhow::Result<()> {
        assert_eq!(
            "down 5 6".parse::<ScriptEvent>()?,
            ScriptEvent::PointerDown {
                at: Point { x: 5.0, y: 6.0 },
                scroll: ScrollOffset::default(),
            }
        );
        assert_eq!(
            "layout 2000 3000 1000 800".parse::<ScriptEvent>()?,
            ScriptEvent::Layout(ViewportMetrics {
                content_width: 2000.0,
                content_height: 3000.0,
                client_width: 1000.0,
                client_height: 800.0,
            })
        );
        assert_eq!("loaded 4".parse::<ScriptEvent>()?, ScriptEvent::Loaded(Some(4)));
        Ok(())
    }

    #[test]
    fn parse_errors_name_the_line() {
        let err = parse_script("next\nclick 10\n").unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("script line 2"), "{message}");
        assert!(message.contains("expected 2 numbers"), "{message}");
    }

    fn viewer() -> Viewer {
        let manifest = crate::manifest::parse(
            br#"{"volumes":[{"number":1,"title":"First","pages":3}],"conceptArt":[]}"#,
        )
        .unwrap();
        Viewer::new(
            Some(manifest),
            &crate::config::ViewerConfig::default(),
            Box::new(MemoryHistory::new("#/read/1")),
            Box::new(MemoryStorage::new()),
            Box::new(NoopLoader),
        )
    }

    #[test]
    fn drive_reports_every_step() -> anyhow::Result<()> {
        let script = parse_script("key Space\nzoom\nlayout 2000 3000 1000 800\nback\n")?;
        let mut viewer = viewer();
        let reports = drive(&mut viewer, &script);

        assert_eq!(reports.len(), 5);
        assert_eq!(reports[0].event, "start");
        assert_eq!(reports[0].state.fragment, "#/read/1/0");
        assert_eq!(reports[1].state.fragment, "#/read/1/1");
        assert!(reports[2].state.zoomed);
        assert_eq!(
            reports[3].effects,
            vec![Effect::ScrollTo {
                surface: Surface::Reader,
                offset: ScrollOffset {
                    left: 500.0,
                    top: 1100.0,
                },
            }]
        );
        // A single entry has nowhere to go back to.
        assert!(reports[4].effects.is_empty());
        Ok(())
    }

    #[test]
    fn loaded_defaults_to_current_image() -> anyhow::Result<()> {
        let script = parse_script("next\nloaded 1\nloaded\n")?;
        let mut viewer = viewer();
        let reports = drive(&mut viewer, &script);

        assert!(reports[2].effects.is_empty(), "stale token must be ignored");
        assert!(matches!(
            reports[3].effects.as_slice(),
            [Effect::ImageReady { token: ImageToken(2), .. }]
        ));
        assert!(reports[3].state.image_loaded);
        Ok(())
    }

    #[test]
    fn unknown_event_is_rejected() {
        assert!("teleport 3".parse::<ScriptEvent>().is_err());
    }
}
