//! Key bindings and pointer geometry shared by the reader and the gallery.

use std::str::FromStr;

use crate::reader::ReaderMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Escape,
    Space,
    Char(char),
}

impl FromStr for Key {
    type Err = anyhow::Error;

    /// Accepts DOM `KeyboardEvent.key` names plus `Space` as an alias for `" "`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ArrowLeft" | "Left" => Ok(Self::ArrowLeft),
            "ArrowRight" | "Right" => Ok(Self::ArrowRight),
            "Escape" | "Esc" => Ok(Self::Escape),
            " " | "Space" | "Spacebar" => Ok(Self::Space),
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Self::Char(c)),
                    _ => anyhow::bail!("unsupported key: {other:?}"),
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Previous,
    Next,
    Close,
    ToggleZoom,
    StartReading,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

fn common_action(key: Key) -> Option<Action> {
    match key {
        Key::ArrowLeft | Key::Char('a' | 'A') => Some(Action::Previous),
        Key::ArrowRight | Key::Char('d' | 'D') => Some(Action::Next),
        Key::Escape => Some(Action::Close),
        _ => None,
    }
}

/// Space starts reading from the cover and toggles zoom once a page is showing.
pub fn reader_action(key: Key, mode: ReaderMode) -> Option<Action> {
    match (key, mode) {
        (Key::Space, ReaderMode::Cover) => Some(Action::StartReading),
        (Key::Space, ReaderMode::Reading) => Some(Action::ToggleZoom),
        _ => common_action(key),
    }
}

pub fn gallery_action(key: Key) -> Option<Action> {
    match key {
        Key::Space => Some(Action::ToggleZoom),
        _ => common_action(key),
    }
}

/// Left third of the image goes back, the rest goes forward.
pub fn click_direction(click_x: f64, width: f64) -> Direction {
    if click_x < width / 3.0 {
        Direction::Previous
    } else {
        Direction::Next
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.left <= x && x <= self.right && self.top <= y && y <= self.bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_dom_key_names() {
        assert_eq!("ArrowLeft".parse::<Key>().unwrap(), Key::ArrowLeft);
        assert_eq!(" ".parse::<Key>().unwrap(), Key::Space);
        assert_eq!("Space".parse::<Key>().unwrap(), Key::Space);
        assert_eq!("d".parse::<Key>().unwrap(), Key::Char('d'));
        assert!("Enter".parse::<Key>().is_err());
    }

    #[test]
    fn letters_mirror_arrows() {
        for key in [Key::ArrowLeft, Key::Char('a'), Key::Char('A')] {
            assert_eq!(gallery_action(key), Some(Action::Previous));
            assert_eq!(reader_action(key, ReaderMode::Reading), Some(Action::Previous));
        }
        for key in [Key::ArrowRight, Key::Char('d'), Key::Char('D')] {
            assert_eq!(gallery_action(key), Some(Action::Next));
        }
        assert_eq!(gallery_action(Key::Char('x')), None);
    }

    #[test]
    fn space_depends_on_reader_mode() {
        assert_eq!(
            reader_action(Key::Space, ReaderMode::Cover),
            Some(Action::StartReading)
        );
        assert_eq!(
            reader_action(Key::Space, ReaderMode::Reading),
            Some(Action::ToggleZoom)
        );
        assert_eq!(gallery_action(Key::Space), Some(Action::ToggleZoom));
        assert_eq!(gallery_action(Key::Escape), Some(Action::Close));
    }

    #[test]
    fn click_thirds() {
        assert_eq!(click_direction(0.0, 900.0), Direction::Previous);
        assert_eq!(click_direction(299.9, 900.0), Direction::Previous);
        assert_eq!(click_direction(300.0, 900.0), Direction::Next);
        assert_eq!(click_direction(899.0, 900.0), Direction::Next);
    }

    #[test]
    fn rect_contains_edges() {
        let rect = Rect {
            left: 10.0,
            top: 10.0,
            right: 110.0,
            bottom: 60.0,
        };
        assert!(rect.contains(10.0, 60.0));
        assert!(!rect.contains(9.0, 30.0));
        assert!(!rect.contains(50.0, 61.0));
    }
}
