//! Key bindings, loaded from `keymap.json` next to the tool.
//!
//! Every binding is a single character; the big step size rides along in the
//! same file. Missing file means defaults; a file that exists but does not
//! parse is an error (a silently ignored keymap is worse than none).

use std::fs;
use std::io;
use std::path::Path;

use labeler_core::Action;
use serde::{Deserialize, Serialize};

/// Key bindings and the configured big step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Keymap {
    /// Step one position forward.
    pub next_frame: char,
    /// Step `big_step` positions forward.
    pub next_frames: char,
    /// Step one position back.
    pub previous_frame: char,
    /// Step `big_step` positions back.
    pub previous_frames: char,
    /// Open / cancel / seek-to-start.
    pub begin_label: char,
    /// Commit / reopen / seek-to-end.
    pub end_label: char,
    /// Delete the interval under the cursor.
    pub delete_label: char,
    /// Persist the labeling.
    pub save_labels: char,
    /// Move on to the next capture.
    pub next_sequence: char,
    /// Leave the tool.
    pub exit: char,
    /// Positions covered by a big step.
    pub big_step: usize,
}

impl Default for Keymap {
    fn default() -> Self {
        Self {
            next_frame: 'f',
            next_frames: 'g',
            previous_frame: 'd',
            previous_frames: 's',
            begin_label: 'b',
            end_label: 'n',
            delete_label: 'x',
            save_labels: 'w',
            next_sequence: 'm',
            exit: 'q',
            big_step: 10,
        }
    }
}

/// Failure loading a keymap file.
#[derive(Debug)]
pub enum KeymapError {
    /// The file exists but could not be read.
    Io(io::Error),
    /// The file exists but is not a valid keymap.
    Parse(serde_json::Error),
}

impl std::fmt::Display for KeymapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeymapError::Io(err) => write!(f, "Cannot read keymap: {}", err),
            KeymapError::Parse(err) => write!(f, "Invalid keymap: {}", err),
        }
    }
}

impl std::error::Error for KeymapError {}

impl Keymap {
    /// Load bindings from `path`, falling back to defaults when the file does
    /// not exist.
    pub fn load(path: &Path) -> Result<Self, KeymapError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path).map_err(KeymapError::Io)?;
        serde_json::from_str(&text).map_err(KeymapError::Parse)
    }

    /// Resolve a pressed character to a session action.
    pub fn action_for(&self, ch: char) -> Option<Action> {
        let big = self.big_step as isize;
        if ch == self.next_frame {
            Some(Action::Step { delta: 1 })
        } else if ch == self.next_frames {
            Some(Action::Step { delta: big })
        } else if ch == self.previous_frame {
            Some(Action::Step { delta: -1 })
        } else if ch == self.previous_frames {
            Some(Action::Step { delta: -big })
        } else if ch == self.begin_label {
            Some(Action::Begin)
        } else if ch == self.end_label {
            Some(Action::End)
        } else if ch == self.delete_label {
            Some(Action::Delete)
        } else if ch == self.save_labels {
            Some(Action::Save)
        } else if ch == self.next_sequence {
            Some(Action::Advance)
        } else if ch == self.exit {
            Some(Action::Quit)
        } else {
            None
        }
    }
}
