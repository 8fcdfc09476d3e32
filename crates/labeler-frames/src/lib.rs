#![warn(missing_docs)]
//! `labeler-frames` - the loading collaborator for the labeling tool.
//!
//! A capture is one recording of one person performing one gesture, filmed by
//! several cameras at once. On disk each camera's frames live in a directory
//! named `p{person:03}g{gesture:02}c{camera:02}` containing one file per
//! frame, ordered by file name; the labeling for the capture is saved next to
//! them as `p{person:03}g{gesture:02}_spots.json`.
//!
//! [`scan_captures`] discovers capture sets in a data folder;
//! [`SyncedFrameDirs`] streams their frames in progressively, one frame per
//! camera per [`SequenceSource::load_next`] call, so the labeling session can
//! start before everything is read.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use labeler_core::SequenceSource;
use regex::Regex;
use tracing::{debug, warn};

static CAMERA_DIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^p(\d{3})g(\d{2})c(\d{2})$").expect("camera directory pattern")
});

/// Failure while discovering or opening a capture.
#[derive(Debug)]
pub enum FrameError {
    /// The data folder does not exist or is not a directory.
    MissingFolder(PathBuf),
    /// A capture has no camera directories.
    NoCameras,
    /// Filesystem access failed.
    Io {
        /// The path being accessed.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },
}

impl std::fmt::Display for FrameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameError::MissingFolder(path) => {
                write!(f, "Folder '{}' doesn't exist", path.display())
            }
            FrameError::NoCameras => write!(f, "Capture has no camera directories"),
            FrameError::Io { path, source } => {
                write!(f, "Cannot read '{}': {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for FrameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FrameError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// One discovered capture: a (person, gesture) pair and its camera frame
/// directories.
#[derive(Debug, Clone)]
pub struct Capture {
    /// Person identifier (the `pNNN` part).
    pub person: u16,
    /// Gesture identifier (the `gNN` part).
    pub gesture: u8,
    /// Camera id mapped to that camera's frame directory.
    pub cameras: BTreeMap<u8, PathBuf>,
}

impl Capture {
    /// File name the capture's labeling is saved under.
    pub fn spot_file_name(&self) -> String {
        format!("p{:03}g{:02}_spots.json", self.person, self.gesture)
    }

    /// Short display label, e.g. `p001g02`.
    pub fn label(&self) -> String {
        format!("p{:03}g{:02}", self.person, self.gesture)
    }
}

/// Discover capture sets in the first level of `folder`.
///
/// Directory entries matching the `pNNNgNNcNN` camera naming are grouped by
/// (person, gesture) and returned in that order; everything else is skipped.
pub fn scan_captures(folder: &Path) -> Result<Vec<Capture>, FrameError> {
    if !folder.is_dir() {
        return Err(FrameError::MissingFolder(folder.to_path_buf()));
    }

    let entries = fs::read_dir(folder).map_err(|source| FrameError::Io {
        path: folder.to_path_buf(),
        source,
    })?;

    let mut grouped: BTreeMap<(u16, u8), BTreeMap<u8, PathBuf>> = BTreeMap::new();
    for entry in entries {
        let entry = entry.map_err(|source| FrameError::Io {
            path: folder.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(captures) = CAMERA_DIR.captures(name) else {
            debug!(entry = name, "skipping non-capture directory");
            continue;
        };
        // The pattern guarantees the digit groups parse.
        let person: u16 = captures[1].parse().expect("three digits");
        let gesture: u8 = captures[2].parse().expect("two digits");
        let camera: u8 = captures[3].parse().expect("two digits");
        grouped.entry((person, gesture)).or_default().insert(camera, path);
    }

    Ok(grouped
        .into_iter()
        .map(|((person, gesture), cameras)| Capture {
            person,
            gesture,
            cameras,
        })
        .collect())
}

/// One position's content: each camera's frame bytes, keyed by camera id.
pub type FrameSet = BTreeMap<u8, Vec<u8>>;

/// Progressive loader over the frame directories of one capture.
///
/// The synchronized length is the smallest frame count across cameras; each
/// [`SequenceSource::load_next`] call reads the next frame of every camera.
/// The labeling session only consumes the loaded count - frame content is for
/// rendering.
pub struct SyncedFrameDirs {
    tracks: BTreeMap<u8, Vec<PathBuf>>,
    total: usize,
    loaded: Vec<FrameSet>,
}

impl SyncedFrameDirs {
    /// Open a capture's camera directories and index their frame files.
    ///
    /// Fails if a directory cannot be listed; a capture with no cameras is
    /// rejected. Frames are ordered by file name within each camera.
    pub fn open(cameras: &BTreeMap<u8, PathBuf>) -> Result<Self, FrameError> {
        if cameras.is_empty() {
            return Err(FrameError::NoCameras);
        }

        let mut tracks = BTreeMap::new();
        for (&camera, dir) in cameras {
            let entries = fs::read_dir(dir).map_err(|source| FrameError::Io {
                path: dir.clone(),
                source,
            })?;
            let mut frames = Vec::new();
            for entry in entries {
                let entry = entry.map_err(|source| FrameError::Io {
                    path: dir.clone(),
                    source,
                })?;
                if entry.path().is_file() {
                    frames.push(entry.path());
                }
            }
            frames.sort();
            tracks.insert(camera, frames);
        }

        let total = tracks.values().map(Vec::len).min().unwrap_or(0);
        debug!(cameras = tracks.len(), frames = total, "opened capture");
        Ok(Self {
            tracks,
            total,
            loaded: Vec::new(),
        })
    }

    /// Camera ids in this capture.
    pub fn cameras(&self) -> impl Iterator<Item = u8> + '_ {
        self.tracks.keys().copied()
    }
}

impl SequenceSource for SyncedFrameDirs {
    type Item = FrameSet;

    fn total_len(&self) -> usize {
        self.total
    }

    fn loaded_len(&self) -> usize {
        self.loaded.len()
    }

    fn load_next(&mut self) -> usize {
        let index = self.loaded.len();
        if index >= self.total {
            return self.loaded.len();
        }

        let mut set = FrameSet::new();
        for (&camera, frames) in &self.tracks {
            let path = &frames[index];
            // An unreadable frame must not stall loading; later frames (and
            // the labeling) stay reachable.
            let bytes = match fs::read(path) {
                Ok(bytes) => bytes,
                Err(err) => {
                    warn!(frame = %path.display(), %err, "frame read failed");
                    Vec::new()
                }
            };
            set.insert(camera, bytes);
        }
        self.loaded.push(set);
        self.loaded.len()
    }

    fn item(&self, index: usize) -> Option<&FrameSet> {
        self.loaded.get(index)
    }
}
