// Image roll module
// Owns the ordered image set and the state machine deciding when the current
// image must be decoded again versus just redrawn

use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Direction of a roll step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollDirection {
    Previous,
    Next,
    Refresh,
}

/// Whether the displayed texture matches the current index.
///
/// `Dirty` remembers which index the texture was decoded from, so stepping
/// away and back again between two draws does not force a reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RollState {
    /// The texture holds the image at `index`.
    Clean { index: usize },
    /// `index` is current but the texture holds `loaded` (or nothing yet).
    Dirty { index: usize, loaded: Option<usize> },
}

impl RollState {
    fn index(self) -> usize {
        match self {
            RollState::Clean { index } | RollState::Dirty { index, .. } => index,
        }
    }

    fn loaded(self) -> Option<usize> {
        match self {
            RollState::Clean { index } => Some(index),
            RollState::Dirty { loaded, .. } => loaded,
        }
    }

    fn with_index(self, index: usize) -> Self {
        match self.loaded() {
            Some(loaded) if loaded == index => RollState::Clean { index },
            loaded => RollState::Dirty { index, loaded },
        }
    }
}

/// Placement of an image inside the render target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Ordered set of image paths plus the roll position
#[derive(Debug)]
pub struct ImageRoll {
    images: Vec<PathBuf>,
    state: RollState,
}

impl ImageRoll {
    /// Create a roll from the startup paths, keeping the given order.
    /// Duplicates are dropped.
    pub fn new(paths: Vec<PathBuf>) -> Self {
        let mut images: Vec<PathBuf> = Vec::with_capacity(paths.len());
        for path in paths {
            if !images.contains(&path) {
                images.push(path);
            }
        }
        Self {
            images,
            state: RollState::Dirty {
                index: 0,
                loaded: None,
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// File name (not full path) of the current image; empty when the roll is
    /// empty
    pub fn current_name(&self) -> String {
        self.images
            .get(self.state.index())
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Step the current index. Never loads or renders.
    pub fn advance(&mut self, direction: RollDirection) {
        if self.images.is_empty() {
            return;
        }
        let len = self.images.len();
        let index = self.state.index();
        let index = match direction {
            RollDirection::Previous => (index + len - 1) % len,
            RollDirection::Next => (index + 1) % len,
            RollDirection::Refresh => index,
        };
        self.state = self.state.with_index(index);
    }

    /// Replace the roll with the PNG files found next to a dropped path.
    ///
    /// The scan covers the dropped directory itself, or the parent directory
    /// of a dropped file, non-recursively. If the dropped path is one of the
    /// matches it becomes the current image. A scan with no matches leaves
    /// the roll untouched.
    pub fn reset_from_dropped(&mut self, dropped: &Path) {
        let dir = if dropped.is_dir() {
            dropped.to_path_buf()
        } else {
            dropped.parent().map(Path::to_path_buf).unwrap_or_default()
        };

        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) => {
                warn!("drop ignored: cannot read {}: {}", dir.display(), err);
                return;
            }
        };

        let mut files = Vec::new();
        let mut index = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "png") {
                if path == dropped {
                    index = files.len();
                }
                files.push(path);
            }
        }

        if files.is_empty() {
            warn!("drop ignored: no .png files in {}", dir.display());
            return;
        }

        debug!("roll reset: {} file(s) from {}", files.len(), dir.display());
        self.images = files;
        self.state = RollState::Dirty {
            index,
            loaded: None,
        };
    }

    /// Path that must be decoded before the next draw, if any. `None` means
    /// the texture already matches the current index.
    pub fn pending_load(&self) -> Option<&Path> {
        match self.state {
            RollState::Dirty { index, .. } => self.images.get(index).map(PathBuf::as_path),
            RollState::Clean { .. } => None,
        }
    }

    /// Record that the image at the current index has been decoded and
    /// uploaded.
    pub fn mark_loaded(&mut self) {
        if let RollState::Dirty { index, .. } = self.state {
            if index < self.images.len() {
                self.state = RollState::Clean { index };
            }
        }
    }
}

/// Placement of an image of natural size (`img_w`, `img_h`) inside a target
/// of (`target_w`, `target_h`): downscale-only, aspect preserved, centered.
/// Odd remainders bias the origin toward the top/left.
pub fn fit_rect(img_w: u32, img_h: u32, target_w: u32, target_h: u32) -> FitRect {
    let (mut width, mut height) = (img_w, img_h);
    if img_w > target_w || img_h > target_h {
        // The more constrained dimension governs
        let scale = f64::max(
            img_w as f64 / target_w as f64,
            img_h as f64 / target_h as f64,
        );
        width = (img_w as f64 / scale) as u32;
        height = (img_h as f64 / scale) as u32;
    }
    FitRect {
        x: target_w.saturating_sub(width) / 2,
        y: target_h.saturating_sub(height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn roll_of(names: &[&str]) -> ImageRoll {
        ImageRoll::new(names.iter().map(PathBuf::from).collect())
    }

    /// Drives the decode-if-dirty half of a render, counting decodes.
    fn simulate_render(roll: &mut ImageRoll, loads: &mut usize) {
        if roll.pending_load().is_some() {
            *loads += 1;
            roll.mark_loaded();
        }
    }

    fn write_file(path: &Path, contents: &[u8]) {
        File::create(path).unwrap().write_all(contents).unwrap();
    }

    #[test]
    fn next_cycles_back_after_full_lap() {
        let mut roll = roll_of(&["a.png", "b.png", "c.png"]);
        let start = roll.current_name();
        for _ in 0..roll.len() {
            roll.advance(RollDirection::Next);
        }
        assert_eq!(roll.current_name(), start);
    }

    #[test]
    fn previous_cycles_back_after_full_lap() {
        let mut roll = roll_of(&["a.png", "b.png", "c.png"]);
        let start = roll.current_name();
        for _ in 0..roll.len() {
            roll.advance(RollDirection::Previous);
        }
        assert_eq!(roll.current_name(), start);
    }

    #[test]
    fn next_then_previous_round_trips() {
        for names in [
            &["a.png"][..],
            &["a.png", "b.png"][..],
            &["a.png", "b.png", "c.png"][..],
        ] {
            let mut roll = roll_of(names);
            roll.advance(RollDirection::Next);
            let start = roll.current_name();
            roll.advance(RollDirection::Next);
            roll.advance(RollDirection::Previous);
            assert_eq!(roll.current_name(), start);
        }
    }

    #[test]
    fn refresh_keeps_the_index() {
        let mut roll = roll_of(&["a.png", "b.png"]);
        roll.advance(RollDirection::Next);
        let name = roll.current_name();
        roll.advance(RollDirection::Refresh);
        assert_eq!(roll.current_name(), name);
    }

    #[test]
    fn wraps_backward_from_the_first_image() {
        let mut roll = roll_of(&["a.png", "b.png", "c.png"]);
        roll.advance(RollDirection::Previous);
        assert_eq!(roll.current_name(), "c.png");
    }

    #[test]
    fn empty_roll_is_inert() {
        let mut roll = ImageRoll::new(Vec::new());
        assert!(roll.is_empty());
        assert_eq!(roll.current_name(), "");
        assert!(roll.pending_load().is_none());
        roll.advance(RollDirection::Next);
        roll.advance(RollDirection::Previous);
        roll.mark_loaded();
        assert_eq!(roll.current_name(), "");
        assert!(roll.pending_load().is_none());
    }

    #[test]
    fn duplicate_startup_paths_collapse() {
        let roll = roll_of(&["a.png", "b.png", "a.png"]);
        assert_eq!(roll.len(), 2);
    }

    #[test]
    fn render_decodes_only_on_dirty_state() {
        let mut roll = roll_of(&["a.png", "b.png", "c.png"]);
        let mut loads = 0;

        simulate_render(&mut roll, &mut loads);
        assert_eq!(loads, 1);

        // Unchanged index: pure redraw
        simulate_render(&mut roll, &mut loads);
        assert_eq!(loads, 1);

        roll.advance(RollDirection::Next);
        simulate_render(&mut roll, &mut loads);
        assert_eq!(loads, 2);

        // Step away and back between draws: still the loaded image
        roll.advance(RollDirection::Next);
        roll.advance(RollDirection::Previous);
        simulate_render(&mut roll, &mut loads);
        assert_eq!(loads, 2);
    }

    #[test]
    fn resize_refresh_never_decodes() {
        let mut roll = roll_of(&["a.png", "b.png"]);
        let mut loads = 0;
        simulate_render(&mut roll, &mut loads);
        roll.advance(RollDirection::Refresh);
        simulate_render(&mut roll, &mut loads);
        assert_eq!(loads, 1);
    }

    #[test]
    fn dropped_file_becomes_current() {
        let dir = TempDir::new().unwrap();
        for name in ["a.png", "b.png", "c.png"] {
            write_file(&dir.path().join(name), b"png");
        }
        let mut roll = ImageRoll::new(Vec::new());
        roll.reset_from_dropped(&dir.path().join("b.png"));
        assert_eq!(roll.len(), 3);
        assert_eq!(roll.current_name(), "b.png");
        assert_eq!(roll.pending_load().unwrap(), dir.path().join("b.png"));
    }

    #[test]
    fn dropped_directory_starts_at_the_first_match() {
        let dir = TempDir::new().unwrap();
        write_file(&dir.path().join("only.png"), b"png");
        write_file(&dir.path().join("notes.txt"), b"text");
        let mut roll = ImageRoll::new(Vec::new());
        roll.reset_from_dropped(dir.path());
        assert_eq!(roll.len(), 1);
        assert_eq!(roll.current_name(), "only.png");
    }

    #[test]
    fn scan_filters_on_exact_extension() {
        let dir = TempDir::new().unwrap();
        write_file(&dir.path().join("keep.png"), b"png");
        write_file(&dir.path().join("skip.PNG"), b"png");
        write_file(&dir.path().join("skip.jpg"), b"jpg");
        let mut roll = ImageRoll::new(Vec::new());
        roll.reset_from_dropped(dir.path());
        assert_eq!(roll.len(), 1);
        assert_eq!(roll.current_name(), "keep.png");
    }

    #[test]
    fn scan_is_not_recursive() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        write_file(&dir.path().join("sub").join("nested.png"), b"png");
        write_file(&dir.path().join("top.png"), b"png");
        let mut roll = ImageRoll::new(Vec::new());
        roll.reset_from_dropped(dir.path());
        assert_eq!(roll.len(), 1);
        assert_eq!(roll.current_name(), "top.png");
    }

    #[test]
    fn empty_scan_preserves_the_previous_roll() {
        let empty = TempDir::new().unwrap();
        write_file(&empty.path().join("readme.txt"), b"text");

        let mut roll = roll_of(&["a.png", "b.png"]);
        roll.advance(RollDirection::Next);
        let mut loads = 0;
        simulate_render(&mut roll, &mut loads);

        roll.reset_from_dropped(empty.path());
        assert_eq!(roll.len(), 2);
        assert_eq!(roll.current_name(), "b.png");
        // State untouched too: no reload forced
        simulate_render(&mut roll, &mut loads);
        assert_eq!(loads, 1);
    }

    #[test]
    fn unreadable_directory_preserves_the_previous_roll() {
        let mut roll = roll_of(&["a.png"]);
        roll.reset_from_dropped(Path::new("/nonexistent/dropped.png"));
        assert_eq!(roll.len(), 1);
        assert_eq!(roll.current_name(), "a.png");
    }

    #[test]
    fn drop_forces_a_reload_even_for_the_same_position() {
        let dir = TempDir::new().unwrap();
        write_file(&dir.path().join("a.png"), b"png");
        let mut roll = ImageRoll::new(vec![dir.path().join("a.png")]);
        let mut loads = 0;
        simulate_render(&mut roll, &mut loads);
        roll.reset_from_dropped(&dir.path().join("a.png"));
        simulate_render(&mut roll, &mut loads);
        assert_eq!(loads, 2);
    }

    #[test]
    fn fit_shrinks_an_oversized_image() {
        let rect = fit_rect(2000, 1000, 1200, 900);
        assert_eq!(
            rect,
            FitRect {
                x: 0,
                y: 150,
                width: 1200,
                height: 600
            }
        );
    }

    #[test]
    fn fit_centers_a_smaller_image_without_upscaling() {
        let rect = fit_rect(800, 600, 1200, 900);
        assert_eq!(
            rect,
            FitRect {
                x: 200,
                y: 150,
                width: 800,
                height: 600
            }
        );
    }

    #[test]
    fn fit_uses_the_more_constrained_dimension() {
        let rect = fit_rect(3000, 3000, 1200, 900);
        assert_eq!(
            rect,
            FitRect {
                x: 150,
                y: 0,
                width: 900,
                height: 900
            }
        );
    }

    #[test]
    fn fit_exact_size_fills_the_target() {
        let rect = fit_rect(1200, 900, 1200, 900);
        assert_eq!(
            rect,
            FitRect {
                x: 0,
                y: 0,
                width: 1200,
                height: 900
            }
        );
    }
}
