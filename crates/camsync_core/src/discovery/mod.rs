//! Locating camera recordings inside a session folder.
//!
//! A session folder holds one raw clip per camera. Discovery collects every
//! file with a recognized video extension, drops duplicates that differ only
//! in filename case, and returns the result in a stable sorted order so that
//! downstream steps (reference-camera selection in particular) behave the
//! same on every filesystem.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Extensions treated as camera recordings, compared case-insensitively.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "avi", "mpeg", "mov"];

/// Collect the video files directly inside `folder`.
///
/// Subdirectories are not descended into. When two entries share the same
/// lowercased filename (seen on case-insensitive filesystems that surface
/// both `Cam1.MP4` and `cam1.mp4`), only the first in sorted order is kept.
pub fn find_video_files(folder: &Path) -> io::Result<Vec<PathBuf>> {
    let mut by_key: BTreeMap<String, PathBuf> = BTreeMap::new();

    for entry in fs::read_dir(folder)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() || !has_video_extension(&path) {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            debug!(?path, "skipping file with non-UTF-8 name");
            continue;
        };
        by_key.entry(name.to_lowercase()).or_insert(path);
    }

    Ok(by_key.into_values().collect())
}

fn has_video_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let lower = e.to_lowercase();
            VIDEO_EXTENSIONS.contains(&lower.as_str())
        })
        .unwrap_or(false)
}

/// Output filename for the synchronized copy of `source`.
///
/// A `raw_` prefix on the stem is dropped, `synced_` is prepended, and the
/// extension is always `.mp4` since trimmed output is re-encoded.
pub fn synced_name(source: &Path) -> String {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("camera");
    let base = stem.strip_prefix("raw_").unwrap_or(stem);
    format!("synced_{}.mp4", base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn touch(dir: &Path, name: &str) {
        File::create(dir.join(name)).unwrap();
    }

    #[test]
    fn finds_only_video_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "cam_b.mp4");
        touch(dir.path(), "cam_a.MOV");
        touch(dir.path(), "notes.txt");
        touch(dir.path(), "cam_c.mkv");

        let files = find_video_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["cam_a.MOV", "cam_b.mp4", "cam_c.mkv"]);
    }

    #[test]
    fn deduplicates_case_variants() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "Cam1.MP4");
        touch(dir.path(), "cam1.mp4");

        let files = find_video_files(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn ignores_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nested.mp4")).unwrap();
        touch(dir.path(), "cam.mp4");

        let files = find_video_files(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].is_file());
    }

    #[test]
    fn synced_name_strips_raw_prefix() {
        assert_eq!(synced_name(Path::new("/s/raw_cam1.MP4")), "synced_cam1.mp4");
        assert_eq!(synced_name(Path::new("/s/cam2.mkv")), "synced_cam2.mp4");
        assert_eq!(synced_name(Path::new("/s/rawhide.mp4")), "synced_rawhide.mp4");
    }
}
