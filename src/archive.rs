//! Writing frames to disk and zipping them.
//!
//! # Example
//!
//! ```no_run
//! use framesift::archive;
//!
//! # fn example(frames: &[framesift::Frame]) -> Result<(), framesift::SiftError> {
//! archive::write_frames(frames, "out/clip")?;
//! let zip_path = archive::compress("out/clip")?;
//! println!("{}", zip_path.display());
//! # Ok(())
//! # }
//! ```

use std::{
    fs::{self, File},
    io::{self, BufWriter},
    path::{Path, PathBuf},
};

use image::ImageFormat;
use walkdir::WalkDir;
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

use crate::{error::SiftError, sample::Frame};

/// Write `frames` as `frame_000000.png`, `frame_000001.png`, ... into `dir`.
///
/// Files are numbered by position in `frames`, not by sequence index. An
/// existing `dir` is removed first so the directory only ever holds this
/// sequence.
///
/// # Errors
///
/// Returns [`SiftError::IoError`] or [`SiftError::ImageError`] if the
/// directory cannot be replaced or a frame cannot be encoded.
pub fn write_frames<P: AsRef<Path>>(frames: &[Frame], dir: P) -> Result<(), SiftError> {
    let dir = dir.as_ref();
    if dir.exists() {
        log::debug!("Removing existing directory {}", dir.display());
        fs::remove_dir_all(dir)?;
    }
    fs::create_dir_all(dir)?;

    for (position, frame) in frames.iter().enumerate() {
        let path = dir.join(format!("frame_{position:06}.png"));
        frame.image.save_with_format(&path, ImageFormat::Png)?;
    }

    log::info!("Wrote {} frames to {}", frames.len(), dir.display());
    Ok(())
}

/// Zip the contents of `dir` into `dir.zip` next to it.
///
/// Entries are stored relative to `dir`; subdirectories are kept. On
/// failure the partially written archive is removed.
///
/// # Errors
///
/// Returns [`SiftError::ArchiveError`] if `dir` is not a directory, or the
/// underlying I/O or zip error.
pub fn compress<P: AsRef<Path>>(dir: P) -> Result<PathBuf, SiftError> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(SiftError::ArchiveError(format!(
            "{} is not a directory",
            dir.display()
        )));
    }

    let zip_path = zip_path_for(dir)?;
    if let Err(error) = write_zip(dir, &zip_path) {
        if zip_path.exists() {
            let _ = fs::remove_file(&zip_path);
        }
        return Err(error);
    }

    log::info!("Compressed {} into {}", dir.display(), zip_path.display());
    Ok(zip_path)
}

fn zip_path_for(dir: &Path) -> Result<PathBuf, SiftError> {
    let name = dir.file_name().ok_or_else(|| {
        SiftError::ArchiveError(format!("{} has no file name", dir.display()))
    })?;
    let mut file_name = name.to_os_string();
    file_name.push(".zip");
    Ok(dir.with_file_name(file_name))
}

fn write_zip(dir: &Path, zip_path: &Path) -> Result<(), SiftError> {
    let file = File::create(zip_path)?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|error| SiftError::ArchiveError(error.to_string()))?;
        let name = entry_name(dir, entry.path())?;
        let file_type = entry.file_type();

        if file_type.is_dir() {
            zip.add_directory(format!("{name}/"), options)?;
        } else if file_type.is_file() {
            zip.start_file(name, options)?;
            let mut source = File::open(entry.path())?;
            io::copy(&mut source, &mut zip)?;
        } else {
            log::debug!("Skipping {} (not a regular file)", entry.path().display());
        }
    }

    zip.finish()?;
    Ok(())
}

/// `path` relative to `root`, `/`-separated.
fn entry_name(root: &Path, path: &Path) -> Result<String, SiftError> {
    let relative = path
        .strip_prefix(root)
        .map_err(|error| SiftError::ArchiveError(error.to_string()))?;
    Ok(relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/"))
}
