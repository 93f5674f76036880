use std::{env, path::PathBuf};

const WATCHED_VARS: [&str; 4] = ["FFMPEG_DIR", "VCPKG_ROOT", "VCPKGRS_DYNAMIC", "VCPKGRS_TRIPLET"];

fn main() {
    for var in WATCHED_VARS {
        println!("cargo:rerun-if-env-changed={var}");
    }

    // ffmpeg-sys-next finds FFmpeg through pkg-config everywhere but Windows.
    let target_os = env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    if target_os != "windows" || env::var_os("FFMPEG_DIR").is_some() {
        return;
    }

    match vcpkg_ffmpeg_dir() {
        Some(dir) if dir.exists() => {
            warn(&format!(
                "found FFmpeg under vcpkg at {0}; set FFMPEG_DIR={0} to decode videos with it",
                dir.display()
            ));
            if env::var_os("VCPKGRS_DYNAMIC").is_none() {
                warn("set VCPKGRS_DYNAMIC=1 if the vcpkg FFmpeg build is dynamic");
            }
        }
        Some(dir) => warn(&format!("VCPKG_ROOT is set but {} does not exist", dir.display())),
        None => warn("FFMPEG_DIR is not set; install FFmpeg (e.g. with vcpkg) and point FFMPEG_DIR at it"),
    }
}

fn vcpkg_ffmpeg_dir() -> Option<PathBuf> {
    let root = env::var_os("VCPKG_ROOT")?;
    let triplet = env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| "x64-windows".to_string());
    Some(PathBuf::from(root).join("installed").join(triplet))
}

fn warn(message: &str) {
    println!("cargo:warning=framesift: {message}");
}
