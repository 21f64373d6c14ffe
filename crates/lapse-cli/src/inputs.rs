use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{bail, Context, Result};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tif", "tiff", "bmp", "webp"];

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn modified(path: &Path) -> Result<SystemTime> {
    let meta = std::fs::metadata(path)
        .with_context(|| format!("Failed to read metadata of {}", path.display()))?;
    Ok(meta.modified()?)
}

/// Expand directories into their image files and order the result by file
/// name, or by modification time when `sort_by_time` is set.
pub fn collect_inputs(paths: &[PathBuf], sort_by_time: bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let entries = std::fs::read_dir(path)
                .with_context(|| format!("Failed to read directory {}", path.display()))?;
            for entry in entries {
                let p = entry?.path();
                if p.is_file() && is_image(&p) {
                    files.push(p);
                }
            }
        } else if path.is_file() {
            files.push(path.clone());
        } else {
            bail!("No such file or directory: {}", path.display());
        }
    }

    if sort_by_time {
        let mut timed = files
            .into_iter()
            .map(|p| Ok((modified(&p)?, p)))
            .collect::<Result<Vec<_>>>()?;
        timed.sort();
        files = timed.into_iter().map(|(_, p)| p).collect();
    } else {
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()).then(a.cmp(b)));
    }
    Ok(files)
}
