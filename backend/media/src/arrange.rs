//! Upload validation and merge ordering.

use reelforge_core::{ReelError, ReelResult, UploadedFile};

/// Fewest videos a merge accepts.
pub const MIN_VIDEOS: usize = 2;

pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv", "wmv"];
pub const LOGO_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

pub fn ensure_min_videos(videos: &[UploadedFile]) -> ReelResult<()> {
    if videos.len() < MIN_VIDEOS {
        return Err(ReelError::NotEnoughVideos { got: videos.len() });
    }
    Ok(())
}

pub fn validate_video(file: &UploadedFile) -> ReelResult<()> {
    validate_extension(file, VIDEO_EXTENSIONS)
}

pub fn validate_logo(file: &UploadedFile) -> ReelResult<()> {
    validate_extension(file, LOGO_EXTENSIONS)
}

fn validate_extension(file: &UploadedFile, allowed: &[&str]) -> ReelResult<()> {
    if file.data.is_empty() {
        return Err(ReelError::UnsupportedUpload {
            name: file.name.clone(),
            reason: "file is empty".into(),
        });
    }
    match file.extension() {
        Some(ext) if allowed.contains(&ext.as_str()) => Ok(()),
        _ => Err(ReelError::UnsupportedUpload {
            name: file.name.clone(),
            reason: format!("expected one of: {}", allowed.join(", ")),
        }),
    }
}

/// Split a user-supplied sequence into file names, one per line. Commas are
/// legal in file names and are not separators. Blank lines are ignored.
pub fn parse_order(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Reorder uploads to follow `order`, a list of file names that must name
/// every upload exactly once. `None` keeps upload order.
pub fn apply_order(
    uploads: Vec<UploadedFile>,
    order: Option<&[String]>,
) -> ReelResult<Vec<UploadedFile>> {
    let Some(order) = order else {
        return Ok(uploads);
    };
    if order.len() != uploads.len() {
        return Err(ReelError::IncompleteOrder(format!(
            "{} of {} videos selected",
            order.len(),
            uploads.len()
        )));
    }

    let mut slots: Vec<Option<UploadedFile>> = uploads.into_iter().map(Some).collect();
    let mut arranged = Vec::with_capacity(slots.len());
    for name in order {
        let slot = slots
            .iter_mut()
            .find(|slot| slot.as_ref().is_some_and(|f| &f.name == name))
            .ok_or_else(|| ReelError::IncompleteOrder(format!("no unused upload named {name}")))?;
        if let Some(file) = slot.take() {
            arranged.push(file);
        }
    }
    Ok(arranged)
}
