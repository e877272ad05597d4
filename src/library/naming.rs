//! On-disk naming scheme for stored tracks
//!
//! Stored files are named `<unix-millis>-<random>-<original>`. The list
//! endpoint recovers a display name by stripping that generated prefix, so
//! the format is part of the external contract.

use rand::Rng;

/// Suffix that marks a file as a listable track.
pub const MP3_SUFFIX: &str = ".mp3";

/// Suffix of files still being written by an upload.
pub const PARTIAL_SUFFIX: &str = ".part";

/// Declared MIME types accepted as MPEG audio.
pub const MPEG_AUDIO_TYPES: [&str; 2] = ["audio/mpeg", "audio/mp3"];

/// Duration reported for every track; audio is never inspected.
pub const PLACEHOLDER_DURATION: &str = "0:00";

/// Upper bound (inclusive) of the random component.
const RANDOM_CEILING: u32 = 1_000_000_000;

/// Current Unix time in milliseconds
pub fn unix_millis() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default()
}

pub fn random_component() -> u32 {
    rand::thread_rng().gen_range(0..=RANDOM_CEILING)
}

/// Build the collision-resistant on-disk name for an upload.
pub fn generate_filename(original: &str, millis: u64, random: u32) -> String {
    format!("{millis}-{random}-{original}")
}

/// Reduce a client-supplied filename to its final path component.
///
/// Browsers send bare names, but nothing stops a client from sending
/// `../../etc/passwd` or a Windows path.
pub fn original_name(raw: &str) -> &str {
    raw.rsplit(['/', '\\']).next().unwrap_or(raw).trim()
}

/// Accept when the declared MIME type is MPEG audio OR the name ends in `.mp3`.
pub fn is_mp3_upload(content_type: Option<&str>, original: &str) -> bool {
    let mime_ok = content_type.is_some_and(|ct| {
        let essence = ct.split(';').next().unwrap_or(ct).trim();
        MPEG_AUDIO_TYPES
            .iter()
            .any(|t| essence.eq_ignore_ascii_case(t))
    });
    mime_ok || original.to_ascii_lowercase().ends_with(MP3_SUFFIX)
}

/// Display name of a listed file: generated prefix and `.mp3` removed.
///
/// # Examples
/// ```ignore
/// assert_eq!(display_name("42-7-mysong.mp3"), "mysong");
/// ```
pub fn display_name(filename: &str) -> String {
    upload_display_name(strip_generated_prefix(filename))
}

/// Display name returned by the upload endpoint: only the first `.mp3` is
/// removed, the name is otherwise left as the client sent it.
pub fn upload_display_name(original: &str) -> String {
    original.replacen(MP3_SUFFIX, "", 1)
}

/// Strip a leading `<digits>-<digits>-` prefix, if present.
fn strip_generated_prefix(filename: &str) -> &str {
    let Some(rest) = strip_number_and_dash(filename) else {
        return filename;
    };
    strip_number_and_dash(rest).unwrap_or(filename)
}

fn strip_number_and_dash(s: &str) -> Option<&str> {
    let digits = s.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    s[digits..].strip_prefix('-')
}

/// A filename is safe to resolve inside the uploads directory when it is a
/// single, non-special path component.
pub fn is_safe_filename(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}
