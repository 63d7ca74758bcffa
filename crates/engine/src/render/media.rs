//! Embed URLs for hosted video fields.

use url::Url;

/// Convert a YouTube watch, short-link, shorts or embed URL into an embed URL.
///
/// Returns `None` for anything that does not identify a video.
pub fn youtube_embed_url(source: &str) -> Option<String> {
    let parsed = Url::parse(source.trim()).ok()?;
    let host = parsed.host_str()?;
    let host = host
        .strip_prefix("www.")
        .or_else(|| host.strip_prefix("m."))
        .unwrap_or(host);

    let video_id = match host {
        "youtu.be" => parsed.path_segments()?.next().map(str::to_string),
        "youtube.com" | "youtube-nocookie.com" => {
            let mut segments = parsed.path_segments()?;
            match segments.next() {
                Some("watch") => parsed
                    .query_pairs()
                    .find(|(key, _)| key == "v")
                    .map(|(_, value)| value.into_owned()),
                Some("embed") | Some("shorts") | Some("live") => segments.next().map(str::to_string),
                _ => None,
            }
        }
        _ => None,
    }?;

    if video_id.is_empty() {
        return None;
    }
    Some(format!("https://www.youtube.com/embed/{video_id}"))
}
