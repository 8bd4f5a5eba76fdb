use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static VIDEO_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").expect("video id pattern is valid"));

const WATCH_HOSTS: [&str; 5] = [
    "youtube.com",
    "www.youtube.com",
    "m.youtube.com",
    "music.youtube.com",
    "gaming.youtube.com",
];

/// Path prefixes on the main hosts that carry the video id as the next segment.
const ID_PATH_PREFIXES: [&str; 4] = ["embed", "v", "shorts", "live"];

/// Extract the video id from a YouTube link, if it is one.
pub fn video_id(link: &str) -> Option<String> {
    let url = Url::parse(link).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }

    let host = url.host_str()?;
    let id = if host == "youtu.be" {
        url.path_segments()?.next().map(str::to_owned)
    } else if WATCH_HOSTS.contains(&host) {
        let mut segments = url.path_segments()?;
        match segments.next()? {
            "watch" => url
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned()),
            prefix if ID_PATH_PREFIXES.contains(&prefix) => segments.next().map(str::to_owned),
            _ => None,
        }
    } else {
        None
    };

    let id = id?;
    VIDEO_ID.is_match(&id).then_some(id)
}

pub fn is_youtube_url(link: &str) -> bool {
    video_id(link).is_some()
}
