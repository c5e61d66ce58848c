use std::sync::LazyLock;

use regex::Regex;

use crate::resolver::types::TrackRecord;

/// Innermost bracketed segment, ASCII or full-width: "(Live)", "[Remix]", "（伴奏）", "【官方】".
static BRACKETED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*(?:\([^()]*\)|\[[^\[\]]*\]|（[^（）]*）|【[^【】]*】)").unwrap()
});

/// Dash-separated trailing annotation: "- Remastered 2011", "- Live at Wembley", "- Radio Edit".
static DASH_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\s+[-–—]\s+[^-–—]*\b(?:remaster(?:ed)?|live|remix|mix|edit|version|demo|instrumental|acoustic|mono|stereo)\b[^-–—]*$",
    )
    .unwrap()
});

static MULTI_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

fn collapse_whitespace(title: &str) -> String {
    MULTI_SPACE.replace_all(title, " ").trim().to_string()
}

fn strip_once(title: &str) -> String {
    let out = BRACKETED.replace_all(title, "");
    let out = DASH_SUFFIX.replace(&out, "");
    collapse_whitespace(&out)
}

/// Strip decorative annotations from a track title.
///
/// Passes repeat until nothing changes, so nested brackets are peeled one level at a time and
/// the result is a fixed point. A pass that would empty the title is not applied: "(Intro)"
/// stays "(Intro)".
pub fn normalize_title(title: &str) -> String {
    let mut current = collapse_whitespace(title);
    loop {
        let next = strip_once(&current);
        if next.is_empty() || next == current {
            return current;
        }
        current = next;
    }
}

/// `"<title> - <artist1> / <artist2>"`, with the title normalized unless `detailed`.
pub fn display_string(track: &TrackRecord, detailed: bool) -> String {
    let title = if detailed {
        track.title.clone()
    } else {
        normalize_title(&track.title)
    };
    format!("{} - {}", title, track.artists.join(" / "))
}
