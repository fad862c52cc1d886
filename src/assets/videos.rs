//! Videos and embedded widgets: `<video>`, `<embed>`, `<object>`, `<iframe>`.
//!
//! Iframes are classified through a static platform table: a platform name
//! found in the host selects a set of host patterns, each with path patterns
//! mapped to an [`IframeKind`]. Unrecognized sources are logged and dropped.

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;
use url::Url;

use crate::dom::{NodeId, Tree};

/// Video MIME types in order of preference among `<source>` children.
const VIDEO_MIME_TYPES: &[&str] = &[
    "video/mp4",
    "video/ogg",
    "video/webm",
    "video/quicktime",
    "video/3gpp",
    "video/3gpp2",
    "video/3gp2",
];

/// What an iframe embeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IframeKind {
    Video,
    Comments,
    Links,
    Ignore,
}

use IframeKind::{Comments, Ignore, Links, Video};

type PathRules = &'static [(&'static str, IframeKind)];

/// `(platform, [(host pattern, [(path pattern, kind)])])`
const IFRAME_PLATFORMS: &[(&str, &[(&str, PathRules)])] = &[
    (
        "google",
        &[
            (
                r"apis\.google\.com",
                &[
                    (r"/se/0/_/\+1/fastbutton", Ignore),
                    (r"/se/0/_/\+1/sharebutton", Ignore),
                ],
            ),
            (
                r"docs\.google\.com",
                &[
                    (r"/document/d/e/[a-zA-Z0-9_-]+/pub", Links),
                    (r"/forms/d/e/[a-zA-Z0-9_-]+/viewform", Links),
                    (r"/spreadsheets/d/e/[a-zA-Z0-9_-]+/pubhtml", Links),
                    (r"/presentation/d/e/[a-zA-Z0-9_-]+/embedded", Links),
                ],
            ),
            (r"drive\.google\.com", &[(r"/file/d/[a-zA-Z0-9_-]/preview", Links)]),
            (
                r"googleads\.g\.doubleclick\.net",
                &[
                    (r"/pagead/ads", Ignore),
                    (r"/pagead/html/.+\.html", Ignore),
                    (r"/pagead/render_post_image_v1\.html", Ignore),
                ],
            ),
            (r"imasdk\.googleapis\.com", &[(r"/js/core/bridge[\d.]+_en\.html", Ignore)]),
            (
                r"tpc\.googlesyndication\.com",
                &[(r"/safeframe/1-0-37/html/container\.html", Ignore)],
            ),
            (
                r"[0-9a-f]+\.safeframe\.googlesyndication\.com",
                &[(r"/safeframe/1-0-37/html/container\.html", Ignore)],
            ),
            (
                r"www\.google\.com",
                &[
                    (r"/maps/embed", Links),
                    (r"/recaptcha/api/fallback", Ignore),
                    (r"/recaptcha/api2/anchor", Ignore),
                    (r"/recaptcha/api2/bframe", Ignore),
                ],
            ),
        ],
    ),
    (
        "youtube",
        &[(
            r"www\.youtube\.com",
            &[
                (r"/embed/[a-zA-Z0-9_-]+", Video),
                (r"/embed/?", Video),
                (r"/watch", Video),
                (r"/subscribe_embed", Ignore),
            ],
        )],
    ),
    (
        "facebook",
        &[
            (
                r"www\.facebook\.com",
                &[
                    (r"/(v\d+\.\d+/)?plugins/video\.php", Video),
                    (r"/(v\d+\.\d+/)?plugins/comments\.php", Comments),
                    (r"/(v\d+\.\d+/)?plugins/feedback\.php", Comments),
                    (r"/(v\d+\.\d+/)?plugins/comment_embed\.php", Links),
                    (r"/(v\d+\.\d+/)?plugins/post\.php", Links),
                    (r"/(v\d+\.\d+/)?plugins/group\.php", Links),
                    (r"/(v\d+\.\d+/)?plugins/page\.php", Links),
                    (r"/(v\d+\.\d+/)?plugins/like\.php", Ignore),
                    (r"/(v\d+\.\d+/)?plugins/like_box\.php", Ignore),
                    (r"/plugins/likebox\.php", Ignore),
                    (r"/v\d+\.\d+/plugins/quote\.php", Ignore),
                    (r"/(v\d+\.\d+/)?plugins/save\.php", Ignore),
                    (r"/v\d+\.\d+/plugins/share_button\.php", Ignore),
                ],
            ),
            (
                r"web\.facebook\.com",
                &[
                    (r"/v\d+\.\d+/plugins/video\.php", Video),
                    (r"/v\d+\.\d+/plugins/comments\.php", Comments),
                    (r"/v\d+\.\d+/plugins/feedback\.php", Comments),
                    (r"/v\d+\.\d+/plugins/comment_embed\.php", Links),
                    (r"/v\d+\.\d+/plugins/post\.php", Links),
                    (r"/v\d+\.\d+/plugins/group\.php", Links),
                    (r"/v\d+\.\d+/plugins/page\.php", Links),
                    (r"/v\d+\.\d+/plugins/like\.php", Ignore),
                    (r"/v\d+\.\d+/plugins/like_box\.php", Ignore),
                    (r"/v\d+\.\d+/plugins/likebox\.php", Ignore),
                    (r"/v\d+\.\d+/plugins/quote\.php", Ignore),
                    (r"/v\d+\.\d+/plugins/save\.php", Ignore),
                    (r"/v\d+\.\d+/plugins/share_button\.php", Ignore),
                ],
            ),
        ],
    ),
    (
        "instagram",
        &[(
            r"www\.instagram\.com",
            &[
                (r"/tv/[a-zA-Z0-9_-]+/embed/(captioned/)?", Video),
                (r"/p/[a-zA-Z0-9_-]+/embed/", Links),
            ],
        )],
    ),
    (
        "okezone",
        &[
            (r"video\.okezone\.com", &[(r"/embed/.+==", Video)]),
            (r"sindikasi\.okezone\.com", &[(r"/widget(/.+)?", Ignore)]),
            (r"okezone\.visionplus\.id", &[(r"/widget-dark\.html", Ignore)]),
        ],
    ),
    (
        "twitch",
        &[
            (r"player\.twitch\.tv", &[(r"/", Video)]),
            (r"clips\.twitch\.tv", &[(r"/embed", Video)]),
            (r"www\.twitch\.tv", &[(r"/embed/[^/]/chat", Links)]),
        ],
    ),
    (
        "twitter",
        &[(
            r"platform\.twitter\.com",
            &[
                (r"/embed/index\.html", Links),
                (r"/widgets/tweet_button(\.[0-9a-f]+)?(\.[a-z]+)?\.html", Ignore),
                (r"/widgets/follow_button(\.[0-9a-f]+)?(\.[a-z]+)?\.html", Ignore),
                (r"/widgets/widget_iframe(\.[0-9a-f]+)?(\.[a-z]+)?\.html", Ignore),
            ],
        )],
    ),
    ("wordpress", &[(r"jetpack\.wordpress\.com", &[(r"/jetpack-comment/", Comments)])]),
    ("wp", &[(r"widgets\.wp\.com", &[(r"/likes/", Ignore)])]),
    (
        "spotify",
        &[(
            r"open\.spotify\.com",
            &[
                (r"/embed/track/", Links),
                (r"/embed/album/", Links),
                (r"/embed/artist/", Links),
                (r"/embed/playlist/", Links),
                (r"/embed-podcast/show/", Links),
                (r"/embed-podcast/episode/[a-zA-Z0-9_-]+", Links),
            ],
        )],
    ),
    ("detik", &[(r"20\.detik\.com", &[(r"/embed/\d+", Video)])]),
    ("tiktok", &[(r"www\.tiktok\.com", &[(r"/embed/v2", Video)])]),
    ("vimeo", &[(r"player\.vimeo\.com", &[(r"/video/\d+", Video)])]),
    (
        "dailymotion",
        &[(
            r"www\.dailymotion\.com",
            &[
                (r"/embed/video/[a-zA-Z0-9_-]+", Video),
                (r"/embed/playlist/[a-zA-Z0-9_-]+", Video),
            ],
        )],
    ),
    ("giphy", &[(r"giphy\.com", &[(r"/embed/[a-zA-Z0-9_-]+", Video)])]),
    (
        "disqus",
        &[(r"disqus\.com", &[(r"/embed/comments/", Comments), (r"/p/", Links)])],
    ),
    ("straitstimes", &[(r"www\.straitstimes\.com", &[(r"/embed/\d+", Video)])]),
    (
        "brightcove",
        &[(r"players\.brightcove\.net", &[(r"/\d+/default_default/index\.html", Video)])],
    ),
    ("datawrapper", &[(r"datawrapper\.dwcdn\.net", &[(r"/[a-zA-Z0-9_-]{5}/1/", Links)])]),
    (
        "omny",
        &[(r"omny\.fm", &[(r"/shows/[a-zA-Z0-9_-]+/[a-zA-Z0-9_-]+/embed", Links)])],
    ),
    ("embedly", &[(r"cdn\.embedly\.com", &[(r"/widgets/media\.html", Video)])]),
    (
        "vidible",
        &[(
            r"delivery\.vidible\.tv",
            &[(r"/htmlembed/pid=[0-9a-f]+/[0-9a-f]+\.html", Video)],
        )],
    ),
    ("ustream", &[(r"www\.ustream\.tv", &[(r"/embed/\d+", Video)])]),
    (
        "graphicnews",
        &[(r"apps\.graphicnews\.com", &[(r"/links/(en/)?gn_swf/iframe\.php", Links)])],
    ),
];

/// Iframe sources that never carry content.
const IFRAME_SRC_IGNORELIST: &[&str] = &["javascript:void(0)", "about:blank"];

/// Known widget `(host, path)` patterns outside the platform table.
const IFRAME_WIDGET_IGNORELIST: &[(&str, &str)] = &[
    (r"draft\.blogger\.com", r"/navbar\.g"),
    (r"www\.blogger\.com", r"/navbar\.g"),
    (r"api\.dable\.io", r"/widgets/id/[a-zA-Z0-9]{8}/users/\d+\.\d+"),
    (r"widgets\.getpocket\.com", r"/v1/button"),
    (r"vastcdn\.outbrain\.com", r"/frame"),
    (r"embed\.rctiplus\.com", r"/newswidget/okezone"),
    (r"republika\.co\.id", r"/jadwal-sholat/"),
    (r"ws\.sharethis\.com", r"/secure5x/index\.html"),
    (r"index\.sindonews\.com", r"/widget"),
];

fn full_match(pattern: &str) -> Regex {
    Regex::new(&format!("^(?:{pattern})$")).expect("iframe pattern")
}

struct HostRules {
    host: Regex,
    paths: Vec<(Regex, IframeKind)>,
}

struct Platform {
    name: &'static str,
    hosts: Vec<HostRules>,
}

static PLATFORMS: LazyLock<Vec<Platform>> = LazyLock::new(|| {
    IFRAME_PLATFORMS
        .iter()
        .map(|(name, hosts)| Platform {
            name: *name,
            hosts: hosts
                .iter()
                .map(|(host, paths)| HostRules {
                    host: full_match(host),
                    paths: paths.iter().map(|(p, kind)| (full_match(p), *kind)).collect(),
                })
                .collect(),
        })
        .collect()
});

static WIDGET_IGNORELIST: LazyLock<Vec<(Regex, Regex)>> = LazyLock::new(|| {
    IFRAME_WIDGET_IGNORELIST
        .iter()
        .map(|(host, path)| (full_match(host), full_match(path)))
        .collect()
});

/// Network location and path of an iframe source. Protocol-relative
/// sources are read as https.
fn host_and_path(src: &str) -> Option<(String, String)> {
    let parsed = if src.starts_with("//") {
        Url::parse(&format!("https:{src}"))
    } else {
        Url::parse(src)
    };
    let url = parsed.ok()?;
    let host = url.host_str()?;
    let netloc = match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };
    Some((netloc, url.path().to_string()))
}

/// Classify an iframe `src`. `None` means the source is not recognized.
#[must_use]
pub fn classify_iframe(src: &str, page_url: Option<&str>) -> Option<IframeKind> {
    let src = src.trim();
    if src.is_empty() || IFRAME_SRC_IGNORELIST.contains(&src) {
        return Some(Ignore);
    }
    let Some((netloc, path)) = host_and_path(src) else {
        debug!(src, ?page_url, "unrecognized iframe source");
        return None;
    };

    if let Some(platform) = PLATFORMS.iter().find(|p| netloc.contains(p.name)) {
        let Some(host) = platform.hosts.iter().find(|h| h.host.is_match(&netloc)) else {
            debug!(src, ?page_url, platform = platform.name, "unrecognized iframe host");
            return None;
        };
        return match host.paths.iter().find(|(p, _)| p.is_match(&path)) {
            Some((_, kind)) => Some(*kind),
            None => {
                debug!(src, ?page_url, platform = platform.name, "unrecognized iframe path");
                None
            }
        };
    }

    if WIDGET_IGNORELIST
        .iter()
        .any(|(host, p)| host.is_match(&netloc) && p.is_match(&path))
    {
        return Some(Ignore);
    }
    debug!(src, ?page_url, "unrecognized iframe host");
    None
}

/// Source of a `<video>`: its `src`, else the `<source>` with the most
/// preferred video MIME type.
#[must_use]
pub fn video_source(tree: &Tree, video: NodeId) -> Option<String> {
    if let Some(src) = tree.attr(video, "src").filter(|s| !s.trim().is_empty()) {
        return Some(src.to_string());
    }
    let sources = tree.find_tags(video, &["source"]);
    if sources.is_empty() {
        debug!("video without src or source");
        return None;
    }
    for &source in &sources {
        let mime = tree.attr(source, "type");
        if !mime.is_some_and(|m| VIDEO_MIME_TYPES.contains(&m)) {
            debug!(?mime, "unrecognized video source type");
        }
    }
    VIDEO_MIME_TYPES.iter().find_map(|mime| {
        sources
            .iter()
            .find(|&&s| tree.attr(s, "type") == Some(*mime))
            .and_then(|&s| tree.attr(s, "src"))
            .map(str::to_string)
    })
}

/// Source of an `<embed>` (`src`) or `<object>` (`data`) with a video type.
#[must_use]
pub fn embedded_video_source(tree: &Tree, id: NodeId) -> Option<String> {
    let mime = tree.attr(id, "type")?;
    if !mime.starts_with("video") {
        // application/* embeds are not classified yet
        return None;
    }
    let attr = if tree.is_tag(id, "object") { "data" } else { "src" };
    tree.attr(id, attr).map(str::to_string)
}

/// Raw embeds found under a scope, sorted by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Embeds {
    pub videos: Vec<String>,
    pub links: Vec<String>,
    pub comment_areas: Vec<String>,
}

/// Collect iframes, videos, embeds and objects under `scope`, in that order.
#[must_use]
pub fn find_embeds(tree: &Tree, scope: NodeId, page_url: Option<&str>) -> Embeds {
    let mut embeds = Embeds::default();

    for iframe in tree.find_tags(scope, &["iframe"]) {
        let Some(src) = tree.attr(iframe, "src") else {
            continue;
        };
        let target = match classify_iframe(src, page_url) {
            Some(Video) => &mut embeds.videos,
            Some(Links) => &mut embeds.links,
            Some(Comments) => &mut embeds.comment_areas,
            Some(Ignore) | None => continue,
        };
        target.push(src.trim().to_string());
    }

    embeds.videos.extend(
        tree.find_tags(scope, &["video"])
            .into_iter()
            .filter_map(|v| video_source(tree, v)),
    );
    embeds.videos.extend(
        tree.find_tags(scope, &["embed"])
            .into_iter()
            .chain(tree.find_tags(scope, &["object"]))
            .filter_map(|e| embedded_video_source(tree, e)),
    );

    embeds
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iframe_platform_classification() {
        assert_eq!(
            classify_iframe("https://www.youtube.com/embed/abc_123", None),
            Some(Video)
        );
        assert_eq!(
            classify_iframe("//www.facebook.com/v2.5/plugins/comments.php?href=x", None),
            Some(Comments)
        );
        assert_eq!(
            classify_iframe("https://platform.twitter.com/embed/index.html?id=1", None),
            Some(Links)
        );
        assert_eq!(
            classify_iframe("https://www.youtube.com/subscribe_embed?channel=x", None),
            Some(Ignore)
        );
    }

    #[test]
    fn test_iframe_ignorelists_and_unknowns() {
        assert_eq!(classify_iframe("about:blank", None), Some(Ignore));
        assert_eq!(classify_iframe("  ", None), Some(Ignore));
        assert_eq!(
            classify_iframe("https://www.blogger.com/navbar.g?id=1", None),
            Some(Ignore)
        );
        assert_eq!(classify_iframe("https://unknown.example.com/w", None), None);
        assert_eq!(classify_iframe("https://m.youtube.com/embed/x", None), None);
        assert_eq!(classify_iframe("https://www.youtube.com/feed", None), None);
    }

    #[test]
    fn test_video_source_preference() {
        let tree = Tree::parse(
            r#"<video><source src="a.webm" type="video/webm"><source src="a.mp4" type="video/mp4"></video>
               <video src="direct.mp4"></video>
               <video></video>"#,
        );
        let videos = tree.find_tags(tree.root(), &["video"]);
        assert_eq!(video_source(&tree, videos[0]).as_deref(), Some("a.mp4"));
        assert_eq!(video_source(&tree, videos[1]).as_deref(), Some("direct.mp4"));
        assert_eq!(video_source(&tree, videos[2]), None);
    }

    #[test]
    fn test_find_embeds() {
        let tree = Tree::parse(
            r#"<div>
                <iframe src="https://player.vimeo.com/video/42"></iframe>
                <iframe src="https://disqus.com/embed/comments/?f=x"></iframe>
                <iframe src="https://open.spotify.com/embed-podcast/episode/abc"></iframe>
                <iframe src="https://ads.example.net/frame"></iframe>
                <embed type="video/mp4" src="clip.mp4">
                <embed type="application/x-shockwave-flash" src="a.swf">
                <object type="video/ogg" data="movie.ogv"></object>
            </div>"#,
        );
        let body = tree.body().unwrap();
        let embeds = find_embeds(&tree, body, Some("https://news.example.com/a"));
        assert_eq!(
            embeds.videos,
            vec!["https://player.vimeo.com/video/42", "clip.mp4", "movie.ogv"]
        );
        assert_eq!(embeds.comment_areas, vec!["https://disqus.com/embed/comments/?f=x"]);
        assert_eq!(embeds.links, vec!["https://open.spotify.com/embed-podcast/episode/abc"]);
    }
}
