//! Static tag-name tables and punctuation sets.

/// Tags decomposed (removed with their subtree) by the cleaner by default.
///
/// `form` is deliberately absent: some sites wrap the whole page in one.
pub const DECOMPOSE_TAGS: &[&str] = &[
    // Document metadata
    "style",
    // Content sectioning
    "aside", "nav",
    // Scripting
    "canvas", "noscript", "script",
    // Tables
    "caption", "col", "colgroup", "table", "tbody", "td", "tfoot", "th", "thead", "tr",
    // Forms
    "button", "datalist", "fieldset", "input", "label", "legend", "meter", "optgroup",
    "option", "output", "progress", "select", "textarea",
    // Interactive elements
    "details", "dialog", "menu", "summary",
    // Web components
    "slot", "template",
];

/// Inline text-semantics tags that are unwrapped (children kept).
pub const MARKUP_TAGS: &[&str] = &[
    "abbr", "b", "bdi", "bdo", "cite", "code", "data", "dfn", "em", "i", "kbd", "mark", "q",
    "rb", "rp", "rt", "rtc", "ruby", "s", "samp", "small", "strong", "sub", "sup", "u", "var",
    "del", "ins",
];

/// Sectioning content; a header/footer inside one of these is kept.
pub const SECTIONING_TAGS: &[&str] = &["article", "aside", "nav", "section"];

/// Image and multimedia elements.
pub const IMAGE_AND_MULTIMEDIA_TAGS: &[&str] = &["area", "audio", "img", "map", "track", "video"];

/// Embedded content elements.
pub const EMBEDDED_CONTENT_TAGS: &[&str] = &["embed", "iframe", "object", "param", "picture", "source"];

/// Whether `tag` is an image, multimedia or embedded-content element.
#[must_use]
pub fn is_media_tag(tag: &str) -> bool {
    IMAGE_AND_MULTIMEDIA_TAGS.contains(&tag) || EMBEDDED_CONTENT_TAGS.contains(&tag)
}

/// Candidate tag sets for locating the top tag, tried in order.
pub const TOP_TAG_CANDIDATES: &[&[&str]] = &[&["p"], &["span", "ol", "ul"], &["div", "section"]];

/// Text-bearing tag sets for body text, from narrowest to broadest.
pub const TEXT_TAG_SETS: &[&[&str]] = &[
    &["p", "li", "pre", "blockquote", "dt", "dd"],
    &["p", "li", "pre", "blockquote", "dt", "dd", "span"],
    &["p", "li", "pre", "blockquote", "dt", "dd", "span", "div", "section"],
];

/// Containers removed from the body text when their link density is too high.
pub const LINK_HEAVY_SECTION_TAGS: &[&str] = &["section", "div", "ol", "ul"];

/// No space is inserted after text ending in one of these characters.
pub const LEFT_NOSPACE: &[char] = &[
    '"', '$', '\'', '(', '-', '/', '[', '{',
    '\u{00a1}', '\u{00a3}', '\u{00a4}', '\u{00a5}', '\u{00ab}', '\u{00bf}',
    '\u{2010}', '\u{2011}', '\u{2018}', '\u{201a}', '\u{201b}', '\u{201c}', '\u{201e}',
    '\u{201f}', '\u{2027}', '\u{2035}', '\u{2036}', '\u{2037}', '\u{2039}', '\u{203b}',
    '\u{0e3f}', '\u{20a1}', '\u{20a2}', '\u{20a3}', '\u{20a4}', '\u{20a6}', '\u{20a9}',
    '\u{20aa}', '\u{20ac}', '\u{20ad}', '\u{20ae}', '\u{20b1}', '\u{20b4}', '\u{20b5}',
    '\u{20b9}', '\u{20ba}', '\u{20be}', '\u{20bf}',
];

/// No space is inserted before text starting with one of these characters.
pub const RIGHT_NOSPACE: &[char] = &[
    '!', '"', '%', '\'', ')', '*', ',', '-', '.', '/', ':', ';', '?', ']', '}',
    '\u{00a2}', '\u{00b0}', '\u{00bb}',
    '\u{2010}', '\u{2011}', '\u{2019}', '\u{201d}', '\u{2020}', '\u{2021}', '\u{2026}',
    '\u{2027}', '\u{2030}', '\u{2031}', '\u{2032}', '\u{2033}', '\u{2034}', '\u{203a}',
    '\u{203c}', '\u{203d}',
    '\u{20a5}', '\u{20ab}', '\u{20b0}', '\u{20b2}', '\u{20bb}', '\u{20bc}',
];
