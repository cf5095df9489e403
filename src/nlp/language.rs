//! Character-class language guess. Checked in order; the first script or
//! accent family present wins, English otherwise.

pub const ENGLISH: &str = "en";

const MARKERS: &[(&str, &str)] = &[
    ("zh", "你好中国人工智能"),
    ("ja", "こんにちはありがとう"),
    ("fr", "éèêëàâçñ"),
    ("de", "äöüß"),
    ("es", "áéíóúñ"),
];

pub fn detect_language(text: &str) -> &'static str {
    MARKERS.iter()
        .find(|(_, chars)| text.chars().any(|c| chars.contains(c)))
        .map(|(code, _)| *code)
        .unwrap_or(ENGLISH)
}
