//! HTML stripping for exported activity text.

use regex::Regex;

const HTML_MARKERS: &str = r"(?i)<\s*(p|body|html|span|div|br)[\s>/]";
const ANY_TAG: &str = r"(?s)<.*?>";
const ENTITIES: [(&str, &str); 4] = [("&lt;", "<"), ("&gt;", ">"), ("&nbsp;", " "), ("&amp;", "&")];

/// Whether the text carries one of the common block or inline tags that rich-text editors emit.
pub fn has_html(text: &str) -> bool {
	Regex::new(HTML_MARKERS).map(|re| re.is_match(text)).unwrap_or(false)
}

/// Removes everything between angle brackets, then decodes the escaped brackets, spaces, and
/// ampersands that survive in pasted email bodies. `&amp;` is decoded last so `&amp;lt;` stays
/// literal text.
pub fn strip_html(text: &str) -> String {
	let mut stripped = Regex::new(ANY_TAG)
		.map(|re| re.replace_all(text, "").into_owned())
		.unwrap_or_else(|_| text.to_string());

	for (entity, replacement) in ENTITIES {
		stripped = stripped.replace(entity, replacement);
	}

	stripped
}

/// Strips the text only when it looks like HTML.
pub fn scrub(text: &str) -> Option<String> {
	if !has_html(text) {
		return None;
	}

	Some(strip_html(text))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn detects_common_tags() {
		assert!(has_html("<p>Hello</p>"));
		assert!(has_html("<div class=\"x\">Hello</div>"));
		assert!(has_html("line<br/>break"));
		assert!(has_html("< SPAN style='a'>x</span>"));
		assert!(!has_html("a < b and c > d"));
		assert!(!has_html("<pre>code</pre>"));
		assert!(!has_html("plain text"));
	}

	#[test]
	fn strips_tags_across_lines() {
		let html = "<div\n class=\"a\">Dear donor,<br>\nthanks &amp; regards</div>";

		assert_eq!(strip_html(html), "Dear donor,\nthanks & regards");
	}

	#[test]
	fn decodes_entities_after_stripping() {
		assert_eq!(strip_html("<p>1 &lt; 2&nbsp;&gt; 0</p>"), "1 < 2 > 0");
		assert_eq!(strip_html("<p>&amp;lt;</p>"), "&lt;");
	}

	#[test]
	fn scrub_leaves_plain_text_alone() {
		assert_eq!(scrub("no markup &amp; here"), None);
		assert_eq!(scrub("<p>x</p>").as_deref(), Some("x"));
	}
}
