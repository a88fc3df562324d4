/// Sanitization engine for untrusted text rendered by the widget.
///
/// Every function here is pure: output depends only on the input string and
/// never on whether a document is available to render into.
use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum length of an attribute value, in characters, after escaping
pub const MAX_ATTRIBUTE_LEN: usize = 1000;

/// Maximum length of a sanitized filename, in characters
pub const MAX_FILE_NAME_LEN: usize = 255;

/// Placeholder returned when nothing usable is left of a filename
pub const FALLBACK_FILE_NAME: &str = "unnamed";

/// Characters that are never allowed in a filename: path separators,
/// control characters and the reserved set of common filesystems.
static UNSAFE_FILE_NAME_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[/\\<>:"|?*\x00-\x1f\x7f]"#).unwrap());

/// Where sanitized output ends up being rendered.
///
/// Recorded for diagnostics only. Escaping is identical in both contexts so
/// headless callers (server-side rendering, tests) see exactly what a
/// browser would.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderContext {
    #[default]
    Document,
    Headless,
}

/// Sanitizer bound to a rendering context.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sanitizer {
    context: RenderContext,
}

impl Sanitizer {
    pub fn new(context: RenderContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> RenderContext {
        self.context
    }

    pub fn text(&self, input: &str) -> String {
        sanitize_text(input)
    }

    pub fn attribute(&self, input: &str) -> String {
        sanitize_attribute(input)
    }

    pub fn file_name(&self, input: &str) -> String {
        sanitize_file_name(input)
    }
}

fn escape_into(out: &mut String, input: &str) {
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
}

/// Escape text for insertion as HTML element content.
///
/// Replaces `&`, `<`, `>`, `"` and `'` with `&amp;`, `&lt;`, `&gt;`,
/// `&quot;` and `&#x27;`. Each input character is replaced at most once, so
/// entities produced here are never escaped again within the same call.
/// Applying it twice double-encodes; sanitize once per rendering boundary.
pub fn sanitize_text(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }

    let mut out = String::with_capacity(input.len() + input.len() / 8);
    escape_into(&mut out, input);
    out
}

/// Escape text for insertion into a quoted HTML attribute value.
///
/// Same substitution as [`sanitize_text`], then capped at
/// [`MAX_ATTRIBUTE_LEN`] characters. If the cap falls inside an entity, the
/// partial entity is dropped so no bare `&` survives the cut.
pub fn sanitize_attribute(input: &str) -> String {
    let escaped = sanitize_text(input);
    if escaped.chars().count() <= MAX_ATTRIBUTE_LEN {
        return escaped;
    }

    let mut truncated: String = escaped.chars().take(MAX_ATTRIBUTE_LEN).collect();
    if let Some(amp) = truncated.rfind('&') {
        if !truncated[amp..].contains(';') {
            truncated.truncate(amp);
        }
    }
    truncated
}

/// Make an untrusted name safe to use as an upload/download filename.
///
/// - path separators, control and reserved characters become `_`
/// - every `..` becomes `_`
/// - leading dots and surrounding whitespace are stripped
/// - the result is capped at [`MAX_FILE_NAME_LEN`] characters
/// - an empty result falls back to [`FALLBACK_FILE_NAME`]
pub fn sanitize_file_name(input: &str) -> String {
    let replaced = UNSAFE_FILE_NAME_CHARS.replace_all(input, "_");
    // Replacement never introduces a dot, so a single pass removes every "..".
    let replaced = replaced.replace("..", "_");
    let trimmed = replaced
        .trim_start_matches(|c: char| c == '.' || c.is_whitespace())
        .trim_end();

    let name: String = trimmed.chars().take(MAX_FILE_NAME_LEN).collect();
    if name.is_empty() {
        FALLBACK_FILE_NAME.to_string()
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_text_entities() {
        assert_eq!(
            sanitize_text(r#"<script>alert("x" & 'y')</script>"#),
            "&lt;script&gt;alert(&quot;x&quot; &amp; &#x27;y&#x27;)&lt;/script&gt;"
        );
        assert_eq!(sanitize_text(""), "");
        assert_eq!(sanitize_text("plain text"), "plain text");
    }

    #[test]
    fn test_sanitize_text_ampersand_not_rescanned() {
        // "&lt;" in the input is literal text, not an entity to preserve
        assert_eq!(sanitize_text("&lt;"), "&amp;lt;");
        assert_eq!(sanitize_text("<"), "&lt;");
    }

    #[test]
    fn test_sanitize_text_double_application_encodes_twice() {
        let once = sanitize_text("<b>");
        let twice = sanitize_text(&once);
        assert_eq!(twice, "&amp;lt;b&amp;gt;");
        assert!(!twice.contains('<'));
    }

    #[test]
    fn test_sanitize_text_unicode_passthrough() {
        assert_eq!(sanitize_text("héllo 👋 <"), "héllo 👋 &lt;");
    }

    #[test]
    fn test_sanitize_attribute_caps_length() {
        let long = "a".repeat(5000);
        assert_eq!(sanitize_attribute(&long).chars().count(), MAX_ATTRIBUTE_LEN);
        assert_eq!(sanitize_attribute("title"), "title");
        assert_eq!(sanitize_attribute(""), "");
    }

    #[test]
    fn test_sanitize_attribute_drops_partial_entity() {
        // 998 plain chars then "&" -> "&amp;" straddles the cap
        let input = format!("{}&", "a".repeat(998));
        let out = sanitize_attribute(&input);
        assert_eq!(out, "a".repeat(998));
    }

    #[test]
    fn test_sanitize_attribute_keeps_complete_entity_at_cap() {
        let input = format!("{}<", "a".repeat(996));
        let out = sanitize_attribute(&input);
        assert_eq!(out, format!("{}&lt;", "a".repeat(996)));
        assert_eq!(out.chars().count(), MAX_ATTRIBUTE_LEN);
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("report.pdf"), "report.pdf");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "____etc_passwd");
        assert_eq!(sanitize_file_name("..\\windows\\system32"), "__windows_system32");
        assert_eq!(sanitize_file_name(".bashrc"), "bashrc");
        assert_eq!(sanitize_file_name("..."), "_.");
        assert_eq!(sanitize_file_name(""), FALLBACK_FILE_NAME);
        assert_eq!(sanitize_file_name("   "), FALLBACK_FILE_NAME);
        assert_eq!(sanitize_file_name("...."), "__");
        assert_eq!(sanitize_file_name("a<b>:c|d?.txt"), "a_b__c_d_.txt");
    }

    #[test]
    fn test_sanitize_file_name_caps_length() {
        let long = format!("{}.txt", "x".repeat(400));
        assert_eq!(sanitize_file_name(&long).chars().count(), MAX_FILE_NAME_LEN);
    }

    #[test]
    fn test_sanitizer_context_does_not_change_output() {
        let document = Sanitizer::new(RenderContext::Document);
        let headless = Sanitizer::new(RenderContext::Headless);
        let input = "<img src=x onerror='alert(1)'>";

        assert_eq!(document.text(input), headless.text(input));
        assert_eq!(document.attribute(input), headless.attribute(input));
        assert_eq!(document.file_name(input), headless.file_name(input));
        assert_eq!(headless.context(), RenderContext::Headless);
    }
}
