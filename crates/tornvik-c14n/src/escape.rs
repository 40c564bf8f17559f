#![forbid(unsafe_code)]

//! Entity escaping for C14N output.
//!
//! - Text nodes: `&` → `&amp;`, `<` → `&lt;`, `>` → `&gt;`, `\r` → `&#xD;`
//! - Attribute values: `&`, `<`, `"`, and the whitespace characters
//!   `\t`, `\n`, `\r` as character references
//! - PI data: `\r` → `&#xD;`

/// Escape text node content.
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\r' => out.push_str("&#xD;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape an attribute value (also used for namespace URIs).
pub fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' => out.push_str("&quot;"),
            '\t' => out.push_str("&#x9;"),
            '\n' => out.push_str("&#xA;"),
            '\r' => out.push_str("&#xD;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape processing instruction data.
pub fn escape_pi(s: &str) -> String {
    s.replace('\r', "&#xD;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("plain"), "plain");
        assert_eq!(escape_text("x<y & y>z"), "x&lt;y &amp; y&gt;z");
        assert_eq!(escape_text("a\r\nb"), "a&#xD;\nb");
        assert_eq!(escape_text("\"quoted\"\t"), "\"quoted\"\t");
    }

    #[test]
    fn test_escape_attr() {
        assert_eq!(escape_attr("plain"), "plain");
        assert_eq!(escape_attr("x<y & \"z\">"), "x&lt;y &amp; &quot;z&quot;>");
        assert_eq!(escape_attr("1\t2\n3\r"), "1&#x9;2&#xA;3&#xD;");
    }

    #[test]
    fn test_escape_pi() {
        assert_eq!(escape_pi("a\rb<&"), "a&#xD;b<&");
    }
}
