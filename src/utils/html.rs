use ammonia;

/// Clean HTML content using the ammonia library.
///
/// Whitelist-based: safe tags (like <b>, <p>) survive, <script>, <iframe> and
/// event-handler attributes are stripped. Applied to free-text pack
/// descriptions before they are stored, since clients render them as markup.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_script_keeps_formatting() {
        let cleaned = clean_html("<b>Capitals</b><script>alert(1)</script>");
        assert_eq!(cleaned, "<b>Capitals</b>");
    }

    #[test]
    fn test_strips_event_handlers() {
        let cleaned = clean_html(r#"<p onclick="steal()">Hi</p>"#);
        assert_eq!(cleaned, "<p>Hi</p>");
    }
}
