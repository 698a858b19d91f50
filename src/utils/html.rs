use ammonia;

/// Clean announcement HTML using the ammonia library.
///
/// Whitelist-based: safe formatting tags (<b>, <p>, <a>, lists) survive while
/// <script>, <iframe>, inline event handlers and `javascript:` links are
/// dropped, together with the content of <script> and <style>.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

/// Sanitizes `input` and reports whether anything readable remains.
pub fn clean_non_empty(input: &str) -> Option<String> {
    let cleaned = clean_html(input);
    if cleaned.trim().is_empty() {
        None
    } else {
        Some(cleaned)
    }
}
