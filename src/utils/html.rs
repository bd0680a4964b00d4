// src/utils/html.rs

/// Whitelist-based HTML sanitising for text that is rendered by the quiz and
/// admin pages.
///
/// Safe formatting tags (`<b>`, `<p>`, ...) survive; `<script>` and friends
/// are removed together with their content, as are event handler attributes.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
