use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref JAVASCRIPT_URI: Regex = Regex::new(r"(?i)javascript:").unwrap();
    static ref EVENT_HANDLER: Regex = Regex::new(r"(?i)on\w+=").unwrap();
    static ref SCRIPT_BLOCK: Regex = Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").unwrap();
}

// Escape text the way a text node serializes into markup
fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
    out
}

// Sanitize free text: escape markup, then strip script-ish leftovers
pub fn sanitize_input(input: &str) -> String {
    let mut sanitized = escape_html(input);

    // stripping one pattern can splice together another one, so repeat until stable
    loop {
        let next = strip_patterns(&sanitized);
        if next == sanitized {
            return sanitized;
        }
        sanitized = next;
    }
}

fn strip_patterns(text: &str) -> String {
    let text = SCRIPT_BLOCK.replace_all(text, "");
    let text = JAVASCRIPT_URI.replace_all(&text, "");
    EVENT_HANDLER.replace_all(&text, "").into_owned()
}
