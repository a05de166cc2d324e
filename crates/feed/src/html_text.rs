// ABOUTME: HTML-to-plain-text conversion used to decode rendered fields and fill text contents.
// ABOUTME: Strips tags, decodes entities and collapses whitespace; parsers never fabricate text themselves.

/// Converts an HTML fragment to plain text: tags removed, entities
/// decoded, whitespace collapsed and trimmed.
pub fn html_to_text(html: &str) -> String {
    let mut stripped = String::with_capacity(html.len());
    let mut in_tag = false;

    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => stripped.push(c),
            _ => {}
        }
    }

    collapse_whitespace(&decode_entities(&stripped))
}

/// Decodes common named HTML entities plus numeric character references.
pub fn decode_entities(s: &str) -> String {
    let entities = [
        ("&amp;", "&"),
        ("&lt;", "<"),
        ("&gt;", ">"),
        ("&quot;", "\""),
        ("&apos;", "'"),
        ("&#39;", "'"),
        ("&nbsp;", " "),
        ("&ndash;", "–"),
        ("&mdash;", "—"),
        ("&lsquo;", "'"),
        ("&rsquo;", "'"),
        ("&ldquo;", "\u{201C}"),
        ("&rdquo;", "\u{201D}"),
        ("&hellip;", "…"),
        ("&copy;", "©"),
        ("&reg;", "®"),
        ("&trade;", "™"),
        ("&bull;", "•"),
        ("&middot;", "·"),
        ("&euro;", "€"),
        ("&pound;", "£"),
        ("&yen;", "¥"),
        ("&cent;", "¢"),
    ];

    let mut result = s.to_string();
    for (entity, replacement) in &entities {
        result = result.replace(entity, replacement);
    }

    decode_numeric_entities(&result)
}

/// Decodes numeric entities like `&#8217;` and `&#x2019;`.
fn decode_numeric_entities(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '&' && chars.peek() == Some(&'#') {
            chars.next();
            let is_hex = matches!(chars.peek(), Some('x') | Some('X'));
            if is_hex {
                chars.next();
            }

            let mut num = String::new();
            while let Some(&nc) = chars.peek() {
                if nc == ';' {
                    chars.next();
                    break;
                }
                let valid = if is_hex {
                    nc.is_ascii_hexdigit()
                } else {
                    nc.is_ascii_digit()
                };
                if !valid {
                    break;
                }
                num.push(nc);
                chars.next();
            }

            let code = if is_hex {
                u32::from_str_radix(&num, 16).ok()
            } else {
                num.parse::<u32>().ok()
            };
            if let Some(decoded) = code.and_then(char::from_u32) {
                result.push(decoded);
                continue;
            }

            result.push('&');
            result.push('#');
            if is_hex {
                result.push('x');
            }
            result.push_str(&num);
        } else {
            result.push(c);
        }
    }

    result
}

fn collapse_whitespace(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut last_was_space = false;

    for c in s.chars() {
        if c.is_whitespace() {
            if !last_was_space {
                result.push(' ');
                last_was_space = true;
            }
        } else {
            result.push(c);
            last_was_space = false;
        }
    }

    result.trim().to_string()
}
