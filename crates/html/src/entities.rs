/// Decode the small entity set documents in practice rely on.
///
/// Named: `&amp;`, `&lt;`, `&gt;`, `&quot;`, `&apos;`, `&nbsp;`.
/// Numeric: `&#NNN;` and `&#xHHH;`, only when semicolon-terminated. NUL, surrogates and
/// values past U+10FFFF decode to U+FFFD.
/// Everything else is copied through unchanged.
pub(crate) fn decode_entities(s: &str) -> String {
    const NAMED: &[(&str, char)] = &[
        ("&amp;", '&'),
        ("&lt;", '<'),
        ("&gt;", '>'),
        ("&quot;", '"'),
        ("&apos;", '\''),
        ("&nbsp;", '\u{00A0}'),
    ];
    const MAX_HEX_DIGITS: usize = 6;
    const MAX_DEC_DIGITS: usize = 7;

    let Some(first) = memchr::memchr(b'&', s.as_bytes()) else {
        return s.to_string();
    };

    let mut out = String::with_capacity(s.len());
    out.push_str(&s[..first]);
    let mut rest = &s[first..];

    while !rest.is_empty() {
        let Some(amp) = memchr::memchr(b'&', rest.as_bytes()) else {
            out.push_str(rest);
            break;
        };
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        if let Some((entity, ch)) = NAMED.iter().find(|(e, _)| rest.starts_with(e)) {
            out.push(*ch);
            rest = &rest[entity.len()..];
            continue;
        }

        let numeric = if rest.starts_with("&#x") || rest.starts_with("&#X") {
            decode_numeric(&rest[3..], 16, MAX_HEX_DIGITS).map(|(ch, used)| (ch, used + 3))
        } else if rest.starts_with("&#") {
            decode_numeric(&rest[2..], 10, MAX_DEC_DIGITS).map(|(ch, used)| (ch, used + 2))
        } else {
            None
        };

        match numeric {
            Some((ch, used)) => {
                out.push(ch);
                rest = &rest[used..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }

    out
}

/// Returns the decoded char and the number of bytes consumed including the `;`.
fn decode_numeric(digits: &str, radix: u32, max_digits: usize) -> Option<(char, usize)> {
    let end = digits
        .bytes()
        .take(max_digits + 1)
        .position(|b| b == b';')?;
    let digits = &digits[..end];
    if digits.is_empty() || !digits.bytes().all(|b| (b as char).is_digit(radix)) {
        return None;
    }
    let value = u32::from_str_radix(digits, radix).ok()?;
    let ch = match value {
        0 => char::REPLACEMENT_CHARACTER,
        value => char::from_u32(value).unwrap_or(char::REPLACEMENT_CHARACTER),
    };
    Some((ch, end + 1))
}
