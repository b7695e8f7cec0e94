/// Bare non-finite tokens some JSON writers emit in value position.
const NON_FINITE: [&str; 3] = ["-Infinity", "Infinity", "NaN"];

/// Quotes bare `NaN`/`Infinity` tokens so the document parses as JSON.
///
/// Only tokens in value position (after `:`, `,` or `[`) outside string literals are touched.
/// The cleaner later turns the quoted tokens into nulls.
pub fn quote_non_finite(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    let mut rest = json;

    let mut in_string = false;
    let mut escaped = false;
    let mut last_significant = None;

    while let Some(c) = rest.chars().next() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
        } else if matches!(last_significant, Some(':' | ',' | '[')) {
            if let Some(token) = NON_FINITE.iter().find(|token| rest.starts_with(**token)) {
                out.push('"');
                out.push_str(token);
                out.push('"');

                rest = &rest[token.len()..];
                last_significant = Some('"');
                continue;
            }
        }

        if !c.is_whitespace() {
            last_significant = Some(c);
        }

        out.push(c);
        rest = &rest[c.len_utf8()..];
    }

    out
}
