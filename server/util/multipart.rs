//! Minimal multipart/form-data reader for the upload endpoint.
//!
//! Only what a browser `FormData` upload produces is handled: parts separated
//! by `--boundary`, a header block ended by a blank line, then the raw bytes.

/// One part of a multipart body.
#[derive(Debug, Clone, PartialEq)]
pub struct Part<'a> {
    /// The `name` parameter of `Content-Disposition`.
    pub name: Option<String>,
    /// The `filename` parameter; present (possibly empty) for file inputs.
    pub filename: Option<String>,
    pub data: &'a [u8],
}

/// Returns the index of the first occurrence of `needle` in `haystack`.
fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Extracts the boundary token from a Content-Type header value like
/// `multipart/form-data; boundary=----WebKitFormBoundaryXXX`.
pub fn extract_boundary(content_type: &str) -> Option<String> {
    let mut params = content_type.split(';').map(str::trim);
    let mime = params.next()?;
    if !mime.eq_ignore_ascii_case("multipart/form-data") {
        return None;
    }
    params
        .filter_map(|p| p.split_once('='))
        .find(|(k, _)| k.trim().eq_ignore_ascii_case("boundary"))
        .map(|(_, v)| v.trim().trim_matches('"').to_owned())
        .filter(|b| !b.is_empty())
}

/// Splits `body` into its parts. Preamble, epilogue and malformed parts
/// (no header terminator) are skipped.
pub fn parse_parts<'a>(body: &'a [u8], boundary: &str) -> Vec<Part<'a>> {
    let delimiter = format!("--{}", boundary);
    let delim = delimiter.as_bytes();
    let mut parts = Vec::new();

    let mut rest = match find_subsequence(body, delim) {
        Some(pos) => &body[pos + delim.len()..],
        None => return parts,
    };

    // `rest` starts right after a delimiter; `--` there marks the close.
    while !rest.starts_with(b"--") {
        let (chunk, next) = match find_subsequence(rest, delim) {
            Some(pos) => (&rest[..pos], Some(&rest[pos + delim.len()..])),
            None => (rest, None),
        };

        if let Some(part) = parse_part(chunk) {
            parts.push(part);
        }
        match next {
            Some(n) => rest = n,
            None => break,
        }
    }
    parts
}

fn parse_part(chunk: &[u8]) -> Option<Part<'_>> {
    let sep = b"\r\n\r\n";
    let chunk = chunk.strip_prefix(b"\r\n").unwrap_or(chunk);
    // A part with no headers starts directly with the blank line.
    let (header_bytes, raw) = if let Some(data) = chunk.strip_prefix(b"\r\n") {
        (&chunk[..0], data)
    } else {
        let pos = find_subsequence(chunk, sep)?;
        (&chunk[..pos], &chunk[pos + sep.len()..])
    };
    let data = raw.strip_suffix(b"\r\n").unwrap_or(raw);

    let headers = String::from_utf8_lossy(header_bytes);
    let disposition = headers
        .split("\r\n")
        .filter_map(|line| line.split_once(':'))
        .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-disposition"))
        .map(|(_, v)| v.to_owned())
        .unwrap_or_default();

    Some(Part {
        name: disposition_param(&disposition, "name"),
        filename: disposition_param(&disposition, "filename"),
        data,
    })
}

/// Reads `key="value"` (or unquoted `key=value`) from a Content-Disposition
/// value. Keys are compared case-insensitively and must match exactly, so
/// `name` never matches `filename`. A `;` inside quotes belongs to the value.
fn disposition_param(disposition: &str, key: &str) -> Option<String> {
    split_params(disposition)
        .into_iter()
        .skip(1)
        .filter_map(|p| p.split_once('='))
        .find(|(k, _)| k.trim().eq_ignore_ascii_case(key))
        .map(|(_, v)| unquote(v))
}

/// Splits a header value on `;`, ignoring separators inside quoted strings.
fn split_params(value: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;
    for (i, c) in value.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                pieces.push(&value[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    pieces.push(&value[start..]);
    pieces
}

/// Strips surrounding quotes and resolves `\"`. Other backslashes are kept
/// as-is since Windows clients send them unescaped in paths.
fn unquote(value: &str) -> String {
    let value = value.trim();
    let Some(inner) = value.strip_prefix('"') else {
        return value.to_owned();
    };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => break,
            '\\' => match chars.next() {
                Some('"') => out.push('"'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            },
            c => out.push(c),
        }
    }
    out
}

/// Finds the file input called `field`, i.e. a part whose `name` matches and
/// which carries a `filename` parameter.
pub fn find_file<'p, 'a>(parts: &'p [Part<'a>], field: &str) -> Option<&'p Part<'a>> {
    parts
        .iter()
        .find(|p| p.name.as_deref() == Some(field) && p.filename.is_some())
}

#[cfg(test)]
pub(crate) fn build_body(boundary: &str, parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, filename, data) in parts {
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        let disposition = match filename {
            Some(f) => format!("form-data; name=\"{}\"; filename=\"{}\"", name, f),
            None => format!("form-data; name=\"{}\"", name),
        };
        body.extend_from_slice(format!("Content-Disposition: {}\r\n", disposition).as_bytes());
        if filename.is_some() {
            body.extend_from_slice(b"Content-Type: application/octet-stream\r\n");
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());
    body
}
