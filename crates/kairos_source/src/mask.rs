//! Offset-preserving comment and annotation removal.
//!
//! Both functions return a string with exactly the same byte length as the
//! input. Masked bytes become spaces; newlines inside masked regions are
//! kept so line numbers do not shift. Quoted strings are copied verbatim.

/// Blanks `/* ... */` and `// ...` comments.
///
/// An unterminated block comment is masked to the end of the text.
pub fn mask_comments(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = bytes.to_vec();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => i = skip_string(bytes, i),
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let end = find(bytes, i + 2, b"*/").map_or(bytes.len(), |p| p + 2);
                blank(&mut out, i, end);
                i = end;
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                let end = bytes[i..]
                    .iter()
                    .position(|&b| b == b'\n')
                    .map_or(bytes.len(), |p| i + p);
                blank(&mut out, i, end);
                i = end;
            }
            _ => i += 1,
        }
    }
    into_string(out)
}

/// Blanks `(* ... *)` attribute annotations.
pub fn mask_attributes(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = bytes.to_vec();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => i = skip_string(bytes, i),
            // `(*)` is a sensitivity list, not an annotation.
            b'(' if bytes.get(i + 1) == Some(&b'*') && bytes.get(i + 2) != Some(&b')') => {
                let end = find(bytes, i + 2, b"*)").map_or(bytes.len(), |p| p + 2);
                blank(&mut out, i, end);
                i = end;
            }
            _ => i += 1,
        }
    }
    into_string(out)
}

/// Returns the index just past the closing quote of the string at `start`.
fn skip_string(bytes: &[u8], start: usize) -> usize {
    let mut i = start + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

fn find(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if from >= bytes.len() {
        return None;
    }
    bytes[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| from + p)
}

fn blank(out: &mut [u8], start: usize, end: usize) {
    for b in &mut out[start..end] {
        if *b != b'\n' {
            *b = b' ';
        }
    }
}

// Masked regions start and end on ASCII bytes, so only whole characters
// are replaced.
fn into_string(out: Vec<u8>) -> String {
    String::from_utf8(out)
        .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_comment_keeps_length_and_newlines() {
        let src = "a /* x\ny */ b";
        let masked = mask_comments(src);
        assert_eq!(masked.len(), src.len());
        assert_eq!(masked, "a     \n     b");
    }

    #[test]
    fn line_comment_stops_at_newline() {
        let masked = mask_comments("wire a; // note\nwire b;");
        assert_eq!(masked, "wire a;        \nwire b;");
    }

    #[test]
    fn comment_markers_inside_strings_survive() {
        let src = r#"values("1, 2 /* not */", "3");"#;
        assert_eq!(mask_comments(src), src);
    }

    #[test]
    fn unterminated_block_runs_to_end() {
        let masked = mask_comments("a /* open");
        assert_eq!(masked, "a        ");
    }

    #[test]
    fn attributes_are_blanked() {
        let src = "(* keep = 1 *) INVX1 g1(.A(a), .Y(b));";
        let masked = mask_attributes(src);
        assert_eq!(masked.len(), src.len());
        assert!(masked[..14].trim().is_empty());
        assert!(masked.trim_start().starts_with("INVX1 g1"));
    }

    #[test]
    fn star_paren_sensitivity_untouched() {
        let src = "always @(*) x";
        assert_eq!(mask_attributes(src), src);
    }

    #[test]
    fn multibyte_inside_comment() {
        let src = "a /* é */ b";
        let masked = mask_comments(src);
        assert_eq!(masked.len(), src.len());
        assert!(masked.ends_with('b'));
    }
}
