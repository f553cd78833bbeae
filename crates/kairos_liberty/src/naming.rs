//! Drive-strength decomposition of cell names.

/// `(basename, basename_x, size)` for a cell name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellName {
    /// Family name without the drive suffix.
    pub basename: String,
    /// Family name including the drive letter; the sizing index key.
    pub basename_x: String,
    /// Drive strength.
    pub size: u32,
}

/// Splits a cell name into family and drive strength.
///
/// `NAME<letter><digits>` (non-empty `NAME`) is tried first, so `NAND2X4`
/// becomes `("NAND2", "NAND2X", 4)`; then `NAME<digits>`, so `A2` becomes
/// `("A", "A", 2)`. Anything else is its own family with size 1.
pub fn split_cell_name(name: &str) -> CellName {
    let digits_start = name
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i);

    if let Some(start) = digits_start {
        if let Ok(size) = name[start..].parse::<u32>() {
            let head = &name[..start];
            if let Some(letter) = head.chars().last().filter(char::is_ascii_alphabetic) {
                let base = &head[..head.len() - letter.len_utf8()];
                if !base.is_empty() {
                    return CellName {
                        basename: base.to_string(),
                        basename_x: head.to_string(),
                        size,
                    };
                }
            }
            if !head.is_empty() {
                return CellName {
                    basename: head.to_string(),
                    basename_x: head.to_string(),
                    size,
                };
            }
        }
    }
    CellName {
        basename: name.to_string(),
        basename_x: name.to_string(),
        size: 1,
    }
}
