// src/utils/text_debug.rs
use std::fs;
use std::path::Path;

use crate::utils::error::AppError;

/// Saves a copy of `text` with `⟦tag⟧` markers inserted at the given byte
/// offsets, so TOC bounds and matched headings can be checked by eye.
pub fn save_annotated_text(text: &str, path: &Path, marks: &[(usize, String)]) -> Result<(), AppError> {
    fs::write(path, annotate(text, marks))?;
    tracing::info!("Saved annotated text to {}", path.display());
    Ok(())
}

fn annotate(text: &str, marks: &[(usize, String)]) -> String {
    let mut sorted: Vec<&(usize, String)> = marks
        .iter()
        .filter(|(pos, _)| *pos <= text.len() && text.is_char_boundary(*pos))
        .collect();
    sorted.sort_by_key(|(pos, _)| *pos);

    let mut out = String::with_capacity(text.len() + marks.len() * 16);
    let mut last_pos = 0;
    for (pos, tag) in sorted {
        out.push_str(&text[last_pos..*pos]);
        out.push_str(&format!("⟦{}⟧", tag));
        last_pos = *pos;
    }
    out.push_str(&text[last_pos..]);
    out
}
