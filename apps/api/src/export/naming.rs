//! Download file names: `<product>-<sanitized-title>.<ext>`.

const MAX_STEM_LEN: usize = 80;

/// Lowercase ASCII slug. Every run of other characters becomes one '-'.
/// Falls back to "document" when nothing survives.
pub fn sanitize_title(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }

    let mut slug = slug.trim_matches('-').to_string();
    if slug.len() > MAX_STEM_LEN {
        slug.truncate(MAX_STEM_LEN);
        slug = slug.trim_end_matches('-').to_string();
    }
    if slug.is_empty() {
        "document".to_string()
    } else {
        slug
    }
}

pub fn artifact_file_name(product: &str, title: &str, extension: &str) -> String {
    format!(
        "{}-{}.{}",
        sanitize_title(product),
        sanitize_title(title),
        extension
    )
}
