//! Output file naming: `orders.sql` becomes `orders-utf8.sql`.

const SUFFIX: &str = "-utf8";

/// Derive the name of the converted file from the original file name.
///
/// Splits on the last dot only. A leading dot (`.sql`) is part of the base
/// name, not an extension.
pub fn derive_output_name(file_name: &str) -> String {
    match file_name.rfind('.') {
        Some(dot) if dot > 0 => {
            let (base, ext) = file_name.split_at(dot);
            format!("{}{}{}", base, SUFFIX, ext)
        }
        _ => format!("{}{}", file_name, SUFFIX),
    }
}

/// Whether `file_name` ends with `extension` (case-insensitive, dot optional).
pub fn has_extension(file_name: &str, extension: &str) -> bool {
    let extension = extension.trim_start_matches('.');
    match file_name.rfind('.') {
        Some(dot) if dot > 0 => file_name[dot + 1..].eq_ignore_ascii_case(extension),
        _ => false,
    }
}
