//! Codec layer: the candidate catalog, label lookup and byte-to-text decoding.
//!
//! Uses encoding_rs for every code page it knows about. ISO-8859-1, ASCII, CP850
//! and UTF-32 are decoded here since encoding_rs either folds them into another
//! encoding or does not carry them.

use crate::core::error::{ConvertError, Result};
use encoding_rs::Encoding;

/// Candidate encodings tried during detection, in priority order.
///
/// Aliases decode identically to their canonical entry, so on a tie the
/// earlier spelling wins.
pub const CATALOG: [&str; 24] = [
    "utf8",
    "utf-8",
    "windows1251",
    "win1251",
    "cp1251",
    "windows1252",
    "win1252",
    "cp1252",
    "iso88591",
    "latin1",
    "iso88592",
    "iso88595",
    "koi8r",
    "koi8u",
    "cp866",
    "ibm866",
    "cp850",
    "macintosh",
    "mac",
    "utf16le",
    "utf16be",
    "utf32le",
    "utf32be",
    "ascii",
];

/// A character set the codec layer can decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    Utf8,
    Windows1251,
    Windows1252,
    Latin1,
    Latin2,
    Cyrillic,
    Koi8R,
    Koi8U,
    Cp866,
    Cp850,
    Macintosh,
    Utf16Le,
    Utf16Be,
    Utf32Le,
    Utf32Be,
    Ascii,
}

impl Charset {
    /// Look up a label, ignoring case, dashes, underscores and spaces.
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized: String = label
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();

        let charset = match normalized.as_str() {
            "utf8" | "unicode11utf8" => Charset::Utf8,
            "windows1251" | "win1251" | "cp1251" => Charset::Windows1251,
            "windows1252" | "win1252" | "cp1252" => Charset::Windows1252,
            "iso88591" | "latin1" | "l1" | "cp819" | "ibm819" => Charset::Latin1,
            "iso88592" | "latin2" | "l2" => Charset::Latin2,
            "iso88595" | "cyrillic" => Charset::Cyrillic,
            "koi8r" | "koi8" => Charset::Koi8R,
            "koi8u" => Charset::Koi8U,
            "cp866" | "ibm866" | "866" => Charset::Cp866,
            "cp850" | "ibm850" | "850" => Charset::Cp850,
            "macintosh" | "mac" | "macroman" | "xmacroman" => Charset::Macintosh,
            "utf16le" | "ucs2" | "ucs2le" => Charset::Utf16Le,
            "utf16be" | "ucs2be" => Charset::Utf16Be,
            "utf32le" | "ucs4le" => Charset::Utf32Le,
            "utf32be" | "ucs4be" => Charset::Utf32Be,
            "ascii" | "usascii" => Charset::Ascii,
            _ => return None,
        };
        Some(charset)
    }

    /// Display name used in logs and the UI.
    pub fn display_name(self) -> &'static str {
        match self {
            Charset::Utf8 => "UTF-8",
            Charset::Windows1251 => "Windows-1251",
            Charset::Windows1252 => "Windows-1252",
            Charset::Latin1 => "ISO-8859-1",
            Charset::Latin2 => "ISO-8859-2",
            Charset::Cyrillic => "ISO-8859-5",
            Charset::Koi8R => "KOI8-R",
            Charset::Koi8U => "KOI8-U",
            Charset::Cp866 => "CP866",
            Charset::Cp850 => "CP850",
            Charset::Macintosh => "Macintosh",
            Charset::Utf16Le => "UTF-16LE",
            Charset::Utf16Be => "UTF-16BE",
            Charset::Utf32Le => "UTF-32LE",
            Charset::Utf32Be => "UTF-32BE",
            Charset::Ascii => "ASCII",
        }
    }

    fn encoding_rs(self) -> Option<&'static Encoding> {
        match self {
            Charset::Utf8 => Some(encoding_rs::UTF_8),
            Charset::Windows1251 => Some(encoding_rs::WINDOWS_1251),
            Charset::Windows1252 => Some(encoding_rs::WINDOWS_1252),
            Charset::Latin2 => Some(encoding_rs::ISO_8859_2),
            Charset::Cyrillic => Some(encoding_rs::ISO_8859_5),
            Charset::Koi8R => Some(encoding_rs::KOI8_R),
            Charset::Koi8U => Some(encoding_rs::KOI8_U),
            Charset::Cp866 => Some(encoding_rs::IBM866),
            Charset::Macintosh => Some(encoding_rs::MACINTOSH),
            Charset::Utf16Le => Some(encoding_rs::UTF_16LE),
            Charset::Utf16Be => Some(encoding_rs::UTF_16BE),
            Charset::Latin1
            | Charset::Cp850
            | Charset::Utf32Le
            | Charset::Utf32Be
            | Charset::Ascii => None,
        }
    }
}

/// Catalog label followed by its display name, e.g. `koi8r (KOI8-R)`.
pub fn describe_label(label: &str) -> String {
    match Charset::from_label(label) {
        Some(charset) => format!("{} ({})", label, charset.display_name()),
        None => label.to_string(),
    }
}

/// Decodes a byte buffer under a named encoding.
///
/// Errors are reported per call: the resolver skips candidates whose decode
/// fails and propagates the error for an explicit hint.
pub trait Codec {
    fn decode(&self, bytes: &[u8], label: &str) -> Result<String>;
}

/// Default codec backed by encoding_rs plus the local decoders below.
#[derive(Debug, Clone, Copy, Default)]
pub struct EncodingRsCodec;

impl Codec for EncodingRsCodec {
    fn decode(&self, bytes: &[u8], label: &str) -> Result<String> {
        let charset = Charset::from_label(label)
            .ok_or_else(|| ConvertError::UnsupportedEncoding(label.to_string()))?;
        Ok(decode_charset(bytes, charset))
    }
}

/// Decode bytes with replacement of malformed sequences.
/// A leading BOM is removed only when it belongs to `charset`.
pub fn decode_charset(bytes: &[u8], charset: Charset) -> String {
    if let Some(encoding) = charset.encoding_rs() {
        let (decoded, _) = encoding.decode_with_bom_removal(bytes);
        return decoded.into_owned();
    }

    match charset {
        Charset::Latin1 => encoding_rs::mem::decode_latin1(bytes).into_owned(),
        Charset::Ascii => bytes
            .iter()
            .map(|&b| if b < 0x80 { b as char } else { char::REPLACEMENT_CHARACTER })
            .collect(),
        Charset::Cp850 => bytes
            .iter()
            .map(|&b| if b < 0x80 { b as char } else { CP850_HIGH[(b - 0x80) as usize] })
            .collect(),
        Charset::Utf32Le => decode_utf32(bytes, false),
        Charset::Utf32Be => decode_utf32(bytes, true),
        _ => unreachable!("{} is decoded by encoding_rs", charset.display_name()),
    }
}

fn decode_utf32(bytes: &[u8], big_endian: bool) -> String {
    let bom: [u8; 4] = if big_endian { [0x00, 0x00, 0xFE, 0xFF] } else { [0xFF, 0xFE, 0x00, 0x00] };
    let body = bytes.strip_prefix(&bom[..]).unwrap_or(bytes);

    let mut out = String::with_capacity(body.len() / 4);
    for unit in body.chunks(4) {
        let ch = match <[u8; 4]>::try_from(unit) {
            Ok(quad) => {
                let value = if big_endian { u32::from_be_bytes(quad) } else { u32::from_le_bytes(quad) };
                char::from_u32(value).unwrap_or(char::REPLACEMENT_CHARACTER)
            }
            // trailing partial unit
            Err(_) => char::REPLACEMENT_CHARACTER,
        };
        out.push(ch);
    }
    out
}

/// Upper half (0x80..=0xFF) of IBM code page 850.
static CP850_HIGH: [char; 128] = [
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å',
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', 'ø', '£', 'Ø', '×', 'ƒ',
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '®', '¬', '½', '¼', '¡', '«', '»',
    '░', '▒', '▓', '│', '┤', 'Á', 'Â', 'À', '©', '╣', '║', '╗', '╝', '¢', '¥', '┐',
    '└', '┴', '┬', '├', '─', '┼', 'ã', 'Ã', '╚', '╔', '╩', '╦', '╠', '═', '╬', '¤',
    'ð', 'Ð', 'Ê', 'Ë', 'È', 'ı', 'Í', 'Î', 'Ï', '┘', '┌', '█', '▄', '¦', 'Ì', '▀',
    'Ó', 'ß', 'Ô', 'Ò', 'õ', 'Õ', 'µ', 'þ', 'Þ', 'Ú', 'Û', 'Ù', 'ý', 'Ý', '¯', '´',
    '\u{AD}', '±', '‗', '¾', '¶', '§', '÷', '¸', '°', '¨', '·', '¹', '³', '²', '■', '\u{A0}',
];
