//! Minimal copyright-notice reader for JPEG and PNG files.
//!
//! Sources, first non-empty wins:
//!
//! | Container | Location |
//! |---|---|
//! | JPEG | APP1 `Exif\0\0` → TIFF IFD0 tag `0x8298` (Copyright) |
//! | JPEG | APP13 Photoshop 8BIM `0x0404` → IPTC `2:116` (Copyright Notice) |
//! | PNG  | `eXIf` chunk → TIFF IFD0 tag `0x8298` |
//! | PNG  | `tEXt` chunk with keyword `Copyright` |
//! | PNG  | uncompressed `iTXt` chunk with keyword `Copyright` |
//!
//! Every parse failure degrades to `None`: missing metadata is normal and
//! never fails a build.

use std::path::Path;

const EXIF_HEADER: &[u8] = b"Exif\0\0";
const PHOTOSHOP_HEADER: &[u8] = b"Photoshop 3.0\0";
const BIM_MARKER: &[u8] = b"8BIM";
const IPTC_RESOURCE_ID: u16 = 0x0404;
const TAG_COPYRIGHT: u16 = 0x8298;
const IPTC_COPYRIGHT_DATASET: u8 = 116;
const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

/// Read the copyright notice embedded in `path`, sniffing the container from its bytes.
pub fn read_copyright(path: &Path) -> Option<String> {
    let bytes = std::fs::read(path).ok()?;
    if bytes.starts_with(&[0xFF, 0xD8]) {
        read_from_jpeg(&bytes)
    } else if bytes.starts_with(PNG_SIGNATURE) {
        read_from_png(&bytes)
    } else {
        None
    }
}

/// Trim whitespace, NUL padding and the surrounding quotes some tools add.
fn clean(raw: &[u8]) -> Option<String> {
    // EXIF allows "photographer\0editor"; keep the photographer part
    let first = raw.split(|&b| b == 0).next().unwrap_or(raw);
    let value = String::from_utf8_lossy(first)
        .trim()
        .trim_matches('"')
        .trim()
        .to_string();
    (!value.is_empty()).then_some(value)
}

fn be_u32(bytes: &[u8]) -> Option<usize> {
    let b = bytes.get(..4)?;
    Some(u32::from_be_bytes([b[0], b[1], b[2], b[3]]) as usize)
}

// ---------------------------------------------------------------------------
// JPEG
// ---------------------------------------------------------------------------

fn read_from_jpeg(data: &[u8]) -> Option<String> {
    let mut iptc = None;
    for (marker, segment) in jpeg_segments(data) {
        match marker {
            0xE1 if segment.starts_with(EXIF_HEADER) => {
                if let Some(found) = read_from_tiff(&segment[EXIF_HEADER.len()..]) {
                    return Some(found);
                }
            }
            0xED if iptc.is_none() => {
                iptc = extract_iptc_from_8bim(segment).and_then(iptc_copyright);
            }
            _ => {}
        }
    }
    iptc
}

/// Walk JPEG marker segments up to the start of scan.
fn jpeg_segments(data: &[u8]) -> Vec<(u8, &[u8])> {
    let mut segments = Vec::new();
    let mut pos = 2; // past SOI
    while pos + 4 <= data.len() {
        if data[pos] != 0xFF {
            break;
        }
        let marker = data[pos + 1];
        // Fill bytes
        if marker == 0xFF {
            pos += 1;
            continue;
        }
        // SOS (0xDA) starts the entropy-coded data
        if marker == 0xDA || marker == 0xD9 {
            break;
        }
        // Markers without length field
        if (0xD0..=0xD7).contains(&marker) || marker == 0x01 {
            pos += 2;
            continue;
        }
        let len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
        if len < 2 {
            break;
        }
        let start = pos + 4;
        let end = (pos + 2 + len).min(data.len());
        segments.push((marker, &data[start..end]));
        pos += 2 + len;
    }
    segments
}

/// Extract IPTC-IIM bytes from a Photoshop 8BIM resource block.
fn extract_iptc_from_8bim(segment: &[u8]) -> Option<&[u8]> {
    let data = segment.strip_prefix(PHOTOSHOP_HEADER).unwrap_or(segment);

    let mut pos = 0;
    while pos + 12 <= data.len() {
        // "8BIM" (4) + resource_id (2) + pascal_string + data_len (4) + data
        if &data[pos..pos + 4] != BIM_MARKER {
            pos += 1;
            continue;
        }
        pos += 4;
        let resource_id = u16::from_be_bytes([data[pos], data[pos + 1]]);
        pos += 2;

        // Pascal string padded to even total length
        let pascal_len = *data.get(pos)? as usize;
        pos += 1 + pascal_len + ((1 + pascal_len) % 2);

        let res_len = be_u32(data.get(pos..)?)?;
        pos += 4;

        let body = data.get(pos..pos + res_len)?;
        if resource_id == IPTC_RESOURCE_ID {
            return Some(body);
        }
        pos += res_len + (res_len % 2);
    }
    None
}

/// Find dataset 2:116 in raw IPTC-IIM bytes.
///
/// Each dataset: `0x1C`, record, dataset, big-endian u16 length, data.
fn iptc_copyright(data: &[u8]) -> Option<String> {
    let mut pos = 0;
    while pos + 5 <= data.len() {
        if data[pos] != 0x1C {
            pos += 1;
            continue;
        }
        let record = data[pos + 1];
        let dataset = data[pos + 2];
        let length = u16::from_be_bytes([data[pos + 3], data[pos + 4]]) as usize;
        pos += 5;
        let value = data.get(pos..pos + length)?;
        if record == 2 && dataset == IPTC_COPYRIGHT_DATASET {
            return clean(value);
        }
        pos += length;
    }
    None
}

// ---------------------------------------------------------------------------
// TIFF (EXIF payload)
// ---------------------------------------------------------------------------

/// Read the Copyright tag from IFD0 of a TIFF structure.
fn read_from_tiff(data: &[u8]) -> Option<String> {
    let big_endian = match data.get(0..2)? {
        b"MM" => true,
        b"II" => false,
        _ => return None,
    };

    let read_u16 = |offset: usize| -> Option<u16> {
        let b = data.get(offset..offset + 2)?;
        Some(if big_endian {
            u16::from_be_bytes([b[0], b[1]])
        } else {
            u16::from_le_bytes([b[0], b[1]])
        })
    };
    let read_u32 = |offset: usize| -> Option<u32> {
        let b = data.get(offset..offset + 4)?;
        Some(if big_endian {
            u32::from_be_bytes([b[0], b[1], b[2], b[3]])
        } else {
            u32::from_le_bytes([b[0], b[1], b[2], b[3]])
        })
    };

    if read_u16(2)? != 42 {
        return None;
    }

    let ifd = read_u32(4)? as usize;
    let entry_count = read_u16(ifd)? as usize;
    for i in 0..entry_count {
        let entry = ifd + 2 + i * 12;
        if read_u16(entry)? != TAG_COPYRIGHT {
            continue;
        }
        // ASCII (2) or UNDEFINED (7): one byte per count
        let count = read_u32(entry + 4)? as usize;
        let value = if count <= 4 {
            data.get(entry + 8..entry + 8 + count)?
        } else {
            let offset = read_u32(entry + 8)? as usize;
            data.get(offset..offset + count)?
        };
        return clean(value);
    }
    None
}

// ---------------------------------------------------------------------------
// PNG
// ---------------------------------------------------------------------------

fn read_from_png(data: &[u8]) -> Option<String> {
    let mut text = None;
    let mut pos = PNG_SIGNATURE.len();
    while pos + 8 <= data.len() {
        let Some(len) = be_u32(&data[pos..]) else {
            break;
        };
        let kind = &data[pos + 4..pos + 8];
        let Some(body) = data.get(pos + 8..pos + 8 + len) else {
            break;
        };
        match kind {
            b"eXIf" => {
                if let Some(found) = read_from_tiff(body) {
                    return Some(found);
                }
            }
            b"tEXt" if text.is_none() => {
                if let Some(value) = body.strip_prefix(b"Copyright\0") {
                    text = clean(value);
                }
            }
            b"iTXt" if text.is_none() => {
                text = itxt_copyright(body);
            }
            b"IEND" => break,
            _ => {}
        }
        pos += 12 + len; // length + type + data + crc
    }
    text
}

/// Text of an uncompressed `iTXt` chunk keyed `Copyright`.
///
/// Body: keyword, NUL, compression flag, compression method, language tag,
/// NUL, translated keyword, NUL, UTF-8 text. Compressed text is skipped.
fn itxt_copyright(body: &[u8]) -> Option<String> {
    let rest = body.strip_prefix(b"Copyright\0")?;
    let (&compressed, rest) = rest.split_first()?;
    if compressed != 0 {
        return None;
    }
    // Past the compression method: language, translated keyword, text
    let mut fields = rest.get(1..)?.splitn(3, |&b| b == 0);
    clean(fields.nth(2)?)
}
