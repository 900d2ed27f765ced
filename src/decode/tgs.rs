use crate::foundation::error::{TgsError, TgsResult};
use crate::scene::model::AnimationGraph;
use flate2::read::{GzDecoder, ZlibDecoder};
use flate2::{Compression, write::GzEncoder};
use std::io::{Read, Write};

/// Upper bound on inflated payload size. Real stickers inflate to well under 1 MiB.
pub const MAX_INFLATED_BYTES: u64 = 64 * 1024 * 1024;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const UTF8_BOM: &str = "\u{feff}";

/// Return `true` when `bytes` starts with a gzip member header.
pub fn is_gzip(bytes: &[u8]) -> bool {
    bytes.starts_with(&GZIP_MAGIC)
}

/// Return `true` when `bytes` starts with a valid zlib (RFC 1950) header.
pub fn is_zlib(bytes: &[u8]) -> bool {
    let &[cmf, flg, ..] = bytes else {
        return false;
    };
    let method = cmf & 0x0f;
    let window = cmf >> 4;
    method == 8 && window <= 7 && (u16::from(cmf) << 8 | u16::from(flg)) % 31 == 0
}

/// Return `true` when `bytes` is gzip- or zlib-compressed.
pub fn is_compressed(bytes: &[u8]) -> bool {
    is_gzip(bytes) || is_zlib(bytes)
}

/// Inflate a `.tgs` buffer and parse the Lottie document inside.
#[tracing::instrument(skip(bytes), fields(len = bytes.len()))]
pub fn decompress_tgs(bytes: &[u8]) -> TgsResult<AnimationGraph> {
    let json = inflate(bytes)?;
    parse_lottie_json(&json)
}

/// Parse Lottie JSON text. No semantic validation is performed.
pub fn parse_lottie_json(json: &str) -> TgsResult<AnimationGraph> {
    let json = json.strip_prefix(UTF8_BOM).unwrap_or(json);
    serde_json::from_str(json)
        .map_err(|e| TgsError::malformed_json(format!("parse lottie JSON: {e}")))
}

/// Inflate gzip or zlib data into UTF-8 text.
pub fn inflate(bytes: &[u8]) -> TgsResult<String> {
    let mut out = Vec::new();
    if is_gzip(bytes) {
        read_bounded(GzDecoder::new(bytes), &mut out)?;
    } else if is_zlib(bytes) {
        read_bounded(ZlibDecoder::new(bytes), &mut out)?;
    } else {
        return Err(TgsError::decompression(
            "input is neither gzip nor zlib compressed",
        ));
    }

    tracing::debug!(
        compressed = bytes.len(),
        inflated = out.len(),
        "inflated tgs payload"
    );

    String::from_utf8(out)
        .map_err(|e| TgsError::malformed_json(format!("inflated payload is not UTF-8: {e}")))
}

/// Gzip `json` the way `.tgs` files are packed.
pub fn compress_tgs(json: &str) -> TgsResult<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(json.as_bytes())
        .map_err(|e| TgsError::Other(e.into()))?;
    encoder.finish().map_err(|e| TgsError::Other(e.into()))
}

fn read_bounded<R: Read>(r: R, out: &mut Vec<u8>) -> TgsResult<()> {
    let n = r
        .take(MAX_INFLATED_BYTES + 1)
        .read_to_end(out)
        .map_err(|e| TgsError::decompression(format!("corrupt or truncated stream: {e}")))?;
    if n as u64 > MAX_INFLATED_BYTES {
        return Err(TgsError::decompression(format!(
            "inflated payload exceeds {MAX_INFLATED_BYTES} bytes"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/decode/tgs.rs"]
mod tests;
