// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Legacy text encodings, backed by `encoding_rs`.

use crate::error::{Error, Result};
use crate::tags::TextEncoding;
use encoding_rs::{Encoding, GB18030, GBK};

fn encoding_for(encoding: TextEncoding) -> Option<&'static Encoding> {
    match encoding {
        TextEncoding::None => None,
        TextEncoding::Gbk => Some(GBK),
        TextEncoding::Gb18030 => Some(GB18030),
    }
}

fn label(encoding: TextEncoding) -> &'static str {
    match encoding {
        TextEncoding::None => "utf-8",
        TextEncoding::Gbk => "gbk",
        TextEncoding::Gb18030 => "gb18030",
    }
}

/// Encode text; unmappable characters are an error, never replaced.
pub fn encode(encoding: TextEncoding, text: &str) -> Result<Vec<u8>> {
    let Some(enc) = encoding_for(encoding) else {
        return Ok(text.as_bytes().to_vec());
    };
    let (bytes, _, had_errors) = enc.encode(text);
    if had_errors {
        return Err(Error::Transcoding {
            encoding: label(encoding),
            reason: format!("{text:?} contains unmappable characters"),
        });
    }
    Ok(bytes.into_owned())
}

/// Decode bytes; malformed input is an error.
pub fn decode(encoding: TextEncoding, bytes: &[u8]) -> Result<String> {
    let Some(enc) = encoding_for(encoding) else {
        return String::from_utf8(bytes.to_vec()).map_err(|e| Error::Transcoding {
            encoding: label(encoding),
            reason: e.to_string(),
        });
    };
    enc.decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
        .ok_or_else(|| Error::Transcoding {
            encoding: label(encoding),
            reason: format!("malformed input {bytes:02x?}"),
        })
}
