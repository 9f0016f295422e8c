//! 履歴エントリのエンコード/デコード
//!
//! 1エントリ = 1エンベロープ（ビッグエンディアン）:
//!
//! ```text
//! magic       4 bytes  "FAIH"
//! version     u16
//! header_len  u32
//! header      JSON（バージョンごとのヘッダ構造体）
//! image_len   u64      0 は画像なし
//! image       image_len bytes
//! ```
//!
//! 未知のバージョンはレイアウトを推測せず拒否する。
//! 必須フィールドが欠けている場合もデフォルト値で補わずエラーにする。

use crate::error::DecodeError;
use crate::types::{AnalysisRecord, HistoryEntry};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub const MAGIC: &[u8; 4] = b"FAIH";

/// 現在書き出すフォーマットバージョン
pub const CURRENT_VERSION: u16 = 1;

/// v1 ヘッダ
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EnvelopeHeaderV1<'a> {
    id: &'a str,
    created_at: i64,
    record: &'a AnalysisRecord,
    image_sha256: String,
}

/// v1 ヘッダの読み込み用（欠けたフィールド名を報告するため全て Option）
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawHeaderV1 {
    id: Option<String>,
    created_at: Option<i64>,
    record: Option<RawRecordV1>,
    image_sha256: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRecordV1 {
    food_name: Option<String>,
    carb_content: Option<String>,
    suitability_index: Option<String>,
    recommended_amount: Option<String>,
    nutrients: Option<String>,
    health_tips: Option<String>,
}

/// エントリをエンベロープに書き出す
pub fn encode(entry: &HistoryEntry) -> Vec<u8> {
    let image = entry.source_image().unwrap_or(&[]);
    let header = EnvelopeHeaderV1 {
        id: entry.id(),
        created_at: entry.created_at(),
        record: entry.record(),
        image_sha256: image_digest(image),
    };
    // 文字列と整数だけの構造体なのでシリアライズは失敗しない
    let header_json = serde_json::to_vec(&header).unwrap_or_default();

    let mut out = Vec::with_capacity(4 + 2 + 4 + header_json.len() + 8 + image.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&CURRENT_VERSION.to_be_bytes());
    out.extend_from_slice(&(header_json.len() as u32).to_be_bytes());
    out.extend_from_slice(&header_json);
    out.extend_from_slice(&(image.len() as u64).to_be_bytes());
    out.extend_from_slice(image);
    out
}

/// エンベロープからエントリを復元
pub fn decode(blob: &[u8]) -> Result<HistoryEntry, DecodeError> {
    let mut reader = Reader::new(blob);

    let magic = reader.take(4, "magic")?;
    if magic != MAGIC {
        return Err(DecodeError::BadMagic);
    }

    let version = u16::from_be_bytes(reader.array::<2>("version")?);
    match version {
        1 => decode_v1(&mut reader),
        other => Err(DecodeError::UnsupportedVersion(other)),
    }
}

fn decode_v1(reader: &mut Reader<'_>) -> Result<HistoryEntry, DecodeError> {
    let header_len = u32::from_be_bytes(reader.array::<4>("header_len")?) as usize;
    let header_bytes = reader.take(header_len, "header")?;
    let header: RawHeaderV1 = serde_json::from_slice(header_bytes)
        .map_err(|e| DecodeError::InvalidHeader(e.to_string()))?;

    let id = required(header.id, "id")?;
    let created_at = header.created_at.ok_or(DecodeError::MissingField("createdAt"))?;
    let raw_record = header.record.ok_or(DecodeError::MissingField("record"))?;
    let expected_digest = required(header.image_sha256, "imageSha256")?;

    let record = AnalysisRecord {
        food_name: required(raw_record.food_name, "record.foodName")?,
        carb_content: required(raw_record.carb_content, "record.carbContent")?,
        suitability_index: required(raw_record.suitability_index, "record.suitabilityIndex")?,
        recommended_amount: required(raw_record.recommended_amount, "record.recommendedAmount")?,
        nutrients: required(raw_record.nutrients, "record.nutrients")?,
        health_tips: required(raw_record.health_tips, "record.healthTips")?,
    };

    let image_len = u64::from_be_bytes(reader.array::<8>("image_len")?);
    let image_len = usize::try_from(image_len).map_err(|_| DecodeError::Truncated("image"))?;
    let image = reader.take(image_len, "image")?;

    if reader.remaining() > 0 {
        return Err(DecodeError::TrailingBytes(reader.remaining()));
    }
    if image_digest(image) != expected_digest {
        return Err(DecodeError::ImageChecksumMismatch);
    }

    Ok(HistoryEntry::new(id, created_at, Some(image.to_vec()), record))
}

/// 空文字は欠落と同じ扱い
fn required(value: Option<String>, name: &'static str) -> Result<String, DecodeError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(DecodeError::MissingField(name))
}

fn image_digest(image: &[u8]) -> String {
    hex::encode(Sha256::digest(image))
}

/// 境界チェック付きの読み取りカーソル
struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take(&mut self, len: usize, segment: &'static str) -> Result<&'a [u8], DecodeError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.buf.len())
            .ok_or(DecodeError::Truncated(segment))?;
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self, segment: &'static str) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N, segment)?);
        Ok(out)
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }
}
