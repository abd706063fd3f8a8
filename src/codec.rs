//! 이미지 코덱 모듈
//!
//! HEIC/HEIF 디코딩은 libheif-rs, JPEG 인코딩은 image 크레이트에 위임합니다.
//! 변환 엔진은 `Codec` 트레이트에만 의존합니다.

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbImage};
use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};

use crate::error::{ConvertError, Result};

/// 디코더/인코더 인터페이스
///
/// 여러 워커 스레드에서 동시에 호출됩니다.
pub trait Codec: Send + Sync {
    /// 원본 바이트를 이미지로 디코딩
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage>;

    /// 이미지를 지정한 품질의 JPEG 바이트로 인코딩
    fn encode(&self, image: &DynamicImage, quality: u8) -> Result<Vec<u8>>;
}

/// libheif 기반 HEIC → JPEG 코덱
#[derive(Debug, Default, Clone, Copy)]
pub struct HeifJpegCodec;

impl HeifJpegCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Codec for HeifJpegCodec {
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage> {
        let lib_heif = LibHeif::new();

        let ctx = HeifContext::read_from_bytes(bytes).map_err(|e| ConvertError::Decode {
            reason: format!("HEIC 컨테이너를 읽을 수 없습니다: {}", e),
        })?;

        let handle = ctx.primary_image_handle().map_err(|e| ConvertError::Decode {
            reason: format!("기본 이미지를 찾을 수 없습니다: {}", e),
        })?;

        let width = handle.width();
        let height = handle.height();

        // 알파 채널은 버리고 8비트 RGB로 디코딩
        let decoded = lib_heif
            .decode(&handle, ColorSpace::Rgb(RgbChroma::Rgb), None)
            .map_err(|e| ConvertError::Decode {
                reason: e.to_string(),
            })?;

        let planes = decoded.planes();
        let plane = planes.interleaved.ok_or_else(|| ConvertError::Decode {
            reason: "RGB 평면이 없습니다".to_string(),
        })?;

        let pixels = pack_rows(plane.data, plane.stride, width, height)?;

        RgbImage::from_raw(width, height, pixels)
            .map(DynamicImage::ImageRgb8)
            .ok_or_else(|| ConvertError::Decode {
                reason: "RGB 이미지 버퍼 크기가 맞지 않습니다".to_string(),
            })
    }

    fn encode(&self, image: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
        encode_jpeg(image, quality)
    }
}

/// 이미지를 JPEG 바이트로 인코딩
///
/// JPEG는 알파를 지원하지 않으므로 항상 RGB로 변환한 뒤 인코딩합니다.
pub fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);

    let converted;
    let rgb = match image {
        DynamicImage::ImageRgb8(_) => image,
        other => {
            converted = DynamicImage::ImageRgb8(other.to_rgb8());
            &converted
        }
    };

    rgb.write_with_encoder(encoder)
        .map_err(|e| ConvertError::Encode {
            reason: e.to_string(),
        })?;

    Ok(buffer)
}

/// 행 패딩(stride)을 제거하여 연속된 RGB 버퍼로 복사
fn pack_rows(data: &[u8], stride: usize, width: u32, height: u32) -> Result<Vec<u8>> {
    let row_len = width as usize * 3;
    let rows = height as usize;

    if stride < row_len || data.len() < stride * rows.saturating_sub(1) + row_len {
        return Err(ConvertError::Decode {
            reason: format!(
                "평면 크기가 올바르지 않습니다 (stride {}, {}x{})",
                stride, width, height
            ),
        });
    }

    if stride == row_len {
        return Ok(data[..row_len * rows].to_vec());
    }

    let mut pixels = Vec::with_capacity(row_len * rows);
    for row in data.chunks(stride).take(rows) {
        pixels.extend_from_slice(&row[..row_len]);
    }
    Ok(pixels)
}
