//! # 내보내기 어댑터 (PDF / Word)
//!
//! - PDF: 렌더링된 문서를 래스터 이미지로 받아, 이미지 크기와 같은 단일 페이지 PDF에 넣습니다.
//!   결과물은 페이지 "사진"이므로 텍스트를 선택할 수 없습니다.
//! - Word: 마크업을 그대로 `application/msword` 블롭으로 내려보냅니다.
//!   Word 호환성은 검증하지 않으며 해석은 받는 쪽 프로그램의 몫입니다.
//!
//! 래스터화 자체(렌더링 엔진)는 외부 협력자입니다. 서버는 브라우저가 올려준
//! PNG 스냅샷을 `SnapshotRasterizer`로 감싸 사용합니다.

use image::DynamicImage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream};
use thiserror::Error;

pub const PDF_FILENAME: &str = "document.pdf";
pub const PDF_MIME: &str = "application/pdf";
pub const WORD_FILENAME: &str = "document.doc";
pub const WORD_MIME: &str = "application/msword";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No rendered snapshot is available for export")]
    NoSnapshot,

    #[error("Invalid snapshot image: {0}")]
    Image(#[from] image::ImageError),

    #[error("PDF generation failed: {0}")]
    Pdf(String),
}

/// 다운로드로 내려보낼 파일
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub filename: &'static str,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// 문서 마크업을 이미지로 래스터화하는 외부 렌더러
pub trait Rasterizer: Send + Sync {
    fn rasterize(&self, markup: &str) -> Result<DynamicImage, ExportError>;
}

/// 스냅샷이 아직 없는 세션의 기본값. 항상 `NoSnapshot`.
pub struct MissingSnapshot;

impl Rasterizer for MissingSnapshot {
    fn rasterize(&self, _markup: &str) -> Result<DynamicImage, ExportError> {
        Err(ExportError::NoSnapshot)
    }
}

/// 클라이언트가 마지막으로 올린 렌더링 스냅샷을 돌려주는 래스터라이저
pub struct SnapshotRasterizer {
    image: DynamicImage,
}

impl SnapshotRasterizer {
    /// PNG(또는 JPEG) 바이트를 디코딩해 둡니다. 잘못된 이미지는 여기서 거부됩니다.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ExportError> {
        Ok(Self {
            image: image::load_from_memory(bytes)?,
        })
    }
}

impl Rasterizer for SnapshotRasterizer {
    fn rasterize(&self, _markup: &str) -> Result<DynamicImage, ExportError> {
        Ok(self.image.clone())
    }
}

/// 마크업을 래스터화한 뒤 PDF로 감쌉니다 (exportToPDF).
pub fn export_pdf(rasterizer: &dyn Rasterizer, markup: &str) -> Result<ExportFile, ExportError> {
    let image = rasterizer.rasterize(markup)?;
    Ok(ExportFile {
        filename: PDF_FILENAME,
        mime: PDF_MIME,
        bytes: image_to_pdf(&image)?,
    })
}

/// 마크업을 Word 문서 타입의 블롭으로 만듭니다 (exportToWord).
pub fn export_word(markup: &str) -> ExportFile {
    ExportFile {
        filename: WORD_FILENAME,
        mime: WORD_MIME,
        bytes: markup.as_bytes().to_vec(),
    }
}

/// 이미지 한 장을 담은 단일 페이지 PDF를 만듭니다.
///
/// 페이지 MediaBox는 이미지 픽셀 크기와 같고(1px = 1pt),
/// 이미지는 DeviceRGB XObject로 페이지 전체에 그려집니다.
pub fn image_to_pdf(image: &DynamicImage) -> Result<Vec<u8>, ExportError> {
    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();
    let (w, h) = (i64::from(width), i64::from(height));

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => Object::Integer(w),
            "Height" => Object::Integer(h),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => Object::Integer(8),
        },
        rgb.into_raw(),
    ));

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Integer(w),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(h),
                    Object::Integer(0),
                    Object::Integer(0),
                ],
            ),
            Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let encoded = content
        .encode()
        .map_err(|e| ExportError::Pdf(e.to_string()))?;
    let content_id = doc.add_object(Stream::new(Dictionary::new(), encoded));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(w),
            Object::Integer(h),
        ],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! { "Im0" => image_id },
        },
    });

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![Object::Reference(page_id)],
        "Count" => Object::Integer(1),
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;
    Ok(bytes)
}
