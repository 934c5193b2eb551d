//! # 이미지 오버레이 캔버스
//!
//! 본문 흐름과 별개로 이미지를 띄워 두는 보조 그리기 목록입니다.
//! 목록 순서가 그리기 순서이며 마지막 객체가 맨 위에 그려집니다.
//!
//! 줄바꿈 모드(`WrapMode`)는 표시용 태그일 뿐이고 본문 배치에는 영향이 없습니다.

use std::io::Cursor;

use image::{imageops::FilterType, DynamicImage, ImageFormat};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OverlayError {
    #[error("Nothing selected")]
    NothingSelected,

    #[error("Overlay object {0} not found")]
    UnknownObject(String),

    #[error("{0} is not an image")]
    NotAnImage(String),

    #[error("Could not decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Could not encode image: {0}")]
    Encode(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerDirection {
    Front,
    Back,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WrapMode {
    #[default]
    Inline,
    Float,
}

#[derive(Debug, Clone, Serialize)]
pub struct OverlayObject {
    pub id: String,
    pub filename: String,
    pub width: u32,
    pub height: u32,
    pub wrap: WrapMode,
    /// 축소 후 다시 인코딩한 PNG
    #[serde(skip)]
    pub png: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct OverlayCanvas {
    objects: Vec<OverlayObject>,
    selected: Option<String>,
    max_width: u32,
}

/// 최대 너비에 맞게 비율을 유지하며 줄입니다. 키우지는 않습니다.
fn fit_width(image: DynamicImage, max_width: u32) -> DynamicImage {
    let (width, height) = (image.width(), image.height());
    if width <= max_width || max_width == 0 {
        return image;
    }
    let scaled_height = (u64::from(height) * u64::from(max_width) / u64::from(width)).max(1);
    image.resize_exact(max_width, scaled_height as u32, FilterType::Triangle)
}

impl OverlayCanvas {
    pub fn new(max_width: u32) -> Self {
        Self {
            objects: Vec::new(),
            selected: None,
            max_width,
        }
    }

    /// 그리기 순서 (마지막이 맨 위)
    pub fn objects(&self) -> &[OverlayObject] {
        &self.objects
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn get(&self, id: &str) -> Option<&OverlayObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// 업로드한 이미지를 디코딩해 축소한 뒤 맨 위에 올리고 선택합니다.
    pub fn upload_image(
        &mut self,
        filename: &str,
        bytes: &[u8],
    ) -> Result<&OverlayObject, OverlayError> {
        let format = image::guess_format(bytes)
            .map_err(|_| OverlayError::NotAnImage(filename.to_string()))?;
        let decoded = image::load_from_memory_with_format(bytes, format)?;
        let scaled = fit_width(decoded, self.max_width);

        let mut png = Vec::new();
        scaled
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| OverlayError::Encode(e.to_string()))?;

        let object = OverlayObject {
            id: uuid::Uuid::now_v7().to_string(),
            filename: filename.to_string(),
            width: scaled.width(),
            height: scaled.height(),
            wrap: WrapMode::default(),
            png,
        };
        tracing::debug!(
            object_id = %object.id,
            width = object.width,
            height = object.height,
            "Image placed on overlay"
        );
        self.selected = Some(object.id.clone());
        self.objects.push(object);
        Ok(&self.objects[self.objects.len() - 1])
    }

    pub fn select(&mut self, id: &str) -> Result<(), OverlayError> {
        if self.get(id).is_none() {
            return Err(OverlayError::UnknownObject(id.to_string()));
        }
        self.selected = Some(id.to_string());
        Ok(())
    }

    fn selected_index(&self) -> Result<usize, OverlayError> {
        let id = self.selected.as_deref().ok_or(OverlayError::NothingSelected)?;
        self.objects
            .iter()
            .position(|o| o.id == id)
            .ok_or_else(|| OverlayError::UnknownObject(id.to_string()))
    }

    /// 선택한 객체를 그리기 목록의 맨 앞(Back) 또는 맨 뒤(Front)로 옮깁니다.
    pub fn change_layer(&mut self, direction: LayerDirection) -> Result<(), OverlayError> {
        let index = self.selected_index()?;
        let object = self.objects.remove(index);
        match direction {
            LayerDirection::Front => self.objects.push(object),
            LayerDirection::Back => self.objects.insert(0, object),
        }
        Ok(())
    }

    pub fn set_wrap(&mut self, mode: WrapMode) -> Result<(), OverlayError> {
        let index = self.selected_index()?;
        self.objects[index].wrap = mode;
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Result<OverlayObject, OverlayError> {
        let index = self
            .objects
            .iter()
            .position(|o| o.id == id)
            .ok_or_else(|| OverlayError::UnknownObject(id.to_string()))?;
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        Ok(self.objects.remove(index))
    }
}
