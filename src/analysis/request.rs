/// Vision request construction
///
/// Reads the selected photo, enforces the upload limit and turns it into
/// the chat-style JSON body the vision endpoint expects.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use serde::Serialize;
use std::io::Cursor;
use std::path::Path;

use super::error::AnalysisError;
use crate::config::Config;

/// Instructions sent alongside every photo.
///
/// Asks for a calorie estimate, a health rating, one line of advice and an
/// English visual description in parentheses at the end of the reply.
pub const NUTRITION_PROMPT: &str = "\
أنت خبير تغذية ذكي اسمه Ora.
انظر للصورة المرفقة وحللها بدقة:
1. قدر السعرات الحرارية الإجمالية (رقم تقريبي).
2. قيم مدى صحية الوجبة (صحية/غير صحية/متوسطة).
3. اكتب نصيحة قصيرة جداً (سطر واحد) لتحسين القيمة الغذائية.
4. اكتب وصفاً بصرياً دقيقاً للوجبة (باللغة الإنجليزية) لنستخدمه في الرسم.

اجعل الرد باللغة العربية (ما عدا الوصف الإنجليزي ضعه في النهاية بين قوسين).
كن لطيفاً ومشجعاً.";

/// Extensions offered by the picker; all decodable by `image`
pub const PICKABLE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// One photo plus the fixed prompt, ready to send
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub image_bytes: Vec<u8>,
    pub prompt: &'static str,
}

#[derive(Serialize)]
struct VisionPayload<'a> {
    messages: [ChatMessage<'a>; 1],
    model: &'a str,
    #[serde(rename = "jsonMode")]
    json_mode: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: [ContentPart<'a>; 2],
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

impl AnalysisRequest {
    pub fn new(image_bytes: Vec<u8>) -> Self {
        Self {
            image_bytes,
            prompt: NUTRITION_PROMPT,
        }
    }

    /// `data:image/jpeg;base64,...` form of the photo
    pub fn data_uri(&self) -> String {
        format!("data:image/jpeg;base64,{}", BASE64.encode(&self.image_bytes))
    }

    /// JSON body for the vision endpoint. Free-form text reply, no JSON mode.
    pub fn to_json(&self, model: &str) -> Result<Vec<u8>, AnalysisError> {
        let payload = VisionPayload {
            messages: [ChatMessage {
                role: "user",
                content: [
                    ContentPart::Text { text: self.prompt },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: self.data_uri() },
                    },
                ],
            }],
            model,
            json_mode: false,
        };

        serde_json::to_vec(&payload).map_err(|e| AnalysisError::Encoding(e.to_string()))
    }
}

/// Read the photo at `path` and build a request within the upload limit
pub async fn load_request(path: &Path, config: &Config) -> Result<AnalysisRequest, AnalysisError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| AnalysisError::FileAccess {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let limit = config.max_upload_bytes;
    if bytes.len() <= limit {
        return Ok(AnalysisRequest::new(bytes));
    }

    log::info!(
        "📐 {} is {:.1}MB, downscaling before upload",
        path.display(),
        bytes.len() as f64 / 1024.0 / 1024.0
    );

    let max_dimension = config.max_image_dimension;
    let original_size = bytes.len();

    // Decoding and re-encoding is CPU-bound
    let shrunk = tokio::task::spawn_blocking(move || downscale_to_jpeg(&bytes, max_dimension))
        .await
        .map_err(|e| AnalysisError::Encoding(format!("Task join error: {}", e)))?;

    match shrunk {
        Ok(jpeg) if jpeg.len() <= limit => Ok(AnalysisRequest::new(jpeg)),
        Ok(jpeg) => Err(AnalysisError::ImageTooLarge { size: jpeg.len(), limit }),
        Err(reason) => {
            log::warn!("⚠️  Could not downscale {}: {}", path.display(), reason);
            Err(AnalysisError::ImageTooLarge { size: original_size, limit })
        }
    }
}

/// Fit the image inside `max_dimension` and re-encode as JPEG
fn downscale_to_jpeg(bytes: &[u8], max_dimension: u32) -> Result<Vec<u8>, String> {
    let img = image::load_from_memory(bytes).map_err(|e| format!("decode failed: {}", e))?;

    let resized = if img.width() > max_dimension || img.height() > max_dimension {
        img.resize(max_dimension, max_dimension, FilterType::Lanczos3)
    } else {
        img
    };

    // JPEG has no alpha channel
    let rgb = DynamicImage::ImageRgb8(resized.to_rgb8());

    let mut jpeg = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut jpeg), ImageFormat::Jpeg)
        .map_err(|e| format!("encode failed: {}", e))?;

    Ok(jpeg)
}
