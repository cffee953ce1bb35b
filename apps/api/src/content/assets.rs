//! Opaque image assets (institution logos, country emblems).
//!
//! Assets are owned by value. On the wire they travel as base64 strings so a
//! stored `ContentModel` stays plain JSON.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An uploaded raster image. Decoding is deferred to the renderer; this type
/// never inspects pixels.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageAsset {
    data: Vec<u8>,
}

impl ImageAsset {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Sniffs the MIME type from the leading magic bytes.
    /// Returns `None` for anything that is not PNG or JPEG.
    pub fn media_type(&self) -> Option<&'static str> {
        match image::guess_format(&self.data).ok()? {
            image::ImageFormat::Png => Some("image/png"),
            image::ImageFormat::Jpeg => Some("image/jpeg"),
            _ => None,
        }
    }

    /// `data:` URI used when the asset is inlined into SVG or HTML markup.
    pub fn data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.media_type().unwrap_or("application/octet-stream"),
            STANDARD.encode(&self.data)
        )
    }
}

impl std::fmt::Debug for ImageAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageAsset")
            .field("len", &self.data.len())
            .field("media_type", &self.media_type())
            .finish()
    }
}

impl Serialize for ImageAsset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(&self.data))
    }
}

impl<'de> Deserialize<'de> for ImageAsset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        // Browsers hand us `data:image/png;base64,...`; accept both forms.
        let payload = match encoded.split_once(";base64,") {
            Some((prefix, rest)) if prefix.starts_with("data:") => rest,
            _ => encoded.as_str(),
        };
        STANDARD
            .decode(payload.trim())
            .map(ImageAsset::new)
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    #[test]
    fn test_media_type_sniffs_png_and_jpeg() {
        assert_eq!(ImageAsset::new(PNG_MAGIC).media_type(), Some("image/png"));
        let jpeg = ImageAsset::new(vec![0xFF, 0xD8, 0xFF, 0xE0, 0, 0]);
        assert_eq!(jpeg.media_type(), Some("image/jpeg"));
        assert_eq!(ImageAsset::new(b"not an image".to_vec()).media_type(), None);
    }

    #[test]
    fn test_deserialize_accepts_data_uri_prefix() {
        let encoded = STANDARD.encode(PNG_MAGIC);
        let raw: ImageAsset = serde_json::from_value(serde_json::json!(encoded)).unwrap();
        let uri: ImageAsset =
            serde_json::from_value(serde_json::json!(format!("data:image/png;base64,{encoded}")))
                .unwrap();
        assert_eq!(raw, uri);
        assert_eq!(raw.bytes(), PNG_MAGIC);
    }

    #[test]
    fn test_deserialize_rejects_invalid_base64() {
        let result: Result<ImageAsset, _> = serde_json::from_value(serde_json::json!("%%%"));
        assert!(result.is_err());
    }

    #[test]
    fn test_data_uri_carries_media_type() {
        let uri = ImageAsset::new(PNG_MAGIC).data_uri();
        assert!(uri.starts_with("data:image/png;base64,"));
    }
}
