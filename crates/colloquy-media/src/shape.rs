use std::path::Path;

use colloquy_core::{ContentPart, ImageSource, ImageUrl, InputAudio};

use crate::error::{MediaError, Result};
use crate::profile::MediaKind;

/// Base64 payload of one attachment, tagged with the format it was encoded in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedMedia {
    pub kind: MediaKind,
    /// Extension without the leading dot, e.g. `png`.
    pub format: String,
    pub data: String,
}

impl EncodedMedia {
    pub fn mime_type(&self) -> String {
        match (self.kind, self.format.as_str()) {
            (MediaKind::Image, "jpg") => "image/jpeg".to_string(),
            (MediaKind::Image, format) => format!("image/{}", format),
            (MediaKind::Audio, "mp3") => "audio/mpeg".to_string(),
            (MediaKind::Audio, format) => format!("audio/{}", format),
        }
    }
}

/// Renders encoded media into the content part a provider expects.
pub trait PayloadShape: Send + Sync {
    fn media_part(&self, media: &EncodedMedia, path: &Path) -> Result<ContentPart>;
}

/// `image_url` data URLs and `input_audio` blocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAiShape;

impl PayloadShape for OpenAiShape {
    fn media_part(&self, media: &EncodedMedia, _path: &Path) -> Result<ContentPart> {
        Ok(match media.kind {
            MediaKind::Image => ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: format!("data:{};base64,{}", media.mime_type(), media.data),
                },
            },
            MediaKind::Audio => ContentPart::InputAudio {
                input_audio: InputAudio {
                    data: media.data.clone(),
                    format: media.format.clone(),
                },
            },
        })
    }
}

/// Base64 `image` source blocks. Audio has no representation here.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnthropicShape;

impl PayloadShape for AnthropicShape {
    fn media_part(&self, media: &EncodedMedia, path: &Path) -> Result<ContentPart> {
        match media.kind {
            MediaKind::Image => Ok(ContentPart::Image {
                source: ImageSource {
                    source_type: "base64".to_string(),
                    media_type: media.mime_type(),
                    data: media.data.clone(),
                },
            }),
            MediaKind::Audio => Err(MediaError::Unsupported {
                path: path.to_path_buf(),
                format: format!(".{}", media.format),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn media(kind: MediaKind, format: &str) -> EncodedMedia {
        EncodedMedia {
            kind,
            format: format.to_string(),
            data: "QUJD".to_string(),
        }
    }

    #[test]
    fn openai_images_become_data_urls() {
        let part = OpenAiShape
            .media_part(&media(MediaKind::Image, "jpg"), Path::new("a.jpg"))
            .unwrap();

        assert_eq!(
            part,
            ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: "data:image/jpeg;base64,QUJD".to_string()
                }
            }
        );
    }

    #[test]
    fn openai_audio_keeps_its_format() {
        let part = OpenAiShape
            .media_part(&media(MediaKind::Audio, "wav"), Path::new("a.wav"))
            .unwrap();

        assert!(matches!(
            part,
            ContentPart::InputAudio { input_audio } if input_audio.format == "wav"
        ));
    }

    #[test]
    fn anthropic_images_use_base64_sources() {
        let part = AnthropicShape
            .media_part(&media(MediaKind::Image, "png"), Path::new("a.png"))
            .unwrap();

        match part {
            ContentPart::Image { source } => {
                assert_eq!(source.source_type, "base64");
                assert_eq!(source.media_type, "image/png");
            }
            other => panic!("unexpected part: {other:?}"),
        }
    }

    #[test]
    fn anthropic_rejects_audio() {
        let err = AnthropicShape
            .media_part(&media(MediaKind::Audio, "mp3"), Path::new("talk.mp3"))
            .unwrap_err();

        assert!(matches!(err, MediaError::Unsupported { format, .. } if format == ".mp3"));
    }
}
