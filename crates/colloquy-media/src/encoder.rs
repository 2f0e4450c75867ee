use std::path::{Path, PathBuf};

use base64::{engine::general_purpose, Engine as _};
use colloquy_core::{ContentPart, Message};

use crate::converter::{FfmpegConverter, MediaConverter};
use crate::error::{MediaError, Result};
use crate::profile::{convertible_kind, extension_of, MediaKind, ProviderProfile};
use crate::shape::{EncodedMedia, OpenAiShape, PayloadShape};

/// Assembles multimodal user messages for one provider convention.
pub struct MessageEncoder {
    profile: ProviderProfile,
    shape: Box<dyn PayloadShape>,
    converter: Box<dyn MediaConverter>,
    destination: Option<PathBuf>,
}

impl MessageEncoder {
    /// OpenAI-shaped payloads, converting through `ffmpeg` on the `PATH`.
    pub fn new(profile: ProviderProfile) -> Self {
        Self {
            profile,
            shape: Box::new(OpenAiShape),
            converter: Box::new(FfmpegConverter::default()),
            destination: None,
        }
    }

    pub fn with_shape(mut self, shape: impl PayloadShape + 'static) -> Self {
        self.shape = Box::new(shape);
        self
    }

    pub fn with_converter(mut self, converter: impl MediaConverter + 'static) -> Self {
        self.converter = Box::new(converter);
        self
    }

    /// Directory converted files are written to instead of next to the
    /// source. Must exist when a conversion happens.
    pub fn with_destination(mut self, destination: impl Into<PathBuf>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    pub fn profile(&self) -> &ProviderProfile {
        &self.profile
    }

    /// One user message with `text` first and one part per attachment, in
    /// order. Any attachment that cannot be encoded fails the whole build.
    pub fn build_user_message<P>(&self, text: &str, attachments: &[P]) -> Result<Message>
    where
        P: AsRef<Path>,
    {
        let mut parts = Vec::with_capacity(attachments.len() + 1);
        parts.push(ContentPart::text(text));
        for attachment in attachments {
            parts.push(self.encode_attachment(attachment.as_ref())?);
        }
        log::debug!(
            "Built user message with {} attachment(s) for profile {}",
            attachments.len(),
            self.profile.name()
        );
        Ok(Message::user_parts(parts))
    }

    fn encode_attachment(&self, path: &Path) -> Result<ContentPart> {
        let (kind, file) = self.accepted_file(path)?;
        let bytes = std::fs::read(&file).map_err(|source| MediaError::Io {
            path: file.clone(),
            source,
        })?;

        let media = EncodedMedia {
            kind,
            format: extension_of(&file).trim_start_matches('.').to_string(),
            data: general_purpose::STANDARD.encode(bytes),
        };
        self.shape.media_part(&media, path)
    }

    /// The file to encode for `path`: itself when the profile takes it,
    /// otherwise a converted copy in the canonical format of its kind.
    fn accepted_file(&self, path: &Path) -> Result<(MediaKind, PathBuf)> {
        let extension = extension_of(path);
        if let Some(kind) = self.profile.accepts(&extension) {
            return Ok((kind, path.to_path_buf()));
        }

        let unsupported = || MediaError::Unsupported {
            path: path.to_path_buf(),
            format: extension.clone(),
        };
        let kind = convertible_kind(&extension).ok_or_else(unsupported)?;
        let target = kind.canonical_extension();
        if extension == target {
            return Err(unsupported());
        }

        log::info!(
            "{} is not accepted by {}, converting to {}",
            path.display(),
            self.profile.name(),
            target
        );
        let converted = self
            .converter
            .convert(path, target, self.destination.as_deref())?;

        match self.profile.accepts(&extension_of(&converted)) {
            Some(converted_kind) if converted_kind == kind => Ok((kind, converted)),
            _ => Err(unsupported()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::target_path;
    use crate::shape::AnthropicShape;
    use colloquy_core::{MessageContent, Role};
    use std::sync::{Arc, Mutex};

    /// Writes a placeholder file instead of running a real transcoder.
    #[derive(Clone, Default)]
    struct FakeConverter {
        calls: Arc<Mutex<Vec<(PathBuf, String)>>>,
        fail: bool,
    }

    impl MediaConverter for FakeConverter {
        fn convert(
            &self,
            source: &Path,
            target_extension: &str,
            destination: Option<&Path>,
        ) -> Result<PathBuf> {
            self.calls
                .lock()
                .unwrap()
                .push((source.to_path_buf(), target_extension.to_string()));
            if self.fail {
                return Err(MediaError::Transcode {
                    path: source.to_path_buf(),
                    source_format: extension_of(source),
                    target_format: target_extension.to_string(),
                    reason: "exit status 1".to_string(),
                });
            }
            let target = target_path(source, target_extension, destination)?;
            std::fs::write(&target, b"converted").unwrap();
            Ok(target)
        }
    }

    fn parts(message: &Message) -> &[ContentPart] {
        match message.content.as_ref() {
            Some(MessageContent::Parts(parts)) => parts,
            other => panic!("expected structured content, got {other:?}"),
        }
    }

    #[test]
    fn text_only_message_has_a_single_part() {
        let encoder = MessageEncoder::new(ProviderProfile::chatgpt());

        let message = encoder.build_user_message::<&Path>("hello", &[]).unwrap();

        assert_eq!(message.role, Role::User);
        assert_eq!(parts(&message), &[ContentPart::text("hello")]);
    }

    #[test]
    fn attachments_follow_the_text_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("cat.PNG");
        let audio = dir.path().join("hello.mp3");
        std::fs::write(&image, b"ABC").unwrap();
        std::fs::write(&audio, b"xyz").unwrap();
        let converter = FakeConverter::default();
        let encoder =
            MessageEncoder::new(ProviderProfile::chatgpt()).with_converter(converter.clone());

        let message = encoder
            .build_user_message("describe", &[&image, &audio])
            .unwrap();

        let parts = parts(&message);
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], ContentPart::text("describe"));
        assert!(matches!(
            &parts[1],
            ContentPart::ImageUrl { image_url } if image_url.url == "data:image/png;base64,QUJD"
        ));
        assert!(matches!(
            &parts[2],
            ContentPart::InputAudio { input_audio }
                if input_audio.format == "mp3" && input_audio.data == "eHl6"
        ));
        assert!(converter.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn unaccepted_image_is_converted_to_png() {
        let dir = tempfile::tempdir().unwrap();
        let scan = dir.path().join("scan.bmp");
        std::fs::write(&scan, b"BM").unwrap();
        let converter = FakeConverter::default();
        let encoder =
            MessageEncoder::new(ProviderProfile::chatgpt()).with_converter(converter.clone());

        let message = encoder.build_user_message("what is this", &[&scan]).unwrap();

        assert_eq!(
            converter.calls.lock().unwrap().as_slice(),
            &[(scan.clone(), ".png".to_string())]
        );
        assert!(matches!(
            &parts(&message)[1],
            ContentPart::ImageUrl { image_url } if image_url.url.starts_with("data:image/png;base64,")
        ));
    }

    #[test]
    fn failed_conversion_fails_the_build_naming_both_formats() {
        let dir = tempfile::tempdir().unwrap();
        let scan = dir.path().join("scan.bmp");
        std::fs::write(&scan, b"BM").unwrap();
        let converter = FakeConverter {
            fail: true,
            ..FakeConverter::default()
        };
        let encoder =
            MessageEncoder::new(ProviderProfile::chatgpt()).with_converter(converter.clone());

        let err = encoder
            .build_user_message("what is this", &[&scan])
            .unwrap_err();

        let rendered = err.to_string();
        assert!(rendered.contains(".bmp"), "{rendered}");
        assert!(rendered.contains(".png"), "{rendered}");
        assert_eq!(converter.calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn unknown_format_is_rejected_without_conversion() {
        let dir = tempfile::tempdir().unwrap();
        let doc = dir.path().join("notes.pdf");
        std::fs::write(&doc, b"%PDF").unwrap();
        let converter = FakeConverter::default();
        let encoder =
            MessageEncoder::new(ProviderProfile::chatgpt()).with_converter(converter.clone());

        let err = encoder.build_user_message("read", &[&doc]).unwrap_err();

        assert!(matches!(err, MediaError::Unsupported { ref format, .. } if format == ".pdf"));
        assert!(converter.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn converted_files_land_in_the_destination() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let clip = src.path().join("clip.m4a");
        std::fs::write(&clip, b"m4a").unwrap();
        let encoder = MessageEncoder::new(ProviderProfile::chatgpt())
            .with_converter(FakeConverter::default())
            .with_destination(out.path());

        encoder.build_user_message("listen", &[&clip]).unwrap();

        assert!(out.path().join("clip.wav").exists());
        assert!(!src.path().join("clip.wav").exists());
    }

    #[test]
    fn anthropic_shape_rejects_audio_attachments() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("hello.wav");
        std::fs::write(&audio, b"RIFF").unwrap();
        let encoder = MessageEncoder::new(ProviderProfile::chatgpt()).with_shape(AnthropicShape);

        let err = encoder.build_user_message("listen", &[&audio]).unwrap_err();

        assert!(matches!(err, MediaError::Unsupported { .. }));
    }

    #[test]
    fn missing_attachment_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let encoder = MessageEncoder::new(ProviderProfile::chatgpt());

        let err = encoder
            .build_user_message("look", &[dir.path().join("gone.png")])
            .unwrap_err();

        assert!(matches!(err, MediaError::Io { .. }));
    }
}
