use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Audio,
}

impl MediaKind {
    /// Format every convertible file of this kind is transcoded to.
    pub fn canonical_extension(self) -> &'static str {
        match self {
            Self::Image => ".png",
            Self::Audio => ".wav",
        }
    }
}

const CONVERTIBLE_IMAGE: &[&str] = &[
    ".bmp", ".tiff", ".tif", ".avif", ".ico", ".heic", ".heif", ".png", ".jpg", ".jpeg", ".webp",
    ".gif",
];
const CONVERTIBLE_AUDIO: &[&str] = &[
    ".aiff", ".aac", ".ogg", ".flac", ".m4a", ".opus", ".wma", ".wav", ".mp3",
];

/// Lowercase, dot-prefixed extension of `path`, or an empty string.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}

/// Media kind an extension can be transcoded from, regardless of profile.
pub fn convertible_kind(extension: &str) -> Option<MediaKind> {
    if CONVERTIBLE_IMAGE.contains(&extension) {
        Some(MediaKind::Image)
    } else if CONVERTIBLE_AUDIO.contains(&extension) {
        Some(MediaKind::Audio)
    } else {
        None
    }
}

/// Extensions a provider accepts natively, per media kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    name: String,
    image: Vec<String>,
    audio: Vec<String>,
}

fn normalize<I, S>(extensions: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    extensions
        .into_iter()
        .map(|ext| {
            let ext = ext.as_ref().trim().to_lowercase();
            if ext.starts_with('.') {
                ext
            } else {
                format!(".{}", ext)
            }
        })
        .collect()
}

impl ProviderProfile {
    pub fn new<I, J, S, T>(name: impl Into<String>, image: I, audio: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Self {
            name: name.into(),
            image: normalize(image),
            audio: normalize(audio),
        }
    }

    pub fn chatgpt() -> Self {
        Self::new(
            "chatgpt",
            [".png", ".jpeg", ".jpg", ".webp", ".gif"],
            [".wav", ".mp3"],
        )
    }

    pub fn gemini() -> Self {
        Self::new(
            "gemini",
            [".png", ".jpeg", ".jpg", ".webp", ".heic", ".heif"],
            [".wav", ".mp3", ".aiff", ".aac", ".ogg", ".flac"],
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn accepts(&self, extension: &str) -> Option<MediaKind> {
        if self.image.iter().any(|ext| ext == extension) {
            Some(MediaKind::Image)
        } else if self.audio.iter().any(|ext| ext == extension) {
            Some(MediaKind::Audio)
        } else {
            None
        }
    }

    /// `None` means the provider does not take this file as-is.
    pub fn classify(&self, path: &Path) -> Option<MediaKind> {
        self.accepts(&extension_of(path))
    }
}

impl Default for ProviderProfile {
    fn default() -> Self {
        Self::chatgpt()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown provider profile '{0}' (expected chatgpt or gemini)")]
pub struct UnknownProfile(pub String);

impl FromStr for ProviderProfile {
    type Err = UnknownProfile;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chatgpt" | "openai" => Ok(Self::chatgpt()),
            "gemini" => Ok(Self::gemini()),
            _ => Err(UnknownProfile(s.to_string())),
        }
    }
}
