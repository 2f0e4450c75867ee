//! Builds structured user messages from text plus image/audio attachments.
//!
//! Attachments are classified against a [`ProviderProfile`], transcoded by a
//! [`MediaConverter`] when the provider does not accept their native format,
//! and rendered into message parts by a [`PayloadShape`].

pub mod converter;
pub mod encoder;
pub mod error;
pub mod profile;
pub mod shape;

pub use converter::{FfmpegConverter, MediaConverter};
pub use encoder::MessageEncoder;
pub use error::{MediaError, Result};
pub use profile::{convertible_kind, extension_of, MediaKind, ProviderProfile};
pub use shape::{AnthropicShape, EncodedMedia, OpenAiShape, PayloadShape};
