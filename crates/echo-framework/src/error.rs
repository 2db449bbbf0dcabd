use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by [`EchoGame`](crate::EchoGame) construction and lifecycle.
#[derive(Debug, Error)]
pub enum HostError {
    /// A game instance already exists for this slot (normally the process).
    #[error("only one EchoGame instance can be created")]
    AlreadyInitialized,

    #[error("invalid game configuration: {0}")]
    InvalidConfig(String),

    /// The engine tried to run the initialize phase a second time.
    #[error("EchoGame::initialize was already called")]
    InitializedTwice,

    #[error(transparent)]
    Engine(anyhow::Error),
}

/// Errors raised while loading assets through a [`ContentManager`](crate::ContentManager).
#[derive(Debug, Error)]
pub enum ContentError {
    /// Empty, absolute, or escaping the content root.
    #[error("invalid asset name {0:?}")]
    InvalidName(String),

    #[error("failed to read asset {name:?} from {}", .path.display())]
    Io {
        name: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("asset {name:?} is not valid UTF-8")]
    Utf8 {
        name: String,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("failed to decode image {name:?}")]
    Image {
        name: String,
        #[source]
        source: image::ImageError,
    },
}

/// Misuse of the begin/draw/end protocol of a [`SpriteBatch`](crate::SpriteBatch).
#[derive(Debug, Clone, Copy, Eq, PartialEq, Error)]
pub enum SpriteBatchError {
    #[error("begin called twice without a matching end")]
    BeginCalledTwice,

    #[error("begin must be called before draw or end")]
    NotBegun,
}
