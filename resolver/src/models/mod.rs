//! 数据模型

mod embed;
mod preferences;
mod stream;

pub use embed::EmbedReference;
pub use preferences::{
    PREF_LANGUAGE_KEY, PREF_QUALITY_KEY, PREF_SERVER_KEY, PreferenceDefaults, PreferenceStore,
    Preferences, Quality,
};
pub use stream::{Language, StreamCandidate};
