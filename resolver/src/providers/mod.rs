//! 内置视频源

pub mod amazon;
pub mod fireload;
pub mod hosts;
pub mod page;
pub mod universal;

pub use amazon::Amazon;
pub use fireload::FireLoad;
pub use hosts::{
    BurstCloud, DoodStream, Fastream, FileLions, Filemoon, MixDrop, Mp4Upload, Okru, StreamHideVid,
    StreamTape, StreamWish, Streamlare, Upstream, Uqload, VidHide, Voe, YourUpload,
};
pub use universal::Universal;
