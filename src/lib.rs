//! フレームバッファビューアライブラリ
//!
//! このクレートは、プレーンテキスト形式のPPM画像をデコードし、
//! Linuxフレームバッファデバイスへ転送する機能を提供します。

pub mod app;
pub mod blit;
pub mod config;
pub mod display;
pub mod error;
pub mod image;

// 主要コンポーネントを再エクスポート
pub use blit::{blit, BlitError, BlitStats};
pub use config::ViewerSettings;
pub use display::{DisplayGeometry, DisplaySurface, FramebufferSurface, MemorySurface, SurfaceError};
pub use error::AppError;
pub use image::{DecodedImage, Pixel, PpmDecoder, PpmHeader};

/// ライブラリのバージョン
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
