//! エラー型定義
//!
//! アプリケーション全体で使用するエラー型を定義します。

use crate::blit::BlitError;
use crate::config::ConfigError;
use crate::display::FramebufferError;
use crate::image::DecodeError;
use thiserror::Error;

/// アプリケーションエラー
///
/// いずれのエラーも致命的で、リトライは行いません。発生時には取得済みの
/// リソースを解放したうえでプロセスを終了コード1で終了します。
#[derive(Error, Debug)]
pub enum AppError {
    /// 画像デコードエラー
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// フレームバッファエラー
    #[error(transparent)]
    Framebuffer(#[from] FramebufferError),

    /// 転送エラー
    #[error(transparent)]
    Blit(#[from] BlitError),

    /// 設定エラー
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl AppError {
    /// プロセス終了コードを取得
    pub fn exit_code(&self) -> i32 {
        1
    }
}
