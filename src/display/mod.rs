//! ディスプレイサーフェスモジュール
//!
//! 表示デバイスのジオメトリ情報と、書き込み可能なサーフェスの
//! 抽象化を提供します。

pub mod framebuffer;
pub mod memory;

pub use framebuffer::{FramebufferError, FramebufferSurface};
pub use memory::MemorySurface;

use thiserror::Error;

/// サーフェスエラー
#[derive(Error, Debug)]
pub enum SurfaceError {
    /// 書き込み範囲がサーフェスの外
    #[error("書き込み範囲がサーフェス外です（オフセット {offset} + 長さ {len} > サイズ {size}）")]
    OutOfBounds {
        offset: usize,
        len: usize,
        size: usize,
    },
}

/// ディスプレイジオメトリ
///
/// サーフェス取得時に一度だけ取得されるスナップショットです。
/// 転送中に更新されることはありません。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayGeometry {
    /// 可視領域の水平解像度
    pub xres: u32,
    /// 可視領域の垂直解像度
    pub yres: u32,
    /// 仮想領域の水平解像度
    pub xres_virtual: u32,
    /// 仮想領域の垂直解像度
    pub yres_virtual: u32,
    /// 1ピクセルあたりのビット数
    pub bits_per_pixel: u32,
    /// 1スキャンラインあたりのバイト数（ストライド）
    pub line_length: u32,
}

impl DisplayGeometry {
    /// 1ピクセルあたりのバイト数を取得
    pub fn bytes_per_pixel(&self) -> usize {
        (self.bits_per_pixel / 8) as usize
    }

    /// サーフェス全体のバイト数を取得
    pub fn screen_size(&self) -> usize {
        (self.yres_virtual as usize) * (self.line_length as usize)
    }
}

/// 書き込み可能なディスプレイサーフェス
///
/// 実デバイスの代わりにメモリ上の実装を注入できるようにするための
/// 抽象化です。書き込みは必ず `[0, screen_size)` の範囲内に収まります。
pub trait DisplaySurface {
    /// ジオメトリのスナップショットを取得
    fn geometry(&self) -> &DisplayGeometry;

    /// 指定オフセットへバイト列を書き込む
    ///
    /// 範囲がサーフェスの末尾を超える場合は `SurfaceError::OutOfBounds` を
    /// 返し、何も書き込みません。
    fn write_region(&mut self, offset: usize, bytes: &[u8]) -> Result<(), SurfaceError>;
}

/// 範囲検証つきでバイト列を書き込む
pub(crate) fn write_checked(
    target: &mut [u8],
    offset: usize,
    bytes: &[u8],
) -> Result<(), SurfaceError> {
    let size = target.len();
    let end = offset
        .checked_add(bytes.len())
        .filter(|&end| end <= size)
        .ok_or(SurfaceError::OutOfBounds {
            offset,
            len: bytes.len(),
            size,
        })?;
    target[offset..end].copy_from_slice(bytes);
    Ok(())
}
