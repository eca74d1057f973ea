//! メモリサーフェス
//!
//! 実デバイスと同じ書き込みセマンティクスを持つメモリ上のサーフェスを
//! 提供します。テストの代替デバイスやオフスクリーン描画の対象として
//! 使用します。

use super::{DisplayGeometry, DisplaySurface, SurfaceError};

/// メモリ上のディスプレイサーフェス
#[derive(Debug, Clone)]
pub struct MemorySurface {
    /// ジオメトリのスナップショット
    geometry: DisplayGeometry,
    /// サーフェス本体（screen_size バイト、ゼロ初期化）
    buffer: Vec<u8>,
}

impl MemorySurface {
    /// 指定ジオメトリのサーフェスを作成
    pub fn new(geometry: DisplayGeometry) -> Self {
        let buffer = vec![0u8; geometry.screen_size()];
        Self { geometry, buffer }
    }

    /// サーフェス全体を指定値で塗りつぶす
    pub fn fill(&mut self, value: u8) {
        self.buffer.fill(value);
    }

    /// サーフェスの内容を取得
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }
}

impl DisplaySurface for MemorySurface {
    fn geometry(&self) -> &DisplayGeometry {
        &self.geometry
    }

    fn write_region(&mut self, offset: usize, bytes: &[u8]) -> Result<(), SurfaceError> {
        super::write_checked(&mut self.buffer, offset, bytes)
    }
}
