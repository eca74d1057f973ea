//! アプリケーション
//!
//! デコード・サーフェス取得・転送のパイプラインを順に実行します。

use crate::blit::blit;
use crate::config::ViewerSettings;
use crate::display::{DisplaySurface, FramebufferSurface};
use crate::error::AppError;
use crate::image::PpmDecoder;
use log::{debug, info};

/// アプリケーション
pub struct App {
    /// ビューア設定
    settings: ViewerSettings,
}

impl App {
    /// 新しいアプリケーションを作成
    pub fn new(settings: ViewerSettings) -> Self {
        Self { settings }
    }

    /// パイプラインを実行
    ///
    /// 画像のデコードを完了させてから表示サーフェスを取得し、転送後に
    /// スコープ終了でリソースを解放します。
    pub fn run(&self) -> Result<(), AppError> {
        // 画像を最後までデコードする
        info!(
            "画像をデコードします: {}",
            self.settings.image.path.display()
        );
        let decoder = PpmDecoder::from_path(&self.settings.image.path)?;
        let (header, image) = decoder.decode()?;

        // デコード結果のヘッダ情報を標準出力へ表示
        println!("フォーマット: {}", header.format);
        println!("幅: {}", header.width);
        println!("高さ: {}", header.height);
        println!("最大値: {}", header.max_value);

        // 表示サーフェスを取得
        info!(
            "フレームバッファを開きます: {}",
            self.settings.display.device.display()
        );
        let mut surface = FramebufferSurface::open(&self.settings.display.device)?;
        {
            let geometry = surface.geometry();
            debug!(
                "解像度 {} x {}（仮想 {} x {}）、{} bpp、ストライド {} バイト",
                geometry.xres,
                geometry.yres,
                geometry.xres_virtual,
                geometry.yres_virtual,
                geometry.bits_per_pixel,
                geometry.line_length
            );
        }

        // 画像をサーフェスへ転送
        let stats = blit(&image, &mut surface)?;
        info!(
            "{} x {} ピクセル（{} バイト）を転送しました",
            stats.width, stats.height, stats.bytes_written
        );

        // surface はここで解放される（マッピング解除 → デバイスクローズ）
        Ok(())
    }
}
