//! 転送モジュール
//!
//! デコード済み画像をディスプレイサーフェスへ転送します。RGBの並びを
//! 転送先のピクセルレイアウトへ変換し、転送領域を転送元・転送先の
//! 小さい方にクリップします。

use crate::display::{DisplaySurface, SurfaceError};
use crate::image::DecodedImage;
use log::debug;
use thiserror::Error;

/// 転送エラー
#[derive(Error, Debug)]
pub enum BlitError {
    /// サポートされていないビット深度
    #[error("サポートされていないピクセル形式です（{0} bpp）")]
    UnsupportedFormat(u32),

    /// サーフェスへの書き込み失敗
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

/// 転送結果の統計
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlitStats {
    /// 転送した幅（ピクセル）
    pub width: u32,
    /// 転送した高さ（ピクセル）
    pub height: u32,
    /// 書き込んだバイト数
    pub bytes_written: usize,
}

/// 画像をサーフェスへ転送
///
/// 転送先ピクセルのバイト並びは 32bpp で `[青, 緑, 赤, 0]`、24bpp で
/// `[青, 緑, 赤]` です。それ以外のビット深度では何も書き込まずに
/// `UnsupportedFormat` を返します。転送元の余剰は切り捨てられ、転送先の
/// 余剰領域（ストライドのパディングを含む）には触れません。転送は
/// 行優先（最上段の行から、各行は左から右へ）で行われます。
pub fn blit<S>(image: &DecodedImage, surface: &mut S) -> Result<BlitStats, BlitError>
where
    S: DisplaySurface + ?Sized,
{
    let geometry = surface.geometry().clone();

    // ビット深度はサーフェス取得時には検証されないため、ここで検証する。
    // 書き込み開始前に拒否するので、非対応デバイスには1バイトも書かない。
    let bytes_per_pixel = match geometry.bits_per_pixel {
        32 => 4,
        24 => 3,
        other => return Err(BlitError::UnsupportedFormat(other)),
    };

    // 転送領域を可視解像度と画像サイズの共通部分にクリップする
    let max_x = image.width().min(geometry.xres);
    let max_y = image.height().min(geometry.yres);
    let stride = geometry.line_length as usize;
    debug!(
        "転送領域を {} x {} にクリップしました（画像 {} x {}、可視 {} x {}）",
        max_x,
        max_y,
        image.width(),
        image.height(),
        geometry.xres,
        geometry.yres
    );

    let mut bytes_written = 0usize;
    for y in 0..max_y {
        for x in 0..max_x {
            let offset = (y as usize) * stride + (x as usize) * bytes_per_pixel;
            let pixel = image.pixel(x, y);
            let bgr0 = [pixel.b, pixel.g, pixel.r, 0];
            surface.write_region(offset, &bgr0[..bytes_per_pixel])?;
            bytes_written += bytes_per_pixel;
        }
    }

    Ok(BlitStats {
        width: max_x,
        height: max_y,
        bytes_written,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{DisplayGeometry, MemorySurface};
    use crate::image::Pixel;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    // テスト用のジオメトリを作成
    fn geometry(xres: u32, yres: u32, bits_per_pixel: u32, line_length: u32) -> DisplayGeometry {
        DisplayGeometry {
            xres,
            yres,
            xres_virtual: xres,
            yres_virtual: yres,
            bits_per_pixel,
            line_length,
        }
    }

    // 単色のテスト画像を作成
    fn solid_image(width: u32, height: u32, pixel: Pixel) -> DecodedImage {
        let pixels = vec![pixel; (width * height) as usize];
        DecodedImage::from_pixels(width, height, pixels).unwrap()
    }

    #[test]
    fn test_32bpp_byte_order() {
        // 赤・緑の2ピクセルをストライド16のサーフェスへ転送する
        let mut surface = MemorySurface::new(geometry(2, 1, 32, 16));
        surface.fill(0xaa);
        let image = DecodedImage::from_pixels(
            2,
            1,
            vec![Pixel::new(255, 0, 0), Pixel::new(0, 255, 0)],
        )
        .unwrap();

        let stats = blit(&image, &mut surface).unwrap();

        assert_eq!(stats.width, 2);
        assert_eq!(stats.height, 1);
        assert_eq!(stats.bytes_written, 8);
        assert_eq!(&surface.buffer()[0..8], &[0, 0, 255, 0, 0, 255, 0, 0]);
        // ストライドのパディングには触れない
        assert!(surface.buffer()[8..16].iter().all(|&b| b == 0xaa));
    }

    #[test]
    fn test_24bpp_byte_order() {
        let mut surface = MemorySurface::new(geometry(2, 1, 24, 8));
        let image =
            DecodedImage::from_pixels(2, 1, vec![Pixel::new(1, 2, 3), Pixel::new(4, 5, 6)])
                .unwrap();

        blit(&image, &mut surface).unwrap();

        assert_eq!(&surface.buffer()[0..6], &[3, 2, 1, 6, 5, 4]);
        assert_eq!(&surface.buffer()[6..8], &[0, 0]);
    }

    #[test]
    fn test_clips_oversized_source() {
        // 10 x 10 の画像を 5 x 20 のサーフェスへ → 左上 5 x 10 のみ書き込まれる
        let mut surface = MemorySurface::new(geometry(5, 20, 32, 20));
        surface.fill(0xaa);
        let image = solid_image(10, 10, Pixel::new(10, 20, 30));

        let stats = blit(&image, &mut surface).unwrap();

        assert_eq!(stats.width, 5);
        assert_eq!(stats.height, 10);
        for y in 0..20usize {
            for x in 0..5usize {
                let offset = y * 20 + x * 4;
                let expected: [u8; 4] = if y < 10 { [30, 20, 10, 0] } else { [0xaa; 4] };
                assert_eq!(&surface.buffer()[offset..offset + 4], &expected);
            }
        }
    }

    #[test]
    fn test_leaves_area_outside_small_source() {
        // 5 x 5 の画像を 20 x 20 のサーフェスへ → 左上 5 x 5 のみ書き込まれる
        let mut surface = MemorySurface::new(geometry(20, 20, 32, 80));
        surface.fill(0xaa);
        let image = solid_image(5, 5, Pixel::new(1, 2, 3));

        let stats = blit(&image, &mut surface).unwrap();

        assert_eq!(stats.width, 5);
        assert_eq!(stats.height, 5);
        for y in 0..20usize {
            for x in 0..20usize {
                let offset = y * 80 + x * 4;
                let expected: [u8; 4] = if x < 5 && y < 5 {
                    [3, 2, 1, 0]
                } else {
                    [0xaa; 4]
                };
                assert_eq!(&surface.buffer()[offset..offset + 4], &expected);
            }
        }
    }

    #[test]
    fn test_unsupported_depth_writes_nothing() {
        let mut surface = MemorySurface::new(geometry(4, 4, 16, 8));
        surface.fill(0xaa);
        let image = solid_image(4, 4, Pixel::new(9, 9, 9));

        let result = blit(&image, &mut surface);

        assert!(matches!(result, Err(BlitError::UnsupportedFormat(16))));
        assert!(surface.buffer().iter().all(|&b| b == 0xaa));
    }

    #[test]
    fn test_out_of_bounds_write_is_rejected() {
        // 仮想解像度が可視解像度より小さい異常なジオメトリでは、
        // マッピング範囲を超える前に書き込みが拒否される
        let geometry = DisplayGeometry {
            xres: 2,
            yres: 2,
            xres_virtual: 2,
            yres_virtual: 1,
            bits_per_pixel: 32,
            line_length: 8,
        };
        let mut surface = MemorySurface::new(geometry);
        let image = solid_image(2, 2, Pixel::new(1, 1, 1));

        assert!(matches!(
            blit(&image, &mut surface),
            Err(BlitError::Surface(_))
        ));
    }

    /// 解放回数を数えるテスト用サーフェス
    struct CountingSurface {
        inner: MemorySurface,
        releases: Arc<AtomicUsize>,
    }

    impl CountingSurface {
        fn new(inner: MemorySurface, releases: Arc<AtomicUsize>) -> Self {
            Self { inner, releases }
        }
    }

    impl DisplaySurface for CountingSurface {
        fn geometry(&self) -> &DisplayGeometry {
            self.inner.geometry()
        }

        fn write_region(&mut self, offset: usize, bytes: &[u8]) -> Result<(), SurfaceError> {
            self.inner.write_region(offset, bytes)
        }
    }

    impl Drop for CountingSurface {
        fn drop(&mut self) {
            self.releases.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_surface_released_once_after_success() {
        let releases = Arc::new(AtomicUsize::new(0));
        {
            let mut surface =
                CountingSurface::new(MemorySurface::new(geometry(2, 2, 32, 8)), releases.clone());
            let image = solid_image(2, 2, Pixel::new(1, 2, 3));
            blit(&image, &mut surface).unwrap();
        }
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_surface_released_once_after_failure() {
        let releases = Arc::new(AtomicUsize::new(0));
        {
            let mut surface =
                CountingSurface::new(MemorySurface::new(geometry(2, 2, 16, 8)), releases.clone());
            let image = solid_image(2, 2, Pixel::new(1, 2, 3));
            assert!(blit(&image, &mut surface).is_err());
        }
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }
}
