//! フレームバッファデバイス
//!
//! Linuxフレームバッファデバイス（/dev/fb0 など）を開き、ジオメトリを
//! 取得して共有メモリマッピングとして公開します。

use super::{DisplayGeometry, DisplaySurface, SurfaceError};
use memmap2::{MmapMut, MmapOptions};
use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// フレームバッファエラー
#[derive(Error, Debug)]
pub enum FramebufferError {
    /// デバイスが開けない
    #[error("フレームバッファデバイス {} を開けません: {}", .path.display(), .source)]
    DeviceUnavailable {
        path: PathBuf,
        source: io::Error,
    },

    /// ジオメトリ取得の失敗
    #[error("{which}画面情報の取得に失敗しました: {source}")]
    DeviceQuery {
        which: &'static str,
        source: io::Error,
    },

    /// メモリマッピングの失敗
    #[error("フレームバッファのメモリマッピングに失敗しました: {source}")]
    Mapping {
        source: io::Error,
    },
}

// linux/fb.h の ioctl 番号
const FBIOGET_VSCREENINFO: libc::c_ulong = 0x4600;
const FBIOGET_FSCREENINFO: libc::c_ulong = 0x4602;

/// カラーチャネルのビット配置（linux/fb.h の fb_bitfield）
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
struct FbBitfield {
    offset: u32,
    length: u32,
    msb_right: u32,
}

/// 可変画面情報（linux/fb.h の fb_var_screeninfo）
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
struct FbVarScreeninfo {
    xres: u32,
    yres: u32,
    xres_virtual: u32,
    yres_virtual: u32,
    xoffset: u32,
    yoffset: u32,
    bits_per_pixel: u32,
    grayscale: u32,
    red: FbBitfield,
    green: FbBitfield,
    blue: FbBitfield,
    transp: FbBitfield,
    nonstd: u32,
    activate: u32,
    height: u32,
    width: u32,
    accel_flags: u32,
    pixclock: u32,
    left_margin: u32,
    right_margin: u32,
    upper_margin: u32,
    lower_margin: u32,
    hsync_len: u32,
    vsync_len: u32,
    sync: u32,
    vmode: u32,
    rotate: u32,
    colorspace: u32,
    reserved: [u32; 4],
}

/// 固定画面情報（linux/fb.h の fb_fix_screeninfo）
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
struct FbFixScreeninfo {
    id: [u8; 16],
    smem_start: libc::c_ulong,
    smem_len: u32,
    type_: u32,
    type_aux: u32,
    visual: u32,
    xpanstep: u16,
    ypanstep: u16,
    ywrapstep: u16,
    line_length: u32,
    mmio_start: libc::c_ulong,
    mmio_len: u32,
    accel: u32,
    capabilities: u16,
    reserved: [u16; 2],
}

/// フレームバッファサーフェス
///
/// デバイスのオープンからマッピング解放までを所有します。解放は
/// Drop で一度だけ行われ、マッピングはデバイスハンドルより先に
/// 解放されます（フィールド宣言順）。
#[derive(Debug)]
pub struct FramebufferSurface {
    /// 共有メモリマッピング（_file より先に宣言し、先に解放される）
    mmap: MmapMut,
    /// デバイスハンドル（マッピング解放後にクローズされる）
    _file: File,
    /// ジオメトリのスナップショット
    geometry: DisplayGeometry,
}

impl FramebufferSurface {
    /// フレームバッファデバイスを開く
    ///
    /// デバイスを読み書きで開き、固定・可変画面情報を取得してから
    /// `yres_virtual * line_length` バイトを共有マッピングします。
    /// ビット深度はここでは検証されず、転送時に検証されます。
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FramebufferError> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| FramebufferError::DeviceUnavailable {
                path: path.to_path_buf(),
                source: e,
            })?;

        // 固定画面情報（ストライドなど）を取得
        let mut finfo = FbFixScreeninfo::default();
        // SAFETY: FBIOGET_FSCREENINFO は渡した構造体への書き込みのみを行う
        let ret = unsafe { libc::ioctl(file.as_raw_fd(), FBIOGET_FSCREENINFO, &mut finfo) };
        if ret == -1 {
            return Err(FramebufferError::DeviceQuery {
                which: "固定",
                source: io::Error::last_os_error(),
            });
        }

        // 可変画面情報（解像度・ビット深度など）を取得
        let mut vinfo = FbVarScreeninfo::default();
        // SAFETY: FBIOGET_VSCREENINFO は渡した構造体への書き込みのみを行う
        let ret = unsafe { libc::ioctl(file.as_raw_fd(), FBIOGET_VSCREENINFO, &mut vinfo) };
        if ret == -1 {
            return Err(FramebufferError::DeviceQuery {
                which: "可変",
                source: io::Error::last_os_error(),
            });
        }

        let geometry = DisplayGeometry {
            xres: vinfo.xres,
            yres: vinfo.yres,
            xres_virtual: vinfo.xres_virtual,
            yres_virtual: vinfo.yres_virtual,
            bits_per_pixel: vinfo.bits_per_pixel,
            line_length: finfo.line_length,
        };

        // 仮想解像度ぶんの画面メモリを共有マッピングする
        let screen_size = geometry.screen_size();
        // SAFETY: マッピングはデバイスドライバと共有され、このプロセスが
        // 唯一の書き込み手である前提で使用する
        let mmap = unsafe { MmapOptions::new().len(screen_size).map_mut(&file) }
            .map_err(|e| FramebufferError::Mapping { source: e })?;

        log::debug!(
            "フレームバッファをマッピングしました: {} バイト（仮想 {} x {}、ストライド {}）",
            screen_size,
            geometry.xres_virtual,
            geometry.yres_virtual,
            geometry.line_length
        );

        Ok(Self {
            mmap,
            _file: file,
            geometry,
        })
    }
}

impl DisplaySurface for FramebufferSurface {
    fn geometry(&self) -> &DisplayGeometry {
        &self.geometry
    }

    fn write_region(&mut self, offset: usize, bytes: &[u8]) -> Result<(), SurfaceError> {
        super::write_checked(&mut self.mmap, offset, bytes)
    }
}
