//! PPMデコードモジュール
//!
//! プレーンテキスト形式（ASCII）のPPM画像をデコードする機能を提供します。

use super::{DecodedImage, Pixel};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// デコードエラー
#[derive(Error, Debug)]
pub enum DecodeError {
    /// 画像ファイルが開けない
    #[error("画像ファイル {} を開けません: {}", .path.display(), .source)]
    Open {
        path: PathBuf,
        source: io::Error,
    },

    /// 読み込みエラー
    #[error("画像データの読み込みに失敗しました: {0}")]
    Io(#[from] io::Error),

    /// 整数トークンの解析エラー
    #[error("数値として解析できないトークンです: '{0}'")]
    InvalidToken(String),

    /// データが途中で終わっている
    #[error("{0}の読み込み中にデータが終了しました")]
    UnexpectedEof(&'static str),

    /// 画像サイズが不正
    #[error("画像サイズが不正です: {width} x {height}")]
    InvalidDimensions {
        width: i64,
        height: i64,
    },

    /// ピクセルバッファの確保失敗
    #[error("ピクセルバッファの確保に失敗しました（{0} ピクセル）")]
    OutOfMemory(usize),
}

/// PPMヘッダ情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PpmHeader {
    /// フォーマットタグ（例: "P3"）
    pub format: String,
    /// 画像の幅
    pub width: u32,
    /// 画像の高さ
    pub height: u32,
    /// サンプル値の最大値
    pub max_value: u32,
}

/// PPM画像デコーダ
///
/// 入力ストリームを空白区切りのトークン列として読み進めます。
/// 空白・改行はどちらも区切りとして扱われます。
#[derive(Debug)]
pub struct PpmDecoder<R: Read> {
    /// 入力ストリーム
    reader: R,
}

impl PpmDecoder<BufReader<File>> {
    /// ファイルパスからデコーダを作成
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DecodeError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| DecodeError::Open {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: Read> PpmDecoder<R> {
    /// ストリームからデコーダを作成
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// 画像全体をデコード
    ///
    /// ヘッダ（フォーマットタグ・幅・高さ・最大サンプル値）に続いて
    /// `幅 x 高さ` 個のRGB三つ組を読み込みます。フォーマットタグは
    /// 報告されるだけで検証されません。各サンプル値は [0, 255] に
    /// 飽和させて8ビットへ変換します。ストリームはこの呼び出しの
    /// 終了時に、成功・失敗のどちらの経路でも閉じられます。
    pub fn decode(mut self) -> Result<(PpmHeader, DecodedImage), DecodeError> {
        // ストリーム全体をトークン列として読み込む
        let mut content = String::new();
        self.reader.read_to_string(&mut content)?;
        let mut tokens = content.split_ascii_whitespace();

        // ヘッダを読み込む
        let format = tokens
            .next()
            .ok_or(DecodeError::UnexpectedEof("フォーマットタグ"))?
            .to_string();
        let width = next_integer(&mut tokens, "幅")?;
        let height = next_integer(&mut tokens, "高さ")?;
        let max_value = next_integer(&mut tokens, "最大サンプル値")?;

        // 0以下および表現範囲外のサイズは拒否する
        let limit = i64::from(u32::MAX);
        if width <= 0 || height <= 0 || width > limit || height > limit {
            return Err(DecodeError::InvalidDimensions { width, height });
        }
        let count = (width as usize)
            .checked_mul(height as usize)
            .ok_or(DecodeError::InvalidDimensions { width, height })?;
        if !(0..=limit).contains(&max_value) {
            return Err(DecodeError::InvalidToken(max_value.to_string()));
        }

        let header = PpmHeader {
            format,
            width: width as u32,
            height: height as u32,
            max_value: max_value as u32,
        };
        log::debug!(
            "ヘッダを読み込みました: {} {} x {}（最大値 {}）",
            header.format,
            header.width,
            header.height,
            header.max_value
        );

        // ピクセルバッファを確保
        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(count)
            .map_err(|_| DecodeError::OutOfMemory(count))?;

        // RGB三つ組を読み込む
        for _ in 0..count {
            let r = next_sample(&mut tokens)?;
            let g = next_sample(&mut tokens)?;
            let b = next_sample(&mut tokens)?;
            pixels.push(Pixel::new(r, g, b));
        }

        let image = DecodedImage::from_pixels(header.width, header.height, pixels)
            .ok_or(DecodeError::InvalidDimensions { width, height })?;

        Ok((header, image))
    }
}

/// 次のトークンを符号付き整数として読み込む
fn next_integer<'a, I>(tokens: &mut I, context: &'static str) -> Result<i64, DecodeError>
where
    I: Iterator<Item = &'a str>,
{
    let token = tokens.next().ok_or(DecodeError::UnexpectedEof(context))?;
    token
        .parse::<i64>()
        .map_err(|_| DecodeError::InvalidToken(token.to_string()))
}

/// 次のトークンを [0, 255] に飽和させた8ビット値として読み込む
fn next_sample<'a, I>(tokens: &mut I) -> Result<u8, DecodeError>
where
    I: Iterator<Item = &'a str>,
{
    let value = next_integer(tokens, "ピクセル値")?;
    Ok(value.clamp(0, 255) as u8)
}
