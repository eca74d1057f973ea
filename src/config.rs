//! ビューア設定
//!
//! 入力画像と表示デバイスの設定を管理するモジュール

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 設定エラー
#[derive(Error, Debug)]
pub enum ConfigError {
    /// I/O エラー
    #[error("設定の読み書き中にI/Oエラーが発生しました: {0}")]
    Io(#[from] io::Error),

    /// JSON エラー
    #[error("JSONの解析に失敗しました: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML デシリアライズエラー
    #[error("TOMLの解析に失敗しました: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// TOML シリアライズエラー
    #[error("TOMLのシリアライズに失敗しました: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// 未対応の設定ファイル形式
    #[error("未対応の設定ファイル形式です: {}", .0.display())]
    UnknownFormat(PathBuf),
}

/// 設定形式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON 形式
    Json,
    /// TOML 形式
    Toml,
}

impl ConfigFormat {
    /// ファイル拡張子から設定形式を判定
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }
}

/// ビューア設定
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    /// 入力画像設定
    pub image: ImageSettings,
    /// 表示デバイス設定
    pub display: DisplaySettings,
}

/// 入力画像設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSettings {
    /// 画像ファイルパス
    pub path: PathBuf,
}

/// 表示デバイス設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// フレームバッファデバイスパス
    pub device: PathBuf,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("post.ppm"),
        }
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            device: PathBuf::from("/dev/fb0"),
        }
    }
}

impl ViewerSettings {
    /// 設定をファイルから読み込む
    ///
    /// ファイルが存在しない場合は既定値を返します。
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let format = ConfigFormat::from_path(path)
            .ok_or_else(|| ConfigError::UnknownFormat(path.to_path_buf()))?;
        let content = fs::read_to_string(path)?;

        match format {
            ConfigFormat::Json => Ok(serde_json::from_str(&content)?),
            ConfigFormat::Toml => Ok(toml::from_str(&content)?),
        }
    }

    /// 設定をファイルに保存
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let format = ConfigFormat::from_path(path)
            .ok_or_else(|| ConfigError::UnknownFormat(path.to_path_buf()))?;

        // 親ディレクトリが存在しない場合は作成
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = match format {
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
            ConfigFormat::Toml => toml::to_string_pretty(self)?,
        };
        fs::write(path, content)?;
        Ok(())
    }
}
