//! AppImage 再パッケージポート

use std::path::{Path, PathBuf};

use crate::error::DomainError;
use crate::model::TextPatch;

/// 再パッケージの結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepackOutcome {
    /// 生成したイメージ
    pub output: PathBuf,
    /// 実際に置換が入ったファイル（展開ルートからの相対パス）
    pub patched_files: Vec<PathBuf>,
}

pub trait ImageRepacker {
    /// 展開→パッチ→再パッケージ。作業ディレクトリは成否によらず削除する
    fn repack(&self, image: &Path, patches: &[TextPatch]) -> Result<RepackOutcome, DomainError>;
}
