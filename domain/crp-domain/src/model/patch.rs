//! 展開済み AppImage 内スクリプトへのテキストパッチ

use std::path::PathBuf;

/// machine-id 生成コマンドの呼び出し文字列
pub const UUIDGEN_NEEDLE: &str = "\"uuidgen\"";
/// 起動ごとに machine-id を作り直させる置換後の文字列
pub const UUIDGEN_REPLACEMENT: &str = "\"echo \\\"$(uuidgen)\\\"\"";

/// 展開ツリー内でパッチを当てるファイル（展開ルートからの相対パス）
pub const PATCH_TARGETS: [&str; 2] = [
    "resources/app/out/main.js",
    "resources/app/out/vs/code/node/cliProcessMain.js",
];

/// リテラル部分文字列の置換
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPatch {
    pub relative_path: PathBuf,
    pub needle: String,
    pub replacement: String,
}

impl TextPatch {
    /// machine-id を再生成させる既定パッチ群
    pub fn machine_id_patches() -> Vec<TextPatch> {
        PATCH_TARGETS
            .iter()
            .map(|rel| TextPatch {
                relative_path: PathBuf::from(rel),
                needle: UUIDGEN_NEEDLE.to_string(),
                replacement: UUIDGEN_REPLACEMENT.to_string(),
            })
            .collect()
    }

    /// 置換を適用。対象文字列が無ければ None
    pub fn apply(&self, content: &str) -> Option<String> {
        if self.needle.is_empty() || !content.contains(&self.needle) {
            return None;
        }
        Some(content.replace(&self.needle, &self.replacement))
    }
}
