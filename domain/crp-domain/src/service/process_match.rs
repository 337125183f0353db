//! プロセス名の照合

/// 比較用に正規化する: パス部分を落とし、小文字化し、末尾の `.exe` を除く
pub fn normalize_process_name(name: &str) -> String {
    let trimmed = name.trim();
    let base = trimmed
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(trimmed)
        .to_ascii_lowercase();
    match base.strip_suffix(".exe") {
        Some(stem) => stem.to_string(),
        None => base,
    }
}

/// 実行中プロセス名が監視対象と一致するか
pub fn is_target_process(candidate: &str, target: &str) -> bool {
    let target = normalize_process_name(target);
    !target.is_empty() && normalize_process_name(candidate) == target
}
