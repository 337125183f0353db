//! AppImage 再パッケージアダプター
//!
//! 手順: `<image> --appimage-extract` で展開 → スクリプトをテキスト置換 →
//! `appimagetool -n ./squashfs-root <output>` で再パッケージ。
//! 展開先 `squashfs-root` は成功・失敗どちらでも削除する。

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use crp_domain::DomainError;
use crp_domain::model::TextPatch;
use crp_domain::port::driven::{ImageRepacker, RepackOutcome};
use tracing::{debug, info, warn};

/// 再パッケージツール（PATH 上にある前提）
pub const DEFAULT_REPACK_TOOL: &str = "appimagetool";
/// `--appimage-extract` が作るディレクトリ名
pub const EXTRACT_DIR_NAME: &str = "squashfs-root";

pub struct AppImageRepacker {
    work_dir: PathBuf,
    repack_tool: PathBuf,
}

impl AppImageRepacker {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self::with_tool(work_dir, DEFAULT_REPACK_TOOL)
    }

    pub fn with_tool(work_dir: impl Into<PathBuf>, repack_tool: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            repack_tool: repack_tool.into(),
        }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }
}

/// Drop で展開ディレクトリを消す
struct ScratchDir(PathBuf);

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if self.0.exists() {
            match fs::remove_dir_all(&self.0) {
                Ok(()) => debug!(path = %self.0.display(), "scratch removed"),
                Err(e) => warn!(path = %self.0.display(), error = %e, "failed to remove scratch"),
            }
        }
    }
}

fn run(cmd: &mut Command, what: &str) -> Result<Output, DomainError> {
    let output = cmd
        .output()
        .map_err(|e| DomainError::RepackFailed(format!("{what}: failed to start: {e}")))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let lines: Vec<&str> = stderr.lines().collect();
        let tail = lines[lines.len().saturating_sub(5)..].join("\n");
        return Err(DomainError::RepackFailed(format!(
            "{what}: exited with {}{}",
            output.status,
            if tail.is_empty() { String::new() } else { format!("\n{tail}") }
        )));
    }
    Ok(output)
}

/// 展開ツリーにパッチを当て、実際に置換したファイルの相対パスを返す
pub fn patch_extracted_tree(root: &Path, patches: &[TextPatch]) -> Result<Vec<PathBuf>, DomainError> {
    let mut patched = Vec::new();
    for patch in patches {
        let path = root.join(&patch.relative_path);
        if !path.is_file() {
            debug!(path = %path.display(), "patch target missing; skipped");
            continue;
        }
        let content = fs::read_to_string(&path)
            .map_err(|e| DomainError::from_io(format!("read {}", path.display()), &e))?;
        match patch.apply(&content) {
            Some(updated) => {
                fs::write(&path, updated)
                    .map_err(|e| DomainError::from_io(format!("write {}", path.display()), &e))?;
                info!(file = %patch.relative_path.display(), "patched");
                patched.push(patch.relative_path.clone());
            }
            None => debug!(file = %patch.relative_path.display(), "needle not present"),
        }
    }
    Ok(patched)
}

/// 出力先は作業ディレクトリ内の同名ファイル。
/// 入力がまさにその場所にあるときは `<stem>.patched.<ext>` にずらす。
fn output_path(work_dir: &Path, image: &Path) -> Result<PathBuf, DomainError> {
    let file_name = image
        .file_name()
        .ok_or_else(|| DomainError::InvalidInput(format!("{} has no file name", image.display())))?;
    let candidate = work_dir.join(file_name);
    if candidate != image {
        return Ok(candidate);
    }
    let stem = image
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match image.extension() {
        Some(ext) => format!("{stem}.patched.{}", ext.to_string_lossy()),
        None => format!("{stem}.patched"),
    };
    Ok(work_dir.join(name))
}

fn staging_path(output: &Path) -> PathBuf {
    let mut name = output.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    output.with_file_name(name)
}

impl ImageRepacker for AppImageRepacker {
    fn repack(&self, image: &Path, patches: &[TextPatch]) -> Result<RepackOutcome, DomainError> {
        // 作業ディレクトリで実行するため絶対パスにしておく
        let image = image
            .canonicalize()
            .map_err(|e| DomainError::from_io(format!("AppImage {}", image.display()), &e))?;
        fs::create_dir_all(&self.work_dir).map_err(|e| {
            DomainError::from_io(format!("create {}", self.work_dir.display()), &e)
        })?;
        let work_dir = self.work_dir.canonicalize().map_err(|e| {
            DomainError::from_io(format!("resolve {}", self.work_dir.display()), &e)
        })?;
        let scratch = ScratchDir(work_dir.join(EXTRACT_DIR_NAME));
        if scratch.0.exists() {
            fs::remove_dir_all(&scratch.0).map_err(|e| {
                DomainError::from_io(format!("remove stale {}", scratch.0.display()), &e)
            })?;
        }

        run(
            Command::new(&image)
                .arg("--appimage-extract")
                .current_dir(&work_dir),
            "--appimage-extract",
        )?;
        if !scratch.0.is_dir() {
            return Err(DomainError::RepackFailed(format!(
                "extraction did not produce {}",
                scratch.0.display()
            )));
        }

        let patched_files = patch_extracted_tree(&scratch.0, patches)?;

        let output = output_path(&work_dir, &image)?;
        // 成功するまで既存の出力（利用者のイメージの場合もある）には触れない
        let staging = staging_path(&output);
        if staging.exists() {
            fs::remove_file(&staging)
                .map_err(|e| DomainError::from_io(format!("remove {}", staging.display()), &e))?;
        }
        let packed = run(
            Command::new(&self.repack_tool)
                .arg("-n")
                .arg(format!("./{EXTRACT_DIR_NAME}"))
                .arg(&staging)
                .current_dir(&work_dir),
            &self.repack_tool.display().to_string(),
        )
        .and_then(|_| {
            if staging.is_file() {
                Ok(())
            } else {
                Err(DomainError::RepackFailed(format!(
                    "{} did not produce {}",
                    self.repack_tool.display(),
                    staging.display()
                )))
            }
        });
        if let Err(err) = packed {
            let _ = fs::remove_file(&staging);
            return Err(err);
        }
        fs::rename(&staging, &output).map_err(|e| {
            let _ = fs::remove_file(&staging);
            DomainError::from_io(format!("move into {}", output.display()), &e)
        })?;

        info!(output = %output.display(), patched = patched_files.len(), "AppImage repacked");
        Ok(RepackOutcome {
            output,
            patched_files,
        })
    }
}
