use crate::models::script::ExamScript;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// 从 TOML 文件加载数据并转换为 ExamScript 对象
pub async fn load_script_file(script_path: &Path) -> Result<ExamScript> {
    let content = fs::read_to_string(script_path)
        .await
        .with_context(|| format!("无法读取TOML文件: {}", script_path.display()))?;

    let mut script: ExamScript = toml::from_str(&content)
        .with_context(|| format!("无法解析TOML文件: {}", script_path.display()))?;

    // 设置文件路径
    script.file_path = Some(script_path.to_string_lossy().to_string());

    Ok(script)
}

/// 从文件夹中加载所有 TOML 文件并转换为 ExamScript 对象列表
///
/// 解析失败的文件会被跳过并记录 warn，不会中断整批加载
pub async fn load_all_script_files(folder_path: &str) -> Result<Vec<ExamScript>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        anyhow::bail!("文件夹不存在: {}", folder_path);
    }

    let mut scripts = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            tracing::info!(
                "正在加载: {}",
                path.file_name().unwrap_or_default().to_string_lossy()
            );

            match load_script_file(&path).await {
                Ok(script) => {
                    tracing::info!(
                        "成功加载脚本: {} ({} 个答案)",
                        script.callsign,
                        script.answer_count()
                    );
                    scripts.push(script);
                }
                Err(e) => {
                    tracing::warn!("加载文件失败 {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(scripts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_script_file() {
        let dir = std::env::temp_dir().join("kce_loader_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("w6jsv.toml");
        std::fs::write(
            &path,
            r#"
                callsign = "W6JSV"

                [answers]
                1 = "A"
            "#,
        )
        .unwrap();

        let script = tokio_test::block_on(load_script_file(&path)).unwrap();
        assert_eq!(script.callsign, "W6JSV");
        assert!(script.file_path.is_some());

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_folder_is_an_error() {
        let result = tokio_test::block_on(load_all_script_files("/no/such/folder"));
        assert!(result.is_err());
    }
}
