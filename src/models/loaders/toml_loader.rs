use crate::models::job::DesignJob;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// 从 TOML 文件加载设计任务
///
/// 若任务使用 `bed_file`，会在此处读入文件内容填充 `bed_input`。
pub async fn load_toml_to_design_job(toml_file_path: &Path) -> Result<DesignJob> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取TOML文件: {}", toml_file_path.display()))?;

    let mut job: DesignJob = toml::from_str(&content)
        .with_context(|| format!("无法解析TOML文件: {}", toml_file_path.display()))?;

    if job.bed_input.is_none() {
        let bed_file = job
            .bed_file
            .as_deref()
            .with_context(|| format!("任务缺少 bed_input 或 bed_file: {}", job.name))?;
        let bed_path = toml_file_path
            .parent()
            .map(|dir| dir.join(bed_file))
            .unwrap_or_else(|| PathBuf::from(bed_file));
        let bed_text = fs::read_to_string(&bed_path)
            .await
            .with_context(|| format!("无法读取BED文件: {}", bed_path.display()))?;
        job.bed_input = Some(bed_text);
    }

    job.file_path = Some(toml_file_path.to_string_lossy().to_string());

    Ok(job)
}

/// 从文件夹中加载所有 TOML 任务文件（按文件名排序）
pub async fn load_all_toml_files(folder_path: &str) -> Result<Vec<DesignJob>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        anyhow::bail!("文件夹不存在: {}", folder_path);
    }

    let mut toml_files = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml_files.push(path);
        }
    }
    toml_files.sort();

    let mut jobs = Vec::new();
    for path in toml_files {
        tracing::info!(
            "正在加载: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );

        match load_toml_to_design_job(&path).await {
            Ok(job) => {
                tracing::info!("成功加载任务: {}", job.name);
                jobs.push(job);
            }
            Err(e) => {
                tracing::warn!("加载文件失败 {}: {:#}", path.display(), e);
            }
        }
    }

    Ok(jobs)
}
