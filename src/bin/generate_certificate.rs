//! 证书生成命令行工具
//!
//! 单次执行：读模板 → 三处占位符替换 → 直接写 SVG 或经无头
//! 浏览器渲染成固定 800×600 的 PDF。任何错误向上传播，
//! 进程以非零码退出

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use knowcodeextra::certificate::{
    default_certificate_number, render_pdf, CertificateData, CERTIFICATE_TEMPLATE,
};
use knowcodeextra::error::AppError;
use knowcodeextra::utils::logging;

/// Know Code Extra 证书生成器（20 WPM Extra）
#[derive(Debug, Parser)]
#[command(name = "generate-certificate")]
struct Cli {
    /// 业余无线电呼号
    #[arg(short, long)]
    callsign: String,

    /// 证书上显示的日期，缺省为今天
    #[arg(short, long)]
    date: Option<String>,

    /// 证书编号，缺省为 20WPM-<36进制时间戳>
    #[arg(short = 'n', long = "cert-no")]
    cert_no: Option<String>,

    /// 输出路径
    #[arg(short, long, default_value = "certificate.pdf")]
    output: PathBuf,

    /// 只输出 SVG，不渲染 PDF
    #[arg(long)]
    svg_only: bool,

    /// 自定义 SVG 模板路径，缺省使用内置模板
    #[arg(long)]
    template: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    run(Cli::parse()).await
}

async fn run(cli: Cli) -> Result<()> {
    let date = cli
        .date
        .unwrap_or_else(|| chrono::Local::now().format("%B %-d, %Y").to_string());
    let cert_no = cli.cert_no.unwrap_or_else(default_certificate_number);
    let data = CertificateData::new(&cli.callsign, &date, &cert_no);

    let template = match &cli.template {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| AppError::file_read_failed(path.to_string_lossy(), e))?,
        None => CERTIFICATE_TEMPLATE.to_string(),
    };

    let svg = data.stamp(&template)?;

    if cli.svg_only {
        let output = cli.output.with_extension("svg");
        std::fs::write(&output, &svg)
            .map_err(|e| AppError::file_write_failed(output.to_string_lossy(), e))?;
        info!("✓ SVG 证书已保存: {}", output.display());
        return Ok(());
    }

    let chrome = std::env::var("CHROME_EXECUTABLE").ok();
    render_pdf(&svg, &cli.output, chrome.as_deref()).await?;

    info!("✓ Know-Code Extra 证书已生成!");
    info!("  呼号: {}", data.callsign);
    info!("  日期: {}", data.date);
    info!("  证书编号: {}", data.cert_no);
    info!("  输出: {}", cli.output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["generate-certificate", "--callsign", "w6jsv"]).unwrap();
        assert_eq!(cli.callsign, "w6jsv");
        assert_eq!(cli.date, None);
        assert_eq!(cli.cert_no, None);
        assert_eq!(cli.output, PathBuf::from("certificate.pdf"));
        assert!(!cli.svg_only);
        assert!(cli.template.is_none());
    }

    #[test]
    fn test_cli_requires_callsign() {
        assert!(Cli::try_parse_from(["generate-certificate"]).is_err());
    }

    #[test]
    fn test_cli_full_flags() {
        let cli = Cli::try_parse_from([
            "generate-certificate",
            "--callsign",
            "W6JSV",
            "--date",
            "May 1, 2024",
            "--cert-no",
            "TEST-1",
            "--output",
            "/tmp/out.pdf",
            "--svg-only",
        ])
        .unwrap();
        assert_eq!(cli.date.as_deref(), Some("May 1, 2024"));
        assert_eq!(cli.cert_no.as_deref(), Some("TEST-1"));
        assert!(cli.svg_only);
    }

    #[test]
    fn test_svg_only_stamps_all_placeholders() {
        let dir = std::env::temp_dir().join("kce_cert_cli_test");
        std::fs::create_dir_all(&dir).unwrap();
        let output = dir.join("cert.pdf");

        let cli = Cli {
            callsign: "w6jsv".to_string(),
            date: Some("May 1, 2024".to_string()),
            cert_no: Some("TEST-1".to_string()),
            output: output.clone(),
            svg_only: true,
            template: None,
        };
        tokio_test::block_on(run(cli)).unwrap();

        let svg_path = output.with_extension("svg");
        let svg = std::fs::read_to_string(&svg_path).unwrap();
        assert!(svg.contains("W6JSV"));
        assert!(svg.contains("May 1, 2024"));
        assert!(svg.contains("TEST-1"));
        assert!(!svg.contains("{{"));

        std::fs::remove_file(&svg_path).ok();
    }
}
