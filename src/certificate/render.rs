//! 证书 PDF 渲染
//!
//! 把替换好的 SVG 套进最小 HTML 外壳，交给无头浏览器按固定
//! 800×600、零边距打印成 PDF。渲染失败时不落盘，不留半成品

use std::path::Path;

use anyhow::Result;
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use tracing::{debug, info};

use crate::browser::launch_headless_browser;
use crate::error::AppError;

/// 证书页面固定尺寸（像素）
pub const PAGE_WIDTH_PX: f64 = 800.0;
pub const PAGE_HEIGHT_PX: f64 = 600.0;

/// CSS 像素到打印英寸的换算
const PX_PER_INCH: f64 = 96.0;

/// 把 SVG 包进最小 HTML 外壳
pub fn wrap_html(svg: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Playfair+Display:wght@400;700&display=swap');
    body {{ margin: 0; padding: 0; }}
  </style>
</head>
<body>
  {}
</body>
</html>"#,
        svg
    )
}

/// 渲染 PDF 并写入目标路径
///
/// # 参数
/// - `svg`: 替换完成的证书 SVG
/// - `output`: 输出 PDF 路径
/// - `chrome_executable`: 浏览器路径，None 时自动探测
pub async fn render_pdf(svg: &str, output: &Path, chrome_executable: Option<&str>) -> Result<()> {
    let html = wrap_html(svg);

    let (mut browser, page) = launch_headless_browser(chrome_executable).await?;

    page.set_content(html).await?;
    debug!("证书页面已加载");

    let params = PrintToPdfParams {
        print_background: Some(true),
        paper_width: Some(PAGE_WIDTH_PX / PX_PER_INCH),
        paper_height: Some(PAGE_HEIGHT_PX / PX_PER_INCH),
        margin_top: Some(0.0),
        margin_bottom: Some(0.0),
        margin_left: Some(0.0),
        margin_right: Some(0.0),
        ..Default::default()
    };

    let bytes = page.pdf(params).await?;

    std::fs::write(output, bytes)
        .map_err(|e| AppError::file_write_failed(output.to_string_lossy(), e))?;

    browser.close().await?;

    info!("✅ PDF 已写入: {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_html_embeds_svg_with_zero_margin() {
        let html = wrap_html("<svg>X</svg>");
        assert!(html.contains("<svg>X</svg>"));
        assert!(html.contains("margin: 0"));
        assert!(html.starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn test_page_dimensions_in_inches() {
        assert!((PAGE_WIDTH_PX / PX_PER_INCH - 8.333).abs() < 0.01);
        assert!((PAGE_HEIGHT_PX / PX_PER_INCH - 6.25).abs() < 0.001);
    }
}
