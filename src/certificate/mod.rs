//! 证书生成
//!
//! 模板替换与 PDF 渲染两步分开：替换是纯字符串操作，
//! 渲染才需要无头浏览器

pub mod render;
pub mod template;

pub use render::{render_pdf, wrap_html};
pub use template::{
    default_certificate_number, ensure_no_placeholders, CertificateData, CERTIFICATE_TEMPLATE,
};
