pub mod admin_client;
pub mod exam_client;

pub use admin_client::{AdminClient, AdminSession};
pub use exam_client::ExamClient;
