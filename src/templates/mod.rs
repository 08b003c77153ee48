//! 内嵌资源模块

pub mod files;

pub use files::TemplateAssets;
