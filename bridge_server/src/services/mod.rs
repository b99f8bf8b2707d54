//! Bridge services — pure mapping logic and external collaborator clients.

pub mod badge;
pub mod cloner;
pub mod github_service;
pub mod lifecycle;
pub mod naming;
pub mod pipeline_service;
pub mod reporter;
pub mod status_map;
pub mod storage_service;
