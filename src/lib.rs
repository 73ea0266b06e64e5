//! Course scalar engine.
//!
//! The scalar is the content hierarchy of one course: learning objectives (CLOs),
//! topics, subtopics, lessons and performance criteria. This crate holds the
//! in-memory model, the service that edits it, the Bloom's verb check applied to
//! CLOs and the template workbook importer, plus an HTTP API and CLI on top.

pub mod api;
pub mod bloom;
pub mod config;
pub mod import;
pub mod models;
pub mod render;
pub mod scalar_file;
pub mod service;
