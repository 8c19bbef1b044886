//! Collaborators for external services: bulk document indexing and
//! multipart object uploads.

pub mod elasticsearch;
pub mod s3;
