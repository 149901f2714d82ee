//! Skill extraction, embeddings and semantic matching

pub mod skills;
pub mod embeddings;
pub mod bert;
pub mod matcher;
pub mod analyzer;
pub mod model_manager;
