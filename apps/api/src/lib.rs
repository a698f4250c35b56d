//! Startup Architect Library
//!
//! This library provides the core functionality for the Startup Architect
//! service: the domain input, the LLM client, agent tools, the crew runner,
//! and the HTTP layer that ties them to a web form.

pub mod agents;
pub mod api;
pub mod config;
pub mod domain;
pub mod llm;
pub mod tools;
