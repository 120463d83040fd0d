#![doc = "docflow: job-driven document pipeline engine."]

//! A declarative job names document *sources* and *outputs*, each backed by a
//! named *plugin*. The engine resolves the plugins a job needs, instantiates
//! each exactly once per run, pulls documents from every source, drives them
//! through a document processor one at a time, and fans each processed
//! document out to every output listener.
//!
//! The document processor is an external collaborator behind
//! [`contract::DocumentProcessor`]; [`processor::VerbatimProcessor`] is the
//! minimal built-in implementation the CLI runs with.

pub mod cli;
pub mod collect;
pub mod contract;
pub mod dispatch;
pub mod error;
pub mod job;
pub mod load_job;
pub mod plugins;
pub mod processor;
pub mod resolve;
pub mod run;
