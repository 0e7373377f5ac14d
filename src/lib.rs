//! Taxonomy Importer
//!
//! Loads hierarchical product categories from CSV files into a taxonomy
//! term store, up to six levels deep per row.

pub mod cli;
pub mod core;
