//! Shared helpers for the integration tests.
//!
//! `RUST_LOG` filters the output, e.g. `RUST_LOG=zeyrho=trace cargo test
//! --features tracing`.

#![allow(dead_code)]

use std::sync::Once;

use tracing_subscriber::EnvFilter;
use zeyrho::MultiSet;

static INIT: Once = Once::new();

/// Installs a test-friendly `fmt` subscriber. Only the first call does anything.
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Reference multiset backed by a sorted `Vec`.
#[derive(Debug, Default)]
pub struct SortedVecModel {
    values: Vec<i32>,
}

impl SortedVecModel {
    pub fn values(&self) -> &[i32] {
        &self.values
    }
}

impl MultiSet<i32> for SortedVecModel {
    fn add(&mut self, value: i32) {
        let index = self.values.partition_point(|v| *v <= value);
        self.values.insert(index, value);
    }

    fn remove(&mut self, value: &i32) -> bool {
        match self.values.binary_search(value) {
            Ok(index) => {
                self.values.remove(index);
                true
            }
            Err(_) => false,
        }
    }

    fn contains(&self, value: &i32) -> bool {
        self.values.binary_search(value).is_ok()
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    fn clear(&mut self) {
        self.values.clear();
    }
}
