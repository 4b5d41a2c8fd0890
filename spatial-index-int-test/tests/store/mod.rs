//! Integration tests for the shared, file-backed handle and the named facade.

mod named_index_test;
mod shared_store_test;
