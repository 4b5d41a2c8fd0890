//! Tree-level integration tests: long mixed workloads and snapshots on disk.

mod persistence_test;
mod workload_test;
