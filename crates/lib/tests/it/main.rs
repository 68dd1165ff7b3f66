/*! Integration tests for Larder.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * Modules:
 * - backend: InMemory commit validation and persistence
 * - reorder: insert, delete and move against a live store
 * - compaction: renumbering after batch removal
 * - migration: moving the active subset into the fridge
 * - concurrency: racing operations against the same list
 * - lists: the remaining GroceryList and Fridge operations
 * - retry: outage backoff and deadlines
 * - properties: random operation sequences keep positions dense
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("larder=info".parse().unwrap()))
        .with_test_writer()
        .try_init();
}

mod backend;
mod lists;
mod migration;
mod properties;
mod reorder;
mod retry;
