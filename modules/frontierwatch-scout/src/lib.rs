pub mod notifier;
pub mod pipeline;
pub mod render;
pub mod scout;
pub mod sources;
pub mod store;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
