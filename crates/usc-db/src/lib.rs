// USC maps.db access (rusqlite)

pub mod database;
pub mod score;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod writer;

pub use database::UscDatabase;
pub use score::{HitWindows, UscScore};
pub use writer::{ScoreWriter, SUPPORTED_VERSIONS, writer_for_version};
