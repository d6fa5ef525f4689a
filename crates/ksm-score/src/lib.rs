// KSM side of the import: .ksc score lines, the score/songs directory layout, chart hashing.

pub mod hash;
pub mod layout;
pub mod score;
pub mod text;

pub use hash::ChartHasher;
pub use layout::{chart_path_for_score, enumerate_score_files, score_root};
pub use score::KsmScore;
pub use text::{decode_score_file, score_lines};
