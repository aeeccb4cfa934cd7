//! Driver (C6): owns the compilation-unit set and orchestrates
//! C2 → C3 → C4 → C5 (§4.6).

mod driver;

pub use driver::{AnalysisResult, Engine};
