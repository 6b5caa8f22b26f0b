pub mod crisis;

pub use crisis::{CRISIS_KEYWORDS, CrisisFilter};
