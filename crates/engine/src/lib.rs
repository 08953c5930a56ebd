//! # Engine Crate
//!
//! Ties the catalog, scoring and filtering crates into two async services:
//!
//! - [`RecommendationOrchestrator`]: a ranked, category-diverse list of
//!   venues for a region, date and set of time windows
//! - [`CourseAssembler`]: themed date courses built from that list, one
//!   stop per time window
//!
//! ## Example Usage
//!
//! ```ignore
//! use engine::{CourseAssembler, CourseRequest, RecommendationOrchestrator};
//!
//! let orchestrator = Arc::new(RecommendationOrchestrator::new(Arc::new(index)));
//! let assembler = CourseAssembler::new(orchestrator);
//!
//! let request = CourseRequest::new("seongsu", date, vec![2, 3, 4]).with_theme("culture");
//! let result = assembler.generate_courses(&request, &mut rand::rng()).await?;
//! ```

pub mod assembler;
pub mod config;
pub mod course;
pub mod orchestrator;
pub mod themes;

pub use assembler::{CourseAssembler, CourseMetadata, CourseRequest, CourseResult};
pub use config::EngineConfig;
pub use course::{CostRange, CourseStop, DateCourse, Difficulty, WeatherSuitability};
pub use orchestrator::{
    RecommendationMetadata, RecommendationOrchestrator, RecommendationRequest,
    RecommendationResult,
};
pub use themes::Theme;
