//! Game-readiness validation for 3D assets.
//!
//! Inspects the meshes of a [`gameready_scene::Scene`] for topology, UV,
//! texture, rigging and modifier problems, and reports PASS/FAIL with
//! per-object findings grouped into sections.
//!
//! # Example
//!
//! ```no_run
//! use gameready_lint::{render_report, Scanner, Settings};
//! use gameready_scene::Scene;
//!
//! let json = std::fs::read_to_string("scene.json").unwrap();
//! let scene = Scene::from_json(&json).unwrap();
//!
//! let settings = Settings::default();
//! let report = Scanner::new(settings.clone()).scan(&scene).unwrap();
//!
//! if !report.passed {
//!     println!("{}", render_report(&report, &settings));
//! }
//! ```

pub mod collection;
pub mod context;
pub mod error;
pub mod registry;
pub mod report;
pub mod rules;
pub mod scan;
pub mod section;
pub mod settings;
pub mod sink;
pub mod summary;

pub use collection::CollectionBlock;
pub use context::CheckContext;
pub use error::{ScanError, SinkError};
pub use registry::{CheckMetadata, CheckRegistry};
pub use report::{Entry, Finding, FindingCounts, ObjectReport, ScanReport, Section, Severity};
pub use rules::Check;
pub use scan::{is_high_poly, Scanner, Selection};
pub use settings::{ScanScope, Settings, Thresholds};
pub use sink::{ReportSink, StringSink, WriterSink};
pub use summary::{compact_summary, render_report, verdict};
