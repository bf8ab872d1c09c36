//! Shadow-regulation compliance engine.
//!
//! Given a site location, a reference day, a statutory measurement window,
//! a proposed building massing and a distance-banded regulation profile, the
//! engine accumulates the cast-shadow duration at every check point around
//! the site and produces a [`ComplianceReport`].
//!
//! All lengths are meters in a site-local planar frame (+x east, +y north,
//! +z up). Angles are decimal degrees.
pub mod config;
pub mod error;
pub mod geom;
pub mod sim;

// Prelude
pub use config::{EngineConfig, Scenario};
pub use error::{Result, ShadowError};
pub use geom::massing::{Extrusion, Massing, MassingBuilder};
pub use geom::point::Point;
pub use geom::polygon::Footprint;
pub use geom::vector::Vector;
pub use sim::engine::{CancellationToken, Engine, EvaluationRequest, PointSet};
pub use sim::grid::GridSpec;
pub use sim::regulation::RegulationProfile;
pub use sim::report::{CheckPoint, ComplianceReport, OverallStatus, PointStatus};
pub use sim::solar::{ClockBasis, GeoCoordinate, SunPosition};
