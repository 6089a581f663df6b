//! RegLand Core Library
//!
//! View-state engine, screen-position mapping, conservation binning, and the
//! shared genomic data model for the RegLand regulatory-genomics browser.

pub mod bins;
pub mod citation;
pub mod track;
pub mod types;
pub mod view;

// Re-export commonly used types and functions
pub use bins::{conservation_bins, ConservationMatrix, DEFAULT_BIN_COUNT};
pub use track::{is_in_view, position_percent, TrackLayout};
pub use types::{ConservationClass, CtcfSite, Enhancer, Gene, GenomicRegion, GwasSnp};
pub use view::{GeneViewport, PanDirection, WheelDirection, MAX_ZOOM, MIN_ZOOM, ZOOM_STEP};

/// Version information for the RegLand core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
