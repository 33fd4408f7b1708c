//! Built-in filters.
//!
//! The stock set the application registers at startup: passthrough,
//! grayscale, gaussian blur, and the contour-detecting filter that feeds
//! the asynchronous analyzer.

pub mod blur;
pub mod contour;
pub mod grayscale;
pub mod passthrough;

pub use blur::GaussianBlurFilter;
pub use contour::ContourFilter;
pub use grayscale::GrayscaleFilter;
pub use passthrough::PassthroughFilter;

use std::sync::Arc;

use crate::analysis::ContourAnalyzer;
use crate::error::FilterError;

use super::{FilterCatalog, ImageFilter};

/// Build the default catalog in display order.
///
/// The passthrough filter comes first and is therefore active by default.
pub fn builtin_catalog(analyzer: Arc<ContourAnalyzer>) -> Result<FilterCatalog, FilterError> {
    let filters: Vec<Arc<dyn ImageFilter>> = vec![
        Arc::new(PassthroughFilter),
        Arc::new(GrayscaleFilter),
        Arc::new(GaussianBlurFilter::default()),
        Arc::new(ContourFilter::new(analyzer)),
    ];
    FilterCatalog::new(filters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::detector::ThresholdContourDetector;
    use crate::analysis::Orientation;

    #[test]
    fn test_builtin_catalog_order_and_default() {
        let analyzer = Arc::new(ContourAnalyzer::new(
            ThresholdContourDetector::default(),
            Orientation::RightMirrored,
        ));
        let catalog = builtin_catalog(analyzer).unwrap();

        assert_eq!(
            catalog.names_in_order(),
            vec!["None", "Gray color", "Gaussian blur", "Contour detecting"]
        );
        assert_eq!(catalog.active_name(), "None");
    }
}
