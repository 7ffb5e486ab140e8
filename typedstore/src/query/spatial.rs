use crate::errors::{ErrorKind, TypedStoreError, TypedStoreResult};
use crate::query::ScanConsistency;
use std::hash::Hash;

/// A 2D bounding box represented by minimum and maximum coordinates.
///
/// `BoundingBox` defines a rectangular area using the minimum (min_x, min_y) and maximum
/// (max_x, max_y) corners. Spatial queries match documents whose point lies inside it,
/// edges included.
///
/// # Examples
///
/// ```rust,ignore
/// let bbox = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
/// assert!(bbox.contains_point(50.0, 50.0));
/// ```
#[derive(Clone, PartialEq, Default, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct BoundingBox {
    /// Minimum X coordinate
    pub min_x: f64,
    /// Minimum Y coordinate
    pub min_y: f64,
    /// Maximum X coordinate
    pub max_x: f64,
    /// Maximum Y coordinate
    pub max_y: f64,
}

impl Hash for BoundingBox {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.min_x.to_bits().hash(state);
        self.min_y.to_bits().hash(state);
        self.max_x.to_bits().hash(state);
        self.max_y.to_bits().hash(state);
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BoundingBox({}, {}, {}, {})",
            self.min_x, self.min_y, self.max_x, self.max_y
        )
    }
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> BoundingBox {
        BoundingBox {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Checks if this bounding box contains a point.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Checks if this bounding box intersects another bounding box.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    fn is_well_formed(&self) -> bool {
        [self.min_x, self.min_y, self.max_x, self.max_y]
            .iter()
            .all(|c| c.is_finite())
            && self.min_x <= self.max_x
            && self.min_y <= self.max_y
    }
}

/// A query against a spatial view, matching documents whose point lies inside a bounding
/// box. Without a bounding box every row of the view matches.
///
/// Immutable once built, like [ViewQuery](crate::query::ViewQuery).
#[derive(Clone, Debug, PartialEq)]
pub struct SpatialQuery {
    design_document: String,
    view_name: String,
    bounding_box: Option<BoundingBox>,
    skip: usize,
    limit: Option<usize>,
    consistency: Option<ScanConsistency>,
}

impl SpatialQuery {
    pub fn new(design_document: &str, view_name: &str) -> Self {
        SpatialQuery {
            design_document: design_document.to_string(),
            view_name: view_name.to_string(),
            bounding_box: None,
            skip: 0,
            limit: None,
            consistency: None,
        }
    }

    pub fn within(mut self, bounding_box: BoundingBox) -> Self {
        self.bounding_box = Some(bounding_box);
        self
    }

    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn consistency(mut self, consistency: ScanConsistency) -> Self {
        self.consistency = Some(consistency);
        self
    }

    pub fn design_document(&self) -> &str {
        &self.design_document
    }

    pub fn view_name(&self) -> &str {
        &self.view_name
    }

    pub fn bounding_box(&self) -> Option<&BoundingBox> {
        self.bounding_box.as_ref()
    }

    pub fn get_skip(&self) -> usize {
        self.skip
    }

    pub fn get_limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn get_consistency(&self) -> Option<ScanConsistency> {
        self.consistency
    }

    pub(crate) fn with_default_consistency(&self, consistency: ScanConsistency) -> Self {
        let mut query = self.clone();
        query.consistency.get_or_insert(consistency);
        query
    }

    /// Whether a point passes the bounding box restriction.
    pub fn matches_point(&self, x: f64, y: f64) -> bool {
        self.bounding_box
            .as_ref()
            .map_or(true, |bbox| bbox.contains_point(x, y))
    }

    pub fn validate(&self) -> TypedStoreResult<()> {
        if self.design_document.is_empty() || self.view_name.is_empty() {
            log::error!("Spatial query requires a design document and a view name");
            return Err(TypedStoreError::new(
                "Spatial query requires a design document and a view name",
                ErrorKind::InvalidQuery,
            ));
        }

        if let Some(bbox) = &self.bounding_box {
            if !bbox.is_well_formed() {
                log::error!("Invalid bounding box {}", bbox);
                return Err(TypedStoreError::new(
                    &format!("Invalid bounding box {}", bbox),
                    ErrorKind::InvalidQuery,
                ));
            }
        }
        Ok(())
    }
}
