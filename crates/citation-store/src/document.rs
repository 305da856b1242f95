//! Citation document payload and rendering seam

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use traffic_model::{ViolationGeometry, ViolationKind};

/// Everything a renderer needs to produce a downloadable citation document.
///
/// A private copy of store data: rendering happens on this value, never
/// while a store lock is held.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitationDocument {
    pub citation_id: u64,
    pub violation_id: u64,
    pub kind: ViolationKind,
    pub amount: u32,
    pub vehicle_info: String,
    pub details: String,
    pub issued_at: DateTime<Utc>,
    pub geometry: Option<ViolationGeometry>,
}

/// Document-rendering capability.
///
/// The store's responsibility ends at assembling the payload; encoding
/// (plain text here, PDF in a richer deployment) lives behind this trait.
pub trait RenderDocument: Send + Sync {
    fn render(&self, doc: &CitationDocument) -> Vec<u8>;

    /// MIME type of the rendered bytes
    fn content_type(&self) -> &'static str;
}

/// Built-in plain-text renderer
#[derive(Debug, Default)]
pub struct PlainTextRenderer;

impl RenderDocument for PlainTextRenderer {
    fn render(&self, doc: &CitationDocument) -> Vec<u8> {
        let geometry = match doc.geometry {
            Some(ViolationGeometry::Single { bbox }) => format!(
                "box ({:.2}, {:.2}) - ({:.2}, {:.2})",
                bbox.x_min, bbox.y_min, bbox.x_max, bbox.y_max
            ),
            Some(ViolationGeometry::Pair { first, second }) => format!(
                "boxes ({:.2}, {:.2}) - ({:.2}, {:.2}) and ({:.2}, {:.2}) - ({:.2}, {:.2})",
                first.x_min,
                first.y_min,
                first.x_max,
                first.y_max,
                second.x_min,
                second.y_min,
                second.x_max,
                second.y_max
            ),
            None => "not recorded".to_string(),
        };

        let text = format!(
            "TRAFFIC CITATION\n\
             ================\n\
             Citation ID:  {}\n\
             Violation ID: {}\n\
             Violation:    {}\n\
             Vehicle:      {}\n\
             Amount:       {}\n\
             Issued at:    {}\n\
             Details:      {}\n\
             Geometry:     {}\n\
             \n\
             Please pay at the nearest traffic office or online portal.\n",
            doc.citation_id,
            doc.violation_id,
            doc.kind,
            doc.vehicle_info,
            doc.amount,
            doc.issued_at.to_rfc3339(),
            doc.details,
            geometry
        );
        text.into_bytes()
    }

    fn content_type(&self) -> &'static str {
        "text/plain; charset=utf-8"
    }
}
