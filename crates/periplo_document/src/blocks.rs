use serde::Serialize;

use periplo_staticmap::MapArtifact;

use crate::layout::PageSpec;

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    /// Running header, first block of every page.
    PageHeader {
        title: String,
        subtitle: String,
    },
    Banner {
        route_name: String,
        date: String,
        mode_label: String,
        supervisor: Option<String>,
    },
    MetricCell {
        label: String,
        value: String,
    },
    Map {
        artifact: MapArtifact,
    },
    LegCard {
        title: String,
        lines: Vec<String>,
    },
    SectionTitle {
        text: String,
    },
    RosterEntry {
        stop_name: String,
        lines: Vec<String>,
    },
    SignatureLine {
        label: String,
    },
    SupervisorSignature {
        label: String,
    },
}

/// A block placed on a page. Coordinates are absolute page millimeters,
/// origin at the top-left corner.
#[derive(Clone, Debug, Serialize)]
pub struct Positioned {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(flatten)]
    pub block: Block,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct Page {
    pub blocks: Vec<Positioned>,
}

/// The finished paged report. Built fresh per export, never mutated after
/// composition; the hosting UI hands it to its page renderer and discards
/// it.
#[derive(Clone, Debug, Serialize)]
pub struct ItineraryDocument {
    pub spec: PageSpec,
    pub pages: Vec<Page>,
    pub file_name: String,
}
