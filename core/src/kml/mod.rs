//! KML rendering of processed flights.

pub mod colormap;
pub mod document;

pub use colormap::{color_bin, ColorRamp, COLOR_RAMPS};
pub use document::{document_title, escape_xml, KmlStage, RenderConfig, RenderedFlight};
