//! Popup content for vessel markers.
//!
//! Two popups exist: the full info popup bound to every clustered marker,
//! and the short popup on the highlight marker (name plus detail link).
//! Both are pure string builders; nothing here touches the map.

use std::fmt;

use serde::Serialize;

use crate::vessel::{SelectedVessel, Vessel};

/// Default base path of the per-vessel detail view.
pub const DEFAULT_DETAIL_BASE: &str = "/dashboard";

/// Placeholder for a missing name.
pub const NO_NAME: &str = "No name";

/// Placeholder for a missing IMO number.
pub const NO_IMO: &str = "N/A";

/// Placeholder for any other missing field.
pub const MISSING: &str = "-";

/// How speed is shown in the popup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "state", content = "knots", rename_all = "kebab-case")]
pub enum SpeedLabel {
    /// Speed is exactly zero; the vessel is at berth.
    Berth,
    /// Moving at the given speed in knots.
    Knots(f64),
    /// No usable speed reported.
    Unknown,
}

impl SpeedLabel {
    /// Classify an optional speed.
    pub fn from_speed(speed: Option<f64>) -> Self {
        match speed {
            Some(s) if s == 0.0 => SpeedLabel::Berth,
            Some(s) if s.is_finite() => SpeedLabel::Knots(s),
            _ => SpeedLabel::Unknown,
        }
    }

    fn to_html(self) -> String {
        match self {
            SpeedLabel::Berth => "<strong>Berth</strong>".to_string(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for SpeedLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpeedLabel::Berth => f.write_str("Berth"),
            SpeedLabel::Knots(s) => write!(f, "{} kn", s),
            SpeedLabel::Unknown => f.write_str(MISSING),
        }
    }
}

/// Structured popup content with every placeholder already applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopupContent {
    /// Vessel name or [`NO_NAME`].
    pub title: String,
    /// IMO number or [`NO_IMO`].
    pub imo: String,
    /// Destination or [`MISSING`].
    pub destination: String,
    /// Heading with a degree sign, or [`MISSING`].
    pub heading: String,
    /// Speed classification.
    pub speed: SpeedLabel,
    /// ETA or [`MISSING`].
    pub eta: String,
    /// Detail view link, present only for named vessels.
    pub detail_link: Option<String>,
}

impl PopupContent {
    /// Render as the HTML fragment bound to a marker.
    pub fn to_html(&self) -> String {
        let mut html = String::with_capacity(512);
        html.push_str("<div class=\"popup-container\">");
        html.push_str(&format!(
            "<div class=\"popup-header\"><h3 class=\"popup-title\">{} <span class=\"popup-imo\">{}</span></h3></div>",
            escape_html(&self.title),
            escape_html(&self.imo)
        ));
        html.push_str("<div class=\"popup-details\">");
        html.push_str(&format!(
            "<div class=\"popup-detail\"><span class=\"popup-value\">{}</span></div>",
            escape_html(&self.destination)
        ));
        html.push_str(&format!(
            "<div class=\"popup-detail\"><span class=\"popup-value\">{} | {}</span></div>",
            escape_html(&self.heading),
            self.speed.to_html()
        ));
        html.push_str(&format!(
            "<div class=\"popup-detail\"><strong>ETA:</strong> <span class=\"popup-value\">{}</span></div>",
            escape_html(&self.eta)
        ));
        html.push_str("</div>");
        if let Some(link) = &self.detail_link {
            html.push_str(&format!(
                "<div class=\"popup-footer\"><a href=\"{}\" class=\"view-more-link\">++View More</a></div>",
                escape_html(link)
            ));
        }
        html.push_str("</div>");
        html
    }
}

/// Builds popup content, with a configurable detail-view base path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupFormatter {
    detail_base: String,
}

impl Default for PopupFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_DETAIL_BASE)
    }
}

impl PopupFormatter {
    /// Create a formatter linking to `{detail_base}/{name}`.
    pub fn new(detail_base: impl Into<String>) -> Self {
        let detail_base = detail_base.into();
        Self {
            detail_base: detail_base.trim_end_matches('/').to_string(),
        }
    }

    /// Link to the detail view of a vessel.
    pub fn detail_link(&self, name: &str) -> String {
        format!("{}/{}", self.detail_base, name)
    }

    /// Structured content for a vessel's info popup.
    pub fn content(&self, vessel: &Vessel) -> PopupContent {
        PopupContent {
            title: vessel.name.clone().unwrap_or_else(|| NO_NAME.to_string()),
            imo: vessel
                .imo
                .map(|imo| imo.to_string())
                .unwrap_or_else(|| NO_IMO.to_string()),
            destination: text_or_missing(vessel.destination.as_deref()),
            heading: vessel
                .heading
                .filter(|h| h.is_finite())
                .map(|h| format!("{}°", h))
                .unwrap_or_else(|| MISSING.to_string()),
            speed: SpeedLabel::from_speed(vessel.speed),
            eta: text_or_missing(vessel.eta.as_deref()),
            detail_link: vessel.name.as_deref().map(|name| self.detail_link(name)),
        }
    }

    /// Info popup HTML for a clustered marker.
    pub fn format(&self, vessel: &Vessel) -> String {
        self.content(vessel).to_html()
    }

    /// Short popup HTML for the highlight marker.
    pub fn format_highlight(&self, selected: &SelectedVessel) -> String {
        format!(
            "<div>Name: {}<br /></div><div style=\"text-align: right;\"><a href=\"{}\" style=\"cursor: pointer;\"><u>++View more</u></a></div>",
            escape_html(&selected.name),
            escape_html(&self.detail_link(&selected.name))
        )
    }
}

fn text_or_missing(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => MISSING.to_string(),
    }
}

/// Escape text for use in HTML content and double-quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
