//! Fraunhofer line reference tables and line markers
//!
//! The tables are plain static data handed explicitly to whatever needs
//! them: the calibrator takes [`published_lines`] as its reference, and
//! [`line_markers`] uses [`LineTables`] to place labelled markers along a
//! calibrated spectrum for a renderer.

use serde::Serialize;

use crate::calibration::LineTable;
use crate::constants::MARKER_LUMINANCE_HEADROOM;
use crate::error::{Result, SpectroscopeError};
use crate::spectrum::{CalibratedSpectrum, LuminanceDistribution};

/// Published Fraunhofer line wavelengths in nanometers
pub const PUBLISHED_LINES: &[(&str, f64)] = &[
    ("y", 898.765),
    ("Z", 822.696),
    ("A", 759.370),
    ("B", 686.719),
    ("C", 656.281),
    ("a", 627.661),
    ("D1", 589.592),
    ("D2", 588.995),
    ("D3", 587.5618),
    ("e", 438.355),
    ("E2", 527.039),
    ("b1", 518.362),
    ("b2", 517.270),
    ("b3", 516.891),
    ("b4", 516.733),
    ("c", 495.761),
    ("F", 486.134),
    ("d", 466.814),
    ("G", 430.790),
    ("h", 410.175),
    ("H", 396.847),
    ("K", 393.368),
    ("L", 382.044),
    ("N", 358.121),
    ("P", 336.112),
    ("T", 302.108),
    ("t", 299.444),
];

/// Element or molecule responsible for each line
pub const LINE_ELEMENTS: &[(&str, &str)] = &[
    ("y", "O2"),
    ("Z", "O2"),
    ("A", "O2"),
    ("B", "O2"),
    ("C", "H Alpha"),
    ("a", "O2"),
    ("D1", "Na"),
    ("D2", "Na"),
    ("D3", "He"),
    ("e", "Fe"),
    ("E2", "Fe"),
    ("b1", "Mg"),
    ("b2", "Mg"),
    ("b3", "Fe"),
    ("b4", "Mg"),
    ("c", "Fe"),
    ("F", "H Beta"),
    ("d", "Fe"),
    ("G\"", "H Gamma"),
    ("G", "Ca"),
    ("h", "H Delta"),
    ("H", "Ca+"),
    ("K", "Ca+"),
    ("L", "Fe"),
    ("N", "Fe"),
    ("P", "Ti+"),
    ("T", "Fe"),
    ("t", "Ni"),
];

/// Lines drawn with emphasis
pub const NOTABLE_LINES: &[&str] = &["A", "B", "C", "D1", "D2", "D3", "E2", "F", "G", "H", "K"];

/// Group of closely spaced lines sharing a single label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterRule {
    /// Every line belonging to the cluster
    pub members: &'static [&'static str],
    /// Line carrying the cluster label
    pub first: &'static str,
    /// Lines drawn without a label of their own
    pub siblings: &'static [&'static str],
    pub label: &'static str,
}

pub const CLUSTERED_LINES: &[ClusterRule] = &[
    ClusterRule {
        members: &["b1", "b2", "b3", "b4"],
        first: "b2",
        siblings: &["b4", "b3", "b1"],
        label: "b\n4-1",
    },
    ClusterRule {
        members: &["D1", "D2", "D3"],
        first: "D3",
        siblings: &["D2", "D1"],
        label: "D\n3-1",
    },
];

/// Line positions measured on the bundled solar spectrum photograph
pub const MEASURED_SAMPLE_LINES: &[(&str, f64)] = &[
    ("G", 134.0),
    ("F", 371.0),
    ("b4", 502.0),
    ("E2", 545.0),
    ("D1", 810.0),
    ("a", 974.0),
    ("C", 1095.0),
];

/// Owned table of the published wavelengths
pub fn published_lines() -> LineTable {
    to_table(PUBLISHED_LINES)
}

/// Owned table of the sample measured positions
pub fn measured_sample_lines() -> LineTable {
    to_table(MEASURED_SAMPLE_LINES)
}

fn to_table(entries: &[(&str, f64)]) -> LineTable {
    entries.iter().map(|(name, v)| (name.to_string(), *v)).collect()
}

/// Reference data used to label lines along a spectrum
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineTables {
    pub published: &'static [(&'static str, f64)],
    pub elements: &'static [(&'static str, &'static str)],
    pub notable: &'static [&'static str],
    pub clusters: &'static [ClusterRule],
}

impl LineTables {
    pub const FRAUNHOFER: LineTables = LineTables {
        published: PUBLISHED_LINES,
        elements: LINE_ELEMENTS,
        notable: NOTABLE_LINES,
        clusters: CLUSTERED_LINES,
    };

    pub fn element(&self, line: &str) -> Option<&'static str> {
        self.elements
            .iter()
            .find(|(name, _)| *name == line)
            .map(|(_, element)| *element)
    }

    pub fn cluster(&self, line: &str) -> Option<&'static ClusterRule> {
        self.clusters.iter().find(|rule| rule.members.contains(&line))
    }
}

impl Default for LineTables {
    fn default() -> Self {
        Self::FRAUNHOFER
    }
}

/// Placement of one labelled line along a calibrated spectrum
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineMarker {
    /// Line name in the published table
    pub name: String,
    pub wavelength: f64,
    /// Text to draw, the cluster label for clustered lines
    pub label: String,
    pub element: Option<String>,
    pub is_notable: bool,
    /// Member of a cluster whose label is drawn by another line
    pub is_sibling: bool,
    /// Marker height relative to the strip, from the local luminance
    pub scale: f64,
}

/// Markers for every published line inside the spectrum's wavelength range
///
/// Markers are returned in ascending wavelength order. The height scale is
/// the luminance at the first axis sample at or past the line, relative to
/// the luminance maximum.
///
/// # Errors
///
/// Returns `SpectroscopeError::InvalidInput` if `luminance` does not share
/// the spectrum's wavelength axis.
pub fn line_markers(
    spectrum: &CalibratedSpectrum,
    luminance: &LuminanceDistribution,
    tables: &LineTables,
) -> Result<Vec<LineMarker>> {
    if luminance.len() != spectrum.len() {
        return Err(SpectroscopeError::invalid_input(
            "luminance",
            format!(
                "{} samples but the spectrum has {}",
                luminance.len(),
                spectrum.len()
            ),
        ));
    }
    if luminance.wavelengths() != spectrum.wavelengths() {
        return Err(SpectroscopeError::invalid_input(
            "luminance",
            "wavelength axis differs from the spectrum's",
        ));
    }
    let Some((lo, hi)) = spectrum.range() else {
        return Ok(Vec::new());
    };

    let mut lines: Vec<(&str, f64)> = tables
        .published
        .iter()
        .copied()
        .filter(|(_, wavelength)| (lo..=hi).contains(wavelength))
        .collect();
    lines.sort_by(|a, b| a.1.total_cmp(&b.1));

    let max = luminance.max_value().unwrap_or(0.0);
    let axis = spectrum.wavelengths();

    let markers = lines
        .into_iter()
        .map(|(name, wavelength)| {
            let (label, is_sibling) = match tables.cluster(name) {
                Some(rule) => (rule.label, rule.siblings.contains(&name)),
                None => (name, false),
            };

            let index = axis.partition_point(|&w| w < wavelength).min(axis.len() - 1);
            let scale = if max > 0.0 {
                MARKER_LUMINANCE_HEADROOM * luminance.values()[index] / max
            } else {
                0.0
            };

            LineMarker {
                name: name.to_string(),
                wavelength,
                label: label.to_string(),
                element: tables.element(name).map(str::to_string),
                is_notable: tables.notable.contains(&label),
                is_sibling,
                scale,
            }
        })
        .collect::<Vec<_>>();

    tracing::debug!(markers = markers.len(), lo, hi, "placed line markers");

    Ok(markers)
}
