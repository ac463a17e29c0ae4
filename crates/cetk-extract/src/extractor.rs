//! ---
//! cetk_section: "07-document-intake"
//! cetk_subsection: "module"
//! cetk_type: "source"
//! cetk_scope: "code"
//! cetk_description: "Document field extraction rules and text loading."
//! cetk_version: "v0.1.0"
//! cetk_owner: "tbd"
//! ---
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::rules::{FirstNumber, RangeMidpoint, RuleChain};

/// Reference coordinates used when a document gives none or invalid ones.
pub const DEFAULT_LATITUDE: f64 = 23.8103;
pub const DEFAULT_LONGITUDE: f64 = 90.4125;

/// Site fields found in a document. Absent fields stay `None`; defaults are
/// resolved by whoever turns them into site parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub waterfall_flow: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub waterfall_height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo_temp: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl ExtractedFields {
    pub fn has_waterfall(&self) -> bool {
        self.waterfall_flow.unwrap_or(0.0) > 0.0 && self.waterfall_height.unwrap_or(0.0) > 0.0
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Everything read from one document, including informational mentions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentExtraction {
    pub fields: ExtractedFields,
    pub turbine_efficiency: Option<f64>,
    pub power_mention_mw: Option<f64>,
    pub materials: Vec<String>,
    pub warnings: Vec<String>,
}

static FLOW: Lazy<RuleChain> = Lazy::new(|| {
    RuleChain::new()
        .with(FirstNumber::new("flow rate", r"[Ff]low\s*[Rr]ate[:\s]*(\d+\.?\d*)\s*m[³3]/s"))
        .with(FirstNumber::new(
            "water flow rate",
            r"[Ww]ater\s*[Ff]low\s*[Rr]ate[:\s]*(\d+\.?\d*)\s*m[³3]/s",
        ))
        .with(FirstNumber::new("Q =", r"Q\s*=\s*(\d+\.?\d*)\s*m[³3]/s"))
        .with(FirstNumber::new("flow", r"[Ff]low[:\s]*(\d+\.?\d*)\s*m[³3]/s"))
        .with(FirstNumber::new("bare m3/s", r"(\d+\.?\d*)\s*m[³3]/s"))
});

static HEIGHT: Lazy<RuleChain> = Lazy::new(|| {
    RuleChain::new()
        .with(FirstNumber::new(
            "waterfall height",
            r"[Ww]aterfall\s*[Hh]eight[:\s]*(\d+\.?\d*)\s*m",
        ))
        .with(FirstNumber::new("height", r"[Hh]eight[:\s]*(\d+\.?\d*)\s*m"))
        .with(FirstNumber::new("H =", r"H\s*=\s*(\d+\.?\d*)\s*m"))
        .with(FirstNumber::new("head", r"[Hh]ead[:\s]*(\d+\.?\d*)\s*m"))
});

static TEMPERATURE: Lazy<RuleChain> = Lazy::new(|| {
    RuleChain::new()
        .with(RangeMidpoint::new("temperature range", r"(\d+)\s*[-–]\s*(\d+)\s*°C"))
        .with(FirstNumber::new("temperature", r"[Tt]emperature[:\s]*(\d+)\s*°C"))
});

static DEPTH: Lazy<RuleChain> = Lazy::new(|| {
    RuleChain::new()
        .with(FirstNumber::new(
            "drilling depth",
            r"[Dd]rilling\s*[Dd]epth[:\s]*(\d+\.?\d*)\s*km",
        ))
        .with(RangeMidpoint::new(
            "depth range",
            r"(\d+\.?\d*)\s*[-–]\s*(\d+\.?\d*)\s*km",
        ))
        .with(FirstNumber::new("depth", r"[Dd]epth[:\s]*(\d+\.?\d*)\s*km"))
});

static LATITUDE: Lazy<RuleChain> = Lazy::new(|| {
    RuleChain::new()
        .with(FirstNumber::new("latitude", r"[Ll]atitude[:\s]*(\d+\.?\d*)"))
        .with(FirstNumber::new("lat", r"[Ll]at[:\s]*(\d+\.?\d*)"))
});

static LONGITUDE: Lazy<RuleChain> = Lazy::new(|| {
    RuleChain::new()
        .with(FirstNumber::new("longitude", r"[Ll]ongitude[:\s]*(\d+\.?\d*)"))
        .with(FirstNumber::new("lon", r"[Ll]on[:\s]*(\d+\.?\d*)"))
});

static EFFICIENCY: Lazy<RuleChain> =
    Lazy::new(|| RuleChain::new().with(FirstNumber::new("eta", r"η\s*=\s*(\d+\.?\d*)")));

static POWER: Lazy<RuleChain> =
    Lazy::new(|| RuleChain::new().with(FirstNumber::new("power", r"(\d+\.?\d*)\s*MW")));

const MATERIALS: [&str; 6] = [
    "Stainless Steel",
    "Inconel",
    "Ceramic composites",
    "SiC",
    "Titanium alloys",
    "Incoloy",
];

static MATERIAL_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    MATERIALS
        .iter()
        .map(|name| {
            let pattern = format!(r"(?i)\b{}\b", regex::escape(name));
            (
                *name,
                Regex::new(&pattern).expect("material pattern must compile"),
            )
        })
        .collect()
});

#[derive(Debug, Default, Clone, Copy)]
pub struct FieldExtractor;

impl FieldExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, text: &str) -> DocumentExtraction {
        let mut warnings = Vec::new();
        let value = |field: &str, chain: &RuleChain| lookup(field, chain, text);

        let latitude = value("latitude", &*LATITUDE).map(|lat| {
            if (-90.0..=90.0).contains(&lat) {
                lat
            } else {
                warnings.push(format!(
                    "Invalid latitude {lat}; must be between -90 and 90. Using {DEFAULT_LATITUDE}."
                ));
                DEFAULT_LATITUDE
            }
        });
        let longitude = value("longitude", &*LONGITUDE).map(|lon| {
            if (-180.0..=180.0).contains(&lon) {
                lon
            } else {
                warnings.push(format!(
                    "Invalid longitude {lon}; must be between -180 and 180. Using {DEFAULT_LONGITUDE}."
                ));
                DEFAULT_LONGITUDE
            }
        });

        let fields = ExtractedFields {
            waterfall_flow: value("waterfall_flow", &*FLOW),
            waterfall_height: value("waterfall_height", &*HEIGHT),
            geo_temp: value("geo_temp", &*TEMPERATURE),
            depth: value("depth", &*DEPTH),
            location_name: None,
            latitude,
            longitude,
        };

        for warning in &warnings {
            warn!("{warning}");
        }

        let materials: Vec<String> = MATERIAL_PATTERNS
            .iter()
            .filter(|(_, pattern)| pattern.is_match(text))
            .map(|(name, _)| (*name).to_owned())
            .collect();

        let extraction = DocumentExtraction {
            fields,
            turbine_efficiency: value("turbine_efficiency", &*EFFICIENCY),
            power_mention_mw: value("power_mention", &*POWER),
            materials,
            warnings,
        };
        info!(
            fields_found = extraction.found_count(),
            materials = extraction.materials.len(),
            "Document fields extracted"
        );
        extraction
    }
}

impl DocumentExtraction {
    /// Number of site fields (not mentions) that were found.
    pub fn found_count(&self) -> usize {
        let f = &self.fields;
        [
            f.waterfall_flow,
            f.waterfall_height,
            f.geo_temp,
            f.depth,
            f.latitude,
            f.longitude,
        ]
        .iter()
        .filter(|value| value.is_some())
        .count()
    }
}

fn lookup(field: &str, chain: &RuleChain, text: &str) -> Option<f64> {
    let hit = chain.first_match(text);
    match hit {
        Some(hit) => debug!(field, rule = hit.rule, value = hit.value, "field extracted"),
        None => debug!(field, "field not found"),
    }
    hit.map(|hit| hit.value)
}

/// Convenience wrapper around [`FieldExtractor::extract`].
pub fn extract_fields(text: &str) -> DocumentExtraction {
    FieldExtractor::new().extract(text)
}
