//! ---
//! cetk_section: "08-energy-models"
//! cetk_subsection: "module"
//! cetk_type: "source"
//! cetk_scope: "code"
//! cetk_description: "Renewable potential estimation routines for community planning."
//! cetk_version: "v0.1.0"
//! cetk_owner: "tbd"
//! ---
use std::{fs, path::Path};

use crate::{
    errors::{CalcEngineError, Result},
    model::SiteParameters,
};

/// Reads site parameters from a JSON or YAML document.
pub fn load_site_from_file(path: impl AsRef<Path>) -> Result<SiteParameters> {
    let data = fs::read_to_string(path)?;
    parse_site(&data)
}

pub fn parse_site(data: &str) -> Result<SiteParameters> {
    let site = if data.trim_start().starts_with('{') {
        serde_json::from_str(data)?
    } else {
        serde_yaml::from_str(data).map_err(CalcEngineError::YamlSerializationFailed)?
    };
    Ok(site)
}

pub fn load_sites_from_json(path: impl AsRef<Path>) -> Result<Vec<SiteParameters>> {
    let data = fs::read_to_string(path)?;
    let sites = serde_json::from_str(&data)?;
    Ok(sites)
}
