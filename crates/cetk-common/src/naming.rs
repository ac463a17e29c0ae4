//! ---
//! cetk_section: "01-core-functionality"
//! cetk_subsection: "module"
//! cetk_type: "source"
//! cetk_scope: "code"
//! cetk_description: "File naming helpers shared by the report exporters."
//! cetk_version: "v0.1.0"
//! cetk_owner: "tbd"
//! ---

/// File-name friendly form of a location name: surrounding whitespace
/// dropped, inner spaces replaced by `_`.
pub fn file_slug(name: &str) -> String {
    name.trim().replace(' ', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_before_replacing_spaces() {
        assert_eq!(file_slug("Chittagong Hills"), "Chittagong_Hills");
        assert_eq!(file_slug("  Sylhet Basin "), "Sylhet_Basin");
    }
}
