//! Citation export.

/// BibTeX entry for the RegLand resource, as offered by the "copy citation"
/// action in the browser.
pub fn bibtex() -> String {
    [
        "@misc{regland2025,",
        "  title        = {RegLand: a cross-species atlas of regulatory landscapes},",
        "  author       = {{RegLand Consortium}},",
        "  year         = {2025},",
        "  howpublished = {\\url{https://regland.org}},",
        "  note         = {Accessed via the RegLand browser}",
        "}",
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bibtex_is_stable_and_well_formed() {
        let a = bibtex();
        assert_eq!(a, bibtex());
        assert!(a.starts_with("@misc{regland2025,"));
        assert!(a.ends_with('}'));
        assert!(a.contains("title"));
        assert!(a.contains("year"));
    }
}
