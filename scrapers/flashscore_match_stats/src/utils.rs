use scraper::{ElementRef, Selector};

use crate::error::ExtractError;

pub fn selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::InvalidSelector {
        selector: css.to_string(),
        reason: e.to_string(),
    })
}

/// Rendered text of an element, trimmed the way a browser reports it.
pub fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Column stem for a statistic category: spaces become underscores.
pub fn normalize_category(category: &str) -> String {
    category.trim().replace(' ', "_")
}

/// Splits a halftime label such as `"1 - 0."` into its two components.
pub fn split_score(label: &str) -> Option<(String, String)> {
    let cleaned = label.trim().trim_end_matches('.').trim();
    let (home, away) = cleaned.split_once('-')?;
    Some((home.trim().to_string(), away.trim().to_string()))
}

/// Resolves a listing anchor against the site root when it is relative.
pub fn absolute_url(base_url: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else if href.starts_with('/') {
        format!("{}{}", base_url.trim_end_matches('/'), href)
    } else {
        format!("{}/{}", base_url.trim_end_matches('/'), href)
    }
}

/// Formats a number the way it should appear in an exported table.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_category() {
        assert_eq!(normalize_category("Possession de balle"), "Possession_de_balle");
        assert_eq!(normalize_category(" Corners "), "Corners");
        assert_eq!(normalize_category("Hors-jeu"), "Hors-jeu");
    }

    #[test]
    fn test_split_score() {
        assert_eq!(split_score("1 - 0"), Some(("1".to_string(), "0".to_string())));
        assert_eq!(split_score(" 2-2. "), Some(("2".to_string(), "2".to_string())));
        assert_eq!(split_score("Terminé"), None);
    }

    #[test]
    fn test_absolute_url() {
        assert_eq!(
            absolute_url("https://www.flashscore.fr", "/match/abc/"),
            "https://www.flashscore.fr/match/abc/"
        );
        assert_eq!(
            absolute_url("https://www.flashscore.fr/", "https://www.flashscore.fr/match/abc/"),
            "https://www.flashscore.fr/match/abc/"
        );
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(0.52), "0.52");
        assert_eq!(format_number(-1.0), "-1");
    }
}
