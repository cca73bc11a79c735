use anyhow::{anyhow, Result};

/// Where a league's results live on the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct League {
    pub key: &'static str,
    pub country: &'static str,
    pub slug: &'static str,
}

pub const LEAGUES: &[League] = &[
    League { key: "ligue-1", country: "france", slug: "ligue-1" },
    League { key: "premier-league", country: "angleterre", slug: "premier-league" },
    League { key: "laliga", country: "espagne", slug: "laliga" },
    League { key: "serie-a", country: "italie", slug: "serie-a" },
    League { key: "bundesliga", country: "allemagne", slug: "bundesliga" },
];

impl League {
    pub fn find(key: &str) -> Result<&'static League> {
        LEAGUES.iter().find(|l| l.key == key).ok_or_else(|| {
            let known: Vec<_> = LEAGUES.iter().map(|l| l.key).collect();
            anyhow!("Unknown league '{}' (known: {})", key, known.join(", "))
        })
    }

    /// Results-listing URL for the season starting in `year`.
    pub fn season_url(&self, base_url: &str, year: i32, latest_season: i32) -> String {
        let slug = if year == latest_season {
            self.slug.to_string()
        } else {
            format!("{}-{}", self.slug, season_label(year))
        };
        format!(
            "{}/football/{}/{}/resultats/",
            base_url.trim_end_matches('/'),
            self.country,
            slug
        )
    }
}

pub fn season_label(year: i32) -> String {
    format!("{}-{}", year, year + 1)
}
