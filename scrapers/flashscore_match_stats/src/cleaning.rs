use polars::prelude::*;
use tracing::{debug, info};

use crate::{error::TableError, table, types::Outcome};

/// Statistics the site renders for some matches only and the model never uses.
pub const IRRELEVANT_STATS: &[&str] = &[
    "Buts_attendus_(xG)",
    "xG_sur_le_cadre_(xGOT)",
    "Grosses_occasions",
    "Touches_dans_la_surface_adverse",
    "Tirs_dans_la_surface",
    "Tirs_en_dehors_de_la_surface",
    "Frappes_sur_le_poteau",
    "Passes_dans_le_dernier_tiers",
    "Passes_longues",
    "Centres",
    "Touches",
    "Tacles",
    "Duels_gagnés",
    "Dégagements",
    "Interceptions",
    "Erreurs_menant_à_un_tir",
    "Erreurs_menant_à_un_but",
    "Buts_évités",
    "Rentrées_de_touche",
];

/// Card counts are only rendered when non-zero.
pub const CARD_COLUMNS: &[&str] = &[
    "Cartons_Jaunes_home",
    "Cartons_Jaunes_away",
    "Cartons_Rouges_home",
    "Cartons_Rouges_away",
];

pub const POSSESSION_COLUMNS: &[&str] = &["Possession_de_balle_home", "Possession_de_balle_away"];

pub const PASS_ACCURACY_COLUMNS: &[&str] = &["Passes_home", "Passes_away"];

pub const SCORE_HOME: &str = "score_home";
pub const SCORE_AWAY: &str = "score_away";
pub const OUTCOME: &str = "outcome";

/// Model inputs, in the order they are fed to the network.
pub const FEATURES: &[&str] = &[
    "Possession_de_balle_home",
    "Possession_de_balle_away",
    "Tirs_au_but_home",
    "Tirs_au_but_away",
    "Tirs_cadrés_home",
    "Tirs_cadrés_away",
    "Tirs_non_cadrés_home",
    "Tirs_non_cadrés_away",
    "Tirs_bloqués_home",
    "Tirs_bloqués_away",
    "Corners_home",
    "Corners_away",
    "Sauvetages_du_gardien_home",
    "Sauvetages_du_gardien_away",
    "Coup_francs_home",
    "Coup_francs_away",
    "Hors-jeu_home",
    "Hors-jeu_away",
    "Fautes_home",
    "Fautes_away",
    "Cartons_Jaunes_home",
    "Cartons_Jaunes_away",
    "Passes_home",
    "Passes_away",
    "Cartons_Rouges_home",
    "Cartons_Rouges_away",
    "halftime_home",
    "halftime_away",
];

/// Columns coerced to numbers before the outcome is derived.
pub fn numeric_columns() -> Vec<&'static str> {
    FEATURES
        .iter()
        .copied()
        .filter(|c| !POSSESSION_COLUMNS.contains(c) && !PASS_ACCURACY_COLUMNS.contains(c))
        .chain([SCORE_HOME, SCORE_AWAY])
        .collect()
}

/// Every deny-listed statistic expanded to its home/away columns.
pub fn irrelevant_columns() -> Vec<String> {
    IRRELEVANT_STATS
        .iter()
        .flat_map(|stat| [format!("{stat}_home"), format!("{stat}_away")])
        .collect()
}

/// Deny-list drop, card null-fill, strict incomplete-row drop.
pub fn clean(frame: DataFrame) -> Result<DataFrame, TableError> {
    let before = frame.height();
    let frame = table::drop_columns(&frame, &irrelevant_columns())?;
    let fills: Vec<Expr> = CARD_COLUMNS
        .iter()
        .filter(|c| table::has_column(&frame, c))
        .map(|c| col(*c).fill_null(lit("0")))
        .collect();

    let cleaned = frame.lazy().with_columns(fills).drop_nulls(None).collect()?;
    info!(
        "Cleaning dropped {} incomplete rows, {} remain",
        before - cleaned.height(),
        cleaned.height()
    );
    Ok(cleaned)
}

/// Percentage conversion, numeric coercion and outcome derivation.
pub fn prepare_for_model(frame: DataFrame) -> Result<DataFrame, TableError> {
    let index_columns: Vec<String> = table::column_names(&frame)
        .into_iter()
        .filter(|c| is_index_column(c))
        .collect();
    let frame = table::drop_columns(&frame, &index_columns)?;

    let conversions: Vec<Expr> = POSSESSION_COLUMNS
        .iter()
        .filter(|c| table::has_column(&frame, c))
        .map(|c| percent_fraction(c))
        .chain(
            PASS_ACCURACY_COLUMNS
                .iter()
                .filter(|c| table::has_column(&frame, c))
                .map(|c| pass_accuracy(c)),
        )
        .chain(
            numeric_columns()
                .into_iter()
                .filter(|c| table::has_column(&frame, c))
                .map(numeric),
        )
        .collect();
    let scored = table::has_column(&frame, SCORE_HOME) && table::has_column(&frame, SCORE_AWAY);

    let prepared = frame.lazy().with_columns(conversions);
    let prepared = if scored {
        prepared.with_column(outcome())
    } else {
        debug!("Score columns absent, no outcome derived");
        prepared
    };
    Ok(prepared.collect()?)
}

/// Model-ready export: features and label only.
pub fn model_ready(frame: DataFrame) -> Result<DataFrame, TableError> {
    let prepared = prepare_for_model(frame)?;
    let mut columns: Vec<&str> = FEATURES.to_vec();
    columns.push(OUTCOME);
    table::select(&prepared, &columns)
}

fn is_index_column(name: &str) -> bool {
    name.trim().is_empty() || name.starts_with("Unnamed")
}

const PERCENT_PATTERN: &str = r"(\d+(?:\.\d+)?)%";

/// `"52%"` becomes `0.52`; text without a trailing `%` is parsed as a number.
pub fn percent_fraction(column: &str) -> Expr {
    when(col(column).str().ends_with(lit("%")))
        .then(col(column).str().strip_suffix(lit("%")).cast(DataType::Float64) / lit(100.0))
        .otherwise(col(column).cast(DataType::Float64))
        .alias(column)
}

/// First `<digits>%` found anywhere in the text, as a fraction.
pub fn pass_accuracy(column: &str) -> Expr {
    (col(column).str().extract(lit(PERCENT_PATTERN), 1).cast(DataType::Float64) / lit(100.0)).alias(column)
}

/// Non-strict cast; anything unparseable becomes null.
pub fn numeric(column: &str) -> Expr {
    col(column).cast(DataType::Float64)
}

/// `outcome` from the two numeric full-time score columns, null when either is.
pub fn outcome() -> Expr {
    let (home, away) = (col(SCORE_HOME), col(SCORE_AWAY));
    when(home.clone().gt(away.clone()))
        .then(lit(Outcome::HomeWin.label() as i64))
        .when(home.clone().eq(away.clone()))
        .then(lit(Outcome::Draw.label() as i64))
        .when(home.lt(away))
        .then(lit(Outcome::AwayWin.label() as i64))
        .otherwise(lit(Null {}))
        .cast(DataType::Int64)
        .alias(OUTCOME)
}
