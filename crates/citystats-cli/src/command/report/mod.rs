//! Report command
//!
//! Loads the session and city snapshots, computes every view through the
//! cache and prints the results as Markdown-ready tables.

mod format;

use std::{
    collections::BTreeSet,
    io::{self, Write},
    path::PathBuf,
};

use anyhow::Context as _;
use citystats_analysis::{
    aggregate::{self, MIN_NATIONALITY_SESSIONS, NationalityStats},
    cache::ViewCache,
    context::{AnalysisContext, ForcePolicy, Snapshot, ViewName},
    expected,
    record::City,
    store::{DataPaths, RecordStore},
};
use clap::Args;
use log::info;

use crate::command::table::Table;

/// Nationalities with at least this many sessions get a full listing.
const LARGE_NATIONALITY_SESSIONS: usize = 1_000;
const RANKING_ROWS: usize = 10;
/// Share of sessions (observed or expected) for the "at least 10%" popularity tables.
const NOTABLE_SHARE: f64 = 0.1;
const LARGE_CITY_POPULATION: u64 = 100_000;

#[derive(Debug, Clone, Args)]
pub(crate) struct ReportArg {
    /// Directory holding sessions.json, cities_with_counts.json and results.json
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Session file (defaults to <DATA_DIR>/sessions.json)
    #[arg(long)]
    pub sessions: Option<PathBuf>,

    /// City file (defaults to <DATA_DIR>/cities_with_counts.json)
    #[arg(long)]
    pub cities: Option<PathBuf>,

    /// Cache file (defaults to <DATA_DIR>/results.json)
    #[arg(long)]
    pub cache: Option<PathBuf>,

    /// Keep sessions with fewer than ten guesses
    #[arg(long)]
    pub include_small: bool,

    /// Views to recompute even if cached (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub force: Vec<ViewName>,

    /// Recompute every view
    #[arg(long, conflicts_with = "force")]
    pub force_all: bool,

    /// Derive missing expected counts from population
    #[arg(long)]
    pub derive_expected: bool,

    /// Do not write the cache back after the run
    #[arg(long)]
    pub no_write_cache: bool,
}

impl Default for ReportArg {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            sessions: None,
            cities: None,
            cache: None,
            include_small: false,
            force: vec![],
            force_all: false,
            derive_expected: false,
            no_write_cache: false,
        }
    }
}

impl ReportArg {
    fn paths(&self) -> DataPaths {
        let defaults = DataPaths::in_dir(&self.data_dir);
        DataPaths {
            sessions: self.sessions.clone().unwrap_or(defaults.sessions),
            cities: self.cities.clone().unwrap_or(defaults.cities),
            cache: self.cache.clone().unwrap_or(defaults.cache),
        }
    }

    fn force_policy(&self) -> ForcePolicy {
        if self.force_all {
            ForcePolicy::All
        } else if self.force.is_empty() {
            ForcePolicy::Never
        } else {
            ForcePolicy::Views(self.force.iter().copied().collect::<BTreeSet<_>>())
        }
    }
}

pub(crate) fn run(arg: &ReportArg) -> anyhow::Result<()> {
    let paths = arg.paths();
    let store = RecordStore::new(paths.clone());
    let mut snapshot =
        Snapshot::load(&store, !arg.include_small).context("Failed to load the record snapshot")?;
    if arg.derive_expected {
        let filled = expected::EUROPE.fill_missing(&mut snapshot.cities);
        info!("Derived expected counts for {filled} cities");
    }

    let mut cache = ViewCache::load(&paths.cache);
    let mut context = AnalysisContext::new(&snapshot, &mut cache, arg.force_policy());
    let mut out = io::stdout().lock();
    write_report(&mut out, &mut context)?;
    out.flush().context("Failed to flush report")?;

    if !arg.no_write_cache {
        cache
            .save(&paths.cache)
            .context("Failed to persist the view cache")?;
    }
    Ok(())
}

/// Writes every report section in publication order.
pub(crate) fn write_report<W>(out: &mut W, context: &mut AnalysisContext) -> anyhow::Result<()>
where
    W: Write,
{
    write_overview(out, context.snapshot)?;
    write_percentiles(out, context)?;
    write_nationalities(out, context)?;
    write_best_countries_by_nationality(out, context)?;
    write_best_known_cities(out, context)?;
    write_letters(out, context)?;
    write_popularity(out, context)?;
    write_forgotten(out, context)?;
    Ok(())
}

fn section_break<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out)
}

fn city_share(snapshot: &Snapshot, city: &City) -> String {
    #[expect(clippy::cast_precision_loss)]
    let guesses = city.count as f64;
    format::percent(snapshot.guess_share(guesses))
}

fn city_table<'a, W, I>(out: &mut W, snapshot: &Snapshot, cities: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a City>,
{
    let mut table = Table::new(["rank", "city", "percentage"]);
    for (i, city) in cities.into_iter().enumerate() {
        table.push_row([
            (i + 1).to_string(),
            city.display_name(),
            city_share(snapshot, city),
        ]);
    }
    write!(out, "{table}")
}

fn write_overview<W: Write>(out: &mut W, snapshot: &Snapshot) -> io::Result<()> {
    let summary = aggregate::summary(snapshot);
    writeln!(out, "Total sessions: {}", format::thousands(summary.sessions))?;
    writeln!(
        out,
        "Total sessions with IP: {}",
        format::thousands(summary.with_ip)
    )?;
    writeln!(
        out,
        "Total sessions with country: {}",
        format::thousands(summary.with_country)
    )?;
    writeln!(
        out,
        "Total sessions with time: {}",
        format::thousands(summary.with_time)
    )?;
    if let Some(durations) = aggregate::session_durations(snapshot) {
        writeln!(out, "Median time: {}", format::duration(durations.median))?;
        writeln!(out, "Maximum time: {}", format::duration(durations.max))?;
    }
    Ok(())
}

fn write_percentiles<W: Write>(out: &mut W, context: &mut AnalysisContext) -> anyhow::Result<()> {
    let percentiles = context.percentiles()?;
    let score = |rank: u8| {
        percentiles
            .get(rank)
            .map_or_else(|| "n/a".to_owned(), |v| format::round(v).to_string())
    };

    section_break(out)?;
    writeln!(out, "Median: {}", score(50))?;
    writeln!(out, "25th percentile: {}", score(25))?;
    writeln!(out, "75th percentile: {}", score(75))?;

    let mut deciles = Table::new(["percentile", "score"]);
    for rank in (10..=90).rev().step_by(10) {
        let label = if rank == 50 {
            format!("{rank} (median)")
        } else {
            rank.to_string()
        };
        deciles.push_row([label, score(rank)]);
    }
    section_break(out)?;
    write!(out, "{deciles}")?;

    let mut top = Table::new(["percentile", "score"]);
    for rank in (90..=99).rev() {
        top.push_row([rank.to_string(), score(rank)]);
    }
    section_break(out)?;
    write!(out, "{top}")?;
    Ok(())
}

fn nationality_table<'a, I>(rows: I) -> Table
where
    I: IntoIterator<Item = &'a (&'a str, NationalityStats)>,
{
    let mut table = Table::new(["rank", "country", "median score", "total plays"]);
    for (i, (country, stats)) in rows.into_iter().enumerate() {
        table.push_row([
            (i + 1).to_string(),
            (*country).to_owned(),
            format::round(stats.median).to_string(),
            format::thousands(stats.sessions),
        ]);
    }
    table
}

fn write_nationalities<W: Write>(
    out: &mut W,
    context: &mut AnalysisContext,
) -> anyhow::Result<()> {
    let nationalities = context.nationalities()?;
    let ranked = aggregate::rank_nationalities(&nationalities, MIN_NATIONALITY_SESSIONS);
    let large = aggregate::rank_nationalities(&nationalities, LARGE_NATIONALITY_SESSIONS);
    let sections = [
        (
            format!("Best countries by median score ({MIN_NATIONALITY_SESSIONS}+ scores)"),
            nationality_table(ranked.iter().rev().take(RANKING_ROWS)),
        ),
        (
            format!("Worst countries by median score ({MIN_NATIONALITY_SESSIONS}+ scores)"),
            nationality_table(ranked.iter().take(RANKING_ROWS)),
        ),
        (
            format!(
                "All countries by median score ({}+ scores)",
                format::thousands(LARGE_NATIONALITY_SESSIONS)
            ),
            nationality_table(&large),
        ),
    ];
    for (title, table) in sections {
        section_break(out)?;
        writeln!(out, "{title}")?;
        write!(out, "{table}")?;
        writeln!(out, "NOTE: Fix ranks for equal nations when pasting into post.")?;
    }
    Ok(())
}

fn write_best_countries_by_nationality<W: Write>(
    out: &mut W,
    context: &mut AnalysisContext,
) -> anyhow::Result<()> {
    let best = context.best_countries_by_nationality()?;
    section_break(out)?;
    writeln!(out, "Best countries by nationality")?;
    for (nationality, shares) in &best {
        let listed: Vec<String> = shares
            .iter()
            .map(|share| format!("{} ({:.1})", share.country, share.share))
            .collect();
        writeln!(out, "- {nationality}: {}", listed.join(", "))?;
    }
    Ok(())
}

fn write_best_known_cities<W: Write>(
    out: &mut W,
    context: &mut AnalysisContext,
) -> anyhow::Result<()> {
    let best_known = context.best_known_cities()?;
    section_break(out)?;
    writeln!(out, "Best known cities")?;
    city_table(out, context.snapshot, &best_known)?;
    Ok(())
}

fn write_letters<W: Write>(out: &mut W, context: &mut AnalysisContext) -> anyhow::Result<()> {
    let best_known = context.best_known_cities_by_letter()?;
    let biggest = context.biggest_cities_by_letter()?;
    let snapshot = context.snapshot;

    let mut table = Table::new(["letter", "city", "percentage"]);
    let mut winners = Vec::with_capacity(best_known.len());
    for (&letter, ranking) in &best_known {
        let city = ranking.resolve(letter)?;
        table.push_row([
            format!("**{letter}**"),
            city.display_name(),
            city_share(snapshot, city),
        ]);
        winners.push((letter, city));
    }
    section_break(out)?;
    write!(out, "{table}")?;

    section_break(out)?;
    writeln!(
        out,
        "Biggest cities that are not the best known for their letter:"
    )?;
    for (letter, best) in winners {
        let Some(big) = biggest.get(&letter) else {
            continue;
        };
        if big.code == best.code {
            continue;
        }
        writeln!(
            out,
            "- {} ({}, {}) beats **{}** ({}, {})",
            best.display_name(),
            city_share(snapshot, best),
            format::thousands(best.population),
            big.display_name(),
            city_share(snapshot, big),
            format::thousands(big.population),
        )?;
    }
    Ok(())
}

fn popularity_table<'a, I>(snapshot: &Snapshot, cities: I) -> Table
where
    I: IntoIterator<Item = &'a City>,
{
    let mut table = Table::new([
        "rank",
        "city",
        "population",
        "popularity",
        "expected popularity",
    ]);
    for (i, city) in cities.into_iter().enumerate() {
        let expected = city.known_expected_count().unwrap_or_default();
        table.push_row([
            (i + 1).to_string(),
            city.display_name(),
            format::thousands(city.population),
            city_share(snapshot, city),
            format::percent(snapshot.guess_share(expected)),
        ]);
    }
    table
}

fn write_popularity<W: Write>(out: &mut W, context: &mut AnalysisContext) -> anyhow::Result<()> {
    let ranked = context.cities_by_popularity()?;
    let snapshot = context.snapshot;
    #[expect(clippy::cast_precision_loss)]
    let observed_share = |city: &City| snapshot.guess_share(city.count as f64);
    let expected_share =
        |city: &City| snapshot.guess_share(city.known_expected_count().unwrap_or_default());

    let notable: Vec<&City> = ranked
        .iter()
        .filter(|&city| observed_share(city) >= NOTABLE_SHARE)
        .collect();
    let large: Vec<&City> = ranked
        .iter()
        .filter(|city| city.population >= LARGE_CITY_POPULATION)
        .collect();
    let expected_notable: Vec<&City> = ranked
        .iter()
        .filter(|&city| expected_share(city) >= NOTABLE_SHARE)
        .collect();

    let sections = [
        (
            "Surprisingly popular cities".to_owned(),
            popularity_table(snapshot, ranked.iter().rev().take(RANKING_ROWS)),
        ),
        (
            "Surprisingly popular cities (at least 10%)".to_owned(),
            popularity_table(snapshot, notable.iter().rev().take(RANKING_ROWS).copied()),
        ),
        (
            format!(
                "Surprisingly popular cities over {}",
                format::thousands(LARGE_CITY_POPULATION)
            ),
            popularity_table(snapshot, large.iter().rev().take(RANKING_ROWS).copied()),
        ),
        (
            "Surprisingly unpopular cities".to_owned(),
            popularity_table(snapshot, ranked.iter().take(RANKING_ROWS)),
        ),
        (
            "Surprisingly unpopular cities (at least 10% expected)".to_owned(),
            popularity_table(
                snapshot,
                expected_notable.iter().take(RANKING_ROWS).copied(),
            ),
        ),
    ];
    for (title, table) in sections {
        section_break(out)?;
        writeln!(out, "{title}")?;
        write!(out, "{table}")?;
    }
    Ok(())
}

fn write_forgotten<W: Write>(out: &mut W, context: &mut AnalysisContext) -> anyhow::Result<()> {
    let capitals = context.forgotten_capitals()?;
    section_break(out)?;
    writeln!(out, "Forgotten capitals")?;
    city_table(out, context.snapshot, &capitals)?;

    let countries = context.forgotten_countries()?;
    let mut table = Table::new(["rank", "country", "percentage"]);
    for (i, presence) in countries.iter().enumerate() {
        #[expect(clippy::cast_precision_loss)]
        let sessions = presence.sessions as f64;
        table.push_row([
            (i + 1).to_string(),
            presence.country.clone(),
            format::percent(context.snapshot.guess_share(sessions)),
        ]);
    }
    section_break(out)?;
    writeln!(out, "Forgotten countries")?;
    write!(out, "{table}")?;
    Ok(())
}
