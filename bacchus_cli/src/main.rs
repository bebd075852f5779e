use bacchus_core::units::{parse_unit, DISCLAIMER, LEGAL_LIMIT_PERCENT};
use bacchus_core::*;
use chrono::{DateTime, Duration, Local, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Drinks older than this cannot influence the estimate and are not loaded.
const HISTORY_WINDOW_DAYS: i64 = 7;

const CHART_ROWS: usize = 10;
const CHART_MARGIN: usize = 10;

#[derive(Parser)]
#[command(name = "bacchus")]
#[command(about = "Personal blood alcohol estimation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Store your physiological profile
    Setup {
        /// Body weight in kilograms
        #[arg(long)]
        weight_kg: f64,

        /// Biological sex (male, female)
        #[arg(long)]
        sex: String,
    },

    /// Log a drink
    Add(AddArgs),

    /// Show the current BAC estimate (default)
    Status {
        /// Evaluate this many minutes away from now (negative for the past)
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        at_offset_minutes: i64,

        /// Display unit (percent, gl)
        #[arg(long)]
        unit: Option<String>,
    },

    /// Chart the BAC curve around now
    Trend {
        /// Centre the window this many hours away from now
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        center_offset_hours: i64,

        /// Display unit (percent, gl)
        #[arg(long)]
        unit: Option<String>,
    },

    /// List recently logged drinks
    History {
        /// How many days back to look
        #[arg(long, default_value_t = HISTORY_WINDOW_DAYS)]
        days: i64,

        /// Show at most this many drinks
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Delete a drink from the active log by id
    Remove {
        /// Drink id as shown by `history`
        #[arg(long)]
        id: String,
    },

    /// Roll up WAL drinks to CSV
    Rollup {
        /// Clean up processed WAL files after rollup
        #[arg(long)]
        cleanup: bool,
    },
}

#[derive(Args)]
struct AddArgs {
    /// Drink name (defaults to the catalog name or "Drink")
    #[arg(long)]
    name: Option<String>,

    /// Pick name and strength from the built-in catalog
    #[arg(long, conflicts_with = "abv")]
    search: Option<String>,

    /// Volume of the alcoholic pour in millilitres
    #[arg(long)]
    volume_ml: Option<f64>,

    /// Serving preset (beers: small/half/bottle/pint/litre, shots: small/standard/large)
    #[arg(long, conflicts_with = "volume_ml")]
    preset: Option<String>,

    /// Alcohol by volume, in percent
    #[arg(long)]
    abv: Option<f64>,

    /// Drink kind (beer, wine, cocktail, spirit, other)
    #[arg(long)]
    kind: Option<String>,

    /// Mixer volume blended on top, in millilitres
    #[arg(long)]
    mixer_ml: Option<f64>,

    /// How many minutes ago the drink was consumed
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    ago_minutes: i64,

    /// Drinking pace for the time-to-finish estimate (slow, average, fast)
    #[arg(long, default_value = "average")]
    pace: String,
}

fn main() -> Result<()> {
    // Initialize logging
    bacchus_core::logging::init();

    let cli = Cli::parse();

    // Determine data directory
    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    tracing::debug!("Using data directory {:?}", data_dir);

    match cli.command {
        Some(Commands::Setup { weight_kg, sex }) => cmd_setup(data_dir, weight_kg, sex),
        Some(Commands::Add(args)) => cmd_add(data_dir, &config, args),
        Some(Commands::Status {
            at_offset_minutes,
            unit,
        }) => cmd_status(data_dir, &config, at_offset_minutes, unit),
        Some(Commands::Trend {
            center_offset_hours,
            unit,
        }) => cmd_trend(data_dir, &config, center_offset_hours, unit),
        Some(Commands::History { days, limit }) => cmd_history(data_dir, days, limit),
        Some(Commands::Remove { id }) => cmd_remove(data_dir, id),
        Some(Commands::Rollup { cleanup }) => cmd_rollup(data_dir, cleanup),
        None => {
            // Default to "status" command
            cmd_status(data_dir, &config, 0, None)
        }
    }
}

/// Well-known file locations under the data directory
struct DataPaths {
    wal_dir: PathBuf,
    wal_path: PathBuf,
    csv_path: PathBuf,
    profile_path: PathBuf,
}

impl DataPaths {
    fn resolve(data_dir: &Path) -> Self {
        let wal_dir = data_dir.join("wal");
        DataPaths {
            wal_path: wal_dir.join("drink_log.wal"),
            csv_path: data_dir.join("drinks.csv"),
            profile_path: data_dir.join("profile.json"),
            wal_dir,
        }
    }
}

fn check_config(config: &Config) -> Result<()> {
    let errors = config.validate();
    if !errors.is_empty() {
        eprintln!("Configuration validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::Config("Invalid configuration".into()));
    }
    Ok(())
}

fn cmd_setup(data_dir: PathBuf, weight_kg: f64, sex: String) -> Result<()> {
    if !weight_kg.is_finite() || weight_kg <= 0.0 {
        return Err(Error::Config(format!(
            "weight must be a positive number of kilograms, got {}",
            weight_kg
        )));
    }
    let sex = parse_sex(&sex)?;

    let paths = DataPaths::resolve(&data_dir);
    let profile = UserProfile {
        weight_kg,
        sex: sex.clone(),
        is_setup: true,
    };
    profile.save(&paths.profile_path)?;

    println!("\n✓ Profile saved");
    println!("  Weight: {} kg", weight_kg);
    println!("  Sex:    {}", sex_label(&sex));
    println!();
    Ok(())
}

fn cmd_add(data_dir: PathBuf, config: &Config, args: AddArgs) -> Result<()> {
    check_config(config)?;

    let catalog = get_default_catalog();
    let errors = catalog.validate();
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::CatalogValidation("Invalid catalog".into()));
    }

    let mut kind = args
        .kind
        .as_deref()
        .map(parse_kind)
        .unwrap_or(DrinkKind::Other);

    // Resolve name and strength, from the catalog or from flags
    let (name, abv) = if let Some(ref query) = args.search {
        let matches = catalog.search(query);
        let reference = matches
            .first()
            .ok_or_else(|| Error::InvalidDrink(format!("no catalog entry matches '{}'", query)))?;
        if matches.len() > 1 {
            eprintln!(
                "{} catalog entries match '{}', using {}",
                matches.len(),
                query,
                reference.name
            );
        }
        kind = reference.kind.clone();
        let name = args.name.clone().unwrap_or_else(|| reference.name.clone());
        (name, reference.abv)
    } else {
        let abv = args
            .abv
            .ok_or_else(|| Error::InvalidDrink("either --abv or --search is required".into()))?;
        (args.name.clone().unwrap_or_else(|| "Drink".into()), abv)
    };

    // Resolve the pour size
    let volume_ml = if let Some(v) = args.volume_ml {
        v
    } else if let Some(ref label) = args.preset {
        catalog
            .find_preset(&kind, label)
            .map(|p| p.ml)
            .ok_or_else(|| {
                Error::InvalidDrink(format!("no {} preset named '{}'", kind.label(), label))
            })?
    } else {
        return Err(Error::InvalidDrink(
            "either --volume-ml or --preset is required".into(),
        ));
    };

    let consumed_at = Utc::now() - Duration::minutes(args.ago_minutes);

    let mixer_ml = args.mixer_ml.unwrap_or(0.0);
    let drink = if mixer_ml > 0.0 {
        DrinkEvent::mixed(&name, volume_ml, abv, mixer_ml, consumed_at)
    } else {
        DrinkEvent::new(&name, volume_ml, abv, consumed_at)
    };
    let drink = drink.with_icon(kind.icon());

    if !drink.is_valid() {
        return Err(Error::InvalidDrink(format!(
            "{} ml at {}% ABV is not a loggable drink",
            drink.volume_ml, drink.abv
        )));
    }

    let paths = DataPaths::resolve(&data_dir);
    std::fs::create_dir_all(&paths.wal_dir)?;
    let mut sink = JsonlSink::new(&paths.wal_path);
    sink.append(&drink)?;

    println!(
        "\n✓ Logged {} {} - {} ml at {}% ABV",
        kind.icon(),
        drink.name,
        drink.volume_ml,
        drink.abv
    );

    let pace = parse_pace(&args.pace);
    let rate = bacchus_core::catalog::consumption_rate_ml_per_min(&kind, &pace);
    if rate > 0.0 {
        let minutes = (drink.volume_ml / rate).round() as i64;
        println!(
            "  Time to finish: ~{} min at {} pace",
            minutes.max(1),
            pace_label(&pace)
        );
    }

    // Show where that leaves things
    let now = Utc::now();
    let profile = UserProfile::load(&paths.profile_path)?;
    let drinks = load_recent_drinks(&paths.wal_path, &paths.csv_path, HISTORY_WINDOW_DAYS)?;
    let status = estimate_bac(&drinks, &profile, &config.model, now);
    display_status(&status, &resolve_unit(None, config), now);

    Ok(())
}

fn cmd_status(
    data_dir: PathBuf,
    config: &Config,
    at_offset_minutes: i64,
    unit: Option<String>,
) -> Result<()> {
    check_config(config)?;
    let paths = DataPaths::resolve(&data_dir);

    let profile = UserProfile::load(&paths.profile_path)?;
    let drinks = load_recent_drinks(&paths.wal_path, &paths.csv_path, HISTORY_WINDOW_DAYS)?;

    let at = Utc::now() + Duration::minutes(at_offset_minutes);
    let status = estimate_bac(&drinks, &profile, &config.model, at);

    display_status(&status, &resolve_unit(unit.as_deref(), config), at);
    Ok(())
}

fn cmd_trend(
    data_dir: PathBuf,
    config: &Config,
    center_offset_hours: i64,
    unit: Option<String>,
) -> Result<()> {
    check_config(config)?;
    let unit = resolve_unit(unit.as_deref(), config);
    let paths = DataPaths::resolve(&data_dir);

    let profile = UserProfile::load(&paths.profile_path)?;
    if !profile.is_complete() {
        display_setup_hint();
        return Ok(());
    }

    let drinks = load_recent_drinks(&paths.wal_path, &paths.csv_path, HISTORY_WINDOW_DAYS)?;

    let now = Utc::now();
    let center = now + Duration::hours(center_offset_hours);
    let points = sample_trend(&drinks, &profile, &config.model, &config.trend, center);

    display_trend(&points, now, &unit);
    Ok(())
}

fn cmd_history(data_dir: PathBuf, days: i64, limit: Option<usize>) -> Result<()> {
    let paths = DataPaths::resolve(&data_dir);
    let drinks = load_recent_drinks(&paths.wal_path, &paths.csv_path, days)?;

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  DRINK HISTORY (last {} days)", days);
    println!("╰─────────────────────────────────────────╯");
    println!();

    if drinks.is_empty() {
        println!("  No drinks logged.");
        println!();
        return Ok(());
    }

    let shown = limit.unwrap_or(drinks.len()).min(drinks.len());
    for drink in drinks.iter().take(shown) {
        let icon = drink.icon.as_deref().unwrap_or("🍺");
        println!(
            "  {} {} - {} ml at {}% ABV",
            icon, drink.name, drink.volume_ml, drink.abv
        );
        println!(
            "     {}  ·  id {}",
            drink.consumed_at.with_timezone(&Local).format("%H:%M %b %d"),
            drink.id
        );
    }
    println!();
    println!("  {} of {} drinks shown", shown, drinks.len());
    println!();
    Ok(())
}

fn cmd_remove(data_dir: PathBuf, id: String) -> Result<()> {
    let drink_id = Uuid::parse_str(&id)
        .map_err(|e| Error::InvalidDrink(format!("'{}' is not a drink id: {}", id, e)))?;

    let paths = DataPaths::resolve(&data_dir);
    let removed = bacchus_core::wal::remove_drink(&paths.wal_path, drink_id)?;

    if removed {
        println!("✓ Removed drink {}", drink_id);
    } else {
        println!(
            "No drink {} in the active log (archived drinks cannot be removed).",
            drink_id
        );
    }
    Ok(())
}

fn cmd_rollup(data_dir: PathBuf, cleanup: bool) -> Result<()> {
    let paths = DataPaths::resolve(&data_dir);

    if !paths.wal_path.exists() {
        println!("No WAL file found - nothing to roll up.");
        return Ok(());
    }

    let count =
        bacchus_core::csv_rollup::wal_to_csv_and_archive(&paths.wal_path, &paths.csv_path)?;

    println!("✓ Rolled up {} drinks to CSV", count);
    println!("  CSV: {}", paths.csv_path.display());

    if cleanup {
        let cleaned = bacchus_core::csv_rollup::cleanup_processed_wals(&paths.wal_dir)?;
        if cleaned > 0 {
            println!("✓ Cleaned up {} processed WAL files", cleaned);
        }
    }

    Ok(())
}

fn display_status(status: &BacStatus, unit: &BacUnit, at: DateTime<Utc>) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  BAC STATUS");
    println!("╰─────────────────────────────────────────╯");
    println!();

    if status.tier == BacTier::IncompleteProfile {
        println!("  Status: {}", status.tier.label());
        println!();
        println!("  Run `bacchus setup --weight-kg <kg> --sex <male|female>` first.");
        println!();
        return;
    }

    println!("  Level:  {}", unit.format_value(status.current_bac));
    println!("  Status: {}", status.tier.label());
    if let Some(sober_at) = status.sober_at {
        let minutes = (sober_at - at).num_minutes().max(0);
        println!(
            "  Sober:  {} (in {}h{:02})",
            sober_at.with_timezone(&Local).format("%H:%M"),
            minutes / 60,
            minutes % 60
        );
    }
    println!();
    println!("  {}", DISCLAIMER);
    println!();
}

fn display_setup_hint() {
    println!("\n  Status: {}", BacTier::IncompleteProfile.label());
    println!("  Run `bacchus setup --weight-kg <kg> --sex <male|female>` first.");
    println!();
}

fn display_trend(points: &[TrendPoint], now: DateTime<Utc>, unit: &BacUnit) {
    if points.is_empty() {
        return;
    }

    let start = points[0].at.with_timezone(&Local).format("%H:%M");
    let end = points[points.len() - 1]
        .at
        .with_timezone(&Local)
        .format("%H:%M");

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  BAC TREND  {} → {}", start, end);
    println!("╰─────────────────────────────────────────╯");
    println!();

    for line in render_trend_chart(points, now, unit) {
        println!("{}", line);
    }

    let now_col = column_nearest(points, now);
    println!();
    println!("  Now:   {}", unit.format_value(points[now_col].bac));
    if let Some(top) = peak(points) {
        if top.bac > 0.0 {
            let projected = if top.at > now { " (projected)" } else { "" };
            println!(
                "  Peak:  {} at {}{}",
                unit.format_value(top.bac),
                top.at.with_timezone(&Local).format("%H:%M"),
                projected
            );
        }
    }
    println!(
        "  Limit: {} (legal driving limit)",
        unit.format_value(LEGAL_LIMIT_PERCENT)
    );
    println!();
    println!("  {}", DISCLAIMER);
    println!();
}

/// Render the sampled curve as rows of bars, one column per sample.
///
/// The legal limit is drawn as a dashed guide line, the time axis marks the
/// `now` column, and everything right of it is projection.
fn render_trend_chart(points: &[TrendPoint], now: DateTime<Utc>, unit: &BacUnit) -> Vec<String> {
    let mut lines = Vec::new();

    let peak_bac = peak(points).map(|p| p.bac).unwrap_or(0.0);
    let max_value = (LEGAL_LIMIT_PERCENT * 1.5).max(peak_bac * 1.2);
    let limit_row = ((LEGAL_LIMIT_PERCENT / max_value) * CHART_ROWS as f64).round() as usize;
    let now_col = column_nearest(points, now);

    for row in (1..=CHART_ROWS).rev() {
        let threshold = max_value * row as f64 / CHART_ROWS as f64;
        let label = if row == CHART_ROWS {
            format!("{:.*}", unit.decimals(), unit.convert(max_value))
        } else if row == limit_row {
            format!("{:.*}", unit.decimals(), unit.convert(LEGAL_LIMIT_PERCENT))
        } else {
            String::new()
        };

        let mut line = format!("{:>8} │", label);
        for point in points {
            if point.bac >= threshold {
                line.push('█');
            } else if row == limit_row {
                line.push('┄');
            } else {
                line.push(' ');
            }
        }
        lines.push(line);
    }

    let mut axis = format!("{:>8} └", format!("{:.*}", unit.decimals(), 0.0));
    for (i, point) in points.iter().enumerate() {
        if i == now_col {
            axis.push('┼');
        } else if point.at <= now {
            axis.push('─');
        } else {
            axis.push('╌');
        }
    }
    lines.push(axis);

    // Time labels under the axis: start, now, end
    let width = CHART_MARGIN + points.len();
    let mut labels = vec![' '; width];
    let start = points[0].at.with_timezone(&Local).format("%H:%M").to_string();
    let end = points[points.len() - 1]
        .at
        .with_timezone(&Local)
        .format("%H:%M")
        .to_string();
    let now_text = format!("now {}", now.with_timezone(&Local).format("%H:%M"));

    place(&mut labels, CHART_MARGIN, &start);
    place(&mut labels, width.saturating_sub(end.chars().count()), &end);
    let centred = (CHART_MARGIN + now_col).saturating_sub(now_text.chars().count() / 2);
    place(
        &mut labels,
        centred.min(width.saturating_sub(now_text.chars().count())),
        &now_text,
    );

    lines.push(labels.into_iter().collect());
    lines
}

fn column_nearest(points: &[TrendPoint], at: DateTime<Utc>) -> usize {
    points
        .iter()
        .enumerate()
        .min_by_key(|(_, p)| (p.at - at).num_seconds().abs())
        .map(|(i, _)| i)
        .unwrap_or(0)
}

fn place(row: &mut [char], at: usize, text: &str) {
    for (i, ch) in text.chars().enumerate() {
        if let Some(slot) = row.get_mut(at + i) {
            *slot = ch;
        }
    }
}

fn resolve_unit(flag: Option<&str>, config: &Config) -> BacUnit {
    match flag {
        Some(s) => parse_unit(s).unwrap_or_else(|| {
            eprintln!("Unknown unit: {}. Using configured default.", s);
            config.display.unit.clone()
        }),
        None => config.display.unit.clone(),
    }
}

fn parse_sex(s: &str) -> Result<BiologicalSex> {
    match s.to_lowercase().as_str() {
        "male" | "m" => Ok(BiologicalSex::Male),
        "female" | "f" => Ok(BiologicalSex::Female),
        other => Err(Error::Config(format!(
            "Unknown sex: {} (expected male or female)",
            other
        ))),
    }
}

fn sex_label(sex: &BiologicalSex) -> &'static str {
    match sex {
        BiologicalSex::Male => "male",
        BiologicalSex::Female => "female",
    }
}

fn parse_kind(s: &str) -> DrinkKind {
    match s.to_lowercase().as_str() {
        "beer" => DrinkKind::Beer,
        "wine" => DrinkKind::Wine,
        "cocktail" => DrinkKind::Cocktail,
        "spirit" | "shot" => DrinkKind::Spirit,
        "other" => DrinkKind::Other,
        other => {
            eprintln!("Unknown kind: {}. Treating as 'other'.", other);
            DrinkKind::Other
        }
    }
}

fn parse_pace(s: &str) -> Pace {
    match s.to_lowercase().as_str() {
        "slow" => Pace::Slow,
        "average" => Pace::Average,
        "fast" => Pace::Fast,
        other => {
            eprintln!("Unknown pace: {}. Assuming average.", other);
            Pace::Average
        }
    }
}

fn pace_label(pace: &Pace) -> &'static str {
    match pace {
        Pace::Slow => "slow",
        Pace::Average => "average",
        Pace::Fast => "fast",
    }
}
