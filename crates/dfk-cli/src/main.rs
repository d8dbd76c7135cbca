use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use dfk_core::{Day, MAX_NO_REPEAT_DAYS, OptionId};
use dfk_store::{AppStore, Category, DailyPick, OptionDraft, OptionUpdate, PickRecord, parse_tag_list};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "dfk", about = "Daily picks without the decision fatigue")]
struct Cli {
    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    /// Act as if today were this day (YYYY-MM-DD)
    #[arg(long, global = true)]
    date: Option<Day>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show today's pick for every category, drawing any that are missing
    Today {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Throw away today's pick for a category and draw again
    Reroll { category: String },

    /// Pick an option yourself for today
    Choose { category: String, option: String },

    /// Show past picks for a category, newest first
    History {
        category: String,

        /// Show at most this many picks
        #[arg(long)]
        limit: Option<NonZeroUsize>,
    },

    /// List categories
    Categories,

    /// Manage categories
    #[command(name = "category", subcommand)]
    CategoryCmd(CategoryAction),

    /// List the options of a category
    Options { category: String },

    /// Manage options
    #[command(name = "option", subcommand)]
    OptionCmd(OptionAction),

    /// Show no-repeat windows, or set one: `settings <category> <days>`
    Settings {
        category: Option<String>,

        #[arg(requires = "category")]
        days: Option<u32>,
    },

    /// Forget every past pick of a category
    ResetHistory { category: String },

    /// Delete all data and restore the starter categories
    ResetAll {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum CategoryAction {
    /// Add a category with the configured default window
    Add { name: String },
    /// Rename a category
    Rename { name: String, new_name: String },
    /// Remove a category with its options and history
    Remove { name: String },
}

#[derive(Subcommand)]
enum OptionAction {
    /// Add an option to a category
    Add {
        category: String,
        name: String,

        #[arg(long)]
        notes: Option<String>,

        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
    },
    /// Edit an option; only the given fields change
    Edit {
        category: String,
        name: String,

        /// New name
        #[arg(long = "name")]
        rename: Option<String>,

        #[arg(long)]
        notes: Option<String>,

        /// Comma-separated tags, replacing the current ones
        #[arg(long)]
        tags: Option<String>,

        /// Move the option to another category
        #[arg(long)]
        move_to: Option<String>,
    },
    /// Make an option eligible for picks again
    Enable { category: String, name: String },
    /// Keep an option but stop picking it
    Disable { category: String, name: String },
    /// Delete an option; its past picks stay in history
    Remove { category: String, name: String },
}

fn open_store() -> Result<AppStore> {
    let base_dir = std::env::var("DFK_DATA_DIR").ok().map(PathBuf::from);
    AppStore::open(base_dir.as_deref()).context("failed to open store")
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let app = open_store()?;
    let day = app.reference_day(cli.date);
    tracing::debug!(%day, base_dir = %app.base_dir().display(), "opened store");

    match &cli.command {
        Commands::Today { json } => cmd_today(&app, day, *json),
        Commands::Reroll { category } => cmd_reroll(&app, day, category),
        Commands::Choose { category, option } => cmd_choose(&app, day, category, option),
        Commands::History { category, limit } => cmd_history(&app, category, *limit),
        Commands::Categories => cmd_categories(&app),
        Commands::CategoryCmd(action) => cmd_category(&app, action),
        Commands::Options { category } => cmd_options(&app, category),
        Commands::OptionCmd(action) => cmd_option(&app, action),
        Commands::Settings { category, days } => {
            cmd_settings(&app, category.as_deref(), *days)
        }
        Commands::ResetHistory { category } => cmd_reset_history(&app, category),
        Commands::ResetAll { yes } => cmd_reset_all(&app, *yes),
    }
}

fn require_category(app: &AppStore, name: &str) -> Result<Category> {
    app.store()
        .require_category(name)
        .with_context(|| format!("unknown category '{name}'"))
}

fn format_tags(tags: &[String]) -> String {
    if tags.is_empty() {
        String::new()
    } else {
        format!(" [{}]", tags.join(", "))
    }
}

#[derive(Serialize)]
struct TodayEntry<'a> {
    category: &'a str,
    day: Day,
    option: Option<&'a str>,
    tags: &'a [String],
    notes: Option<&'a str>,
    reason: Option<&'a str>,
    source: Option<&'static str>,
}

impl<'a> TodayEntry<'a> {
    fn new(pick: &'a DailyPick, day: Day) -> Self {
        let record = pick.record.as_ref();
        Self {
            category: &pick.category.name,
            day,
            option: pick.option.as_ref().map(|o| o.name.as_str()),
            tags: pick.option.as_ref().map_or(&[][..], |o| o.tags.as_slice()),
            notes: pick.option.as_ref().and_then(|o| o.notes.as_deref()),
            reason: record.map(|r| r.reason.as_str()),
            source: record.map(|r| r.source.as_str()),
        }
    }
}

fn cmd_today(app: &AppStore, day: Day, json: bool) -> Result<()> {
    let picks = app
        .store()
        .today_picks(day)
        .context("failed to make today's picks")?;

    if json {
        let entries: Vec<TodayEntry> = picks.iter().map(|p| TodayEntry::new(p, day)).collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if picks.is_empty() {
        println!("No categories yet. Add one with `dfk category add <name>`.");
        return Ok(());
    }

    println!("{day}");
    for pick in &picks {
        match (&pick.record, &pick.option) {
            (Some(record), Some(option)) => {
                println!("{}: {}{}", pick.category.name, option.name, format_tags(&option.tags));
                println!("  {}", record.reason);
            }
            (Some(record), None) => {
                println!("{}: (deleted option)", pick.category.name);
                println!("  {}", record.reason);
            }
            (None, _) => println!("{}: No options available", pick.category.name),
        }
    }
    Ok(())
}

fn print_pick(app: &AppStore, category: &Category, record: &PickRecord) -> Result<()> {
    let option = match record.option_id {
        Some(id) => app.store().option(id)?,
        None => None,
    };
    let name = option.as_ref().map_or("(deleted option)", |o| o.name.as_str());
    let tags = option.as_ref().map_or(String::new(), |o| format_tags(&o.tags));
    println!("{}: {name}{tags}", category.name);
    println!("  {}", record.reason);
    Ok(())
}

fn cmd_reroll(app: &AppStore, day: Day, category: &str) -> Result<()> {
    let category = require_category(app, category)?;
    match app
        .store()
        .reroll(&category, day)
        .context("failed to re-roll")?
    {
        Some(record) => print_pick(app, &category, &record),
        None => {
            println!("{}: No options available", category.name);
            Ok(())
        }
    }
}

fn cmd_choose(app: &AppStore, day: Day, category: &str, option: &str) -> Result<()> {
    let category = require_category(app, category)?;
    let option = app.store().require_option(&category, option)?;
    let record = app
        .store()
        .choose_manually(&category, option.id, day)
        .context("failed to record choice")?;
    print_pick(app, &category, &record)
}

fn cmd_history(app: &AppStore, category: &str, limit: Option<NonZeroUsize>) -> Result<()> {
    let category = require_category(app, category)?;
    let records = app
        .store()
        .history_for_category(category.id, limit.map(NonZeroUsize::get))
        .context("failed to read history")?;
    if records.is_empty() {
        println!("(no picks yet)");
        return Ok(());
    }

    // Options moved to another category keep their past picks here.
    let mut names: HashMap<OptionId, Option<String>> = HashMap::new();
    for record in &records {
        let name = match record.option_id {
            Some(id) => match names.entry(id) {
                Entry::Occupied(e) => e.into_mut().as_deref(),
                Entry::Vacant(e) => e.insert(app.store().option(id)?.map(|o| o.name)).as_deref(),
            },
            None => None,
        };
        let name = name.unwrap_or("(deleted option)");
        println!(
            "{}  {:<20} {:<7} {}",
            record.day,
            name,
            record.source.as_str(),
            record.reason
        );
    }
    Ok(())
}

fn cmd_categories(app: &AppStore) -> Result<()> {
    let categories = app.store().list_categories()?;
    if categories.is_empty() {
        println!("(no categories)");
    }
    for category in &categories {
        let options = app.store().list_options(category.id)?;
        let enabled = options.iter().filter(|o| o.is_enabled).count();
        println!(
            "{}  ({enabled}/{} options enabled, no repeats in {} days)",
            category.name,
            options.len(),
            category.no_repeat_days
        );
    }
    Ok(())
}

fn cmd_category(app: &AppStore, action: &CategoryAction) -> Result<()> {
    match action {
        CategoryAction::Add { name } => {
            let category = app.add_category(name).context("failed to add category")?;
            println!("added category '{}'", category.name);
        }
        CategoryAction::Rename { name, new_name } => {
            let category = require_category(app, name)?;
            let renamed = app
                .store()
                .rename_category(category.id, new_name)
                .context("failed to rename category")?;
            println!("renamed '{}' to '{}'", category.name, renamed.name);
        }
        CategoryAction::Remove { name } => {
            let category = require_category(app, name)?;
            app.store()
                .remove_category(category.id)
                .context("failed to remove category")?;
            println!("removed category '{}'", category.name);
        }
    }
    Ok(())
}

fn cmd_options(app: &AppStore, category: &str) -> Result<()> {
    let category = require_category(app, category)?;
    let options = app.store().list_options(category.id)?;
    if options.is_empty() {
        println!("(no options)");
    }
    for option in &options {
        let state = if option.is_enabled { "" } else { " (disabled)" };
        println!("{}{}{state}", option.name, format_tags(&option.tags));
        if let Some(notes) = &option.notes {
            println!("  {notes}");
        }
    }
    Ok(())
}

fn cmd_option(app: &AppStore, action: &OptionAction) -> Result<()> {
    let store = app.store();
    match action {
        OptionAction::Add {
            category,
            name,
            notes,
            tags,
        } => {
            let category = require_category(app, category)?;
            let mut draft = OptionDraft::new(name);
            if let Some(notes) = notes {
                draft = draft.with_notes(notes);
            }
            if let Some(tags) = tags {
                draft = draft.with_tags(&parse_tag_list(tags));
            }
            let option = store
                .add_option(category.id, &draft)
                .context("failed to add option")?;
            println!("added '{}' to '{}'", option.name, category.name);
        }
        OptionAction::Edit {
            category,
            name,
            rename,
            notes,
            tags,
            move_to,
        } => {
            let category = require_category(app, category)?;
            let option = store.require_option(&category, name)?;
            let target = move_to
                .as_deref()
                .map(|name| require_category(app, name))
                .transpose()?;
            let update = OptionUpdate {
                name: rename.clone(),
                notes: notes.clone(),
                tags: tags.as_deref().map(parse_tag_list),
                category_id: target.as_ref().map(|c| c.id),
            };
            let updated = store
                .update_option(option.id, &update)
                .context("failed to edit option")?;
            let home = target.as_ref().unwrap_or(&category);
            println!("updated '{}' in '{}'", updated.name, home.name);
        }
        OptionAction::Enable { category, name } | OptionAction::Disable { category, name } => {
            let enable = matches!(action, OptionAction::Enable { .. });
            let category = require_category(app, category)?;
            let option = store.require_option(&category, name)?;
            store.set_option_enabled(option.id, enable)?;
            let state = if enable { "enabled" } else { "disabled" };
            println!("{state} '{}'", option.name);
        }
        OptionAction::Remove { category, name } => {
            let category = require_category(app, category)?;
            let option = store.require_option(&category, name)?;
            store
                .remove_option(option.id)
                .context("failed to remove option")?;
            println!("removed '{}' from '{}'", option.name, category.name);
        }
    }
    Ok(())
}

fn cmd_settings(app: &AppStore, category: Option<&str>, days: Option<u32>) -> Result<()> {
    match (category, days) {
        (Some(name), Some(days)) => {
            if days > MAX_NO_REPEAT_DAYS {
                bail!("days must be between 0 and {MAX_NO_REPEAT_DAYS}, got {days}");
            }
            let category = require_category(app, name)?;
            app.store()
                .set_no_repeat_days(category.id, days)
                .context("failed to update setting")?;
            println!("{}: no repeats in {days} days", category.name);
        }
        (Some(name), None) => {
            let category = require_category(app, name)?;
            println!("{}: no repeats in {} days", category.name, category.no_repeat_days);
        }
        (None, _) => {
            for category in app.store().list_categories()? {
                println!("{}: no repeats in {} days", category.name, category.no_repeat_days);
            }
        }
    }
    Ok(())
}

fn cmd_reset_history(app: &AppStore, category: &str) -> Result<()> {
    let category = require_category(app, category)?;
    let removed = app
        .store()
        .clear_history(category.id)
        .context("failed to clear history")?;
    println!("cleared {removed} picks from '{}'", category.name);
    Ok(())
}

fn cmd_reset_all(app: &AppStore, yes: bool) -> Result<()> {
    if !yes {
        bail!("this deletes every category, option and pick; pass --yes to confirm");
    }
    app.reset_all().context("failed to reset")?;
    println!("all data reset to the starter categories");
    Ok(())
}
