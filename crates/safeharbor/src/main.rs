//! `harbor` - CLI for safeharbor
//!
//! This binary inspects saved report drafts, runs the simulated submission and
//! drives the resources page slider and directory from the terminal.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use clap::Parser;

use safeharbor::cli::{
    CheckCommand, Cli, Command, ConfigCommand, DraftCommand, ResourcesCommand, SlidesCommand,
    SubmitCommand,
};
use safeharbor::form::fields::ReportFields;
use safeharbor::form::validate::Validator;
use safeharbor::form::{FormController, FormEvent, FormPage};
use safeharbor::slider::{SliderController, SliderEvent, SliderPage, ACTIVE_CLASS};
use safeharbor::storage::DraftStore;
use safeharbor::{
    init_logging, Config, DraftRecord, InMemoryDocument, ResourceDirectory, Scheduler, Storage,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    // Execute the command
    match cli.command {
        Command::Draft(draft_cmd) => handle_draft(&config, draft_cmd),
        Command::Check(check_cmd) => handle_check(&config, &check_cmd),
        Command::Submit(submit_cmd) => handle_submit(&config, &submit_cmd).await,
        Command::Slides(slides_cmd) => handle_slides(&config, &slides_cmd),
        Command::Resources(resources_cmd) => handle_resources(resources_cmd),
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

fn open_store(config: &Config) -> anyhow::Result<Storage> {
    let path = config.database_path();
    Storage::open(&path).with_context(|| format!("opening draft store {}", path.display()))
}

fn read_draft_file(path: &Path) -> anyhow::Result<DraftRecord> {
    let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    DraftRecord::from_json(&json).with_context(|| format!("parsing {}", path.display()))
}

/// Load a draft from `file`, or from the store under `form_id`.
fn load_draft(
    config: &Config,
    file: Option<&Path>,
    form_id: &str,
) -> anyhow::Result<DraftRecord> {
    if let Some(path) = file {
        return read_draft_file(path);
    }
    let store = open_store(config)?;
    match store.load(form_id)? {
        Some(record) => Ok(record),
        None => bail!("no draft stored for form '{form_id}'"),
    }
}

fn handle_draft(config: &Config, cmd: DraftCommand) -> anyhow::Result<()> {
    let store = open_store(config)?;

    match cmd {
        DraftCommand::Show { form, json } => {
            let form_id = form.unwrap_or_else(|| config.form.form_id.clone());
            let Some(record) = store.load(&form_id)? else {
                println!("No draft stored for form '{form_id}'.");
                return Ok(());
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                println!("Draft for '{form_id}'");
                println!("---------------------");
                for (name, value) in record.iter() {
                    match value.as_text() {
                        Some(text) => println!("  {name:<18} {text}"),
                        None => println!("  {name:<18} {}", value.as_flag().unwrap_or_default()),
                    }
                }
            }
        }
        DraftCommand::List => {
            let drafts = store.list()?;
            if drafts.is_empty() {
                println!("No drafts stored.");
            }
            for draft in drafts {
                println!(
                    "{:<20} {}  {}",
                    draft.form_id,
                    draft.updated_at.format("%Y-%m-%d %H:%M:%S"),
                    &draft.record_hash[..12.min(draft.record_hash.len())]
                );
            }
        }
        DraftCommand::Clear { form } => {
            let form_id = form.unwrap_or_else(|| config.form.form_id.clone());
            if store.clear(&form_id)? {
                println!("Cleared draft for '{form_id}'.");
            } else {
                println!("No draft stored for form '{form_id}'.");
            }
        }
    }
    Ok(())
}

fn handle_check(config: &Config, cmd: &CheckCommand) -> anyhow::Result<()> {
    let form_id = cmd.form.as_deref().unwrap_or(&config.form.form_id);
    let record = load_draft(config, cmd.file.as_deref(), form_id)?;

    let mut fields = ReportFields::default();
    fields.restore(&record);

    let report = Validator::from_config(config)?.validate_all(&fields);
    if report.is_valid() {
        println!("Draft is ready to submit.");
        return Ok(());
    }

    for (field, message) in report.errors() {
        println!("  {field:<18} {message}");
    }
    bail!("{} field(s) need attention", report.errors().len())
}

async fn handle_submit(config: &Config, cmd: &SubmitCommand) -> anyhow::Result<()> {
    let form_id = cmd
        .form
        .clone()
        .unwrap_or_else(|| config.form.form_id.clone());

    // A draft file is submitted from a throwaway store, leaving the real one alone
    let store = match &cmd.file {
        Some(path) => {
            let store = Storage::open_in_memory()?;
            store.save(&form_id, &read_draft_file(path)?)?;
            store
        }
        None => open_store(config)?,
    };

    let mut form_config = config.clone();
    form_config.form.form_id = form_id;

    let (scheduler, mut events) = Scheduler::channel();
    let controller = FormController::from_config(store, &form_config)?;
    let mut page = FormPage::new(controller, InMemoryDocument::new(), scheduler, &form_config);

    // Restore the draft and press submit
    page.open();
    page.handle(FormEvent::Submit);

    if page.controller().phase().is_idle() {
        for (field, message) in page.controller().errors() {
            println!("  {field:<18} {message}");
        }
        bail!("submission blocked by validation");
    }
    println!("Submitting...");

    // Follow the timers through success and reset
    while let Some(event) = events.recv().await {
        let done = event == FormEvent::ResetElapsed;
        page.handle(event);

        if let Some(report_id) = page.controller().phase().report_id() {
            println!("Report submitted. Confirmation: {report_id}");
        }
        if done {
            println!("Form reset.");
            break;
        }
    }

    page.shutdown();
    Ok(())
}

fn handle_slides(config: &Config, cmd: &SlidesCommand) -> anyhow::Result<()> {
    let slider = SliderController::from_config("slides", cmd.panels, config)?;
    let (scheduler, _events) = Scheduler::channel();
    let mut page = SliderPage::new(
        slider,
        InMemoryDocument::new(),
        scheduler,
        config.auto_advance_interval(),
    );

    page.open();
    print_active(&page, "start");

    for step in &cmd.inputs {
        for input in step.inputs() {
            page.handle(SliderEvent::Input(input));
        }
        print_active(&page, &step.to_string());
    }

    page.shutdown();
    Ok(())
}

fn print_active(page: &SliderPage<InMemoryDocument>, label: &str) {
    let state = page.controller().state();
    println!(
        "{label:<14} -> panel {}/{}  [{}]",
        state.current() + 1,
        state.count(),
        page.document().elements_with_class(ACTIVE_CLASS).join(" ")
    );
}

fn handle_resources(cmd: ResourcesCommand) -> anyhow::Result<()> {
    let (directory, shown) = match cmd {
        ResourcesCommand::Search { term, file } => {
            let mut directory = ResourceDirectory::from_file(&file)
                .with_context(|| format!("loading {}", file.display()))?;
            let shown = directory.search(&term);
            (directory, shown)
        }
        ResourcesCommand::Filter { category, file } => {
            let mut directory = ResourceDirectory::from_file(&file)
                .with_context(|| format!("loading {}", file.display()))?;
            let shown = directory.filter(&category);
            (directory, shown)
        }
    };

    for card in directory.visible_cards() {
        println!("{:<20} {} [{}]", card.id, card.title, card.categories.join(", "));
    }
    println!();
    println!("{shown} card(s) shown.");

    // Totals over the whole directory, not just the cards shown
    let counts = directory.category_counts();
    println!("Categories ({}):", counts.len());
    for (category, count) in counts {
        println!("  {category:<18} {count}");
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Form]");
                println!("  Form id:            {}", config.form.form_id);
                println!("  Submit delay (ms):  {}", config.form.submit_delay_ms);
                println!("  Reset delay (ms):   {}", config.form.reset_delay_ms);
                println!(
                    "  Min description:    {}",
                    config.form.min_description_length
                );
                println!(
                    "  Max description:    {}",
                    config.form.description_max_length
                );
                println!("  Format phone:       {}", config.form.format_phone);
                println!();
                println!("[Validation]");
                println!("  Email pattern:      {}", config.validation.email_pattern);
                println!("  Phone pattern:      {}", config.validation.phone_pattern);
                println!();
                println!("[Slider]");
                println!("  Auto-advance (ms):  {}", config.slider.auto_advance_ms);
                println!("  Swipe threshold:    {}", config.slider.swipe_threshold_px);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
