//! Command-line interface of the console.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    ContentItem, ContentRecord, ExtendedContentType, GrammarRule, LexiconEntry, PublishingData,
    Scenario,
};
use crate::publishing::{RuleSet, generate_slug};
use crate::settings::Locale;
use crate::state::AppState;
use crate::storage::Collection;
use crate::structured_data::{
    JsonLdSource, all_templates, apply_template_with_data, generate_jsonld, generate_script_tag,
    get_template_by_id, get_templates_for_content_type, record_structured_data,
    validate_template_data,
};
use crate::workflow::PublishOutcome;

/// Content console for the language-learning site.
#[derive(Parser, Debug)]
#[command(name = "lingua", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the slug generated from a title
    Slug { title: String },

    /// Check a publishing data JSON file against the publishing rules
    Validate {
        path: PathBuf,

        /// Use the strict rule set
        #[arg(long)]
        strict: bool,
    },

    /// Structured-data templates
    Templates {
        #[command(subcommand)]
        command: TemplatesCommand,
    },

    /// Print JSON-LD for a stored record
    Jsonld {
        #[arg(long)]
        collection: Collection,

        id: Uuid,

        /// Schema kind (Article, FAQPage, HowTo). Without it the record's
        /// stored structured data is printed.
        #[arg(long)]
        kind: Option<String>,

        /// Wrap the output in a script tag
        #[arg(long)]
        script: bool,
    },

    /// Import records from a JSON or YAML file
    Import {
        #[arg(long)]
        collection: Collection,

        path: PathBuf,
    },

    /// Export published content as JSON files
    Export {
        /// Target directory (default: EXPORT_DIR)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Publish a record
    Publish {
        #[arg(long)]
        collection: Collection,

        id: Uuid,
    },

    /// Return a published record to draft
    Unpublish {
        #[arg(long)]
        collection: Collection,

        id: Uuid,
    },

    /// Review requests
    Review {
        #[command(subcommand)]
        command: ReviewCommand,
    },

    /// List the versions of a record
    History { id: Uuid },

    /// Compare two versions of a record
    Diff { first: Uuid, second: Uuid },

    /// Restore a record to an earlier version
    Rollback {
        #[arg(long)]
        collection: Collection,

        id: Uuid,

        version: Uuid,
    },

    /// Console settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum TemplatesCommand {
    /// List templates, optionally for one content type
    List {
        #[arg(long)]
        content_type: Option<ExtendedContentType>,
    },

    /// Show one template
    Show { id: String },

    /// Fill a template with data from a JSON file
    Apply {
        id: String,

        data: PathBuf,

        /// Wrap the output in a script tag
        #[arg(long)]
        script: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ReviewCommand {
    /// Pending review requests
    List {
        #[arg(long)]
        collection: Collection,
    },

    /// Submit a record for review
    Submit {
        #[arg(long)]
        collection: Collection,

        id: Uuid,
    },

    /// Approve a review and publish its record
    Approve {
        #[arg(long)]
        collection: Collection,

        review: Uuid,
    },

    /// Reject a review
    Reject {
        #[arg(long)]
        collection: Collection,

        review: Uuid,

        #[arg(long)]
        note: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Print the current settings
    Show,

    /// Set the console language
    SetLocale { locale: Locale },

    /// Hide a banner permanently
    DismissBanner { banner: String },
}

/// Run `$op::<T>(args)` for the record type stored in a collection.
macro_rules! for_collection {
    ($collection:expr, $op:ident($($arg:expr),* $(,)?)) => {
        match $collection {
            Collection::Lexicon => $op::<LexiconEntry>($($arg),*).await,
            Collection::GrammarRules => $op::<GrammarRule>($($arg),*).await,
            Collection::Scenarios => $op::<Scenario>($($arg),*).await,
            Collection::ContentItems => $op::<ContentItem>($($arg),*).await,
            other => Err(AppError::BadRequest(format!(
                "{other} does not hold content records"
            ))),
        }
    };
}

fn print_json<T: Serialize>(value: &T) -> AppResult<()> {
    let out = serde_json::to_string_pretty(value).context("failed to encode output")?;
    println!("{out}");
    Ok(())
}

async fn read_json(path: &Path) -> AppResult<Value> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw)
        .map_err(|e| AppError::BadRequest(format!("invalid JSON in {}: {e}", path.display())))
}

/// Execute one command.
pub async fn run(state: &AppState, export_dir: &Path, command: Command) -> AppResult<()> {
    match command {
        Command::Slug { title } => {
            println!("{}", generate_slug(&title));
            Ok(())
        }
        Command::Validate { path, strict } => {
            let data: PublishingData = serde_json::from_value(read_json(&path).await?)
                .map_err(|e| AppError::BadRequest(format!("not publishing data: {e}")))?;
            let rule_set = if strict { RuleSet::Strict } else { RuleSet::Basic };
            print_json(&rule_set.validate(&data))
        }
        Command::Templates { command } => templates(command).await,
        Command::Jsonld {
            collection,
            id,
            kind,
            script,
        } => for_collection!(collection, jsonld(state, id, kind.as_deref(), script)),
        Command::Import { collection, path } => {
            let summary = state
                .importer()
                .import_into(state.user(), collection, &path)
                .await?;
            print_json(&summary)
        }
        Command::Export { dir } => {
            let dir = dir.as_deref().unwrap_or(export_dir);
            let summary = state.exporter().export_all(state.user(), dir).await?;
            print_json(&summary)
        }
        Command::Publish { collection, id } => for_collection!(collection, publish(state, id)),
        Command::Unpublish { collection, id } => {
            for_collection!(collection, unpublish(state, id))
        }
        Command::Review { command } => review(state, command).await,
        Command::History { id } => {
            let versions = state.versions().history(id).await?;
            let rows: Vec<Value> = versions
                .iter()
                .map(|v| {
                    json!({
                        "id": v.id,
                        "version": v.version_number,
                        "status": v.status,
                        "summary": v.change_summary,
                        "created_at": v.created_at,
                    })
                })
                .collect();
            print_json(&rows)
        }
        Command::Diff { first, second } => {
            let comparison = state.versions().compare(first, second).await?;
            println!(
                "version {} -> {}",
                comparison.from_version, comparison.to_version
            );
            for diff in comparison.changed() {
                println!("{}:\n  - {}\n  + {}", diff.label, diff.old_display, diff.new_display);
            }
            if !comparison.has_changes() {
                println!("no changes");
            }
            Ok(())
        }
        Command::Rollback {
            collection,
            id,
            version,
        } => for_collection!(collection, rollback(state, id, version)),
        Command::Settings { command } => settings(state, command).await,
    }
}

async fn templates(command: TemplatesCommand) -> AppResult<()> {
    match command {
        TemplatesCommand::List { content_type } => {
            let templates = match content_type {
                Some(t) => get_templates_for_content_type(t),
                None => all_templates().iter().collect(),
            };
            for template in templates {
                println!("{:<20} {}", template.id, template.name.en);
            }
            Ok(())
        }
        TemplatesCommand::Show { id } => print_json(find_template(&id)?),
        TemplatesCommand::Apply { id, data, script } => {
            let template = find_template(&id)?;
            let data = read_json(&data).await?;

            let check = validate_template_data(template, &data);
            if !check.is_valid {
                eprintln!("missing fields: {}", check.missing_fields.join(", "));
            }

            let schema = apply_template_with_data(template, &data);
            if script {
                println!("{}", generate_script_tag(&schema));
                Ok(())
            } else {
                print_json(&schema)
            }
        }
    }
}

fn find_template(id: &str) -> AppResult<&'static crate::structured_data::StructuredDataTemplate> {
    get_template_by_id(id).ok_or_else(|| AppError::NotFound(format!("template '{id}'")))
}

async fn jsonld<T: ContentRecord>(
    state: &AppState,
    id: Uuid,
    kind: Option<&str>,
    script: bool,
) -> AppResult<()> {
    let record = state.repository::<T>().require(id).await?;
    let schema = match kind {
        Some(kind) => generate_jsonld(kind, &JsonLdSource::from_record(&record)),
        None => record_structured_data(record.publishing())
            .ok_or_else(|| AppError::NotFound(format!("structured data for {id}")))?,
    };

    if script {
        println!("{}", generate_script_tag(&schema));
        Ok(())
    } else {
        print_json(&schema)
    }
}

async fn publish<T: ContentRecord>(state: &AppState, id: Uuid) -> AppResult<()> {
    match state.publisher::<T>().publish(state.user(), id).await? {
        PublishOutcome::Published { record, warnings } => {
            println!("published {} ({})", record.title(), record.publishing().slug);
            for warning in warnings {
                println!("warning: {warning}");
            }
        }
        PublishOutcome::Rejected(result) => {
            println!("not published:");
            for error in &result.errors {
                println!("error: {error}");
            }
            for warning in &result.warnings {
                println!("warning: {warning}");
            }
        }
    }
    Ok(())
}

async fn unpublish<T: ContentRecord>(state: &AppState, id: Uuid) -> AppResult<()> {
    let record = state.publisher::<T>().unpublish(state.user(), id).await?;
    println!("{} is now a draft", record.title());
    Ok(())
}

async fn rollback<T: ContentRecord>(state: &AppState, id: Uuid, version: Uuid) -> AppResult<()> {
    let outcome = state
        .versions()
        .rollback_to_version::<T>(state.user(), id, version)
        .await?;
    if let Some(snapshot) = &outcome.snapshot {
        println!("saved unsaved changes as version {}", snapshot.version_number);
    }
    println!(
        "restored {} as version {}",
        outcome.record.title(),
        outcome.version.version_number
    );
    Ok(())
}

async fn review(state: &AppState, command: ReviewCommand) -> AppResult<()> {
    match command {
        ReviewCommand::List { collection } => for_collection!(collection, list_reviews(state)),
        ReviewCommand::Submit { collection, id } => {
            for_collection!(collection, submit_review(state, id))
        }
        ReviewCommand::Approve { collection, review } => {
            for_collection!(collection, approve_review(state, review))
        }
        ReviewCommand::Reject {
            collection,
            review,
            note,
        } => for_collection!(collection, reject_review(state, review, note)),
    }
}

async fn list_reviews<T: ContentRecord>(state: &AppState) -> AppResult<()> {
    print_json(&state.publisher::<T>().pending_reviews().await?)
}

async fn submit_review<T: ContentRecord>(state: &AppState, id: Uuid) -> AppResult<()> {
    print_json(&state.publisher::<T>().submit_for_review(state.user(), id).await?)
}

async fn approve_review<T: ContentRecord>(state: &AppState, review: Uuid) -> AppResult<()> {
    let decision = state
        .publisher::<T>()
        .approve_review(state.user(), review)
        .await?;
    match decision.outcome {
        PublishOutcome::Published { .. } => println!("review {review} approved"),
        PublishOutcome::Rejected(result) => {
            println!("review {review} stays pending:");
            for error in &result.errors {
                println!("error: {error}");
            }
        }
    }
    Ok(())
}

async fn reject_review<T: ContentRecord>(
    state: &AppState,
    review: Uuid,
    note: Option<String>,
) -> AppResult<()> {
    print_json(
        &state
            .publisher::<T>()
            .reject_review(state.user(), review, note)
            .await?,
    )
}

async fn settings(state: &AppState, command: SettingsCommand) -> AppResult<()> {
    let provider = state.settings();
    match command {
        SettingsCommand::Show => return print_json(&provider.get()),
        SettingsCommand::SetLocale { locale } => provider.set_locale(locale),
        SettingsCommand::DismissBanner { banner } => {
            if !provider.dismiss_banner(&banner) {
                println!("banner '{banner}' was already dismissed");
            }
        }
    }
    provider.persist().await?;
    Ok(())
}
