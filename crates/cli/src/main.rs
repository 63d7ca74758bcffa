use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use formfill_api::{ClientConfig, FormsClient};
use formfill_engine::{FormSession, NavOutcome, TracingNotifier};
use formfill_types::FieldId;
use formfill_util::{DRAFT_KEY_PREFIX, DraftStore, JsonDraftStore, form_draft_prefix};
use serde_json::json;
use tracing::warn;

mod answers;

/// Fill in published forms from the terminal.
#[derive(Parser, Debug)]
#[command(name = "formfill", version, about)]
struct Cli {
    /// Base URL of the form service (overrides FORMFILL_API_BASE)
    #[arg(long, global = true)]
    api_base: Option<String>,

    /// Draft file location (overrides FORMFILL_DRAFT_PATH)
    #[arg(long, global = true)]
    draft_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the widgets of one page as JSON
    Render {
        #[arg(long)]
        form: String,
        /// Page id, `start` or `end`; defaults to the first page
        #[arg(long)]
        page: Option<String>,
    },
    /// Apply an answer file page by page and optionally submit
    Fill {
        #[arg(long)]
        form: String,
        /// JSON object of field id to interaction(s)
        #[arg(long)]
        answers: PathBuf,
        #[arg(long)]
        submit: bool,
    },
    /// Inspect or remove saved drafts
    Drafts {
        #[command(subcommand)]
        action: DraftCommands,
    },
}

#[derive(Subcommand, Debug)]
enum DraftCommands {
    /// List saved drafts
    List,
    /// Remove saved drafts, for one form or all of them
    Clear {
        #[arg(long)]
        form: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let Cli {
        api_base,
        draft_path,
        command,
    } = Cli::parse();

    let drafts = Arc::new(JsonDraftStore::new(draft_path).context("open draft store")?);
    match command {
        Commands::Render { form, page } => {
            let client = client(api_base)?;
            let session = FormSession::load(&client, &form, page.as_deref(), drafts, Arc::new(TracingNotifier)).await?;
            print_page(&session)
        }
        Commands::Fill { form, answers, submit } => {
            let client = client(api_base)?;
            let mut session = FormSession::load(&client, &form, None, drafts, Arc::new(TracingNotifier)).await?;
            fill(&mut session, &answers)?;
            if submit {
                let outcome = session.submit(&client).await?;
                println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({
                        "submitted": outcome.receipt.ok,
                        "purged_drafts": outcome.purged_drafts,
                    }))?
                );
                Ok(())
            } else {
                print_page(&session)
            }
        }
        Commands::Drafts { action } => run_drafts(drafts.as_ref(), action),
    }
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn client(api_base: Option<String>) -> Result<FormsClient> {
    let mut config = ClientConfig::from_env()?;
    if let Some(base) = api_base {
        config = config.with_base_url(base);
    }
    FormsClient::new(&config)
}

/// Apply answers for the fields of each page, advancing until the last page.
fn fill(session: &mut FormSession, answers_path: &std::path::Path) -> Result<()> {
    let mut answers = answers::load_answers(answers_path)?;

    loop {
        let page_fields: Vec<FieldId> = session.current_fields().iter().map(|field| field.id.clone()).collect();
        for field_id in page_fields {
            let Some(answer) = answers.shift_remove(field_id.as_str()) else {
                continue;
            };
            for interaction in answer.into_interactions()? {
                session
                    .apply(&field_id, interaction)
                    .with_context(|| format!("answer for field {field_id}"))?;
            }
        }

        match session.next()? {
            NavOutcome::Advanced(_) => continue,
            _ => break,
        }
    }

    for field_id in answers.keys() {
        warn!(%field_id, "answer does not match any field on the form's pages");
    }
    Ok(())
}

fn print_page(session: &FormSession) -> Result<()> {
    let output = json!({
        "form_id": session.form_id(),
        "title": session.form().title,
        "styling": session.form().styling,
        "position": session.position(),
        "fields": session.render_current_page(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn run_drafts(drafts: &dyn DraftStore, action: DraftCommands) -> Result<()> {
    match action {
        DraftCommands::List => {
            for (key, draft) in drafts.entries()? {
                println!("{key}\t{}\t{} bytes", draft.updated_at.to_rfc3339(), draft.value.len());
            }
        }
        DraftCommands::Clear { form } => {
            let prefix = form
                .as_deref()
                .map(form_draft_prefix)
                .unwrap_or_else(|| DRAFT_KEY_PREFIX.to_string());
            let removed = drafts.remove_prefix(&prefix)?;
            println!("Removed {removed} draft(s)");
        }
    }
    Ok(())
}
