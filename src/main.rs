mod app;
mod config;
mod debounce;
mod filter;
mod form;
mod redirect;
mod render;
mod schema;
mod submit;
mod telegram;

use anyhow::{Context, Result, bail};
use clap::{Arg, ArgAction, ArgMatches, Command};
use dialoguer::Input;
use std::io::IsTerminal;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::app::{App, Startup};
use crate::debounce::{Debouncer, SEARCH_DEBOUNCE};
use crate::filter::{FilterState, HTML_HIGHLIGHT, categories};
use crate::form::FormFields;
use crate::redirect::REDIRECT_DELAY;
use crate::submit::{StatusKind, SubmitOutcome};
use crate::telegram::TelegramClient;

fn cli() -> Command {
    Command::new("folio")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Portfolio site core: config checks, link search, redirects and the contact form")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("DIR")
                .help("Directory holding telegram.json, links.json, ... ui.json")
                .default_value("config")
                .global(true),
        )
        .arg(
            Arg::new("schema")
                .long("schema")
                .value_name("FILE")
                .help("JSON-LD file whose sameAs list is rewritten from the links at start-up")
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .action(ArgAction::SetTrue)
                .conflicts_with("verbose")
                .global(true),
        )
        .subcommand(Command::new("check").about("Load and validate the configuration"))
        .subcommand(
            Command::new("links")
                .about("List links, optionally filtered")
                .arg(Arg::new("search").long("search").short('s').value_name("QUERY"))
                .arg(
                    Arg::new("category")
                        .long("category")
                        .value_name("CATEGORY")
                        .default_value("all"),
                )
                .arg(
                    Arg::new("html")
                        .long("html")
                        .action(ArgAction::SetTrue)
                        .help("Mark matches the way the site does"),
                ),
        )
        .subcommand(
            Command::new("browse")
                .about("Search links interactively from stdin (':category' switches category, empty line clears)"),
        )
        .subcommand(
            Command::new("resolve")
                .about("Resolve a short-link path such as /github")
                .arg(Arg::new("path").required(true)),
        )
        .subcommand(
            Command::new("show")
                .about("Show a section")
                .arg(
                    Arg::new("section")
                        .default_value(app::DEFAULT_SECTION)
                        .value_parser(app::SECTIONS),
                ),
        )
        .subcommand(
            Command::new("send")
                .about("Send a message through the contact form")
                .arg(Arg::new("name").long("name"))
                .arg(Arg::new("email").long("email"))
                .arg(Arg::new("message").long("message")),
        )
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("quiet"), matches.get_flag("verbose"))?;

    let config_dir = matches
        .get_one::<String>("config")
        .map(PathBuf::from)
        .context("missing --config")?;

    let config = config::load_config(&config_dir)
        .await
        .with_context(|| format!("Failed to load configuration from {}", config_dir.display()))?;

    // Only `resolve` has a request path; everything else starts at the root.
    let path = match matches.subcommand() {
        Some(("resolve", sub)) => sub.get_one::<String>("path").context("missing path")?.clone(),
        _ => "/".to_string(),
    };

    let schema_file = matches.get_one::<String>("schema").map(PathBuf::from);
    let mut schema = match &schema_file {
        Some(file) => Some(schema::read_schema(file).await?),
        None => None,
    };

    let startup = App::start(config, &path, schema.as_mut())?;
    if let (Some(file), Some(schema)) = (&schema_file, &schema) {
        schema::write_schema(file, schema).await?;
    }

    let mut app = match startup {
        Startup::Redirect { url, message } => {
            eprintln!("{}", message);
            tokio::time::sleep(REDIRECT_DELAY).await;
            println!("{}", url);
            return Ok(());
        }
        Startup::Ready(app) => app,
    };

    match matches.subcommand() {
        Some(("check", _)) => {
            let config = app.config();
            println!("Configuration OK: {}", config_dir.display());
            println!(
                "  {} links, {} portfolio items, {} experience entries, {} projects, {} navigation items",
                config.links.len(),
                config.portfolio.len(),
                config.experience.len(),
                config.projects.len(),
                config.navigation.len()
            );
            if config.telegram.bot_token.is_empty() || config.telegram.chat_id.is_empty() {
                println!("  contact form: not configured");
            }
            Ok(())
        }
        Some(("resolve", _)) => bail!("No link matches {}", path),
        Some(("links", sub)) => {
            let search = sub.get_one::<String>("search").map(String::as_str).unwrap_or("");
            let category = sub.get_one::<String>("category").map(String::as_str).unwrap_or("all");
            known_category(&app, category)?;
            *app.filter_mut() = FilterState::new(search, category);
            let marker = if sub.get_flag("html") {
                HTML_HIGHLIGHT
            } else {
                render::highlight_marker()
            };
            println!("{}", render::links(&app.visible_links(marker)));
            Ok(())
        }
        Some(("browse", _)) => browse(app).await,
        Some(("show", sub)) => {
            let section = sub
                .get_one::<String>("section")
                .map(String::as_str)
                .unwrap_or(app::DEFAULT_SECTION);
            app.show_section(section);
            println!("{}\n", render::navigation(&app));
            let body = render::section(&app, app.active_section()).context("unknown section")?;
            println!("{}", body);
            Ok(())
        }
        Some(("send", sub)) => send(app, sub).await,
        _ => unreachable!("subcommand_required is set"),
    }
}

fn init_tracing(quiet: bool, verbose: bool) -> Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("FOLIO_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

fn known_category(app: &App, category: &str) -> Result<()> {
    if !categories(&app.config().links).iter().any(|c| c == category) {
        bail!("Unknown category: {}", category);
    }
    Ok(())
}

fn print_links(app: &App) {
    println!("{}", render::category_bar(app));
    println!("{}\n", render::links(&app.visible_links(render::highlight_marker())));
}

async fn browse(mut app: App) -> Result<()> {
    let (mut debouncer, mut settled) = Debouncer::new(SEARCH_DEBOUNCE);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print_links(&app);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read search input")? else {
                    break;
                };
                if let Some(category) = line.trim().strip_prefix(':') {
                    let category = category.trim();
                    match known_category(&app, category) {
                        Ok(()) => {
                            app.filter_mut().set_category(category);
                            print_links(&app);
                        }
                        Err(e) => eprintln!("{}", e),
                    }
                } else if line.trim().is_empty() {
                    debouncer.cancel();
                    app.filter_mut().clear_search();
                    print_links(&app);
                } else {
                    debouncer.on_input(line);
                }
            }
            Some(query) = settled.recv() => {
                app.filter_mut().set_search_query(&query);
                print_links(&app);
            }
        }
    }

    if let Some(query) = last_settled(&debouncer, &mut settled).await {
        app.filter_mut().set_search_query(&query);
        print_links(&app);
    }

    Ok(())
}

/// The query still owed once input ends: one that settled but was not read,
/// or one that is still mid-window.
async fn last_settled(
    debouncer: &Debouncer<String>,
    settled: &mut UnboundedReceiver<String>,
) -> Option<String> {
    let mut last = None;
    while let Ok(query) = settled.try_recv() {
        last = Some(query);
    }
    if debouncer.is_pending() {
        if let Some(query) = settled.recv().await {
            last = Some(query);
        }
    }
    last
}

async fn send(app: App, sub: &ArgMatches) -> Result<()> {
    let fields = FormFields::new(
        &field(sub, "name", "Name")?,
        &field(sub, "email", "Email")?,
        &field(sub, "message", "Message")?,
    );

    let client = TelegramClient::new(app.config().telegram.clone())
        .context("Failed to create HTTP client")?;
    let contact = app.contact();
    contact.set_fields(fields);

    let outcome = contact.submit(&client).await;
    if let Some(status) = contact.status() {
        match status.kind {
            StatusKind::Success => println!("{}", status.text),
            StatusKind::Error => eprintln!("{}", status.text),
        }
    }

    match outcome {
        SubmitOutcome::Sent => Ok(()),
        SubmitOutcome::Invalid(errors) => bail!("{} validation error(s)", errors.len()),
        SubmitOutcome::Failed { .. } => bail!("Message was not sent"),
        SubmitOutcome::Busy => bail!("A message is already being sent"),
    }
}

/// Takes the value from the command line, or prompts for it on a terminal.
fn field(sub: &ArgMatches, id: &str, prompt: &str) -> Result<String> {
    if let Some(value) = sub.get_one::<String>(id) {
        return Ok(value.clone());
    }
    if !std::io::stdin().is_terminal() {
        return Ok(String::new());
    }
    Input::<String>::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()
        .with_context(|| format!("Failed to read {}", id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        cli().debug_assert();
    }

    #[test]
    fn test_links_arguments_parse() {
        let matches = cli()
            .try_get_matches_from(["folio", "--config", "site/config", "links", "--search", "git"])
            .unwrap();
        assert_eq!(matches.get_one::<String>("config").unwrap(), "site/config");
        let (name, sub) = matches.subcommand().unwrap();
        assert_eq!(name, "links");
        assert_eq!(sub.get_one::<String>("search").unwrap(), "git");
        assert_eq!(sub.get_one::<String>("category").unwrap(), "all");
    }

    #[tokio::test(start_paused = true)]
    async fn test_settled_but_unread_query_is_kept() {
        let (mut debouncer, mut settled) = Debouncer::new(SEARCH_DEBOUNCE);
        debouncer.on_input("git".to_string());
        tokio::time::sleep(SEARCH_DEBOUNCE * 2).await;
        assert!(!debouncer.is_pending());

        assert_eq!(last_settled(&debouncer, &mut settled).await.as_deref(), Some("git"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_mid_window_is_awaited() {
        let (mut debouncer, mut settled) = Debouncer::new(SEARCH_DEBOUNCE);
        debouncer.on_input("hub".to_string());

        assert_eq!(last_settled(&debouncer, &mut settled).await.as_deref(), Some("hub"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_nothing_owed_without_input() {
        let (debouncer, mut settled) = Debouncer::<String>::new(SEARCH_DEBOUNCE);
        assert_eq!(last_settled(&debouncer, &mut settled).await, None);
    }

    #[test]
    fn test_schema_is_a_global_flag() {
        let matches = cli()
            .try_get_matches_from(["folio", "resolve", "/github", "--schema", "person.jsonld"])
            .unwrap();
        assert_eq!(matches.get_one::<String>("schema").unwrap(), "person.jsonld");
        assert!(cli().try_get_matches_from(["folio", "schema", "person.jsonld"]).is_err());
    }

    #[test]
    fn test_show_rejects_unknown_section() {
        assert!(cli().try_get_matches_from(["folio", "show", "blogSection"]).is_err());
    }
}
