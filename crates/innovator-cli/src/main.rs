//! innovator - terminal client for the research idea service

mod commands;
mod config;
mod ui;
mod utils;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::Parser;
use innovator_api::{HttpIdeaService, IdeaService, client::DEFAULT_TIMEOUT, endpoint};
use innovator_core::{ConversationState, GenerationState, SessionDriver, SessionEvent};
use tokio::sync::broadcast;

/// innovator - clarify a research requirement and get ranked ideas
#[derive(Parser, Debug)]
#[command(name = "innovator")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Base URL of the idea service (overrides INNOVATOR_API_BASE_URL and config)
    #[arg(long)]
    base_url: Option<String>,

    /// Request timeout in seconds (default: 120)
    #[arg(long)]
    timeout: Option<u64>,

    /// Run in non-interactive mode with a single requirement
    #[arg(short = 'c', long)]
    command: Option<String>,

    /// Answer to a clarification question, in order (repeatable, with -c)
    #[arg(short, long = "answer", requires = "command")]
    answer: Vec<String>,

    /// Print the result as JSON (with -c)
    #[arg(long, requires = "command")]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Disable TUI mode (use simple stdin/stdout)
    #[arg(long)]
    no_tui: bool,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Setup tracing
    if args.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("innovator=debug,innovator_core=debug,innovator_api=debug")
            .with_writer(std::io::stderr)
            .init();
    }

    // Initialize config and exit
    if args.init_config {
        match config::Config::init() {
            Ok(path) => {
                println!("Config file created at: {}", path.display());
                println!("\nExample config:\n{}", config::example_config());
            }
            Err(e) => {
                eprintln!("Error creating config: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    let cfg = config::Config::load();

    // CLI takes precedence over the environment, then the config file
    let base_url = endpoint::resolve_from_env(args.base_url.as_deref(), cfg.base_url.as_deref());
    let timeout = args
        .timeout
        .or(cfg.timeout_secs)
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_TIMEOUT);

    let service = match HttpIdeaService::with_timeout(&base_url, timeout) {
        Ok(service) => service,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            eprintln!("Options:");
            eprintln!("  1. Pass it directly: innovator --base-url https://ideas.example.org");
            eprintln!("  2. Set it in the environment: export {}=...", endpoint::BASE_URL_ENV_VAR);
            eprintln!("  3. Add it to config: innovator --init-config");
            std::process::exit(1);
        }
    };
    let base_url = service.base_url().to_string();
    tracing::info!("Using idea service at {} (timeout {:?})", base_url, timeout);
    let service: Arc<dyn IdeaService> = Arc::new(service);

    // Non-interactive mode
    if let Some(requirement) = args.command {
        return run_command(service, &requirement, &args.answer, args.json).await;
    }

    let use_tui = !args.no_tui && cfg.tui.unwrap_or(true);
    if use_tui {
        return ui::run_tui(service, &base_url).await;
    }

    run_interactive(service, &base_url).await
}

/// Submit `text` and print session events as they arrive
async fn submit_and_report(
    driver: &mut SessionDriver,
    receiver: &mut broadcast::Receiver<SessionEvent>,
    text: &str,
    quiet: bool,
) -> innovator_core::Result<()> {
    let mut submit = std::pin::pin!(driver.submit(text));
    loop {
        tokio::select! {
            biased;

            result = &mut submit => {
                while let Ok(event) = receiver.try_recv() {
                    if !quiet {
                        utils::print_event(&event);
                    }
                }
                return result;
            }

            event = receiver.recv() => {
                if let Ok(event) = event {
                    if !quiet {
                        utils::print_event(&event);
                    }
                }
            }
        }
    }
}

async fn run_command(
    service: Arc<dyn IdeaService>,
    requirement: &str,
    answers: &[String],
    json: bool,
) -> anyhow::Result<()> {
    if !json {
        println!("innovator> {}", requirement);
    }

    let mut driver = SessionDriver::new(service);
    let mut receiver = driver.subscribe();
    let mut answers = answers.iter();

    submit_and_report(&mut driver, &mut receiver, requirement, json).await?;

    loop {
        let conversation = driver.session().conversation();
        match conversation.state() {
            ConversationState::Clarified => break,
            ConversationState::AwaitingClarification => {
                let question = conversation.pending_question().unwrap_or_default().to_string();
                let Some(answer) = answers.next() else {
                    bail!(
                        "Clarification needed: {}\nRe-run with --answer to reply.",
                        question
                    );
                };
                if !json {
                    println!("> {}", answer);
                }
                submit_and_report(&mut driver, &mut receiver, answer, json)
                    .await
                    .with_context(|| format!("answering {:?}", question))?;
            }
            ConversationState::Error => {
                bail!("{}", conversation.last_error().unwrap_or_default());
            }
            ConversationState::Idle => bail!("Requirement was not submitted"),
        }
    }

    match driver.session().generation().state() {
        GenerationState::Succeeded { outcome } => {
            if json {
                println!("{}", serde_json::to_string_pretty(outcome)?);
            }
            Ok(())
        }
        GenerationState::Failed { last_error, .. } => bail!("{}", last_error),
        other => bail!("Generation did not finish ({})", other.as_str()),
    }
}

async fn run_interactive(service: Arc<dyn IdeaService>, base_url: &str) -> anyhow::Result<()> {
    use std::io::{self, Write};

    let mut driver = SessionDriver::new(service);
    let mut receiver = driver.subscribe();

    // Show minimal startup info (only if TTY)
    if std::io::IsTerminal::is_terminal(&std::io::stderr()) {
        eprintln!("innovator ({})", base_url);
        eprintln!("Describe a research requirement. Type /help for commands.");
        eprintln!();
    }

    loop {
        let prompt = if driver.session().conversation().expects_initial() {
            "requirement>"
        } else {
            "answer>"
        };
        print!("{} ", prompt);
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            // EOF
            break;
        }
        let input = input.trim();

        if let Some(result) = commands::execute_command(input, driver.session()) {
            match result {
                commands::CommandResult::Reset => driver.reset(),
                commands::CommandResult::Exit => break,
                commands::CommandResult::Message(msg) => println!("{}", msg),
                commands::CommandResult::Unknown(cmd) => {
                    println!("Unknown command: /{}", cmd);
                    println!("Type /help for available commands.");
                }
            }
            // Reset is reported through the event stream
            while let Ok(event) = receiver.try_recv() {
                utils::print_event(&event);
            }
            println!();
            continue;
        }

        match submit_and_report(&mut driver, &mut receiver, input, false).await {
            Ok(()) => {}
            Err(innovator_core::Error::InvalidState { .. }) => {
                eprintln!("This session is finished. Type /reset to start a new one.");
            }
            Err(e) => eprintln!("{}", e),
        }
        println!();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use innovator_api::{
        ClarifyRequest, ClarifyResponse, GenerateRequest, GenerateResponse, Idea,
    };
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Asks one question, then accepts any answer
    struct OneQuestion {
        calls: AtomicU32,
    }

    #[async_trait]
    impl IdeaService for OneQuestion {
        async fn clarify(&self, _: &ClarifyRequest) -> innovator_api::Result<ClarifyResponse> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(ClarifyResponse::unclear("Which algorithm?", vec![]))
            } else {
                Ok(ClarifyResponse::clear(vec![]))
            }
        }

        async fn generate(&self, _: &GenerateRequest) -> innovator_api::Result<GenerateResponse> {
            Ok(GenerateResponse {
                top_ideas: vec![Idea::scored("a", 95.0)],
                total_generated: 10,
                total_comparisons: None,
            })
        }
    }

    fn one_question() -> Arc<dyn IdeaService> {
        Arc::new(OneQuestion {
            calls: AtomicU32::new(0),
        })
    }

    #[tokio::test]
    async fn test_one_shot_with_answer_succeeds() {
        let answers = vec!["GRPO".to_string()];
        run_command(one_question(), "RL", &answers, true)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_one_shot_without_answer_fails() {
        let err = run_command(one_question(), "RL", &[], true)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Which algorithm?"));
    }

    #[tokio::test]
    async fn test_one_shot_empty_requirement_fails() {
        let err = run_command(one_question(), "  ", &[], true)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Please enter a requirement");
    }

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from([
            "innovator", "-c", "RL", "-a", "GRPO", "--answer", "math", "--json",
        ]);
        assert_eq!(args.command.as_deref(), Some("RL"));
        assert_eq!(args.answer, vec!["GRPO", "math"]);
        assert!(args.json);
        assert!(!args.no_tui);
    }
}
