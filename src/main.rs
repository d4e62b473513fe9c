//! # a2ui-replay
//!
//! Developer tool for the A2UI engine: replays captured agent output through
//! the framer, decoder, registry and renderer, or runs the coordinator over
//! file-backed agents and prints the merged stream.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use a2ui_kit::a2ui::*;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use futures::StreamExt;

#[derive(Parser, Debug)]
#[command(name = "a2ui-replay", about = "Replay and coordinate A2UI streams")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Feed a captured stream through the engine and print the render outline.
    Replay {
        /// JSONL capture, or an event-stream capture with `--sse`.
        file: PathBuf,

        /// Treat the capture as `data:` frames.
        #[arg(long)]
        sse: bool,

        /// Feed the capture in chunks of this many bytes.
        #[arg(long, default_value = "64")]
        chunk: usize,
    },

    /// Run the coordinator over scripted agents read from files.
    Demo {
        /// Header title.
        #[arg(long)]
        title: Option<String>,

        /// Agent as `id=slot=path`, in output order. Repeatable.
        #[arg(long = "agent", value_parser = parse_agent, required = true)]
        agents: Vec<AgentArg>,

        /// Coordinator configuration as JSON.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Request passed to every agent.
        #[arg(long, default_value = "demo")]
        request: String,

        /// Delay between agent fragments, in milliseconds.
        #[arg(long, default_value = "0")]
        delay: u64,

        /// Print event-stream frames instead of JSON lines.
        #[arg(long)]
        sse: bool,
    },
}

#[derive(Debug, Clone)]
struct AgentArg {
    settings: AgentSettings,
    path: PathBuf,
}

fn parse_agent(value: &str) -> Result<AgentArg, String> {
    let mut parts = value.splitn(3, '=');
    let (Some(id), Some(slot), Some(path)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(format!("expected id=slot=path, got {value:?}"));
    };
    if id.is_empty() {
        return Err("agent id must not be empty".to_string());
    }
    let slot = ComponentId::new(slot).map_err(|e| e.to_string())?;
    Ok(AgentArg {
        settings: AgentSettings {
            id: id.to_string(),
            slot,
            timeout: None,
        },
        path: PathBuf::from(path),
    })
}

/// Split `text` into pieces of at most `size` bytes, on char boundaries.
fn chunks(text: &str, size: usize) -> Vec<&str> {
    let size = size.max(1);
    let mut pieces = Vec::new();
    let mut start = 0;
    while start < text.len() {
        let mut end = (start + size).min(text.len());
        while !text.is_char_boundary(end) {
            end += 1;
        }
        pieces.push(&text[start..end]);
        start = end;
    }
    pieces
}

fn replay(file: PathBuf, sse: bool, chunk: usize) -> Result<()> {
    let capture = std::fs::read_to_string(&file)
        .with_context(|| format!("Failed to read capture: {}", file.display()))?;

    let mut messages = Vec::new();
    let mut absorbed = 0;
    if sse {
        let mut decoder = SseDecoder::new();
        for piece in chunks(&capture, chunk) {
            messages.extend(decoder.push(piece));
        }
        messages.extend(decoder.finish());
    } else {
        let mut decoder = StreamDecoder::new();
        for piece in chunks(&capture, chunk) {
            messages.extend(decoder.push(piece));
        }
        messages.extend(decoder.finish());
        absorbed = decoder.absorbed();
    }

    let mut registry = ComponentRegistry::new();
    let events = registry.apply_all(&messages);
    let unrecognized = messages.iter().filter(|m| m.is_unrecognized()).count();

    println!(
        "{} messages, {} applied, {} unrecognized, {} noise lines",
        messages.len(),
        events.len(),
        unrecognized,
        absorbed
    );
    println!("{} components registered", registry.len());

    let dangling = registry.dangling_references();
    if !dangling.is_empty() {
        let ids: Vec<&str> = dangling.iter().map(ComponentId::as_str).collect();
        println!("dangling references: {}", ids.join(", "));
    }

    match render(&registry) {
        Some(tree) => print!("{}", tree.outline()),
        None => println!("(no root active)"),
    }
    Ok(())
}

async fn demo(
    title: Option<String>,
    agents: Vec<AgentArg>,
    config: Option<PathBuf>,
    request: String,
    delay: u64,
    sse: bool,
) -> Result<()> {
    let mut config: CoordinatorConfig = match config {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Invalid coordinator config: {}", path.display()))?
        }
        None => CoordinatorConfig::default(),
    };
    if let Some(title) = title {
        config.title = title;
    }

    let mut coordinator = Coordinator::new(config);
    for arg in agents {
        let script = std::fs::read_to_string(&arg.path)
            .with_context(|| format!("Failed to read agent script: {}", arg.path.display()))?;
        let fragments = chunks(&script, 64).into_iter().map(str::to_string).collect();
        let mut agent = ScriptedAgent::new(arg.settings.id.clone(), fragments);
        if delay > 0 {
            agent = agent.with_delay(Duration::from_millis(delay));
        }
        coordinator.add_agent(AgentRunner::from_settings(Arc::new(agent), &arg.settings));
    }
    if let Err(e) = coordinator.validate() {
        ::log::warn!("[A2UI replay] Invalid coordinator setup, expect the error surface: {e}");
    }

    let mut stream = coordinator.run(AgentRequest::new(request));
    while let Some(message) = stream.next().await {
        if sse {
            print!("{}", encode_event(&message)?);
        } else {
            println!("{}", message.to_line()?);
        }
    }
    if sse {
        print!("{DONE_FRAME}");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Replay { file, sse, chunk } => replay(file, sse, chunk),
        Command::Demo {
            title,
            agents,
            config,
            request,
            delay,
            sse,
        } => demo(title, agents, config, request, delay, sse).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunks_respect_char_boundaries() {
        let text = "a€b✓c";
        for size in 1..=text.len() {
            let pieces = chunks(text, size);
            assert_eq!(pieces.concat(), text);
        }
        assert!(chunks("", 4).is_empty());
    }

    #[test]
    fn test_parse_agent() {
        let arg = parse_agent("news=news_root=scripts/news.jsonl").unwrap();
        assert_eq!(arg.settings.id, "news");
        assert_eq!(arg.settings.slot, "news_root");
        assert_eq!(arg.path, PathBuf::from("scripts/news.jsonl"));

        assert!(parse_agent("news=news_root").is_err());
        assert!(parse_agent("news==path").is_err());
    }
}
