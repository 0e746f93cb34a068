// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Formcast CLI
//!
//! Scan saved pages for request suggestions and send requests from the
//! command line. All output is JSON on stdout.

use std::env;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{anyhow, Context};
use serde::Serialize;
use url::Url;

use formcast::http::ResponseBody;
use formcast::{
    analyze_page, classify_body, detect_from_html, detect_suggestions, scan_document, Assistant,
    DispatchConfig, DispatchReply, Dispatcher, Document, HttpRequestSpec,
};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("formcast=info".parse().unwrap()),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    let result = match args[1].as_str() {
        "scan" | "analyze" | "suggest" => {
            if args.len() < 3 {
                eprintln!("Usage: formcast {} <file> [--url URL] [--cookie COOKIE]", args[1]);
                return ExitCode::from(1);
            }
            local_page(&args[1], &args[2], &args[3..])
        }
        "detect" => {
            if args.len() < 3 {
                eprintln!("Usage: formcast detect <url> [--cookie COOKIE]");
                return ExitCode::from(1);
            }
            detect_remote(&args[2], &args[3..]).await
        }
        "assist" => {
            if args.len() < 3 {
                eprintln!("Usage: formcast assist <file> [--url URL] [--api-key KEY]");
                return ExitCode::from(1);
            }
            assist_page(&args[2], &args[3..]).await
        }
        "ask" => {
            if args.len() < 3 {
                eprintln!("Usage: formcast ask '<description>' [--api-key KEY]");
                return ExitCode::from(1);
            }
            ask(&args[2], &args[3..]).await
        }
        "verify-key" => verify_key(&args[2..]).await,
        "send" => {
            if args.len() < 4 {
                eprintln!("Usage: formcast send <METHOD> <url> [-H 'K: V']... [-d BODY] [--timeout MS] [--api-key KEY]");
                return ExitCode::from(1);
            }
            send(&args[2], &args[3], &args[4..]).await
        }
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(ExitCode::SUCCESS)
        }
        "--version" | "-v" | "version" => {
            println!("formcast {}", formcast::VERSION);
            Ok(ExitCode::SUCCESS)
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            Ok(ExitCode::from(1))
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r#"Formcast - Form-to-request inference and HTTP dispatch

USAGE:
    formcast <COMMAND> [OPTIONS]

COMMANDS:
    scan <file>               List forms and API-looking links on a saved page
    analyze <file>            Summarise a saved page (title, forms, input count)
    suggest <file>            Synthesize request suggestions for a saved page
    detect <url>              Fetch a page and synthesize request suggestions
    assist <file>             Ask the completions provider to draft a request for a saved page
    ask '<description>'       Ask the completions provider to draft a request from text
    verify-key                Check that the provider accepts the API key
    send <METHOD> <url>       Send a request and print the response envelope
    help                      Show this help message
    version                   Show version information

OPTIONS:
    --url URL                 Page URL used to resolve relative actions
    --cookie COOKIE           Cookie string the page would see
    -H, --header 'K: V'       Request header (repeatable)
    -d, --data BODY           Request body (POST/PUT/PATCH only)
    --timeout MS              Request timeout in milliseconds
    --api-key KEY             Provider API key (or set FORMCAST_API_KEY)

EXAMPLES:
    formcast suggest saved/login.html --url https://example.com/login
    formcast detect https://example.com/contact
    formcast ask 'create a GitHub issue in octo/repo' --api-key sk-...
    formcast send POST https://httpbin.org/post -d '{{"a":1}}'
"#
    );
}

fn local_page(command: &str, path: &str, opts: &[String]) -> anyhow::Result<ExitCode> {
    let url = option_value(opts, &["--url"])
        .map(|u| Url::parse(&u).with_context(|| format!("invalid --url '{}'", u)))
        .transpose()?;
    let cookie = option_value(opts, &["--cookie"]).unwrap_or_default();

    let doc = Document::from_file(path, url)
        .with_context(|| format!("failed to load {}", path))?
        .with_cookie(cookie);

    match command {
        "scan" => print_json(&scan_document(&doc))?,
        "analyze" => print_json(&analyze_page(&doc))?,
        _ => print_json(&detect_suggestions(&doc))?,
    }
    Ok(ExitCode::SUCCESS)
}

async fn detect_remote(url: &str, opts: &[String]) -> anyhow::Result<ExitCode> {
    let cookie = option_value(opts, &["--cookie"]).unwrap_or_default();
    let dispatcher = Dispatcher::with_config(DispatchConfig::from_env()?)?;

    let mut spec = HttpRequestSpec::get(url).header("Accept", "text/html,application/xhtml+xml");
    if !cookie.is_empty() {
        spec = spec.header("Cookie", cookie.as_str());
    }

    let page = dispatcher.dispatch(&spec, None).await?;
    let html = match &page.body {
        ResponseBody::Text(text) => text.clone(),
        ResponseBody::Json(value) => value.to_string(),
    };

    print_json(&detect_from_html(&html, &page.final_url, &cookie))?;
    Ok(ExitCode::SUCCESS)
}

async fn assist_page(path: &str, opts: &[String]) -> anyhow::Result<ExitCode> {
    let url = option_value(opts, &["--url"])
        .map(|u| Url::parse(&u).with_context(|| format!("invalid --url '{}'", u)))
        .transpose()?;
    let doc = Document::from_file(path, url).with_context(|| format!("failed to load {}", path))?;

    let dispatcher = Dispatcher::with_config(DispatchConfig::from_env()?)?;
    let api_key = option_value(opts, &["--api-key"]);
    let suggestion = Assistant::new(&dispatcher)
        .suggest_for_page(&analyze_page(&doc), api_key.as_deref())
        .await?;

    print_json(&suggestion)?;
    Ok(ExitCode::SUCCESS)
}

async fn ask(description: &str, opts: &[String]) -> anyhow::Result<ExitCode> {
    let dispatcher = Dispatcher::with_config(DispatchConfig::from_env()?)?;
    let api_key = option_value(opts, &["--api-key"]);
    let suggestion = Assistant::new(&dispatcher)
        .suggest_from_prompt(description, api_key.as_deref())
        .await?;

    print_json(&suggestion)?;
    Ok(ExitCode::SUCCESS)
}

async fn verify_key(opts: &[String]) -> anyhow::Result<ExitCode> {
    let config = DispatchConfig::from_env()?;
    let key = option_value(opts, &["--api-key"])
        .or_else(|| config.api_key.clone())
        .ok_or_else(|| anyhow!("no API key: pass --api-key or set FORMCAST_API_KEY"))?;

    let dispatcher = Dispatcher::with_config(config)?;
    let valid = dispatcher.verify_credentials(&key).await?;
    print_json(&serde_json::json!({ "valid": valid }))?;

    Ok(if valid { ExitCode::SUCCESS } else { ExitCode::from(2) })
}

async fn send(method: &str, url: &str, opts: &[String]) -> anyhow::Result<ExitCode> {
    let mut config = DispatchConfig::from_env()?;
    if let Some(key) = option_value(opts, &["--api-key"]) {
        config = config.api_key(key);
    }

    let mut spec = HttpRequestSpec::new(method, url).timeout(config.default_timeout);
    for raw in option_values(opts, &["-H", "--header"]) {
        let (name, value) = raw
            .split_once(':')
            .ok_or_else(|| anyhow!("header must look like 'Name: value', got '{}'", raw))?;
        spec = spec.header(name.trim(), value.trim());
    }

    if let Some(ms) = option_value(opts, &["--timeout"]) {
        let ms: u64 = ms.parse().with_context(|| format!("invalid --timeout '{}'", ms))?;
        spec = spec.timeout(Duration::from_millis(ms));
    }

    if let Some(body) = option_value(opts, &["-d", "--data"]) {
        if !spec.has_header("Content-Type") {
            let format = classify_body(&spec.method, None, &body).ok();
            if let Some(content_type) = format.and_then(|f| f.content_type()) {
                spec = spec.header("Content-Type", content_type);
            }
        }
        spec = spec.body(body);
    }

    let dispatcher = Dispatcher::with_config(config)?;
    let reply = dispatcher.dispatch_reply(&spec, None).await;
    print_json(&reply)?;

    Ok(match reply {
        DispatchReply::Failure { .. } => ExitCode::from(2),
        DispatchReply::Success { .. } => ExitCode::SUCCESS,
    })
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Last value given for any of `flags`
fn option_value(opts: &[String], flags: &[&str]) -> Option<String> {
    option_values(opts, flags).pop()
}

/// Every value given for any of `flags`
fn option_values(opts: &[String], flags: &[&str]) -> Vec<String> {
    opts.windows(2)
        .filter(|pair| flags.contains(&pair[0].as_str()))
        .map(|pair| pair[1].clone())
        .collect()
}

