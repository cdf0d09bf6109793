//! Command line front end for the fluent-http request builder

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use fluent_http::{ClientOptions, RequestBuilder};
use tracing::Level;
use tracing_subscriber::EnvFilter;
use url::Url;

mod sub_commands;

/// Issue HTTP requests and print the response, a JSON field or pretty JSON
#[derive(Parser)]
#[command(name = "fluent-http")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Logging level
    #[arg(short, long, default_value = "error")]
    log_level: Level,
    /// HTTP method
    #[arg(short = 'X', long, default_value = "GET")]
    method: String,
    /// Header as `name:value`, may be repeated
    #[arg(short = 'H', long = "header", value_parser = parse_header)]
    headers: Vec<(String, String)>,
    /// Query parameter as `key=value`, may be repeated
    #[arg(short = 'p', long = "param", value_parser = parse_param)]
    params: Vec<(String, String)>,
    /// Raw request body
    #[arg(short, long, conflicts_with = "json_body")]
    body: Option<String>,
    /// Request body given as JSON, re-serialized before sending
    #[arg(long)]
    json_body: Option<String>,
    /// Connect timeout in milliseconds
    #[arg(long)]
    connect_timeout: Option<u64>,
    /// Response header timeout in milliseconds
    #[arg(long)]
    header_timeout: Option<u64>,
    /// Total timeout in milliseconds
    #[arg(long)]
    total_timeout: Option<u64>,
    /// Proxy URL
    #[arg(long)]
    proxy: Option<Url>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the response body
    Text(sub_commands::text::TextSubCommand),
    /// Print the value at a key path of a JSON response
    Field(sub_commands::field::FieldSubCommand),
    /// Pretty print a JSON response
    Json(sub_commands::json::JsonSubCommand),
}

fn parse_header(s: &str) -> Result<(String, String), String> {
    s.split_once(':')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .ok_or_else(|| format!("expected `name:value`, got `{}`", s))
}

fn parse_param(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected `key=value`, got `{}`", s))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    let env_filter = EnvFilter::new(format!("{},hyper=warn,reqwest=warn", args.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let mut options = ClientOptions::default().from_env();
    if let Some(ms) = args.connect_timeout {
        options.connect_timeout_ms = ms;
    }
    if let Some(ms) = args.header_timeout {
        options.response_header_timeout_ms = ms;
    }
    if let Some(ms) = args.total_timeout {
        options.total_timeout_ms = ms;
    }
    if let Some(proxy) = &args.proxy {
        options.proxy = Some(proxy.to_string());
    }

    tracing::debug!(
        "Timeouts: connect {}ms, response header {}ms, total {}ms",
        options.connect_timeout_ms,
        options.response_header_timeout_ms,
        options.total_timeout_ms
    );

    let mut builder = RequestBuilder::from_options(&options)?
        .method(args.method)
        .add_headers(args.headers)
        .add_params(args.params);

    if let Some(body) = args.body {
        builder = builder.set_body(body);
    }
    if let Some(json_body) = args.json_body {
        let value: serde_json::Value = serde_json::from_str(&json_body)
            .map_err(|e| anyhow!("--json-body is not valid JSON: {}", e))?;
        builder = builder.set_json_body(&value);
    }

    match &args.command {
        Commands::Text(sub_command_args) => {
            sub_commands::text::text(&mut builder, sub_command_args).await
        }
        Commands::Field(sub_command_args) => {
            sub_commands::field::field(&mut builder, sub_command_args).await
        }
        Commands::Json(sub_command_args) => {
            sub_commands::json::json(&mut builder, sub_command_args).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header() {
        assert_eq!(
            parse_header("Accept: application/json"),
            Ok(("Accept".to_string(), "application/json".to_string()))
        );
        assert!(parse_header("no-separator").is_err());
    }

    #[test]
    fn test_parse_param() {
        assert_eq!(
            parse_param("q=a=b"),
            Ok(("q".to_string(), "a=b".to_string()))
        );
        assert!(parse_param("q").is_err());
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from([
            "fluent-http",
            "-X",
            "POST",
            "-H",
            "a:b",
            "-p",
            "c=d",
            "--total-timeout",
            "1000",
            "field",
            "http://httpbin.org/post",
            "headers",
            "Host",
        ])
        .expect("valid arguments");

        assert_eq!(cli.method, "POST");
        assert_eq!(cli.headers, vec![("a".to_string(), "b".to_string())]);
        assert_eq!(cli.params, vec![("c".to_string(), "d".to_string())]);
        assert_eq!(cli.total_timeout, Some(1000));
        match cli.command {
            Commands::Field(field) => assert_eq!(field.key_path, vec!["headers", "Host"]),
            _ => panic!("Expected field subcommand"),
        }
    }

    #[test]
    fn test_body_conflicts_with_json_body() {
        let result = Cli::try_parse_from([
            "fluent-http",
            "--body",
            "x",
            "--json-body",
            "{}",
            "text",
            "http://httpbin.org/get",
        ]);
        assert!(result.is_err());
    }
}
