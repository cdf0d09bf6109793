use anyhow::Result;
use clap::Args;
use fluent_http::RequestBuilder;
use serde_json::Value;

#[derive(Args)]
pub struct JsonSubCommand {
    /// Target URL
    url: String,
}

pub async fn json(builder: &mut RequestBuilder, sub_command_args: &JsonSubCommand) -> Result<()> {
    let value: Value = builder.response_to_struct(&sub_command_args.url).await?;

    println!("{}", serde_json::to_string_pretty(&value)?);

    Ok(())
}
