use anyhow::Result;
use clap::Args;
use fluent_http::RequestBuilder;

#[derive(Args)]
pub struct TextSubCommand {
    /// Target URL
    url: String,
}

pub async fn text(builder: &mut RequestBuilder, sub_command_args: &TextSubCommand) -> Result<()> {
    let body = builder.response_to_string(&sub_command_args.url).await?;

    println!("{}", body);

    Ok(())
}
