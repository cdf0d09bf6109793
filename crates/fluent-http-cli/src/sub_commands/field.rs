use anyhow::Result;
use clap::Args;
use fluent_http::RequestBuilder;

#[derive(Args)]
pub struct FieldSubCommand {
    /// Target URL
    url: String,
    /// Key path, outermost key first; `[n]` indexes an array
    #[arg(required = true)]
    pub key_path: Vec<String>,
}

pub async fn field(builder: &mut RequestBuilder, sub_command_args: &FieldSubCommand) -> Result<()> {
    let value = builder
        .response_get_json_field(&sub_command_args.url, &sub_command_args.key_path)
        .await?;

    println!("{}", String::from_utf8_lossy(&value));

    Ok(())
}
