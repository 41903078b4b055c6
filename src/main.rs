use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use log::debug;

use morph_apply::{EditApplier, EditRequest, EnvSettings, ServiceConfig};

/// Merge sparse code edits with the Morph fast-apply service.
/// Reads MORPH_API_KEY, MORPH_BASE_URL and MORPH_TIMEOUT_MS.
#[derive(Debug, Parser)]
#[command(name = "morph-apply", version)]
struct Cli
{   #[command(subcommand)]
    command: Command
}

#[derive(Debug, Subcommand)]
enum Command
{   /// Merge an edit fragment into a file
    Apply(ApplyArgs)
  , /// Check that the configured API key is accepted
    CheckKey
}

#[derive(Debug, Args)]
struct ApplyArgs
{   /// What the edit should accomplish
    #[arg(long)]
    instructions: String
  , /// File holding the original content
    #[arg(long, required_unless_present = "new_file")]
    original: Option<PathBuf>
  , /// Treat the original content as empty
    #[arg(long, conflicts_with = "original")]
    new_file: bool
  , /// File holding the sparse edit, or `-` for stdin
    #[arg(long)]
    edit: String
  , /// Write merged content here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>
}

fn read_edit(source: &str) -> std::io::Result<String>
{   if source == "-"
    {   let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else
    {   std::fs::read_to_string(source)
    }
}

async fn apply(
  applier: &EditApplier
, args: ApplyArgs
) -> Result<(), Box<dyn std::error::Error>>
{   let original = match &args.original
    {   Some(path) => std::fs::read_to_string(path)?
      , None => String::new()
    };
    let code_edit = read_edit(&args.edit)?;

    let request = EditRequest::new(args.instructions, original, code_edit);
    let merged = applier.apply_edit(&request).await?;

    match args.output
    {   Some(path) => {
          debug!("Writing merged content to {}", path.display());
          std::fs::write(path, merged)?;
        }
      , None => print!("{}", merged)
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>>
{   let config = ServiceConfig::resolve(&EnvSettings)?;
    let applier = EditApplier::new(config)?;

    match cli.command
    {   Command::Apply(args) => {
          apply(&applier, args).await?;
          Ok(ExitCode::SUCCESS)
        }
      , Command::CheckKey => {
          if applier.validate_credential().await
          {   println!("valid");
              Ok(ExitCode::SUCCESS)
          } else
          {   println!("invalid");
              Ok(ExitCode::FAILURE)
          }
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode
{   env_logger::Builder::from_env(
      env_logger::Env::default().default_filter_or("warn")
    ).init();

    let cli = Cli::parse();
    match run(cli).await
    {   Ok(code) => code
      , Err(e) => {
          eprintln!("morph-apply: {}", e);
          ExitCode::FAILURE
        }
    }
}
