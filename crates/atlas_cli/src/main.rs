use anyhow::Context;
use atlas_client::{AtlasClient, StagedUpload};
use atlas_core::prelude::*;
use atlas_fs::{FileSystemStore, StagingArea};
use atlas_server::{AtlasServer, AtlasServerConfig};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "atlas")]
#[command(about = "Asset store for the scene editor")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Asset routes of a running server
    #[arg(short, long, env = "ATLAS_URL", default_value = "http://localhost:5001/api/assets")]
    url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the asset server
    Serve {
        /// Root of the per-category asset folders
        #[arg(long, env = "ATLAS_ASSETS_DIR", default_value = "./assets")]
        assets_dir: PathBuf,

        /// Staging folder for imported files
        #[arg(long, env = "ATLAS_STAGING_DIR", default_value = "./public/external-import")]
        staging_dir: PathBuf,

        #[arg(short, long, env = "PORT", default_value_t = 5001)]
        port: u16,

        /// Prefix of the asset routes
        #[arg(long, default_value = "/api/assets")]
        prefix: String,
    },
    /// List the assets of a category
    List { category: Category },
    /// Print an asset document, or write its code to a file
    Load {
        category: Category,
        name: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Save a file's contents as an asset's code
    Save {
        category: Category,
        name: String,
        file: PathBuf,
    },
    /// Delete an asset and everything bundled with it
    Delete { category: Category, name: String },
    /// Upload a directory into the staging area, replacing its contents
    Import { dir: PathBuf },
    /// List the staged files
    Staged,
    /// Empty the staging area
    ClearStaged,
    /// Bundle scenes and staged files into a flow
    BundleFlow {
        flow: String,
        scenes: Vec<String>,
    },
    /// Unpack a flow bundle into the scenes folder and staging area
    RestoreFlow { flow: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let client = AtlasClient::new(cli.url.clone());

    match cli.command {
        Commands::Serve {
            assets_dir,
            staging_dir,
            port,
            prefix,
        } => {
            let store = FileSystemStore::new(&assets_dir, StagingArea::new(&staging_dir));
            store
                .init()
                .await
                .with_context(|| format!("Failed to create asset folders in {assets_dir:?}"))?;

            let app = AtlasServer::new(AtlasServerConfig {
                prefix,
                ..Default::default()
            })
            .build(store);

            let addr = format!("0.0.0.0:{port}");
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("Failed to bind {addr}"))?;
            info!("Assets in {assets_dir:?}, staging in {staging_dir:?}");
            info!("Server listening on http://{addr}");
            axum::serve(listener, app).await?;
        }
        Commands::List { category } => {
            let assets = client.list(category).await?;
            for asset in &assets {
                let thumbnail = if asset.has_thumbnail { "🖼" } else { " " };
                println!(
                    "{thumbnail} {:<32} updated {}",
                    asset.folder,
                    asset.updated_at.format("%Y-%m-%d %H:%M")
                );
            }
            println!("{} {category} assets", assets.len());
        }
        Commands::Load {
            category,
            name,
            output,
        } => {
            let document = client.load(category, &name).await?;
            match output {
                Some(output) => {
                    if let Some(parent) = output.parent() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                    tokio::fs::write(&output, &document.code).await?;
                    println!("✅ Saved code of {category} '{name}' to {output:?}");
                }
                None => println!("{}", serde_json::to_string_pretty(&document)?),
            }
        }
        Commands::Save {
            category,
            name,
            file,
        } => {
            let code = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {file:?}"))?;
            let filename = client.save(category, &name, &code).await?;
            println!("✅ Saved {category} '{name}' as {filename}");
        }
        Commands::Delete { category, name } => {
            client.delete(category, &name).await?;
            println!("🗑 Deleted {category} '{name}'");
        }
        Commands::Import { dir } => {
            let mut uploads = Vec::new();
            for entry in WalkDir::new(&dir) {
                let entry = entry?;
                if entry.file_type().is_dir() {
                    continue;
                }

                let relative_path = entry
                    .path()
                    .strip_prefix(&dir)?
                    .to_string_lossy()
                    .replace('\\', "/");
                uploads.push(StagedUpload::from_file(entry.path(), relative_path).await?);
            }

            println!("🚀 Uploading {} files from {dir:?}...", uploads.len());
            let imported = client.import_external(uploads).await?;
            for file in &imported {
                println!("  {} ({} bytes)", file.name, file.size);
            }
            println!("✅ Staged {} files", imported.len());
        }
        Commands::Staged => {
            let files = client.list_external().await?;
            for file in &files {
                println!("{:>10}  {}", file.size, file.name);
            }
            println!("{} staged files", files.len());
        }
        Commands::ClearStaged => {
            client.clear_external().await?;
            println!("🧹 Staging area cleared");
        }
        Commands::BundleFlow { flow, scenes } => {
            let bundle = client.bundle_flow_project(&flow, &scenes).await?;
            println!(
                "📦 Bundled flow '{flow}' with scenes {:?} ({} files)",
                bundle.bundled_scenes, bundle.total_files
            );
        }
        Commands::RestoreFlow { flow } => match client.restore_flow_assets(&flow).await? {
            Some(restore) => println!(
                "✅ Restored scenes {:?} and {} staged entries",
                restore.restored_scenes, restore.restored_files
            ),
            None => println!("Flow '{flow}' has no bundled assets"),
        },
    }

    Ok(())
}
