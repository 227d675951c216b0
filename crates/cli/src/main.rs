use clap::{Args, Parser, Subcommand};
use locker_core::constants::DATA_DIR_ENV;
use locker_core::{report, CoreConfig, LockerEngine, Session};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "locker")]
#[command(about = "Multi-user file locker CLI")]
struct Cli {
    /// Data directory (defaults to ./data)
    #[arg(long, env = DATA_DIR_ENV)]
    data_dir: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct Credentials {
    /// Username
    #[arg(long, short)]
    user: String,
    /// Password
    #[arg(long, env = "LOCKER_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new user
    Register {
        #[command(flatten)]
        credentials: Credentials,
    },
    /// List files in your locker
    List {
        #[command(flatten)]
        credentials: Credentials,
        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Upload a file into your locker
    Upload {
        #[command(flatten)]
        credentials: Credentials,
        /// File to upload
        path: PathBuf,
    },
    /// Download a file from your locker
    Download {
        #[command(flatten)]
        credentials: Credentials,
        /// File ID as shown by `list`
        file_id: String,
        /// Destination directory
        #[arg(default_value = ".")]
        destination: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("locker=info".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    run(cli, &mut io::stdout().lock())
}

fn run(cli: Cli, out: &mut impl Write) -> Result<(), Box<dyn std::error::Error>> {
    let Some(command) = cli.command else {
        writeln!(out, "Use 'locker --help' for commands")?;
        return Ok(());
    };

    let cfg = CoreConfig::from_env_value(cli.data_dir)?;
    cfg.ensure_data_dir()?;
    let engine = LockerEngine::new(Arc::new(cfg));

    match command {
        Commands::Register { credentials } => {
            let user = engine.register(&credentials.user, &credentials.password)?;
            writeln!(out, "Registered {}", user.username())?;
        }
        Commands::List { credentials, json } => {
            let session = sign_in(&engine, &credentials)?;
            let records = engine.list(&session)?;
            if json {
                serde_json::to_writer_pretty(&mut *out, &records)?;
                writeln!(out)?;
            } else {
                write!(out, "{}", report::file_table(&records))?;
            }
        }
        Commands::Upload { credentials, path } => {
            let session = sign_in(&engine, &credentials)?;
            let record = engine.upload(&session, &path)?;
            writeln!(
                out,
                "Uploaded {} as {} ({} bytes)",
                record.original_name, record.id, record.size_bytes
            )?;
        }
        Commands::Download {
            credentials,
            file_id,
            destination,
        } => {
            let session = sign_in(&engine, &credentials)?;
            let written = engine.download(&session, &file_id, &destination)?;
            writeln!(
                out,
                "Downloaded {} to {} ({} bytes)",
                file_id,
                destination.display(),
                written
            )?;
        }
    }

    Ok(())
}

fn sign_in(
    engine: &LockerEngine,
    credentials: &Credentials,
) -> Result<Session, locker_core::LockerError> {
    let mut session = Session::anonymous();
    session.sign_in(engine.authenticate(&credentials.user, &credentials.password)?);
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn invoke(data: &TempDir, args: &[&str]) -> Result<String, String> {
        let data_dir = data.path().to_string_lossy().to_string();
        let mut argv = vec!["locker", "--data-dir", data_dir.as_str()];
        argv.extend_from_slice(args);

        let cli = Cli::try_parse_from(argv).map_err(|e| e.to_string())?;
        let mut out = Vec::new();
        run(cli, &mut out).map_err(|e| e.to_string())?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_register_upload_list_download() {
        let data = TempDir::new().unwrap();
        let work = TempDir::new().unwrap();
        let source = work.path().join("notes.txt");
        fs::write(&source, b"hello locker").unwrap();

        let out = invoke(&data, &["register", "-u", "alice", "--password", "pw"]).unwrap();
        assert_eq!(out, "Registered alice\n");

        let out = invoke(
            &data,
            &["upload", "-u", "alice", "--password", "pw", source.to_str().unwrap()],
        )
        .unwrap();
        assert!(out.starts_with("Uploaded notes.txt as "));

        let json = invoke(&data, &["list", "-u", "alice", "--password", "pw", "--json"]).unwrap();
        let records: serde_json::Value = serde_json::from_str(&json).unwrap();
        let id = records[0]["id"].as_str().unwrap().to_string();
        assert_eq!(records[0]["original_name"], "notes.txt");
        assert_eq!(records[0]["size_bytes"], 12);

        let dest = work.path().join("out");
        fs::create_dir(&dest).unwrap();
        invoke(
            &data,
            &["download", "-u", "alice", "--password", "pw", &id, dest.to_str().unwrap()],
        )
        .unwrap();
        assert_eq!(fs::read(dest.join("notes.txt")).unwrap(), b"hello locker");
    }

    #[test]
    fn test_empty_list_prints_message() {
        let data = TempDir::new().unwrap();
        invoke(&data, &["register", "-u", "bob", "--password", "pw"]).unwrap();

        let out = invoke(&data, &["list", "-u", "bob", "--password", "pw"]).unwrap();
        assert_eq!(out, "Your locker is empty.\n");
    }

    #[test]
    fn test_wrong_password_is_an_error() {
        let data = TempDir::new().unwrap();
        invoke(&data, &["register", "-u", "bob", "--password", "pw"]).unwrap();

        let err = invoke(&data, &["list", "-u", "bob", "--password", "nope"]).unwrap_err();
        assert_eq!(err, "invalid username or password");
    }
}
