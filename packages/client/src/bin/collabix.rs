//! Collabix terminal client.
//!
//! Signs in against the Collabix API, then joins rooms through the relay.
//! Sessions are not retried: a lost connection or a kick ends the program.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin collabix -- login --username alice
//! cargo run --bin collabix -- new-room
//! cargo run --bin collabix -- join 6f1c2a3e-...
//! cargo run --bin collabix -- download 6f1c2a3e-... --dest ./out
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rustyline::DefaultEditor;

use collabix_client::{
    ClientError,
    client::{ClientConfig, domain::exit_code, runner},
    domain::RoomId,
    infrastructure::user_store::UserStore,
};
use collabix_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "collabix")]
#[command(about = "Terminal client for the Collabix collaborative editor", long_about = None)]
struct Args {
    /// Relay WebSocket URL
    #[arg(long, global = true, default_value = "ws://127.0.0.1:5000/ws")]
    relay_url: String,

    /// REST API base URL
    #[arg(long, global = true, default_value = "http://127.0.0.1:5000")]
    api_url: String,

    /// Where the signed-in user is stored (defaults to the platform config directory)
    #[arg(long, global = true)]
    user_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign in and remember the user
    Login {
        #[arg(short, long)]
        username: String,
        /// Prompted for when omitted
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Create an account and remember the user
    Register {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Forget the signed-in user
    Logout,
    /// Create a fresh room id and join it
    NewRoom,
    /// Join an existing room
    Join { room_id: String },
    /// Download a room's project as a zip archive
    Download {
        room_id: String,
        #[arg(short, long, default_value = ".")]
        dest: PathBuf,
    },
}

fn read_password(given: Option<String>) -> Result<String, ClientError> {
    if let Some(password) = given {
        return Ok(password);
    }
    let readline_error = |e: rustyline::error::ReadlineError| {
        ClientError::Io(std::io::Error::other(e.to_string()))
    };
    let mut rl = DefaultEditor::new().map_err(readline_error)?;
    rl.readline("Password: ").map_err(readline_error)
}

async fn run(args: Args) -> Result<(), ClientError> {
    let user_file = match args.user_file {
        Some(path) => path,
        None => UserStore::default_path()?,
    };
    let config = ClientConfig {
        relay_url: args.relay_url,
        api_url: args.api_url,
        user_file,
    };

    match args.command {
        Commands::Login { username, password } => {
            let password = read_password(password)?;
            let user = runner::login(&config, &username, &password).await?;
            println!("Logged in as {}", user.username);
        }
        Commands::Register {
            username,
            email,
            password,
        } => {
            let password = read_password(password)?;
            let user = runner::register(&config, &username, &email, &password).await?;
            println!("Registered and logged in as {}", user.username);
        }
        Commands::Logout => {
            if runner::logout(&config)? {
                println!("Logged out");
            } else {
                println!("Not logged in");
            }
        }
        Commands::NewRoom => {
            let room_id = RoomId::generate();
            println!("Created room {}", room_id);
            runner::join_room(&config, room_id).await?;
        }
        Commands::Join { room_id } => {
            runner::join_room(&config, RoomId::new(room_id)?).await?;
        }
        Commands::Download { room_id, dest } => {
            let path = runner::download(&config, &RoomId::new(room_id)?, &dest).await?;
            println!("Saved {}", path.display());
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(&[env!("CARGO_CRATE_NAME"), "collabix_client"], "info");

    let args = Args::parse();

    if let Err(e) = run(args).await {
        tracing::error!("Client error: {}", e);
        eprintln!("{}", e);
        std::process::exit(exit_code(&e));
    }
}
