//! Durin command-line client.
//!
//! Sends one request line built from the positional words, or, without
//! words, forwards stdin line by line and prints every response.

use clap::Parser;
use durin::{DEFAULT_HOST, DEFAULT_PORT};
use std::process::exit;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

#[derive(Parser)]
#[command(name = "durin-cli", version, about = "A client for the Durin key-value store")]
struct Cli {
    /// Server host
    #[arg(long, default_value = DEFAULT_HOST)]
    host: String,

    /// Server port
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Request words, e.g. `set foo bar`; reads stdin when empty
    words: Vec<String>,
}

struct Client {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Client {
    async fn connect(addr: &str) -> std::io::Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        let (reader, writer) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(reader),
            writer,
        })
    }

    /// Sends one request line and returns the response line.
    async fn request(&mut self, line: &str) -> std::io::Result<String> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;

        let mut response = String::new();
        if self.reader.read_line(&mut response).await? == 0 {
            return Err(std::io::ErrorKind::UnexpectedEof.into());
        }
        Ok(response)
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let addr = format!("{}:{}", cli.host, cli.port);

    let mut client = Client::connect(&addr).await.unwrap_or_else(|_| {
        eprintln!("(error) failed to connect to durin");
        exit(1);
    });

    if !cli.words.is_empty() {
        send(&mut client, &cli.words.join(" ")).await;
        return;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => send(&mut client, &line).await,
            Ok(None) => break,
            Err(e) => {
                eprintln!("(error) {}", e);
                exit(1);
            }
        }
    }
}

async fn send(client: &mut Client, line: &str) {
    match client.request(line).await {
        Ok(response) => print!("{}", response),
        Err(_) => {
            println!("(error) connection lost");
            exit(1);
        }
    }
}
