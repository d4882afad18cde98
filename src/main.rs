//! `wsframe` binary: dump the messages contained in a captured frame stream.

mod cli;

use std::num::NonZeroUsize;

use clap::Parser;
use tokio::io::AsyncRead;
use tokio_util::sync::CancellationToken;
use wsframe::{Compression, Message, Opcode, Reader, ReaderConfig};

fn config_from(cli: &cli::Cli) -> ReaderConfig {
    let compression = if cli.no_compression {
        Compression::Disabled
    } else {
        Compression::Enabled {
            context_takeover: cli.context_takeover,
        }
    };
    ReaderConfig::new(cli.max_payload_size)
        .read_chunk_size(NonZeroUsize::new(cli.chunk_size).unwrap_or(NonZeroUsize::MIN))
        .compression(compression)
        .control_interleaving(!cli.strict)
}

fn describe(index: usize, message: &mut Message, preview: usize) -> String {
    let opcode = message.opcode();
    let len = message.len();
    let payload = message.raw_data().read_all();
    let shown = &payload[..payload.len().min(preview)];
    let body = match opcode {
        Opcode::Text => format!("{:?}", String::from_utf8_lossy(shown)),
        _ => shown.iter().map(|b| format!("{b:02x}")).collect::<String>(),
    };
    let ellipsis = if payload.len() > preview { "..." } else { "" };
    format!("#{index} {opcode:?} {len} bytes {body}{ellipsis}")
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Applications embedding the library should install their own subscriber.
    tracing_subscriber::fmt::init();

    let cli = cli::Cli::parse();
    let input: Box<dyn AsyncRead + Unpin + Send> = match &cli.input {
        Some(path) => Box::new(tokio::fs::File::open(path).await?),
        None => Box::new(tokio::io::stdin()),
    };

    let mut reader = Reader::with_config(input, config_from(&cli));
    let cancel = CancellationToken::new();
    let mut index = 0;
    while let Some(mut message) = reader.read(&cancel).await? {
        println!("{}", describe(index, &mut message, cli.preview));
        index += 1;
    }
    log::debug!("{index} message(s) read");
    Ok(())
}
