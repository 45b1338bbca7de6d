//! Print interpretation statistics for a file.
//!
//! Usage: interp_stats <path> [encoding]
//! Set RUST_LOG=debug to see chunk and fixup logging.

use anyhow::{bail, Context, Result};
use monster_rift_interp::buffer::ByteBuffer;
use monster_rift_interp::config::InterpretationConfig;
use monster_rift_interp::encoding::{encoding_by_name, Encoding, Utf8};
use monster_rift_interp::interpretation::Interpretation;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()))
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        bail!("usage: interp_stats <path> [encoding]");
    };
    let encoding: Box<dyn Encoding> = match args.next() {
        Some(name) => {
            encoding_by_name(&name).with_context(|| format!("unknown encoding {name:?}"))?
        }
        None => Box::new(Utf8),
    };

    let bytes = std::fs::read(&path).with_context(|| format!("failed to read {path}"))?;
    let buffer = ByteBuffer::from_bytes(bytes);
    let interp = Interpretation::new(&buffer, encoding, InterpretationConfig::default())?;

    println!("file:        {path}");
    println!("encoding:    {}", interp.encoding().name());
    println!("bytes:       {}", interp.byte_count());
    println!("codepoints:  {}", interp.codepoint_count());
    println!("characters:  {}", interp.character_count());
    println!("lines:       {}", interp.line_count());
    println!("chunks:      {}", interp.chunk_count());

    let invalid = interp
        .codepoint_iterator_at(&buffer, 0)
        .filter(|info| info.value.is_none())
        .count();
    println!("invalid:     {invalid}");

    let longest = interp
        .lines()
        .map(|line| line.nonbreak_chars)
        .max()
        .unwrap_or(0);
    println!("longest:     {longest}");

    if !interp.check_integrity(&buffer) {
        bail!("integrity check failed");
    }
    println!("integrity:   ok");
    Ok(())
}
