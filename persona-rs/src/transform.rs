//! Boundary with the external message-script transform
//!
//! Compiling and decompiling Atlus message scripts is the job of an external
//! toolchain; this module only fixes the seam it plugs into. The container
//! core never sees any of this — it moves opaque bytes.

use anyhow::Result;
use clap::ValueEnum;

/// Target game variant, selecting the character encoding and symbol aliases
/// a message-script codec should use
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GameVariant {
    /// Persona 3
    P3,
    /// Persona 4
    P4,
}

/// Two-way transform between compiled message-script bytes and the editable
/// `.msg` representation
///
/// `decompile` must consume the whole payload or fail; `compile` returns a
/// self-contained payload the container core injects verbatim. Failures on
/// either side surface before any write pass begins.
pub trait MessageCodec {
    /// Turn a compiled message-script payload into `.msg` file contents
    fn decompile(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Turn `.msg` file contents into a compiled message-script payload
    fn compile(&self, source: &[u8]) -> Result<Vec<u8>>;
}

/// Lossless passthrough codec: the `.msg` file holds the compiled payload
/// bytes as-is
///
/// Stands in until a real compiler/decompiler is wired up; it ignores the
/// game variant because it never touches text.
#[derive(Debug, Default)]
pub struct RawCodec;

impl MessageCodec for RawCodec {
    fn decompile(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(data.to_vec())
    }

    fn compile(&self, source: &[u8]) -> Result<Vec<u8>> {
        Ok(source.to_vec())
    }
}

/// Pick the codec for the requested game variant
pub fn codec_for(game: Option<GameVariant>) -> Box<dyn MessageCodec> {
    if let Some(game) = game {
        log::info!("game variant {game:?} requested; raw codec ignores encoding tables");
    }
    Box::new(RawCodec)
}
